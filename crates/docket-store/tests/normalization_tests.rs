use docket_graph::{
    Assignment, CreatedBy, Graph, Node, NodeKind, Template, TemplateKind, TemplateVersion,
};
use docket_store::{normalize_graph_ordering, normalize_titles};
use docket_test_utils::ts;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn template(id: &str, title: &str, created_by: CreatedBy) -> Template {
    Template::new(
        id,
        title,
        TemplateKind::Custom,
        created_by,
        TemplateVersion::draft(1, Graph::new()),
        ts(),
    )
}

fn assignment(id: &str, title: &str) -> Assignment {
    Assignment::new(id, "tpl", 1, title, ts())
}

#[test]
fn test_copy_prefix_collides_with_original() {
    let mut templates = vec![
        template("a", "Demo Intake", CreatedBy::Attorney),
        template("b", "Copy of Demo Intake", CreatedBy::Attorney),
    ];
    let changed = normalize_titles(&mut templates, &mut []);
    assert!(changed);
    assert_eq!(templates[0].title, "Demo Intake");
    assert_eq!(templates[1].title, "Demo Intake (2)");
    assert!(!normalize_titles(&mut templates, &mut []));
}

#[test]
fn test_system_template_titles_untouched() {
    let mut templates = vec![template("s", "Copy of Shipped", CreatedBy::System)];
    assert!(!normalize_titles(&mut templates, &mut []));
    assert_eq!(templates[0].title, "Copy of Shipped");
}

#[test]
fn test_assignment_titles_deduplicated() {
    let mut assignments = vec![
        assignment("1", "Follow-up (Copy)"),
        assignment("2", "Follow-up"),
        assignment("3", "copy of Follow-up (copy)"),
        assignment("4", "Copy of   "),
    ];
    assert!(normalize_titles(&mut [], &mut assignments));
    let titles: Vec<&str> = assignments.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, ["Follow-up (2)", "Follow-up", "Follow-up (3)", "Copy of   "]);
}

#[test]
fn test_stacked_copy_markers_settle_in_one_pass() {
    let mut templates = vec![
        template("a", "Copy of Copy of Demo", CreatedBy::Attorney),
        template("b", "Demo (Copy) (Copy)", CreatedBy::Attorney),
    ];
    let mut assignments = vec![assignment("1", "Copy of Copy of Follow-up")];

    assert!(normalize_titles(&mut templates, &mut assignments));
    let titles: Vec<&str> = templates.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Demo", "Demo (2)"]);
    assert_eq!(assignments[0].title, "Follow-up");

    assert!(!normalize_titles(&mut templates, &mut assignments));
}

fn title() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Demo".to_owned()),
        Just("Demo (2)".to_owned()),
        Just("Copy of Demo".to_owned()),
        Just("Demo (Copy)".to_owned()),
        Just("copy of Intake (copy)".to_owned()),
        Just("Copy of Copy of Demo".to_owned()),
        Just("Demo (Copy) (Copy)".to_owned()),
        Just("Copy of Demo (Copy) (copy)".to_owned()),
        Just("Intake".to_owned()),
        Just("  ".to_owned()),
        "[A-Za-z ]{0,12}",
    ]
}

proptest! {
    #[test]
    fn prop_title_normalization_is_idempotent(
        template_titles in prop::collection::vec((title(), any::<bool>()), 0..8),
        assignment_titles in prop::collection::vec(title(), 0..8),
    ) {
        let mut templates: Vec<Template> = template_titles
            .iter()
            .enumerate()
            .map(|(i, (t, attorney))| {
                let by = if *attorney { CreatedBy::Attorney } else { CreatedBy::System };
                template(&format!("t{i}"), t, by)
            })
            .collect();
        let mut assignments: Vec<Assignment> = assignment_titles
            .iter()
            .enumerate()
            .map(|(i, t)| assignment(&format!("a{i}"), t))
            .collect();

        normalize_titles(&mut templates, &mut assignments);
        let snapshot = (templates.clone(), assignments.clone());
        prop_assert!(!normalize_titles(&mut templates, &mut assignments));
        prop_assert_eq!((templates, assignments), snapshot);
    }

    #[test]
    fn prop_ordering_normalization_is_idempotent(
        ys in prop::collection::vec((0..3usize, -500.0..500.0f64, prop::option::of(0..5000u32)), 0..20),
    ) {
        let mut nodes = vec![
            Node::new(NodeKind::Section, "s0").with_ui(0.0, 30.0),
            Node::new(NodeKind::Section, "s1").with_ui(0.0, 10.0),
            Node::new(NodeKind::Section, "s2").with_order(5),
        ];
        for (i, (section, y, order)) in ys.into_iter().enumerate() {
            let mut node = Node::new(NodeKind::Question, format!("q{i}"))
                .with_section(format!("s{section}"))
                .with_ui(0.0, y);
            node.order = order;
            nodes.push(node);
        }
        let mut graph = Graph::from_parts(nodes, Vec::new());

        normalize_graph_ordering(&mut graph);
        let once = graph.clone();
        prop_assert!(!normalize_graph_ordering(&mut graph));
        prop_assert_eq!(graph, once);
    }
}
