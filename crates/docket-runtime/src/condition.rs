//! Edge condition semantics shared by visibility and traversal

use docket_graph::{EdgeCondition, NodeResponse, ResponseValue};

/// Whether `condition` holds for the source node's response.
///
/// `always` holds unconditionally; every other condition fails when the
/// source has no response.
#[must_use]
pub fn condition_matches(condition: &EdgeCondition, source: Option<&NodeResponse>) -> bool {
    if matches!(condition, EdgeCondition::Always) {
        return true;
    }
    let Some(response) = source else {
        return false;
    };
    let value = response.value.as_ref();
    match condition {
        EdgeCondition::Always => true,
        EdgeCondition::Exists => response.has_meaningful_value(),
        EdgeCondition::Yes => value.is_some_and(ResponseValue::is_yes),
        EdgeCondition::No => value.is_some_and(ResponseValue::is_no),
        EdgeCondition::ChoiceEquals { option_id } => match (value, option_id) {
            (Some(ResponseValue::Text(text)), Some(option)) => text == option,
            _ => false,
        },
        EdgeCondition::ChoiceContains { option_id } => match (value, option_id) {
            (Some(ResponseValue::List(items)), Some(option)) if !option.is_empty() => {
                items.iter().any(|item| item == option)
            }
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use docket_graph::SkipActor;
    use docket_graph::SkipRecord;

    fn answer(value: ResponseValue) -> NodeResponse {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        NodeResponse::answered("a1", "q1", value, at)
    }

    #[test]
    fn test_absent_source_only_passes_always() {
        assert!(condition_matches(&EdgeCondition::Always, None));
        assert!(!condition_matches(&EdgeCondition::Exists, None));
        assert!(!condition_matches(&EdgeCondition::No, None));
    }

    #[test]
    fn test_yes_no_accepts_bool_and_text() {
        let yes = answer(ResponseValue::Bool(true));
        let no_text = answer(ResponseValue::text(" No"));
        assert!(condition_matches(&EdgeCondition::Yes, Some(&yes)));
        assert!(!condition_matches(&EdgeCondition::No, Some(&yes)));
        assert!(condition_matches(&EdgeCondition::No, Some(&no_text)));
    }

    #[test]
    fn test_choice_conditions() {
        let single = answer(ResponseValue::text("married"));
        let multi = answer(ResponseValue::List(vec!["car".into(), "boat".into()]));
        assert!(condition_matches(&EdgeCondition::choice_equals("married"), Some(&single)));
        assert!(!condition_matches(&EdgeCondition::choice_equals("single"), Some(&single)));
        assert!(condition_matches(&EdgeCondition::choice_contains("boat"), Some(&multi)));
        assert!(!condition_matches(&EdgeCondition::choice_contains("boat"), Some(&single)));
        assert!(!condition_matches(
            &EdgeCondition::ChoiceEquals { option_id: None },
            Some(&single)
        ));
    }

    #[test]
    fn test_skip_does_not_satisfy_exists() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let skipped = NodeResponse::skipped(
            "a1",
            "q1",
            SkipRecord {
                reason: "unsure".into(),
                by: SkipActor::Client,
                at,
            },
            at,
        );
        assert!(!condition_matches(&EdgeCondition::Exists, Some(&skipped)));
    }
}
