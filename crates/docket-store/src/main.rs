//! `docket` command-line tool

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use docket_graph::Graph;
use docket_runtime::{GraphValidator, ValidationContext};
use docket_store::{
    normalize_titles, FanoutTelemetry, FileStore, MetricsTelemetry, QuestionnaireStore,
    StoreConfig, StoreServices, TracingTelemetry, SCHEMA_VERSION,
};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("docket")
        .version(docket_store::VERSION)
        .about("Questionnaire graph runtime for legal intake")
        .subcommand_required(true)
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .default_value(".docket")
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding the questionnaire documents"),
        )
        .arg(
            Arg::new("scope")
                .long("scope")
                .global(true)
                .default_value("gbi")
                .help("Workspace scope prefixed to document keys"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a graph JSON file")
                .arg(
                    Arg::new("graph")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to a graph document ({nodes, edges})"),
                )
                .arg(
                    Arg::new("max-nodes")
                        .long("max-nodes")
                        .default_value("60")
                        .value_parser(value_parser!(usize))
                        .help("Workflow-node count above which a warning is raised"),
                ),
        )
        .subcommand(
            Command::new("progress")
                .about("Show completion and stage of an assignment")
                .arg(Arg::new("assignment").required(true).help("Assignment id")),
        )
        .subcommand(
            Command::new("coverage")
                .about("Show filing-label coverage of an assignment")
                .arg(Arg::new("assignment").required(true).help("Assignment id")),
        )
        .subcommand(Command::new("migrate").about("Load the store, migrating if needed"))
        .subcommand(
            Command::new("normalize-titles").about("Strip copy artifacts from titles"),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn open_store(args: &ArgMatches) -> QuestionnaireStore<FileStore> {
    let root = args
        .get_one::<PathBuf>("store")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(".docket"));
    let scope = args.get_one::<String>("scope").cloned().unwrap_or_default();
    let telemetry = FanoutTelemetry::new(vec![Arc::new(TracingTelemetry), Arc::new(MetricsTelemetry)]);
    QuestionnaireStore::new(FileStore::new(root))
        .with_config(StoreConfig::new().with_scope(scope))
        .with_services(StoreServices::system().with_telemetry(Arc::new(telemetry)))
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a String> {
    args.get_one::<String>(name)
        .with_context(|| format!("missing <{name}>"))
}

fn validate(args: &ArgMatches) -> Result<ExitCode> {
    let path = args
        .get_one::<PathBuf>("graph")
        .context("missing <graph>")?;
    let max_nodes = args.get_one::<usize>("max-nodes").copied().unwrap_or(60);
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let graph: Graph = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;

    let validator = GraphValidator::with_context(
        ValidationContext::default().with_max_workflow_nodes(max_nodes),
    );
    let report = validator.validate(&graph);
    for error in &report.errors {
        println!("error: {error}");
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    println!("{} error(s), {} warning(s)", report.errors.len(), report.warnings.len());
    Ok(if report.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run(matches: &ArgMatches) -> Result<ExitCode> {
    match matches.subcommand() {
        Some(("validate", args)) => validate(args),
        Some(("progress", args)) => {
            let store = open_store(args);
            let state = store.load()?;
            let progress = state.assignment_progress(required(args, "assignment")?, store.catalog())?;
            println!("{}", serde_json::to_string_pretty(&progress)?);
            Ok(ExitCode::SUCCESS)
        }
        Some(("coverage", args)) => {
            let store = open_store(args);
            let state = store.load()?;
            let coverage = state.assignment_coverage(required(args, "assignment")?, store.catalog())?;
            for entry in &coverage {
                println!(
                    "{:<24} {:<8} missing={} blocking={}",
                    entry.label.display_name(),
                    if entry.covered { "covered" } else { "open" },
                    entry.missing_count,
                    entry.blocking_count,
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(("migrate", args)) => {
            let state = open_store(args).load()?;
            println!(
                "schema version {} ({} templates, {} assignments, {} responses)",
                SCHEMA_VERSION,
                state.templates.len(),
                state.assignments.len(),
                state.responses.len(),
            );
            Ok(ExitCode::SUCCESS)
        }
        Some(("normalize-titles", args)) => {
            let store = open_store(args);
            let mut state = match store.read_stored() {
                Some(state) => state,
                None => store.load()?,
            };
            let changed = normalize_titles(&mut state.templates, &mut state.assignments);
            if changed {
                store.save(&state)?;
            }
            println!("{}", if changed { "titles updated" } else { "titles already unique" });
            Ok(ExitCode::SUCCESS)
        }
        _ => Ok(ExitCode::SUCCESS),
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match run(&matches) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
