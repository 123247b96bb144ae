mod scenario;

use std::env;
use std::path::PathBuf;

use parrot_nav_core::replay_journal;
use parrot_nav_core::visible_tabs;
use parrot_nav_core::NavConfig;
use parrot_nav_core::NavJournal;
use parrot_nav_core::Role;
use tracing_subscriber::EnvFilter;

use crate::scenario::load_scenario;
use crate::scenario::run_scenario;
use crate::scenario::StepReport;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_help();
        return Ok(());
    };

    match command.as_str() {
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("parrot-nav {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "run" => {
            let opts = parse_run_args(args.collect::<Vec<_>>())?;
            run_command(opts)
        }
        "replay" => {
            let Some(path) = args.next() else {
                return Err("replay requires a journal path".into());
            };
            replay_command(PathBuf::from(path))
        }
        "tabs" => {
            let (role, has_space) = parse_tabs_args(args.collect::<Vec<_>>())?;
            tabs_command(role, has_space)
        }
        _ => {
            print_help();
            Err(format!("unknown command: {command}").into())
        }
    }
}

#[derive(Debug, Default)]
struct RunOptions {
    scenario: Option<PathBuf>,
    config: Option<PathBuf>,
    journal: Option<PathBuf>,
    json: bool,
}

fn parse_run_args(args: Vec<String>) -> Result<RunOptions, Box<dyn std::error::Error>> {
    let mut opts = RunOptions::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--config requires a path".into());
                };
                opts.config = Some(PathBuf::from(value));
                i += 2;
            }
            "--journal" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--journal requires a path".into());
                };
                opts.journal = Some(PathBuf::from(value));
                i += 2;
            }
            "--json" => {
                opts.json = true;
                i += 1;
            }
            other if other.starts_with("--") => {
                return Err(format!("unsupported argument: {other}").into());
            }
            other => {
                if opts.scenario.is_some() {
                    return Err(format!("unexpected argument: {other}").into());
                }
                opts.scenario = Some(PathBuf::from(other));
                i += 1;
            }
        }
    }
    Ok(opts)
}

fn parse_tabs_args(args: Vec<String>) -> Result<(Role, bool), Box<dyn std::error::Error>> {
    let mut role = None;
    let mut has_space = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--role" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--role requires a value".into());
                };
                role = Some(value.parse::<Role>()?);
                i += 2;
            }
            "--space" => {
                has_space = true;
                i += 1;
            }
            other => {
                return Err(format!("unsupported argument: {other}").into());
            }
        }
    }
    let Some(role) = role else {
        return Err("tabs requires --role".into());
    };
    Ok((role, has_space))
}

fn load_config(explicit: Option<PathBuf>) -> Result<NavConfig, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        return Ok(NavConfig::load(path)?);
    }
    match default_config_path() {
        Some(path) if path.exists() => Ok(NavConfig::load(path)?),
        _ => Ok(NavConfig::default()),
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("parrot-nav").join("config.toml"))
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // Logs go to stderr so `--json` output stays parseable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_command(opts: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let Some(scenario_path) = opts.scenario else {
        return Err("run requires a scenario file".into());
    };
    let config = load_config(opts.config)?;
    init_tracing(&config.log.default_filter);

    let scenario = load_scenario(&scenario_path)?;
    let mut journal = match opts.journal {
        Some(path) => Some(NavJournal::open(path)?),
        None => None,
    };
    let reports = run_scenario(&config, &scenario, journal.as_mut())?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }
    if let Some(journal) = journal {
        tracing::info!(path = %journal.path().display(), "journal updated");
    }
    Ok(())
}

fn print_report(report: &StepReport) {
    println!("{}", report.step);
    for op in &report.router {
        println!("  {:<7} {}", op.label(), op.url());
    }
    if report.signed_out {
        println!("  redirect to sign-in");
    }
    let space = report.space.as_ref().map_or("-", |space| space.as_str());
    println!(
        "  => tab={} space={} url={}",
        report.tab,
        space,
        report.url.as_deref().unwrap_or("-")
    );
}

fn replay_command(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("warn");
    if !path.exists() {
        return Err(format!("journal not found: {}", path.display()).into());
    }
    let journal = NavJournal::open(&path)?;
    let records = journal.load()?;
    println!("records: {}", records.len());
    match replay_journal(&records) {
        Some(nav) => {
            let space = nav.current_space_id.as_ref().map_or("-", |space| space.as_str());
            println!("tab={} space={}", nav.active_tab, space);
        }
        None => println!("no settled navigation"),
    }
    Ok(())
}

fn tabs_command(role: Role, has_space: bool) -> Result<(), Box<dyn std::error::Error>> {
    for tab in visible_tabs(role, has_space) {
        println!("{:<18} {}", tab.as_str(), tab.label());
    }
    Ok(())
}

fn print_help() {
    println!("parrot-nav {}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  parrot-nav run SCENARIO.yaml [--config PATH] [--journal PATH] [--json]");
    println!("  parrot-nav replay JOURNAL.jsonl");
    println!("  parrot-nav tabs --role ROLE [--space]");
    println!("  parrot-nav --help");
    println!("  parrot-nav --version");
}
