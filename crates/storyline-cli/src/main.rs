//! `storyline` command line entry point

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use storyline_cli::{init_logging, load_config, load_pool, render_text, LogFormat, TraceReport};
use storyline_compose::{ComposeConfig, Composer, SeedOption, TracingObserver};
use storyline_scenario::validate_pool;

fn cli() -> Command {
    let pool = Arg::new("pool")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Scenario pool (.yaml, .yml or .json)");

    Command::new("storyline")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compose one consistent test trace from a pool of scenarios")
        .subcommand_required(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("info")
                .help("Default log level; RUST_LOG overrides it"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(["text", "json"])
                .help("Log line format on stderr"),
        )
        .subcommand(
            Command::new("compose")
                .about("Search for a trace covering every scenario")
                .arg(pool.clone())
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML file with engine settings"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("'none', 'new' or a fixed seed; overrides the config file"),
                )
                .arg(
                    Arg::new("drought-limit")
                        .long("drought-limit")
                        .value_parser(value_parser!(usize))
                        .help("Insertions without new coverage before a forced rewind"),
                )
                .arg(
                    Arg::new("max-iterations")
                        .long("max-iterations")
                        .value_parser(value_parser!(usize))
                        .help("Iteration bound per search pass"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the trace as JSON"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate step metadata without searching")
                .arg(pool),
        )
}

fn compose(args: &ArgMatches) -> Result<()> {
    let pool_path = args.get_one::<PathBuf>("pool").context("missing pool argument")?;
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => load_config(path)?,
        None => ComposeConfig::default(),
    };
    if let Some(seed) = args.get_one::<String>("seed") {
        config = config.with_seed(SeedOption::parse(seed));
    }
    if let Some(&limit) = args.get_one::<usize>("drought-limit") {
        config = config.with_drought_limit(limit);
    }
    if let Some(&max) = args.get_one::<usize>("max-iterations") {
        config = config.with_max_iterations(max);
    }

    let scenarios = load_pool(pool_path)?;
    let composition = Composer::new(config)
        .with_observer(TracingObserver)
        .compose(&scenarios)
        .with_context(|| format!("composing {}", pool_path.display()))?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&TraceReport::new(&composition))?);
    } else {
        print!("{}", render_text(&composition));
    }
    Ok(())
}

fn check(args: &ArgMatches) -> Result<()> {
    let pool_path = args.get_one::<PathBuf>("pool").context("missing pool argument")?;
    let scenarios = load_pool(pool_path)?;
    validate_pool(&scenarios)?;
    println!("{}: {} scenarios, step metadata valid", pool_path.display(), scenarios.len());
    Ok(())
}

fn run() -> Result<()> {
    let matches = cli().get_matches();

    let level = matches.get_one::<String>("log-level").map_or("info", String::as_str);
    let format: LogFormat = matches
        .get_one::<String>("log-format")
        .map_or("text", String::as_str)
        .parse()?;
    init_logging(level, format)?;

    match matches.subcommand() {
        Some(("compose", args)) => compose(args),
        Some(("check", args)) => check(args),
        _ => Ok(()),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
