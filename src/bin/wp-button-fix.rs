//! Command-line interface for wp-button-fix
//! Applies the button whitespace fix to a saved document, or to a JSON object of post fields.
//!
//! Usage:
//!   wp-button-fix `[path]`                    - Fix a document read from `path` (or stdin) and print it
//!   wp-button-fix --json `[path]`             - Filter a JSON object of post fields
//!   wp-button-fix --check `[path]`            - Print nothing, exit with status 1 if the input would change
//!
//! Diagnostics go to stderr through `tracing`; set `RUST_LOG` or pass `--verbose` to see them.

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wp_button_fix::{
    Error, FileSink, FixConfig, HookPoint, Loader, Pipeline, PostFields, TeeSink, TracingSink,
};

fn cli() -> Command {
    Command::new("wp-button-fix")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rewrite whitespace-only button link text to &nbsp;")
        .arg(
            Arg::new("path")
                .help("Document to fix; reads stdin when absent or '-'")
                .index(1),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Treat the input as a JSON object of post fields")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("hook")
                .long("hook")
                .help("Hook point used with --json")
                .value_parser(["before-persist", "before-insert"])
                .default_value("before-persist"),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Print nothing; exit with status 1 if the input would change")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file layered over the built-in defaults")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Also append diagnostic lines to this file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show diagnostic lines on stderr")
                .action(ArgAction::SetTrue),
        )
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };
    init_tracing(config.logging.verbose);

    match run(&matches, &config) {
        Ok(true) if matches.get_flag("check") => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn load_config(matches: &ArgMatches) -> Result<FixConfig, Error> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        loader = loader.with_file(path);
    }
    if matches.get_flag("verbose") {
        loader = loader.set_override("logging.verbose", true)?;
    }
    if let Some(path) = matches.get_one::<PathBuf>("log-file") {
        loader = loader.set_override("logging.file", path.to_string_lossy().into_owned())?;
    }
    Ok(loader.build()?)
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "wp_button_fix=debug"
    } else {
        "wp_button_fix=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Fix the input and print the result. Returns whether the input changed.
fn run(matches: &ArgMatches, config: &FixConfig) -> Result<bool, Error> {
    let input = read_input(matches.get_one::<String>("path").map(String::as_str))?;
    let pipeline = Pipeline::from_config(config);

    let mut sink = TeeSink::new().with(TracingSink);
    if let Some(path) = &config.logging.file {
        sink = sink.with(FileSink::new(path));
    }

    let (output, changed) = if matches.get_flag("json") {
        let hook = matches
            .get_one::<String>("hook")
            .and_then(|name| HookPoint::from_name(name))
            .unwrap_or(HookPoint::BeforePersist);
        let fields = parse_post_fields(&input)?;
        let filtered = pipeline.filter_post(hook, fields.clone(), &sink);
        let changed = filtered != fields;
        let mut rendered = serde_json::to_string_pretty(&Value::Object(filtered))?;
        rendered.push('\n');
        (rendered, changed)
    } else {
        let fixed = pipeline.apply(&input, &sink);
        let changed = fixed != input.as_str();
        (fixed.into_owned(), changed)
    };

    tracing::info!(changed, "Button whitespace fix finished");
    if !matches.get_flag("check") {
        print!("{}", output);
    }
    Ok(changed)
}

fn read_input(path: Option<&str>) -> Result<String, Error> {
    match path {
        None | Some("-") => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn parse_post_fields(input: &str) -> Result<PostFields, Error> {
    match serde_json::from_str::<Value>(input)? {
        Value::Object(fields) => Ok(fields),
        Value::Array(_) => Err(Error::NotAnObject("an array")),
        Value::String(_) => Err(Error::NotAnObject("a string")),
        Value::Number(_) => Err(Error::NotAnObject("a number")),
        Value::Bool(_) => Err(Error::NotAnObject("a boolean")),
        Value::Null => Err(Error::NotAnObject("null")),
    }
}
