use std::io::Read;

use clap::builder::ArgAction;
use clap::value_parser;
use tracing_subscriber::EnvFilter;

use dateline::{config, DateExtractor, ExtractorConfig, LlmClient, OllamaClient};

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
struct CliArgs {
    passage: Option<String>,
    model: String,
    temperature: f32,
    base_url: Option<String>,
    pretty: bool,
}

fn build_cli() -> clap::Command {
    clap::Command::new("dateline")
        .about("Extract calendar dates from a free-text passage with a local Ollama model")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            clap::Arg::new("passage")
                .index(1)
                .help("Passage to scan for dates (reads stdin when omitted)"),
        )
        .arg(
            clap::Arg::new("model")
                .short('m')
                .long("model")
                .value_name("name")
                .default_value(config::DEFAULT_MODEL)
                .help("Ollama model identifier, e.g. llama3.1 or mistral:7b"),
        )
        .arg(
            clap::Arg::new("temperature")
                .short('t')
                .long("temperature")
                .value_name("value")
                .value_parser(value_parser!(f32))
                .default_value("0.0")
                .help("Sampling temperature (0 keeps extraction deterministic)"),
        )
        .arg(
            clap::Arg::new("base-url")
                .long("base-url")
                .value_name("url")
                .help("Ollama base URL (default: OLLAMA_HOST or http://localhost:11434)"),
        )
        .arg(
            clap::Arg::new("pretty")
                .long("pretty")
                .help("Pretty-print the JSON output")
                .action(ArgAction::SetTrue),
        )
}

fn matches_to_args(matches: &clap::ArgMatches) -> CliArgs {
    CliArgs {
        passage: matches.get_one::<String>("passage").cloned(),
        model: matches
            .get_one::<String>("model")
            .expect("has default")
            .clone(),
        temperature: *matches
            .get_one::<f32>("temperature")
            .expect("has default"),
        base_url: matches.get_one::<String>("base-url").cloned(),
        pretty: matches.get_flag("pretty"),
    }
}

fn run(args: CliArgs) -> i32 {
    let passage = match args.passage {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
                tracing::error!(error = %e, "Failed to read passage from stdin");
                return 2;
            }
            buffer
        }
    };

    let client = match args.base_url {
        Some(url) => OllamaClient::new(&url, config::DEFAULT_TIMEOUT_SECS),
        None => OllamaClient::from_env(),
    };

    // Advisory only: the chat call is the authority on whether the model
    // actually works, this just produces a friendlier hint up front.
    match client.is_model_available(&args.model) {
        Ok(false) => tracing::warn!(
            model = %args.model,
            "Model not installed; `ollama pull` it first"
        ),
        Err(e) => tracing::debug!(error = %e, "Skipping model availability check"),
        Ok(true) => {}
    }

    let extractor = DateExtractor::new(
        Box::new(client),
        ExtractorConfig {
            model: args.model,
            temperature: args.temperature,
        },
    );

    match extractor.extract(&passage) {
        Some(collection) => {
            let json = if args.pretty {
                serde_json::to_string_pretty(&collection)
            } else {
                serde_json::to_string(&collection)
            }
            .expect("date collection serializes to JSON");
            println!("{json}");
            0
        }
        None => 1,
    }
}

fn main() {
    // Logs go to stderr so stdout stays clean JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("dateline v{} starting", env!("CARGO_PKG_VERSION"));

    let matches = build_cli().get_matches();
    std::process::exit(run(matches_to_args(&matches)));
}
