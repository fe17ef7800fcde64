//! Scout CLI - terminal front end for the research pipeline.
//!
//! One invocation runs one research pass: search, extract, synthesize,
//! render, export. Credential management lives under the `keys` subcommand.

mod session;

use anyhow::{Context, bail};
use clap::Parser;
use scout_core::credentials::resolve_key;
use scout_core::{
    ContentExtractor, CredentialStore, GeminiProvider, KeyringCredentialStore, Language, Region,
    ResearchAgent, ResearchCallback, ResearchOutcome, SearchFilters, SerpApiClient, TimeFilter,
    Tone, load_config,
};
use session::Session;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Scout: automated web research with structured, cited reports
#[derive(Parser, Debug)]
#[command(name = "scout", version, about, long_about = None)]
struct Cli {
    /// Research topic (e.g., "The impact of AI on renewable energy management")
    query: Option<String>,

    /// Report tone: professional, simplified, academic, conversational
    #[arg(long, default_value = "professional")]
    tone: Tone,

    /// Publication date filter: any, past-week, past-month, past-year
    #[arg(long = "time", default_value = "any")]
    time_filter: TimeFilter,

    /// Search region: united-states, india, united-kingdom, germany, australia
    #[arg(long, default_value = "united-states")]
    region: Region,

    /// Search language: english, german, french, spanish
    #[arg(long, default_value = "english")]
    language: Language,

    /// Directory for exported report files
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Skip the PDF export
    #[arg(long)]
    no_pdf: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Manage provider API keys in the OS credential store
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum KeysAction {
    /// Store a provider key (provider: gemini or serpapi)
    Set { provider: String, api_key: String },
    /// Delete a provider key
    Delete { provider: String },
    /// Show which provider keys are configured
    Check,
}

/// Prints phase progress the way the interactive front end narrates a run.
struct ConsoleProgress;

impl ResearchCallback for ConsoleProgress {
    fn on_phase_change(&self, phase: &str) {
        match phase {
            "searching" => println!("Phase 1: Conducting web search..."),
            "synthesizing" => println!("Phase 2: Synthesizing findings..."),
            other => println!("{other}..."),
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "scout=warn,scout_core=warn",
        1 => "scout=info,scout_core=info",
        _ => "scout=debug,scout_core=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn validate_provider(provider: &str) -> anyhow::Result<()> {
    match provider {
        "gemini" | "serpapi" => Ok(()),
        other => bail!("unknown provider '{other}' (expected gemini or serpapi)"),
    }
}

fn manage_keys(action: KeysAction) -> anyhow::Result<()> {
    let store = KeyringCredentialStore::new();
    match action {
        KeysAction::Set { provider, api_key } => {
            validate_provider(&provider)?;
            store.store_key(&provider, &api_key)?;
            println!("Stored key for {provider}.");
        }
        KeysAction::Delete { provider } => {
            validate_provider(&provider)?;
            store.delete_key(&provider)?;
            println!("Deleted key for {provider}.");
        }
        KeysAction::Check => {
            let config = load_config(None).unwrap_or_default();
            for (provider, env_var) in [
                ("serpapi", config.search.api_key_env.as_str()),
                ("gemini", config.llm.api_key_env.as_str()),
            ] {
                let status = if store.has_key(provider) {
                    "credential store"
                } else if std::env::var(env_var).is_ok_and(|v| !v.trim().is_empty()) {
                    "environment"
                } else {
                    "not configured"
                };
                println!("{provider}: {status}");
            }
        }
    }
    Ok(())
}

async fn run_research(cli: Cli, query: &str) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    for warning in config.llm.validate() {
        tracing::warn!("{warning}");
    }

    // Both secrets are resolved before any network activity; a missing key
    // short-circuits the run with a configuration error.
    let store = KeyringCredentialStore::new();
    let search_key = resolve_key(
        &store,
        config.search.credential_store_key.as_deref(),
        &config.search.api_key_env,
        "serpapi",
    )?;
    let llm_key = resolve_key(
        &store,
        config.llm.credential_store_key.as_deref(),
        &config.llm.api_key_env,
        "gemini",
    )?;

    let search = Arc::new(SerpApiClient::new(
        config.search.engine.clone(),
        search_key,
        config.search.base_url.clone(),
    )?);
    let llm = Arc::new(GeminiProvider::new_with_key(&config.llm, llm_key)?);
    let agent = ResearchAgent::new(search, Arc::new(ContentExtractor::new()), llm);

    let filters = SearchFilters {
        time: cli.time_filter,
        region: cli.region,
        language: cli.language,
    };

    let mut session = Session::new();
    session.begin_run();

    let outcome = agent
        .research(query, &filters, cli.tone, Some(Arc::new(ConsoleProgress)))
        .await?;

    match outcome {
        ResearchOutcome::NoSources => {
            println!(
                "Could not find relevant web pages with the selected filters. \
                 Please try a different query or broader filters."
            );
        }
        ResearchOutcome::Report {
            report,
            markdown,
            sources,
        } => {
            session.complete(report, sources);

            println!("\n{markdown}\n");
            if let Some(sources) = &session.current_sources {
                println!("---");
                println!("Source details (referenced in the report as Source 1, Source 2, ...):");
                print!("{}", session::format_source_details(sources));
            }

            let md_path = session::export_markdown(&cli.output, query, &markdown)
                .context("Failed to write the Markdown export")?;
            println!("\nSaved Markdown report to {}", md_path.display());

            if !cli.no_pdf {
                match session::export_pdf(&cli.output, query, &markdown) {
                    Ok(pdf_path) => println!("Saved PDF report to {}", pdf_path.display()),
                    Err(e) => eprintln!("Failed to generate PDF: {e}"),
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(Commands::Keys { action }) = cli.command.take() {
        return manage_keys(action);
    }

    let Some(query) = cli.query.clone().filter(|q| !q.trim().is_empty()) else {
        bail!("Please enter a topic to research.");
    };

    run_research(cli, &query).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_defaults() {
        let cli = Cli::parse_from(["scout", "my topic"]);
        assert_eq!(cli.query.as_deref(), Some("my topic"));
        assert_eq!(cli.tone, Tone::Professional);
        assert_eq!(cli.time_filter, TimeFilter::Any);
        assert_eq!(cli.region, Region::UnitedStates);
        assert_eq!(cli.language, Language::English);
        assert!(!cli.no_pdf);
    }

    #[test]
    fn test_cli_parses_filters() {
        let cli = Cli::parse_from([
            "scout",
            "topic",
            "--tone",
            "academic",
            "--time",
            "past-week",
            "--region",
            "germany",
            "--language",
            "french",
            "--no-pdf",
        ]);
        assert_eq!(cli.tone, Tone::Academic);
        assert_eq!(cli.time_filter, TimeFilter::PastWeek);
        assert_eq!(cli.region, Region::Germany);
        assert_eq!(cli.language, Language::French);
        assert!(cli.no_pdf);
    }

    #[test]
    fn test_cli_rejects_free_text_tone() {
        assert!(Cli::try_parse_from(["scout", "topic", "--tone", "sarcastic"]).is_err());
    }

    #[test]
    fn test_keys_subcommand_parses() {
        let cli = Cli::parse_from(["scout", "keys", "set", "gemini", "abc123"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Keys {
                action: KeysAction::Set { .. }
            })
        ));
    }

    #[test]
    fn test_validate_provider() {
        assert!(validate_provider("gemini").is_ok());
        assert!(validate_provider("serpapi").is_ok());
        assert!(validate_provider("openai").is_err());
    }
}
