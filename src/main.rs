use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use litreview::config::{self, Config, LogFormat, LoggingConfig};
use litreview::session::{ExportDocument, ReviewController};
use litreview::ui::{self, Spinner, Status};
use litreview::utils::{is_terminal, terminal_width, HttpClient};
use litreview::{repl, HttpBackend};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// litreview - question to abstract, PubMed search string and papers
#[derive(Parser, Debug)]
#[command(name = "litreview")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal client for an AI literature review backend", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v debug, -vv trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors and hide progress spinners
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (default http://localhost:5000)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Request timeout in seconds (default: none)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Directory for papers.zip and research-results.json
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text with access links
    Plain,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive review session (default)
    Interactive,

    /// Generate an abstract for a research question
    Abstract {
        /// Research question (must contain a question mark)
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Generate a PubMed search string for a research question
    #[command(name = "search-string")]
    SearchString {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Count PubMed results for a search string
    Count {
        #[arg(required = true, num_args = 1..)]
        search_string: Vec<String>,
    },

    /// Find papers for a search string, grouped by availability
    Papers {
        #[arg(required = true, num_args = 1..)]
        search_string: Vec<String>,

        /// Page to show (1-based, clamped to the last page)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Also write research-results.json
        #[arg(long)]
        export: bool,

        /// Also bulk download available papers to papers.zip
        #[arg(long)]
        download: bool,
    },

    /// Run question to papers in one go, stopping at the first error
    Run {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Also write research-results.json
        #[arg(long)]
        export: bool,

        /// Also bulk download available papers to papers.zip
        #[arg(long)]
        download: bool,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Target path (default: user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

/// Print all available environment variables
fn print_env_vars() {
    println!("litreview - Environment Variables");
    println!();
    for (name, description) in config::ENV_VARS {
        println!("  {:<38} {}", name, description);
    }
    println!();
    println!("Example:");
    println!("  export LITREVIEW_BACKEND__BASE_URL=\"http://review.internal:5000\"");
}

fn init_tracing(cli: &Cli, logging: &LoggingConfig) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("litreview={}", level)));

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn build_controller(config: &Config) -> Result<ReviewController> {
    let mut client = HttpClient::builder().timeout(config.backend.timeout());
    if let Some(agent) = &config.backend.user_agent {
        client = client.user_agent(agent.clone());
    }
    let client = client.build().context("Failed to create HTTP client")?;
    let backend = HttpBackend::new(client, config.backend.base_url.clone());

    tracing::debug!(backend = %backend.base_url(), "Using review backend");

    Ok(ReviewController::new(Arc::new(backend)).with_output_dir(config.output.directory.clone()))
}

/// Await a controller step with a spinner unless quiet
async fn step<T, E, F>(quiet: bool, msg: &str, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    let spinner = (!quiet).then(|| Spinner::new(msg));
    let result = fut.await;
    if let Some(spinner) = spinner {
        spinner.finish();
    }
    result.map_err(|e| anyhow::anyhow!("{}", e))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_papers(controller: &ReviewController, format: OutputFormat) -> Result<()> {
    let state = controller.state();
    match format {
        OutputFormat::Json => print_json(&state.papers)?,
        OutputFormat::Plain => println!("{}", ui::render_papers(state, terminal_width())),
        OutputFormat::Table | OutputFormat::Auto => {
            println!("{}", ui::render_partition_summary(&state.papers));
            println!("{}", ui::render_paper_tables(state, terminal_width()));
        }
    }
    Ok(())
}

/// `--export` / `--download` follow-ups shared by `papers` and `run`
async fn finish_outputs(
    controller: &mut ReviewController,
    cli_quiet: bool,
    format: OutputFormat,
    export: bool,
    download: bool,
) -> Result<()> {
    if export {
        let path = controller
            .export()
            .context("Failed to write research-results.json")?;
        if format != OutputFormat::Json {
            ui::print_status(Status::Success, &format!("Exported to {}", path.display()));
        }
    }

    if download {
        let outcome = step(
            cli_quiet,
            "Preparing bulk download...",
            controller.bulk_download(),
        )
        .await?;
        if format != OutputFormat::Json {
            println!("{}", ui::render_download(&outcome));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show environment variables and exit if requested
    if cli.env {
        print_env_vars();
        return Ok(());
    }

    let mut config = config::load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&cli, &config.logging);
    config
        .apply_overrides(cli.backend_url.clone(), cli.timeout, cli.output_dir.clone())
        .context("Invalid command line option")?;

    let format = cli.output.resolve();
    let quiet = cli.quiet;

    match cli.command {
        None | Some(Commands::Interactive) => {
            let mut controller = build_controller(&config)?;
            ui::print_banner();
            repl::run(&mut controller, terminal_width())
                .await
                .context("Interactive session failed")?;
        }

        Some(Commands::Abstract { question }) => {
            let mut controller = build_controller(&config)?;
            controller.set_question(question.join(" "));
            step(quiet, "Generating abstract...", controller.generate_abstract()).await?;

            let generated = &controller.state().generated_abstract;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "abstract": generated.content }))?,
                _ => println!("{}", ui::render_abstract(generated, terminal_width())),
            }
        }

        Some(Commands::SearchString { question }) => {
            let mut controller = build_controller(&config)?;
            controller.set_question(question.join(" "));
            step(
                quiet,
                "Generating search string...",
                controller.generate_search_string(),
            )
            .await?;

            let search_string = &controller.state().search_string;
            match format {
                OutputFormat::Json => {
                    print_json(&serde_json::json!({ "search_string": search_string }))?
                }
                _ => println!("{}", ui::render_search_string(search_string)),
            }
        }

        Some(Commands::Count { search_string }) => {
            let mut controller = build_controller(&config)?;
            controller.edit_search_string(search_string.join(" "));
            let count = step(quiet, "Searching PubMed...", controller.search_pubmed()).await?;

            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "result_count": count }))?,
                _ => println!("{}", ui::render_result_count(Some(count))),
            }
        }

        Some(Commands::Papers {
            search_string,
            page,
            export,
            download,
        }) => {
            let mut controller = build_controller(&config)?;
            controller.edit_search_string(search_string.join(" "));
            step(quiet, "Finding papers...", controller.find_pdfs()).await?;
            while controller.state().page < page {
                let before = controller.state().page;
                if controller.next_page() == before {
                    break;
                }
            }

            print_papers(&controller, format)?;
            finish_outputs(&mut controller, quiet, format, export, download).await?;
        }

        Some(Commands::Run {
            question,
            export,
            download,
        }) => {
            let mut controller = build_controller(&config)?;
            step(
                quiet,
                "Running review pipeline...",
                controller.run_pipeline(question.join(" ")),
            )
            .await?;

            let state = controller.state();
            if format == OutputFormat::Json {
                print_json(&ExportDocument::from_state(state))?;
            } else {
                let width = terminal_width();
                println!("{}", ui::render_abstract(&state.generated_abstract, width));
                println!("{}", ui::render_search_string(&state.search_string));
                println!("{}", ui::render_result_count(state.result_count));
                print_papers(&controller, format)?;
            }
            finish_outputs(&mut controller, quiet, format, export, download).await?;
        }

        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { path, force } => {
                let path = path
                    .or_else(config::default_config_path)
                    .unwrap_or_else(|| PathBuf::from(config::LOCAL_CONFIG_FILE));
                if path.exists() && !force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }
                Config::default()
                    .save(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                ui::print_status(Status::Success, &format!("Wrote {}", path.display()));
            }
            ConfigAction::Show => {
                print!("{}", config.to_toml()?);
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["litreview"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert_eq!(cli.output, OutputFormat::Auto);
        assert!(cli.timeout.is_none());
        assert!(cli.backend_url.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["litreview", "-vv"]);
        assert_eq!(cli.verbose, 2);

        let cli = Cli::parse_from(["litreview", "--verbose"]);
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_cli_global_overrides() {
        let cli = Cli::parse_from([
            "litreview",
            "count",
            "eczema",
            "--backend-url",
            "http://10.0.0.2:5000",
            "--timeout",
            "90",
            "--output-dir",
            "out",
            "-o",
            "json",
        ]);
        assert_eq!(cli.backend_url.as_deref(), Some("http://10.0.0.2:5000"));
        assert_eq!(cli.timeout, Some(90));
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_cli_abstract_joins_words() {
        let cli = Cli::parse_from(["litreview", "abstract", "What", "is", "eczema?"]);
        match cli.command {
            Some(Commands::Abstract { question }) => {
                assert_eq!(question.join(" "), "What is eczema?");
            }
            _ => panic!("Expected Abstract command"),
        }
    }

    #[test]
    fn test_cli_papers_command() {
        let cli = Cli::parse_from([
            "litreview",
            "papers",
            "eczema[MeSH]",
            "--page",
            "2",
            "--export",
            "--download",
        ]);
        match cli.command {
            Some(Commands::Papers {
                search_string,
                page,
                export,
                download,
            }) => {
                assert_eq!(search_string, vec!["eczema[MeSH]"]);
                assert_eq!(page, 2);
                assert!(export);
                assert!(download);
            }
            _ => panic!("Expected Papers command"),
        }
    }

    #[test]
    fn test_cli_search_string_command() {
        let cli = Cli::parse_from(["litreview", "search-string", "Does", "dupilumab", "help?"]);
        assert!(matches!(cli.command, Some(Commands::SearchString { .. })));
    }

    #[test]
    fn test_cli_run_command() {
        let cli = Cli::parse_from(["litreview", "run", "What is eczema?", "--export"]);
        match cli.command {
            Some(Commands::Run {
                question,
                export,
                download,
            }) => {
                assert_eq!(question, vec!["What is eczema?"]);
                assert!(export);
                assert!(!download);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_config_commands() {
        let cli = Cli::parse_from(["litreview", "config", "init", "/tmp/lr.toml", "--force"]);
        match cli.command {
            Some(Commands::Config {
                action: ConfigAction::Init { path, force },
            }) => {
                assert_eq!(path, Some(PathBuf::from("/tmp/lr.toml")));
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }

        let cli = Cli::parse_from(["litreview", "config", "show"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Show
            })
        ));
    }

    #[test]
    fn test_cli_missing_question_is_error() {
        assert!(Cli::try_parse_from(["litreview", "abstract"]).is_err());
    }

    #[test]
    fn test_output_format_resolve_explicit() {
        assert_eq!(OutputFormat::Json.resolve(), OutputFormat::Json);
        assert_eq!(OutputFormat::Plain.resolve(), OutputFormat::Plain);
    }
}
