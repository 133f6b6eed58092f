use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forecastai::report::ResultView;

/// Parse a result view from string
fn parse_result_view(s: &str) -> Result<ResultView, String> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "forecastai")]
#[command(
    version,
    about = "CSV-to-forecast pipeline client for a remote analysis service"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a CSV file and run the full forecasting pipeline
    Run {
        #[arg(help = "Path to the CSV file")]
        file: PathBuf,
        #[arg(long, short, help = "Target column to forecast")]
        target: Option<String>,
        #[arg(long, short, help = "Date column (defaults to 'date')")]
        date: Option<String>,
        #[arg(long, short = 'y', help = "Skip confirmation prompts")]
        yes: bool,
    },

    /// Continue a stored pipeline from where it stopped
    Resume,

    /// Show the stored pipeline flow
    Status {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Render stored training results
    Report {
        #[arg(long, value_parser = parse_result_view, help = "View to render: insights, charts, sanity, plan (default: all)")]
        view: Option<ResultView>,
    },

    /// Clear all stored session state
    Reset,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize a configuration file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mForecastAI encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    use forecastai::cli::commands;

    match cli.command {
        Commands::Run {
            file,
            target,
            date,
            yes,
        } => {
            let config = forecastai::config::ConfigLoader::load()?;
            let rt = Runtime::new()?;
            rt.block_on(commands::run::run(
                &config,
                commands::run::RunOptions {
                    file,
                    target,
                    date,
                    assume_yes: yes,
                },
            ))?;
        }
        Commands::Resume => {
            let config = forecastai::config::ConfigLoader::load()?;
            let rt = Runtime::new()?;
            rt.block_on(commands::resume::run(&config))?;
        }
        Commands::Status { format } => {
            let config = forecastai::config::ConfigLoader::load()?;
            commands::status::run(&config, &format)?;
        }
        Commands::Report { view } => {
            let config = forecastai::config::ConfigLoader::load()?;
            commands::report::run(&config, view)?;
        }
        Commands::Reset => {
            let config = forecastai::config::ConfigLoader::load()?;
            commands::reset::run(&config)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
