use crate::provider::ProviderRegistry;
use crate::{Config, ConfigSources, SecretInjectError};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use colored::Colorize;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "SECRETINJECT_LOG";

/// Main CLI structure for the secretinject application.
#[derive(Parser)]
#[command(name = "secretinject")]
#[command(about = "Inject secret values into YAML manifests", long_about = None)]
#[command(version)]
struct Cli {
    /// Log progress to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// The subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every placeholder in the manifests at PATH and print them
    Generate {
        /// Manifest file, or directory searched recursively for YAML files
        path: PathBuf,
        /// Configuration file (YAML, JSON, TOML or envfile)
        #[arg(short, long)]
        config_path: Option<PathBuf>,
        /// Name of a mounted configuration secret
        #[arg(short, long)]
        secret_name: Option<String>,
        /// Provider backend to use
        #[arg(short, long, env = "SECRETINJECT_PROVIDER")]
        provider: Option<String>,
    },
    /// List available provider backends
    Providers,
}

/// Installs the stderr log subscriber.
///
/// `SECRETINJECT_LOG` takes precedence; otherwise `-v` enables `info` and
/// `-vv` enables `debug` for this crate.
fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "secretinject=info,secretinject_core=info,warn",
        2 => "secretinject=debug,secretinject_core=debug,warn",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(verbose > 1),
        )
        .with(filter)
        .init();
}

pub fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            path,
            config_path,
            secret_name,
            provider,
        } => {
            let sources = ConfigSources {
                config_path,
                secret_name,
                provider,
            };
            let config = Config::load(&sources).wrap_err("Failed to load configuration")?;

            let output = match crate::generate(&path, &config) {
                Ok(output) => output,
                Err(SecretInjectError::Unresolved(unresolved)) => {
                    let count: usize = unresolved.iter().map(|(_, errors)| errors.len()).sum();
                    eprintln!(
                        "{} {} placeholder(s) could not be resolved:",
                        "✗".red(),
                        count.to_string().red()
                    );
                    for (location, errors) in &unresolved {
                        for error in errors {
                            eprintln!("  {} {}", location.bold(), error);
                        }
                    }
                    return Err(eyre!("No manifests were written"));
                }
                Err(e) => {
                    return Err(e)
                        .wrap_err_with(|| format!("Failed to generate {}", path.display()));
                }
            };

            let mut stdout = io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .wrap_err("Failed to write manifests")?;
            stdout.flush()?;
            Ok(())
        }
        Commands::Providers => {
            println!("Available providers:");
            for info in ProviderRegistry::providers() {
                println!("  {} {}", "•".green(), info.display_with_examples());
            }
            Ok(())
        }
    }
}
