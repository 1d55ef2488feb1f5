use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use polyglot::connector::api::{Container, ContainerConfig, Router};
use polyglot::{log_directive, Commands};

#[derive(Parser)]
#[command(name = "polyglot")]
#[command(author, version, about = "AI language tutor in the terminal", long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Target language code or name
    #[arg(short, long, global = true, default_value = "es")]
    language: String,

    /// Use canned answers instead of calling Gemini
    #[arg(long, global = true)]
    mock_model: bool,

    /// Maximum attempts per request (1 disables retrying)
    #[arg(long, global = true, default_value = "1")]
    retries: u32,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = EnvFilter::try_new(log_directive(cli.verbose, rust_log.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(log_directive(cli.verbose, None)));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let container = Container::new(ContainerConfig {
        language: cli.language,
        mock_model: cli.mock_model,
        retries: cli.retries,
    })?;
    let router = Router::new(&container);

    let output = router.route(cli.command).await?;
    println!("{}", output);

    Ok(())
}
