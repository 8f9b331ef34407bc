use anyhow::Result;
use clap::Parser;
use plant_disease_api::{config::Config, web::serve};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plant-disease-api")]
#[command(about = "Plant species and disease prediction service")]
struct Args {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0:8000")]
    bind: String,

    /// Number of worker threads
    #[arg(long)]
    workers: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Model directory path
    #[arg(long, default_value = "model")]
    models_dir: String,

    /// Enable development mode (debug logging)
    #[arg(long)]
    dev: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.dev { "debug" } else { args.log_level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting plant disease prediction service...");
    tracing::info!("Bind address: {}", args.bind);
    tracing::info!("Models directory: {}", args.models_dir);

    let config = Config::new(args.bind, args.models_dir, args.workers)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .enable_all()
        .build()?;

    runtime.block_on(serve(config))?;

    Ok(())
}
