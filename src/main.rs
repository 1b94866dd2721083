use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use session_recorder::{create_router, AppState, Config, SessionRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "session-recorder", about = "Concurrent PCM recording sessions")]
struct Cli {
    /// Config file (without extension)
    #[arg(short, long, default_value = "config/session-recorder")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP control API
    Serve,

    /// Record once for a fixed time and save the result
    Record {
        /// Seconds to record
        #[arg(short, long, default_value_t = 5)]
        seconds: u64,

        /// Output WAV file (relative paths go under the recordings directory)
        #[arg(short, long, default_value = "recording.wav")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;

    info!("Loaded config: {}", cfg.service.name);

    std::fs::create_dir_all(&cfg.recordings.output_dir).with_context(|| {
        format!(
            "Failed to create recordings directory {}",
            cfg.recordings.output_dir
        )
    })?;

    let registry = Arc::new(
        SessionRegistry::new(cfg.capture.backend()?).with_chunk_size(cfg.capture.chunk_size),
    );

    match cli.command {
        Command::Serve => serve(&cfg, Arc::clone(&registry)).await?,
        Command::Record { seconds, output } => {
            let path = cfg.recordings.resolve(output);

            let id = registry.start().await?;
            tokio::time::sleep(Duration::from_secs(seconds)).await;

            registry.stop(id).await?;
            let stats = registry.stats(id).await?;
            registry.save(id, &path).await?;

            info!(
                "Saved {} ({} bytes, {} ms)",
                path.display(),
                stats.bytes_captured,
                stats.duration_ms
            );
        }
    }

    registry.shutdown().await;
    Ok(())
}

async fn serve(cfg: &Config, registry: Arc<SessionRegistry>) -> Result<()> {
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP API listening on {}", addr);

    let app = create_router(AppState::new(registry, &cfg.recordings.output_dir));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}
