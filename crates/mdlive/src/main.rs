use anyhow::Context;
use clap::Parser;
use mdlive_core::pipeline::RenderPipeline;
use mdlive_core::watcher::{FileWatcher, WatcherConfig};
use mdlive_server::{AppState, ChromiumFlattener, Flattener};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[clap(name = "mdlive", version, about)]
pub struct Args {
    /// Path to the markdown file to preview.
    file: PathBuf,

    /// Theme name overriding the document's own theme selection.
    #[clap(long)]
    theme: Option<String>,

    /// Port to listen on.
    #[clap(long, default_value_t = 3000)]
    port: u16,

    /// Directory containing theme profiles and their static assets.
    #[clap(long, default_value = "themes")]
    themes_dir: PathBuf,

    /// Open the preview in the default browser after startup.
    #[clap(long)]
    open: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    // A missing tracked file is a configuration error; fail with a remedy
    // before anything binds.
    if !args.file.exists() {
        eprintln!("Error: file '{}' not found!", args.file.display());
        eprintln!("Please provide a valid markdown file path, e.g. `mdlive README.md`.");
        std::process::exit(1);
    }
    let file = args
        .file
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", args.file.display()))?;

    let pipeline = Arc::new(RenderPipeline::new(
        file.clone(),
        args.themes_dir.clone(),
        args.theme.clone(),
    ));

    let watcher = FileWatcher::new(&file, WatcherConfig::default())
        .map_err(|err| anyhow::anyhow!("Failed to watch {}: {err}", file.display()))?;
    let updates = mdlive_server::spawn_dispatcher(pipeline.clone(), watcher.subscribe());

    let flattener: Option<Arc<dyn Flattener>> = match ChromiumFlattener::new() {
        Ok(flattener) => Some(Arc::new(flattener)),
        Err(err) => {
            tracing::warn!(%err, "PDF export disabled");
            None
        }
    };

    let state = AppState {
        pipeline,
        updates,
        flattener,
        port: args.port,
    };

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port))
        .await
        .with_context(|| format!("Failed to bind port {}", args.port))?;
    let url = format!("http://127.0.0.1:{}", args.port);

    tracing::info!("Previewing {}", file.display());
    tracing::info!("Server running at {url}");

    if args.open {
        if let Err(err) = webbrowser::open(&url) {
            tracing::warn!(%err, "Failed to open browser");
        }
    }

    mdlive_server::serve(listener, state).await?;

    Ok(())
}
