//! HTTP/websocket server for mdlive.
//!
//! Routes:
//! - `/` - viewer page; upgrades to the websocket broadcast stream
//! - `/pdf` - flatten the current rendering into a themed PDF
//! - `/themes/*` - read-only static assets from the themes directory

pub mod dispatch;
pub mod export;
pub mod page;
pub mod pdf;
pub mod state;
pub mod ws;

pub use dispatch::spawn_dispatcher;
pub use pdf::{ChromiumFlattener, ExportError, Flattener};
pub use state::AppState;

use axum::extract::Extension;
use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;

/// Assemble the application router.
pub fn router(state: AppState) -> Router {
    let themes_dir = state.pipeline.themes_dir().to_path_buf();
    Router::new()
        .route("/", get(ws::ws_handler))
        .route("/pdf", get(export::pdf_handler))
        .nest_service("/themes", ServeDir::new(themes_dir))
        .layer(Extension(state))
}

/// Serve the application until the listener closes.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> std::io::Result<()> {
    tracing::debug!("Listening on {listener:?}");
    axum::serve(listener, router(state).into_make_service()).await
}
