//! Websocket broadcast and the primary view route.

use crate::page;
use crate::state::AppState;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use mdlive_core::pipeline::Update;

/// The handler for the HTTP request. A plain GET serves the viewer page
/// built from the current effective theme; a websocket negotiation upgrades
/// into the broadcast stream.
pub async fn ws_handler(
    ws: Option<WebSocketUpgrade>,
    Extension(state): Extension<AppState>,
) -> impl IntoResponse {
    if let Some(ws) = ws {
        ws.on_upgrade(move |socket| handle_websocket(socket, state))
    } else {
        let theme = state.pipeline.current_theme();
        let logo_url = if theme.logo.is_empty() {
            None
        } else {
            state
                .asset_theme_name()
                .map(|name| format!("/themes/{name}/{}", theme.logo))
        };
        let html = page::build_page(&theme, logo_url.as_deref());
        (StatusCode::OK, Html(html)).into_response()
    }
}

/// One payload per viewer on connect, then the shared broadcast stream.
async fn handle_websocket(mut socket: WebSocket, state: AppState) {
    // Initial sync runs the full pipeline for this connection, so a viewer
    // joining mid-session sees the file as it is on disk right now.
    let initial = state.pipeline.run();
    if send_update(&mut socket, &initial).await.is_err() {
        return;
    }

    let mut updates = state.updates.clone();
    while updates.changed().await.is_ok() {
        let update = updates.borrow_and_update().clone();
        if send_update(&mut socket, &update).await.is_err() {
            break;
        }
    }

    let _ = socket.send(WsMessage::Close(None)).await;
}

fn envelope(update: &Update) -> serde_json::Value {
    match update {
        Update::Content(payload) => serde_json::json!({
            "type": "markdown-update",
            "data": payload,
        }),
        Update::Error(message) => serde_json::json!({
            "type": "error",
            "data": message,
        }),
    }
}

async fn send_update(socket: &mut WebSocket, update: &Update) -> Result<(), axum::Error> {
    socket
        .send(WsMessage::Text(envelope(update).to_string()))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdlive_core::pipeline::BroadcastPayload;
    use mdlive_core::Metadata;

    #[test]
    fn test_content_envelope_shape() {
        let update = Update::Content(BroadcastPayload {
            html: "<p>hi</p>".into(),
            title: "Doc".into(),
            meta: Metadata {
                sensitivity: Some("Internal".into()),
                theme: None,
            },
            revision: 3,
        });
        let value = envelope(&update);
        assert_eq!(value["type"], "markdown-update");
        assert_eq!(value["data"]["title"], "Doc");
        assert_eq!(value["data"]["meta"]["sensitivity"], "Internal");
        assert_eq!(value["data"]["revision"], 3);
    }

    #[test]
    fn test_error_envelope_shape() {
        let value = envelope(&Update::Error("File doc.md not found".into()));
        assert_eq!(value["type"], "error");
        assert_eq!(value["data"], "File doc.md not found");
    }
}
