//! Push server: one WebSocket client plus a status endpoint.
//!
//! - `GET /ws` upgrades to a WebSocket; the newest connection replaces any
//!   previous one as the single recipient of pass results
//! - `GET /status` returns the current [`PassStatus`] as JSON
//! - everything else is served from the optional UI directory

use crate::dev::{DevConfig, SharedState};
use crate::error::{CliError, Result};
use crate::ui;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Json, Router,
};
use solhmr::PassStatus;
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

pub struct DevServer {
    config: DevConfig,
    state: SharedState,
}

impl DevServer {
    pub fn new(config: DevConfig, state: SharedState) -> Self {
        Self { config, state }
    }

    /// Bind the configured address and serve until the task is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn start(self) -> Result<()> {
        let addr = self.config.addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        ui::success(&format!(
            "Push server listening at {}",
            self.config.ws_url()
        ));
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let app = router(self.state, self.config.ui_dir.as_deref());
        axum::serve(listener, app)
            .await
            .map_err(|e| CliError::Server(e.to_string()))
    }
}

/// Build the axum router.
pub fn router(state: SharedState, ui_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .route("/ws", get(handle_ws))
        .route("/status", get(handle_status));

    if let Some(dir) = ui_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn handle_status(State(state): State<SharedState>) -> Json<PassStatus> {
    Json(state.status())
}

async fn handle_ws(ws: WebSocketUpgrade, State(state): State<SharedState>) -> Response {
    ws.on_upgrade(move |socket| client_session(socket, state))
}

/// Forward pass results to one client until it leaves or is replaced.
async fn client_session(mut socket: WebSocket, state: SharedState) {
    let (id, mut outgoing) = state.subscribers().attach();
    let count = state.record_connection();
    tracing::info!("client {} connected ({} so far)", id, count);

    loop {
        tokio::select! {
            message = outgoing.recv() => match message {
                Some(text) => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                // A newer client took the slot.
                None => {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    state.subscribers().detach(id);
    tracing::info!("client {} disconnected", id);
}

/// Open `url` in the default browser.
pub fn open_browser(url: &str) {
    use std::process::Command;

    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => ui::info(&format!("Opened browser at {}", url)),
        Err(e) => ui::warning(&format!("Failed to open browser: {}", e)),
    }
}
