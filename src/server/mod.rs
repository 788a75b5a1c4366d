//! Preview server
//!
//! Serves the post listing and individual rendered posts, with static
//! assets (images, video) from the assets directory. Posts are rendered
//! per request, so a change on disk only needs a browser reload; in watch
//! mode connected pages reload themselves over a WebSocket.

use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use crate::config::ViewerConfig;
use crate::content::{fetch_post, load_summaries, LoadError, MarkdownRenderer};
use crate::store::FileStore;
use crate::templates;
use crate::Viewer;

/// Live reload script injected into served pages in watch mode
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    function connect() {
        var ws = new WebSocket('ws://' + location.host + '/__livereload');
        ws.onmessage = function() { location.reload(); };
        ws.onclose = function() { setTimeout(connect, 1000); };
    }
    connect();
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    config: ViewerConfig,
    store: Arc<FileStore>,
    renderer: Arc<MarkdownRenderer>,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    /// Attach the live reload script when watch mode is on
    fn decorate(&self, html: String) -> String {
        if self.live_reload {
            inject_live_reload(&html)
        } else {
            html
        }
    }
}

/// Start the preview server
pub async fn start(viewer: &Viewer, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        config: viewer.config.clone(),
        store: Arc::new(viewer.store()),
        renderer: Arc::new(viewer.renderer()),
        reload_tx: reload_tx.clone(),
        live_reload: watch,
    });

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/posts/:id", get(post_handler))
        .route("/api/posts", get(api_posts_handler))
        .route("/__livereload", get(livereload_handler))
        .fallback_service(ServeDir::new(&viewer.assets_dir))
        .with_state(state);

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Preview running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let content_dir = viewer.content_dir.clone();
        tokio::spawn(async move {
            if let Err(e) = watch_content(content_dir, reload_tx).await {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Post listing page
async fn index_handler(State(state): State<Arc<ServerState>>) -> Response {
    match load_summaries(state.store.as_ref()).await {
        Ok(summaries) => {
            Html(state.decorate(templates::listing_page(&summaries, &state.config)))
                .into_response()
        }
        Err(e) => {
            tracing::error!("failed to list posts: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Single post page; load failures render a non-fatal error page
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Response {
    match fetch_post(state.store.as_ref(), &state.renderer, &id).await {
        Ok(post) => {
            Html(state.decorate(templates::post_page(&post, &state.config))).into_response()
        }
        Err(e) => {
            let status = match e {
                LoadError::MissingId | LoadError::NotFound => StatusCode::NOT_FOUND,
                LoadError::Failed => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let page = state.decorate(templates::error_page(&e.to_string(), &state.config));
            (status, Html(page)).into_response()
        }
    }
}

/// JSON listing of post metadata
async fn api_posts_handler(State(state): State<Arc<ServerState>>) -> Response {
    match load_summaries(state.store.as_ref()).await {
        Ok(summaries) => Json(summaries).into_response(),
        Err(e) => {
            tracing::error!("failed to list posts: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Watch the content directory; any markdown change tells connected pages
/// to reload. Posts render per request, so nothing is regenerated here.
async fn watch_content(content_dir: PathBuf, reload_tx: broadcast::Sender<()>) -> Result<()> {
    if !content_dir.exists() {
        tracing::warn!("Content directory {:?} does not exist; not watching", content_dir);
        return Ok(());
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;
    debouncer
        .watcher()
        .watch(&content_dir, RecursiveMode::Recursive)?;
    tracing::debug!("Watching: {:?}", content_dir);

    while let Ok(result) = rx.recv() {
        let events = match result {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("Watch error: {:?}", e);
                continue;
            }
        };

        let changed_markdown = events
            .iter()
            .map(|e| e.path.as_path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("md"))
            .collect::<Vec<_>>();
        if changed_markdown.is_empty() {
            continue;
        }

        for path in &changed_markdown {
            tracing::info!("Post changed: {}", path.display());
        }
        let _ = reload_tx.send(());
    }

    Ok(())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Push one message per reload signal until the client goes away
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        match reload_rx.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                if socket
                    .send(Message::Text("reload".to_string()))
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
