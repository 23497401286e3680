//! Development server resolving request paths to notes on every request

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::content::{MarkdownRenderer, Slug};
use crate::templates::{self, HIGHLIGHT_CSS};
use crate::Notes;

/// Server state
struct ServerState {
    notes: Notes,
    renderer: MarkdownRenderer,
}

/// Outcome of resolving one request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Found(String),
    NotFound(String),
}

impl ServerState {
    /// Map a URL path to a full HTML page, re-reading the content root
    fn resolve(&self, path: &str) -> Resolved {
        let slug = Slug::from_url_path(path);
        let indexer = self.notes.indexer();
        let tree = indexer.build_directory_tree();
        let title = &self.notes.config.title;

        match indexer.get_post_by_slug(&slug) {
            Some(post) => {
                let body = self.renderer.render_to_html(&post.content);
                Resolved::Found(templates::post_page(title, &post, &body, &tree))
            }
            None => {
                tracing::debug!("No note for {:?}", slug.joined());
                Resolved::NotFound(templates::not_found_page(title, &tree))
            }
        }
    }
}

/// Resolve a single request path without starting a server
pub fn resolve(notes: &Notes, path: &str) -> Resolved {
    ServerState {
        notes: notes.clone(),
        renderer: notes.renderer(),
    }
    .resolve(path)
}

/// Start the development server
pub async fn start(notes: &Notes, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(ServerState {
        notes: notes.clone(),
        renderer: notes.renderer(),
    });

    let app = Router::new()
        .route(&format!("/{}", HIGHLIGHT_CSS), get(css_handler))
        .fallback(page_handler)
        .with_state(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn page_handler(State(state): State<Arc<ServerState>>, uri: Uri) -> Response {
    let path = uri.path().to_string();
    tracing::debug!("GET {}", path);

    // Indexing reads the file system, keep it off the async workers
    match tokio::task::spawn_blocking(move || state.resolve(&path)).await {
        Ok(Resolved::Found(html)) => Html(html).into_response(),
        Ok(Resolved::NotFound(html)) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Request handler failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

async fn css_handler(State(state): State<Arc<ServerState>>) -> Response {
    match state.renderer.theme_css() {
        Ok(css) => ([(header::CONTENT_TYPE, "text/css")], css).into_response(),
        Err(e) => {
            tracing::error!("Failed to generate highlight stylesheet: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}
