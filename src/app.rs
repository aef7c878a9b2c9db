use std::net::SocketAddr;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::{AccountsState, SheetsState};
use crate::{accounts, linkcheck, scan, sheets};

pub fn build_accounts_app(state: AccountsState) -> Router {
    with_http_layers(
        Router::new()
            .merge(accounts::router())
            .route("/health", get(health))
            .with_state(state),
    )
}

pub fn build_sheets_app(state: SheetsState) -> Router {
    with_http_layers(
        Router::new()
            .merge(sheets::router())
            .merge(scan::router())
            .merge(linkcheck::router())
            .route("/health", get(health))
            .with_state(state),
    )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn with_http_layers(router: Router) -> Router {
    router.layer(CorsLayer::permissive()).layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &axum::http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
            })
            .on_response(
                |res: &axum::http::Response<_>,
                 _latency: std::time::Duration,
                 span: &tracing::Span| {
                    let status = res.status();
                    span.record("status", tracing::field::display(status));
                    if status.is_server_error() {
                        tracing::error!(%status, "response");
                    } else {
                        tracing::info!(%status, "response");
                    }
                },
            ),
    )
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
