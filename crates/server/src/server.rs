use axum::{
    Router,
    routing::{delete, get, post},
};

use std::sync::Arc;

use crate::{expenses, health, report_pdf, statistics};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health::get_health))
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route("/expenses/stats", get(statistics::get_stats))
        .route("/expenses/summary", get(statistics::get_summary))
        .route("/expenses/report", post(report_pdf::create_report))
        .route("/expenses/{id}", delete(expenses::remove))
        .with_state(state)
}

/// The full HTTP application over `engine`.
pub fn app(engine: Arc<Engine>) -> Router {
    router(ServerState { engine })
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(Arc::new(engine))).await
}
