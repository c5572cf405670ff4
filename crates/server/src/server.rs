use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use std::{any::Any, sync::Arc};

use crate::{ServerError, accounts, transactions};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Builds the API router on top of `engine`.
pub fn router(engine: Arc<Engine>) -> Router {
    let api = Router::new()
        .route("/accounts", post(accounts::create))
        .route("/accounts/{account_id}", get(accounts::get_balance))
        .route("/transactions", post(transactions::create))
        .route("/transactions/", post(transactions::create));

    with_fault_boundary(
        Router::new()
            .nest("/api/v1", api)
            .with_state(ServerState { engine }),
    )
}

/// Per-request tracing, and a panic anywhere below turns into a plain 500.
fn with_fault_boundary(router: Router) -> Router {
    router
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    };

    ServerError::from(EngineError::Internal(format!("handler panicked: {detail}")))
        .into_response()
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine))).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
