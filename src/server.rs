//! HTTP surface: `GET /`, `GET /health`, `POST /review`, `POST /chat`.

use std::convert::Infallible;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::json;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::{Filter, Rejection, Reply};

use crate::config::{AppConfig, ServerConfig};
use crate::errors::{AppError, ReviewError};
use crate::handlers::{ChatService, ReviewService};
use crate::types::chat::ChatRequest;
use crate::types::review::ReviewRequest;

/// Services shared by every request.
pub struct AppState {
    pub review: ReviewService,
    pub chat: ChatService,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            review: ReviewService::from_config(&config.tools),
            chat: ChatService::new(config.chat.clone()),
        }
    }
}

/// Lenient body decoding: anything that is not the expected JSON object is
/// treated as an empty request and left to validation.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::debug!("Ignoring malformed request body: {}", e);
        T::default()
    })
}

async fn handle_review(body: Bytes, state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    let request: ReviewRequest = parse_body(&body);
    let reply = match state.review.review(request).await {
        Ok(result) => warp::reply::with_status(warp::reply::json(&result), StatusCode::OK),
        Err(e @ ReviewError::NoCode) => warp::reply::with_status(
            warp::reply::json(&json!({ "error": e.to_string() })),
            StatusCode::BAD_REQUEST,
        ),
        Err(e) => {
            tracing::error!("Review failed: {}", e);
            warp::reply::with_status(
                warp::reply::json(&json!({ "error": e.to_string() })),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    };
    Ok(reply)
}

async fn handle_chat(body: Bytes, state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    let request: ChatRequest = parse_body(&body);
    let reply = state.chat.respond(&request).await;
    Ok(warp::reply::json(&reply))
}

/// Build the complete filter tree, CORS and access log included.
pub fn routes(
    state: Arc<AppState>,
    server: &ServerConfig,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_state = {
        let state = state.clone();
        warp::any().map(move || state.clone())
    };
    let json_body = warp::body::content_length_limit(server.body_limit).and(warp::body::bytes());

    // GET / and GET /health
    let health = warp::get()
        .and(warp::path::end().or(warp::path("health").and(warp::path::end())).unify())
        .map(|| warp::reply::json(&json!({ "ok": true, "service": "backend" })));

    let review = warp::path("review")
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body.clone())
        .and(with_state.clone())
        .and_then(handle_review);

    let chat = warp::path("chat")
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body)
        .and(with_state)
        .and_then(handle_chat);

    let cors = warp::cors()
        .allow_origins(server.cors_origins.iter().map(String::as_str))
        .allow_credentials(true)
        .allow_methods(["GET", "POST", "OPTIONS"])
        .allow_headers(["content-type"]);

    health
        .or(review)
        .or(chat)
        .with(cors)
        .with(warp::log("code_reviewer::http"))
}

/// Serve until Ctrl-C.
pub async fn serve(config: AppConfig) -> Result<(), AppError> {
    config.validate()?;
    let addr = config.server.socket_addr()?;
    let state = Arc::new(AppState::from_config(&config));

    let (bound, server) = warp::serve(routes(state, &config.server))
        .try_bind_with_graceful_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .map_err(|e| AppError::Server(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Code review service listening on http://{}", bound);
    server.await;
    tracing::info!("Code review service shut down");
    Ok(())
}
