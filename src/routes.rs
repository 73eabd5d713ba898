use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::RequestBodyTimeoutLayer, trace::TraceLayer};
use tracing::{event, Instrument, Level};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    cqrs::{CommandHandler, NotifyOrderCommand},
    state::AppState,
};

const ORDER_SENT: &str = "Order notification received and sent to Discord\n";
const DEFAULT_ORDER_SENT: &str = "Empty request handled with default order data and sent to Discord\n";

pub fn router(state: Arc<AppState>, config: &AppConfig) -> Router {
    with_layers(api_routes(state), config)
}

pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))

        .route("/api/order",
            get(order_probe)
            .post(receive_order))

        .with_state(state)
}

/// Tracing, body timeout and CORS for every route, including any merged in by
/// the caller before this is applied.
pub fn with_layers(app: Router, config: &AppConfig) -> Router {
    app
        .layer(
            ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyTimeoutLayer::new(config.request_timeout))
            .layer(CorsLayer::very_permissive().allow_methods([Method::GET, Method::POST]))
        )
}

pub async fn index() -> &'static str {
    "Server is running"
}

/// Liveness probe on the ingestion route. Does no pipeline work.
pub async fn order_probe() -> StatusCode {
    StatusCode::OK
}

pub async fn receive_order(State(state): State<Arc<AppState>>, body: Body) -> Response {
    let span = tracing::info_span!("order", request_id = %Uuid::new_v4());

    async move {
        let body = match to_bytes(body, state.max_body_bytes).await {
            Ok(bytes) => {
                event!(Level::DEBUG, "body: {}", String::from_utf8_lossy(&bytes));
                Some(bytes)
            },
            Err(e) => {
                event!(Level::WARN, "could not read request body, sending default order: {}", e);
                None
            }
        };

        match state.notify_order_command_handler.handle(&NotifyOrderCommand { body: body }).await {
            Ok(response) => {
                event!(Level::INFO, "order {} forwarded", response.order_id);
                if response.defaulted {
                    (StatusCode::OK, DEFAULT_ORDER_SENT).into_response()
                } else {
                    (StatusCode::OK, ORDER_SENT).into_response()
                }
            },
            Err(e) => e.into_response()
        }
    }
    .instrument(span)
    .await
}
