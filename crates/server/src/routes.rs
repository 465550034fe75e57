use axum::{routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::car::CarService;

pub mod cars;

/// State shared by every handler for the lifetime of the process.
#[derive(Clone)]
pub struct ServerState {
    pub cars: CarService,
}

impl ServerState {
    pub fn new(cars: CarService) -> Self {
        Self { cars }
    }
}

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Build the application router: health probe plus the five car routes.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/cars", get(cars::list_cars).post(cars::create_car))
        .route(
            "/cars/:name",
            get(cars::get_car).put(cars::update_car).delete(cars::delete_car),
        )
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
