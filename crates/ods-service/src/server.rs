//! HTTP server for the order & delivery API.
//!
//! Every resource route is nested under `/api`; `/health` sits at the root.

use crate::apis::{delivery, order, payment, product, user};
use axum::{
	extract::DefaultBodyLimit,
	http::{HeaderValue, StatusCode},
	response::Json,
	routing::{get, post, put},
	Router,
};
use ods_config::{ApiConfig, CorsConfig};
use ods_core::ShopEngine;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
	cors::{Any, CorsLayer},
	timeout::TimeoutLayer,
	trace::TraceLayer,
};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Engine executing every operation.
	pub engine: ShopEngine,
}

/// Builds the application router with its middleware stack.
pub fn build_router(engine: ShopEngine, api_config: &ApiConfig) -> Router {
	let api = Router::new()
		.route("/orders", post(order::place_order))
		.route("/orders/{id}", get(order::get_order))
		.route("/orders/user/{user_id}", get(order::list_user_orders))
		.route("/orders/{id}/cancel", put(order::cancel_order))
		.route("/orders/{id}/accept", put(order::accept_order))
		.route(
			"/orders/{id}/assign/{agent_id}",
			put(delivery::assign_delivery),
		)
		.route("/orders/{id}/status", put(order::update_status))
		.route("/delivery/{order_id}", get(delivery::track_delivery))
		.route("/delivery/{order_id}/update", put(delivery::update_delivery))
		.route("/products", post(product::create_product))
		.route(
			"/products/{id}",
			get(product::get_product)
				.put(product::update_product)
				.delete(product::delete_product),
		)
		.route("/payments", post(payment::initiate_payment))
		.route("/payments/{id}", get(payment::get_payment))
		.route("/payments/{id}/confirm", put(payment::confirm_payment))
		.route("/users/{id}", get(user::get_user));

	Router::new()
		.route("/health", get(health))
		.nest("/api", api)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(TimeoutLayer::with_status_code(
					StatusCode::REQUEST_TIMEOUT,
					Duration::from_secs(api_config.timeout_seconds),
				))
				.layer(cors_layer(api_config.cors.as_ref()))
				.layer(DefaultBodyLimit::max(api_config.max_request_size)),
		)
		.with_state(AppState { engine })
}

/// Permissive unless specific origins are configured.
fn cors_layer(cors: Option<&CorsConfig>) -> CorsLayer {
	let Some(cors) = cors else {
		return CorsLayer::permissive();
	};

	let origins: Vec<HeaderValue> = cors
		.allowed_origins
		.iter()
		.filter_map(|origin| match origin.parse() {
			Ok(value) => Some(value),
			Err(_) => {
				tracing::warn!(%origin, "Ignoring invalid CORS origin");
				None
			},
		})
		.collect();

	CorsLayer::new()
		.allow_origin(origins)
		.allow_methods(Any)
		.allow_headers(Any)
}

/// Handles GET /health.
async fn health() -> Json<serde_json::Value> {
	Json(serde_json::json!({
		"status": "healthy",
		"service": "ods",
	}))
}

/// Starts the HTTP server and serves until the listener fails.
pub async fn start_server(
	api_config: ApiConfig,
	engine: ShopEngine,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = build_router(engine, &api_config);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Order & delivery API listening on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}
