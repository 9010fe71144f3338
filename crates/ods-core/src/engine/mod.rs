//! Shop engine holding the storage service, the event bus and the handlers.
//!
//! The engine is cheap to clone; every clone shares the same storage service,
//! so all writers are serialized by its transaction lock.

pub mod event_bus;

use crate::handlers::{
	DeliveryHandler, OrderHandler, PaymentHandler, ProductHandler, UserHandler,
};
use event_bus::EventBus;
use ods_config::Config;
use ods_storage::StorageService;
use std::sync::Arc;

/// Main engine that wires the handlers to a shared storage service.
#[derive(Clone)]
pub struct ShopEngine {
	/// Service configuration.
	config: Arc<Config>,
	/// Storage service for persisting state.
	storage: Arc<StorageService>,
	/// Event bus for lifecycle notifications.
	event_bus: EventBus,
	order_handler: Arc<OrderHandler>,
	delivery_handler: Arc<DeliveryHandler>,
	product_handler: Arc<ProductHandler>,
	payment_handler: Arc<PaymentHandler>,
	user_handler: Arc<UserHandler>,
}

impl ShopEngine {
	/// Creates a new engine over the given storage service.
	pub fn new(config: Config, storage: Arc<StorageService>, event_bus: EventBus) -> Self {
		let order_handler = Arc::new(OrderHandler::new(storage.clone(), event_bus.clone()));
		let delivery_handler = Arc::new(DeliveryHandler::new(storage.clone(), event_bus.clone()));
		let product_handler = Arc::new(ProductHandler::new(storage.clone()));
		let payment_handler = Arc::new(PaymentHandler::new(storage.clone(), event_bus.clone()));
		let user_handler = Arc::new(UserHandler::new(storage.clone()));

		Self {
			config: Arc::new(config),
			storage,
			event_bus,
			order_handler,
			delivery_handler,
			product_handler,
			payment_handler,
			user_handler,
		}
	}

	/// Returns a reference to the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns a reference to the storage service.
	pub fn storage(&self) -> &Arc<StorageService> {
		&self.storage
	}

	/// Returns a reference to the event bus.
	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	pub fn orders(&self) -> &OrderHandler {
		&self.order_handler
	}

	pub fn deliveries(&self) -> &DeliveryHandler {
		&self.delivery_handler
	}

	pub fn products(&self) -> &ProductHandler {
		&self.product_handler
	}

	pub fn payments(&self) -> &PaymentHandler {
		&self.payment_handler
	}

	pub fn users(&self) -> &UserHandler {
		&self.user_handler
	}
}
