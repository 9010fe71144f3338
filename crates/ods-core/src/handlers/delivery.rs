//! Delivery handler for assignment and tracking.
//!
//! A delivery record is created only by assigning an accepted order to an
//! agent. Marking it `delivered` forces the parent order to `delivered` in
//! the same transaction.

use crate::engine::event_bus::EventBus;
use crate::state::{OrderAction, OrderStateMachine};
use crate::ShopError;
use ods_storage::StorageService;
use ods_types::{
	AuthContext, Delivery, DeliveryUpdate, LifecycleEvent, Order, OrderStatus, RecordId, Role,
	StorageKey, User,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for delivery assignment and tracking.
pub struct DeliveryHandler {
	storage: Arc<StorageService>,
	event_bus: EventBus,
}

impl DeliveryHandler {
	pub fn new(storage: Arc<StorageService>, event_bus: EventBus) -> Self {
		Self { storage, event_bus }
	}

	/// Binds an accepted order to a delivery agent. Admin only.
	///
	/// The agent is checked before the order status, so an unknown agent is
	/// reported even for an order in the wrong state.
	#[instrument(skip_all, fields(order_id = order_id, agent_id = agent_id))]
	pub async fn assign_delivery(
		&self,
		auth: &AuthContext,
		order_id: RecordId,
		agent_id: RecordId,
	) -> Result<Delivery, ShopError> {
		auth.require_admin()?;

		let mut tx = self.storage.begin().await;
		let mut order: Order = tx
			.find(StorageKey::Orders.as_str(), order_id)
			.await?
			.ok_or_else(|| ShopError::not_found("Order", order_id))?;

		let agent: Option<User> = tx.find(StorageKey::Users.as_str(), agent_id).await?;
		if !agent.is_some_and(|user| user.role == Role::Delivery) {
			return Err(ShopError::InvalidAgent(agent_id));
		}

		let from = OrderStateMachine::transition(&mut order, OrderAction::Assign)?;
		let delivery = Delivery::assigned(order_id, agent_id);
		tx.store(StorageKey::Deliveries.as_str(), order_id, &delivery)?;
		tx.store(StorageKey::Orders.as_str(), order_id, &order)?;
		tx.commit().await?;

		tracing::info!("Delivery assigned");
		self.event_bus
			.publish(LifecycleEvent::StatusChanged {
				order_id,
				from,
				to: order.status,
			})
			.ok();
		self.event_bus
			.publish(LifecycleEvent::DeliveryAssigned { order_id, agent_id })
			.ok();

		Ok(delivery)
	}

	/// Returns the delivery record of an order.
	pub async fn track_delivery(
		&self,
		_auth: &AuthContext,
		order_id: RecordId,
	) -> Result<Delivery, ShopError> {
		self.storage
			.find(StorageKey::Deliveries.as_str(), order_id)
			.await?
			.ok_or_else(|| ShopError::not_found("Delivery", order_id))
	}

	/// Updates status and location of a delivery. Staff only.
	#[instrument(skip_all, fields(order_id = order_id))]
	pub async fn update_delivery(
		&self,
		auth: &AuthContext,
		order_id: RecordId,
		update: DeliveryUpdate,
	) -> Result<Delivery, ShopError> {
		auth.require_staff()?;

		let mut tx = self.storage.begin().await;
		let mut delivery: Delivery = tx
			.find(StorageKey::Deliveries.as_str(), order_id)
			.await?
			.ok_or_else(|| ShopError::not_found("Delivery", order_id))?;

		update.apply(&mut delivery);
		tx.store(StorageKey::Deliveries.as_str(), order_id, &delivery)?;

		let mut status_change = None;
		if delivery.is_delivered() {
			let mut order: Order = tx
				.find(StorageKey::Orders.as_str(), order_id)
				.await?
				.ok_or_else(|| ShopError::not_found("Order", order_id))?;
			let from = OrderStateMachine::override_status(&mut order, OrderStatus::Delivered);
			tx.store(StorageKey::Orders.as_str(), order_id, &order)?;
			status_change = Some(from);
		}

		tx.commit().await?;

		tracing::info!(delivery_status = %delivery.delivery_status, "Delivery updated");
		self.event_bus
			.publish(LifecycleEvent::DeliveryUpdated {
				order_id,
				delivery_status: delivery.delivery_status.clone(),
			})
			.ok();
		if let Some(from) = status_change {
			self.event_bus
				.publish(LifecycleEvent::StatusChanged {
					order_id,
					from,
					to: OrderStatus::Delivered,
				})
				.ok();
		}

		Ok(delivery)
	}
}
