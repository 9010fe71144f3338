//! Order handler for placement, cancellation and status changes.
//!
//! Placement reserves stock and creates the order with its lines in one
//! transaction. Cancellation restores the stock in the same transaction that
//! moves the order to `cancelled`.

use crate::engine::event_bus::EventBus;
use crate::inventory::{InventoryLedger, Reservation};
use crate::state::{OrderAction, OrderStateMachine};
use crate::ShopError;
use chrono::Utc;
use ods_storage::StorageService;
use ods_types::{
	AuthContext, LifecycleEvent, Order, OrderStatus, OrderSummary, PlaceOrderRequest, RecordId,
	StorageKey,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for the order lifecycle.
pub struct OrderHandler {
	storage: Arc<StorageService>,
	event_bus: EventBus,
}

impl OrderHandler {
	pub fn new(storage: Arc<StorageService>, event_bus: EventBus) -> Self {
		Self { storage, event_bus }
	}

	/// Places an order for the caller.
	///
	/// Every line must name an existing product with enough stock. On any
	/// failure nothing is persisted.
	#[instrument(skip_all, fields(user_id = auth.user_id))]
	pub async fn place_order(
		&self,
		auth: &AuthContext,
		request: PlaceOrderRequest,
	) -> Result<Order, ShopError> {
		let mut tx = self.storage.begin().await;

		let Reservation {
			items,
			total: total_price,
		} = InventoryLedger::reserve(&mut tx, &request.items).await?;

		let id = tx.next_id(StorageKey::Orders.as_str()).await?;
		let order = Order {
			id,
			user_id: auth.user_id,
			total_price,
			status: OrderStatus::Pending,
			created_at: Utc::now(),
			items,
		};
		tx.store(StorageKey::Orders.as_str(), id, &order)?;

		let by_user = StorageKey::OrdersByUser.as_str();
		let mut order_ids: Vec<RecordId> =
			tx.find(by_user, auth.user_id).await?.unwrap_or_default();
		order_ids.push(id);
		tx.store(by_user, auth.user_id, &order_ids)?;

		tx.commit().await?;

		tracing::info!(order_id = id, total = %order.total_price, "Order placed");
		self.event_bus
			.publish(LifecycleEvent::OrderPlaced {
				order_id: id,
				user_id: auth.user_id,
				lines: order.items.len(),
			})
			.ok();

		Ok(order)
	}

	/// Fetches an order with its lines. Owner or admin only.
	pub async fn get_order(
		&self,
		auth: &AuthContext,
		order_id: RecordId,
	) -> Result<Order, ShopError> {
		let order: Order = self
			.storage
			.find(StorageKey::Orders.as_str(), order_id)
			.await?
			.ok_or_else(|| ShopError::not_found("Order", order_id))?;

		auth.ensure_owner_or_admin(order.user_id)?;
		Ok(order)
	}

	/// Lists a user's orders in placement order. Owner or admin only.
	pub async fn list_user_orders(
		&self,
		auth: &AuthContext,
		user_id: RecordId,
	) -> Result<Vec<OrderSummary>, ShopError> {
		auth.ensure_owner_or_admin(user_id)?;

		let order_ids: Vec<RecordId> = self
			.storage
			.find(StorageKey::OrdersByUser.as_str(), user_id)
			.await?
			.unwrap_or_default();

		let mut summaries = Vec::with_capacity(order_ids.len());
		for order_id in order_ids {
			let order: Order = self
				.storage
				.retrieve(StorageKey::Orders.as_str(), order_id)
				.await?;
			summaries.push(order.summary());
		}
		Ok(summaries)
	}

	/// Cancels a pending order and returns its stock. Owner or admin only.
	#[instrument(skip_all, fields(order_id = order_id))]
	pub async fn cancel_order(
		&self,
		auth: &AuthContext,
		order_id: RecordId,
	) -> Result<Order, ShopError> {
		let mut tx = self.storage.begin().await;

		let mut order: Order = tx
			.find(StorageKey::Orders.as_str(), order_id)
			.await?
			.ok_or_else(|| ShopError::not_found("Order", order_id))?;
		auth.ensure_owner_or_admin(order.user_id)?;

		let from = OrderStateMachine::transition(&mut order, OrderAction::Cancel)?;
		let units = InventoryLedger::restore(&mut tx, &order.items).await?;
		tx.store(StorageKey::Orders.as_str(), order_id, &order)?;
		tx.commit().await?;

		tracing::info!(units, "Order cancelled");
		self.publish_status(order_id, from, order.status);
		self.event_bus
			.publish(LifecycleEvent::StockRestored { order_id, units })
			.ok();

		Ok(order)
	}

	/// Accepts a pending order. Staff only.
	#[instrument(skip_all, fields(order_id = order_id))]
	pub async fn accept_order(
		&self,
		auth: &AuthContext,
		order_id: RecordId,
	) -> Result<Order, ShopError> {
		auth.require_staff()?;

		let mut tx = self.storage.begin().await;
		let mut order: Order = tx
			.find(StorageKey::Orders.as_str(), order_id)
			.await?
			.ok_or_else(|| ShopError::not_found("Order", order_id))?;

		let from = OrderStateMachine::transition(&mut order, OrderAction::Accept)?;
		tx.store(StorageKey::Orders.as_str(), order_id, &order)?;
		tx.commit().await?;

		tracing::info!("Order accepted");
		self.publish_status(order_id, from, order.status);
		Ok(order)
	}

	/// Overwrites the status of an order. Staff only.
	///
	/// `status` must name one of the five statuses but the move itself is not
	/// checked against the lifecycle, and no stock is adjusted.
	#[instrument(skip_all, fields(order_id = order_id))]
	pub async fn update_status(
		&self,
		auth: &AuthContext,
		order_id: RecordId,
		status: Option<&str>,
	) -> Result<Order, ShopError> {
		auth.require_staff()?;

		let status: OrderStatus = status
			.ok_or_else(|| ShopError::Validation("Invalid status".into()))?
			.parse()
			.map_err(|_| ShopError::Validation("Invalid status".into()))?;

		let mut tx = self.storage.begin().await;
		let mut order: Order = tx
			.find(StorageKey::Orders.as_str(), order_id)
			.await?
			.ok_or_else(|| ShopError::not_found("Order", order_id))?;

		let from = OrderStateMachine::override_status(&mut order, status);
		tx.store(StorageKey::Orders.as_str(), order_id, &order)?;
		tx.commit().await?;

		tracing::info!(%from, to = %status, "Order status updated");
		self.publish_status(order_id, from, status);
		Ok(order)
	}

	fn publish_status(&self, order_id: RecordId, from: OrderStatus, to: OrderStatus) {
		self.event_bus
			.publish(LifecycleEvent::StatusChanged { order_id, from, to })
			.ok();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::handlers::testing::{fixture, Fixture};
	use ods_types::{OrderLineRequest, Product};
	use rust_decimal::Decimal;

	fn request(lines: &[(RecordId, u32)]) -> PlaceOrderRequest {
		PlaceOrderRequest {
			items: lines
				.iter()
				.map(|&(product_id, quantity)| OrderLineRequest {
					product_id,
					quantity,
				})
				.collect(),
		}
	}

	#[tokio::test]
	async fn test_place_and_cancel_restores_stock() {
		let Fixture {
			engine,
			customer,
			..
		} = fixture().await;
		let product = engine.test_product("Widget", "10.00", 5).await;
		let orders = engine.orders();

		let order = orders
			.place_order(&customer, request(&[(product.id, 3)]))
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::Pending);
		assert_eq!(order.total_price, Decimal::new(3000, 2));
		assert_eq!(engine.stock_of(product.id).await, 2);

		let cancelled = orders.cancel_order(&customer, order.id).await.unwrap();
		assert_eq!(cancelled.status, OrderStatus::Cancelled);
		assert_eq!(engine.stock_of(product.id).await, 5);

		let err = orders.cancel_order(&customer, order.id).await.unwrap_err();
		assert!(matches!(err, ShopError::InvalidTransition { .. }));
		assert_eq!(engine.stock_of(product.id).await, 5);
	}

	#[tokio::test]
	async fn test_insufficient_stock_changes_nothing() {
		let Fixture {
			engine,
			customer,
			..
		} = fixture().await;
		let plenty = engine.test_product("Plenty", "1.00", 10).await;
		let scarce = engine.test_product("Scarce", "1.00", 2).await;
		let orders = engine.orders();

		let err = orders
			.place_order(&customer, request(&[(plenty.id, 4), (scarce.id, 3)]))
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			ShopError::InsufficientStock {
				requested: 3,
				available: 2,
				..
			}
		));
		assert!(err.to_string().contains(&format!("product {}", scarce.id)));

		assert_eq!(engine.stock_of(plenty.id).await, 10);
		assert_eq!(engine.stock_of(scarce.id).await, 2);
		assert!(orders
			.list_user_orders(&customer, customer.user_id)
			.await
			.unwrap()
			.is_empty());
	}

	#[tokio::test]
	async fn test_total_is_sum_of_line_snapshots() {
		let Fixture {
			engine,
			admin,
			customer,
			..
		} = fixture().await;
		let a = engine.test_product("A", "2.50", 10).await;
		let b = engine.test_product("B", "4.00", 10).await;

		let order = engine
			.orders()
			.place_order(&customer, request(&[(a.id, 2), (b.id, 3)]))
			.await
			.unwrap();
		let line_sum: Decimal = order.items.iter().filter_map(|i| i.line_total()).sum();
		assert_eq!(order.total_price, line_sum);
		assert_eq!(order.total_price, Decimal::new(1700, 2));

		// A later price change leaves the order untouched.
		engine
			.products()
			.update_product(
				&admin,
				a.id,
				ods_types::ProductUpdate {
					price: Some(Decimal::new(9900, 2)),
					..Default::default()
				},
			)
			.await
			.unwrap();
		let reloaded = engine.orders().get_order(&customer, order.id).await.unwrap();
		assert_eq!(reloaded.total_price, Decimal::new(1700, 2));
		assert_eq!(reloaded.items[0].price, Decimal::new(250, 2));
	}

	#[tokio::test]
	async fn test_ownership_checks() {
		let Fixture {
			engine,
			admin,
			customer,
			other,
			..
		} = fixture().await;
		let product = engine.test_product("Widget", "1.00", 5).await;
		let orders = engine.orders();
		let order = orders
			.place_order(&customer, request(&[(product.id, 1)]))
			.await
			.unwrap();

		assert!(matches!(
			orders.get_order(&other, order.id).await,
			Err(ShopError::Unauthorized(_))
		));
		assert!(matches!(
			orders.list_user_orders(&other, customer.user_id).await,
			Err(ShopError::Unauthorized(_))
		));
		assert!(matches!(
			orders.cancel_order(&other, order.id).await,
			Err(ShopError::Unauthorized(_))
		));
		assert!(matches!(
			orders.get_order(&admin, 999).await,
			Err(ShopError::NotFound { entity: "Order", .. })
		));

		let listed = orders
			.list_user_orders(&admin, customer.user_id)
			.await
			.unwrap();
		assert_eq!(listed, vec![order.summary()]);
		assert_eq!(engine.stock_of(product.id).await, 4);
	}

	#[tokio::test]
	async fn test_accept_requires_staff_and_pending() {
		let Fixture {
			engine,
			agent,
			customer,
			..
		} = fixture().await;
		let product = engine.test_product("Widget", "1.00", 5).await;
		let orders = engine.orders();
		let order = orders
			.place_order(&customer, request(&[(product.id, 1)]))
			.await
			.unwrap();

		assert!(matches!(
			orders.accept_order(&customer, order.id).await,
			Err(ShopError::Unauthorized(_))
		));
		let accepted = orders.accept_order(&agent, order.id).await.unwrap();
		assert_eq!(accepted.status, OrderStatus::Accepted);
		assert!(matches!(
			orders.accept_order(&agent, order.id).await,
			Err(ShopError::InvalidTransition { .. })
		));
		// Accepted orders can no longer be cancelled.
		assert!(matches!(
			orders.cancel_order(&customer, order.id).await,
			Err(ShopError::InvalidTransition { .. })
		));
		assert_eq!(engine.stock_of(product.id).await, 4);
	}

	#[tokio::test]
	async fn test_status_override_is_unchecked() {
		let Fixture {
			engine,
			admin,
			customer,
			..
		} = fixture().await;
		let product = engine.test_product("Widget", "1.00", 5).await;
		let orders = engine.orders();
		let order = orders
			.place_order(&customer, request(&[(product.id, 1)]))
			.await
			.unwrap();

		let delivered = orders
			.update_status(&admin, order.id, Some("delivered"))
			.await
			.unwrap();
		assert_eq!(delivered.status, OrderStatus::Delivered);

		// Moving back out of a terminal status is allowed by the override.
		let reopened = orders
			.update_status(&admin, order.id, Some("pending"))
			.await
			.unwrap();
		assert_eq!(reopened.status, OrderStatus::Pending);

		for bad in [None, Some("shipped")] {
			assert!(matches!(
				orders.update_status(&admin, order.id, bad).await,
				Err(ShopError::Validation(_))
			));
		}
		assert!(matches!(
			orders.update_status(&customer, order.id, Some("accepted")).await,
			Err(ShopError::Unauthorized(_))
		));
	}

	#[tokio::test]
	async fn test_concurrent_placements_never_oversell() {
		let Fixture {
			engine,
			customer,
			..
		} = fixture().await;
		let product = engine.test_product("Hot item", "1.00", 5).await;

		let mut tasks = Vec::new();
		for _ in 0..10 {
			let engine = engine.clone();
			tasks.push(tokio::spawn(async move {
				engine
					.orders()
					.place_order(&customer, request(&[(product.id, 1)]))
					.await
					.is_ok()
			}));
		}

		let mut placed = 0;
		for task in tasks {
			if task.await.unwrap() {
				placed += 1;
			}
		}

		assert_eq!(placed, 5);
		let stored: Product = engine
			.storage()
			.retrieve(StorageKey::Products.as_str(), product.id)
			.await
			.unwrap();
		assert_eq!(stored.stock, 0);
	}

	#[tokio::test]
	async fn test_total_overflow_is_rejected() {
		let Fixture {
			engine,
			customer,
			..
		} = fixture().await;
		let priceless = engine
			.test_product("Priceless", "79228162514264337593543950335", 5)
			.await;
		let orders = engine.orders();

		let err = orders
			.place_order(&customer, request(&[(priceless.id, 2)]))
			.await
			.unwrap_err();
		assert!(matches!(err, ShopError::Validation(_)));
		assert_eq!(engine.stock_of(priceless.id).await, 5);

		// The writer lock was released: a single unit still fits.
		let order = orders
			.place_order(&customer, request(&[(priceless.id, 1)]))
			.await
			.unwrap();
		assert_eq!(order.total_price, Decimal::MAX);
	}
}
