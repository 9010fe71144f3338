//! Payment handler.
//!
//! One payment per order, identified as `pay_<order_id>` and charging the
//! order total. No money moves here: a payment is a record that staff confirm
//! once the funds arrived.

use crate::engine::event_bus::EventBus;
use crate::ShopError;
use chrono::Utc;
use ods_storage::StorageService;
use ods_types::{
	AuthContext, LifecycleEvent, Order, OrderStatus, Payment, PaymentStatus, RecordId, StorageKey,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for order payments.
pub struct PaymentHandler {
	storage: Arc<StorageService>,
	event_bus: EventBus,
}

impl PaymentHandler {
	pub fn new(storage: Arc<StorageService>, event_bus: EventBus) -> Self {
		Self { storage, event_bus }
	}

	/// Starts payment of an order. Only the order's owner may pay.
	///
	/// Initiating again returns the existing payment unchanged.
	#[instrument(skip_all, fields(order_id = order_id))]
	pub async fn initiate_payment(
		&self,
		auth: &AuthContext,
		order_id: RecordId,
	) -> Result<Payment, ShopError> {
		let mut tx = self.storage.begin().await;
		let order: Order = tx
			.find(StorageKey::Orders.as_str(), order_id)
			.await?
			.ok_or_else(|| ShopError::not_found("Order", order_id))?;
		auth.ensure_owner(order.user_id)?;

		if order.status == OrderStatus::Cancelled {
			return Err(ShopError::Validation(
				"Cannot pay for a cancelled order".into(),
			));
		}

		let payment_id = Payment::id_for_order(order_id);
		if let Some(existing) = tx
			.find::<Payment>(StorageKey::Payments.as_str(), &payment_id)
			.await?
		{
			tx.rollback();
			return Ok(existing);
		}

		let payment = Payment {
			id: payment_id,
			order_id,
			amount: order.total_price,
			status: PaymentStatus::Pending,
			created_at: Utc::now(),
		};
		tx.store(StorageKey::Payments.as_str(), &payment.id, &payment)?;
		tx.commit().await?;

		tracing::info!(payment_id = %payment.id, amount = %payment.amount, "Payment initiated");
		self.event_bus
			.publish(LifecycleEvent::PaymentRecorded {
				payment_id: payment.id.clone(),
				confirmed: false,
			})
			.ok();

		Ok(payment)
	}

	/// Fetches a payment. Owner of the paid order or admin only.
	pub async fn get_payment(
		&self,
		auth: &AuthContext,
		payment_id: &str,
	) -> Result<Payment, ShopError> {
		let payment: Payment = self
			.storage
			.find(StorageKey::Payments.as_str(), payment_id)
			.await?
			.ok_or_else(|| ShopError::not_found("Payment", payment_id))?;

		let order: Option<Order> = self
			.storage
			.find(StorageKey::Orders.as_str(), payment.order_id)
			.await?;
		match order {
			Some(order) => auth.ensure_owner_or_admin(order.user_id)?,
			None => auth.require_admin()?,
		}

		Ok(payment)
	}

	/// Marks a pending payment as confirmed. Admin only.
	#[instrument(skip_all, fields(payment_id = %payment_id))]
	pub async fn confirm_payment(
		&self,
		auth: &AuthContext,
		payment_id: &str,
	) -> Result<Payment, ShopError> {
		auth.require_admin()?;

		let mut tx = self.storage.begin().await;
		let mut payment: Payment = tx
			.find(StorageKey::Payments.as_str(), payment_id)
			.await?
			.ok_or_else(|| ShopError::not_found("Payment", payment_id))?;

		if payment.status != PaymentStatus::Pending {
			return Err(ShopError::InvalidTransition {
				from: "confirmed".into(),
				action: "confirm",
			});
		}

		payment.status = PaymentStatus::Confirmed;
		tx.store(StorageKey::Payments.as_str(), payment_id, &payment)?;
		tx.commit().await?;

		tracing::info!("Payment confirmed");
		self.event_bus
			.publish(LifecycleEvent::PaymentRecorded {
				payment_id: payment.id.clone(),
				confirmed: true,
			})
			.ok();

		Ok(payment)
	}
}
