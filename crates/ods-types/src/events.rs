//! Event types for inter-service communication.
//!
//! Events are published on the engine's event bus only after the transaction
//! that produced them has committed, so subscribers never observe a change
//! that was later rolled back.

use serde::{Deserialize, Serialize};

use crate::{OrderStatus, RecordId};

/// Events emitted by the order lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LifecycleEvent {
	/// An order was placed and its stock reserved.
	OrderPlaced {
		order_id: RecordId,
		user_id: RecordId,
		lines: usize,
	},
	/// An order moved from one status to another.
	StatusChanged {
		order_id: RecordId,
		from: OrderStatus,
		to: OrderStatus,
	},
	/// Stock was returned to the catalogue after cancellation.
	StockRestored {
		order_id: RecordId,
		units: u64,
	},
	/// A delivery agent was bound to an order.
	DeliveryAssigned {
		order_id: RecordId,
		agent_id: RecordId,
	},
	/// A delivery's status or location changed.
	DeliveryUpdated {
		order_id: RecordId,
		delivery_status: String,
	},
	/// A payment was initiated or confirmed.
	PaymentRecorded {
		payment_id: String,
		confirmed: bool,
	},
}
