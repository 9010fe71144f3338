//! Payment records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::RecordId;

/// Payment state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
	Pending,
	Confirmed,
}

/// A payment raised against an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
	/// Identifier of the form `pay_<order_id>`.
	pub id: String,
	pub order_id: RecordId,
	/// Order total at the time the payment was initiated.
	pub amount: Decimal,
	pub status: PaymentStatus,
	pub created_at: DateTime<Utc>,
}

impl Payment {
	/// Payment identifier derived from the order it pays for.
	pub fn id_for_order(order_id: RecordId) -> String {
		format!("pay_{}", order_id)
	}
}
