//! Order types for the order & delivery service.
//!
//! An order is created in `pending` together with its lines and then moves
//! forward through the status enum. Line prices are snapshots taken at
//! placement time so later catalogue price changes never alter an order total.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::RecordId;

/// A placed order together with its owned lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
	/// Unique identifier for this order.
	pub id: RecordId,
	/// User who placed the order.
	pub user_id: RecordId,
	/// Sum of `price * quantity` over all lines, fixed at placement.
	pub total_price: Decimal,
	/// Current status of the order.
	pub status: OrderStatus,
	/// Timestamp when this order was created.
	pub created_at: DateTime<Utc>,
	/// Lines in the order they were submitted.
	pub items: Vec<OrderItem>,
}

impl Order {
	/// Returns the list view of this order.
	pub fn summary(&self) -> OrderSummary {
		OrderSummary {
			id: self.id,
			total_price: self.total_price,
			status: self.status,
			created_at: self.created_at,
		}
	}
}

/// One (product, quantity, price snapshot) entry within an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
	pub product_id: RecordId,
	pub quantity: u32,
	/// Unit price of the product when the order was placed.
	pub price: Decimal,
}

impl OrderItem {
	/// Price of the whole line, or `None` if it does not fit a `Decimal`.
	pub fn line_total(&self) -> Option<Decimal> {
		self.price.checked_mul(Decimal::from(self.quantity))
	}
}

/// Order as returned by the per-user listing, without lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSummary {
	pub id: RecordId,
	pub total_price: Decimal,
	pub status: OrderStatus,
	pub created_at: DateTime<Utc>,
}

/// Status of an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	/// Order has been placed and stock reserved.
	Pending,
	/// Order has been accepted by staff.
	Accepted,
	/// A delivery agent has been assigned.
	OutForDelivery,
	/// Order reached the customer.
	Delivered,
	/// Order was cancelled and its stock restored.
	Cancelled,
}

impl OrderStatus {
	/// Returns the wire representation of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Accepted => "accepted",
			OrderStatus::OutForDelivery => "out_for_delivery",
			OrderStatus::Delivered => "delivered",
			OrderStatus::Cancelled => "cancelled",
		}
	}

	/// Returns an iterator over all statuses.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Pending,
			Self::Accepted,
			Self::OutForDelivery,
			Self::Delivered,
			Self::Cancelled,
		]
		.into_iter()
	}

	/// Whether no guarded transition leaves this status.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when a string is not one of the five order statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Invalid status: {}", self.0)
	}
}

impl std::error::Error for UnknownStatus {}

impl FromStr for OrderStatus {
	type Err = UnknownStatus;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::all()
			.find(|status| status.as_str() == s)
			.ok_or_else(|| UnknownStatus(s.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_parse_and_display() {
		for status in OrderStatus::all() {
			assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
			assert_eq!(status.to_string(), status.as_str());
		}
		assert_eq!(
			"shipped".parse::<OrderStatus>(),
			Err(UnknownStatus("shipped".to_string()))
		);
	}

	#[test]
	fn test_status_serializes_snake_case() {
		let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
		assert_eq!(json, "\"out_for_delivery\"");
	}

	#[test]
	fn test_line_total() {
		let item = OrderItem {
			product_id: 1,
			quantity: 3,
			price: Decimal::new(1050, 2),
		};
		assert_eq!(item.line_total(), Some(Decimal::new(3150, 2)));

		let huge = OrderItem {
			price: Decimal::MAX,
			..item
		};
		assert_eq!(huge.line_total(), None);
	}
}
