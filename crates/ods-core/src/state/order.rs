//! Order state machine implementation.
//!
//! Orders move forward through `pending -> accepted -> out_for_delivery ->
//! delivered`, with `cancelled` reachable from `pending` only. The dedicated
//! operations are guarded by a static transition table; the status override
//! bypasses it.

use crate::ShopError;
use once_cell::sync::Lazy;
use ods_types::{Order, OrderStatus};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Guarded operations that move an order to a fixed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
	Cancel,
	Accept,
	Assign,
}

impl OrderAction {
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderAction::Cancel => "cancel",
			OrderAction::Accept => "accept",
			OrderAction::Assign => "assign",
		}
	}

	/// Status the order holds after the action succeeds.
	pub fn target(&self) -> OrderStatus {
		match self {
			OrderAction::Cancel => OrderStatus::Cancelled,
			OrderAction::Accept => OrderStatus::Accepted,
			OrderAction::Assign => OrderStatus::OutForDelivery,
		}
	}
}

impl fmt::Display for OrderAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

// Each status maps to the statuses a guarded action may move it to.
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		OrderStatus::Pending,
		HashSet::from([OrderStatus::Accepted, OrderStatus::Cancelled]),
	);
	m.insert(
		OrderStatus::Accepted,
		HashSet::from([OrderStatus::OutForDelivery]),
	);
	m.insert(
		OrderStatus::OutForDelivery,
		HashSet::from([OrderStatus::Delivered]),
	);
	m.insert(OrderStatus::Delivered, HashSet::new()); // terminal
	m.insert(OrderStatus::Cancelled, HashSet::new()); // terminal
	m
});

/// Applies status changes to orders.
pub struct OrderStateMachine;

impl OrderStateMachine {
	/// Checks if a guarded transition is valid.
	pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
		TRANSITIONS
			.get(&from)
			.is_some_and(|allowed| allowed.contains(&to))
	}

	/// Applies `action` to `order`, returning the previous status.
	///
	/// Leaves the order untouched when the transition is not allowed.
	pub fn transition(order: &mut Order, action: OrderAction) -> Result<OrderStatus, ShopError> {
		let from = order.status;
		let to = action.target();
		if !Self::is_valid_transition(from, to) {
			return Err(ShopError::InvalidTransition {
				from: from.to_string(),
				action: action.as_str(),
			});
		}

		order.status = to;
		tracing::debug!(order_id = order.id, %from, %to, "Order transitioned");
		Ok(from)
	}

	/// Overwrites the status without consulting the transition table.
	///
	/// Administrative escape hatch: any of the five statuses may be set from
	/// any other, including moves back out of a terminal status. Returns the
	/// previous status.
	pub fn override_status(order: &mut Order, status: OrderStatus) -> OrderStatus {
		let from = order.status;
		if from != status && !Self::is_valid_transition(from, status) {
			tracing::warn!(
				order_id = order.id,
				%from,
				to = %status,
				"Status overridden outside the normal lifecycle"
			);
		}
		order.status = status;
		from
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use rust_decimal::Decimal;

	fn order(status: OrderStatus) -> Order {
		Order {
			id: 1,
			user_id: 7,
			total_price: Decimal::ZERO,
			status,
			created_at: Utc::now(),
			items: vec![],
		}
	}

	#[test]
	fn test_forward_path() {
		let mut o = order(OrderStatus::Pending);
		for action in [OrderAction::Accept, OrderAction::Assign] {
			OrderStateMachine::transition(&mut o, action).unwrap();
		}
		assert_eq!(o.status, OrderStatus::OutForDelivery);
		assert!(OrderStateMachine::is_valid_transition(
			OrderStatus::OutForDelivery,
			OrderStatus::Delivered
		));
	}

	#[test]
	fn test_cancel_only_from_pending() {
		let mut o = order(OrderStatus::Pending);
		let previous = OrderStateMachine::transition(&mut o, OrderAction::Cancel).unwrap();
		assert_eq!(previous, OrderStatus::Pending);
		assert_eq!(o.status, OrderStatus::Cancelled);

		for status in [
			OrderStatus::Accepted,
			OrderStatus::OutForDelivery,
			OrderStatus::Delivered,
			OrderStatus::Cancelled,
		] {
			let mut o = order(status);
			let err = OrderStateMachine::transition(&mut o, OrderAction::Cancel).unwrap_err();
			assert!(matches!(err, ShopError::InvalidTransition { action: "cancel", .. }));
			assert_eq!(o.status, status);
		}
	}

	#[test]
	fn test_accept_and_assign_guards() {
		let mut o = order(OrderStatus::Accepted);
		assert!(OrderStateMachine::transition(&mut o, OrderAction::Accept).is_err());

		let mut o = order(OrderStatus::Pending);
		assert!(OrderStateMachine::transition(&mut o, OrderAction::Assign).is_err());
		assert_eq!(o.status, OrderStatus::Pending);
	}

	#[test]
	fn test_terminal_statuses_have_no_exits() {
		for from in [OrderStatus::Delivered, OrderStatus::Cancelled] {
			assert!(from.is_terminal());
			assert!(OrderStatus::all().all(|to| !OrderStateMachine::is_valid_transition(from, to)));
		}
	}

	#[test]
	fn test_override_is_unchecked() {
		let mut o = order(OrderStatus::Delivered);
		let previous = OrderStateMachine::override_status(&mut o, OrderStatus::Pending);
		assert_eq!(previous, OrderStatus::Delivered);
		assert_eq!(o.status, OrderStatus::Pending);
	}
}
