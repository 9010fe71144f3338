//! Delivery tracking types.
//!
//! A delivery exists only once an accepted order has been assigned to an
//! agent. Afterwards only its status string and location change.

use serde::{Deserialize, Serialize};

use crate::RecordId;

/// Status given to a delivery when it is created by assignment.
pub const DELIVERY_ASSIGNED: &str = "assigned";

/// Delivery status that forces the parent order to `delivered`.
pub const DELIVERY_DELIVERED: &str = "delivered";

/// Delivery record bound one-to-one to an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Delivery {
	pub order_id: RecordId,
	/// User holding the delivery role.
	pub delivery_person_id: RecordId,
	pub delivery_status: String,
	#[serde(default)]
	pub location: Option<String>,
}

impl Delivery {
	/// Creates a freshly assigned delivery.
	pub fn assigned(order_id: RecordId, agent_id: RecordId) -> Self {
		Self {
			order_id,
			delivery_person_id: agent_id,
			delivery_status: DELIVERY_ASSIGNED.to_string(),
			location: None,
		}
	}

	pub fn is_delivered(&self) -> bool {
		self.delivery_status == DELIVERY_DELIVERED
	}
}

/// Partial delivery update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryUpdate {
	pub delivery_status: Option<String>,
	pub location: Option<String>,
}

impl DeliveryUpdate {
	/// Applies the present fields to `delivery`.
	pub fn apply(self, delivery: &mut Delivery) {
		let DeliveryUpdate {
			delivery_status,
			location,
		} = self;

		if let Some(status) = delivery_status {
			delivery.delivery_status = status;
		}
		if let Some(location) = location {
			delivery.location = Some(location);
		}
	}
}
