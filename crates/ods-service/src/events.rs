//! Background logging of lifecycle events.
//!
//! Handlers already log each change at info when it happens; the event trail
//! is emitted at debug.

use ods_types::LifecycleEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Spawns a task that logs every event received until the bus closes.
pub fn spawn_event_logger(mut events: broadcast::Receiver<LifecycleEvent>) -> JoinHandle<()> {
	tokio::spawn(async move {
		loop {
			match events.recv().await {
				Ok(event) => log_event(&event),
				Err(RecvError::Lagged(skipped)) => {
					tracing::warn!(skipped, "Event logger lagged behind");
				},
				Err(RecvError::Closed) => break,
			}
		}
		tracing::debug!("Event bus closed");
	})
}

fn log_event(event: &LifecycleEvent) {
	match event {
		LifecycleEvent::OrderPlaced {
			order_id,
			user_id,
			lines,
		} => tracing::debug!(order_id, user_id, lines, "Order placed"),
		LifecycleEvent::StatusChanged { order_id, from, to } => {
			tracing::debug!(order_id, %from, %to, "Order status changed")
		},
		LifecycleEvent::StockRestored { order_id, units } => {
			tracing::debug!(order_id, units, "Stock restored")
		},
		LifecycleEvent::DeliveryAssigned { order_id, agent_id } => {
			tracing::debug!(order_id, agent_id, "Delivery assigned")
		},
		LifecycleEvent::DeliveryUpdated {
			order_id,
			delivery_status,
		} => tracing::debug!(order_id, %delivery_status, "Delivery updated"),
		LifecycleEvent::PaymentRecorded {
			payment_id,
			confirmed,
		} => tracing::debug!(%payment_id, confirmed, "Payment recorded"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ods_core::EventBus;
	use std::time::Duration;

	#[tokio::test]
	async fn test_logger_stops_when_bus_dropped() {
		let bus = EventBus::new(4);
		let handle = spawn_event_logger(bus.subscribe());

		bus.publish(LifecycleEvent::StockRestored {
			order_id: 1,
			units: 3,
		})
		.unwrap();
		drop(bus);

		tokio::time::timeout(Duration::from_secs(1), handle)
			.await
			.expect("logger did not stop")
			.unwrap();
	}

	#[tokio::test]
	async fn test_logger_survives_lag() {
		let bus = EventBus::new(1);
		let receiver = bus.subscribe();
		for order_id in 0..5 {
			bus.publish(LifecycleEvent::OrderPlaced {
				order_id,
				user_id: 1,
				lines: 1,
			})
			.unwrap();
		}

		let handle = spawn_event_logger(receiver);
		drop(bus);

		tokio::time::timeout(Duration::from_secs(1), handle)
			.await
			.expect("logger did not stop")
			.unwrap();
	}
}
