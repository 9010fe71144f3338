//! Broadcast channel for lifecycle events.

use ods_types::LifecycleEvent;
use tokio::sync::broadcast;

/// Fan-out bus for [`LifecycleEvent`]s.
///
/// Cloning the bus shares the underlying channel. Publishing with no
/// subscribers is not an error for callers; they ignore the result.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<LifecycleEvent>,
}

impl EventBus {
	/// Creates a bus buffering up to `capacity` events per subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Registers a new subscriber that receives events published from now on.
	pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event to all current subscribers.
	pub fn publish(
		&self,
		event: LifecycleEvent,
	) -> Result<usize, broadcast::error::SendError<LifecycleEvent>> {
		self.sender.send(event)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_subscribers_receive_events() {
		let bus = EventBus::new(8);
		assert!(bus
			.publish(LifecycleEvent::StockRestored {
				order_id: 1,
				units: 2
			})
			.is_err());

		let mut rx = bus.subscribe();
		bus.clone()
			.publish(LifecycleEvent::DeliveryAssigned {
				order_id: 1,
				agent_id: 3,
			})
			.unwrap();

		assert_eq!(
			rx.recv().await.unwrap(),
			LifecycleEvent::DeliveryAssigned {
				order_id: 1,
				agent_id: 3
			}
		);
	}
}
