//! Storage module for the order & delivery service.
//!
//! This module provides abstractions for persistent storage of shop data,
//! supporting different backend implementations such as in-memory or
//! file-based storage. Typed records are stored as JSON under
//! `namespace:id` keys.
//!
//! Every mutation that must be atomic goes through a [`Transaction`]: a unit
//! of work that holds the service's single-writer lock, stages its writes and
//! hands them to the backend in one [`StorageInterface::apply_batch`] call.

use async_trait::async_trait;
use ods_types::{ConfigSchema, ImplementationRegistry};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;
use thiserror::Error;
use tokio::sync::Mutex;

mod transaction;

pub use transaction::Transaction;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// A single staged write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
	Put { key: String, value: Vec<u8> },
	Delete { key: String },
}

impl WriteOp {
	pub fn key(&self) -> &str {
		match self {
			WriteOp::Put { key, .. } | WriteOp::Delete { key } => key,
		}
	}
}

/// Trait defining the low-level interface for storage backends.
///
/// This trait must be implemented by any storage backend that wants to
/// integrate with the service. It provides basic key-value operations plus
/// a batch write used to commit transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Applies a batch of writes in order.
	///
	/// Backends that can make the batch visible atomically override this.
	/// The default applies each operation in turn.
	async fn apply_batch(&self, ops: Vec<WriteOp>) -> Result<(), StorageError> {
		for op in ops {
			match op {
				WriteOp::Put { key, value } => self.set_bytes(&key, value).await?,
				WriteOp::Delete { key } => self.delete(&key).await?,
			}
		}
		Ok(())
	}

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for storage factory functions.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage implementations.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// Builds the `namespace:id` key used for every record.
pub(crate) fn record_key(namespace: &str, id: impl Display) -> String {
	format!("{}:{}", namespace, id)
}

pub(crate) fn to_bytes<T: Serialize>(data: &T) -> Result<Vec<u8>, StorageError> {
	serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))
}

pub(crate) fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StorageError> {
	serde_json::from_slice(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// High-level storage service that provides typed operations.
///
/// The StorageService wraps a low-level storage backend and provides
/// convenient methods for storing and retrieving typed data with
/// automatic serialization/deserialization.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
	/// Held by every writer; transactions keep it until commit or rollback.
	writer: Mutex<()>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self {
			backend,
			writer: Mutex::new(()),
		}
	}

	/// Opens a unit of work.
	///
	/// Waits until no other transaction is open. The returned transaction
	/// keeps exclusive write access until it is committed, rolled back or
	/// dropped.
	pub async fn begin(&self) -> Transaction<'_> {
		let guard = self.writer.lock().await;
		Transaction::new(self.backend.as_ref(), guard)
	}

	/// Stores a serializable value, creating or overwriting it.
	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: impl Display,
		data: &T,
	) -> Result<(), StorageError> {
		let bytes = to_bytes(data)?;
		let _guard = self.writer.lock().await;
		self.backend
			.set_bytes(&record_key(namespace, id), bytes)
			.await
	}

	/// Retrieves and deserializes a value from storage.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: impl Display,
	) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(&record_key(namespace, id)).await?;
		from_bytes(&bytes)
	}

	/// Like [`retrieve`](Self::retrieve) but maps a missing key to `None`.
	pub async fn find<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: impl Display,
	) -> Result<Option<T>, StorageError> {
		match self.retrieve(namespace, id).await {
			Ok(value) => Ok(Some(value)),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Removes a value from storage.
	pub async fn remove(&self, namespace: &str, id: impl Display) -> Result<(), StorageError> {
		let _guard = self.writer.lock().await;
		self.backend.delete(&record_key(namespace, id)).await
	}

	/// Checks if a value exists in storage.
	pub async fn exists(&self, namespace: &str, id: impl Display) -> Result<bool, StorageError> {
		self.backend.exists(&record_key(namespace, id)).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use implementations::memory::MemoryStorage;
	use serde::Deserialize;

	#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
	struct Widget {
		name: String,
		count: u32,
	}

	#[tokio::test]
	async fn test_typed_round_trip_and_find() {
		let service = StorageService::new(Box::new(MemoryStorage::new()));
		let widget = Widget {
			name: "bolt".into(),
			count: 3,
		};

		service.store("widgets", 1, &widget).await.unwrap();
		let loaded: Widget = service.retrieve("widgets", 1).await.unwrap();
		assert_eq!(loaded, widget);

		let missing: Option<Widget> = service.find("widgets", 2).await.unwrap();
		assert!(missing.is_none());

		service.remove("widgets", 1).await.unwrap();
		assert!(!service.exists("widgets", 1).await.unwrap());
		assert!(matches!(
			service.retrieve::<Widget>("widgets", 1).await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_retrieve_reports_corrupt_payload() {
		let mut backend = MockStorageInterface::new();
		backend
			.expect_get_bytes()
			.withf(|key| key == "widgets:1")
			.returning(|_| Ok(b"not json".to_vec()));

		let service = StorageService::new(Box::new(backend));
		let result: Result<Widget, _> = service.retrieve("widgets", 1).await;
		assert!(matches!(result, Err(StorageError::Serialization(_))));
	}

	#[tokio::test]
	async fn test_failed_commit_is_reported() {
		let mut backend = MockStorageInterface::new();
		backend
			.expect_get_bytes()
			.returning(|_| Err(StorageError::NotFound));
		backend
			.expect_apply_batch()
			.times(1)
			.returning(|_| Err(StorageError::Backend("disk full".into())));

		let service = StorageService::new(Box::new(backend));
		let mut tx = service.begin().await;
		tx.store(
			"widgets",
			1,
			&Widget {
				name: "nut".into(),
				count: 1,
			},
		)
		.unwrap();

		let result = tx.commit().await;
		assert!(matches!(result, Err(StorageError::Backend(_))));
	}
}
