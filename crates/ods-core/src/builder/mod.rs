//! Builder pattern for constructing shop engines.
//!
//! The storage backend is chosen by name from the configuration and created
//! through a factory function, so the binary decides which backends exist.

use crate::engine::{event_bus::EventBus, ShopEngine};
use ods_config::Config;
use ods_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Factory functions available to the builder, keyed by implementation name.
pub struct ShopFactories<SF> {
	pub storage_factories: HashMap<String, SF>,
}

/// Builder for constructing a ShopEngine with a pluggable storage backend.
pub struct ShopBuilder {
	config: Config,
}

impl ShopBuilder {
	/// Creates a new ShopBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the ShopEngine, creating every configured storage
	/// implementation that has a factory and keeping the primary one.
	pub fn build<SF>(self, factories: ShopFactories<SF>) -> Result<ShopEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
	{
		let mut storage_impls = HashMap::new();
		for (name, config) in &self.config.storage.implementations {
			let Some(factory) = factories.storage_factories.get(name) else {
				tracing::warn!(
					component = "storage",
					implementation = %name,
					"No factory registered, skipping"
				);
				continue;
			};

			match factory(config) {
				Ok(implementation) => {
					let is_primary = &self.config.storage.primary == name;
					tracing::info!(component = "storage", implementation = %name, enabled = %is_primary, "Loaded");
					storage_impls.insert(name.clone(), implementation);
				},
				Err(e) => {
					tracing::error!(
						component = "storage",
						implementation = %name,
						error = %e,
						"Failed to create storage implementation"
					);
					return Err(BuilderError::Config(format!(
						"Failed to create storage implementation '{}': {}",
						name, e
					)));
				},
			}
		}

		if storage_impls.is_empty() {
			return Err(BuilderError::Config(
				"No valid storage implementations available".into(),
			));
		}

		let primary_storage = &self.config.storage.primary;
		let storage_backend = storage_impls.remove(primary_storage).ok_or_else(|| {
			BuilderError::Config(format!(
				"Primary storage '{}' failed to load or has invalid configuration",
				primary_storage
			))
		})?;

		let storage = Arc::new(StorageService::new(storage_backend));
		Ok(ShopEngine::new(self.config, storage, EventBus::new(1000)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ods_config::builders::ConfigBuilder;
	use ods_storage::implementations::{file, memory};
	use ods_storage::StorageFactory;

	#[test]
	fn test_builds_with_primary_storage() {
		let mut storage_factories: HashMap<String, StorageFactory> = HashMap::new();
		storage_factories.insert("memory".into(), memory::create_storage);
		storage_factories.insert("file".into(), file::create_storage);

		let engine = ShopBuilder::new(ConfigBuilder::new().service_id("built").build())
			.build(ShopFactories { storage_factories })
			.unwrap();
		assert_eq!(engine.config().service.id, "built");
	}

	#[test]
	fn test_missing_factory_is_config_error() {
		let storage_factories: HashMap<String, StorageFactory> = HashMap::new();
		let result = ShopBuilder::new(ConfigBuilder::new().build())
			.build(ShopFactories { storage_factories });
		assert!(matches!(result, Err(BuilderError::Config(_))));
	}

	#[test]
	fn test_invalid_backend_config_is_rejected() {
		let mut storage_factories: HashMap<String, StorageFactory> = HashMap::new();
		storage_factories.insert("file".into(), file::create_storage);

		let config = ConfigBuilder::new()
			.storage("file", toml::from_str("storage_path = \"\"").unwrap())
			.build();
		let result = ShopBuilder::new(config).build(ShopFactories { storage_factories });
		assert!(matches!(result, Err(BuilderError::Config(msg)) if msg.contains("file")));
	}
}
