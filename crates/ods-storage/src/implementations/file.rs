//! File-based storage backend.
//!
//! Each key is stored in its own file under a base directory. Files start with
//! a small fixed header so that foreign or truncated files are rejected
//! instead of being handed to the JSON decoder.

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry, WriteOp};
use async_trait::async_trait;
use ods_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SchemaError};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Fixed-size record header.
///
/// Binary layout (16 bytes total):
/// - [0-3]: Magic bytes "ODSR"
/// - [4-5]: Version (u16, little-endian)
/// - [6-15]: Reserved
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileHeader {
	version: u16,
}

impl FileHeader {
	const MAGIC: &'static [u8; 4] = b"ODSR";
	const VERSION: u16 = 1;
	const SIZE: usize = 16;

	fn current() -> Self {
		Self {
			version: Self::VERSION,
		}
	}

	fn serialize(&self) -> [u8; Self::SIZE] {
		let mut bytes = [0u8; Self::SIZE];
		bytes[0..4].copy_from_slice(Self::MAGIC);
		bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
		bytes
	}

	fn deserialize(bytes: &[u8]) -> Result<Self, StorageError> {
		if bytes.len() < Self::SIZE {
			return Err(StorageError::Backend("File too small for header".into()));
		}
		if &bytes[0..4] != Self::MAGIC {
			return Err(StorageError::Backend("Unrecognized record format".into()));
		}

		let version = u16::from_le_bytes([bytes[4], bytes[5]]);
		if version > Self::VERSION {
			return Err(StorageError::Backend(format!(
				"Unsupported file version: {}",
				version
			)));
		}

		Ok(Self { version })
	}
}

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Converts a storage key to a filesystem-safe file path.
	fn get_file_path(&self, key: &str) -> PathBuf {
		let safe_key = key.replace(['/', ':', '\\'], "_");
		self.base_path.join(format!("{}.bin", safe_key))
	}

	fn encode(value: &[u8]) -> Vec<u8> {
		let mut file_data = Vec::with_capacity(FileHeader::SIZE + value.len());
		file_data.extend_from_slice(&FileHeader::current().serialize());
		file_data.extend_from_slice(value);
		file_data
	}

	async fn ensure_base_dir(&self) -> Result<(), StorageError> {
		fs::create_dir_all(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	async fn remove_if_present(path: &Path) -> Result<(), StorageError> {
		match fs::remove_file(path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.get_file_path(key);

		let data = match fs::read(&path).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(StorageError::NotFound)
			},
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		FileHeader::deserialize(&data)?;
		Ok(data[FileHeader::SIZE..].to_vec())
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		self.apply_batch(vec![WriteOp::Put {
			key: key.to_string(),
			value,
		}])
		.await
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		Self::remove_if_present(&self.get_file_path(key)).await
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		fs::try_exists(self.get_file_path(key))
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	/// Writes every put to a temp file first and only then renames them into
	/// place, so a failed write leaves the visible records untouched.
	async fn apply_batch(&self, ops: Vec<WriteOp>) -> Result<(), StorageError> {
		self.ensure_base_dir().await?;

		let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();
		let mut deletes: Vec<PathBuf> = Vec::new();

		for op in &ops {
			let path = self.get_file_path(op.key());
			match op {
				WriteOp::Put { value, .. } => {
					let temp_path = path.with_extension("tmp");
					if let Err(e) = fs::write(&temp_path, Self::encode(value)).await {
						for (temp, _) in &staged {
							let _ = fs::remove_file(temp).await;
						}
						return Err(StorageError::Backend(e.to_string()));
					}
					staged.push((temp_path, path));
				},
				WriteOp::Delete { .. } => deletes.push(path),
			}
		}

		for (temp_path, path) in staged {
			fs::rename(&temp_path, &path).await.map_err(|e| {
				tracing::error!(path = %path.display(), error = %e, "Failed to publish staged record");
				StorageError::Backend(e.to_string())
			})?;
		}

		for path in deletes {
			Self::remove_if_present(&path).await?;
		}

		Ok(())
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), SchemaError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("storage_path", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(path) if path.trim().is_empty() => {
							Err("storage_path cannot be empty".into())
						},
						_ => Ok(()),
					}
				}),
			],
		);
		schema.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for file storage (default: "./data/storage")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/storage");

	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))))
}

/// Registry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[tokio::test]
	async fn test_persists_across_instances() {
		let dir = TempDir::new().unwrap();

		let storage = FileStorage::new(dir.path().to_path_buf());
		storage
			.set_bytes("orders:1", b"{\"id\":1}".to_vec())
			.await
			.unwrap();

		let reopened = FileStorage::new(dir.path().to_path_buf());
		assert_eq!(
			reopened.get_bytes("orders:1").await.unwrap(),
			b"{\"id\":1}".to_vec()
		);
		assert!(reopened.exists("orders:1").await.unwrap());
		assert!(!reopened.exists("orders:2").await.unwrap());
	}

	#[tokio::test]
	async fn test_rejects_foreign_files() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		std::fs::write(dir.path().join("orders_1.bin"), b"plain text, no header").unwrap();
		assert!(matches!(
			storage.get_bytes("orders:1").await,
			Err(StorageError::Backend(_))
		));
	}

	#[tokio::test]
	async fn test_batch_and_delete() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().join("nested"));

		storage
			.apply_batch(vec![
				WriteOp::Put {
					key: "products:1".into(),
					value: b"a".to_vec(),
				},
				WriteOp::Put {
					key: "products:2".into(),
					value: b"b".to_vec(),
				},
			])
			.await
			.unwrap();
		storage
			.apply_batch(vec![WriteOp::Delete {
				key: "products:1".into(),
			}])
			.await
			.unwrap();

		assert!(matches!(
			storage.get_bytes("products:1").await,
			Err(StorageError::NotFound)
		));
		assert_eq!(storage.get_bytes("products:2").await.unwrap(), b"b".to_vec());
		// Deleting a missing key is not an error.
		storage.delete("products:9").await.unwrap();
	}

	#[test]
	fn test_factory_validates_path() {
		let config: toml::Value = toml::from_str("storage_path = \"\"").unwrap();
		assert!(matches!(
			create_storage(&config),
			Err(StorageError::Configuration(_))
		));

		let config: toml::Value = toml::from_str("storage_path = \"./tmp\"").unwrap();
		assert!(create_storage(&config).is_ok());
	}
}
