//! Unit of work over a storage backend.

use crate::{from_bytes, record_key, to_bytes, StorageError, StorageInterface, WriteOp};
use ods_types::StorageKey;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use tokio::sync::MutexGuard;

/// A request-scoped unit of work.
///
/// Reads see the transaction's own staged writes first and fall through to the
/// backend otherwise. Nothing reaches the backend until [`commit`] hands every
/// staged write over in a single batch. A transaction is finished exactly once:
/// by `commit`, by `rollback`, or by being dropped, which discards it.
///
/// The transaction owns the service's writer lock for its whole lifetime, so
/// read-check-write sequences (such as checking and decrementing stock) cannot
/// interleave with another writer.
///
/// [`commit`]: Transaction::commit
pub struct Transaction<'a> {
	backend: &'a dyn StorageInterface,
	staged: BTreeMap<String, Option<Vec<u8>>>,
	finished: bool,
	_writer: MutexGuard<'a, ()>,
}

impl<'a> Transaction<'a> {
	pub(crate) fn new(backend: &'a dyn StorageInterface, writer: MutexGuard<'a, ()>) -> Self {
		Self {
			backend,
			staged: BTreeMap::new(),
			finished: false,
			_writer: writer,
		}
	}

	/// Retrieves a value, preferring staged writes over the backend.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: impl Display,
	) -> Result<T, StorageError> {
		let key = record_key(namespace, id);
		match self.staged.get(&key) {
			Some(Some(bytes)) => from_bytes(bytes),
			Some(None) => Err(StorageError::NotFound),
			None => from_bytes(&self.backend.get_bytes(&key).await?),
		}
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

	/// Checks whether a key exists, taking staged writes into account.
	pub async fn exists(&self, namespace: &str, id: impl Display) -> Result<bool, StorageError> {
		let key = record_key(namespace, id);
		match self.staged.get(&key) {
			Some(staged) => Ok(staged.is_some()),
			None => self.backend.exists(&key).await,
		}
	}

	/// Stages a create-or-overwrite.
	pub fn store<T: Serialize>(
		&mut self,
		namespace: &str,
		id: impl Display,
		data: &T,
	) -> Result<(), StorageError> {
		let bytes = to_bytes(data)?;
		self.staged.insert(record_key(namespace, id), Some(bytes));
		Ok(())
	}

	/// Stages a deletion.
	pub fn remove(&mut self, namespace: &str, id: impl Display) {
		self.staged.insert(record_key(namespace, id), None);
	}

	/// Allocates the next identifier for `namespace`.
	///
	/// Identifiers start at 1. The counter update is part of this transaction,
	/// so a rolled back transaction does not consume an identifier.
	pub async fn next_id(&mut self, namespace: &str) -> Result<u64, StorageError> {
		let sequences = StorageKey::Sequences.as_str();
		let current: u64 = self.find(sequences, namespace).await?.unwrap_or(0);
		let next = current + 1;
		self.store(sequences, namespace, &next)?;
		Ok(next)
	}

	/// Number of staged writes.
	pub fn pending_writes(&self) -> usize {
		self.staged.len()
	}

	/// Hands every staged write to the backend in one batch.
	///
	/// Returns the number of writes applied.
	pub async fn commit(mut self) -> Result<usize, StorageError> {
		self.finished = true;
		let ops: Vec<WriteOp> = std::mem::take(&mut self.staged)
			.into_iter()
			.map(|(key, value)| match value {
				Some(value) => WriteOp::Put { key, value },
				None => WriteOp::Delete { key },
			})
			.collect();

		let count = ops.len();
		if count > 0 {
			self.backend.apply_batch(ops).await?;
		}
		tracing::trace!(writes = count, "Committed transaction");
		Ok(count)
	}

	/// Discards every staged write.
	pub fn rollback(mut self) {
		self.finished = true;
		tracing::debug!(writes = self.staged.len(), "Rolled back transaction");
	}
}

impl Drop for Transaction<'_> {
	fn drop(&mut self) {
		if !self.finished && !self.staged.is_empty() {
			tracing::debug!(
				writes = self.staged.len(),
				"Discarding uncommitted transaction"
			);
		}
	}
}
