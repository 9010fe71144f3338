//! Inventory ledger.
//!
//! Stock lives on the product records. Reservation and restoration stage
//! their changes in the caller's transaction, so a failure on any line leaves
//! every product untouched once the transaction is dropped.

use crate::ShopError;
use ods_storage::Transaction;
use ods_types::{OrderItem, OrderLineRequest, Product, StorageKey};
use rust_decimal::Decimal;

/// Lines priced at reservation time together with their sum.
#[derive(Debug)]
pub struct Reservation {
	pub items: Vec<OrderItem>,
	pub total: Decimal,
}

/// Reserves and restores product stock.
pub struct InventoryLedger;

impl InventoryLedger {
	/// Validates every line, decrements stock and snapshots unit prices.
	///
	/// Lines are processed in order against the transaction's view, so a
	/// product named twice is checked against the already reduced stock.
	/// A total too large for a `Decimal` is rejected as invalid input.
	pub async fn reserve(
		tx: &mut Transaction<'_>,
		lines: &[OrderLineRequest],
	) -> Result<Reservation, ShopError> {
		if lines.is_empty() {
			return Err(ShopError::Validation("No items in order".into()));
		}

		let products = StorageKey::Products.as_str();
		let mut items = Vec::with_capacity(lines.len());
		let mut total = Decimal::ZERO;

		for line in lines {
			if line.quantity == 0 {
				return Err(ShopError::Validation(format!(
					"Quantity for product {} must be at least 1",
					line.product_id
				)));
			}

			let mut product: Product = tx
				.find(products, line.product_id)
				.await?
				.ok_or_else(|| ShopError::not_found("Product", line.product_id))?;

			if line.quantity > product.stock {
				return Err(ShopError::InsufficientStock {
					product_id: product.id,
					requested: line.quantity,
					available: product.stock,
				});
			}

			product.stock -= line.quantity;
			tx.store(products, product.id, &product)?;

			let item = OrderItem {
				product_id: product.id,
				quantity: line.quantity,
				price: product.price,
			};
			total = item
				.line_total()
				.and_then(|line_total| total.checked_add(line_total))
				.ok_or_else(|| ShopError::Validation("Order total is too large".into()))?;
			items.push(item);
		}

		Ok(Reservation { items, total })
	}

	/// Adds every line's quantity back to its product.
	///
	/// Products deleted since the order was placed are skipped. Returns the
	/// number of units returned to stock.
	pub async fn restore(tx: &mut Transaction<'_>, items: &[OrderItem]) -> Result<u64, ShopError> {
		let products = StorageKey::Products.as_str();
		let mut units = 0u64;

		for item in items {
			let Some(mut product) = tx.find::<Product>(products, item.product_id).await? else {
				tracing::warn!(
					product_id = item.product_id,
					quantity = item.quantity,
					"Product no longer exists, stock not restored"
				);
				continue;
			};

			product.stock = product.stock.saturating_add(item.quantity);
			tx.store(products, product.id, &product)?;
			units += u64::from(item.quantity);
		}

		Ok(units)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ods_storage::{implementations::memory::MemoryStorage, StorageService};
	use rust_decimal::Decimal;

	async fn service_with(products: &[(u64, u32)]) -> StorageService {
		let priced: Vec<_> = products
			.iter()
			.map(|&(id, stock)| (id, stock, Decimal::new(1000, 2)))
			.collect();
		priced_service_with(&priced).await
	}

	async fn priced_service_with(products: &[(u64, u32, Decimal)]) -> StorageService {
		let service = StorageService::new(Box::new(MemoryStorage::new()));
		for &(id, stock, price) in products {
			let product = Product {
				id,
				name: format!("product-{id}"),
				description: None,
				price,
				stock,
				category: None,
			};
			service
				.store(StorageKey::Products.as_str(), id, &product)
				.await
				.unwrap();
		}
		service
	}

	async fn stock_of(service: &StorageService, id: u64) -> u32 {
		let product: Product = service
			.retrieve(StorageKey::Products.as_str(), id)
			.await
			.unwrap();
		product.stock
	}

	fn line(product_id: u64, quantity: u32) -> OrderLineRequest {
		OrderLineRequest {
			product_id,
			quantity,
		}
	}

	#[tokio::test]
	async fn test_reserve_snapshots_price_and_decrements() {
		let service = service_with(&[(1, 5)]).await;
		let mut tx = service.begin().await;

		let reservation = InventoryLedger::reserve(&mut tx, &[line(1, 3)]).await.unwrap();
		tx.commit().await.unwrap();

		assert_eq!(reservation.items.len(), 1);
		assert_eq!(reservation.items[0].price, Decimal::new(1000, 2));
		assert_eq!(reservation.total, Decimal::new(3000, 2));
		assert_eq!(stock_of(&service, 1).await, 2);
	}

	#[tokio::test]
	async fn test_reserve_rejects_overflowing_total() {
		let service = priced_service_with(&[(1, 5, Decimal::MAX), (2, 5, Decimal::MAX)]).await;

		let mut tx = service.begin().await;
		assert!(matches!(
			InventoryLedger::reserve(&mut tx, &[line(1, 2)]).await,
			Err(ShopError::Validation(_))
		));
		drop(tx);

		let mut tx = service.begin().await;
		assert!(matches!(
			InventoryLedger::reserve(&mut tx, &[line(1, 1), line(2, 1)]).await,
			Err(ShopError::Validation(_))
		));
		drop(tx);

		assert_eq!(stock_of(&service, 1).await, 5);
		assert_eq!(stock_of(&service, 2).await, 5);
	}

	#[tokio::test]
	async fn test_repeated_product_cannot_oversell() {
		let service = service_with(&[(1, 5)]).await;
		let mut tx = service.begin().await;

		let err = InventoryLedger::reserve(&mut tx, &[line(1, 3), line(1, 3)])
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			ShopError::InsufficientStock {
				product_id: 1,
				requested: 3,
				available: 2
			}
		));
		drop(tx);

		assert_eq!(stock_of(&service, 1).await, 5);
	}

	#[tokio::test]
	async fn test_reserve_rejects_bad_lines() {
		let service = service_with(&[(1, 5)]).await;
		let mut tx = service.begin().await;

		assert!(matches!(
			InventoryLedger::reserve(&mut tx, &[]).await,
			Err(ShopError::Validation(_))
		));
		assert!(matches!(
			InventoryLedger::reserve(&mut tx, &[line(1, 0)]).await,
			Err(ShopError::Validation(_))
		));
		assert!(matches!(
			InventoryLedger::reserve(&mut tx, &[line(1, 1), line(9, 1)]).await,
			Err(ShopError::NotFound { entity: "Product", .. })
		));
	}

	#[tokio::test]
	async fn test_restore_skips_missing_products() {
		let service = service_with(&[(1, 2)]).await;
		let items = vec![
			OrderItem {
				product_id: 1,
				quantity: 3,
				price: Decimal::ONE,
			},
			OrderItem {
				product_id: 2,
				quantity: 4,
				price: Decimal::ONE,
			},
		];

		let mut tx = service.begin().await;
		let units = InventoryLedger::restore(&mut tx, &items).await.unwrap();
		tx.commit().await.unwrap();

		assert_eq!(units, 3);
		assert_eq!(stock_of(&service, 1).await, 5);
	}
}
