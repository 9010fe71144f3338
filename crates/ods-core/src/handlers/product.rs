//! Catalogue management.

use crate::ShopError;
use ods_storage::StorageService;
use ods_types::{AuthContext, Product, ProductCreate, ProductUpdate, RecordId, StorageKey};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::instrument;

/// Handler for catalogue products.
pub struct ProductHandler {
	storage: Arc<StorageService>,
}

impl ProductHandler {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Creates a product. Admin only.
	pub async fn create_product(
		&self,
		auth: &AuthContext,
		product: ProductCreate,
	) -> Result<Product, ShopError> {
		auth.require_admin()?;
		self.insert_product(product).await
	}

	/// Creates a product without an authorization check, for seeding.
	pub(crate) async fn insert_product(
		&self,
		product: ProductCreate,
	) -> Result<Product, ShopError> {
		validate_name(&product.name)?;
		validate_price(product.price)?;

		let mut tx = self.storage.begin().await;
		let id = tx.next_id(StorageKey::Products.as_str()).await?;
		let ProductCreate {
			name,
			description,
			price,
			stock,
			category,
		} = product;
		let product = Product {
			id,
			name,
			description,
			price,
			stock,
			category,
		};
		tx.store(StorageKey::Products.as_str(), id, &product)?;
		tx.commit().await?;

		tracing::info!(
			product_id = id,
			name = %product.name,
			stock = product.stock,
			"Product created"
		);
		Ok(product)
	}

	/// Fetches a product. Public.
	pub async fn get_product(&self, product_id: RecordId) -> Result<Product, ShopError> {
		self.storage
			.find(StorageKey::Products.as_str(), product_id)
			.await?
			.ok_or_else(|| ShopError::not_found("Product", product_id))
	}

	/// Applies a partial update. Admin only.
	#[instrument(skip_all, fields(product_id = product_id))]
	pub async fn update_product(
		&self,
		auth: &AuthContext,
		product_id: RecordId,
		update: ProductUpdate,
	) -> Result<Product, ShopError> {
		auth.require_admin()?;
		if let Some(name) = &update.name {
			validate_name(name)?;
		}
		if let Some(price) = update.price {
			validate_price(price)?;
		}

		let mut tx = self.storage.begin().await;
		let mut product: Product = tx
			.find(StorageKey::Products.as_str(), product_id)
			.await?
			.ok_or_else(|| ShopError::not_found("Product", product_id))?;

		update.apply(&mut product);
		tx.store(StorageKey::Products.as_str(), product_id, &product)?;
		tx.commit().await?;

		tracing::info!("Product updated");
		Ok(product)
	}

	/// Removes a product. Admin only.
	///
	/// Orders keep their line snapshots; cancelling such an order later
	/// skips the stock restore for the missing product.
	#[instrument(skip_all, fields(product_id = product_id))]
	pub async fn delete_product(
		&self,
		auth: &AuthContext,
		product_id: RecordId,
	) -> Result<(), ShopError> {
		auth.require_admin()?;

		let mut tx = self.storage.begin().await;
		if !tx.exists(StorageKey::Products.as_str(), product_id).await? {
			return Err(ShopError::not_found("Product", product_id));
		}
		tx.remove(StorageKey::Products.as_str(), product_id);
		tx.commit().await?;

		tracing::info!("Product deleted");
		Ok(())
	}
}

fn validate_name(name: &str) -> Result<(), ShopError> {
	if name.trim().is_empty() {
		return Err(ShopError::Validation("Product name is required".into()));
	}
	Ok(())
}

fn validate_price(price: Decimal) -> Result<(), ShopError> {
	if price < Decimal::ZERO {
		return Err(ShopError::Validation("Price cannot be negative".into()));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::handlers::testing::fixture;

	fn create(name: &str, price: Decimal) -> ProductCreate {
		ProductCreate {
			name: name.into(),
			description: Some("A thing".into()),
			price,
			stock: 4,
			category: Some("misc".into()),
		}
	}

	#[tokio::test]
	async fn test_crud_cycle() {
		let fx = fixture().await;
		let products = fx.engine.products();

		let created = products
			.create_product(&fx.admin, create("Lamp", Decimal::new(1999, 2)))
			.await
			.unwrap();
		assert_eq!(products.get_product(created.id).await.unwrap(), created);

		let updated = products
			.update_product(
				&fx.admin,
				created.id,
				ProductUpdate {
					stock: Some(9),
					..Default::default()
				},
			)
			.await
			.unwrap();
		assert_eq!(updated.stock, 9);
		assert_eq!(updated.name, "Lamp");

		products.delete_product(&fx.admin, created.id).await.unwrap();
		assert!(matches!(
			products.get_product(created.id).await,
			Err(ShopError::NotFound { .. })
		));
		assert!(matches!(
			products.delete_product(&fx.admin, created.id).await,
			Err(ShopError::NotFound { .. })
		));
	}

	#[tokio::test]
	async fn test_admin_only_and_validation() {
		let fx = fixture().await;
		let products = fx.engine.products();

		assert!(matches!(
			products
				.create_product(&fx.customer, create("Lamp", Decimal::ONE))
				.await,
			Err(ShopError::Unauthorized(_))
		));
		assert!(matches!(
			products
				.create_product(&fx.admin, create("Lamp", Decimal::new(-1, 0)))
				.await,
			Err(ShopError::Validation(_))
		));
		assert!(matches!(
			products.create_product(&fx.admin, create("  ", Decimal::ONE)).await,
			Err(ShopError::Validation(_))
		));

		let free = products
			.create_product(&fx.admin, create("Sticker", Decimal::ZERO))
			.await
			.unwrap();
		assert!(matches!(
			products
				.update_product(
					&fx.admin,
					free.id,
					ProductUpdate {
						price: Some(Decimal::new(-5, 1)),
						..Default::default()
					},
				)
				.await,
			Err(ShopError::Validation(_))
		));
	}
}
