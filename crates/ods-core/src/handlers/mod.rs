//! Request handlers for the shop resources.
//!
//! Each handler owns a clone of the storage service (and the event bus where
//! it publishes). Operations take the caller's [`AuthContext`] explicitly and
//! perform their role and ownership checks before touching state.
//!
//! [`AuthContext`]: ods_types::AuthContext

pub mod delivery;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;

pub use delivery::DeliveryHandler;
pub use order::OrderHandler;
pub use payment::PaymentHandler;
pub use product::ProductHandler;
pub use user::UserHandler;

#[cfg(test)]
pub(crate) mod testing {
	use crate::{ShopBuilder, ShopEngine, ShopFactories};
	use ods_config::builders::ConfigBuilder;
	use ods_types::{AuthContext, Product, ProductCreate, Role, StorageKey, UserCreate};
	use rust_decimal::Decimal;
	use std::collections::HashMap;
	use std::str::FromStr;

	/// An engine over memory storage with one user per role.
	pub struct Fixture {
		pub engine: ShopEngine,
		pub admin: AuthContext,
		pub agent: AuthContext,
		pub customer: AuthContext,
		/// A second customer who owns nothing.
		pub other: AuthContext,
	}

	pub async fn fixture() -> Fixture {
		let mut storage_factories = HashMap::new();
		storage_factories.insert(
			"memory".to_string(),
			ods_storage::implementations::memory::create_storage,
		);
		let engine = ShopBuilder::new(ConfigBuilder::new().build())
			.build(ShopFactories { storage_factories })
			.unwrap();

		let mut contexts = Vec::new();
		for (email, role) in [
			("admin@example.com", Role::Admin),
			("agent@example.com", Role::Delivery),
			("user@example.com", Role::Customer),
			("other@example.com", Role::Customer),
		] {
			let user = engine
				.users()
				.create_user(UserCreate {
					name: email.to_string(),
					email: email.to_string(),
					phone: None,
					address: None,
					role,
				})
				.await
				.unwrap();
			contexts.push(AuthContext::from(&user));
		}

		Fixture {
			engine,
			admin: contexts[0],
			agent: contexts[1],
			customer: contexts[2],
			other: contexts[3],
		}
	}

	impl ShopEngine {
		pub(crate) async fn test_product(&self, name: &str, price: &str, stock: u32) -> Product {
			self.products()
				.insert_product(ProductCreate {
					name: name.to_string(),
					description: None,
					price: Decimal::from_str(price).unwrap(),
					stock,
					category: None,
				})
				.await
				.unwrap()
		}

		pub(crate) async fn stock_of(&self, product_id: u64) -> u32 {
			let product: Product = self
				.storage()
				.retrieve(StorageKey::Products.as_str(), product_id)
				.await
				.unwrap();
			product.stock
		}
	}
}
