//! Startup seeding of users and products.
//!
//! Running the seed twice creates nothing the second time: users are skipped
//! when their email is already registered and products are only created
//! while the catalogue has never held any.

use crate::{ShopEngine, ShopError};
use ods_config::SeedConfig;
use ods_types::StorageKey;

/// Counts of records created by [`apply`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
	pub users: usize,
	pub products: usize,
}

/// Creates the configured users and products that do not exist yet.
pub async fn apply(engine: &ShopEngine, seed: &SeedConfig) -> Result<SeedReport, ShopError> {
	let mut report = SeedReport::default();

	for user in &seed.users {
		if engine.users().find_by_email(&user.email).await?.is_some() {
			tracing::debug!(email = %user.email, "Seed user already exists");
			continue;
		}
		engine.users().create_user(user.clone()).await?;
		report.users += 1;
	}

	// The product sequence exists once any product was ever created.
	let catalogue_started = engine
		.storage()
		.exists(StorageKey::Sequences.as_str(), StorageKey::Products.as_str())
		.await?;
	if catalogue_started {
		if !seed.products.is_empty() {
			tracing::debug!("Catalogue already populated, skipping seed products");
		}
	} else {
		for product in &seed.products {
			engine.products().insert_product(product.clone()).await?;
			report.products += 1;
		}
	}

	tracing::info!(
		users = report.users,
		products = report.products,
		"Seed applied"
	);
	Ok(report)
}
