//! Catalogue product types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::RecordId;

/// A product in the catalogue with its available stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
	pub id: RecordId,
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
	/// Current unit price, never negative.
	pub price: Decimal,
	/// Units available for new orders.
	pub stock: u32,
	#[serde(default)]
	pub category: Option<String>,
}

/// Payload for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
	pub price: Decimal,
	#[serde(default)]
	pub stock: u32,
	#[serde(default)]
	pub category: Option<String>,
}

/// Partial product update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
	pub name: Option<String>,
	pub description: Option<String>,
	pub price: Option<Decimal>,
	pub stock: Option<u32>,
	pub category: Option<String>,
}

impl ProductUpdate {
	/// Applies the present fields to `product`.
	pub fn apply(self, product: &mut Product) {
		let ProductUpdate {
			name,
			description,
			price,
			stock,
			category,
		} = self;

		if let Some(name) = name {
			product.name = name;
		}
		if let Some(description) = description {
			product.description = Some(description);
		}
		if let Some(price) = price {
			product.price = price;
		}
		if let Some(stock) = stock {
			product.stock = stock;
		}
		if let Some(category) = category {
			product.category = Some(category);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_update_keeps_absent_fields() {
		let mut product = Product {
			id: 7,
			name: "Kettle".to_string(),
			description: None,
			price: Decimal::new(2500, 2),
			stock: 4,
			category: Some("kitchen".to_string()),
		};

		ProductUpdate {
			price: Some(Decimal::new(2000, 2)),
			..Default::default()
		}
		.apply(&mut product);

		assert_eq!(product.price, Decimal::new(2000, 2));
		assert_eq!(product.name, "Kettle");
		assert_eq!(product.stock, 4);
		assert_eq!(product.category.as_deref(), Some("kitchen"));
	}
}
