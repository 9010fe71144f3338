//! Storage-related types for the order & delivery service.

/// Storage keys for different data collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Key for catalogue products
	Products,
	/// Key for orders with their lines
	Orders,
	/// Key for mapping user IDs to the IDs of their orders
	OrdersByUser,
	/// Key for deliveries, indexed by order ID
	Deliveries,
	/// Key for users
	Users,
	/// Key for mapping lower-cased emails to user IDs
	UsersByEmail,
	/// Key for payments
	Payments,
	/// Key for per-namespace ID counters
	Sequences,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Products => "products",
			StorageKey::Orders => "orders",
			StorageKey::OrdersByUser => "orders_by_user",
			StorageKey::Deliveries => "deliveries",
			StorageKey::Users => "users",
			StorageKey::UsersByEmail => "users_by_email",
			StorageKey::Payments => "payments",
			StorageKey::Sequences => "sequences",
		}
	}
}
