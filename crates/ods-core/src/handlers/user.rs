//! User registry and caller resolution.

use crate::ShopError;
use ods_storage::StorageService;
use ods_types::{AuthContext, RecordId, StorageKey, User, UserCreate};
use std::sync::Arc;

/// Handler for users.
pub struct UserHandler {
	storage: Arc<StorageService>,
}

impl UserHandler {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Registers a user. Emails are unique, compared case-insensitively.
	pub async fn create_user(&self, user: UserCreate) -> Result<User, ShopError> {
		if user.name.trim().is_empty() {
			return Err(ShopError::Validation("Name is required".into()));
		}
		if !user.email.contains('@') {
			return Err(ShopError::Validation("A valid email is required".into()));
		}

		let email_key = user.email.to_lowercase();
		let mut tx = self.storage.begin().await;
		if tx
			.exists(StorageKey::UsersByEmail.as_str(), &email_key)
			.await?
		{
			return Err(ShopError::Validation("Email already registered".into()));
		}

		let id = tx.next_id(StorageKey::Users.as_str()).await?;
		let UserCreate {
			name,
			email,
			phone,
			address,
			role,
		} = user;
		let user = User {
			id,
			name,
			email,
			phone,
			address,
			role,
		};
		tx.store(StorageKey::Users.as_str(), id, &user)?;
		tx.store(StorageKey::UsersByEmail.as_str(), &email_key, &id)?;
		tx.commit().await?;

		tracing::info!(user_id = id, role = %user.role, "User created");
		Ok(user)
	}

	/// Fetches a user. The user themself or an admin only.
	pub async fn get_user(&self, auth: &AuthContext, user_id: RecordId) -> Result<User, ShopError> {
		auth.ensure_owner_or_admin(user_id)?;
		self.storage
			.find(StorageKey::Users.as_str(), user_id)
			.await?
			.ok_or_else(|| ShopError::not_found("User", user_id))
	}

	/// Looks up a user id by email.
	pub async fn find_by_email(&self, email: &str) -> Result<Option<RecordId>, ShopError> {
		Ok(self
			.storage
			.find(StorageKey::UsersByEmail.as_str(), email.to_lowercase())
			.await?)
	}

	/// Resolves a caller id into a capability token.
	///
	/// Unknown ids are treated like a missing identity.
	pub async fn authenticate(&self, user_id: RecordId) -> Result<AuthContext, ShopError> {
		let user: User = self
			.storage
			.find(StorageKey::Users.as_str(), user_id)
			.await?
			.ok_or(ShopError::Unauthenticated)?;
		Ok(AuthContext::from(&user))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::handlers::testing::fixture;
	use ods_types::Role;

	fn new_user(email: &str, role: Role) -> UserCreate {
		UserCreate {
			name: "Jane".into(),
			email: email.into(),
			phone: None,
			address: Some("1 High St".into()),
			role,
		}
	}

	#[tokio::test]
	async fn test_create_and_authenticate() {
		let fx = fixture().await;
		let users = fx.engine.users();

		let jane = users
			.create_user(new_user("jane@example.com", Role::Delivery))
			.await
			.unwrap();
		let auth = users.authenticate(jane.id).await.unwrap();
		assert_eq!(auth, AuthContext::new(jane.id, Role::Delivery));
		assert_eq!(
			users.find_by_email("JANE@example.com").await.unwrap(),
			Some(jane.id)
		);

		assert!(matches!(
			users.authenticate(999).await,
			Err(ShopError::Unauthenticated)
		));
	}

	#[tokio::test]
	async fn test_email_must_be_unique() {
		let fx = fixture().await;
		let users = fx.engine.users();

		users
			.create_user(new_user("dup@example.com", Role::Customer))
			.await
			.unwrap();
		assert!(matches!(
			users
				.create_user(new_user("Dup@Example.com", Role::Customer))
				.await,
			Err(ShopError::Validation(_))
		));
		assert!(matches!(
			users.create_user(new_user("not-an-email", Role::Customer)).await,
			Err(ShopError::Validation(_))
		));
	}

	#[tokio::test]
	async fn test_get_user_visibility() {
		let fx = fixture().await;
		let users = fx.engine.users();

		let me = users.get_user(&fx.customer, fx.customer.user_id).await.unwrap();
		assert_eq!(me.role, Role::Customer);
		assert!(matches!(
			users.get_user(&fx.customer, fx.other.user_id).await,
			Err(ShopError::Unauthorized(_))
		));
		assert!(users.get_user(&fx.admin, fx.other.user_id).await.is_ok());
	}
}
