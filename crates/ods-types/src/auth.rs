//! Caller identity passed into every lifecycle operation.
//!
//! The HTTP layer resolves the caller into an [`AuthContext`] before any core
//! logic runs. Operations receive the context explicitly instead of reading
//! ambient session state, and use the helpers here for role and ownership
//! checks.

use thiserror::Error;

use crate::{RecordId, Role, User};

/// Errors raised by authorization checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
	/// No caller identity was supplied or it did not resolve to a user.
	#[error("Authentication required")]
	Unauthenticated,
	/// The caller is known but lacks the role or ownership required.
	#[error("{0}")]
	Forbidden(String),
}

/// Capability token describing the authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
	pub user_id: RecordId,
	pub role: Role,
}

impl AuthContext {
	pub fn new(user_id: RecordId, role: Role) -> Self {
		Self { user_id, role }
	}

	pub fn is_admin(&self) -> bool {
		self.role == Role::Admin
	}

	/// Requires the admin role.
	pub fn require_admin(&self) -> Result<(), AuthError> {
		if self.is_admin() {
			Ok(())
		} else {
			Err(AuthError::Forbidden("Admin access required".into()))
		}
	}

	/// Requires the admin or delivery role.
	pub fn require_staff(&self) -> Result<(), AuthError> {
		match self.role {
			Role::Admin | Role::Delivery => Ok(()),
			Role::Customer => Err(AuthError::Forbidden(
				"Admin or Delivery access required".into(),
			)),
		}
	}

	/// Allows the owner of a record or any admin.
	pub fn ensure_owner_or_admin(&self, owner_id: RecordId) -> Result<(), AuthError> {
		if self.is_admin() || self.user_id == owner_id {
			Ok(())
		} else {
			Err(AuthError::Forbidden("Unauthorized".into()))
		}
	}

	/// Allows only the owner of a record.
	pub fn ensure_owner(&self, owner_id: RecordId) -> Result<(), AuthError> {
		if self.user_id == owner_id {
			Ok(())
		} else {
			Err(AuthError::Forbidden("Unauthorized".into()))
		}
	}
}

impl From<&User> for AuthContext {
	fn from(user: &User) -> Self {
		Self::new(user.id, user.role)
	}
}
