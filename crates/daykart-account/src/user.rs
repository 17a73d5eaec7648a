//! Signed-in user session.
//!
//! There is no credential check: the role is derived from the email alone,
//! and exactly one address is treated as the administrator.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use daykart_core::clock::Clock;
use daykart_core::error::DomainError;
use daykart_core::storage::{self, KeyValueStore, keys};
use serde::{Deserialize, Serialize};

/// The email address that signs in with the admin role.
pub const ADMIN_EMAIL: &str = "admin@daykart.com";

/// Identifier given to users who sign in rather than register.
const SIGN_IN_USER_ID: &str = "1";

/// Access level of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Storefront administrator.
    Admin,
    /// Regular shopper.
    User,
}

/// The signed-in user, persisted as JSON under `user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Access level.
    pub role: Role,
}

impl User {
    /// Returns `true` for the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Current user for one tab.
pub struct UserSession {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    user: Mutex<Option<User>>,
}

impl UserSession {
    /// Restores the persisted user, if any. An unreadable value means
    /// signed out.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let user: Option<User> = storage::load_or_else(store.as_ref(), keys::USER, || None);
        if let Some(user) = &user {
            tracing::debug!(email = %user.email, role = ?user.role, "restored user session");
        }
        Self {
            store,
            clock,
            user: Mutex::new(user),
        }
    }

    fn user(&self) -> MutexGuard<'_, Option<User>> {
        self.user.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(&self, user: User) -> User {
        storage::persist_or_log(self.store.as_ref(), keys::USER, &user);
        *self.user() = Some(user.clone());
        user
    }

    /// Signs in with `email`. The display name is the part before `@`; the
    /// role is admin only for `ADMIN_EMAIL`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `email` is not of the form
    /// `name@domain`.
    #[tracing::instrument(skip(self))]
    pub fn sign_in(&self, email: &str) -> Result<User, DomainError> {
        let (email, local) = parse_email(email)?;
        let role = if email == ADMIN_EMAIL {
            Role::Admin
        } else {
            Role::User
        };
        let user = User {
            id: SIGN_IN_USER_ID.to_owned(),
            name: local.to_owned(),
            email: email.to_owned(),
            role,
        };
        tracing::info!(role = ?user.role, "user signed in");
        Ok(self.replace(user))
    }

    /// Registers a new shopper and signs them in. The id is the current time
    /// in milliseconds. Registration never grants the admin role.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `name` is blank or `email` is not
    /// of the form `name@domain`.
    #[tracing::instrument(skip(self))]
    pub fn register(&self, name: &str, email: &str) -> Result<User, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation("name must not be blank".to_owned()));
        }
        let (email, _) = parse_email(email)?;
        let user = User {
            id: self.clock.now().timestamp_millis().to_string(),
            name: name.to_owned(),
            email: email.to_owned(),
            role: Role::User,
        };
        tracing::info!(user_id = %user.id, "user registered");
        Ok(self.replace(user))
    }

    /// Signs out and removes the persisted user.
    pub fn logout(&self) {
        let previous = self.user().take();
        if let Err(e) = self.store.remove(keys::USER) {
            tracing::warn!(error = %e, "failed to remove persisted user");
        }
        if previous.is_some() {
            tracing::info!("user signed out");
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current(&self) -> Option<User> {
        self.user().clone()
    }

    /// Returns `true` if the signed-in user is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user().as_ref().is_some_and(User::is_admin)
    }
}

impl fmt::Debug for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSession")
            .field("user", &*self.user())
            .finish_non_exhaustive()
    }
}

/// Returns the trimmed address and its local part.
fn parse_email(email: &str) -> Result<(&str, &str), DomainError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok((email, local)),
        _ => Err(DomainError::Validation(format!(
            "invalid email address: {email:?}"
        ))),
    }
}
