use std::collections::BTreeSet;

use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::schema;

#[derive(Clone, PartialEq, Eq, Identifiable, Queryable, Selectable)]
#[diesel(table_name = schema::app_user)]
#[diesel(check_for_backend(Pg))]
pub struct User {
    pub id: uuid::Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::app_user)]
pub struct NewUser<'a> {
    pub id: uuid::Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Partial profile update; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = schema::app_user)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none() && self.password_hash.is_none()
    }
}

/// A stored user together with its role set.
///
/// This is what the authentication layer reasons about; it is loaded fresh
/// for every request that presents a valid token.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role_names: BTreeSet<String>,
}

impl Identity {
    #[must_use]
    pub fn from_user(user: User, role_names: impl IntoIterator<Item = String>) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role_names: role_names.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role_names.contains(role)
    }

    /// Returns `true` if this identity holds at least one of `roles`.
    #[must_use]
    pub fn has_any_role<'a>(&self, roles: impl IntoIterator<Item = &'a str>) -> bool {
        roles.into_iter().any(|role| self.has_role(role))
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("role_names", &self.role_names)
            .finish_non_exhaustive()
    }
}
