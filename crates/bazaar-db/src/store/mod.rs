//! Datastore seams used by the service layer.
//!
//! ## Summary
//! `UserStore` backs identity lookup, registration and role management;
//! `CatalogStore` backs categories and products. Both are implemented for the
//! Postgres pool ([`pg::PgStore`]) and for an in-process map
//! ([`memory::MemoryStore`]) that tests and `database.url = "memory"` use.

pub mod memory;
pub mod pg;

use async_trait::async_trait;

use crate::error::DbResult;
use crate::model::{
    catalog::{Category, CategoryChanges, NewCategory, NewProduct, Product, ProductChanges},
    role::Role,
    user::{Identity, NewUser, UserChanges},
};

pub use memory::MemoryStore;
pub use pg::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_identity_by_id(&self, id: uuid::Uuid) -> DbResult<Option<Identity>>;

    async fn find_identity_by_username(&self, username: &str) -> DbResult<Option<Identity>>;

    async fn username_exists(&self, username: &str) -> DbResult<bool>;

    /// Returns the id of the user registered with `email`, if any.
    async fn user_id_by_email(&self, email: &str) -> DbResult<Option<uuid::Uuid>>;

    /// ## Summary
    /// Inserts the user and links `role_name` in one unit of work.
    ///
    /// ## Errors
    /// `UniqueViolation` if username or email is taken, `NotFound` if the
    /// role does not exist. Nothing is written in either case.
    async fn create_user(&self, new_user: NewUser<'_>, role_name: &str) -> DbResult<Identity>;

    /// Applies `changes`; returns `None` if the user does not exist.
    async fn update_user(
        &self,
        id: uuid::Uuid,
        changes: UserChanges,
    ) -> DbResult<Option<Identity>>;

    /// Returns `false` if the user did not exist.
    async fn delete_user(&self, id: uuid::Uuid) -> DbResult<bool>;

    async fn list_roles(&self) -> DbResult<Vec<Role>>;

    /// ## Errors
    /// `UniqueViolation` if a role with this name exists.
    async fn create_role(&self, name: &str) -> DbResult<Role>;

    /// Creates the role if it is missing and returns it either way.
    async fn ensure_role(&self, name: &str) -> DbResult<Role>;

    /// ## Summary
    /// Links a role to a user. Linking an already held role is a no-op.
    ///
    /// ## Errors
    /// `NotFound` if either the user or the role does not exist.
    async fn assign_role(&self, user_id: uuid::Uuid, role_name: &str) -> DbResult<()>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_categories(&self) -> DbResult<Vec<Category>>;

    async fn find_category(&self, id: uuid::Uuid) -> DbResult<Option<Category>>;

    /// ## Errors
    /// `UniqueViolation` if the slug is taken.
    async fn create_category(&self, new_category: NewCategory) -> DbResult<Category>;

    async fn update_category(
        &self,
        id: uuid::Uuid,
        changes: CategoryChanges,
    ) -> DbResult<Option<Category>>;

    /// ## Errors
    /// `ForeignKeyViolation` while products still reference the category.
    async fn delete_category(&self, id: uuid::Uuid) -> DbResult<bool>;

    /// Lists products, optionally restricted to one category.
    async fn list_products(&self, category_id: Option<uuid::Uuid>) -> DbResult<Vec<Product>>;

    async fn find_product(&self, id: uuid::Uuid) -> DbResult<Option<Product>>;

    /// ## Errors
    /// `ForeignKeyViolation` if the category does not exist.
    async fn create_product(&self, new_product: NewProduct) -> DbResult<Product>;

    async fn update_product(
        &self,
        id: uuid::Uuid,
        changes: ProductChanges,
    ) -> DbResult<Option<Product>>;

    async fn delete_product(&self, id: uuid::Uuid) -> DbResult<bool>;
}

/// Everything the application needs from persistence.
pub trait Store: UserStore + CatalogStore {}

impl<T: UserStore + CatalogStore> Store for T {}
