//! In-process store with the same constraint behaviour as the Postgres schema.
//!
//! Unique and foreign-key checks mirror the constraints declared in the
//! initial migration so tests exercise the same failure paths.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{DbError, DbResult};
use crate::model::{
    catalog::{Category, CategoryChanges, NewCategory, NewProduct, Product, ProductChanges},
    role::Role,
    user::{Identity, NewUser, User, UserChanges},
};

use super::{CatalogStore, UserStore};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<uuid::Uuid, User>,
    roles: BTreeMap<String, Role>,
    user_roles: HashMap<uuid::Uuid, BTreeSet<uuid::Uuid>>,
    categories: HashMap<uuid::Uuid, Category>,
    products: HashMap<uuid::Uuid, Product>,
}

impl MemoryState {
    fn identity(&self, user: &User) -> Identity {
        let role_ids = self.user_roles.get(&user.id);
        let role_names = self
            .roles
            .values()
            .filter(|role| role_ids.is_some_and(|ids| ids.contains(&role.id)))
            .map(|role| role.name.clone());
        Identity::from_user(user.clone(), role_names)
    }

    fn email_taken_by_other(&self, email: &str, id: uuid::Uuid) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && user.id != id)
    }

    fn slug_taken_by_other(&self, slug: &str, id: uuid::Uuid) -> bool {
        self.categories
            .values()
            .any(|category| category.slug == slug && category.id != id)
    }
}

/// Map-backed store guarded by a single async `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_identity_by_id(&self, id: uuid::Uuid) -> DbResult<Option<Identity>> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).map(|user| state.identity(user)))
    }

    async fn find_identity_by_username(&self, username: &str) -> DbResult<Option<Identity>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|user| user.username == username)
            .map(|user| state.identity(user)))
    }

    async fn username_exists(&self, username: &str) -> DbResult<bool> {
        let state = self.state.read().await;
        Ok(state.users.values().any(|user| user.username == username))
    }

    async fn user_id_by_email(&self, email: &str) -> DbResult<Option<uuid::Uuid>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|user| user.email == email)
            .map(|user| user.id))
    }

    async fn create_user(&self, new_user: NewUser<'_>, role_name: &str) -> DbResult<Identity> {
        let mut state = self.state.write().await;

        let role_id = state
            .roles
            .get(role_name)
            .map(|role| role.id)
            .ok_or_else(|| DbError::NotFound(format!("Role {role_name}")))?;
        if state.users.contains_key(&new_user.id)
            || state
                .users
                .values()
                .any(|user| user.username == new_user.username)
        {
            return Err(DbError::UniqueViolation("app_user_username_key".to_string()));
        }
        if state.email_taken_by_other(new_user.email, new_user.id) {
            return Err(DbError::UniqueViolation("app_user_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: new_user.id,
            username: new_user.username.to_string(),
            email: new_user.email.to_string(),
            password_hash: new_user.password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        state
            .user_roles
            .insert(user.id, BTreeSet::from([role_id]));

        Ok(state.identity(&user))
    }

    async fn update_user(
        &self,
        id: uuid::Uuid,
        changes: UserChanges,
    ) -> DbResult<Option<Identity>> {
        let mut state = self.state.write().await;

        if let Some(email) = &changes.email
            && state.email_taken_by_other(email, id)
        {
            return Err(DbError::UniqueViolation("app_user_email_key".to_string()));
        }

        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        if !changes.is_empty() {
            if let Some(email) = changes.email {
                user.email = email;
            }
            if let Some(password_hash) = changes.password_hash {
                user.password_hash = password_hash;
            }
            user.updated_at = Utc::now();
        }

        let user = user.clone();
        Ok(Some(state.identity(&user)))
    }

    async fn delete_user(&self, id: uuid::Uuid) -> DbResult<bool> {
        let mut state = self.state.write().await;
        state.user_roles.remove(&id);
        Ok(state.users.remove(&id).is_some())
    }

    async fn list_roles(&self) -> DbResult<Vec<Role>> {
        let state = self.state.read().await;
        Ok(state.roles.values().cloned().collect())
    }

    async fn create_role(&self, name: &str) -> DbResult<Role> {
        let mut state = self.state.write().await;
        if state.roles.contains_key(name) {
            return Err(DbError::UniqueViolation("role_name_key".to_string()));
        }

        let role = Role {
            id: uuid::Uuid::now_v7(),
            name: name.to_string(),
        };
        state.roles.insert(role.name.clone(), role.clone());
        Ok(role)
    }

    async fn ensure_role(&self, name: &str) -> DbResult<Role> {
        let mut state = self.state.write().await;
        let role = state
            .roles
            .entry(name.to_string())
            .or_insert_with(|| Role {
                id: uuid::Uuid::now_v7(),
                name: name.to_string(),
            });
        Ok(role.clone())
    }

    async fn assign_role(&self, user_id: uuid::Uuid, role_name: &str) -> DbResult<()> {
        let mut state = self.state.write().await;

        let role_id = state
            .roles
            .get(role_name)
            .map(|role| role.id)
            .ok_or_else(|| DbError::NotFound(format!("Role {role_name}")))?;
        if !state.users.contains_key(&user_id) {
            return Err(DbError::NotFound(format!("User {user_id}")));
        }

        state.user_roles.entry(user_id).or_default().insert(role_id);
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories: Vec<_> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category(&self, id: uuid::Uuid) -> DbResult<Option<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.get(&id).cloned())
    }

    async fn create_category(&self, new_category: NewCategory) -> DbResult<Category> {
        let mut state = self.state.write().await;
        if state.slug_taken_by_other(&new_category.slug, new_category.id) {
            return Err(DbError::UniqueViolation("category_slug_key".to_string()));
        }

        let now = Utc::now();
        let category = Category {
            id: new_category.id,
            name: new_category.name,
            slug: new_category.slug,
            description: new_category.description,
            created_at: now,
            updated_at: now,
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: uuid::Uuid,
        changes: CategoryChanges,
    ) -> DbResult<Option<Category>> {
        let mut state = self.state.write().await;
        if state.slug_taken_by_other(&changes.slug, id) {
            return Err(DbError::UniqueViolation("category_slug_key".to_string()));
        }

        let Some(category) = state.categories.get_mut(&id) else {
            return Ok(None);
        };
        category.name = changes.name;
        category.slug = changes.slug;
        category.description = changes.description;
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: uuid::Uuid) -> DbResult<bool> {
        let mut state = self.state.write().await;
        if state.products.values().any(|p| p.category_id == id) {
            return Err(DbError::ForeignKeyViolation(
                "product_category_id_fkey".to_string(),
            ));
        }
        Ok(state.categories.remove(&id).is_some())
    }

    async fn list_products(&self, category_id: Option<uuid::Uuid>) -> DbResult<Vec<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<_> = state
            .products
            .values()
            .filter(|p| category_id.is_none_or(|id| p.category_id == id))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn find_product(&self, id: uuid::Uuid) -> DbResult<Option<Product>> {
        let state = self.state.read().await;
        Ok(state.products.get(&id).cloned())
    }

    async fn create_product(&self, new_product: NewProduct) -> DbResult<Product> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&new_product.category_id) {
            return Err(DbError::ForeignKeyViolation(
                "product_category_id_fkey".to_string(),
            ));
        }

        let now = Utc::now();
        let product = Product {
            id: new_product.id,
            category_id: new_product.category_id,
            name: new_product.name,
            slug: new_product.slug,
            description: new_product.description,
            price_cents: new_product.price_cents,
            stock: new_product.stock,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: uuid::Uuid,
        changes: ProductChanges,
    ) -> DbResult<Option<Product>> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&changes.category_id) {
            return Err(DbError::ForeignKeyViolation(
                "product_category_id_fkey".to_string(),
            ));
        }

        let Some(product) = state.products.get_mut(&id) else {
            return Ok(None);
        };
        product.category_id = changes.category_id;
        product.name = changes.name;
        product.slug = changes.slug;
        product.description = changes.description;
        product.price_cents = changes.price_cents;
        product.stock = changes.stock;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: uuid::Uuid) -> DbResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.products.remove(&id).is_some())
    }
}
