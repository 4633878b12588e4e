//! Category and product use cases with cached reads.
//!
//! ## Summary
//! Reads go through a [`TtlCache`] keyed by listing or entity id. Any write
//! clears both caches, since product listings depend on categories.

use std::time::Duration;

use serde::Deserialize;

use bazaar_core::{
    util::slug::generate_slug,
    validation::{FieldErrors, validate_length, validate_non_negative},
};
use bazaar_db::{
    error::DbError,
    model::catalog::{Category, CategoryChanges, NewCategory, NewProduct, Product, ProductChanges},
    store::CatalogStore,
};

use crate::cache::TtlCache;
use crate::error::{ServiceError, ServiceResult};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub category_id: uuid::Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
}

fn validate_text(errors: &mut FieldErrors, name: &str, description: Option<&str>) {
    validate_length(errors, "name", name, 1, MAX_NAME_LEN);
    if let Some(description) = description {
        validate_length(errors, "description", description, 0, MAX_DESCRIPTION_LEN);
    }
}

/// Blank descriptions are stored as absent.
fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

struct CleanCategory {
    name: String,
    slug: String,
    description: Option<String>,
}

impl CategoryInput {
    fn clean(self) -> ServiceResult<CleanCategory> {
        let mut errors = FieldErrors::new();
        validate_text(&mut errors, &self.name, self.description.as_deref());
        errors.into_result()?;

        let name = self.name.trim().to_string();
        Ok(CleanCategory {
            slug: generate_slug(&name),
            name,
            description: clean_description(self.description),
        })
    }
}

struct CleanProduct {
    category_id: uuid::Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    price_cents: i64,
    stock: i32,
}

impl ProductInput {
    fn clean(self) -> ServiceResult<CleanProduct> {
        let mut errors = FieldErrors::new();
        validate_text(&mut errors, &self.name, self.description.as_deref());
        validate_non_negative(&mut errors, "price_cents", self.price_cents);
        validate_non_negative(&mut errors, "stock", self.stock);
        let stock = i32::try_from(self.stock).unwrap_or_else(|_| {
            errors.push("stock", format!("must be at most {}", i32::MAX));
            0
        });
        errors.into_result()?;

        let name = self.name.trim().to_string();
        Ok(CleanProduct {
            category_id: self.category_id,
            slug: generate_slug(&name),
            name,
            description: clean_description(self.description),
            price_cents: self.price_cents,
            stock,
        })
    }
}

/// Cache key for one listing or one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKey {
    All,
    Id(uuid::Uuid),
    InCategory(uuid::Uuid),
}

fn category_not_found(id: uuid::Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Category {id}"))
}

fn product_not_found(id: uuid::Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Product {id}"))
}

/// Catalog operations sharing one read cache across requests.
#[derive(Debug)]
pub struct CatalogService {
    categories: TtlCache<CatalogKey, Vec<Category>>,
    products: TtlCache<CatalogKey, Vec<Product>>,
    ttl: Duration,
}

impl CatalogService {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            categories: TtlCache::new(),
            products: TtlCache::new(),
            ttl,
        }
    }

    async fn invalidate(&self) {
        self.categories.invalidate_all().await;
        self.products.invalidate_all().await;
    }

    /// ## Errors
    /// Returns database errors.
    pub async fn list_categories<S: CatalogStore + ?Sized>(
        &self,
        store: &S,
    ) -> ServiceResult<Vec<Category>> {
        self.categories
            .get_or_compute(CatalogKey::All, self.ttl, move || async move {
                Ok::<_, ServiceError>(store.list_categories().await?)
            })
            .await
    }

    /// ## Errors
    /// Returns `NotFound` if no category has this id.
    pub async fn get_category<S: CatalogStore + ?Sized>(
        &self,
        store: &S,
        id: uuid::Uuid,
    ) -> ServiceResult<Category> {
        self.categories
            .get_or_compute(CatalogKey::Id(id), self.ttl, move || async move {
                Ok::<Vec<Category>, ServiceError>(
                    store.find_category(id).await?.into_iter().collect(),
                )
            })
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| category_not_found(id))
    }

    /// ## Errors
    /// - `ValidationFailed` for a bad name or description
    /// - `AlreadyExists` if another category has the same slug
    #[tracing::instrument(skip(self, store))]
    pub async fn create_category<S: CatalogStore + ?Sized>(
        &self,
        store: &S,
        input: CategoryInput,
    ) -> ServiceResult<Category> {
        let clean = input.clean()?;
        let category = store
            .create_category(NewCategory {
                id: uuid::Uuid::now_v7(),
                name: clean.name,
                slug: clean.slug,
                description: clean.description,
            })
            .await
            .map_err(slug_conflict)?;

        self.invalidate().await;
        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    /// ## Errors
    /// - `ValidationFailed` for a bad name or description
    /// - `NotFound` if no category has this id
    /// - `AlreadyExists` if another category has the same slug
    #[tracing::instrument(skip(self, store))]
    pub async fn update_category<S: CatalogStore + ?Sized>(
        &self,
        store: &S,
        id: uuid::Uuid,
        input: CategoryInput,
    ) -> ServiceResult<Category> {
        let clean = input.clean()?;
        let category = store
            .update_category(
                id,
                CategoryChanges {
                    name: clean.name,
                    slug: clean.slug,
                    description: clean.description,
                },
            )
            .await
            .map_err(slug_conflict)?
            .ok_or_else(|| category_not_found(id))?;

        self.invalidate().await;
        Ok(category)
    }

    /// ## Errors
    /// - `NotFound` if no category has this id
    /// - `Conflict` while products still belong to it
    #[tracing::instrument(skip(self, store))]
    pub async fn delete_category<S: CatalogStore + ?Sized>(
        &self,
        store: &S,
        id: uuid::Uuid,
    ) -> ServiceResult<()> {
        let deleted = store.delete_category(id).await.map_err(|e| match e {
            DbError::ForeignKeyViolation(_) => {
                ServiceError::Conflict("Category still has products".to_string())
            }
            other => other.into(),
        })?;
        if !deleted {
            return Err(category_not_found(id));
        }

        self.invalidate().await;
        tracing::info!("Category deleted");
        Ok(())
    }

    /// ## Errors
    /// Returns database errors.
    pub async fn list_products<S: CatalogStore + ?Sized>(
        &self,
        store: &S,
        category_id: Option<uuid::Uuid>,
    ) -> ServiceResult<Vec<Product>> {
        let key = category_id.map_or(CatalogKey::All, CatalogKey::InCategory);
        self.products
            .get_or_compute(key, self.ttl, move || async move {
                Ok::<_, ServiceError>(store.list_products(category_id).await?)
            })
            .await
    }

    /// ## Errors
    /// Returns `NotFound` if no product has this id.
    pub async fn get_product<S: CatalogStore + ?Sized>(
        &self,
        store: &S,
        id: uuid::Uuid,
    ) -> ServiceResult<Product> {
        self.products
            .get_or_compute(CatalogKey::Id(id), self.ttl, move || async move {
                Ok::<Vec<Product>, ServiceError>(
                    store.find_product(id).await?.into_iter().collect(),
                )
            })
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| product_not_found(id))
    }

    /// ## Errors
    /// - `ValidationFailed` for bad text, a negative price or stock
    /// - `NotFound` if the category does not exist
    #[tracing::instrument(skip(self, store))]
    pub async fn create_product<S: CatalogStore + ?Sized>(
        &self,
        store: &S,
        input: ProductInput,
    ) -> ServiceResult<Product> {
        let clean = input.clean()?;
        let category_id = clean.category_id;
        if store.find_category(category_id).await?.is_none() {
            return Err(category_not_found(category_id));
        }

        let product = store
            .create_product(NewProduct {
                id: uuid::Uuid::now_v7(),
                category_id,
                name: clean.name,
                slug: clean.slug,
                description: clean.description,
                price_cents: clean.price_cents,
                stock: clean.stock,
            })
            .await
            .map_err(|e| missing_category(e, category_id))?;

        self.invalidate().await;
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// ## Errors
    /// - `ValidationFailed` for bad text, a negative price or stock
    /// - `NotFound` if the product or the category does not exist
    #[tracing::instrument(skip(self, store))]
    pub async fn update_product<S: CatalogStore + ?Sized>(
        &self,
        store: &S,
        id: uuid::Uuid,
        input: ProductInput,
    ) -> ServiceResult<Product> {
        let clean = input.clean()?;
        let category_id = clean.category_id;
        if store.find_category(category_id).await?.is_none() {
            return Err(category_not_found(category_id));
        }

        let product = store
            .update_product(
                id,
                ProductChanges {
                    category_id,
                    name: clean.name,
                    slug: clean.slug,
                    description: clean.description,
                    price_cents: clean.price_cents,
                    stock: clean.stock,
                },
            )
            .await
            .map_err(|e| missing_category(e, category_id))?
            .ok_or_else(|| product_not_found(id))?;

        self.invalidate().await;
        Ok(product)
    }

    /// ## Errors
    /// Returns `NotFound` if no product has this id.
    #[tracing::instrument(skip(self, store))]
    pub async fn delete_product<S: CatalogStore + ?Sized>(
        &self,
        store: &S,
        id: uuid::Uuid,
    ) -> ServiceResult<()> {
        if !store.delete_product(id).await? {
            return Err(product_not_found(id));
        }

        self.invalidate().await;
        tracing::info!("Product deleted");
        Ok(())
    }
}

fn slug_conflict(err: DbError) -> ServiceError {
    match err {
        DbError::UniqueViolation(_) => {
            ServiceError::AlreadyExists("A category with this name already exists".to_string())
        }
        other => other.into(),
    }
}

fn missing_category(err: DbError, category_id: uuid::Uuid) -> ServiceError {
    match err {
        DbError::ForeignKeyViolation(_) => category_not_found(category_id),
        other => other.into(),
    }
}
