use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::schema;

#[derive(Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize)]
#[diesel(table_name = schema::category)]
#[diesel(check_for_backend(Pg))]
pub struct Category {
    pub id: uuid::Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::category)]
pub struct NewCategory {
    pub id: uuid::Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// Full replacement of a category's editable columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::category)]
#[diesel(treat_none_as_null = true)]
pub struct CategoryChanges {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize)]
#[diesel(table_name = schema::product)]
#[diesel(check_for_backend(Pg))]
pub struct Product {
    pub id: uuid::Uuid,
    pub category_id: uuid::Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::product)]
pub struct NewProduct {
    pub id: uuid::Uuid,
    pub category_id: uuid::Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
}

/// Full replacement of a product's editable columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::product)]
#[diesel(treat_none_as_null = true)]
pub struct ProductChanges {
    pub category_id: uuid::Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
}
