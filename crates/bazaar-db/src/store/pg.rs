//! Postgres-backed store using the diesel-async connection pool.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl, scoped_futures::ScopedFutureExt};

use crate::db::{
    connection::{DbConnection, DbPool},
    schema,
};
use crate::error::{DbError, DbResult};
use crate::model::{
    catalog::{Category, CategoryChanges, NewCategory, NewProduct, Product, ProductChanges},
    role::{NewRole, NewUserRole, Role},
    user::{Identity, NewUser, User, UserChanges},
};

use super::{CatalogStore, UserStore};

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> DbResult<DbConnection<'_>> {
        Ok(self.pool.get().await?)
    }
}

/// ## Summary
/// Loads the names of every role linked to a user, sorted by name.
///
/// ## Errors
/// Returns database errors from the join query.
async fn role_names_for(conn: &mut DbConnection<'_>, user_id: uuid::Uuid) -> DbResult<Vec<String>> {
    Ok(schema::user_role::table
        .inner_join(schema::role::table)
        .filter(schema::user_role::user_id.eq(user_id))
        .select(schema::role::name)
        .order(schema::role::name.asc())
        .load::<String>(conn)
        .await?)
}

async fn identity_by_id(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> DbResult<Option<Identity>> {
    let Some(user) = schema::app_user::table
        .find(id)
        .select(User::as_select())
        .first::<User>(conn)
        .await
        .optional()?
    else {
        return Ok(None);
    };

    let role_names = role_names_for(conn, user.id).await?;
    Ok(Some(Identity::from_user(user, role_names)))
}

#[async_trait]
impl UserStore for PgStore {
    #[tracing::instrument(skip(self))]
    async fn find_identity_by_id(&self, id: uuid::Uuid) -> DbResult<Option<Identity>> {
        let mut conn = self.conn().await?;
        identity_by_id(&mut conn, id).await
    }

    #[tracing::instrument(skip(self))]
    async fn find_identity_by_username(&self, username: &str) -> DbResult<Option<Identity>> {
        let mut conn = self.conn().await?;

        let Some(user) = schema::app_user::table
            .filter(schema::app_user::username.eq(username))
            .select(User::as_select())
            .first::<User>(&mut conn)
            .await
            .optional()?
        else {
            return Ok(None);
        };

        let role_names = role_names_for(&mut conn, user.id).await?;
        Ok(Some(Identity::from_user(user, role_names)))
    }

    async fn username_exists(&self, username: &str) -> DbResult<bool> {
        let mut conn = self.conn().await?;

        Ok(diesel::select(diesel::dsl::exists(
            schema::app_user::table.filter(schema::app_user::username.eq(username)),
        ))
        .get_result::<bool>(&mut conn)
        .await?)
    }

    async fn user_id_by_email(&self, email: &str) -> DbResult<Option<uuid::Uuid>> {
        let mut conn = self.conn().await?;

        Ok(schema::app_user::table
            .filter(schema::app_user::email.eq(email))
            .select(schema::app_user::id)
            .first::<uuid::Uuid>(&mut conn)
            .await
            .optional()?)
    }

    #[tracing::instrument(skip(self, new_user), fields(username = %new_user.username))]
    async fn create_user(&self, new_user: NewUser<'_>, role_name: &str) -> DbResult<Identity> {
        let mut conn = self.conn().await?;

        conn.transaction::<_, DbError, _>(|tx| {
            async move {
                let role = schema::role::table
                    .filter(schema::role::name.eq(role_name))
                    .select(Role::as_select())
                    .first::<Role>(tx)
                    .await
                    .optional()?
                    .ok_or_else(|| DbError::NotFound(format!("Role {role_name}")))?;

                let user = diesel::insert_into(schema::app_user::table)
                    .values(&new_user)
                    .returning(User::as_select())
                    .get_result::<User>(tx)
                    .await?;

                let _link_row_count = diesel::insert_into(schema::user_role::table)
                    .values(&NewUserRole {
                        user_id: user.id,
                        role_id: role.id,
                    })
                    .execute(tx)
                    .await?;

                Ok(Identity::from_user(user, [role.name]))
            }
            .scope_boxed()
        })
        .await
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update_user(
        &self,
        id: uuid::Uuid,
        changes: UserChanges,
    ) -> DbResult<Option<Identity>> {
        let mut conn = self.conn().await?;

        if !changes.is_empty() {
            let updated = diesel::update(schema::app_user::table.find(id))
                .set((
                    &changes,
                    schema::app_user::updated_at.eq(diesel::dsl::now),
                ))
                .execute(&mut conn)
                .await?;
            if updated == 0 {
                return Ok(None);
            }
        }

        identity_by_id(&mut conn, id).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_user(&self, id: uuid::Uuid) -> DbResult<bool> {
        let mut conn = self.conn().await?;

        // user_role rows cascade
        let deleted = diesel::delete(schema::app_user::table.find(id))
            .execute(&mut conn)
            .await?;
        Ok(deleted > 0)
    }

    async fn list_roles(&self) -> DbResult<Vec<Role>> {
        let mut conn = self.conn().await?;

        Ok(schema::role::table
            .select(Role::as_select())
            .order(schema::role::name.asc())
            .load::<Role>(&mut conn)
            .await?)
    }

    #[tracing::instrument(skip(self))]
    async fn create_role(&self, name: &str) -> DbResult<Role> {
        let mut conn = self.conn().await?;

        Ok(diesel::insert_into(schema::role::table)
            .values(&NewRole {
                id: uuid::Uuid::now_v7(),
                name,
            })
            .returning(Role::as_select())
            .get_result::<Role>(&mut conn)
            .await?)
    }

    #[tracing::instrument(skip(self))]
    async fn ensure_role(&self, name: &str) -> DbResult<Role> {
        let mut conn = self.conn().await?;

        let _inserted = diesel::insert_into(schema::role::table)
            .values(&NewRole {
                id: uuid::Uuid::now_v7(),
                name,
            })
            .on_conflict(schema::role::name)
            .do_nothing()
            .execute(&mut conn)
            .await?;

        Ok(schema::role::table
            .filter(schema::role::name.eq(name))
            .select(Role::as_select())
            .first::<Role>(&mut conn)
            .await?)
    }

    #[tracing::instrument(skip(self))]
    async fn assign_role(&self, user_id: uuid::Uuid, role_name: &str) -> DbResult<()> {
        let mut conn = self.conn().await?;

        let role_id = schema::role::table
            .filter(schema::role::name.eq(role_name))
            .select(schema::role::id)
            .first::<uuid::Uuid>(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("Role {role_name}")))?;

        let user_exists = diesel::select(diesel::dsl::exists(
            schema::app_user::table.find(user_id),
        ))
        .get_result::<bool>(&mut conn)
        .await?;
        if !user_exists {
            return Err(DbError::NotFound(format!("User {user_id}")));
        }

        let _link_row_count = diesel::insert_into(schema::user_role::table)
            .values(&NewUserRole { user_id, role_id })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let mut conn = self.conn().await?;

        Ok(schema::category::table
            .select(Category::as_select())
            .order(schema::category::name.asc())
            .load::<Category>(&mut conn)
            .await?)
    }

    async fn find_category(&self, id: uuid::Uuid) -> DbResult<Option<Category>> {
        let mut conn = self.conn().await?;

        Ok(schema::category::table
            .find(id)
            .select(Category::as_select())
            .first::<Category>(&mut conn)
            .await
            .optional()?)
    }

    #[tracing::instrument(skip(self, new_category), fields(slug = %new_category.slug))]
    async fn create_category(&self, new_category: NewCategory) -> DbResult<Category> {
        let mut conn = self.conn().await?;

        Ok(diesel::insert_into(schema::category::table)
            .values(&new_category)
            .returning(Category::as_select())
            .get_result::<Category>(&mut conn)
            .await?)
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update_category(
        &self,
        id: uuid::Uuid,
        changes: CategoryChanges,
    ) -> DbResult<Option<Category>> {
        let mut conn = self.conn().await?;

        Ok(diesel::update(schema::category::table.find(id))
            .set((
                &changes,
                schema::category::updated_at.eq(diesel::dsl::now),
            ))
            .returning(Category::as_select())
            .get_result::<Category>(&mut conn)
            .await
            .optional()?)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_category(&self, id: uuid::Uuid) -> DbResult<bool> {
        let mut conn = self.conn().await?;

        let deleted = diesel::delete(schema::category::table.find(id))
            .execute(&mut conn)
            .await?;
        Ok(deleted > 0)
    }

    async fn list_products(&self, category_id: Option<uuid::Uuid>) -> DbResult<Vec<Product>> {
        let mut conn = self.conn().await?;

        let mut query = schema::product::table
            .select(Product::as_select())
            .order(schema::product::name.asc())
            .into_boxed();
        if let Some(category_id) = category_id {
            query = query.filter(schema::product::category_id.eq(category_id));
        }

        Ok(query.load::<Product>(&mut conn).await?)
    }

    async fn find_product(&self, id: uuid::Uuid) -> DbResult<Option<Product>> {
        let mut conn = self.conn().await?;

        Ok(schema::product::table
            .find(id)
            .select(Product::as_select())
            .first::<Product>(&mut conn)
            .await
            .optional()?)
    }

    #[tracing::instrument(skip(self, new_product), fields(category_id = %new_product.category_id))]
    async fn create_product(&self, new_product: NewProduct) -> DbResult<Product> {
        let mut conn = self.conn().await?;

        Ok(diesel::insert_into(schema::product::table)
            .values(&new_product)
            .returning(Product::as_select())
            .get_result::<Product>(&mut conn)
            .await?)
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update_product(
        &self,
        id: uuid::Uuid,
        changes: ProductChanges,
    ) -> DbResult<Option<Product>> {
        let mut conn = self.conn().await?;

        Ok(diesel::update(schema::product::table.find(id))
            .set((
                &changes,
                schema::product::updated_at.eq(diesel::dsl::now),
            ))
            .returning(Product::as_select())
            .get_result::<Product>(&mut conn)
            .await
            .optional()?)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_product(&self, id: uuid::Uuid) -> DbResult<bool> {
        let mut conn = self.conn().await?;

        let deleted = diesel::delete(schema::product::table.find(id))
            .execute(&mut conn)
            .await?;
        Ok(deleted > 0)
    }
}
