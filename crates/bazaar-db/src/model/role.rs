use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::schema;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Identifiable, Queryable, Selectable, Serialize)]
#[diesel(table_name = schema::role)]
#[diesel(check_for_backend(Pg))]
pub struct Role {
    pub id: uuid::Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::role)]
pub struct NewRole<'a> {
    pub id: uuid::Uuid,
    pub name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Insertable)]
#[diesel(table_name = schema::user_role)]
pub struct NewUserRole {
    pub user_id: uuid::Uuid,
    pub role_id: uuid::Uuid,
}
