// Mirrors migrations/2025-01-01-000000_initial/up.sql

diesel::table! {
    role (id) {
        id -> Uuid,
        name -> Text,
    }
}

diesel::table! {
    app_user (id) {
        id -> Uuid,
        username -> Text,
        email -> Text,
        password_hash -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    user_role (user_id, role_id) {
        user_id -> Uuid,
        role_id -> Uuid,
    }
}

diesel::table! {
    category (id) {
        id -> Uuid,
        name -> Text,
        slug -> Text,
        description -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    product (id) {
        id -> Uuid,
        category_id -> Uuid,
        name -> Text,
        slug -> Text,
        description -> Nullable<Text>,
        price_cents -> Int8,
        stock -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(user_role -> app_user (user_id));
diesel::joinable!(user_role -> role (role_id));
diesel::joinable!(product -> category (category_id));

diesel::allow_tables_to_appear_in_same_query!(role, app_user, user_role, category, product);
