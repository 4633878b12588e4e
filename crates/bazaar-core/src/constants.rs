/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const AUTH_ROUTE_COMPONENT: &str = "auth";
pub const AUTH_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", AUTH_ROUTE_COMPONENT);

pub const USERS_ROUTE_COMPONENT: &str = "users";
pub const USERS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", USERS_ROUTE_COMPONENT);

pub const ROLES_ROUTE_COMPONENT: &str = "roles";
pub const ROLES_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", ROLES_ROUTE_COMPONENT);

pub const CATEGORIES_ROUTE_COMPONENT: &str = "categories";
pub const CATEGORIES_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", CATEGORIES_ROUTE_COMPONENT);

pub const PRODUCTS_ROUTE_COMPONENT: &str = "products";
pub const PRODUCTS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", PRODUCTS_ROUTE_COMPONENT);

pub const HEALTHCHECK_ROUTE_COMPONENT: &str = "healthcheck";
pub const HEALTHCHECK_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", HEALTHCHECK_ROUTE_COMPONENT);

/// Role every newly registered user receives.
pub const DEFAULT_USER_ROLE: &str = "ROLE_USER";
/// Role that unlocks catalog mutation and role management.
pub const DEFAULT_ADMIN_ROLE: &str = "ROLE_ADMIN";

/// `database.url` value that selects the in-process store.
pub const MEMORY_DATABASE_URL: &str = "memory";

/// Authorization scheme carrying session tokens.
pub const BEARER_SCHEME: &str = "Bearer";

/// Minimum accepted length of the token signing secret, in bytes.
pub const MIN_SIGNING_SECRET_LEN: usize = 32;
