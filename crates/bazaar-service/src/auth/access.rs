//! Route-level access decisions.
//!
//! ## Summary
//! An [`AccessPolicy`] is an ordered list of [`AccessRule`]s built once when
//! the router is assembled. For each request the first rule whose path
//! pattern (and method filter, if any) matches decides; requests that match
//! no rule need an authenticated caller.
//!
//! Patterns are `/`-separated. `*` matches exactly one segment and `**`
//! matches any number of segments, including none. Request paths are split
//! and percent-decoded segment by segment, the same way the router resolves
//! them, before they are matched.

use std::borrow::Cow;
use std::collections::BTreeSet;

use salvo::http::Method;

use bazaar_core::constants::{
    AUTH_ROUTE_PREFIX, CATEGORIES_ROUTE_PREFIX, HEALTHCHECK_ROUTE_PREFIX, PRODUCTS_ROUTE_PREFIX,
    ROLES_ROUTE_PREFIX,
};

use super::depot::AuthContext;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Single,
    Any,
}

/// Compiled path glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|segment| match segment {
                "**" => Segment::Any,
                "*" => Segment::Single,
                literal => Segment::Literal(literal.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Matches a raw request path; `%xx` escapes are decoded per segment.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let decoded: Vec<Cow<'_, str>> = split_path(path).map(decode_segment).collect();
        let path: Vec<&str> = decoded.iter().map(AsRef::as_ref).collect();
        match_segments(&self.segments, &path)
    }
}

fn decode_segment(segment: &str) -> Cow<'_, str> {
    if !segment.contains('%') {
        return Cow::Borrowed(segment);
    }
    // invalid UTF-8 is replaced rather than rejected, as the router does
    let bytes = urlencoding::decode_binary(segment.as_bytes());
    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::Any, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((Segment::Single, rest)) => {
            path.split_first()
                .is_some_and(|(_, tail)| match_segments(rest, tail))
        }
        Some((Segment::Literal(literal), rest)) => path
            .split_first()
            .is_some_and(|(head, tail)| head == literal && match_segments(rest, tail)),
    }
}

/// What a matched rule demands of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    PermitAll,
    RequireAuthenticated,
    /// The caller must hold at least one of these roles.
    AnyRole(BTreeSet<String>),
}

impl Requirement {
    #[must_use]
    pub fn role(role: impl Into<String>) -> Self {
        Self::AnyRole(BTreeSet::from([role.into()]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pattern: RoutePattern,
    /// `None` matches every method.
    methods: Option<Vec<Method>>,
    requirement: Requirement,
}

impl AccessRule {
    #[must_use]
    pub fn new(pattern: &str, requirement: Requirement) -> Self {
        Self {
            pattern: RoutePattern::new(pattern),
            methods: None,
            requirement,
        }
    }

    /// Restricts the rule to the given methods.
    #[must_use]
    pub fn with_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = Some(methods.into_iter().collect());
        self
    }

    #[must_use]
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.methods
            .as_ref()
            .is_none_or(|methods| methods.contains(method))
            && self.pattern.matches(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No identity was established.
    Unauthorized,
    /// An identity was established but lacks a required role.
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    #[must_use]
    pub const fn new(rules: Vec<AccessRule>) -> Self {
        Self { rules }
    }

    /// ## Summary
    /// The route table the API is served with.
    ///
    /// Auth endpoints and the health check are public, role management is
    /// admin only, catalog mutation is admin only, and everything else needs
    /// a signed-in caller.
    #[must_use]
    pub fn default_rules(admin_role: &str) -> Self {
        let mutating = [Method::POST, Method::PUT, Method::PATCH, Method::DELETE];
        Self::new(vec![
            AccessRule::new(&format!("{AUTH_ROUTE_PREFIX}/**"), Requirement::PermitAll),
            AccessRule::new(HEALTHCHECK_ROUTE_PREFIX, Requirement::PermitAll),
            AccessRule::new(
                &format!("{ROLES_ROUTE_PREFIX}/**"),
                Requirement::role(admin_role),
            ),
            AccessRule::new(
                &format!("{CATEGORIES_ROUTE_PREFIX}/**"),
                Requirement::role(admin_role),
            )
            .with_methods(mutating.clone()),
            AccessRule::new(
                &format!("{PRODUCTS_ROUTE_PREFIX}/**"),
                Requirement::role(admin_role),
            )
            .with_methods(mutating),
            AccessRule::new("/**", Requirement::RequireAuthenticated),
        ])
    }

    #[must_use]
    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    /// ## Summary
    /// Decides whether `context` may call `method path`.
    ///
    /// The first matching rule wins; with no match the caller must be
    /// authenticated.
    #[must_use]
    pub fn decide(&self, method: &Method, path: &str, context: &AuthContext) -> Decision {
        let requirement = self
            .rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map_or(&Requirement::RequireAuthenticated, |rule| &rule.requirement);

        match (requirement, context.identity()) {
            (Requirement::PermitAll, _) => Decision::Allow,
            (_, None) => Decision::Deny(DenyReason::Unauthorized),
            (Requirement::RequireAuthenticated, Some(_)) => Decision::Allow,
            (Requirement::AnyRole(roles), Some(identity)) => {
                if identity.has_any_role(roles.iter().map(String::as_str)) {
                    Decision::Allow
                } else {
                    Decision::Deny(DenyReason::Forbidden)
                }
            }
        }
    }
}
