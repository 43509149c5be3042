//! Query parameters accepted by the read API, with validation.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::geo::{DEFAULT_NEARBY_RADIUS_KM, MAX_NEARBY_RADIUS_KM, MIN_NEARBY_RADIUS_KM};
use crate::types::DbId;

/// Columns a listing feed may be ordered by.
pub const VALID_ORDERING_FIELDS: &[&str] = &["created_at", "price", "views"];

/// Sort order of a listing feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub field: &'static str,
    pub descending: bool,
}

impl Default for Ordering {
    /// Newest first.
    fn default() -> Self {
        Self {
            field: "created_at",
            descending: true,
        }
    }
}

impl Ordering {
    /// Parse `field` or `-field` (descending), restricted to
    /// [`VALID_ORDERING_FIELDS`].
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let field = VALID_ORDERING_FIELDS
            .iter()
            .find(|f| **f == name)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid ordering '{raw}'. Must be one of: {}",
                    VALID_ORDERING_FIELDS.join(", ")
                ))
            })?;
        Ok(Self { field, descending })
    }

    /// SQL `ORDER BY` body. The column name comes from a fixed whitelist.
    pub fn to_sql(&self) -> String {
        let dir = if self.descending { "DESC" } else { "ASC" };
        format!("l.{} {dir} NULLS LAST, l.id DESC", self.field)
    }
}

/// Filters for `GET /api/listings`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_price_range"))]
pub struct ListingFilter {
    /// Category id; matches the category itself and its children.
    pub category: Option<DbId>,
    #[validate(range(min = 0.0))]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_price: Option<f64>,
    /// Case-insensitive substring of the location.
    #[validate(length(max = 100))]
    pub location: Option<String>,
    /// Case-insensitive substring of title, description or location.
    #[validate(length(max = 200))]
    pub search: Option<String>,
    pub ordering: Option<String>,
}

fn validate_price_range(filter: &ListingFilter) -> Result<(), ValidationError> {
    if [filter.min_price, filter.max_price]
        .into_iter()
        .flatten()
        .any(|p| !p.is_finite())
    {
        return Err(ValidationError::new("price must be a finite number"));
    }
    match (filter.min_price, filter.max_price) {
        (Some(min), Some(max)) if min > max => {
            Err(ValidationError::new("min_price must not exceed max_price"))
        }
        _ => Ok(()),
    }
}

impl ListingFilter {
    /// Validate the filter and resolve its ordering.
    pub fn checked_ordering(&self) -> Result<Ordering, CoreError> {
        self.validate()?;
        match self.ordering.as_deref() {
            Some(raw) if !raw.is_empty() => Ordering::parse(raw),
            _ => Ok(Ordering::default()),
        }
    }

    /// `%term%` pattern for `ILIKE`, with LIKE metacharacters escaped.
    pub fn like_pattern(term: &str) -> String {
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{escaped}%")
    }
}

/// Query parameters of `GET /api/listings/{id}/nearby/`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_finite_radius"))]
pub struct NearbyQuery {
    #[validate(range(min = MIN_NEARBY_RADIUS_KM, max = MAX_NEARBY_RADIUS_KM))]
    pub radius: Option<f64>,
}

// `range` compares, and every comparison with NaN is false.
fn validate_finite_radius(query: &NearbyQuery) -> Result<(), ValidationError> {
    match query.radius {
        Some(r) if !r.is_finite() => Err(ValidationError::new("radius must be a finite number")),
        _ => Ok(()),
    }
}

impl NearbyQuery {
    /// Validated radius in kilometres, defaulting to 10 km.
    pub fn radius_km(&self) -> Result<f64, CoreError> {
        self.validate()?;
        Ok(self.radius.unwrap_or(DEFAULT_NEARBY_RADIUS_KM))
    }
}
