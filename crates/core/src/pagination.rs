//! Page/limit clamping, sort parsing and the paginated list envelope.

use serde::Serialize;

use crate::error::CoreError;

/// Default and maximum page size for one list endpoint.
#[derive(Debug, Clone, Copy)]
pub struct PageBounds {
    pub default_limit: i64,
    pub max_limit: i64,
}

/// A validated page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Clamp raw query values: `page >= 1`, `1 <= limit <= bounds.max_limit`.
    pub fn clamped(page: Option<i64>, limit: Option<i64>, bounds: PageBounds) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(bounds.default_limit)
                .clamp(1, bounds.max_limit),
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// `ceil(total / limit)`; zero rows means zero pages.
pub fn page_count(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// Paginated list envelope: `{ items, page, limit, total, pages }`.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            page: request.page,
            limit: request.limit,
            total,
            pages: page_count(total, request.limit),
        }
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A field that list endpoints may sort by.
pub trait SortField: Copy + Sized {
    /// Wire names accepted in `?sort=`, used in error messages.
    const ALLOWED: &'static [&'static str];

    fn from_wire(name: &str) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<K> {
    pub field: K,
    pub direction: SortDirection,
}

impl<K: SortField> Sort<K> {
    /// Parse `field` / `-field`. An absent or empty value yields `default`.
    pub fn parse(raw: Option<&str>, default: Self) -> Result<Self, CoreError> {
        let raw = match raw.map(str::trim) {
            None | Some("") => return Ok(default),
            Some(raw) => raw,
        };
        let (name, direction) = match raw.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (raw.strip_prefix('+').unwrap_or(raw), SortDirection::Asc),
        };
        let field = K::from_wire(name).ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid sort field '{name}'. Must be one of: {:?}",
                K::ALLOWED
            ))
        })?;
        Ok(Self { field, direction })
    }
}
