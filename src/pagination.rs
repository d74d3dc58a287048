//! Page-based pagination: request parameters, response metadata and the
//! generic list schema returned by `GET /`.

use axum::http::header::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::validation::{Validatable, ValidationError, ValidationErrors};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Largest row offset a database driver can bind (`OFFSET` is a signed 64-bit value)
pub const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

const fn default_page() -> u64 {
    DEFAULT_PAGE
}

const fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

/// Query parameters accepted by the generated list endpoint.
///
/// ```text
/// GET /users?page=2&size=10
/// GET /users?page_size=50&filters={"age":{"gte":18}}&order_by=-age,name
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    /// Page number, starting at 1.
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page, 1 to 100. Also accepted as `size`.
    #[serde(default = "default_page_size", alias = "size")]
    pub page_size: u64,
    /// JSON object of filters, see [`crate::filter`].
    pub filters: Option<String>,
    /// Comma separated columns, `-` prefix for descending.
    pub order_by: Option<String>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            filters: None,
            order_by: None,
        }
    }
}

impl PaginationParams {
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

impl Validatable for PaginationParams {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.page < 1 {
            errors.add(ValidationError::new("page", "Must be at least 1"));
        } else if (self.page - 1)
            .checked_mul(self.page_size)
            .is_none_or(|offset| offset > MAX_OFFSET)
        {
            errors.add(ValidationError::new("page", "Page number is too large"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            errors.add(ValidationError::new(
                "page_size",
                format!("Must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        errors.result()
    }
}

/// A page number and size handed to the service layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    #[must_use]
    pub fn new(total: u64, page: u64, page_size: u64) -> Self {
        let total_pages = if total > 0 && page_size > 0 {
            total.div_ceil(page_size)
        } else {
            0
        };
        Self {
            total,
            page,
            page_size,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// One page of items plus its metadata. Used both for repository results
/// (items are model rows) and as the list response schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Paginated<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, page: u64, page_size: u64) -> Self {
        Self {
            items,
            pagination: PaginationMeta::new(total, page, page_size),
        }
    }

    /// Convert every item, keeping the metadata. Stops at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Paginated<U>, E> {
        Ok(Paginated {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            pagination: self.pagination,
        })
    }
}

/// Row offset for a 1-based page
#[must_use]
pub const fn calculate_offset(page: u64, page_size: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(page_size)
}

#[must_use]
pub const fn calculate_limit(page_size: u64) -> u64 {
    page_size
}

fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// Build a `Content-Range` header such as `users 10-19/42`.
///
/// An empty page is reported as `users */42`. Control characters are
/// stripped from `resource_name` before it is put into the header.
#[must_use]
pub fn calculate_content_range(
    offset: u64,
    returned: u64,
    total_count: u64,
    resource_name: &str,
) -> HeaderMap {
    let safe_name = sanitize_resource_name(resource_name);
    let content_range = if returned == 0 {
        format!("{safe_name} */{total_count}")
    } else {
        let last = offset.saturating_add(returned - 1);
        format!("{safe_name} {offset}-{last}/{total_count}")
    };

    let mut headers = HeaderMap::new();
    if let Ok(value) = content_range.parse() {
        headers.insert("Content-Range", value);
    }
    headers
}
