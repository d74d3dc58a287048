//! `order_by` parsing and ordering of list queries.

use sea_orm::{EntityTrait, Order, QueryOrder, Select};
use std::str::FromStr;

use crate::traits::CrudResource;

/// One `ORDER BY` term
#[derive(Debug, Clone, PartialEq)]
pub struct SortField {
    pub field: String,
    pub order: Order,
}

impl SortField {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: Order::Asc,
        }
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: Order::Desc,
        }
    }
}

/// Parse `"name,-age"` into ascending `name`, descending `age`.
/// Blank terms are skipped.
#[must_use]
pub fn parse_order_by(order_by: Option<&str>) -> Vec<SortField> {
    order_by
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .filter_map(|term| match term.strip_prefix('-') {
            Some(field) if !field.is_empty() => Some(SortField::desc(field)),
            Some(_) => None,
            None => Some(SortField::asc(term)),
        })
        .collect()
}

/// Apply the requested ordering to `query`, ignoring unknown columns.
///
/// Falls back to `R::ID_COLUMN` ascending when nothing usable was requested so
/// that pages are stable.
pub fn apply_ordering<R: CrudResource>(
    mut query: Select<R::Entity>,
    order_by: &[SortField],
) -> Select<R::Entity> {
    let mut applied = false;
    for sort in order_by {
        if let Ok(column) = <<R::Entity as EntityTrait>::Column>::from_str(&sort.field) {
            query = query.order_by(column, sort.order.clone());
            applied = true;
        }
    }
    if applied {
        query
    } else {
        query.order_by(R::ID_COLUMN, Order::Asc)
    }
}
