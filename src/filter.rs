//! # Filtering
//!
//! The list endpoint accepts a `filters` query parameter holding a JSON object.
//! Each key names a column; keys naming no column are ignored.
//!
//! ```text
//! {"name": "Ann"}                    name = 'Ann'
//! {"deleted_at": null}               deleted_at IS NULL
//! {"name": {"contains": "nn"}}       name LIKE '%nn%'
//! {"name": {"icontains": "ANN"}}     UPPER(name) LIKE '%ANN%'
//! {"name": {"starts_with": "A"}}     name LIKE 'A%'
//! {"name": {"ends_with": "n"}}       name LIKE '%n'
//! {"name": {"exact": "Ann"}}         name = 'Ann'
//! {"age": {"in": [18, 21]}}          age IN (18, 21)
//! {"age": {"gte": 18}}               age >= 18    (also gt, lt, lte)
//! ```
//!
//! An operator object uses the first operator it contains, checked in the
//! order above (`contains` before `starts_with` before `ends_with` before
//! `icontains`, ...). Objects with no known operator are ignored. Several
//! keys are combined with `AND`.

use sea_orm::{
    ColumnTrait, ColumnType, Condition, EntityTrait, Value,
    sea_query::{Expr, Func, SimpleExpr},
};
use serde_json::{Map, Value as Json};
use std::str::FromStr;
use uuid::Uuid;

use crate::traits::CrudResource;
use crate::validation::{ValidationError, ValidationErrors};

const MAX_FIELD_VALUE_LENGTH: usize = 10_000;

/// Operator names in precedence order
const OPERATORS: [&str; 10] = [
    "contains",
    "starts_with",
    "ends_with",
    "icontains",
    "exact",
    "in",
    "gt",
    "gte",
    "lt",
    "lte",
];

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOperator {
    Eq(Json),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    IContains(String),
    In(Vec<Json>),
    Gt(Json),
    Gte(Json),
    Lt(Json),
    Lte(Json),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub operator: FilterOperator,
}

/// Parsed `filters` parameter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters(Vec<FieldFilter>);

impl Filters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition, builder style.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, operator: FilterOperator) -> Self {
        self.0.push(FieldFilter {
            field: field.into(),
            operator,
        });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldFilter> {
        self.0.iter()
    }

    /// Parse the raw query parameter. `None` and blank strings mean no filters.
    ///
    /// # Errors
    ///
    /// Returns validation errors for malformed JSON, a non-object document,
    /// or operator values of the wrong shape.
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationErrors> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::new());
        };
        let document: Json = serde_json::from_str(raw)
            .map_err(|e| ValidationError::new("filters", format!("Invalid JSON: {e}")))?;
        let Json::Object(fields) = document else {
            return Err(ValidationError::new("filters", "Must be a JSON object").into());
        };

        let mut errors = ValidationErrors::new();
        let mut filters = Self::new();
        for (field, value) in fields {
            match parse_operator(&field, value) {
                Ok(Some(operator)) => filters.0.push(FieldFilter { field, operator }),
                Ok(None) => {}
                Err(e) => errors.add(e),
            }
        }
        errors.result().map(|()| filters)
    }
}

fn string_operand(field: &str, op: &str, value: Json) -> Result<String, ValidationError> {
    match value {
        Json::String(s) if s.len() <= MAX_FIELD_VALUE_LENGTH => Ok(s),
        Json::String(_) => Err(ValidationError::new(field, "Filter value too long")),
        _ => Err(ValidationError::new(field, format!("'{op}' expects a string"))),
    }
}

fn scalar_operand(field: &str, op: &str, value: Json) -> Result<Json, ValidationError> {
    match value {
        Json::Array(_) | Json::Object(_) => Err(ValidationError::new(
            field,
            format!("'{op}' expects a scalar value"),
        )),
        scalar => Ok(scalar),
    }
}

fn parse_operator(field: &str, value: Json) -> Result<Option<FilterOperator>, ValidationError> {
    let mut ops: Map<String, Json> = match value {
        Json::Object(ops) => ops,
        Json::Array(_) => {
            return Err(ValidationError::new(
                field,
                "Use {\"in\": [...]} to match several values",
            ));
        }
        scalar => return Ok(Some(FilterOperator::Eq(scalar))),
    };

    let Some(op) = OPERATORS.into_iter().find(|op| ops.contains_key(*op)) else {
        return Ok(None);
    };
    let operand = ops.remove(op).unwrap_or(Json::Null);
    let operator = match op {
        "contains" => FilterOperator::Contains(string_operand(field, op, operand)?),
        "starts_with" => FilterOperator::StartsWith(string_operand(field, op, operand)?),
        "ends_with" => FilterOperator::EndsWith(string_operand(field, op, operand)?),
        "icontains" => FilterOperator::IContains(string_operand(field, op, operand)?),
        "exact" => FilterOperator::Eq(scalar_operand(field, op, operand)?),
        "in" => match operand {
            Json::Array(values) => FilterOperator::In(values),
            _ => return Err(ValidationError::new(field, "'in' expects an array")),
        },
        "gt" => FilterOperator::Gt(scalar_operand(field, op, operand)?),
        "gte" => FilterOperator::Gte(scalar_operand(field, op, operand)?),
        "lt" => FilterOperator::Lt(scalar_operand(field, op, operand)?),
        _ => FilterOperator::Lte(scalar_operand(field, op, operand)?),
    };
    Ok(Some(operator))
}

/// Bind a JSON scalar for `column`. Strings bind as UUIDs on UUID columns.
fn json_to_value<C: ColumnTrait>(column: C, value: &Json) -> Option<Value> {
    match value {
        Json::Bool(b) => Some((*b).into()),
        Json::Number(n) => n
            .as_i64()
            .map(Value::from)
            .or_else(|| n.as_f64().map(Value::from)),
        Json::String(s) => {
            if matches!(column.def().get_column_type(), ColumnType::Uuid) {
                Uuid::parse_str(s.trim()).ok().map(Value::from)
            } else {
                Some(s.clone().into())
            }
        }
        Json::Null | Json::Array(_) | Json::Object(_) => None,
    }
}

/// Always false, for values that cannot be bound to their column
fn match_nothing() -> SimpleExpr {
    Expr::val(1).eq(0)
}

fn compare<C: ColumnTrait>(
    column: C,
    value: &Json,
    op: impl FnOnce(C, Value) -> SimpleExpr,
) -> SimpleExpr {
    json_to_value(column, value).map_or_else(match_nothing, |v| op(column, v))
}

fn build_expr<C: ColumnTrait>(column: C, operator: &FilterOperator) -> SimpleExpr {
    match operator {
        FilterOperator::Eq(Json::Null) => column.is_null(),
        FilterOperator::Eq(value) => compare(column, value, |c, v| c.eq(v)),
        FilterOperator::Contains(s) => column.contains(s.as_str()),
        FilterOperator::StartsWith(s) => column.starts_with(s.as_str()),
        FilterOperator::EndsWith(s) => column.ends_with(s.as_str()),
        FilterOperator::IContains(s) => Expr::expr(Func::upper(Expr::col(column)))
            .like(format!("%{}%", s.to_uppercase())),
        // Unbindable entries can never match, so they drop out of the list.
        FilterOperator::In(values) => {
            let bound: Vec<Value> = values
                .iter()
                .filter_map(|v| json_to_value(column, v))
                .collect();
            if bound.is_empty() {
                match_nothing()
            } else {
                column.is_in(bound)
            }
        }
        FilterOperator::Gt(value) => compare(column, value, |c, v| c.gt(v)),
        FilterOperator::Gte(value) => compare(column, value, |c, v| c.gte(v)),
        FilterOperator::Lt(value) => compare(column, value, |c, v| c.lt(v)),
        FilterOperator::Lte(value) => compare(column, value, |c, v| c.lte(v)),
    }
}

/// Translate parsed filters into a Sea-ORM condition for `R`'s entity.
///
/// Unknown columns are skipped. A value that cannot be bound to its column,
/// such as a non-UUID string on a UUID column, matches no rows.
#[must_use]
pub fn apply_filters<R: CrudResource>(filters: &Filters) -> Condition {
    filters.iter().fold(Condition::all(), |condition, filter| {
        let Ok(column) = <<R::Entity as EntityTrait>::Column>::from_str(&filter.field) else {
            tracing::debug!(field = %filter.field, "Ignoring filter on unknown column");
            return condition;
        };
        condition.add(build_expr(column, &filter.operator))
    })
}
