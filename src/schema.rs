//! Conversions between API schemas and Sea-ORM models.

use sea_orm::{
    ActiveModelTrait, ActiveValue, DbErr, EntityTrait, IdenStatic, IntoActiveModel, Iterable,
    Value,
};
use serde::{Serialize, de::DeserializeOwned};
use std::str::FromStr;

use crate::traits::CrudResource;

type ColumnOf<R> = <<R as CrudResource>::Entity as EntityTrait>::Column;

fn json_err(err: &serde_json::Error) -> DbErr {
    DbErr::Json(err.to_string())
}

/// Serialize a schema to a JSON object, dropping `null` (unset) fields.
fn set_fields<S: Serialize>(schema: &S) -> Result<serde_json::Map<String, serde_json::Value>, DbErr> {
    match serde_json::to_value(schema).map_err(|e| json_err(&e))? {
        serde_json::Value::Object(map) => Ok(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        other => Err(DbErr::Json(format!("expected a JSON object, got {other}"))),
    }
}

pub struct SchemaConverter;

impl SchemaConverter {
    /// Build an active model from a create schema, then force `extra_fields`.
    ///
    /// Fields the schema doesn't produce stay `NotSet`, so database and
    /// `ActiveModelBehavior` defaults still apply.
    pub fn schema_to_model<R: CrudResource>(
        schema: R::Create,
        extra_fields: impl IntoIterator<Item = (ColumnOf<R>, Value)>,
    ) -> R::ActiveModel {
        let mut active_model = schema.into_active_model();
        for (column, value) in extra_fields {
            active_model.set(column, value);
        }
        active_model
    }

    /// Overlay the non-null fields of `schema` onto an existing row.
    ///
    /// The returned active model is `Unchanged` everywhere except the columns
    /// named by the schema, which are `Set`. Keys that name no column, and the
    /// id column, are ignored.
    ///
    /// # Errors
    ///
    /// Returns `DbErr::Json` when the schema or the merged row cannot be
    /// (de)serialized, e.g. a value of the wrong type for its column.
    pub fn update_model_from_schema<R, S>(model: R::Model, schema: &S) -> Result<R::ActiveModel, DbErr>
    where
        R: CrudResource,
        S: Serialize,
    {
        let changes = set_fields(schema)?;

        let mut row = match serde_json::to_value(&model).map_err(|e| json_err(&e))? {
            serde_json::Value::Object(map) => map,
            other => return Err(DbErr::Json(format!("model serialized to {other}"))),
        };
        let id_column = R::ID_COLUMN;
        let mut changed_columns = Vec::with_capacity(changes.len());
        for (key, value) in changes {
            if key == id_column.as_str() {
                continue;
            }
            if let Ok(column) = ColumnOf::<R>::from_str(&key) {
                changed_columns.push(column);
                row.insert(key, value);
            }
        }

        let merged: R::Model =
            serde_json::from_value(serde_json::Value::Object(row)).map_err(|e| json_err(&e))?;
        let mut active_model: R::ActiveModel = merged.into_active_model();
        for column in changed_columns {
            if let Some(value) = active_model.get(column).into_value() {
                active_model.set(column, value);
            }
        }
        Ok(active_model)
    }

    /// Build a response schema from a model row, matching fields by name.
    ///
    /// # Errors
    ///
    /// Returns `DbErr::Json` when the schema cannot be built from the row.
    pub fn model_to_schema<M, S>(model: M) -> Result<S, DbErr>
    where
        M: Serialize,
        S: DeserializeOwned,
    {
        let value = serde_json::to_value(model).map_err(|e| json_err(&e))?;
        serde_json::from_value(value).map_err(|e| json_err(&e))
    }

    /// Mark every column that holds a value as `Set`, so an insert writes the
    /// whole row.
    pub fn mark_all_set<A: ActiveModelTrait>(mut active_model: A) -> A {
        for column in <<A::Entity as EntityTrait>::Column>::iter() {
            if let ActiveValue::Unchanged(value) = active_model.get(column) {
                active_model.set(column, value);
            }
        }
        active_model
    }
}
