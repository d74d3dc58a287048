use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, EntityTrait, FromQueryResult, IntoActiveModel,
    ModelTrait,
};
use serde::{Serialize, de::DeserializeOwned};

use crate::validation::Validatable;

/// Binds a Sea-ORM entity to the schemas its generated routes speak.
///
/// The list schema is always [`crate::pagination::Paginated`]`<Self::Single>`.
///
/// ```rust,ignore
/// pub struct Users;
///
/// impl CrudResource for Users {
///     type Entity = user::Entity;
///     type Model = user::Model;
///     type ActiveModel = user::ActiveModel;
///     type Single = UserResponse;
///     type Create = UserCreate;
///     type Update = UserUpdate;
///
///     const ID_COLUMN: user::Column = user::Column::Id;
///     const ENTITY_NAME: &'static str = "User";
/// }
/// ```
pub trait CrudResource: Send + Sync + 'static {
    type Entity: EntityTrait<Model = Self::Model> + Send + Sync;
    type Model: ModelTrait<Entity = Self::Entity>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModel>
        + Serialize
        + DeserializeOwned
        + Clone
        + Send
        + Sync;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync;

    /// Response schema for a single row, built from the model by field name.
    type Single: Serialize + DeserializeOwned + Send;
    /// Request body of `POST /`.
    type Create: IntoActiveModel<Self::ActiveModel> + DeserializeOwned + Validatable + Send;
    /// Request body of `PUT /{id}`. Absent or `null` fields leave the row untouched.
    type Update: Serialize + DeserializeOwned + Validatable + Send;

    /// UUID primary key column
    const ID_COLUMN: <Self::Entity as EntityTrait>::Column;
    /// Used in "{name} not found" messages and the `Content-Range` header
    const ENTITY_NAME: &'static str = "Item";
}

/// Entities that keep history: an update deactivates the current row and
/// inserts a successor pointing back at it.
pub trait VersionedResource: CrudResource {
    /// Boolean column, `true` for the current version
    const ACTIVE_COLUMN: <Self::Entity as EntityTrait>::Column;
    /// Nullable UUID column referencing the row this one replaced
    const PREVIOUS_VERSION_COLUMN: <Self::Entity as EntityTrait>::Column;
}
