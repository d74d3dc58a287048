use chrono::{DateTime, Utc};
use crudrouter::validation::validators::{validate_length, validate_range, validate_required};
use crudrouter::{CrudResource, Validatable, ValidationErrors};
use sea_orm::{ActiveValue::NotSet, IntoActiveModel, Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub age: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
}

impl IntoActiveModel<ActiveModel> for UserCreate {
    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            name: Set(self.name),
            email: Set(self.email),
            age: Set(self.age),
            created_at: Set(Utc::now()),
        }
    }
}

fn collect(checks: impl IntoIterator<Item = Result<(), crudrouter::ValidationError>>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for check in checks {
        if let Err(e) = check {
            errors.add(e);
        }
    }
    errors.result()
}

impl Validatable for UserCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        collect([
            validate_required("name", &self.name),
            validate_length("email", &self.email, Some(3), Some(255)),
            self.age.map_or(Ok(()), |age| validate_range("age", age, Some(0), Some(150))),
        ])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

impl Validatable for UserUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        collect([
            self.name
                .as_deref()
                .map_or(Ok(()), |name| validate_required("name", name)),
            self.age
                .map_or(Ok(()), |age| validate_range("age", age, Some(0), Some(150))),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub created_at: DateTime<Utc>,
}

pub struct Users;

impl CrudResource for Users {
    type Entity = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;
    type Single = UserResponse;
    type Create = UserCreate;
    type Update = UserUpdate;

    const ID_COLUMN: Column = Column::Id;
    const ENTITY_NAME: &'static str = "User";
}
