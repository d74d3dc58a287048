//! Users CRUD API
//!
//! ```bash
//! cargo run --example users_api
//! ```
//!
//! Settings come from `DB_*` variables (see `crudrouter::config`); by default
//! a `test.db` SQLite file is used. Then try:
//!
//! ```bash
//! curl -X POST localhost:3000/api/v1/users -H 'content-type: application/json' \
//!      -d '{"name":"Ann","email":"ann@example.com","age":31}'
//! curl 'localhost:3000/api/v1/users?page=1&size=10&order_by=-age'
//! ```

use crudrouter::validation::validators::{validate_range, validate_required};
use crudrouter::{
    BaseService, CrudResource, DatabaseConfig, DatabaseInitializer, Validatable, ValidationErrors,
    crud_routers,
};
use sea_orm::{ActiveValue::NotSet, DatabaseConnection, IntoActiveModel, Set, entity::prelude::*};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub name: String,
    #[sea_orm(unique, indexed)]
    pub email: String,
    pub age: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub age: i32,
}

impl IntoActiveModel<ActiveModel> for UserCreate {
    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            name: Set(self.name),
            email: Set(self.email),
            age: Set(self.age),
        }
    }
}

impl Validatable for UserCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for check in [
            validate_required("name", &self.name),
            validate_required("email", &self.email),
            validate_range("age", self.age, Some(0), None),
        ] {
            if let Err(e) = check {
                errors.add(e);
            }
        }
        errors.result()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

impl Validatable for UserUpdate {}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: i32,
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let init = DatabaseInitializer::connect(DatabaseConfig::from_env()?).await?;
    init.initialize([init.table_for(Entity)]).await?;
    let db = init.connection().clone();

    let users = crud_routers::<Users, _, _, _>(
        |db: &DatabaseConnection| BaseService::<Users>::new(db.clone()),
        axum::Router::new(),
    );
    let app = axum::Router::new()
        .nest("/api/v1/users", users)
        .layer(TraceLayer::new_for_http())
        .with_state(db);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("Users API listening on http://0.0.0.0:3000/api/v1/users");
    axum::serve(listener, app).await?;

    init.close().await?;
    Ok(())
}
