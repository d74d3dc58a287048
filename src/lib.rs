//! # crudrouter
//!
//! Generates REST endpoints for Sea-ORM entities on an Axum [`Router`](axum::Router).
//!
//! Describe a resource once with [`CrudResource`], pick a service, and mount
//! the routes:
//!
//! ```rust,ignore
//! use crudrouter::{BaseService, crud_routers};
//!
//! let users = crud_routers::<Users, _, _, _>(
//!     |db: &DatabaseConnection| BaseService::<Users>::new(db.clone()),
//!     Router::new(),
//! );
//! let app = Router::new().nest("/api/v1/users", users).with_state(db);
//! ```
//!
//! The list endpoint pages (`page`, `page_size`/`size`), filters (`filters`,
//! a JSON object, see [`filter`]) and sorts (`order_by=name,-age`).

pub mod config;
pub mod database;
pub mod errors;
pub mod extract;
pub mod filter;
pub mod pagination;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sort;
pub mod traits;
pub mod validation;

pub use config::{ConfigError, DatabaseConfig};
pub use database::DatabaseInitializer;
pub use errors::ApiError;
pub use extract::{ValidJson, ValidPath, ValidQuery};
pub use filter::{FilterOperator, Filters};
pub use pagination::{PageRequest, Paginated, PaginationMeta, PaginationParams};
pub use repository::Repository;
pub use routes::crud_routers;
pub use schema::SchemaConverter;
pub use service::{BaseService, CrudService, VersionedService};
pub use sort::SortField;
pub use traits::{CrudResource, VersionedResource};
pub use validation::{Validatable, ValidationError, ValidationErrors};
