//! # Route generation
//!
//! [`crud_routers`] adds five endpoints for one resource to a router:
//!
//! | Method | Path    | Success                                 |
//! |--------|---------|-----------------------------------------|
//! | GET    | `/`     | 200, `Paginated<Single>` + Content-Range |
//! | GET    | `/{id}` | 200, `Single`                           |
//! | POST   | `/`     | 201, `Single`                           |
//! | PUT    | `/{id}` | 200, `Single`                           |
//! | DELETE | `/{id}` | 204                                     |
//!
//! Handlers hold no state of their own. Each request builds a service from the
//! router state with the factory passed to [`crud_routers`].
//!
//! ```rust,ignore
//! let users = crud_routers::<Users, _, _, _>(
//!     |db: &DatabaseConnection| BaseService::<Users>::new(db.clone()),
//!     Router::new(),
//! );
//! let app = Router::new().nest("/api/v1/users", users).with_state(db);
//! ```

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::extract::{ValidJson, ValidPath, ValidQuery};
use crate::filter::Filters;
use crate::pagination::{PaginationParams, calculate_content_range, calculate_offset};
use crate::schema::SchemaConverter;
use crate::service::CrudService;
use crate::sort::parse_order_by;
use crate::traits::CrudResource;
use crate::validation::Validatable;

/// List one page of `R`, honouring `filters` and `order_by`.
///
/// # Errors
///
/// 422 for invalid paging or filter parameters, 500 for database failures.
pub async fn get_all<R, Svc>(service: &Svc, params: PaginationParams) -> Result<Response, ApiError>
where
    R: CrudResource,
    Svc: CrudService<R>,
{
    params.validate()?;
    let filters = Filters::parse(params.filters.as_deref())?;
    let order_by = parse_order_by(params.order_by.as_deref());

    let page = service
        .get_filtered(&filters, &order_by, params.page_request())
        .await?;
    let page = page.try_map(SchemaConverter::model_to_schema::<R::Model, R::Single>)?;

    let offset = calculate_offset(page.pagination.page, page.pagination.page_size);
    let returned = u64::try_from(page.items.len()).unwrap_or(u64::MAX);
    let headers = calculate_content_range(
        offset,
        returned,
        page.pagination.total,
        R::ENTITY_NAME,
    );
    Ok((headers, Json(page)).into_response())
}

/// # Errors
///
/// 404 when no row has this id.
pub async fn get_one<R, Svc>(service: &Svc, id: Uuid) -> Result<Json<R::Single>, ApiError>
where
    R: CrudResource,
    Svc: CrudService<R>,
{
    let model = service
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(R::ENTITY_NAME))?;
    Ok(Json(SchemaConverter::model_to_schema(model)?))
}

/// # Errors
///
/// 422 when the body fails validation (nothing is written), 409 on a unique
/// constraint violation.
pub async fn create_one<R, Svc>(
    service: &Svc,
    payload: R::Create,
) -> Result<(StatusCode, Json<R::Single>), ApiError>
where
    R: CrudResource,
    Svc: CrudService<R>,
{
    payload.validate()?;
    let model = SchemaConverter::schema_to_model::<R>(payload, std::iter::empty());
    let created = service.create(model).await?;
    Ok((
        StatusCode::CREATED,
        Json(SchemaConverter::model_to_schema(created)?),
    ))
}

/// Overlay the non-null fields of `payload` onto row `id`.
///
/// # Errors
///
/// 422 when the body fails validation, 404 when no row has this id.
pub async fn update_one<R, Svc>(
    service: &Svc,
    id: Uuid,
    payload: R::Update,
) -> Result<Json<R::Single>, ApiError>
where
    R: CrudResource,
    Svc: CrudService<R>,
{
    payload.validate()?;
    let current = service
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(R::ENTITY_NAME))?;
    let changes = SchemaConverter::update_model_from_schema::<R, _>(current, &payload)?;
    let updated = service.update(id, changes).await?;
    Ok(Json(SchemaConverter::model_to_schema(updated)?))
}

/// # Errors
///
/// 404 when nothing was deleted.
pub async fn delete_one<R, Svc>(service: &Svc, id: Uuid) -> Result<StatusCode, ApiError>
where
    R: CrudResource,
    Svc: CrudService<R>,
{
    if service.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(R::ENTITY_NAME))
    }
}

/// Register the CRUD endpoints of `R` on `router` and return it.
///
/// `service_dependency` is called once per request with the router state.
pub fn crud_routers<R, Svc, St, F>(service_dependency: F, router: Router<St>) -> Router<St>
where
    R: CrudResource,
    Svc: CrudService<R> + 'static,
    St: Clone + Send + Sync + 'static,
    F: Fn(&St) -> Svc + Clone + Send + Sync + 'static,
{
    let list = {
        let factory = service_dependency.clone();
        move |State(state): State<St>, ValidQuery(params): ValidQuery<PaginationParams>| {
            let service = factory(&state);
            async move { get_all::<R, _>(&service, params).await }
        }
    };
    let read = {
        let factory = service_dependency.clone();
        move |State(state): State<St>, ValidPath(id): ValidPath<Uuid>| {
            let service = factory(&state);
            async move { get_one::<R, _>(&service, id).await }
        }
    };
    let create = {
        let factory = service_dependency.clone();
        move |State(state): State<St>, ValidJson(payload): ValidJson<R::Create>| {
            let service = factory(&state);
            async move { create_one::<R, _>(&service, payload).await }
        }
    };
    let update = {
        let factory = service_dependency.clone();
        move |State(state): State<St>,
              ValidPath(id): ValidPath<Uuid>,
              ValidJson(payload): ValidJson<R::Update>| {
            let service = factory(&state);
            async move { update_one::<R, _>(&service, id, payload).await }
        }
    };
    let delete = {
        let factory = service_dependency;
        move |State(state): State<St>, ValidPath(id): ValidPath<Uuid>| {
            let service = factory(&state);
            async move { delete_one::<R, _>(&service, id).await }
        }
    };

    router
        .route("/", get(list).post(create))
        .route("/{id}", get(read).put(update).delete(delete))
}
