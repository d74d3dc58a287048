#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use crudrouter::{BaseService, DatabaseConfig, DatabaseInitializer, VersionedService, crud_routers};
use sea_orm::{DatabaseConnection, DbErr};
use serde_json::Value;
use tower::ServiceExt;

pub mod document_entity;
pub mod user_entity;

use document_entity::Documents;
use user_entity::Users;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let init = DatabaseInitializer::connect(DatabaseConfig::in_memory()).await?;
    init.initialize([
        init.table_for(user_entity::Entity),
        init.table_for(document_entity::Entity),
    ])
    .await?;
    Ok(init.connection().clone())
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    let users = crud_routers::<Users, _, _, _>(
        |db: &DatabaseConnection| BaseService::<Users>::new(db.clone()),
        Router::new(),
    );
    let documents = crud_routers::<Documents, _, _, _>(
        |db: &DatabaseConnection| VersionedService::<Documents>::new(db.clone()),
        Router::new(),
    );

    Router::new()
        .nest("/api/v1/users", users)
        .nest("/api/v1/documents", documents)
        .with_state(db)
}

/// Send one request and return the status plus the body parsed as JSON
/// (`Value::Null` for an empty body).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, json) = send_with_headers(app, method, uri, body).await;
    (status, json)
}

pub async fn send_with_headers(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
}

pub fn filters_query(filters: &Value) -> String {
    format!(
        "filters={}",
        url_escape::encode_component(&filters.to_string())
    )
}
