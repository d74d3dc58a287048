use chrono::Utc;
use crudrouter::repository::{FALLBACK_PAGE_SIZE, MAX_REPOSITORY_PAGE_SIZE};
use crudrouter::{
    BaseService, CrudService, FilterOperator, Filters, PageRequest, Repository, SchemaConverter,
    SortField,
};
use sea_orm::{ActiveValue::NotSet, DbErr, IntoActiveModel, Set, Value};
use serde_json::json;
use uuid::Uuid;

mod common;
use common::setup_test_db;
use common::user_entity::{self, UserCreate, UserUpdate, Users};

fn new_user(n: usize) -> user_entity::ActiveModel {
    UserCreate {
        name: format!("user-{n:03}"),
        email: format!("u{n}@example.com"),
        age: i32::try_from(n).ok(),
    }
    .into_active_model()
}

async fn seeded_repository(count: usize) -> Repository<Users> {
    let repository = Repository::<Users>::new(setup_test_db().await.unwrap());
    for n in 0..count {
        repository.add(new_user(n)).await.unwrap();
    }
    repository
}

#[tokio::test]
async fn test_add_assigns_uuid_when_unset() {
    let repository = seeded_repository(0).await;
    let created = repository.add(new_user(1)).await.unwrap();
    assert_ne!(created.id, Uuid::nil());

    let found = repository.get_by_id(created.id).await.unwrap();
    assert_eq!(found, Some(created));
}

#[tokio::test]
async fn test_add_keeps_explicit_id() {
    let repository = seeded_repository(0).await;
    let id = Uuid::new_v4();
    let mut model = new_user(1);
    model.id = Set(id);

    assert_eq!(repository.add(model).await.unwrap().id, id);
}

#[tokio::test]
async fn test_get_page_clamps_out_of_range_requests() {
    let repository = seeded_repository(12).await;

    let page = repository
        .get_page(&Filters::new(), &[], PageRequest { page: 0, page_size: 0 })
        .await
        .unwrap();
    assert_eq!(page.pagination.page, 1);
    assert_eq!(page.pagination.page_size, FALLBACK_PAGE_SIZE);
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.pagination.total_pages, 2);

    let page = repository
        .get_page(&Filters::new(), &[], PageRequest { page: 1, page_size: 5000 })
        .await
        .unwrap();
    assert_eq!(page.pagination.page_size, MAX_REPOSITORY_PAGE_SIZE);
    assert_eq!(page.items.len(), 12);
    assert!(!page.pagination.has_next);
}

#[tokio::test]
async fn test_get_page_far_past_the_end_is_empty() {
    let repository = seeded_repository(3).await;

    let page = repository
        .get_page(&Filters::new(), &[], PageRequest { page: u64::MAX, page_size: 1000 })
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.pagination.total, 3);
    assert_eq!(page.pagination.page, u64::MAX);
}

#[tokio::test]
async fn test_get_filtered_and_count() {
    let repository = seeded_repository(10).await;
    let adults = Filters::new().with("age", FilterOperator::Gte(json!(5)));

    assert_eq!(repository.count(&adults).await.unwrap(), 5);
    let rows = repository
        .get_filtered(&adults, &[SortField::desc("age")])
        .await
        .unwrap();
    let ages: Vec<_> = rows.iter().map(|u| u.age).collect();
    assert_eq!(ages, [Some(9), Some(8), Some(7), Some(6), Some(5)]);

    let all = repository.get_all(&[SortField::asc("name")]).await.unwrap();
    assert_eq!(all.len(), 10);
    assert_eq!(all[0].name, "user-000");
}

#[tokio::test]
async fn test_update_without_changes_returns_current_row() {
    let repository = seeded_repository(1).await;
    let row = repository.get_all(&[]).await.unwrap().remove(0);

    let unchanged = repository
        .update(row.clone().into_active_model())
        .await
        .unwrap();
    assert_eq!(unchanged, row);
}

#[tokio::test]
async fn test_update_missing_row_fails() {
    let repository = seeded_repository(0).await;
    let ghost = user_entity::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("ghost".to_string()),
        email: NotSet,
        age: NotSet,
        created_at: NotSet,
    };

    let err = repository.update(ghost).await.unwrap_err();
    assert!(matches!(
        err,
        DbErr::RecordNotUpdated | DbErr::RecordNotFound(_)
    ));
}

#[tokio::test]
async fn test_add_or_update_inserts_then_updates() {
    let repository = seeded_repository(0).await;
    let id = Uuid::new_v4();

    let mut model = new_user(7);
    model.id = Set(id);
    let inserted = repository.add_or_update(model).await.unwrap();
    assert_eq!(inserted.name, "user-007");

    let mut model = new_user(7);
    model.id = Set(id);
    model.name = Set("renamed".to_string());
    model.created_at = Set(Utc::now());
    let updated = repository.add_or_update(model).await.unwrap();
    assert_eq!(updated.id, id);
    assert_eq!(updated.name, "renamed");
    assert_eq!(repository.count(&Filters::new()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_reports_rows_affected() {
    let repository = seeded_repository(2).await;
    let row = repository.get_all(&[]).await.unwrap().remove(0);

    assert_eq!(repository.delete(row.id).await.unwrap(), 1);
    assert_eq!(repository.delete(row.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_base_service_operations() {
    let db = setup_test_db().await.unwrap();
    let service = BaseService::<Users>::new(db);

    let created = service.create(new_user(1)).await.unwrap();
    let page = service.get_all(PageRequest::default()).await.unwrap();
    assert_eq!(page.items, vec![created.clone()]);

    let changes = SchemaConverter::update_model_from_schema::<Users, _>(
        created.clone(),
        &UserUpdate {
            age: Some(64),
            ..UserUpdate::default()
        },
    )
    .unwrap();
    let updated = service.update(created.id, changes).await.unwrap();
    assert_eq!(updated.age, Some(64));
    assert_eq!(updated.name, created.name);

    assert!(service.delete(created.id).await.unwrap());
    assert!(!service.delete(created.id).await.unwrap());
    assert_eq!(service.get_by_id(created.id).await.unwrap(), None);
}

#[tokio::test]
async fn test_base_service_update_targets_the_given_id() {
    let db = setup_test_db().await.unwrap();
    let service = BaseService::<Users>::new(db);
    let first = service.create(new_user(1)).await.unwrap();
    let second = service.create(new_user(2)).await.unwrap();

    // Built from a create schema, so the id column is NotSet.
    let fresh = SchemaConverter::schema_to_model::<Users>(
        UserCreate {
            name: "Replaced".to_string(),
            email: "replaced@example.com".to_string(),
            age: Some(50),
        },
        std::iter::empty(),
    );
    let updated = service.update(first.id, fresh).await.unwrap();
    assert_eq!(updated.id, first.id);
    assert_eq!(updated.name, "Replaced");

    // Carries the second row's id; the first row must still be the one written.
    let mut stray = second.clone().into_active_model();
    stray.name = Set("Moved".to_string());
    let updated = service.update(first.id, stray).await.unwrap();
    assert_eq!(updated.id, first.id);
    assert_eq!(updated.name, "Moved");

    let untouched = service.get_by_id(second.id).await.unwrap().unwrap();
    assert_eq!(untouched, second);
}

#[tokio::test]
async fn test_base_service_create_or_update() {
    let db = setup_test_db().await.unwrap();
    let service = BaseService::<Users>::new(db);

    let created = service.create_or_update(new_user(3)).await.unwrap();
    let mut again = created.clone().into_active_model();
    again.email = Set("changed@example.com".to_string());
    let updated = service.create_or_update(again).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.email, "changed@example.com");
}

#[tokio::test]
async fn test_schema_to_model_applies_extra_fields() {
    let repository = seeded_repository(0).await;
    let id = Uuid::new_v4();

    let model = SchemaConverter::schema_to_model::<Users>(
        UserCreate {
            name: "Extra".to_string(),
            email: "extra@example.com".to_string(),
            age: None,
        },
        [(user_entity::Column::Id, Value::from(id))],
    );
    let created = repository.add(model).await.unwrap();
    assert_eq!(created.id, id);
    assert_eq!(created.age, None);
}
