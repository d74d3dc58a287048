//! # Service layer
//!
//! Generated routes never touch the database directly. Every request asks the
//! router's factory for a [`CrudService`] and calls it. [`BaseService`] maps
//! each call onto a [`Repository`]; [`VersionedService`] turns updates into
//! new rows so old versions stay queryable.
//!
//! Custom behaviour goes into your own `CrudService` impl, usually wrapping a
//! `BaseService`:
//!
//! ```rust,ignore
//! pub struct AuditedUsers(BaseService<Users>);
//!
//! #[async_trait]
//! impl CrudService<Users> for AuditedUsers {
//!     async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
//!         tracing::info!(%id, "user removed");
//!         self.0.delete(id).await
//!     }
//!     // remaining methods delegate to self.0
//! }
//! ```

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use crate::filter::Filters;
use crate::pagination::{PageRequest, Paginated};
use crate::repository::Repository;
use crate::schema::SchemaConverter;
use crate::sort::SortField;
use crate::traits::{CrudResource, VersionedResource};

/// Operations the generated routes depend on
#[async_trait]
pub trait CrudService<R: CrudResource>: Send + Sync {
    /// One page of rows matching `filters`, ordered by `order_by`.
    async fn get_filtered(
        &self,
        filters: &Filters,
        order_by: &[SortField],
        page: PageRequest,
    ) -> Result<Paginated<R::Model>, DbErr>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<R::Model>, DbErr>;

    async fn create(&self, model: R::ActiveModel) -> Result<R::Model, DbErr>;

    /// Apply `changes` to the row `id`. `changes` is the current row with the
    /// changed columns `Set`; whatever id it carries is replaced by `id`.
    async fn update(&self, id: Uuid, changes: R::ActiveModel) -> Result<R::Model, DbErr>;

    /// `Ok(false)` when there was no row `id`.
    async fn delete(&self, id: Uuid) -> Result<bool, DbErr>;
}

/// Plain CRUD over a [`Repository`]
pub struct BaseService<R: CrudResource> {
    repository: Repository<R>,
}

impl<R: CrudResource> Clone for BaseService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<R: CrudResource> BaseService<R> {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::from_repository(Repository::new(db))
    }

    #[must_use]
    pub fn from_repository(repository: Repository<R>) -> Self {
        Self { repository }
    }

    #[must_use]
    pub fn repository(&self) -> &Repository<R> {
        &self.repository
    }

    /// Unfiltered page in id order.
    ///
    /// # Errors
    /// Propagates database errors.
    pub async fn get_all(&self, page: PageRequest) -> Result<Paginated<R::Model>, DbErr> {
        tracing::debug!(entity = R::ENTITY_NAME, page = page.page, "get_all");
        self.repository.get_page(&Filters::new(), &[], page).await
    }

    /// Update the row when its id exists, insert it otherwise.
    ///
    /// # Errors
    /// Propagates database errors.
    pub async fn create_or_update(&self, model: R::ActiveModel) -> Result<R::Model, DbErr> {
        tracing::debug!(entity = R::ENTITY_NAME, "create_or_update");
        self.repository.add_or_update(model).await
    }
}

#[async_trait]
impl<R: CrudResource> CrudService<R> for BaseService<R> {
    async fn get_filtered(
        &self,
        filters: &Filters,
        order_by: &[SortField],
        page: PageRequest,
    ) -> Result<Paginated<R::Model>, DbErr> {
        tracing::debug!(
            entity = R::ENTITY_NAME,
            page = page.page,
            page_size = page.page_size,
            filters = ?filters,
            "get_filtered"
        );
        self.repository.get_page(filters, order_by, page).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<R::Model>, DbErr> {
        tracing::debug!(entity = R::ENTITY_NAME, %id, "get_by_id");
        self.repository.get_by_id(id).await
    }

    async fn create(&self, model: R::ActiveModel) -> Result<R::Model, DbErr> {
        tracing::debug!(entity = R::ENTITY_NAME, "create");
        self.repository.add(model).await
    }

    async fn update(&self, id: Uuid, mut changes: R::ActiveModel) -> Result<R::Model, DbErr> {
        tracing::debug!(entity = R::ENTITY_NAME, %id, "update");
        changes.set(R::ID_COLUMN, id.into());
        self.repository.update(changes).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        tracing::debug!(entity = R::ENTITY_NAME, %id, "delete");
        if self.repository.get_by_id(id).await?.is_none() {
            return Ok(false);
        }
        Ok(self.repository.delete(id).await? > 0)
    }
}

/// Keeps every version of a row.
///
/// An update retires the current row (`active = false`) and inserts a
/// successor with a fresh id, `active = true` and a back reference in the
/// previous-version column. Both writes share one transaction. Only active rows
/// can be updated; other operations behave like [`BaseService`].
pub struct VersionedService<R: VersionedResource> {
    base: BaseService<R>,
}

impl<R: VersionedResource> Clone for VersionedService<R> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
        }
    }
}

impl<R: VersionedResource> VersionedService<R> {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseService::new(db),
        }
    }

    fn not_found(id: Uuid) -> DbErr {
        tracing::debug!(entity = R::ENTITY_NAME, %id, "no active version");
        DbErr::RecordNotFound(format!("{} not found", R::ENTITY_NAME))
    }
}

#[async_trait]
impl<R: VersionedResource> CrudService<R> for VersionedService<R> {
    async fn get_filtered(
        &self,
        filters: &Filters,
        order_by: &[SortField],
        page: PageRequest,
    ) -> Result<Paginated<R::Model>, DbErr> {
        self.base.get_filtered(filters, order_by, page).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<R::Model>, DbErr> {
        self.base.get_by_id(id).await
    }

    async fn create(&self, model: R::ActiveModel) -> Result<R::Model, DbErr> {
        self.base.create(model).await
    }

    async fn update(&self, id: Uuid, changes: R::ActiveModel) -> Result<R::Model, DbErr> {
        tracing::debug!(entity = R::ENTITY_NAME, %id, "versioned update");
        let txn = self.base.repository().connection().begin().await?;

        // Only a row that is still active is retired. A concurrent update of
        // the same version sees zero affected rows here.
        let retired = R::Entity::update_many()
            .col_expr(R::ACTIVE_COLUMN, Expr::value(false))
            .filter(R::ID_COLUMN.eq(id))
            .filter(R::ACTIVE_COLUMN.eq(true))
            .exec(&txn)
            .await?;
        if retired.rows_affected != 1 {
            txn.rollback().await?;
            return Err(Self::not_found(id));
        }

        let mut successor = SchemaConverter::mark_all_set(changes);
        successor.set(R::ID_COLUMN, Uuid::new_v4().into());
        successor.set(R::PREVIOUS_VERSION_COLUMN, Some(id).into());
        successor.set(R::ACTIVE_COLUMN, true.into());
        let created = successor.insert(&txn).await?;

        txn.commit().await?;
        Ok(created)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        self.base.delete(id).await
    }
}
