//! Generic data access for any [`CrudResource`].

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IdenStatic, Iterable,
    PaginatorTrait, QueryFilter, QuerySelect, Value,
};
use std::marker::PhantomData;
use uuid::Uuid;

use crate::filter::{Filters, apply_filters};
use crate::pagination::{
    MAX_OFFSET, PageRequest, Paginated, calculate_limit, calculate_offset,
};
use crate::sort::{SortField, apply_ordering};
use crate::traits::CrudResource;

/// Hard upper bound on rows fetched per page at the repository level
pub const MAX_REPOSITORY_PAGE_SIZE: u64 = 1000;
/// Page size used when a caller asks for zero rows
pub const FALLBACK_PAGE_SIZE: u64 = 10;

pub struct Repository<R: CrudResource> {
    db: DatabaseConnection,
    _resource: PhantomData<fn() -> R>,
}

impl<R: CrudResource> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Self::new(self.db.clone())
    }
}

fn not_found<R: CrudResource>() -> DbErr {
    DbErr::RecordNotFound(format!("{} not found", R::ENTITY_NAME))
}

impl<R: CrudResource> Repository<R> {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _resource: PhantomData,
        }
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// # Errors
    /// Propagates database errors.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<R::Model>, DbErr> {
        R::Entity::find()
            .filter(R::ID_COLUMN.eq(id))
            .one(&self.db)
            .await
    }

    /// Every row, ordered.
    ///
    /// # Errors
    /// Propagates database errors.
    pub async fn get_all(&self, order_by: &[SortField]) -> Result<Vec<R::Model>, DbErr> {
        self.get_filtered(&Filters::new(), order_by).await
    }

    /// # Errors
    /// Propagates database errors.
    pub async fn get_filtered(
        &self,
        filters: &Filters,
        order_by: &[SortField],
    ) -> Result<Vec<R::Model>, DbErr> {
        let query = R::Entity::find().filter(apply_filters::<R>(filters));
        apply_ordering::<R>(query, order_by).all(&self.db).await
    }

    /// One page of the filtered rows plus the total match count.
    ///
    /// Out-of-range requests are clamped: page 0 becomes 1, a zero page size
    /// becomes [`FALLBACK_PAGE_SIZE`], anything above
    /// [`MAX_REPOSITORY_PAGE_SIZE`] is capped, and the row offset never exceeds
    /// [`MAX_OFFSET`].
    ///
    /// # Errors
    /// Propagates database errors.
    pub async fn get_page(
        &self,
        filters: &Filters,
        order_by: &[SortField],
        page: PageRequest,
    ) -> Result<Paginated<R::Model>, DbErr> {
        let page_no = page.page.max(1);
        let page_size = match page.page_size {
            0 => FALLBACK_PAGE_SIZE,
            size => size.min(MAX_REPOSITORY_PAGE_SIZE),
        };

        let query = R::Entity::find().filter(apply_filters::<R>(filters));
        let total = PaginatorTrait::count(query.clone(), &self.db).await?;
        let items = apply_ordering::<R>(query, order_by)
            .offset(calculate_offset(page_no, page_size).min(MAX_OFFSET))
            .limit(calculate_limit(page_size))
            .all(&self.db)
            .await?;

        Ok(Paginated::new(items, total, page_no, page_size))
    }

    /// # Errors
    /// Propagates database errors.
    pub async fn count(&self, filters: &Filters) -> Result<u64, DbErr> {
        let query = R::Entity::find().filter(apply_filters::<R>(filters));
        PaginatorTrait::count(query, &self.db).await
    }

    /// Insert a row. A missing id is filled with a fresh UUIDv4.
    ///
    /// # Errors
    /// Propagates database errors, including constraint violations.
    pub async fn add(&self, mut entity: R::ActiveModel) -> Result<R::Model, DbErr> {
        if entity.get(R::ID_COLUMN).is_not_set() {
            entity.set(R::ID_COLUMN, Uuid::new_v4().into());
        }
        entity.insert(&self.db).await
    }

    /// Write the `Set` columns of `entity`. With nothing to write, the current
    /// row is returned unchanged.
    ///
    /// # Errors
    /// `DbErr::RecordNotFound` when the row is gone, otherwise database errors.
    pub async fn update(&self, entity: R::ActiveModel) -> Result<R::Model, DbErr> {
        let id_column = R::ID_COLUMN;
        let has_changes = <<R::Entity as EntityTrait>::Column>::iter()
            .filter(|c| c.as_str() != id_column.as_str())
            .any(|c| entity.get(c).is_set());
        if has_changes {
            return entity.update(&self.db).await;
        }
        let id = entity.get(R::ID_COLUMN).into_value().ok_or_else(not_found::<R>)?;
        self.find_by_value(id).await?.ok_or_else(not_found::<R>)
    }

    /// Returns the number of deleted rows.
    ///
    /// # Errors
    /// Propagates database errors.
    pub async fn delete(&self, id: Uuid) -> Result<u64, DbErr> {
        let result = R::Entity::delete_many()
            .filter(R::ID_COLUMN.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Update the row if its id already exists, insert it otherwise.
    ///
    /// # Errors
    /// Propagates database errors.
    pub async fn add_or_update(&self, entity: R::ActiveModel) -> Result<R::Model, DbErr> {
        let existing = match entity.get(R::ID_COLUMN).into_value() {
            Some(id) => self.find_by_value(id).await?,
            None => None,
        };
        if existing.is_some() {
            self.update(entity).await
        } else {
            self.add(entity).await
        }
    }

    async fn find_by_value(&self, id: Value) -> Result<Option<R::Model>, DbErr> {
        R::Entity::find()
            .filter(R::ID_COLUMN.eq(id))
            .one(&self.db)
            .await
    }
}
