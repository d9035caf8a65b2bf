//! The per-entity query surface.

use std::marker::PhantomData;

use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Value,
};
use tracing::debug;
use uuid::Uuid;

use rollcall_core::sea_ext::page;
use rollcall_domain::filter::Filter;
use rollcall_domain::order::{OrderBy, with_tiebreak};
use rollcall_domain::query::FindMany;
use rollcall_domain::validation::check_assignment;
use rollcall_domain::{Field, Patch, Record, UniqueKey};

use super::filter::{after_cursor, compile, sea_nulls, sea_order};
use super::resource::Resource;
use super::value::to_db_value;
use crate::error::{DbResultExt, StoreError};

/// Typed access to one entity over a connection or transaction.
pub struct Table<'c, R, C> {
    pub(crate) conn: &'c C,
    _resource: PhantomData<fn() -> R>,
}

impl<R, C> Clone for Table<'_, R, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, C> Copy for Table<'_, R, C> {}

impl<'c, R, C> Table<'c, R, C>
where
    R: Resource,
    C: ConnectionTrait,
{
    pub fn new(conn: &'c C) -> Self {
        Self {
            conn,
            _resource: PhantomData,
        }
    }

    pub(crate) fn backend(&self) -> sea_orm::DbBackend {
        self.conn.get_database_backend()
    }

    pub(crate) fn where_expr(&self, filter: Option<&Filter<R::Field>>) -> Option<SimpleExpr> {
        filter.map(|f| compile::<R>(f, self.backend()))
    }

    fn key_expr(key: &R::Key) -> Result<SimpleExpr, StoreError> {
        let parts = key.parts();
        let mut expr: Option<SimpleExpr> = None;
        for (field, value) in &parts {
            check_assignment(*field, value)?;
            if value.is_null() {
                return Err(rollcall_domain::ValidationError::NullNotAllowed(field.name()).into());
            }
            let eq = R::column(*field).eq(to_db_value(field.kind(), value));
            expr = Some(match expr {
                Some(prev) => prev.and(eq),
                None => eq,
            });
        }
        expr.ok_or_else(|| anyhow::anyhow!("empty unique key for {}", R::ENTITY).into())
    }

    async fn find_model(&self, cond: SimpleExpr) -> Result<Option<R::Model>, StoreError> {
        R::Entity::find()
            .filter(cond)
            .one(self.conn)
            .await
            .context_db(R::ENTITY, "find")
    }

    async fn find_by_uuid(&self, id: Uuid) -> Result<Option<R::Record>, StoreError> {
        self.find_model(R::column(R::Field::ID).eq(id))
            .await?
            .map(R::from_model)
            .transpose()
    }

    // ── reads ────────────────────────────────────────────────────────────────

    pub async fn find_unique(&self, key: &R::Key) -> Result<Option<R::Record>, StoreError> {
        let cond = Self::key_expr(key)?;
        self.find_model(cond).await?.map(R::from_model).transpose()
    }

    pub async fn find_unique_or_throw(&self, key: &R::Key) -> Result<R::Record, StoreError> {
        self.find_unique(key)
            .await?
            .ok_or(StoreError::not_found(R::ENTITY))
    }

    pub async fn find_first(
        &self,
        args: FindMany<R::Field>,
    ) -> Result<Option<R::Record>, StoreError> {
        let take = match args.take {
            Some(t) if t < 0 => -1,
            Some(0) => 0,
            _ => 1,
        };
        let args = FindMany {
            take: Some(take),
            ..args
        };
        Ok(self.find_many(args).await?.into_iter().next())
    }

    pub async fn find_first_or_throw(
        &self,
        args: FindMany<R::Field>,
    ) -> Result<R::Record, StoreError> {
        self.find_first(args)
            .await?
            .ok_or(StoreError::not_found(R::ENTITY))
    }

    /// Filtered, ordered, paginated list.
    ///
    /// Ordering always ends with the primary key. A negative `take` walks the ordering
    /// backward from the cursor (or from the end) and returns rows in forward order.
    pub async fn find_many(&self, args: FindMany<R::Field>) -> Result<Vec<R::Record>, StoreError> {
        args.validate()?;
        let backward = args.take.is_some_and(|t| t < 0);
        let mut keys = with_tiebreak(&args.order_by);
        if backward {
            keys = keys.iter().map(OrderBy::reversed).collect();
        }

        let mut query = R::Entity::find();
        if let Some(cond) = self.where_expr(args.filter.as_ref()) {
            query = query.filter(cond);
        }
        if let Some(cursor) = args.cursor {
            let Some(row) = self.find_by_uuid(cursor).await? else {
                debug!(entity = R::ENTITY, %cursor, "cursor row missing, empty page");
                return Ok(Vec::new());
            };
            query = query.filter(after_cursor::<R>(&keys, &row));
        }
        for key in &keys {
            query = query.order_by_with_nulls(
                R::column(key.field),
                sea_order(key.sort),
                sea_nulls(key.resolved_nulls()),
            );
        }
        query = page(query, args.skip, args.take.map(i64::unsigned_abs));

        debug!(entity = R::ENTITY, backward, "find_many");
        let models = query.all(self.conn).await.context_db(R::ENTITY, "find_many")?;
        let mut records = models
            .into_iter()
            .map(R::from_model)
            .collect::<Result<Vec<_>, _>>()?;
        if backward {
            records.reverse();
        }
        Ok(records)
    }

    pub async fn count(&self, filter: Option<Filter<R::Field>>) -> Result<u64, StoreError> {
        if let Some(f) = &filter {
            f.validate()?;
        }
        let mut query = R::Entity::find();
        if let Some(cond) = self.where_expr(filter.as_ref()) {
            query = query.filter(cond);
        }
        query.count(self.conn).await.context_db(R::ENTITY, "count")
    }

    // ── writes ───────────────────────────────────────────────────────────────

    pub async fn create(&self, input: R::Create) -> Result<R::Record, StoreError> {
        self.create_with_id(Uuid::now_v7(), input).await
    }

    /// Insert with a caller-supplied identifier.
    pub async fn create_with_id(
        &self,
        id: impl Into<Uuid>,
        input: R::Create,
    ) -> Result<R::Record, StoreError> {
        let model = R::new_model(id.into(), &input, Utc::now())
            .insert(self.conn)
            .await
            .context_db(R::ENTITY, "create")?;
        R::from_model(model)
    }

    /// Insert a batch in one statement and return how many rows were written.
    ///
    /// With `skip_duplicates`, rows that hit a unique constraint are dropped and the
    /// rest are inserted; otherwise any conflict fails the whole batch.
    pub async fn create_many(
        &self,
        inputs: Vec<R::Create>,
        skip_duplicates: bool,
    ) -> Result<u64, StoreError> {
        if inputs.is_empty() {
            return Ok(0);
        }
        let now = Utc::now();
        let models = inputs
            .iter()
            .map(|input| R::new_model(Uuid::now_v7(), input, now))
            .collect::<Vec<_>>();
        let mut insert = R::Entity::insert_many(models);
        if skip_duplicates {
            insert = insert.on_conflict(OnConflict::new().do_nothing().to_owned());
        }
        let inserted = insert
            .exec_without_returning(self.conn)
            .await
            .context_db(R::ENTITY, "create_many")?;
        debug!(entity = R::ENTITY, requested = inputs.len(), inserted, "create_many");
        Ok(inserted)
    }

    fn assignments(
        &self,
        patch: &R::Patch,
    ) -> Result<Vec<(<R::Entity as EntityTrait>::Column, SimpleExpr)>, StoreError> {
        patch.validate()?;
        let mut sets: Vec<_> = patch
            .assignments()
            .into_iter()
            .map(|(field, value)| {
                (
                    R::column(field),
                    Expr::value(to_db_value(field.kind(), &value)),
                )
            })
            .collect();
        if !sets.is_empty() {
            if let Some(updated_at) = R::UPDATED_AT {
                sets.push((R::column(updated_at), Expr::value(Value::from(Utc::now()))));
            }
        }
        Ok(sets)
    }

    pub async fn update(&self, key: &R::Key, patch: R::Patch) -> Result<R::Record, StoreError> {
        let sets = self.assignments(&patch)?;
        let current = self.find_unique_or_throw(key).await?;
        if sets.is_empty() {
            return Ok(current);
        }
        let mut update = R::Entity::update_many();
        for (column, value) in sets {
            update = update.col_expr(column, value);
        }
        update
            .filter(R::column(R::Field::ID).eq(current.id()))
            .exec(self.conn)
            .await
            .context_db(R::ENTITY, "update")?;
        self.find_by_uuid(current.id())
            .await?
            .ok_or(StoreError::not_found(R::ENTITY))
    }

    /// Ids of the first `limit` matching rows in primary key order.
    async fn limited_ids(
        &self,
        cond: Option<SimpleExpr>,
        limit: u64,
    ) -> Result<Vec<Uuid>, StoreError> {
        let id = R::column(R::Field::ID);
        let mut query = R::Entity::find().select_only().column(id);
        if let Some(cond) = cond {
            query = query.filter(cond);
        }
        query
            .order_by_asc(id)
            .limit(limit)
            .into_tuple::<Uuid>()
            .all(self.conn)
            .await
            .context_db(R::ENTITY, "select ids")
    }

    /// Apply one patch to every matching row, at most `limit` rows when given.
    pub async fn update_many(
        &self,
        filter: Option<Filter<R::Field>>,
        patch: R::Patch,
        limit: Option<u64>,
    ) -> Result<u64, StoreError> {
        if let Some(f) = &filter {
            f.validate()?;
        }
        let sets = self.assignments(&patch)?;
        let mut cond = self.where_expr(filter.as_ref());
        if let Some(limit) = limit {
            let ids = self.limited_ids(cond.take(), limit).await?;
            if ids.is_empty() {
                return Ok(0);
            }
            cond = Some(R::column(R::Field::ID).is_in(ids));
        }
        if sets.is_empty() {
            let mut query = R::Entity::find();
            if let Some(cond) = cond {
                query = query.filter(cond);
            }
            return query.count(self.conn).await.context_db(R::ENTITY, "count");
        }
        let mut update = R::Entity::update_many();
        for (column, value) in sets {
            update = update.col_expr(column, value);
        }
        if let Some(cond) = cond {
            update = update.filter(cond);
        }
        let result = update
            .exec(self.conn)
            .await
            .context_db(R::ENTITY, "update_many")?;
        Ok(result.rows_affected)
    }

    /// Insert `create`, or apply `patch` to the row matching `key`, in a single
    /// `INSERT … ON CONFLICT` statement.
    ///
    /// The key's columns override the matching columns of `create`, so a new row always
    /// satisfies the key. An empty patch leaves an existing row untouched.
    pub async fn upsert(
        &self,
        key: &R::Key,
        create: R::Create,
        patch: R::Patch,
    ) -> Result<R::Record, StoreError> {
        let sets = self.assignments(&patch)?;
        let parts = key.parts();
        for (field, value) in &parts {
            check_assignment(*field, value)?;
        }

        let mut model = R::new_model(Uuid::now_v7(), &create, Utc::now());
        for (field, value) in &parts {
            model.set(R::column(*field), to_db_value(field.kind(), value));
        }
        let mut on_conflict = OnConflict::columns(parts.iter().map(|(f, _)| R::column(*f)));
        if sets.is_empty() {
            on_conflict.do_nothing();
        } else {
            on_conflict.values(sets);
        }
        R::Entity::insert(model)
            .on_conflict(on_conflict)
            .exec_without_returning(self.conn)
            .await
            .context_db(R::ENTITY, "upsert")?;

        self.find_unique_or_throw(key).await
    }

    pub async fn delete(&self, key: &R::Key) -> Result<R::Record, StoreError> {
        let current = self.find_unique_or_throw(key).await?;
        R::Entity::delete_many()
            .filter(R::column(R::Field::ID).eq(current.id()))
            .exec(self.conn)
            .await
            .context_db(R::ENTITY, "delete")?;
        Ok(current)
    }

    /// Delete every matching row, at most `limit` rows when given. Matching nothing is
    /// not an error.
    pub async fn delete_many(
        &self,
        filter: Option<Filter<R::Field>>,
        limit: Option<u64>,
    ) -> Result<u64, StoreError> {
        if let Some(f) = &filter {
            f.validate()?;
        }
        let mut cond = self.where_expr(filter.as_ref());
        if let Some(limit) = limit {
            let ids = self.limited_ids(cond.take(), limit).await?;
            if ids.is_empty() {
                return Ok(0);
            }
            cond = Some(R::column(R::Field::ID).is_in(ids));
        }
        let mut delete = R::Entity::delete_many();
        if let Some(cond) = cond {
            delete = delete.filter(cond);
        }
        let result = delete
            .exec(self.conn)
            .await
            .context_db(R::ENTITY, "delete_many")?;
        debug!(entity = R::ENTITY, deleted = result.rows_affected, "delete_many");
        Ok(result.rows_affected)
    }
}
