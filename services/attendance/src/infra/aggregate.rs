//! Aggregates and grouped aggregates, computed in the database.

use sea_orm::sea_query::{Asterisk, Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QueryResult, QuerySelect,
    QueryTrait, Select,
};
use tracing::debug;

use rollcall_core::sea_ext::page;
use rollcall_domain::aggregate::{AggregateArgs, AggregateResult, Aggregates, Group, GroupBy};
use rollcall_domain::order::NullsOrder;
use rollcall_domain::Field;

use super::filter::{compile, sea_nulls, sea_order};
use super::resource::Resource;
use super::table::Table;
use super::value::{decode, get};
use crate::error::{DbResultExt, StoreError};

fn col_expr<R: Resource>(field: R::Field) -> SimpleExpr {
    Expr::col(R::column(field).as_column_ref()).into()
}

fn alias<F: Field>(prefix: &str, field: F) -> String {
    format!("_{prefix}_{}", field.name())
}

fn is_empty<F>(aggs: &Aggregates<F>) -> bool {
    !aggs.count
        && aggs.count_fields.is_empty()
        && aggs.min.is_empty()
        && aggs.max.is_empty()
        && aggs.sum.is_empty()
        && aggs.avg.is_empty()
}

fn select_aggregates<R: Resource>(
    mut query: Select<R::Entity>,
    aggs: &Aggregates<R::Field>,
) -> Select<R::Entity> {
    let count = |field: R::Field| SimpleExpr::from(Func::count(col_expr::<R>(field)));

    if aggs.count {
        query = query.column_as(Expr::col(Asterisk).count(), "_count");
    }
    for &field in &aggs.count_fields {
        query = query.column_as(count(field), alias("count", field));
    }
    for &field in &aggs.min {
        query = query.column_as(
            SimpleExpr::from(Func::min(col_expr::<R>(field))),
            alias("min", field),
        );
    }
    for &field in &aggs.max {
        query = query.column_as(
            SimpleExpr::from(Func::max(col_expr::<R>(field))),
            alias("max", field),
        );
    }
    for &field in &aggs.sum {
        query = query.column_as(
            SimpleExpr::from(Func::sum(col_expr::<R>(field))),
            alias("sum", field),
        );
    }
    // Averages are derived from SUM and COUNT so every backend yields the same float.
    for &field in &aggs.avg {
        query = query
            .column_as(
                SimpleExpr::from(Func::sum(col_expr::<R>(field))),
                alias("avgsum", field),
            )
            .column_as(count(field), alias("avgcnt", field));
    }
    query
}

fn read_aggregates<F: Field>(
    row: &QueryResult,
    aggs: &Aggregates<F>,
) -> Result<AggregateResult<F>, StoreError> {
    let mut out = AggregateResult::default();
    if aggs.count {
        out.count = Some(get::<i64>(row, "_count")?.unwrap_or_default());
    }
    for &field in &aggs.count_fields {
        let n = get::<i64>(row, &alias("count", field))?.unwrap_or_default();
        out.count_fields.insert(field, n);
    }
    for &field in &aggs.min {
        out.min
            .insert(field, decode(row, &alias("min", field), field.kind())?);
    }
    for &field in &aggs.max {
        out.max
            .insert(field, decode(row, &alias("max", field), field.kind())?);
    }
    for &field in &aggs.sum {
        out.sum.insert(field, get::<i64>(row, &alias("sum", field))?);
    }
    for &field in &aggs.avg {
        let sum = get::<i64>(row, &alias("avgsum", field))?;
        let n = get::<i64>(row, &alias("avgcnt", field))?.unwrap_or_default();
        let avg = match sum {
            Some(sum) if n > 0 => Some(sum as f64 / n as f64),
            _ => None,
        };
        out.avg.insert(field, avg);
    }
    Ok(out)
}

impl<R, C> Table<'_, R, C>
where
    R: Resource,
    C: ConnectionTrait,
{
    /// Count, min, max, sum and average over the rows matching the filter.
    ///
    /// Over zero rows counts are 0 and every other aggregate is null.
    pub async fn aggregate(
        &self,
        args: AggregateArgs<R::Field>,
    ) -> Result<AggregateResult<R::Field>, StoreError> {
        args.validate()?;
        if is_empty(&args.aggregates) {
            return Ok(AggregateResult::default());
        }
        let mut query = select_aggregates::<R>(R::Entity::find().select_only(), &args.aggregates);
        if let Some(cond) = self.where_expr(args.filter.as_ref()) {
            query = query.filter(cond);
        }
        let row = self
            .conn
            .query_one(query.build(self.backend()))
            .await
            .context_db(R::ENTITY, "aggregate")?
            .ok_or_else(|| anyhow::anyhow!("aggregate over {} returned no row", R::ENTITY))?;
        read_aggregates(&row, &args.aggregates)
    }

    /// One entry per distinct combination of the `by` columns among matching rows.
    ///
    /// Groups come back in the requested order, then ascending by the grouped columns.
    pub async fn group_by(
        &self,
        args: GroupBy<R::Field>,
    ) -> Result<Vec<Group<R::Field>>, StoreError> {
        args.validate()?;
        let backend = self.backend();

        let mut query = R::Entity::find().select_only();
        for &field in &args.by {
            query = query
                .column_as(col_expr::<R>(field), alias("by", field))
                .group_by(R::column(field));
        }
        query = select_aggregates::<R>(query, &args.aggregates);
        if let Some(cond) = self.where_expr(args.filter.as_ref()) {
            query = query.filter(cond);
        }
        if let Some(having) = &args.having {
            query = query.having(compile::<R>(having, backend));
        }
        for key in &args.order_by {
            query = query.order_by_with_nulls(
                R::column(key.field),
                sea_order(key.sort),
                sea_nulls(key.resolved_nulls()),
            );
        }
        for &field in args
            .by
            .iter()
            .filter(|f| !args.order_by.iter().any(|k| k.field == **f))
        {
            query = query.order_by_with_nulls(
                R::column(field),
                sea_orm::Order::Asc,
                sea_nulls(NullsOrder::Last),
            );
        }
        query = page(query, args.skip, args.take);

        let rows = self
            .conn
            .query_all(query.build(backend))
            .await
            .context_db(R::ENTITY, "group_by")?;
        debug!(entity = R::ENTITY, groups = rows.len(), "group_by");

        rows.iter()
            .map(|row| {
                let key = args
                    .by
                    .iter()
                    .map(|&field| Ok((field, decode(row, &alias("by", field), field.kind())?)))
                    .collect::<Result<_, StoreError>>()?;
                Ok(Group {
                    key,
                    aggregates: read_aggregates(row, &args.aggregates)?,
                })
            })
            .collect()
    }
}
