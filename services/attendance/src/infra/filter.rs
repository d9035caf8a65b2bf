//! Compilation of filters, sort keys and cursors into sea-query expressions.

use sea_orm::sea_query::{Expr, NullOrdering, SimpleExpr};
use sea_orm::{ColumnTrait, DbBackend, Order};

use rollcall_core::sea_ext::{TextMatch, text_match};
use rollcall_domain::filter::{Filter, Predicate, QueryMode};
use rollcall_domain::order::{NullsOrder, OrderBy, Sort};
use rollcall_domain::{Field, FieldValue};

use super::resource::Resource;
use super::value::to_db_value;

fn always() -> SimpleExpr {
    Expr::val(1).eq(1)
}

fn never() -> SimpleExpr {
    Expr::val(1).eq(0)
}

fn all_of(exprs: impl IntoIterator<Item = SimpleExpr>) -> SimpleExpr {
    exprs.into_iter().reduce(SimpleExpr::and).unwrap_or_else(always)
}

fn any_of(exprs: impl IntoIterator<Item = SimpleExpr>) -> SimpleExpr {
    exprs.into_iter().reduce(SimpleExpr::or).unwrap_or_else(never)
}

/// Compile a validated filter into a `WHERE` expression.
pub fn compile<R: Resource>(filter: &Filter<R::Field>, backend: DbBackend) -> SimpleExpr {
    match filter {
        Filter::And(parts) => all_of(parts.iter().map(|f| compile::<R>(f, backend))),
        Filter::Or(parts) => any_of(parts.iter().map(|f| compile::<R>(f, backend))),
        Filter::Not(inner) => compile::<R>(inner, backend).not(),
        Filter::Field(field, predicate) => predicate_expr::<R>(*field, predicate, backend),
    }
}

fn predicate_expr<R: Resource>(
    field: R::Field,
    predicate: &Predicate,
    backend: DbBackend,
) -> SimpleExpr {
    let column = R::column(field);
    let kind = field.kind();
    let bind = |v: &FieldValue| to_db_value(kind, v);
    match predicate {
        Predicate::Equals(FieldValue::Null) => column.is_null(),
        Predicate::Equals(v) => column.eq(bind(v)),
        Predicate::NotEquals(FieldValue::Null) => column.is_not_null(),
        Predicate::NotEquals(v) => column.ne(bind(v)),
        Predicate::In(values) if values.is_empty() => never(),
        Predicate::In(values) => column.is_in(values.iter().map(bind)),
        Predicate::NotIn(values) if values.is_empty() => always(),
        Predicate::NotIn(values) => column.is_not_in(values.iter().map(bind)),
        Predicate::Lt(v) => column.lt(bind(v)),
        Predicate::Lte(v) => column.lte(bind(v)),
        Predicate::Gt(v) => column.gt(bind(v)),
        Predicate::Gte(v) => column.gte(bind(v)),
        Predicate::Contains(needle, mode) => {
            text_expr(column, TextMatch::Contains, needle, *mode, backend)
        }
        Predicate::StartsWith(needle, mode) => {
            text_expr(column, TextMatch::StartsWith, needle, *mode, backend)
        }
        Predicate::EndsWith(needle, mode) => {
            text_expr(column, TextMatch::EndsWith, needle, *mode, backend)
        }
    }
}

fn text_expr<C: ColumnTrait>(
    column: C,
    kind: TextMatch,
    needle: &str,
    mode: QueryMode,
    backend: DbBackend,
) -> SimpleExpr {
    text_match(
        Expr::col(column.as_column_ref()).into(),
        kind,
        needle,
        mode == QueryMode::Insensitive,
        backend,
    )
}

pub fn sea_order(sort: Sort) -> Order {
    match sort {
        Sort::Asc => Order::Asc,
        Sort::Desc => Order::Desc,
    }
}

pub fn sea_nulls(nulls: NullsOrder) -> NullOrdering {
    match nulls {
        NullsOrder::First => NullOrdering::First,
        NullsOrder::Last => NullOrdering::Last,
    }
}

/// Rows that sort strictly after `cursor_row` under `keys`.
///
/// `keys` must end with a unique column. The expression is the usual lexicographic
/// expansion: equal on every earlier key and strictly after on the current one, with
/// null placement following each key's null ordering.
pub fn after_cursor<R: Resource>(
    keys: &[OrderBy<R::Field>],
    cursor_row: &R::Record,
) -> SimpleExpr {
    use rollcall_domain::Record as _;

    let mut branches = Vec::with_capacity(keys.len());
    let mut prefix: Vec<SimpleExpr> = Vec::new();
    for key in keys {
        let column = R::column(key.field);
        let value = cursor_row.get(key.field);
        let bound = to_db_value(key.field.kind(), &value);

        let strictly_after = if value.is_null() {
            // Nulls first means every non-null value follows a null cursor.
            (key.resolved_nulls() == NullsOrder::First).then(|| column.is_not_null())
        } else {
            let beyond = match key.sort {
                Sort::Asc => column.gt(bound.clone()),
                Sort::Desc => column.lt(bound.clone()),
            };
            Some(match key.resolved_nulls() {
                NullsOrder::Last => beyond.or(column.is_null()),
                NullsOrder::First => beyond,
            })
        };
        if let Some(expr) = strictly_after {
            branches.push(all_of(prefix.iter().cloned().chain([expr])));
        }

        prefix.push(if value.is_null() {
            column.is_null()
        } else {
            column.eq(bound)
        });
    }
    any_of(branches)
}
