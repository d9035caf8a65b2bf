//! Aggregate and group-by requests.

use std::collections::BTreeMap;

use crate::field::Field;
use crate::filter::Filter;
use crate::order::OrderBy;
use crate::validation::ValidationError;
use crate::value::{FieldKind, FieldValue};

/// Aggregate functions to compute over a row set.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates<F> {
    /// Count of rows (`_count`).
    pub count: bool,
    /// Count of non-null values per column.
    pub count_fields: Vec<F>,
    pub min: Vec<F>,
    pub max: Vec<F>,
    /// Integer columns only.
    pub sum: Vec<F>,
    /// Integer columns only.
    pub avg: Vec<F>,
}

impl<F> Default for Aggregates<F> {
    fn default() -> Self {
        Self {
            count: false,
            count_fields: Vec::new(),
            min: Vec::new(),
            max: Vec::new(),
            sum: Vec::new(),
            avg: Vec::new(),
        }
    }
}

impl<F: Field> Aggregates<F> {
    pub fn count() -> Self {
        Self {
            count: true,
            ..Self::default()
        }
    }

    pub fn count_of(mut self, field: F) -> Self {
        self.count_fields.push(field);
        self
    }

    pub fn min(mut self, field: F) -> Self {
        self.min.push(field);
        self
    }

    pub fn max(mut self, field: F) -> Self {
        self.max.push(field);
        self
    }

    pub fn sum(mut self, field: F) -> Self {
        self.sum.push(field);
        self
    }

    pub fn avg(mut self, field: F) -> Self {
        self.avg.push(field);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (op, fields) in [("min", &self.min), ("max", &self.max)] {
            if let Some(field) = fields.iter().find(|f| f.kind() == FieldKind::Uuid) {
                return Err(ValidationError::UnsupportedOperator {
                    field: field.name(),
                    op,
                });
            }
        }
        for (op, fields) in [("sum", &self.sum), ("avg", &self.avg)] {
            if let Some(field) = fields.iter().find(|f| f.kind() != FieldKind::Int) {
                return Err(ValidationError::UnsupportedOperator {
                    field: field.name(),
                    op,
                });
            }
        }
        Ok(())
    }
}

/// Arguments of an aggregate query.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateArgs<F> {
    pub filter: Option<Filter<F>>,
    pub aggregates: Aggregates<F>,
}

impl<F: Field> AggregateArgs<F> {
    pub fn new(aggregates: Aggregates<F>) -> Self {
        Self {
            filter: None,
            aggregates,
        }
    }

    pub fn filter(mut self, filter: Filter<F>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(filter) = &self.filter {
            filter.validate()?;
        }
        self.aggregates.validate()
    }
}

/// Computed aggregates. Maps only contain the columns that were requested.
///
/// `min`/`max`/`sum`/`avg` are null over an empty set.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult<F: Ord> {
    pub count: Option<i64>,
    pub count_fields: BTreeMap<F, i64>,
    pub min: BTreeMap<F, FieldValue>,
    pub max: BTreeMap<F, FieldValue>,
    pub sum: BTreeMap<F, Option<i64>>,
    pub avg: BTreeMap<F, Option<f64>>,
}

impl<F: Ord> Default for AggregateResult<F> {
    fn default() -> Self {
        Self {
            count: None,
            count_fields: BTreeMap::new(),
            min: BTreeMap::new(),
            max: BTreeMap::new(),
            sum: BTreeMap::new(),
            avg: BTreeMap::new(),
        }
    }
}

/// Arguments of a group-by query.
///
/// `having` and `order_by` may only reference columns listed in `by`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy<F> {
    pub by: Vec<F>,
    pub filter: Option<Filter<F>>,
    pub having: Option<Filter<F>>,
    pub aggregates: Aggregates<F>,
    pub order_by: Vec<OrderBy<F>>,
    pub skip: u64,
    pub take: Option<u64>,
}

impl<F: Field> GroupBy<F> {
    pub fn new(by: impl IntoIterator<Item = F>) -> Self {
        Self {
            by: by.into_iter().collect(),
            filter: None,
            having: None,
            aggregates: Aggregates::count(),
            order_by: Vec::new(),
            skip: 0,
            take: None,
        }
    }

    pub fn filter(mut self, filter: Filter<F>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn having(mut self, having: Filter<F>) -> Self {
        self.having = Some(having);
        self
    }

    pub fn aggregates(mut self, aggregates: Aggregates<F>) -> Self {
        self.aggregates = aggregates;
        self
    }

    pub fn order_by(mut self, key: OrderBy<F>) -> Self {
        self.order_by.push(key);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn take(mut self, take: u64) -> Self {
        self.take = Some(take);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.by.is_empty() {
            return Err(ValidationError::EmptyGroupBy);
        }
        if let Some(filter) = &self.filter {
            filter.validate()?;
        }
        if let Some(having) = &self.having {
            if let Some(outside) = having.fields().into_iter().find(|f| !self.by.contains(f)) {
                return Err(ValidationError::HavingOutsideGroup(outside.name()));
            }
            having.validate()?;
        }
        if let Some(outside) = self.order_by.iter().find(|key| !self.by.contains(&key.field)) {
            return Err(ValidationError::OrderOutsideGroup(outside.field.name()));
        }
        self.aggregates.validate()
    }
}

/// One row of a group-by result.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<F: Ord> {
    pub key: BTreeMap<F, FieldValue>,
    pub aggregates: AggregateResult<F>,
}

impl<F: Ord> Group<F> {
    pub fn value(&self, field: F) -> Option<&FieldValue> {
        self.key.get(&field)
    }

    pub fn count(&self) -> i64 {
        self.aggregates.count.unwrap_or_default()
    }
}
