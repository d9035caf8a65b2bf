//! Row predicates: comparisons on single columns composed with AND / OR / NOT.

use crate::field::Field;
use crate::validation::{ValidationError, check_assignment, check_operand};
use crate::value::{FieldKind, FieldValue};

/// Case handling for string predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    #[default]
    Default,
    Insensitive,
}

/// A comparison applied to one column.
///
/// `NotEquals` with a non-null operand follows SQL semantics: rows where the column is
/// null do not match.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals(FieldValue),
    NotEquals(FieldValue),
    In(Vec<FieldValue>),
    NotIn(Vec<FieldValue>),
    Lt(FieldValue),
    Lte(FieldValue),
    Gt(FieldValue),
    Gte(FieldValue),
    Contains(String, QueryMode),
    StartsWith(String, QueryMode),
    EndsWith(String, QueryMode),
}

impl Predicate {
    pub fn op(&self) -> &'static str {
        match self {
            Self::Equals(_) => "equals",
            Self::NotEquals(_) => "not",
            Self::In(_) => "in",
            Self::NotIn(_) => "notIn",
            Self::Lt(_) => "lt",
            Self::Lte(_) => "lte",
            Self::Gt(_) => "gt",
            Self::Gte(_) => "gte",
            Self::Contains(..) => "contains",
            Self::StartsWith(..) => "startsWith",
            Self::EndsWith(..) => "endsWith",
        }
    }
}

/// A boolean predicate over the columns `F` of one entity.
///
/// An empty `And` matches every row, an empty `Or` matches none.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter<F> {
    And(Vec<Filter<F>>),
    Or(Vec<Filter<F>>),
    Not(Box<Filter<F>>),
    Field(F, Predicate),
}

impl<F: Field> Filter<F> {
    pub fn eq(field: F, value: impl Into<FieldValue>) -> Self {
        Self::Field(field, Predicate::Equals(value.into()))
    }

    pub fn ne(field: F, value: impl Into<FieldValue>) -> Self {
        Self::Field(field, Predicate::NotEquals(value.into()))
    }

    pub fn is_null(field: F) -> Self {
        Self::Field(field, Predicate::Equals(FieldValue::Null))
    }

    pub fn is_not_null(field: F) -> Self {
        Self::Field(field, Predicate::NotEquals(FieldValue::Null))
    }

    pub fn is_in<V: Into<FieldValue>>(field: F, values: impl IntoIterator<Item = V>) -> Self {
        Self::Field(
            field,
            Predicate::In(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn not_in<V: Into<FieldValue>>(field: F, values: impl IntoIterator<Item = V>) -> Self {
        Self::Field(
            field,
            Predicate::NotIn(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn lt(field: F, value: impl Into<FieldValue>) -> Self {
        Self::Field(field, Predicate::Lt(value.into()))
    }

    pub fn lte(field: F, value: impl Into<FieldValue>) -> Self {
        Self::Field(field, Predicate::Lte(value.into()))
    }

    pub fn gt(field: F, value: impl Into<FieldValue>) -> Self {
        Self::Field(field, Predicate::Gt(value.into()))
    }

    pub fn gte(field: F, value: impl Into<FieldValue>) -> Self {
        Self::Field(field, Predicate::Gte(value.into()))
    }

    pub fn contains(field: F, needle: impl Into<String>) -> Self {
        Self::Field(field, Predicate::Contains(needle.into(), QueryMode::Default))
    }

    pub fn starts_with(field: F, prefix: impl Into<String>) -> Self {
        Self::Field(
            field,
            Predicate::StartsWith(prefix.into(), QueryMode::Default),
        )
    }

    pub fn ends_with(field: F, suffix: impl Into<String>) -> Self {
        Self::Field(field, Predicate::EndsWith(suffix.into(), QueryMode::Default))
    }

    pub fn all(filters: impl IntoIterator<Item = Filter<F>>) -> Self {
        Self::And(filters.into_iter().collect())
    }

    pub fn any(filters: impl IntoIterator<Item = Filter<F>>) -> Self {
        Self::Or(filters.into_iter().collect())
    }

    /// Switch a string predicate to case-insensitive matching. No-op otherwise.
    pub fn insensitive(self) -> Self {
        match self {
            Self::Field(field, Predicate::Contains(s, _)) => {
                Self::Field(field, Predicate::Contains(s, QueryMode::Insensitive))
            }
            Self::Field(field, Predicate::StartsWith(s, _)) => {
                Self::Field(field, Predicate::StartsWith(s, QueryMode::Insensitive))
            }
            Self::Field(field, Predicate::EndsWith(s, _)) => {
                Self::Field(field, Predicate::EndsWith(s, QueryMode::Insensitive))
            }
            other => other,
        }
    }

    pub fn and(self, other: Filter<F>) -> Self {
        match self {
            Self::And(mut filters) => {
                filters.push(other);
                Self::And(filters)
            }
            first => Self::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Filter<F>) -> Self {
        match self {
            Self::Or(mut filters) => {
                filters.push(other);
                Self::Or(filters)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Every column the filter references, in first-seen order.
    pub fn fields(&self) -> Vec<F> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields(&self, out: &mut Vec<F>) {
        match self {
            Self::And(filters) | Self::Or(filters) => {
                filters.iter().for_each(|f| f.collect_fields(out));
            }
            Self::Not(inner) => inner.collect_fields(out),
            Self::Field(field, _) => {
                if !out.contains(field) {
                    out.push(*field);
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::And(filters) | Self::Or(filters) => {
                filters.iter().try_for_each(Filter::validate)
            }
            Self::Not(inner) => inner.validate(),
            Self::Field(field, predicate) => validate_predicate(*field, predicate),
        }
    }
}

fn validate_predicate<F: Field>(field: F, predicate: &Predicate) -> Result<(), ValidationError> {
    let op = predicate.op();
    match predicate {
        Predicate::Equals(v) | Predicate::NotEquals(v) => check_assignment(field, v),
        Predicate::In(values) | Predicate::NotIn(values) => values
            .iter()
            .try_for_each(|v| check_operand(field, v, op)),
        Predicate::Lt(v) | Predicate::Lte(v) | Predicate::Gt(v) | Predicate::Gte(v) => {
            if !field.kind().is_ordered() {
                return Err(ValidationError::UnsupportedOperator {
                    field: field.name(),
                    op,
                });
            }
            check_operand(field, v, op)
        }
        Predicate::Contains(..) | Predicate::StartsWith(..) | Predicate::EndsWith(..) => {
            if field.kind() == FieldKind::Text {
                Ok(())
            } else {
                Err(ValidationError::UnsupportedOperator {
                    field: field.name(),
                    op,
                })
            }
        }
    }
}
