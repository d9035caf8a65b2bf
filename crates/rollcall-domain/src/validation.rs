//! Request validation errors. Raised before any SQL is issued.

use crate::field::Field;
use crate::value::{FieldKind, FieldValue};

/// A string did not name a variant of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// A malformed request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("field `{field}` expects a {expected:?} value, got {got:?}")]
    KindMismatch {
        field: &'static str,
        expected: FieldKind,
        got: FieldKind,
    },
    #[error("field `{0}` is not nullable")]
    NullNotAllowed(&'static str),
    #[error("`{op}` cannot be applied to field `{field}`")]
    UnsupportedOperator {
        field: &'static str,
        op: &'static str,
    },
    #[error("groupBy requires at least one field")]
    EmptyGroupBy,
    #[error("having references `{0}`, which is not in the groupBy list")]
    HavingOutsideGroup(&'static str),
    #[error("orderBy references `{0}`, which is not in the groupBy list")]
    OrderOutsideGroup(&'static str),
    #[error("select cannot be combined with include")]
    SelectWithInclude,
    #[error("select cannot be combined with omit")]
    SelectWithOmit,
    #[error("nested relation queries do not support {0}")]
    UnsupportedNested(&'static str),
}

/// Check a value destined for `field` in an equality, patch or unique key.
pub fn check_assignment<F: Field>(field: F, value: &FieldValue) -> Result<(), ValidationError> {
    match value.kind() {
        None if field.nullable() => Ok(()),
        None => Err(ValidationError::NullNotAllowed(field.name())),
        Some(kind) => check_kind(field, kind),
    }
}

/// Check a non-null operand (ranges, set membership).
pub fn check_operand<F: Field>(
    field: F,
    value: &FieldValue,
    op: &'static str,
) -> Result<(), ValidationError> {
    match value.kind() {
        None => Err(ValidationError::UnsupportedOperator {
            field: field.name(),
            op,
        }),
        Some(kind) => check_kind(field, kind),
    }
}

fn check_kind<F: Field>(field: F, got: FieldKind) -> Result<(), ValidationError> {
    if field.kind() == got {
        Ok(())
    } else {
        Err(ValidationError::KindMismatch {
            field: field.name(),
            expected: field.kind(),
            got,
        })
    }
}
