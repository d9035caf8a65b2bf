//! Traits describing an entity's columns, rows, unique keys and partial updates.

use std::fmt::Debug;
use std::hash::Hash;

use uuid::Uuid;

use crate::validation::{ValidationError, check_assignment};
use crate::value::{FieldKind, FieldValue};

/// A scalar column of an entity.
pub trait Field: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// Every column, in declaration order.
    const ALL: &'static [Self];
    /// The primary key column.
    const ID: Self;

    /// API name of the column (camelCase, matches the serialized record key).
    fn name(self) -> &'static str;
    fn kind(self) -> FieldKind;
    fn nullable(self) -> bool;
}

/// A row of an entity.
pub trait Record: Clone + Send + Sync + 'static {
    type Field: Field;

    fn id(&self) -> Uuid;
    fn get(&self, field: Self::Field) -> FieldValue;
}

/// A lookup that matches at most one row.
pub trait UniqueKey {
    type Field: Field;

    /// Columns and values of the key, all non-null.
    fn parts(&self) -> Vec<(Self::Field, FieldValue)>;
}

/// A partial update. Columns not listed in `assignments` are left untouched.
pub trait Patch {
    type Field: Field;

    fn assignments(&self) -> Vec<(Self::Field, FieldValue)>;

    fn validate(&self) -> Result<(), ValidationError> {
        self.assignments()
            .iter()
            .try_for_each(|(field, value)| check_assignment(*field, value))
    }

    fn is_empty(&self) -> bool {
        self.assignments().is_empty()
    }
}
