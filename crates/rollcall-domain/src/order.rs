//! Sort keys.

use serde::{Deserialize, Serialize};

use crate::field::Field;

/// Generic sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sort {
    Desc,
    Asc,
}

impl Sort {
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Where null values go in a sorted result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NullsOrder {
    First,
    Last,
}

impl NullsOrder {
    pub fn flipped(self) -> Self {
        match self {
            Self::First => Self::Last,
            Self::Last => Self::First,
        }
    }
}

/// One sort key.
///
/// Without an explicit null ordering, nulls sort as the largest value: last when
/// ascending, first when descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy<F> {
    pub field: F,
    pub sort: Sort,
    pub nulls: Option<NullsOrder>,
}

impl<F: Field> OrderBy<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            sort: Sort::Asc,
            nulls: None,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            sort: Sort::Desc,
            nulls: None,
        }
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullsOrder::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullsOrder::Last);
        self
    }

    pub fn resolved_nulls(&self) -> NullsOrder {
        self.nulls.unwrap_or(match self.sort {
            Sort::Asc => NullsOrder::Last,
            Sort::Desc => NullsOrder::First,
        })
    }

    /// The same key walked in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            field: self.field,
            sort: self.sort.reversed(),
            nulls: Some(self.resolved_nulls().flipped()),
        }
    }
}

/// Append the primary key as a final ascending key unless it is already present,
/// so every ordering is total.
pub fn with_tiebreak<F: Field>(order: &[OrderBy<F>]) -> Vec<OrderBy<F>> {
    let mut keys = order.to_vec();
    if !keys.iter().any(|key| key.field == F::ID) {
        keys.push(OrderBy::asc(F::ID));
    }
    keys
}
