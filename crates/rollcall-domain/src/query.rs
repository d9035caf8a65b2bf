//! List queries and result shaping.

use uuid::Uuid;

use crate::field::Field;
use crate::filter::Filter;
use crate::order::OrderBy;
use crate::validation::ValidationError;

/// Arguments of a list query.
///
/// - `skip`: rows dropped after the cursor (or from the start)
/// - `take`: page size; negative walks backward from the cursor (or from the end)
/// - `cursor`: id of the row to page from, never itself returned
#[derive(Debug, Clone, PartialEq)]
pub struct FindMany<F> {
    pub filter: Option<Filter<F>>,
    pub order_by: Vec<OrderBy<F>>,
    pub skip: u64,
    pub take: Option<i64>,
    pub cursor: Option<Uuid>,
}

impl<F> Default for FindMany<F> {
    fn default() -> Self {
        Self {
            filter: None,
            order_by: Vec::new(),
            skip: 0,
            take: None,
            cursor: None,
        }
    }
}

impl<F: Field> FindMany<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter<F>) -> Self {
        self.filter = Some(filter);
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

    pub fn take(mut self, take: i64) -> Self {
        self.take = Some(take);
        self
    }

    pub fn cursor(mut self, id: impl Into<Uuid>) -> Self {
        self.cursor = Some(id.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.filter {
            Some(filter) => filter.validate(),
            None => Ok(()),
        }
    }

    /// Relation queries are resolved in memory per parent, so only forward offset
    /// pagination is available.
    pub fn validate_nested(&self) -> Result<(), ValidationError> {
        if self.cursor.is_some() {
            return Err(ValidationError::UnsupportedNested("cursor"));
        }
        if self.take.is_some_and(|take| take < 0) {
            return Err(ValidationError::UnsupportedNested("negative take"));
        }
        self.validate()
    }
}

/// Which columns and relations a shaped query returns.
///
/// `select` keeps only the listed columns, `omit` drops the listed columns. `select`
/// cannot be combined with either `omit` or `include`.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape<F, I> {
    pub select: Option<Vec<F>>,
    pub omit: Vec<F>,
    pub include: Option<I>,
}

impl<F, I> Default for Shape<F, I> {
    fn default() -> Self {
        Self {
            select: None,
            omit: Vec::new(),
            include: None,
        }
    }
}

impl<F: Field, I> Shape<F, I> {
    pub fn select(fields: impl IntoIterator<Item = F>) -> Self {
        Self {
            select: Some(fields.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn omit(fields: impl IntoIterator<Item = F>) -> Self {
        Self {
            omit: fields.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_include(mut self, include: I) -> Self {
        self.include = Some(include);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.select.is_some() {
            if self.include.is_some() {
                return Err(ValidationError::SelectWithInclude);
            }
            if !self.omit.is_empty() {
                return Err(ValidationError::SelectWithOmit);
            }
        }
        Ok(())
    }

    /// Whether the column appears in the shaped output.
    pub fn keeps(&self, field: F) -> bool {
        match &self.select {
            Some(fields) => fields.contains(&field),
            None => !self.omit.contains(&field),
        }
    }
}
