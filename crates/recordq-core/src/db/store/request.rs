use crate::{
    db::{query::Comparison, store::Record},
    value::{Value, compare::sort_order},
};
use std::fmt::{self, Display};

///
/// ComparePredicate
/// One atomic `field op value` comparison.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ComparePredicate {
    pub field: String,
    pub op: Comparison,
    pub value: Value,
}

impl ComparePredicate {
    #[must_use]
    pub fn new(field: impl Into<String>, op: Comparison, value: Value) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// A missing field or an incomparable stored value never matches.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        record
            .get(&self.field)
            .and_then(|stored| stored.compare(&self.value))
            .is_some_and(|ordering| self.op.accepts(ordering))
    }
}

impl Display for ComparePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op.operator(), self.value)
    }
}

///
/// StorePredicate
///
/// Conjunction of atomic comparisons. The empty conjunction matches every
/// record. No OR, NOT, or nesting exists at this layer.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StorePredicate {
    clauses: Vec<ComparePredicate>,
}

impl StorePredicate {
    #[must_use]
    pub const fn and(clauses: Vec<ComparePredicate>) -> Self {
        Self { clauses }
    }

    #[must_use]
    pub fn clauses(&self) -> &[ComparePredicate] {
        &self.clauses
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }
}

impl Display for StorePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return f.write_str("TRUEPREDICATE");
        }

        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{clause}")?;
        }

        Ok(())
    }
}

///
/// StoreSort
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoreSort {
    pub field: String,
    pub ascending: bool,
}

impl Display for StoreSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = if self.ascending { "ASC" } else { "DESC" };

        write!(f, "{} {dir}", self.field)
    }
}

///
/// FetchRequest
///
/// Store-native fetch: entity name, optional conjunctive predicate, optional
/// single-key sort and optional limit. `limit == Some(0)` is unlimited.
///

#[derive(Clone, Debug, PartialEq)]
pub struct FetchRequest {
    pub entity: String,
    pub predicate: Option<StorePredicate>,
    pub sort: Option<StoreSort>,
    pub limit: Option<usize>,
}

impl FetchRequest {
    #[must_use]
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            predicate: None,
            sort: None,
            limit: None,
        }
    }

    /// Effective limit; zero means none.
    #[must_use]
    pub fn effective_limit(&self) -> Option<usize> {
        self.limit.filter(|limit| *limit > 0)
    }

    /// Filter, sort and truncate candidate records of this request's entity.
    ///
    /// Candidates must arrive in insertion order; the sort is stable, so
    /// records with equal sort values keep that order.
    #[must_use]
    pub fn apply(&self, candidates: impl IntoIterator<Item = Record>) -> Vec<Record> {
        let mut rows: Vec<Record> = candidates
            .into_iter()
            .filter(|record| record.entity() == self.entity)
            .filter(|record| {
                self.predicate
                    .as_ref()
                    .is_none_or(|predicate| predicate.matches(record))
            })
            .collect();

        if let Some(sort) = &self.sort {
            rows.sort_by(|a, b| {
                let ordering = sort_order(a.get(&sort.field), b.get(&sort.field));
                if sort.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        if let Some(limit) = self.effective_limit() {
            rows.truncate(limit);
        }

        rows
    }
}

impl Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FETCH {}", self.entity)?;
        if let Some(predicate) = &self.predicate {
            write!(f, " WHERE {predicate}")?;
        }
        if let Some(sort) = &self.sort {
            write!(f, " ORDER BY {sort}")?;
        }
        if let Some(limit) = self.effective_limit() {
            write!(f, " LIMIT {limit}")?;
        }

        Ok(())
    }
}
