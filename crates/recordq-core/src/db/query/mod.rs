//! Module: db::query
//! Responsibility: typed descriptors and the fluent fetch builder that
//! compiles them into store-native requests.
//! Does not own: record persistence (store) or multi-step orchestration
//! (session).

mod descriptor;
mod fetch;

#[cfg(test)]
mod tests;

pub use descriptor::{Comparison, QueryDescriptor, SortDescriptor, Sorting, UpdateDescriptor};
pub use fetch::{FetchOne, FetchQuery};
