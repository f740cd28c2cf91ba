//! In-memory query kernels over decoded record batches.
//!
//! - [`predicate`]: text prefix / suffix / equality and inclusive integer
//!   range tests producing a [`SelectionSet`] per batch.
//! - [`selection`]: ascending row-index sets and their linear intersection.
//! - [`aggregate`]: grouped count / sum / average shared across threads.
//! - [`lookup`]: equality point lookup projecting whole rows.
//!
//! Every column argument is a field name or a dotted path into struct
//! columns (`"address.city"`), resolved by [`path::column_by_path`].

pub mod aggregate;
pub mod lookup;
pub mod path;
pub mod predicate;
pub mod query;
pub mod selection;

pub use aggregate::{AggregationState, GroupAggregate};
pub use lookup::{Row, find_equal, project_row};
pub use path::column_by_path;
pub use predicate::{Filter, equal_match, int_range_match, prefix_match, select_all, suffix_match};
pub use query::GroupedQuery;
pub use selection::{SelectionSet, intersect};
