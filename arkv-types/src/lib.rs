//! Data model for arkv batches.
//!
//! Batches are Arrow [`RecordBatch`]es whose columns are restricted to
//! Boolean, Int32, Utf8 and Decimal128 leaves (optionally grouped in Struct
//! columns). This crate provides:
//!
//! - [`CellValue`] / [`DecimalValue`]: one typed cell.
//! - [`ColumnVector`]: a growable, index-addressable column used while a
//!   batch is being filled. Every read and write site matches on it
//!   exhaustively, so adding a variant is a compile error until each site
//!   handles it.
//! - [`BatchBuilder`]: the target of vectorize callbacks; resolves dotted
//!   field paths and assembles the final [`RecordBatch`].

pub mod builder;
pub mod cell;
pub mod column;
pub mod decimal;

pub use arrow::record_batch::RecordBatch;
pub use builder::BatchBuilder;
pub use cell::{CellValue, cell_at};
pub use column::{ColumnVector, DecimalColumn, StructColumn};
pub use decimal::DecimalValue;
