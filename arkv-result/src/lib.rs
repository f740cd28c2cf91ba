//! Error types and result definitions shared by every arkv crate.
//!
//! All fallible operations return [`Result<T>`], whose error variant is the
//! single [`Error`] enum. Crates never define their own error types; they
//! convert foreign failures (I/O, Arrow, JSON) through the `From` impls on
//! [`Error`] or through the helper constructors such as [`Error::codec`].
//!
//! # Error Categories
//!
//! - **Lookup failures** ([`Error::NotFound`]): missing collection, sequence,
//!   batch blob or field. Non-fatal; callers report and continue.
//! - **Type failures** ([`Error::UnsupportedType`]): a value or column type
//!   outside Boolean / Int32 / Utf8 / Decimal (or Struct for nesting).
//! - **Codec failures** ([`Error::Codec`], [`Error::Arrow`]): malformed or
//!   truncated stored blobs. Fatal for the batch being decoded only.
//! - **Engine failures** ([`Error::Engine`], [`Error::Io`]): the KV engine
//!   could not complete a get, put or delete.
//! - **Input errors** ([`Error::InvalidArgumentError`], [`Error::Json`]).
//! - **Internal errors** ([`Error::Internal`]): broken invariants.

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
