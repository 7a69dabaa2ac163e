//! Pure, storage-independent functions the Adapter Facade builds on: the
//! criteria normalizer, the attribute augmenter, and the schema-alter diff.
//!
//! Nothing here touches an [`Adapter`](millrace_core::Adapter) — every
//! function in this crate takes plain data in and returns plain data out,
//! which is what makes them straightforward to property-test.

pub mod attributes;
pub mod criteria;
pub mod schema_diff;

pub use attributes::{augment, AttributeInput};
pub use criteria::normalize;
pub use schema_diff::{diff_attributes, SchemaDiff};
