//! RepSage Catalog: the visual exercise catalog the resolver looks names up in.
//!
//! The resolver only depends on the [`ExerciseCatalog`] trait. [`StaticCatalog`]
//! is an in-memory implementation loaded from `catalog.json` or from the
//! built-in seed list.

pub mod seed;
pub mod static_catalog;
pub mod types;

pub use static_catalog::StaticCatalog;
pub use types::*;
