//! # Common: Shared Schema, Errors, and Canonical Serialization
//!
//! Types and helpers shared by every crate in the pool: the error taxonomy
//! (`PoolError`), the on-disk `object.json` / `mapping.json` metadata shape,
//! and the canonical-JSON serializer used to compute overlay hashes.

pub mod canonical;
pub mod error;
pub mod metadata;
pub mod schema;
pub mod validate;

pub use error::PoolError;
pub use metadata::Metadata;
pub use schema::{ObjectRecord, OverlayFields};

/// Schema version embedded in every stored `object.json`.
///
/// Bumped only on a breaking change to the on-disk shape; `validate`
/// rejects any other value with `PoolError::SchemaMismatch`.
pub const SCHEMA_VERSION: u32 = 1;

/// The namespace constant baked into every canonical slot name
/// (`_bb_v_0`, `_bb_v_1`, …) and into the `object_<HEX>` pool-import
/// convention. Fixed at build time per spec.md Open Questions.
pub const NAMESPACE: &str = "bb";

/// Returns the canonical outer-function slot name (`_bb_v_0`).
pub fn outer_slot() -> String {
    slot_name(0)
}

/// Returns the canonical slot name for index `n` (`_bb_v_<n>`).
pub fn slot_name(n: usize) -> String {
    format!("_{NAMESPACE}_v_{n}")
}

/// The fixed dotted module path pool imports are recognized under
/// (`bb.pool`), and the mandatory prefix on the hex payload
/// (`object_<HEX>`).
pub const POOL_MODULE: &str = "bb.pool";
pub const POOL_IMPORT_PREFIX: &str = "object_";
