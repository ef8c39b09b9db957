//! # Forge: Normalization and Identity Engine
//!
//! Implements spec.md §4.3-§4.7: turns a parsed single-function unit into
//! its canonical form (alpha-normalized identifiers, sorted imports,
//! rewritten pool-call sites, stripped docstring) and back again, plus
//! the SHA-256 identity functions computed over those canonical forms.
//!
//! Two trees that differ only in naming, docstring text, comment text, or
//! import order normalize to the same [`normalize::NormalizedUnit`]
//! `canonical_code` — that's the whole point: [`hash::function_hash`]
//! only ever sees the canonical form.

pub mod denormalize;
pub mod hash;
pub mod names;
pub mod normalize;
pub mod stringlit;
pub mod transform;

pub use denormalize::denormalize;
pub use hash::{function_hash, overlay_hash};
pub use normalize::{normalize, NormalizedUnit};
