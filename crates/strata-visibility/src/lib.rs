//! # strata-visibility: Visibility-Expression Engine
//!
//! Every record stored in Strata carries a boolean *visibility expression*
//! over security attribute labels (`A&B`, `(A|C)&D`). This crate implements
//! the engine that canonicalizes and combines those expressions:
//! - **Expression tree** ([`Node`], [`Term`], [`VisibilityExpression`]):
//!   immutable parsed representation, term spans into one shared buffer
//! - **Flattener** ([`flatten`]): deterministic, minimal textual rendering
//!   with optional sorted sibling order
//! - **Combiner** ([`combine`], [`combine_maps`]): merges independently
//!   authored expressions into one conjunction with term-level deduplication
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Expression text ("B&A", "(A|C)&D", ...)     │
//! └─────────────────┬───────────────────────────┘
//!                   │ parse
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Node tree over shared source buffer         │
//! └─────────────────┬───────────────────────────┘
//!                   │ flatten (sort = true)
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Canonical text ("A&B")                      │
//! │  - equality / dedup / cache key              │
//! │  - input to combine                          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Canonical text is the system's notion of value equality: two expressions
//! are the same iff their sorted renderings are byte-identical. Combination
//! is conjunctive by policy and never simplifies the boolean algebra --
//! visibility semantics, not algebraic minimality, governs correctness.
//!
//! All operations here are pure, synchronous functions over immutable
//! inputs; they are safe to call concurrently without coordination.
//!
//! ## Examples
//!
//! ```
//! use strata_visibility::{combine, VisibilityExpression};
//!
//! let a = VisibilityExpression::parse("B&A")?;
//! assert_eq!(a.canonical()?, "A&B");
//!
//! let b = VisibilityExpression::parse("A&C")?;
//! assert_eq!(combine([&a, &b])?.to_string(), "A&B&C");
//! # Ok::<(), strata_visibility::VisibilityError>(())
//! ```

pub mod combine;
pub mod error;
pub mod expression;
pub mod flatten;

mod parser;

pub use combine::{VISIBILITY_KEY, combine, combine_maps};
pub use error::{Result, VisibilityError};
pub use expression::{Node, Term, VisibilityExpression};
pub use flatten::flatten;
