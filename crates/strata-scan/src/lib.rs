//! # strata-scan: Visibility Filter Chains for Scans
//!
//! Bridges credential grants to record scans. A request arrives with an
//! ordered sequence of already-minimized [`PermissionSet`]s; each set gates
//! one filter layer on the scan, and a record is visible only if every layer
//! admits it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Permission sets (minimized, ordered)        │
//! │  [{A,B,C}, {A,D,E}, {A,F,G}]                 │
//! └─────────────────┬───────────────────────────┘
//!                   │ build_filters
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  System-owned FilterDirectives               │
//! │  strata.visibility-filter.0 ..2              │
//! └─────────────────┬───────────────────────────┘
//!                   │ attach
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  FilterChain on the scan capability          │
//! │  - external add/remove/rename/update         │
//! │    rejected for the reserved namespace       │
//! │  - admission = conjunction of all layers     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! System-owned directives are immutable from the outside: removal, rename,
//! or option mutation of a reserved name -- and adding a new directive under
//! it -- fail with [`ScanError::IntegrityViolation`] rather than being
//! silently ignored.
//!
//! ## Examples
//!
//! ```
//! use strata_scan::{MemoryScanner, PermissionSet, Record};
//!
//! let records = vec![
//!     Record::new("r1", "A&B", "payload".as_bytes().to_vec())?,
//!     Record::new("r2", "A", "payload".as_bytes().to_vec())?,
//! ];
//! let scanner = MemoryScanner::with_permission_sets(
//!     records,
//!     &[PermissionSet::new(["A"])],
//! )?;
//! let visible = scanner.scan()?;
//! assert_eq!(visible.len(), 1);
//! assert_eq!(visible[0].key(), "r2");
//! # Ok::<(), strata_scan::ScanError>(())
//! ```

pub mod chain;
pub mod error;
pub mod filter;
pub mod memory;

pub use chain::FilterChain;
pub use error::{Result, ScanError};
pub use filter::{
    FilterDirective, PermissionSet, RESERVED_FILTER_PREFIX, build_filters, is_reserved_name,
    reserved_filter_name,
};
pub use memory::{MemoryScanner, Record};
