//! Permission sets and visibility filter directives.
//!
//! A scan presents an ordered sequence of independently-granted
//! [`PermissionSet`]s (already minimized by the credential layer). Each set
//! gates one filter layer: [`build_filters`] turns the sequence into one
//! system-owned [`FilterDirective`] per set, named deterministically from the
//! set's position so directives are reproducible and addressable.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScanError};

/// Name prefix reserved for system-owned visibility filters.
///
/// The scan capability rejects any external mutation of -- or addition
/// under -- names matching this prefix.
pub const RESERVED_FILTER_PREFIX: &str = "strata.visibility-filter.";

/// Whether `name` falls inside the engine's reserved filter namespace.
pub fn is_reserved_name(name: &str) -> bool {
    name.starts_with(RESERVED_FILTER_PREFIX)
}

/// The reserved directive name for the permission set at `position`.
pub fn reserved_filter_name(position: usize) -> String {
    format!("{RESERVED_FILTER_PREFIX}{position}")
}

// ============================================================================
// PermissionSet
// ============================================================================

/// One independently-authored credential grant: an unordered set of
/// attribute-label strings.
///
/// Permission sets are supplied per request and have no persisted identity
/// beyond that request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    labels: BTreeSet<String>,
}

impl PermissionSet {
    /// Creates a permission set from any collection of labels.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this set grants `label`.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// The granted labels, in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Number of granted labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the set grants no labels at all.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

// ============================================================================
// FilterDirective
// ============================================================================

/// A named, ordered filtering instruction attached to a scan.
///
/// System-owned directives carry names in the reserved namespace and are
/// immune to external mutation; see
/// [`FilterChain`](crate::chain::FilterChain) for the enforcement surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDirective {
    name: String,
    labels: PermissionSet,
    system_owned: bool,
}

impl FilterDirective {
    /// Creates an externally-owned directive.
    ///
    /// External directives may not use the reserved namespace; the chain
    /// rejects them on attachment.
    pub fn new(name: impl Into<String>, labels: PermissionSet) -> Self {
        Self {
            name: name.into(),
            labels,
            system_owned: false,
        }
    }

    /// Creates a system-owned directive for the permission set at `position`.
    pub(crate) fn system(position: usize, labels: PermissionSet) -> Self {
        Self {
            name: reserved_filter_name(position),
            labels,
            system_owned: true,
        }
    }

    /// The directive's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The labels this directive filters by.
    pub fn labels(&self) -> &PermissionSet {
        &self.labels
    }

    /// Whether this directive is owned by the visibility engine.
    pub fn is_system_owned(&self) -> bool {
        self.system_owned
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_labels(&mut self, labels: PermissionSet) {
        self.labels = labels;
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builds the visibility filter chain for an ordered sequence of permission
/// sets.
///
/// The set at position `i` yields one system-owned directive named
/// [`reserved_filter_name`]`(i)`. Directives are applied in the order the
/// sets were supplied; order affects only execution cost, never the result
/// set -- each layer is independently restrictive and final admission is the
/// conjunction of all layers.
///
/// # Errors
///
/// Returns [`ScanError::InvalidArgument`] for an empty sequence: a scan with
/// zero permission sets has no defined semantics.
pub fn build_filters(permission_sets: &[PermissionSet]) -> Result<Vec<FilterDirective>> {
    if permission_sets.is_empty() {
        return Err(ScanError::InvalidArgument(
            "at least one permission set is required".to_owned(),
        ));
    }

    debug!(
        layers = permission_sets.len(),
        "building visibility filter directives"
    );

    Ok(permission_sets
        .iter()
        .enumerate()
        .map(|(position, set)| FilterDirective::system(position, set.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filters_names_by_position() {
        let sets = vec![
            PermissionSet::new(["A", "B", "C"]),
            PermissionSet::new(["A", "D", "E"]),
        ];

        let directives = build_filters(&sets).expect("build");
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[0].name(), "strata.visibility-filter.0");
        assert_eq!(directives[1].name(), "strata.visibility-filter.1");
        assert!(directives.iter().all(FilterDirective::is_system_owned));
        assert!(directives.iter().all(|d| is_reserved_name(d.name())));
    }

    #[test]
    fn test_build_filters_is_reproducible() {
        let sets = vec![PermissionSet::new(["A", "B"])];
        assert_eq!(
            build_filters(&sets).expect("build"),
            build_filters(&sets).expect("build")
        );
    }

    #[test]
    fn test_build_filters_rejects_empty_sequence() {
        let err = build_filters(&[]).expect_err("must reject");
        assert!(matches!(err, ScanError::InvalidArgument(_)));
    }

    #[test]
    fn test_permission_set_deduplicates_labels() {
        let set = PermissionSet::new(["B", "A", "B"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("A"));
        assert!(set.contains("B"));
        assert!(!set.contains("C"));
    }

    #[test]
    fn test_permission_set_labels_sorted() {
        let set: PermissionSet = ["C", "A", "B"].into_iter().collect();
        let labels: Vec<&str> = set.labels().collect();
        assert_eq!(labels, ["A", "B", "C"]);
    }

    #[test]
    fn test_reserved_name_predicate() {
        assert!(is_reserved_name("strata.visibility-filter.0"));
        assert!(is_reserved_name("strata.visibility-filter.custom"));
        assert!(!is_reserved_name("tenant-filter"));
        assert!(!is_reserved_name("strata.visibility"));
    }

    #[test]
    fn test_directive_serde_round_trip() {
        let directive =
            FilterDirective::new("tenant-filter", PermissionSet::new(["A", "B"]));
        let json = serde_json::to_string(&directive).expect("serialize");
        let back: FilterDirective = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, directive);
    }
}
