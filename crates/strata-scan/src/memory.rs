//! In-memory scan capability.
//!
//! A small in-process record store used by the surrounding system for tests
//! and local development. It is also where satisfaction evaluation lives:
//! the visibility engine only produces canonical text and directives, and
//! delegates the "does this credential set satisfy this expression" decision
//! to the store's filter capability -- which this module implements.

use bytes::Bytes;
use tracing::debug;

use strata_visibility::{Node, VisibilityExpression};

use crate::chain::FilterChain;
use crate::error::Result;
use crate::filter::{PermissionSet, build_filters};

/// One stored record: an opaque key/value pair gated by a visibility
/// expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    key: String,
    value: Bytes,
    visibility: VisibilityExpression,
}

impl Record {
    /// Creates a record, parsing its visibility expression text.
    pub fn new(
        key: impl Into<String>,
        visibility: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Result<Self> {
        Ok(Self {
            key: key.into(),
            value: value.into(),
            visibility: VisibilityExpression::parse(visibility)?,
        })
    }

    /// The record's key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The record's payload.
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// The record's visibility expression.
    pub fn visibility(&self) -> &VisibilityExpression {
        &self.visibility
    }
}

/// In-memory scanner over a fixed set of records, filtered by a
/// [`FilterChain`].
///
/// A record is admitted iff every directive in the chain admits it; each
/// directive admits a record iff the record's visibility expression is
/// satisfied by the directive's label set (term: membership, And: all
/// children, Or: any child). The chain's directives are independently
/// restrictive, so their application order never changes the result set.
#[derive(Debug, Clone, Default)]
pub struct MemoryScanner {
    records: Vec<Record>,
    chain: FilterChain,
}

impl MemoryScanner {
    /// Creates a scanner with an empty filter chain. Until directives are
    /// attached, a scan returns every record.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            chain: FilterChain::new(),
        }
    }

    /// Creates a scanner with one system-owned visibility filter per
    /// permission set, in the order supplied.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidArgument`](crate::ScanError::InvalidArgument)
    /// if `permission_sets` is empty.
    pub fn with_permission_sets(
        records: Vec<Record>,
        permission_sets: &[PermissionSet],
    ) -> Result<Self> {
        let mut scanner = Self::new(records);
        scanner.attach_permission_sets(permission_sets)?;
        Ok(scanner)
    }

    /// Builds and attaches the system-owned directives for
    /// `permission_sets`. Re-applying the same sequence is idempotent:
    /// directives replace by name rather than accumulate.
    pub fn attach_permission_sets(&mut self, permission_sets: &[PermissionSet]) -> Result<()> {
        for directive in build_filters(permission_sets)? {
            self.chain.attach_system(directive);
        }
        debug!(
            layers = self.chain.directives().len(),
            "attached visibility filters to scanner"
        );
        Ok(())
    }

    /// The scanner's filter chain (the externally mutable surface).
    pub fn chain(&self) -> &FilterChain {
        &self.chain
    }

    /// Mutable access to the filter chain. All mutations remain subject to
    /// the chain's integrity rules.
    pub fn chain_mut(&mut self) -> &mut FilterChain {
        &mut self.chain
    }

    /// Scans the store, yielding records admitted by every directive in the
    /// chain, in storage order.
    pub fn scan(&self) -> Result<Vec<&Record>> {
        let mut admitted = Vec::new();
        for record in &self.records {
            if self.admits(record)? {
                admitted.push(record);
            }
        }
        Ok(admitted)
    }

    /// Conjunction of all directives' per-record decisions.
    fn admits(&self, record: &Record) -> Result<bool> {
        for directive in self.chain.directives() {
            if !satisfies(
                record.visibility.root(),
                record.visibility.source(),
                directive.labels(),
            )? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Whether `labels` satisfies the expression rooted at `node`.
fn satisfies(node: &Node, source: &[u8], labels: &PermissionSet) -> Result<bool> {
    match node {
        Node::Term(term) => Ok(labels.contains(term.as_str(source)?)),
        Node::And(children) => {
            for child in children {
                if !satisfies(child, source, labels)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Node::Or(children) => {
            for child in children {
                if satisfies(child, source, labels)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn record(key: &str, visibility: &str) -> Record {
        Record::new(key, visibility.to_owned(), Bytes::new()).expect("record")
    }

    fn scan_keys(scanner: &MemoryScanner) -> Vec<String> {
        scanner
            .scan()
            .expect("scan")
            .iter()
            .map(|r| r.key().to_owned())
            .collect()
    }

    #[test_case("A", &["A"], true ; "single term granted")]
    #[test_case("A", &["B"], false ; "single term missing")]
    #[test_case("A&B", &["A", "B"], true ; "conjunction fully granted")]
    #[test_case("A&B", &["A"], false ; "conjunction partially granted")]
    #[test_case("A|B", &["B"], true ; "disjunction one granted")]
    #[test_case("A|B", &["C"], false ; "disjunction none granted")]
    #[test_case("(A|B)&C", &["B", "C"], true ; "mixed granted")]
    #[test_case("(A|B)&C", &["A", "B"], false ; "mixed missing conjunct")]
    fn test_satisfaction(expression: &str, labels: &[&str], expected: bool) {
        let expr = VisibilityExpression::parse(expression.to_owned()).expect("parse");
        let granted = PermissionSet::new(labels.iter().copied());
        assert_eq!(
            satisfies(expr.root(), expr.source(), &granted).expect("evaluate"),
            expected
        );
    }

    #[test]
    fn test_scan_without_filters_returns_everything() {
        let scanner = MemoryScanner::new(vec![record("r1", "A"), record("r2", "B&C")]);
        assert_eq!(scan_keys(&scanner), ["r1", "r2"]);
    }

    #[test]
    fn test_single_layer_filters_by_labels() {
        let scanner = MemoryScanner::with_permission_sets(
            vec![record("r1", "A&B"), record("r2", "A&C"), record("r3", "A")],
            &[PermissionSet::new(["A", "B"])],
        )
        .expect("scanner");
        assert_eq!(scan_keys(&scanner), ["r1", "r3"]);
    }

    #[test]
    fn test_layered_filters_admit_conjunction_only() {
        // Three independently-granted sets; only a record visible under the
        // label common to all three layers survives the whole chain.
        let scanner = MemoryScanner::with_permission_sets(
            vec![
                record("abc", "A&B&C"),
                record("ade", "A&D&E"),
                record("afg", "A&F&G"),
                record("a", "A"),
            ],
            &[
                PermissionSet::new(["A", "B", "C"]),
                PermissionSet::new(["A", "D", "E"]),
                PermissionSet::new(["A", "F", "G"]),
            ],
        )
        .expect("scanner");

        assert_eq!(scan_keys(&scanner), ["a"]);
    }

    #[test]
    fn test_layer_order_does_not_change_result() {
        let records = vec![
            record("abc", "A&B&C"),
            record("a", "A"),
            record("x", "X"),
        ];
        let forward = MemoryScanner::with_permission_sets(
            records.clone(),
            &[
                PermissionSet::new(["A", "B", "C"]),
                PermissionSet::new(["A"]),
            ],
        )
        .expect("scanner");
        let reverse = MemoryScanner::with_permission_sets(
            records,
            &[
                PermissionSet::new(["A"]),
                PermissionSet::new(["A", "B", "C"]),
            ],
        )
        .expect("scanner");

        assert_eq!(scan_keys(&forward), scan_keys(&reverse));
    }

    #[test]
    fn test_attach_is_idempotent_across_reapplication() {
        let sets = vec![PermissionSet::new(["A"])];
        let mut scanner =
            MemoryScanner::with_permission_sets(vec![record("a", "A")], &sets).expect("scanner");
        scanner.attach_permission_sets(&sets).expect("reattach");

        assert_eq!(scanner.chain().directives().len(), 1);
        assert_eq!(scan_keys(&scanner), ["a"]);
    }

    #[test]
    fn test_empty_permission_set_admits_nothing() {
        let scanner = MemoryScanner::with_permission_sets(
            vec![record("a", "A")],
            &[PermissionSet::default()],
        )
        .expect("scanner");
        assert!(scan_keys(&scanner).is_empty());
    }
}
