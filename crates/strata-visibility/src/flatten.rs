//! Canonical rendering of visibility-expression trees.
//!
//! The flattener rewrites a parsed tree back into minimal textual form:
//! children joined by their node's operator, parentheses only around a child
//! whose operator differs from its parent's. With `sort = true` the output is
//! deterministic across processes, which is what makes canonical text usable
//! as an equality, deduplication, and cache key.

use std::mem::discriminant;

use crate::error::Result;
use crate::expression::Node;

/// Renders `root` against its `source` buffer.
///
/// - A term emits its exact span bytes, decoded as UTF-8.
/// - An internal node joins its children with `&` (And) or `|` (Or); a child
///   is parenthesized iff it is an internal node of the other operator type.
///   Same-type internal children are emitted inline, which performs the
///   associative flattening (`A&(B&C)` renders as `A&B&C`).
/// - With `sort = true`, children are ordered by byte-lexicographic
///   comparison of their own canonical text. The sort is stable, so
///   duplicate terms keep their relative order.
///
/// # Errors
///
/// Returns [`VisibilityError::Encoding`](crate::VisibilityError::Encoding) if
/// a term span is not valid UTF-8, and
/// [`VisibilityError::InvalidArgument`](crate::VisibilityError::InvalidArgument)
/// if a span falls outside `source`.
pub fn flatten(root: &Node, source: &[u8], sort: bool) -> Result<String> {
    match root {
        Node::Term(term) => Ok(term.as_str(source)?.to_owned()),
        Node::And(children) | Node::Or(children) => {
            let separator = if matches!(root, Node::And(_)) { '&' } else { '|' };

            // Each child's canonical text doubles as its sort key.
            let mut parts = Vec::with_capacity(children.len());
            for child in children {
                let text = flatten(child, source, sort)?;
                let parenthesize = !child.is_term() && discriminant(child) != discriminant(root);
                parts.push((text, parenthesize));
            }
            if sort {
                parts.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            }

            let mut out = String::with_capacity(source.len());
            for (i, (text, parenthesize)) in parts.iter().enumerate() {
                if i > 0 {
                    out.push(separator);
                }
                if *parenthesize {
                    out.push('(');
                    out.push_str(text);
                    out.push(')');
                } else {
                    out.push_str(text);
                }
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VisibilityError;
    use crate::expression::{Term, VisibilityExpression};
    use test_case::test_case;

    fn canonical(text: &str) -> String {
        VisibilityExpression::parse(text.to_owned())
            .expect("parse")
            .canonical()
            .expect("flatten")
    }

    fn unsorted(text: &str) -> String {
        VisibilityExpression::parse(text.to_owned())
            .expect("parse")
            .flatten(false)
            .expect("flatten")
    }

    #[test_case("A&B", "A&B" ; "already sorted conjunction")]
    #[test_case("B&A", "A&B" ; "unsorted conjunction")]
    #[test_case("C|B|A", "A|B|C" ; "disjunction sorts")]
    #[test_case("A&(B&C)", "A&B&C" ; "same type child inlined")]
    #[test_case("(A|B)&(A|C)", "(A|B)&(A|C)" ; "mixed type child parenthesized")]
    #[test_case("(A&B)|(A&C)", "(A&B)|(A&C)" ; "and under or parenthesized")]
    #[test_case("(B|A)&D", "(A|B)&D" ; "nested children sort too")]
    #[test_case("D&(C|B)&A", "A&(B|C)&D" ; "sort key ignores parentheses")]
    fn test_canonical_form(input: &str, expected: &str) {
        assert_eq!(canonical(input), expected);
    }

    #[test]
    fn test_unsorted_preserves_author_order() {
        assert_eq!(unsorted("B&A"), "B&A");
        assert_eq!(unsorted("C|(B&A)"), "C|(B&A)");
    }

    #[test]
    fn test_sorted_output_identical_for_permuted_inputs() {
        assert_eq!(canonical("A&B&C"), canonical("C&A&B"));
        assert_eq!(canonical("(A|B)&C"), canonical("C&(B|A)"));
    }

    #[test]
    fn test_canonicalization_is_idempotent() {
        for input in ["B&A", "(C|B)&A", "A&(B&C)", "(A&B)|(A&C)", "X"] {
            let once = canonical(input);
            assert_eq!(canonical(&once), once, "not a fixed point: {input}");
        }
    }

    #[test]
    fn test_duplicate_terms_remain_stable() {
        // Equal terms sort as equal; stable sort keeps both occurrences.
        assert_eq!(canonical("A&B&A"), "A&A&B");
    }

    #[test]
    fn test_external_tree_with_invalid_utf8_term() {
        let source: &[u8] = &[0xC3, 0x28, b'&', b'B'];
        let root = Node::And(vec![
            Node::Term(Term::new(0, 2)),
            Node::Term(Term::new(3, 4)),
        ]);
        let err = flatten(&root, source, true).expect_err("must fail");
        assert_eq!(err, VisibilityError::Encoding { start: 0, end: 2 });
    }

    #[test]
    fn test_external_tree_with_out_of_bounds_span() {
        let root = Node::Term(Term::new(0, 16));
        assert!(matches!(
            flatten(&root, b"short", true).expect_err("must fail"),
            VisibilityError::InvalidArgument(_)
        ));
    }
}
