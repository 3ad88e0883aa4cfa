//! Conjunctive combination of visibility expressions.
//!
//! Combining a collection of independently-authored expressions produces one
//! expression meaning "all of these must hold". Combination is deliberately
//! *not* boolean simplification: `{A|B, A|C}` combines to `(A|B)&(A|C)`,
//! never to a distributed or minimized form, because each uncombined
//! alternative must still hold on its own.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, VisibilityError};
use crate::expression::{Node, VisibilityExpression};
use crate::flatten::flatten;

/// Attribute-map key under which record visibility is stored.
pub const VISIBILITY_KEY: &str = "visibility";

/// Combines a set of expressions into their logical conjunction.
///
/// Input has set semantics: order is irrelevant and duplicates collapse.
/// Each input contributes its top-level conjuncts (one level of associative
/// flattening — a top-level `And` contributes its immediate children, any
/// other node contributes itself whole). Contributions are deduplicated by
/// canonical text; a single surviving piece *is* the result, otherwise the
/// pieces form a new sorted conjunction.
///
/// # Errors
///
/// Returns [`VisibilityError::InvalidArgument`] for an empty input: an empty
/// visibility label has different security semantics than "no constraint",
/// so nothing-to-combine must be rejected rather than silently emitted.
pub fn combine<'a, I>(expressions: I) -> Result<VisibilityExpression>
where
    I: IntoIterator<Item = &'a VisibilityExpression>,
{
    // Conjunct text -> whether its top-level node is a disjunction (and so
    // needs parentheses inside the combined conjunction). BTreeMap keys give
    // both the dedup-by-canonical-text set and the byte-lexicographic order
    // the sorted flattener would produce.
    let mut pieces: BTreeMap<String, bool> = BTreeMap::new();

    for expr in expressions {
        match expr.root() {
            Node::And(children) => {
                for child in children {
                    let text = flatten(child, expr.source(), true)?;
                    pieces.insert(text, matches!(child, Node::Or(_)));
                }
            }
            node => {
                let text = flatten(node, expr.source(), true)?;
                pieces.insert(text, matches!(node, Node::Or(_)));
            }
        }
    }

    if pieces.is_empty() {
        return Err(VisibilityError::InvalidArgument(
            "cannot combine an empty set of visibility expressions".to_owned(),
        ));
    }

    debug!(conjuncts = pieces.len(), "combined visibility expressions");

    let mut out = String::new();
    for (i, (text, is_disjunction)) in pieces.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        // Degenerate single-piece conjunctions collapse: no parentheses are
        // added unless the piece actually sits inside a wider conjunction.
        if *is_disjunction && pieces.len() > 1 {
            out.push('(');
            out.push_str(text);
            out.push(')');
        } else {
            out.push_str(text);
        }
    }

    VisibilityExpression::parse(out)
}

/// Combines two attribute maps key-wise.
///
/// Keys present in only one map pass through unchanged; keys present in both
/// have their expression values combined per [`combine`]. This models merging
/// two metadata bundles where only overlapping attribute keys need boolean
/// combination.
pub fn combine_maps(
    a: &BTreeMap<String, String>,
    b: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();

    for (key, value) in a {
        match b.get(key) {
            Some(other) => {
                let lhs = VisibilityExpression::parse(value.clone())?;
                let rhs = VisibilityExpression::parse(other.clone())?;
                out.insert(key.clone(), combine([&lhs, &rhs])?.to_string());
            }
            None => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    for (key, value) in b {
        if !a.contains_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }

    Ok(out)
}
