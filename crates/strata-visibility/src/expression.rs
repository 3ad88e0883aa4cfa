//! Visibility-expression data model.
//!
//! A parsed expression is an immutable tree of [`Node`]s whose leaves are
//! [`Term`] spans into one shared source buffer. The engine never mutates a
//! tree after parsing; every operation produces new text instead.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, VisibilityError};
use crate::flatten::flatten;
use crate::parser;

// ============================================================================
// Term
// ============================================================================

/// An atomic attribute label: a contiguous byte span `[start, end)` into the
/// expression's source buffer.
///
/// Terms carry no text of their own, avoiding a per-label allocation; the
/// backing buffer is owned by the [`VisibilityExpression`] (or supplied
/// alongside the tree by an external parser).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    start: usize,
    end: usize,
}

impl Term {
    /// Creates a term covering `[start, end)` of a source buffer.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Start offset of the span.
    pub fn start(&self) -> usize {
        self.start
    }

    /// End offset (exclusive) of the span.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The raw bytes of this term within `source`.
    ///
    /// # Errors
    ///
    /// Returns [`VisibilityError::InvalidArgument`] if the span falls outside
    /// the buffer.
    pub fn bytes<'a>(&self, source: &'a [u8]) -> Result<&'a [u8]> {
        source.get(self.start..self.end).ok_or_else(|| {
            VisibilityError::InvalidArgument(format!(
                "term span {}..{} exceeds source buffer of {} bytes",
                self.start,
                self.end,
                source.len()
            ))
        })
    }

    /// The term's label text, decoded from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`VisibilityError::Encoding`] if the span is not valid UTF-8.
    /// The error is propagated, never substituted.
    pub fn as_str<'a>(&self, source: &'a [u8]) -> Result<&'a str> {
        std::str::from_utf8(self.bytes(source)?).map_err(|_| VisibilityError::Encoding {
            start: self.start,
            end: self.end,
        })
    }
}

// ============================================================================
// Node
// ============================================================================

/// One node of a parsed visibility-expression tree.
///
/// Internal nodes hold an *ordered* sequence of children (order affects
/// unsorted output); a normalized tree has at least two children per internal
/// node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A leaf attribute label.
    Term(Term),
    /// Conjunction: every child must hold.
    And(Vec<Node>),
    /// Disjunction: at least one child must hold.
    Or(Vec<Node>),
}

impl Node {
    /// Whether this node is a leaf term.
    pub fn is_term(&self) -> bool {
        matches!(self, Node::Term(_))
    }

    /// The node's children, empty for a term.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Term(_) => &[],
            Node::And(children) | Node::Or(children) => children,
        }
    }
}

// ============================================================================
// VisibilityExpression
// ============================================================================

/// A parsed visibility expression: a [`Node`] tree plus the source buffer its
/// term spans point into.
///
/// Two expressions are semantically equal when their canonical text (sorted
/// flatten) is byte-identical; `PartialEq` implements exactly that, so
/// `parse("B&A") == parse("A&B")`.
#[derive(Debug, Clone)]
pub struct VisibilityExpression {
    source: Bytes,
    root: Node,
}

impl VisibilityExpression {
    /// Parses expression text into a tree.
    ///
    /// Terms are runs of `[A-Za-z0-9_.:/-]`; `&` joins conjuncts, `|` joins
    /// disjuncts, parentheses group. Mixing `&` and `|` at one nesting level
    /// without parentheses is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`VisibilityError::Parse`] for malformed text.
    pub fn parse(text: impl Into<Bytes>) -> Result<Self> {
        let source = text.into();
        let root = parser::parse(&source)?;
        Ok(Self { source, root })
    }

    /// The root of the parsed tree.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The source buffer the tree's term spans point into.
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Canonical text: deterministic sorted rendering, used as the engine's
    /// equality and deduplication key.
    pub fn canonical(&self) -> Result<String> {
        flatten(&self.root, &self.source, true)
    }

    /// Renders the expression, optionally with deterministic sibling
    /// ordering. `sort = false` preserves the author's child order.
    pub fn flatten(&self, sort: bool) -> Result<String> {
        flatten(&self.root, &self.source, sort)
    }
}

impl fmt::Display for VisibilityExpression {
    /// Displays the original source text (parse accepts only ASCII bytes, so
    /// the lossy conversion never actually loses anything).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.source))
    }
}

impl PartialEq for VisibilityExpression {
    fn eq(&self, other: &Self) -> bool {
        match (self.canonical(), other.canonical()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

// Parsed expressions always canonicalize (the parser admits only ASCII), so
// semantic equality is reflexive.
impl Eq for VisibilityExpression {}

impl Serialize for VisibilityExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for VisibilityExpression {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(text).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Tests
// ============================================================================
