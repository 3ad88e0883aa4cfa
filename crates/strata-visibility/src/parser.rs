//! Recursive-descent parser for visibility-expression text.
//!
//! Produces a [`Node`] tree whose terms are spans into the caller's source
//! buffer; the parser allocates no per-term strings. The grammar is acyclic
//! by construction, so consumers never need to re-validate tree shape.

use crate::error::{Result, VisibilityError};
use crate::expression::{Node, Term};

/// Bytes permitted inside a term label.
fn is_term_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':' | b'/')
}

/// Parses `source` into a normalized tree: internal nodes carry at least two
/// children, and `&`/`|` never mix at one nesting level without parentheses.
pub(crate) fn parse(source: &[u8]) -> Result<Node> {
    let mut parser = Parser { source, pos: 0 };
    let root = parser.expression()?;
    if parser.pos != source.len() {
        return Err(parser.error("unbalanced ')'"));
    }
    Ok(root)
}

struct Parser<'a> {
    source: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> VisibilityError {
        VisibilityError::Parse {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    /// One expression level: operands joined by a single operator kind.
    fn expression(&mut self) -> Result<Node> {
        let mut children = vec![self.operand()?];
        let mut operator: Option<u8> = None;

        while let Some(&b) = self.source.get(self.pos) {
            match b {
                b'&' | b'|' => {
                    if operator.is_some_and(|prev| prev != b) {
                        return Err(
                            self.error("cannot mix '&' and '|' without parentheses")
                        );
                    }
                    operator = Some(b);
                    self.pos += 1;
                    children.push(self.operand()?);
                }
                b')' => break,
                other => {
                    return Err(self.error(format!("unexpected character '{}'", other as char)));
                }
            }
        }

        Ok(match operator {
            None => children.remove(0),
            Some(b'&') => Node::And(children),
            Some(_) => Node::Or(children),
        })
    }

    /// A single operand: a term or a parenthesized sub-expression.
    fn operand(&mut self) -> Result<Node> {
        match self.source.get(self.pos) {
            Some(b'(') => {
                self.pos += 1;
                let inner = self.expression()?;
                if self.source.get(self.pos) != Some(&b')') {
                    return Err(self.error("unclosed '('"));
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(&b) if is_term_byte(b) => {
                let start = self.pos;
                while self
                    .source
                    .get(self.pos)
                    .is_some_and(|&b| is_term_byte(b))
                {
                    self.pos += 1;
                }
                Ok(Node::Term(Term::new(start, self.pos)))
            }
            Some(&b) => Err(self.error(format!(
                "expected term or '(', found '{}'",
                b as char
            ))),
            None => Err(self.error("unexpected end of expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term_text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
        match node {
            Node::Term(term) => term.as_str(source).expect("valid span"),
            other => panic!("expected term, got {other:?}"),
        }
    }

    #[test]
    fn test_term_spans_point_into_source() {
        let source = b"alpha&beta-2";
        let root = parse(source).expect("parse");
        let children = root.children();
        assert_eq!(term_text(&children[0], source), "alpha");
        assert_eq!(term_text(&children[1], source), "beta-2");
    }

    #[test]
    fn test_grouping_is_transparent_for_single_operand() {
        // "(A)" parses to the same tree as "A"
        let root = parse(b"((A))").expect("parse");
        assert!(root.is_term());
    }

    #[test]
    fn test_nested_same_operator_keeps_structure() {
        // Parenthesized conjuncts stay as a nested And; the flattener, not
        // the parser, is responsible for associative flattening of output.
        let root = parse(b"A&(B&C)").expect("parse");
        let children = root.children();
        assert_eq!(children.len(), 2);
        assert!(matches!(children[1], Node::And(_)));
    }

    #[test]
    fn test_operator_precedence_requires_parens() {
        assert!(parse(b"A|B&C").is_err());
        assert!(parse(b"A|(B&C)").is_ok());
        assert!(parse(b"(A|B)&C").is_ok());
    }

    #[test]
    fn test_term_character_set() {
        assert!(parse(b"org/unit:team_1.sub-group").is_ok());
        assert!(parse(b"A B").is_err());
        assert!(parse(b"A!B").is_err());
    }

    #[test]
    fn test_parse_error_carries_offset() {
        let err = parse(b"AB&&C").expect_err("must reject");
        match err {
            VisibilityError::Parse { offset, .. } => assert_eq!(offset, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
