//! Compact textual notation for element trees.
//!
//! Used by the command-line driver and by tests to build documents without
//! a persistence format:
//!
//! ```text
//! Multiplication(Addition(1, 2), 3)
//! Root(Paragraph{numbered}("First", Assignment(x, 2.5)), Paragraph("Done"))
//! Matrix{members=1,1}[1, 2, 3; 4, 5, 6]
//! sin(x)                      // lowercase name + parens: FunctionCall
//! x                           // lowercase name: Variable
//! 42  1.5  2i  true  "prose"  // Literal (integer/real/complex/boolean), Text
//! ```
//!
//! Element construction goes through an [`ElementFactory`], so the notation
//! accepts exactly the element types the caller's registry knows about.

use quire_stack::ensure_sufficient_stack;

use crate::{Element, ElementId, ElementTree, Format, ListStyle, ParenthesisStyle, ValueType};

/// Creates fresh elements by type name.
pub trait ElementFactory {
    fn create_element(&self, type_name: &str) -> Option<Element>;
}

/// Parse failure, with the byte offset where it was detected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("notation error at offset {offset}: {message}")]
pub struct NotationError {
    pub offset: usize,
    pub message: String,
}

/// Parse `source` into a tree whose root is the single top-level element.
pub fn parse_notation(
    source: &str,
    factory: &dyn ElementFactory,
) -> Result<ElementTree, NotationError> {
    let mut parser = Parser {
        source,
        pos: 0,
        factory,
        tree: ElementTree::new(),
    };
    let root = parser.node()?;
    parser.skip_whitespace();
    if parser.pos < source.len() {
        return Err(parser.error("trailing input after the root element"));
    }
    parser.tree.set_root(root);
    Ok(parser.tree)
}

struct Parser<'s, 'f> {
    source: &'s str,
    pos: usize,
    factory: &'f dyn ElementFactory,
    tree: ElementTree,
}

impl Parser<'_, '_> {
    fn node(&mut self) -> Result<ElementId, NotationError> {
        ensure_sufficient_stack(|| {
            self.skip_whitespace();
            match self.peek() {
                Some(c) if c.is_ascii_digit() => self.number(),
                Some('"') => self.text(),
                Some(c) if c.is_alphabetic() || c == '_' => self.named(),
                Some(c) => Err(self.error(&format!("unexpected '{c}'"))),
                None => Err(self.error("unexpected end of input")),
            }
        })
    }

    fn number(&mut self) -> Result<ElementId, NotationError> {
        let start = self.pos;
        self.eat_while(|c| c.is_ascii_digit());
        let mut value_type = ValueType::Integer;
        if self.peek() == Some('.') {
            value_type = ValueType::Real;
            self.pos += 1;
            self.eat_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            value_type = ValueType::Real;
            self.pos += 1;
            if matches!(self.peek(), Some('+' | '-')) {
                self.pos += 1;
            }
            self.eat_while(|c| c.is_ascii_digit());
        }
        if self.peek() == Some('i') {
            value_type = ValueType::Complex;
            self.pos += 1;
        }
        let spelling = self.source[start..self.pos].to_string();
        let element = self
            .create("Literal")?
            .with_declared_type(value_type)
            .with_text(spelling);
        Ok(self.tree.alloc(element))
    }

    fn text(&mut self) -> Result<ElementId, NotationError> {
        let content = self.quoted()?;
        let element = self.create("Text")?.with_text(content);
        Ok(self.tree.alloc(element))
    }

    fn quoted(&mut self) -> Result<String, NotationError> {
        self.expect('"')?;
        let mut content = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(content),
                Some('\\') => match self.bump() {
                    Some('n') => content.push('\n'),
                    Some(c) => content.push(c),
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) => content.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn named(&mut self) -> Result<ElementId, NotationError> {
        let start = self.pos;
        self.eat_while(|c| c.is_alphanumeric() || c == '_');
        let name = self.source[start..self.pos].to_string();

        if name == "true" || name == "false" {
            let element = self
                .create("Literal")?
                .with_declared_type(ValueType::Boolean)
                .with_text(name);
            return Ok(self.tree.alloc(element));
        }

        if name.starts_with(|c: char| c.is_lowercase() || c == '_') {
            return if self.peek() == Some('(') {
                let element = self.create("FunctionCall")?.with_text(name);
                let id = self.tree.alloc(element);
                self.arguments(id)?;
                Ok(id)
            } else {
                let element = self.create("Variable")?.with_text(name);
                Ok(self.tree.alloc(element))
            };
        }

        let mut element = self.create(&name)?;
        if self.peek() == Some('{') {
            element = element.with_format(self.format()?);
        }
        if self.peek() == Some(':') {
            self.pos += 1;
            let content = self.quoted()?;
            element = element.with_text(content);
        }
        let id = self.tree.alloc(element);
        match self.peek() {
            Some('(') => self.arguments(id)?,
            Some('[') => self.rows(id)?,
            _ => {}
        }
        Ok(id)
    }

    fn arguments(&mut self, parent: ElementId) -> Result<(), NotationError> {
        self.expect('(')?;
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.pos += 1;
            return Ok(());
        }
        loop {
            let child = self.node()?;
            let offset = self.pos;
            self.tree
                .append_child(parent, child)
                .map_err(|e| NotationError {
                    offset,
                    message: e.to_string(),
                })?;
            self.skip_whitespace();
            match self.bump() {
                Some(',') => {}
                Some(')') => return Ok(()),
                _ => return Err(self.error("expected ',' or ')'")),
            }
        }
    }

    fn rows(&mut self, parent: ElementId) -> Result<(), NotationError> {
        self.expect('[')?;
        let mut row = Vec::new();
        loop {
            row.push(self.node()?);
            self.skip_whitespace();
            let separator = self.bump();
            if matches!(separator, Some(';' | ']')) {
                let offset = self.pos;
                self.tree
                    .push_row(parent, &row)
                    .map_err(|e| NotationError {
                        offset,
                        message: e.to_string(),
                    })?;
                row.clear();
            }
            match separator {
                Some(',' | ';') => {}
                Some(']') => return Ok(()),
                _ => return Err(self.error("expected ',', ';' or ']'")),
            }
        }
    }

    /// `{key, key=value, ...}` format annotation.
    fn format(&mut self) -> Result<Format, NotationError> {
        self.expect('{')?;
        let mut format = Format::new();
        loop {
            self.skip_whitespace();
            let start = self.pos;
            self.eat_while(|c| c.is_alphanumeric() || c == '_');
            let key = &self.source[start..self.pos];
            let mut values = Vec::new();
            if self.peek() == Some('=') {
                self.pos += 1;
                values.push(self.unsigned()?);
                while self.peek() == Some(',') && self.lookahead_is_digit() {
                    self.pos += 1;
                    values.push(self.unsigned()?);
                }
            }
            match (key, values.as_slice()) {
                ("numbered", []) => {
                    format.list_style = Some(ListStyle::Numbered { restart_at: None });
                }
                ("numbered", [start]) => {
                    format.list_style = Some(ListStyle::Numbered {
                        restart_at: Some(*start),
                    });
                }
                ("bullet", []) => format.list_style = Some(ListStyle::Bullet),
                ("precision", [digits]) => format.precision = Some(*digits),
                ("members", [leading, trailing]) => {
                    format.leading_members = Some(*leading as usize);
                    format.trailing_members = Some(*trailing as usize);
                }
                ("parentheses", []) => format.parenthesis_style = ParenthesisStyle::Parentheses,
                ("brackets", []) => format.parenthesis_style = ParenthesisStyle::Brackets,
                ("braces", []) => format.parenthesis_style = ParenthesisStyle::Braces,
                _ => return Err(self.error(&format!("unknown format key '{key}'"))),
            }
            self.skip_whitespace();
            match self.bump() {
                Some(',') => {}
                Some('}') => return Ok(format),
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn unsigned(&mut self) -> Result<u32, NotationError> {
        let start = self.pos;
        self.eat_while(|c| c.is_ascii_digit());
        self.source[start..self.pos]
            .parse()
            .map_err(|_| self.error("expected an unsigned number"))
    }

    fn lookahead_is_digit(&self) -> bool {
        self.source[self.pos..]
            .chars()
            .nth(1)
            .is_some_and(|c| c.is_ascii_digit())
    }

    fn create(&self, type_name: &str) -> Result<Element, NotationError> {
        self.factory
            .create_element(type_name)
            .ok_or_else(|| self.error(&format!("unknown element type '{type_name}'")))
    }

    fn expect(&mut self, expected: char) -> Result<(), NotationError> {
        self.skip_whitespace();
        if self.bump() == Some(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{expected}'")))
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        self.eat_while(char::is_whitespace);
    }

    fn error(&self, message: &str) -> NotationError {
        NotationError {
            offset: self.pos,
            message: message.to_string(),
        }
    }
}
