//! JSONPath expression parsing.
//!
//! Hand-rolled cursor parser for the supported subset. See the module docs
//! on [`super`] for the grammar.

use crate::error::Error;
use serde_json::Value;

/// One step of a parsed path expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// `.name` or `['name']`
    Child(String),
    /// `.*` or `[*]`
    Wildcard,
    /// `[n]`, negative counts from the end
    Index(i64),
    /// `..name` or `..['name']`
    RecursiveChild(String),
    /// `[?expr]`
    Filter(FilterExpr),
}

/// A filter predicate: a disjunction of conjunctions of comparisons.
/// `&&` binds tighter than `||`; parenthesized groups are not supported.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpr {
    /// Outer `||` list; each member is an inner `&&` list.
    pub any_of: Vec<Vec<Comparison>>,
}

/// One `@.field OP literal` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Dotted field path below the candidate node.
    pub field: Vec<String>,
    pub op: CmpOp,
    pub literal: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
}

pub(super) fn parse_expression(expr: &str) -> Result<Vec<Segment>, Error> {
    let mut parser = ExprParser {
        expr,
        chars: expr.chars().collect(),
        pos: 0,
    };
    parser.parse()
}

struct ExprParser<'a> {
    expr: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl ExprParser<'_> {
    fn parse(&mut self) -> Result<Vec<Segment>, Error> {
        if self.next() != Some('$') {
            return Err(self.fail("expression must start with '$'"));
        }
        let mut segments = Vec::new();
        while let Some(ch) = self.peek() {
            match ch {
                '.' => {
                    self.next();
                    if self.peek() == Some('.') {
                        self.next();
                        segments.push(self.parse_recursive()?);
                    } else if self.peek() == Some('*') {
                        self.next();
                        segments.push(Segment::Wildcard);
                    } else {
                        let name = self.parse_name()?;
                        segments.push(Segment::Child(name));
                    }
                }
                '[' => {
                    self.next();
                    segments.push(self.parse_bracket()?);
                }
                other => {
                    return Err(self.fail(format!("unexpected character '{other}'")));
                }
            }
        }
        // A bare `$` selects the document root.
        Ok(segments)
    }

    fn parse_recursive(&mut self) -> Result<Segment, Error> {
        if self.peek() == Some('[') {
            self.next();
            let name = self.parse_quoted()?;
            self.expect(']')?;
            Ok(Segment::RecursiveChild(name))
        } else {
            let name = self.parse_name()?;
            Ok(Segment::RecursiveChild(name))
        }
    }

    fn parse_bracket(&mut self) -> Result<Segment, Error> {
        self.skip_ws();
        let segment = match self.peek() {
            Some('*') => {
                self.next();
                Segment::Wildcard
            }
            Some('\'' | '"') => {
                let name = self.parse_quoted()?;
                Segment::Child(name)
            }
            Some('?') => {
                self.next();
                let expr = self.parse_filter()?;
                Segment::Filter(expr)
            }
            Some(ch) if ch == '-' || ch.is_ascii_digit() => {
                let index = self.parse_integer()?;
                Segment::Index(index)
            }
            Some(other) => return Err(self.fail(format!("unexpected '{other}' in brackets"))),
            None => return Err(self.fail("unterminated '['")),
        };
        self.skip_ws();
        self.expect(']')?;
        Ok(segment)
    }

    // expr := conjunction ('||' conjunction)*
    // conjunction := comparison ('&&' comparison)*
    fn parse_filter(&mut self) -> Result<FilterExpr, Error> {
        let mut any_of = Vec::new();
        loop {
            let mut all_of = vec![self.parse_comparison()?];
            loop {
                self.skip_ws();
                if self.peek_pair() == Some(('&', '&')) {
                    self.next();
                    self.next();
                    all_of.push(self.parse_comparison()?);
                } else {
                    break;
                }
            }
            any_of.push(all_of);
            self.skip_ws();
            if self.peek_pair() == Some(('|', '|')) {
                self.next();
                self.next();
            } else {
                break;
            }
        }
        Ok(FilterExpr { any_of })
    }

    fn parse_comparison(&mut self) -> Result<Comparison, Error> {
        self.skip_ws();
        if self.next() != Some('@') {
            return Err(self.fail("filter comparison must start with '@'"));
        }
        if self.next() != Some('.') {
            return Err(self.fail("expected '.' after '@'"));
        }
        let mut field = Vec::new();
        loop {
            let segment = self.parse_field_segment()?;
            field.push(segment);
            if self.peek() == Some('.') {
                self.next();
            } else {
                break;
            }
        }
        self.skip_ws();
        let op = match (self.next(), self.next()) {
            (Some('='), Some('=')) => CmpOp::Eq,
            (Some('!'), Some('=')) => CmpOp::Ne,
            _ => return Err(self.fail("expected '==' or '!=' in filter comparison")),
        };
        self.skip_ws();
        let literal = self.parse_literal()?;
        Ok(Comparison { field, op, literal })
    }

    fn parse_field_segment(&mut self) -> Result<String, Error> {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                name.push(ch);
                self.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.fail("empty field name in filter"));
        }
        Ok(name)
    }

    fn parse_literal(&mut self) -> Result<Value, Error> {
        match self.peek() {
            Some('\'' | '"') => Ok(Value::String(self.parse_quoted()?)),
            Some(ch) if ch == '-' || ch.is_ascii_digit() => {
                let start = self.pos;
                if ch == '-' {
                    self.next();
                }
                let mut is_float = false;
                while let Some(digit) = self.peek() {
                    if digit.is_ascii_digit() {
                        self.next();
                    } else if digit == '.' && !is_float {
                        is_float = true;
                        self.next();
                    } else {
                        break;
                    }
                }
                let text: String = self.chars[start..self.pos].iter().collect();
                if is_float {
                    text.parse::<f64>()
                        .ok()
                        .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number))
                        .ok_or_else(|| self.fail(format!("invalid number literal '{text}'")))
                } else {
                    text.parse::<i64>()
                        .map(Value::from)
                        .map_err(|_| self.fail(format!("invalid number literal '{text}'")))
                }
            }
            _ => {
                if self.consume_word("true") {
                    Ok(Value::Bool(true))
                } else if self.consume_word("false") {
                    Ok(Value::Bool(false))
                } else if self.consume_word("null") {
                    Ok(Value::Null)
                } else {
                    Err(self.fail("expected string, number, boolean, or null literal"))
                }
            }
        }
    }

    fn parse_name(&mut self) -> Result<String, Error> {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                name.push(ch);
                self.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.fail(
                "empty member name; use bracket notation for names with special characters",
            ));
        }
        Ok(name)
    }

    fn parse_quoted(&mut self) -> Result<String, Error> {
        let quote = self
            .next()
            .filter(|&ch| ch == '\'' || ch == '"')
            .ok_or_else(|| self.fail("expected quoted name"))?;
        let mut text = String::new();
        loop {
            match self.next() {
                Some(ch) if ch == quote => return Ok(text),
                Some('\\') => match self.next() {
                    Some(escaped) => text.push(escaped),
                    None => return Err(self.fail("unterminated escape in quoted name")),
                },
                Some(ch) => text.push(ch),
                None => return Err(self.fail("unterminated quoted name")),
            }
        }
    }

    fn parse_integer(&mut self) -> Result<i64, Error> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.next();
        }
        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.next();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<i64>()
            .map_err(|_| self.fail(format!("invalid index '{text}'")))
    }

    fn consume_word(&mut self, word: &str) -> bool {
        let remaining: String = self.chars[self.pos..]
            .iter()
            .take(word.len())
            .collect();
        if remaining == word {
            self.pos += word.len();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.next();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), Error> {
        if self.next() == Some(expected) {
            Ok(())
        } else {
            Err(self.fail(format!("expected '{expected}'")))
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_pair(&self) -> Option<(char, char)> {
        Some((*self.chars.get(self.pos)?, *self.chars.get(self.pos + 1)?))
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn fail(&self, reason: impl Into<String>) -> Error {
        let reason = reason.into();
        Error::json_path_syntax(self.expr, format!("{reason} (at offset {})", self.pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_child_chain() {
        let segments = parse_expression("$.info.title").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Child("info".into()),
                Segment::Child("title".into())
            ]
        );
    }

    #[test]
    fn test_parse_bracket_and_index() {
        let segments = parse_expression("$['paths']['/pets'].get.tags[0]").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Child("paths".into()),
                Segment::Child("/pets".into()),
                Segment::Child("get".into()),
                Segment::Child("tags".into()),
                Segment::Index(0),
            ]
        );
    }

    #[test]
    fn test_parse_negative_index_and_wildcards() {
        let segments = parse_expression("$.servers[-1].*").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Child("servers".into()),
                Segment::Index(-1),
                Segment::Wildcard,
            ]
        );
        assert_eq!(
            parse_expression("$.paths[*]").unwrap(),
            vec![Segment::Child("paths".into()), Segment::Wildcard]
        );
    }

    #[test]
    fn test_parse_recursive_descent() {
        assert_eq!(
            parse_expression("$..description").unwrap(),
            vec![Segment::RecursiveChild("description".into())]
        );
        assert_eq!(
            parse_expression("$..['x-internal']").unwrap(),
            vec![Segment::RecursiveChild("x-internal".into())]
        );
    }

    #[test]
    fn test_parse_filter_compound() {
        let segments =
            parse_expression("$.paths[?@.deprecated==true && @.x-internal==true]").unwrap();
        let Segment::Filter(filter) = &segments[1] else {
            panic!("expected filter segment");
        };
        assert_eq!(filter.any_of.len(), 1);
        assert_eq!(filter.any_of[0].len(), 2);
        assert_eq!(filter.any_of[0][0].field, vec!["deprecated".to_string()]);
        assert_eq!(filter.any_of[0][1].literal, json!(true));
    }

    #[test]
    fn test_filter_precedence_and_binds_tighter() {
        // a || b && c parses as a || (b && c)
        let segments =
            parse_expression("$[?@.a=='x' || @.b==1 && @.c!=null]").unwrap();
        let Segment::Filter(filter) = &segments[0] else {
            panic!("expected filter segment");
        };
        assert_eq!(filter.any_of.len(), 2);
        assert_eq!(filter.any_of[0].len(), 1);
        assert_eq!(filter.any_of[1].len(), 2);
        assert_eq!(filter.any_of[1][1].op, CmpOp::Ne);
    }

    #[test]
    fn test_bare_root_selects_document() {
        assert_eq!(parse_expression("$").unwrap(), Vec::<Segment>::new());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_expression("paths").is_err());
        assert!(parse_expression("$.").is_err());
        assert!(parse_expression("$[").is_err());
        assert!(parse_expression("$['unterminated]").is_err());
        assert!(parse_expression("$[?@.a=1]").is_err());
        assert!(parse_expression("$[?(@.a==1)]").is_err());
    }
}
