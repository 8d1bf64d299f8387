//! Recursive-descent parser over the token stream from [`crate::lexer`],
//! and the inverse serializer.

use std::collections::BTreeMap;

use crate::error::ParseError;
use crate::lexer::{self, Token};
use crate::node::{Node, NodeKind, Scalar};

/// Parse a complete JSON document into a [`Node`] tree.
pub fn parse(input: &[u8]) -> Result<Node, ParseError> {
    let tokens = lexer::tokenize(input)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    let node = parser.parse_value(0)?;
    if parser.pos != parser.tokens.len() {
        return Err(ParseError::TrailingData {
            offset: parser.pos,
        });
    }
    Ok(node)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, want: &Token, what: &str) -> Result<(), ParseError> {
        match self.advance() {
            Some(tok) if tok == want => Ok(()),
            _ => Err(ParseError::UnexpectedToken {
                offset: self.pos,
                message: what.to_string(),
            }),
        }
    }

    /// `value = object | array | string | number | "true" | "false" | "null"`
    fn parse_value(&mut self, level: usize) -> Result<Node, ParseError> {
        match self.peek() {
            Some(Token::StartObject) => self.parse_object(level),
            Some(Token::StartArray) => self.parse_array(level),
            Some(Token::Null) => {
                self.advance();
                Ok(Node::value(Scalar::Null, level))
            }
            Some(Token::Bool(b)) => {
                let b = *b;
                self.advance();
                Ok(Node::value(Scalar::Bool(b), level))
            }
            Some(Token::String { .. }) => {
                let Some(Token::String { decoded, raw }) = self.advance().cloned() else {
                    unreachable!()
                };
                Ok(Node::value(
                    Scalar::String {
                        value: decoded,
                        raw: Some(raw),
                    },
                    level,
                ))
            }
            Some(Token::Number { .. }) => {
                let Some(Token::Number { value, raw }) = self.advance().cloned() else {
                    unreachable!()
                };
                Ok(Node::value(
                    Scalar::Number {
                        value,
                        raw: Some(raw),
                    },
                    level,
                ))
            }
            _ => Err(ParseError::UnexpectedToken {
                offset: self.pos,
                message: "expected a value".to_string(),
            }),
        }
    }

    /// `array = "[" [ value { "," value } ] "]"`
    fn parse_array(&mut self, level: usize) -> Result<Node, ParseError> {
        self.expect(&Token::StartArray, "expected '['")?;
        let mut children = Vec::new();
        if self.peek() == Some(&Token::EndArray) {
            self.advance();
            return Ok(Node::array(children, level));
        }
        loop {
            children.push(self.parse_value(level + 1)?);
            match self.peek() {
                Some(Token::Comma) => {
                    self.advance();
                }
                Some(Token::EndArray) => {
                    self.advance();
                    break;
                }
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        offset: self.pos,
                        message: "expected ',' or ']'".to_string(),
                    })
                }
            }
        }
        Ok(Node::array(children, level))
    }

    /// `object = "{" [ pair { "," pair } ] "}"`, `pair = string ":" value`
    fn parse_object(&mut self, level: usize) -> Result<Node, ParseError> {
        self.expect(&Token::StartObject, "expected '{'")?;
        let mut children = BTreeMap::new();
        if self.peek() == Some(&Token::EndObject) {
            self.advance();
            return Ok(Node::object(children, level));
        }
        loop {
            let key = match self.advance() {
                Some(Token::String { decoded, .. }) => decoded.clone(),
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        offset: self.pos,
                        message: "expected an object key".to_string(),
                    })
                }
            };
            self.expect(&Token::Colon, "expected ':'")?;
            let value = self.parse_value(level + 1)?;
            children.insert(key, value);
            match self.peek() {
                Some(Token::Comma) => {
                    self.advance();
                }
                Some(Token::EndObject) => {
                    self.advance();
                    break;
                }
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        offset: self.pos,
                        message: "expected ',' or '}'".to_string(),
                    })
                }
            }
        }
        Ok(Node::object(children, level))
    }
}

/// Serialize a [`Node`] tree back to JSON bytes.
///
/// Scalars carrying a raw source lexeme re-emit it verbatim (so untouched
/// numbers and strings never round-trip through float reformatting);
/// synthetic nodes built without one fall back to a minimal re-encoding.
pub fn serialize(node: &Node) -> Vec<u8> {
    let mut out = Vec::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut Vec<u8>) {
    match &node.kind {
        NodeKind::Value(scalar) => write_scalar(scalar, out),
        NodeKind::Array(children) => {
            out.push(b'[');
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_node(child, out);
            }
            out.push(b']');
        }
        NodeKind::Object(children) => {
            out.push(b'{');
            for (i, (key, value)) in children.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_escaped_string(key, out);
                out.push(b':');
                write_node(value, out);
            }
            out.push(b'}');
        }
    }
}

fn write_scalar(scalar: &Scalar, out: &mut Vec<u8>) {
    match scalar {
        Scalar::Null => out.extend_from_slice(b"null"),
        Scalar::Bool(true) => out.extend_from_slice(b"true"),
        Scalar::Bool(false) => out.extend_from_slice(b"false"),
        Scalar::Number { value, raw } => match raw {
            Some(raw) => out.extend_from_slice(raw.as_bytes()),
            None => out.extend_from_slice(format_number(*value).as_bytes()),
        },
        Scalar::String { value, raw } => {
            out.push(b'"');
            match raw {
                Some(raw) => out.extend_from_slice(raw.as_bytes()),
                None => write_escaped_body(value, out),
            }
            out.push(b'"');
        }
    }
}

fn write_escaped_string(s: &str, out: &mut Vec<u8>) {
    out.push(b'"');
    write_escaped_body(s, out);
    out.push(b'"');
}

fn write_escaped_body(s: &str, out: &mut Vec<u8>) {
    for ch in s.chars() {
        match ch {
            '"' => out.extend_from_slice(b"\\\""),
            '\\' => out.extend_from_slice(b"\\\\"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\t' => out.extend_from_slice(b"\\t"),
            '\r' => out.extend_from_slice(b"\\r"),
            '\u{8}' => out.extend_from_slice(b"\\b"),
            '\u{c}' => out.extend_from_slice(b"\\f"),
            c => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_structure() {
        let node = parse(br#"{"a":[1,2,{"b":true}],"c":null}"#).unwrap();
        assert_eq!(node.find("/a/2/b").unwrap().deep_eq(&Node::value(Scalar::Bool(true), 0)), true);
        assert!(node.find("/c").unwrap().deep_eq(&Node::value(Scalar::Null, 0)));
    }

    #[test]
    fn rejects_trailing_data() {
        assert!(parse(b"1 2").is_err());
    }

    #[test]
    fn rejects_trailing_comma_in_array() {
        assert!(parse(b"[1,2,]").is_err());
    }

    #[test]
    fn roundtrips_numeric_lexeme_verbatim() {
        let node = parse(b"1.500").unwrap();
        assert_eq!(serialize(&node), b"1.500");
    }

    #[test]
    fn roundtrips_object_and_array_shape() {
        let input = br#"{"a":1,"b":[true,false,null]}"#;
        let node = parse(input).unwrap();
        let out = serialize(&node);
        let reparsed = parse(&out).unwrap();
        assert!(node.deep_eq(&reparsed));
    }

    #[test]
    fn empty_array_and_object_round_trip() {
        let node = parse(b"[]").unwrap();
        assert_eq!(serialize(&node), b"[]");
        let node = parse(b"{}").unwrap();
        assert_eq!(serialize(&node), b"{}");
    }
}
