//! Hand-written byte-level tokenizer.
//!
//! Produces a flat token stream with the raw source lexeme captured for
//! strings and numbers, so the parser can hand that lexeme straight to
//! [`Node`](crate::node::Node) for lossless re-serialization.

use crate::error::ParseError;

/// One lexical token plus, for strings and numbers, its raw source slice.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `{`
    StartObject,
    /// `}`
    EndObject,
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `true` / `false`.
    Bool(bool),
    /// `null`.
    Null,
    /// A string literal; `decoded` has the single-character escapes
    /// resolved, `raw` is the exact source bytes between the quotes.
    String { decoded: String, raw: Box<str> },
    /// A number literal; `value` is the parsed `f64`, `raw` the exact
    /// source digits.
    Number { value: f64, raw: Box<str> },
}

/// Tokenize a complete JSON document's bytes.
///
/// Matches the grammar this crate's parser expects: only `" \ / b f n t r`
/// are valid single-character string escapes (no `\uXXXX` decoding - see
/// `SPEC_FULL.md` for the rationale), and bare `\n`/`\r` inside a string
/// literal is rejected rather than silently accepted.
pub fn tokenize(input: &[u8]) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer { input, off: 0 };
    let mut tokens = Vec::new();
    lexer.skip_whitespace();
    while lexer.off < lexer.input.len() {
        let tok = lexer.next_token()?;
        tokens.push(tok);
        lexer.skip_whitespace();
    }
    Ok(tokens)
}

struct Lexer<'a> {
    input: &'a [u8],
    off: usize,
}

impl<'a> Lexer<'a> {
    fn skip_whitespace(&mut self) {
        while let Some(&b) = self.input.get(self.off) {
            if b == b' ' || b == b'\n' || b == b'\r' || b == b'\t' {
                self.off += 1;
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        let b = self.input[self.off];
        match b {
            b'{' => {
                self.off += 1;
                Ok(Token::StartObject)
            }
            b'}' => {
                self.off += 1;
                Ok(Token::EndObject)
            }
            b'[' => {
                self.off += 1;
                Ok(Token::StartArray)
            }
            b']' => {
                self.off += 1;
                Ok(Token::EndArray)
            }
            b':' => {
                self.off += 1;
                Ok(Token::Colon)
            }
            b',' => {
                self.off += 1;
                Ok(Token::Comma)
            }
            b't' | b'f' | b'n' => self.tokenize_literal(b),
            b'"' => self.tokenize_string(),
            b'0'..=b'9' | b'-' => self.tokenize_number(),
            other => Err(ParseError::UnexpectedByte {
                offset: self.off,
                byte: other,
            }),
        }
    }

    fn tokenize_literal(&mut self, head: u8) -> Result<Token, ParseError> {
        let (lit, tok): (&[u8], Token) = match head {
            b'n' => (b"null", Token::Null),
            b'f' => (b"false", Token::Bool(false)),
            b't' => (b"true", Token::Bool(true)),
            _ => unreachable!(),
        };
        let end = self.off + lit.len();
        if end > self.input.len() || &self.input[self.off..end] != lit {
            return Err(ParseError::InvalidLiteral { offset: self.off });
        }
        self.off = end;
        Ok(tok)
    }

    /// `string = "" | " chars "`, `char = any-unescaped-byte | \" | \\ | \/
    /// | \b | \f | \n | \t | \r`. Raw `\n`/`\r` bytes inside the literal are
    /// illegal, matching the grammar this tokenizer was grounded on.
    fn tokenize_string(&mut self) -> Result<Token, ParseError> {
        let start = self.off;
        self.off += 1; // opening quote
        let mut decoded = String::new();
        loop {
            let Some(&b) = self.input.get(self.off) else {
                return Err(ParseError::UnexpectedEof { offset: self.off });
            };
            match b {
                b'"' => {
                    let raw = std::str::from_utf8(&self.input[start + 1..self.off])
                        .map_err(|_| ParseError::InvalidString { offset: start })?
                        .into();
                    self.off += 1;
                    return Ok(Token::String { decoded, raw });
                }
                b'\n' | b'\r' => {
                    return Err(ParseError::InvalidString { offset: self.off });
                }
                b'\\' => {
                    let Some(&escape) = self.input.get(self.off + 1) else {
                        return Err(ParseError::InvalidString { offset: self.off });
                    };
                    if escape == b'u' {
                        // Four hex digits must follow, but per this crate's
                        // policy the escape is kept verbatim in `decoded`
                        // rather than folded to the code point it names
                        // (see SPEC_FULL.md).
                        let digits_start = self.off + 2;
                        let digits_end = digits_start + 4;
                        let digits = self
                            .input
                            .get(digits_start..digits_end)
                            .filter(|d| d.iter().all(u8::is_ascii_hexdigit))
                            .ok_or(ParseError::InvalidString { offset: self.off })?;
                        decoded.push_str("\\u");
                        decoded.push_str(std::str::from_utf8(digits).unwrap());
                        self.off = digits_end;
                        continue;
                    }
                    let resolved = match escape {
                        b'"' => '"',
                        b'\\' => '\\',
                        b'/' => '/',
                        b'b' => '\u{8}',
                        b'f' => '\u{c}',
                        b'n' => '\n',
                        b't' => '\t',
                        b'r' => '\r',
                        _ => return Err(ParseError::InvalidString { offset: self.off }),
                    };
                    decoded.push(resolved);
                    self.off += 2;
                }
                _ => {
                    // Accumulate raw UTF-8 bytes directly; re-decode once we
                    // know the full run so multi-byte sequences stay intact.
                    let ch_len = utf8_len(b);
                    let end = self.off + ch_len;
                    if end > self.input.len() {
                        return Err(ParseError::InvalidString { offset: self.off });
                    }
                    let s = std::str::from_utf8(&self.input[self.off..end])
                        .map_err(|_| ParseError::InvalidString { offset: self.off })?;
                    decoded.push_str(s);
                    self.off = end;
                }
            }
        }
    }

    /// `number = int [frac] [exp]`, matching the standard JSON grammar.
    /// `int = "0" | ["-"] digit1-9 *digit`; a literal `0` is allowed but a
    /// leading zero followed by another digit (`012`) is not, matching the
    /// grammar this tokenizer was grounded on.
    fn tokenize_number(&mut self) -> Result<Token, ParseError> {
        let start = self.off;
        if self.input.get(self.off) == Some(&b'-') {
            self.off += 1;
        }
        let int_start = self.off;
        match self.input.get(self.off) {
            Some(b'0'..=b'9') => self.off += 1,
            _ => return Err(ParseError::InvalidNumber { offset: start }),
        }
        if self.input[int_start] == b'0' && matches!(self.input.get(self.off), Some(b'0'..=b'9')) {
            return Err(ParseError::InvalidNumber { offset: start });
        }
        while matches!(self.input.get(self.off), Some(b'0'..=b'9')) {
            self.off += 1;
        }
        let mut frac = false;
        let mut exp = false;
        loop {
            let Some(&b) = self.input.get(self.off) else {
                break;
            };
            match b {
                b'0'..=b'9' => self.off += 1,
                b'.' if !frac && !exp => {
                    frac = true;
                    self.off += 1;
                    match self.input.get(self.off) {
                        Some(b'0'..=b'9') => self.off += 1,
                        _ => return Err(ParseError::InvalidNumber { offset: start }),
                    }
                }
                b'e' | b'E' if !exp => {
                    exp = true;
                    self.off += 1;
                    match self.input.get(self.off) {
                        Some(b'+') | Some(b'-') => self.off += 1,
                        _ => {}
                    }
                    match self.input.get(self.off) {
                        Some(b'0'..=b'9') => self.off += 1,
                        _ => return Err(ParseError::InvalidNumber { offset: start }),
                    }
                }
                _ => break,
            }
        }
        let raw = std::str::from_utf8(&self.input[start..self.off]).unwrap();
        let value: f64 = raw
            .parse()
            .map_err(|_| ParseError::InvalidNumber { offset: start })?;
        Ok(Token::Number {
            value,
            raw: raw.into(),
        })
    }
}

fn utf8_len(first_byte: u8) -> usize {
    if first_byte & 0x80 == 0 {
        1
    } else if first_byte & 0xE0 == 0xC0 {
        2
    } else if first_byte & 0xF0 == 0xE0 {
        3
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_structural_characters() {
        let tokens = tokenize(b"{}[]:,").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::StartObject,
                Token::EndObject,
                Token::StartArray,
                Token::EndArray,
                Token::Colon,
                Token::Comma,
            ]
        );
    }

    #[test]
    fn tokenizes_literals() {
        assert_eq!(tokenize(b"true").unwrap(), vec![Token::Bool(true)]);
        assert_eq!(tokenize(b"false").unwrap(), vec![Token::Bool(false)]);
        assert_eq!(tokenize(b"null").unwrap(), vec![Token::Null]);
    }

    #[test]
    fn rejects_malformed_literal() {
        assert!(tokenize(b"tru").is_err());
        assert!(tokenize(b"nuli").is_err());
    }

    #[test]
    fn tokenizes_string_with_escapes() {
        let tokens = tokenize(br#""a\nb\"c""#).unwrap();
        match &tokens[0] {
            Token::String { decoded, raw } => {
                assert_eq!(decoded, "a\nb\"c");
                assert_eq!(&**raw, r#"a\nb\"c"#);
            }
            _ => panic!("expected string token"),
        }
    }

    #[test]
    fn rejects_bare_newline_in_string() {
        assert!(tokenize(b"\"a\nb\"").is_err());
    }

    #[test]
    fn rejects_unknown_escape() {
        assert!(tokenize(br#""\A""#).is_err());
    }

    #[test]
    fn unicode_escape_is_retained_verbatim() {
        let input: &[u8] = b"\"\\u0041\"";
        let tokens = tokenize(input).unwrap();
        match &tokens[0] {
            Token::String { decoded, raw } => {
                assert_eq!(decoded, "\\u0041");
                assert_eq!(&**raw, "\\u0041");
            }
            _ => panic!("expected string token"),
        }
    }

    #[test]
    fn rejects_unicode_escape_with_non_hex_digits() {
        assert!(tokenize(br#""\u00zz""#).is_err());
    }

    #[test]
    fn rejects_truncated_unicode_escape() {
        assert!(tokenize(br#""\u12""#).is_err());
    }

    #[test]
    fn tokenizes_numbers_with_frac_and_exp() {
        let tokens = tokenize(b"-12.5e+3").unwrap();
        match &tokens[0] {
            Token::Number { value, raw } => {
                assert_eq!(*value, -12500.0);
                assert_eq!(&**raw, "-12.5e+3");
            }
            _ => panic!("expected number token"),
        }
    }

    #[test]
    fn rejects_exponent_without_digits() {
        assert!(tokenize(b"1e").is_err());
        assert!(tokenize(b"1e+").is_err());
    }

    #[test]
    fn rejects_leading_zero_followed_by_digit() {
        assert!(tokenize(b"012").is_err());
        assert!(tokenize(b"-012").is_err());
    }

    #[test]
    fn bare_zero_and_zero_point_something_are_accepted() {
        assert!(tokenize(b"0").is_ok());
        assert!(tokenize(b"0.5").is_ok());
        assert!(tokenize(b"-0").is_ok());
    }

    #[test]
    fn rejects_fraction_without_digits() {
        assert!(tokenize(b"1.").is_err());
        assert!(tokenize(b"1.e5").is_err());
    }

    #[test]
    fn tokenizes_extreme_exponents() {
        let tokens = tokenize(b"0.4E-32").unwrap();
        match &tokens[0] {
            Token::Number { raw, .. } => assert_eq!(&**raw, "0.4E-32"),
            _ => panic!("expected number token"),
        }
    }
}
