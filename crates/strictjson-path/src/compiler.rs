use crate::{
    ast::{CompiledPath, Slice, Step, StepKind, UnionEntry},
    error::PathError,
    filter::FilterParser,
};

/// Recursive-descent compiler for path expressions.
///
/// The grammar is the classic dotted/bracketed JSONPath subset: `$` or `@`
/// root, `.name` / `..name` segments, bracket selectors holding filters,
/// wildcards, string or identifier names, signed indices, slices, and
/// comma-separated unions of those.
pub(crate) struct PathParser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> PathParser<'a> {
    pub fn new(input: &'a str) -> PathParser<'a> {
        PathParser {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> PathError {
        PathError::new(message, self.pos)
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    pub fn parse(&mut self) -> Result<CompiledPath, PathError> {
        self.skip_whitespace();
        let relative = match self.peek() {
            Some(b'$') => false,
            Some(b'@') => true,
            Some(_) => return Err(self.error("JSONPath must start with '$' or '@'")),
            None => return Err(self.error("Empty JSONPath expression")),
        };
        self.pos += 1;
        let mut steps = Vec::new();
        loop {
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                break;
            }
            steps.push(self.parse_segment()?);
        }
        Ok(CompiledPath { relative, steps })
    }

    fn parse_segment(&mut self) -> Result<Step, PathError> {
        self.skip_whitespace();
        let mut recursive = false;
        if self.peek() == Some(b'.') {
            self.pos += 1;
            if self.peek() == Some(b'.') {
                recursive = true;
                self.pos += 1;
            }
        }
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("Incomplete JSONPath segment")),
            Some(b'[') => self.parse_bracket(recursive),
            Some(b'*') => {
                self.pos += 1;
                Ok(Step {
                    kind: StepKind::Wildcard,
                    recursive,
                })
            }
            Some(_) => {
                let name = self.parse_identifier()?;
                Ok(Step {
                    kind: StepKind::Name(name),
                    recursive,
                })
            }
        }
    }

    fn parse_bracket(&mut self, recursive: bool) -> Result<Step, PathError> {
        self.pos += 1; // consume '['
        self.skip_whitespace();
        match self.peek() {
            None => return Err(self.error("Unterminated '[' segment")),
            Some(b'?') => {
                self.pos += 1;
                self.skip_whitespace();
                if self.peek() != Some(b'(') {
                    return Err(self.error("Expected '(' after '?' in filter expression"));
                }
                self.pos += 1;
                let expression_start = self.pos;
                let mut depth = 1usize;
                while self.pos < self.input.len() && depth > 0 {
                    let c = self.input[self.pos];
                    self.pos += 1;
                    match c {
                        b'\'' | b'"' => {
                            self.pos -= 1;
                            skip_quoted_string(self.input, &mut self.pos)
                                .map_err(|(message, offset)| PathError::new(message, offset))?;
                        }
                        b'(' => depth += 1,
                        b')' => depth -= 1,
                        _ => {}
                    }
                }
                if depth != 0 {
                    return Err(self.error("Unterminated filter expression"));
                }
                let expression_end = self.pos - 1;
                let text = std::str::from_utf8(&self.input[expression_start..expression_end])
                    .expect("path input is a &str");
                self.skip_whitespace();
                if self.peek() != Some(b']') {
                    return Err(self.error("Expected ']' after filter expression"));
                }
                self.pos += 1;
                let filter = FilterParser::new(text)?.parse()?;
                Ok(Step {
                    kind: StepKind::Filter(filter),
                    recursive,
                })
            }
            Some(b'*') => {
                self.pos += 1;
                self.skip_whitespace();
                if self.peek() != Some(b']') {
                    return Err(self.error("Expected ']' after '*'"));
                }
                self.pos += 1;
                Ok(Step {
                    kind: StepKind::Wildcard,
                    recursive,
                })
            }
            Some(_) => {
                let mut entries = vec![self.parse_bracket_entry()?];
                self.skip_whitespace();
                while self.peek() == Some(b',') {
                    self.pos += 1;
                    self.skip_whitespace();
                    entries.push(self.parse_bracket_entry()?);
                    self.skip_whitespace();
                }
                if self.peek() != Some(b']') {
                    return Err(self.error("Expected ']' after bracket expression"));
                }
                self.pos += 1;
                let kind = if entries.len() == 1 {
                    match entries.pop().expect("one entry") {
                        UnionEntry::Name(name) => StepKind::Name(name),
                        UnionEntry::Index(index) => StepKind::Indices(vec![index]),
                        UnionEntry::Slice(slice) => StepKind::Slice(slice),
                        UnionEntry::Wildcard => StepKind::Wildcard,
                    }
                } else {
                    StepKind::Union(entries)
                };
                Ok(Step { kind, recursive })
            }
        }
    }

    fn parse_bracket_entry(&mut self) -> Result<UnionEntry, PathError> {
        self.skip_whitespace();
        match self.peek() {
            None => return Err(self.error("Unexpected end of bracket expression")),
            Some(b'\'') | Some(b'"') => {
                let name = parse_string_literal(self.input, &mut self.pos)
                    .map_err(|(message, offset)| PathError::new(message, offset))?;
                return Ok(UnionEntry::Name(name));
            }
            Some(b'*') => {
                self.pos += 1;
                return Ok(UnionEntry::Wildcard);
            }
            Some(_) => {}
        }
        let before = self.pos;
        let number = self.parse_signed_integer();
        self.skip_whitespace();
        if self.peek() == Some(b':') {
            self.pos += 1;
            let mut slice = Slice {
                start: number,
                ..Slice::default()
            };
            self.skip_whitespace();
            slice.end = self.parse_signed_integer();
            self.skip_whitespace();
            if self.peek() == Some(b':') {
                self.pos += 1;
                self.skip_whitespace();
                match self.parse_signed_integer() {
                    Some(step) => slice.step = Some(step),
                    None => return Err(self.error("Slice step expects integer")),
                }
            }
            return Ok(UnionEntry::Slice(slice));
        }
        if let Some(index) = number {
            return Ok(UnionEntry::Index(index));
        }
        self.pos = before;
        let name = self.parse_identifier()?;
        Ok(UnionEntry::Name(name))
    }

    /// Optional `[+-]?[0-9]+`; restores the position when no digits follow.
    fn parse_signed_integer(&mut self) -> Option<i64> {
        self.skip_whitespace();
        let start = self.pos;
        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.pos += 1;
        }
        let digits_start = self.pos;
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if digits_start == self.pos {
            self.pos = start;
            return None;
        }
        let text = std::str::from_utf8(&self.input[start..self.pos]).expect("ASCII digits");
        // Out-of-range indices saturate; they can never address an element.
        let value = match text.parse::<i64>() {
            Ok(value) => value,
            Err(_) if text.starts_with('-') => i64::MIN,
            Err(_) => i64::MAX,
        };
        Some(value)
    }

    fn parse_identifier(&mut self) -> Result<String, PathError> {
        let Some(first) = self.peek() else {
            return Err(self.error("Expected identifier"));
        };
        if !(first.is_ascii_alphabetic() || first == b'_' || first == b'$') {
            return Err(self.error("Invalid identifier start"));
        }
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.input.len() {
            let c = self.input[self.pos];
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'-' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(std::str::from_utf8(&self.input[start..self.pos])
            .expect("identifiers are ASCII")
            .to_owned())
    }
}

type LiteralError = (&'static str, usize);

/// Decode a single- or double-quoted string literal with the escape set
/// `\\ \" \' \b \f \n \r \t \uXXXX` (surrogate pairs combined).
pub(crate) fn parse_string_literal(input: &[u8], pos: &mut usize) -> Result<String, LiteralError> {
    if *pos >= input.len() {
        return Err(("Expected string literal", *pos));
    }
    let quote = input[*pos];
    *pos += 1;
    if quote != b'\'' && quote != b'"' {
        return Err(("Expected quote character", *pos));
    }
    let mut result: Vec<u8> = Vec::new();
    while *pos < input.len() {
        let c = input[*pos];
        *pos += 1;
        if c == quote {
            return Ok(String::from_utf8(result).expect("literal bytes come from a &str"));
        }
        if c != b'\\' {
            result.push(c);
            continue;
        }
        if *pos >= input.len() {
            return Err((
                "Incomplete escape sequence in JSONPath string literal",
                *pos,
            ));
        }
        let escape = input[*pos];
        *pos += 1;
        match escape {
            b'\\' | b'"' | b'\'' => result.push(escape),
            b'b' => result.push(0x08),
            b'f' => result.push(0x0c),
            b'n' => result.push(b'\n'),
            b'r' => result.push(b'\r'),
            b't' => result.push(b'\t'),
            b'u' => {
                let mut codepoint = parse_unicode_escape(input, pos)?;
                if (0xd800..=0xdbff).contains(&codepoint) {
                    if *pos + 2 > input.len() || input[*pos] != b'\\' || input[*pos + 1] != b'u' {
                        return Err((
                            "Invalid high surrogate in JSONPath string literal",
                            *pos,
                        ));
                    }
                    *pos += 2;
                    let low = parse_unicode_escape(input, pos)?;
                    if !(0xdc00..=0xdfff).contains(&low) {
                        return Err(("Invalid low surrogate in JSONPath string literal", *pos));
                    }
                    codepoint = 0x10000 + ((codepoint - 0xd800) << 10) + (low - 0xdc00);
                } else if (0xdc00..=0xdfff).contains(&codepoint) {
                    return Err((
                        "Unexpected low surrogate in JSONPath string literal",
                        *pos,
                    ));
                }
                let ch = char::from_u32(codepoint)
                    .expect("surrogates were handled above and pairs stay in range");
                let mut utf8 = [0u8; 4];
                result.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            }
            _ => return Err(("Invalid escape sequence in JSONPath string literal", *pos)),
        }
    }
    Err(("Unterminated string literal in JSONPath expression", *pos))
}

fn parse_unicode_escape(input: &[u8], pos: &mut usize) -> Result<u32, LiteralError> {
    if *pos + 4 > input.len() {
        return Err((
            "Incomplete unicode escape sequence in JSONPath string literal",
            *pos,
        ));
    }
    let mut value = 0u32;
    for i in 0..4 {
        let digit = match input[*pos + i] {
            c @ b'0'..=b'9' => u32::from(c - b'0'),
            c @ b'a'..=b'f' => u32::from(c - b'a') + 10,
            c @ b'A'..=b'F' => u32::from(c - b'A') + 10,
            _ => {
                return Err((
                    "Invalid unicode escape in JSONPath string literal",
                    *pos + i,
                ))
            }
        };
        value = value << 4 | digit;
    }
    *pos += 4;
    Ok(value)
}

/// Advance past a quoted string without decoding it.
pub(crate) fn skip_quoted_string(input: &[u8], pos: &mut usize) -> Result<(), LiteralError> {
    if *pos >= input.len() {
        return Err(("Expected quoted string", *pos));
    }
    let quote = input[*pos];
    *pos += 1;
    if quote != b'\'' && quote != b'"' {
        return Err(("Expected quote character", *pos));
    }
    while *pos < input.len() {
        let c = input[*pos];
        *pos += 1;
        if c == quote {
            return Ok(());
        }
        if c == b'\\' {
            if *pos >= input.len() {
                return Err((
                    "Incomplete escape sequence in JSONPath string literal",
                    *pos,
                ));
            }
            *pos += 1;
        }
    }
    Err(("Unterminated string literal in JSONPath expression", *pos))
}
