use std::borrow::Cow;

use strictjson::Value;

use crate::{
    ast::{CompareOp, FilterNode, FunctionCall, FunctionName, Operand},
    cache,
    compiler::{parse_string_literal, skip_quoted_string, PathParser},
    error::PathError,
    eval::{self, RefCursor},
};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    End,
    True,
    False,
    Null,
    Number(String),
    Str(String),
    Path(String),
    Ident(String),
    LParen,
    RParen,
    Not,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Regex,
    Comma,
}

/// Precedence-climbing parser for the `?(...)` sub-language:
/// `||` < `&&` < unary `!` < comparison < primary.
pub(crate) struct FilterParser<'a> {
    input: &'a [u8],
    pos: usize,
    current: Token,
}

impl<'a> FilterParser<'a> {
    pub fn new(input: &'a str) -> Result<FilterParser<'a>, PathError> {
        let mut parser = FilterParser {
            input: input.as_bytes(),
            pos: 0,
            current: Token::End,
        };
        parser.advance()?;
        Ok(parser)
    }

    pub fn parse(mut self) -> Result<FilterNode, PathError> {
        let node = self.parse_or()?;
        if self.current != Token::End {
            return Err(self.error("Unexpected token at end of filter expression"));
        }
        Ok(node)
    }

    fn error(&self, message: impl Into<String>) -> PathError {
        PathError::new(message, self.pos)
    }

    fn advance(&mut self) -> Result<(), PathError> {
        self.current = self.lex()?;
        Ok(())
    }

    fn eat(&mut self, token: Token) -> Result<bool, PathError> {
        if self.current == token {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, token: Token, message: &str) -> Result<(), PathError> {
        if self.eat(token)? {
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn lex(&mut self) -> Result<Token, PathError> {
        self.skip_whitespace();
        let Some(&c) = self.input.get(self.pos) else {
            return Ok(Token::End);
        };
        let next = self.input.get(self.pos + 1).copied();
        let two = |token| (token, 2usize);
        let pair = match (c, next) {
            (b'&', Some(b'&')) => Some(two(Token::And)),
            (b'|', Some(b'|')) => Some(two(Token::Or)),
            (b'=', Some(b'=')) => Some(two(Token::Eq)),
            (b'=', Some(b'~')) => Some(two(Token::Regex)),
            (b'!', Some(b'=')) => Some(two(Token::Ne)),
            (b'<', Some(b'=')) => Some(two(Token::Le)),
            (b'>', Some(b'=')) => Some(two(Token::Ge)),
            _ => None,
        };
        if let Some((token, width)) = pair {
            self.pos += width;
            return Ok(token);
        }
        match c {
            b'<' => {
                self.pos += 1;
                return Ok(Token::Lt);
            }
            b'>' => {
                self.pos += 1;
                return Ok(Token::Gt);
            }
            b'!' => {
                self.pos += 1;
                return Ok(Token::Not);
            }
            b'(' => {
                self.pos += 1;
                return Ok(Token::LParen);
            }
            b')' => {
                self.pos += 1;
                return Ok(Token::RParen);
            }
            b',' => {
                self.pos += 1;
                return Ok(Token::Comma);
            }
            b'\'' | b'"' => {
                let text = parse_string_literal(self.input, &mut self.pos)
                    .map_err(|(message, offset)| PathError::new(message, offset))?;
                return Ok(Token::Str(text));
            }
            b'@' | b'$' => {
                let text = self.lex_path_literal()?;
                return Ok(Token::Path(text));
            }
            _ => {}
        }
        if c.is_ascii_digit() || c == b'-' || c == b'+' {
            return self.lex_number();
        }
        if c.is_ascii_alphabetic() || c == b'_' {
            let start = self.pos;
            while self.pos < self.input.len() {
                let c = self.input[self.pos];
                if c.is_ascii_alphanumeric() || c == b'_' || c == b'-' {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            let text = std::str::from_utf8(&self.input[start..self.pos])
                .expect("identifier bytes are ASCII");
            return Ok(match text {
                "true" => Token::True,
                "false" => Token::False,
                "null" => Token::Null,
                _ => Token::Ident(text.to_owned()),
            });
        }
        Err(self.error("Unexpected character in filter expression"))
    }

    fn lex_number(&mut self) -> Result<Token, PathError> {
        let start = self.pos;
        if matches!(self.input[self.pos], b'-' | b'+') {
            self.pos += 1;
        }
        let mut has_digits = false;
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
            self.pos += 1;
            has_digits = true;
        }
        if self.input.get(self.pos) == Some(&b'.') {
            self.pos += 1;
            while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
                self.pos += 1;
                has_digits = true;
            }
        }
        if matches!(self.input.get(self.pos), Some(b'e') | Some(b'E')) {
            // The marker only belongs to the number when digits follow.
            let mut j = self.pos + 1;
            if matches!(self.input.get(j), Some(b'-') | Some(b'+')) {
                j += 1;
            }
            let exponent_start = j;
            while j < self.input.len() && self.input[j].is_ascii_digit() {
                j += 1;
            }
            if j > exponent_start {
                self.pos = j;
            }
        }
        if !has_digits {
            return Err(self.error("Invalid numeric literal in filter expression"));
        }
        let text =
            std::str::from_utf8(&self.input[start..self.pos]).expect("number bytes are ASCII");
        Ok(Token::Number(text.to_owned()))
    }

    /// Span of an embedded `@...` / `$...` path: runs until an operator,
    /// delimiter, or whitespace outside brackets; quoted strings are opaque.
    fn lex_path_literal(&mut self) -> Result<String, PathError> {
        let start = self.pos;
        let mut bracket_depth = 0usize;
        while self.pos < self.input.len() {
            let c = self.input[self.pos];
            if c == b'\'' || c == b'"' {
                skip_quoted_string(self.input, &mut self.pos)
                    .map_err(|(message, offset)| PathError::new(message, offset))?;
                continue;
            }
            if c == b'[' {
                bracket_depth += 1;
                self.pos += 1;
                continue;
            }
            if c == b']' {
                if bracket_depth == 0 {
                    break;
                }
                bracket_depth -= 1;
                self.pos += 1;
                continue;
            }
            if bracket_depth == 0
                && (c.is_ascii_whitespace()
                    || matches!(c, b')' | b'(' | b',' | b'!' | b'=' | b'<' | b'>' | b'&' | b'|'))
            {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("Expected path literal"));
        }
        Ok(std::str::from_utf8(&self.input[start..self.pos])
            .expect("path literal slicing stays on byte boundaries")
            .to_owned())
    }

    fn parse_or(&mut self) -> Result<FilterNode, PathError> {
        let mut node = self.parse_and()?;
        while self.eat(Token::Or)? {
            let rhs = self.parse_and()?;
            node = FilterNode::Or(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_and(&mut self) -> Result<FilterNode, PathError> {
        let mut node = self.parse_not()?;
        while self.eat(Token::And)? {
            let rhs = self.parse_not()?;
            node = FilterNode::And(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_not(&mut self) -> Result<FilterNode, PathError> {
        if self.eat(Token::Not)? {
            let child = self.parse_not()?;
            return Ok(FilterNode::Not(Box::new(child)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<FilterNode, PathError> {
        if self.eat(Token::LParen)? {
            let node = self.parse_or()?;
            self.expect(Token::RParen, "Expected ')' in filter expression")?;
            return Ok(node);
        }
        let lhs = self.parse_operand()?;
        let op = match self.current {
            Token::Eq => Some(CompareOp::Eq),
            Token::Ne => Some(CompareOp::Ne),
            Token::Lt => Some(CompareOp::Lt),
            Token::Le => Some(CompareOp::Le),
            Token::Gt => Some(CompareOp::Gt),
            Token::Ge => Some(CompareOp::Ge),
            Token::Regex => Some(CompareOp::Matches),
            _ => None,
        };
        if let Some(op) = op {
            self.advance()?;
            let rhs = self.parse_operand()?;
            return Ok(FilterNode::Comparison { op, lhs, rhs });
        }
        Ok(FilterNode::Exists(lhs))
    }

    fn parse_operand(&mut self) -> Result<Operand, PathError> {
        match std::mem::replace(&mut self.current, Token::End) {
            Token::True => {
                self.advance()?;
                Ok(Operand::Literal(Value::Bool(true)))
            }
            Token::False => {
                self.advance()?;
                Ok(Operand::Literal(Value::Bool(false)))
            }
            Token::Null => {
                self.advance()?;
                Ok(Operand::Literal(Value::Null))
            }
            Token::Number(text) => {
                self.advance()?;
                let literal = if text.contains(['.', 'e', 'E']) {
                    Value::Double(text.parse().expect("lexer produced a valid double"))
                } else {
                    match text.parse::<i64>() {
                        Ok(value) => Value::Long(value),
                        Err(_) => Value::Double(text.parse().expect("digits with optional sign")),
                    }
                };
                Ok(Operand::Literal(literal))
            }
            Token::Str(text) => {
                self.advance()?;
                Ok(Operand::Literal(Value::String(text)))
            }
            Token::Path(text) => {
                self.advance()?;
                let path = PathParser::new(&text).parse()?;
                Ok(Operand::Path(path))
            }
            Token::Ident(name) => {
                self.advance()?;
                if self.current == Token::LParen {
                    return self.parse_function_call(&name);
                }
                Err(self.error("Unexpected identifier in filter expression"))
            }
            other => {
                self.current = other;
                Err(self.error("Unexpected token in filter operand"))
            }
        }
    }

    fn parse_function_call(&mut self, name: &str) -> Result<Operand, PathError> {
        let function = match name.to_ascii_lowercase().as_str() {
            "length" | "size" => FunctionName::Length,
            "count" => FunctionName::Count,
            _ => return Err(self.error("Unsupported function in filter expression")),
        };
        self.expect(Token::LParen, "Expected '(' after function name")?;
        let mut args = Vec::new();
        if self.current != Token::RParen {
            args.push(self.parse_operand()?);
            while self.eat(Token::Comma)? {
                args.push(self.parse_operand()?);
            }
        }
        self.expect(Token::RParen, "Expected ')' after function call")?;
        Ok(Operand::Function(FunctionCall {
            name: function,
            args,
        }))
    }
}

/// Evaluate a filter with `@` bound to `context` and `$` to `root`.
pub(crate) fn evaluate(
    node: &FilterNode,
    root: &Value,
    context: &Value,
) -> Result<bool, PathError> {
    match node {
        FilterNode::Or(lhs, rhs) => {
            if evaluate(lhs, root, context)? {
                Ok(true)
            } else {
                evaluate(rhs, root, context)
            }
        }
        FilterNode::And(lhs, rhs) => {
            if evaluate(lhs, root, context)? {
                evaluate(rhs, root, context)
            } else {
                Ok(false)
            }
        }
        FilterNode::Not(child) => Ok(!evaluate(child, root, context)?),
        FilterNode::Comparison { op, lhs, rhs } => {
            let lhs = evaluate_operand(lhs, root, context)?;
            let rhs = evaluate_operand(rhs, root, context)?;
            compare(*op, &lhs, &rhs)
        }
        FilterNode::Exists(operand) => {
            let nodes = evaluate_operand(operand, root, context)?;
            Ok(nodes.iter().any(|node| truthy(node)))
        }
    }
}

/// An operand evaluates to a node set: borrowed nodes for paths, owned
/// values for literals and function results.
fn evaluate_operand<'a>(
    operand: &'a Operand,
    root: &'a Value,
    context: &'a Value,
) -> Result<Vec<Cow<'a, Value>>, PathError> {
    match operand {
        Operand::Literal(value) => Ok(vec![Cow::Borrowed(value)]),
        Operand::Path(path) => {
            let start = if path.relative { context } else { root };
            let matches = eval::evaluate(RefCursor(start), &path.steps, root)?;
            Ok(matches
                .into_iter()
                .map(|cursor| Cow::Borrowed(cursor.0))
                .collect())
        }
        Operand::Function(call) => Ok(vec![Cow::Owned(evaluate_function(call, root, context)?)]),
    }
}

fn evaluate_function(
    call: &FunctionCall,
    root: &Value,
    context: &Value,
) -> Result<Value, PathError> {
    if call.args.len() != 1 {
        return Err(PathError::runtime(
            "Filter function expects exactly one argument",
        ));
    }
    let arg = evaluate_operand(&call.args[0], root, context)?;
    let Some(target) = arg.first() else {
        return Ok(Value::Long(0));
    };
    match call.name {
        FunctionName::Length => Ok(Value::Long(length_of(target))),
        FunctionName::Count => Ok(Value::Long(match target.as_ref() {
            Value::Array(items) => items.len() as i64,
            Value::Object(map) => map.len() as i64,
            _ => 1,
        })),
    }
}

/// String length in bytes, array length, object size, else 0.
fn length_of(value: &Value) -> i64 {
    match value {
        Value::String(s) => s.len() as i64,
        Value::Array(items) => items.len() as i64,
        Value::Object(map) => map.len() as i64,
        _ => 0,
    }
}

fn compare(op: CompareOp, lhs: &[Cow<Value>], rhs: &[Cow<Value>]) -> Result<bool, PathError> {
    match op {
        CompareOp::Eq => Ok(equals_any(lhs, rhs)),
        CompareOp::Ne => Ok(not_equals(lhs, rhs)),
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
            Ok(relational(op, lhs, rhs))
        }
        CompareOp::Matches => regex_match(lhs, rhs),
    }
}

/// `==` holds when any left/right pair is equal.
fn equals_any(lhs: &[Cow<Value>], rhs: &[Cow<Value>]) -> bool {
    lhs.iter()
        .any(|l| rhs.iter().any(|r| json_equals(l, r)))
}

/// `!=` holds when some left node equals no right node. An empty right side
/// means every left node differs.
fn not_equals(lhs: &[Cow<Value>], rhs: &[Cow<Value>]) -> bool {
    if lhs.is_empty() {
        return false;
    }
    if rhs.is_empty() {
        return true;
    }
    lhs.iter()
        .any(|l| !rhs.iter().any(|r| json_equals(l, r)))
}

fn relational(op: CompareOp, lhs: &[Cow<Value>], rhs: &[Cow<Value>]) -> bool {
    for l in lhs {
        let left_number = to_number(l);
        let left_string = l.as_str();
        for r in rhs {
            if let (Some(left), Some(right)) = (left_number, to_number(r)) {
                if compare_ordered(op, left.partial_cmp(&right)) {
                    return true;
                }
            }
            if let (Some(left), Some(right)) = (left_string, r.as_str()) {
                if compare_ordered(op, Some(left.cmp(right))) {
                    return true;
                }
            }
        }
    }
    false
}

fn compare_ordered(op: CompareOp, ordering: Option<std::cmp::Ordering>) -> bool {
    use std::cmp::Ordering::{Equal, Greater, Less};
    match (op, ordering) {
        (CompareOp::Lt, Some(Less)) => true,
        (CompareOp::Le, Some(Less | Equal)) => true,
        (CompareOp::Gt, Some(Greater)) => true,
        (CompareOp::Ge, Some(Greater | Equal)) => true,
        _ => false,
    }
}

/// `=~`: the right side supplies the pattern, each left string is tested for
/// a partial match.
fn regex_match(lhs: &[Cow<Value>], rhs: &[Cow<Value>]) -> Result<bool, PathError> {
    if lhs.is_empty() || rhs.is_empty() {
        return Ok(false);
    }
    let Some(pattern) = rhs[0].as_str() else {
        return Ok(false);
    };
    let regex = cache::compiled_regex(pattern)?;
    for l in lhs {
        if let Some(text) = l.as_str() {
            if regex.is_match(text) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Structural equality with numeric variants comparing by value.
fn json_equals(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(l), Value::Bool(r)) => l == r,
        (Value::Long(l), Value::Long(r)) => l == r,
        (Value::Float(l), Value::Float(r)) => l == r,
        (Value::Double(l), Value::Double(r)) => l == r,
        (Value::String(l), Value::String(r)) => l == r,
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(l, r)| json_equals(l, r))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .zip(r)
                    .all(|((lk, lv), (rk, rv))| lk == rk && json_equals(lv, rv))
        }
        _ => match (to_number(lhs), to_number(rhs)) {
            (Some(l), Some(r)) if lhs.is_number() && rhs.is_number() => l == r,
            _ => false,
        },
    }
}

/// Numeric coercion for comparisons: numbers widen to f64, booleans count
/// as 0/1.
fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => value.as_number(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Long(v) => *v != 0,
        Value::Float(v) => *v != 0.0,
        Value::Double(v) => *v != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
