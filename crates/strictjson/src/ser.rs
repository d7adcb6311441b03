use std::fmt;

use crate::{
    number::{format_double, format_float},
    value::Value,
};

const HEX: &[u8; 16] = b"0123456789abcdef";

impl Value {
    /// Serialize with two-space indentation. Arrays stay on one line;
    /// objects with two or more members break one member per line.
    pub fn to_string_pretty(&self) -> String {
        let mut out = String::new();
        marshal(self, &mut out, true, 0);
        out
    }
}

/// Compact serialization. `value.to_string()` goes through this impl.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        marshal(self, &mut out, false, 0);
        f.write_str(&out)
    }
}

fn marshal(value: &Value, out: &mut String, pretty: bool, indent: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Long(v) => {
            let mut buffer = itoa::Buffer::new();
            out.push_str(buffer.format(*v));
        }
        Value::Float(v) => format_float(out, *v),
        Value::Double(v) => format_double(out, *v),
        Value::String(s) => write_escaped(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                    if pretty {
                        out.push(' ');
                    }
                }
                marshal(item, out, pretty, indent);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            let expanded = pretty && map.len() > 1;
            for (i, (key, child)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if expanded {
                    out.push('\n');
                    push_indent(out, indent + 1);
                }
                write_escaped(out, key);
                out.push(':');
                if pretty {
                    out.push(' ');
                }
                marshal(child, out, pretty, if expanded { indent + 1 } else { indent });
            }
            if expanded {
                out.push('\n');
                push_indent(out, indent);
            }
            out.push('}');
        }
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn write_escaped(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            ' '..='~' => out.push(ch),
            _ => {
                let c = ch as u32;
                if c <= 0xffff {
                    push_unicode_escape(out, c as u16);
                } else {
                    let v = c - 0x10000;
                    push_unicode_escape(out, (0xd800 + (v >> 10)) as u16);
                    push_unicode_escape(out, (0xdc00 + (v & 0x3ff)) as u16);
                }
            }
        }
    }
    out.push('"');
}

fn push_unicode_escape(out: &mut String, unit: u16) {
    out.push_str("\\u");
    out.push(char::from(HEX[usize::from(unit >> 12)]));
    out.push(char::from(HEX[usize::from(unit >> 8 & 0xf)]));
    out.push(char::from(HEX[usize::from(unit >> 4 & 0xf)]));
    out.push(char::from(HEX[usize::from(unit & 0xf)]));
}
