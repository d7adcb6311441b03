use strictjson::Value;

use crate::{
    ast::{Slice, Step, StepKind, UnionEntry},
    error::PathError,
    filter,
};

/// One hop on the way from the document root to a matched node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Crumb {
    Key(String),
    Index(usize),
}

/// The evaluator is generic over how matches are represented. `RefCursor`
/// carries only the borrowed node and backs read queries; `TraceCursor`
/// additionally records the key/index trail so mutation helpers can resolve
/// each match against `&mut Value` afterwards.
pub(crate) trait Cursor<'a>: Clone {
    fn value(&self) -> &'a Value;
    fn child_index(&self, index: usize, child: &'a Value) -> Self;
    fn child_key(&self, key: &str, child: &'a Value) -> Self;
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct RefCursor<'a>(pub &'a Value);

impl<'a> Cursor<'a> for RefCursor<'a> {
    fn value(&self) -> &'a Value {
        self.0
    }

    fn child_index(&self, _index: usize, child: &'a Value) -> Self {
        RefCursor(child)
    }

    fn child_key(&self, _key: &str, child: &'a Value) -> Self {
        RefCursor(child)
    }
}

#[derive(Clone)]
pub(crate) struct TraceCursor<'a> {
    pub node: &'a Value,
    pub trail: Vec<Crumb>,
}

impl<'a> Cursor<'a> for TraceCursor<'a> {
    fn value(&self) -> &'a Value {
        self.node
    }

    fn child_index(&self, index: usize, child: &'a Value) -> Self {
        let mut trail = self.trail.clone();
        trail.push(Crumb::Index(index));
        TraceCursor { node: child, trail }
    }

    fn child_key(&self, key: &str, child: &'a Value) -> Self {
        let mut trail = self.trail.clone();
        trail.push(Crumb::Key(key.to_owned()));
        TraceCursor { node: child, trail }
    }
}

/// Work-list evaluation: apply each step to the current node set, optionally
/// expanding to all descendants first for `..` steps. Result order follows
/// document order and may contain duplicates.
pub(crate) fn evaluate<'a, C: Cursor<'a>>(
    start: C,
    steps: &[Step],
    root: &'a Value,
) -> Result<Vec<C>, PathError> {
    let mut current = vec![start];
    if steps.is_empty() {
        return Ok(current);
    }
    let mut next: Vec<C> = Vec::with_capacity(4);
    for step in steps {
        let expanded;
        let base: &[C] = if step.recursive {
            let mut buffer = Vec::with_capacity(current.len() * 4);
            for cursor in &current {
                collect_descendants(cursor, &mut buffer);
            }
            expanded = buffer;
            &expanded
        } else {
            &current
        };

        next.clear();
        if !base.is_empty() {
            let estimate = base.len()
                * match &step.kind {
                    StepKind::Wildcard => 8,
                    StepKind::Union(entries) => entries.len(),
                    StepKind::Indices(indices) => indices.len(),
                    _ => 1,
                };
            next.reserve(estimate);
        }
        for cursor in base {
            apply_step(&step.kind, cursor, root, &mut next)?;
        }
        std::mem::swap(&mut current, &mut next);
    }
    Ok(current)
}

/// Pre-order expansion of a node and all of its descendants: array elements
/// low to high, object members in key order.
fn collect_descendants<'a, C: Cursor<'a>>(cursor: &C, out: &mut Vec<C>) {
    let mut stack = vec![cursor.clone()];
    while let Some(cursor) = stack.pop() {
        match cursor.value() {
            Value::Array(items) => {
                stack.reserve(items.len());
                for (index, child) in items.iter().enumerate().rev() {
                    stack.push(cursor.child_index(index, child));
                }
            }
            Value::Object(map) => {
                stack.reserve(map.len());
                for (key, child) in map.iter().rev() {
                    stack.push(cursor.child_key(key, child));
                }
            }
            _ => {}
        }
        out.push(cursor);
    }
}

fn apply_step<'a, C: Cursor<'a>>(
    kind: &StepKind,
    cursor: &C,
    root: &'a Value,
    next: &mut Vec<C>,
) -> Result<(), PathError> {
    match kind {
        StepKind::Name(name) => {
            if let Value::Object(map) = cursor.value() {
                if let Some((key, child)) = map.get_key_value(name) {
                    next.push(cursor.child_key(key, child));
                }
            }
        }
        StepKind::Wildcard => apply_wildcard(cursor, next),
        StepKind::Indices(indices) => {
            if let Value::Array(items) = cursor.value() {
                next.reserve(indices.len());
                for &raw in indices {
                    if let Some(index) = normalize_index(raw, items.len()) {
                        next.push(cursor.child_index(index, &items[index]));
                    }
                }
            }
        }
        StepKind::Slice(slice) => apply_slice(cursor, slice, next)?,
        StepKind::Union(entries) => {
            for entry in entries {
                match entry {
                    UnionEntry::Name(name) => {
                        if let Value::Object(map) = cursor.value() {
                            if let Some((key, child)) = map.get_key_value(name) {
                                next.push(cursor.child_key(key, child));
                            }
                        }
                    }
                    UnionEntry::Index(raw) => {
                        if let Value::Array(items) = cursor.value() {
                            if let Some(index) = normalize_index(*raw, items.len()) {
                                next.push(cursor.child_index(index, &items[index]));
                            }
                        }
                    }
                    UnionEntry::Slice(slice) => apply_slice(cursor, slice, next)?,
                    UnionEntry::Wildcard => apply_wildcard(cursor, next),
                }
            }
        }
        StepKind::Filter(node) => match cursor.value() {
            Value::Array(items) => {
                next.reserve(items.len() / 2);
                for (index, child) in items.iter().enumerate() {
                    if filter::evaluate(node, root, child)? {
                        next.push(cursor.child_index(index, child));
                    }
                }
            }
            Value::Object(map) => {
                next.reserve(map.len() / 2);
                for (key, child) in map.iter() {
                    if filter::evaluate(node, root, child)? {
                        next.push(cursor.child_key(key, child));
                    }
                }
            }
            _ => {}
        },
    }
    Ok(())
}

fn apply_wildcard<'a, C: Cursor<'a>>(cursor: &C, next: &mut Vec<C>) {
    match cursor.value() {
        Value::Array(items) => {
            next.reserve(items.len());
            for (index, child) in items.iter().enumerate() {
                next.push(cursor.child_index(index, child));
            }
        }
        Value::Object(map) => {
            next.reserve(map.len());
            for (key, child) in map.iter() {
                next.push(cursor.child_key(key, child));
            }
        }
        _ => {}
    }
}

fn apply_slice<'a, C: Cursor<'a>>(
    cursor: &C,
    slice: &Slice,
    next: &mut Vec<C>,
) -> Result<(), PathError> {
    let Value::Array(items) = cursor.value() else {
        return Ok(());
    };
    let len = items.len() as i64;
    if len == 0 {
        return Ok(());
    }
    let step = slice.step.unwrap_or(1);
    if step == 0 {
        return Err(PathError::runtime("JSONPath slice step cannot be zero"));
    }
    // Explicit negative bounds count from the end; the defaults already sit at
    // the right edge for each direction.
    let normalize = |bound: i64| if bound < 0 { bound + len } else { bound };
    if step > 0 {
        let start = normalize(slice.start.unwrap_or(0)).clamp(0, len);
        let end = normalize(slice.end.unwrap_or(len)).clamp(0, len);
        if start < end {
            next.reserve(((end - start + step - 1) / step) as usize);
        }
        let mut i = start;
        while i < end {
            next.push(cursor.child_index(i as usize, &items[i as usize]));
            i += step;
        }
    } else {
        let start = normalize(slice.start.unwrap_or(len - 1)).min(len - 1);
        let end = match slice.end {
            Some(bound) => normalize(bound).clamp(-1, len - 1),
            None => -1,
        };
        if start > end {
            next.reserve(((start - end - step - 1) / -step) as usize);
        }
        let mut i = start;
        while i > end {
            if i >= 0 && i < len {
                next.push(cursor.child_index(i as usize, &items[i as usize]));
            }
            i += step;
        }
    }
    Ok(())
}

fn normalize_index(raw: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let index = if raw < 0 { raw + len } else { raw };
    if (0..len).contains(&index) {
        Some(index as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::PathParser;
    use strictjson::Value;
    use test_case::test_case;

    fn doc() -> Value {
        Value::parse(br#"{"a": [10, 20, 30, 40], "b": {"x": 1, "y": [true, false]}}"#).unwrap()
    }

    fn run(doc: &Value, expression: &str) -> Vec<String> {
        let compiled = PathParser::new(expression).parse().unwrap();
        evaluate(RefCursor(doc), &compiled.steps, doc)
            .unwrap()
            .into_iter()
            .map(|cursor| cursor.value().to_string())
            .collect()
    }

    #[test_case("$.a[0]", &["10"] ; "index")]
    #[test_case("$.a[-1]", &["40"] ; "negative index")]
    #[test_case("$.a[1:3]", &["20", "30"] ; "slice")]
    #[test_case("$.a[::2]", &["10", "30"] ; "stepped slice")]
    #[test_case("$.a[::-1]", &["40", "30", "20", "10"] ; "reverse slice")]
    #[test_case("$.a[-2:]", &["30", "40"] ; "negative start slice")]
    #[test_case("$.a[3:0:-2]", &["40", "20"] ; "negative step with bounds")]
    #[test_case("$.b.*", &["1", "[true,false]"] ; "wildcard over object")]
    #[test_case("$.a[0,2,-1]", &["10", "30", "40"] ; "index union")]
    #[test_case("$['a','b']", &["[10,20,30,40]", "{\"x\":1,\"y\":[true,false]}"] ; "name union")]
    #[test_case("$.b['y'][*]", &["true", "false"] ; "bracketed name then wildcard")]
    #[test_case("$.missing", &[] ; "absent name")]
    #[test_case("$.a.x", &[] ; "name on array")]
    fn query_shapes(expression: &str, expected: &[&str]) {
        assert_eq!(run(&doc(), expression), expected);
    }

    #[test]
    fn recursive_descent_is_preorder() {
        let doc = Value::parse(br#"{"a": {"v": 1}, "b": [{"v": 2}, {"v": 3}]}"#).unwrap();
        assert_eq!(run(&doc, "$..v"), ["1", "2", "3"]);
    }

    #[test]
    fn recursive_wildcard_counts_every_node() {
        let doc = Value::parse(br#"[[1], [2, 3]]"#).unwrap();
        // $..* yields every node except the root.
        assert_eq!(run(&doc, "$..*").len(), 5);
    }

    #[test]
    fn zero_step_slice_is_a_runtime_error() {
        let doc = doc();
        let compiled = PathParser::new("$.a[::0]").parse().unwrap();
        let err = evaluate(RefCursor(&doc), &compiled.steps, &doc).unwrap_err();
        assert_eq!(err.message(), "JSONPath slice step cannot be zero");
    }

    #[test]
    fn trace_cursor_matches_ref_cursor() {
        let doc = Value::parse(
            br#"{"store": {"book": [{"price": 1}, {"price": 2}], "bicycle": {"price": 3}}}"#,
        )
        .unwrap();
        for expression in ["$..price", "$.store.book[*].price", "$.store['bicycle','book']"] {
            let compiled = PathParser::new(expression).parse().unwrap();
            let refs = evaluate(RefCursor(&doc), &compiled.steps, &doc).unwrap();
            let traced = evaluate(
                TraceCursor {
                    node: &doc,
                    trail: Vec::new(),
                },
                &compiled.steps,
                &doc,
            )
            .unwrap();
            assert_eq!(refs.len(), traced.len());
            for (by_ref, by_trail) in refs.iter().zip(&traced) {
                // The trail must resolve to the very node the plain cursor saw.
                let mut resolved = &doc;
                for crumb in &by_trail.trail {
                    resolved = match crumb {
                        Crumb::Key(key) => &resolved[key.as_str()],
                        Crumb::Index(index) => &resolved[*index],
                    };
                }
                assert_eq!(resolved, by_ref.value());
            }
        }
    }
}
