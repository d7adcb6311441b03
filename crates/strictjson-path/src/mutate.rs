use std::cmp::Ordering;

use strictjson::Value;

use crate::{
    cache,
    error::PathError,
    eval::{self, Crumb, TraceCursor},
};

/// Assign `new_value` to every node matched by `expression`, moving it into
/// the first match and cloning into the rest. Returns the number of nodes
/// updated.
pub fn update(root: &mut Value, expression: &str, new_value: Value) -> Result<usize, PathError> {
    let trails = locate(root, expression)?;
    let mut pending = Some(new_value);
    let mut template = None;
    let mut count = 0;
    for trail in &trails {
        let Some(slot) = resolve_mut(root, trail) else {
            continue;
        };
        *slot = match pending.take() {
            Some(value) => {
                if trails.len() > 1 {
                    template = Some(value.clone());
                }
                value
            }
            None => template.clone().expect("kept for every match after the first"),
        };
        count += 1;
    }
    Ok(count)
}

/// Remove every node matched by `expression` from its parent container.
/// The document root itself is silently skipped. Returns the number of
/// nodes actually removed.
pub fn delete(root: &mut Value, expression: &str) -> Result<usize, PathError> {
    let mut trails = locate(root, expression)?;
    // Within an array parent, drop higher indices first so earlier removals
    // don't shift the remaining targets.
    trails.sort_by(|a, b| match (a.last(), b.last()) {
        (Some(Crumb::Index(x)), Some(Crumb::Index(y))) => y.cmp(x),
        _ => Ordering::Equal,
    });
    let mut count = 0;
    for trail in &trails {
        let Some((target, parents)) = trail.split_last() else {
            continue;
        };
        let Some(parent) = resolve_mut(root, parents) else {
            continue;
        };
        match target {
            Crumb::Index(index) => {
                if let Some(items) = parent.as_array_mut() {
                    if *index < items.len() {
                        items.remove(*index);
                        count += 1;
                    }
                }
            }
            Crumb::Key(key) => {
                if let Some(map) = parent.as_object_mut() {
                    if map.remove(key).is_some() {
                        count += 1;
                    }
                }
            }
        }
    }
    Ok(count)
}

/// Evaluate with location tracking and return each match's trail from the
/// root.
fn locate(root: &Value, expression: &str) -> Result<Vec<Vec<Crumb>>, PathError> {
    let compiled = cache::compiled(expression)?;
    if compiled.relative {
        return Err(PathError::runtime("JSONPath expression must start with '$'"));
    }
    let start = TraceCursor {
        node: root,
        trail: Vec::new(),
    };
    let matches = eval::evaluate(start, &compiled.steps, root)?;
    Ok(matches.into_iter().map(|cursor| cursor.trail).collect())
}

/// Walk a recorded trail against the live document. Returns `None` when an
/// earlier mutation invalidated the location.
fn resolve_mut<'a>(root: &'a mut Value, trail: &[Crumb]) -> Option<&'a mut Value> {
    let mut current = root;
    for crumb in trail {
        current = match crumb {
            Crumb::Key(key) => current.as_object_mut()?.get_mut(key)?,
            Crumb::Index(index) => current.as_array_mut()?.get_mut(*index)?,
        };
    }
    Some(current)
}
