use std::{cell::RefCell, rc::Rc};

use ahash::AHashMap;
use regex::Regex;

use crate::{ast::CompiledPath, compiler::PathParser, error::PathError};

const MAX_COMPILED_PATHS: usize = 64;
const MAX_COMPILED_REGEXES: usize = 32;

struct CacheEntry {
    path: Rc<CompiledPath>,
    last_used: u64,
}

/// Bounded per-thread memo of compiled paths. Eviction is
/// least-recently-used via a monotonic tick; a linear scan is fine at this
/// capacity.
#[derive(Default)]
struct PathCache {
    entries: AHashMap<String, CacheEntry>,
    clock: u64,
}

impl PathCache {
    fn get(&mut self, expression: &str) -> Result<Rc<CompiledPath>, PathError> {
        self.clock += 1;
        let now = self.clock;
        if let Some(entry) = self.entries.get_mut(expression) {
            entry.last_used = now;
            return Ok(Rc::clone(&entry.path));
        }
        let path = Rc::new(PathParser::new(expression).parse()?);
        self.entries.insert(
            expression.to_owned(),
            CacheEntry {
                path: Rc::clone(&path),
                last_used: now,
            },
        );
        if self.entries.len() > MAX_COMPILED_PATHS {
            self.evict_oldest();
        }
        Ok(path)
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(expression, _)| expression.clone());
        if let Some(expression) = oldest {
            self.entries.remove(&expression);
        }
    }
}

thread_local! {
    static PATH_CACHE: RefCell<PathCache> = RefCell::new(PathCache::default());
    static REGEX_CACHE: RefCell<AHashMap<String, Rc<Regex>>> =
        RefCell::new(AHashMap::new());
}

/// Compile `expression`, consulting this thread's cache first. Failures are
/// not cached.
pub(crate) fn compiled(expression: &str) -> Result<Rc<CompiledPath>, PathError> {
    PATH_CACHE.with(|cache| cache.borrow_mut().get(expression))
}

/// Compiled-regex memo for `=~` filters, bounded like the path cache but
/// without eviction: once full, extra patterns compile per use.
pub(crate) fn compiled_regex(pattern: &str) -> Result<Rc<Regex>, PathError> {
    REGEX_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if let Some(regex) = cache.get(pattern) {
            return Ok(Rc::clone(regex));
        }
        let regex = Rc::new(Regex::new(pattern).map_err(|_| {
            PathError::runtime("Invalid regular expression in JSONPath filter")
        })?);
        if cache.len() < MAX_COMPILED_REGEXES {
            cache.insert(pattern.to_owned(), Rc::clone(&regex));
        }
        Ok(regex)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_share_the_compiled_path() {
        let first = compiled("$.cache.hit.probe").unwrap();
        let second = compiled("$.cache.hit.probe").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn eviction_keeps_recently_used_entries_working() {
        // Overflow the cache several times; every expression must still
        // compile to a usable path afterwards.
        for round in 0..3 {
            for i in 0..(MAX_COMPILED_PATHS + 8) {
                let expression = format!("$.evict[{i}].round{round}");
                assert!(compiled(&expression).is_ok());
            }
        }
        assert!(compiled("$.evict[0].round0").is_ok());
    }

    #[test]
    fn compile_errors_are_not_cached() {
        assert!(compiled("$[").is_err());
        assert!(compiled("$[").is_err());
    }

    #[test]
    fn regex_cache_round_trips() {
        let first = compiled_regex("^a+b$").unwrap();
        let second = compiled_regex("^a+b$").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert!(compiled_regex("(").is_err());
    }
}
