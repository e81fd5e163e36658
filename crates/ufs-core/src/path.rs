// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Backslash separated path helpers
//!
//! Paths are borrowed, never rewritten in place, so a caller's request path
//! is identical before and after any check that splits it.

pub const SEPARATOR: char = '\\';
pub const ROOT: &str = "\\";

/// Split `path` into its parent and final component.
///
/// `\a\b` gives (`\a`, `b`); `\a` gives (`\`, `a`); a path without a
/// separator is its own parent with an empty leaf.
pub fn split_suffix(path: &str) -> (&str, &str) {
    if !path.is_empty() && path.chars().all(|c| c == SEPARATOR) {
        return (ROOT, "");
    }

    let Some(last_sep) = path.rfind(SEPARATOR) else {
        return (path, "");
    };
    let suffix = &path[last_sep + 1..];
    let parent = path[..last_sep].trim_end_matches(SEPARATOR);
    if parent.is_empty() {
        (ROOT, suffix)
    } else {
        (parent, suffix)
    }
}

/// Prefixes of `path` that must be traversed to reach its final component.
///
/// `\a\b\c` yields `\`, `\a`, `\a\b`. The path itself is never yielded.
pub fn traverse_prefixes(path: &str) -> TraversePrefixes<'_> {
    TraversePrefixes {
        path,
        pos: 0,
        started: false,
    }
}

pub struct TraversePrefixes<'a> {
    path: &'a str,
    pos: usize,
    started: bool,
}

impl<'a> TraversePrefixes<'a> {
    fn skip_separators(&self, from: usize) -> usize {
        self.path[from..]
            .find(|c: char| c != SEPARATOR)
            .map(|offset| from + offset)
            .unwrap_or(self.path.len())
    }
}

impl<'a> Iterator for TraversePrefixes<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if !self.started {
            self.started = true;
            if self.path.starts_with(SEPARATOR) {
                self.pos = self.skip_separators(0);
                if self.pos < self.path.len() {
                    return Some(ROOT);
                }
                return None;
            }
        }

        if self.pos >= self.path.len() {
            return None;
        }
        let end = self.path[self.pos..]
            .find(SEPARATOR)
            .map(|offset| self.pos + offset)
            .unwrap_or(self.path.len());
        let next = self.skip_separators(end);
        if next >= self.path.len() {
            // Final component, possibly followed by trailing separators.
            self.pos = self.path.len();
            return None;
        }
        self.pos = next;
        Some(&self.path[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_nested_path() {
        assert_eq!(split_suffix("\\a\\b\\c"), ("\\a\\b", "c"));
    }

    #[test]
    fn split_top_level_uses_root() {
        assert_eq!(split_suffix("\\a"), ("\\", "a"));
        assert_eq!(split_suffix("\\"), ("\\", ""));
    }

    #[test]
    fn split_collapses_separator_runs() {
        assert_eq!(split_suffix("\\a\\\\b"), ("\\a", "b"));
    }

    #[test]
    fn split_relative_without_separator() {
        assert_eq!(split_suffix("name"), ("name", ""));
        assert_eq!(split_suffix(""), ("", ""));
    }

    #[test]
    fn split_trailing_separator_has_empty_leaf() {
        assert_eq!(split_suffix("\\a\\"), ("\\a", ""));
    }

    #[test]
    fn prefixes_walk_from_root() {
        let prefixes: Vec<_> = traverse_prefixes("\\a\\b\\c").collect();
        assert_eq!(prefixes, vec!["\\", "\\a", "\\a\\b"]);
    }

    #[test]
    fn prefixes_of_top_level_and_root() {
        assert_eq!(traverse_prefixes("\\a").collect::<Vec<_>>(), vec!["\\"]);
        assert!(traverse_prefixes("\\").next().is_none());
        assert!(traverse_prefixes("").next().is_none());
    }

    #[test]
    fn prefixes_ignore_trailing_and_repeated_separators() {
        let prefixes: Vec<_> = traverse_prefixes("\\a\\\\b\\").collect();
        assert_eq!(prefixes, vec!["\\", "\\a"]);
    }

    #[test]
    fn prefixes_of_relative_path() {
        let prefixes: Vec<_> = traverse_prefixes("a\\b").collect();
        assert_eq!(prefixes, vec!["a"]);
    }
}
