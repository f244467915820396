use crate::error::{ManifestError, ManifestResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Always ignored, on top of the root `.gitignore`.
pub const DEFAULT_IGNORES: [&str; 5] = [".geas/", ".git/", "__pycache__/", "target/", "*.pyc"];

/// Collects source files under scope directories of a project root.
#[derive(Debug, Clone)]
pub struct SourceWalker {
    root: PathBuf,
    rules: Vec<IgnoreRule>,
}

impl SourceWalker {
    /// Default ignores plus the patterns of `<root>/.gitignore`, if present.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut walker = Self {
            rules: DEFAULT_IGNORES.iter().filter_map(|p| IgnoreRule::parse(p)).collect(),
            root,
        };
        if let Ok(text) = std::fs::read_to_string(walker.root.join(".gitignore")) {
            walker.rules.extend(text.lines().filter_map(IgnoreRule::parse));
        }
        walker
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add one more ignore rule, in `.gitignore` syntax.
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.rules.extend(IgnoreRule::parse(pattern));
        self
    }

    /// `relative` uses `/` separators and is relative to the root.
    /// The last matching rule decides, so a later `!pattern` re-includes.
    pub fn is_ignored(&self, relative: &str, is_dir: bool) -> bool {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(relative, is_dir))
            .is_some_and(|rule| !rule.negated)
    }

    /// Sorted, de-duplicated relative paths of every file in `scope`.
    /// Missing scope directories are skipped with a warning.
    pub fn walk<S: AsRef<str>>(&self, scope: &[S]) -> ManifestResult<Vec<String>> {
        let mut files = Vec::new();
        for dir in scope {
            let dir = dir.as_ref();
            let base = self.root.join(dir);
            if !base.is_dir() {
                tracing::warn!(scope = dir, "scope directory not found");
                continue;
            }

            let entries = WalkDir::new(&base)
                .follow_links(false)
                .into_iter()
                .filter_entry(|entry| match self.relative(entry.path()) {
                    Some(rel) => !self.is_ignored(&rel, entry.file_type().is_dir()),
                    None => true,
                });
            for entry in entries {
                let entry = entry.map_err(|source| ManifestError::Walk {
                    path: base.clone(),
                    source,
                })?;
                if entry.file_type().is_file() {
                    if let Some(rel) = self.relative(entry.path()) {
                        files.push(rel);
                    }
                }
            }
        }
        files.sort();
        files.dedup();
        tracing::debug!(root = %self.root.display(), files = files.len(), "scope walked");
        Ok(files)
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        Some(parts.join("/"))
    }
}

/// One `.gitignore` line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IgnoreRule {
    pattern: String,
    dir_only: bool,
    /// Matched against the whole relative path rather than the file name.
    anchored: bool,
    /// `!pattern`: a match re-includes the path.
    negated: bool,
}

impl IgnoreRule {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (negated, line) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line.strip_prefix('\\').unwrap_or(line)),
        };
        let dir_only = line.ends_with('/');
        let mut pattern = line.trim_end_matches('/');
        let mut anchored = false;
        if let Some(rest) = pattern.strip_prefix("**/") {
            pattern = rest;
        } else if pattern.contains('/') {
            pattern = pattern.trim_start_matches('/');
            anchored = true;
        }
        (!pattern.is_empty()).then(|| Self {
            pattern: pattern.to_string(),
            dir_only,
            anchored: anchored || pattern.contains('/'),
            negated,
        })
    }

    fn matches(&self, relative: &str, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        let subject = if self.anchored {
            relative
        } else {
            relative.rsplit('/').next().unwrap_or(relative)
        };
        glob_match(self.pattern.as_bytes(), subject.as_bytes())
    }
}

/// `*`, `?` and `[...]` stay within one path segment, `**` crosses segments.
/// A backslash escapes the next byte.
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((b'*', rest)) => match rest.split_first() {
            Some((b'*', rest)) => {
                let rest = rest.strip_prefix(b"/").unwrap_or(rest);
                (0..=text.len()).any(|i| glob_match(rest, &text[i..]))
            }
            _ => (0..=text.len())
                .take_while(|&i| i == 0 || text[i - 1] != b'/')
                .any(|i| glob_match(rest, &text[i..])),
        },
        Some((b'?', rest)) => {
            matches!(text.split_first(), Some((c, tail)) if *c != b'/' && glob_match(rest, tail))
        }
        Some((b'[', rest)) => match bracket_class(rest) {
            Some((class, rest)) => matches!(
                text.split_first(),
                Some((c, tail)) if *c != b'/' && class.contains(*c) && glob_match(rest, tail)
            ),
            None => literal(b'[', rest, text),
        },
        Some((b'\\', rest)) => match rest.split_first() {
            Some((p, rest)) => literal(*p, rest, text),
            None => literal(b'\\', rest, text),
        },
        Some((p, rest)) => literal(*p, rest, text),
    }
}

fn literal(p: u8, rest: &[u8], text: &[u8]) -> bool {
    matches!(text.split_first(), Some((c, tail)) if *c == p && glob_match(rest, tail))
}

/// A parsed `[...]` set: single bytes and inclusive ranges.
#[derive(Debug)]
struct ByteClass {
    negated: bool,
    ranges: Vec<(u8, u8)>,
}

impl ByteClass {
    fn contains(&self, c: u8) -> bool {
        self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi) != self.negated
    }
}

/// Parses the body after `[`. Returns `None` when the class is unterminated,
/// in which case `[` is taken literally.
fn bracket_class(body: &[u8]) -> Option<(ByteClass, &[u8])> {
    let (negated, mut rest) = match body.split_first() {
        Some((b'!' | b'^', tail)) => (true, tail),
        _ => (false, body),
    };
    let mut ranges = Vec::new();
    let mut first = true;
    loop {
        let (&c, tail) = rest.split_first()?;
        if c == b']' && !first {
            return Some((ByteClass { negated, ranges }, tail));
        }
        first = false;
        let (lo, tail) = match (c, tail.split_first()) {
            (b'\\', Some((&escaped, tail))) => (escaped, tail),
            _ => (c, tail),
        };
        match tail {
            [b'-', hi, after @ ..] if *hi != b']' => {
                ranges.push((lo, *hi));
                rest = after;
            }
            _ => {
                ranges.push((lo, lo));
                rest = tail;
            }
        }
    }
}
