// src/watch/patterns.rs

use std::fmt;

use regex::Regex;

use crate::errors::{Result, TttError};

/// Translate a shell-style file pattern into a regex that is *searched* for
/// anywhere in a candidate path.
///
/// - `*` matches any run of characters (lazily).
/// - `?` matches exactly one character.
/// - a trailing `$` anchors the pattern to the end of the path.
/// - everything else is literal.
///
/// Patterns are not anchored to path segments: `build` excludes
/// `/src/build/x.c` but also `/src/rebuild.c`.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    let (body, anchored) = match pattern.strip_suffix('$') {
        Some(body) => (body, true),
        None => (pattern, false),
    };

    let mut re = String::with_capacity(body.len() * 2);
    for c in body.chars() {
        match c {
            '*' => re.push_str(".*?"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }
    if anchored {
        re.push('$');
    }

    Regex::new(&re)
        .map_err(|e| TttError::ConfigError(format!("invalid file pattern {pattern:?}: {e}")))
}

/// A compiled list of file patterns.
#[derive(Clone, Default)]
pub struct PatternSet {
    sources: Vec<String>,
    compiled: Vec<Regex>,
}

impl fmt::Debug for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.sources).finish()
    }
}

impl PatternSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut sources = Vec::with_capacity(patterns.len());
        let mut compiled = Vec::with_capacity(patterns.len());
        for p in patterns {
            compiled.push(compile_pattern(p.as_ref())?);
            sources.push(p.as_ref().to_string());
        }
        Ok(Self { sources, compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// True if any pattern is found anywhere in `candidate`.
    pub fn is_match(&self, candidate: &str) -> bool {
        self.compiled.iter().any(|re| re.is_match(candidate))
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}

/// Inclusion/exclusion filter deciding which files the watcher tracks.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    include: PatternSet,
    exclude: PatternSet,
}

impl FileFilter {
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: PatternSet::new(include)?,
            exclude: PatternSet::new(exclude)?,
        })
    }

    /// Exclusion wins over inclusion; an empty inclusion list tracks every
    /// file that is not excluded.
    pub fn tracks(&self, path: &str) -> bool {
        if self.exclude.is_match(path) {
            return false;
        }
        self.include.is_empty() || self.include.is_match(path)
    }

    pub fn include(&self) -> &PatternSet {
        &self.include
    }

    pub fn exclude(&self) -> &PatternSet {
        &self.exclude
    }
}
