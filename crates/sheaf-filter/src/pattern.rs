//! Pattern compilation.
//!
//! Two kinds of pattern reach the filter: raw regular expressions from the
//! caller and profiles, and glob directives from the ignore file. Both end
//! up as a [`regex::Regex`] searched against the normalized relative path,
//! so matching is a single operation dispatched over [`CompiledPattern`].

use std::collections::HashMap;

use regex::Regex;

use crate::error::FilterError;

/// A compiled raw regular expression.
#[derive(Debug, Clone)]
pub struct RegexPattern {
    source: String,
    regex: Regex,
}

impl RegexPattern {
    /// Compile a raw regular expression.
    pub fn new(source: &str) -> Result<Self, FilterError> {
        let regex = Regex::new(source).map_err(|source_err| FilterError::InvalidPattern {
            pattern: source.to_string(),
            source: source_err,
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The original expression.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// A compiled ignore-file glob.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Regex,
    negated: bool,
    anchored: bool,
    dir_only: bool,
    literal_prefix: String,
}

impl GlobPattern {
    /// Compile a glob. `pattern` must not carry the leading `!`; pass
    /// `negated` instead.
    pub fn new(pattern: &str, negated: bool) -> Result<Self, FilterError> {
        let translated = translate(pattern);
        let regex = Regex::new(&translated.regex).map_err(|source| FilterError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
            negated,
            anchored: translated.anchored,
            dir_only: translated.dir_only,
            literal_prefix: translated.literal_prefix,
        })
    }

    /// The glob as written, without the `!` prefix.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the directive began with `!`.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Whether the glob only matches from the root.
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Whether the glob only matches directories (trailing `/`).
    pub fn is_dir_only(&self) -> bool {
        self.dir_only
    }

    /// The regular expression the glob was translated to.
    pub fn as_regex(&self) -> &str {
        self.regex.as_str()
    }

    /// Literal text every anchored match starts with, up to the first
    /// wildcard.
    pub fn literal_prefix(&self) -> &str {
        &self.literal_prefix
    }

    /// Whether the glob could match some path below `dir` (a relative
    /// directory ending in `/`). Unanchored globs may match at any depth.
    pub fn could_match_below(&self, dir: &str) -> bool {
        if !self.anchored {
            return true;
        }
        let prefix = self.literal_prefix.as_str();
        prefix.starts_with(dir) || dir.starts_with(prefix)
    }
}

/// A pattern ready for matching.
#[derive(Debug, Clone)]
pub enum CompiledPattern {
    /// Raw regular expression, searched anywhere in the path.
    Regex(RegexPattern),
    /// Translated ignore-file glob.
    Glob(GlobPattern),
}

impl CompiledPattern {
    /// Compile a raw regular expression.
    pub fn regex(source: &str) -> Result<Self, FilterError> {
        RegexPattern::new(source).map(Self::Regex)
    }

    /// Compile an ignore-file directive, honoring a leading `!`.
    pub fn glob(directive: &str) -> Result<Self, FilterError> {
        match directive.strip_prefix('!') {
            Some(rest) => GlobPattern::new(rest.trim(), true).map(Self::Glob),
            None => GlobPattern::new(directive, false).map(Self::Glob),
        }
    }

    /// Test a normalized relative path. Directory candidates carry a
    /// trailing `/`.
    pub fn is_match(&self, rel_path: &str) -> bool {
        match self {
            Self::Regex(p) => p.regex.is_match(rel_path),
            Self::Glob(p) => p.regex.is_match(rel_path),
        }
    }

    /// The pattern as written.
    pub fn source(&self) -> &str {
        match self {
            Self::Regex(p) => p.source(),
            Self::Glob(p) => p.source(),
        }
    }

    /// Whether this is a negation directive.
    pub fn is_negated(&self) -> bool {
        matches!(self, Self::Glob(p) if p.negated)
    }

    /// Whether the pattern could match some path below `dir`. Raw regexes
    /// are opaque and always could.
    pub fn could_match_below(&self, dir: &str) -> bool {
        match self {
            Self::Regex(_) => true,
            Self::Glob(p) => p.could_match_below(dir),
        }
    }
}

/// Translate a glob to the regular expression it compiles to.
///
/// `*` matches within one path segment, `**` across segments, `?` one
/// non-separator character. A leading `/` or any interior `/` anchors the
/// glob at the root; otherwise it may start at any segment. A trailing `/`
/// restricts it to directories, which for file paths means an ancestor.
/// Every other character is matched literally; `\` escapes the next one.
pub fn glob_to_regex(glob: &str) -> String {
    translate(glob).regex
}

struct Translated {
    regex: String,
    anchored: bool,
    dir_only: bool,
    literal_prefix: String,
}

fn translate(glob: &str) -> Translated {
    let mut body = glob;

    let dir_only = body.len() > 1 && body.ends_with('/') && !body.ends_with("\\/");
    if dir_only {
        body = body.trim_end_matches('/');
    }

    let rooted = body.starts_with('/');
    body = body.trim_start_matches('/');
    let anchored = rooted || has_separator(body);

    let chars: Vec<char> = body.chars().collect();
    let mut out = String::with_capacity(body.len() * 2);
    let mut literal_prefix = String::new();
    let mut in_prefix = true;
    let mut buf = [0u8; 4];
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' | '?' => in_prefix = false,
            '\\' => {
                if let (true, Some(next)) = (in_prefix, chars.get(i + 1)) {
                    literal_prefix.push(*next);
                }
            }
            c if in_prefix => literal_prefix.push(c),
            _ => {}
        }
        match chars[i] {
            '\\' => {
                if let Some(next) = chars.get(i + 1) {
                    out.push_str(&regex::escape(next.encode_utf8(&mut buf)));
                    i += 2;
                    continue;
                }
                out.push_str(r"\\");
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                let mut end = i;
                while chars.get(end) == Some(&'*') {
                    end += 1;
                }
                if chars.get(end) == Some(&'/') {
                    out.push_str("(?:.*/)?");
                    i = end + 1;
                } else {
                    out.push_str(".*");
                    i = end;
                }
                continue;
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '/' => out.push('/'),
            c => out.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
        i += 1;
    }

    let prefix = if anchored { "^" } else { "(?:^|/)" };
    let suffix = if dir_only { "/" } else { "(?:/|$)" };

    Translated {
        regex: format!("{prefix}{out}{suffix}"),
        anchored,
        dir_only,
        literal_prefix,
    }
}

/// Whether `body` contains an unescaped `/`.
fn has_separator(body: &str) -> bool {
    let mut escaped = false;
    for c in body.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '/' => return true,
            _ => {}
        }
    }
    false
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Regex(String),
    Glob { pattern: String, negated: bool },
}

/// Compiles patterns once per run and hands out cached copies.
#[derive(Debug, Default)]
pub struct PatternCompiler {
    cache: HashMap<CacheKey, CompiledPattern>,
}

impl PatternCompiler {
    /// Create an empty compiler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a raw regular expression.
    pub fn compile_regex(&mut self, source: &str) -> Result<CompiledPattern, FilterError> {
        let key = CacheKey::Regex(source.to_string());
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }
        let compiled = CompiledPattern::regex(source)?;
        self.cache.insert(key, compiled.clone());
        Ok(compiled)
    }

    /// Compile a glob directive body.
    pub fn compile_glob(
        &mut self,
        pattern: &str,
        negated: bool,
    ) -> Result<CompiledPattern, FilterError> {
        let key = CacheKey::Glob {
            pattern: pattern.to_string(),
            negated,
        };
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }
        let compiled = GlobPattern::new(pattern, negated).map(CompiledPattern::Glob)?;
        self.cache.insert(key, compiled.clone());
        Ok(compiled)
    }

    /// Compile every regex, failing on the first invalid one.
    pub fn compile_regexes<S: AsRef<str>>(
        &mut self,
        sources: &[S],
    ) -> Result<Vec<CompiledPattern>, FilterError> {
        sources
            .iter()
            .map(|s| self.compile_regex(s.as_ref()))
            .collect()
    }

    /// Number of distinct patterns compiled so far.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if nothing has been compiled.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
