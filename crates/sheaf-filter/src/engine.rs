//! The five-stage inclusion filter.

use strum::{Display, IntoStaticStr};
use tracing::{debug, trace};

use sheaf_core::{DEFAULT_IGNORE_FILE, DEFAULT_PROFILE, SnapshotConfig};

use crate::defaults::{DEFAULT_EXCLUDES, self_exclusion};
use crate::error::FilterError;
use crate::ignore_file::IgnoreFile;
use crate::pattern::{CompiledPattern, PatternCompiler};
use crate::profile::Profile;

/// Pattern inputs for a filter, before compilation.
#[derive(Debug, Clone)]
pub struct FilterRules {
    /// Profile name.
    pub profile: String,
    /// User include regexes.
    pub includes: Vec<String>,
    /// User exclude regexes.
    pub excludes: Vec<String>,
    /// Ignore file name, excluded from every snapshot.
    pub ignore_file_name: String,
}

impl FilterRules {
    /// Rules for a profile with no user patterns.
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            includes: Vec::new(),
            excludes: Vec::new(),
            ignore_file_name: DEFAULT_IGNORE_FILE.to_string(),
        }
    }

    /// Set the user include regexes.
    pub fn with_includes(mut self, includes: Vec<String>) -> Self {
        self.includes = includes;
        self
    }

    /// Set the user exclude regexes.
    pub fn with_excludes(mut self, excludes: Vec<String>) -> Self {
        self.excludes = excludes;
        self
    }

    /// Set the ignore file name.
    pub fn with_ignore_file_name(mut self, name: impl Into<String>) -> Self {
        self.ignore_file_name = name.into();
        self
    }
}

impl Default for FilterRules {
    fn default() -> Self {
        Self::new(DEFAULT_PROFILE)
    }
}

impl From<&SnapshotConfig> for FilterRules {
    fn from(config: &SnapshotConfig) -> Self {
        Self {
            profile: config.profile.clone(),
            includes: config.includes.clone(),
            excludes: config.excludes.clone(),
            ignore_file_name: config.ignore_file_name.clone(),
        }
    }
}

/// Which stage rejected a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ExcludeReason {
    /// Built-in or profile exclusion.
    Default,
    /// User exclude regex.
    User,
    /// Ignore-file exclusion directive.
    IgnoreFile,
    /// No include pattern matched.
    NotIncluded,
}

/// Outcome of filtering one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The path is a candidate for the snapshot.
    Include,
    /// The path is dropped.
    Exclude(ExcludeReason),
}

impl Verdict {
    /// Check if the path is kept.
    pub fn is_include(self) -> bool {
        matches!(self, Verdict::Include)
    }
}

/// Compiled filter for one run.
///
/// All patterns are compiled up front by [`FilterEngine::build`], so any
/// invalid pattern fails the run before a single path is examined.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    profile: Profile,
    defaults: Vec<CompiledPattern>,
    user_excludes: Vec<CompiledPattern>,
    ignore_excludes: Vec<CompiledPattern>,
    negations: Vec<CompiledPattern>,
    includes: Vec<CompiledPattern>,
    user_includes: bool,
}

impl FilterEngine {
    /// Compile the rules and ignore directives.
    pub fn build(rules: &FilterRules, ignore: &IgnoreFile) -> Result<Self, FilterError> {
        let profile = Profile::from_name(&rules.profile)?;
        let mut compiler = PatternCompiler::new();

        let mut defaults = compiler.compile_regexes(DEFAULT_EXCLUDES)?;
        defaults.extend(compiler.compile_regexes(profile.excludes())?);
        defaults.push(compiler.compile_regex(&self_exclusion(&rules.ignore_file_name))?);

        let user_excludes = compiler.compile_regexes(rules.excludes.as_slice())?;

        let (excludes, negations) = ignore.split();
        let ignore_excludes = excludes
            .into_iter()
            .map(|d| compiler.compile_glob(&d.pattern, false))
            .collect::<Result<Vec<_>, _>>()?;
        let negations = negations
            .into_iter()
            .map(|d| compiler.compile_glob(&d.pattern, true))
            .collect::<Result<Vec<_>, _>>()?;

        let user_includes = !rules.includes.is_empty();
        let includes = if user_includes {
            compiler.compile_regexes(rules.includes.as_slice())?
        } else {
            compiler.compile_regexes(profile.includes())?
        };

        debug!(
            profile = %profile,
            defaults = defaults.len(),
            user_excludes = user_excludes.len(),
            ignore_excludes = ignore_excludes.len(),
            negations = negations.len(),
            includes = includes.len(),
            distinct = compiler.len(),
            "Compiled filter"
        );

        Ok(Self {
            profile,
            defaults,
            user_excludes,
            ignore_excludes,
            negations,
            includes,
            user_includes,
        })
    }

    /// Build from a run configuration.
    pub fn from_config(config: &SnapshotConfig, ignore: &IgnoreFile) -> Result<Self, FilterError> {
        Self::build(&FilterRules::from(config), ignore)
    }

    /// The active profile.
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Whether user include patterns replaced the profile's.
    pub fn has_user_includes(&self) -> bool {
        self.user_includes
    }

    /// Decide a normalized relative file path.
    pub fn evaluate(&self, rel_path: &str) -> Verdict {
        if let Some(reason) = self.veto(rel_path) {
            if !self.is_restored(rel_path) {
                trace!(path = rel_path, reason = %reason, "Excluded");
                return Verdict::Exclude(reason);
            }
            trace!(path = rel_path, vetoed_by = %reason, "Restored by negation");
        }

        if !matches_any(&self.includes, rel_path) {
            trace!(path = rel_path, "No include pattern matched");
            return Verdict::Exclude(ExcludeReason::NotIncluded);
        }

        Verdict::Include
    }

    /// Shorthand for `evaluate(rel_path).is_include()`.
    pub fn is_included(&self, rel_path: &str) -> bool {
        self.evaluate(rel_path).is_include()
    }

    /// Whether a directory can be skipped without visiting its contents.
    ///
    /// The directory, tested with a trailing `/`, must be vetoed by stages
    /// 1-3, and no negation may match it or anything that could lie below
    /// it. Pruning never drops a file that filtering it alone would keep.
    pub fn should_prune(&self, rel_dir: &str) -> bool {
        let candidate = if rel_dir.ends_with('/') {
            rel_dir.to_string()
        } else {
            format!("{rel_dir}/")
        };
        self.veto(&candidate).is_some()
            && !self.is_restored(&candidate)
            && !self
                .negations
                .iter()
                .any(|n| n.could_match_below(&candidate))
    }

    /// First exclusion stage that matches, if any.
    pub fn veto(&self, rel_path: &str) -> Option<ExcludeReason> {
        if matches_any(&self.defaults, rel_path) {
            Some(ExcludeReason::Default)
        } else if matches_any(&self.user_excludes, rel_path) {
            Some(ExcludeReason::User)
        } else if matches_any(&self.ignore_excludes, rel_path) {
            Some(ExcludeReason::IgnoreFile)
        } else {
            None
        }
    }

    /// Whether a negation directive matches.
    pub fn is_restored(&self, rel_path: &str) -> bool {
        matches_any(&self.negations, rel_path)
    }

    /// Check if the built-in and profile exclusions match.
    pub fn matches_default(&self, rel_path: &str) -> bool {
        matches_any(&self.defaults, rel_path)
    }

    /// Number of ignore-file negations.
    pub fn negation_count(&self) -> usize {
        self.negations.len()
    }
}

fn matches_any(patterns: &[CompiledPattern], rel_path: &str) -> bool {
    patterns.iter().any(|p| p.is_match(rel_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(rules: FilterRules, ignore: &str) -> FilterEngine {
        FilterEngine::build(&rules, &IgnoreFile::parse(ignore)).unwrap()
    }

    #[test]
    fn test_minimal_includes_everything_not_excluded() {
        let e = engine(FilterRules::default(), "");
        assert_eq!(e.evaluate("src/main.rs"), Verdict::Include);
        assert_eq!(e.evaluate("README.md"), Verdict::Include);
        assert_eq!(
            e.evaluate("node_modules/x.js"),
            Verdict::Exclude(ExcludeReason::Default)
        );
        assert_eq!(
            e.evaluate(".sheafignore"),
            Verdict::Exclude(ExcludeReason::Default)
        );
    }

    #[test]
    fn test_user_exclude_vetoes() {
        let e = engine(
            FilterRules::default().with_excludes(vec![r"\.lock$".to_string()]),
            "",
        );
        assert_eq!(
            e.evaluate("Cargo.lock"),
            Verdict::Exclude(ExcludeReason::User)
        );
        assert!(e.is_included("Cargo.toml"));
    }

    #[test]
    fn test_ignore_file_exclusion_and_negation() {
        let e = engine(FilterRules::default(), "*.log\n!b.log\n");
        assert_eq!(
            e.evaluate("a.log"),
            Verdict::Exclude(ExcludeReason::IgnoreFile)
        );
        assert!(e.is_included("b.log"));
        assert!(e.is_included("a.py"));
    }

    #[test]
    fn test_negation_overrides_default_and_user_excludes() {
        let e = engine(
            FilterRules::default().with_excludes(vec![r"^secret".to_string()]),
            "!node_modules/keep.js\n!secret.txt\n",
        );
        assert!(e.is_included("node_modules/keep.js"));
        assert!(!e.is_included("node_modules/other.js"));
        assert!(e.is_included("secret.txt"));
        assert!(!e.is_included("secret.md"));
    }

    #[test]
    fn test_negation_does_not_bypass_include_stage() {
        let e = engine(
            FilterRules::default().with_includes(vec![r"^src/".to_string()]),
            "*.log\n!keep.log\n",
        );
        assert_eq!(
            e.evaluate("keep.log"),
            Verdict::Exclude(ExcludeReason::NotIncluded)
        );
    }

    #[test]
    fn test_user_includes_replace_profile_includes() {
        let e = engine(
            FilterRules::default().with_includes(vec![r"^src/".to_string()]),
            "",
        );
        assert!(e.has_user_includes());
        assert!(e.is_included("src/main.py"));
        assert_eq!(
            e.evaluate("docs/readme.md"),
            Verdict::Exclude(ExcludeReason::NotIncluded)
        );
    }

    #[test]
    fn test_ai_optimized_profile() {
        let e = engine(FilterRules::new("ai_optimized"), "");
        assert!(e.is_included("src/lib.rs"));
        assert!(e.is_included("tests/it.rs"));
        assert!(e.is_included("README.md"));
        assert!(e.is_included("pyproject.toml"));
        assert!(!e.is_included("notes.txt"));
        assert_eq!(
            e.evaluate("src/docs/guide.md"),
            Verdict::Exclude(ExcludeReason::Default)
        );
    }

    #[test]
    fn test_unknown_profile_is_fatal() {
        let err = FilterEngine::build(&FilterRules::new("nope"), &IgnoreFile::empty()).unwrap_err();
        assert!(matches!(err, FilterError::UnknownProfile { .. }));
    }

    #[test]
    fn test_invalid_user_pattern_is_fatal() {
        for rules in [
            FilterRules::default().with_includes(vec!["(".to_string()]),
            FilterRules::default().with_excludes(vec!["[z-a]".to_string()]),
        ] {
            let err = FilterEngine::build(&rules, &IgnoreFile::empty()).unwrap_err();
            assert!(matches!(err, FilterError::InvalidPattern { .. }));
        }
    }

    #[test]
    fn test_should_prune() {
        let e = engine(FilterRules::default(), "generated/\n");
        assert!(e.should_prune("node_modules"));
        assert!(e.should_prune("pkg/.git"));
        assert!(e.should_prune("generated"));
        assert!(!e.should_prune("src"));
    }

    #[test]
    fn test_negated_directory_is_not_pruned() {
        let e = engine(FilterRules::default(), "!vendor-src/\n!build/\n");
        assert!(!e.should_prune("build"));
        assert!(e.is_included("build/output.txt"));
    }

    #[test]
    fn test_file_negation_blocks_pruning_of_its_ancestors() {
        let e = engine(FilterRules::default(), "!node_modules/keep.js\n");
        assert!(!e.should_prune("node_modules"));
        assert!(e.should_prune("node_modules/pkg"));
        assert!(e.should_prune("build"));
        assert!(e.is_included("node_modules/keep.js"));
    }

    #[test]
    fn test_unanchored_negation_blocks_all_pruning() {
        let e = engine(FilterRules::default(), "!*.keep\n");
        assert!(!e.should_prune("build"));
        assert!(!e.should_prune("pkg/node_modules"));
        assert!(e.is_included("build/x.keep"));
        assert!(!e.is_included("build/x.txt"));
    }

    #[test]
    fn test_includes_do_not_prune_directories() {
        let e = engine(
            FilterRules::default().with_includes(vec![r"\.rs$".to_string()]),
            "",
        );
        assert!(!e.should_prune("src"));
    }
}
