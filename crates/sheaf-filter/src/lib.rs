//! Inclusion filtering for sheaf.
//!
//! A path is kept or dropped by a five-stage chain:
//!
//! 1. **Default exclusions** - built-in table plus the profile's extras
//! 2. **User excludes** - raw regexes from the caller
//! 3. **Ignore-file exclusions** - glob directives from `.sheafignore`
//! 4. **Ignore-file negations** - `!` directives, which restore a path
//!    vetoed by any of stages 1-3
//! 5. **Include requirement** - the path must match a user include, or a
//!    profile include when the user gave none
//!
//! ```rust,no_run
//! use sheaf_filter::{FilterEngine, FilterRules, IgnoreFile};
//!
//! let ignore = IgnoreFile::parse("*.log\n!keep.log\n");
//! let rules = FilterRules::new("minimal").with_excludes(vec![r"\.lock$".into()]);
//! let engine = FilterEngine::build(&rules, &ignore).unwrap();
//!
//! assert!(engine.is_included("src/main.rs"));
//! assert!(!engine.is_included("node_modules/x.js"));
//! assert!(engine.is_included("keep.log"));
//! ```

mod defaults;
mod engine;
mod error;
mod ignore_file;
mod pattern;
mod profile;

pub use defaults::{DEFAULT_EXCLUDES, self_exclusion};
pub use engine::{ExcludeReason, FilterEngine, FilterRules, Verdict};
pub use error::FilterError;
pub use ignore_file::{IgnoreDirective, IgnoreFile};
pub use pattern::{CompiledPattern, GlobPattern, PatternCompiler, RegexPattern, glob_to_regex};
pub use profile::Profile;
