//! Named profiles.

use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::FilterError;

/// A fixed bundle of include patterns and extra exclude patterns.
///
/// Profile excludes are added to the built-in default exclusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Profile {
    /// Everything not excluded by default.
    #[default]
    Minimal,
    /// Sources, tests and top-level project documents.
    AiOptimized,
}

impl Profile {
    /// Look up a profile by name.
    pub fn from_name(name: &str) -> Result<Self, FilterError> {
        name.parse().map_err(|_| FilterError::UnknownProfile {
            name: name.to_string(),
            available: Self::names().join(", "),
        })
    }

    /// All profile names.
    pub fn names() -> Vec<&'static str> {
        Self::iter().map(Into::into).collect()
    }

    /// Include regexes used when the caller supplies none.
    pub fn includes(self) -> &'static [&'static str] {
        match self {
            Self::Minimal => &[r".*"],
            Self::AiOptimized => &[
                r"^(src|tests)(/.*)?$",
                r"^pyproject\.toml$",
                r"^Cargo\.toml$",
                r"^README(\.md|\.rst)?$",
                r"^(ROADMAP|CHANGELOG)\.md$",
            ],
        }
    }

    /// Exclude regexes on top of the defaults.
    pub fn excludes(self) -> &'static [&'static str] {
        match self {
            Self::Minimal => &[],
            Self::AiOptimized => &[r"(^|/)docs/"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Profile::from_name("minimal").unwrap(), Profile::Minimal);
        assert_eq!(Profile::from_name("ai_optimized").unwrap(), Profile::AiOptimized);
    }

    #[test]
    fn test_unknown_profile_lists_available() {
        let err = Profile::from_name("everything").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("everything"));
        assert!(message.contains("minimal"));
        assert!(message.contains("ai_optimized"));
    }

    #[test]
    fn test_display_round_trip() {
        for profile in Profile::iter() {
            assert_eq!(Profile::from_name(&profile.to_string()).unwrap(), profile);
        }
    }

    #[test]
    fn test_default_is_minimal() {
        assert_eq!(Profile::default(), Profile::Minimal);
        assert_eq!(Profile::default().to_string(), sheaf_core::DEFAULT_PROFILE);
    }
}
