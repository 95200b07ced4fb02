//! Built-in exclusion table.

/// Paths under version control metadata, dependency caches and common
/// build output are always vetoed unless an ignore-file negation restores
/// them.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    r"(^|/)\.(git|hg|svn)($|/)",
    r"(^|/)__pycache__($|/)",
    r"(^|/)\.(pytest|mypy|ruff)_cache($|/)",
    r"(^|/)(\.?venv|env)($|/)",
    r"(^|/)node_modules($|/)",
    r"(^|/)(build|dist|target)($|/)",
    r"(^|/)coverage($|/)",
    r"(^|/)htmlcov($|/)",
    r"(^|/)\.coverage($|/)",
    r"(^|/)\.env($|/)",
];

/// Regex excluding the ignore file itself, at any depth.
pub fn self_exclusion(ignore_file_name: &str) -> String {
    format!(r"(^|/){}($|/)", regex::escape(ignore_file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn any_match(path: &str) -> bool {
        DEFAULT_EXCLUDES
            .iter()
            .any(|p| Regex::new(p).unwrap().is_match(path))
    }

    #[test]
    fn test_defaults_compile() {
        for pattern in DEFAULT_EXCLUDES {
            assert!(Regex::new(pattern).is_ok(), "{pattern}");
        }
    }

    #[test]
    fn test_excluded_directory_names_at_any_depth() {
        for dir in [
            ".git", ".hg", ".svn", "__pycache__", ".pytest_cache", ".mypy_cache",
            ".ruff_cache", "venv", ".venv", "env", "node_modules", "build", "dist",
            "target", "coverage", "htmlcov",
        ] {
            assert!(any_match(&format!("{dir}/x")), "{dir}/x");
            assert!(any_match(&format!("pkg/{dir}/deep/x.js")), "pkg/{dir}/deep/x.js");
            assert!(any_match(&format!("{dir}/")), "{dir}/");
        }
    }

    #[test]
    fn test_similar_names_pass() {
        assert!(!any_match("src/builder.rs"));
        assert!(!any_match("environment.md"));
        assert!(!any_match("my_node_modules.txt"));
        assert!(!any_match(".gitignore"));
        assert!(!any_match(".env.example"));
    }

    #[test]
    fn test_self_exclusion() {
        let re = Regex::new(&self_exclusion(".sheafignore")).unwrap();
        assert!(re.is_match(".sheafignore"));
        assert!(re.is_match("sub/.sheafignore"));
        assert!(!re.is_match("xsheafignore"));
    }
}
