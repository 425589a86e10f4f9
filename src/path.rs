//! Path manipulation utilities for repomod
//!
//! Every path that enters the overlay goes through [`canonicalize`] before it
//! is hashed into a [`PathKey`](crate::key::PathKey), so two spellings of the
//! same location always land in the same cache slot. The policy is fixed:
//!
//! - `\` is a separator and is rewritten to `/`
//! - repeated separators collapse and `.` segments are dropped
//! - `..` removes the previous segment lexically (dropped at an absolute root,
//!   kept at the front of a relative path)
//! - trailing separators are removed, except for the root `/`
//! - case is preserved
//! - an empty relative path becomes `.`
//!
//! The helpers used by repomod hooks (`dirname`, `basename`, `join_paths`)
//! validate their input and fail with [`Error::Path`] on malformed strings.

use crate::error::{Error, Result};
use glob::{MatchOptions, Pattern};

const SEPARATOR: char = '/';

/// Canonicalize a path string according to the fixed policy above.
///
/// This never touches the host filesystem and never fails.
pub fn canonicalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with(SEPARATOR);

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Reject path strings that cannot name a location.
pub fn validate(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::Path {
            message: "path is empty".to_string(),
        });
    }
    if path.contains('\0') {
        return Err(Error::Path {
            message: format!("path contains a NUL byte: {:?}", path),
        });
    }
    Ok(())
}

/// Parent directory of `path`, canonicalized.
///
/// The parent of the root is the root; the parent of a single relative
/// segment is `.`.
pub fn dirname(path: &str) -> Result<String> {
    validate(path)?;
    let canonical = canonicalize(path);
    match canonical.rfind(SEPARATOR) {
        Some(0) => Ok("/".to_string()),
        Some(index) => Ok(canonical[..index].to_string()),
        None => Ok(".".to_string()),
    }
}

/// Final segment of `path`. Empty for the root.
pub fn basename(path: &str) -> Result<String> {
    validate(path)?;
    let canonical = canonicalize(path);
    if canonical == "/" {
        return Ok(String::new());
    }
    Ok(canonical
        .rsplit(SEPARATOR)
        .next()
        .unwrap_or_default()
        .to_string())
}

/// Join `segments` onto `base` and canonicalize the result.
///
/// An absolute segment does not reset the join; it is appended like any
/// other segment.
pub fn join_paths(base: &str, segments: &[&str]) -> Result<String> {
    validate(base)?;
    let mut joined = base.to_string();
    for segment in segments {
        validate(segment)?;
        joined.push(SEPARATOR);
        joined.push_str(segment);
    }
    Ok(canonicalize(&joined))
}

/// Path of `path` relative to `base`, if `path` lives under `base`.
pub fn relative_to(base: &str, path: &str) -> Option<String> {
    let base = canonicalize(base);
    let path = canonicalize(path);
    if base == path {
        return Some(String::new());
    }
    let prefix = if base.ends_with(SEPARATOR) {
        base
    } else {
        format!("{}/", base)
    };
    path.strip_prefix(&prefix).map(str::to_string)
}

/// Options used for every glob match: `*` never crosses a separator.
pub fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// Compile a list of glob patterns.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| Pattern::new(pattern).map_err(Error::Glob))
        .collect()
}

/// Match a relative path against a single glob pattern
pub fn glob_match(pattern: &str, path: &str) -> Result<bool> {
    let pattern = Pattern::new(pattern).map_err(Error::Glob)?;
    Ok(pattern.matches_with(path, match_options()))
}

/// True if `relative` matches any include pattern and no exclude pattern.
pub fn selected_by(relative: &str, include: &[Pattern], exclude: &[Pattern]) -> bool {
    let options = match_options();
    include.iter().any(|p| p.matches_with(relative, options))
        && !exclude.iter().any(|p| p.matches_with(relative, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_separators() {
        assert_eq!(canonicalize("/repo//src///main.rs"), "/repo/src/main.rs");
        assert_eq!(canonicalize("\\repo\\src\\main.rs"), "/repo/src/main.rs");
        assert_eq!(canonicalize("/repo/src/"), "/repo/src");
        assert_eq!(canonicalize("/"), "/");
        assert_eq!(canonicalize("//"), "/");
    }

    #[test]
    fn test_canonicalize_dot_segments() {
        assert_eq!(canonicalize("/repo/./src/../lib.rs"), "/repo/lib.rs");
        assert_eq!(canonicalize("/../repo"), "/repo");
        assert_eq!(canonicalize("../repo"), "../repo");
        assert_eq!(canonicalize("a/../../b"), "../b");
        assert_eq!(canonicalize("./"), ".");
        assert_eq!(canonicalize("a/.."), ".");
    }

    #[test]
    fn test_canonicalize_preserves_case() {
        assert_eq!(canonicalize("/Repo/Document.tsx"), "/Repo/Document.tsx");
        assert_ne!(canonicalize("/Repo"), canonicalize("/repo"));
    }

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("/repo/src/main.rs").unwrap(), "/repo/src");
        assert_eq!(dirname("/repo").unwrap(), "/");
        assert_eq!(dirname("/").unwrap(), "/");
        assert_eq!(dirname("main.rs").unwrap(), ".");
        assert_eq!(dirname("src/main.rs").unwrap(), "src");
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("/repo/src/main.rs").unwrap(), "main.rs");
        assert_eq!(basename("/repo/src/").unwrap(), "src");
        assert_eq!(basename("/").unwrap(), "");
        assert_eq!(basename("main.rs").unwrap(), "main.rs");
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(
            join_paths("/repo/a", &["Document.tsx"]).unwrap(),
            "/repo/a/Document.tsx"
        );
        assert_eq!(join_paths("/repo/a", &["..", "b"]).unwrap(), "/repo/b");
        assert_eq!(join_paths("/repo", &["/x"]).unwrap(), "/repo/x");
    }

    #[test]
    fn test_malformed_paths_fail() {
        assert!(matches!(dirname(""), Err(Error::Path { .. })));
        assert!(matches!(basename("a\0b"), Err(Error::Path { .. })));
        assert!(matches!(join_paths("/repo", &[""]), Err(Error::Path { .. })));
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(
            relative_to("/repo", "/repo/src/main.rs"),
            Some("src/main.rs".to_string())
        );
        assert_eq!(relative_to("/repo", "/repo"), Some(String::new()));
        assert_eq!(relative_to("/repo", "/repository/x"), None);
        assert_eq!(relative_to("/", "/a/b"), Some("a/b".to_string()));
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*.rs", "main.rs").unwrap());
        assert!(glob_match("src/*.rs", "src/main.rs").unwrap());
        assert!(!glob_match("*.rs", "main.js").unwrap());
        assert!(!glob_match("*.rs", "src/main.rs").unwrap());
        assert!(glob_match("**/*.rs", "src/path.rs").unwrap());
        assert!(glob_match("**/index.html", "index.html").unwrap());
    }

    #[test]
    fn test_selected_by() {
        let include = compile_patterns(&["**/*.ts".to_string()]).unwrap();
        let exclude = compile_patterns(&["node_modules/**".to_string()]).unwrap();
        assert!(selected_by("src/a.ts", &include, &exclude));
        assert!(!selected_by("node_modules/x/a.ts", &include, &exclude));
        assert!(!selected_by("src/a.js", &include, &exclude));
    }
}
