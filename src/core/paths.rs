//! Foreign-path normalization
//!
//! Location strings in the archives database were recorded on whatever
//! machine did the archiving, so a value may be a Windows drive path, a
//! POSIX path, or a bare relative fragment. The splitters here are pure
//! string functions selected by the *shape* of the input, never by the OS
//! this tool happens to run on; only the final re-rooting join uses local
//! path semantics.

use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Origin-OS shape of a path string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathShape {
    Windows,
    Posix,
    Unknown,
}

fn windows_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z]:\\.+$").expect("static pattern"))
}

fn posix_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/([^/]+/)*[^/]+$").expect("static pattern"))
}

/// Classify a path string by its shape.
pub fn classify(path: &str) -> PathShape {
    if windows_pattern().is_match(path) {
        PathShape::Windows
    } else if posix_pattern().is_match(path) && !path.contains('\\') {
        PathShape::Posix
    } else {
        PathShape::Unknown
    }
}

/// Split a path string of unknown origin into its components.
///
/// Windows-shaped inputs go through the Windows splitter; everything else
/// (POSIX and unknown shapes alike) through the generic splitter.
pub fn split_path(path: &str) -> Vec<String> {
    match classify(path) {
        PathShape::Windows => split_windows(path),
        PathShape::Posix | PathShape::Unknown => split_generic(path),
    }
}

/// Split a Windows-style path on backslashes.
///
/// A UNC prefix (`\\`) or drive token (`X:`) becomes the first component;
/// runs of separators collapse; a bare name with no separators comes back
/// as a single relative component.
pub fn split_windows(path: &str) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut rest = path;

    if let Some(tail) = rest.strip_prefix("\\\\") {
        parts.push("\\\\".to_string());
        rest = tail;
    } else if rest.len() >= 2 && rest.as_bytes()[1] == b':' {
        parts.push(rest[..2].to_string());
        rest = &rest[2..];
    }

    parts.extend(
        rest.split('\\')
            .filter(|segment| !segment.is_empty())
            .map(String::from),
    );

    parts
}

/// Split a POSIX or unknown-shaped path on forward slashes.
///
/// An absolute path keeps its root as the first component, which makes a
/// later re-rooting join discard the mount prefix exactly the way a local
/// absolute join would. The empty string comes back as one empty
/// component; callers are expected to guard against feeding it in.
pub fn split_generic(path: &str) -> Vec<String> {
    if let Some(rest) = path.strip_prefix('/') {
        let mut parts = vec!["/".to_string()];
        parts.extend(
            rest.split('/')
                .filter(|segment| !segment.is_empty())
                .map(String::from),
        );
        return parts;
    }

    let parts: Vec<String> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(String::from)
        .collect();
    if parts.is_empty() {
        return vec![String::new()];
    }
    parts
}

/// Re-root a foreign path under the file-server mount prefix.
///
/// The full split sequence is appended to the prefix, so a drive token in
/// the source value ends up as a subdirectory name under the mount root.
/// That mirrors how these locations have always been recorded and is
/// relied on by the records share layout.
pub fn reroot(path: &str, mount_prefix: &str) -> PathBuf {
    let mut rooted = PathBuf::from(mount_prefix);
    for segment in split_path(path) {
        rooted.push(segment);
    }
    rooted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_classify_shapes() {
        assert_eq!(classify("C:\\PPDO\\Records\\2024\\ABC"), PathShape::Windows);
        assert_eq!(classify("/srv/archives/2024"), PathShape::Posix);
        assert_eq!(classify("archives/2024/site-a"), PathShape::Unknown);
        assert_eq!(classify("\\\\files\\records"), PathShape::Unknown);
        assert_eq!(classify("C:\\"), PathShape::Unknown);
        assert_eq!(classify(""), PathShape::Unknown);
    }

    #[test]
    fn test_split_windows_drive_path() {
        assert_eq!(
            split_path("C:\\PPDO\\Records\\2024\\ABC"),
            vec!["C:", "PPDO", "Records", "2024", "ABC"]
        );
    }

    #[test]
    fn test_split_windows_collapses_separator_runs() {
        assert_eq!(
            split_windows("C:\\PPDO\\\\Records\\"),
            vec!["C:", "PPDO", "Records"]
        );
    }

    #[test]
    fn test_split_windows_unc_prefix() {
        assert_eq!(
            split_windows("\\\\files\\records\\2024"),
            vec!["\\\\", "files", "records", "2024"]
        );
    }

    #[test]
    fn test_split_windows_bare_name() {
        assert_eq!(split_windows("ABC"), vec!["ABC"]);
    }

    #[test]
    fn test_drive_only_input_yields_drive_token() {
        // "C:\" carries no content after the drive, so it classifies as
        // Unknown; the generic splitter still reduces it to one token.
        assert_eq!(split_path("C:\\"), vec!["C:\\"]);
        assert_eq!(split_windows("C:\\"), vec!["C:"]);
    }

    #[test]
    fn test_split_generic_relative() {
        assert_eq!(
            split_path("archives/2024/site-a"),
            vec!["archives", "2024", "site-a"]
        );
    }

    #[test]
    fn test_split_generic_absolute_keeps_root() {
        assert_eq!(split_path("/srv/archives/2024"), vec!["/", "srv", "archives", "2024"]);
    }

    #[test]
    fn test_split_empty_input_is_single_empty_segment() {
        assert_eq!(split_path(""), vec![String::new()]);
    }

    #[test]
    fn test_reroot_embeds_drive_token_under_mount() {
        let rooted = reroot("C:\\PPDO\\Records\\2024\\ABC", "N:\\PPDO\\Records\\");
        let expected = Path::new("N:\\PPDO\\Records\\")
            .join("C:")
            .join("PPDO")
            .join("Records")
            .join("2024")
            .join("ABC");
        assert_eq!(rooted, expected);
    }

    #[test]
    fn test_reroot_relative_fragment() {
        let rooted = reroot("archives/2024/site-a", "N:\\PPDO\\Records\\");
        let expected = Path::new("N:\\PPDO\\Records\\")
            .join("archives")
            .join("2024")
            .join("site-a");
        assert_eq!(rooted, expected);
    }

    #[test]
    fn test_reroot_posix_absolute_resets_to_root() {
        // Joining an absolute component replaces everything before it;
        // a POSIX-absolute source value therefore escapes the mount. The
        // archives rows are not supposed to contain these, but the
        // behavior is pinned down here so nobody trips over it blind.
        #[cfg(unix)]
        assert_eq!(
            reroot("/srv/archives/2024", "N:\\PPDO\\Records\\"),
            PathBuf::from("/srv/archives/2024")
        );
    }
}
