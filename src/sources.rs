//! Source pattern resolution.
//!
//! A `sources` entry is a literal path, a single-wildcard pattern, or a
//! recursive pattern. Everything before the wildcard is a directory filter
//! and everything after it is a required filename suffix:
//!
//! - `src/main.cpp` — literal; resolves to itself when the file exists.
//! - `src/*.cpp` — the direct children of `src/` ending in `.cpp`.
//! - `src/**.cpp` — as above, but recursing into every subdirectory.
//!
//! Relative patterns resolve against the blueprint's directory; absolute
//! patterns bypass it. A pattern whose directory filter does not exist
//! resolves to an empty list rather than an error, so a project with no
//! matching sources still normalizes.

use camino::Utf8PathBuf;
use tracing::debug;

use crate::context::GenerationContext;
use crate::fsys::Filesystem;

/// A classified source pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePattern<'a> {
    /// A plain path with no wildcard.
    Literal(&'a str),
    /// A single-level wildcard: directory filter plus filename suffix.
    Wildcard {
        /// Text before the wildcard, treated as a directory path.
        dir: &'a str,
        /// Text after the wildcard, required at the end of each file name.
        suffix: &'a str,
    },
    /// A recursive wildcard over the directory filter and all its
    /// subdirectories.
    Recursive {
        /// Text before the wildcard, treated as a directory path.
        dir: &'a str,
        /// Text after the wildcard, required at the end of each file name.
        suffix: &'a str,
    },
}

/// Classify `pattern` by its wildcard shape.
///
/// A `**` anywhere makes the pattern recursive; otherwise the *last* `*`
/// splits directory filter from suffix; otherwise the pattern is literal.
#[must_use]
pub fn classify(pattern: &str) -> SourcePattern<'_> {
    if let Some(pos) = pattern.find("**") {
        SourcePattern::Recursive {
            dir: &pattern[..pos],
            suffix: &pattern[pos + 2..],
        }
    } else if let Some(pos) = pattern.rfind('*') {
        SourcePattern::Wildcard {
            dir: &pattern[..pos],
            suffix: &pattern[pos + 1..],
        }
    } else {
        SourcePattern::Literal(pattern)
    }
}

/// Expand `pattern` into the concrete source files it names.
///
/// Results preserve filesystem iteration order: a directory's files in
/// file-name order, then its subdirectories in file-name order, so repeated
/// runs over an unchanged tree resolve identically.
pub fn resolve(
    pattern: &str,
    ctx: &GenerationContext,
    fs: &dyn Filesystem,
) -> Vec<Utf8PathBuf> {
    match classify(pattern) {
        SourcePattern::Literal(path) => {
            let resolved = ctx.resolve(path);
            if fs.file_exists(&resolved) {
                vec![resolved]
            } else {
                debug!(pattern, "source file not found");
                Vec::new()
            }
        }
        SourcePattern::Wildcard { dir, suffix } => fs.list_files(&ctx.resolve(dir), suffix),
        SourcePattern::Recursive { dir, suffix } => {
            let mut files = Vec::new();
            collect_recursive(&ctx.resolve(dir), suffix, fs, &mut files);
            files
        }
    }
}

fn collect_recursive(
    dir: &camino::Utf8Path,
    suffix: &str,
    fs: &dyn Filesystem,
    files: &mut Vec<Utf8PathBuf>,
) {
    files.extend(fs.list_files(dir, suffix));
    for sub in fs.list_dirs(dir) {
        collect_recursive(&sub, suffix, fs, files);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsys::HostFs;
    use rstest::rstest;
    use std::fs;

    #[rstest]
    #[case("src/main.cpp", SourcePattern::Literal("src/main.cpp"))]
    #[case(
        "src/*.cpp",
        SourcePattern::Wildcard { dir: "src/", suffix: ".cpp" }
    )]
    #[case(
        "src/**.cpp",
        SourcePattern::Recursive { dir: "src/", suffix: ".cpp" }
    )]
    #[case("src/**", SourcePattern::Recursive { dir: "src/", suffix: "" })]
    #[case("*.c", SourcePattern::Wildcard { dir: "", suffix: ".c" })]
    fn classify_patterns(#[case] pattern: &str, #[case] expected: SourcePattern<'_>) {
        assert_eq!(classify(pattern), expected);
    }

    fn fixture() -> (tempfile::TempDir, GenerationContext) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
        fs::create_dir_all(root.join("src/sub")).expect("mkdir");
        fs::write(root.join("src/a.cpp"), "").expect("write");
        fs::write(root.join("src/b.txt"), "").expect("write");
        fs::write(root.join("src/sub/b.cpp"), "").expect("write");
        let ctx = GenerationContext {
            blueprint_dir: root,
            ..GenerationContext::default()
        };
        (dir, ctx)
    }

    #[test]
    fn literal_resolves_existing_file() {
        let (_guard, ctx) = fixture();
        let resolved = resolve("src/a.cpp", &ctx, &HostFs);
        assert_eq!(resolved, vec![ctx.blueprint_dir.join("src/a.cpp")]);
    }

    #[test]
    fn literal_misses_resolve_empty() {
        let (_guard, ctx) = fixture();
        assert!(resolve("src/missing.cpp", &ctx, &HostFs).is_empty());
    }

    #[test]
    fn wildcard_lists_direct_children_only() {
        let (_guard, ctx) = fixture();
        let resolved = resolve("src/*.cpp", &ctx, &HostFs);
        assert_eq!(resolved, vec![ctx.blueprint_dir.join("src/a.cpp")]);
    }

    #[test]
    fn recursive_wildcard_descends_and_filters_suffix() {
        let (_guard, ctx) = fixture();
        let resolved = resolve("src/**.cpp", &ctx, &HostFs);
        assert_eq!(
            resolved,
            vec![
                ctx.blueprint_dir.join("src/a.cpp"),
                ctx.blueprint_dir.join("src/sub/b.cpp"),
            ]
        );
    }

    #[test]
    fn missing_directory_resolves_empty() {
        let (_guard, ctx) = fixture();
        assert!(resolve("absent/*.cpp", &ctx, &HostFs).is_empty());
        assert!(resolve("absent/**.cpp", &ctx, &HostFs).is_empty());
    }
}
