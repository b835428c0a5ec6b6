//! Object-path naming.
//!
//! Each resolved source file maps to a relative object path inside the
//! project's object directory. The mapping replaces the source extension with
//! `.o` and strips the longest directory prefix shared by every source in the
//! project, so `src/foo/x.cpp` and `src/bar/x.cpp` become `foo/x.o` and
//! `bar/x.o`. When two sources still land on the same object path, stripped
//! parent directories are restored for the colliding entries, innermost
//! first, until their paths diverge; entries whose directories are identical
//! can only differ by extension and keep their full file name instead
//! (`x.cpp` → `x.cpp.o`). The result is a bijection between a project's
//! sources and its object paths.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;

/// Compute one object path per source, unique within the project.
#[must_use]
pub fn object_paths(sources: &[Utf8PathBuf]) -> Vec<Utf8PathBuf> {
    let dirs: Vec<Vec<&str>> = sources.iter().map(|p| dir_components(p)).collect();
    let common = if dirs.iter().any(Vec::is_empty) {
        0
    } else {
        common_prefix_len(&dirs)
    };

    // Per-source disambiguation state: how many stripped components have been
    // restored, and whether the full file name is kept before `.o`.
    let mut restored = vec![0usize; sources.len()];
    let mut full_name = vec![false; sources.len()];

    loop {
        let candidates: Vec<Utf8PathBuf> = sources
            .iter()
            .enumerate()
            .map(|(i, src)| candidate(&dirs[i], common, restored[i], src, full_name[i]))
            .collect();

        let mut groups: HashMap<&Utf8Path, Vec<usize>> = HashMap::new();
        for (i, path) in candidates.iter().enumerate() {
            groups.entry(path.as_path()).or_default().push(i);
        }
        let colliding: Vec<Vec<usize>> = groups
            .into_values()
            .filter(|indices| indices.len() > 1)
            .collect();
        if colliding.is_empty() {
            return candidates;
        }

        let mut progressed = false;
        for group in colliding {
            let first = group.first().copied().unwrap_or_default();
            if group.iter().all(|&i| dirs[i] == dirs[first]) {
                // Same directory throughout: only the extension can differ,
                // so restored components would never separate the group.
                for &i in &group {
                    if !full_name[i] {
                        full_name[i] = true;
                        restored[i] = 0;
                        progressed = true;
                    }
                }
            } else {
                for &i in &group {
                    if restored[i] < common {
                        restored[i] += 1;
                        progressed = true;
                    }
                }
            }
        }
        if !progressed {
            // Identical source paths; nothing further distinguishes them.
            return candidates;
        }
    }
}

fn dir_components(path: &Utf8Path) -> Vec<&str> {
    path.parent()
        .map(|dir| dir.components().map(|c| c.as_str()).collect())
        .unwrap_or_default()
}

fn common_prefix_len(dirs: &[Vec<&str>]) -> usize {
    let Some(first) = dirs.first() else {
        return 0;
    };
    let mut len = first.len();
    for dir in &dirs[1..] {
        let shared = first
            .iter()
            .zip(dir.iter())
            .take_while(|(a, b)| a == b)
            .count();
        len = len.min(shared);
    }
    len
}

fn candidate(
    dir: &[&str],
    common: usize,
    restored: usize,
    source: &Utf8Path,
    full_name: bool,
) -> Utf8PathBuf {
    let keep_from = common.saturating_sub(restored);
    let mut path = Utf8PathBuf::new();
    for part in &dir[keep_from..] {
        path.push(part);
    }
    let name = source.file_name().unwrap_or_else(|| source.as_str());
    path.push(object_file_name(name, full_name));
    path
}

fn object_file_name(name: &str, full_name: bool) -> String {
    if full_name {
        return format!("{name}.o");
    }
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => format!("{stem}.o"),
        _ => format!("{name}.o"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(sources: &[&str]) -> Vec<Utf8PathBuf> {
        sources.iter().map(Utf8PathBuf::from).collect()
    }

    fn objects(sources: &[&str]) -> Vec<Utf8PathBuf> {
        object_paths(&paths(sources))
    }

    #[test]
    fn common_prefix_is_stripped() {
        assert_eq!(
            objects(&["src/a.cpp", "src/sub/b.cpp"]),
            paths(&["a.o", "sub/b.o"])
        );
    }

    #[test]
    fn top_level_source_disables_stripping() {
        assert_eq!(
            objects(&["main.cpp", "src/util.cpp"]),
            paths(&["main.o", "src/util.o"])
        );
    }

    #[test]
    fn identical_basenames_in_sibling_directories_stay_distinct() {
        assert_eq!(
            objects(&["src/foo/x.cpp", "src/bar/x.cpp"]),
            paths(&["foo/x.o", "bar/x.o"])
        );
    }

    #[test]
    fn extension_only_difference_keeps_full_file_name() {
        assert_eq!(
            objects(&["src/x.cpp", "src/x.cc"]),
            paths(&["x.cpp.o", "x.cc.o"])
        );
    }

    #[test]
    fn unrelated_sources_keep_stripped_paths() {
        // Only the shared `src` component is stripped; `gen` and `hand`
        // already separate the identical basenames.
        assert_eq!(
            objects(&["src/gen/x.cpp", "src/hand/x.cpp", "src/main.cpp"]),
            paths(&["gen/x.o", "hand/x.o", "main.o"])
        );
    }

    #[test]
    fn missing_extension_appends_object_suffix() {
        assert_eq!(objects(&["src/script"]), paths(&["script.o"]));
    }

    #[test]
    fn every_project_mapping_is_a_bijection() {
        let sources = [
            "src/a/x.cpp",
            "src/a/x.cc",
            "src/b/x.cpp",
            "src/a.cpp",
            "src/b/a.cpp",
        ];
        let objs = objects(&sources);
        let mut unique: Vec<_> = objs.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), sources.len(), "objects collide: {objs:?}");
    }

    #[test]
    fn empty_source_list_yields_no_objects() {
        assert!(objects(&[]).is_empty());
    }
}
