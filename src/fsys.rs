//! Filesystem collaborator interface.
//!
//! The source resolver and runner talk to the filesystem through the
//! [`Filesystem`] trait rather than `std::fs` directly, keeping the traversal
//! seam mockable and the resolver's contract explicit: listing a directory
//! that does not exist yields an empty result, never an error.
//!
//! [`HostFs`] is the production implementation, walking directories with
//! `walkdir` in file-name order so resolution output is deterministic.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

/// Synchronous filesystem operations the generator depends on.
pub trait Filesystem {
    /// List the regular files directly inside `dir` whose names end with
    /// `suffix`, in file-name order. A missing directory yields an empty
    /// list.
    fn list_files(&self, dir: &Utf8Path, suffix: &str) -> Vec<Utf8PathBuf>;

    /// List the directories directly inside `dir`, in file-name order. A
    /// missing directory yields an empty list.
    fn list_dirs(&self, dir: &Utf8Path) -> Vec<Utf8PathBuf>;

    /// Whether `path` exists and is a regular file.
    fn file_exists(&self, path: &Utf8Path) -> bool;

    /// Whether `path` exists and is a directory.
    fn dir_exists(&self, path: &Utf8Path) -> bool;

    /// Create the directory `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    fn create_dir(&self, path: &Utf8Path) -> io::Result<()>;

    /// The current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the working directory cannot be read or is not
    /// valid UTF-8.
    fn current_dir(&self) -> io::Result<Utf8PathBuf>;
}

/// [`Filesystem`] implementation backed by the host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostFs;

impl HostFs {
    fn walk_level(dir: &Utf8Path, want_dirs: bool) -> Vec<Utf8PathBuf> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| {
                if want_dirs {
                    entry.file_type().is_dir()
                } else {
                    entry.file_type().is_file()
                }
            })
            .filter_map(|entry| Utf8PathBuf::from_path_buf(entry.into_path()).ok())
            .collect()
    }
}

impl Filesystem for HostFs {
    fn list_files(&self, dir: &Utf8Path, suffix: &str) -> Vec<Utf8PathBuf> {
        Self::walk_level(dir, false)
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .is_some_and(|name| name.ends_with(suffix))
            })
            .collect()
    }

    fn list_dirs(&self, dir: &Utf8Path) -> Vec<Utf8PathBuf> {
        Self::walk_level(dir, true)
    }

    fn file_exists(&self, path: &Utf8Path) -> bool {
        path.is_file()
    }

    fn dir_exists(&self, path: &Utf8Path) -> bool {
        path.is_dir()
    }

    fn create_dir(&self, path: &Utf8Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn current_dir(&self) -> io::Result<Utf8PathBuf> {
        let cwd = std::env::current_dir()?;
        Utf8PathBuf::from_path_buf(cwd)
            .map_err(|p| io::Error::other(format!("non UTF-8 working directory: {}", p.display())))
    }
}
