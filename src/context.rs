//! Generation-run context.
//!
//! A [`GenerationContext`] carries the per-run state the normalizer,
//! generator, and compile-database emitter consult: the declared and active
//! configuration names, the compile-database toggle, the generation working
//! directory, and the blueprint's own directory for resolving
//! blueprint-relative paths. It is built once by the runner and passed by
//! reference, so no component relies on ambient global state.

use camino::{Utf8Path, Utf8PathBuf};

/// Immutable state for one generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    /// Configuration names declared by the blueprint, in declaration order.
    pub configurations: Vec<String>,
    /// The configuration selected for this run, when any is declared or
    /// requested.
    pub active_configuration: Option<String>,
    /// Whether a compilation database is emitted alongside the build file.
    pub compile_db: bool,
    /// The working directory the generator runs in.
    pub cwd: Utf8PathBuf,
    /// The blueprint file's directory, relative to [`Self::cwd`]; empty when
    /// the blueprint sits in the working directory.
    pub blueprint_dir: Utf8PathBuf,
}

impl GenerationContext {
    /// Resolve a blueprint-relative path string.
    ///
    /// Absolute paths pass through untouched; relative paths are joined onto
    /// the blueprint's directory so that the result stays relative to the
    /// generation working directory.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Utf8PathBuf {
        let candidate = Utf8Path::new(path);
        if candidate.is_absolute() || self.blueprint_dir.as_str().is_empty() {
            candidate.to_path_buf()
        } else {
            self.blueprint_dir.join(candidate)
        }
    }

    /// The working directory in the form Ninja expects inside a build
    /// statement.
    ///
    /// On Windows the drive separator must be escaped (`C:` becomes `C$:`);
    /// elsewhere the path is used verbatim.
    #[must_use]
    pub fn ninja_cwd(&self) -> String {
        #[cfg(windows)]
        {
            let raw = self.cwd.as_str();
            let mut chars = raw.chars();
            match chars.next() {
                Some(drive) => format!("{drive}${}", chars.as_str()),
                None => String::new(),
            }
        }
        #[cfg(not(windows))]
        {
            self.cwd.as_str().to_owned()
        }
    }

    /// Whether `key` names the active configuration.
    #[must_use]
    pub fn is_active_configuration(&self, key: &str) -> bool {
        self.active_configuration.as_deref() == Some(key)
    }

    /// Whether `key` names any declared configuration.
    #[must_use]
    pub fn is_declared_configuration(&self, key: &str) -> bool {
        self.configurations.iter().any(|c| c == key)
    }
}
