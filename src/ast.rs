//! Raw blueprint record structures.
//!
//! This module defines the data structures consumed from a parsed blueprint
//! file. They mirror the YAML record shapes a `kanna.yml` declares and are
//! deserialised with `serde` after the blueprint loader has merged
//! configuration sections and reported unknown keys.
//!
//! ```rust
//! use kanna::ast::{ProjectKind, ProjectRecord};
//!
//! let yaml = "name: app\ntype: executable\nsources: [\"src/*.cpp\"]";
//! let record: ProjectRecord = serde_saphyr::from_str(yaml).expect("parse");
//! assert_eq!(record.kind, ProjectKind::Executable);
//! ```

use serde::{Deserialize, Serialize};

/// The build role a declared project plays.
///
/// Wire names use snake case: `sources`, `static_library`, `shared_library`,
/// `executable`, `prebuilt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    /// A bare collection of translation units compiled into whichever project
    /// depends on them; never linked or archived on its own.
    Sources,
    /// Archived into `lib/<name>.a`.
    StaticLibrary,
    /// Linked into a shared object under `bin/`.
    SharedLibrary,
    /// Linked into a binary under `bin/`.
    Executable,
    /// An already-built library; contributes linker flags only.
    Prebuilt,
}

impl ProjectKind {
    /// Wire names accepted for the `type` key, in declaration order.
    pub const NAMES: [&'static str; 5] = [
        "sources",
        "static_library",
        "shared_library",
        "executable",
        "prebuilt",
    ];
}

/// A raw project declaration together with its nested dependency records.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectRecord {
    /// Project name, unique within one generation run.
    pub name: String,
    /// The project's build role.
    #[serde(rename = "type")]
    pub kind: ProjectKind,
    /// Source patterns: literal paths, `*` globs, or `**` globs.
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    /// Include directories, resolved blueprint-relative into `-I` flags.
    #[serde(default)]
    pub includes: Vec<String>,
    /// Compile option fragments, aggregated in declaration order.
    #[serde(default)]
    pub compile_options: Vec<String>,
    /// Link option fragments, aggregated in declaration order.
    #[serde(default)]
    pub link_options: Vec<String>,
    /// Nested dependency declarations.
    #[serde(default)]
    pub dependencies: Vec<ProjectRecord>,
    /// Library names a `prebuilt` project contributes as `-l` flags.
    #[serde(default)]
    pub static_libraries: Vec<String>,
    /// Search directories a `prebuilt` project contributes as `-L` flags.
    #[serde(default)]
    pub static_library_directories: Vec<String>,
    /// Command steps run before the project's compile edges.
    #[serde(default)]
    pub pre_build_commands: Vec<CommandRecord>,
    /// Command steps run after the project's artifact is produced.
    #[serde(default)]
    pub post_build_commands: Vec<CommandRecord>,
}

/// A single `sources` entry: either a bare pattern or a structured entry
/// carrying a per-source compile-option override.
///
/// ```yaml
/// sources:
///   - src/*.cpp
///   - file: src/generated.cpp
///     compile_options: -w
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SourceEntry {
    /// A bare source pattern.
    Pattern(String),
    /// A pattern with a compile-option override applied to every file it
    /// resolves to.
    Detailed {
        /// The source pattern.
        file: String,
        /// Override for the project-level compile options.
        #[serde(default)]
        compile_options: Option<String>,
    },
}

impl SourceEntry {
    /// The pattern text of this entry.
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            Self::Pattern(p) | Self::Detailed { file: p, .. } => p,
        }
    }

    /// The per-source compile-option override, if declared.
    #[must_use]
    pub fn compile_options(&self) -> Option<&str> {
        match self {
            Self::Pattern(_) => None,
            Self::Detailed {
                compile_options, ..
            } => compile_options.as_deref(),
        }
    }
}

/// A raw custom build step.
///
/// `output` is required and must name at least one path. A missing `cmd`
/// means "copy the first input to the first output".
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandRecord {
    /// Input paths, possibly empty.
    #[serde(default)]
    pub input: StringOrList,
    /// Output paths; at least one is required.
    pub output: StringOrList,
    /// Command template, substituting `${in}` and `${out}`.
    #[serde(default)]
    pub cmd: Option<String>,
}

/// A helper for fields that accept either a single string or a list of
/// strings.
///
/// ```yaml
/// # Scalar
/// input: a.txt
/// # Sequence
/// input:
///   - a.txt
///   - b.txt
/// ```
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(untagged)]
pub enum StringOrList {
    /// No value provided.
    #[default]
    Empty,
    /// A single string item.
    String(String),
    /// A list of string items.
    List(Vec<String>),
}

impl StringOrList {
    /// Collect the entries into a vector, mapping each through `f`.
    pub fn map<T, F>(&self, f: F) -> Vec<T>
    where
        F: Fn(&str) -> T,
    {
        match self {
            Self::Empty => Vec::new(),
            Self::String(s) => vec![f(s)],
            Self::List(v) => v.iter().map(|s| f(s)).collect(),
        }
    }

    /// Whether no entry was provided.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::String(_) => false,
            Self::List(v) => v.is_empty(),
        }
    }
}
