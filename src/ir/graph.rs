//! Canonical node types and normalization errors.

use std::rc::Rc;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::ast::ProjectKind;

/// A resolved source file together with its optional per-source
/// compile-option override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the generation working directory (or absolute).
    pub path: Utf8PathBuf,
    /// Override for the project-level compile options, when declared.
    pub compile_options: Option<String>,
}

/// A normalized custom build step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomCommand {
    /// Input paths; may be empty.
    pub inputs: Vec<Utf8PathBuf>,
    /// Output paths; never empty after normalization.
    pub outputs: Vec<Utf8PathBuf>,
    /// Command template; `None` means "copy first input to first output".
    pub command: Option<String>,
}

/// A canonical project node.
///
/// Nodes are created once per name per generation run; a project reached
/// from several parents is shared by reference, with the first-normalized
/// instance authoritative. `Prebuilt` declarations never become nodes: their
/// link flags are folded into the consuming parent during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Unique name within one generation run.
    pub name: String,
    /// The project's build role.
    pub kind: ProjectKind,
    /// Resolved source files in resolution order.
    pub sources: Vec<SourceFile>,
    /// Aggregated compile-option string; may be empty.
    pub compile_options: String,
    /// Aggregated link-option string, including absorbed prebuilt flags.
    pub link_options: String,
    /// Normalized non-prebuilt dependencies, in declaration order.
    pub dependencies: Vec<Rc<Project>>,
    /// Command chain run before this project's compile edges.
    pub pre_build: Vec<CustomCommand>,
    /// Command chain run after this project's artifact is produced.
    pub post_build: Vec<CustomCommand>,
}

impl Project {
    /// The paths of this project's sources, in order.
    #[must_use]
    pub fn source_paths(&self) -> Vec<Utf8PathBuf> {
        self.sources.iter().map(|s| s.path.clone()).collect()
    }
}

/// Errors raised while normalizing raw records into canonical projects.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A custom command declared no output path.
    #[error("{project}: output: custom command requires at least one output")]
    EmptyCommandOutput {
        /// Name of the declaring project.
        project: String,
    },
    /// A `prebuilt` project was requested as a generation root.
    #[error("{name}: prebuilt projects contribute link flags only and cannot be generated")]
    PrebuiltRoot {
        /// Name of the offending root.
        name: String,
    },
}
