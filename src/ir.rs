//! Canonical project structures.
//!
//! This module defines the normalized build graph kanna emits from: raw
//! blueprint records are expanded into [`Project`] nodes with resolved
//! sources, aggregated option strings, and absorbed prebuilt link flags, then
//! flattened into the ordered, deduplicated worklist the generator walks.
//!
//! # Examples
//!
//! ```
//! use kanna::ast::{ProjectKind, ProjectRecord};
//! use kanna::context::GenerationContext;
//! use kanna::fsys::HostFs;
//! use kanna::ir::Normalizer;
//!
//! let record: ProjectRecord =
//!     serde_saphyr::from_str("name: app\ntype: executable").expect("parse");
//! let ctx = GenerationContext::default();
//! let mut normalizer = Normalizer::new(&ctx, &HostFs);
//! let project = normalizer.normalize(&record).expect("normalize");
//! assert_eq!(project.kind, ProjectKind::Executable);
//! ```

mod flatten;
mod graph;
mod normalize;

pub use flatten::{Worklist, flatten};
pub use graph::{CustomCommand, NormalizeError, Project, SourceFile};
pub use normalize::Normalizer;
