//! Raw-record-to-canonical-project conversion.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{CommandRecord, ProjectKind, ProjectRecord};
use crate::context::GenerationContext;
use crate::fsys::Filesystem;
use crate::sources;

use super::graph::{CustomCommand, NormalizeError, Project, SourceFile};

/// Converts raw project records into shared canonical [`Project`] nodes.
///
/// The normalizer keeps an insertion-ordered registry of every name it has
/// produced. Normalizing a record whose name is already registered returns
/// the existing node, so a dependency declared under several parents resolves
/// to one shared instance and the first definition wins.
pub struct Normalizer<'a> {
    ctx: &'a GenerationContext,
    fs: &'a dyn Filesystem,
    registry: IndexMap<String, Rc<Project>>,
}

impl<'a> Normalizer<'a> {
    /// Create a normalizer for one generation run.
    #[must_use]
    pub fn new(ctx: &'a GenerationContext, fs: &'a dyn Filesystem) -> Self {
        Self {
            ctx,
            fs,
            registry: IndexMap::new(),
        }
    }

    /// Normalize the requested roots, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::PrebuiltRoot`] when a root is `prebuilt`,
    /// or any error normalization of the tree raises.
    pub fn normalize_roots(
        &mut self,
        records: &[ProjectRecord],
    ) -> Result<Vec<Rc<Project>>, NormalizeError> {
        records
            .iter()
            .map(|record| {
                if record.kind == ProjectKind::Prebuilt {
                    return Err(NormalizeError::PrebuiltRoot {
                        name: record.name.clone(),
                    });
                }
                self.normalize(record)
            })
            .collect()
    }

    /// Normalize one record and its dependency subtree.
    ///
    /// # Errors
    ///
    /// Returns an error when a custom command declares no output.
    pub fn normalize(&mut self, record: &ProjectRecord) -> Result<Rc<Project>, NormalizeError> {
        if let Some(existing) = self.registry.get(&record.name) {
            return Ok(Rc::clone(existing));
        }

        let mut project_sources = Vec::new();
        for entry in &record.sources {
            let overrides = entry.compile_options().map(str::to_owned);
            for path in sources::resolve(entry.pattern(), self.ctx, self.fs) {
                project_sources.push(SourceFile {
                    path,
                    compile_options: overrides.clone(),
                });
            }
        }

        let mut compile_options = record.compile_options.join(" ");
        for include in &record.includes {
            append_option(
                &mut compile_options,
                &format!("-I\"{}\"", self.ctx.resolve(include)),
            );
        }

        let mut link_options = record.link_options.join(" ");
        let mut dependencies = Vec::new();
        for dep in &record.dependencies {
            if dep.kind == ProjectKind::Prebuilt {
                append_option(&mut link_options, &prebuilt_link_flags(dep));
            } else {
                dependencies.push(self.normalize(dep)?);
            }
        }

        let pre_build = convert_commands(&record.pre_build_commands, &record.name, self.ctx)?;
        let post_build = convert_commands(&record.post_build_commands, &record.name, self.ctx)?;

        let project = Rc::new(Project {
            name: record.name.clone(),
            kind: record.kind,
            sources: project_sources,
            compile_options,
            link_options,
            dependencies,
            pre_build,
            post_build,
        });

        // A descendant record may have registered the same name while this
        // node was being built; the first registration stays authoritative.
        let entry = self
            .registry
            .entry(record.name.clone())
            .or_insert(project);
        Ok(Rc::clone(entry))
    }
}

/// Append `addition` to `options`, inserting a separating space when needed.
fn append_option(options: &mut String, addition: &str) {
    if addition.is_empty() {
        return;
    }
    if !options.is_empty() {
        options.push(' ');
    }
    options.push_str(addition);
}

/// Linker flags a `prebuilt` dependency contributes to its parent:
/// `-L"<dir>"` per search directory, then `-l<name>` per library, declared
/// strings kept verbatim.
fn prebuilt_link_flags(record: &ProjectRecord) -> String {
    let mut flags = String::new();
    for dir in &record.static_library_directories {
        append_option(&mut flags, &format!("-L\"{dir}\""));
    }
    for lib in &record.static_libraries {
        append_option(&mut flags, &format!("-l{lib}"));
    }
    flags
}

fn convert_commands(
    records: &[CommandRecord],
    project: &str,
    ctx: &GenerationContext,
) -> Result<Vec<CustomCommand>, NormalizeError> {
    records
        .iter()
        .map(|record| {
            if record.output.is_empty() {
                return Err(NormalizeError::EmptyCommandOutput {
                    project: project.to_owned(),
                });
            }
            Ok(CustomCommand {
                inputs: record.input.map(|s| ctx.resolve(s)),
                outputs: record.output.map(|s| ctx.resolve(s)),
                command: record.cmd.clone(),
            })
        })
        .collect()
}
