//! Blueprint loading helpers.
//!
//! A blueprint (`kanna.yml` by default) declares the configurations and root
//! projects of one generation run. Loading is a two-stage parse: the YAML is
//! first read into a JSON value so keys can be inspected, configuration
//! sections merged, and unknown keys reported as warnings, and only then
//! deserialised into the typed records of [`crate::ast`]. A field with the
//! wrong shape or a missing `name`/`type` is a hard error naming the
//! offending project and key; an unrecognised key is logged and dropped.
//!
//! Configuration sections are project keys named after a declared
//! configuration. The active configuration's section has its arrays appended
//! to the project's own fields; sections for inactive configurations are
//! discarded:
//!
//! ```yaml
//! configurations: [debug, release]
//! projects:
//!   - name: app
//!     type: executable
//!     sources: ["src/*.cpp"]
//!     debug:
//!       compile_options: ["-g"]
//!     release:
//!       compile_options: ["-O2"]
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::ast::{ProjectKind, ProjectRecord};
use crate::context::GenerationContext;

/// JSON representation of a blueprint node after YAML parsing.
pub type BlueprintValue = serde_json::Value;

/// Keys every project record understands.
const PROJECT_KEYS: [&str; 9] = [
    "name",
    "type",
    "sources",
    "includes",
    "compile_options",
    "link_options",
    "dependencies",
    "pre_build_commands",
    "post_build_commands",
];

/// Keys valid only on `prebuilt` records.
const PREBUILT_KEYS: [&str; 2] = ["static_libraries", "static_library_directories"];

/// Keys a configuration section may override.
const CONFIG_KEYS: [&str; 7] = [
    "sources",
    "includes",
    "compile_options",
    "link_options",
    "dependencies",
    "static_libraries",
    "static_library_directories",
];

/// Errors raised while loading a blueprint.
#[derive(Debug, Error)]
pub enum BlueprintError {
    /// The blueprint file could not be read.
    #[error("failed to read blueprint at {path}")]
    Read {
        /// Path of the blueprint file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The blueprint is not valid YAML.
    #[error("{path}: failed to parse YAML: {message}")]
    Parse {
        /// Path of the blueprint file.
        path: Utf8PathBuf,
        /// Parser diagnostic.
        message: String,
    },
    /// A required key is absent.
    #[error("{context}: missing key: {key}")]
    MissingKey {
        /// The blueprint or project the key is missing from.
        context: String,
        /// The missing key.
        key: &'static str,
    },
    /// A key is present but its value has the wrong shape.
    #[error("{context}: {key}: {expected}")]
    InvalidValue {
        /// The blueprint or project holding the key.
        context: String,
        /// The offending key.
        key: String,
        /// Description of the expected shape.
        expected: String,
    },
    /// `configurations` was declared empty.
    #[error("configurations: expecting at least one configuration")]
    EmptyConfigurations,
    /// Typed deserialisation of a prepared record failed.
    #[error("{context}: {source}")]
    Record {
        /// The project that failed to deserialise.
        context: String,
        /// Underlying serde diagnostic.
        #[source]
        source: serde_json::Error,
    },
}

/// Read and parse the blueprint at `path` into a raw document value.
///
/// # Errors
///
/// Returns an error when the file cannot be read, is not valid YAML, is not
/// a mapping, or lacks the `projects` key.
pub fn load_document(path: &Utf8Path) -> Result<BlueprintValue, BlueprintError> {
    let text = std::fs::read_to_string(path).map_err(|source| BlueprintError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: BlueprintValue =
        serde_saphyr::from_str(&text).map_err(|e| BlueprintError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let Some(map) = doc.as_object() else {
        return Err(BlueprintError::InvalidValue {
            context: path.to_string(),
            key: "blueprint".to_owned(),
            expected: "expecting a mapping".to_owned(),
        });
    };
    for key in map.keys() {
        if key != "configurations" && key != "projects" {
            warn!(blueprint = %path, key = %key, "unknown key");
        }
    }
    if !map.contains_key("projects") {
        return Err(BlueprintError::MissingKey {
            context: path.to_string(),
            key: "projects",
        });
    }
    Ok(doc)
}

/// Extract the declared configuration names from a loaded document.
///
/// # Errors
///
/// Returns an error when `configurations` is not an array of strings or is
/// declared empty.
pub fn declared_configurations(doc: &BlueprintValue) -> Result<Vec<String>, BlueprintError> {
    let Some(value) = doc.get("configurations") else {
        return Ok(Vec::new());
    };
    let Some(items) = value.as_array() else {
        return Err(BlueprintError::InvalidValue {
            context: "blueprint".to_owned(),
            key: "configurations".to_owned(),
            expected: "expecting array".to_owned(),
        });
    };
    if items.is_empty() {
        return Err(BlueprintError::EmptyConfigurations);
    }
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_owned)
                .ok_or_else(|| BlueprintError::InvalidValue {
                    context: "blueprint".to_owned(),
                    key: "configurations".to_owned(),
                    expected: "expecting array of strings".to_owned(),
                })
        })
        .collect()
}

/// Prepare and deserialise the root project records of a loaded document.
///
/// # Errors
///
/// Returns an error when a record is malformed; see [`BlueprintError`].
pub fn project_records(
    doc: &BlueprintValue,
    ctx: &GenerationContext,
) -> Result<Vec<ProjectRecord>, BlueprintError> {
    let Some(projects) = doc.get("projects").and_then(BlueprintValue::as_array) else {
        return Err(BlueprintError::InvalidValue {
            context: "blueprint".to_owned(),
            key: "projects".to_owned(),
            expected: "expecting array".to_owned(),
        });
    };
    projects
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let mut prepared = value.clone();
            let context = prepare_project(&mut prepared, ctx, &format!("projects[{index}]"))?;
            serde_json::from_value(prepared)
                .map_err(|source| BlueprintError::Record { context, source })
        })
        .collect()
}

/// Validate one project value in place: check `name` and `type`, merge the
/// active configuration section, drop inactive sections, warn on unknown
/// keys, and recurse into dependencies. Returns the project's name for use
/// as error context.
fn prepare_project(
    value: &mut BlueprintValue,
    ctx: &GenerationContext,
    context: &str,
) -> Result<String, BlueprintError> {
    if !value.is_object() {
        return Err(BlueprintError::InvalidValue {
            context: context.to_owned(),
            key: "project".to_owned(),
            expected: "expecting table".to_owned(),
        });
    }

    let name = require_string(value, "name", context)?;
    let kind = require_string(value, "type", context)?;
    if !ProjectKind::NAMES.contains(&kind.as_str()) {
        return Err(BlueprintError::InvalidValue {
            context: name,
            key: "type".to_owned(),
            expected: format!("expecting one of {}", ProjectKind::NAMES.join(", ")),
        });
    }
    let prebuilt = kind == "prebuilt";

    let keys: Vec<String> = value
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default();
    for key in keys {
        if is_project_key(&key, prebuilt) {
            continue;
        }
        if ctx.is_active_configuration(&key) {
            let Some(section) = value.as_object_mut().and_then(|map| map.remove(&key)) else {
                continue;
            };
            merge_configuration_section(value, &section, &key, &name, prebuilt)?;
        } else if ctx.is_declared_configuration(&key) {
            if let Some(map) = value.as_object_mut() {
                map.remove(&key);
            }
        } else {
            warn!(project = %name, key = %key, "unknown key");
            if let Some(map) = value.as_object_mut() {
                map.remove(&key);
            }
        }
    }

    if let Some(deps) = value
        .as_object_mut()
        .and_then(|map| map.get_mut("dependencies"))
        .and_then(BlueprintValue::as_array_mut)
    {
        for (index, dep) in deps.iter_mut().enumerate() {
            prepare_project(dep, ctx, &format!("{name}: dependencies[{index}]"))?;
        }
    }

    Ok(name)
}

fn is_project_key(key: &str, prebuilt: bool) -> bool {
    PROJECT_KEYS.contains(&key) || (prebuilt && PREBUILT_KEYS.contains(&key))
}

fn require_string(
    value: &BlueprintValue,
    key: &'static str,
    context: &str,
) -> Result<String, BlueprintError> {
    match value.get(key) {
        None => Err(BlueprintError::MissingKey {
            context: context.to_owned(),
            key,
        }),
        Some(item) => item
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| BlueprintError::InvalidValue {
                context: context.to_owned(),
                key: key.to_owned(),
                expected: "expecting string".to_owned(),
            }),
    }
}

/// Append the arrays of an active configuration section onto the project's
/// own fields, in section declaration order.
fn merge_configuration_section(
    project: &mut BlueprintValue,
    section: &BlueprintValue,
    section_key: &str,
    project_name: &str,
    prebuilt: bool,
) -> Result<(), BlueprintError> {
    let Some(entries) = section.as_object() else {
        return Err(BlueprintError::InvalidValue {
            context: project_name.to_owned(),
            key: section_key.to_owned(),
            expected: "expecting table".to_owned(),
        });
    };
    for (key, addition) in entries {
        let allowed = CONFIG_KEYS.contains(&key.as_str())
            && (prebuilt || !PREBUILT_KEYS.contains(&key.as_str()));
        if !allowed {
            warn!(project = %project_name, section = section_key, key = %key, "unknown key");
            continue;
        }
        let Some(added) = addition.as_array() else {
            return Err(BlueprintError::InvalidValue {
                context: project_name.to_owned(),
                key: key.clone(),
                expected: "expecting array".to_owned(),
            });
        };
        let Some(map) = project.as_object_mut() else {
            continue;
        };
        match map.get_mut(key.as_str()) {
            None => {
                map.insert(key.clone(), BlueprintValue::Array(added.clone()));
            }
            Some(BlueprintValue::Array(existing)) => {
                existing.extend(added.iter().cloned());
            }
            Some(_) => {
                return Err(BlueprintError::InvalidValue {
                    context: project_name.to_owned(),
                    key: key.clone(),
                    expected: "expecting array".to_owned(),
                });
            }
        }
    }
    Ok(())
}
