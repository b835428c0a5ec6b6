//! Ninja file generator.
//!
//! This module converts a flattened [`Worklist`](crate::ir::Worklist) into
//! the textual representation expected by the Ninja build system. The whole
//! file is rendered into a `String` so a failed run never leaves a partially
//! written build description behind, and rendering the same worklist twice
//! yields byte-identical output.
//!
//! The generated file lives in `build/`, so custom-command paths are emitted
//! with a `../` prefix and compile edges reference sources through the
//! generation working directory.

use std::fmt::{self, Write};

use camino::Utf8PathBuf;
use itertools::Itertools;
use thiserror::Error;

use crate::ast::ProjectKind;
use crate::context::GenerationContext;
use crate::ir::{CustomCommand, Project, Worklist};
use crate::objects;

/// Errors raised while generating the build description.
#[derive(Debug, Error)]
pub enum GenError {
    /// Generation was requested with no root projects.
    #[error("generate: expecting at least one project")]
    EmptyRoots,
    /// Formatting into the output buffer failed.
    #[error("failed to render build description")]
    Fmt(#[from] fmt::Error),
}

/// Generate the Ninja build file for `worklist` as a string.
///
/// # Errors
///
/// Returns [`GenError::EmptyRoots`] when no roots were requested.
pub fn generate(worklist: &Worklist, ctx: &GenerationContext) -> Result<String, GenError> {
    if worklist.roots.is_empty() {
        return Err(GenError::EmptyRoots);
    }

    let mut out = String::new();
    write_rules(&mut out)?;
    for project in &worklist.projects {
        emit_project(&mut out, project, ctx)?;
    }
    writeln!(
        out,
        "default {}",
        worklist.roots.iter().map(|r| r.name.as_str()).join(" ")
    )?;
    Ok(out)
}

/// The command used by the `copy` rule.
///
/// Unix systems copy with `cp`; on Windows the generator delegates to its own
/// `cp` subcommand, which also refreshes the destination timestamp so Ninja
/// sees the copy as up to date.
fn copy_command() -> String {
    #[cfg(windows)]
    {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.to_str().map(str::to_owned))
            .map_or_else(|| "copy".to_owned(), |exe| format!("{exe} cp"))
    }
    #[cfg(not(windows))]
    {
        "cp".to_owned()
    }
}

fn write_rules(out: &mut String) -> fmt::Result {
    writeln!(out, "rule cmd")?;
    writeln!(out, "    description = Running ${{cmd}}")?;
    writeln!(out, "    command = cd .. && ${{cmd}}")?;
    writeln!(out)?;
    writeln!(out, "rule copy")?;
    writeln!(out, "    description = Copying ${{in}} to ${{out}}")?;
    writeln!(out, "    command = {} ${{in}} ${{out}}", copy_command())?;
    writeln!(out)?;
    writeln!(out, "rule cxx")?;
    writeln!(out, "    description = Compiling ${{in}}")?;
    writeln!(out, "    deps = gcc")?;
    writeln!(out, "    depfile = ${{out}}.d")?;
    writeln!(
        out,
        "    command = clang++ -fdiagnostics-absolute-paths -fcolor-diagnostics \
         -fansi-escape-codes ${{cxxflags}} -MMD -MF ${{out}}.d -c ${{in}} -o ${{out}}"
    )?;
    writeln!(out)?;
    writeln!(out, "rule lib")?;
    writeln!(out, "    description = Creating ${{out}}")?;
    writeln!(out, "    command = llvm-ar ${{lflags}} ${{out}} ${{in}}")?;
    writeln!(out)?;
    writeln!(out, "rule link")?;
    writeln!(out, "    description = Creating ${{out}}")?;
    writeln!(out, "    command = clang++ ${{lflags}} ${{in}} -o ${{out}}")?;
    writeln!(out)
}

fn emit_project(out: &mut String, project: &Project, ctx: &GenerationContext) -> fmt::Result {
    emit_command_chain(out, &project.pre_build, None)?;

    let objs = objects::object_paths(&project.source_paths());
    emit_compile_edges(out, project, &objs, ctx)?;

    let artifact = match project.kind {
        ProjectKind::Executable => {
            let artifact = executable_artifact(&project.name);
            emit_link_edge(out, project, &objs, "link", &artifact, &project.link_options)?;
            Some(artifact)
        }
        ProjectKind::SharedLibrary => {
            let artifact = shared_library_artifact(&project.name);
            emit_link_edge(out, project, &objs, "link", &artifact, &project.link_options)?;
            Some(artifact)
        }
        ProjectKind::StaticLibrary => {
            let artifact = format!("lib/{}.a", project.name);
            emit_link_edge(out, project, &objs, "lib", &artifact, "rscu")?;
            Some(artifact)
        }
        ProjectKind::Sources => {
            if !objs.is_empty() {
                writeln!(out)?;
            }
            Some(
                objs.iter()
                    .map(|obj| format!("obj/{}/{obj}", project.name))
                    .join(" "),
            )
        }
        ProjectKind::Prebuilt => None,
    };

    let Some(artifact) = artifact else {
        return Ok(());
    };

    emit_command_chain(out, &project.post_build, Some(&artifact))?;

    let alias_target = project
        .post_build
        .last()
        .and_then(|step| step.outputs.first())
        .map_or(artifact, |final_out| format!("../{final_out}"));
    if alias_target.is_empty() {
        writeln!(out, "build {}: phony", project.name)?;
    } else {
        writeln!(out, "build {}: phony {alias_target}", project.name)?;
    }
    writeln!(out)
}

fn executable_artifact(name: &str) -> String {
    if cfg!(windows) {
        format!("bin/{name}.exe")
    } else {
        format!("bin/{name}")
    }
}

fn shared_library_artifact(name: &str) -> String {
    if cfg!(windows) {
        format!("bin/{name}.dll")
    } else {
        format!("bin/{name}.so")
    }
}

fn emit_compile_edges(
    out: &mut String,
    project: &Project,
    objs: &[Utf8PathBuf],
    ctx: &GenerationContext,
) -> fmt::Result {
    let cwd = ctx.ninja_cwd();
    let order_dep = project
        .pre_build
        .last()
        .and_then(|step| step.outputs.first());
    for (source, obj) in project.sources.iter().zip(objs) {
        write!(
            out,
            "build obj/{}/{obj}: cxx {cwd}/{}",
            project.name, source.path
        )?;
        if let Some(dep) = order_dep {
            write!(out, " || ../{dep}")?;
        }
        writeln!(out)?;
        writeln!(
            out,
            "    cxxflags = {}",
            source
                .compile_options
                .as_deref()
                .unwrap_or(&project.compile_options)
        )?;
    }
    Ok(())
}

fn emit_link_edge(
    out: &mut String,
    project: &Project,
    objs: &[Utf8PathBuf],
    rule: &str,
    artifact: &str,
    flags: &str,
) -> fmt::Result {
    write!(out, "build {artifact}: {rule}")?;
    for obj in objs {
        write!(out, " obj/{}/{obj}", project.name)?;
    }
    let mut inputs = Vec::new();
    append_dependency_artifacts(project, &mut inputs);
    for input in &inputs {
        write!(out, " {input}")?;
    }
    if !project.dependencies.is_empty() {
        write!(out, " |")?;
        for dep in &project.dependencies {
            write!(out, " {}", dep.name)?;
        }
    }
    writeln!(out)?;
    if !flags.is_empty() {
        writeln!(out, "    lflags = {flags}")?;
    }
    writeln!(out)
}

/// Collect the artifacts every transitive dependency contributes to a link
/// or archive line: object paths for source collections, archives for
/// libraries. Executables contribute nothing.
fn append_dependency_artifacts(project: &Project, inputs: &mut Vec<String>) {
    for dep in &project.dependencies {
        match dep.kind {
            ProjectKind::Sources => {
                for obj in objects::object_paths(&dep.source_paths()) {
                    inputs.push(format!("obj/{}/{obj}", dep.name));
                }
            }
            ProjectKind::StaticLibrary | ProjectKind::SharedLibrary => {
                inputs.push(format!("lib/{}.a", dep.name));
            }
            ProjectKind::Executable | ProjectKind::Prebuilt => {}
        }
        append_dependency_artifacts(dep, inputs);
    }
}

fn emit_command_chain(
    out: &mut String,
    steps: &[CustomCommand],
    chain: Option<&str>,
) -> fmt::Result {
    for (index, step) in steps.iter().enumerate() {
        let prev = index
            .checked_sub(1)
            .and_then(|i| steps.get(i))
            .and_then(|p| p.outputs.first());
        match &step.command {
            Some(template) => {
                write!(out, "build")?;
                for output in &step.outputs {
                    write!(out, " ../{output}")?;
                }
                write!(out, ": cmd")?;
                for input in &step.inputs {
                    write!(out, " ../{input}")?;
                }
                write_step_deps(out, prev, chain)?;
                writeln!(out)?;
                writeln!(
                    out,
                    "    cmd = {}",
                    render_template(template, &step.inputs, &step.outputs)
                )?;
            }
            None => {
                write!(out, "build")?;
                if let Some(output) = step.outputs.first() {
                    write!(out, " ../{output}")?;
                }
                write!(out, ": copy")?;
                if let Some(input) = step.inputs.first() {
                    write!(out, " ../{input}")?;
                }
                write_step_deps(out, prev, chain)?;
                writeln!(out)?;
            }
        }
    }
    if steps.is_empty() {
        Ok(())
    } else {
        writeln!(out)
    }
}

fn write_step_deps(
    out: &mut String,
    prev: Option<&Utf8PathBuf>,
    chain: Option<&str>,
) -> fmt::Result {
    if let Some(prev) = prev {
        write!(out, " | ../{prev}")?;
    }
    if let Some(chain) = chain {
        write!(out, " || {chain}")?;
    }
    Ok(())
}

/// Render a command template, substituting the first `${in}` and `${out}`
/// with the space-joined input and output lists.
///
/// Surrounding literal text is preserved; a template with neither token is
/// returned verbatim, and a placeholder whose list is empty renders as an
/// empty string.
fn render_template(template: &str, inputs: &[Utf8PathBuf], outputs: &[Utf8PathBuf]) -> String {
    let mut slots: Vec<(usize, usize, String)> = Vec::new();
    if let Some(pos) = template.find("${in}") {
        slots.push((pos, "${in}".len(), inputs.iter().join(" ")));
    }
    if let Some(pos) = template.find("${out}") {
        slots.push((pos, "${out}".len(), outputs.iter().join(" ")));
    }
    slots.sort_by_key(|&(pos, ..)| pos);

    let mut rendered = String::with_capacity(template.len());
    let mut cursor = 0;
    for (pos, token_len, value) in slots {
        rendered.push_str(&template[cursor..pos]);
        rendered.push_str(&value);
        cursor = pos + token_len;
    }
    rendered.push_str(&template[cursor..]);
    rendered
}
