//! CLI execution and command dispatch logic.
//!
//! This module keeps the binary entry point minimal by owning command
//! execution: it loads the blueprint, normalizes and flattens the declared
//! projects, renders the build description in memory, and only then writes
//! it under `build/`, so a failed run never leaves a half-written file for
//! Ninja to consume.

use anyhow::{Context, Result, ensure};
use camino::Utf8Path;
use tracing::{debug, info};

use crate::cli::{Cli, Commands};
use crate::context::GenerationContext;
use crate::fsys::{Filesystem, HostFs};
use crate::ir::{Normalizer, flatten};
use crate::{blueprint, compile_db, ninja_gen};

/// Execute the parsed [`Cli`] commands.
///
/// # Errors
///
/// Returns an error when blueprint loading, normalization, or output
/// writing fails.
pub fn run(cli: &Cli) -> Result<()> {
    match cli.command.clone().unwrap_or(Commands::Generate) {
        Commands::Generate => generate(cli),
        Commands::Cp { src, dst } => copy_file(&src, &dst),
    }
}

fn generate(cli: &Cli) -> Result<()> {
    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir)
            .with_context(|| format!("changing directory to {dir}"))?;
    }

    let fs = HostFs;
    let doc = blueprint::load_document(&cli.file)?;
    let configurations = blueprint::declared_configurations(&doc)?;
    let active_configuration = cli
        .configuration
        .clone()
        .or_else(|| configurations.first().cloned());
    let ctx = GenerationContext {
        configurations,
        active_configuration,
        compile_db: cli.compile_db,
        cwd: fs.current_dir().context("reading working directory")?,
        blueprint_dir: cli
            .file
            .parent()
            .map(Utf8Path::to_path_buf)
            .unwrap_or_default(),
    };

    let records = blueprint::project_records(&doc, &ctx)?;
    if let Ok(dump) = serde_json::to_string_pretty(&records) {
        debug!("records:\n{dump}");
    }

    let mut normalizer = Normalizer::new(&ctx, &fs);
    let roots = normalizer.normalize_roots(&records)?;
    let worklist = flatten(&roots);
    let ninja = ninja_gen::generate(&worklist, &ctx)?;

    let build_dir = Utf8Path::new("build");
    if !fs.dir_exists(build_dir) {
        fs.create_dir(build_dir)
            .with_context(|| format!("creating {build_dir}"))?;
    }
    write_and_log(&build_dir.join("build.ninja"), &ninja)?;
    if ctx.compile_db {
        let db = compile_db::generate(&worklist, &ctx);
        write_and_log(&build_dir.join("compile_commands.json"), &db)?;
    }
    Ok(())
}

/// Write `content` to `path` and log the file's location.
fn write_and_log(path: &Utf8Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("writing {path}"))?;
    info!("generated {path}");
    Ok(())
}

/// Copy `src` to `dst` and refresh the destination's modification time.
///
/// The generated `copy` rule uses this on platforms whose copy tools carry
/// the source timestamp over, which would make Ninja re-run the copy
/// forever.
fn copy_file(src: &Utf8Path, dst: &Utf8Path) -> Result<()> {
    ensure!(src.is_file(), "{src} does not exist");
    std::fs::copy(src, dst).with_context(|| format!("copying {src} to {dst}"))?;
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(dst)
        .with_context(|| format!("opening {dst}"))?;
    file.set_modified(std::time::SystemTime::now())
        .with_context(|| format!("updating timestamp of {dst}"))?;
    Ok(())
}
