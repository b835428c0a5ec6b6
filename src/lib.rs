//! kanna core library.
//!
//! This library turns YAML project blueprints into Ninja build descriptions:
//! raw records are normalized into a canonical dependency graph, flattened
//! into a deduplicated worklist, and emitted as `build/build.ninja` with an
//! optional compilation database.

pub mod ast;
pub mod blueprint;
pub mod cli;
pub mod compile_db;
pub mod context;
pub mod fsys;
pub mod ir;
pub mod ninja_gen;
pub mod objects;
pub mod runner;
pub mod sources;
