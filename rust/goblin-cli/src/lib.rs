//! Goblin CLI library.
//!
//! The interactive REPL, snippet persistence and the Go toolchain adapters
//! used by the `goblin` binary.

pub mod colors;
pub mod commands;
pub mod config;
pub mod editor;
pub mod go;
pub mod repl;
pub mod session;
pub mod store;
pub mod sys;
