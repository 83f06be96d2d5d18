// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running external commands using
//! `tokio::process::Command`.
//!
//! - [`command`] holds [`CommandSpec`], the description of a command line.
//! - [`streamed`] runs a child while draining stdout and stderr
//!   concurrently and handing each line to a [`LineListener`]; used for
//!   test binaries.
//! - [`call`] runs a child with inherited output and returns its exit code;
//!   used for build commands.

pub mod call;
pub mod command;
pub mod streamed;

pub use call::call;
pub use command::{CommandSpec, Redirect};
pub use streamed::{streamed_call, CallOutput, LineListener, Passthrough};
