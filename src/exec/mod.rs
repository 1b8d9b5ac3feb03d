//! Process execution subsystem.
//!
//! # Data Flow
//! ```text
//! fprocess string
//!     → command.rs (whitespace split → CommandLine)
//!     → executor.rs (spawn, pipe body in, capture combined output)
//!     → Ok(output) | Err(ExecutionError)
//! ```
//!
//! # Design Decisions
//! - One process per call, never reused
//! - Exit code is not reported; success is the absence of an error
//! - Optional concurrency cap and process deadline, both off by default

pub mod command;
pub mod executor;

pub use command::{CommandLine, CommandLineError};
pub use executor::{execute, ExecutionError, Executor};
