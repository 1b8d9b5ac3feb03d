//! Argument vector for the function process.
//!
//! A command line is split on whitespace only. There is no quoting and no
//! escaping: `sh -c "echo hi"` becomes four arguments, quotes included.
//! Callers that need arguments containing spaces should build the vector
//! with [`CommandLine::from_argv`] instead.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandLineError {
    #[error("command line is empty")]
    Empty,
}

/// Program plus arguments, fixed at startup and reused for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    /// Split `line` on runs of whitespace. The first token is the program.
    pub fn parse(line: &str) -> Result<Self, CommandLineError> {
        Self::from_argv(line.split_whitespace().map(str::to_owned).collect())
    }

    /// Use an explicit argument vector, `argv[0]` being the program.
    pub fn from_argv(argv: Vec<String>) -> Result<Self, CommandLineError> {
        let mut argv = argv.into_iter();
        let program = argv
            .next()
            .filter(|p| !p.is_empty())
            .ok_or(CommandLineError::Empty)?;
        Ok(Self {
            program,
            args: argv.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for CommandLine {
    type Err = CommandLineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
