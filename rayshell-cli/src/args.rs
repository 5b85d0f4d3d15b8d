// This file is part of rayshell, an interactive shell with job control.
// Copyright (C) 2026 RayShell Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Command line argument parser for the shell

use thiserror::Error;

/// Input to the main read-eval loop
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Source {
    /// Interactive read-eval loop on standard input
    #[default]
    Stdin,
    /// Run a script file (a plain operand)
    File { path: String },
    /// Run a command string (the `-c` option)
    String(String),
}

/// Configuration for starting the shell
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Run {
    /// Input source
    pub source: Source,
    /// Write every parsed AST to this file as JSON
    pub dump_ast: Option<String>,
}

/// Parse result
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Parse {
    /// Runs the shell
    Run(Run),
    /// Prints the help message and exits
    Help,
    /// Prints version information and exits
    Version,
}

/// Error in command line parsing
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Option that is not defined
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    /// The `-c` option without a command string
    #[error("missing command string for `-c`")]
    MissingCommandString,
    /// The `--dump-ast` option without a file operand
    #[error("missing file name for `--dump-ast`")]
    MissingDumpPath,
    /// More than one source specified
    #[error("unexpected operand `{0}`")]
    UnexpectedOperand(String),
}

/// Parses the command line, including the ignored `argv[0]`.
pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Parse, Error> {
    let mut args = args.into_iter().skip(1);
    let mut dump_ast = None;
    let mut source: Option<Source> = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" => return Ok(Parse::Help),
            "--version" | "-V" => return Ok(Parse::Version),
            "-c" => {
                let Some(command) = args.next() else {
                    return Err(Error::MissingCommandString);
                };
                if source.is_some() {
                    return Err(Error::UnexpectedOperand(command));
                }
                source = Some(Source::String(command));
            }
            "--dump-ast" => {
                let Some(path) = args.next() else {
                    return Err(Error::MissingDumpPath);
                };
                dump_ast = Some(path);
            }
            _ if arg.starts_with('-') && arg.len() > 1 => {
                return Err(Error::UnknownOption(arg));
            }
            _ => {
                if source.is_some() {
                    return Err(Error::UnexpectedOperand(arg));
                }
                source = Some(Source::File { path: arg });
            }
        }
    }
    Ok(Parse::Run(Run { source: source.unwrap_or_default(), dump_ast }))
}
