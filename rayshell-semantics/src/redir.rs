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

//! Redirection plumbing
//!
//! [`apply`] rebinds the current process's standard descriptors according
//! to a command's expanded redirection targets; it runs in forked children
//! just before `exec`. [`Guard`] is the in-process variant used for
//! builtins: it saves the original descriptors and puts them back when
//! dropped, so a failing builtin cannot leave the shell's stdout pointing
//! into a file.

use nix::unistd::{dup, dup2_stderr, dup2_stdin, dup2_stdout};
use rayshell_syntax::syntax::Command;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::OwnedFd;
use std::os::unix::fs::OpenOptionsExt;
use thiserror::Error;

/// Failure to open or install a redirection target
#[derive(Debug, Error)]
#[error("{path}: {error}")]
pub struct RedirError {
    pub path: String,
    pub error: io::Error,
}

impl RedirError {
    fn new(path: &str, error: impl Into<io::Error>) -> Self {
        RedirError { path: path.to_owned(), error: error.into() }
    }
}

/// Applies all of a command's redirections to fds 0, 1, and 2.
pub fn apply(command: &Command<String>) -> Result<(), RedirError> {
    if let Some(path) = &command.stdin {
        let file = File::open(path).map_err(|e| RedirError::new(path, e))?;
        dup2_stdin(&file).map_err(|e| RedirError::new(path, e))?;
    }
    if let Some(path) = &command.stdout {
        let file = open_sink(path, command.stdout_append)?;
        dup2_stdout(&file).map_err(|e| RedirError::new(path, e))?;
    }
    if let Some(path) = &command.stderr {
        let file = open_sink(path, command.stderr_append)?;
        dup2_stderr(&file).map_err(|e| RedirError::new(path, e))?;
    }
    Ok(())
}

fn open_sink(path: &str, append: bool) -> Result<File, RedirError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).mode(0o644);
    if append {
        options.append(true);
    } else {
        options.truncate(true);
    }
    options.open(path).map_err(|e| RedirError::new(path, e))
}

/// Temporary redirection of fds 1 and 2 for an in-process builtin
///
/// Only stdout and stderr are installed; builtins do not read stdin.
/// Dropping the guard restores the original descriptors unconditionally.
#[derive(Debug)]
pub struct Guard {
    saved_stdout: Option<OwnedFd>,
    saved_stderr: Option<OwnedFd>,
}

impl Guard {
    pub fn install(command: &Command<String>) -> Result<Self, RedirError> {
        let mut guard = Guard { saved_stdout: None, saved_stderr: None };
        if let Some(path) = &command.stdout {
            let saved = dup(io::stdout()).map_err(|e| RedirError::new(path, e))?;
            let file = open_sink(path, command.stdout_append)?;
            dup2_stdout(&file).map_err(|e| RedirError::new(path, e))?;
            guard.saved_stdout = Some(saved);
        }
        if let Some(path) = &command.stderr {
            let saved = dup(io::stderr()).map_err(|e| RedirError::new(path, e))?;
            let file = open_sink(path, command.stderr_append)?;
            dup2_stderr(&file).map_err(|e| RedirError::new(path, e))?;
            guard.saved_stderr = Some(saved);
        }
        Ok(guard)
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        if let Some(saved) = self.saved_stdout.take() {
            let _ = dup2_stdout(&saved);
        }
        if let Some(saved) = self.saved_stderr.take() {
            let _ = dup2_stderr(&saved);
        }
    }
}
