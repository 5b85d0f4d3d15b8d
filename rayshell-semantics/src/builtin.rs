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

//! Builtin commands
//!
//! The executor consults [`find`] before considering an external command.
//! Builtins run in the shell process and receive the environment handle so
//! they can inspect and mutate the job table, the last exit status, and
//! terminal state. Several names are aliases: `jump` is `cd`, `cwd` is
//! `pwd`, and `print`/`disp` are `echo`.

pub mod bg;
pub mod cd;
pub mod fg;
pub mod jobs;

use rayshell_env::Env;
use std::io::Write;

/// Calling convention of all builtins: `(env, name, args) -> status`
pub type Builtin = fn(&mut Env, &str, &[String]) -> i32;

/// Looks up a builtin by name.
pub fn find(name: &str) -> Option<Builtin> {
    match name {
        "cd" | "jump" => Some(cd::main),
        "pwd" | "cwd" => Some(pwd),
        "echo" | "print" | "disp" => Some(echo),
        "jobs" => Some(jobs::main),
        "fg" => Some(fg::main),
        "bg" => Some(bg::main),
        "history" => Some(history),
        "hi" => Some(hi),
        _ => None,
    }
}

/// The **`echo`** builtin prints its arguments joined by single spaces.
fn echo(_env: &mut Env, _name: &str, args: &[String]) -> i32 {
    let mut line = args.join(" ");
    line.push('\n');
    let mut stdout = std::io::stdout();
    match stdout.write_all(line.as_bytes()).and_then(|()| stdout.flush()) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("echo: {error}");
            1
        }
    }
}

/// The **`pwd`** builtin prints the current working directory.
fn pwd(_env: &mut Env, _name: &str, _args: &[String]) -> i32 {
    match std::env::current_dir() {
        Ok(dir) => {
            println!("{}", dir.display());
            0
        }
        Err(error) => {
            eprintln!("pwd: {error}");
            1
        }
    }
}

/// The **`history`** builtin prints the accepted input lines, numbered
/// from 1.
fn history(env: &mut Env, _name: &str, _args: &[String]) -> i32 {
    for (number, line) in env.history.iter().enumerate() {
        println!("{:4} {}", number + 1, line);
    }
    0
}

/// The **`hi`** builtin.
fn hi(_env: &mut Env, _name: &str, _args: &[String]) -> i32 {
    println!("hey, I don't talk much. I just execute commands.");
    0
}

/// Parses the optional `%N` operand of `fg`/`bg`.
///
/// A bare `N` is accepted too. Without an operand the most recent job
/// (`fallback`) is chosen. Errors return the offending operand for the
/// caller's message.
pub(crate) fn job_index(args: &[String], fallback: usize) -> Result<usize, String> {
    match args.first() {
        None => Ok(fallback),
        Some(arg) => {
            let digits = arg.strip_prefix('%').unwrap_or(arg);
            digits.parse().map_err(|_| arg.clone())
        }
    }
}
