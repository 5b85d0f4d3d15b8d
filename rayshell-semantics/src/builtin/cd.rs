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

//! Cd built-in
//!
//! The **`cd`** (alias **`jump`**) built-in changes the shell's working
//! directory.
//!
//! # Synopsis
//!
//! ```sh
//! cd [directory]
//! ```
//!
//! # Description
//!
//! Without an operand the target is `$HOME`. On success the new working
//! directory is printed.
//!
//! # Exit status
//!
//! Zero on success; 1 when the directory cannot be entered or `HOME` is
//! unset and no operand was given.

use rayshell_env::{Env, variable};

/// Entry point of the `cd` built-in
pub fn main(_env: &mut Env, _name: &str, args: &[String]) -> i32 {
    let target = match args.first() {
        Some(directory) => directory.clone(),
        None => match variable::value("HOME") {
            Some(home) => home,
            None => {
                eprintln!("cd: HOME not set");
                return 1;
            }
        },
    };
    match std::env::set_current_dir(&target) {
        Ok(()) => {
            match std::env::current_dir() {
                Ok(directory) => println!("{}", directory.display()),
                Err(_) => println!("{target}"),
            }
            0
        }
        Err(error) => {
            eprintln!("cd: {error}");
            1
        }
    }
}
