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

//! Fg built-in
//!
//! The **`fg`** built-in resumes a job in the foreground.
//!
//! # Synopsis
//!
//! ```sh
//! fg [%N]
//! ```
//!
//! # Description
//!
//! The selected job (the most recent one without an operand) is handed
//! the terminal, sent `SIGCONT`, and waited for like any foreground
//! command: a stop puts it back into the table as stopped, completion
//! removes it. The terminal returns to the shell afterwards.
//!
//! # Exit status
//!
//! The resumed job's final wait status; 1 when the job cannot be found.

use crate::command;
use rayshell_env::Env;

/// Entry point of the `fg` built-in
pub fn main(env: &mut Env, _name: &str, args: &[String]) -> i32 {
    if env.jobs.is_empty() {
        eprintln!("fg: no current job");
        return 1;
    }
    let index = match super::job_index(args, env.jobs.len()) {
        Ok(index) => index,
        Err(operand) => {
            eprintln!("fg: {operand}: no such job");
            return 1;
        }
    };
    let Some(job) = env.jobs.get_by_index(index) else {
        eprintln!("fg: {index}: no such job");
        return 1;
    };
    let pgid = job.pgid;
    let pids = job.pids.clone();
    command::wait_foreground(env, pgid, &pids, true)
}
