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

//! Bg built-in
//!
//! The **`bg`** built-in resumes a stopped job in the background.
//!
//! # Synopsis
//!
//! ```sh
//! bg [%N]
//! ```
//!
//! # Description
//!
//! The selected job (the most recent one without an operand) is sent
//! `SIGCONT`, marked running, and reported as
//! `[pgid] command line &`.
//!
//! # Exit status
//!
//! Zero unless the job cannot be found or signalled.

use nix::sys::signal::{Signal, killpg};
use rayshell_env::Env;
use rayshell_env::job::JobState;

/// Entry point of the `bg` built-in
pub fn main(env: &mut Env, _name: &str, args: &[String]) -> i32 {
    if env.jobs.is_empty() {
        eprintln!("bg: no current job");
        return 1;
    }
    let index = match super::job_index(args, env.jobs.len()) {
        Ok(index) => index,
        Err(operand) => {
            eprintln!("bg: {operand}: no such job");
            return 1;
        }
    };
    let Some(job) = env.jobs.get_by_index(index) else {
        eprintln!("bg: {index}: no such job");
        return 1;
    };
    let pgid = job.pgid;
    let cmdline = job.cmdline.clone();
    if let Err(error) = killpg(pgid, Signal::SIGCONT) {
        eprintln!("bg: {error}");
        return 1;
    }
    if let Some(job) = env.jobs.get_by_pgid_mut(pgid) {
        job.state = JobState::Running;
    }
    println!("[{pgid}] {cmdline} &");
    0
}
