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

//! Jobs built-in
//!
//! The **`jobs`** built-in lists the jobs in the job table, one per line:
//! `[number] state\tcommand line`. Numbers are the current 1-based table
//! indices, which `fg` and `bg` accept as `%N`.

use rayshell_env::Env;

/// Entry point of the `jobs` built-in
pub fn main(env: &mut Env, _name: &str, _args: &[String]) -> i32 {
    for (number, job) in env.jobs.list().iter().enumerate() {
        println!("[{}] {}\t{}", number + 1, job.state, job.cmdline);
    }
    0
}
