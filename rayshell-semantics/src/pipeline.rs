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

//! Pipeline execution
//!
//! All members are forked before any is waited on. The first child's pid
//! becomes the process group of the whole pipeline; every later child is
//! placed into that group by both the parent and the child itself, closing
//! the race either way. Each child rewires its stdin/stdout to the
//! adjacent pipe ends, applies its own redirections on top (they win over
//! the pipes), and then either runs a builtin in place or execs.
//!
//! Pipe descriptors are created close-on-exec, so an exec'd member drops
//! every end it does not use without bookkeeping; the parent closes its
//! copies once all members are forked.
//!
//! One job entry covers the pipeline, with the member command lines joined
//! by `" | "`. The pipeline's exit status is the status of its
//! last-completed member.

use crate::{builtin, command, redir};
use itertools::Itertools;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::unistd::{ForkResult, Pid, dup2_stdin, dup2_stdout, execvpe, fork, pipe2, setpgid};
use rayshell_env::job::Job;
use rayshell_env::{Env, signal, variable};
use rayshell_syntax::syntax::{Command, Pipeline};
use std::ffi::CString;
use std::io::Write;
use std::os::fd::OwnedFd;

/// Runs a pipeline, returning its exit status.
///
/// A background pipeline returns the leader's pid rather than a status.
pub fn run(env: &mut Env, pipeline: &Pipeline<String>) -> i32 {
    let count = pipeline.commands.len();
    let mut pipes: Vec<(OwnedFd, OwnedFd)> = Vec::new();
    for _ in 1..count {
        match pipe2(OFlag::O_CLOEXEC) {
            Ok(pair) => pipes.push(pair),
            Err(error) => {
                eprintln!("rayshell: pipe: {error}");
                return 1;
            }
        }
    }

    let mut pids: Vec<Pid> = Vec::new();
    let mut pgid: Option<Pid> = None;
    for (index, member) in pipeline.commands.iter().enumerate() {
        // SAFETY: see `command::run_external`.
        match unsafe { fork() } {
            Err(error) => {
                eprintln!("rayshell: fork: {error}");
                break;
            }
            Ok(ForkResult::Child) => run_member(env, member, index, count, &pipes, pgid),
            Ok(ForkResult::Parent { child }) => {
                let group = pgid.unwrap_or(child);
                pgid = Some(group);
                let _ = setpgid(child, group);
                pids.push(child);
            }
        }
    }
    // The parent keeps no pipe ends.
    drop(pipes);

    let Some(pgid) = pgid else { return 1 };
    let cmdline = pipeline.commands.iter().map(|c| c.to_string()).join(" | ");
    env.jobs.add(Job::new(pgid, pids.clone(), cmdline));

    if pipeline.background {
        let leader = pids[0];
        if let Some(job) = env.jobs.get_by_pgid(pgid) {
            println!("[{leader}] {} &", job.cmdline);
            let _ = std::io::stdout().flush();
        }
        leader.as_raw()
    } else {
        command::wait_foreground(env, pgid, &pids, false)
    }
}

/// Child side of one pipeline member: never returns.
fn run_member(
    env: &mut Env,
    member: &Command<String>,
    index: usize,
    count: usize,
    pipes: &[(OwnedFd, OwnedFd)],
    pgid: Option<Pid>,
) -> ! {
    let _ = setpgid(Pid::from_raw(0), pgid.unwrap_or(Pid::from_raw(0)));
    signal::restore_defaults();

    if index > 0 && dup2_stdin(&pipes[index - 1].0).is_err() {
        // SAFETY: `_exit` is the only safe way out of a forked child.
        unsafe { libc::_exit(1) }
    }
    if index < count - 1 && dup2_stdout(&pipes[index].1).is_err() {
        unsafe { libc::_exit(1) }
    }
    // Per-command redirections win over the pipe ends.
    if let Err(error) = redir::apply(member) {
        eprintln!("rayshell: {error}");
        unsafe { libc::_exit(1) }
    }

    if let Some(entry) = builtin::find(&member.name) {
        // No save/restore in a process about to exit
        for assignment in &member.assignments {
            variable::set(&assignment.name, assignment.value.as_deref().unwrap_or(""));
        }
        let status = entry(env, &member.name, &member.args);
        let _ = std::io::stdout().flush();
        unsafe { libc::_exit(status) }
    }

    let Ok(name) = CString::new(member.name.as_str()) else {
        unsafe { libc::_exit(1) }
    };
    let mut argv = vec![name.clone()];
    for arg in &member.args {
        match CString::new(arg.as_str()) {
            Ok(arg) => argv.push(arg),
            Err(_) => unsafe { libc::_exit(1) },
        }
    }
    let envp = command::child_environment(&member.assignments);
    match execvpe(&name, &argv, &envp) {
        Err(Errno::ENOENT) => {
            eprintln!("{}: command not found", member.name);
            unsafe { libc::_exit(127) }
        }
        Err(_) | Ok(_) => unsafe { libc::_exit(1) },
    }
}
