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

//! Simple command execution
//!
//! A builtin runs in-process with its redirections temporarily installed
//! on fds 1 and 2 and its assignment prefixes applied to the environment
//! for the duration of the call. Anything else forks: the child enters its
//! own process group, resets signal dispositions, applies redirections,
//! and `execvpe`s; the parent registers the job and either waits in the
//! foreground or detaches it to the background.
//!
//! [`wait_foreground`] is the one foreground wait loop, shared with
//! pipelines and the `fg` builtin. It hands the terminal over, waits on
//! the process group with `WUNTRACED`, re-polls signals on `EINTR` so
//! `SIGINT`/`SIGTSTP` reach the foreground job promptly, and tolerates
//! `ECHILD` by reading the result the `SIGCHLD` drain recorded in the job
//! table. The terminal is restored and `fg_pgid` cleared on every path
//! out.

use crate::{builtin, redir};
use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, execvpe, fork, setpgid};
use rayshell_env::job::{Job, JobState};
use rayshell_env::{Env, signal, variable};
use rayshell_syntax::syntax::{Assignment, Command};
use std::ffi::{CStr, CString};
use std::io::Write;

/// Runs one simple command, returning its exit status.
///
/// A background command returns the child's pid rather than a status.
pub fn run(env: &mut Env, command: &Command<String>) -> i32 {
    match builtin::find(&command.name) {
        Some(entry) => run_builtin(env, entry, command),
        None => run_external(env, command),
    }
}

fn run_builtin(env: &mut Env, entry: builtin::Builtin, command: &Command<String>) -> i32 {
    // Anything buffered belongs to the previous fd 1 binding.
    let _ = std::io::stdout().flush();
    let guard = if command.stdout.is_some() || command.stderr.is_some() {
        match redir::Guard::install(command) {
            Ok(guard) => Some(guard),
            Err(error) => {
                eprintln!("rayshell: {error}");
                return 1;
            }
        }
    } else {
        None
    };

    let saved: Vec<(String, Option<String>)> = command
        .assignments
        .iter()
        .map(|a| (a.name.clone(), variable::value(&a.name)))
        .collect();
    for assignment in &command.assignments {
        variable::set(&assignment.name, assignment.value.as_deref().unwrap_or(""));
    }

    let status = entry(env, &command.name, &command.args);

    for (name, old) in saved {
        match old {
            Some(value) => variable::set(&name, &value),
            None => variable::unset(&name),
        }
    }
    let _ = std::io::stdout().flush();
    drop(guard);
    status
}

fn run_external(env: &mut Env, command: &Command<String>) -> i32 {
    let Ok(name) = CString::new(command.name.as_str()) else {
        eprintln!("rayshell: invalid command name");
        return 1;
    };
    let mut argv = vec![name.clone()];
    for arg in &command.args {
        match CString::new(arg.as_str()) {
            Ok(arg) => argv.push(arg),
            Err(_) => {
                eprintln!("rayshell: invalid argument");
                return 1;
            }
        }
    }
    let envp = child_environment(&command.assignments);

    // SAFETY: the shell has no other threads, and the child calls nothing
    // but fd plumbing and exec before `_exit`.
    match unsafe { fork() } {
        Err(error) => {
            eprintln!("rayshell: fork: {error}");
            1
        }
        Ok(ForkResult::Child) => exec_child(command, &name, &argv, &envp),
        Ok(ForkResult::Parent { child }) => {
            // Written on both sides to close the race.
            let _ = setpgid(child, child);
            env.jobs.add(Job::new(child, vec![child], command.to_string()));
            if command.background {
                println!("[{child}] {command} &");
                let _ = std::io::stdout().flush();
                child.as_raw()
            } else {
                wait_foreground(env, child, &[child], false)
            }
        }
    }
}

/// Child side of [`run_external`]: never returns.
fn exec_child(command: &Command<String>, name: &CStr, argv: &[CString], envp: &[CString]) -> ! {
    let _ = setpgid(Pid::from_raw(0), Pid::from_raw(0));
    signal::restore_defaults();
    if let Err(error) = redir::apply(command) {
        eprintln!("rayshell: {error}");
        // SAFETY: `_exit` is the only safe way out of a forked child.
        unsafe { libc::_exit(1) }
    }
    match execvpe(name, argv, envp) {
        Err(Errno::ENOENT) => {
            eprintln!("{}: command not found", command.name);
            unsafe { libc::_exit(127) }
        }
        Err(_) | Ok(_) => unsafe { libc::_exit(1) },
    }
}

/// Environment vector for a child: the current environment with the
/// command's assignment prefixes layered on top
pub(crate) fn child_environment(assignments: &[Assignment<String>]) -> Vec<CString> {
    let mut map: std::collections::BTreeMap<String, String> = std::env::vars_os()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect();
    for assignment in assignments {
        map.insert(
            assignment.name.clone(),
            assignment.value.clone().unwrap_or_default(),
        );
    }
    map.into_iter()
        .filter_map(|(key, value)| CString::new(format!("{key}={value}")).ok())
        .collect()
}

/// Waits for a foreground job, transferring the terminal to it.
///
/// With `resume`, the job is sent `SIGCONT` after the terminal hand-off
/// and marked running (the `fg` path). A job that stops stays in the
/// table, is reported, and leaves `last_status` unchanged; a job that
/// finishes is removed and the status of its last-completed member
/// becomes `last_status`.
pub fn wait_foreground(env: &mut Env, pgid: Pid, pids: &[Pid], resume: bool) -> i32 {
    env.fg_pgid = Some(pgid);
    let previous = env.give_terminal_to(pgid);
    if resume {
        if let Err(error) = killpg(pgid, Signal::SIGCONT) {
            eprintln!("rayshell: kill: {error}");
        }
        if let Some(job) = env.jobs.get_by_pgid_mut(pgid) {
            job.state = JobState::Running;
        }
    }

    let mut status = env.last_status;
    let mut remaining: Vec<Pid> = pids.to_vec();
    // The pipeline's status is its rightmost member's.
    let final_pid = pids.last().copied();
    let mut stopped = false;
    let options = WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
    let group = Pid::from_raw(-pgid.as_raw());

    while !remaining.is_empty() && !stopped {
        match waitpid(group, Some(options)) {
            Ok(WaitStatus::Stopped(pid, _)) => {
                env.jobs.mark_stopped(pgid);
                if let Some(job) = env.jobs.get_by_pgid(pgid) {
                    println!("\n[{pid}] Stopped {}", job.cmdline);
                    let _ = std::io::stdout().flush();
                }
                stopped = true;
            }
            Ok(WaitStatus::Exited(pid, code)) => {
                if Some(pid) == final_pid {
                    status = code;
                }
                note_exit(env, pgid, pid, code, &mut remaining);
            }
            Ok(WaitStatus::Signaled(pid, signal, _)) => {
                if Some(pid) == final_pid {
                    status = 128 + signal as i32;
                }
                note_exit(env, pgid, pid, 128 + signal as i32, &mut remaining);
            }
            Ok(_) => {}
            Err(Errno::EINTR) => env.poll_signals(),
            Err(Errno::ECHILD) => {
                // Lost the race against the SIGCHLD drain; the job table
                // has the result.
                env.poll_signals();
                let recorded = env
                    .jobs
                    .get_by_pgid(pgid)
                    .map(|job| (job.state, job.last_status));
                match recorded {
                    Some((JobState::Stopped, _)) => stopped = true,
                    Some((_, last_status)) => {
                        status = last_status;
                        remaining.clear();
                    }
                    None => remaining.clear(),
                }
            }
            Err(error) => {
                eprintln!("rayshell: waitpid: {error}");
                remaining.clear();
            }
        }
    }

    if !stopped {
        env.jobs.remove(pgid);
        env.last_status = status;
    }
    if let Some(previous) = previous {
        env.restore_terminal(previous);
    }
    env.fg_pgid = None;
    status
}

fn note_exit(env: &mut Env, pgid: Pid, pid: Pid, status: i32, remaining: &mut Vec<Pid>) {
    remaining.retain(|&p| p != pid);
    if let Some(job) = env.jobs.get_by_pgid_mut(pgid) {
        job.record_exit(pid, status);
    }
}
