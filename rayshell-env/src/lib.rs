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

//! Rayshell execution environment
//!
//! [`Env`] bundles the state the executor, builtins, and the read-eval
//! loop share: the [job table](job::JobTable), the last exit status, the
//! shell's own process group, the current foreground process group, the
//! controlling-terminal descriptor, and the history mirror. One `Env` is
//! created in `main` and passed by reference through every stage; nothing
//! in the shell is process-global except the signal slots in [`signal`],
//! which handler context requires.
//!
//! Signals are processed in two halves: the handlers installed by
//! [`signal::install`] record arrivals, and [`Env::poll_signals`] — called
//! from the main loop and from wait loops on `EINTR` — forwards
//! `SIGINT`/`SIGTSTP` to the foreground job and reaps children on
//! `SIGCHLD`.

pub mod job;
pub mod signal;
pub mod variable;

use self::job::{JobTable, Pid};
use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{getpgrp, getpid, tcgetpgrp, tcsetpgrp};
use std::io::IsTerminal;
use std::os::fd::{AsFd, OwnedFd};

/// State shared by the executor, the builtins, and the read-eval loop
#[derive(Debug)]
pub struct Env {
    /// Running and stopped jobs
    pub jobs: JobTable,
    /// Exit status of the last completed command
    pub last_status: i32,
    /// The shell's own process group
    pub shell_pgid: Pid,
    /// Process group currently running in the foreground, if any
    pub fg_pgid: Option<Pid>,
    /// Accepted input lines, mirrored for the `history` builtin
    pub history: Vec<String>,
    /// Controlling terminal, open only when stdin is a terminal
    tty: Option<OwnedFd>,
}

impl Env {
    /// Creates the environment and installs the shell's signal
    /// dispositions.
    ///
    /// The controlling terminal is opened once here; when stdin is not a
    /// terminal (scripts, `-c` without a tty, tests) all terminal hand-off
    /// becomes a no-op.
    pub fn new() -> Self {
        signal::install();
        let tty = if std::io::stdin().is_terminal() {
            std::fs::OpenOptions::new()
                .read(true)
                .write(true)
                .open("/dev/tty")
                .ok()
                .map(OwnedFd::from)
        } else {
            None
        };
        Env {
            jobs: JobTable::default(),
            last_status: 0,
            shell_pgid: getpgrp(),
            fg_pgid: None,
            history: Vec::new(),
            tty,
        }
    }

    /// Process ID of the shell itself
    pub fn shell_pid(&self) -> Pid {
        getpid()
    }

    /// Whether a controlling terminal is available
    pub fn has_terminal(&self) -> bool {
        self.tty.is_some()
    }

    /// Dispatches all signals recorded since the last call.
    ///
    /// `SIGINT` and `SIGTSTP` are forwarded to the foreground process
    /// group when one exists and swallowed otherwise. `SIGCHLD` drains
    /// every currently reapable child into the job table.
    pub fn poll_signals(&mut self) {
        for signal in signal::take_caught() {
            match signal {
                Signal::SIGCHLD => self.reap_children(),
                Signal::SIGINT | Signal::SIGTSTP => {
                    if let Some(pgid) = self.fg_pgid {
                        let _ = killpg(pgid, signal);
                    }
                }
                _ => {}
            }
        }
    }

    /// Reaps all currently waitable children without blocking and records
    /// the results in the job table.
    pub fn reap_children(&mut self) {
        let options =
            WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
        loop {
            match waitpid(None, Some(options)) {
                Ok(WaitStatus::StillAlive) => break,
                Ok(status) => self.jobs.record_wait(status),
                Err(Errno::ECHILD) => break,
                Err(_) => break,
            }
        }
    }

    /// Hands the terminal to the given process group.
    ///
    /// Returns the previous foreground process group so the caller can
    /// restore it, or `None` when there is no terminal. Failures are
    /// reported but never fatal.
    pub fn give_terminal_to(&self, pgid: Pid) -> Option<Pid> {
        let tty = self.tty.as_ref()?;
        let previous = match tcgetpgrp(tty.as_fd()) {
            Ok(pgid) => pgid,
            Err(error) => {
                eprintln!("rayshell: tcgetpgrp: {error}");
                return None;
            }
        };
        match tcsetpgrp(tty.as_fd(), pgid) {
            Ok(()) => Some(previous),
            Err(error) => {
                eprintln!("rayshell: tcsetpgrp: {error}");
                None
            }
        }
    }

    /// Returns the terminal to the given process group, typically the
    /// value [`give_terminal_to`](Self::give_terminal_to) returned.
    pub fn restore_terminal(&self, pgid: Pid) {
        if let Some(tty) = self.tty.as_ref() {
            if let Err(error) = tcsetpgrp(tty.as_fd(), pgid) {
                eprintln!("rayshell: tcsetpgrp: {error}");
            }
        }
    }

    /// Removes finished jobs from the table, returning them with their
    /// pre-removal job numbers for reporting.
    pub fn take_finished_jobs(&mut self) -> Vec<(usize, job::Job)> {
        self.jobs.take_finished()
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Job, JobState};

    #[test]
    fn new_env_has_no_jobs_and_status_zero() {
        let env = Env::new();
        assert!(env.jobs.is_empty());
        assert_eq!(env.last_status, 0);
        assert_eq!(env.fg_pgid, None);
    }

    #[test]
    fn take_finished_jobs_delegates_to_the_table() {
        let mut env = Env::new();
        env.jobs.add(Job::new(
            Pid::from_raw(77),
            vec![Pid::from_raw(77)],
            "sleep 1".to_owned(),
        ));
        env.jobs.mark_done(Pid::from_raw(77));
        let finished = env.take_finished_jobs();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].0, 1);
        assert_eq!(finished[0].1.state, JobState::Done);
        assert!(env.jobs.is_empty());
    }

    #[test]
    fn terminal_hand_off_is_a_no_op_without_a_terminal() {
        // Test runners detach stdin from the terminal, so `tty` is `None`.
        let env = Env::new();
        if !env.has_terminal() {
            assert_eq!(env.give_terminal_to(Pid::from_raw(1)), None);
            env.restore_terminal(Pid::from_raw(1));
        }
    }
}
