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

//! Type definitions for job management
//!
//! A [`Job`] is the set of processes spawned for one command or pipeline,
//! grouped under a common process group. The [`JobTable`] keeps jobs in
//! insertion order; user-visible job numbers are 1-based indices into that
//! order and shift when earlier jobs are removed.
//!
//! The table is only ever mutated from the shell's main loop. The `SIGCHLD`
//! handler merely records that the signal arrived (see [`crate::signal`]);
//! the main loop then reaps children and feeds the resulting
//! [`WaitStatus`] values into [`JobTable::record_wait`].

#[doc(no_inline)]
pub use nix::sys::wait::WaitStatus;
#[doc(no_inline)]
pub use nix::unistd::Pid;

use strum::Display;

/// Lifecycle state of a job
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum JobState {
    Running,
    Stopped,
    Done,
}

/// One or more processes executing a command or pipeline
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Job {
    /// Process group the members run in; always one of `pids`
    pub pgid: Pid,
    /// All member processes, in pipeline order
    pub pids: Vec<Pid>,
    /// Command line the job was started with
    pub cmdline: String,
    /// Current state
    pub state: JobState,
    /// Status of the job's rightmost member, once it has finished
    ///
    /// A pipeline's exit status is its rightmost command's status. A
    /// foreground waiter that finds its child already reaped (`ECHILD`)
    /// reads the result from here.
    pub last_status: i32,
    /// Members that have not been reported exited yet
    pending: Vec<Pid>,
}

impl Job {
    /// Creates a running job.
    pub fn new(pgid: Pid, pids: Vec<Pid>, cmdline: String) -> Self {
        let pending = pids.clone();
        Job {
            pgid,
            pids,
            cmdline,
            state: JobState::Running,
            last_status: 0,
            pending,
        }
    }

    /// Records that one member exited with the given status.
    ///
    /// Only the rightmost member's status is kept. When the last member
    /// exits, the job becomes [`JobState::Done`].
    pub fn record_exit(&mut self, pid: Pid, status: i32) {
        if self.pids.last() == Some(&pid) {
            self.last_status = status;
        }
        self.pending.retain(|&p| p != pid);
        if self.pending.is_empty() {
            self.state = JobState::Done;
        }
    }
}

/// Ordered collection of jobs
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    /// Appends a job.
    pub fn add(&mut self, job: Job) {
        self.jobs.push(job);
    }

    /// Removes the job with the given process group, returning it.
    pub fn remove(&mut self, pgid: Pid) -> Option<Job> {
        let index = self.jobs.iter().position(|j| j.pgid == pgid)?;
        Some(self.jobs.remove(index))
    }

    /// Looks up a job by its 1-based index.
    pub fn get_by_index(&self, index: usize) -> Option<&Job> {
        if index == 0 {
            return None;
        }
        self.jobs.get(index - 1)
    }

    /// Looks up the job containing the given process.
    pub fn get_by_pid(&self, pid: Pid) -> Option<&Job> {
        self.jobs.iter().find(|j| j.pids.contains(&pid))
    }

    /// Looks up the job with the given process group.
    pub fn get_by_pgid(&self, pgid: Pid) -> Option<&Job> {
        self.jobs.iter().find(|j| j.pgid == pgid)
    }

    /// Mutable variant of [`get_by_pgid`](Self::get_by_pgid).
    pub fn get_by_pgid_mut(&mut self, pgid: Pid) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.pgid == pgid)
    }

    /// 1-based index of the job with the given process group
    pub fn index_of_pgid(&self, pgid: Pid) -> Option<usize> {
        self.jobs.iter().position(|j| j.pgid == pgid).map(|i| i + 1)
    }

    /// All jobs, in insertion order
    pub fn list(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Marks the job with the given process group stopped.
    pub fn mark_stopped(&mut self, pgid: Pid) {
        if let Some(job) = self.get_by_pgid_mut(pgid) {
            job.state = JobState::Stopped;
        }
    }

    /// Marks the job with the given process group done.
    pub fn mark_done(&mut self, pgid: Pid) {
        if let Some(job) = self.get_by_pgid_mut(pgid) {
            job.state = JobState::Done;
        }
    }

    /// Applies one `waitpid` result to the table.
    ///
    /// Results for processes the table does not know are ignored; they
    /// belong to children the shell has already stopped tracking.
    pub fn record_wait(&mut self, status: WaitStatus) {
        match status {
            WaitStatus::Stopped(pid, _) => {
                if let Some(job) = self.job_of_pid_mut(pid) {
                    job.state = JobState::Stopped;
                }
            }
            WaitStatus::Continued(pid) => {
                if let Some(job) = self.job_of_pid_mut(pid) {
                    job.state = JobState::Running;
                }
            }
            WaitStatus::Exited(pid, code) => {
                if let Some(job) = self.job_of_pid_mut(pid) {
                    job.record_exit(pid, code);
                }
            }
            WaitStatus::Signaled(pid, signal, _) => {
                if let Some(job) = self.job_of_pid_mut(pid) {
                    job.record_exit(pid, 128 + signal as i32);
                }
            }
            _ => {}
        }
    }

    /// Removes all done jobs, returning them with the 1-based indices they
    /// had before removal.
    pub fn take_finished(&mut self) -> Vec<(usize, Job)> {
        let mut finished = Vec::new();
        let mut kept = Vec::new();
        for (index, job) in self.jobs.drain(..).enumerate() {
            if job.state == JobState::Done {
                finished.push((index + 1, job));
            } else {
                kept.push(job);
            }
        }
        self.jobs = kept;
        finished
    }

    fn job_of_pid_mut(&mut self, pid: Pid) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.pids.contains(&pid))
    }
}
