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

//! Asynchronous signal recording
//!
//! Signal handlers cannot safely run shell logic, so the handler installed
//! here only writes the signal number into a fixed array of atomic slots.
//! The main loop calls [`take_caught`] at its convenience and dispatches:
//! forwarding `SIGINT`/`SIGTSTP` to the foreground process group and
//! reaping children on `SIGCHLD`. The job table is never touched from
//! handler context.
//!
//! `SIGINT` and `SIGTSTP` are installed without `SA_RESTART` so a blocking
//! `waitpid` in the foreground wait loop returns `EINTR` and the caller
//! gets a chance to forward the signal promptly. `SIGCHLD` restarts
//! interrupted reads; a child exiting must not abort a line edit in
//! progress.

use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use std::ffi::c_int;
use std::sync::atomic::AtomicIsize;
use std::sync::atomic::Ordering;

/// Slots the handler records caught signals into
///
/// All slots start at 0, meaning available. A caught signal occupies the
/// first free slot; a signal already recorded is not recorded twice. With
/// no free slot the signal is lost, which is acceptable: losing a repeat
/// of `SIGCHLD` only means the reaping loop drains one batch later.
static CAUGHT_SIGNALS: [AtomicIsize; 8] = [const { AtomicIsize::new(0) }; 8];

/// Signal catching function
///
/// Only performs the async-signal-safe slot write described above.
extern "C" fn catch_signal(signal: c_int) {
    let signal = signal as isize;
    for slot in &CAUGHT_SIGNALS {
        match slot.compare_exchange(0, signal, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => break,
            Err(occupant) if occupant == signal => break,
            Err(_) => continue,
        }
    }
}

/// Installs the shell's signal dispositions.
///
/// `SIGINT`, `SIGTSTP`, and `SIGCHLD` are caught into the slot array.
/// `SIGTTOU` and `SIGTTIN` are ignored so `tcsetpgrp` from a background
/// process group cannot stop the shell.
pub fn install() {
    let catch = SigAction::new(
        SigHandler::Handler(catch_signal),
        SaFlags::empty(),
        SigSet::empty(),
    );
    let catch_restart = SigAction::new(
        SigHandler::Handler(catch_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());

    // SAFETY: catch_signal only performs atomic stores and the handlers
    // stay valid for the life of the process.
    unsafe {
        let _ = sigaction(Signal::SIGINT, &catch);
        let _ = sigaction(Signal::SIGTSTP, &catch);
        let _ = sigaction(Signal::SIGCHLD, &catch_restart);
        let _ = sigaction(Signal::SIGTTOU, &ignore);
        let _ = sigaction(Signal::SIGTTIN, &ignore);
    }
}

/// Restores default dispositions in a forked child before `exec`.
pub fn restore_defaults() {
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
    // SAFETY: resetting to SIG_DFL installs no handler at all.
    unsafe {
        let _ = sigaction(Signal::SIGINT, &default);
        let _ = sigaction(Signal::SIGTSTP, &default);
        let _ = sigaction(Signal::SIGCHLD, &default);
        let _ = sigaction(Signal::SIGTTOU, &default);
        let _ = sigaction(Signal::SIGTTIN, &default);
    }
}

/// Drains the recorded signals, oldest slots first.
pub fn take_caught() -> Vec<Signal> {
    let mut caught = Vec::new();
    for slot in &CAUGHT_SIGNALS {
        let value = slot.swap(0, Ordering::Relaxed);
        if value != 0 {
            if let Ok(signal) = Signal::try_from(value as c_int) {
                caught.push(signal);
            }
        }
    }
    caught
}
