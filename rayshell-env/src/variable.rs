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

//! Shell variables
//!
//! Rayshell keeps its variables directly in the process environment, so an
//! assignment is immediately visible to every subsequently spawned child.
//! These wrappers centralize the access: mutation of the process
//! environment is `unsafe` in edition 2024, and the safety argument — the
//! shell mutates it only from the single main loop, never from handler
//! context or worker threads — belongs in one place.

use std::env;

/// Value of the named variable, or `None` if unset
pub fn value(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Value of the named variable, or the empty string if unset
pub fn value_or_empty(name: &str) -> String {
    value(name).unwrap_or_default()
}

/// Sets a variable in the process environment.
pub fn set(name: &str, value: &str) {
    // SAFETY: the shell is single-threaded; nothing reads the environment
    // concurrently with this write.
    unsafe { env::set_var(name, value) }
}

/// Removes a variable from the process environment.
pub fn unset(name: &str) {
    // SAFETY: same single-threaded argument as in `set`.
    unsafe { env::remove_var(name) }
}
