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

//! Word expansion and command execution for rayshell
//!
//! Two passes live here. The [expansion](expansion::Expander) pass rewrites
//! a parsed `Node<Word>` into a `Node<String>` with all variable
//! references resolved, tildes expanded, fields split, and globs applied.
//! The [execution](execute::run) pass walks the expanded tree, spawning
//! external processes, wiring pipelines, applying redirections, and
//! keeping the job table in the [`rayshell_env::Env`] up to date.
//!
//! Builtin commands are part of this crate (module [`builtin`]) because
//! they share the foreground-wait machinery with the executor.

pub mod builtin;
pub mod command;
pub mod execute;
pub mod expansion;
pub mod pipeline;
pub mod redir;

pub use execute::run;
pub use expansion::{Expander, ExpansionError};
