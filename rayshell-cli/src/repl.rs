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

//! Interactive read-eval loop
//!
//! Line editing and history are rustyline's; the loop adds rayshell's
//! surface on top: the `rayshell> ` prompt, `exit`/`bye`, `./script`
//! dispatch, finished-job reports before each prompt, and the history
//! file at `~/.rayshell_history` (loaded at startup, appended on every
//! accepted line, saved again on exit).
//!
//! Interrupts never leave the loop: while a foreground job runs, the
//! signal machinery forwards `SIGINT` to it; at the prompt, rustyline
//! reports `Interrupted` and the loop just shows a fresh prompt.

use crate::run;
use rayshell_env::{Env, variable};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;

/// Runs the interactive loop until end of input, returning the shell's
/// exit status.
pub fn repl(env: &mut Env, dump_ast: Option<&str>) -> i32 {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(error) => {
            eprintln!("rayshell: cannot initialize line editing: {error}");
            return 1;
        }
    };
    let history_path =
        variable::value("HOME").map(|home| PathBuf::from(home).join(".rayshell_history"));
    if let Some(path) = &history_path {
        let _ = editor.load_history(path);
    }

    loop {
        env.poll_signals();
        report_finished(env);

        match editor.readline("rayshell> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(&line);
                env.history.push(line.clone());
                if let Some(path) = &history_path {
                    let _ = editor.save_history(path);
                }

                if trimmed == "exit" || trimmed == "bye" {
                    println!("bye-bye");
                    break;
                }
                if trimmed.starts_with("./") {
                    let path = trimmed.split_whitespace().next().unwrap_or(trimmed);
                    let status = run::run_script(env, path, dump_ast);
                    env.last_status = status;
                    continue;
                }
                let _ = run::run_source(env, &line, dump_ast);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(error) => {
                eprintln!("rayshell: {error}");
                break;
            }
        }
    }

    if let Some(path) = &history_path {
        let _ = editor.save_history(path);
    }
    env.last_status
}

fn report_finished(env: &mut Env) {
    for (number, job) in env.take_finished_jobs() {
        println!("[{number}] Done\t{}", job.cmdline);
    }
}
