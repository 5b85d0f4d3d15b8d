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

//! Command-line frontend for rayshell
//!
//! The [`main`] function here is the whole program: it parses the command
//! line, builds the [`rayshell_env::Env`], and hands control to the
//! interactive [`repl`], the `-c` runner, or the script runner. The
//! binary crate's `main` just calls it.

pub mod args;
pub mod repl;
pub mod run;

use self::args::{Parse, Source};
use rayshell_env::Env;

const HELP: &str = "\
Usage: rayshell [--dump-ast FILE] [-c COMMAND | SCRIPT]

Options:
  -c COMMAND       run COMMAND and exit
  --dump-ast FILE  write every parsed AST to FILE as JSON
  --help           print this message and exit
  -V, --version    print version information and exit

Without -c or a SCRIPT operand, rayshell reads commands interactively.";

/// Entry point of the shell
pub fn main() -> ! {
    std::process::exit(run_main())
}

fn run_main() -> i32 {
    let run_config = match args::parse(std::env::args()) {
        Ok(Parse::Help) => {
            println!("{HELP}");
            return 0;
        }
        Ok(Parse::Version) => {
            println!("rayshell {}", env!("CARGO_PKG_VERSION"));
            return 0;
        }
        Ok(Parse::Run(run_config)) => run_config,
        Err(error) => {
            let arg0 = std::env::args().next().unwrap_or_else(|| "rayshell".to_owned());
            eprintln!("{arg0}: {error}");
            return 2;
        }
    };

    let mut env = Env::new();
    let dump_ast = run_config.dump_ast.as_deref();
    match run_config.source {
        Source::Stdin => repl::repl(&mut env, dump_ast),
        Source::String(command) => run::run_command_string(&mut env, &command, dump_ast),
        Source::File { path } => run::run_script(&mut env, &path, dump_ast),
    }
}
