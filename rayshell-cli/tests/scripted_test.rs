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

//! End-to-end tests running the real `rayshell` binary with `-c`.
//!
//! Each test spawns a fresh shell process, so process-global state
//! (working directory, environment, job table) never leaks between
//! cases. Scenarios needing a controlling terminal (`SIGTSTP`, `fg`)
//! are not covered here; the job-control plumbing below them is
//! exercised through background jobs.

use std::process::{Command, Output};

const BIN: &str = env!("CARGO_BIN_EXE_rayshell");

fn run_args(args: &[&str]) -> Output {
    Command::new(BIN).args(args).output().unwrap()
}

fn run(source: &str) -> Output {
    run_args(&["-c", source])
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn echo_builtin_prints_its_arguments() {
    let output = run("echo hello world");
    assert_eq!(stdout_of(&output), "hello world\n");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn pipeline_status_is_the_rightmost_members() {
    let output = run("true | false");
    assert_eq!(output.status.code(), Some(1));

    let output = run("false | true");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn pipeline_carries_data_downstream() {
    let output = run("echo hello | cat");
    assert_eq!(stdout_of(&output), "hello\n");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn three_stage_pipeline() {
    let output = run("echo one | cat | cat");
    assert_eq!(stdout_of(&output), "one\n");
}

#[test]
fn redirection_truncates_and_cat_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out").display().to_string();
    let output = run(&format!("echo hello > {file}"));
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "hello\n");

    let output = run(&format!("cat < {file}"));
    assert_eq!(stdout_of(&output), "hello\n");
}

#[test]
fn truncate_versus_append() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("f").display().to_string();
    run(&format!("echo a > {file}; echo b > {file}"));
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "b\n");

    let file = dir.path().join("g").display().to_string();
    run(&format!("echo a > {file}; echo b >> {file}"));
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "a\nb\n");
}

#[test]
fn stderr_redirection() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("err").display().to_string();
    let output = run(&format!("ls /nonexistent-rayshell-test 2> {file}"));
    assert_ne!(output.status.code(), Some(0));
    assert_eq!(stderr_of(&output), "");
    assert!(!std::fs::read_to_string(&file).unwrap().is_empty());
}

#[test]
fn external_command_redirection() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("ls-out").display().to_string();
    let output = run(&format!("ls / > {file}"));
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "");
    assert!(!std::fs::read_to_string(&file).unwrap().is_empty());
}

#[test]
fn short_circuit_and() {
    let output = run("false && echo X");
    assert_eq!(stdout_of(&output), "");
    assert_ne!(output.status.code(), Some(0));
}

#[test]
fn short_circuit_or() {
    let output = run("false || echo X");
    assert_eq!(stdout_of(&output), "X\n");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn semicolon_sequences_unconditionally() {
    let output = run("false; echo after");
    assert_eq!(stdout_of(&output), "after\n");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn command_not_found_is_127() {
    let output = run("rayshell-no-such-command-xyzzy");
    assert_eq!(output.status.code(), Some(127));
    assert!(stderr_of(&output).contains("command not found"));
}

#[test]
fn variable_assignment_and_reference() {
    let output = run("X=hello\necho @X");
    assert_eq!(stdout_of(&output), "hello\n");
}

#[test]
fn assignment_in_a_sequence_is_visible_to_the_next_command() {
    let output = run("FOO=bar; echo @FOO");
    assert_eq!(stdout_of(&output), "bar\n");
}

#[test]
fn bare_variable_reference_prints_its_value() {
    let output = run("GREETING=hello\n@GREETING");
    assert_eq!(stdout_of(&output), "hello\n");
}

#[test]
fn double_quoted_expansion_is_one_field() {
    let output = run("FOO='1 2'\nprintf %s, \"x=@FOO\"");
    assert_eq!(stdout_of(&output), "x=1 2,");
}

#[test]
fn unquoted_variable_expansion_field_splits() {
    let output = run("FOO='1 2'\nprintf %s, @FOO");
    assert_eq!(stdout_of(&output), "1,2,");
}

#[test]
fn last_status_pseudo_variable() {
    let output = run("false\necho @?");
    assert_eq!(stdout_of(&output), "1\n");
}

#[test]
fn assignment_prefix_reaches_the_child_only() {
    let output = run("RAYSHELL_E2E_PFX=5 env");
    assert!(stdout_of(&output).contains("RAYSHELL_E2E_PFX=5"));

    let output = run("RAYSHELL_E2E_PFX=5 true\necho \"v=@RAYSHELL_E2E_PFX\"");
    assert_eq!(stdout_of(&output), "v=\n");
}

#[test]
fn glob_with_no_match_stays_literal() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = format!("{}/*.none", dir.path().display());
    let output = run(&format!("echo {pattern}"));
    assert_eq!(stdout_of(&output), format!("{pattern}\n"));
}

#[test]
fn glob_expands_against_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "").unwrap();
    std::fs::write(dir.path().join("b.txt"), "").unwrap();
    let output = run(&format!("echo {}/*.txt", dir.path().display()));
    assert_eq!(
        stdout_of(&output),
        format!(
            "{} {}\n",
            dir.path().join("a.txt").display(),
            dir.path().join("b.txt").display()
        )
    );
}

#[test]
fn ambiguous_redirect_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "").unwrap();
    std::fs::write(dir.path().join("b.txt"), "").unwrap();
    let output = run(&format!("echo hi > {}/*.txt", dir.path().display()));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("ambiguous redirect"));
    assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "");
}

#[test]
fn tilde_expands_to_home() {
    if let Ok(home) = std::env::var("HOME") {
        let output = run("echo ~");
        assert_eq!(stdout_of(&output), format!("{home}\n"));
    }
}

#[test]
fn if_takes_the_branch_status() {
    // Corrected semantics: the if reports the executed branch, not the
    // condition.
    let output = run("if (a == a) -> { false }");
    assert_eq!(output.status.code(), Some(1));

    let output = run("if (a == b) -> { false }");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn if_else_takes_the_right_branch() {
    let output = run("if (1 == 2) -> { echo then } else -> { echo else }");
    assert_eq!(stdout_of(&output), "else\n");

    let output = run("if (1 == 1) -> { echo then } else -> { echo else }");
    assert_eq!(stdout_of(&output), "then\n");
}

#[test]
fn elif_chain() {
    let output = run("if (1 == 2) -> { echo a } elif (2 == 2) -> { echo b } else -> { echo c }");
    assert_eq!(stdout_of(&output), "b\n");
}

#[test]
fn numeric_comparison_in_conditions() {
    let output = run("if (9 < 10) -> { echo numeric }");
    assert_eq!(stdout_of(&output), "numeric\n");
}

#[test]
fn variable_comparison_in_conditions() {
    let output = run("X=5\nif (@X == 5) -> { echo eq } else -> { echo ne }");
    assert_eq!(stdout_of(&output), "eq\n");
}

#[test]
fn command_conditions_run_for_their_status() {
    let output = run("if (true) -> { echo yes }");
    assert_eq!(stdout_of(&output), "yes\n");

    let output = run("if (false) -> { echo yes } else -> { echo no }");
    assert_eq!(stdout_of(&output), "no\n");
}

#[test]
fn background_job_is_listed_by_jobs() {
    let output = run("sleep 1 &\njobs");
    let stdout = stdout_of(&output);
    assert!(stdout.contains("running"), "stdout: {stdout}");
    assert!(stdout.contains("sleep 1"), "stdout: {stdout}");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn background_launch_is_announced() {
    let output = run("sleep 1 &");
    let stdout = stdout_of(&output);
    assert!(stdout.starts_with('['), "stdout: {stdout}");
    assert!(stdout.contains("sleep 1 &"), "stdout: {stdout}");
}

#[test]
fn background_command_returns_immediately() {
    let start = std::time::Instant::now();
    run("sleep 5 &");
    assert!(start.elapsed() < std::time::Duration::from_secs(4));
}

#[test]
fn builtin_works_inside_a_pipeline() {
    let output = run("echo piped | cat");
    assert_eq!(stdout_of(&output), "piped\n");
}

#[test]
fn cd_builtin_changes_directory_for_later_commands() {
    let dir = tempfile::tempdir().unwrap();
    let path = std::fs::canonicalize(dir.path()).unwrap();
    let output = run(&format!("cd {}\npwd", path.display()));
    let stdout = stdout_of(&output);
    // cd prints the new directory, then pwd prints it again.
    assert_eq!(
        stdout,
        format!("{}\n{}\n", path.display(), path.display())
    );
}

#[test]
fn hi_builtin_greets() {
    let output = run("hi");
    assert_eq!(
        stdout_of(&output),
        "hey, I don't talk much. I just execute commands.\n"
    );
}

#[test]
fn reserved_words_are_rejected_as_unimplemented() {
    let output = run("for x in a b");
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("not implemented"));
}

#[test]
fn syntax_error_exits_2() {
    let output = run("if (");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn lex_error_exits_2() {
    let output = run("echo 'unterminated");
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("unterminated quote"));
}

#[test]
fn comments_are_ignored() {
    let output = run("echo visible # echo hidden");
    assert_eq!(stdout_of(&output), "visible\n");
}

#[test]
fn script_file_operand_runs_the_script() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("demo.rsh");
    std::fs::write(&script, "echo from-script\nfalse\n").unwrap();
    let output = run_args(&[&script.display().to_string()]);
    assert_eq!(stdout_of(&output), "from-script\n");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn missing_script_exits_127() {
    let output = run_args(&["/nonexistent/rayshell-e2e-script"]);
    assert_eq!(output.status.code(), Some(127));
}

#[test]
fn dump_ast_writes_json() {
    let dir = tempfile::tempdir().unwrap();
    let dump = dir.path().join("ast.json").display().to_string();
    let output = run_args(&["--dump-ast", &dump, "-c", "echo a | cat"]);
    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&dump).unwrap()).unwrap();
    assert_eq!(value["type"], "PIPELINE");
    assert_eq!(value["commands"][0]["name"], serde_json::json!(["WORD", "echo"]));
    assert_eq!(value["background"], false);
}

#[test]
fn version_option_prints_the_version() {
    let output = run_args(&["--version"]);
    assert!(stdout_of(&output).starts_with("rayshell "));
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn unknown_option_exits_2() {
    let output = run_args(&["--frobnicate"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn multiline_input_runs_in_order() {
    let output = run("echo one\necho two\necho three");
    assert_eq!(stdout_of(&output), "one\ntwo\nthree\n");
}

#[test]
fn equals_in_argument_position_is_literal_text() {
    let output = run("echo a=b");
    assert_eq!(stdout_of(&output), "a=b\n");
}

#[test]
fn single_quotes_suppress_expansion() {
    let output = run("X=v\necho '@X'");
    assert_eq!(stdout_of(&output), "@X\n");
}

#[test]
fn shell_pid_expands_to_a_number() {
    let output = run("echo $$");
    let stdout = stdout_of(&output);
    assert!(stdout.trim().parse::<u32>().is_ok(), "stdout: {stdout}");
}
