use std::fs;

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use tempfile::tempdir;

mod common;
use common::init_env_logger;

fn archon() -> Command {
    let mut cmd = cargo_bin_cmd!("archon");
    // Keep error output free of backtraces and logs.
    cmd.env_remove("RUST_BACKTRACE")
        .env_remove("RUST_LIB_BACKTRACE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn compile_file() {
    init_env_logger();
    let dir = tempdir().unwrap();
    let path = dir.path().join("prog.ks");
    fs::write(&path, "extern sin(x)\ndef f(a) sin(a) * 2;\nf(1)\n").unwrap();

    let output = archon()
        .arg(&path)
        .arg("--module-name")
        .arg("prog")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    expect_test::expect![[r#"
        Read extern:
        declare f64 @sin(f64 %x)
        Read function definition:
        define f64 @f(f64 %a) {
        entry:
          %0 = call f64 @sin(f64 %a)
          %1 = fconst f64 2.0
          %2 = fmul f64 %0, %1
          ret f64 %2
        }
        Read top-level expression:
        define f64 @0() {
        entry:
          %0 = fconst f64 1.0
          %1 = call f64 @f(f64 %0)
          ret f64 %1
        }
        ; ModuleID = 'prog'

        declare f64 @sin(f64 %x)

        define f64 @f(f64 %a) {
        entry:
          %0 = call f64 @sin(f64 %a)
          %1 = fconst f64 2.0
          %2 = fmul f64 %0, %1
          ret f64 %2
        }

        define f64 @0() {
        entry:
          %0 = fconst f64 1.0
          %1 = call f64 @f(f64 %0)
          ret f64 %1
        }
    "#]]
    .assert_eq(&stdout);
}

#[test]
fn errors_fail_the_run() {
    init_env_logger();
    let output = archon()
        .write_stdin("def f(x) y\n1 +\ndef g(x) x\n")
        .output()
        .unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    expect_test::expect![[r#"
        Error: [1:1] semantic error: unknown variable name `y`
        Error: [1:4] syntax error: unknown token `end of input` when expecting an expression
    "#]]
    .assert_eq(&stderr);

    // Later lines still compile.
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("define f64 @g(f64 %x)"));
    assert!(!stdout.contains("@f"));
}

#[test]
fn emit_ast() {
    init_env_logger();
    let output = archon()
        .args(["--emit", "ast"])
        .write_stdin("extern cos(t)\n")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    expect_test::expect![[r#"
        Prototype {
            name: "cos",
            params: [
                "t",
            ],
        }
        ; ModuleID = 'archon'

        declare f64 @cos(f64 %t)
    "#]]
    .assert_eq(&stdout);
}

#[test]
fn missing_file() {
    init_env_logger();
    let dir = tempdir().unwrap();
    archon()
        .arg(dir.path().join("nope.ks"))
        .assert()
        .failure();
}
