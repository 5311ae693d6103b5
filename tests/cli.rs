//! Command-line behaviour of the `csindex` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct Sandbox {
    _dir: TempDir,
    base: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("cli")
            .tempdir()
            .expect("Failed to create temp dir");
        let base = dir.path().canonicalize().unwrap();
        fs::create_dir_all(base.join("home")).unwrap();
        fs::create_dir_all(base.join("work/proj/src")).unwrap();
        fs::write(base.join("work/proj/src/main.c"), "int main(void) { return 0; }\n").unwrap();
        fs::write(base.join("work/proj/src/util.h"), "int util(void);\n").unwrap();
        Self { _dir: dir, base }
    }

    fn work(&self) -> PathBuf {
        self.base.join("work")
    }

    fn csindex(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_csindex"))
            .args(args)
            .current_dir(self.work())
            .env("HOME", self.base.join("home"))
            .env("XDG_CONFIG_HOME", self.base.join("home/.config"))
            .env_remove("CSEARCHINDEX")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run csindex")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "csindex failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn no_arguments_prints_usage() {
    let sb = Sandbox::new();
    let output = sb.csindex(&[]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: csindex"));
    assert!(!sb.work().join(".csearchindex").exists());
}

#[test]
fn build_then_list_prints_roots() {
    let sb = Sandbox::new();
    assert_success(&sb.csindex(&["proj"]));
    assert!(sb.work().join(".csearchindex").is_file());

    let listed = sb.csindex(&["-list"]);
    assert_success(&listed);
    assert_eq!(
        stdout(&listed),
        format!("{}\n", sb.work().join("proj").display())
    );
}

#[test]
fn list_finds_index_in_parent_directory() {
    let sb = Sandbox::new();
    assert_success(&sb.csindex(&["proj"]));

    let output = Command::new(env!("CARGO_BIN_EXE_csindex"))
        .arg("-list")
        .current_dir(sb.work().join("proj/src"))
        .env("HOME", sb.base.join("home"))
        .env("XDG_CONFIG_HOME", sb.base.join("home/.config"))
        .env_remove("CSEARCHINDEX")
        .output()
        .unwrap();
    assert_success(&output);
    assert!(stdout(&output).contains("proj"));
}

#[test]
fn reset_without_paths_removes_index() {
    let sb = Sandbox::new();
    assert_success(&sb.csindex(&["proj"]));
    assert!(sb.work().join(".csearchindex").exists());

    assert_success(&sb.csindex(&["-reset"]));
    assert!(!sb.work().join(".csearchindex").exists());
}

#[test]
fn index_directory_flag_places_default_name_inside() {
    let sb = Sandbox::new();
    let idx_dir: &Path = &sb.base.join("indexes");
    fs::create_dir_all(idx_dir).unwrap();

    assert_success(&sb.csindex(&["-d", idx_dir.to_str().unwrap(), "proj"]));

    assert!(idx_dir.join(".csearchindex").is_file());
    assert!(!sb.work().join(".csearchindex").exists());
}

#[test]
fn file_types_flag_accepts_single_dash_form() {
    let sb = Sandbox::new();
    assert_success(&sb.csindex(&["-ft=h", "-verbose", "proj"]));

    let reader = csindex::index::IndexReader::open(&sb.work().join(".csearchindex")).unwrap();
    assert_eq!(reader.names(), &[sb.work().join("proj/src/util.h")]);
}

#[test]
fn list_without_index_fails() {
    let sb = Sandbox::new();
    let output = sb.csindex(&["-list"]);
    assert!(!output.status.success());
}
