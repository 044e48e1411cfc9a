//! Pads built from configuration with real interpreter processes

#![cfg(unix)]

use std::path::Path;
use std::process::Command;

use replpad::util::config::{EngineConfig, PluginConfig, ReplConfig};
use replpad::{GuestValue, ReplError, ReplPad};

fn shell(name: &str) -> EngineConfig {
    EngineConfig {
        name: name.to_string(),
        program: "sh".to_string(),
        args: vec!["-c".to_string()],
        preset: None,
        extensions: Some(vec![".sh".to_string()]),
        invoke_template: Some("echo {receiver}".to_string()),
        assign_template: None,
        marker_template: None,
    }
}

fn pad_with(
    plugins: &Path,
    engines: Vec<EngineConfig>,
) -> ReplPad {
    let config = ReplConfig {
        engines,
        ..ReplConfig::default()
    };
    let paths = PluginConfig::default().resolve_with(plugins.to_path_buf());
    ReplPad::build(&config, paths).unwrap()
}

fn shell_pad(plugins: &Path) -> ReplPad {
    pad_with(plugins, vec![shell("sh"), shell("posix")])
}

/// Whether `program` can be started; tests needing it return early otherwise
fn interpreter_available(program: &str) -> bool {
    let found = Command::new(program)
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success());
    if !found {
        eprintln!("skipping: {} is not installed", program);
    }
    found
}

fn run_lines(
    pad: &mut ReplPad,
    lines: &[&str],
) {
    for line in lines {
        pad.type_text(line);
        pad.run_current_line();
    }
}

#[test]
fn test_build_registers_engines_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let pad = shell_pad(dir.path());

    assert_eq!(pad.session().registry().names(), vec!["sh", "posix"]);
    assert_eq!(pad.session().current_name(), "sh");
    assert_eq!(pad.session().inspector_engine_name(), "sh");
    // The default viewer is installed even though no engine loads Ruby
    assert!(dir.path().join("default.viewer.rb").is_file());
}

#[test]
fn test_output_and_switching_with_processes() {
    let dir = tempfile::tempdir().unwrap();
    let mut pad = shell_pad(dir.path());

    for line in ["echo hello", "%posix", "printf 'a\\nb\\n'"] {
        pad.type_text(line);
        pad.run_current_line();
    }

    assert_eq!(
        pad.document().plain_text(),
        "echo hello\nhello\n%posix\nSwitched to posix\nprintf 'a\\nb\\n'\na\nb\n"
    );
}

#[test]
fn test_silent_command_inspects_nil() {
    let dir = tempfile::tempdir().unwrap();
    let mut pad = shell_pad(dir.path());

    pad.type_text("true");
    pad.run_current_line();

    assert_eq!(pad.document().plain_text(), "true\nnil\n");
}

#[test]
fn test_failing_command_renders_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let mut pad = shell_pad(dir.path());

    pad.type_text("echo nope >&2; exit 1");
    pad.run_current_line();

    assert!(pad.document().plain_text().contains("nope"));
}

#[test]
fn test_bound_value_is_visible_to_later_runs() {
    let dir = tempfile::tempdir().unwrap();
    let mut pad = shell_pad(dir.path());

    pad.bind("greeting", GuestValue::Str("hi".to_string()))
        .unwrap();
    pad.type_text("echo $greeting");
    pad.run_current_line();

    assert_eq!(pad.document().plain_text(), "echo $greeting\nhi\n");
}

#[test]
fn test_too_few_engines_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = ReplConfig {
        engines: vec![shell("sh")],
        ..ReplConfig::default()
    };
    let paths = PluginConfig::default().resolve_with(dir.path().to_path_buf());
    let err = ReplPad::build(&config, paths).unwrap_err();
    assert!(matches!(err, ReplError::Config(_)));
}

#[test]
fn test_shell_state_persists_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let mut pad = shell_pad(dir.path());

    run_lines(&mut pad, &["x=41; echo set", "echo $((x + 1))"]);

    assert_eq!(
        pad.document().plain_text(),
        "x=41; echo set\nset\necho $((x + 1))\n42\n"
    );
}

#[test]
fn test_unloadable_default_viewer_does_not_block_build() {
    let dir = tempfile::tempdir().unwrap();
    let mut ghost = shell("ghost");
    ghost.program = "/nonexistent/ruby".to_string();
    ghost.extensions = Some(vec![".rb".to_string()]);

    let pad = pad_with(dir.path(), vec![ghost, shell("sh")]);

    assert!(dir.path().join("default.viewer.rb").is_file());
    assert_eq!(pad.session().current_name(), "ghost");
}

#[test]
fn test_python_assignment_persists_and_silent_runs_show_repr() {
    if !interpreter_available("python3") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let mut pad = pad_with(dir.path(), vec![EngineConfig::python(), shell("sh")]);

    run_lines(&mut pad, &["x = 41", "print(x + 1)", "s = 'text'"]);

    assert_eq!(
        pad.document().plain_text(),
        "x = 41\nNone\nprint(x + 1)\n42\ns = 'text'\nNone\n"
    );
}

#[test]
fn test_python_bindings_read_back_exactly() {
    if !interpreter_available("python3") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let mut pad = pad_with(dir.path(), vec![EngineConfig::python(), shell("sh")]);

    pad.bind("x", GuestValue::Float(f64::INFINITY)).unwrap();
    pad.bind("s", GuestValue::Str("\u{7f}#{x}'\\".to_string())).unwrap();
    assert!(pad.bind("class", GuestValue::Int(1)).is_err());
    assert!(pad.bind("bad name", GuestValue::Int(1)).is_err());

    run_lines(&mut pad, &["print(x)", "print(len(s), s[1:])"]);

    assert_eq!(
        pad.document().plain_text(),
        "print(x)\ninf\nprint(len(s), s[1:])\n7 #{x}'\\\n"
    );
}

#[test]
fn test_ruby_state_and_bindings() {
    if !interpreter_available("ruby") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let mut pad = pad_with(dir.path(), vec![EngineConfig::ruby(), shell("sh")]);

    pad.bind("s", GuestValue::Str("#{1 + 1}".to_string())).unwrap();
    pad.bind("big", GuestValue::Float(f64::NEG_INFINITY)).unwrap();
    run_lines(&mut pad, &["y = 2", "puts y * 21", "puts s", "puts big"]);

    assert_eq!(
        pad.document().plain_text(),
        "y = 2\nnil\nputs y * 21\n42\nputs s\n#{1 + 1}\nputs big\n-Infinity\n"
    );
}
