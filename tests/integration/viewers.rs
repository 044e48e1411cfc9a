//! Viewer loading across a session

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use replpad::repl::{InspectorLoader, ReplPad, Session};
use replpad::GuestValue;

use crate::common::{EmptyViewers, ScriptedEngine};

#[test]
fn test_missing_viewer_is_probed_once() {
    let probes = Rc::new(RefCell::new(0));
    let (ruby, ruby_script) = ScriptedEngine::boxed("ruby", &[".rb"]);
    let (python, _) = ScriptedEngine::boxed("python", &[".py"]);
    let loader = InspectorLoader::new(Box::new(EmptyViewers {
        probes: probes.clone(),
    }));
    let mut session = Session::new(ruby, python, loader);

    let first = session.inspect(&GuestValue::Int(1)).unwrap();
    let second = session.inspect(&GuestValue::Int(1)).unwrap();

    assert_eq!(*probes.borrow(), 1);
    assert_eq!(first, second);
    assert_eq!(ruby_script.borrow().count("require"), 0);
    assert!(session.inspector().is_visited("Integer"));
}

#[test]
fn test_viewer_files_load_into_current_engine_once_per_type() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Integer.viewer.rb"), "class Integer; end").unwrap();
    fs::write(dir.path().join("Integer.viewer.py"), "pass").unwrap();
    fs::write(dir.path().join("String.viewer.py"), "pass").unwrap();

    let (ruby, ruby_script) = ScriptedEngine::boxed("ruby", &[".rb"]);
    let (python, python_script) = ScriptedEngine::boxed("python", &[".py"]);
    let session = Session::new(ruby, python, InspectorLoader::from_dir(dir.path()));
    let mut pad = ReplPad::new(session);
    {
        let mut script = ruby_script.borrow_mut();
        script.returns("1", GuestValue::Int(1));
        script.returns("2", GuestValue::Int(2));
    }
    python_script
        .borrow_mut()
        .returns("'s'", GuestValue::Str("s".to_string()));

    for line in ["1", "2", "%python", "'s'"] {
        pad.type_text(line);
        pad.run_current_line();
    }

    assert_eq!(ruby_script.borrow().count("require Integer.viewer.rb"), 1);
    // Integer was already probed while ruby was current
    assert_eq!(python_script.borrow().count("require Integer.viewer.py"), 0);
    assert_eq!(python_script.borrow().count("require String.viewer.py"), 1);
    assert!(pad.session().inspector().has_viewer("String"));
}

#[test]
fn test_default_viewer_bootstrap_through_config() {
    let dir = tempfile::tempdir().unwrap();
    let plugins = dir.path().join("plugins");
    let (ruby, ruby_script) = ScriptedEngine::boxed("ruby", &[".rb"]);
    let (python, _) = ScriptedEngine::boxed("python", &[".py"]);
    let mut session = Session::new(ruby, python, InspectorLoader::from_dir(plugins.join("Viewers")));

    let loaded = session.bootstrap_plugins(&plugins).unwrap().unwrap();
    assert!(loaded.starts_with(&plugins));
    assert!(fs::read_to_string(&loaded).unwrap().contains("def as_markup"));
    assert_eq!(ruby_script.borrow().calls, vec!["require default.viewer.rb"]);

    // Second bootstrap reuses the installed file
    fs::write(&loaded, "# customized").unwrap();
    session.bootstrap_plugins(&plugins).unwrap();
    assert_eq!(fs::read_to_string(&loaded).unwrap(), "# customized");
}
