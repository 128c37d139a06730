//! Shared fixtures for the engine integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use bimbench_core::evaluator::{ScriptUnit, UnitRegistry};
use bimbench_core::model::Question;

pub const STEP_FIXTURE: &str = "ISO-10303-21;\n\
HEADER;\n\
FILE_NAME('fixture.ifc','2024-03-01T10:00:00',(''),(''),'','','');\n\
FILE_SCHEMA(('IFC4'));\n\
ENDSEC;\n\
DATA;\n\
#1=IFCPROJECT('x',$,'Fixture',$,$,$,$,$,$);\n\
#10=IFCWALL('a',$,'Wall-1',$,$,$,$,$,$);\n\
#11=IFCWALL('b',$,'Wall-2',$,$,$,$,$,$);\n\
ENDSEC;\n\
END-ISO-10303-21;\n";

pub fn write_model(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, STEP_FIXTURE).unwrap();
    path
}

pub fn question(id: &str, script: &str) -> Question {
    Question {
        question_id: id.to_string(),
        question_text: format!("question {id}"),
        script_path: script.to_string(),
        difficulty: "easy".to_string(),
        category: None,
        tags: Vec::new(),
    }
}

/// A unit answering a constant after an injected delay, for exercising
/// completion-order independence.
pub fn delayed_unit(name: &str, answer: i64, delay: Duration) -> ScriptUnit {
    ScriptUnit::new(name).with_fn("run", move |_| {
        std::thread::sleep(delay);
        Ok(json!(answer))
    })
}

pub fn registry_of(units: Vec<ScriptUnit>) -> Arc<UnitRegistry> {
    let mut registry = UnitRegistry::new();
    for unit in units {
        registry.register(unit);
    }
    Arc::new(registry)
}
