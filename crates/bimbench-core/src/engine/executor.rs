//! The per-task execution boundary.
//!
//! Everything that can go wrong while answering one question (an unknown
//! script reference, an unreadable model, an evaluator error) collapses
//! into a [`Verdict`] here. Callers never see an `Err`, so one question's
//! failure cannot leak into the scheduler or into other questions.

use std::path::Path;

use crate::evaluator::UnitRegistry;
use crate::model::Verdict;

/// Run one question's evaluator against one model, in the current process.
pub fn execute(registry: &UnitRegistry, model_path: &Path, script_path: &Path) -> Verdict {
    if !model_path.exists() {
        return Verdict::failed(format!("IFC file not found at {}", model_path.display()));
    }

    let callable = match registry.resolve(script_path) {
        Ok(callable) => callable,
        Err(err) => return Verdict::failed(err.to_string()),
    };

    match callable.invoke(model_path, script_path) {
        Ok(value) => Verdict::answered(value),
        Err(err) => Verdict::failed(format!("{err:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::ScriptUnit;
    use anyhow::anyhow;
    use serde_json::json;
    use std::io::Write;

    fn model_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("m.ifc");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(crate::ifc::SAMPLE_STEP.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_model_is_a_failed_verdict() {
        let registry = UnitRegistry::new();
        let verdict = execute(
            &registry,
            Path::new("missing.ifc"),
            Path::new("scripts/001_count_walls.py"),
        );
        match verdict {
            Verdict::Failed { error } => assert!(error.contains("IFC file not found")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn unresolved_reference_is_a_failed_verdict_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let model = model_file(&dir);
        let registry = UnitRegistry::new();
        let verdict = execute(&registry, &model, Path::new("scripts/999_unknown.py"));
        match verdict {
            Verdict::Failed { error } => {
                assert!(error.contains("no script unit registered for '999_unknown'"))
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn evaluator_errors_are_contained_with_their_message() {
        let dir = tempfile::tempdir().unwrap();
        let model = model_file(&dir);
        let mut registry = UnitRegistry::new();
        registry.register(
            ScriptUnit::new("050_explode")
                .with_fn("explode", |_| Err(anyhow!("quantity set missing"))),
        );
        let verdict = execute(&registry, &model, Path::new("scripts/050_explode.py"));
        assert_eq!(verdict, Verdict::failed("quantity set missing"));
    }

    #[test]
    fn successful_evaluations_carry_their_value() {
        let dir = tempfile::tempdir().unwrap();
        let model = model_file(&dir);
        let mut registry = UnitRegistry::new();
        registry.register(ScriptUnit::new("051_const").with_fn("run", |_| Ok(json!(12.5))));
        let verdict = execute(&registry, &model, Path::new("scripts/051_const.py"));
        assert_eq!(verdict, Verdict::answered(json!(12.5)));
    }
}
