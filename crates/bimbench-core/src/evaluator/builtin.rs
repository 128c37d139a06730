//! Builtin script units.
//!
//! Shallow, text-level statistics over the model probe, mirroring common
//! catalog entries, plus two harness probes (`990_echo_model`, `991_stall`)
//! used to exercise the worker protocol and timeout handling end to end.

use std::path::Path;

use serde_json::{json, Map, Value};

use super::{ScriptUnit, UnitRegistry};
use crate::ifc::ModelFile;

/// Element classes checked by the distinct-type census. Mirrors the
/// catalog's notion of "building element", not the full schema.
const ELEMENT_CLASSES: [&str; 19] = [
    "IFCWALL",
    "IFCSLAB",
    "IFCROOF",
    "IFCCOLUMN",
    "IFCBEAM",
    "IFCDOOR",
    "IFCWINDOW",
    "IFCSTAIR",
    "IFCRAILING",
    "IFCCURTAINWALL",
    "IFCFURNISHINGELEMENT",
    "IFCBUILDINGELEMENTPROXY",
    "IFCCOVERING",
    "IFCFLOWTERMINAL",
    "IFCFLOWSEGMENT",
    "IFCFLOWFITTING",
    "IFCDISTRIBUTIONELEMENT",
    "IFCSPACE",
    "IFCOPENINGELEMENT",
];

/// Env var read by the stall probe; seconds to sleep (default 3600).
pub const STALL_SECS_ENV: &str = "BIMBENCH_STALL_SECS";

/// The standard unit set shipped with the harness.
pub fn registry() -> UnitRegistry {
    let mut reg = UnitRegistry::new();

    reg.register(
        ScriptUnit::new("000_model_schema").with_fn("run", |model| {
            let model = ModelFile::open(model)?;
            Ok(json!(model.header().schema))
        }),
    );
    reg.register(
        ScriptUnit::new("001_count_walls").with_fn("count_walls", |model| {
            count_of_types(model, &["IFCWALL", "IFCWALLSTANDARDCASE"])
        }),
    );
    reg.register(
        ScriptUnit::new("013_count_columns")
            .with_fn("count_columns", |model| count_of_types(model, &["IFCCOLUMN"])),
    );
    reg.register(
        ScriptUnit::new("018_count_element_types").with_fn("count_element_types", |model| {
            let model = ModelFile::open(model)?;
            let distinct = ELEMENT_CLASSES
                .iter()
                .filter(|class| model.count_of(class) > 0)
                .count();
            Ok(json!(distinct))
        }),
    );
    reg.register(
        ScriptUnit::new("026_count_structural_elements").with_fn(
            "count_structural_elements",
            |model| count_of_types(model, &["IFCBEAM", "IFCCOLUMN", "IFCSLAB", "IFCFOOTING"]),
        ),
    );
    reg.register(
        ScriptUnit::new("900_entity_inventory").with_fn("process", |model| {
            let model = ModelFile::open(model)?;
            let mut counts = Map::new();
            for (type_name, count) in model.type_counts() {
                counts.insert(type_name.to_string(), json!(count));
            }
            Ok(Value::Object(counts))
        }),
    );

    // Harness probes.
    reg.register(
        ScriptUnit::new("990_echo_model").with_legacy_fn("echo_model", |model, script| {
            Ok(json!({
                "model": model.display().to_string(),
                "script": script.display().to_string(),
            }))
        }),
    );
    reg.register(ScriptUnit::new("991_stall").with_fn("stall", |_model| {
        let secs = std::env::var(STALL_SECS_ENV)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(3600);
        std::thread::sleep(std::time::Duration::from_secs(secs));
        Ok(Value::Null)
    }));

    reg
}

fn count_of_types(model_path: &Path, types: &[&str]) -> anyhow::Result<Value> {
    let model = ModelFile::open(model_path)?;
    let total: usize = types.iter().map(|t| model.count_of(t)).sum();
    Ok(json!(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ifc::SAMPLE_STEP;
    use serde_json::json;
    use std::io::Write;

    fn sample_model(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("house.ifc");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(SAMPLE_STEP.as_bytes()).unwrap();
        path
    }

    fn answer(reference: &str, model: &Path) -> Value {
        let reg = registry();
        reg.resolve(Path::new(reference))
            .unwrap()
            .invoke(model, Path::new(reference))
            .unwrap()
    }

    #[test]
    fn wall_count_includes_standard_cases() {
        let dir = tempfile::tempdir().unwrap();
        let model = sample_model(&dir);
        assert_eq!(answer("scripts/001_count_walls.py", &model), json!(3));
    }

    #[test]
    fn element_type_census_counts_distinct_classes() {
        let dir = tempfile::tempdir().unwrap();
        let model = sample_model(&dir);
        // Walls, one column, one space, one door.
        assert_eq!(
            answer("scripts/018_count_element_types.py", &model),
            json!(4)
        );
    }

    #[test]
    fn schema_probe_resolves_through_conventional_name() {
        let dir = tempfile::tempdir().unwrap();
        let model = sample_model(&dir);
        assert_eq!(answer("scripts/000_model_schema.py", &model), json!("IFC4"));
    }

    #[test]
    fn entity_inventory_maps_types_to_counts() {
        let dir = tempfile::tempdir().unwrap();
        let model = sample_model(&dir);
        let inventory = answer("scripts/900_entity_inventory.py", &model);
        assert_eq!(inventory["IFCWALL"], json!(2));
        assert_eq!(inventory["IFCDOOR"], json!(1));
    }

    #[test]
    fn echo_probe_uses_the_legacy_calling_convention() {
        let dir = tempfile::tempdir().unwrap();
        let model = sample_model(&dir);
        let echoed = answer("scripts/990_echo_model.py", &model);
        assert_eq!(echoed["script"], "scripts/990_echo_model.py");
        assert_eq!(echoed["model"], model.display().to_string());
    }

    #[test]
    #[serial_test::serial]
    fn stall_probe_honors_the_env_override() {
        std::env::set_var(STALL_SECS_ENV, "0");
        let dir = tempfile::tempdir().unwrap();
        let model = sample_model(&dir);
        assert_eq!(answer("scripts/991_stall.py", &model), Value::Null);
        std::env::remove_var(STALL_SECS_ENV);
    }

    #[test]
    fn probes_fail_cleanly_on_unreadable_models() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.ifc");
        std::fs::write(&bogus, "not a model").unwrap();

        let reg = registry();
        let reference = Path::new("scripts/001_count_walls.py");
        let err = reg
            .resolve(reference)
            .unwrap()
            .invoke(&bogus, reference)
            .unwrap_err();
        assert!(err.to_string().contains("not a STEP"));
    }
}
