//! Evaluator units and reference resolution.
//!
//! Analysis logic plugs in as *script units*: named bundles of callables
//! keyed by the stem of a catalog's `script_path` reference. Units are
//! independently authored and do not share an interface, so resolution walks
//! an ordered candidate list instead of assuming a single entry point:
//!
//! 1. a callable named after the reference stem with its numeric prefix
//!    stripped (`001_count_walls` -> `count_walls`),
//! 2. one of the conventional names `main`, `run`, `execute`, `process`,
//! 3. the first registered callable of the unit.
//!
//! A reference that resolves to nothing is a per-task failure, never a
//! catalog load error.

pub mod builtin;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use thiserror::Error;

/// Calling conventions accepted from script units. `ModelAndScript` is the
/// legacy convention whose callables also receive the script reference.
#[derive(Clone)]
pub enum Callable {
    Model(Arc<dyn Fn(&Path) -> Result<Value> + Send + Sync>),
    ModelAndScript(Arc<dyn Fn(&Path, &Path) -> Result<Value> + Send + Sync>),
}

impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callable::Model(_) => f.write_str("Callable::Model"),
            Callable::ModelAndScript(_) => f.write_str("Callable::ModelAndScript"),
        }
    }
}

impl Callable {
    pub fn invoke(&self, model_path: &Path, script_ref: &Path) -> Result<Value> {
        match self {
            Callable::Model(f) => f(model_path),
            Callable::ModelAndScript(f) => f(model_path, script_ref),
        }
    }
}

/// One named unit of evaluation logic with its callables in declaration
/// order (the order matters for the first-callable fallback).
pub struct ScriptUnit {
    name: String,
    functions: Vec<(String, Callable)>,
}

impl ScriptUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    pub fn with_fn(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&Path) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.functions
            .push((name.into(), Callable::Model(Arc::new(f))));
        self
    }

    /// Register a callable using the legacy two-argument convention.
    pub fn with_legacy_fn(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&Path, &Path) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.functions
            .push((name.into(), Callable::ModelAndScript(Arc::new(f))));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, name: &str) -> Option<&Callable> {
        self.functions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }
}

/// Conventional entry-point names tried when the derived name misses.
pub const CONVENTIONAL_NAMES: [&str; 4] = ["main", "run", "execute", "process"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no script unit registered for '{0}'")]
    UnitNotFound(String),
    #[error("no callable function found in unit '{0}'")]
    NoCallable(String),
}

/// Registry of script units, keyed by reference stem.
#[derive(Default)]
pub struct UnitRegistry {
    units: HashMap<String, ScriptUnit>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit; a later unit with the same name replaces the earlier.
    pub fn register(&mut self, unit: ScriptUnit) {
        self.units.insert(unit.name.clone(), unit);
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Resolve a catalog script reference to a callable.
    pub fn resolve(&self, script_ref: &Path) -> Result<&Callable, ResolveError> {
        let stem = script_ref
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        let unit = self
            .units
            .get(stem)
            .ok_or_else(|| ResolveError::UnitNotFound(stem.to_string()))?;

        let derived = strip_numeric_prefix(stem);
        if let Some(callable) = unit.get(derived) {
            return Ok(callable);
        }
        for name in CONVENTIONAL_NAMES {
            if let Some(callable) = unit.get(name) {
                return Ok(callable);
            }
        }
        unit.functions
            .first()
            .map(|(_, c)| c)
            .ok_or_else(|| ResolveError::NoCallable(stem.to_string()))
    }
}

/// `001_count_walls` -> `count_walls`; stems without a numeric prefix are
/// returned unchanged.
fn strip_numeric_prefix(stem: &str) -> &str {
    let digits = stem.len() - stem.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return stem;
    }
    let rest = &stem[digits..];
    rest.strip_prefix('_').unwrap_or(rest)
}
