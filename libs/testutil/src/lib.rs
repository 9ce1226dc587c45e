//! Shared test helpers: workspace fixtures, JSON-schema contract checks and JSON snapshots.

use anyhow::{Context, Result, anyhow};
use jsonschema::{Validator, validator_for};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub mod assertions;
mod path_safety;

pub use assertions::{assert_has_output, assert_no_nulls, null_paths, output_names};

/// Schema every rendered skill response must satisfy.
pub const SKILL_RESPONSE_SCHEMA: &str = "libs/core/schema/skill-response.schema.json";

pub fn workspace_root() -> PathBuf {
    // workspace root is two levels up from this crate's manifest (libs/testutil)
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .ancestors()
        .nth(2)
        .unwrap_or(manifest)
        .to_path_buf()
}

/// Loads a JSON or YAML fixture, relative to the workspace root, as a JSON value.
pub fn load_fixture_value(path: &str) -> Result<Value> {
    let absolute = absolute_path(path)?;
    let content = fs::read_to_string(&absolute)
        .with_context(|| format!("failed to read {}", absolute.display()))?;
    let extension = absolute
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("failed to parse json {}", absolute.display())),
        "yaml" | "yml" => {
            let yaml: serde_yaml_bw::Value = serde_yaml_bw::from_str(&content)
                .with_context(|| format!("failed to parse yaml {}", absolute.display()))?;
            serde_json::to_value(yaml)
                .with_context(|| format!("failed to convert yaml {}", absolute.display()))
        }
        other => Err(anyhow!("unsupported fixture extension: {other}")),
    }
}

fn absolute_path<P>(path: P) -> Result<PathBuf>
where
    P: AsRef<Path>,
{
    let root = workspace_root()
        .canonicalize()
        .context("failed to canonicalize workspace root")?;
    let relative = path.as_ref();
    if relative.is_absolute() {
        let canonical = relative
            .canonicalize()
            .with_context(|| format!("failed to canonicalize {}", relative.display()))?;
        if !canonical.starts_with(&root) {
            anyhow::bail!(
                "absolute path escapes workspace root ({}): {}",
                root.display(),
                canonical.display()
            );
        }
        return Ok(canonical);
    }

    path_safety::normalize_under_root(&root, relative)
}

pub fn assert_matches_schema<P>(schema_path: P, value: &Value) -> Result<()>
where
    P: AsRef<Path>,
{
    let compiled = load_compiled_schema(schema_path.as_ref())?;

    let messages: Vec<String> = compiled
        .iter_errors(value)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        return Err(anyhow!("schema validation failed: {}", messages.join("; ")));
    }

    Ok(())
}

fn load_schema(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse json {}", path.display()))
}

fn load_compiled_schema(path: &Path) -> Result<Arc<Validator>> {
    static CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<Validator>>>> =
        Lazy::new(|| Mutex::new(HashMap::new()));

    let absolute = absolute_path(path)?;

    {
        let cache = CACHE.lock().map_err(|_| anyhow!("schema cache poisoned"))?;
        if let Some(schema) = cache.get(&absolute) {
            return Ok(schema.clone());
        }
    }

    let schema_value = load_schema(&absolute)?;
    let compiled = validator_for(&schema_value)
        .map_err(|err| anyhow!("failed to compile json schema: {err}"))?;
    let compiled = Arc::new(compiled);

    let mut cache = CACHE.lock().map_err(|_| anyhow!("schema cache poisoned"))?;
    let entry = cache.entry(absolute).or_insert_with(|| compiled.clone());
    Ok(entry.clone())
}

pub fn to_json_value<T>(value: &T) -> Result<Value>
where
    T: Serialize,
{
    serde_json::to_value(value).context("failed to convert to json value")
}

#[macro_export]
macro_rules! load_fixture {
    ($path:expr $(,)?) => {{
        $crate::load_fixture_value($path)
            .unwrap_or_else(|err| panic!("failed to load fixture {}: {}", $path, err))
    }};
}

#[macro_export]
macro_rules! assert_snapshot_json {
    ($name:expr, $value:expr $(,)?) => {{
        let snapshot_value = $crate::to_json_value(&$value)
            .unwrap_or_else(|err| panic!("failed to serialise snapshot {}: {}", $name, err));
        insta::with_settings!({sort_maps => true}, {
            insta::assert_json_snapshot!($name, snapshot_value);
        });
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_root_holds_the_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }

    #[test]
    fn loads_json_and_yaml_fixtures_alike() {
        let json = load_fixture_value("libs/core/tests/fixtures/simple_text.json").unwrap();
        let yaml = load_fixture_value("libs/core/tests/fixtures/simple_text.yaml").unwrap();
        assert_eq!(json, yaml);
    }

    #[test]
    fn rejects_unknown_extensions_and_escapes() {
        assert!(load_fixture_value("Cargo.toml").is_err());
        assert!(load_fixture_value("../outside.json").is_err());
    }

    #[test]
    fn schema_accepts_the_minimal_response() {
        let minimal = serde_json::json!({"version": "2.0"});
        assert_matches_schema(SKILL_RESPONSE_SCHEMA, &minimal).unwrap();
        let wrong = serde_json::json!({"version": 2});
        assert!(assert_matches_schema(SKILL_RESPONSE_SCHEMA, &wrong).is_err());
    }
}
