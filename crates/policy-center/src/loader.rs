use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::api::apply_override_to_snapshot;
use crate::defaults::default_snapshot;
use crate::errors::PolicyError;
use crate::model::{PolicySnapshot, PolicySource};

const ENV_PREFIX: &str = "UU_POLICY__";
const ENV_JSON: &str = "UU_POLICY_OVERRIDE_JSON";

#[derive(Debug, Default)]
pub struct LoadOptions {
    pub paths: Vec<PathBuf>,
    pub include_env: bool,
    /// `path=value` pairs, applied last.
    pub cli_overrides: Vec<String>,
}

pub fn load_snapshot(path: Option<&Path>) -> Result<PolicySnapshot, PolicyError> {
    let mut options = LoadOptions::default();
    if let Some(p) = path {
        options.paths.push(p.to_path_buf());
    }
    options.include_env = true;
    load_snapshot_with_options(&options)
}

pub fn load_snapshot_with_options(options: &LoadOptions) -> Result<PolicySnapshot, PolicyError> {
    let mut snapshot = default_snapshot();
    bootstrap_builtin_provenance(&mut snapshot)?;

    for path in &options.paths {
        if path.exists() {
            let overlay = overlays_from_file(path)?;
            apply_overlays(&mut snapshot, overlay)?;
        } else {
            debug!(path = %path.display(), "policy file not found; skipping");
        }
    }

    if options.include_env {
        let env_overlays = overlays_from_env()?;
        apply_overlays(&mut snapshot, env_overlays)?;
    }

    let cli_overlays = overlays_from_cli(&options.cli_overrides)?;
    apply_overlays(&mut snapshot, cli_overlays)?;

    Ok(snapshot)
}

struct PolicyOverlay {
    path: String,
    value: Value,
    source: PolicySource,
}

/// Each layer that changes anything bumps the snapshot revision once.
fn apply_overlays(
    snapshot: &mut PolicySnapshot,
    overlays: Vec<PolicyOverlay>,
) -> Result<(), PolicyError> {
    let mut changed = false;
    for overlay in overlays {
        changed |=
            apply_override_to_snapshot(snapshot, &overlay.path, &overlay.value, overlay.source)?;
    }
    if changed {
        snapshot.rev = snapshot.rev.saturating_add(1);
    }
    Ok(())
}

fn overlays_from_file(path: &Path) -> Result<Vec<PolicyOverlay>, PolicyError> {
    let content = fs::read_to_string(path).map_err(|err| PolicyError::Io(format!("{}", err)))?;
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|err| PolicyError::Invalid(format!("{}", err)))?;
    let json_value =
        serde_json::to_value(yaml_value).map_err(|err| PolicyError::Invalid(format!("{}", err)))?;
    Ok(flatten_value(json_value, None, PolicySource::File))
}

fn overlays_from_env() -> Result<Vec<PolicyOverlay>, PolicyError> {
    let mut overlays = Vec::new();
    for (key, raw) in env::vars() {
        if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
            let path = stripped
                .split("__")
                .filter(|segment| !segment.is_empty())
                .map(|segment| segment.to_ascii_lowercase())
                .collect::<Vec<_>>()
                .join(".");
            if path.is_empty() {
                continue;
            }
            let value = parse_env_value(&raw);
            overlays.push(PolicyOverlay {
                path,
                value,
                source: PolicySource::Env,
            });
        }
    }

    if let Ok(raw_json) = env::var(ENV_JSON) {
        if !raw_json.trim().is_empty() {
            let json_value: Value = serde_json::from_str(&raw_json)
                .map_err(|err| PolicyError::Invalid(format!("{}", err)))?;
            overlays.extend(flatten_value(json_value, None, PolicySource::Env));
        }
    }

    Ok(overlays)
}

fn overlays_from_cli(pairs: &[String]) -> Result<Vec<PolicyOverlay>, PolicyError> {
    let mut overlays = Vec::new();
    for pair in pairs {
        let trimmed = pair.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some((path, value_raw)) = trimmed.split_once('=') else {
            return Err(PolicyError::Invalid(format!(
                "expected path=value, got {trimmed}"
            )));
        };
        let path = path.trim();
        if path.is_empty() {
            continue;
        }
        overlays.push(PolicyOverlay {
            path: path.to_ascii_lowercase(),
            value: parse_env_value(value_raw.trim()),
            source: PolicySource::Cli,
        });
    }
    Ok(overlays)
}

fn parse_env_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
        return parsed;
    }
    if let Ok(boolean) = raw.parse::<bool>() {
        return Value::Bool(boolean);
    }
    if let Ok(int_val) = raw.parse::<i64>() {
        return Value::Number(int_val.into());
    }
    Value::String(raw.to_string())
}

fn flatten_value(value: Value, prefix: Option<String>, source: PolicySource) -> Vec<PolicyOverlay> {
    match value {
        Value::Object(map) => {
            let mut result = Vec::new();
            for (key, value) in map {
                let key_segment = key.trim().to_ascii_lowercase();
                let next_prefix = match &prefix {
                    Some(prefix) if !prefix.is_empty() => format!("{}.{}", prefix, key_segment),
                    Some(_) => key_segment.clone(),
                    None => key_segment.clone(),
                };
                result.extend(flatten_value(value, Some(next_prefix), source));
            }
            result
        }
        // A section left empty (`addons:` with no body) carries no overrides.
        Value::Null if prefix.as_deref().map_or(true, |path| !path.contains('.')) => Vec::new(),
        other => {
            if let Some(prefix) = prefix {
                vec![PolicyOverlay {
                    path: prefix,
                    value: other,
                    source,
                }]
            } else {
                Vec::new()
            }
        }
    }
}

fn bootstrap_builtin_provenance(snapshot: &mut PolicySnapshot) -> Result<(), PolicyError> {
    let mut overlays = Vec::new();
    overlays.extend(flatten_value(
        serde_json::to_value(&snapshot.window)
            .map_err(|err| PolicyError::Invalid(format!("{}", err)))?,
        Some("window".into()),
        PolicySource::Builtin,
    ));
    overlays.extend(flatten_value(
        serde_json::to_value(&snapshot.addons)
            .map_err(|err| PolicyError::Invalid(format!("{}", err)))?,
        Some("addons".into()),
        PolicySource::Builtin,
    ));

    for overlay in overlays {
        snapshot.set_provenance(&overlay.path, overlay.source);
    }
    Ok(())
}
