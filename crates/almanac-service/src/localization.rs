//! Message catalog overrides loaded from disk.

use almanac_engine::Catalog;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File};
use serde_json::Value;

use crate::error::ServiceResult;

/// ## Summary
/// Returns the English catalog with the overrides from `path` applied.
///
/// The file is a TOML, JSON or YAML document whose nested tables spell out
/// message keys, e.g. `[recurrence] every = "..."` for `recurrence.every`.
///
/// ## Errors
/// Returns `ServiceError::Catalog` if the file cannot be read or parsed.
pub fn load_catalog(path: Option<&str>) -> ServiceResult<Catalog> {
    let Some(path) = path else {
        return Ok(Catalog::english());
    };
    let catalog = catalog_from_builder(Config::builder().add_source(File::with_name(path)))?;
    tracing::info!(path, templates = catalog.len(), "Loaded message catalog overrides");
    Ok(catalog)
}

fn catalog_from_builder(builder: ConfigBuilder<DefaultState>) -> ServiceResult<Catalog> {
    let document: Value = builder.build()?.try_deserialize()?;
    let mut overrides = Vec::new();
    flatten_into(None, &document, &mut overrides);

    let mut catalog = Catalog::english();
    catalog.extend(overrides);
    Ok(catalog)
}

fn flatten_into(prefix: Option<&str>, value: &Value, out: &mut Vec<(String, String)>) {
    let key = |name: &str| prefix.map_or_else(|| name.to_string(), |prefix| format!("{prefix}.{name}"));
    match value {
        Value::Object(entries) => {
            for (name, nested) in entries {
                flatten_into(Some(&key(name)), nested, out);
            }
        }
        Value::String(text) => {
            if let Some(prefix) = prefix {
                out.push((prefix.to_string(), text.clone()));
            }
        }
        Value::Number(_) | Value::Bool(_) => {
            if let Some(prefix) = prefix {
                out.push((prefix.to_string(), value.to_string()));
            }
        }
        Value::Null | Value::Array(_) => {
            tracing::debug!(key = prefix, "Ignoring non-text catalog entry");
        }
    }
}
