use anyhow::{bail, Context, Result};
use idle_core::Constants;
use serde_json::Value;
use std::collections::BTreeMap;

/// Replaces the named `Constants` fields with the scenario's values.
///
/// Keys must name an existing field and values must deserialize into that
/// field's type; either failure rejects the whole set.
pub fn apply_overrides(constants: &mut Constants, overrides: &BTreeMap<String, Value>) -> Result<()> {
    if overrides.is_empty() {
        return Ok(());
    }
    let Value::Object(mut fields) = serde_json::to_value(&*constants).context("serializing constants")?
    else {
        bail!("constants did not serialize to a JSON object");
    };
    for (key, value) in overrides {
        let Some(field) = fields.get_mut(key) else {
            let valid: Vec<&str> = fields.keys().map(String::as_str).collect();
            bail!("unknown override key '{key}'. Valid keys: {}", valid.join(", "));
        };
        *field = value.clone();
    }
    let keys: Vec<&str> = overrides.keys().map(String::as_str).collect();
    *constants = serde_json::from_value(Value::Object(fields))
        .with_context(|| format!("applying overrides: {}", keys.join(", ")))?;
    Ok(())
}
