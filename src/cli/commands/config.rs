//! CLI implementation for `shuriken config`
//!
//! Prints the effective configuration, one `namespace.key=value` per line.
//! Private attributes (names starting with `_`) are hidden.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::cli::output::OutputConfig;
use crate::core::context::{current_context, Value};

/// Execute the config command
pub fn execute(output: &OutputConfig) -> Result<i32> {
    let ctx = current_context()?;
    if output.json {
        output.report(&as_json(&ctx.flatten()))?;
    } else if !output.quiet {
        print!("{ctx}");
    }
    Ok(0)
}

fn as_json(
    attributes: &BTreeMap<(String, String), Value>,
) -> BTreeMap<String, BTreeMap<String, serde_json::Value>> {
    let mut namespaces: BTreeMap<String, BTreeMap<String, serde_json::Value>> = BTreeMap::new();
    for ((namespace, key), value) in attributes {
        if namespace.starts_with('_') || key.starts_with('_') {
            continue;
        }
        let value = match value {
            Value::Bool(b) => serde_json::Value::from(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Str(s) => serde_json::Value::from(s.as_str()),
            Value::List(items) => serde_json::Value::from(items.clone()),
            Value::Results(results) => serde_json::Value::from(results.len()),
        };
        namespaces
            .entry(namespace.clone())
            .or_default()
            .insert(key.clone(), value);
    }
    namespaces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::{new_context, PhaseResults};

    #[test]
    fn test_json_hides_private_attributes() {
        let ctx = new_context();
        let _guard = ctx.enter();
        ctx.set("ninja.file_columns", 80).unwrap();
        ctx.set("gcc.ccache", true).unwrap();
        ctx.set("build._phase_results", PhaseResults::new()).unwrap();

        let json = as_json(&current_context().unwrap().flatten());

        assert_eq!(json["ninja"]["file_columns"], serde_json::json!(80));
        assert_eq!(json["gcc"]["ccache"], serde_json::json!(true));
        assert!(!json.contains_key("build"));
    }
}
