use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;

use gateway_core::GatewayError;

use crate::error::CliError;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

/// Render a serializable response in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, CliError> {
    let value = serde_json::to_value(value)
        .map_err(|e| GatewayError::internal("cannot render response").with_source(e))?;
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
        OutputFormat::Text => render_text(&value, 0),
    })
}

/// Print a serializable response in the requested format.
pub fn print<T: Serialize>(value: &T, format: OutputFormat) -> Result<(), CliError> {
    println!("{}", render(value, format)?);
    Ok(())
}

fn render_text(value: &Value, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, v)| match v {
                Value::Object(_) | Value::Array(_) => {
                    format!("{indent}{key}:\n{}", render_text(v, depth + 1))
                }
                scalar => format!("{indent}{key}: {}", scalar_text(scalar)),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Array(items) if items.is_empty() => format!("{indent}(none)"),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(_) | Value::Array(_) => {
                    format!("{indent}-\n{}", render_text(item, depth + 1))
                }
                scalar => format!("{indent}- {}", scalar_text(scalar)),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        scalar => format!("{indent}{}", scalar_text(scalar)),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn text_lists_fields_line_by_line() {
        let rendered = render(
            &json!({ "organization_id": "org-1", "total_clusters": 2, "total_nodes": 8 }),
            OutputFormat::Text,
        )
        .unwrap();
        assert_eq!(rendered, "organization_id: org-1\ntotal_clusters: 2\ntotal_nodes: 8");
    }

    #[test]
    fn text_nests_collections() {
        let rendered = render(&json!({ "clusters": [] }), OutputFormat::Text).unwrap();
        assert_eq!(rendered, "clusters:\n  (none)");
    }

    #[test]
    fn json_is_pretty_printed() {
        let rendered = render(&json!({ "a": 1 }), OutputFormat::Json).unwrap();
        assert_eq!(rendered, "{\n  \"a\": 1\n}");
    }
}
