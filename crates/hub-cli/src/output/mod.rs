use std::io::IsTerminal;

use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
        OutputFormat::Table => {
            let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
            Ok(render_value_table(
                &serde_json::to_value(value)?,
                table::TableOptions { color },
            ))
        }
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render(value, format)?);
    Ok(())
}

/// Arrays of objects become one row per item; a single object becomes
/// key/value rows.
fn render_value_table(value: &Value, options: table::TableOptions) -> String {
    match value {
        Value::Array(items) if items.is_empty() => String::from("(no rows)"),
        Value::Array(items) if items.iter().all(Value::is_object) => {
            let mut headers: Vec<&str> = Vec::new();
            for key in items.iter().filter_map(Value::as_object).flat_map(|m| m.keys()) {
                if !headers.contains(&key.as_str()) {
                    headers.push(key.as_str());
                }
            }
            let rows: Vec<Vec<String>> = items
                .iter()
                .filter_map(Value::as_object)
                .map(|map| {
                    headers
                        .iter()
                        .map(|h| map.get(*h).map_or_else(|| String::from("-"), cell))
                        .collect()
                })
                .collect();
            table::render_table(&headers, &rows, options)
        }
        Value::Array(items) => {
            let rows: Vec<Vec<String>> = items.iter().map(|item| vec![cell(item)]).collect();
            table::render_table(&["value"], &rows, options)
        }
        Value::Object(map) => {
            let rows: Vec<Vec<String>> = map
                .iter()
                .map(|(key, value)| vec![key.clone(), cell(value)])
                .collect();
            table::render_table(&["key", "value"], &rows, options)
        }
        scalar => cell(scalar),
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        nested => serde_json::to_string(nested).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&json!({"name": "Echo", "approved": true}), OutputFormat::Raw).unwrap();
        assert!(!out.contains('\n'));
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["name"], "Echo");
    }

    #[test]
    fn array_table_keeps_first_seen_column_order() {
        let value = json!([
            {"name": "Echo", "version": "1.0.0"},
            {"name": "weather_bot", "avatar": null, "version": "0.2.0"}
        ]);
        let out = render_value_table(&value, table::TableOptions::default());
        let header = out.lines().next().unwrap();
        let columns: Vec<&str> = header.split_whitespace().collect();
        assert_eq!(columns, vec!["name", "version", "avatar"]);
        assert!(out.lines().nth(2).unwrap().ends_with('-'));
    }

    #[test]
    fn empty_array_has_placeholder() {
        assert_eq!(
            render_value_table(&json!([]), table::TableOptions::default()),
            "(no rows)"
        );
    }
}
