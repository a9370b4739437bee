use serde_json::{Map, Value};
use std::io;

type Writer<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// Row lists become one CSV row per item. Objects become `field,value`
/// pairs with nested keys joined by dots (`workdays.passed`).
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match body {
        Value::Array(rows) => write_rows(&mut wtr, rows),
        Value::Object(map) => {
            let _ = wtr.write_record(["field", "value"]);
            write_fields(&mut wtr, "", map);
        }
        other => {
            let _ = wtr.write_record([format_csv_value(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields(wtr: &mut Writer<'_>, prefix: &str, map: &Map<String, Value>) {
    for (key, val) in map {
        let field = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => write_fields(wtr, &field, inner),
            _ => {
                let _ = wtr.write_record([field.as_str(), &format_csv_value(val)]);
            }
        }
    }
}

fn write_rows(wtr: &mut Writer<'_>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            let _ = wtr.write_record([format_csv_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);
    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(items) if items.iter().all(|v| !v.is_object() && !v.is_array()) => items
            .iter()
            .map(format_csv_value)
            .collect::<Vec<_>>()
            .join(";"),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
