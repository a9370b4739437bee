use serde_json::Value;

/// Headline figures, most specific first.
const PRIORITY_KEYS: [&str; 8] = [
    "point_forecast_revenue",
    "fact_revenue",
    "revenue_so_far",
    "total_revenue",
    "forecast_revenue",
    "actual_quantity",
    "workdays_left",
    "total_entries",
];

/// Print just the key answer value from the output.
///
/// Looks for a headline field in the result (or in the first row of a
/// result list), falling back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let target = match result_obj {
        Value::Array(rows) => match rows.first() {
            Some(first) => first,
            None => {
                println!("0 rows");
                return;
            }
        },
        other => other,
    };

    if let Value::Object(map) = target {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(target));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
