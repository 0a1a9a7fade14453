use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Heuristic: the headline risk number when one exists, then the drift
/// estimate, then the distribution mean, then the first field of the result.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // (label-free) direct keys first, then well-known nested locations
    let lookups: [&[&str]; 6] = [
        &["value_at_risk"],
        &["baseline", "value_at_risk"],
        &["estimate", "mu"],
        &["summary", "mean"],
        &["mean"],
        &["quantile"],
    ];

    for path in &lookups {
        let mut current = result;
        let mut found = true;
        for &key in *path {
            match current.get(key) {
                Some(next) => current = next,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if found && !current.is_null() {
            println!("{}", format_minimal(current));
            return;
        }
    }

    if let Value::Object(map) = result {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result));
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
