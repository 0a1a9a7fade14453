use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format output as a table using the tabled crate.
///
/// Stress reports render as a scenario comparison; other results render as
/// field/value rows. Long numeric arrays (paths, final prices) are
/// summarised rather than dumped into a cell.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    if let (Some(baseline), Some(Value::Array(scenarios))) =
        (result.get("baseline"), result.get("scenarios"))
    {
        print_stress_table(baseline, scenarios);
    } else if let Value::Object(res_map) = result {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in res_map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    } else {
        print_flat_object(result);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Baseline and scenarios side by side, one row per risk report.
fn print_stress_table(baseline: &Value, scenarios: &[Value]) {
    let mut builder = Builder::default();
    builder.push_record([
        "Scenario",
        "Quantile",
        "VaR",
        "Expected Shortfall",
        "Mean",
        "Std Dev",
    ]);
    builder.push_record(risk_row("baseline", baseline));
    for scenario in scenarios {
        let label = scenario
            .get("label")
            .and_then(|l| l.as_str())
            .unwrap_or("?");
        if let Some(report) = scenario.get("report") {
            builder.push_record(risk_row(label, report));
        }
    }
    println!("{}", Table::from(builder));
}

fn risk_row(label: &str, report: &Value) -> Vec<String> {
    let field = |key: &str| {
        report
            .get(key)
            .map(format_value)
            .unwrap_or_default()
    };
    vec![
        label.to_string(),
        field("quantile"),
        field("value_at_risk"),
        field("expected_shortfall"),
        field("mean"),
        field("std_dev"),
    ]
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            if arr.len() > 8 {
                format!("[{} values]", arr.len())
            } else {
                let items: Vec<String> = arr.iter().map(format_value).collect();
                items.join(", ")
            }
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
