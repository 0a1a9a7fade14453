use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// Path simulations emit one row per day with one column per path; final
/// price distributions emit a single column; stress reports emit one row per
/// scenario. Everything else falls back to field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value.get("result").unwrap_or(value);

    if let Some(Value::Array(paths)) = result.get("paths") {
        write_paths_csv(&mut wtr, paths);
    } else if let Some(Value::Array(finals)) = result.get("final_prices") {
        let _ = wtr.write_record(["final_price"]);
        for price in finals {
            let _ = wtr.write_record([format_csv_value(price)]);
        }
    } else if let (Some(baseline), Some(Value::Array(scenarios))) =
        (result.get("baseline"), result.get("scenarios"))
    {
        write_stress_csv(&mut wtr, baseline, scenarios);
    } else if let Value::Object(map) = result {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
        }
    } else if let Value::Array(arr) = result {
        for item in arr {
            let _ = wtr.write_record([format_csv_value(item)]);
        }
    } else {
        let _ = wtr.write_record([format_csv_value(result)]);
    }

    let _ = wtr.flush();
}

/// One row per day, one column per simulated path.
fn write_paths_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, paths: &[Value]) {
    let num_days = paths
        .first()
        .and_then(|p| p.as_array())
        .map(|p| p.len())
        .unwrap_or(0);

    let mut header = vec!["day".to_string()];
    header.extend((0..paths.len()).map(|i| format!("path_{}", i)));
    let _ = wtr.write_record(&header);

    for day in 0..num_days {
        let mut row = vec![day.to_string()];
        for path in paths {
            let cell = path
                .as_array()
                .and_then(|p| p.get(day))
                .map(format_csv_value)
                .unwrap_or_default();
            row.push(cell);
        }
        let _ = wtr.write_record(&row);
    }
}

fn write_stress_csv(
    wtr: &mut csv::Writer<io::StdoutLock<'_>>,
    baseline: &Value,
    scenarios: &[Value],
) {
    let _ = wtr.write_record([
        "scenario",
        "quantile",
        "value_at_risk",
        "expected_shortfall",
        "mean",
        "std_dev",
    ]);
    let _ = wtr.write_record(risk_row("baseline", baseline));
    for scenario in scenarios {
        let label = scenario
            .get("label")
            .and_then(|l| l.as_str())
            .unwrap_or("?");
        if let Some(report) = scenario.get("report") {
            let _ = wtr.write_record(risk_row(label, report));
        }
    }
}

fn risk_row(label: &str, report: &Value) -> Vec<String> {
    let field = |key: &str| report.get(key).map(format_csv_value).unwrap_or_default();
    vec![
        label.to_string(),
        field("quantile"),
        field("value_at_risk"),
        field("expected_shortfall"),
        field("mean"),
        field("std_dev"),
    ]
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
