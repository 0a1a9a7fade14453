use chrono::NaiveDate;
use marketsim_core::{PricePoint, PriceSeries};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Read a JSON file as a generic serde_json::Value.
pub fn read_json_value(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    read_json(path)
}

/// Read a daily price CSV with at least Date and Close columns
/// (case-insensitive). Open/High/Low/Volume are carried through when
/// present; unparseable or empty closes become missing observations.
pub fn read_price_csv(path: &str) -> Result<PriceSeries, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let mut reader = csv::Reader::from_path(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let headers = reader.headers()?.clone();
    let col = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let date_idx = col("date")
        .ok_or_else(|| format!("'{}' has no Date column", canonical.display()))?;
    let close_idx = col("close")
        .ok_or_else(|| format!("'{}' has no Close column", canonical.display()))?;
    let open_idx = col("open");
    let high_idx = col("high");
    let low_idx = col("low");
    let volume_idx = col("volume");

    let field = |record: &csv::StringRecord, idx: Option<usize>| {
        idx.and_then(|i| record.get(i))
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };

    let mut points = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let raw_date = record
            .get(date_idx)
            .ok_or_else(|| format!("Row {} has no date field", line + 2))?;
        let date = parse_date(raw_date)
            .ok_or_else(|| format!("Row {}: unrecognised date '{}'", line + 2, raw_date))?;
        points.push(PricePoint {
            date,
            close: field(&record, Some(close_idx)),
            open: field(&record, open_idx),
            high: field(&record, high_idx),
            low: field(&record, low_idx),
            volume: field(&record, volume_idx),
        });
    }

    Ok(PriceSeries { points })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .ok()
}

/// Resolve and validate the path, preventing directory traversal.
fn resolve_path(path: &str) -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
