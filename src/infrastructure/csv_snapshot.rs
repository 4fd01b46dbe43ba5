// Tabular snapshot codec: one CSV row per sample, oldest first
use crate::application::snapshot_repository::SnapshotError;
use crate::domain::sample::Sample;
use crate::domain::series::Series;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use std::fmt::Write;

pub const HEADER: &str = "timestamp,energy,water,live,lights_pct";

pub fn encode(series: &Series) -> String {
    let mut out = String::with_capacity(HEADER.len() + 1 + series.len() * 48);
    out.push_str(HEADER);
    out.push('\n');
    for sample in series.iter() {
        // Writing into a String cannot fail
        let _ = writeln!(
            out,
            "{},{},{},{:.1},{:.1}",
            sample.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            sample.energy,
            sample.water,
            sample.live_metric,
            sample.lighting_pct,
        );
    }
    out
}

pub fn decode(contents: &str) -> Result<Series, SnapshotError> {
    let mut lines = contents
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    match lines.next() {
        Some((_, header)) if header == HEADER => {}
        Some((line_no, header)) => {
            return Err(SnapshotError::parse(
                line_no,
                format!("unexpected header {header:?}"),
            ));
        }
        None => return Err(SnapshotError::parse(1, "missing header")),
    }

    let mut samples: Vec<Sample> = Vec::new();
    for (line_no, line) in lines {
        let sample = decode_row(line_no, line)?;
        if let Some(previous) = samples.last() {
            if sample.timestamp <= previous.timestamp {
                return Err(SnapshotError::parse(line_no, "timestamps are not strictly increasing"));
            }
        }
        samples.push(sample);
    }

    Ok(samples.into_iter().collect())
}

fn decode_row(line_no: usize, line: &str) -> Result<Sample, SnapshotError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [timestamp, energy, water, live, lights_pct] = fields[..] else {
        return Err(SnapshotError::parse(
            line_no,
            format!("expected 5 columns, found {}", fields.len()),
        ));
    };

    let field_error = |column: &str, value: &str| {
        SnapshotError::parse(line_no, format!("invalid {column} value {value:?}"))
    };

    let timestamp = parse_timestamp(timestamp).ok_or_else(|| field_error("timestamp", timestamp))?;
    let energy = energy.parse::<i64>().map_err(|_| field_error("energy", energy))?;
    let water = water.parse::<i64>().map_err(|_| field_error("water", water))?;
    let live_metric = parse_finite(live).ok_or_else(|| field_error("live", live))?;
    let lighting_pct = parse_finite(lights_pct).ok_or_else(|| field_error("lights_pct", lights_pct))?;

    Ok(Sample::new(timestamp, energy, water, live_metric, lighting_pct))
}

/// RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS` read as UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}
