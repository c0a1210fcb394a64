use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

use crate::error::{Error, Result};
use crate::signal::Recording;
use crate::warn::WarnSink;

/// Load a two-column `time,voltage` CSV recording.
///
/// Rows whose cells do not parse as two real numbers are dropped with one
/// warning each; surviving rows keep their file order, including repeated
/// timestamps. A recording with no valid rows at all is an error, since no
/// downstream stage can do anything with it.
pub fn load_recording(path: &Path, sink: &mut dyn WarnSink) -> Result<Recording> {
    let is_csv = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(Error::Format {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| Error::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file);

    let mut time = Vec::new();
    let mut voltage = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let line = row + 1;
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                sink.warn(&format!("dropping row {}: {}", line, err));
                continue;
            }
        };
        match parse_row(&record) {
            Some((t, v)) => {
                time.push(t);
                voltage.push(v);
            }
            None => {
                let cells: Vec<&str> = record.iter().collect();
                sink.warn(&format!(
                    "dropping row {}: expected two numeric cells, got '{}'",
                    line,
                    cells.join(",")
                ));
            }
        }
    }
    if time.is_empty() {
        sink.warn(&format!(
            "{}: no valid rows left after filtering",
            path.display()
        ));
        return Err(Error::InsufficientData { needed: 2, got: 0 });
    }
    Ok(Recording { time, voltage })
}

fn parse_row(record: &csv::StringRecord) -> Option<(f64, f64)> {
    if record.len() != 2 {
        return None;
    }
    let time = record.get(0)?.parse().ok()?;
    let voltage = record.get(1)?.parse().ok()?;
    Some((time, voltage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warn::BufferSink;
    use std::path::PathBuf;

    fn sample_path(relative: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .and_then(|p| p.parent())
            .expect("workspace root")
            .join(relative)
    }

    #[test]
    fn loads_two_column_recording() {
        let mut sink = BufferSink::default();
        let rec = load_recording(&sample_path("test_data/ecg_short.csv"), &mut sink).unwrap();
        assert_eq!(rec.len(), 20);
        assert_eq!(rec.time[0], 0.0);
        assert_eq!(rec.voltage[0], -0.345);
        assert!(sink.messages.is_empty());
    }

    #[test]
    fn drops_malformed_rows_and_warns() {
        let mut clean_sink = BufferSink::default();
        let clean =
            load_recording(&sample_path("test_data/ecg_short.csv"), &mut clean_sink).unwrap();

        let mut sink = BufferSink::default();
        let rec = load_recording(&sample_path("test_data/ecg_malformed.csv"), &mut sink).unwrap();
        assert_eq!(rec, clean);
        assert_eq!(sink.messages.len(), 2);
        assert!(sink.messages[0].contains("dropping row 6"));
    }

    #[test]
    fn rejects_non_csv_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recording.txt");
        std::fs::write(&path, "0,1\n0.5,2\n").unwrap();
        let mut sink = BufferSink::default();
        let err = load_recording(&path, &mut sink).unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }

    #[test]
    fn reports_missing_file() {
        let mut sink = BufferSink::default();
        let err = load_recording(Path::new("no_such_recording.csv"), &mut sink).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn fails_when_every_row_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.csv");
        std::fs::write(&path, "a,b\nc\n1,two\n").unwrap();
        let mut sink = BufferSink::default();
        let err = load_recording(&path, &mut sink).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { got: 0, .. }));
        assert_eq!(sink.messages.len(), 4);
        assert!(sink.messages[3].contains("no valid rows"));
    }
}
