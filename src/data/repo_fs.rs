//! Filesystem persistence for frames as delimited text.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};

use crate::common::error::{Error, Result};

use super::domain::Frame;

/// Field delimiter of the raw dataset.
pub const RAW_DELIMITER: u8 = b';';
/// Field delimiter of every file the pipeline writes.
pub const DEFAULT_DELIMITER: u8 = b',';

/// Read a headed, all-numeric CSV file into a frame.
pub fn load_frame(path: &Path, delimiter: u8) -> Result<Frame> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_matches('"').to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let row = record
            .iter()
            .zip(&headers)
            .map(|(field, name)| {
                field.parse::<f64>().map_err(|_| Error::MalformedData {
                    column: name.clone(),
                    reason: format!("line {}: '{}' is not a number", idx + 2, field),
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    Frame::from_rows(headers, &rows)
}

/// Write a frame as comma separated text, creating parent directories.
pub fn save_frame(frame: &Frame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = WriterBuilder::new()
        .delimiter(DEFAULT_DELIMITER)
        .from_writer(BufWriter::new(file));

    writer.write_record(frame.column_names())?;
    for idx in 0..frame.n_rows() {
        writer.write_record(frame.row(idx).iter().map(|v| v.to_string()))?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::domain::Column;

    #[test]
    fn reads_semicolon_file_with_quoted_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        fs::write(&path, "\"pH\";\"alcohol\";\"quality\"\n3.51;9.4;5\n3.2;9.8;6\n").unwrap();

        let frame = load_frame(&path, RAW_DELIMITER).unwrap();
        assert_eq!(frame.column_names(), vec!["pH", "alcohol", "quality"]);
        assert_eq!(frame.row(1), vec![3.2, 9.8, 6.0]);
    }

    #[test]
    fn writes_integers_without_fraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");
        let frame = Frame::new(vec![
            Column::new("quality_label", vec![1.0, 0.0]),
            Column::new("total acidity", vec![8.1, 7.5]),
        ])
        .unwrap();

        save_frame(&frame, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "quality_label,total acidity\n1,8.1\n0,7.5\n");
        assert_eq!(load_frame(&path, DEFAULT_DELIMITER).unwrap(), frame);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_frame(Path::new("/definitely/not/here.csv"), RAW_DELIMITER).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn non_numeric_field_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "a,b\n1,x\n").unwrap();
        let err = load_frame(&path, DEFAULT_DELIMITER).unwrap_err();
        assert_eq!(err.code(), crate::common::error::ErrorCode::MalformedData);
        assert!(matches!(err, Error::MalformedData { ref column, .. } if column == "b"));
    }
}
