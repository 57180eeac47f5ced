//! CSV storage for the results report.

use std::fs;
use std::path::{Path, PathBuf};

use crate::common::error::{Error, Result};

use super::domain::{EvalRow, ResultsReport};

/// Results report kept in a single CSV file.
pub struct FsEvalRepo {
    path: PathBuf,
}

impl FsEvalRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored report, or an empty one if the file does not exist yet.
    pub fn load(&self) -> Result<ResultsReport> {
        if !self.path.exists() {
            return Ok(ResultsReport::default());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let rows = reader
            .deserialize::<EvalRow>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ResultsReport::from_rows(rows))
    }

    /// Rewrite the whole file.
    pub fn save(&self, report: &ResultsReport) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        for row in report.rows() {
            writer.serialize(row)?;
        }
        writer.flush().map_err(|e| Error::io(&self.path, e))?;
        Ok(())
    }
}
