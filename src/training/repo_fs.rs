//! Filesystem storage for fitted forests and the optimization report.
//!
//! Models are JSON documents wrapped in a small envelope so that a reader can
//! refuse artefacts written by an incompatible build.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};

use super::domain::ModelRepo;
use super::forest::RandomForest;
use super::search::SearchOutcome;

pub const FORMAT_VERSION: u32 = 1;
pub const MODEL_KIND: &str = "random_forest";

#[derive(Serialize, Deserialize)]
struct Envelope<M> {
    format_version: u32,
    kind: String,
    model: M,
}

/// One forest stored at a fixed path.
pub struct FsModelRepo {
    path: PathBuf,
}

impl FsModelRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelRepo for FsModelRepo {
    type Model = RandomForest;

    fn put_model(&self, model: &RandomForest) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let file = File::create(&self.path).map_err(|e| Error::io(&self.path, e))?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer(
            &mut out,
            &Envelope {
                format_version: FORMAT_VERSION,
                kind: MODEL_KIND.to_string(),
                model,
            },
        )?;
        out.flush().map_err(|e| Error::io(&self.path, e))?;
        Ok(())
    }

    fn get_model(&self) -> Result<RandomForest> {
        if !self.path.is_file() {
            return Err(Error::ModelMissing {
                path: self.path.clone(),
            });
        }
        let file = File::open(&self.path).map_err(|e| Error::io(&self.path, e))?;
        let envelope: Envelope<RandomForest> = serde_json::from_reader(BufReader::new(file))?;

        if envelope.format_version != FORMAT_VERSION || envelope.kind != MODEL_KIND {
            return Err(Error::config(format!(
                "{}: unsupported model artefact {} v{}",
                self.path.display(),
                envelope.kind,
                envelope.format_version
            )));
        }
        Ok(envelope.model)
    }
}

#[derive(Serialize)]
struct CandidateRow {
    rank: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    n_estimators: usize,
    mean_cv_f1: f64,
    std_cv_f1: f64,
    is_best: bool,
}

/// Write every searched candidate, in grid order, replacing any previous report.
pub fn save_search_report(outcome: &SearchOutcome, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for (idx, (candidate, rank)) in outcome.candidates.iter().zip(outcome.ranks()).enumerate() {
        writer.serialize(CandidateRow {
            rank,
            max_depth: candidate.params.max_depth,
            min_samples_split: candidate.params.min_samples_split,
            n_estimators: candidate.params.n_estimators,
            mean_cv_f1: candidate.mean_f1,
            std_cv_f1: candidate.std_f1,
            is_best: idx == outcome.best,
        })?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}
