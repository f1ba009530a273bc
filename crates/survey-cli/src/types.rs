use std::path::PathBuf;

use survey_model::{DecisionRecord, StageShape};

#[derive(Debug)]
pub struct CleanResult {
    pub output: PathBuf,
    pub params: Option<PathBuf>,
    pub rows: usize,
    pub columns: usize,
    pub shapes: Vec<StageShape>,
    pub decisions: DecisionRecord,
}

#[derive(Debug)]
pub struct ApplyResult {
    pub output: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub shapes: Vec<StageShape>,
}
