// src/config.rs

use serde::Serialize;
use serde_json;
use std::fs::File;
use std::path::Path;

/// Smoothing schedule of the multigrid cycles.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SolverParams {
    /// Pre-smoothing sweeps on the down-leg.
    pub nu1: usize,
    /// Post-smoothing sweeps on the up-leg.
    pub nu2: usize,
    /// V-cycles per FMG root level (the finest level runs one extra).
    pub nu_v: usize,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            nu1: 2,
            nu2: 2,
            nu_v: 2,
        }
    }
}

#[derive(Serialize)]
pub struct RunConfig {
    pub grid: GridConfig,
    pub solver: SolverConfig,
    pub run: RunInfo,
}

#[derive(Serialize)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub h0: f64,
}

#[derive(Serialize)]
pub struct SolverConfig {
    pub nu1: usize,
    pub nu2: usize,
    pub nu_v: usize,
    pub tolerance: f64,
    pub omega: f64,
}

#[derive(Serialize)]
pub struct RunInfo {
    pub binary: String,
    pub run_id: String,
}

impl RunConfig {
    pub fn write_to_dir(&self, out_dir: &Path) -> std::io::Result<()> {
        let path = out_dir.join("config.json");
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
