// Per-tick statistics and run summaries

use serde::Serialize;

use crate::agent::AgentId;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TickStats {
    pub tick: u64,
    pub humans: usize,
    pub zombies: usize,
    pub conversions_this_tick: usize,
    pub total_conversions: usize,
    pub mean_human_energy: f64,
    pub exhausted_humans: usize, // Humans that will spend their next activation recovering
}

#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub seed: Option<u64>,
    pub ticks_run: u64,
    pub final_stats: TickStats,
    /// First tick that ended with no humans left.
    pub extinction_tick: Option<u64>,
    pub top_converter: Option<(AgentId, usize)>,
}

impl RunSummary {
    pub fn humans_survived(&self) -> bool {
        self.final_stats.humans > 0
    }
}

/// Averages over a batch of runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EnsembleStats {
    pub runs: usize,
    pub extinct_runs: usize,
    pub mean_final_humans: f64,
    pub mean_final_zombies: f64,
    pub mean_extinction_tick: Option<f64>,
}

impl EnsembleStats {
    pub fn from_runs(runs: &[RunSummary]) -> Self {
        if runs.is_empty() {
            return Self::default();
        }
        let n = runs.len() as f64;
        let extinction_ticks: Vec<u64> = runs.iter().filter_map(|r| r.extinction_tick).collect();
        let mean_extinction_tick = if extinction_ticks.is_empty() {
            None
        } else {
            Some(extinction_ticks.iter().sum::<u64>() as f64 / extinction_ticks.len() as f64)
        };
        Self {
            runs: runs.len(),
            extinct_runs: extinction_ticks.len(),
            mean_final_humans: runs.iter().map(|r| r.final_stats.humans as f64).sum::<f64>() / n,
            mean_final_zombies: runs.iter().map(|r| r.final_stats.zombies as f64).sum::<f64>() / n,
            mean_extinction_tick,
        }
    }
}
