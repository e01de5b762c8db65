use super::*;
use rayon::prelude::*;

/// Runs independent models in parallel.  Each model owns its bus and
/// battery, so results match running them one after another.
pub fn run_models(models: &mut [Model], n_days: u32) -> Vec<anyhow::Result<RunSummary>> {
    models
        .par_iter_mut()
        .map(|model| model.run(n_days))
        .collect()
}
