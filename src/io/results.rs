//! Writers for fitted parameters and trajectories

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::ModelOutcome;

/// Serializable summary of one model run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitSummary {
    pub gene_ids: Vec<String>,
    pub rates: Vec<f64>,
    pub capacities: Vec<f64>,
    pub loss: f64,
    pub converged: bool,
    pub n_iter: usize,
    pub n_evals: usize,
}

impl From<&ModelOutcome> for FitSummary {
    fn from(outcome: &ModelOutcome) -> Self {
        Self {
            gene_ids: outcome.gene_ids.clone(),
            rates: outcome.fit.params.rates().to_vec(),
            capacities: outcome.fit.params.capacities().to_vec(),
            loss: outcome.fit.loss,
            converged: outcome.fit.converged,
            n_iter: outcome.fit.n_iter,
            n_evals: outcome.fit.n_evals,
        }
    }
}

/// Write the per-gene fitted parameters as a tab-separated table
pub fn write_fit_results<P: AsRef<Path>>(path: P, outcome: &ModelOutcome) -> Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "gene_id\trate\tcarrying_capacity")?;
    let rates = outcome.fit.params.rates();
    let capacities = outcome.fit.params.capacities();
    for (i, gene_id) in outcome.gene_ids.iter().enumerate() {
        writeln!(file, "{}\t{:.6}\t{:.6}", gene_id, rates[i], capacities[i])?;
    }

    Ok(())
}

/// Write observed and predicted expression per gene and time point in long
/// format
///
/// Forecast points beyond the observed grid get an empty `observed` field.
pub fn write_trajectory<P: AsRef<Path>>(path: P, outcome: &ModelOutcome) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["gene_id", "time", "observed", "predicted"])?;

    for (i, gene_id) in outcome.gene_ids.iter().enumerate() {
        for (col, &t) in outcome.forecast_time_points.iter().enumerate() {
            let observed = outcome
                .observed_time_points
                .iter()
                .position(|&ot| ot == t)
                .map(|obs_col| format!("{:.6}", outcome.observed[[i, obs_col]]))
                .unwrap_or_default();
            let time = format!("{}", t);
            let predicted = format!("{:.6}", outcome.predicted[[i, col]]);
            writer.write_record([
                gene_id.as_str(),
                time.as_str(),
                observed.as_str(),
                predicted.as_str(),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Write a predicted trajectory (no observed column) in long format
pub fn write_predictions<P: AsRef<Path>>(
    path: P,
    gene_ids: &[String],
    time_points: &[f64],
    predicted: ndarray::ArrayView2<'_, f64>,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["gene_id", "time", "predicted"])?;

    for (i, gene_id) in gene_ids.iter().enumerate() {
        for (col, &t) in time_points.iter().enumerate() {
            let time = format!("{}", t);
            let value = format!("{:.6}", predicted[[i, col]]);
            writer.write_record([gene_id.as_str(), time.as_str(), value.as_str()])?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Write a median expression table with `{time}_{treatment}` column labels
pub fn write_median_expression<P: AsRef<Path>>(
    path: P,
    medians: &crate::data::MedianExpression,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["Name".to_string()];
    header.extend(
        medians
            .groups()
            .iter()
            .map(|(time, treatment)| format!("{}_{}", time, treatment)),
    );
    writer.write_record(&header)?;

    let values = medians.values();
    for (i, gene_id) in medians.gene_ids().iter().enumerate() {
        let mut record = vec![gene_id.clone()];
        for j in 0..medians.n_groups() {
            record.push(format!("{:.6}", values[[i, j]]));
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the JSON fit summary
pub fn write_fit_summary<P: AsRef<Path>>(path: P, outcome: &ModelOutcome) -> Result<()> {
    let summary = FitSummary::from(outcome);
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &summary)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FitOutcome, ModelParams};
    use ndarray::array;
    use tempfile::NamedTempFile;

    fn outcome() -> ModelOutcome {
        ModelOutcome {
            gene_ids: vec!["g1".into(), "g2".into()],
            fit: FitOutcome {
                params: ModelParams::new(array![0.5, 0.6], array![8.0, 9.0]).unwrap(),
                loss: 0.25,
                converged: true,
                n_iter: 10,
                n_evals: 25,
            },
            observed_time_points: vec![0.0, 1.0],
            observed: array![[1.0, 2.0], [3.0, 4.0]],
            forecast_time_points: vec![0.0, 1.0, 2.0],
            predicted: array![[1.0, 2.1, 3.2], [3.0, 4.1, 5.2]],
        }
    }

    #[test]
    fn test_write_fit_results() {
        let file = NamedTempFile::new().unwrap();
        write_fit_results(file.path(), &outcome()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "gene_id\trate\tcarrying_capacity");
        assert!(lines[1].starts_with("g1\t0.5"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_trajectory_blank_observed_beyond_grid() {
        let file = NamedTempFile::new().unwrap();
        write_trajectory(file.path(), &outcome()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "gene_id,time,observed,predicted");
        // t = 2 has no observed column
        assert!(lines[3].starts_with("g1,2,,"));
    }

    #[test]
    fn test_fit_summary_json_round_trip() {
        let file = NamedTempFile::new().unwrap();
        write_fit_summary(file.path(), &outcome()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        let summary: FitSummary = serde_json::from_str(&contents).unwrap();
        assert_eq!(summary.gene_ids, vec!["g1", "g2"]);
        assert!(summary.converged);
        assert_eq!(summary.rates, vec![0.5, 0.6]);
    }
}
