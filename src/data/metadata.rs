//! Sample metadata: time and treatment labels for each sample

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{NetdynError, Result};

/// Per-sample experimental annotations for the time course
///
/// Each sample carries a categorical time label (e.g. "day_2") and a
/// treatment label (e.g. "control" / "treated").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleMetadata {
    /// Sample identifiers
    sample_ids: Vec<String>,
    /// Time label for each sample
    time: Vec<String>,
    /// Treatment label for each sample
    treatment: Vec<String>,
}

impl SampleMetadata {
    /// Create new sample metadata
    pub fn new(
        sample_ids: Vec<String>,
        time: Vec<String>,
        treatment: Vec<String>,
    ) -> Result<Self> {
        if time.len() != sample_ids.len() {
            return Err(NetdynError::DimensionMismatch {
                expected: format!("{} time labels", sample_ids.len()),
                got: format!("{} time labels", time.len()),
            });
        }
        if treatment.len() != sample_ids.len() {
            return Err(NetdynError::DimensionMismatch {
                expected: format!("{} treatment labels", sample_ids.len()),
                got: format!("{} treatment labels", treatment.len()),
            });
        }

        {
            let mut seen = HashSet::new();
            for id in &sample_ids {
                if !seen.insert(id) {
                    log::warn!(
                        "Duplicate sample ID detected: '{}'. Sample IDs should be unique.",
                        id
                    );
                }
            }
        }

        Ok(Self {
            sample_ids,
            time,
            treatment,
        })
    }

    /// Get sample IDs
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Get number of samples
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Get the time label for a sample
    pub fn time(&self, sample_idx: usize) -> Result<&str> {
        self.time
            .get(sample_idx)
            .map(|s| s.as_str())
            .ok_or_else(|| NetdynError::InvalidInput {
                reason: format!("sample index {} out of range", sample_idx),
            })
    }

    /// Get the treatment label for a sample
    pub fn treatment(&self, sample_idx: usize) -> Result<&str> {
        self.treatment
            .get(sample_idx)
            .map(|s| s.as_str())
            .ok_or_else(|| NetdynError::InvalidInput {
                reason: format!("sample index {} out of range", sample_idx),
            })
    }

    /// Get sample index by ID
    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|id| id == sample_id)
    }

    /// Unique time levels, sorted
    pub fn time_levels(&self) -> Vec<String> {
        let mut unique: Vec<String> = self.time.clone();
        unique.sort();
        unique.dedup();
        unique
    }

    /// Unique treatment levels, sorted
    pub fn treatment_levels(&self) -> Vec<String> {
        let mut unique: Vec<String> = self.treatment.clone();
        unique.sort();
        unique.dedup();
        unique
    }

    /// Sample indices belonging to a specific (time, treatment) group
    pub fn samples_in_group(&self, time: &str, treatment: &str) -> Vec<usize> {
        (0..self.n_samples())
            .filter(|&i| self.time[i] == time && self.treatment[i] == treatment)
            .collect()
    }
}
