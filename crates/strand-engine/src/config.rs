//! Run configuration, validation and configuration errors.
//!
//! [`SimulationConfig`] is the builder input for a [`Simulation`]. The
//! driver calls [`validate()`](SimulationConfig::validate) before it
//! accepts any reaction or polymer.
//!
//! [`Simulation`]: crate::Simulation

use strand_polymer::PolymerError;
use thiserror::Error;

// ── SimulationConfig ──────────────────────────────────────────────

/// Clock and volume settings for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Simulated time at which the run stops.
    pub run_time: f64,
    /// Interval between species snapshots.
    pub time_step: f64,
    /// Effective reaction volume in litres.
    pub cell_volume: f64,
    /// Random seed. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// Configuration with an OS-drawn seed.
    pub fn new(run_time: f64, time_step: f64, cell_volume: f64) -> Self {
        Self {
            run_time,
            time_step,
            cell_volume,
            seed: None,
        }
    }

    /// Fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that every value is finite and positive and that at least one
    /// snapshot interval fits in the run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.run_time.is_finite() || self.run_time <= 0.0 {
            return Err(ConfigError::InvalidRunTime {
                value: self.run_time,
            });
        }
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(ConfigError::InvalidTimeStep {
                value: self.time_step,
            });
        }
        if self.time_step > self.run_time {
            return Err(ConfigError::TimeStepExceedsRunTime {
                time_step: self.time_step,
                run_time: self.run_time,
            });
        }
        if !self.cell_volume.is_finite() || self.cell_volume <= 0.0 {
            return Err(ConfigError::InvalidCellVolume {
                value: self.cell_volume,
            });
        }
        Ok(())
    }
}

// ── ConfigError ───────────────────────────────────────────────────

/// Errors detected while configuring a simulation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// `run_time` is NaN, infinite, zero or negative.
    #[error("run_time must be finite and positive, got {value}")]
    InvalidRunTime {
        /// The invalid value.
        value: f64,
    },
    /// `time_step` is NaN, infinite, zero or negative.
    #[error("time_step must be finite and positive, got {value}")]
    InvalidTimeStep {
        /// The invalid value.
        value: f64,
    },
    /// `time_step` is longer than the whole run.
    #[error("time_step {time_step} exceeds run_time {run_time}")]
    TimeStepExceedsRunTime {
        /// Configured snapshot interval.
        time_step: f64,
        /// Configured run length.
        run_time: f64,
    },
    /// `cell_volume` is NaN, infinite, zero or negative.
    #[error("cell_volume must be finite and positive, got {value}")]
    InvalidCellVolume {
        /// The invalid value.
        value: f64,
    },
    /// A species reaction has an unsupported shape or rate.
    #[error("invalid reaction {reactants:?} -> {products:?}: {reason}")]
    InvalidReaction {
        /// Reactant species.
        reactants: Vec<String>,
        /// Product species.
        products: Vec<String>,
        /// What was wrong.
        reason: String,
    },
    /// A polymerase template failed validation.
    #[error("invalid polymerase '{name}': {reason}")]
    InvalidPolymerase {
        /// Species name.
        name: String,
        /// What was wrong.
        reason: String,
    },
    /// A genome failed to build.
    #[error("invalid genome: {0}")]
    InvalidGenome(#[source] PolymerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_passes() {
        assert!(SimulationConfig::new(10.0, 1.0, 8e-15).validate().is_ok());
    }

    #[test]
    fn rejects_non_finite_and_non_positive_values() {
        match SimulationConfig::new(f64::NAN, 1.0, 8e-15).validate() {
            Err(ConfigError::InvalidRunTime { .. }) => {}
            other => panic!("expected InvalidRunTime, got {other:?}"),
        }
        match SimulationConfig::new(10.0, 0.0, 8e-15).validate() {
            Err(ConfigError::InvalidTimeStep { value }) => assert_eq!(value, 0.0),
            other => panic!("expected InvalidTimeStep, got {other:?}"),
        }
        match SimulationConfig::new(10.0, 1.0, -1.0).validate() {
            Err(ConfigError::InvalidCellVolume { .. }) => {}
            other => panic!("expected InvalidCellVolume, got {other:?}"),
        }
    }

    #[test]
    fn time_step_must_fit_in_run() {
        match SimulationConfig::new(1.0, 2.0, 8e-15).validate() {
            Err(ConfigError::TimeStepExceedsRunTime { .. }) => {}
            other => panic!("expected TimeStepExceedsRunTime, got {other:?}"),
        }
    }

    #[test]
    fn seed_is_optional() {
        let cfg = SimulationConfig::new(10.0, 1.0, 8e-15);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.with_seed(7).seed, Some(7));
    }
}
