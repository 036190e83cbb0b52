//! Predictor configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Shape and identity settings for one predictor session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Number of history values used as input for each prediction
    #[serde(default = "default_depth")]
    pub depth: usize,

    /// Request probability-weighted candidate lists instead of scalar
    /// estimates. The remote service's support for this path is partial;
    /// the client decodes it without assuming its numeric semantics.
    #[serde(default)]
    pub prob: bool,

    /// User identifier echoed on every object
    #[serde(default = "default_uid")]
    pub uid: u32,

    /// Request identifier (0-127) echoed on every object
    #[serde(default = "default_rid")]
    pub rid: u8,
}

fn default_depth() -> usize {
    4
}

fn default_uid() -> u32 {
    55
}

fn default_rid() -> u8 {
    33
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            prob: false,
            uid: 55,
            rid: 33,
        }
    }
}

impl PredictorConfig {
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    pub fn probabilistic(mut self, prob: bool) -> Self {
        self.prob = prob;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if self.rid > 127 {
            return Err(ConfigError::RidOutOfRange(self.rid));
        }
        Ok(())
    }
}
