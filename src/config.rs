use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::interpolation::InterpolationMode;
use crate::metric::MetricKind;
use crate::registration::RegistrationParams;

/// Runtime configuration, loadable from TOML or JSON.
///
/// A malformed or invalid file is a hard error; there is no silent fall-back
/// to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub metric: MetricKind,
    pub registration: RegistrationParams,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Interpolation for the final aligned raster; the search itself always
    /// uses nearest-neighbour.
    pub final_interpolation: InterpolationMode,
    /// Block count per axis for checkerboard comparison images.
    pub checkerboard_blocks: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            final_interpolation: InterpolationMode::Bilinear,
            checkerboard_blocks: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(&path)?;

        let config: Config = if content.trim_start().starts_with('{') {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        if let Err(errors) = config.validate() {
            anyhow::bail!(
                "invalid configuration in '{}': {}",
                path.as_ref().display(),
                errors.join("; ")
            );
        }
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P, format: ConfigFormat) -> crate::Result<()> {
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = self.registration.validate() {
            errors.push(e.to_string());
        }
        if self.output.checkerboard_blocks == 0 {
            errors.push("output.checkerboard_blocks must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
