//! Configuration types for smoke tunnel simulation parameters.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid width in cells (X dimension).
    pub width: usize,
    /// Grid height in cells (Y dimension).
    pub height: usize,
    /// Uniform cell spacing `h`.
    pub cell_size: f32,
    /// Fluid density, only used to scale the reported pressure.
    #[serde(default = "default_density")]
    pub density: f32,
    /// Over-relaxation factor for the pressure sweeps.
    #[serde(default = "default_over_relaxation")]
    pub over_relaxation: f32,
    /// Time step per tick.
    #[serde(default = "default_dt")]
    pub dt: f32,
    /// Vertical acceleration applied to open faces.
    #[serde(default)]
    pub gravity: f32,
    /// Pressure relaxation sweeps per tick.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Inflow/outflow policy at the domain edges.
    #[serde(default)]
    pub boundary: BoundaryConfig,
}

fn default_density() -> f32 {
    1000.0
}

fn default_over_relaxation() -> f32 {
    1.9
}

fn default_dt() -> f32 {
    1.0 / 60.0
}

fn default_iterations() -> usize {
    40
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 128,
            cell_size: 1.0 / 128.0,
            density: default_density(),
            over_relaxation: default_over_relaxation(),
            dt: default_dt(),
            gravity: 0.0,
            iterations: default_iterations(),
            boundary: BoundaryConfig::default(),
        }
    }
}

/// Boundary policy applied once per tick after the pressure solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Constant external flow entering through one column.
    pub inflow: Option<InflowConfig>,
    /// Tracer injected alongside the inflow.
    pub marker: Option<MarkerConfig>,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            inflow: Some(InflowConfig::default()),
            marker: Some(MarkerConfig::default()),
        }
    }
}

/// Fixed normal velocity written into one column every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InflowConfig {
    /// Column whose x-velocity is overwritten.
    pub column: usize,
    /// Inflow speed along +x.
    pub speed: f32,
    /// Optional `[start, end)` row range; a narrow range makes a jet.
    #[serde(default)]
    pub rows: Option<(usize, usize)>,
}

impl Default for InflowConfig {
    fn default() -> Self {
        Self {
            column: 1,
            speed: 1.0,
            rows: None,
        }
    }
}

impl InflowConfig {
    /// Rows receiving the inflow, clipped to the open interior `1..height-1`.
    pub fn row_range(&self, height: usize) -> std::ops::Range<usize> {
        let interior_end = height.saturating_sub(1);
        match self.rows {
            Some((start, end)) => start.max(1)..end.min(interior_end),
            None => 1..interior_end,
        }
    }
}

/// Marker band seeded in the inflow column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Value written into seeded cells.
    pub value: f32,
    /// Band center as a fraction of the grid height.
    pub center: f32,
    /// Band half width as a fraction of the grid height.
    pub half_width: f32,
    /// Extra striped rows outside the central band.
    #[serde(default)]
    pub stripes: Option<StripeConfig>,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            value: 1.0,
            center: 0.5,
            half_width: 1.0 / 16.0,
            stripes: Some(StripeConfig::default()),
        }
    }
}

/// Periodic marker stripes: rows where `floor((j - C - margin) / width)` is a
/// multiple of `period`, excluding `margin` rows at each wall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    pub width: usize,
    pub period: usize,
    pub margin: usize,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            width: 4,
            period: 4,
            margin: 8,
        }
    }
}

impl MarkerConfig {
    /// Whether row `j` of a grid with `height` rows is seeded.
    pub fn covers_row(&self, j: usize, height: usize) -> bool {
        let center = (self.center * height as f32).floor() as i64;
        let offset = j as i64 - center;
        if (offset.abs() as f32) < self.half_width * height as f32 {
            return true;
        }
        match &self.stripes {
            Some(stripes) => {
                let margin = stripes.margin as i64;
                let inside = j as i64 > margin && (j as i64) < height as i64 - margin;
                inside
                    && (offset - margin)
                        .div_euclid(stripes.width as i64)
                        .rem_euclid(stripes.period as i64)
                        == 0
            }
            None => false,
        }
    }
}

impl SimulationConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 3 || self.height < 3 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if !(self.density > 0.0) {
            return Err(ConfigError::InvalidDensity(self.density));
        }
        if !(self.over_relaxation > 0.0 && self.over_relaxation < 2.0) {
            return Err(ConfigError::InvalidOverRelaxation(self.over_relaxation));
        }
        if !(self.dt > 0.0) {
            return Err(ConfigError::InvalidTimeStep);
        }
        if let Some(inflow) = &self.boundary.inflow {
            if inflow.column == 0 || inflow.column >= self.width {
                return Err(ConfigError::InvalidInflowColumn {
                    column: inflow.column,
                    width: self.width,
                });
            }
            if inflow.row_range(self.height).is_empty() {
                return Err(ConfigError::EmptyInflowRows);
            }
        }
        if let Some(marker) = &self.boundary.marker {
            if marker.half_width < 0.0 {
                return Err(ConfigError::InvalidMarkerBand);
            }
            if let Some(stripes) = &marker.stripes {
                if stripes.width == 0 || stripes.period == 0 {
                    return Err(ConfigError::InvalidMarkerBand);
                }
            }
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid must be at least 3x3 cells, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("Cell size must be positive, got {0}")]
    InvalidCellSize(f32),
    #[error("Density must be positive, got {0}")]
    InvalidDensity(f32),
    #[error("Over-relaxation must lie in (0, 2), got {0}")]
    InvalidOverRelaxation(f32),
    #[error("Time step must be positive")]
    InvalidTimeStep,
    #[error("Inflow column {column} outside 1..{width}")]
    InvalidInflowColumn { column: usize, width: usize },
    #[error("Inflow row range does not cover any open row")]
    EmptyInflowRows,
    #[error("Marker band parameters must be non-negative with non-zero stripe width and period")]
    InvalidMarkerBand,
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_over_relaxation() {
        let config = SimulationConfig {
            over_relaxation: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOverRelaxation(_))
        ));
    }

    #[test]
    fn test_rejects_degenerate_grid() {
        let config = SimulationConfig {
            width: 2,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_rejects_inflow_outside_grid() {
        let mut config = SimulationConfig::default();
        config.boundary.inflow = Some(InflowConfig {
            column: 0,
            ..Default::default()
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidInflowColumn { column: 0, .. })
        ));
    }

    #[test]
    fn test_inflow_rows_clipped_to_interior() {
        let inflow = InflowConfig {
            rows: Some((0, 100)),
            ..Default::default()
        };
        assert_eq!(inflow.row_range(10), 1..9);
        assert_eq!(InflowConfig::default().row_range(10), 1..9);

        let jet = InflowConfig {
            rows: Some((4, 6)),
            ..Default::default()
        };
        assert_eq!(jet.row_range(10), 4..6);
    }

    #[test]
    fn test_marker_band_and_stripes() {
        let marker = MarkerConfig::default();
        let height = 128;
        // Central band: |j - 64| < 8
        assert!(marker.covers_row(64, height));
        assert!(marker.covers_row(57, height));
        assert!(marker.covers_row(71, height));
        // Rows inside the wall margin are never striped
        assert!(!marker.covers_row(3, height));
        assert!(!marker.covers_row(124, height));

        let plain = MarkerConfig {
            stripes: None,
            ..Default::default()
        };
        assert!(plain.covers_row(64, height));
        assert!(!plain.covers_row(20, height));
    }

    #[test]
    fn test_stripes_repeat_every_period() {
        let marker = MarkerConfig {
            half_width: 0.0,
            ..Default::default()
        };
        let height = 128;
        // offset - margin = 0..4 starts a stripe: j = 64 + 8 .. 64 + 12
        for j in 72..76 {
            assert!(marker.covers_row(j, height), "row {j} should be striped");
        }
        for j in 76..88 {
            assert!(!marker.covers_row(j, height), "row {j} should be clear");
        }
        for j in 88..92 {
            assert!(marker.covers_row(j, height), "row {j} should be striped");
        }
        // Below the center the euclidean modulo keeps the same spacing
        for j in 56..60 {
            assert!(marker.covers_row(j, height), "row {j} should be striped");
        }
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"width": 32, "height": 16, "cell_size": 0.0625, "iterations": 20}}"#
        )
        .unwrap();

        let config = SimulationConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.width, 32);
        assert_eq!(config.height, 16);
        assert_eq!(config.iterations, 20);
        assert_eq!(config.over_relaxation, 1.9);
        assert!(config.boundary.inflow.is_some());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"width": 32, "height": 1, "cell_size": 0.1}}"#).unwrap();
        assert!(matches!(
            SimulationConfig::from_json_file(file.path()),
            Err(ConfigError::InvalidDimensions { .. })
        ));

        let mut garbage = NamedTempFile::new().unwrap();
        write!(garbage, "not json").unwrap();
        assert!(matches!(
            SimulationConfig::from_json_file(garbage.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
