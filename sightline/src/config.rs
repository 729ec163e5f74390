use std::path::{Path, PathBuf};

use bevy::log::info;
use serde::{Deserialize, Serialize};
use sightline_coverage::ClassifierOptions;
use sightline_math::{Ellipsoid, WGS84_SEMI_MAJOR_AXIS, WGS84_SEMI_MINOR_AXIS};
use serde_json::Value;
use sightline_scene::{
    BillboardRegistry, BorderRegistry, Broadcast, FovGenerator, SensorArray, DEFAULT_ARC_POINTS,
};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EllipsoidSettings {
    pub semi_major_axis: f64,
    pub semi_minor_axis: f64,
}

impl Default for EllipsoidSettings {
    fn default() -> Self {
        Self {
            semi_major_axis: WGS84_SEMI_MAJOR_AXIS,
            semi_minor_axis: WGS84_SEMI_MINOR_AXIS,
        }
    }
}

/// Everything a caller may want to fix once per run, usually read from a
/// `sightline.toml`:
///
/// ```toml
/// border_dir = "data/borders"
/// arc_points = 16
///
/// [ellipsoid]
/// semi_major_axis = 6378137.0
/// semi_minor_axis = 6356752.314245179
///
/// [classifier]
/// threshold = 0.8
/// error_on_uncertainty = false
/// uncertain_as = "coverage"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ellipsoid: EllipsoidSettings,
    /// Samples per arc for sensors that do not set their own.
    pub arc_points: usize,
    pub classifier: ClassifierOptions,
    pub border_dir: Option<PathBuf>,
    pub billboard_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ellipsoid: EllipsoidSettings::default(),
            arc_points: DEFAULT_ARC_POINTS,
            classifier: ClassifierOptions::default(),
            border_dir: None,
            billboard_dir: None,
        }
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&content)?;
        info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let EllipsoidSettings {
            semi_major_axis: a,
            semi_minor_axis: b,
        } = self.ellipsoid;
        if !(a.is_finite() && b.is_finite() && b > 0.0 && a >= b) {
            return Err(Error::Settings(format!(
                "ellipsoid axes {a} and {b} must be finite with 0 < minor <= major"
            )));
        }
        if self.arc_points < 2 {
            return Err(Error::Settings(format!(
                "arc_points is {}, at least 2 are needed",
                self.arc_points
            )));
        }
        self.classifier.validate()?;
        Ok(())
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        Ellipsoid::from_axes(self.ellipsoid.semi_major_axis, self.ellipsoid.semi_minor_axis)
    }

    pub fn fov_generator(&self) -> FovGenerator {
        FovGenerator::new(self.ellipsoid())
    }

    /// [`SensorArray::from_json`], falling back to [`Settings::arc_points`]
    /// when the document has no `arc_points` of its own.
    pub fn sensors_from_json(&self, value: &Value) -> Result<SensorArray> {
        let mut sensors = SensorArray::from_json(value)?;
        if value.get("arc_points").is_none() {
            sensors.arc_points = Broadcast::Scalar(self.arc_points);
        }
        Ok(sensors)
    }

    /// Borders from `border_dir`, or an empty registry when none is set.
    pub fn border_registry(&self) -> Result<BorderRegistry> {
        match &self.border_dir {
            Some(dir) => Ok(BorderRegistry::load_dir(dir)?),
            None => Ok(BorderRegistry::borders()),
        }
    }

    pub fn billboard_registry(&self) -> Result<BillboardRegistry> {
        match &self.billboard_dir {
            Some(dir) => Ok(BillboardRegistry::load_dir(dir)?),
            None => Ok(BillboardRegistry::billboards()),
        }
    }
}
