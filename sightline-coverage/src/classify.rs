use bevy::log::{debug, warn};
use serde::{Deserialize, Serialize};
use sightline_scene::GeodeticPoint;

use crate::{trace_contours, Contour, CoverageRaster, Error, GeoTransform, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourKind {
    Coverage,
    Hole,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierOptions {
    /// Iso-level traced between uncovered (0) and covered (1) pixels.
    pub level: f64,
    /// Minimum share of agreeing interior pixels needed to decide a contour.
    pub threshold: f64,
    pub error_on_uncertainty: bool,
    /// Where undecided contours go when they are not an error.
    pub uncertain_as: ContourKind,
    /// Thresholding a numeric band to nothing is an error.
    pub error_if_no_data: bool,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            level: 0.5,
            threshold: 0.9,
            error_on_uncertainty: true,
            uncertain_as: ContourKind::Hole,
            error_if_no_data: true,
        }
    }
}

impl ClassifierOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.level > 0.0 && self.level < 1.0) {
            return Err(Error::invalid_value("level", "must lie strictly between 0 and 1"));
        }
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(Error::invalid_value("threshold", "must lie in (0, 1]"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedContour {
    pub kind: ContourKind,
    /// Share of interior pixels that are covered.
    pub certainty: f64,
    pub pixel_count: usize,
    pub contour: Contour,
    pub ring: Vec<GeodeticPoint>,
}

/// Contours of one raster, each marked as coverage or hole, in tracing
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub contours: Vec<ClassifiedContour>,
    pub width: usize,
    pub height: usize,
    pub transform: GeoTransform,
}

impl Classification {
    pub fn coverage(&self) -> impl Iterator<Item = &ClassifiedContour> {
        self.contours
            .iter()
            .filter(|c| c.kind == ContourKind::Coverage)
    }

    pub fn holes(&self) -> impl Iterator<Item = &ClassifiedContour> {
        self.contours.iter().filter(|c| c.kind == ContourKind::Hole)
    }

    pub fn coverage_rings(&self) -> Vec<Vec<GeodeticPoint>> {
        self.coverage().map(|c| c.ring.clone()).collect()
    }

    pub fn hole_rings(&self) -> Vec<Vec<GeodeticPoint>> {
        self.holes().map(|c| c.ring.clone()).collect()
    }

    /// Paints the contours back onto an empty raster, outermost first:
    /// coverage interiors are set and hole interiors cleared.
    pub fn burn(&self) -> Result<CoverageRaster> {
        let mut raster = CoverageRaster::filled(self.width, self.height, false, self.transform)?;
        let mut order: Vec<&ClassifiedContour> = self.contours.iter().collect();
        order.sort_by(|a, b| b.pixel_count.cmp(&a.pixel_count));
        for contour in order {
            let value = contour.kind == ContourKind::Coverage;
            for (col, row) in contour.contour.interior_pixels(self.width, self.height) {
                raster.set(col, row, value);
            }
        }
        Ok(raster)
    }
}

/// Traces `raster` and decides every contour by the share of covered pixels
/// it encloses.
pub fn classify(raster: &CoverageRaster, options: &ClassifierOptions) -> Result<Classification> {
    options.validate()?;
    let (width, height) = (raster.width(), raster.height());
    let transform = *raster.transform();

    let mut contours = Vec::new();
    for (index, contour) in trace_contours(raster, options.level).into_iter().enumerate() {
        let pixels = contour.interior_pixels(width, height);
        if pixels.is_empty() {
            return Err(Error::DegenerateContour { index });
        }
        let covered = pixels
            .iter()
            .filter(|(col, row)| raster.get(*col, *row))
            .count();
        let certainty = covered as f64 / pixels.len() as f64;
        let kind = if certainty >= options.threshold {
            ContourKind::Coverage
        } else if 1.0 - certainty >= options.threshold {
            ContourKind::Hole
        } else if options.error_on_uncertainty {
            return Err(Error::UncertainContour {
                index,
                coverage: certainty,
                hole: 1.0 - certainty,
                threshold: options.threshold,
            });
        } else {
            warn!(
                "contour {} is uncertain (coverage {:.3}), treating it as {:?}",
                index, certainty, options.uncertain_as
            );
            options.uncertain_as
        };
        contours.push(ClassifiedContour {
            kind,
            certainty,
            pixel_count: pixels.len(),
            ring: contour.to_geodetic(&transform),
            contour,
        });
    }

    let classification = Classification {
        contours,
        width,
        height,
        transform,
    };
    debug!(
        "classified {}x{} raster: {} coverage, {} holes",
        width,
        height,
        classification.coverage().count(),
        classification.holes().count()
    );
    Ok(classification)
}

/// Reads `band` of a GeoTIFF, keeps the pixels meeting every threshold and
/// classifies the result. The file is closed before tracing starts.
#[cfg(feature = "geotiff")]
pub fn classify_path(
    path: impl AsRef<std::path::Path>,
    band: usize,
    thresholds: &[crate::Threshold],
    options: &ClassifierOptions,
) -> Result<Classification> {
    let data = crate::read_band(path, band)?;
    let raster = data.threshold(thresholds, options.error_if_no_data)?;
    classify(&raster, options)
}
