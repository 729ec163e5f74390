use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// North-up affine georeference: the outer corner of pixel `(0, 0)` and the
/// signed size of one pixel, all in degrees. Latitude usually steps
/// negatively down the rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// `(longitude, latitude)` of a point given in pixel-centre units, where
    /// `(0.0, 0.0)` is the centre of the first pixel.
    pub fn pixel_to_geo(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + (col + 0.5) * self.pixel_width,
            self.origin_y + (row + 0.5) * self.pixel_height,
        )
    }

    pub fn bounds(&self, width: usize, height: usize) -> Bounds {
        let x0 = self.origin_x;
        let x1 = self.origin_x + width as f64 * self.pixel_width;
        let y0 = self.origin_y;
        let y1 = self.origin_y + height as f64 * self.pixel_height;
        Bounds {
            west: x0.min(x1),
            east: x0.max(x1),
            south: y0.min(y1),
            north: y0.max(y1),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let values = [
            ("origin_x", self.origin_x),
            ("origin_y", self.origin_y),
            ("pixel_width", self.pixel_width),
            ("pixel_height", self.pixel_height),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(Error::invalid_value(name, "must be finite"));
            }
        }
        if self.pixel_width == 0.0 || self.pixel_height == 0.0 {
            return Err(Error::invalid_value("pixel size", "must be nonzero"));
        }
        Ok(())
    }
}

/// Comparison applied between a raster band and a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Relation {
    Equal,
    GreaterOrEqual,
    LessOrEqual,
    Greater,
    Less,
}

impl Relation {
    pub fn apply(&self, left: f64, right: f64) -> bool {
        match self {
            Relation::Equal => left == right,
            Relation::GreaterOrEqual => left >= right,
            Relation::LessOrEqual => left <= right,
            Relation::Greater => left > right,
            Relation::Less => left < right,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Equal => "eq",
            Relation::GreaterOrEqual => "ge",
            Relation::LessOrEqual => "le",
            Relation::Greater => "g",
            Relation::Less => "l",
        }
    }
}

impl FromStr for Relation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "eq" => Ok(Relation::Equal),
            "ge" => Ok(Relation::GreaterOrEqual),
            "le" => Ok(Relation::LessOrEqual),
            "g" => Ok(Relation::Greater),
            "l" => Ok(Relation::Less),
            other => Err(Error::InvalidOperation(other.to_string())),
        }
    }
}

impl TryFrom<String> for Relation {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Relation> for String {
    fn from(relation: Relation) -> Self {
        relation.as_str().to_string()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub relation: Relation,
    pub value: f64,
}

impl Threshold {
    pub fn new(relation: Relation, value: f64) -> Self {
        Self { relation, value }
    }

    pub fn eq(value: f64) -> Self {
        Self::new(Relation::Equal, value)
    }
}

/// One numeric band with its georeference.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterData {
    width: usize,
    height: usize,
    values: Vec<f64>,
    transform: GeoTransform,
}

impl RasterData {
    pub fn new(width: usize, height: usize, values: Vec<f64>, transform: GeoTransform) -> Result<Self> {
        check_size(width, height, values.len())?;
        transform.validate()?;
        Ok(Self {
            width,
            height,
            values,
            transform,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        (col < self.width && row < self.height).then(|| self.values[row * self.width + col])
    }

    /// A pixel is covered when every threshold holds for it.
    pub fn threshold(&self, thresholds: &[Threshold], error_if_no_data: bool) -> Result<CoverageRaster> {
        if thresholds.is_empty() {
            return Err(Error::invalid_value("thresholds", "at least one is needed"));
        }
        let cells: Vec<bool> = self
            .values
            .iter()
            .map(|v| thresholds.iter().all(|t| t.relation.apply(*v, t.value)))
            .collect();
        if error_if_no_data && !cells.iter().any(|c| *c) {
            return Err(Error::NoData);
        }
        CoverageRaster::new(self.width, self.height, cells, self.transform)
    }
}

/// A georeferenced boolean raster, row-major from the origin corner.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRaster {
    width: usize,
    height: usize,
    cells: Vec<bool>,
    transform: GeoTransform,
}

impl CoverageRaster {
    pub fn new(width: usize, height: usize, cells: Vec<bool>, transform: GeoTransform) -> Result<Self> {
        check_size(width, height, cells.len())?;
        transform.validate()?;
        Ok(Self {
            width,
            height,
            cells,
            transform,
        })
    }

    pub fn from_rows(rows: &[Vec<bool>], transform: GeoTransform) -> Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            return Err(Error::RasterSize {
                width,
                height: rows.len(),
                expected: width,
                actual: row.len(),
            });
        }
        Self::new(width, rows.len(), rows.concat(), transform)
    }

    /// Reads nested JSON rows. Any non-boolean cell is rejected.
    pub fn from_json(value: &Value, transform: GeoTransform) -> Result<Self> {
        let rows = value
            .as_array()
            .ok_or_else(|| Error::NotBoolean(format!("expected rows, got {value}")))?
            .iter()
            .map(|row| {
                row.as_array()
                    .ok_or_else(|| Error::NotBoolean(format!("expected a row, got {row}")))?
                    .iter()
                    .map(|cell| {
                        cell.as_bool()
                            .ok_or_else(|| Error::NotBoolean(format!("got {cell}")))
                    })
                    .collect::<Result<Vec<bool>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_rows(&rows, transform)
    }

    pub fn filled(width: usize, height: usize, value: bool, transform: GeoTransform) -> Result<Self> {
        Self::new(width, height, vec![value; width * height], transform)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Pixels outside the raster read as uncovered.
    pub fn get(&self, col: usize, row: usize) -> bool {
        col < self.width && row < self.height && self.cells[row * self.width + col]
    }

    pub fn set(&mut self, col: usize, row: usize, value: bool) {
        if col < self.width && row < self.height {
            self.cells[row * self.width + col] = value;
        }
    }

    pub fn count_covered(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn check_aligned(&self, other: &CoverageRaster) -> Result<()> {
        if self.width != other.width || self.height != other.height {
            return Err(Error::Misaligned(format!(
                "{}x{} against {}x{}",
                self.width, self.height, other.width, other.height
            )));
        }
        if self.transform != other.transform {
            return Err(Error::Misaligned(format!(
                "{:?} against {:?}",
                self.transform, other.transform
            )));
        }
        Ok(())
    }
}

/// Per-pixel count of how many aligned coverage rasters are covered.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapRaster {
    width: usize,
    height: usize,
    counts: Vec<u32>,
    transform: GeoTransform,
}

impl OverlapRaster {
    pub fn count(rasters: &[CoverageRaster]) -> Result<Self> {
        let first = rasters
            .first()
            .ok_or_else(|| Error::invalid_value("rasters", "at least one is needed"))?;
        let mut counts = vec![0u32; first.width * first.height];
        for raster in rasters {
            first.check_aligned(raster)?;
            for (count, covered) in counts.iter_mut().zip(&raster.cells) {
                *count += u32::from(*covered);
            }
        }
        Ok(Self {
            width: first.width,
            height: first.height,
            counts,
            transform: first.transform,
        })
    }

    pub fn get(&self, col: usize, row: usize) -> u32 {
        if col < self.width && row < self.height {
            self.counts[row * self.width + col]
        } else {
            0
        }
    }

    /// Distinct nonzero overlap counts, ascending.
    pub fn levels(&self) -> Vec<u32> {
        let mut levels: Vec<u32> = self.counts.iter().copied().filter(|c| *c > 0).collect();
        levels.sort_unstable();
        levels.dedup();
        levels
    }

    /// Pixels covered by exactly `level` rasters.
    pub fn level(&self, level: u32) -> CoverageRaster {
        CoverageRaster {
            width: self.width,
            height: self.height,
            cells: self.counts.iter().map(|c| *c == level).collect(),
            transform: self.transform,
        }
    }
}

fn check_size(width: usize, height: usize, actual: usize) -> Result<()> {
    let expected = width * height;
    if expected != actual {
        return Err(Error::RasterSize {
            width,
            height,
            expected,
            actual,
        });
    }
    Ok(())
}
