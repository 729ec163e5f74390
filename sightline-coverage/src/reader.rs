use std::{fs::File, io::BufReader, path::Path};

use bevy::log::debug;
use tiff::{
    decoder::{Decoder, DecodingResult},
    tags::Tag,
};

use crate::{Error, GeoTransform, RasterData, Result};

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;

/// Reads one band (1-based) of a GeoTIFF together with its georeference.
/// The file handle does not outlive the call.
pub fn read_band(path: impl AsRef<Path>, band: usize) -> Result<RasterData> {
    let path = path.as_ref();
    let mut decoder = Decoder::new(BufReader::new(File::open(path)?))?;
    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let scale = decoder
        .find_tag(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE))?
        .map(|v| v.into_f64_vec())
        .transpose()?
        .ok_or_else(|| Error::MissingGeoreference("no ModelPixelScale tag".to_string()))?;
    let tiepoint = decoder
        .find_tag(Tag::from_u16_exhaustive(MODEL_TIEPOINT))?
        .map(|v| v.into_f64_vec())
        .transpose()?
        .ok_or_else(|| Error::MissingGeoreference("no ModelTiepoint tag".to_string()))?;
    let transform = geo_transform(&scale, &tiepoint)?;

    let samples: Vec<f64> = match decoder.read_image()? {
        DecodingResult::U8(data) => data.iter().map(|&v| v as f64).collect(),
        DecodingResult::U16(data) => data.iter().map(|&v| v as f64).collect(),
        DecodingResult::U32(data) => data.iter().map(|&v| v as f64).collect(),
        DecodingResult::U64(data) => data.iter().map(|&v| v as f64).collect(),
        DecodingResult::I8(data) => data.iter().map(|&v| v as f64).collect(),
        DecodingResult::I16(data) => data.iter().map(|&v| v as f64).collect(),
        DecodingResult::I32(data) => data.iter().map(|&v| v as f64).collect(),
        DecodingResult::I64(data) => data.iter().map(|&v| v as f64).collect(),
        DecodingResult::F32(data) => data.iter().map(|&v| v as f64).collect(),
        DecodingResult::F64(data) => data,
    };

    let pixels = width * height;
    let bands = if pixels == 0 { 0 } else { samples.len() / pixels };
    if band == 0 || band > bands {
        return Err(Error::MissingBand { band, bands });
    }
    // chunky layout: samples of one pixel are adjacent
    let values: Vec<f64> = samples
        .iter()
        .skip(band - 1)
        .step_by(bands)
        .copied()
        .take(pixels)
        .collect();
    debug!(
        "read band {} of {} ({}x{}, {:?}) from {}",
        band,
        bands,
        width,
        height,
        transform.bounds(width, height),
        path.display()
    );
    RasterData::new(width, height, values, transform)
}

/// Origin and pixel size from the GeoTIFF scale `(sx, sy, sz)` and tiepoint
/// `(i, j, k, x, y, z)` tags; rows step southwards.
fn geo_transform(scale: &[f64], tiepoint: &[f64]) -> Result<GeoTransform> {
    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(Error::MissingGeoreference(format!(
            "{} scale and {} tiepoint values",
            scale.len(),
            tiepoint.len()
        )));
    }
    let (sx, sy) = (scale[0], scale[1]);
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    let transform = GeoTransform::new(x - i * sx, y + j * sy, sx, -sy);
    transform.validate()?;
    Ok(transform)
}
