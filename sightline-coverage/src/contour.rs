use std::collections::BTreeMap;

use bevy::math::DVec2;
use sightline_scene::GeodeticPoint;

use crate::{CoverageRaster, GeoTransform};

/// Edge of the padded pixel lattice, named by the doubled coordinates of its
/// midpoint. Ordering on it keeps tracing deterministic.
type EdgeKey = (i64, i64);

/// A closed iso-line in pixel-centre units: `(0, 0)` is the centre of the
/// first pixel, x runs along columns and y along rows. The closing point is
/// implied.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<DVec2>,
}

impl Contour {
    /// Pixels whose centres lie inside the ring, by the even-odd rule.
    pub fn interior_pixels(&self, width: usize, height: usize) -> Vec<(usize, usize)> {
        let n = self.points.len();
        let mut pixels = Vec::new();
        if n < 3 {
            return pixels;
        }
        let (low, high) = self
            .points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
        let first_row = low.ceil().max(0.0) as usize;
        let last_row = (high.floor() as i64).min(height as i64 - 1);
        if last_row < first_row as i64 {
            return pixels;
        }
        let mut crossings = Vec::new();
        for row in first_row..=last_row as usize {
            let y = row as f64;
            crossings.clear();
            for k in 0..n {
                let a = self.points[k];
                let b = self.points[(k + 1) % n];
                if (a.y <= y) != (b.y <= y) {
                    crossings.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for span in crossings.chunks_exact(2) {
                let first = (span[0].floor() as i64 + 1).max(0);
                let last = (span[1].ceil() as i64 - 1).min(width as i64 - 1);
                for col in first..=last {
                    pixels.push((col as usize, row));
                }
            }
        }
        pixels
    }

    pub fn to_geodetic(&self, transform: &GeoTransform) -> Vec<GeodeticPoint> {
        self.points
            .iter()
            .map(|p| {
                let (longitude, latitude) = transform.pixel_to_geo(p.x, p.y);
                GeodeticPoint::new(latitude, longitude, 0.0)
            })
            .collect()
    }
}

/// Marching squares over the raster padded with one uncovered pixel on every
/// side, so every contour closes. Covered pixels meeting only at a corner
/// stay apart. Collinear vertices are dropped.
pub fn trace_contours(raster: &CoverageRaster, level: f64) -> Vec<Contour> {
    let width = raster.width() as i64;
    let height = raster.height() as i64;
    let covered = |x: i64, y: i64| {
        x >= 1 && y >= 1 && x <= width && y <= height && raster.get((x - 1) as usize, (y - 1) as usize)
    };

    // Each crossing is left by exactly one segment and entered by exactly one.
    let mut next: BTreeMap<EdgeKey, EdgeKey> = BTreeMap::new();
    for j in 0..=height {
        for i in 0..=width {
            // clockwise on screen: top-left, top-right, bottom-right, bottom-left
            let corners = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)];
            let values = corners.map(|(x, y)| covered(x, y));
            for exit in 0..4 {
                if !(values[exit] && !values[(exit + 1) % 4]) {
                    continue;
                }
                let mut entry = (exit + 3) % 4;
                while values[entry] || !values[(entry + 1) % 4] {
                    entry = (entry + 3) % 4;
                }
                next.insert(
                    edge_key(corners[exit], corners[(exit + 1) % 4]),
                    edge_key(corners[entry], corners[(entry + 1) % 4]),
                );
            }
        }
    }

    let mut contours = Vec::new();
    while let Some((start, mut current)) = next.pop_first() {
        let mut ring = vec![start];
        while current != start {
            ring.push(current);
            match next.remove(&current) {
                Some(following) => current = following,
                None => break,
            }
        }
        let points = ring
            .into_iter()
            .map(|key| crossing_point(key, &covered, level))
            .collect();
        contours.push(Contour {
            points: drop_collinear(points),
        });
    }
    contours
}

fn edge_key(a: (i64, i64), b: (i64, i64)) -> EdgeKey {
    (a.0 + b.0, a.1 + b.1)
}

/// Where the iso-line cuts an edge, interpolated from the uncovered end and
/// shifted back out of the padding.
fn crossing_point(key: EdgeKey, covered: &impl Fn(i64, i64) -> bool, level: f64) -> DVec2 {
    let (x, y) = key;
    let (a, b) = if x % 2 != 0 {
        ((x.div_euclid(2), y / 2), (x.div_euclid(2) + 1, y / 2))
    } else {
        ((x / 2, y.div_euclid(2)), (x / 2, y.div_euclid(2) + 1))
    };
    let (outside, inside) = if covered(a.0, a.1) { (b, a) } else { (a, b) };
    let outside = DVec2::new(outside.0 as f64, outside.1 as f64);
    let inside = DVec2::new(inside.0 as f64, inside.1 as f64);
    outside + level * (inside - outside) - DVec2::ONE
}

fn collinear(a: DVec2, b: DVec2, c: DVec2) -> bool {
    (b - a).perp_dot(c - b).abs() <= 1e-9
}

fn drop_collinear(ring: Vec<DVec2>) -> Vec<DVec2> {
    let mut kept: Vec<DVec2> = Vec::with_capacity(ring.len());
    for point in ring {
        while kept.len() >= 2 && collinear(kept[kept.len() - 2], kept[kept.len() - 1], point) {
            kept.pop();
        }
        kept.push(point);
    }
    while kept.len() > 3 {
        let n = kept.len();
        if collinear(kept[n - 2], kept[n - 1], kept[0]) {
            kept.pop();
        } else if collinear(kept[n - 1], kept[0], kept[1]) {
            kept.remove(0);
        } else {
            break;
        }
    }
    kept
}
