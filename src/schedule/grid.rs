use super::entities::Stop;
use crate::shared::Coordinate;
use std::collections::HashMap;

/// Grid cell size in degrees, fixed by the external contract.
pub const DLAT: f64 = 0.004;
pub const DLON: f64 = 0.007;

pub type Cell = (i32, i32);

pub fn cell_of(coord: Coordinate) -> Cell {
    (
        (coord.latitude / DLAT).floor() as i32,
        (coord.longitude / DLON).floor() as i32,
    )
}

/// Builds the `(lat/DLAT, lon/DLON) -> [stop_idx]` spatial grid (C2 build
/// step 9). Used only as a candidate filter by [`nearby_stops`]; callers
/// must still apply the true haversine check.
pub fn build_grid(stops: &[Stop]) -> HashMap<Cell, Box<[u32]>> {
    let mut buckets: HashMap<Cell, Vec<u32>> = HashMap::new();
    for stop in stops {
        if !stop.coordinate.latitude.is_finite() || !stop.coordinate.longitude.is_finite() {
            continue;
        }
        buckets
            .entry(cell_of(stop.coordinate))
            .or_default()
            .push(stop.index);
    }
    buckets
        .into_iter()
        .map(|(cell, mut v)| {
            v.sort_unstable();
            (cell, v.into_boxed_slice())
        })
        .collect()
}

const M_PER_DEG_LAT: f64 = 111_320.0;

fn m_per_deg_lon(lat: f64) -> f64 {
    111_320.0 * lat.to_radians().cos()
}

/// Enumerates every stop within `radius_m` of `origin`, skipping
/// `exclude` (the origin stop itself, when the origin is a stop rather
/// than a bare coordinate). No ordering guarantee; no duplicates.
pub fn nearby_stops(
    grid: &HashMap<Cell, Box<[u32]>>,
    stops: &[Stop],
    origin: Coordinate,
    radius_m: f64,
    exclude: Option<u32>,
) -> Vec<(u32, f64)> {
    let origin_cell = cell_of(origin);
    let lon_scale = m_per_deg_lon(origin.latitude).max(1.0);

    let lat_half = (radius_m / (M_PER_DEG_LAT * DLAT)).ceil() as i32 + 1;
    let lon_half = (radius_m / (lon_scale * DLON)).ceil() as i32 + 1;

    let mut out = Vec::new();
    for dy in -lat_half..=lat_half {
        for dx in -lon_half..=lon_half {
            let cell = (origin_cell.0 + dy, origin_cell.1 + dx);
            let Some(candidates) = grid.get(&cell) else {
                continue;
            };
            for &idx in candidates.iter() {
                if Some(idx) == exclude {
                    continue;
                }
                let stop = &stops[idx as usize];
                let distance = origin.haversine_distance(&stop.coordinate).as_meters();
                if distance <= radius_m {
                    out.push((idx, distance));
                }
            }
        }
    }
    out
}
