#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use hifitime::Duration;
use polarlows::{
    land_mask::LandSeaMask, time::compact_date_to_epoch, Fix, Track,
};
use tempfile::TempDir;

/// Temporary directory and its UTF-8 path (the directory lives as long as the `TempDir`).
pub fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}

/// Hourly track starting at `start` (`YYYYMMDDHHMM`) through `positions`, vortex type 0.
pub fn hourly_track(idx: u32, start: &str, positions: &[(f64, f64)]) -> Track {
    let t0 = compact_date_to_epoch(start).unwrap();
    let fixes: Vec<Fix> = positions
        .iter()
        .enumerate()
        .map(|(i, &(lon, lat))| Fix::new(t0 + Duration::from_hours(i as f64), lon, lat, 0))
        .collect();
    Track::new(idx, fixes).unwrap()
}

/// Regular 0.5° mask over `[lon0, lon1] x [lat0, lat1]`, constant `value`.
pub fn constant_mask((lon0, lon1, lat0, lat1): (f64, f64, f64, f64), value: f64) -> LandSeaMask {
    let axis = |a: f64, b: f64| {
        let n = ((b - a) / 0.5).round() as usize + 1;
        (0..n).map(|k| a + 0.5 * k as f64).collect::<Vec<_>>()
    };
    let lon = axis(lon0, lon1);
    let lat = axis(lat0, lat1);
    let values = vec![value; lon.len() * lat.len()];
    LandSeaMask::from_grid(lon, lat, values, false, None).unwrap()
}

/// Write one tracker output file with the default column layout
/// (`lon lat vo time area vortex_type slp`), fixes hourly from `start`.
pub fn write_vortrack(
    dir: &Utf8Path,
    name: &str,
    start: &str,
    positions: &[(f64, f64)],
    vortex: &[i32],
) {
    std::fs::create_dir_all(dir).unwrap();
    let t0 = compact_date_to_epoch(start).unwrap();
    let mut content = String::from("lon lat vo time area vortex_type slp\n");
    for (i, (&(lon, lat), v)) in positions.iter().zip(vortex).enumerate() {
        let (y, m, d, h, mi, _, _) = (t0 + Duration::from_hours(i as f64)).to_gregorian_utc();
        content.push_str(&format!(
            "{lon:.3} {lat:.3} 0.00035 {y:04}{m:02}{d:02}{h:02}{mi:02} 1500.0 {v} 990.0\n"
        ));
    }
    std::fs::write(dir.join(name), content).unwrap();
}

/// Write a STARS hemisphere file: five header lines then one row per fix
/// `(N, "YYYY MM DD HH MM", lon, lat)`.
pub fn write_stars(path: &Utf8Path, rows: &[(u32, &str, f64, f64)]) {
    let mut content = String::from(
        "STARS polar low tracks\n\
         \n\
         Columns: N, year, month, day, hour, minute, lon, lat, slp, wind\n\
         \n\
         N   YYYY MM DD HH MM   lon     lat    slp    wind\n",
    );
    for (n, date, lon, lat) in rows {
        content.push_str(&format!("{n} {date} {lon:.2} {lat:.2} 990.0 20.0\n"));
    }
    std::fs::write(path, content).unwrap();
}

/// `"YYYY MM DD HH MM"` rows of an hourly STARS track starting at `2009 01 15 hh 00`.
pub fn stars_hours(n: u32, first_hour: u32, positions: &[(f64, f64)]) -> Vec<(u32, String, f64, f64)> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &(lon, lat))| (n, format!("2009 01 15 {:02} 00", first_hour + i as u32), lon, lat))
        .collect()
}
