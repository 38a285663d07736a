//! Mean separation of two tracks over their common timestamps.
use crate::{constants::Kilometer, geodesy::great_circle_km, tracks::Track};

/// Mean great-circle distance (km) between the fixes of `reference` and `candidate` at the
/// common steps `steps` (as returned by `common_steps`), `None` without common step.
pub fn mean_separation_km(
    reference: &Track,
    candidate: &Track,
    steps: &[(usize, usize)],
) -> Option<Kilometer> {
    if steps.is_empty() {
        return None;
    }
    let (fr, fc) = (reference.fixes(), candidate.fixes());
    let total: f64 = steps
        .iter()
        .map(|&(i, j)| great_circle_km(fr[i].lon, fr[i].lat, fc[j].lon, fc[j].lat))
        .sum();
    Some(total / steps.len() as f64)
}

#[cfg(test)]
mod simple_test {
    use super::*;
    use crate::matching::{
        common_steps,
        matching_test::{lat_deg, track_at},
    };
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_separation() {
        let reference = track_at(0, 0, &[(0.0, 70.0); 6]);
        // Overlap on hours 2..6, separations alternate 100 and 140 km: mean 120 km.
        let positions: Vec<_> = (0..5)
            .map(|k| (0.0, 70.0 + lat_deg(if k % 2 == 0 { 100.0 } else { 140.0 })))
            .collect();
        let candidate = track_at(1, 2, &positions);
        let steps = common_steps(&reference, &candidate);
        assert_eq!(steps.len(), 4);
        assert_relative_eq!(
            mean_separation_km(&reference, &candidate, &steps).unwrap(),
            120.0,
            epsilon = 1e-9
        );

        let later = track_at(2, 20, &[(0.0, 70.0)]);
        assert!(mean_separation_km(&reference, &later, &common_steps(&reference, &later)).is_none());
    }
}
