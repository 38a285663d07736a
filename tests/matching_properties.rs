use std::collections::HashSet;

use polarlows::{
    matching::{match_tracks, simple::mean_separation_km, MatchConfig, MatchPair},
    Track,
};
use proptest::prelude::*;

mod common;
use common::hourly_track;

/// Tracks of 2 to 6 hourly fixes, all starting on 2009-01-15 00:00, in a 4°x4° box.
fn tracks(max: usize) -> impl Strategy<Value = Vec<Track>> {
    prop::collection::vec(
        prop::collection::vec((0.0f64..4.0, 70.0f64..74.0), 2..6),
        1..max,
    )
    .prop_map(|paths| {
        paths
            .iter()
            .enumerate()
            .map(|(i, p)| hourly_track(i as u32, "200901150000", p))
            .collect()
    })
}

fn assert_one_to_one(pairs: &[MatchPair]) {
    let refs: HashSet<usize> = pairs.iter().map(|p| p.reference).collect();
    let cands: HashSet<u32> = pairs.iter().map(|p| p.candidate).collect();
    assert_eq!(refs.len(), pairs.len());
    assert_eq!(cands.len(), pairs.len());
}

fn steps(a: &Track, b: &Track) -> Vec<(usize, usize)> {
    (0..a.len().min(b.len())).map(|k| (k, k)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn simple_pairs_are_one_to_one_and_within_tolerance(
        candidates in tracks(8),
        references in tracks(8),
        thresh_dist in 0.0f64..400.0,
    ) {
        let pairs = match_tracks(&candidates, &references, &MatchConfig::Simple { thresh_dist }).unwrap();
        assert_one_to_one(&pairs);
        for p in &pairs {
            let c = &candidates[p.candidate as usize];
            let r = &references[p.reference];
            let d = mean_separation_km(r, c, &steps(r, c)).unwrap();
            prop_assert!(d <= thresh_dist);
        }
        prop_assert!(pairs.windows(2).all(|w| (w[0].reference, w[0].candidate) < (w[1].reference, w[1].candidate)));
    }

    #[test]
    fn wider_tolerance_keeps_every_pair(
        candidates in tracks(8),
        references in tracks(8),
        low in 0.0f64..200.0,
        extra in 0.0f64..200.0,
    ) {
        let narrow = match_tracks(&candidates, &references, &MatchConfig::Simple { thresh_dist: low }).unwrap();
        let wide = match_tracks(&candidates, &references, &MatchConfig::Simple { thresh_dist: low + extra }).unwrap();
        prop_assert!(narrow.iter().all(|p| wide.contains(p)));

        let narrow = match_tracks(&candidates, &references, &MatchConfig::Bs2000 { beta: low / 100.0 }).unwrap();
        let wide = match_tracks(&candidates, &references, &MatchConfig::Bs2000 { beta: (low + extra) / 100.0 }).unwrap();
        assert_one_to_one(&wide);
        prop_assert!(narrow.iter().all(|p| wide.contains(p)));
    }
}
