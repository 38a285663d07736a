use camino::Utf8Path;
use polarlows::{
    config::{Dataset, PipelineConfig},
    observations::stars_reader::{STARS_NORTH_FILE, STARS_SOUTH_FILE},
    pipeline::{ObsCatalogue, PipelineDriver},
    tracks::archive::{ArchiveStore, ParquetArchive},
};

mod common;
use common::{constant_mask, stars_hours, utf8_tempdir, write_stars, write_vortrack};

fn config(root: &Utf8Path) -> PipelineConfig {
    PipelineConfig {
        winters: vec!["2008_2009".into(), "2009_2010".into()],
        match_winters: 0..2,
        datadir: root.to_owned(),
        trackresdir: Some(root.join("results")),
        procdir: Some(root.join("processed")),
        starsdir: Some(root.join("stars")),
        ..PipelineConfig::default()
    }
}

fn write_catalogue(dir: &Utf8Path) {
    std::fs::create_dir_all(dir).unwrap();
    let lats: Vec<f64> = (0..8).map(|k| 70.0 + k as f64).collect();

    let mut north = stars_hours(1, 0, &lats.iter().map(|&lat| (5.5, lat)).collect::<Vec<_>>());
    north.extend(stars_hours(2, 0, &[(40.0, 65.0); 8]));
    let north: Vec<(u32, &str, f64, f64)> =
        north.iter().map(|(n, d, lon, lat)| (*n, d.as_str(), *lon, *lat)).collect();
    write_stars(&dir.join(STARS_NORTH_FILE), &north);

    let south = stars_hours(1, 0, &[(-20.0, 66.0); 8]);
    let south: Vec<(u32, &str, f64, f64)> =
        south.iter().map(|(n, d, lon, lat)| (*n, d.as_str(), *lon, *lat)).collect();
    write_stars(&dir.join(STARS_SOUTH_FILE), &south);
}

fn report_lines(path: &Utf8Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn empty_run_gives_empty_archive_and_header_only_reports() {
    let (_guard, root) = utf8_tempdir();
    let cfg = config(&root);
    for winter in &cfg.winters {
        std::fs::create_dir_all(cfg.track_dir(Dataset::Era5, 0, winter)).unwrap();
    }
    write_catalogue(&cfg.starsdir());

    let driver = PipelineDriver::new(cfg);
    let mask = constant_mask((-25.0, 55.0, 64.0, 86.0), 0.0);
    let summary = driver.categorise_and_save_with_mask(Dataset::Era5, &[0], &mask);
    assert!(summary.is_success());

    let archive = driver.archive_path(Dataset::Era5, 0).unwrap();
    assert_eq!(summary.written, vec![archive.clone()]);
    assert!(archive.exists());
    assert!(ParquetArchive::default().from_archive(&archive).unwrap().is_empty());

    let obs = driver.load_observations(ObsCatalogue::Stars).unwrap();
    let summary = driver.match_to_observations(&obs, &[Dataset::Era5]).unwrap();
    assert!(summary.is_success());
    assert_eq!(summary.written.len(), 8);

    for report in &summary.written {
        let lines = report_lines(report);
        assert_eq!(lines.len(), 4, "{report}");
        assert_eq!(lines[0], "# era5");
        assert_eq!(lines[1], "# 000");
        assert_eq!(lines[2], "# 2008_2010");
        assert!(lines[3].starts_with("# method="));
    }
}

#[test]
fn polar_low_is_categorised_and_matched() {
    let (_guard, root) = utf8_tempdir();
    let cfg = config(&root);

    let first = cfg.track_dir(Dataset::Era5, 0, "2008_2009");
    let lats: Vec<(f64, f64)> = (0..8).map(|k| (5.0, 70.0 + k as f64)).collect();
    write_vortrack(&first, "vortrack_0001.txt", "200901150000", &lats, &[0; 8]);
    write_vortrack(
        &first,
        "vortrack_0002.txt",
        "200901200000",
        &[(10.0, 72.0), (10.5, 72.0), (11.0, 72.0)],
        &[0; 3],
    );
    std::fs::create_dir_all(cfg.track_dir(Dataset::Era5, 0, "2009_2010")).unwrap();
    write_catalogue(&cfg.starsdir());

    let driver = PipelineDriver::new(cfg);
    let mask = constant_mask((-25.0, 55.0, 64.0, 86.0), 0.0);
    let summary = driver.categorise_and_save_with_mask(Dataset::Era5, &[0], &mask);
    assert!(summary.is_success());

    let run = ParquetArchive::default()
        .from_archive(&driver.archive_path(Dataset::Era5, 0).unwrap())
        .unwrap();
    assert_eq!(run.len(), 2);
    assert_eq!(run.size(Some("pmc")), 1);
    assert!(run.tracks()[0].has_category("pmc"));

    let obs = driver.load_observations(ObsCatalogue::Stars).unwrap();
    assert_eq!(obs.iter().map(|o| o.n()).collect::<Vec<_>>(), vec![1, 2, 3]);

    let summary = driver.match_to_observations(&obs, &[Dataset::Era5]).unwrap();
    assert!(summary.is_success());
    assert_eq!(summary.written.len(), 8);
    for report in &summary.written {
        let lines = report_lines(report);
        assert_eq!(&lines[4..], &["0,1".to_string()], "{report}");
    }

    let bs = root
        .join("processed")
        .join("matches")
        .join("era5_run000_2008_2010_method=bs2000_beta=25.txt");
    assert!(summary.written.contains(&bs));
}

#[test]
fn missing_winter_directory_fails_the_run() {
    let (_guard, root) = utf8_tempdir();
    let cfg = config(&root);
    std::fs::create_dir_all(cfg.track_dir(Dataset::Interim, 3, "2008_2009")).unwrap();

    let driver = PipelineDriver::new(cfg);
    let mask = constant_mask((-25.0, 55.0, 64.0, 86.0), 0.0);
    let summary = driver.categorise_and_save_with_mask(Dataset::Interim, &[3], &mask);
    assert!(!summary.is_success());
    assert_eq!(summary.failed[0].run, 3);
    assert!(!driver.archive_path(Dataset::Interim, 3).unwrap().exists());
}
