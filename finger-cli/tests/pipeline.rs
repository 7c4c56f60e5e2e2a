use std::fs;
use std::path::{Path, PathBuf};

use finger_cli::{
    image_pipeline, scan, Candidate, ImageDirectory, LogReporter, MatchConfig, MatchImageReporter, MatchReport,
    Settings, StopReason,
};
use finger_cli::finger_core::{ExtractError, ResultReporter};
use finger_cli::finger_match::MatchError;
use finger_cli::CliError;
use image::{GrayImage, Luma};

fn block_image(w: u32, h: u32, seed: u32) -> GrayImage {
    let mut state = seed;
    let blocks_x = w.div_ceil(8);
    let levels: Vec<u8> = (0..blocks_x * h.div_ceil(8))
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();
    GrayImage::from_fn(w, h, |x, y| Luma([levels[((y / 8) * blocks_x + x / 8) as usize]]))
}

/// reference.png, an exact copy named match.png, two unrelated prints, a blank image and a text file
fn fixture(name: &str) -> (PathBuf, PathBuf) {
    let dir = std::env::temp_dir().join(format!("finger-cli-it-{}-{}", std::process::id(), name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();

    let reference = dir.join("reference.png");
    block_image(96, 96, 41).save(&reference).unwrap();
    block_image(96, 96, 41).save(dir.join("match.png")).unwrap();
    block_image(96, 96, 7).save(dir.join("other_a.png")).unwrap();
    block_image(96, 96, 913).save(dir.join("other_b.bmp")).unwrap();
    GrayImage::from_pixel(64, 64, Luma([90])).save(dir.join("blank.png")).unwrap();
    fs::write(dir.join("notes.txt"), b"left index, altered").unwrap();

    (dir, reference)
}

fn candidates(dir: &Path, reference: &Path) -> Vec<Candidate> {
    ImageDirectory::new(dir).excluding(reference).candidates().unwrap()
}

fn exhaustive_settings(workers: usize) -> Settings {
    Settings {
        matching: MatchConfig { workers, ..MatchConfig::exhaustive() },
        ..Default::default()
    }
}

#[test]
fn finds_the_identical_print() {
    let (dir, reference) = fixture("identical");
    let listed = candidates(&dir, &reference);
    assert_eq!(listed.len(), 4);

    let mut pipeline = image_pipeline(&exhaustive_settings(1)).unwrap();
    let outcome = scan(&mut pipeline, &Candidate::from_path(&reference), listed).unwrap();

    let best = outcome.best.as_ref().unwrap();
    assert_eq!(best.candidate().id, "match.png");
    assert!(best.percentage() > 50.0);
    assert_eq!(outcome.stop_reason, StopReason::Exhausted);
    assert_eq!(outcome.stats.examined, 4);
    assert_eq!(outcome.stats.skipped, 1);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn parallel_scan_agrees() {
    let (dir, reference) = fixture("parallel");
    let reference = Candidate::from_path(&reference);

    let mut sequential = image_pipeline(&exhaustive_settings(1)).unwrap();
    let expected = scan(&mut sequential, &reference, candidates(&dir, &reference.path)).unwrap();

    let mut parallel = image_pipeline(&exhaustive_settings(3)).unwrap();
    let outcome = scan(&mut parallel, &reference, candidates(&dir, &reference.path)).unwrap();

    assert_eq!(
        outcome.best.as_ref().map(|b| b.candidate().id.clone()),
        expected.best.as_ref().map(|b| b.candidate().id.clone())
    );
    assert_eq!(outcome.best_score(), expected.best_score());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn early_exit_on_perfect_match() {
    let (dir, reference) = fixture("early");
    let mut pipeline = image_pipeline(&Settings::default()).unwrap();
    let outcome = scan(&mut pipeline, &Candidate::from_path(&reference), candidates(&dir, &reference)).unwrap();

    // blank.png sorts first and is skipped, match.png is second
    assert_eq!(outcome.best_score(), 100.0);
    assert_eq!(outcome.best.as_ref().unwrap().candidate().id, "match.png");
    assert_eq!(outcome.stop_reason, StopReason::EarlyExit);
    assert_eq!(outcome.stats.examined, 2);
    assert_eq!(outcome.stats.skipped, 1);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn reports_best_match() {
    let (dir, reference) = fixture("report");
    let mut pipeline = image_pipeline(&exhaustive_settings(1)).unwrap();
    let outcome = scan(&mut pipeline, &Candidate::from_path(&reference), candidates(&dir, &reference)).unwrap();
    assert!(matches!(outcome.as_report(), MatchReport::Found { .. }));

    pipeline.report(&outcome, &mut LogReporter).unwrap();

    let output = dir.join("best.png");
    let mut reporter = MatchImageReporter::new(&output, 2);
    reporter.report(outcome.as_report()).unwrap();

    let saved = image::open(&output).unwrap();
    assert_eq!(saved.width(), 2 * (96 + 96));
    assert_eq!(saved.height(), 2 * 96);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn unreadable_reference_is_fatal() {
    let (dir, _) = fixture("fatal");
    let garbage = dir.join("garbage.png");
    fs::write(&garbage, b"not a png").unwrap();

    let mut pipeline = image_pipeline(&exhaustive_settings(1)).unwrap();
    let reference = Candidate::from_path(&garbage);
    let result = scan(&mut pipeline, &reference, candidates(&dir, &garbage));
    assert!(matches!(
        result,
        Err(CliError::Match(MatchError::Reference(ExtractError::Unreadable { .. })))
    ));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn featureless_reference_is_fatal() {
    let (dir, _) = fixture("featureless");
    let blank = dir.join("blank.png");

    let mut pipeline = image_pipeline(&exhaustive_settings(1)).unwrap();
    let result = scan(&mut pipeline, &Candidate::from_path(&blank), candidates(&dir, &blank));
    assert!(matches!(
        result,
        Err(CliError::Match(MatchError::Reference(ExtractError::NoDescriptors)))
    ));

    let _ = fs::remove_dir_all(dir);
}
