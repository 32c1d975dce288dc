use std::io::Cursor;
use std::path::Path;

use heic_batch_rs::image_pipeline::{
    BatchConfig, BatchConverter, BatchError, ConversionError, ConversionJob, ImageCrateReader, StandardImageWriter,
    TargetFormat, scan,
};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| image::Rgb([(x * 7) as u8, (y * 11) as u8, 128]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn converter(config: BatchConfig) -> BatchConverter<ImageCrateReader, StandardImageWriter> {
    BatchConverter::with_custom(ImageCrateReader, StandardImageWriter, config).unwrap()
}

#[test]
fn test_every_format_preserves_dimensions() {
    let source = png_bytes(40, 24);
    let jobs = ["jpeg", "png", "tiff"]
        .into_iter()
        .map(|format| ConversionJob::from_bytes(format, source.clone(), format))
        .collect();

    let successes = converter(BatchConfig::default())
        .convert_batch(jobs)
        .reduce()
        .into_result()
        .unwrap();

    assert_eq!(successes.len(), 3);
    for success in &successes {
        assert_eq!((success.width, success.height), (40, 24));
        let decoded = image::load_from_memory(success.bytes().unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 24), "{}", success.format);
    }
}

#[test]
fn test_repeated_conversion_is_byte_identical() {
    let source = png_bytes(16, 16);
    let converter = converter(BatchConfig::default());

    for format in ["jpeg", "png", "tiff"] {
        let run = || {
            let outcome = converter.convert_batch(vec![ConversionJob::from_bytes("x", source.clone(), format)]);
            outcome.successes().next().unwrap().bytes().unwrap().to_vec()
        };
        assert_eq!(run(), run(), "{}", format);
    }
}

#[test]
fn test_best_effort_reports_all_failures() {
    let jobs = vec![
        ConversionJob::from_bytes("good.heic", png_bytes(8, 8), "png"),
        ConversionJob::from_bytes("broken.heic", b"not an image".to_vec(), "png"),
        ConversionJob::from_bytes("other.heic", png_bytes(8, 8), "bmp"),
    ];

    let report = converter(BatchConfig::default()).convert_batch(jobs).reduce();

    assert_eq!(report.successes.len(), 1);
    assert_eq!(report.successes[0].source_id, "good.heic");

    match report.error {
        Some(BatchError::Aggregate { failures, total }) => {
            assert_eq!(total, 3);
            assert_eq!(failures.len(), 2);
            assert_eq!(failures[0].source_id, "broken.heic");
            assert!(matches!(failures[0].error, ConversionError::DecodeError(_)));
            assert_eq!(failures[1].source_id, "other.heic");
            assert!(matches!(failures[1].error, ConversionError::UnsupportedFormat(_)));
        }
        other => panic!("expected aggregate error, got {:?}", other),
    }
}

#[test]
fn test_fail_fast_reports_single_failure() {
    let mut jobs: Vec<_> = (0..8)
        .map(|i| ConversionJob::from_bytes(format!("ok-{}", i), png_bytes(4, 4), "jpeg"))
        .collect();
    jobs.insert(3, ConversionJob::from_bytes("bad", vec![0; 16], "jpeg"));

    let config = BatchConfig::builder().fail_fast(true).max_workers(Some(2)).build();
    let report = converter(config).convert_batch(jobs).reduce();

    assert!(report.successes.is_empty());
    match report.error {
        Some(BatchError::FailFast(failure)) => assert_eq!(failure.source_id, "bad"),
        other => panic!("expected fail-fast error, got {:?}", other),
    }
}

#[test]
fn test_directory_batch_writes_mirrored_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("photos");
    let output = dir.path().join("converted");

    let write = |rel: &str| {
        let path = input.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, png_bytes(10, 6)).unwrap();
    };
    write("IMG_0001.HEIC");
    write("trip/IMG_0002.heic");
    std::fs::write(input.join("readme.txt"), b"skip me").unwrap();

    let jobs = scan::jobs_from_input(&input, &output, TargetFormat::Png, true).unwrap();
    assert_eq!(jobs.len(), 2);

    let successes = converter(BatchConfig::default())
        .convert_batch(jobs)
        .reduce()
        .into_result()
        .unwrap();

    let mut paths: Vec<_> = successes.iter().map(|s| s.path().unwrap().to_path_buf()).collect();
    paths.sort();
    assert_eq!(paths, vec![output.join("IMG_0001.png"), output.join("trip/IMG_0002.png")]);

    for path in &paths {
        let decoded = image::open(path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (10, 6));
    }
    assert!(!Path::new(&output.join("readme.png")).exists());
}

#[test]
fn test_same_stem_sources_keep_both_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("photos");
    let output = dir.path().join("converted");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(input.join("IMG.heic"), png_bytes(6, 6)).unwrap();
    std::fs::write(input.join("IMG.heif"), png_bytes(9, 5)).unwrap();

    let jobs = scan::jobs_from_input(&input, &output, TargetFormat::Png, false).unwrap();
    let successes = converter(BatchConfig::default())
        .convert_batch(jobs)
        .reduce()
        .into_result()
        .unwrap();
    assert_eq!(successes.len(), 2);

    let heic = image::open(output.join("IMG.png")).unwrap();
    let heif = image::open(output.join("IMG.heif.png")).unwrap();
    assert_eq!((heic.width(), heic.height()), (6, 6));
    assert_eq!((heif.width(), heif.height()), (9, 5));
    assert_eq!(std::fs::read_dir(&output).unwrap().count(), 2);
}
