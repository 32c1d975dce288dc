//! Command-line front end: scan a file or directory, convert every HEIC
//! source and write the results next to each other in an output directory.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use crate::image_pipeline::{
    BatchConfig, BatchConverter, ConversionError, DefaultImageReader, EncoderConfig, HEIC_DECODING_AVAILABLE,
    ImageReader, StandardImageWriter, TargetFormat, TiffCompression, scan,
};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "heic-batch",
    version,
    about = "Convert HEIC images to JPEG, PNG or TIFF",
    long_about = "Converts a single HEIC file or every HEIC file in a directory, using a bounded pool of worker threads.\nOutputs keep the source's relative path with the extension of the target format."
)]
pub struct Cli {
    /// HEIC file or directory to convert
    pub input: PathBuf,

    /// Directory receiving the converted files
    #[arg(short, long, default_value = "converted")]
    pub output: PathBuf,

    /// Target format (jpeg, png, tiff)
    #[arg(short, long, default_value = "jpeg", value_parser = parse_format)]
    pub format: TargetFormat,

    /// Stop at the first failure and discard outputs already written
    #[arg(long, default_value_t = false)]
    pub fail_fast: bool,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// JPEG quality, 1-100
    #[arg(short, long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    #[arg(long, value_enum, default_value = "none")]
    pub tiff_compression: TiffCompressionArg,

    /// Descend into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Skip sources larger than this many MiB
    #[arg(long, default_value_t = 500)]
    pub max_size_mb: u64,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TiffCompressionArg {
    None,
    Lzw,
    Deflate,
}

impl From<TiffCompressionArg> for TiffCompression {
    fn from(arg: TiffCompressionArg) -> Self {
        match arg {
            TiffCompressionArg::None => TiffCompression::None,
            TiffCompressionArg::Lzw => TiffCompression::Lzw,
            TiffCompressionArg::Deflate => TiffCompression::DeflateBalanced,
        }
    }
}

fn parse_format(s: &str) -> Result<TargetFormat, String> {
    s.parse::<TargetFormat>().map_err(|e: ConversionError| e.to_string())
}

impl Cli {
    pub fn batch_config(&self) -> BatchConfig {
        let encoder = EncoderConfig::builder()
            .jpeg_quality(self.quality)
            .tiff_compression(self.tiff_compression.into())
            .build();

        BatchConfig::builder()
            .fail_fast(self.fail_fast)
            .max_workers(self.jobs)
            .max_source_bytes(Some(self.max_size_mb.saturating_mul(1 << 20)))
            .encoder(encoder)
            .build()
    }
}

/// Counts reported once a run finishes without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub converted: usize,
}

pub fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    if !HEIC_DECODING_AVAILABLE {
        warn!("Built without the `heif` feature; HEIC sources cannot be decoded");
    }

    run_with_reader(cli, DefaultImageReader::default())
}

/// Runs the batch described by `cli` with the given source decoder.
///
/// Returns an error when any job failed. Under `--fail-fast` outputs written
/// before the failure are removed first.
pub fn run_with_reader<R: ImageReader>(cli: &Cli, reader: R) -> anyhow::Result<RunSummary> {
    let jobs = scan::jobs_from_input(&cli.input, &cli.output, cli.format, cli.recursive)
        .with_context(|| format!("failed to collect sources from {}", cli.input.display()))?;

    if jobs.is_empty() {
        warn!("No HEIC files found in {}", cli.input.display());
        return Ok(RunSummary { converted: 0 });
    }

    let config = cli.batch_config();
    let fail_fast = config.is_fail_fast();
    let converter =
        BatchConverter::with_custom(reader, StandardImageWriter, config).context("failed to start the converter")?;

    let outcome = converter.convert_batch(jobs);

    // Fail-fast discards every result, including files already written
    if fail_fast && outcome.failure_count() > 0 {
        for path in outcome.successes().filter_map(|s| s.path()) {
            if let Err(e) = std::fs::remove_file(path) {
                warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    } else {
        for success in outcome.successes() {
            if let Some(path) = success.path() {
                info!(source = %success.source_id, "Wrote {}", path.display());
            }
        }
    }

    let successes = outcome
        .reduce()
        .into_result()
        .context("batch conversion failed")?;

    info!(
        converted = successes.len(),
        output = %cli.output.display(),
        "All conversions succeeded"
    );

    Ok(RunSummary {
        converted: successes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::{FailurePolicy, ImageCrateReader};

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["heic-batch", "photos"]).unwrap();
        assert_eq!(cli.format, TargetFormat::Jpeg);
        assert_eq!(cli.output, PathBuf::from("converted"));

        let config = cli.batch_config();
        assert_eq!(config.failure_policy, FailurePolicy::BestEffort);
        assert_eq!(config.encoder.jpeg_quality, 100);
        assert_eq!(config.encoder.tiff_compression, TiffCompression::None);
        assert_eq!(config.max_source_bytes, Some(500 << 20));
    }

    #[test]
    fn test_flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "heic-batch",
            "photos",
            "-f",
            "TIF",
            "--fail-fast",
            "--jobs",
            "2",
            "--quality",
            "85",
            "--tiff-compression",
            "lzw",
        ])
        .unwrap();

        assert_eq!(cli.format, TargetFormat::Tiff);
        let config = cli.batch_config();
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.max_workers, Some(2));
        assert_eq!(config.encoder.jpeg_quality, 85);
        assert_eq!(config.encoder.tiff_compression, TiffCompression::Lzw);
    }

    #[test]
    fn test_rejects_unknown_format_and_quality() {
        assert!(Cli::try_parse_from(["heic-batch", "photos", "-f", "bmp"]).is_err());
        assert!(Cli::try_parse_from(["heic-batch", "photos", "-q", "0"]).is_err());
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 64]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    /// Two decodable sources and one corrupt source in `dir/in`.
    fn mixed_input(dir: &std::path::Path) -> (PathBuf, PathBuf) {
        let input = dir.join("in");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("a.heic"), png_bytes(8, 8)).unwrap();
        std::fs::write(input.join("b.heic"), b"corrupt").unwrap();
        std::fs::write(input.join("c.heic"), png_bytes(5, 7)).unwrap();
        (input, dir.join("out"))
    }

    fn parse(input: &std::path::Path, output: &std::path::Path, extra: &[&str]) -> Cli {
        let mut args = vec![
            "heic-batch".to_string(),
            input.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
            "-f".to_string(),
            "png".to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        Cli::try_parse_from(args).unwrap()
    }

    fn output_files(output: &std::path::Path) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(output)
            .map(|entries| {
                entries
                    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    #[test]
    fn test_best_effort_errors_but_keeps_good_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let (input, output) = mixed_input(dir.path());
        let cli = parse(&input, &output, &[]);

        let err = run_with_reader(&cli, ImageCrateReader).unwrap_err();
        assert!(format!("{:#}", err).contains("b.heic"));
        assert_eq!(output_files(&output), vec!["a.png", "c.png"]);
    }

    #[test]
    fn test_fail_fast_errors_and_removes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let (input, output) = mixed_input(dir.path());
        let cli = parse(&input, &output, &["--fail-fast", "--jobs", "1"]);

        let err = run_with_reader(&cli, ImageCrateReader).unwrap_err();
        assert!(format!("{:#}", err).contains("b.heic"));
        assert!(output_files(&output).is_empty());
    }

    #[test]
    fn test_all_good_sources_convert() {
        let dir = tempfile::tempdir().unwrap();
        let (input, output) = mixed_input(dir.path());
        std::fs::remove_file(input.join("b.heic")).unwrap();
        let cli = parse(&input, &output, &["--fail-fast"]);

        assert_eq!(run_with_reader(&cli, ImageCrateReader).unwrap(), RunSummary { converted: 2 });
        assert_eq!(output_files(&output), vec!["a.png", "c.png"]);
    }

    #[test]
    fn test_run_on_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from(["heic-batch", dir.path().to_str().unwrap()]).unwrap();
        assert_eq!(run(&cli).unwrap(), RunSummary { converted: 0 });
    }
}
