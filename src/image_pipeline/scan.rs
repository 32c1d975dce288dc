//! Source discovery for directory batches.
//!
//! Turns a file or directory into conversion jobs whose outputs land under an
//! output directory, mirroring the input layout.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::image_pipeline::batch::{ConversionJob, JobSource, OutputTarget};
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::encode::TargetFormat;

const HEIF_EXTENSIONS: [&str; 2] = ["heic", "heif"];

pub fn is_heif_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| HEIF_EXTENSIONS.iter().any(|h| ext.eq_ignore_ascii_case(h)))
}

/// Lists HEIF sources under `input`, sorted by path.
///
/// A file given directly is returned as-is whatever its extension.
pub fn collect_sources(input: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(ConversionError::OpenError(format!(
            "{}: no such file or directory",
            input.display()
        )));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut sources = Vec::new();
    let mut skipped = 0usize;

    for entry in WalkDir::new(input).min_depth(1).max_depth(max_depth) {
        let entry = entry.map_err(|e| ConversionError::OpenError(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_heif_path(entry.path()) {
            sources.push(entry.into_path());
        } else {
            skipped += 1;
        }
    }

    sources.sort();
    debug!(found = sources.len(), skipped, "Scanned {}", input.display());
    Ok(sources)
}

/// Path of `source` relative to the scanned input, used for ids and output layout.
fn relative_source(input: &Path, source: &Path) -> PathBuf {
    match source.strip_prefix(input) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        _ => source
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| source.to_path_buf()),
    }
}

/// Output location for a source: same relative path, extension replaced by the format's.
pub fn output_path(input: &Path, source: &Path, output_dir: &Path, format: TargetFormat) -> PathBuf {
    output_dir.join(relative_source(input, source).with_extension(format.extension()))
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// `rel` with `suffix` and then `.ext` appended to its full file name.
fn append_extension(rel: &Path, suffix: &str, ext: &str) -> PathBuf {
    let mut name = OsString::from(rel.as_os_str());
    name.push(suffix);
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Gives every source its own output file.
///
/// Sources are taken in order and the first one keeps the plain name from
/// [`output_path`]. A later source mapping to a taken path keeps its own
/// extension (`IMG.heif.png`), then gets a numeric suffix (`IMG.heif-1.png`)
/// until the path is free. Paths are compared case-insensitively.
pub fn unique_output_paths(
    input: &Path,
    sources: &[PathBuf],
    output_dir: &Path,
    format: TargetFormat,
) -> Vec<PathBuf> {
    let mut claimed = HashSet::new();

    sources
        .iter()
        .map(|source| {
            let target = output_path(input, source, output_dir, format);
            if claimed.insert(path_key(&target)) {
                return target;
            }

            let rel = relative_source(input, source);
            let mut target = output_dir.join(append_extension(&rel, "", format.extension()));
            let mut n = 1usize;
            while !claimed.insert(path_key(&target)) {
                target = output_dir.join(append_extension(&rel, &format!("-{}", n), format.extension()));
                n += 1;
            }
            debug!("Output name taken, {} writes to {}", source.display(), target.display());
            target
        })
        .collect()
}

/// Builds one job per HEIF source found under `input`.
pub fn jobs_from_input(
    input: &Path,
    output_dir: &Path,
    format: TargetFormat,
    recursive: bool,
) -> Result<Vec<ConversionJob>> {
    let sources = collect_sources(input, recursive)?;
    info!(sources = sources.len(), input = %input.display(), "Collected sources");

    let targets = unique_output_paths(input, &sources, output_dir, format);

    let jobs = sources
        .into_iter()
        .zip(targets)
        .map(|(source, target)| {
            let source_id = relative_source(input, &source)
                .to_string_lossy()
                .replace('\\', "/");
            ConversionJob::new(source_id, JobSource::Path(source), format.to_string())
                .with_output(OutputTarget::File(target))
        })
        .collect();

    Ok(jobs)
}
