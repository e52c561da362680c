#![forbid(unsafe_code)]

//! Expanding positional arguments into the spec files to load
//!
//! Files named on the command line are always loaded. Directories are
//! walked and filtered through the `--pattern` globs. Anything else is
//! treated as a glob itself and matched while walking its literal prefix.

use crate::config::{LoadOrder, RunConfiguration};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::warn;

const GLOB_CHARS: [char; 6] = ['*', '?', '[', ']', '{', '}'];

#[derive(Debug, Error)]
pub enum FilesError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: globset::Error,
    },

    #[error("failed to walk {}: {source}", path.display())]
    Walk { path: PathBuf, source: ignore::Error },

    #[error("failed to read modification time of {}: {source}", path.display())]
    Metadata { path: PathBuf, source: io::Error },
}

impl FilesError {
    pub fn exit_code(&self) -> u8 {
        match self {
            FilesError::InvalidPattern { .. } => 64,
            FilesError::Walk { .. } | FilesError::Metadata { .. } => 74,
        }
    }
}

/// Collects the spec files a configuration asks for, in load order
pub fn collect_spec_files(config: &RunConfiguration) -> Result<Vec<PathBuf>, FilesError> {
    let patterns = build_globset(&config.patterns)?;
    let mut files = Vec::new();

    for arg in &config.files {
        let path = Path::new(arg);
        if path.is_file() {
            files.push(strip_cur_dir(path));
        } else if path.is_dir() {
            walk(path, &mut files, |found| {
                found
                    .strip_prefix(path)
                    .is_ok_and(|relative| patterns.is_match(relative))
            })?;
        } else if !arg.contains(GLOB_CHARS) {
            warn!(path = %arg, "no such file or directory");
        } else {
            let pattern = strip_cur_dir(path);
            let glob = build_globset(&[pattern.to_string_lossy().into_owned()])?;
            let base = literal_base(&pattern);
            if base.is_dir() {
                walk(&base, &mut files, |found| glob.is_match(strip_cur_dir(found)))?;
            }
        }
    }

    let mut seen = HashSet::new();
    files.retain(|file| seen.insert(file.clone()));

    sort_files(&mut files, config.load_order)?;
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, FilesError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| FilesError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| FilesError::InvalidPattern {
        pattern: patterns.join(","),
        source,
    })
}

fn walk<F>(root: &Path, files: &mut Vec<PathBuf>, keep: F) -> Result<(), FilesError>
where
    F: Fn(&Path) -> bool,
{
    for entry in WalkBuilder::new(root).build() {
        let entry = entry.map_err(|source| FilesError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_some_and(|t| t.is_file()) && keep(entry.path()) {
            files.push(strip_cur_dir(entry.path()));
        }
    }
    Ok(())
}

/// Drops leading `./` components so `./spec/a_spec.rb` and `spec/a_spec.rb`
/// name the same file
fn strip_cur_dir(path: &Path) -> PathBuf {
    let stripped: PathBuf = path
        .components()
        .skip_while(|component| matches!(component, Component::CurDir))
        .collect();

    if stripped.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        stripped
    }
}

/// The leading components of a glob that contain no wildcards
fn literal_base(glob: &Path) -> PathBuf {
    let base: PathBuf = glob
        .components()
        .take_while(|component| match component {
            Component::Normal(part) => !part
                .to_string_lossy()
                .contains(GLOB_CHARS),
            _ => true,
        })
        .collect();

    if base.as_os_str().is_empty() || base == glob {
        PathBuf::from(".")
    } else {
        base
    }
}

fn sort_files(files: &mut [PathBuf], order: LoadOrder) -> Result<(), FilesError> {
    match order {
        LoadOrder::Alphabetical => files.sort(),
        LoadOrder::Mtime => {
            let mut stamped = Vec::with_capacity(files.len());
            for file in files.iter() {
                let modified = file
                    .metadata()
                    .and_then(|meta| meta.modified())
                    .map_err(|source| FilesError::Metadata {
                        path: file.clone(),
                        source,
                    })?;
                stamped.push((modified, file.clone()));
            }
            // Newest first; ties fall back to the path
            stamped.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
            for (slot, (_, file)) in files.iter_mut().zip(stamped) {
                *slot = file;
            }
        }
    }
    Ok(())
}
