use std::{
    io,
    path::{Path, PathBuf},
};

use log::warn;
use walkdir::WalkDir;

use crate::labels::LabelSource;

/// A training sample paired with its label vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub path: PathBuf,
    pub label: Vec<f32>,
}

/// Lists every file under `dir`, recursively, except those named `exclude`.
///
/// Symbolic links are followed, so a linked directory contributes its files.
///
/// # Returns
/// The file paths sorted, so that runs over the same directory see the same order.
pub fn enumerate<P: AsRef<Path>>(dir: P, exclude: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.file_name() != exclude {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Pairs each sample with its label, skipping samples the table doesn't know.
pub fn records(samples: &[PathBuf], labels: &LabelSource) -> Vec<Record> {
    samples
        .iter()
        .filter_map(|path| match labels.label_for(path) {
            Some(label) => Some(Record {
                path: path.clone(),
                label,
            }),
            None => {
                warn!("no label for {}, skipping it", path.display());
                None
            }
        })
        .collect()
}
