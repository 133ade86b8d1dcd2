use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use walkdir::WalkDir;

/// A store of named objects that can be materialized locally.
pub trait ObjectStore {
    /// Materializes the object (or prefix) under `key` and returns its local path.
    ///
    /// # Errors
    /// Any transfer failure is returned, callers are expected to abort.
    fn fetch(&self, key: &str) -> io::Result<PathBuf>;

    /// Uploads the local file at `local` under `key`.
    fn store(&self, local: &Path, key: &str) -> io::Result<()>;
}

/// An [`ObjectStore`] backed by a directory acting as the bucket.
///
/// Fetched objects are copied into `cache`, keeping their key as relative path.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    cache: PathBuf,
}

impl LocalStore {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(root: P, cache: Q) -> Self {
        Self {
            root: root.into(),
            cache: cache.into(),
        }
    }
}

impl ObjectStore for LocalStore {
    fn fetch(&self, key: &str) -> io::Result<PathBuf> {
        let src = self.root.join(key);
        let dst = self.cache.join(key);

        let meta = fs::metadata(&src).map_err(|e| {
            io::Error::new(e.kind(), format!("cannot fetch '{key}': {e}"))
        })?;

        if meta.is_dir() {
            copy_dir(&src, &dst)?;
        } else {
            copy_file(&src, &dst)?;
        }

        info!("fetched '{key}' into {}", dst.display());
        Ok(dst)
    }

    fn store(&self, local: &Path, key: &str) -> io::Result<()> {
        let dst = self.root.join(key);
        copy_file(local, &dst)?;
        info!("stored {} as '{key}'", local.display());
        Ok(())
    }
}

fn copy_file(src: &Path, dst: &Path) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }

    let bytes = fs::copy(src, dst)?;
    debug!(bytes = bytes; "copied {} to {}", src.display(), dst.display());
    Ok(())
}

fn copy_dir(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src).map_err(io::Error::other)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            copy_file(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetches_files_and_directories() {
        let bucket = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();

        fs::write(bucket.path().join("net.json"), "{}").unwrap();
        fs::create_dir_all(bucket.path().join("data/cats")).unwrap();
        fs::write(bucket.path().join("data/cats/a.png"), [1, 2, 3]).unwrap();
        fs::write(bucket.path().join("data/csvfile.txt"), "a.png,cat\n").unwrap();

        let store = LocalStore::new(bucket.path(), cache.path());

        let net = store.fetch("net.json").unwrap();
        assert_eq!(net, cache.path().join("net.json"));
        assert_eq!(fs::read_to_string(net).unwrap(), "{}");

        let data = store.fetch("data").unwrap();
        assert_eq!(fs::read(data.join("cats/a.png")).unwrap(), [1, 2, 3]);
        assert!(data.join("csvfile.txt").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn fetch_follows_linked_directories() {
        let bucket = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();

        fs::create_dir_all(bucket.path().join("real")).unwrap();
        fs::create_dir_all(bucket.path().join("data")).unwrap();
        fs::write(bucket.path().join("real/x.bin"), [7]).unwrap();
        std::os::unix::fs::symlink("../real", bucket.path().join("data/linked")).unwrap();

        let data = LocalStore::new(bucket.path(), cache.path()).fetch("data").unwrap();

        assert!(data.join("linked").is_dir());
        assert_eq!(fs::read(data.join("linked/x.bin")).unwrap(), [7]);
    }

    #[test]
    fn fetching_missing_object_fails() {
        let bucket = tempfile::tempdir().unwrap();
        let store = LocalStore::new(bucket.path(), bucket.path().join("cache"));

        let err = store.fetch("nope").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("'nope'"));
    }

    #[test]
    fn stores_artifacts_under_key() {
        let bucket = tempfile::tempdir().unwrap();
        let local = tempfile::NamedTempFile::new().unwrap();
        fs::write(local.path(), "model").unwrap();

        let store = LocalStore::new(bucket.path(), bucket.path().join("cache"));
        store.store(local.path(), "runs/1/model.json").unwrap();

        assert_eq!(
            fs::read_to_string(bucket.path().join("runs/1/model.json")).unwrap(),
            "model"
        );
    }
}
