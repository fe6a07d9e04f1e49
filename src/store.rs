use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Directory of stored events, one `<id>.json` file per identifier.
pub struct ArtifactStore {
    dir: PathBuf,
    tmp_seq: AtomicU64,
}

impl ArtifactStore {
    /// Open an existing directory. The directory is never created here.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(Error::MissingOutputDir(dir));
        }
        Ok(Self {
            dir,
            tmp_seq: AtomicU64::new(0),
        })
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Write `bytes` as the artifact for `id`, replacing any earlier one.
    ///
    /// The data lands in a temp file first and is renamed into place, so a
    /// reader never sees a partial record.
    pub fn put(&self, id: &str, bytes: &[u8]) -> Result<PathBuf> {
        let dest = self.path_for(id);
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .dir
            .join(format!(".{id}.{}.{seq}.part", std::process::id()));

        let written = File::create(&tmp).and_then(|mut file| {
            file.write_all(bytes)?;
            file.flush()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&tmp, &dest)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_requires_existing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(
            ArtifactStore::open(&missing),
            Err(Error::MissingOutputDir(p)) if p == missing
        ));
    }

    #[test]
    fn put_writes_exact_bytes_and_leaves_no_temp_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(tmp.path()).unwrap();
        let path = store.put("42", br#"{"data":{"id":"42"}}"#).unwrap();

        assert_eq!(path, tmp.path().join("42.json"));
        assert_eq!(fs::read(&path).unwrap(), br#"{"data":{"id":"42"}}"#);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn later_write_replaces_earlier() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(tmp.path()).unwrap();
        store.put("7", b"first").unwrap();
        store.put("7", b"second").unwrap();
        assert_eq!(fs::read(store.path_for("7")).unwrap(), b"second");
    }
}
