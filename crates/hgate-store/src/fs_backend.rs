#![cfg(feature = "std")]

use crate::backend::CounterBackend;
use hgate_core::{HgError, HgResult};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;
use std::format;

/// One 8-byte little-endian counter file per device key.
/// Durable across process restarts.
pub struct FileSystemBackend {
    root: PathBuf,
}

impl FileSystemBackend {
    pub fn new(path: &str) -> std::io::Result<Self> {
        fs::create_dir_all(path)?;
        Ok(Self { root: PathBuf::from(path) })
    }

    fn record_path(&self, key: &[u8; 32]) -> PathBuf {
        self.root.join(format!("ctr_{}.bin", hex::encode(key)))
    }
}

impl CounterBackend for FileSystemBackend {
    fn load(&self, key: &[u8; 32]) -> HgResult<Option<u64>> {
        let mut file = match File::open(self.record_path(key)) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(_) => return Err(HgError::StoreIo),
        };
        let mut buf = [0u8; 8];
        file.read_exact(&mut buf).map_err(|_| HgError::StoreIo)?;
        Ok(Some(u64::from_le_bytes(buf)))
    }

    fn store(&mut self, key: &[u8; 32], counter: u64) -> HgResult<()> {
        let path = self.record_path(key);
        let tmp_path = path.with_extension("tmp");

        // 1. Write .tmp
        {
            let mut file = OpenOptions::new()
                .write(true).create(true).truncate(true)
                .open(&tmp_path).map_err(|_| HgError::StoreIo)?;

            file.write_all(&counter.to_le_bytes()).map_err(|_| HgError::StoreIo)?;

            // 2. FSYNC (Critical)
            file.sync_all().map_err(|_| HgError::StoreIo)?;
        }

        // 3. Rename (Atomic)
        fs::rename(tmp_path, path).map_err(|_| HgError::StoreIo)?;

        // 4. Sync Parent Dir
        if let Ok(f) = File::open(&self.root) { let _ = f.sync_all(); }

        Ok(())
    }
}
