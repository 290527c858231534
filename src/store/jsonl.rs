use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::engine::EntityRecord;
use crate::error::{Result, WarpError};

use super::{LiveState, SnapshotStore};

/// Subfolder holding one snapshot file per seed.
pub const SYSTEMS_DIR: &str = "Star Systems";
pub const LIVE_FILE: &str = "live.json";

/// Write an iterator of serializable items to a JSONL file (one JSON object per line).
///
/// Goes through a temporary sibling that is renamed over `path`, so readers
/// never see a half-written snapshot.
fn write_jsonl<T: Serialize>(path: &Path, items: impl Iterator<Item = T>) -> io::Result<()> {
    let tmp = path.with_extension("jsonl.tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        for item in items {
            serde_json::to_writer(&mut writer, &item)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, path)
}

fn read_jsonl(path: &Path) -> Result<Vec<EntityRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

/// Keep `[A-Za-z0-9._-]`, percent-encode every other byte. Seeds may hold
/// spaces, slashes and anything else printable.
pub fn encode_seed(seed: &str) -> String {
    let mut out = String::with_capacity(seed.len());
    for byte in seed.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Snapshot store on disk:
/// - `<root>/Star Systems/<seed>_persistent.jsonl`: one entity record per line
/// - `<root>/live.json`: the session's [`LiveState`]
#[derive(Debug, Clone)]
pub struct JsonlStore {
    root: PathBuf,
}

impl JsonlStore {
    /// Creates the directory layout if it does not exist.
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root.join(SYSTEMS_DIR))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn snapshot_path(&self, seed: &str) -> PathBuf {
        self.root
            .join(SYSTEMS_DIR)
            .join(format!("{}_persistent.jsonl", encode_seed(seed)))
    }

    pub fn live_path(&self) -> PathBuf {
        self.root.join(LIVE_FILE)
    }
}

impl SnapshotStore for JsonlStore {
    fn load_snapshot(&self, seed: &str) -> Result<Vec<EntityRecord>> {
        let path = self.snapshot_path(seed);
        if !path.exists() {
            return Err(WarpError::SnapshotMissing(seed.to_string()));
        }
        let records = read_jsonl(&path)?;
        tracing::info!(seed, entities = records.len(), "snapshot loaded");
        Ok(records)
    }

    fn save_snapshot(&mut self, seed: &str, records: &[EntityRecord]) -> Result<()> {
        write_jsonl(&self.snapshot_path(seed), records.iter())?;
        tracing::info!(seed, entities = records.len(), "snapshot saved");
        Ok(())
    }

    fn load_live(&self) -> Result<Option<LiveState>> {
        let path = self.live_path();
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save_live(&mut self, state: &LiveState) -> Result<()> {
        let path = self.live_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(state)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
