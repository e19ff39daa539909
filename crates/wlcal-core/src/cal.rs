//! Calibration store access.
//!
//! The vendor store is opened once per run, yields the three blocks the
//! provisioning pipeline cares about, and is released when the handle is
//! dropped. A store that cannot be opened, or a block that cannot be read,
//! is never fatal: the block is simply treated as absent.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

/// Identity record holding the `WLAN_ID` MAC address entry.
pub const BLOCK_NPC: &str = "cert-npc";
/// Country/certification record holding the FCC marker.
pub const BLOCK_CCC: &str = "cert-ccc";
/// Radio NVS image.
pub const BLOCK_NVS: &str = "wlan-tx-cost3_0";

#[derive(Debug, Error)]
pub enum CalError {
    #[error("calibration store {path} unavailable: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read block {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid block name {0:?}")]
    InvalidName(String),
}

/// A source of named calibration blocks.
pub trait CalibrationStore {
    /// Read a block by name. `Ok(None)` means the store has no such block.
    fn read_block(&mut self, name: &str) -> Result<Option<Bytes>, CalError>;
}

/// Calibration blocks dumped to a directory, one file per block name.
#[derive(Debug)]
pub struct CalBlockDir {
    root: PathBuf,
}

impl CalBlockDir {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, CalError> {
        let root = root.as_ref().to_path_buf();
        match std::fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => Ok(Self { root }),
            Ok(_) => Err(CalError::Unavailable {
                path: root,
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            }),
            Err(source) => Err(CalError::Unavailable { path: root, source }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CalibrationStore for CalBlockDir {
    fn read_block(&mut self, name: &str) -> Result<Option<Bytes>, CalError> {
        if name.is_empty() || name.contains('/') || name.starts_with('.') {
            return Err(CalError::InvalidName(name.to_string()));
        }
        match std::fs::read(self.root.join(name)) {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CalError::Read {
                name: name.to_string(),
                source,
            }),
        }
    }
}

/// In-memory store, for dry runs and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    blocks: HashMap<String, Bytes>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(mut self, name: &str, data: impl Into<Bytes>) -> Self {
        self.blocks.insert(name.to_string(), data.into());
        self
    }
}

impl CalibrationStore for MemoryStore {
    fn read_block(&mut self, name: &str) -> Result<Option<Bytes>, CalError> {
        Ok(self.blocks.get(name).cloned())
    }
}

/// The three blocks consumed by one provisioning run.
#[derive(Debug, Clone, Default)]
pub struct CalBlocks {
    pub npc: Option<Bytes>,
    pub ccc: Option<Bytes>,
    pub nvs: Option<Bytes>,
}

impl CalBlocks {
    /// Read every block once. A missing store yields all-absent blocks.
    pub fn load(store: Option<&mut dyn CalibrationStore>) -> Self {
        let Some(store) = store else {
            debug!("no calibration store, all blocks absent");
            return Self::default();
        };
        Self {
            npc: read_or_absent(store, BLOCK_NPC),
            ccc: read_or_absent(store, BLOCK_CCC),
            nvs: read_or_absent(store, BLOCK_NVS),
        }
    }
}

fn read_or_absent(store: &mut dyn CalibrationStore, name: &str) -> Option<Bytes> {
    match store.read_block(name) {
        Ok(Some(data)) if !data.is_empty() => {
            debug!(block = name, len = data.len(), "calibration block read");
            Some(data)
        }
        Ok(_) => {
            warn!(block = name, "calibration block absent");
            None
        }
        Err(e) => {
            warn!(block = name, error = %e, "calibration block unreadable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl CalibrationStore for FailingStore {
        fn read_block(&mut self, name: &str) -> Result<Option<Bytes>, CalError> {
            Err(CalError::Read {
                name: name.to_string(),
                source: io::Error::other("i/o error"),
            })
        }
    }

    /// Counts WARN events so tests can check a condition is reported once.
    #[derive(Clone, Default)]
    struct WarnCounter(std::sync::Arc<std::sync::atomic::AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn load_without_store_is_all_absent() {
        use tracing_subscriber::layer::SubscriberExt;

        let warns = WarnCounter::default();
        let subscriber = tracing_subscriber::registry().with(warns.clone());
        let blocks = tracing::subscriber::with_default(subscriber, || CalBlocks::load(None));
        assert!(blocks.npc.is_none());
        assert!(blocks.ccc.is_none());
        assert!(blocks.nvs.is_none());
        // The caller that failed to open the store already warned.
        assert_eq!(warns.0.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn read_errors_and_empty_blocks_degrade_to_absent() {
        let mut failing = FailingStore;
        let blocks = CalBlocks::load(Some(&mut failing));
        assert!(blocks.npc.is_none());

        let mut store = MemoryStore::new()
            .with_block(BLOCK_NPC, Vec::new())
            .with_block(BLOCK_NVS, vec![1, 2, 3]);
        let blocks = CalBlocks::load(Some(&mut store));
        assert!(blocks.npc.is_none());
        assert!(blocks.ccc.is_none());
        assert_eq!(blocks.nvs.as_deref(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn block_dir_reads_files_by_name() {
        let dir = std::env::temp_dir().join(format!("wlcal-cal-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(BLOCK_CCC), [9u8, 8, 7]).unwrap();

        let mut store = CalBlockDir::open(&dir).unwrap();
        assert_eq!(
            store.read_block(BLOCK_CCC).unwrap().as_deref(),
            Some(&[9u8, 8, 7][..])
        );
        assert!(store.read_block(BLOCK_NPC).unwrap().is_none());
        assert!(matches!(
            store.read_block("../etc/passwd"),
            Err(CalError::InvalidName(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn block_dir_missing_root_is_unavailable() {
        let err = CalBlockDir::open("/nonexistent/wlcal/blocks").unwrap_err();
        assert!(matches!(err, CalError::Unavailable { .. }));
    }
}
