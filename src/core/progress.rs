//! Progress aggregation for long-running batch operations
//!
//! A [`ProgressRegistry`] hands out bar handles to concurrent operations
//! and publishes every change to an optional [`ProgressSink`] (the
//! OS-chrome or UI integration point). [`TransferProgress`] aggregates
//! byte-level progress across any number of in-flight file copies into one
//! normalized ratio with a denominator fixed before the first copy starts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ulid::Ulid;

/// Observer for aggregate progress changes.
///
/// A single `set_progress(ratio)` sink; `0.0` means idle/cleared.
pub trait ProgressSink: Send + Sync {
    fn set_progress(&self, ratio: f64);
}

/// Handle to a registered progress bar
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgressId(Ulid);

impl std::fmt::Display for ProgressId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct BarState {
    id: ProgressId,
    label: String,
    value: f64,
}

/// Registry of active progress bars shared across concurrent operations
#[derive(Default)]
pub struct ProgressRegistry {
    bars: Mutex<Vec<BarState>>,
    sink: Mutex<Option<Arc<dyn ProgressSink>>>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the observer notified on every progress change
    pub fn set_sink(&self, sink: Arc<dyn ProgressSink>) {
        *self.sink.lock().expect("progress sink lock") = Some(sink);
    }

    /// Register a new bar and return its handle
    pub fn register(&self, label: impl Into<String>) -> ProgressId {
        let id = ProgressId(Ulid::new());
        let mut bars = self.bars.lock().expect("progress bars lock");
        bars.push(BarState {
            id: id.clone(),
            label: label.into(),
            value: 0.0,
        });
        id
    }

    /// Update a bar's completion ratio and notify the sink
    pub fn set(&self, id: &ProgressId, ratio: f64) {
        let mut bars = self.bars.lock().expect("progress bars lock");
        if let Some(bar) = bars.iter_mut().find(|bar| &bar.id == id) {
            bar.value = ratio;
        }
        drop(bars);
        self.notify(ratio);
    }

    /// Remove a bar, leaving the sink at zero/absent
    pub fn clear(&self, id: &ProgressId) {
        let mut bars = self.bars.lock().expect("progress bars lock");
        bars.retain(|bar| &bar.id != id);
        drop(bars);
        self.notify(0.0);
    }

    /// Labels and values of the currently active bars
    pub fn active(&self) -> Vec<(String, f64)> {
        let bars = self.bars.lock().expect("progress bars lock");
        bars.iter().map(|bar| (bar.label.clone(), bar.value)).collect()
    }

    fn notify(&self, ratio: f64) {
        let sink = self.sink.lock().expect("progress sink lock");
        if let Some(sink) = sink.as_ref() {
            sink.set_progress(ratio);
        }
    }
}

/// Byte-level progress across a batch of concurrent file copies.
///
/// The denominator is fixed while sources are added, before any copy
/// begins, so the aggregate ratio can never move backwards from a growing
/// total. Each source's counter is only ever advanced by its own copy
/// operation; the aggregate is recomputed from the counters on every
/// update rather than maintained incrementally.
#[derive(Debug, Default)]
pub struct TransferProgress {
    total: u64,
    transferred: Mutex<HashMap<PathBuf, u64>>,
}

impl TransferProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source file and its byte count before the batch starts
    pub fn add_source(&mut self, path: impl Into<PathBuf>, bytes: u64) {
        self.total += bytes;
        self.transferred
            .lock()
            .expect("transfer counters lock")
            .insert(path.into(), 0);
    }

    /// Total byte count across all registered sources
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Record bytes moved for one source and return the new aggregate ratio
    pub fn record(&self, path: &Path, bytes: u64) -> f64 {
        let mut transferred = self.transferred.lock().expect("transfer counters lock");
        if let Some(counter) = transferred.get_mut(path) {
            *counter += bytes;
        }
        let sum: u64 = transferred.values().sum();
        drop(transferred);

        if self.total == 0 {
            return 0.0;
        }
        sum as f64 / self.total as f64
    }
}
