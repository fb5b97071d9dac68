//! Progress-callback trait for batch runs.
//!
//! Pass a `&dyn BatchProgressCallback` to
//! [`crate::pipeline::batch::BatchProcessor::with_progress`] to receive an event
//! as each resume in a directory is loaded, rendered and written.
//!
//! # Example
//!
//! ```rust
//! use resume_generator::BatchProgressCallback;
//! use std::path::Path;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct Counter(AtomicUsize);
//!
//! impl BatchProgressCallback for Counter {
//!     fn on_entry_complete(&self, index: usize, total: usize, html: &Path, _pdf: Option<&Path>) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} → {}", index, total, html.display());
//!     }
//! }
//! ```

use std::path::Path;

/// Called by the batch orchestrator as it works through a directory.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Entries are processed one at a time, so calls never
/// overlap.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after discovery, before the first entry is loaded.
    ///
    /// # Arguments
    /// * `total`: number of resume files found
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before an entry is loaded.
    ///
    /// # Arguments
    /// * `index`:  1-indexed position in the batch
    /// * `total`:  batch size
    /// * `source`: the resume file
    fn on_entry_start(&self, index: usize, total: usize, source: &Path) {
        let _ = (index, total, source);
    }

    /// Called after an entry's outputs are written.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position in the batch
    /// * `total`: batch size
    /// * `html`:  the written HTML file
    /// * `pdf`:   the written PDF, when an exporter was supplied
    fn on_entry_complete(&self, index: usize, total: usize, html: &Path, pdf: Option<&Path>) {
        let _ = (index, total, html, pdf);
    }

    /// Called once after the last entry succeeds.
    fn on_batch_complete(&self, total: usize) {
        let _ = total;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct TrackingCallback {
        started_total: AtomicUsize,
        starts: AtomicUsize,
        completes: AtomicUsize,
        pdfs: AtomicUsize,
        finished: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total: usize) {
            self.started_total.store(total, Ordering::SeqCst);
        }

        fn on_entry_start(&self, _index: usize, _total: usize, _source: &Path) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_entry_complete(&self, _index: usize, _total: usize, _html: &Path, pdf: Option<&Path>) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            if pdf.is_some() {
                self.pdfs.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn on_batch_complete(&self, total: usize) {
            self.finished.store(total, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_entry_start(1, 2, Path::new("a.json"));
        cb.on_entry_complete(1, 2, Path::new("a.html"), None);
        cb.on_batch_complete(2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_batch_start(2);
        tracker.on_entry_start(1, 2, Path::new("a.json"));
        tracker.on_entry_complete(1, 2, Path::new("a.html"), Some(Path::new("a.pdf")));
        tracker.on_entry_start(2, 2, Path::new("b.yaml"));
        tracker.on_entry_complete(2, 2, Path::new("b.html"), None);
        tracker.on_batch_complete(2);

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.pdfs.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.finished.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn BatchProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_batch_start(1);
        cb.on_entry_complete(1, 1, Path::new("x.html"), None);
    }
}
