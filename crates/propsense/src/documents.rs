//! Version-tagged document cache.
//!
//! Each open document has an entry holding its [`TextBuffer`] and, once
//! requested, the [`Model`] parsed from it. Entries are independent `Arc`s so
//! requests against different documents never wait on each other.
//!
//! Invariants
//! - The entry mutex is the single-flight section: [`DocumentCache::get_model`]
//!   parses while holding it, so concurrent callers for the same version wait
//!   for that one parse and then share its result.
//! - A change claims the new version on the atomic *before* taking the
//!   mutex; the claim only ever moves the version forward. A parse in flight
//!   polls that atomic once per line, notices the mismatch, and gives up the
//!   lock early.
//! - Under the mutex a change is dropped if the buffer already holds a newer
//!   version, so two racing changes land in version order or not at all.
//! - A cached model always matches the buffer it was parsed from. A cancelled
//!   parse caches nothing.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicI32, Ordering},
    },
    time::Instant,
};

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    cancel::{CancelChecker, Cancelled, NeverCancel},
    model::Model,
    text::{BadLocation, TextBuffer, TextChange},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("document {0} is not open")]
    UnknownDocument(String),
    #[error("version {version} of {uri} is not newer than {current}")]
    StaleVersion { uri: String, version: i32, current: i32 },
    #[error(transparent)]
    BadLocation(#[from] BadLocation),
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

#[derive(Debug)]
struct Entry {
    /// The latest published version, possibly ahead of `buffer` while a
    /// change waits for the lock.
    version: AtomicI32,
    closed: AtomicBool,
    buffer: Mutex<TextBuffer>,
    /// Only written while `buffer` is locked.
    model: RwLock<Option<Arc<Model>>>,
}

impl Entry {
    fn new(buffer: TextBuffer) -> Self {
        Self {
            version: AtomicI32::new(buffer.version()),
            closed: AtomicBool::new(false),
            buffer: Mutex::new(buffer),
            model: RwLock::new(None),
        }
    }

    /// Claims `version` as the latest one, failing without side effects if
    /// it is not newer than the version already published.
    fn publish(&self, uri: &str, version: i32) -> Result<(), CacheError> {
        self.version
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (version > current).then_some(version)
            })
            .map(drop)
            .map_err(|current| stale(uri, version, current))
    }

    /// Runs `edit` against the buffer for a version claimed with
    /// [`publish`](Self::publish), unless a newer change landed first.
    fn commit(
        &self,
        uri: &str,
        version: i32,
        edit: impl FnOnce(&mut TextBuffer) -> Result<(), BadLocation>,
    ) -> Result<(), CacheError> {
        let mut buffer = self.buffer.lock();
        let current = buffer.version();
        if version <= current {
            return Err(stale(uri, version, current));
        }
        if let Err(err) = edit(&mut *buffer) {
            warn!(uri, version, error = %err, "rejected document change");
            // roll back only if nobody published past us meanwhile
            let _ = self.version.compare_exchange(
                version,
                current,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
            return Err(err.into());
        }
        *self.model.write() = None;
        Ok(())
    }
}

fn stale(uri: &str, version: i32, current: i32) -> CacheError {
    warn!(uri, version, current, "ignoring stale document version");
    CacheError::StaleVersion { uri: uri.to_owned(), version, current }
}

/// Open documents by URI.
#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: RwLock<HashMap<Arc<str>, Arc<Entry>>>,
}

impl DocumentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `uri`. Reopening an open document replaces its text
    /// and version unconditionally.
    pub fn open(&self, uri: &str, text: &str, version: i32) {
        let previous = {
            let mut entries = self.entries.write();
            let buffer = TextBuffer::new(uri, text, version);
            entries.insert(Arc::from(uri), Arc::new(Entry::new(buffer)))
        };
        if let Some(previous) = previous {
            previous.closed.store(true, Ordering::Release);
        }
        debug!(uri, version, "opened document");
    }

    /// Replaces the text of `uri` wholesale.
    ///
    /// # Errors
    ///
    /// Fails if the document is not open or `version` is not newer than the
    /// current one.
    pub fn on_change(&self, uri: &str, text: &str, version: i32) -> Result<(), CacheError> {
        let entry = self.entry(uri)?;
        entry.publish(uri, version)?;
        entry.commit(uri, version, |buffer| {
            buffer.set_text(text, version);
            Ok(())
        })
    }

    /// Applies incremental changes to `uri`.
    ///
    /// # Errors
    ///
    /// Fails if the document is not open, `version` is not newer than the
    /// current one, or a change range lies outside the document. In the last
    /// case the document keeps its previous text and version.
    pub fn apply_changes(
        &self,
        uri: &str,
        changes: &[TextChange],
        version: i32,
    ) -> Result<(), CacheError> {
        let entry = self.entry(uri)?;
        entry.publish(uri, version)?;
        entry.commit(uri, version, |buffer| buffer.apply_changes(changes, version))
    }

    /// Stops tracking `uri`. Returns `false` if it was not open.
    pub fn close(&self, uri: &str) -> bool {
        let removed = self.entries.write().remove(uri);
        match removed {
            Some(entry) => {
                entry.closed.store(true, Ordering::Release);
                debug!(uri, "closed document");
                true
            }
            None => false,
        }
    }

    /// The model for the current version of `uri`, parsing it if needed.
    ///
    /// # Errors
    ///
    /// Fails if the document is not open, or with [`CacheError::Cancelled`]
    /// if the document changed while parsing.
    pub fn get_model(&self, uri: &str) -> Result<Arc<Model>, CacheError> {
        self.get_model_with(uri, &NeverCancel)
    }

    /// Like [`get_model`](Self::get_model), additionally abandoning the parse
    /// when `cancel` fires.
    ///
    /// # Errors
    ///
    /// Fails if the document is not open, or with [`CacheError::Cancelled`]
    /// if the document changed or `cancel` fired while parsing.
    pub fn get_model_with<C: CancelChecker + ?Sized>(
        &self,
        uri: &str,
        cancel: &C,
    ) -> Result<Arc<Model>, CacheError> {
        let entry = self.entry(uri)?;
        let buffer = entry.buffer.lock();
        if let Some(model) = entry.model.read().as_ref() {
            return Ok(Arc::clone(model));
        }

        let version = buffer.version();
        let outdated = || {
            entry.closed.load(Ordering::Acquire)
                || entry.version.load(Ordering::Acquire) != version
                || cancel.is_cancelled()
        };

        let started = Instant::now();
        match Model::from_buffer(buffer.clone(), &outdated) {
            Ok(model) => {
                let model = Arc::new(model);
                *entry.model.write() = Some(Arc::clone(&model));
                debug!(
                    uri,
                    version,
                    elapsed = ?started.elapsed(),
                    errors = model.parse_errors().len(),
                    "parsed document"
                );
                Ok(model)
            }
            Err(cancelled) => {
                trace!(uri, version, "parse cancelled");
                Err(cancelled.into())
            }
        }
    }

    /// The cached model of `uri` without parsing. `None` if the document is
    /// not open or has no model for its current text.
    #[must_use]
    pub fn get_existing_model(&self, uri: &str) -> Option<Arc<Model>> {
        let entry = self.entry(uri).ok()?;
        let model = entry.model.read().clone()?;
        (model.version() == entry.version.load(Ordering::Acquire)).then_some(model)
    }

    /// Runs `f` against the model of `uri`.
    ///
    /// # Errors
    ///
    /// Fails like [`get_model`](Self::get_model).
    pub fn with_model<R>(&self, uri: &str, f: impl FnOnce(&Model) -> R) -> Result<R, CacheError> {
        let model = self.get_model(uri)?;
        Ok(f(&model))
    }

    /// The latest version seen for `uri`.
    #[must_use]
    pub fn version(&self, uri: &str) -> Option<i32> {
        self.entry(uri).ok().map(|entry| entry.version.load(Ordering::Acquire))
    }

    /// A snapshot of the text of `uri`. Waits for a parse in flight.
    #[must_use]
    pub fn buffer(&self, uri: &str) -> Option<TextBuffer> {
        self.entry(uri).ok().map(|entry| entry.buffer.lock().clone())
    }

    /// URIs of all open documents, sorted.
    #[must_use]
    pub fn uris(&self) -> Vec<String> {
        let mut uris: Vec<_> = self.entries.read().keys().map(|uri| uri.to_string()).collect();
        uris.sort();
        uris
    }

    fn entry(&self, uri: &str) -> Result<Arc<Entry>, CacheError> {
        self.entries
            .read()
            .get(uri)
            .cloned()
            .ok_or_else(|| CacheError::UnknownDocument(uri.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URI: &str = "file:///application.properties";

    #[test]
    fn models_are_memoized_per_version() {
        let cache = DocumentCache::new();
        cache.open(URI, "a=1", 1);
        assert!(cache.get_existing_model(URI).is_none());

        let first = cache.get_model(URI).unwrap();
        let second = cache.get_model(URI).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &cache.get_existing_model(URI).unwrap()));

        cache.on_change(URI, "a=2", 2).unwrap();
        assert!(cache.get_existing_model(URI).is_none());
        let third = cache.get_model(URI).unwrap();
        assert_eq!(third.version(), 2);
        assert_eq!(third.properties().next().unwrap().property_value().as_deref(), Some("2"));
    }

    #[test]
    fn stale_versions_are_rejected() {
        let cache = DocumentCache::new();
        cache.open(URI, "a=1", 3);
        assert_eq!(
            cache.on_change(URI, "a=2", 3),
            Err(CacheError::StaleVersion { uri: URI.to_owned(), version: 3, current: 3 })
        );
        assert_eq!(cache.version(URI), Some(3));
        assert_eq!(cache.buffer(URI).unwrap().text(), "a=1");
    }

    #[test]
    fn unknown_documents() {
        let cache = DocumentCache::new();
        assert_eq!(cache.get_model(URI).err(), Some(CacheError::UnknownDocument(URI.to_owned())));
        assert!(cache.on_change(URI, "", 1).is_err());
        assert!(!cache.close(URI));
        assert_eq!(cache.version(URI), None);
    }

    #[test]
    fn failed_incremental_change_keeps_the_document() {
        use crate::text::{Position, Range};

        let cache = DocumentCache::new();
        cache.open(URI, "a=1", 1);
        let model = cache.get_model(URI).unwrap();
        let change = TextChange::replace(Range::at(Position::new(5, 0)), "x");
        assert!(matches!(cache.apply_changes(URI, &[change], 2), Err(CacheError::BadLocation(_))));
        assert_eq!(cache.version(URI), Some(1));
        assert!(Arc::ptr_eq(&model, &cache.get_existing_model(URI).unwrap()));
    }

    #[test]
    fn older_change_loses_to_a_newer_one_that_landed_first() {
        let cache = DocumentCache::new();
        cache.open(URI, "a=1", 1);
        let entry = cache.entry(URI).unwrap();

        // both changes claimed their version before either took the lock
        entry.publish(URI, 2).unwrap();
        cache.on_change(URI, "a=3", 3).unwrap();
        assert_eq!(
            entry.commit(URI, 2, |buffer| {
                buffer.set_text("a=2", 2);
                Ok(())
            }),
            Err(CacheError::StaleVersion { uri: URI.to_owned(), version: 2, current: 3 })
        );
        assert_eq!(cache.buffer(URI).unwrap().text(), "a=3");
        assert_eq!(cache.version(URI), Some(3));
    }

    #[test]
    fn rejected_change_does_not_roll_back_a_newer_claim() {
        use crate::text::{Position, Range};

        let cache = DocumentCache::new();
        cache.open(URI, "a=1", 1);
        let entry = cache.entry(URI).unwrap();

        entry.publish(URI, 2).unwrap();
        entry.publish(URI, 3).unwrap();
        let change = TextChange::replace(Range::at(Position::new(5, 0)), "x");
        assert!(matches!(
            entry.commit(URI, 2, |buffer| buffer.apply_changes(&[change], 2)),
            Err(CacheError::BadLocation(_))
        ));
        assert_eq!(cache.version(URI), Some(3));
        assert!(matches!(cache.on_change(URI, "a=3", 3), Err(CacheError::StaleVersion { .. })));
        cache.on_change(URI, "a=4", 4).unwrap();
        assert_eq!(cache.buffer(URI).unwrap().version(), 4);
    }

    #[test]
    fn concurrent_changes_leave_the_newest_text() {
        let cache = DocumentCache::new();
        cache.open(URI, "v=0", 0);
        std::thread::scope(|scope| {
            for version in 1..=16 {
                let cache = &cache;
                scope.spawn(move || {
                    let _ = cache.on_change(URI, &format!("v={version}"), version);
                });
            }
        });
        assert_eq!(cache.version(URI), Some(16));
        let buffer = cache.buffer(URI).unwrap();
        assert_eq!(buffer.version(), 16);
        assert_eq!(buffer.text(), "v=16");
    }

    #[test]
    fn caller_cancellation_caches_nothing() {
        let cache = DocumentCache::new();
        cache.open(URI, "a=1\nb=2", 1);
        assert_eq!(cache.get_model_with(URI, &|| true).err(), Some(CacheError::Cancelled(Cancelled)));
        assert!(cache.get_existing_model(URI).is_none());
        assert!(cache.get_model(URI).is_ok());
    }

    #[test]
    fn close_forgets_the_document() {
        let cache = DocumentCache::new();
        cache.open("file:///b.properties", "", 1);
        cache.open(URI, "", 1);
        assert_eq!(cache.uris(), vec!["file:///application.properties", "file:///b.properties"]);
        assert!(cache.close(URI));
        assert_eq!(cache.uris(), vec!["file:///b.properties"]);
        assert!(cache.get_existing_model(URI).is_none());
    }
}
