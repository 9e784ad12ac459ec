//! Table Cache Module
//! Time-boxed cache for the generated metric table with explicit expiry.

use super::generator::MetricGenerator;
use super::table::{MetricTable, TableError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Default validity of a cached table.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Time source, swappable in tests.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Produces a brand-new metric table on every call.
pub trait TableSource {
    fn load(&mut self) -> Result<MetricTable, TableError>;
}

/// Generates synthetic tables for a fixed year range.
pub struct GeneratedTableSource {
    generator: MetricGenerator,
    year_start: i32,
    year_end: i32,
}

impl GeneratedTableSource {
    pub fn new(generator: MetricGenerator, year_start: i32, year_end: i32) -> Self {
        Self {
            generator,
            year_start,
            year_end,
        }
    }
}

impl TableSource for GeneratedTableSource {
    fn load(&mut self) -> Result<MetricTable, TableError> {
        self.generator.generate(self.year_start, self.year_end)
    }
}

struct CacheEntry {
    table: Arc<MetricTable>,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

/// Caches the table produced by a [`TableSource`] until its expiry instant.
///
/// Cached tables are shared read-only; a refresh always swaps in a new
/// table and never touches the one readers already hold.
pub struct TableCache<S: TableSource, C: Clock = SystemClock> {
    source: S,
    clock: C,
    ttl: Duration,
    entry: Option<CacheEntry>,
}

impl<S: TableSource> TableCache<S, SystemClock> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self::with_clock(source, ttl, SystemClock)
    }
}

impl<S: TableSource, C: Clock> TableCache<S, C> {
    pub fn with_clock(source: S, ttl: Duration, clock: C) -> Self {
        Self {
            source,
            clock,
            ttl,
            entry: None,
        }
    }

    /// Cached table, reloaded when missing or expired.
    pub fn get(&mut self) -> Result<Arc<MetricTable>, TableError> {
        if let Some(entry) = &self.entry {
            if entry.expires_at.map_or(true, |at| self.clock.now() < at) {
                return Ok(Arc::clone(&entry.table));
            }
        }
        self.refresh()
    }

    /// Load a new table unconditionally and restart the validity window.
    pub fn refresh(&mut self) -> Result<Arc<MetricTable>, TableError> {
        let table = Arc::new(self.source.load()?);
        let expires_at = self.clock.now().checked_add(self.ttl);
        info!(rows = table.height(), ttl_secs = self.ttl.as_secs(), "metric table cache refreshed");
        self.entry = Some(CacheEntry {
            table: Arc::clone(&table),
            expires_at,
        });
        Ok(table)
    }

    /// Expiry of the cached table; `None` when nothing is cached or it never expires.
    pub fn expires_at(&self) -> Option<Instant> {
        self.entry.as_ref().and_then(|e| e.expires_at)
    }

    /// True when nothing is cached or the window has passed.
    pub fn is_expired(&self) -> bool {
        self.entry
            .as_ref()
            .map(|e| e.expires_at.is_some_and(|at| self.clock.now() >= at))
            .unwrap_or(true)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Clone)]
    struct ManualClock(Rc<Cell<Instant>>);

    impl ManualClock {
        fn new() -> Self {
            Self(Rc::new(Cell::new(Instant::now())))
        }

        fn advance(&self, by: Duration) {
            self.0.set(self.0.get() + by);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.0.get()
        }
    }

    struct CountingSource {
        inner: GeneratedTableSource,
        loads: Rc<RefCell<usize>>,
    }

    impl TableSource for CountingSource {
        fn load(&mut self) -> Result<MetricTable, TableError> {
            *self.loads.borrow_mut() += 1;
            self.inner.load()
        }
    }

    fn cache(ttl: Duration) -> (TableCache<CountingSource, ManualClock>, ManualClock, Rc<RefCell<usize>>) {
        let clock = ManualClock::new();
        let loads = Rc::new(RefCell::new(0));
        let source = CountingSource {
            inner: GeneratedTableSource::new(MetricGenerator::with_seed(5), 2018, 2024),
            loads: Rc::clone(&loads),
        };
        (TableCache::with_clock(source, ttl, clock.clone()), clock, loads)
    }

    #[test]
    fn reuses_table_within_window() {
        let (mut cache, clock, loads) = cache(DEFAULT_TTL);
        let first = cache.get().unwrap();
        clock.advance(Duration::from_secs(3599));
        let second = cache.get().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*loads.borrow(), 1);
        assert!(!cache.is_expired());
    }

    #[test]
    fn reloads_after_expiry() {
        let (mut cache, clock, loads) = cache(DEFAULT_TTL);
        let first = cache.get().unwrap();
        clock.advance(DEFAULT_TTL);
        assert!(cache.is_expired());

        let second = cache.get().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*loads.borrow(), 2);
        assert_eq!(first.height(), 7);
    }

    #[test]
    fn explicit_refresh_restarts_window() {
        let (mut cache, clock, loads) = cache(Duration::from_secs(10));
        cache.get().unwrap();
        let expiry = cache.expires_at().unwrap();

        clock.advance(Duration::from_secs(5));
        cache.refresh().unwrap();
        assert_eq!(*loads.borrow(), 2);
        assert_eq!(cache.expires_at().unwrap(), expiry + Duration::from_secs(5));
    }

    #[test]
    fn invalidate_forces_reload() {
        let (mut cache, _clock, loads) = cache(DEFAULT_TTL);
        assert!(cache.is_expired());
        assert!(cache.expires_at().is_none());

        cache.get().unwrap();
        cache.invalidate();
        cache.get().unwrap();
        assert_eq!(*loads.borrow(), 2);
    }

    #[test]
    fn unrepresentable_ttl_never_expires() {
        let (mut cache, clock, loads) = cache(Duration::from_secs(u64::MAX));
        let first = cache.get().unwrap();
        assert!(cache.expires_at().is_none());

        clock.advance(Duration::from_secs(365 * 24 * 3600));
        assert!(!cache.is_expired());
        assert!(Arc::ptr_eq(&first, &cache.get().unwrap()));
        assert_eq!(*loads.borrow(), 1);

        cache.refresh().unwrap();
        assert_eq!(*loads.borrow(), 2);
    }
}
