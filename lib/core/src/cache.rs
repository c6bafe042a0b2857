//! Bounded memoization for display formatting
//!
//! Caches are explicit values handed to whoever renders output. Nothing here
//! is global, so two renderers never share or race on hidden state.

use ahash::RandomState;
use lru::LruCache;
use parking_lot::Mutex;
use std::hash::Hash;
use std::num::NonZeroUsize;

/// Default number of entries kept by a [`CurrencyFormatter`]
pub const DEFAULT_FORMAT_CACHE_CAPACITY: usize = 1024;

/// A fixed-capacity key/value cache that evicts the least recently used entry
pub struct BoundedCache<K: Hash + Eq, V> {
    inner: Mutex<LruCache<K, V, RandomState>>,
}

impl<K: Eq + Hash + Clone, V: Clone> BoundedCache<K, V> {
    /// Create a cache holding at most `capacity` entries (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::with_hasher(capacity, RandomState::new())),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().cap().get()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up `key`, marking it as recently used
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    /// Return the cached value for `key`, computing and storing it on a miss
    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        let mut inner = self.inner.lock();
        if let Some(value) = inner.get(&key) {
            return value.clone();
        }

        let value = compute();
        inner.put(key, value.clone());
        value
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

/// Formats dollar amounts as whole US currency, e.g. `$1,234,567`
pub struct CurrencyFormatter {
    cache: BoundedCache<i64, String>,
}

impl Default for CurrencyFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_FORMAT_CACHE_CAPACITY)
    }
}

impl CurrencyFormatter {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: BoundedCache::new(capacity),
        }
    }

    /// Format an amount rounded to whole dollars; non-finite amounts render as `-`
    pub fn format(&self, amount: f64) -> String {
        if !amount.is_finite() {
            return "-".to_string();
        }
        let dollars = amount.round() as i64;
        self.cache.get_or_insert_with(dollars, || format_whole_dollars(dollars))
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

fn format_whole_dollars(dollars: i64) -> String {
    let digits = dollars.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if dollars < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
