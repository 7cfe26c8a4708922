//! String interning and the cross-frame encoded-string cache.

use ahash::AHashMap;
use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::len_u32;

/// Where an interned string landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Interned {
    pub id: u32,
    pub byte_off: u32,
    pub byte_len: u32,
}

/// Per-build string table.
///
/// Ids are 1-based in first-use order; each distinct string is stored in
/// the pool exactly once.
#[derive(Debug, Default)]
pub(crate) struct StringTable {
    ids: AHashMap<Box<str>, u32>,
    spans: Vec<(u32, u32)>,
    pool: BytesMut,
}

impl StringTable {
    pub fn lookup(&self, text: &str) -> Option<Interned> {
        let id = *self.ids.get(text)?;
        let (byte_off, byte_len) = self.spans[(id - 1) as usize];
        Some(Interned {
            id,
            byte_off,
            byte_len,
        })
    }

    /// Appends a new string. The caller has checked it is not interned yet.
    pub fn insert(&mut self, text: &str, encoded: &[u8]) -> Interned {
        let byte_off = len_u32(self.pool.len());
        let byte_len = len_u32(encoded.len());
        self.pool.put_slice(encoded);
        self.spans.push((byte_off, byte_len));
        let id = len_u32(self.spans.len());
        self.ids.insert(text.into(), id);
        Interned {
            id,
            byte_off,
            byte_len,
        }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn spans(&self) -> &[(u32, u32)] {
        &self.spans
    }

    pub fn pool(&self) -> &[u8] {
        &self.pool
    }

    pub fn reserve(&mut self, additional: usize) {
        self.pool.reserve(additional);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.spans.clear();
        self.pool.clear();
    }
}

/// Counters for the encoded-string cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to encode.
    pub misses: u64,
    /// Entries currently held.
    pub len: usize,
}

/// Bounded cache of UTF-8 encodings that survives `reset()`.
///
/// When a new key arrives at capacity the whole cache is cleared before the
/// key is inserted; entries are never evicted one at a time. A capacity of
/// zero disables caching entirely.
#[derive(Debug)]
pub struct EncodedStringCache {
    cap: usize,
    entries: AHashMap<Box<str>, Bytes>,
    hits: u64,
    misses: u64,
}

impl EncodedStringCache {
    /// Creates a cache holding at most `cap` entries.
    pub fn new(cap: u32) -> Self {
        Self {
            cap: cap as usize,
            entries: AHashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the encoding of `text`, from the cache when possible.
    pub fn encode(&mut self, text: &str) -> Bytes {
        if let Some(bytes) = self.entries.get(text) {
            self.hits += 1;
            return bytes.clone();
        }
        self.misses += 1;
        let bytes = Bytes::copy_from_slice(text.as_bytes());
        if self.cap == 0 {
            return bytes;
        }
        if self.entries.len() >= self.cap {
            tracing::trace!(cap = self.cap, "encoded string cache full, clearing");
            self.entries.clear();
        }
        self.entries.insert(text.into(), bytes.clone());
        bytes
    }

    /// Returns whether `text` is cached.
    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(text)
    }

    /// Returns the hit/miss counters and current size.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            len: self.entries.len(),
        }
    }
}
