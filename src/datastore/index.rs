//! Keyword index.
//!
//! A fixed-size hash table from case-insensitive text keys to [`Item`]s.
//! Collisions are chained: every bucket owns a singly linked list of entries,
//! newest first. The table never grows, so chains lengthen with load.

use super::item::Item;
use crate::error::{CatalogError, Result};
use serde::Serialize;
use std::fmt;
use std::num::NonZeroUsize;
use tracing::{debug, trace};

pub const HASH_TABLE_SIZE: usize = 50;

const DEFAULT_BUCKETS: NonZeroUsize = match NonZeroUsize::new(HASH_TABLE_SIZE) {
    Some(n) => n,
    None => panic!("HASH_TABLE_SIZE must be positive"),
};

struct Entry {
    key: String,
    normalized: String,
    value: Item,
    next: Option<Box<Entry>>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum IndexOperation {
    Inserted,
    Updated,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IndexStats {
    pub bucket_count: usize,
    pub count: usize,
    pub load_factor: f64,
    pub max_chain_length: usize,
    pub empty_buckets: usize,
}

/// Maps a key to its bucket.
///
/// Each character of the lowercased key is weighted by its 1-based position
/// and folded into an accumulator reduced modulo `bucket_count` at every
/// step, so the result is always in `[0, bucket_count)`.
pub fn bucket_for(key: &str, bucket_count: NonZeroUsize) -> usize {
    fold_chars(&normalize(key), bucket_count)
}

fn normalize(key: &str) -> String {
    key.to_lowercase()
}

fn fold_chars(normalized: &str, bucket_count: NonZeroUsize) -> usize {
    let modulus = bucket_count.get() as u128;
    let folded = normalized
        .chars()
        .zip(1u128..)
        .fold(0u128, |acc, (c, position)| {
            (acc + u128::from(u32::from(c)) * position) % modulus
        });
    folded as usize
}

pub struct KeywordIndex {
    buckets: Vec<Option<Box<Entry>>>,
    bucket_count: NonZeroUsize,
    count: usize,
}

impl KeywordIndex {
    /// Creates an index with `bucket_count` empty buckets.
    ///
    /// The bucket count is fixed for the life of the index.
    pub fn with_buckets(bucket_count: usize) -> Result<Self> {
        let bucket_count =
            NonZeroUsize::new(bucket_count).ok_or(CatalogError::InvalidBucketCount)?;
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(bucket_count.get())
            .map_err(|_| CatalogError::InvalidBucketCount)?;
        buckets.resize_with(bucket_count.get(), || None);
        Ok(Self {
            buckets,
            bucket_count,
            count: 0,
        })
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count.get()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Inserts `value` under `key`, or overwrites the value of an existing
    /// entry whose key matches case-insensitively.
    ///
    /// An overwrite keeps the key text the entry was first stored with.
    pub fn insert(&mut self, key: impl Into<String>, value: Item) -> IndexOperation {
        let key = key.into();
        let normalized = normalize(&key);
        let bucket = fold_chars(&normalized, self.bucket_count);

        let mut cursor = self.buckets[bucket].as_deref_mut();
        while let Some(entry) = cursor {
            if entry.normalized == normalized {
                entry.value = value;
                debug!(key = %entry.key, bucket, count = self.count, "updated index entry");
                return IndexOperation::Updated;
            }
            cursor = entry.next.as_deref_mut();
        }

        let next = self.buckets[bucket].take();
        self.buckets[bucket] = Some(Box::new(Entry {
            key,
            normalized,
            value,
            next,
        }));
        self.count += 1;
        debug!(bucket, count = self.count, "inserted index entry");
        IndexOperation::Inserted
    }

    pub fn get(&self, key: &str) -> Option<&Item> {
        let normalized = normalize(key);
        let bucket = fold_chars(&normalized, self.bucket_count);
        trace!(key, bucket, "index lookup");

        let mut cursor = self.buckets[bucket].as_deref();
        while let Some(entry) = cursor {
            if entry.normalized == normalized {
                return Some(&entry.value);
            }
            cursor = entry.next.as_deref();
        }
        None
    }

    /// Mutable view of the item stored under `key`.
    ///
    /// The borrow pins the index, so the entry cannot be removed or
    /// overwritten while the caller holds it.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Item> {
        let normalized = normalize(key);
        let bucket = fold_chars(&normalized, self.bucket_count);
        trace!(key, bucket, "index lookup");

        let mut cursor = self.buckets[bucket].as_deref_mut();
        while let Some(entry) = cursor {
            if entry.normalized == normalized {
                return Some(&mut entry.value);
            }
            cursor = entry.next.as_deref_mut();
        }
        None
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Unlinks the entry matching `key` and returns its item.
    pub fn remove(&mut self, key: &str) -> Option<Item> {
        let normalized = normalize(key);
        let bucket = fold_chars(&normalized, self.bucket_count);

        let mut link = &mut self.buckets[bucket];
        while link
            .as_ref()
            .map_or(false, |entry| entry.normalized != normalized)
        {
            link = &mut link.as_mut()?.next;
        }

        let mut removed = link.take()?;
        *link = removed.next.take();
        self.count -= 1;
        debug!(key = %removed.key, bucket, count = self.count, "removed index entry");
        Some(removed.value)
    }

    /// Iterates `(key, item)` pairs bucket by bucket, newest first within a
    /// bucket. Keys are returned as they were first inserted.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Item)> + '_ {
        self.buckets
            .iter()
            .flat_map(|bucket| ChainIter {
                cursor: bucket.as_deref(),
            })
            .map(|entry| (entry.key.as_str(), &entry.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Item> + '_ {
        self.iter().map(|(_, value)| value)
    }

    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.bucket_count.get() as f64
    }

    pub fn stats(&self) -> IndexStats {
        let mut max_chain_length = 0;
        let mut empty_buckets = 0;
        for bucket in &self.buckets {
            let length = ChainIter {
                cursor: bucket.as_deref(),
            }
            .count();
            if length == 0 {
                empty_buckets += 1;
            }
            max_chain_length = max_chain_length.max(length);
        }

        IndexStats {
            bucket_count: self.bucket_count.get(),
            count: self.count,
            load_factor: self.load_factor(),
            max_chain_length,
            empty_buckets,
        }
    }

    /// Drops every entry; the bucket count is unchanged.
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            release_chain(bucket.take());
        }
        self.count = 0;
    }
}

impl Default for KeywordIndex {
    fn default() -> Self {
        Self {
            buckets: std::iter::repeat_with(|| None)
                .take(DEFAULT_BUCKETS.get())
                .collect(),
            bucket_count: DEFAULT_BUCKETS,
            count: 0,
        }
    }
}

impl fmt::Debug for KeywordIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Drop for KeywordIndex {
    fn drop(&mut self) {
        self.clear();
    }
}

// Unlinks entries one at a time so long chains don't recurse in Box's drop.
fn release_chain(mut link: Option<Box<Entry>>) {
    while let Some(mut entry) = link {
        link = entry.next.take();
    }
}

struct ChainIter<'a> {
    cursor: Option<&'a Entry>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.cursor?;
        self.cursor = entry.next.as_deref();
        Some(entry)
    }
}

impl fmt::Display for KeywordIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Keyword Index (Count: {}/{}) ===",
            self.count,
            self.bucket_count.get()
        )?;
        for (index, bucket) in self.buckets.iter().enumerate() {
            if bucket.is_none() {
                continue;
            }
            write!(f, "Bucket[{index}]: ")?;
            for entry in (ChainIter {
                cursor: bucket.as_deref(),
            }) {
                write!(f, "({}: {}) -> ", entry.key, entry.value.name)?;
            }
            writeln!(f, "NULL")?;
        }
        write!(f, "================================")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::item::ItemType;

    fn item(id: i64, name: &str) -> Item {
        Item::builder(id, name, ItemType::Found).build().unwrap()
    }

    fn buckets(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn case_variants_share_one_entry() {
        let mut index = KeywordIndex::with_buckets(5).unwrap();
        assert_eq!(index.insert("Keys", item(1, "first")), IndexOperation::Inserted);
        assert_eq!(index.insert("keys", item(2, "second")), IndexOperation::Updated);

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("KEYS").unwrap().name, "second");
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["Keys"]);
    }

    #[test]
    fn distinct_keys_count_separately() {
        let mut index = KeywordIndex::with_buckets(5).unwrap();
        index.insert("iphone", item(1, "iPhone 13"));
        index.insert("electronics", item(1, "iPhone 13"));
        assert_eq!(index.len(), 2);
        assert!(index.contains_key("IPhone"));
        assert!(!index.contains_key("android"));
    }

    #[test]
    fn bucket_folds_weighted_characters() {
        // k:107*1, e:101*2, y:121*3, s:115*4, reduced mod 50 at each step
        assert_eq!(bucket_for("keys", buckets(50)), 32);
        assert_eq!(bucket_for("KEYS", buckets(50)), 32);
        assert_eq!(bucket_for("", buckets(50)), 0);
        assert_eq!(bucket_for("anything", buckets(1)), 0);

        for key in ["student id", "Électronique", "wallet", "a much longer key with spaces"] {
            for n in [1, 2, 7, 50, 1024] {
                let bucket = bucket_for(key, buckets(n));
                assert!(bucket < n);
                assert_eq!(bucket, bucket_for(key, buckets(n)));
            }
        }
    }

    #[test]
    fn removal_relinks_collision_chain() {
        // one bucket forces every key into the same chain
        let mut index = KeywordIndex::with_buckets(1).unwrap();
        for (id, key) in ["a", "b", "c", "d"].iter().enumerate() {
            index.insert(*key, item(id as i64, key));
        }
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["d", "c", "b", "a"]);

        assert_eq!(index.remove("b").unwrap().name, "b");
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["d", "c", "a"]);

        assert_eq!(index.remove("D").unwrap().name, "d");
        assert_eq!(index.remove("a").unwrap().name, "a");
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["c"]);
        assert_eq!(index.len(), 1);

        assert!(index.remove("a").is_none());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn get_mut_edits_stored_value() {
        let mut index = KeywordIndex::default();
        index.insert("wallet", item(4, "Wallet"));
        index.get_mut("Wallet").unwrap().color = "Brown".to_string();
        assert_eq!(index.get("wallet").unwrap().color, "Brown");
        assert!(index.get_mut("purse").is_none());
    }

    #[test]
    fn zero_buckets_rejected() {
        assert!(matches!(
            KeywordIndex::with_buckets(0),
            Err(CatalogError::InvalidBucketCount)
        ));
    }

    #[test]
    fn unallocatable_bucket_count_rejected() {
        assert!(matches!(
            KeywordIndex::with_buckets(usize::MAX / 2),
            Err(CatalogError::InvalidBucketCount)
        ));
    }

    #[test]
    fn debug_lists_entries() {
        let mut index = KeywordIndex::with_buckets(1).unwrap();
        index.insert("Wallet", item(4, "Wallet"));
        let dump = format!("{index:?}");
        assert!(dump.starts_with("{\"Wallet\": Item {"));
        assert!(dump.contains("id: 4"));
    }

    #[test]
    fn stats_and_clear() {
        let mut index = KeywordIndex::with_buckets(4).unwrap();
        assert_eq!(index.bucket_count(), 4);
        let stats = index.stats();
        assert_eq!(stats.empty_buckets, 4);
        assert_eq!(stats.max_chain_length, 0);

        index.insert("keys", item(3, "Keys"));
        index.insert("umbrella", item(5, "Umbrella"));
        let stats = index.stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.load_factor, 0.5);
        assert!(stats.max_chain_length >= 1);
        assert_eq!(
            stats.empty_buckets,
            4 - index.buckets.iter().filter(|b| b.is_some()).count()
        );

        let dump = index.to_string();
        assert!(dump.contains("(Count: 2/4)"));
        assert!(dump.contains("(keys: Keys) -> "));

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.values().count(), 0);
        assert_eq!(index.bucket_count(), 4);
    }
}
