use std::borrow::Cow;
use std::fmt;

use log::{debug, warn};

use super::hash_table::{HashTable, Slot};
use super::{DictConfig, DictError};

/// String keyed dictionary over an open addressing hash table
///
/// Keys and values are copied in on [`Dict::store`] and owned by the
/// dictionary until they are overwritten, deleted or the dictionary is
/// dropped.
///
/// ```
/// use collections::Dict;
///
/// let mut teams = Dict::new();
/// teams.store("Denver", "Nuggets").unwrap();
/// assert_eq!(teams.retrieve("Denver"), Some(&b"Nuggets"[..]));
/// assert!(!teams.contains("Chicago"));
/// ```
#[derive(Debug)]
pub struct Dict {
    table: HashTable,
    config: DictConfig,
}

impl Default for Dict {
    fn default() -> Self {
        Self::new()
    }
}

impl Dict {
    /// Creates an empty dictionary with the default [`DictConfig`]
    ///
    /// # Panics
    ///
    /// Panics if the initial slot array cannot be allocated,
    /// like the std collections do
    pub fn new() -> Self {
        match Self::with_config(DictConfig::default()) {
            Ok(dict) => dict,
            Err(e) => panic!("couldnt create dictionary: {e}"),
        }
    }

    /// Creates an empty dictionary sized by `config`
    pub fn with_config(config: DictConfig) -> Result<Self, DictError> {
        config.validate()?;
        let table = HashTable::try_with_capacity(config.initial_capacity)?;
        Ok(Self { table, config })
    }

    pub fn config(&self) -> &DictConfig {
        &self.config
    }

    /// Returns the number of live entries
    ///
    /// Debug builds recount the slot array and panic
    /// if the counters drifted from it.
    pub fn size(&self) -> usize {
        self.check_counters();
        self.table.stored
    }

    /// Shorthand for `self.size() == 0`
    pub fn is_empty(&self) -> bool {
        self.table.stored == 0
    }

    /// Returns the number of slots
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of tombstones left by deletes since the last rehash
    pub fn deleted(&self) -> usize {
        self.table.deleted
    }

    /// `(stored + deleted) / capacity`, tombstones count as used
    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    pub fn retrieve(&self, key: &str) -> Option<&[u8]> {
        self.table.get(key).map(|entry| entry.value.as_slice())
    }

    /// Like [`Dict::retrieve`], with the value decoded as lossy UTF-8
    pub fn retrieve_str(&self, key: &str) -> Option<Cow<'_, str>> {
        self.retrieve(key).map(String::from_utf8_lossy)
    }

    /// Stores a copy of `key` and `value`, returning the value it replaced
    ///
    /// Adding a new key first rehashes into a bigger table if the load
    /// factor reached the threshold, or if the key would otherwise fill
    /// the last free slot. Updates never rehash.
    ///
    /// # Errors
    ///
    /// Fails if that rehash cannot allocate, in which case nothing is stored
    /// and the dictionary is left as it was.
    pub fn store(
        &mut self,
        key: &str,
        value: impl Into<Vec<u8>>,
    ) -> Result<Option<Vec<u8>>, DictError> {
        if self.needs_rehash() && !self.contains(key) {
            self.rehash()?;
        }

        Ok(self.table.insert(key, value.into()))
    }

    /// Removes `key`, returning its value. Absent keys are ignored.
    pub fn delete(&mut self, key: &str) -> Option<Vec<u8>> {
        self.table.remove(key).map(|entry| entry.value)
    }

    /// Calls `visitor` once for every live entry, in slot order
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&str, &[u8]),
    {
        for (key, value) in self.iter() {
            visitor(key, value);
        }
    }

    // [adapters]

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            slots: self.table.slots.iter(),
            remaining: self.table.stored,
        }
    }

    // [private]

    /// Moves every live entry into a table `growth_factor` times bigger,
    /// dropping all tombstones
    ///
    /// The new slot array is allocated before anything is moved,
    /// so on error the current table is untouched.
    fn rehash(&mut self) -> Result<(), DictError> {
        let old_cap = self.capacity();
        let new_cap = old_cap
            .checked_mul(self.config.growth_factor)
            .ok_or(DictError::CapacityOverflow {
                capacity: old_cap,
                growth_factor: self.config.growth_factor,
            })
            .inspect_err(|e| warn!(target: "rehash", "{e}"))?;

        let new_table = HashTable::try_with_capacity(new_cap)
            .inspect_err(|e| warn!(target: "rehash", "{e}"))?;

        debug!(
            target: "rehash",
            "growing {} -> {} slots, moving {} entries, purging {} tombstones",
            old_cap,
            new_cap,
            self.table.stored,
            self.table.deleted
        );

        let old_table = std::mem::replace(&mut self.table, new_table);
        let moved = old_table.stored;
        for entry in old_table.into_entries() {
            self.table.place_fresh(entry);
        }

        assert_eq!(
            self.table.stored, moved,
            "rehash lost entries moving them into the new table"
        );
        Ok(())
    }

    fn needs_rehash(&self) -> bool {
        self.load_factor() >= self.config.rehash_threshold
            // a new key never takes the last free slot
            || self.table.stored + self.table.deleted + 1 >= self.capacity()
    }

    fn check_counters(&self) {
        if cfg!(debug_assertions) {
            let (used, deleted) = self.table.recount();
            assert_eq!(
                used, self.table.stored,
                "stored counter out of sync with the slot array"
            );
            assert_eq!(
                deleted, self.table.deleted,
                "deleted counter out of sync with the slot array"
            );
        }
    }
}

/// Renders the capacity, the counters and every slot, for debugging
impl fmt::Display for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Dictionary contents (capacity={}, stored={}, deleted={}):",
            self.capacity(),
            self.table.stored,
            self.table.deleted
        )?;

        for (i, slot) in self.table.slots.iter().enumerate() {
            match slot {
                Slot::Unused => writeln!(f, "Slot {i}: UNUSED")?,
                Slot::Tombstone => writeln!(f, "Slot {i}: DELETED")?,
                Slot::Occupied(entry) => writeln!(
                    f,
                    "Slot {i}: IN USE - Key: {}, Value: {}",
                    entry.key,
                    String::from_utf8_lossy(&entry.value)
                )?,
            }
        }
        Ok(())
    }
}

/// Iterator over the live `(key, value)` pairs of a [`Dict`]
#[derive(Debug)]
pub struct Iter<'a> {
    slots: std::slice::Iter<'a, Slot>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Slot::Occupied(entry) = slot {
                self.remaining -= 1;
                return Some((entry.key.as_str(), entry.value.as_slice()));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Dict {
    type Item = (&'a str, &'a [u8]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use super::Dict;
    use crate::{DictConfig, DictError};

    fn teams() -> Dict {
        let mut d = Dict::new();
        d.store("Atlanta", "Hawks").unwrap();
        d.store("Boston", "Celtics").unwrap();
        d.store("Los Angeles", "Lakers").unwrap();
        d.store("Denver", "Nuggets").unwrap();
        d
    }

    #[test]
    fn new_is_empty() {
        let d = Dict::new();
        assert_eq!(d.size(), 0);
        assert_eq!(d.capacity(), 8);
        assert_eq!(d.deleted(), 0);
        assert_eq!(d.load_factor(), 0.0);
        assert!(d.is_empty());
    }

    #[test]
    fn teams_scenario() {
        let mut d = teams();
        assert_eq!(d.retrieve("Denver"), Some(&b"Nuggets"[..]));
        assert_eq!(d.size(), 4);

        assert_eq!(d.delete("Boston"), Some(b"Celtics".to_vec()));
        assert_eq!(d.size(), 3);
        assert!(!d.contains("Boston"));

        let old = d.store("Denver", "Broncos").unwrap();
        assert_eq!(old, Some(b"Nuggets".to_vec()));
        assert_eq!(d.retrieve_str("Denver").as_deref(), Some("Broncos"));
        assert_eq!(d.size(), 3);
        dbg!(&d);
    }

    #[test]
    fn retrieve_absent() {
        let d = teams();
        assert_eq!(d.retrieve("Chicago"), None);
        assert!(!d.contains("Chicago"));
    }

    #[test]
    fn delete_absent_is_noop() {
        let mut d = teams();
        assert_eq!(d.delete("Chicago"), None);
        assert_eq!(d.size(), 4);
        assert_eq!(d.capacity(), 8);
        assert_eq!(d.deleted(), 0);
        assert_eq!(d.retrieve("Atlanta"), Some(&b"Hawks"[..]));
    }

    #[test]
    fn empty_key_and_value() {
        let mut d = Dict::new();
        d.store("", "").unwrap();
        assert!(d.contains(""));
        assert_eq!(d.retrieve(""), Some(&b""[..]));
        d.delete("");
        assert!(!d.contains(""));
    }

    #[test]
    fn values_are_opaque_bytes() {
        let mut d = Dict::new();
        d.store("bin", vec![0u8, 159, 146, 150]).unwrap();
        assert_eq!(d.retrieve("bin"), Some(&[0u8, 159, 146, 150][..]));
        assert_eq!(d.retrieve_str("bin").as_deref(), Some("\0\u{FFFD}\u{FFFD}\u{FFFD}"));
    }

    #[test]
    fn stored_copy_outlives_caller_buffer() {
        let mut d = Dict::new();
        let mut key = String::from("Chicago");
        let mut value = String::from("Bulls");
        d.store(&key, value.as_str()).unwrap();
        key.push_str(" Fire");
        value.clear();
        drop(key);
        drop(value);
        assert_eq!(d.retrieve_str("Chicago").as_deref(), Some("Bulls"));
    }

    #[test]
    fn rehash_at_threshold() {
        let mut d = Dict::new();
        for i in 0..5 {
            d.store(&format!("team{i}"), "x").unwrap();
        }
        // 5 / 8 = 0.625, the next new key grows the table first
        assert_eq!(d.capacity(), 8);
        d.store("team5", "x").unwrap();
        assert_eq!(d.capacity(), 16);
        assert_eq!(d.size(), 6);
        assert_eq!(d.load_factor(), 6.0 / 16.0);
    }

    #[test]
    fn update_never_rehashes() {
        let mut d = Dict::new();
        for i in 0..5 {
            d.store(&format!("team{i}"), "x").unwrap();
        }
        assert!(d.load_factor() >= 0.6);
        d.store("team0", "y").unwrap();
        assert_eq!(d.capacity(), 8);
        assert_eq!(d.retrieve("team0"), Some(&b"y"[..]));
    }

    #[test]
    fn tombstones_count_towards_rehash() {
        let mut d = Dict::new();
        for k in ["a", "b", "c", "d"] {
            d.store(k, k).unwrap();
        }
        d.delete("a");
        // 3 stored + 1 deleted = 0.5
        assert_eq!(d.load_factor(), 0.5);
        d.store("e", "e").unwrap();
        assert_eq!(d.capacity(), 8);
        assert_eq!((d.size(), d.deleted()), (4, 1));

        // 0.625 now, reinserting "a" is a new key and rehashes
        d.store("a", "again").unwrap();
        assert_eq!(d.capacity(), 16);
        assert_eq!((d.size(), d.deleted()), (5, 0));
        for k in ["b", "c", "d", "e"] {
            assert_eq!(d.retrieve_str(k).as_deref(), Some(k));
        }
        assert_eq!(d.retrieve_str("a").as_deref(), Some("again"));
    }

    #[test]
    fn fifty_keys() {
        let mut d = Dict::new();
        assert_eq!(d.load_factor(), 0.0);
        for i in 0..50 {
            d.store(&format!("team{i}"), format!("Some Team {i}")).unwrap();
            assert!(d.load_factor() < 1.0);
        }
        assert_eq!(d.size(), 50);
        assert!(d.load_factor() > 0.0);
        for i in 0..50 {
            let want = format!("Some Team {i}");
            assert_eq!(d.retrieve_str(&format!("team{i}")).as_deref(), Some(want.as_str()));
        }
    }

    #[test]
    fn custom_config() {
        let cfg = DictConfig::default()
            .initial_capacity(2)
            .growth_factor(3)
            .rehash_threshold(0.5);
        let mut d = Dict::with_config(cfg).unwrap();
        d.store("a", "1").unwrap();
        d.store("b", "2").unwrap();
        assert_eq!(d.capacity(), 6);
        assert_eq!(d.size(), 2);
    }

    #[test]
    fn tiny_table_keeps_a_free_slot() {
        let mut d = Dict::with_config(DictConfig::default().initial_capacity(1)).unwrap();
        d.store("a", "1").unwrap();
        assert_eq!(d.capacity(), 2);
        d.store("b", "2").unwrap();
        assert_eq!(d.capacity(), 4);
        assert!(d.load_factor() < 1.0);
        assert_eq!(d.size(), 2);
    }

    #[test]
    fn invalid_config() {
        let err = Dict::with_config(DictConfig::default().initial_capacity(0)).unwrap_err();
        assert!(matches!(err, DictError::InvalidConfig(_)));
    }

    #[test]
    fn capacity_overflow_leaves_table_intact() {
        let cfg = DictConfig::default()
            .initial_capacity(2)
            .growth_factor(usize::MAX)
            .rehash_threshold(0.5);
        let mut d = Dict::with_config(cfg).unwrap();
        d.store("a", "1").unwrap();

        let err = d.store("b", "2").unwrap_err();
        assert_eq!(
            err,
            DictError::CapacityOverflow {
                capacity: 2,
                growth_factor: usize::MAX
            }
        );
        assert_eq!(d.capacity(), 2);
        assert_eq!(d.size(), 1);
        assert!(!d.contains("b"));
        assert_eq!(d.retrieve("a"), Some(&b"1"[..]));

        // updates skip the rehash and still work
        d.store("a", "one").unwrap();
        assert_eq!(d.retrieve("a"), Some(&b"one"[..]));
    }

    #[test]
    fn alloc_failure_leaves_table_intact() {
        let cfg = DictConfig::default()
            .initial_capacity(2)
            .growth_factor(usize::MAX / 2)
            .rehash_threshold(0.5);
        let mut d = Dict::with_config(cfg).unwrap();
        d.store("a", "1").unwrap();

        let err = d.store("b", "2").unwrap_err();
        assert!(matches!(err, DictError::AllocFailed { .. }));
        assert_eq!(d.capacity(), 2);
        assert_eq!(d.size(), 1);
        assert_eq!(d.retrieve("a"), Some(&b"1"[..]));
    }

    #[test]
    fn for_each_visits_every_entry_once() {
        let mut d = teams();
        d.delete("Atlanta");

        let mut seen = Vec::new();
        d.for_each(|k, v| seen.push((k.to_string(), v.to_vec())));
        seen.sort();

        assert_eq!(
            seen,
            [
                ("Boston".to_string(), b"Celtics".to_vec()),
                ("Denver".to_string(), b"Nuggets".to_vec()),
                ("Los Angeles".to_string(), b"Lakers".to_vec()),
            ]
        );
        assert_eq!(d.iter().len(), 3);
        assert_eq!((&d).into_iter().count(), 3);
    }

    #[test]
    fn display_dump() {
        let mut d = Dict::new();
        d.store("Atlanta", "Hawks").unwrap();
        d.store("Boston", "Celtics").unwrap();
        d.delete("Boston");

        let out = d.to_string();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(
            lines[0],
            "Dictionary contents (capacity=8, stored=1, deleted=1):"
        );
        assert_eq!(lines.len(), 9);
        // "Boston" hashes to 1, "Atlanta" to 2 at capacity 8
        assert_eq!(lines[2], "Slot 1: DELETED");
        assert_eq!(lines[3], "Slot 2: IN USE - Key: Atlanta, Value: Hawks");
        assert_eq!(lines[1], "Slot 0: UNUSED");
    }
}
