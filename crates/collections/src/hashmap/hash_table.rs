use log::trace;

use super::DictError;

const HASH_MULTIPLIER: u32 = 1_000_003;

/// Maps `key` to a bucket index in `0..capacity`
///
/// Polynomial rolling hash over the key's bytes with 32 bit wraparound,
/// seeded with the first byte and finished with the key length.
/// The empty key always lands in bucket 0.
///
/// # Panics
///
/// Panics if `capacity` is 0
pub fn hash(key: &str, capacity: usize) -> usize {
    assert!(capacity > 0, "hashing into a table with no slots");

    let bytes = key.as_bytes();
    let Some(&first) = bytes.first() else {
        return 0;
    };

    let mut x = (first as u32) << 7;
    for &b in bytes {
        x = HASH_MULTIPLIER.wrapping_mul(x) ^ b as u32;
    }
    x ^= bytes.len() as u32;

    x as usize % capacity
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Entry {
    pub(crate) key: String,
    pub(crate) value: Vec<u8>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) enum Slot {
    /// Never held an entry, ends every probe
    #[default]
    Unused,
    Occupied(Entry),
    /// Held an entry that was deleted, probes walk past it
    Tombstone,
}

/// Fixed size slot array with linear probing
///
/// The table never grows by itself, growing is the job of [`super::Dict`]
/// which builds a bigger table and moves the live entries over.
#[derive(Debug)]
pub(crate) struct HashTable {
    pub(crate) slots: Vec<Slot>,
    pub(crate) stored: usize,
    pub(crate) deleted: usize,
}

impl HashTable {
    /// Creates a table with `cap` unused slots
    ///
    /// # Errors
    ///
    /// Fails with [`DictError::AllocFailed`] instead of aborting
    /// if the slot array cannot be allocated
    pub fn try_with_capacity(cap: usize) -> Result<Self, DictError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(cap)
            .map_err(|_| DictError::AllocFailed { requested: cap })?;
        slots.resize_with(cap, Slot::default);

        Ok(Self {
            slots,
            stored: 0,
            deleted: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn load_factor(&self) -> f64 {
        (self.stored + self.deleted) as f64 / self.capacity() as f64
    }

    /// Slot indices visited for `key`: its bucket, then every following
    /// slot with wraparound, each slot exactly once
    fn probe(&self, key: &str) -> impl Iterator<Item = usize> + use<> {
        let cap = self.capacity();
        let start = hash(key, cap);
        (0..cap).map(move |i| (start + i) % cap)
    }

    /// Index of the slot holding `key`
    fn find(&self, key: &str) -> Option<usize> {
        for i in self.probe(key) {
            match &self.slots[i] {
                Slot::Unused => return None,
                Slot::Occupied(entry) if entry.key == key => return Some(i),
                Slot::Occupied(_) | Slot::Tombstone => {}
            }
        }
        None
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        match &self.slots[self.find(key)?] {
            Slot::Occupied(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Inserts or updates `key`, returning the value it replaced
    ///
    /// A new key goes into the first tombstone seen on its probe,
    /// or the unused slot ending it. The probe still runs up to that
    /// unused slot, since the key may already live past the tombstone.
    ///
    /// # Panics
    ///
    /// Panics if the key is new and no slot is free,
    /// callers must keep the load factor below 1
    pub fn insert(&mut self, key: &str, value: Vec<u8>) -> Option<Vec<u8>> {
        let mut free = None;
        for i in self.probe(key) {
            match &mut self.slots[i] {
                Slot::Unused => {
                    free.get_or_insert(i);
                    break;
                }
                Slot::Tombstone => {
                    free.get_or_insert(i);
                }
                Slot::Occupied(entry) if entry.key == key => {
                    return Some(std::mem::replace(&mut entry.value, value));
                }
                Slot::Occupied(_) => {}
            }
        }

        let Some(i) = free else {
            panic!(
                "no free slot for new key: stored={}, deleted={}, capacity={}",
                self.stored,
                self.deleted,
                self.capacity()
            );
        };

        if matches!(self.slots[i], Slot::Tombstone) {
            trace!(target: "insert", "reusing tombstone at slot {i}");
            self.deleted -= 1;
        }
        self.slots[i] = Slot::Occupied(entry!(key, value));
        self.stored += 1;

        None
    }

    /// Puts an entry known to be absent into the first unused slot of its
    /// probe. Only valid on a table without tombstones, e.g. while rehashing.
    pub fn place_fresh(&mut self, entry: Entry) {
        for i in self.probe(&entry.key) {
            if matches!(self.slots[i], Slot::Unused) {
                self.slots[i] = Slot::Occupied(entry);
                self.stored += 1;
                return;
            }
        }
        panic!("rehash target table of {} slots is full", self.capacity());
    }

    /// Removes `key`, leaving a tombstone in its slot
    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        let i = self.find(key)?;
        match std::mem::replace(&mut self.slots[i], Slot::Tombstone) {
            Slot::Occupied(entry) => {
                trace!(target: "remove", "tombstoned slot {i}");
                self.stored -= 1;
                self.deleted += 1;
                Some(entry)
            }
            other => {
                // find only ever returns occupied slots
                self.slots[i] = other;
                None
            }
        }
    }

    /// Live entries in slot order, consuming the table
    pub fn into_entries(self) -> impl Iterator<Item = Entry> {
        self.slots.into_iter().filter_map(|slot| match slot {
            Slot::Occupied(entry) => Some(entry),
            _ => None,
        })
    }

    /// Counts `(occupied, tombstone)` slots with a full scan
    pub fn recount(&self) -> (usize, usize) {
        self.slots
            .iter()
            .fold((0, 0), |(used, deleted), slot| match slot {
                Slot::Occupied(_) => (used + 1, deleted),
                Slot::Tombstone => (used, deleted + 1),
                Slot::Unused => (used, deleted),
            })
    }
}
