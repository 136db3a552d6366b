/// Builds an owned [`Entry`](crate::hashmap::hash_table::Entry),
/// copying `$key` and `$value` into fresh buffers
macro_rules! entry {
    ( $key: expr, $value: expr) => {
        $crate::hashmap::hash_table::Entry {
            key: $key.into(),
            value: $value.into(),
        }
    };
}

/// Shorthand for `Slot::Occupied(entry!(key, value))`
#[cfg(test)]
macro_rules! slot {
    ( $key: expr, $value: expr) => {
        $crate::hashmap::hash_table::Slot::Occupied(entry!($key, $value))
    };
}
