use std::collections::BTreeMap;

/// One stored image. `hash` is only a shortlist filter; identity is the
/// full `value` comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub hash: i32,
    pub value: String,
}

impl ImageData {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            hash: content_hash(&value),
            value,
        }
    }
}

/// Images referenced by embed id. Ids are indices into `data` and never move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageTable {
    /// External source string to the id its fetched content was stored under.
    pub lookup: BTreeMap<String, usize>,
    pub data: Vec<ImageData>,
}

impl ImageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty() && self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn contains(&self, id: usize) -> bool {
        id < self.data.len()
    }

    pub fn get(&self, id: usize) -> Option<&ImageData> {
        self.data.get(id)
    }

    /// Id of an entry equal to `value`, checking the hash before the bytes.
    pub fn find(&self, value: &str) -> Option<usize> {
        let hash = content_hash(value);
        self.data
            .iter()
            .position(|image| image.hash == hash && image.value == value)
    }

    pub(crate) fn push(&mut self, image: ImageData) -> usize {
        self.data.push(image);
        self.data.len() - 1
    }
}

/// Custom font name to `data:font/...;base64,` URI.
pub type FontTable = BTreeMap<String, String>;

/// 32-bit rolling hash (`h = h * 31 + byte`, wrapping).
pub fn content_hash(value: &str) -> i32 {
    value
        .bytes()
        .fold(0i32, |hash, byte| hash.wrapping_mul(31).wrapping_add(i32::from(byte)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_known_values() {
        assert_eq!(content_hash(""), 0);
        assert_eq!(content_hash("a"), 97);
        assert_eq!(content_hash("ab"), 97 * 31 + 98);
        // Wraps instead of overflowing.
        let long = "z".repeat(4096);
        let _ = content_hash(&long);
    }

    #[test]
    fn test_find_uses_value_not_just_hash() {
        let mut table = ImageTable::new();
        let id = table.push(ImageData::new("data:image/png;base64,AAAA"));
        assert_eq!(table.find("data:image/png;base64,AAAA"), Some(id));
        assert_eq!(table.find("data:image/png;base64,AAAB"), None);

        // Same hash, different value: not a match.
        table.data[0].hash = content_hash("other");
        assert_eq!(table.find("other"), None);
    }

    #[test]
    fn test_contains_is_bounds_check() {
        let mut table = ImageTable::new();
        assert!(!table.contains(0));
        table.push(ImageData::new("data:image/gif;base64,R0lG"));
        assert!(table.contains(0));
        assert!(!table.contains(1));
    }
}
