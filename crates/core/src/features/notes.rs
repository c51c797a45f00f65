//! Free-text notes.

use crate::Error;
use crate::store::{KeyValueStore, LocalStore, keys};

pub struct Notes<'a, S: KeyValueStore> {
    store: &'a LocalStore<S>,
}

impl<'a, S: KeyValueStore> Notes<'a, S> {
    pub fn new(store: &'a LocalStore<S>) -> Self {
        Self { store }
    }

    /// Saved text, or an empty string.
    pub fn load(&self) -> String {
        self.store.get(keys::NOTES, String::new())
    }

    pub fn save(&self, text: &str) -> Result<(), Error> {
        self.store.set(keys::NOTES, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;

    #[test]
    fn test_notes_roundtrip() {
        let store = LocalStore::new(MemoryStorage::new());
        let notes = Notes::new(&store);
        assert_eq!(notes.load(), "");

        notes.save("exam on friday\n- bring calculator").unwrap();
        assert_eq!(notes.load(), "exam on friday\n- bring calculator");
    }

    #[test]
    fn test_non_string_record_resets() {
        let store = LocalStore::new(MemoryStorage::new());
        store.backend().set_item(keys::NOTES, "42").unwrap();
        assert_eq!(Notes::new(&store).load(), "");
    }
}
