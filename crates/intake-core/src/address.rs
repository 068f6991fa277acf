//! Memoized address components for client cards.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use intake_domain::{AddressComponents, Client};

use crate::error::CoreError;

/// Key-value store for cached address lookups. Values are JSON text.
pub trait AddressCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn put(&self, key: &str, value: &str) -> Result<(), CoreError>;
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

/// Process-local cache; contents last as long as the value.
#[derive(Debug, Default)]
pub struct MemoryAddressCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryAddressCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, CoreError> {
        self.entries
            .lock()
            .map_err(|_| CoreError::Storage("address cache lock poisoned".into()))
    }
}

impl AddressCache for MemoryAddressCache {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Parses free-text client addresses and keeps the split components in an
/// [`AddressCache`] under `client_<id>_address_components`.
#[derive(Clone)]
pub struct AddressBook {
    cache: Arc<dyn AddressCache>,
}

impl AddressBook {
    pub fn new(cache: Arc<dyn AddressCache>) -> Self {
        Self { cache }
    }

    pub fn lookup(&self, client_id: Uuid) -> Result<Option<AddressComponents>, CoreError> {
        let key = AddressComponents::cache_key(client_id);
        match self.cache.get(&key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Parses the client's address and caches the result. Unparseable
    /// addresses evict any previous entry.
    pub fn remember(&self, client: &Client) -> Result<Option<AddressComponents>, CoreError> {
        let key = AddressComponents::cache_key(client.id);
        match AddressComponents::parse(&client.address) {
            Some(components) => {
                self.cache.put(&key, &serde_json::to_string(&components)?)?;
                debug!("cached address components under {}", key);
                Ok(Some(components))
            }
            None => {
                self.cache.remove(&key)?;
                Ok(None)
            }
        }
    }

    pub fn forget(&self, client_id: Uuid) -> Result<(), CoreError> {
        self.cache.remove(&AddressComponents::cache_key(client_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_domain::ClientType;

    #[test]
    fn remembers_and_forgets_components() {
        let cache = Arc::new(MemoryAddressCache::new());
        let book = AddressBook::new(cache.clone());
        let mut client = Client::empty(ClientType::Seller);
        client.address = "9 Oak Ln, Media, PA 19063".into();

        let parsed = book.remember(&client).unwrap().unwrap();
        assert_eq!(parsed.city, "Media");
        assert_eq!(book.lookup(client.id).unwrap(), Some(parsed));

        let raw = cache
            .get(&AddressComponents::cache_key(client.id))
            .unwrap()
            .unwrap();
        assert!(raw.contains("\"zipCode\":\"19063\""));

        book.forget(client.id).unwrap();
        assert_eq!(book.lookup(client.id).unwrap(), None);
    }

    #[test]
    fn unparseable_address_evicts_stale_entry() {
        let book = AddressBook::new(Arc::new(MemoryAddressCache::new()));
        let mut client = Client::empty(ClientType::Buyer);
        client.address = "1 Elm St, Chester, PA 19013".into();
        book.remember(&client).unwrap();

        client.address = "somewhere".into();
        assert_eq!(book.remember(&client).unwrap(), None);
        assert_eq!(book.lookup(client.id).unwrap(), None);
    }
}
