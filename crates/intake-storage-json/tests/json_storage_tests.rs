use std::{fs, sync::Arc};

use intake_core::{AddressBook, AddressCache, CoreError};
use intake_domain::{AddressComponents, AgentRole, Client, ClientType, TransactionFormData};
use intake_storage_json::{load_draft, save_draft, JsonAddressCache};
use tempfile::tempdir;
use uuid::Uuid;

#[test]
fn cache_persists_across_instances() {
    let dir = tempdir().expect("tempdir");
    let key = AddressComponents::cache_key(Uuid::new_v4());

    let cache = JsonAddressCache::in_dir(dir.path()).expect("create cache");
    cache.put(&key, r#"{"city":"Media"}"#).expect("put");
    assert!(cache.path().exists());

    let reopened = JsonAddressCache::in_dir(dir.path()).expect("reopen cache");
    assert_eq!(
        reopened.get(&key).expect("get").as_deref(),
        Some(r#"{"city":"Media"}"#)
    );

    reopened.remove(&key).expect("remove");
    assert_eq!(cache.get(&key).expect("get"), None);
}

#[test]
fn address_book_writes_components_json() {
    let dir = tempdir().expect("tempdir");
    let cache = Arc::new(JsonAddressCache::in_dir(dir.path()).expect("create cache"));
    let book = AddressBook::new(cache.clone());

    let mut client = Client::empty(ClientType::Buyer);
    client.address = "45 Pine St, Philadelphia, PA 19106".into();
    book.remember(&client).expect("remember");

    let raw = fs::read_to_string(cache.path()).expect("read cache file");
    assert!(raw.contains(&format!("client_{}_address_components", client.id)));

    let components = book.lookup(client.id).expect("lookup").expect("cached");
    assert_eq!(components.street_address, "45 Pine St");
    assert_eq!(components.zip_code, "19106");
}

#[test]
fn corrupt_cache_file_is_reported() {
    let dir = tempdir().expect("tempdir");
    let cache = JsonAddressCache::in_dir(dir.path()).expect("create cache");
    fs::write(cache.path(), "[1, 2").expect("write garbage");

    assert!(matches!(cache.get("any"), Err(CoreError::Serde(_))));
}

#[test]
fn drafts_round_trip() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("drafts").join("intake.json");

    let mut draft = TransactionFormData::new();
    draft.selected_role = Some(AgentRole::ListingAgent);
    draft.property.mls_number = "PM-42".into();
    save_draft(&path, &draft).expect("save draft");

    let raw = fs::read_to_string(&path).expect("read draft");
    assert!(raw.contains("\"selectedRole\": \"listingAgent\""));
    assert_eq!(load_draft(&path).expect("load draft"), draft);
}

#[test]
fn missing_draft_is_an_io_error() {
    let dir = tempdir().expect("tempdir");
    assert!(matches!(
        load_draft(&dir.path().join("absent.json")),
        Err(CoreError::Io(_))
    ));
}
