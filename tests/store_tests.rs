//! Local fallback store semantics: round-trips, field-wise partial updates,
//! idempotent-failure deletes, the dual-key display ordering and write
//! serialization under concurrent creators.

use std::time::Duration;

use tempfile::tempdir;

use freshstart::error::AppError;
use freshstart::menu::{Localized, MenuItemDraft, MenuItemPatch};
use freshstart::store::LocalStore;

fn draft(section: &str, name_en: &str, price: &str, sort_order: Option<i64>) -> MenuItemDraft {
    MenuItemDraft {
        section_slug: section.into(),
        name: Localized { en: Some(name_en.into()), ..Default::default() },
        price: price.into(),
        sort_order,
        ..Default::default()
    }
}

#[test]
fn create_then_list_roundtrip() {
    let tmp = tempdir().unwrap();
    let store = LocalStore::new(tmp.path());

    let created = store.create(draft("pizza", "Margherita", "250 ₺", None)).unwrap();
    assert!(!created.id.is_empty());

    let items = store.list().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0], created);
    assert_eq!(items[0].section_slug, "pizza");
    assert_eq!(items[0].price, "250 ₺");
}

#[test]
fn create_rejects_incomplete_drafts() {
    let tmp = tempdir().unwrap();
    let store = LocalStore::new(tmp.path());

    let missing_price = draft("pizza", "Margherita", " ", None);
    assert!(matches!(store.create(missing_price), Err(AppError::Validation(_))));

    let missing_name = MenuItemDraft {
        section_slug: "pizza".into(),
        price: "250 ₺".into(),
        ..Default::default()
    };
    assert!(matches!(store.create(missing_name), Err(AppError::Validation(_))));
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn partial_update_is_fieldwise_monotone() {
    let tmp = tempdir().unwrap();
    let store = LocalStore::new(tmp.path());

    let created = store
        .create(MenuItemDraft {
            section_slug: "corbalar".into(),
            name: Localized { tr: Some("Mercimek".into()), en: Some("Lentil soup".into()), ..Default::default() },
            description: Localized { en: Some("Classic".into()), ..Default::default() },
            price: "90 ₺".into(),
            image: "https://example.com/soup.jpg".into(),
            sort_order: Some(3),
        })
        .unwrap();

    let patch = MenuItemPatch { price: Some("110 ₺".into()), ..Default::default() };
    let updated = store.update(&created.id, &patch).unwrap();

    assert_eq!(updated.price, "110 ₺");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.image, created.image);
    assert_eq!(updated.sort_order, created.sort_order);

    let items = store.list().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0], updated);
}

#[test]
fn update_missing_id_is_not_found() {
    let tmp = tempdir().unwrap();
    let store = LocalStore::new(tmp.path());
    let patch = MenuItemPatch { price: Some("10 ₺".into()), ..Default::default() };
    assert!(matches!(store.update("nope", &patch), Err(AppError::NotFound(_))));
}

#[test]
fn delete_removes_and_fails_idempotently() {
    let tmp = tempdir().unwrap();
    let store = LocalStore::new(tmp.path());

    let keep = store.create(draft("izgara", "Adana", "320 ₺", None)).unwrap();
    let gone = store.create(draft("izgara", "Urfa", "320 ₺", None)).unwrap();

    store.delete(&gone.id).unwrap();
    let items = store.list().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, keep.id);

    // Deleting again fails typed and leaves the store unchanged.
    assert!(matches!(store.delete(&gone.id), Err(AppError::NotFound(_))));
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn clear_empties_the_store() {
    let tmp = tempdir().unwrap();
    let store = LocalStore::new(tmp.path());
    store.create(draft("bowls", "Poke", "240 ₺", Some(1))).unwrap();
    store.create(draft("bowls", "Buddha", "220 ₺", None)).unwrap();
    store.clear().unwrap();
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn listing_orders_explicit_items_first_then_recency() {
    let tmp = tempdir().unwrap();
    let store = LocalStore::new(tmp.path());

    let a = store.create(draft("menu", "A", "1 ₺", Some(5))).unwrap();
    let b = store.create(draft("menu", "B", "1 ₺", Some(1))).unwrap();
    let c = store.create(draft("menu", "C", "1 ₺", None)).unwrap();
    std::thread::sleep(Duration::from_millis(5));
    let d = store.create(draft("menu", "D", "1 ₺", None)).unwrap();

    let ids: Vec<String> = store.list().unwrap().into_iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![b.id, a.id, d.id, c.id]);
}

#[test]
fn store_survives_missing_data_dir() {
    let tmp = tempdir().unwrap();
    let store = LocalStore::new(tmp.path().join("nested").join("deeper"));
    assert!(store.list().unwrap().is_empty());
    store.create(draft("pizza", "Funghi", "260 ₺", None)).unwrap();
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn concurrent_creates_keep_every_committed_write() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().to_path_buf();
    const WRITERS: usize = 8;

    std::thread::scope(|scope| {
        for n in 0..WRITERS {
            let dir = dir.clone();
            scope.spawn(move || {
                let store = LocalStore::new(dir);
                store
                    .create(draft("menu", &format!("Item {n}"), "1 ₺", None))
                    .unwrap();
            });
        }
    });

    let store = LocalStore::new(dir);
    let items = store.list().unwrap();
    assert_eq!(items.len(), WRITERS);
    let mut ids: Vec<String> = items.into_iter().map(|i| i.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), WRITERS);
}
