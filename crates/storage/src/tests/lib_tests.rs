use super::*;

fn new_banner(title: &str, price: f64) -> NewBanner {
    NewBanner {
        title: title.to_string(),
        price,
        image_data: "data:image/png;base64,AAAA".to_string(),
    }
}

#[test]
fn create_prepends_with_fresh_id() {
    let mut store = BannerStore::with_demo_banners();
    let existing: Vec<BannerId> = store.list().iter().map(|b| b.id.clone()).collect();

    let created = store.create(new_banner("Taco Tuesday", 12.5));

    assert_eq!(store.len(), existing.len() + 1);
    assert_eq!(store.list()[0], created);
    assert!(!existing.contains(&created.id));
}

#[test]
fn consecutive_creates_get_distinct_ids() {
    let mut store = BannerStore::new();
    let first = store.create(new_banner("A", 1.0));
    let second = store.create(new_banner("A", 1.0));
    assert_ne!(first.id, second.id);
    assert_eq!(store.list()[0].id, second.id);
    assert_eq!(store.list()[1].id, first.id);
}

#[test]
fn update_changes_only_title_and_price_of_match() {
    let mut store = BannerStore::with_demo_banners();
    let before = store.list().to_vec();

    let updated = store
        .update(BannerUpdate {
            id: BannerId::from("2"),
            title: "Pizza Night".to_string(),
            price: 39.0,
        })
        .expect("update");

    assert_eq!(updated.title, "Pizza Night");
    assert_eq!(updated.price, 39.0);
    assert_eq!(updated.image_data, before[1].image_data);
    assert_eq!(store.list()[0], before[0]);
    assert_eq!(store.list()[1], updated);
    assert_eq!(store.list()[2], before[2]);
}

#[test]
fn update_of_missing_id_is_reported() {
    let mut store = BannerStore::with_demo_banners();
    let before = store.list().to_vec();
    let err = store
        .update(BannerUpdate {
            id: BannerId::from("missing"),
            title: "x".to_string(),
            price: 1.0,
        })
        .expect_err("should fail");
    assert_eq!(err, StoreError::NotFound(BannerId::from("missing")));
    assert_eq!(store.list(), before.as_slice());
}

#[test]
fn delete_removes_only_the_match() {
    let mut store = BannerStore::with_demo_banners();
    assert!(store.delete(&BannerId::from("2")));
    let ids: Vec<&str> = store.list().iter().map(|b| b.id.0.as_str()).collect();
    assert_eq!(ids, ["1", "3"]);
}

#[test]
fn delete_of_missing_id_is_a_noop() {
    let mut store = BannerStore::with_demo_banners();
    assert!(!store.delete(&BannerId::from("nope")));
    assert_eq!(store.len(), 3);
}

#[test]
fn update_then_delete_scenario() {
    let mut store = BannerStore::new();
    let b1 = store.create(new_banner("Gourmet Burger Special", 35.90));

    store
        .update(BannerUpdate {
            id: b1.id.clone(),
            title: b1.title.clone(),
            price: 40.00,
        })
        .expect("update");
    assert_eq!(
        store.list(),
        [Banner {
            price: 40.00,
            ..b1.clone()
        }]
        .as_slice()
    );

    assert!(store.delete(&b1.id));
    assert!(store.is_empty());
}

#[test]
fn demo_banners_are_seeded_in_order() {
    let store = BannerStore::with_demo_banners();
    let titles: Vec<&str> = store.list().iter().map(|b| b.title.as_str()).collect();
    assert_eq!(
        titles,
        ["Gourmet Burger Special", "Artisanal Pizza", "Fresh Sushi Platter"]
    );
    assert_eq!(store.list()[0].price, 35.90);
}

#[tokio::test]
async fn shared_handle_sees_writes_from_clones() {
    let storage = Storage::new(BannerStore::new());
    let writer = storage.clone();

    let created = writer.create_banner(new_banner("Ramen", 18.0)).await;

    assert_eq!(storage.list_banners().await, vec![created.clone()]);
    assert_eq!(storage.load_banner(&created.id).await, Some(created.clone()));
    assert!(storage.delete_banner(&created.id).await);
    assert!(storage.list_banners().await.is_empty());
}
