//! Workflow tests against the PostgreSQL store.
//!
//! These need a server: set `DATABASE_URL` and run
//! `cargo test --test pg_store_tests -- --ignored`. Each test gets a fresh
//! database with the migrations applied.

use closet_shop_server::{
    error::AppError,
    middleware::auth::{AuthContext, hash_api_key},
    models::{
        catalog::{
            CatalogEntry, CatalogKind, Category, CreateCatalogEntryRequest,
            UpdateCatalogEntryRequest,
        },
        ledger::LedgerKind,
        user::{Role, User},
    },
    repositories::{Store, postgres::PgStore},
    services::{catalog_service, closet_service, ledger_service},
};
use sqlx::PgPool;

async fn insert_user(pool: &PgPool, email: &str, role: Role, balance: i64) -> AuthContext {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, role, balance, api_key_hash) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(email)
    .bind(role)
    .bind(balance)
    .bind(hash_api_key(email))
    .fetch_one(pool)
    .await
    .unwrap();

    AuthContext {
        user_id: user.id,
        email: user.email,
    }
}

async fn create(
    store: &PgStore,
    admin: &AuthContext,
    name: &str,
    category: Category,
    price: i64,
) -> CatalogEntry {
    catalog_service::create_catalog_entry(
        store,
        admin,
        category.kind(),
        CreateCatalogEntryRequest {
            name: name.to_string(),
            category,
            image_url: Some(format!("https://cdn.example.com/{name}.png")),
            description: format!("{name} description"),
            price,
        },
    )
    .await
    .unwrap()
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn purchase_then_resale_updates_balance_and_ledger(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let admin = insert_user(&pool, "admin@example.com", Role::Admin, 0).await;
    let kim = insert_user(&pool, "kim@example.com", Role::Ordinary, 1000).await;
    let jacket = create(&store, &admin, "jacket", Category::Top, 300).await;

    let owned = closet_service::purchase(&store, &kim, jacket.id).await.unwrap();
    let sale = closet_service::resell(&store, &kim, owned.ownership_id)
        .await
        .unwrap();
    assert_eq!(sale.amount, 120);
    assert_eq!(sale.balance, 820);

    let ledger = ledger_service::list_ledger(&store, &kim).await.unwrap();
    let lines: Vec<(LedgerKind, i64, i64)> =
        ledger.iter().map(|e| (e.kind, e.amount, e.balance)).collect();
    assert_eq!(
        lines,
        vec![(LedgerKind::Purchase, 300, 700), (LedgerKind::Sale, 120, 820)]
    );

    let user = store.find_user(kim.user_id).await.unwrap().unwrap();
    assert_eq!(user.balance, 820);
    assert!(store.list_owned(kim.user_id, None).await.unwrap().is_empty());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn unaffordable_purchase_writes_nothing(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let admin = insert_user(&pool, "admin@example.com", Role::Admin, 0).await;
    let kim = insert_user(&pool, "kim@example.com", Role::Ordinary, 100).await;
    let jacket = create(&store, &admin, "jacket", Category::Top, 300).await;

    let err = closet_service::purchase(&store, &kim, jacket.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientBalance));

    assert_eq!(store.find_user(kim.user_id).await.unwrap().unwrap().balance, 100);
    assert!(store.list_ledger(kim.user_id).await.unwrap().is_empty());
    assert!(store.list_owned(kim.user_id, None).await.unwrap().is_empty());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_purchases_serialize_on_the_user_row(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let admin = insert_user(&pool, "admin@example.com", Role::Admin, 0).await;
    let kim = insert_user(&pool, "kim@example.com", Role::Ordinary, 1000).await;
    let coat = create(&store, &admin, "coat", Category::Top, 600).await;

    let (first, second) = tokio::join!(
        closet_service::purchase(&store, &kim, coat.id),
        closet_service::purchase(&store, &kim, coat.id),
    );

    let succeeded = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1);
    assert!(
        matches!(first, Err(AppError::InsufficientBalance))
            || matches!(second, Err(AppError::InsufficientBalance))
    );
    assert_eq!(store.find_user(kim.user_id).await.unwrap().unwrap().balance, 400);
    assert_eq!(store.list_ledger(kim.user_id).await.unwrap().len(), 1);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn null_category_lists_the_whole_kind(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let admin = insert_user(&pool, "admin@example.com", Role::Admin, 0).await;
    create(&store, &admin, "cap", Category::Hat, 10).await;
    create(&store, &admin, "boots", Category::Shoes, 20).await;
    create(&store, &admin, "oak", Category::Floor, 30).await;

    let all = store.list_catalog(CatalogKind::Clothing, None).await.unwrap();
    assert_eq!(all.len(), 2);

    let hats = store
        .list_catalog(CatalogKind::Clothing, Some(Category::Hat))
        .await
        .unwrap();
    assert_eq!(hats.len(), 1);
    assert_eq!(hats[0].name, "cap");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn owned_entry_delete_maps_to_in_use(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let admin = insert_user(&pool, "admin@example.com", Role::Admin, 0).await;
    let kim = insert_user(&pool, "kim@example.com", Role::Ordinary, 1000).await;
    let jacket = create(&store, &admin, "jacket", Category::Top, 300).await;
    closet_service::purchase(&store, &kim, jacket.id).await.unwrap();

    let err = catalog_service::delete_catalog_entry(&store, &admin, CatalogKind::Clothing, jacket.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::CatalogEntryInUse));
    assert!(store.find_catalog_entry(jacket.id).await.unwrap().is_some());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn update_keeps_or_clears_the_image(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let admin = insert_user(&pool, "admin@example.com", Role::Admin, 0).await;
    let jacket = create(&store, &admin, "jacket", Category::Top, 300).await;

    let repriced = catalog_service::update_catalog_entry(
        &store,
        &admin,
        CatalogKind::Clothing,
        jacket.id,
        UpdateCatalogEntryRequest {
            price: Some(350),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(repriced.price, 350);
    assert_eq!(repriced.image_url, jacket.image_url);

    let cleared = catalog_service::update_catalog_entry(
        &store,
        &admin,
        CatalogKind::Clothing,
        jacket.id,
        UpdateCatalogEntryRequest {
            image_url: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cleared.image_url, None);
    assert_eq!(cleared.price, 350);
}
