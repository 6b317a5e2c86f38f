//! Catalog lookup and admin-gated catalog mutation.

use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::catalog::{
        CatalogEntry, CatalogKind, Category, CreateCatalogEntryRequest, NewCatalogEntry,
        UpdateCatalogEntryRequest,
    },
    repositories::{Store, UnitOfWork},
    services::user_service,
};

fn ensure_category_matches(kind: CatalogKind, category: Category) -> Result<(), AppError> {
    if category.kind() != kind {
        return Err(AppError::InvalidRequest(format!(
            "Category {category:?} does not belong to {kind:?}"
        )));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::InvalidRequest("Name must not be empty".to_string()));
    }
    Ok(())
}

fn validate_price(price: i64) -> Result<(), AppError> {
    if price < 0 {
        return Err(AppError::InvalidRequest(
            "Price must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Entries of one kind. An absent category means "all entries of the kind".
pub async fn list_catalog(
    store: &dyn Store,
    kind: CatalogKind,
    category: Option<Category>,
) -> Result<Vec<CatalogEntry>, AppError> {
    if let Some(category) = category {
        ensure_category_matches(kind, category)?;
    }

    store.list_catalog(kind, category).await
}

/// A single entry. Entries of another kind are reported as missing.
pub async fn get_catalog_entry(
    store: &dyn Store,
    kind: CatalogKind,
    entry_id: Uuid,
) -> Result<CatalogEntry, AppError> {
    store
        .find_catalog_entry(entry_id)
        .await?
        .filter(|e| e.kind == kind)
        .ok_or(AppError::CatalogEntryNotFound)
}

/// Add an entry to the catalog. Admin only.
pub async fn create_catalog_entry(
    store: &dyn Store,
    auth: &AuthContext,
    kind: CatalogKind,
    request: CreateCatalogEntryRequest,
) -> Result<CatalogEntry, AppError> {
    let mut uow = store.begin().await?;
    user_service::ensure_admin(uow.as_mut(), auth).await?;

    validate_name(&request.name)?;
    validate_price(request.price)?;
    ensure_category_matches(kind, request.category)?;

    let entry = uow
        .insert_catalog_entry(NewCatalogEntry {
            kind,
            name: request.name,
            category: request.category,
            image_url: request.image_url,
            description: request.description,
            price: request.price,
        })
        .await?;
    uow.commit().await?;

    tracing::info!(catalog_entry_id = %entry.id, ?kind, admin = %auth.email, "catalog entry created");
    Ok(entry)
}

/// Edit name, image, description or price of an entry. Admin only.
///
/// Identifier, kind and category cannot change.
pub async fn update_catalog_entry(
    store: &dyn Store,
    auth: &AuthContext,
    kind: CatalogKind,
    entry_id: Uuid,
    patch: UpdateCatalogEntryRequest,
) -> Result<CatalogEntry, AppError> {
    let mut uow = store.begin().await?;
    user_service::ensure_admin(uow.as_mut(), auth).await?;

    if let Some(name) = &patch.name {
        validate_name(name)?;
    }
    if let Some(price) = patch.price {
        validate_price(price)?;
    }

    find_of_kind(uow.as_mut(), kind, entry_id).await?;

    let entry = uow
        .update_catalog_entry(entry_id, &patch)
        .await?
        .ok_or(AppError::CatalogEntryNotFound)?;
    uow.commit().await?;

    tracing::info!(catalog_entry_id = %entry.id, admin = %auth.email, "catalog entry updated");
    Ok(entry)
}

/// Remove an entry from the catalog. Admin only.
///
/// # Errors
///
/// - `CatalogEntryInUse`: Some user still owns an instance of the entry
pub async fn delete_catalog_entry(
    store: &dyn Store,
    auth: &AuthContext,
    kind: CatalogKind,
    entry_id: Uuid,
) -> Result<(), AppError> {
    let mut uow = store.begin().await?;
    user_service::ensure_admin(uow.as_mut(), auth).await?;

    find_of_kind(uow.as_mut(), kind, entry_id).await?;

    if !uow.delete_catalog_entry(entry_id).await? {
        return Err(AppError::CatalogEntryNotFound);
    }
    uow.commit().await?;

    tracing::info!(catalog_entry_id = %entry_id, admin = %auth.email, "catalog entry deleted");
    Ok(())
}

async fn find_of_kind(
    uow: &mut dyn UnitOfWork,
    kind: CatalogKind,
    entry_id: Uuid,
) -> Result<CatalogEntry, AppError> {
    uow.find_catalog_entry(entry_id)
        .await?
        .filter(|e| e.kind == kind)
        .ok_or(AppError::CatalogEntryNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::user::{Role, User},
        repositories::memory::MemoryStore,
        services::closet_service,
    };
    use std::collections::HashSet;

    fn context(user: &User) -> AuthContext {
        AuthContext {
            user_id: user.id,
            email: user.email.clone(),
        }
    }

    fn request(name: &str, category: Category, price: i64) -> CreateCatalogEntryRequest {
        CreateCatalogEntryRequest {
            name: name.to_string(),
            category,
            image_url: None,
            description: format!("{name} description"),
            price,
        }
    }

    async fn store_with_admin() -> (MemoryStore, AuthContext) {
        let store = MemoryStore::new();
        let admin = store.insert_user("admin@example.com", Role::Admin, 0, "admin").await;
        (store, context(&admin))
    }

    #[tokio::test]
    async fn listing_without_category_is_the_union_of_all_categories() {
        let (store, admin) = store_with_admin().await;
        for (name, category) in [
            ("Cap", Category::Hat),
            ("Shirt", Category::Top),
            ("Jeans", Category::Bottom),
            ("Boots", Category::Shoes),
            ("Ring", Category::Accessory),
            ("Shirt 2", Category::Top),
        ] {
            create_catalog_entry(&store, &admin, CatalogKind::Clothing, request(name, category, 100))
                .await
                .unwrap();
        }
        create_catalog_entry(
            &store,
            &admin,
            CatalogKind::ShopItem,
            request("Blue Wallpaper", Category::Wallpaper, 50),
        )
        .await
        .unwrap();

        let all: HashSet<Uuid> = list_catalog(&store, CatalogKind::Clothing, None)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();

        let mut union = HashSet::new();
        for category in CatalogKind::Clothing.categories() {
            let entries = list_catalog(&store, CatalogKind::Clothing, Some(*category))
                .await
                .unwrap();
            assert!(entries.iter().all(|e| e.category == *category));
            union.extend(entries.into_iter().map(|e| e.id));
        }

        assert_eq!(all.len(), 6);
        assert_eq!(all, union);
    }

    #[tokio::test]
    async fn category_of_another_kind_is_rejected() {
        let (store, _) = store_with_admin().await;

        let err = list_catalog(&store, CatalogKind::ShopItem, Some(Category::Top))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn get_reports_missing_and_wrong_kind_as_not_found() {
        let (store, admin) = store_with_admin().await;
        let wallpaper = create_catalog_entry(
            &store,
            &admin,
            CatalogKind::ShopItem,
            request("Wallpaper", Category::Wallpaper, 50),
        )
        .await
        .unwrap();

        let found = get_catalog_entry(&store, CatalogKind::ShopItem, wallpaper.id)
            .await
            .unwrap();
        assert_eq!(found, wallpaper);

        assert!(matches!(
            get_catalog_entry(&store, CatalogKind::Clothing, wallpaper.id).await,
            Err(AppError::CatalogEntryNotFound)
        ));
        assert!(matches!(
            get_catalog_entry(&store, CatalogKind::ShopItem, Uuid::new_v4()).await,
            Err(AppError::CatalogEntryNotFound)
        ));
    }

    #[tokio::test]
    async fn non_admin_mutations_are_unauthorized_and_change_nothing() {
        let (store, admin) = store_with_admin().await;
        let kim = store.insert_user("kim@example.com", Role::Ordinary, 0, "kim").await;
        let kim = context(&kim);
        let shirt = create_catalog_entry(
            &store,
            &admin,
            CatalogKind::Clothing,
            request("Shirt", Category::Top, 100),
        )
        .await
        .unwrap();
        let before = list_catalog(&store, CatalogKind::Clothing, None).await.unwrap();

        let created =
            create_catalog_entry(&store, &kim, CatalogKind::Clothing, request("Hat", Category::Hat, 1))
                .await;
        let updated = update_catalog_entry(
            &store,
            &kim,
            CatalogKind::Clothing,
            shirt.id,
            UpdateCatalogEntryRequest {
                price: Some(1),
                ..Default::default()
            },
        )
        .await;
        let deleted = delete_catalog_entry(&store, &kim, CatalogKind::Clothing, shirt.id).await;

        assert!(matches!(created, Err(AppError::Unauthorized)));
        assert!(matches!(updated, Err(AppError::Unauthorized)));
        assert!(matches!(deleted, Err(AppError::Unauthorized)));
        assert_eq!(
            list_catalog(&store, CatalogKind::Clothing, None).await.unwrap(),
            before
        );
    }

    #[tokio::test]
    async fn update_changes_only_editable_fields() {
        let (store, admin) = store_with_admin().await;
        let shirt = create_catalog_entry(
            &store,
            &admin,
            CatalogKind::Clothing,
            request("Shirt", Category::Top, 100),
        )
        .await
        .unwrap();

        let updated = update_catalog_entry(
            &store,
            &admin,
            CatalogKind::Clothing,
            shirt.id,
            UpdateCatalogEntryRequest {
                name: Some("Striped Shirt".to_string()),
                image_url: Some(Some("https://cdn.example.com/striped.png".to_string())),
                description: None,
                price: Some(150),
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.id, shirt.id);
        assert_eq!(updated.kind, CatalogKind::Clothing);
        assert_eq!(updated.category, Category::Top);
        assert_eq!(updated.name, "Striped Shirt");
        assert_eq!(updated.image_url.as_deref(), Some("https://cdn.example.com/striped.png"));
        assert_eq!(updated.description, shirt.description);
        assert_eq!(updated.price, 150);
    }

    #[tokio::test]
    async fn update_can_clear_the_image() {
        let (store, admin) = store_with_admin().await;
        let mut with_image = request("Shirt", Category::Top, 100);
        with_image.image_url = Some("https://cdn.example.com/shirt.png".to_string());
        let shirt = create_catalog_entry(&store, &admin, CatalogKind::Clothing, with_image)
            .await
            .unwrap();

        let kept = update_catalog_entry(
            &store,
            &admin,
            CatalogKind::Clothing,
            shirt.id,
            UpdateCatalogEntryRequest {
                price: Some(120),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(kept.image_url, shirt.image_url);

        let cleared = update_catalog_entry(
            &store,
            &admin,
            CatalogKind::Clothing,
            shirt.id,
            UpdateCatalogEntryRequest {
                image_url: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(cleared.image_url, None);
        assert_eq!(cleared.price, 120);
    }

    #[tokio::test]
    async fn admin_check_and_write_share_one_unit_of_work() {
        let (store, admin) = store_with_admin().await;

        let mut uow = store.begin().await.unwrap();
        user_service::ensure_admin(uow.as_mut(), &admin).await.unwrap();
        uow.insert_catalog_entry(NewCatalogEntry {
            kind: CatalogKind::Clothing,
            name: "Cap".to_string(),
            category: Category::Hat,
            image_url: None,
            description: String::new(),
            price: 10,
        })
        .await
        .unwrap();
        drop(uow);

        assert!(list_catalog(&store, CatalogKind::Clothing, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_fields_are_rejected() {
        let (store, admin) = store_with_admin().await;

        for bad in [
            request("  ", Category::Top, 100),
            request("Shirt", Category::Top, -1),
            request("Shirt", Category::Floor, 100),
        ] {
            let err = create_catalog_entry(&store, &admin, CatalogKind::Clothing, bad)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidRequest(_)));
        }
        assert!(list_catalog(&store, CatalogKind::Clothing, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owned_entries_cannot_be_deleted() {
        let (store, admin) = store_with_admin().await;
        let kim = store.insert_user("kim@example.com", Role::Ordinary, 1000, "kim").await;
        let shirt = create_catalog_entry(
            &store,
            &admin,
            CatalogKind::Clothing,
            request("Shirt", Category::Top, 100),
        )
        .await
        .unwrap();
        let owned = closet_service::purchase(&store, &context(&kim), shirt.id)
            .await
            .unwrap();

        let err = delete_catalog_entry(&store, &admin, CatalogKind::Clothing, shirt.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CatalogEntryInUse));

        closet_service::resell(&store, &context(&kim), owned.ownership_id)
            .await
            .unwrap();
        delete_catalog_entry(&store, &admin, CatalogKind::Clothing, shirt.id)
            .await
            .unwrap();
        assert!(matches!(
            get_catalog_entry(&store, CatalogKind::Clothing, shirt.id).await,
            Err(AppError::CatalogEntryNotFound)
        ));
    }
}
