//! Catalog data models and API request/response types.
//!
//! The catalog holds two kinds of purchasable goods:
//! - clothing worn by the user's avatar
//! - shop items (themes for the user's shop)
//!
//! Both kinds share one table and one set of workflows; the `kind` column
//! tells them apart and restricts which categories an entry may use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::value::StrDeserializer};
use uuid::Uuid;

/// Which catalog a purchasable entry belongs to.
///
/// Appears in URLs as `clothing` or `shop_item`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "catalog_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Clothing,
    ShopItem,
}

impl CatalogKind {
    /// All categories that entries of this kind may use.
    pub fn categories(self) -> &'static [Category] {
        match self {
            CatalogKind::Clothing => &[
                Category::Hat,
                Category::Top,
                Category::Bottom,
                Category::Shoes,
                Category::Accessory,
            ],
            CatalogKind::ShopItem => &[Category::Wallpaper, Category::Floor, Category::Furniture],
        }
    }
}

/// Category of a catalog entry.
///
/// Each category belongs to exactly one [`CatalogKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "catalog_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Hat,
    Top,
    Bottom,
    Shoes,
    Accessory,
    Wallpaper,
    Floor,
    Furniture,
}

impl Category {
    pub fn kind(self) -> CatalogKind {
        match self {
            Category::Hat
            | Category::Top
            | Category::Bottom
            | Category::Shoes
            | Category::Accessory => CatalogKind::Clothing,
            Category::Wallpaper | Category::Floor | Category::Furniture => CatalogKind::ShopItem,
        }
    }
}

/// Represents a catalog entry from the database.
///
/// # Database Table
///
/// Maps to the `catalog_entries` table. `id`, `kind` and `category` never
/// change after creation; `price` may be edited by an administrator, but
/// the price paid is captured in the buyer's ledger entry at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct CatalogEntry {
    /// Unique identifier for this entry
    pub id: Uuid,

    /// Clothing or shop item
    pub kind: CatalogKind,

    /// Display name
    pub name: String,

    /// Category within the kind
    pub category: Category,

    /// Image reference shown in the shop
    pub image_url: Option<String>,

    /// Descriptive text, also used as the ledger summary
    pub description: String,

    /// Price in simulated currency units (>= 0)
    pub price: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for inserting a new catalog entry.
#[derive(Debug, Clone)]
pub struct NewCatalogEntry {
    pub kind: CatalogKind,
    pub name: String,
    pub category: Category,
    pub image_url: Option<String>,
    pub description: String,
    pub price: i64,
}

/// Request body for creating a catalog entry.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Denim Jacket",
///   "category": "top",
///   "image_url": "https://cdn.example.com/denim.png",
///   "description": "A sturdy denim jacket",
///   "price": 300
/// }
/// ```
///
/// The kind comes from the URL (`/api/v1/catalog/{kind}`).
#[derive(Debug, Deserialize)]
pub struct CreateCatalogEntryRequest {
    pub name: String,
    pub category: Category,
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price: i64,
}

/// Request body for updating a catalog entry.
///
/// Only these four fields are editable. Absent fields keep their value.
/// `image_url` is nullable, so it has three states: absent (keep),
/// `null` (clear) and a string (replace).
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UpdateCatalogEntryRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
    pub description: Option<String>,
    pub price: Option<i64>,
}

/// Wraps any value that appears in the body, `null` included, in `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateCatalogEntryRequest {
    /// Apply the patch to an entry in place.
    pub fn apply_to(&self, entry: &mut CatalogEntry) {
        if let Some(name) = &self.name {
            entry.name = name.clone();
        }
        if let Some(image_url) = &self.image_url {
            entry.image_url = image_url.clone();
        }
        if let Some(description) = &self.description {
            entry.description = description.clone();
        }
        if let Some(price) = self.price {
            entry.price = price;
        }
    }
}

/// Query string for list endpoints: `?category=top`.
///
/// A missing or empty `category` means "every category".
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<Category>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Category::deserialize(StrDeserializer::<D::Error>::new(value)).map(Some),
    }
}

/// Response body for catalog endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntryResponse {
    pub id: Uuid,
    pub kind: CatalogKind,
    pub name: String,
    pub category: Category,
    pub image_url: Option<String>,
    pub description: String,
    pub price: i64,
}

impl From<CatalogEntry> for CatalogEntryResponse {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            id: entry.id,
            kind: entry.kind,
            name: entry.name,
            category: entry.category,
            image_url: entry.image_url,
            description: entry.description,
            price: entry.price,
        }
    }
}
