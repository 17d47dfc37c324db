//! Catalog rows as returned by the repository.

use serde::{Deserialize, Deserializer, Serialize};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub catnum: Option<String>,
    pub brand_id: Option<i64>,
    pub vat_id: Option<i64>,
    /// Base price without VAT.
    pub price: f64,
    #[serde(deserialize_with = "flexible_bool")]
    pub hidden: bool,
}

/// Visibility of a product on one domain (storefront).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDomain {
    pub product_id: i64,
    pub domain_id: i64,
    #[serde(deserialize_with = "flexible_bool")]
    pub visible: bool,
}

/// One entry of a storefront product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListItem {
    pub id: i64,
    pub catnum: Option<String>,
    pub name: Option<String>,
    pub brand_id: Option<i64>,
    /// Price for the listing's pricing group, if calculated.
    pub price_with_vat: Option<f64>,
}

/// Accept `true`/`false` as well as the `1`/`0` SQLite stores booleans as.
fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}
