//! Catalog items ("shop items v2").

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use atelier_core::{MulticurrencyPrice, ShopItemId};

/// Text in every storefront language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translatable {
    pub en: String,
    pub ua: String,
}

/// Display color of an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub name: Translatable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
}

/// One measurement for one size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeGuideValue {
    pub size: String,
    pub value: String,
}

/// Measurement table row, e.g. chest width per size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeGuide {
    pub parameter: String,
    pub values: Vec<SizeGuideValue>,
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopItem {
    pub id: ShopItemId,
    #[serde(default)]
    pub photos: Vec<String>,
    pub price: MulticurrencyPrice,
    #[serde(default)]
    pub discount_price: MulticurrencyPrice,
    #[serde(default)]
    pub is_discount_active: bool,
    pub title: Translatable,
    #[serde(default)]
    pub description: Translatable,
    #[serde(default)]
    pub detailed_description: Translatable,
    #[serde(default)]
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_guides: Option<Vec<SizeGuide>>,
    /// Units in stock per size label (`"M"`, `"one size"`, `"36"`, ...).
    #[serde(default)]
    pub amount: BTreeMap<String, i64>,
    #[serde(default)]
    pub collection_name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub is_coming_soon: bool,
    #[serde(default)]
    pub is_sold_out: bool,
    #[serde(default)]
    pub is_hidden: bool,
    /// Grid position, lower first. Unpositioned items sort last.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

impl ShopItem {
    /// Recorded stock for a size, `None` when the size is not listed.
    #[must_use]
    pub fn stock(&self, size: &str) -> Option<i64> {
        self.amount.get(size).copied()
    }

    /// Catalog ordering: positioned items first by position, then by id.
    #[must_use]
    pub fn catalog_order(a: &Self, b: &Self) -> std::cmp::Ordering {
        match (a.position, b.position) {
            (Some(pa), Some(pb)) => pa.cmp(&pb).then_with(|| a.id.cmp(&b.id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        }
    }
}

/// Partial update of a [`ShopItem`].
///
/// Only the supplied top-level fields are replaced. Serializes without the
/// absent fields so it can be merged into a stored document as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<MulticurrencyPrice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<MulticurrencyPrice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_discount_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Translatable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Translatable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<Translatable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_guides: Option<Vec<SizeGuide>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<BTreeMap<String, i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_coming_soon: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_sold_out: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

impl ShopItemPatch {
    /// Patch that only replaces the stock map.
    #[must_use]
    pub fn amount(amount: BTreeMap<String, i64>) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }

    /// Apply the supplied fields to `item`.
    pub fn apply(self, item: &mut ShopItem) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = self.$field { item.$field = value; })*
            };
        }

        merge!(
            photos,
            price,
            discount_price,
            is_discount_active,
            title,
            description,
            detailed_description,
            color,
            amount,
            collection_name,
            categories,
            is_coming_soon,
            is_sold_out,
            is_hidden,
        );
        if self.size_guides.is_some() {
            item.size_guides = self.size_guides;
        }
        if self.position.is_some() {
            item.position = self.position;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn item(id: &str, position: Option<i32>) -> ShopItem {
        serde_json::from_value(json!({
            "id": id,
            "price": { "uah": 100, "eur": 3 },
            "title": { "en": id, "ua": id },
            "amount": { "M": 1 },
            "position": position,
        }))
        .unwrap()
    }

    #[test]
    fn test_minimal_document_fills_defaults() {
        let item = item("PROD-9", None);
        assert!(item.photos.is_empty());
        assert!(!item.is_hidden);
        assert_eq!(item.discount_price.uah, Decimal::ZERO);
        assert_eq!(item.stock("M"), Some(1));
        assert_eq!(item.stock("XL"), None);
    }

    #[test]
    fn test_catalog_order_positions_first() {
        let mut items = vec![
            item("PROD-B", None),
            item("PROD-A", None),
            item("PROD-C", Some(2)),
            item("PROD-D", Some(1)),
        ];
        items.sort_by(ShopItem::catalog_order);

        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["PROD-D", "PROD-C", "PROD-A", "PROD-B"]);
    }

    #[test]
    fn test_patch_replaces_only_supplied_fields() {
        let mut target = item("PROD-1", Some(4));
        let patch: ShopItemPatch =
            serde_json::from_value(json!({ "isHidden": true, "amount": { "S": 7 } })).unwrap();

        patch.apply(&mut target);

        assert!(target.is_hidden);
        assert_eq!(target.stock("S"), Some(7));
        assert_eq!(target.stock("M"), None);
        assert_eq!(target.position, Some(4));
        assert_eq!(target.title.en, "PROD-1");
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let mut amount = BTreeMap::new();
        amount.insert("L".to_string(), 2);
        let doc = serde_json::to_value(ShopItemPatch::amount(amount)).unwrap();
        assert_eq!(doc, json!({ "amount": { "L": 2 } }));
    }
}
