//! Menu item data model shared by both store backends and the HTTP surface.
//! Wire field names follow the public API shape (`sectionSlug`, `sortOrder`);
//! the remote backend maps them to storage-native snake_case columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{AppError, AppResult};

/// Closed set of UI languages. Order doubles as the fallback priority when a
/// requested translation is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Tr,
    En,
    Ru,
    De,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::Tr, Language::En, Language::Ru, Language::De];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Tr => "tr",
            Language::En => "en",
            Language::Ru => "ru",
            Language::De => "de",
        }
    }

    pub fn parse(value: &str) -> Option<Language> {
        match value {
            "tr" => Some(Language::Tr),
            "en" => Some(Language::En),
            "ru" => Some(Language::Ru),
            "de" => Some(Language::De),
            _ => None,
        }
    }
}

/// Partial localization map over the fixed language set. Entries are optional
/// per language; an all-empty record is treated as "no text at all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ru: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub de: Option<String>,
}

impl Localized {
    pub fn get(&self, lang: Language) -> Option<&str> {
        let v = match lang {
            Language::Tr => &self.tr,
            Language::En => &self.en,
            Language::Ru => &self.ru,
            Language::De => &self.de,
        };
        v.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Resolve a display string: the requested language when present, else the
    /// first present value in fixed priority order. Total over the language
    /// set; `None` only when every entry is absent or blank.
    pub fn resolve(&self, lang: Language) -> Option<&str> {
        self.get(lang)
            .or_else(|| Language::ALL.iter().find_map(|l| self.get(*l)))
    }

    pub fn is_blank(&self) -> bool {
        Language::ALL.iter().all(|l| self.get(*l).is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    #[serde(rename = "sectionSlug")]
    pub section_slug: String,
    #[serde(default)]
    pub name: Localized,
    #[serde(default)]
    pub description: Localized,
    pub price: String,
    #[serde(default)]
    pub image: String,
    #[serde(rename = "sortOrder", default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Create payload. `section_slug`, `name` and `price` are required;
/// `name` must carry at least one non-empty localized value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemDraft {
    #[serde(rename = "sectionSlug", default)]
    pub section_slug: String,
    #[serde(default)]
    pub name: Localized,
    #[serde(default)]
    pub description: Localized,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image: String,
    #[serde(rename = "sortOrder", default)]
    pub sort_order: Option<i64>,
}

impl MenuItemDraft {
    pub fn validate(&self) -> AppResult<()> {
        if self.section_slug.trim().is_empty() || self.price.trim().is_empty() || self.name.is_blank() {
            return Err(AppError::validation("Missing required fields."));
        }
        Ok(())
    }
}

/// Update payload. Every field optional; omitted fields keep their previous
/// value, so a partial update never silently drops data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemPatch {
    #[serde(rename = "sectionSlug", default)]
    pub section_slug: Option<String>,
    #[serde(default)]
    pub name: Option<Localized>,
    #[serde(default)]
    pub description: Option<Localized>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "sortOrder", default)]
    pub sort_order: Option<i64>,
}

impl MenuItem {
    /// Apply a partial update in place. `id` and `created_at` are immutable.
    pub fn apply(&mut self, patch: &MenuItemPatch) {
        if let Some(v) = &patch.section_slug { self.section_slug = v.clone(); }
        if let Some(v) = &patch.name { self.name = v.clone(); }
        if let Some(v) = &patch.description { self.description = v.clone(); }
        if let Some(v) = &patch.price { self.price = v.clone(); }
        if let Some(v) = &patch.image { self.image = v.clone(); }
        if let Some(v) = patch.sort_order { self.sort_order = Some(v); }
    }
}

/// Dual-key display ordering: explicitly ordered items first by `sort_order`
/// ascending, everything else (and ties) by `created_at` descending so the
/// newest untagged items surface first.
pub fn display_order(a: &MenuItem, b: &MenuItem) -> Ordering {
    match (a.sort_order, b.sort_order) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| b.created_at.cmp(&a.created_at)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.created_at.cmp(&a.created_at),
    }
}

/// Normalize a user-entered price to the display form `"<value> ₺"`.
/// Strings that already carry the currency sign pass through trimmed.
pub fn normalize_price(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.contains('₺') {
        trimmed.to_string()
    } else {
        format!("{} ₺", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(id: &str, sort_order: Option<i64>, created_secs: i64) -> MenuItem {
        MenuItem {
            id: id.into(),
            section_slug: "pizza".into(),
            name: Localized { en: Some("Margherita".into()), ..Default::default() },
            description: Localized::default(),
            price: "250 ₺".into(),
            image: String::new(),
            sort_order,
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        }
    }

    #[test]
    fn resolve_prefers_requested_language() {
        let l = Localized {
            tr: Some("Çorba".into()),
            en: Some("Soup".into()),
            ..Default::default()
        };
        assert_eq!(l.resolve(Language::En), Some("Soup"));
        assert_eq!(l.resolve(Language::Tr), Some("Çorba"));
    }

    #[test]
    fn resolve_falls_back_in_fixed_priority_order() {
        let l = Localized { ru: Some("Суп".into()), de: Some("Suppe".into()), ..Default::default() };
        // Neither en nor tr present: ru comes before de in the priority order.
        assert_eq!(l.resolve(Language::En), Some("Суп"));
        assert_eq!(Localized::default().resolve(Language::En), None);
    }

    #[test]
    fn blank_strings_do_not_count_as_translations() {
        let l = Localized { en: Some("  ".into()), tr: Some("Izgara".into()), ..Default::default() };
        assert_eq!(l.resolve(Language::En), Some("Izgara"));
    }

    #[test]
    fn display_order_pins_explicit_items_then_recency() {
        let a = item("a", Some(5), 100);
        let b = item("b", Some(1), 200);
        let c = item("c", None, 300);
        let d = item("d", None, 400);
        let mut items = vec![a, b, c, d];
        items.sort_by(display_order);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "d", "c"]);
    }

    #[test]
    fn apply_keeps_omitted_fields() {
        let mut it = item("a", Some(2), 100);
        let before = it.clone();
        it.apply(&MenuItemPatch { price: Some("300 ₺".into()), ..Default::default() });
        assert_eq!(it.price, "300 ₺");
        assert_eq!(it.section_slug, before.section_slug);
        assert_eq!(it.name, before.name);
        assert_eq!(it.sort_order, before.sort_order);
        assert_eq!(it.created_at, before.created_at);
    }

    #[test]
    fn draft_requires_slug_price_and_some_name() {
        let mut draft = MenuItemDraft {
            section_slug: "bowls".into(),
            price: "180".into(),
            name: Localized { tr: Some("Kase".into()), ..Default::default() },
            ..Default::default()
        };
        assert!(draft.validate().is_ok());
        draft.name = Localized::default();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn price_normalization_appends_currency_once() {
        assert_eq!(normalize_price("150"), "150 ₺");
        assert_eq!(normalize_price(" 150 ₺ "), "150 ₺");
    }
}
