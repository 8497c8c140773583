//! Wire shape of the WordPress.org plugin-information payload.
//!
//! Every field is optional and kept as raw JSON until the record builder
//! coerces it. Upstream is inconsistent: numbers arrive as strings, and
//! `banners`, `tags`, and `screenshots` are objects when populated but empty
//! arrays when not.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce::{coerce_string, try_i64};

/// Plugin metadata as returned by `plugins/info/1.2`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginMetadata {
    pub slug: Option<Value>,
    pub name: Option<Value>,
    pub version: Option<Value>,
    pub tested: Option<Value>,
    pub requires: Option<Value>,
    pub rating: Option<Value>,
    pub num_ratings: Option<Value>,
    pub ratings: Option<Value>,
    pub support_threads: Option<Value>,
    pub support_threads_resolved: Option<Value>,
    pub active_installs: Option<Value>,
    pub last_updated: Option<Value>,
    pub banners: Option<Value>,
    pub tags: Option<Value>,
    pub screenshots: Option<Value>,
}

// ---------------------------------------------------------------------------
// Display types
// ---------------------------------------------------------------------------

/// Banner image URLs; either may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banners {
    pub low: Option<String>,
    pub high: Option<String>,
}

/// A plugin tag: its slug and display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub slug: String,
    pub name: String,
}

/// A screenshot with an optional caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    pub src: String,
    pub caption: Option<String>,
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl PluginMetadata {
    /// The plugin slug, if present and non-blank.
    pub fn slug(&self) -> Option<String> {
        coerce_string(self.slug.as_ref())
    }

    /// Banner URLs. Upstream sends `false` for a missing size.
    pub fn banners(&self) -> Banners {
        let Some(obj) = self.banners.as_ref().and_then(Value::as_object) else {
            return Banners::default();
        };
        Banners {
            low: coerce_string(obj.get("low")),
            high: coerce_string(obj.get("high")),
        }
    }

    /// Tags from the `{ slug: name }` object, ordered by slug.
    pub fn tags(&self) -> Vec<Tag> {
        let Some(obj) = self.tags.as_ref().and_then(Value::as_object) else {
            return Vec::new();
        };
        obj.iter()
            .map(|(slug, name)| Tag {
                slug: slug.clone(),
                name: coerce_string(Some(name)).unwrap_or_else(|| slug.clone()),
            })
            .collect()
    }

    /// Screenshots ordered by their numeric position key.
    pub fn screenshots(&self) -> Vec<Screenshot> {
        let Some(obj) = self.screenshots.as_ref().and_then(Value::as_object) else {
            return Vec::new();
        };

        let mut ordered: Vec<(i64, Screenshot)> = obj
            .iter()
            .filter_map(|(key, entry)| {
                let src = coerce_string(entry.get("src"))?;
                let position = key.trim().parse::<i64>().unwrap_or(i64::MAX);
                Some((
                    position,
                    Screenshot {
                        src,
                        caption: coerce_string(entry.get("caption")),
                    },
                ))
            })
            .collect();
        ordered.sort_by_key(|(position, _)| *position);
        ordered.into_iter().map(|(_, shot)| shot).collect()
    }

    /// Star-rating breakdown (`1..=5` -> count). Unknown keys are ignored.
    pub fn ratings(&self) -> BTreeMap<u8, i64> {
        let Some(obj) = self.ratings.as_ref().and_then(Value::as_object) else {
            return BTreeMap::new();
        };
        obj.iter()
            .filter_map(|(stars, count)| {
                let stars = stars.trim().parse::<u8>().ok().filter(|s| (1..=5).contains(s))?;
                Some((stars, try_i64(count).unwrap_or(0)))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
