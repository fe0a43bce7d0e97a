//! Folds both on-disk statistics layouts into `category -> key -> value`.
//!
//! Since 1.13 the server nests values under namespaced categories:
//! `{"stats": {"minecraft:mined": {"minecraft:stone": 3}}}`. Older servers
//! wrote a flat object: `{"stat.mineBlock.minecraft.stone": 3}`.

use std::collections::BTreeMap;

use serde_json::Map;
use serde_json::Value;

pub type CanonicalStats = BTreeMap<String, BTreeMap<String, i64>>;

const NAMESPACE: &str = "minecraft:";
const LEGACY_NAMESPACE: &str = "minecraft.";
const CUSTOM: &str = "custom";
const ACHIEVEMENTS: &str = "achievements";

const LEGACY_CATEGORIES: &[(&str, &str)] = &[
    ("mineBlock", "mined"),
    ("craftItem", "crafted"),
    ("useItem", "used"),
    ("breakItem", "broken"),
    ("pickup", "picked_up"),
    ("drop", "dropped"),
    ("killEntity", "killed"),
    ("entityKilledBy", "killed_by"),
];


pub fn merge(source: &Value) -> CanonicalStats {
    match source.get("stats").and_then(Value::as_object) {
        Some(stats) => merge_modern(stats),
        None => source.as_object().map(merge_legacy).unwrap_or_default(),
    }
}

fn merge_modern(stats: &Map<String, Value>) -> CanonicalStats {
    let mut out = CanonicalStats::new();
    for (category, entries) in stats {
        let Some(entries) = entries.as_object() else {
            continue;
        };
        let bucket = out.entry(strip_namespace(category).to_string()).or_default();
        for (key, value) in entries {
            if let Some(v) = value.as_i64() {
                add(bucket.entry(strip_namespace(key).to_string()).or_insert(0), v);
            }
        }
    }
    out
}

fn merge_legacy(stats: &Map<String, Value>) -> CanonicalStats {
    let mut out = CanonicalStats::new();
    for (raw_key, value) in stats {
        let Some(v) = legacy_value(value) else {
            continue;
        };
        let Some((category, key)) = legacy_key(raw_key) else {
            tracing::trace!("skip unknown stat {:?}", raw_key);
            continue;
        };
        add(out.entry(category).or_default().entry(key).or_insert(0), v);
    }
    out
}

/// Keys from different spellings can collapse onto one; their sum clamps at the i64 range.
fn add(total: &mut i64, v: i64) {
    *total = total.saturating_add(v);
}

/// Achievements with criteria are stored as `{"value": n, "progress": [..]}`.
fn legacy_value(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.get("value").and_then(Value::as_i64))
}

fn legacy_key(raw: &str) -> Option<(String, String)> {
    if let Some(name) = raw.strip_prefix("achievement.") {
        return Some((ACHIEVEMENTS.to_string(), snake_case(name)));
    }
    let rest = raw.strip_prefix("stat.")?;
    match rest.split_once('.') {
        None => Some((CUSTOM.to_string(), snake_case(rest))),
        Some((category, item)) => {
            let category = LEGACY_CATEGORIES.iter()
                .find(|(legacy, _)| *legacy == category)
                .map(|(_, modern)| modern.to_string())
                .unwrap_or_else(|| snake_case(category));
            let item = item.strip_prefix(LEGACY_NAMESPACE).unwrap_or(item);
            Some((category, snake_case(item)))
        }
    }
}

fn strip_namespace(s: &str) -> &str {
    s.strip_prefix(NAMESPACE).unwrap_or(s)
}

fn snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
