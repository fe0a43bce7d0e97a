use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;
use uuid::Variant;

static CANONICAL_UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("static uuid pattern")
});

/// Hyphenated 8-4-4-4-12 form only, version 1-5, RFC 4122 variant.
pub fn is_valid(s: &str) -> bool {
    CANONICAL_UUID.is_match(s)
}

/// The same rule as [`is_valid`] for an already parsed value.
pub fn is_canonical(uuid: &Uuid) -> bool {
    (1..=5).contains(&uuid.get_version_num()) && uuid.get_variant() == Variant::RFC4122
}

pub fn parse(s: &str) -> Option<Uuid> {
    if is_valid(s) {
        Uuid::parse_str(s).ok()
    } else {
        None
    }
}
