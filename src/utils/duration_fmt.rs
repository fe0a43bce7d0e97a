use std::time::Duration;

use serde::Serializer;
use serde::Deserializer;
use serde::de::Error as DeError;
use serde::de::Unexpected;
use serde::de::Visitor;


pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer
{
    if value.subsec_millis() != 0 {
        return serializer.serialize_u64(value.as_millis() as u64);
    }
    let s = value.as_secs();
    let out = if s == 0 || s % 60 != 0 {
        format!("{}s", s)
    } else if s % 3600 != 0 {
        format!("{}m", s / 60)
    } else {
        format!("{}h", s / 3600)
    };
    serializer.serialize_str(out.as_str())
}


struct DurationVisitor;

impl<'de> Visitor<'de> for DurationVisitor {
    type Value = Duration;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("integer (ms) or string \"<integer>[h|m|s|ms]\"")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        Ok(Duration::from_millis(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        let v = u64::try_from(v).map_err(|_| DeError::invalid_value(Unexpected::Signed(v), &self))?;
        Ok(Duration::from_millis(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        let (value, unit) = match v.find(|c: char| !c.is_ascii_digit()) {
            Some(n) => v.split_at(n),
            None => (v, "ms"),
        };
        let n: u64 = value.parse().map_err(DeError::custom)?;
        let secs = |factor: u64| n.checked_mul(factor)
            .map(Duration::from_secs)
            .ok_or_else(|| DeError::invalid_value(Unexpected::Str(v), &self));
        match unit {
            "ms" => Ok(Duration::from_millis(n)),
            "s" => Ok(Duration::from_secs(n)),
            "m" => secs(60),
            "h" => secs(3600),
            _ => Err(DeError::invalid_value(Unexpected::Str(v), &self)),
        }
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>
{
    deserializer.deserialize_any(DurationVisitor)
}
