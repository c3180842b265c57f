//! Lenient field deserializers for gateway replies.

use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// Key under which `quick_xml` exposes the text content of an element.
const XML_TEXT_KEY: &str = "$text";

/// Reads a scalar that may arrive typed (JSON) or as element text (XML).
///
/// Empty or whitespace-only text, an empty element, and `null` read as `None`.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    deserializer.deserialize_any(Lenient(PhantomData))
}

/// Like [`blank_as_none`], falling back to `T::default()`.
pub fn blank_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: Display,
{
    blank_as_none(deserializer).map(Option::unwrap_or_default)
}

/// Reads `null` as `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn parse_text<T, E>(text: &str) -> Result<Option<T>, E>
where
    T: FromStr,
    T::Err: Display,
    E: de::Error,
{
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse().map(Some).map_err(E::custom)
}

struct Lenient<T>(PhantomData<fn() -> T>);

impl<'de, T> Visitor<'de> for Lenient<T>
where
    T: FromStr,
    T::Err: Display,
{
    type Value = Option<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar value or its text")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        parse_text(v)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        parse_text(if v { "true" } else { "false" })
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        parse_text(&v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        parse_text(&v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        parse_text(&v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    // An XML element read as a map: its text sits under `$text`, an empty
    // element has no entries.
    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut value = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == XML_TEXT_KEY {
                value = parse_text(&map.next_value::<String>()?)?;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Numbers {
        #[serde(default, deserialize_with = "blank_as_none")]
        count: Option<u32>,
        #[serde(default, deserialize_with = "blank_as_none")]
        flag: Option<bool>,
        #[serde(default, deserialize_with = "blank_as_default")]
        code: i32,
    }

    #[test]
    fn test_blank_xml_text_reads_as_absent() {
        let numbers: Numbers =
            quick_xml::de::from_str("<N><count/><flag> </flag><code></code></N>").unwrap();
        assert_eq!(numbers.count, None);
        assert_eq!(numbers.flag, None);
        assert_eq!(numbers.code, 0);
    }

    #[test]
    fn test_xml_text_is_parsed() {
        let numbers: Numbers =
            quick_xml::de::from_str("<N><count>225</count><flag>true</flag><code>5</code></N>")
                .unwrap();
        assert_eq!(numbers.count, Some(225));
        assert_eq!(numbers.flag, Some(true));
        assert_eq!(numbers.code, 5);
    }

    #[test]
    fn test_json_accepts_typed_values_and_null() {
        let numbers: Numbers =
            serde_json::from_str(r#"{"count": 7, "flag": false, "code": null}"#).unwrap();
        assert_eq!(numbers.count, Some(7));
        assert_eq!(numbers.flag, Some(false));
        assert_eq!(numbers.code, 0);
    }

    #[test]
    fn test_unparseable_text_is_rejected() {
        let err = quick_xml::de::from_str::<Numbers>("<N><count>many</count></N>").unwrap_err();
        assert!(err.to_string().contains("invalid digit"));
    }
}
