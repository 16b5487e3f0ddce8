//! JSON decoding with case-insensitive property names.
//!
//! Incoming object keys are folded to lowercase before binding, so response
//! types name their fields in lowercase for deserialization (multi-word fields
//! carry an explicit `rename(deserialize = "...")`).

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Decode a response body, matching property names without regard to case.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> serde_json::Result<T> {
  let value: Value = serde_json::from_slice(body)?;
  serde_json::from_value(fold_keys(value))
}

/// Recursively lowercase all object keys.
///
/// When two keys fold to the same name, the last one in document order wins.
fn fold_keys(value: Value) -> Value {
  match value {
    Value::Object(map) => Value::Object(
      map
        .into_iter()
        .map(|(key, value)| (key.to_lowercase(), fold_keys(value)))
        .collect::<Map<String, Value>>(),
    ),
    Value::Array(items) => Value::Array(items.into_iter().map(fold_keys).collect()),
    other => other,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;

  #[derive(Debug, Deserialize, PartialEq)]
  struct Envelope {
    #[serde(rename(deserialize = "catalogbrands"))]
    catalog_brands: Vec<Brand>,
  }

  #[derive(Debug, Deserialize, PartialEq)]
  struct Brand {
    id: i32,
    name: String,
  }

  #[test]
  fn test_camel_and_pascal_case_bind() {
    let camel: Envelope = decode(br#"{"catalogBrands":[{"id":1,"name":"Brand A"}]}"#).unwrap();
    let pascal: Envelope = decode(br#"{"CatalogBrands":[{"Id":1,"Name":"Brand A"}]}"#).unwrap();
    let upper: Envelope = decode(br#"{"CATALOGBRANDS":[{"ID":1,"NAME":"Brand A"}]}"#).unwrap();

    assert_eq!(camel, pascal);
    assert_eq!(camel, upper);
    assert_eq!(camel.catalog_brands[0].name, "Brand A");
  }

  #[test]
  fn test_values_are_not_folded() {
    let brand: Brand = decode(br#"{"id":2,"name":"MiXeD"}"#).unwrap();
    assert_eq!(brand.name, "MiXeD");
  }

  #[test]
  fn test_shape_mismatch_is_an_error() {
    assert!(decode::<Envelope>(br#"{"catalogBrands":"oops"}"#).is_err());
    assert!(decode::<Envelope>(b"not json").is_err());
  }
}
