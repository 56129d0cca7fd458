//! JSON codec for response bodies and request payloads.
//!
//! # Design
//! Decoding parses the text into a `serde_json::Value` first, then drives the
//! target type's `Deserialize` impl through `FoldCase`, a deserializer that
//! renames each incoming object key to the declared field it matches
//! case-insensitively. Struct field lists are only known inside
//! `deserialize_struct`, which is why the renaming happens there and not in
//! a pre-pass. Absent fields fall back through `#[serde(default)]` on the
//! models; unknown fields are ignored.

use serde::de::value::StringDeserializer;
use serde::de::{self, DeserializeOwned, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Visitor};
use serde::{forward_to_deserialize_any, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Decode JSON text into `T`, matching object keys to `T`'s fields
/// case-insensitively.
pub fn decode<T: DeserializeOwned>(json: &str) -> Result<T> {
    let value: Value = serde_json::from_str(json).map_err(|e| Error::decode::<T>(e))?;
    T::deserialize(FoldCase(value)).map_err(|e| Error::decode::<T>(e))
}

/// Encode a payload as compact JSON. Fields holding `None` on partial-update
/// types are skipped by their `skip_serializing_if` attributes.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Pick the declared field name matching `key`, exact match first.
fn canonical_key(fields: &'static [&'static str], key: String) -> String {
    if fields.contains(&key.as_str()) {
        return key;
    }
    fields
        .iter()
        .find(|field| field.eq_ignore_ascii_case(&key))
        .map(|field| field.to_string())
        .unwrap_or(key)
}

struct FoldCase(Value);

impl<'de> Deserializer<'de> for FoldCase {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> std::result::Result<V::Value, Self::Error> {
        match self.0 {
            Value::Array(items) => visitor.visit_seq(FoldSeq(items.into_iter())),
            Value::Object(map) => visitor.visit_map(FoldMap {
                entries: map.into_iter(),
                fields: &[],
                value: None,
            }),
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> std::result::Result<V::Value, Self::Error> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(FoldCase(other)),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        match self.0 {
            Value::Object(map) => visitor.visit_map(FoldMap {
                entries: map.into_iter(),
                fields,
                value: None,
            }),
            other => other.deserialize_struct(name, fields, visitor),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        self.0.deserialize_enum(name, variants, visitor)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map identifier ignored_any
    }
}

struct FoldSeq(std::vec::IntoIter<Value>);

impl<'de> SeqAccess<'de> for FoldSeq {
    type Error = serde_json::Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> std::result::Result<Option<T::Value>, Self::Error> {
        self.0.next().map(|v| seed.deserialize(FoldCase(v))).transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.0.len())
    }
}

struct FoldMap {
    entries: serde_json::map::IntoIter,
    fields: &'static [&'static str],
    value: Option<Value>,
}

impl<'de> MapAccess<'de> for FoldMap {
    type Error = serde_json::Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> std::result::Result<Option<K::Value>, Self::Error> {
        // Struct fields set to null are treated as absent so defaults apply.
        let (key, value) = loop {
            match self.entries.next() {
                None => return Ok(None),
                Some((_, Value::Null)) if !self.fields.is_empty() => continue,
                Some(entry) => break entry,
            }
        };
        self.value = Some(value);
        let key: StringDeserializer<serde_json::Error> =
            canonical_key(self.fields, key).into_deserializer();
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        let value = self
            .value
            .take()
            .ok_or_else(|| de::Error::custom("map value requested before its key"))?;
        seed.deserialize(FoldCase(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Post, PostPatch, Todo, User};

    #[test]
    fn decodes_exact_case_fields() {
        let post: Post =
            decode(r#"{"userId":1,"id":7,"title":"Hello","body":"World"}"#).unwrap();
        assert_eq!(post.user_id, 1);
        assert_eq!(post.id, 7);
        assert_eq!(post.title, "Hello");
    }

    #[test]
    fn field_names_match_case_insensitively() {
        let post: Post =
            decode(r#"{"USERID":3,"Id":9,"TITLE":"Shout","Body":"Mixed"}"#).unwrap();
        assert_eq!(post.user_id, 3);
        assert_eq!(post.id, 9);
        assert_eq!(post.title, "Shout");
        assert_eq!(post.body, "Mixed");
    }

    #[test]
    fn nested_objects_fold_case_too() {
        let user: User = decode(
            r#"{"ID":1,"Name":"Leanne","ADDRESS":{"City":"Gwenborough","GEO":{"LAT":"-37.3"}},
                "company":{"CATCHPHRASE":"Multi-layered"}}"#,
        )
        .unwrap();
        let address = user.address.unwrap();
        assert_eq!(address.city, "Gwenborough");
        assert_eq!(address.geo.unwrap().lat, "-37.3");
        assert_eq!(user.company.unwrap().catch_phrase, "Multi-layered");
    }

    #[test]
    fn absent_fields_fall_back_to_defaults() {
        let todo: Todo = decode("{}").unwrap();
        assert_eq!(todo, Todo::default());
        assert_eq!(todo.title, "");
        assert!(!todo.completed);

        let user: User = decode(r#"{"id":2}"#).unwrap();
        assert!(user.address.is_none());
        assert!(user.company.is_none());
    }

    #[test]
    fn null_values_fall_back_to_defaults() {
        let post: Post = decode(r#"{"id":1,"userId":1,"title":null,"body":"b"}"#).unwrap();
        assert_eq!(post.id, 1);
        assert_eq!(post.title, "");
        assert_eq!(post.body, "b");

        let user: User = decode(r#"{"id":3,"Address":null,"company":{"name":"Acme"}}"#).unwrap();
        assert!(user.address.is_none());
        assert_eq!(user.company.unwrap().name, "Acme");

        let patch: PostPatch = decode(r#"{"title":null,"body":"only body"}"#).unwrap();
        assert!(patch.title.is_none());
        assert_eq!(patch.body.as_deref(), Some("only body"));
    }

    #[test]
    fn nulls_survive_in_raw_maps() {
        let raw: serde_json::Map<String, Value> = decode(r#"{"title":null}"#).unwrap();
        assert_eq!(raw.get("title"), Some(&Value::Null));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let post: Post = decode(r#"{"id":1,"extra":{"deep":[1,2,3]},"tags":["a"]}"#).unwrap();
        assert_eq!(post.id, 1);
    }

    #[test]
    fn decodes_lists_of_models() {
        let todos: Vec<Todo> = decode(
            r#"[{"userId":1,"id":1,"title":"a","completed":false},
                {"USERID":1,"ID":2,"TITLE":"b","COMPLETED":true}]"#,
        )
        .unwrap();
        assert_eq!(todos.len(), 2);
        assert!(todos[1].completed);
        assert_eq!(todos[1].id, 2);
    }

    #[test]
    fn decoding_is_deterministic() {
        let text = r#"{"userId":4,"id":40,"title":"same","body":"input"}"#;
        let first: Post = decode(text).unwrap();
        let second: Post = decode(text).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_text_is_a_decode_error() {
        for text in ["", "not json", "{\"id\":", "[1,2", "{'id':1}"] {
            let err = decode::<Post>(text).unwrap_err();
            assert!(matches!(err, Error::Decode { .. }), "{text:?} gave {err:?}");
        }
    }

    #[test]
    fn wrong_shape_is_a_decode_error() {
        let err = decode::<Post>(r#"{"id":"seven"}"#).unwrap_err();
        assert!(matches!(err, Error::Decode { ref target, .. } if target == "Post"));

        let err = decode::<Vec<Post>>(r#"{"id":1}"#).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn decodes_into_raw_values() {
        let value: Value = decode(r#"{"Title":"kept as-is"}"#).unwrap();
        assert_eq!(value["Title"], "kept as-is");
    }

    #[test]
    fn encode_omits_absent_patch_fields() {
        let patch = PostPatch::new().title("X");
        let json = encode(&patch).unwrap();
        assert_eq!(json, r#"{"title":"X"}"#);

        let empty = encode(&PostPatch::new()).unwrap();
        assert_eq!(empty, "{}");
    }

    #[test]
    fn encode_uses_camel_case_names() {
        let patch = PostPatch::new().user_id(5);
        let value: Value = serde_json::from_str(&encode(&patch).unwrap()).unwrap();
        assert_eq!(value["userId"], 5);
    }
}
