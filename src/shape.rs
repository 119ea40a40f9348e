//! Normalization of response payloads into plain JSON-safe values.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;
use serde_json::{Map, Value, json};
use time::{Date, macros::format_description};

use crate::{client::ResponseData, schema::ValidatedBody};

/// Conversion into a JSON-safe value. Implementations are idempotent:
/// shaping an already shaped value returns it unchanged.
pub trait ToPlainData {
    fn to_plain_data(&self) -> Value;
}

impl ToPlainData for Value {
    fn to_plain_data(&self) -> Value {
        match self {
            Value::Array(items) => {
                Value::Array(items.iter().map(ToPlainData::to_plain_data).collect())
            }
            Value::Object(map) => map.to_plain_data(),
            scalar => scalar.clone(),
        }
    }
}

impl ToPlainData for Map<String, Value> {
    fn to_plain_data(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_plain_data()))
                .collect(),
        )
    }
}

/// UTF-8 bytes decode to text; anything else becomes a tagged base64 object.
impl ToPlainData for [u8] {
    fn to_plain_data(&self) -> Value {
        match std::str::from_utf8(self) {
            Ok(text) => Value::String(text.to_string()),
            Err(_) => json!({
                "type": "bytes",
                "encoding": "base64",
                "size": self.len(),
                "data": STANDARD.encode(self),
            }),
        }
    }
}

impl ToPlainData for Bytes {
    fn to_plain_data(&self) -> Value {
        self.as_ref().to_plain_data()
    }
}

impl ToPlainData for Date {
    fn to_plain_data(&self) -> Value {
        self.format(format_description!("[year]-[month]-[day]"))
            .map_or_else(|_| Value::String(self.to_string()), Value::String)
    }
}

impl ToPlainData for Path {
    fn to_plain_data(&self) -> Value {
        Value::String(self.display().to_string())
    }
}

impl ToPlainData for ResponseData {
    fn to_plain_data(&self) -> Value {
        match self {
            Self::Json(value) => value.to_plain_data(),
            Self::Bytes(bytes) => bytes.to_plain_data(),
        }
    }
}

impl ToPlainData for ValidatedBody {
    fn to_plain_data(&self) -> Value {
        self.projection().to_plain_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn shaping_is_idempotent() {
        let value = json!({
            "a": [1, "two", null, {"b": true}],
            "c": {"d": 1.5},
        });
        let once = value.to_plain_data();
        assert_eq!(once, value);
        assert_eq!(once.to_plain_data(), once);
    }

    #[test]
    fn binary_payloads_become_tagged_base64() {
        let shaped = Bytes::from_static(&[0xff, 0x00, 0x10]).to_plain_data();
        assert_eq!(
            shaped,
            json!({"type": "bytes", "encoding": "base64", "size": 3, "data": "/wAQ"})
        );
        assert_eq!(shaped.to_plain_data(), shaped);
    }

    #[test]
    fn utf8_bytes_decode_to_text() {
        assert_eq!(b"hello".as_slice().to_plain_data(), json!("hello"));
    }

    #[test]
    fn dates_render_iso() {
        assert_eq!(date!(2024 - 03 - 09).to_plain_data(), json!("2024-03-09"));
    }

    #[test]
    fn response_data_and_paths() {
        let data = ResponseData::Json(json!({"ok": true}));
        assert_eq!(data.to_plain_data(), json!({"ok": true}));

        let data = ResponseData::Bytes(Bytes::from_static(b"plain"));
        assert_eq!(data.to_plain_data(), json!("plain"));

        assert_eq!(
            Path::new("/tmp/smartlead/config.toml").to_plain_data(),
            json!("/tmp/smartlead/config.toml")
        );
    }
}
