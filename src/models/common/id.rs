//! 记录 ID 反序列化
//!
//! 托管数据库的主键可能是 uuid 字符串，也可能是 bigint，统一转换为字符串。

use serde::Deserializer;
use serde::de::{Error, Visitor};
use std::fmt;

pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer record id")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "super::deserialize_id")]
        id: String,
    }

    #[test]
    fn test_numeric_and_string_ids() {
        let row: Row = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(row.id, "42");
        let row: Row =
            serde_json::from_str(r#"{"id": "5f1c8a8e-9b8e-4f8e-9a3e-1d2c3b4a5f6e"}"#).unwrap();
        assert_eq!(row.id.len(), 36);
    }
}
