//! High-performance JSON operations using sonic-rs.

use crate::error::{Error, ParseError};
use crate::Result;
use serde::{Serialize, de::DeserializeOwned};

fn document_error(message: impl ToString) -> Error {
    Error::Parse(ParseError::Document {
        path: "<json>".to_string(),
        message: message.to_string(),
    })
}

/// Deserialize JSON string.
///
/// # Errors
/// Returns error if JSON is invalid.
pub fn from_json<T: DeserializeOwned>(s: &str) -> Result<T> {
    sonic_rs::from_str(s).map_err(document_error)
}

/// Deserialize JSON bytes.
///
/// # Errors
/// Returns error if JSON is invalid.
pub fn from_json_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    sonic_rs::from_slice(bytes).map_err(document_error)
}

/// Serialize to compact JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    sonic_rs::to_string(value).map_err(document_error)
}

/// Serialize to pretty JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    sonic_rs::to_string_pretty(value).map_err(document_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
    struct Test {
        name: String,
        value: i32,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
    struct PyProject {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        version: Option<String>,
        #[serde(default)]
        dependencies: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
    struct NestedStruct {
        id: u64,
        data: InnerData,
        tags: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
    struct InnerData {
        key: String,
        values: Vec<i32>,
    }

    #[test]
    fn roundtrip() {
        let orig = Test {
            name: "test".into(),
            value: 42,
        };
        let json = to_json(&orig).expect("serialization should succeed");
        let parsed: Test = from_json(&json).expect("deserialization should succeed");
        assert_eq!(orig, parsed);
    }

    #[test]
    fn pretty() {
        let val = Test {
            name: "x".into(),
            value: 1,
        };
        let pretty = to_json_pretty(&val).expect("pretty printing should succeed");
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn from_json_slice_parses_bytes() {
        let json = r#"{"name":"test","value":42}"#;
        let parsed: Test = from_json_slice(json.as_bytes()).expect("should parse from bytes");
        assert_eq!(parsed.name, "test");
        assert_eq!(parsed.value, 42);
    }

    #[test]
    fn pyproject_like_document_parses() {
        let json = r#"{
            "name": "requests",
            "description": "A test package",
            "version": "2.31.0",
            "dependencies": ["urllib3>=1.21.1", "certifi>=2017.4.17"]
        }"#;

        let parsed: PyProject = from_json(json).expect("should parse");
        assert_eq!(parsed.name, "requests");
        assert_eq!(parsed.dependencies.len(), 2);
    }

    #[test]
    fn nested_struct_roundtrips() {
        let data = NestedStruct {
            id: 123,
            data: InnerData {
                key: "test".to_string(),
                values: vec![1, 2, 3],
            },
            tags: vec!["a".to_string(), "b".to_string()],
        };

        let json = to_json(&data).expect("should serialize");
        let parsed: NestedStruct = from_json(&json).expect("should deserialize");
        assert_eq!(data, parsed);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let result: Result<Test> = from_json("{invalid json}");
        assert!(result.is_err());
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let result: Result<Test> = from_json(r#"{"name": 123, "value": "not a number"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_field_is_an_error() {
        let result: Result<Test> = from_json(r#"{"name": "test"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn unicode_roundtrips() {
        let data = Test {
            name: "测试 🎉 émojis".to_string(),
            value: 42,
        };
        let json = to_json(&data).expect("should serialize unicode");
        let parsed: Test = from_json(&json).expect("should deserialize unicode");
        assert_eq!(data, parsed);
    }

    proptest! {
        #[test]
        fn prop_roundtrip_string(s in "\\PC*") {
            let data = Test { name: s.clone(), value: 0 };
            let json = to_json(&data).expect("should serialize");
            let parsed: Test = from_json(&json).expect("should deserialize");
            prop_assert_eq!(data.name, parsed.name);
        }

        #[test]
        fn prop_roundtrip_integer(v in i32::MIN..i32::MAX) {
            let data = Test { name: "test".to_string(), value: v };
            let json = to_json(&data).expect("should serialize");
            let parsed: Test = from_json(&json).expect("should deserialize");
            prop_assert_eq!(v, parsed.value);
        }

        #[test]
        fn prop_hashmap_roundtrip(
            entries in prop::collection::hash_map("[a-z]{1,10}", "[a-z0-9]{1,20}", 0..10)
        ) {
            let data: HashMap<String, String> = entries.clone();
            let json = to_json(&data).expect("should serialize");
            let parsed: HashMap<String, String> = from_json(&json).expect("should deserialize");
            prop_assert_eq!(entries, parsed);
        }

        #[test]
        fn prop_serialization_deterministic(name in "[a-z]{1,20}", value in any::<i32>()) {
            let data = Test { name, value };
            let json1 = to_json(&data).expect("should serialize");
            let json2 = to_json(&data).expect("should serialize again");
            prop_assert_eq!(json1, json2);
        }
    }
}
