//! JSON read/write helpers.
//!
//! Output is pretty-printed with two-space indentation and object keys in
//! sorted order so written files diff cleanly.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, TaxonomyError};

/// Deepest taxonomy (in levels) rendered as JSON
///
/// A tree level nests three JSON values deep, and serde_json refuses to
/// read documents nested past 128.
pub const MAX_JSON_DEPTH: usize = 40;

pub(crate) fn json_error(e: serde_json::Error) -> TaxonomyError {
    TaxonomyError::JsonParseError {
        message: e.to_string(),
    }
}

pub(crate) fn ensure_json_depth(depth: usize) -> Result<()> {
    if depth > MAX_JSON_DEPTH {
        return Err(TaxonomyError::TooDeep {
            depth,
            limit: MAX_JSON_DEPTH,
        });
    }
    Ok(())
}

/// Read and parse a JSON file
pub fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(json_error)
}

/// Render `data` as pretty JSON with sorted keys
pub fn to_pretty_json<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    // Going through Value re-orders struct fields and maps by key
    let value = serde_json::to_value(data).map_err(json_error)?;
    serde_json::to_string_pretty(&value).map_err(json_error)
}

/// Write `data` to `path` as pretty JSON with sorted keys
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, to_pretty_json(data)?)?;
    Ok(())
}

/// `"<tag> <json>"`, for logging a labelled document
pub fn format_json<T: Serialize + ?Sized>(tag: &str, data: &T) -> Result<String> {
    Ok(format!("{} {}", tag, to_pretty_json(data)?))
}

/// Load taxonomy notation from a file
///
/// `.json` files are read as a document and the string field `key` is
/// returned; anything else is read as plain text.
pub fn read_taxonomy_text(path: &Path, key: &str) -> Result<String> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if !is_json {
        return Ok(fs::read_to_string(path)?);
    }

    let document = read_json(path)?;
    document
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TaxonomyError::JsonKeyNotFound {
            key: key.to_string(),
            path: path.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_read_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.json");
        fs::write(&path, r#"{"key": "value"}"#).unwrap();

        assert_eq!(read_json(&path).unwrap(), json!({"key": "value"}));
    }

    #[test]
    fn test_read_json_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let err = read_json(&path).unwrap_err();
        assert!(matches!(err, TaxonomyError::JsonParseError { .. }));
    }

    #[test]
    fn test_write_json_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("test.json");
        let data = json!({"key": "value"});

        write_json(&path, &data).unwrap();
        assert_eq!(read_json(&path).unwrap(), data);
    }

    #[test]
    fn test_keys_are_sorted() {
        #[derive(Serialize)]
        struct Sample {
            zebra: u8,
            apple: u8,
        }

        let text = to_pretty_json(&Sample { zebra: 1, apple: 2 }).unwrap();
        assert_eq!(text, "{\n  \"apple\": 2,\n  \"zebra\": 1\n}");
    }

    #[test]
    fn test_ensure_json_depth() {
        assert!(ensure_json_depth(MAX_JSON_DEPTH).is_ok());
        let err = ensure_json_depth(MAX_JSON_DEPTH + 1).unwrap_err();
        assert!(matches!(err, TaxonomyError::TooDeep { depth, .. } if depth == MAX_JSON_DEPTH + 1));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_format_json() {
        let text = format_json("Test Tag", &json!({"key": "value"})).unwrap();
        assert_eq!(text, "Test Tag {\n  \"key\": \"value\"\n}");
    }

    #[test]
    fn test_read_taxonomy_text_plain() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("animals.txt");
        fs::write(&path, "Animal{Bird}").unwrap();

        assert_eq!(read_taxonomy_text(&path, "taxonomy").unwrap(), "Animal{Bird}");
    }

    #[test]
    fn test_read_taxonomy_text_json_key() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("project.json");
        fs::write(&path, r#"{"name": "slr", "taxonomy": "Animal{Bird}"}"#).unwrap();

        assert_eq!(read_taxonomy_text(&path, "taxonomy").unwrap(), "Animal{Bird}");

        let err = read_taxonomy_text(&path, "missing").unwrap_err();
        assert!(matches!(err, TaxonomyError::JsonKeyNotFound { key, .. } if key == "missing"));
        assert_eq!(read_taxonomy_text(&path, "name").unwrap(), "slr");
    }
}
