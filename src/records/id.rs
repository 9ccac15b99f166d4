use serde::{Deserialize, Deserializer};

// Row ids come back as text for uuid keys and as numbers for serial keys.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(deserialize_with = "deserialize_id")]
        id: String,
        #[serde(default, deserialize_with = "deserialize_optional_id")]
        project_id: Option<String>,
    }

    #[test]
    fn text_id_is_kept_as_is() {
        let row: Row = serde_json::from_value(json!({ "id": "a1b2" })).unwrap();
        assert_eq!(row.id, "a1b2");
    }

    #[test]
    fn numeric_id_becomes_text() {
        let row: Row = serde_json::from_value(json!({ "id": 42, "project_id": 7 })).unwrap();
        assert_eq!(row.id, "42");
        assert_eq!(row.project_id, Some("7".to_string()));
    }

    #[test]
    fn null_or_missing_optional_id_is_none() {
        let with_null: Row = serde_json::from_value(json!({ "id": 1, "project_id": null })).unwrap();
        let missing: Row = serde_json::from_value(json!({ "id": 1 })).unwrap();

        assert_eq!(with_null.project_id, None);
        assert_eq!(missing.project_id, None);
    }
}
