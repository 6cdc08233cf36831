//! YAML document loading and placeholder substitution.

use serde::Deserialize;
use serde_json::{Map, Value as Json};

/// Keys of the single-entry objects Backstage treats as file references.
const PLACEHOLDER_KEYS: [&str; 3] = ["$text", "$json", "$yaml"];

/// Parse every YAML document in `content` into JSON values.
///
/// Null documents (empty sections between `---` separators) are skipped.
pub fn parse_documents(content: &str) -> Result<Vec<Json>, serde_yaml::Error> {
    let mut docs = Vec::new();
    for de in serde_yaml::Deserializer::from_str(content) {
        let value = Json::deserialize(de)?;
        if !value.is_null() {
            docs.push(value);
        }
    }
    Ok(docs)
}

/// Replace `{ $text: ref }`-style placeholders by their reference string.
///
/// Referenced files are not read; the string stands in so shape checks such
/// as `spec.definition = "string"` accept placeholder-backed fields.
pub fn substitute_placeholders(value: Json) -> Json {
    match value {
        Json::Object(obj) => {
            if obj.len() == 1 {
                if let Some((k, Json::String(target))) = obj.iter().next() {
                    if PLACEHOLDER_KEYS.contains(&k.as_str()) {
                        return Json::String(target.clone());
                    }
                }
            }
            Json::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, substitute_placeholders(v)))
                    .collect::<Map<String, Json>>(),
            )
        }
        Json::Array(items) => Json::Array(items.into_iter().map(substitute_placeholders).collect()),
        other => other,
    }
}
