// Node fields shared by `add` and `update`.
//
// Flags are folded into one JSON object so the store's own input parsing
// decides what is a title, an index or metadata.

use clap::Args;
use serde_json::{Map, Value};

use crate::exit_code::UsageError;

#[derive(Debug, Clone, Default, Args)]
pub struct NodeFields {
    /// Node title.
    #[arg(long)]
    pub title: Option<String>,

    /// Global chapter index (chapters only).
    #[arg(long)]
    pub index: Option<u32>,

    /// Metadata entry. Repeatable; values are parsed as JSON when they can be.
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
    pub meta: Vec<(String, Value)>,

    /// Raw JSON object. Explicit flags override its fields.
    #[arg(long, value_name = "JSON")]
    pub data: Option<String>,
}

impl NodeFields {
    pub fn to_object(&self) -> anyhow::Result<Map<String, Value>> {
        let mut fields = match &self.data {
            None => Map::new(),
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => map,
                Ok(_) => return Err(UsageError("--data must be a JSON object".into()).into()),
                Err(e) => {
                    return Err(UsageError(format!("--data is not valid JSON: {e}")).into());
                }
            },
        };

        if let Some(title) = &self.title {
            fields.insert("title".into(), Value::String(title.clone()));
        }
        if let Some(index) = self.index {
            fields.insert("index".into(), index.into());
        }
        if !self.meta.is_empty() {
            let metadata = fields.entry("metadata").or_insert_with(|| Value::Object(Map::new()));
            let Value::Object(metadata) = metadata else {
                return Err(UsageError("`metadata` in --data must be an object".into()).into());
            };
            for (key, value) in &self.meta {
                metadata.insert(key.clone(), value.clone());
            }
        }
        Ok(fields)
    }
}

fn parse_meta(raw: &str) -> Result<(String, Value), String> {
    let (key, value) =
        raw.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("metadata key is empty".into());
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn meta_values_parse_as_json_or_fall_back_to_text() {
        assert_eq!(parse_meta("words=3000").unwrap(), ("words".into(), json!(3000)));
        assert_eq!(parse_meta("pov=Mara").unwrap(), ("pov".into(), json!("Mara")));
        assert_eq!(parse_meta("draft=true").unwrap(), ("draft".into(), json!(true)));
        assert_eq!(parse_meta("note=a=b").unwrap(), ("note".into(), json!("a=b")));
        assert!(parse_meta("no-equals").is_err());
        assert!(parse_meta("=x").is_err());
    }

    #[test]
    fn flags_override_data() {
        let fields = NodeFields {
            title: Some("From flag".into()),
            index: Some(9),
            meta: vec![("pov".into(), json!("Ash"))],
            data: Some(r#"{"title":"From data","metadata":{"tone":"dark"},"status":"draft"}"#.into()),
        };
        let object = Value::Object(fields.to_object().unwrap());
        assert_eq!(
            object,
            json!({
                "title": "From flag",
                "index": 9,
                "metadata": { "tone": "dark", "pov": "Ash" },
                "status": "draft"
            })
        );
    }

    #[test]
    fn data_must_be_an_object() {
        let fields = NodeFields { data: Some("[1]".into()), ..NodeFields::default() };
        let err = fields.to_object().unwrap_err();
        assert!(err.downcast_ref::<UsageError>().is_some());

        let fields = NodeFields { data: Some("{oops".into()), ..NodeFields::default() };
        assert!(fields.to_object().unwrap_err().to_string().contains("not valid JSON"));
    }
}
