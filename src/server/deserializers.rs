use serde::{Deserialize, Deserializer};

// the browser client sends select values as strings, so "3" and 3 are both accepted
#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

pub fn deserialize_optional_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IntOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IntOrString::Int(value)) => Ok(Some(value)),
        Some(IntOrString::Str(value)) if value.trim().is_empty() => Ok(None),
        Some(IntOrString::Str(value)) => value.trim().parse::<i64>().map(Some).map_err(|_| {
            serde::de::Error::custom(format!("Wrong value {value}, can not parse to i64"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "deserialize_optional_int")]
        value: Option<i64>,
    }

    fn parse(json: &str) -> Result<Option<i64>, serde_json::Error> {
        serde_json::from_str::<Body>(json).map(|body| body.value)
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        assert_eq!(parse(r#"{"value": 4}"#).unwrap(), Some(4));
        assert_eq!(parse(r#"{"value": "4"}"#).unwrap(), Some(4));
        assert_eq!(parse(r#"{"value": " 12 "}"#).unwrap(), Some(12));
    }

    #[test]
    fn missing_null_and_blank_are_none() {
        assert_eq!(parse("{}").unwrap(), None);
        assert_eq!(parse(r#"{"value": null}"#).unwrap(), None);
        assert_eq!(parse(r#"{"value": ""}"#).unwrap(), None);
    }

    #[test]
    fn rejects_non_numeric_strings() {
        assert!(parse(r#"{"value": "Entertainment"}"#).is_err());
        assert!(parse(r#"{"value": 1.5}"#).is_err());
    }
}
