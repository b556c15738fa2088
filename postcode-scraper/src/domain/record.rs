//! The flat record returned by the lookup service.

use serde::{Deserialize, Deserializer, Serialize};

/// One location registered under a postcode.
///
/// Field names match the lookup service's JSON, and cache entries are
/// written in the same encoding the service uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    #[serde(rename = "Postcode", deserialize_with = "nullable_string")]
    pub postcode: String,

    #[serde(rename = "Location", deserialize_with = "nullable_string")]
    pub location: String,

    /// Post office name, exported as the city.
    #[serde(rename = "Post_Office", deserialize_with = "nullable_string")]
    pub post_office: String,

    #[serde(rename = "State", deserialize_with = "nullable_string")]
    pub state: String,
}

impl Record {
    pub fn new(
        postcode: impl Into<String>,
        location: impl Into<String>,
        post_office: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self {
            postcode: postcode.into(),
            location: location.into(),
            post_office: post_office.into(),
            state: state.into(),
        }
    }

    /// Copy of this record with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            postcode: self.postcode.trim().to_string(),
            location: self.location.trim().to_string(),
            post_office: self.post_office.trim().to_string(),
            state: self.state.trim().to_string(),
        }
    }
}

/// The service sends `null` for blank fields.
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_service_payload() {
        let json = r#"[
            {"Postcode":"50450","Location":"Jalan Ampang ","Post_Office":"Kuala Lumpur","State":"Wilayah Persekutuan"},
            {"Postcode":"50450","Location":"Jalan Sultan Ismail","Post_Office":"Kuala Lumpur","State":"Wilayah Persekutuan"}
        ]"#;

        let records: Vec<Record> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].postcode, "50450");
        assert_eq!(records[0].location, "Jalan Ampang ");
        assert_eq!(records[0].post_office, "Kuala Lumpur");
        assert_eq!(records[1].state, "Wilayah Persekutuan");
    }

    #[test]
    fn decode_empty_list() {
        let records: Vec<Record> = serde_json::from_str("[]").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn null_and_missing_fields_become_empty() {
        let json = r#"{"Postcode":"01000","Location":null,"State":"Perlis"}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.location, "");
        assert_eq!(record.post_office, "");
        assert_eq!(record.state, "Perlis");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{"Postcode":"01000","Location":"Kangar","Post_Office":"Kangar","State":"Perlis","Extra":1}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record, Record::new("01000", "Kangar", "Kangar", "Perlis"));
    }

    #[test]
    fn encodes_with_service_field_names() {
        let record = Record::new("01000", "Kangar", "Kangar", "Perlis");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"Postcode":"01000","Location":"Kangar","Post_Office":"Kangar","State":"Perlis"}"#
        );
    }

    #[test]
    fn trimmed_strips_every_field() {
        let record = Record::new(" 01000", "\tKangar ", "Kangar\n", "  Perlis  ");
        assert_eq!(
            record.trimmed(),
            Record::new("01000", "Kangar", "Kangar", "Perlis")
        );
    }
}
