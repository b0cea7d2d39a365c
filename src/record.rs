//! Scorecard records as produced by a record source.
//!
//! Field names follow the normalized spreadsheet headers (`Grupo`,
//! `Pontuação_Atingida`, ...). Decoding never fails on a field value: text
//! fields accept strings or numbers, score fields accept numbers or numeric
//! strings, and anything else falls back to the field's default.

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// One scored observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Grupo", default, deserialize_with = "lenient_text")]
    pub group: Option<String>,
    #[serde(rename = "Indicador", default, deserialize_with = "lenient_text")]
    pub indicator: Option<String>,
    #[serde(rename = "Sub_Grupo", default, deserialize_with = "lenient_text")]
    pub sub_group: Option<String>,
    #[serde(rename = "Departamento", default, deserialize_with = "lenient_text")]
    pub department: Option<String>,
    #[serde(rename = "Sub_Categoria", default, deserialize_with = "lenient_text")]
    pub sub_category: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(rename = "Pontuação_Atingida", default, deserialize_with = "lenient_score")]
    pub achieved: f64,
    #[serde(rename = "Pontuação_Máxima", default, deserialize_with = "lenient_score")]
    pub maximum: f64,
}

impl Record {
    pub fn new(group: &str, indicator: &str, achieved: f64, maximum: f64) -> Self {
        Record {
            group: Some(group.to_string()),
            indicator: Some(indicator.to_string()),
            achieved,
            maximum,
            ..Default::default()
        }
    }

    /// Set the department and status columns
    pub fn with_placement(mut self, department: &str, status: &str) -> Self {
        self.department = Some(department.to_string());
        self.status = Some(status.to_string());
        self
    }

    pub fn with_sub_group(mut self, sub_group: &str, sub_category: &str) -> Self {
        self.sub_group = Some(sub_group.to_string());
        self.sub_category = Some(sub_category.to_string());
        self
    }
}

struct TextVisitor;

impl<'de> Visitor<'de> for TextVisitor {
    type Value = Option<String>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string, a number or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if v.is_nan() {
            Ok(None)
        } else {
            Ok(Some(v.to_string()))
        }
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(TextVisitor)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        warn!("Ignoring list value in text column");
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        warn!("Ignoring object value in text column");
        Ok(None)
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(TextVisitor)
}

/// Parses a score cell written as text. Accepts a comma decimal separator.
/// Blank text is 0.0; unparseable text is 0.0 with a warning.
pub fn parse_score(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let parsed = trimmed
        .parse::<f64>()
        .or_else(|_| trimmed.replace(',', ".").parse::<f64>());

    match parsed {
        Ok(v) if v.is_finite() => v,
        _ => {
            warn!(value = trimmed, "Unparseable score, using 0.0");
            0.0
        }
    }
}

struct ScoreVisitor;

impl<'de> Visitor<'de> for ScoreVisitor {
    type Value = f64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number, a numeric string or null")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(if v.is_finite() { v } else { 0.0 })
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(v as f64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(parse_score(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        warn!(value = v, "Boolean score, using 0.0");
        Ok(0.0)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(0.0)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(0.0)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(ScoreVisitor)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        warn!("List score, using 0.0");
        Ok(0.0)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        warn!("Object score, using 0.0");
        Ok(0.0)
    }
}

fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ScoreVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_record() {
        let record: Record = serde_json::from_value(json!({
            "Grupo": "G1",
            "Indicador": "I1",
            "Sub_Grupo": "SG",
            "Departamento": "Vendas",
            "Sub_Categoria": "SC",
            "Status": "Ativo",
            "Pontuação_Atingida": 50,
            "Pontuação_Máxima": 100.5
        }))
        .unwrap();

        assert_eq!(record.group.as_deref(), Some("G1"));
        assert_eq!(record.indicator.as_deref(), Some("I1"));
        assert_eq!(record.sub_group.as_deref(), Some("SG"));
        assert_eq!(record.department.as_deref(), Some("Vendas"));
        assert_eq!(record.sub_category.as_deref(), Some("SC"));
        assert_eq!(record.status.as_deref(), Some("Ativo"));
        assert_eq!(record.achieved, 50.0);
        assert_eq!(record.maximum, 100.5);
    }

    #[test]
    fn test_missing_fields_default() {
        let record: Record = serde_json::from_value(json!({})).unwrap();
        assert_eq!(record, Record::default());
        assert_eq!(record.achieved, 0.0);
        assert_eq!(record.maximum, 0.0);
    }

    #[test]
    fn test_null_and_blank_scores_default() {
        let record: Record = serde_json::from_value(json!({
            "Grupo": null,
            "Pontuação_Atingida": null,
            "Pontuação_Máxima": "  "
        }))
        .unwrap();

        assert_eq!(record.group, None);
        assert_eq!(record.achieved, 0.0);
        assert_eq!(record.maximum, 0.0);
    }

    #[test]
    fn test_whitespace_text_is_kept() {
        let record: Record = serde_json::from_value(json!({
            "Grupo": " ",
            "Indicador": ""
        }))
        .unwrap();

        assert_eq!(record.group.as_deref(), Some(" "));
        assert_eq!(record.indicator.as_deref(), Some(""));
    }

    #[test]
    fn test_numeric_text_fields() {
        let record: Record = serde_json::from_value(json!({
            "Grupo": 2024,
            "Indicador": 3.0,
            "Status": 1.5
        }))
        .unwrap();

        assert_eq!(record.group.as_deref(), Some("2024"));
        assert_eq!(record.indicator.as_deref(), Some("3"));
        assert_eq!(record.status.as_deref(), Some("1.5"));
    }

    #[test]
    fn test_score_strings() {
        let record: Record = serde_json::from_value(json!({
            "Pontuação_Atingida": " 12,5 ",
            "Pontuação_Máxima": "40"
        }))
        .unwrap();

        assert_eq!(record.achieved, 12.5);
        assert_eq!(record.maximum, 40.0);
    }

    #[test]
    fn test_malformed_scores_degrade() {
        let record: Record = serde_json::from_value(json!({
            "Pontuação_Atingida": "n/a",
            "Pontuação_Máxima": [1, 2]
        }))
        .unwrap();

        assert_eq!(record.achieved, 0.0);
        assert_eq!(record.maximum, 0.0);
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("7"), 7.0);
        assert_eq!(parse_score("-1.25"), -1.25);
        assert_eq!(parse_score("3,75"), 3.75);
        assert_eq!(parse_score(""), 0.0);
        assert_eq!(parse_score("abc"), 0.0);
        assert_eq!(parse_score("NaN"), 0.0);
    }

    #[test]
    fn test_builders() {
        let record = Record::new("G", "I", 1.0, 2.0)
            .with_placement("TI", "Inativo")
            .with_sub_group("SG", "SC");

        assert_eq!(record.department.as_deref(), Some("TI"));
        assert_eq!(record.status.as_deref(), Some("Inativo"));
        assert_eq!(record.sub_group.as_deref(), Some("SG"));
        assert_eq!(record.sub_category.as_deref(), Some("SC"));
    }
}
