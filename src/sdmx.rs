//! Wire types for the SDMX-JSON documents returned by the IMF service.
//!
//! Only the keys this crate consumes are modelled. The service collapses
//! single-element arrays into bare objects, so every repeated element goes
//! through [`OneOrMany`].

use crate::error::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A JSON value that is either an array of `T` or a single `T`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(v) => v,
            OneOrMany::One(t) => vec![t],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextNode {
    #[serde(rename = "#text", default)]
    pub text: String,
}

/// Free text as the service encodes it: `{"#text": ..}`, a list of
/// language variants, or (rarely) a bare string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Node(TextNode),
    Nodes(Vec<TextNode>),
}

impl LocalizedText {
    pub fn text(&self) -> &str {
        match self {
            LocalizedText::Plain(s) => s,
            LocalizedText::Node(n) => &n.text,
            LocalizedText::Nodes(ns) => ns.first().map(|n| n.text.as_str()).unwrap_or(""),
        }
    }
}

// ---------------------------------------------------------------------------
// Structure documents (DataStructure, Dataflow, CodeList)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StructureEnvelope {
    #[serde(rename = "Structure")]
    pub structure: Structure,
}

#[derive(Debug, Default, Deserialize)]
pub struct Structure {
    #[serde(rename = "CodeLists", default)]
    pub code_lists: Option<CodeLists>,
    #[serde(rename = "KeyFamilies", default)]
    pub key_families: Option<KeyFamilies>,
    #[serde(rename = "Dataflows", default)]
    pub dataflows: Option<Dataflows>,
}

#[derive(Debug, Deserialize)]
pub struct CodeLists {
    #[serde(rename = "CodeList")]
    pub code_list: OneOrMany<CodeList>,
}

#[derive(Debug, Deserialize)]
pub struct CodeList {
    #[serde(rename = "@id", default)]
    pub id: Option<String>,
    #[serde(rename = "Code", default)]
    pub code: Option<OneOrMany<Code>>,
}

#[derive(Debug, Deserialize)]
pub struct Code {
    #[serde(rename = "@value")]
    pub value: String,
    #[serde(rename = "Description")]
    pub description: LocalizedText,
}

#[derive(Debug, Deserialize)]
pub struct Dataflows {
    #[serde(rename = "Dataflow")]
    pub dataflow: OneOrMany<Dataflow>,
}

#[derive(Debug, Deserialize)]
pub struct Dataflow {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: LocalizedText,
}

#[derive(Debug, Deserialize)]
pub struct KeyFamilies {
    #[serde(rename = "KeyFamily")]
    pub key_family: OneOrMany<KeyFamily>,
}

#[derive(Debug, Deserialize)]
pub struct KeyFamily {
    #[serde(rename = "Annotations", default)]
    pub annotations: Option<Annotations>,
    #[serde(rename = "Components", default)]
    pub components: Option<Components>,
}

#[derive(Debug, Deserialize)]
pub struct Annotations {
    #[serde(rename = "Annotation")]
    pub annotation: OneOrMany<Annotation>,
}

#[derive(Debug, Deserialize)]
pub struct Annotation {
    #[serde(rename = "AnnotationTitle")]
    pub title: LocalizedText,
    #[serde(rename = "AnnotationText")]
    pub text: LocalizedText,
}

#[derive(Debug, Deserialize)]
pub struct Components {
    #[serde(rename = "Dimension")]
    pub dimension: OneOrMany<Dimension>,
}

#[derive(Debug, Deserialize)]
pub struct Dimension {
    #[serde(rename = "@conceptRef", default)]
    pub concept_ref: String,
    #[serde(rename = "@conceptSchemeRef", default)]
    pub concept_scheme_ref: String,
    #[serde(rename = "@codelist", default)]
    pub codelist: String,
}

// ---------------------------------------------------------------------------
// CompactData (time series)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CompactEnvelope {
    #[serde(rename = "CompactData")]
    pub compact_data: CompactData,
}

#[derive(Debug, Deserialize)]
pub struct CompactData {
    #[serde(rename = "DataSet")]
    pub data_set: DataSet,
}

#[derive(Debug, Deserialize)]
pub struct DataSet {
    #[serde(rename = "Series", default)]
    pub series: Option<OneOrMany<Series>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Series {
    #[serde(rename = "@INDICATOR", default)]
    pub indicator: Option<String>,
    #[serde(rename = "Obs", default)]
    pub obs: Option<OneOrMany<Obs>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Obs {
    #[serde(rename = "@TIME_PERIOD")]
    pub time_period: String,
    /// The service sends values as strings; accept numbers too.
    #[serde(rename = "@OBS_VALUE", default, deserialize_with = "de_opt_f64_from_string_or_number")]
    pub value: Option<f64>,
}

/// Serde helper: parse `Option<f64>` from a JSON string, number, or null.
fn de_opt_f64_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct F64Visitor;

    impl<'de> Visitor<'de> for F64Visitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or number representing a float")
        }

        fn visit_f64<E>(self, v: f64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v))
        }

        fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v as f64))
        }

        fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v as f64))
        }

        fn visit_str<E>(self, s: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.trim().parse::<f64>().map(Some).map_err(E::custom)
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(F64Visitor)
}

/// Decode a JSON document into one of the envelopes above.
pub fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::remote(format!("unexpected {} response shape: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn one_or_many_accepts_bare_object() {
        let one: OneOrMany<TextNode> = serde_json::from_value(json!({"#text": "x"})).unwrap();
        assert_eq!(one.into_vec().len(), 1);
        let many: OneOrMany<TextNode> =
            serde_json::from_value(json!([{"#text": "x"}, {"#text": "y"}])).unwrap();
        assert_eq!(many.into_vec().len(), 2);
    }

    #[test]
    fn obs_value_string_or_number() {
        let a: Obs =
            serde_json::from_value(json!({"@TIME_PERIOD": "2019", "@OBS_VALUE": "12.5"})).unwrap();
        let b: Obs =
            serde_json::from_value(json!({"@TIME_PERIOD": "2019", "@OBS_VALUE": 7})).unwrap();
        let c: Obs = serde_json::from_value(json!({"@TIME_PERIOD": "2019"})).unwrap();
        assert_eq!(a.value, Some(12.5));
        assert_eq!(b.value, Some(7.0));
        assert_eq!(c.value, None);
    }

    #[test]
    fn localized_text_variants() {
        let plain: LocalizedText = serde_json::from_value(json!("Title")).unwrap();
        let node: LocalizedText =
            serde_json::from_value(json!({"@xml:lang": "en", "#text": "Germany"})).unwrap();
        let nodes: LocalizedText =
            serde_json::from_value(json!([{"#text": "First"}, {"#text": "Second"}])).unwrap();
        assert_eq!(plain.text(), "Title");
        assert_eq!(node.text(), "Germany");
        assert_eq!(nodes.text(), "First");
    }
}
