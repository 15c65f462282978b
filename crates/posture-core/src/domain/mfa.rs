//! MFA method evaluation, grouped server-side into recommendation buckets

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tri-state phishing resistance, `true | false | "partial"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhishResistance {
    Yes,
    #[default]
    No,
    Partial,
}

impl PhishResistance {
    pub fn label(&self) -> &'static str {
        match self {
            PhishResistance::Yes => "Phish-resistant",
            PhishResistance::No => "Not phish-resistant",
            PhishResistance::Partial => "Partially phish-resistant",
        }
    }
}

impl Serialize for PhishResistance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PhishResistance::Yes => serializer.serialize_bool(true),
            PhishResistance::No => serializer.serialize_bool(false),
            PhishResistance::Partial => serializer.serialize_str("partial"),
        }
    }
}

impl<'de> Deserialize<'de> for PhishResistance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TriStateVisitor;

        impl<'de> Visitor<'de> for TriStateVisitor {
            type Value = PhishResistance;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a boolean or the string \"partial\"")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(if v { PhishResistance::Yes } else { PhishResistance::No })
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                match v.to_ascii_lowercase().as_str() {
                    "partial" => Ok(PhishResistance::Partial),
                    "true" => Ok(PhishResistance::Yes),
                    "false" => Ok(PhishResistance::No),
                    other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }
        }

        deserializer.deserialize_any(TriStateVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodState {
    Enabled,
    Disabled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedMethod {
    pub id: String,
    pub display_name: String,
    pub state: MethodState,
    pub is_phish_resistant: PhishResistance,
    #[serde(default)]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaEvaluation {
    #[serde(default)]
    pub to_enable: Vec<EvaluatedMethod>,
    #[serde(default)]
    pub to_disable: Vec<EvaluatedMethod>,
    #[serde(default)]
    pub enhance: Vec<EvaluatedMethod>,
    #[serde(default)]
    pub correct: Vec<EvaluatedMethod>,
}

impl MfaEvaluation {
    /// Methods needing action: enable, disable or enhance.
    pub fn recommendation_count(&self) -> usize {
        self.to_enable.len() + self.to_disable.len() + self.enhance.len()
    }

    pub fn correct_count(&self) -> usize {
        self.correct.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recommendation_count() == 0 && self.correct.is_empty()
    }
}
