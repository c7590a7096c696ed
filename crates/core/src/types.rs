// Shared vocabulary for describing upstream endpoints and their filters

use serde::{Deserialize, Serialize};
use std::fmt;

/// Portion of the season a query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonType {
    Regular,
    Postseason,
    Both,
}

impl SeasonType {
    pub const ALLOWED: &'static [&'static str] = &["regular", "postseason", "both"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonType::Regular => "regular",
            SeasonType::Postseason => "postseason",
            SeasonType::Both => "both",
        }
    }
}

impl fmt::Display for SeasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// NCAA classification of a team (FBS, FCS, Division II, Division III)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Division {
    Fbs,
    Fcs,
    Ii,
    Iii,
}

impl Division {
    pub const ALLOWED: &'static [&'static str] = &["fbs", "fcs", "ii", "iii"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Division::Fbs => "fbs",
            Division::Fcs => "fcs",
            Division::Ii => "ii",
            Division::Iii => "iii",
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic type of a single query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Integer,
    String,
    /// String restricted to a fixed set of values
    Enum(&'static [&'static str]),
}

impl ParamKind {
    /// JSON Schema type name
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamKind::Integer => "integer",
            ParamKind::String | ParamKind::Enum(_) => "string",
        }
    }

    pub fn allowed(&self) -> Option<&'static [&'static str]> {
        match self {
            ParamKind::Enum(values) => Some(values),
            _ => None,
        }
    }
}

/// Contract for one query parameter of an upstream endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Name callers use
    pub name: &'static str,
    /// Name sent on the upstream query string
    pub upstream: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            upstream: name,
            kind,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            upstream: name,
            kind,
            required: false,
            description,
        }
    }

    /// Send this parameter upstream under a different name
    pub const fn sent_as(self, upstream: &'static str) -> Self {
        Self { upstream, ..self }
    }
}

/// Cross-field requirement checked after individual parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRule {
    None,
    /// At least one of the named parameters must be set
    AnyOf(&'static [&'static str]),
    /// At least one parameter of any kind must be set
    AnyParameter,
}

/// Immutable description of one upstream endpoint exposed as a tool
#[derive(Debug, Clone, Copy)]
pub struct EndpointDescriptor {
    pub tool: &'static str,
    pub path: &'static str,
    pub resource: &'static str,
    pub summary: &'static str,
    pub params: &'static [ParamSpec],
    pub rule: FilterRule,
    pub examples: &'static [&'static str],
}

impl EndpointDescriptor {
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn required_params(&self) -> impl Iterator<Item = &'static ParamSpec> {
        self.params.iter().filter(|p| p.required)
    }

    pub fn optional_params(&self) -> impl Iterator<Item = &'static ParamSpec> {
        self.params.iter().filter(|p| !p.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_type_serde_matches_allowed() {
        for value in SeasonType::ALLOWED {
            let parsed: SeasonType = serde_json::from_value(serde_json::json!(value)).unwrap();
            assert_eq!(parsed.as_str(), *value);
        }
        assert!(serde_json::from_value::<SeasonType>(serde_json::json!("spring")).is_err());
    }

    #[test]
    fn test_division_serde_matches_allowed() {
        for value in Division::ALLOWED {
            let parsed: Division = serde_json::from_value(serde_json::json!(value)).unwrap();
            assert_eq!(parsed.to_string(), *value);
        }
        assert!(serde_json::from_value::<Division>(serde_json::json!("FBS")).is_err());
    }

    #[test]
    fn test_sent_as_keeps_caller_name() {
        let spec = ParamSpec::optional("division", ParamKind::Enum(Division::ALLOWED), "")
            .sent_as("classification");
        assert_eq!(spec.name, "division");
        assert_eq!(spec.upstream, "classification");
        assert_eq!(spec.kind.json_type(), "string");
        assert_eq!(spec.kind.allowed(), Some(Division::ALLOWED));
    }
}
