// Typed query records for every supported upstream endpoint
//
// Each record is the validated form of a tool invocation. Construction goes
// through `Endpoint::from_arguments`, which checks the raw JSON against the
// endpoint descriptor before the typed deserialization runs.

use crate::error::{ValidationError, ValidationResult};
use crate::types::{Division, EndpointDescriptor, FilterRule, ParamKind, ParamSpec, SeasonType};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An upstream endpoint with a typed, validated query
pub trait Endpoint: DeserializeOwned + Serialize + Send + Sync {
    const DESCRIPTOR: &'static EndpointDescriptor;

    /// Validate loosely typed arguments and build the query record.
    ///
    /// `null` is treated as an empty argument object.
    fn from_arguments(arguments: Value) -> ValidationResult<Self> {
        let map = match arguments {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            _ => return Err(ValidationError::NotAnObject),
        };
        check_arguments(Self::DESCRIPTOR, &map)?;
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    /// Check a record built in code against the descriptor, filter rules
    /// included. Records from `from_arguments` already pass.
    fn validate(&self) -> ValidationResult<()> {
        let value = serde_json::to_value(self)?;
        let object = value.as_object().ok_or(ValidationError::NotAnObject)?;

        // Serialized keys use upstream names; the descriptor checks caller names
        let arguments: Map<String, Value> = Self::DESCRIPTOR
            .params
            .iter()
            .filter_map(|spec| {
                object
                    .get(spec.upstream)
                    .map(|v| (spec.name.to_string(), v.clone()))
            })
            .collect();
        check_arguments(Self::DESCRIPTOR, &arguments)
    }

    /// Upstream query pairs in descriptor order, unset parameters omitted
    fn query_pairs(&self) -> ValidationResult<Vec<(String, String)>> {
        let value = serde_json::to_value(self)?;
        let object = value.as_object().ok_or(ValidationError::NotAnObject)?;

        let pairs = Self::DESCRIPTOR
            .params
            .iter()
            .filter_map(|spec| {
                object.get(spec.upstream).map(|v| {
                    let rendered = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (spec.upstream.to_string(), rendered)
                })
            })
            .collect();
        Ok(pairs)
    }
}

/// Check raw arguments against a descriptor.
///
/// Rejects unknown names, wrong JSON types, values outside an enum, missing
/// required parameters and violated filter rules. Never coerces.
pub fn check_arguments(descriptor: &EndpointDescriptor, args: &Map<String, Value>) -> ValidationResult<()> {
    for (name, value) in args {
        let spec = descriptor
            .param(name)
            .ok_or_else(|| ValidationError::UnknownParameter(name.clone()))?;

        if value.is_null() {
            continue;
        }

        match spec.kind {
            ParamKind::Integer => {
                if !(value.is_i64() || value.is_u64()) {
                    return Err(ValidationError::WrongType {
                        name: name.clone(),
                        expected: "integer",
                    });
                }
            }
            ParamKind::String => {
                if !value.is_string() {
                    return Err(ValidationError::WrongType {
                        name: name.clone(),
                        expected: "string",
                    });
                }
            }
            ParamKind::Enum(allowed) => {
                let text = value.as_str().ok_or_else(|| ValidationError::WrongType {
                    name: name.clone(),
                    expected: "string",
                })?;
                if !allowed.contains(&text) {
                    return Err(ValidationError::NotAllowed {
                        name: name.clone(),
                        value: text.to_string(),
                        allowed,
                    });
                }
            }
        }
    }

    let is_set = |name: &str| args.get(name).is_some_and(|v| !v.is_null());

    if let Some(missing) = descriptor.required_params().find(|p| !is_set(p.name)) {
        return Err(ValidationError::MissingParameter(missing.name.to_string()));
    }

    match descriptor.rule {
        FilterRule::None => {}
        FilterRule::AnyOf(names) => {
            if !names.iter().any(|n| is_set(n)) {
                return Err(ValidationError::MissingFilter {
                    one_of: names.to_vec(),
                });
            }
        }
        FilterRule::AnyParameter => {
            if !descriptor.params.iter().any(|p| is_set(p.name)) {
                return Err(ValidationError::MissingFilter {
                    one_of: descriptor.params.iter().map(|p| p.name).collect(),
                });
            }
        }
    }

    Ok(())
}

// Shared parameter contracts

const YEAR: ParamSpec = ParamSpec::required("year", ParamKind::Integer, "Season year (e.g. 2023)");
const YEAR_OPT: ParamSpec = ParamSpec::optional("year", ParamKind::Integer, "Season year (e.g. 2023)");
const WEEK: ParamSpec = ParamSpec::optional("week", ParamKind::Integer, "Week of the season");
const SEASON_TYPE: ParamSpec = ParamSpec::optional(
    "seasonType",
    ParamKind::Enum(SeasonType::ALLOWED),
    "Season type filter",
);
const TEAM: ParamSpec = ParamSpec::optional("team", ParamKind::String, "Team name (e.g. Alabama)");
const CONFERENCE: ParamSpec =
    ParamSpec::optional("conference", ParamKind::String, "Conference abbreviation (e.g. SEC)");
const DIVISION: ParamSpec = ParamSpec::optional(
    "division",
    ParamKind::Enum(Division::ALLOWED),
    "Division classification",
)
.sent_as("classification");
const OFFENSE: ParamSpec = ParamSpec::optional("offense", ParamKind::String, "Offensive team");
const DEFENSE: ParamSpec = ParamSpec::optional("defense", ParamKind::String, "Defensive team");
const OFFENSE_CONFERENCE: ParamSpec =
    ParamSpec::optional("offenseConference", ParamKind::String, "Offensive team conference");
const DEFENSE_CONFERENCE: ParamSpec =
    ParamSpec::optional("defenseConference", ParamKind::String, "Defensive team conference");

pub const GAMES: EndpointDescriptor = EndpointDescriptor {
    tool: "get-games",
    path: "/games",
    resource: "schema://games",
    summary: "Get college football game data with scores, teams and metadata.",
    params: &[
        YEAR,
        WEEK,
        SEASON_TYPE,
        TEAM,
        ParamSpec::optional("home", ParamKind::String, "Home team"),
        ParamSpec::optional("away", ParamKind::String, "Away team"),
        CONFERENCE,
        DIVISION,
        ParamSpec::optional("id", ParamKind::Integer, "Game id"),
    ],
    rule: FilterRule::None,
    examples: &[
        "year=2023",
        "year=2023, team=\"Alabama\"",
        "year=2023, week=1, conference=\"SEC\"",
    ],
};

pub const RECORDS: EndpointDescriptor = EndpointDescriptor {
    tool: "get-records",
    path: "/records",
    resource: "schema://records",
    summary: "Get college football team season records.",
    params: &[YEAR_OPT, TEAM, CONFERENCE],
    rule: FilterRule::None,
    examples: &["year=2023", "team=\"Alabama\"", "year=2023, conference=\"SEC\""],
};

pub const GAMES_TEAMS: EndpointDescriptor = EndpointDescriptor {
    tool: "get-games-teams",
    path: "/games/teams",
    resource: "schema://games/teams",
    summary: "Get college football team box score statistics per game.",
    params: &[
        YEAR,
        WEEK,
        SEASON_TYPE,
        TEAM,
        CONFERENCE,
        DIVISION,
        ParamSpec::optional("id", ParamKind::Integer, "Game id"),
    ],
    rule: FilterRule::AnyOf(&["week", "team", "conference", "id"]),
    examples: &[
        "year=2023, team=\"Alabama\"",
        "year=2023, week=1",
        "year=2023, conference=\"SEC\"",
    ],
};

pub const PLAYS: EndpointDescriptor = EndpointDescriptor {
    tool: "get-plays",
    path: "/plays",
    resource: "schema://plays",
    summary: "Get college football play-by-play data.",
    params: &[
        YEAR,
        ParamSpec::required("week", ParamKind::Integer, "Week of the season"),
        SEASON_TYPE,
        TEAM,
        OFFENSE,
        DEFENSE,
        CONFERENCE,
        OFFENSE_CONFERENCE,
        DEFENSE_CONFERENCE,
        ParamSpec::optional("playType", ParamKind::Integer, "Play type id"),
        DIVISION,
    ],
    rule: FilterRule::None,
    examples: &[
        "year=2023, week=1",
        "year=2023, week=1, team=\"Alabama\"",
        "year=2023, week=1, offense=\"Alabama\", defense=\"Auburn\"",
    ],
};

pub const DRIVES: EndpointDescriptor = EndpointDescriptor {
    tool: "get-drives",
    path: "/drives",
    resource: "schema://drives",
    summary: "Get college football drive data.",
    params: &[
        YEAR,
        SEASON_TYPE,
        WEEK,
        TEAM,
        OFFENSE,
        DEFENSE,
        CONFERENCE,
        OFFENSE_CONFERENCE,
        DEFENSE_CONFERENCE,
        DIVISION,
    ],
    rule: FilterRule::None,
    examples: &[
        "year=2023",
        "year=2023, team=\"Alabama\"",
        "year=2023, offense=\"Alabama\", defense=\"Auburn\"",
    ],
};

pub const PLAY_STATS: EndpointDescriptor = EndpointDescriptor {
    tool: "get-play-stats",
    path: "/plays/stats",
    resource: "schema://play/stats",
    summary: "Get player statistics attached to individual plays.",
    params: &[
        YEAR_OPT,
        WEEK,
        TEAM,
        ParamSpec::optional("gameId", ParamKind::Integer, "Game id"),
        ParamSpec::optional("athleteId", ParamKind::Integer, "Athlete id"),
        ParamSpec::optional("statTypeId", ParamKind::Integer, "Play stat type id"),
        SEASON_TYPE,
        CONFERENCE,
    ],
    rule: FilterRule::AnyParameter,
    examples: &["year=2023", "gameId=401403910", "team=\"Alabama\", year=2023"],
};

pub const RANKINGS: EndpointDescriptor = EndpointDescriptor {
    tool: "get-rankings",
    path: "/rankings",
    resource: "schema://rankings",
    summary: "Get historical poll rankings.",
    params: &[YEAR, WEEK, SEASON_TYPE],
    rule: FilterRule::None,
    examples: &["year=2023", "year=2023, week=1", "year=2023, seasonType=\"regular\""],
};

pub const PREGAME_WIN_PROBABILITY: EndpointDescriptor = EndpointDescriptor {
    tool: "get-pregame-win-probability",
    path: "/metrics/wp/pregame",
    resource: "schema://metrics/wp/pregame",
    summary: "Get pregame win probabilities derived from the betting spread.",
    params: &[YEAR_OPT, WEEK, TEAM, SEASON_TYPE],
    rule: FilterRule::AnyParameter,
    examples: &["year=2023", "team=\"Alabama\"", "year=2023, week=1"],
};

pub const ADVANCED_BOX_SCORE: EndpointDescriptor = EndpointDescriptor {
    tool: "get-advanced-box-score",
    path: "/game/box/advanced",
    resource: "schema://game/box/advanced",
    summary: "Get advanced box score statistics for a single game.",
    params: &[ParamSpec::required("gameId", ParamKind::Integer, "Game id")],
    rule: FilterRule::None,
    examples: &["gameId=401403910"],
};

/// Every endpoint, in the order tools are listed
pub fn all_endpoints() -> [&'static EndpointDescriptor; 9] {
    [
        &GAMES,
        &RECORDS,
        &GAMES_TEAMS,
        &PLAYS,
        &DRIVES,
        &PLAY_STATS,
        &RANKINGS,
        &PREGAME_WIN_PROBABILITY,
        &ADVANCED_BOX_SCORE,
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GamesQuery {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_type: Option<SeasonType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference: Option<String>,
    #[serde(
        default,
        rename(serialize = "classification", deserialize = "division"),
        skip_serializing_if = "Option::is_none"
    )]
    pub division: Option<Division>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl Endpoint for GamesQuery {
    const DESCRIPTOR: &'static EndpointDescriptor = &GAMES;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecordsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference: Option<String>,
}

impl Endpoint for RecordsQuery {
    const DESCRIPTOR: &'static EndpointDescriptor = &RECORDS;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GamesTeamsQuery {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_type: Option<SeasonType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference: Option<String>,
    #[serde(
        default,
        rename(serialize = "classification", deserialize = "division"),
        skip_serializing_if = "Option::is_none"
    )]
    pub division: Option<Division>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl Endpoint for GamesTeamsQuery {
    const DESCRIPTOR: &'static EndpointDescriptor = &GAMES_TEAMS;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlaysQuery {
    pub year: i32,
    pub week: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_type: Option<SeasonType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offense: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offense_conference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense_conference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_type: Option<i64>,
    #[serde(
        default,
        rename(serialize = "classification", deserialize = "division"),
        skip_serializing_if = "Option::is_none"
    )]
    pub division: Option<Division>,
}

impl Endpoint for PlaysQuery {
    const DESCRIPTOR: &'static EndpointDescriptor = &PLAYS;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DrivesQuery {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_type: Option<SeasonType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offense: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offense_conference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense_conference: Option<String>,
    #[serde(
        default,
        rename(serialize = "classification", deserialize = "division"),
        skip_serializing_if = "Option::is_none"
    )]
    pub division: Option<Division>,
}

impl Endpoint for DrivesQuery {
    const DESCRIPTOR: &'static EndpointDescriptor = &DRIVES;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlayStatsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub athlete_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat_type_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_type: Option<SeasonType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference: Option<String>,
}

impl Endpoint for PlayStatsQuery {
    const DESCRIPTOR: &'static EndpointDescriptor = &PLAY_STATS;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RankingsQuery {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_type: Option<SeasonType>,
}

impl Endpoint for RankingsQuery {
    const DESCRIPTOR: &'static EndpointDescriptor = &RANKINGS;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PregameWinProbabilityQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_type: Option<SeasonType>,
}

impl Endpoint for PregameWinProbabilityQuery {
    const DESCRIPTOR: &'static EndpointDescriptor = &PREGAME_WIN_PROBABILITY;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdvancedBoxScoreQuery {
    pub game_id: i64,
}

impl Endpoint for AdvancedBoxScoreQuery {
    const DESCRIPTOR: &'static EndpointDescriptor = &ADVANCED_BOX_SCORE;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_games_minimal_query() {
        let query = GamesQuery::from_arguments(json!({"year": 2014})).unwrap();
        assert_eq!(query.year, 2014);
        assert_eq!(query.query_pairs().unwrap(), pairs(&[("year", "2014")]));
    }

    #[test]
    fn test_games_full_query_in_descriptor_order() {
        let query = GamesQuery::from_arguments(json!({
            "division": "fbs",
            "team": "Alabama",
            "seasonType": "regular",
            "week": 3,
            "year": 2023
        }))
        .unwrap();

        assert_eq!(query.season_type, Some(SeasonType::Regular));
        assert_eq!(query.division, Some(Division::Fbs));
        assert_eq!(
            query.query_pairs().unwrap(),
            pairs(&[
                ("year", "2023"),
                ("week", "3"),
                ("seasonType", "regular"),
                ("team", "Alabama"),
                ("classification", "fbs"),
            ])
        );
    }

    #[test]
    fn test_missing_required_parameter() {
        let err = GamesQuery::from_arguments(json!({"week": 1})).unwrap_err();
        assert_eq!(err, ValidationError::MissingParameter("year".to_string()));

        let err = GamesQuery::from_arguments(Value::Null).unwrap_err();
        assert_eq!(err, ValidationError::MissingParameter("year".to_string()));
    }

    #[test]
    fn test_null_required_counts_as_missing() {
        let err = PlaysQuery::from_arguments(json!({"year": 2023, "week": null})).unwrap_err();
        assert_eq!(err, ValidationError::MissingParameter("week".to_string()));
    }

    #[test]
    fn test_enum_violation() {
        let err = GamesQuery::from_arguments(json!({"year": 2023, "seasonType": "spring"})).unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { ref name, .. } if name == "seasonType"));

        let err = DrivesQuery::from_arguments(json!({"year": 2023, "division": "FBS"})).unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { ref value, .. } if value == "FBS"));
    }

    #[test]
    fn test_unknown_parameter_rejected() {
        let err = RankingsQuery::from_arguments(json!({"year": 2023, "poll": "AP"})).unwrap_err();
        assert_eq!(err, ValidationError::UnknownParameter("poll".to_string()));
    }

    #[test]
    fn test_upstream_name_is_not_accepted_from_callers() {
        let err = GamesQuery::from_arguments(json!({"year": 2023, "classification": "fbs"})).unwrap_err();
        assert_eq!(err, ValidationError::UnknownParameter("classification".to_string()));
    }

    #[test]
    fn test_no_type_coercion() {
        let err = GamesQuery::from_arguments(json!({"year": "2014"})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::WrongType {
                name: "year".to_string(),
                expected: "integer"
            }
        );

        let err = GamesQuery::from_arguments(json!({"year": 2014.5})).unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { .. }));

        let err = RecordsQuery::from_arguments(json!({"team": 7})).unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { expected: "string", .. }));
    }

    #[test]
    fn test_integer_out_of_range_is_malformed() {
        let err = GamesQuery::from_arguments(json!({"year": 9_000_000_000u64})).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }

    #[test]
    fn test_arguments_must_be_object() {
        let err = RecordsQuery::from_arguments(json!([2023])).unwrap_err();
        assert_eq!(err, ValidationError::NotAnObject);
    }

    #[test]
    fn test_records_accepts_no_arguments() {
        let query = RecordsQuery::from_arguments(json!({})).unwrap();
        assert!(query.query_pairs().unwrap().is_empty());
    }

    #[test]
    fn test_games_teams_requires_a_narrowing_filter() {
        let err = GamesTeamsQuery::from_arguments(json!({"year": 2023})).unwrap_err();
        assert!(matches!(err, ValidationError::MissingFilter { ref one_of } if one_of.contains(&"team")));

        let ok = GamesTeamsQuery::from_arguments(json!({"year": 2023, "conference": "SEC"}));
        assert!(ok.is_ok());
    }

    #[test]
    fn test_any_parameter_rule() {
        assert!(PlayStatsQuery::from_arguments(json!({})).is_err());
        assert!(PregameWinProbabilityQuery::from_arguments(json!({"team": null})).is_err());

        let query = PlayStatsQuery::from_arguments(json!({"gameId": 401403910})).unwrap();
        assert_eq!(query.query_pairs().unwrap(), pairs(&[("gameId", "401403910")]));
    }

    #[test]
    fn test_validate_enforces_rules_on_built_records() {
        let teams = GamesTeamsQuery {
            year: 2023,
            week: None,
            season_type: None,
            team: None,
            conference: None,
            division: Some(Division::Fbs),
            id: None,
        };
        assert!(matches!(teams.validate(), Err(ValidationError::MissingFilter { .. })));

        let narrowed = GamesTeamsQuery {
            week: Some(3),
            ..teams
        };
        assert!(narrowed.validate().is_ok());

        let empty = PlayStatsQuery {
            year: None,
            week: None,
            team: None,
            game_id: None,
            athlete_id: None,
            stat_type_id: None,
            season_type: None,
            conference: None,
        };
        assert!(matches!(empty.validate(), Err(ValidationError::MissingFilter { .. })));
        assert!(PlayStatsQuery { athlete_id: Some(4361259), ..empty }.validate().is_ok());
    }

    #[test]
    fn test_advanced_box_score() {
        let query = AdvancedBoxScoreQuery::from_arguments(json!({"gameId": 401403910})).unwrap();
        assert_eq!(query.game_id, 401403910);
        assert!(AdvancedBoxScoreQuery::from_arguments(json!({"id": 401403910})).is_err());
    }

    #[test]
    fn test_plays_camel_case_names() {
        let query = PlaysQuery::from_arguments(json!({
            "year": 2023,
            "week": 1,
            "offenseConference": "SEC",
            "playType": 8
        }))
        .unwrap();
        assert_eq!(
            query.query_pairs().unwrap(),
            pairs(&[
                ("year", "2023"),
                ("week", "1"),
                ("offenseConference", "SEC"),
                ("playType", "8"),
            ])
        );
    }

    #[test]
    fn test_descriptor_names_are_unique() {
        let endpoints = all_endpoints();
        for (i, a) in endpoints.iter().enumerate() {
            for b in &endpoints[i + 1..] {
                assert_ne!(a.tool, b.tool);
                assert_ne!(a.resource, b.resource);
            }
            let mut names: Vec<_> = a.params.iter().map(|p| p.name).collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), a.params.len(), "duplicate parameter in {}", a.tool);
        }
    }
}
