// Canned analysis prompts with typed placeholders

use crate::protocol::{GetPromptResult, Prompt, PromptArgument, PromptMessage, Role, ToolContent};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("Unknown prompt: {0}")]
    NotFound(String),

    #[error("Invalid arguments for prompt {prompt}: {message}")]
    InvalidArgument { prompt: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    String,
    /// JSON integer or a string of digits
    Integer,
}

#[derive(Debug, Clone, Copy)]
pub struct Placeholder {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: PlaceholderKind,
    /// `None` marks the placeholder as required
    pub default: Option<&'static str>,
}

impl Placeholder {
    const fn required(name: &'static str, kind: PlaceholderKind, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind,
            default: None,
        }
    }

    const fn optional(
        name: &'static str,
        kind: PlaceholderKind,
        description: &'static str,
        default: &'static str,
    ) -> Self {
        Self {
            name,
            description,
            kind,
            default: Some(default),
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub placeholders: &'static [Placeholder],
    pub body: &'static str,
}

const TEAM1: Placeholder =
    Placeholder::required("team1", PlaceholderKind::String, "First team name");
const TEAM2: Placeholder =
    Placeholder::required("team2", PlaceholderKind::String, "Second team name");
const YEAR: Placeholder = Placeholder::required("year", PlaceholderKind::Integer, "Season year");

const TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        name: "analyze-game",
        description: "Get detailed analysis of a specific game",
        placeholders: &[
            Placeholder::required("gameId", PlaceholderKind::Integer, "Game id to analyze"),
            Placeholder::optional(
                "includeAdvancedStats",
                PlaceholderKind::String,
                "Whether to include advanced statistics (true/false)",
                "false",
            ),
        ],
        body: "Analyze game {gameId} using the College Football Data API. Start with \
get-games (id={gameId}) for the result and context, then get-games-teams for the team box \
score. Include advanced statistics from get-advanced-box-score: {includeAdvancedStats}. \
Summarize the turning points and what decided the game.",
    },
    PromptTemplate {
        name: "analyze-team",
        description: "Analyze a team's performance for a given season",
        placeholders: &[
            Placeholder::required("team", PlaceholderKind::String, "Team name (e.g. Alabama)"),
            YEAR,
        ],
        body: "Analyze {team}'s performance in the {year} season using the College Football \
Data API. Review their record with get-records, key games with get-games, their poll position \
with get-rankings and their overall statistics, then summarize strengths and weaknesses.",
    },
    PromptTemplate {
        name: "analyze-trends",
        description: "Analyze trends over a season",
        placeholders: &[
            YEAR,
            Placeholder::required(
                "metric",
                PlaceholderKind::String,
                "Metric to analyze (scoring, attendance, upsets)",
            ),
        ],
        body: "Using the College Football Data API, analyze {metric} trends across the {year} \
season. Pull results week by week with get-games, compare against get-rankings where it helps, \
and describe how {metric} moved over the season with supporting numbers.",
    },
    PromptTemplate {
        name: "compare-teams",
        description: "Compare the performance of two teams",
        placeholders: &[TEAM1, TEAM2, YEAR],
        body: "Compare {team1} and {team2} in the {year} season using the College Football Data \
API. Check whether they met head to head, then compare their records, common opponents and \
statistical performance.",
    },
    PromptTemplate {
        name: "analyze-rivalry",
        description: "Analyze historical rivalry matchups",
        placeholders: &[
            TEAM1,
            TEAM2,
            Placeholder::optional(
                "startYear",
                PlaceholderKind::Integer,
                "Starting year for analysis",
                "the earliest season on record",
            ),
        ],
        body: "Analyze the rivalry between {team1} and {team2} using the College Football Data \
API, starting from {startYear}. Collect their head-to-head games season by season with \
get-games, then summarize the series record, streaks, margins and memorable meetings.",
    },
];

/// The prompt set offered to clients
pub struct PromptTemplates {
    templates: &'static [PromptTemplate],
}

impl PromptTemplates {
    pub fn standard() -> Self {
        Self {
            templates: TEMPLATES,
        }
    }

    pub fn get(&self, name: &str) -> Option<&'static PromptTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn list(&self) -> Vec<Prompt> {
        self.templates
            .iter()
            .map(|t| Prompt {
                name: t.name.to_string(),
                description: t.description.to_string(),
                arguments: t
                    .placeholders
                    .iter()
                    .map(|p| PromptArgument {
                        name: p.name.to_string(),
                        description: p.description.to_string(),
                        required: p.is_required(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Fill a template's placeholders from `args`.
    pub fn render(&self, name: &str, args: &Map<String, Value>) -> Result<String, PromptError> {
        let template = self
            .get(name)
            .ok_or_else(|| PromptError::NotFound(name.to_string()))?;

        let invalid = |message: String| PromptError::InvalidArgument {
            prompt: name.to_string(),
            message,
        };

        if let Some(unknown) = args
            .keys()
            .find(|k| !template.placeholders.iter().any(|p| p.name == k.as_str()))
        {
            return Err(invalid(format!("unknown argument '{}'", unknown)));
        }

        let mut values = HashMap::new();
        for placeholder in template.placeholders {
            let value = match args.get(placeholder.name).filter(|v| !v.is_null()) {
                Some(value) => coerce(placeholder, value).map_err(&invalid)?,
                None => match placeholder.default {
                    Some(default) => default.to_string(),
                    None => {
                        return Err(invalid(format!(
                            "missing required argument '{}'",
                            placeholder.name
                        )))
                    }
                },
            };
            values.insert(placeholder.name, value);
        }

        Ok(substitute(template.body, &values))
    }

    /// `prompts/get` payload
    pub fn get_prompt(
        &self,
        name: &str,
        args: &Map<String, Value>,
    ) -> Result<GetPromptResult, PromptError> {
        let text = self.render(name, args)?;
        let description = self
            .get(name)
            .map(|t| t.description.to_string())
            .unwrap_or_default();
        Ok(GetPromptResult {
            description,
            messages: vec![PromptMessage {
                role: Role::User,
                content: ToolContent::text(text),
            }],
        })
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self::standard()
    }
}

fn coerce(placeholder: &Placeholder, value: &Value) -> Result<String, String> {
    match (placeholder.kind, value) {
        (PlaceholderKind::String, Value::String(s)) => Ok(s.clone()),
        (PlaceholderKind::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => {
            Ok(n.to_string())
        }
        (PlaceholderKind::Integer, Value::String(s)) => {
            let trimmed = s.trim();
            match trimmed.parse::<i64>() {
                Ok(_) => Ok(trimmed.to_string()),
                Err(_) => Err(format!("'{}' must be an integer, got \"{}\"", placeholder.name, s)),
            }
        }
        (PlaceholderKind::Integer, other) => Err(format!(
            "'{}' must be an integer, got {}",
            placeholder.name, other
        )),
        (PlaceholderKind::String, other) => Err(format!(
            "'{}' must be a string, got {}",
            placeholder.name, other
        )),
    }
}

/// Single pass over `{name}` tokens; substituted text is never rescanned.
fn substitute(body: &str, values: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => match values.get(&after[..close]) {
                Some(value) => {
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            },
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
