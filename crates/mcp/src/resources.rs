//! Schema catalog served as MCP resources.
//!
//! One plain-text document per endpoint. The "Input Parameters" section is
//! rendered from the same descriptor that drives validation and the tool's
//! input schema, so the three never disagree.

use crate::protocol::{ReadResourceResult, Resource, ResourceContents};
use cfbd_core::queries::{
    ADVANCED_BOX_SCORE, DRIVES, GAMES, GAMES_TEAMS, PLAYS, PLAY_STATS, PREGAME_WIN_PROBABILITY,
    RANKINGS, RECORDS,
};
use cfbd_core::{Division, EndpointDescriptor, FilterRule, ParamKind, SeasonType};

pub const MIME_TYPE: &str = "text/plain";

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),
}

struct SchemaDoc {
    descriptor: &'static EndpointDescriptor,
    name: &'static str,
    description: &'static str,
    response: &'static str,
}

const GAMES_RESPONSE: &str = "\
- id: integer
- season: integer
- week: integer
- seasonType: string
- startDate: string (ISO 8601)
- startTimeTBD: boolean
- completed: boolean
- neutralSite: boolean
- conferenceGame: boolean
- attendance: integer | null
- venueId: integer | null
- venue: string | null
- homeId: integer
- homeTeam: string
- homeConference: string | null
- homeClassification: string | null
- homePoints: integer | null
- homeLineScores: [integer] | null
- homePostgameWinProbability: number | null
- homePregameElo: integer | null
- homePostgameElo: integer | null
- awayId: integer
- awayTeam: string
- awayConference: string | null
- awayClassification: string | null
- awayPoints: integer | null
- awayLineScores: [integer] | null
- awayPostgameWinProbability: number | null
- awayPregameElo: integer | null
- awayPostgameElo: integer | null
- excitementIndex: number | null
- highlights: string | null
- notes: string | null";

const RECORDS_RESPONSE: &str = "\
- year: integer
- teamId: integer
- team: string
- classification: string | null
- conference: string | null
- division: string | null
- expectedWins: number | null
- total: {games, wins, losses, ties}
- conferenceGames: {games, wins, losses, ties}
- homeGames: {games, wins, losses, ties}
- awayGames: {games, wins, losses, ties}
- neutralSiteGames: {games, wins, losses, ties}
- regularSeason: {games, wins, losses, ties}
- postseason: {games, wins, losses, ties}";

const GAMES_TEAMS_RESPONSE: &str = "\
- id: integer (game id)
- teams: array of
  - teamId: integer
  - team: string
  - conference: string | null
  - homeAway: string (home | away)
  - points: integer | null
  - stats: array of {category: string, stat: string}";

const PLAYS_RESPONSE: &str = "\
- id: string
- driveId: string
- gameId: integer
- driveNumber: integer | null
- playNumber: integer | null
- offense: string
- offenseConference: string | null
- offenseScore: integer
- defense: string
- defenseConference: string | null
- defenseScore: integer
- home: string
- away: string
- period: integer
- clock: {minutes: integer, seconds: integer}
- offenseTimeouts: integer | null
- defenseTimeouts: integer | null
- yardline: integer
- yardsToGoal: integer
- down: integer
- distance: integer
- yardsGained: integer
- scoring: boolean
- playType: string
- playText: string | null
- ppa: number | null
- wallclock: string | null";

const DRIVES_RESPONSE: &str = "\
- id: string
- gameId: integer
- driveNumber: integer | null
- offense: string
- offenseConference: string | null
- defense: string
- defenseConference: string | null
- scoring: boolean
- startPeriod: integer
- startYardline: integer
- startYardsToGoal: integer
- startTime: {minutes: integer, seconds: integer}
- endPeriod: integer
- endYardline: integer
- endYardsToGoal: integer
- endTime: {minutes: integer, seconds: integer}
- elapsed: {minutes: integer, seconds: integer}
- plays: integer
- yards: integer
- driveResult: string
- isHomeOffense: boolean
- startOffenseScore: integer
- startDefenseScore: integer
- endOffenseScore: integer
- endDefenseScore: integer";

const PLAY_STATS_RESPONSE: &str = "\
- gameId: integer
- season: integer
- week: integer
- seasonType: string
- team: string
- conference: string | null
- opponent: string
- teamScore: integer
- opponentScore: integer
- driveId: string
- playId: string
- period: integer
- clock: {minutes: integer, seconds: integer}
- yardsToGoal: integer
- down: integer
- distance: integer
- athleteId: string
- athleteName: string
- statType: string
- stat: number";

const RANKINGS_RESPONSE: &str = "\
- season: integer
- seasonType: string
- week: integer
- polls: array of
  - poll: string
  - ranks: array of
    - rank: integer
    - teamId: integer | null
    - school: string
    - conference: string | null
    - firstPlaceVotes: integer | null
    - points: integer | null";

const PREGAME_WP_RESPONSE: &str = "\
- gameId: integer
- season: integer
- seasonType: string
- week: integer
- homeTeam: string
- awayTeam: string
- spread: number
- homeWinProbability: number";

const ADVANCED_BOX_SCORE_RESPONSE: &str = "\
- gameInfo: {homeTeam, homePoints, homeWinProb, awayTeam, awayPoints, awayWinProb, excitement}
- teams:
  - ppa: per team and quarter {overall, passing, rushing}
  - cumulativePpa: per team and quarter {overall, passing, rushing}
  - successRates: per team {overall, standardDowns, passingDowns}
  - explosiveness: per team and quarter
  - rushing: per team {powerSuccess, stuffRate, lineYards, secondLevelYards, openFieldYards}
  - havoc: per team {total, frontSeven, db}
  - scoringOpportunities: per team {opportunities, points, pointsPerOpportunity}
  - fieldPosition: per team {averageStart, averageStartingPredictedPoints}
- players:
  - usage: per player {player, team, position, total, quarter1..quarter4, rushing, passing}
  - ppa: per player {player, team, position, average, cumulative}";

fn documents() -> [SchemaDoc; 9] {
    [
        SchemaDoc {
            descriptor: &GAMES,
            name: "Games endpoint schema",
            description: "Game information with scores, teams and metadata",
            response: GAMES_RESPONSE,
        },
        SchemaDoc {
            descriptor: &RECORDS,
            name: "Team records endpoint schema",
            description: "Team season records",
            response: RECORDS_RESPONSE,
        },
        SchemaDoc {
            descriptor: &GAMES_TEAMS,
            name: "Team game statistics endpoint schema",
            description: "Per-game team box score statistics",
            response: GAMES_TEAMS_RESPONSE,
        },
        SchemaDoc {
            descriptor: &PLAYS,
            name: "Plays endpoint schema",
            description: "Play-by-play records",
            response: PLAYS_RESPONSE,
        },
        SchemaDoc {
            descriptor: &DRIVES,
            name: "Drives endpoint schema",
            description: "Drive records",
            response: DRIVES_RESPONSE,
        },
        SchemaDoc {
            descriptor: &PLAY_STATS,
            name: "Play stats endpoint schema",
            description: "Player statistics attached to individual plays",
            response: PLAY_STATS_RESPONSE,
        },
        SchemaDoc {
            descriptor: &RANKINGS,
            name: "Rankings endpoint schema",
            description: "Poll rankings by week",
            response: RANKINGS_RESPONSE,
        },
        SchemaDoc {
            descriptor: &PREGAME_WIN_PROBABILITY,
            name: "Pregame win probability endpoint schema",
            description: "Pregame win probabilities derived from the spread",
            response: PREGAME_WP_RESPONSE,
        },
        SchemaDoc {
            descriptor: &ADVANCED_BOX_SCORE,
            name: "Advanced box score endpoint schema",
            description: "Advanced box score statistics for one game",
            response: ADVANCED_BOX_SCORE_RESPONSE,
        },
    ]
}

struct Entry {
    resource: Resource,
    text: String,
}

/// Read-only mapping from `schema://` URIs to their documents.
pub struct SchemaCatalog {
    entries: Vec<Entry>,
}

impl SchemaCatalog {
    /// Catalog covering every College Football Data endpoint
    pub fn standard() -> Self {
        let entries = documents()
            .iter()
            .map(|doc| Entry {
                resource: Resource {
                    uri: doc.descriptor.resource.to_string(),
                    name: doc.name.to_string(),
                    description: doc.description.to_string(),
                    mime_type: MIME_TYPE.to_string(),
                },
                text: render(doc),
            })
            .collect();
        Self { entries }
    }

    pub fn list(&self) -> Vec<Resource> {
        self.entries.iter().map(|e| e.resource.clone()).collect()
    }

    pub fn read(&self, uri: &str) -> Result<&str, ResourceError> {
        self.entries
            .iter()
            .find(|e| e.resource.uri == uri)
            .map(|e| e.text.as_str())
            .ok_or_else(|| ResourceError::NotFound(uri.to_string()))
    }

    /// `resources/read` payload for `uri`
    pub fn contents(&self, uri: &str) -> Result<ReadResourceResult, ResourceError> {
        let text = self.read(uri)?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: uri.to_string(),
                mime_type: MIME_TYPE.to_string(),
                text: text.to_string(),
            }],
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SchemaCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn render(doc: &SchemaDoc) -> String {
    let descriptor = doc.descriptor;
    let mut text = format!(
        "Endpoint: {}\nTool: {}\nDescription: {}\n\nInput Parameters:\n",
        descriptor.path, descriptor.tool, descriptor.summary
    );

    for param in descriptor.params {
        let kind = match param.kind {
            ParamKind::Integer => "integer".to_string(),
            ParamKind::String => "string".to_string(),
            ParamKind::Enum(allowed) => format!("string, one of {}", allowed.join(" | ")),
        };
        let presence = if param.required { "required" } else { "optional" };
        text.push_str(&format!(
            "- {}: {} ({}) {}\n",
            param.name, kind, presence, param.description
        ));
    }

    match descriptor.rule {
        FilterRule::None => {}
        FilterRule::AnyOf(names) => {
            text.push_str(&format!("At least one of {} must be given.\n", names.join(", ")));
        }
        FilterRule::AnyParameter => text.push_str("At least one parameter must be given.\n"),
    }

    text.push_str("\nResponse Schema:\n");
    text.push_str(doc.response);

    text.push_str(&format!(
        "\n\nValid Values:\n- Season Types: {}\n- Divisions: {}\n",
        SeasonType::ALLOWED.join(", "),
        Division::ALLOWED.join(", ")
    ));
    text
}
