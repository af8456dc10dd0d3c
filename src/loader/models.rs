//! Typed views over the resource documents
//!
//! Every field is optional in the source data, so every struct defaults
//! missing fields. Counters and labels also take `null` as their default and
//! counters accept fractional numbers. Any other wrong type is a decode error
//! rather than a silently empty value.

use std::collections::BTreeMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use crate::loader::snapshot::Snapshot;

/// `status.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Status {
    pub model: Option<String>,
    pub start_time: Option<String>,
    #[serde(deserialize_with = "count_or_zero")]
    pub tokens_today: u64,
    #[serde(deserialize_with = "or_default")]
    pub cost_today: f64,
    #[serde(deserialize_with = "count_or_zero")]
    pub active_sessions: u64,
    pub active_agents: Option<u64>,
    pub online: Option<bool>,
    pub recent_activity: Vec<Activity>,
}

impl Status {
    /// A missing `online` flag counts as online
    pub fn is_online(&self) -> bool {
        self.online != Some(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Activity {
    pub timestamp: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub event: String,
}

/// `cron.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CronBoard {
    pub jobs: Vec<CronJob>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CronCounts {
    pub enabled: usize,
    pub disabled: usize,
    pub running: usize,
}

impl CronBoard {
    pub fn counts(&self) -> CronCounts {
        let enabled = self.jobs.iter().filter(|j| j.enabled).count();
        CronCounts {
            enabled,
            disabled: self.jobs.len() - enabled,
            running: self.jobs.iter().filter(|j| j.running).count(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CronJob {
    pub id: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub name: String,
    pub agent: Option<String>,
    pub schedule: Option<ScheduleSpec>,
    #[serde(deserialize_with = "or_default")]
    pub enabled: bool,
    #[serde(deserialize_with = "or_default")]
    pub running: bool,
    pub next_run: Option<String>,
}

impl CronJob {
    /// Owning agent, `main` when unspecified
    pub fn agent_or_main(&self) -> &str {
        self.agent.as_deref().unwrap_or("main")
    }
}

/// A cron schedule: either a bare expression or a structured spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleSpec {
    Expr(String),
    Detailed(DetailedSchedule),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetailedSchedule {
    pub kind: Option<String>,
    pub expr: Option<String>,
    pub every_ms: Option<u64>,
    pub tz: Option<String>,
}

impl ScheduleSpec {
    /// Short human label for the schedule
    pub fn label(&self) -> String {
        match self {
            ScheduleSpec::Expr(expr) => expr.clone(),
            ScheduleSpec::Detailed(d) => match (&d.expr, d.every_ms) {
                (Some(expr), _) => match &d.tz {
                    Some(tz) => format!("{} ({})", expr, tz),
                    None => expr.clone(),
                },
                (None, Some(ms)) => format!("every {}s", ms / 1000),
                (None, None) => d.kind.clone().unwrap_or_else(|| "--".to_string()),
            },
        }
    }
}

/// `tasks.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tasks {
    pub priorities: Vec<Priority>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Priority {
    #[serde(deserialize_with = "or_default")]
    pub title: String,
    pub priority: Option<String>,
    pub status: Option<String>,
}

impl Priority {
    pub fn is_done(&self) -> bool {
        self.status.as_deref() == Some("done")
    }
}

/// `memory.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemoryStats {
    pub memory_size: Option<String>,
    pub daily_notes_count: Option<u64>,
    pub lessons_count: Option<u64>,
    pub attacks_blocked: Option<u64>,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lesson {
    pub date: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub title: String,
}

/// `analytics.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Analytics {
    pub cost_by_agent: BTreeMap<String, f64>,
    pub token_history: Vec<TokenPoint>,
    pub total_tokens_week: Option<u64>,
    pub total_cost_week: Option<f64>,
    pub avg_daily_cost: Option<f64>,
    pub most_used_agent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenPoint {
    pub date: Option<String>,
    #[serde(deserialize_with = "count_or_zero")]
    pub tokens: u64,
}

/// `sessions.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Sessions {
    pub list: Vec<AgentSession>,
    pub channel_stats: BTreeMap<String, serde_json::Value>,
}

/// `scores.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scores {
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Player {
    #[serde(deserialize_with = "or_default")]
    pub name: String,
    pub total: i64,
    #[serde(deserialize_with = "count_or_zero")]
    pub message_count: u64,
}

impl Scores {
    /// Players ordered by total score, highest first
    pub fn leaderboard(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.iter().collect();
        players.sort_by(|a, b| b.total.cmp(&a.total));
        players
    }
}

/// `agents/<id>.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentStats {
    pub status: Option<String>,
    pub model: Option<String>,
    pub role: Option<String>,
    pub workspace: Option<String>,
    #[serde(deserialize_with = "count_or_zero")]
    pub tokens_today: u64,
    #[serde(deserialize_with = "or_default")]
    pub cost_today: f64,
    #[serde(deserialize_with = "count_or_zero")]
    pub messages_handled: u64,
    pub session_count: Option<u64>,
    pub sessions: Vec<AgentSession>,
    pub capabilities: Vec<String>,
    pub cron_jobs: Vec<CronJob>,
}

impl AgentStats {
    /// A missing status counts as active
    pub fn is_active(&self) -> bool {
        self.status.as_deref().is_none_or(|s| s == "active")
    }

    pub fn session_total(&self) -> u64 {
        self.session_count.unwrap_or(self.sessions.len() as u64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentSession {
    pub key: Option<String>,
    pub name: Option<String>,
    pub agent: Option<String>,
    #[serde(deserialize_with = "count_or_zero")]
    pub tokens: u64,
    pub last_active: Option<String>,
}

impl AgentSession {
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.key.as_deref())
            .unwrap_or("--")
    }
}

/// `null` reads as the type's default
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Non-negative counter; `null` is 0 and fractions are truncated
fn count_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(n) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(0);
    };
    n.as_u64()
        .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        .ok_or_else(|| D::Error::custom(format!("expected a non-negative count, got {}", n)))
}

type Decoded<T> = Result<Option<T>, serde_json::Error>;

impl Snapshot {
    pub fn status(&self) -> Decoded<Status> {
        self.decode("status")
    }

    pub fn cron(&self) -> Decoded<CronBoard> {
        self.decode("cron")
    }

    pub fn tasks(&self) -> Decoded<Tasks> {
        self.decode("tasks")
    }

    pub fn memory(&self) -> Decoded<MemoryStats> {
        self.decode("memory")
    }

    pub fn analytics(&self) -> Decoded<Analytics> {
        self.decode("analytics")
    }

    pub fn sessions(&self) -> Decoded<Sessions> {
        self.decode("sessions")
    }

    pub fn scores(&self) -> Decoded<Scores> {
        self.decode("scores")
    }

    pub fn agent_stats(&self, id: &str) -> Decoded<AgentStats> {
        self.decode_agent(id)
    }
}
