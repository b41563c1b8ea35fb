use crate::error::{Result, SyncError};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Task classification used for display grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Study,
    Game,
    Other,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Study, Category::Game, Category::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Study => "study",
            Category::Game => "game",
            Category::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Study => "📚 学习",
            Category::Game => "🎮 游戏",
            Category::Other => "📋 其他",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Category::Study => "#198754",
            Category::Game => "#ffc107",
            Category::Other => "#0dcaf0",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "study" => Ok(Category::Study),
            "game" => Ok(Category::Game),
            "other" => Ok(Category::Other),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// Snapshot returned by `/api/current_status`.
///
/// An idle server answers with `{"active": false}` only, so everything but
/// `active` is optional on the wire.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct TrackingStatus {
    pub active: bool,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Danger,
}

/// A toast shown once to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Danger, message)
    }
}

/// Body of `POST /api/start_task`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStartRequest {
    pub task: String,
    pub category: Category,
}

impl TaskStartRequest {
    /// Trims the task name and rejects it if nothing is left.
    pub fn new(task: &str, category: Option<Category>) -> Result<Self> {
        let task = task.trim();
        if task.is_empty() {
            return Err(SyncError::EmptyTaskName);
        }

        Ok(Self {
            task: task.to_string(),
            category: category.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StopResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

/// Hours per category for one day of the stats payload.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct DayStats {
    #[serde(default)]
    pub study: f64,
    #[serde(default)]
    pub game: f64,
    #[serde(default)]
    pub other: f64,
}

impl DayStats {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Study => self.study,
            Category::Game => self.game,
            Category::Other => self.other,
        }
    }

    pub fn total(&self) -> f64 {
        self.study + self.game + self.other
    }
}

/// Typed view over the `/api/stats_data` payload.
///
/// The payload itself stays opaque to the agent; this is only used by callers
/// that want to render it. The server's JSON keys arrive sorted as strings,
/// so days are put back in calendar order, oldest first and today last.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsSummary {
    pub days: Vec<(String, DayStats)>,
    pub total_study: f64,
    pub total_game: f64,
    pub total_other: f64,
    pub max_daily_study: f64,
    pub active_days: u32,
}

impl StatsSummary {
    pub fn from_value(value: &Value) -> Result<Self> {
        Self::from_value_on(value, Local::now().date_naive())
    }

    /// Like `from_value`, with `today` anchoring the `MM-DD` day labels.
    pub fn from_value_on(value: &Value, today: NaiveDate) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| SyncError::Parse("stats payload is not an object".into()))?;

        let mut days = Vec::new();
        if let Some(daily) = object.get("daily_stats").and_then(Value::as_object) {
            for (label, day) in daily {
                let stats: DayStats = serde_json::from_value(day.clone())
                    .map_err(|e| SyncError::Parse(format!("daily_stats[{}]: {}", label, e)))?;
                days.push((label.clone(), stats));
            }
        }
        days.sort_by_key(|(label, _)| std::cmp::Reverse(days_ago(label, today)));

        let number = |key: &str| object.get(key).and_then(Value::as_f64).unwrap_or(0.0);

        Ok(Self {
            days,
            total_study: number("total_study"),
            total_game: number("total_game"),
            total_other: number("total_other"),
            max_daily_study: number("max_daily_study"),
            active_days: object
                .get("active_days")
                .and_then(Value::as_u64)
                .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
                .unwrap_or(0),
        })
    }

    pub fn total(&self, category: Category) -> f64 {
        match category {
            Category::Study => self.total_study,
            Category::Game => self.total_game,
            Category::Other => self.total_other,
        }
    }

    pub fn grand_total(&self) -> f64 {
        self.total_study + self.total_game + self.total_other
    }
}

/// How many days before `today` a stats label refers to.
///
/// Labels are "今天", "昨天" or `MM-DD` of the most recent such date.
/// Unrecognised labels sort as the oldest.
fn days_ago(label: &str, today: NaiveDate) -> i64 {
    match label {
        "今天" => 0,
        "昨天" => 1,
        _ => label
            .split_once('-')
            .and_then(|(month, day)| Some((month.parse::<u32>().ok()?, day.parse::<u32>().ok()?)))
            .and_then(|(month, day)| {
                let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
                match this_year {
                    Some(date) if date <= today => Some(date),
                    _ => NaiveDate::from_ymd_opt(today.year() - 1, month, day),
                }
            })
            .map(|date| (today - date).num_days())
            .unwrap_or(i64::MAX),
    }
}
