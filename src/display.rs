use crate::format::{calculate_percentage, format_duration};
use crate::models::{Category, Notification, NotificationKind, StatsSummary, TrackingStatus};
use std::fmt;
use std::io::Write;

/// What the navbar badge shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Badge {
    Active { label: String, minutes: f64 },
    Idle,
}

impl Badge {
    pub fn from_status(status: &TrackingStatus) -> Self {
        if !status.active {
            return Badge::Idle;
        }

        let label = status
            .category
            .map(|c| c.label().to_string())
            .unwrap_or_else(|| "undefined".to_string());

        Badge::Active {
            label,
            minutes: status.duration,
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Badge::Active { label, minutes } => write!(f, "▶ {} - {}分钟", label, minutes),
            Badge::Idle => f.write_str("⏸ 空闲"),
        }
    }
}

/// Surface the agent renders into: the status badge and toast notifications.
pub trait StatusDisplay: Send + Sync {
    fn render_badge(&self, badge: &Badge);

    fn show_toast(&self, notification: &Notification);
}

/// Writes the badge and toasts as lines on stdout.
#[derive(Default)]
pub struct TerminalDisplay;

impl TerminalDisplay {
    fn write_line(line: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line).and_then(|_| stdout.flush()) {
            tracing::warn!("Failed to write to stdout: {}", e);
        }
    }
}

fn toast_icon(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Success => "✔",
        NotificationKind::Danger => "✖",
        NotificationKind::Warning => "⚠",
        NotificationKind::Info => "ℹ",
    }
}

impl StatusDisplay for TerminalDisplay {
    fn render_badge(&self, badge: &Badge) {
        Self::write_line(&format!("[状态] {}", badge));
    }

    fn show_toast(&self, notification: &Notification) {
        Self::write_line(&format!(
            "{} {}",
            toast_icon(notification.kind),
            notification.message
        ));
    }
}

/// Plain-text rendering of a stats payload: one line per day, then totals
/// with each category's share.
pub fn stats_report(summary: &StatsSummary) -> String {
    let mut lines = Vec::with_capacity(summary.days.len() + Category::ALL.len() + 2);

    for (label, day) in &summary.days {
        let parts: Vec<String> = Category::ALL
            .iter()
            .map(|c| format!("{} {:.1}h", c.label(), day.get(*c)))
            .collect();
        lines.push(format!("{:>6}  {}", label, parts.join("  ")));
    }

    let total = summary.grand_total();
    for category in Category::ALL {
        let hours = summary.total(category);
        lines.push(format!(
            "{}: {} ({}%)",
            category.label(),
            format_duration(hours * 60.0),
            calculate_percentage(hours, total)
        ));
    }

    lines.push(format!(
        "活跃天数: {}  单日最长学习: {:.1}h",
        summary.active_days, summary.max_daily_study
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_badge() {
        let status = TrackingStatus {
            active: true,
            category: Some(Category::Game),
            duration: 12.0,
            task: None,
            start_time: None,
        };

        let badge = Badge::from_status(&status);
        assert_eq!(
            badge,
            Badge::Active {
                label: "🎮 游戏".into(),
                minutes: 12.0
            }
        );
        assert_eq!(badge.to_string(), "▶ 🎮 游戏 - 12分钟");
    }

    #[test]
    fn test_fractional_minutes() {
        let status = TrackingStatus {
            active: true,
            category: Some(Category::Study),
            duration: 7.5,
            task: None,
            start_time: None,
        };
        assert_eq!(Badge::from_status(&status).to_string(), "▶ 📚 学习 - 7.5分钟");
    }

    #[test]
    fn test_idle_badge() {
        let badge = Badge::from_status(&TrackingStatus::default());
        assert_eq!(badge, Badge::Idle);
        assert_eq!(badge.to_string(), "⏸ 空闲");
    }

    #[test]
    fn test_stats_report() {
        let summary = StatsSummary {
            days: vec![(
                "今天".into(),
                crate::models::DayStats {
                    study: 1.5,
                    game: 0.5,
                    other: 0.0,
                },
            )],
            total_study: 1.5,
            total_game: 0.5,
            total_other: 0.0,
            max_daily_study: 1.5,
            active_days: 1,
        };

        let report = stats_report(&summary);
        let lines: Vec<_> = report.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("📚 学习 1.5h"));
        assert_eq!(lines[1], "📚 学习: 1 小时 30 分钟 (75%)");
        assert_eq!(lines[2], "🎮 游戏: 30.0 分钟 (25%)");
        assert_eq!(lines[3], "📋 其他: 0.0 分钟 (0%)");
        assert_eq!(lines[4], "活跃天数: 1  单日最长学习: 1.5h");
    }
}
