//! Command-line argument definitions

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::Args;

use crate::domain::model::{DayIndex, WeekId};

/// Which day a clip belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySelector {
    /// Today's day of the week
    Today,
    Day(DayIndex),
}

impl FromStr for DaySelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("today") {
            return Ok(DaySelector::Today);
        }
        let value: i64 = s
            .parse()
            .map_err(|_| format!("expected 0..6 or 'today', got '{}'", s))?;
        DayIndex::new(value)
            .map(DaySelector::Day)
            .map_err(|e| e.to_string())
    }
}

fn parse_week(s: &str) -> Result<WeekId, String> {
    WeekId::parse(s).map_err(|e| e.to_string())
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the add-clip command
#[derive(Args, Debug)]
pub struct AddClipArgs {
    /// Recorded clip file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Day of the week, 0 = Monday .. 6 = Sunday, or "today"
    #[arg(short, long, default_value = "today")]
    pub day: DaySelector,

    /// Clip duration in seconds (default from [capture] clip_seconds)
    #[arg(long)]
    pub duration: Option<f64>,

    /// Capture time as RFC 3339 (default: now)
    #[arg(long)]
    pub captured_at: Option<DateTime<Utc>>,
}

/// Arguments for the rotate command
#[derive(Args, Debug)]
pub struct RotateArgs {
    /// Retire the current week even if it has not ended
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Week to plan, e.g. 2026-W02 (default: current week)
    #[arg(short, long, value_parser = parse_week)]
    pub week: Option<WeekId>,

    /// Background track (default from [audio] track)
    #[arg(short, long)]
    pub audio: Option<PathBuf>,
}

/// Arguments for the stitch command
#[derive(Args, Debug)]
pub struct StitchArgs {
    /// Week to render, e.g. 2026-W02 (default: current week)
    #[arg(short, long, value_parser = parse_week)]
    pub week: Option<WeekId>,

    /// Background track (default from [audio] track)
    #[arg(short, long)]
    pub audio: Option<PathBuf>,
}

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the set-output command
#[derive(Args, Debug)]
pub struct SetOutputArgs {
    /// Week the film belongs to, e.g. 2026-W02
    #[arg(short, long, value_parser = parse_week)]
    pub week: WeekId,

    /// Rendered film
    #[arg(short, long)]
    pub path: PathBuf,
}
