//! Command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::adapters::AppConfig;
use crate::app::{AppContainer, RotationOutcome};
use crate::cli::args::{
    AddClipArgs, DaySelector, HistoryArgs, PlanArgs, RotateArgs, SetOutputArgs, StatusArgs,
    StitchArgs,
};
use crate::domain::calendar::WeekCalendar;
use crate::domain::model::{ClipDescriptor, DayIndex, WeekRecord};
use crate::utils::{format_file_size, format_seconds};

/// Execute the status command
pub async fn status(container: &dyn AppContainer, args: StatusArgs) -> Result<()> {
    let store = container.clip_store();
    let week = store.current_week().await;
    let today = store.today_index();
    let threshold = store.policy().threshold();

    if args.json {
        let days: Vec<_> = DayIndex::all()
            .map(|day| {
                json!({
                    "day": day.value(),
                    "name": day.short_name(),
                    "captured": week.clip(day).is_some(),
                    "today": day == today,
                })
            })
            .collect();
        let view = json!({
            "weekId": week.week_id(),
            "range": WeekCalendar::range_label(week.start_date()),
            "clips": week.clip_count(),
            "threshold": threshold,
            "status": week.status().label(),
            "outputPath": week.generated_output_path(),
            "days": days,
            "onboardingDone": store.onboarding_done().await,
        });
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!(
        "{}  ({})",
        week.week_id(),
        WeekCalendar::range_label(week.start_date())
    );
    println!("{}", day_markers(&week, today));
    println!(
        "{}/{} clips  status: {}",
        week.clip_count(),
        threshold,
        week.status().label()
    );
    if let Some(path) = week.generated_output_path() {
        println!("film: {}", path.display());
    }
    if !store.has_clip_today().await {
        println!("No clip recorded today yet.");
    }
    Ok(())
}

/// One marker per day: `[x]` captured, `[ ]` missing, `<>` around today
fn day_markers(week: &WeekRecord, today: DayIndex) -> String {
    DayIndex::all()
        .map(|day| {
            let mark = if week.clip(day).is_some() { 'x' } else { ' ' };
            if day == today {
                format!("{}<{}>", day.short_name(), mark)
            } else {
                format!("{}[{}]", day.short_name(), mark)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Execute the add-clip command
pub async fn add_clip(
    container: &dyn AppContainer,
    config: &AppConfig,
    args: AddClipArgs,
) -> Result<()> {
    if !args.file.is_file() {
        anyhow::bail!("Clip file does not exist: {}", args.file.display());
    }
    let path = std::fs::canonicalize(&args.file)
        .with_context(|| format!("Failed to resolve {}", args.file.display()))?;

    let store = container.clip_store();
    let day = match args.day {
        DaySelector::Today => store.today_index(),
        DaySelector::Day(day) => day,
    };
    let duration = args.duration.unwrap_or(config.capture.clip_seconds);
    let captured_at = args.captured_at.unwrap_or_else(Utc::now);

    let clip = ClipDescriptor::new(day, captured_at, path, duration).context("Invalid clip")?;
    let added = store.add_clip(clip).await;

    info!(week = %added.week_id, day = day.value(), "Clip recorded");
    println!(
        "{} {}: clip {} ({})",
        added.week_id,
        day.short_name(),
        if added.replaced { "replaced" } else { "added" },
        added.status.label()
    );
    println!("{}/{} clips", added.clip_count, store.policy().threshold());
    Ok(())
}

/// Execute the rotate command
pub async fn rotate(container: &dyn AppContainer, args: RotateArgs) -> Result<()> {
    let store = container.clip_store();
    let outcome = if args.force {
        store.force_rotate().await
    } else {
        store.rotate_if_necessary().await
    };

    match outcome {
        RotationOutcome::Unchanged => println!("Current week is up to date"),
        RotationOutcome::Rotated {
            retired,
            archived,
            evicted,
            current,
        } => {
            if archived {
                println!("Archived {}", retired);
            } else {
                println!("Dropped empty week {}", retired);
            }
            if let Some(evicted) = evicted {
                println!("Evicted {} from history", evicted);
            }
            println!("Current week: {}", current);
        }
    }
    Ok(())
}

/// Execute the plan command
pub async fn plan(container: &dyn AppContainer, args: PlanArgs) -> Result<()> {
    let plan = container
        .stitch_interactor()
        .plan(args.week.as_ref(), args.audio.as_deref())
        .await?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

/// Execute the stitch command. Ctrl-C cancels the render.
pub async fn stitch(container: &dyn AppContainer, args: StitchArgs) -> Result<()> {
    let stitcher = container.stitch_interactor();
    if !stitcher.is_backend_available().await {
        warn!("ffmpeg was not found; the render will fail");
    }

    let handle = stitcher
        .start(args.week.as_ref(), args.audio.as_deref())
        .await?;
    info!(week = %handle.week_id(), "Rendering");

    let mut progress = handle.progress();
    let reporter = tokio::spawn(async move {
        let mut last_percent = None;
        while progress.changed().await.is_ok() {
            let percent = (*progress.borrow_and_update() * 100.0).floor() as u32;
            if last_percent != Some(percent) {
                eprint!("\rRendering... {:>3}%", percent);
                last_percent = Some(percent);
            }
        }
    });

    let cancel = handle.cancel_signal();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling render");
            cancel.cancel();
        }
    });

    let result = handle.wait().await;
    interrupt.abort();
    let _ = reporter.await;
    eprintln!();

    let path = result?;
    match std::fs::metadata(&path) {
        Ok(meta) => println!("{} ({})", path.display(), format_file_size(meta.len())),
        Err(_) => println!("{}", path.display()),
    }
    Ok(())
}

/// Execute the history command
pub async fn history(container: &dyn AppContainer, args: HistoryArgs) -> Result<()> {
    let weeks = container.clip_store().history().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&weeks)?);
        return Ok(());
    }

    if weeks.is_empty() {
        println!("No past weeks");
        return Ok(());
    }
    for week in &weeks {
        let length: f64 = week.clips().map(|c| c.duration_seconds()).sum();
        print!(
            "{}  ({})  {} clips, {}  {}",
            week.week_id(),
            WeekCalendar::range_label(week.start_date()),
            week.clip_count(),
            format_seconds(length),
            week.status().label()
        );
        match week.generated_output_path() {
            Some(path) => println!("  {}", path.display()),
            None => println!(),
        }
    }
    Ok(())
}

/// Execute the set-output command
pub async fn set_output(container: &dyn AppContainer, args: SetOutputArgs) -> Result<()> {
    if !args.path.is_file() {
        warn!("Film does not exist yet: {}", args.path.display());
    }
    container
        .clip_store()
        .set_generated_output(&args.week, absolute(&args.path))
        .await?;
    println!("{} -> {}", args.week, args.path.display());
    Ok(())
}

/// Execute the onboard command
pub async fn onboard(container: &dyn AppContainer) -> Result<()> {
    let store = container.clip_store();
    if store.onboarding_done().await {
        println!("Onboarding already complete");
    } else {
        store.complete_onboarding().await;
        println!("Onboarding complete");
    }
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            debug!("Keeping relative path {}: {}", path.display(), e);
            path.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_day_markers() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        let mut week = WeekRecord::empty_for(date);
        let policy = crate::domain::rules::EligibilityPolicy::new(7).unwrap();
        let clip =
            ClipDescriptor::new(DayIndex::new(0).unwrap(), Utc::now(), "/c/0.mp4", 1.5).unwrap();
        week.insert_clip(clip, &policy);

        let markers = day_markers(&week, DayIndex::new(2).unwrap());
        assert!(markers.starts_with("Mon[x] Tue[ ] Wed< >"));
    }
}
