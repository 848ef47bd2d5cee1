//! ffmpeg `-progress` output parsing

/// Running state accumulated from `key=value` progress lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FfmpegProgress {
    /// Output timestamp reached, in microseconds
    pub out_time_us: i64,
    pub frame: u64,
    /// Encoding speed relative to realtime
    pub speed: f64,
    pub is_complete: bool,
}

impl FfmpegProgress {
    pub fn out_time_seconds(&self) -> f64 {
        self.out_time_us as f64 / 1_000_000.0
    }

    /// Fraction of `total_seconds` rendered so far
    pub fn fraction(&self, total_seconds: f64) -> f64 {
        if self.is_complete {
            return 1.0;
        }
        if total_seconds <= 0.0 {
            return 0.0;
        }
        (self.out_time_seconds() / total_seconds).clamp(0.0, 1.0)
    }
}

/// What a single stderr line turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum StderrLine {
    /// A progress block ended; carries the state so far
    Progress(FfmpegProgress),
    /// Part of a progress block still being read
    ProgressField,
    /// Ordinary diagnostic output
    Diagnostic,
}

/// Feed one stderr line into `current`.
///
/// Both `out_time_us` and `out_time_ms` are microsecond values in
/// ffmpeg's progress output.
pub fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> StderrLine {
    let Some((key, value)) = line.trim().split_once('=') else {
        return StderrLine::Diagnostic;
    };

    match key {
        "out_time_us" | "out_time_ms" => {
            if let Ok(us) = value.parse::<i64>() {
                current.out_time_us = us.max(0);
            }
        }
        "frame" => {
            if let Ok(frame) = value.parse() {
                current.frame = frame;
            }
        }
        "speed" => {
            if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                current.speed = speed;
            }
        }
        "progress" => {
            if value == "end" {
                current.is_complete = true;
            }
            return StderrLine::Progress(current.clone());
        }
        "fps" | "bitrate" | "total_size" | "out_time" | "dup_frames" | "drop_frames" => {}
        _ if key.starts_with("stream_") => {}
        _ => return StderrLine::Diagnostic,
    }

    StderrLine::ProgressField
}
