//! ffmpeg command line and filter graph rendering

use std::path::{Path, PathBuf};

use crate::planner::{AudioMixPlan, ColorGrade, StitchPlan, TransformSpec, TransformStep};

/// Encoder settings applied to every stitch
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSettings {
    pub video_codec: String,
    pub crf: u8,
    pub preset: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    /// Encoder threads; 0 lets ffmpeg decide
    pub threads: usize,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            crf: 23,
            preset: "medium".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            threads: num_cpus::get(),
        }
    }
}

/// One ffmpeg input with the options that precede its `-i`
#[derive(Debug, Clone)]
struct Input {
    options: Vec<String>,
    path: PathBuf,
}

/// Builder for multi-input ffmpeg commands
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    inputs: Vec<Input>,
    output_args: Vec<String>,
    output: PathBuf,
    log_level: String,
}

impl FfmpegCommand {
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output_args: Vec::new(),
            output: output.as_ref().to_path_buf(),
            log_level: "error".to_string(),
        }
    }

    /// Add an input file
    pub fn input(self, path: impl AsRef<Path>) -> Self {
        self.input_with(Vec::<String>::new(), path)
    }

    /// Add an input file preceded by per-input options
    pub fn input_with<I, S>(mut self, options: I, path: impl AsRef<Path>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.push(Input {
            options: options.into_iter().map(Into::into).collect(),
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn filter_complex(self, graph: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(graph)
    }

    pub fn map(self, label: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(label)
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Full argument list; the output path is always last
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-v".to_string(),
            self.log_level.clone(),
            "-progress".to_string(),
            "pipe:2".to_string(),
            "-nostats".to_string(),
        ];

        for input in &self.inputs {
            args.extend(input.options.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());
        args
    }
}

/// Render a whole plan into a command writing to `output`
pub fn stitch_command(plan: &StitchPlan, encoder: &EncoderSettings, output: &Path) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(output);
    for transform in plan.transforms() {
        cmd = cmd.input(&transform.source_path);
    }
    if let Some(audio) = plan.audio() {
        // Loop forever; the graph trims to the exact length
        cmd = cmd.input_with(["-stream_loop", "-1"], &audio.source_path);
    }

    cmd = cmd.filter_complex(filter_graph(plan)).map("[vout]");
    if plan.audio().is_some() {
        cmd = cmd.map("[aout]").output_args([
            "-c:a".to_string(),
            encoder.audio_codec.clone(),
            "-b:a".to_string(),
            encoder.audio_bitrate.clone(),
        ]);
    } else {
        cmd = cmd.output_arg("-an");
    }

    cmd = cmd.output_args([
        "-c:v".to_string(),
        encoder.video_codec.clone(),
        "-crf".to_string(),
        encoder.crf.to_string(),
        "-preset".to_string(),
        encoder.preset.clone(),
        "-r".to_string(),
        plan.profile().frame_rate.to_string(),
    ]);
    if encoder.threads > 0 {
        cmd = cmd.output_args(["-threads".to_string(), encoder.threads.to_string()]);
    }

    cmd.output_args([
        "-t".to_string(),
        format!("{:.3}", plan.output_duration_seconds()),
        "-movflags".to_string(),
        "+faststart".to_string(),
        "-f".to_string(),
        "mp4".to_string(),
    ])
}

/// `filter_complex` graph: one chain per clip, a concat, and the audio bed
pub fn filter_graph(plan: &StitchPlan) -> String {
    let mut chains: Vec<String> = plan.transforms().iter().map(clip_chain).collect();

    let labels: String = plan
        .transforms()
        .iter()
        .map(|t| format!("[v{}]", t.input_index))
        .collect();
    chains.push(format!(
        "{}concat=n={}:v=1:a=0[vout]",
        labels,
        plan.transforms().len()
    ));

    if let Some(audio) = plan.audio() {
        chains.push(audio_chain(audio));
    }

    chains.join(";")
}

fn clip_chain(transform: &TransformSpec) -> String {
    let mut filters = vec![format!(
        "trim=duration={:.3}",
        transform.source_duration_seconds
    )];
    filters.extend(transform.steps.iter().map(render_step));

    format!(
        "[{}:v]{}[v{}]",
        transform.input_index,
        filters.join(","),
        transform.input_index
    )
}

fn render_step(step: &TransformStep) -> String {
    match step {
        TransformStep::FitFrame { width, height } => format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2",
            w = width,
            h = height
        ),
        TransformStep::SquarePixels => "setsar=1".to_string(),
        TransformStep::Stretch { factor } => format!("setpts={:.4}*(PTS-STARTPTS)", factor),
        TransformStep::FrameRate { fps } => format!("fps={}", fps),
        TransformStep::PixelFormat { format } => format!("format={}", format),
        TransformStep::Grade(grade) => render_grade(grade),
    }
}

fn render_grade(grade: &ColorGrade) -> String {
    let mut filters = vec![
        format!("eq=saturation={:.3}", grade.saturation),
        format!("vignette=angle={:.6}", grade.vignette_angle),
    ];
    if grade.grain_strength > 0 {
        filters.push(format!("noise=alls={}:allf=t", grade.grain_strength));
    }
    filters.join(",")
}

fn audio_chain(audio: &AudioMixPlan) -> String {
    format!(
        "[{}:a]atrim=duration={:.3},asetpts=PTS-STARTPTS,volume={:.3}[aout]",
        audio.input_index, audio.target_duration_seconds, audio.volume
    )
}
