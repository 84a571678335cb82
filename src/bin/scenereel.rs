use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use scenereel::{
    AdaptOptions, EnhancerBackend, InputSource, Orchestrator, PipelineConfig, PipelineContext,
    Rgb8, RunState, SceneRenderer, SourceKind,
    collab::{CommandSynthesizer, SilentSynthesizer, SpeechSynthesizer},
    encode::{FfmpegEncoder, KeyframeEncoder, VideoEncoder, keyframes::write_png},
};

#[derive(Parser, Debug)]
#[command(name = "scenereel", version, about = "Narrated videos from documents and scene files")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline on a source.
    Run(RunArgs),
    /// Continue a failed or interrupted run from its first unfinished stage.
    Resume(ResumeArgs),
    /// List saved runs in an output directory.
    Runs(RunsArgs),
    /// Adapt a source and write it back out as YAML scene files.
    Export(ExportArgs),
    /// Render one scene's keyframe as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct SourceArgs {
    /// Markdown file, URL, or YAML scene file.
    source: String,

    /// How to interpret the source.
    #[arg(long, value_enum, default_value_t = KindChoice::Auto)]
    kind: KindChoice,

    /// Upper bound on scenes per video for documents.
    #[arg(long)]
    max_scenes: Option<usize>,

    /// Desired video length in seconds for documents.
    #[arg(long)]
    target_duration: Option<f64>,

    /// One video per level-2 heading for documents.
    #[arg(long)]
    split_by_h2: bool,

    /// Accent color name or #rrggbb.
    #[arg(long)]
    accent: Option<String>,

    /// Voice for every scene.
    #[arg(long)]
    voice: Option<String>,

    /// Derive narration for YAML scenes that have none.
    #[arg(long)]
    auto_narration: bool,
}

#[derive(Parser, Debug)]
struct RunArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// JSON pipeline configuration; flags override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    collab: CollabArgs,

    /// Rewrite narration through the enhancer.
    #[arg(long)]
    enhance: bool,

    /// Enhancer backend; `chat` reads its key from the config or OPENAI_API_KEY.
    #[arg(long, value_enum)]
    enhancer: Option<EnhancerChoice>,

    /// Translate narration to this language (requires --enhance).
    #[arg(long)]
    target_language: Option<String>,
}

#[derive(Parser, Debug)]
struct CollabArgs {
    #[arg(long, value_enum, default_value_t = EncoderChoice::Ffmpeg)]
    encoder: EncoderChoice,

    #[arg(long, value_enum, default_value_t = TtsChoice::Edge)]
    tts: TtsChoice,
}

#[derive(Parser, Debug)]
struct ResumeArgs {
    /// Id printed by `run` or listed by `runs`.
    run_id: Uuid,

    /// Output directory of the original run.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    collab: CollabArgs,
}

#[derive(Parser, Debug)]
struct RunsArgs {
    /// Output directory to look in.
    #[arg(long)]
    out: PathBuf,

    /// Delete runs last updated more than this many days ago.
    #[arg(long)]
    prune_days: Option<i64>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Directory for the YAML files.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Scene id.
    #[arg(long)]
    scene: String,

    /// Video id; defaults to the first video containing the scene.
    #[arg(long)]
    video: Option<String>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Write the start keyframe instead of the end keyframe.
    #[arg(long)]
    start: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindChoice {
    Auto,
    Document,
    Yaml,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EncoderChoice {
    /// MP4 through `ffmpeg` on PATH.
    Ffmpeg,
    /// Keyframe PNGs plus a JSON manifest.
    Keyframes,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EnhancerChoice {
    Local,
    Chat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TtsChoice {
    /// `edge-tts` on PATH.
    Edge,
    /// Silent tracks sized to the narration.
    Silent,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Resume(args) => cmd_resume(args),
        Command::Runs(args) => cmd_runs(args),
        Command::Export(args) => cmd_export(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl SourceArgs {
    fn input(&self) -> InputSource {
        let kind = match self.kind {
            KindChoice::Auto => SourceKind::Auto,
            KindChoice::Document => SourceKind::Document,
            KindChoice::Yaml => SourceKind::Yaml,
        };
        InputSource::from_arg(&self.source, kind)
    }

    fn apply(&self, opts: &mut AdaptOptions) -> anyhow::Result<()> {
        if let Some(n) = self.max_scenes {
            opts.max_scenes = n;
        }
        if let Some(secs) = self.target_duration {
            opts.target_duration = Some(secs);
        }
        if self.split_by_h2 {
            opts.split_by_h2 = true;
        }
        if let Some(accent) = &self.accent {
            opts.accent_color =
                Some(Rgb8::parse(accent).with_context(|| format!("parse --accent '{accent}'"))?);
        }
        if let Some(voice) = &self.voice {
            opts.voice = Some(voice.clone());
        }
        if self.auto_narration {
            opts.auto_narration = true;
        }
        Ok(())
    }

    fn options(&self) -> anyhow::Result<AdaptOptions> {
        let mut opts = AdaptOptions::default();
        self.apply(&mut opts)?;
        Ok(opts)
    }
}

impl CollabArgs {
    fn orchestrator(&self, config: PipelineConfig) -> Orchestrator {
        let tts: Arc<dyn SpeechSynthesizer> = match self.tts {
            TtsChoice::Edge => Arc::new(CommandSynthesizer::edge_tts()),
            TtsChoice::Silent => Arc::new(SilentSynthesizer {
                sample_rate: config.audio.placeholder_sample_rate,
            }),
        };
        let encoder: Arc<dyn VideoEncoder> = match self.encoder {
            EncoderChoice::Ffmpeg => Arc::new(FfmpegEncoder::default()),
            EncoderChoice::Keyframes => Arc::new(KeyframeEncoder),
        };
        Orchestrator::new(config).with_tts(tts).with_encoder(encoder)
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    config.output_dir = args.out.clone();
    args.source.apply(&mut config.adapt)?;
    if args.enhance {
        config.script.enhance = true;
    }
    match args.enhancer {
        Some(EnhancerChoice::Local) => config.script.enhancer = EnhancerBackend::Local,
        Some(EnhancerChoice::Chat) => config.script.enhancer = EnhancerBackend::Chat,
        None => {}
    }
    if let Some(lang) = &args.target_language {
        config.script.target_language = Some(lang.clone());
    }
    config.validate()?;

    let ctx = args
        .collab
        .orchestrator(config)
        .run_blocking(args.source.input())?;
    finish(&ctx)
}

fn cmd_resume(args: ResumeArgs) -> anyhow::Result<()> {
    let config = PipelineConfig {
        output_dir: args.out.clone(),
        ..PipelineConfig::default()
    };
    let ctx = args.collab.orchestrator(config).resume_blocking(args.run_id)?;
    finish(&ctx)
}

fn cmd_runs(args: RunsArgs) -> anyhow::Result<()> {
    let store = scenereel::StateStore::for_output(&args.out);
    let rt = tokio::runtime::Runtime::new().context("start runtime")?;
    if let Some(days) = args.prune_days {
        let removed = rt.block_on(store.cleanup_older_than(chrono::Duration::days(days)))?;
        eprintln!("removed {removed} run(s)");
    }
    for run in rt.block_on(store.list())? {
        let next = run
            .next_stage
            .map_or_else(|| "-".to_string(), |s| s.label().to_string());
        println!(
            "{}  {}  {:?}  next: {next}  {}",
            run.run_id,
            run.updated_at.format("%Y-%m-%d %H:%M:%S"),
            run.state,
            run.source
        );
    }
    Ok(())
}

fn finish(ctx: &PipelineContext) -> anyhow::Result<()> {
    for warning in &ctx.warnings {
        eprintln!("warning: {warning}");
    }
    match &ctx.state {
        RunState::Completed => {
            for artifact in ctx.outputs.values() {
                eprintln!("wrote {}", artifact.path.display());
            }
            Ok(())
        }
        RunState::Aborted { stage, kind, error } => anyhow::bail!(
            "pipeline aborted during {} ({kind:?}): {error}; continue with `scenereel resume {}`",
            stage.label(),
            ctx.run_id
        ),
        other => anyhow::bail!("pipeline ended in unexpected state {other:?}"),
    }
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let opts = args.source.options()?;
    let set = scenereel::adapt_blocking(&args.source.input(), &opts)?;
    let written = scenereel::export(&set, &args.out)?;
    for path in written {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let opts = args.source.options()?;
    let set = scenereel::adapt_blocking(&args.source.input(), &opts)?;
    let video = set
        .videos
        .iter()
        .filter(|v| args.video.as_deref().is_none_or(|id| v.video_id == id))
        .find(|v| v.scene(&args.scene).is_some())
        .with_context(|| format!("no scene '{}' in {}", args.scene, args.source.source))?;
    let scene = video
        .scene(&args.scene)
        .with_context(|| format!("no scene '{}'", args.scene))?;

    let accent = video.accent_color.or(set.defaults.accent_color);
    let pair = SceneRenderer::new().render(scene, accent)?;
    let img = if args.start { &pair.start } else { &pair.end };
    write_png(img, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
