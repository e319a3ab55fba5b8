use std::path::{Path, PathBuf};
use std::sync::Arc;

use adsmith::{
    ArtifactId, ArtifactSink, Catalog, CatalogConfig, DirSink, Mp4SequenceSink, Mp4SinkOpts,
    MasterRequest, PanFrame, PrunePolicy, Raster, RunReport, SourceImage, StaticMasterProvider,
    StillFormat, SystemFontProvider,
};
use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "adsmith", version, about = "Generate ad-creative variants from source images")]
struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate every variant for each image in a directory.
    Generate(GenerateArgs),
    /// Generate variants from a pre-rendered square master image.
    Master(MasterArgs),
    /// Write one panning GIF for a named size.
    Pan(PanArgs),
    /// Print the per-size task counts a run would produce, as JSON.
    Plan(PlanArgs),
    /// Evaluate click/impression records and print keep/prune verdicts as JSON.
    Prune(PruneArgs),
    /// Write the default configuration as JSON.
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Still image encoding.
    #[arg(long, value_enum, default_value_t = FormatChoice::Jpeg)]
    format: FormatChoice,

    /// Also encode pan sequences as MP4 (requires `ffmpeg` on PATH).
    #[arg(long)]
    mp4: bool,

    /// Worker threads (defaults to the configured value, then all cores).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Directory scanned recursively for jpg/png/webp sources.
    #[arg(long)]
    sources: PathBuf,

    /// Configuration JSON (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct MasterArgs {
    /// Pre-rendered square master image.
    #[arg(long)]
    image: PathBuf,

    /// Prompt the master was synthesized from.
    #[arg(long)]
    prompt: String,

    /// Negative prompt.
    #[arg(long, default_value = "")]
    negative_prompt: String,

    /// Seed the master was synthesized with.
    #[arg(long)]
    seed: u64,

    /// Configuration JSON (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct PanArgs {
    /// Master image to pan across.
    #[arg(long)]
    master: PathBuf,

    /// Target size name from the configured catalog.
    #[arg(long)]
    size: String,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// Frame count (defaults to the configured value).
    #[arg(long)]
    frames: Option<u32>,

    /// Configuration JSON (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Directory scanned recursively for jpg/png/webp sources.
    #[arg(long)]
    sources: PathBuf,

    /// Configuration JSON (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PruneArgs {
    /// JSON array of `{id, clicks, impressions}` records.
    #[arg(long)]
    records: PathBuf,

    /// Rate under the null hypothesis.
    #[arg(long, default_value_t = 0.001)]
    target_rate: f64,

    /// Significance level.
    #[arg(long, default_value_t = 0.05)]
    alpha: f64,

    /// Records below this many impressions are reported as insufficient.
    #[arg(long, default_value_t = 1000)]
    min_impressions: u64,
}

#[derive(Parser, Debug)]
struct InitConfigArgs {
    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Jpeg,
    Png,
}

impl From<FormatChoice> for StillFormat {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Jpeg => StillFormat::Jpeg,
            FormatChoice::Png => StillFormat::Png,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Master(args) => cmd_master(args),
        Command::Pan(args) => cmd_pan(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Prune(args) => cmd_prune(args),
        Command::InitConfig(args) => cmd_init_config(args),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CatalogConfig> {
    let cfg = match path {
        Some(p) => CatalogConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => CatalogConfig::default(),
    };
    Ok(cfg)
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(n) = args.output.threads {
        cfg.threads = Some(n);
    }
    let catalog = Catalog::with_system_fonts(cfg)?;
    let paths = adsmith::discover_sources(&args.sources)?;
    if paths.is_empty() {
        anyhow::bail!("no source images found under '{}'", args.sources.display());
    }

    let total = paths
        .iter()
        .filter_map(|p| planned_artifacts(&catalog, p))
        .sum();
    let mut sink = output_sink(&args.output, total);
    let report = catalog.run_paths(&paths, &mut sink)?;
    sink.bar.finish_and_clear();
    write_report(&args.output.out, &report)
}

fn cmd_master(args: MasterArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(n) = args.output.threads {
        cfg.threads = Some(n);
    }
    let catalog = Catalog::with_system_fonts(cfg)?;

    let master = SourceImage::open(&args.image)?;
    let raster: Raster = master.raster().clone();
    let mut request = MasterRequest::new(args.prompt, args.seed);
    request.negative_prompt = args.negative_prompt;
    request.resolution = raster.width();
    let provider = StaticMasterProvider::new(raster);

    let total = catalog
        .plan_dims(&request.source_id(), request.resolution, request.resolution)
        .map(|p| p.tasks.len() as u64)
        .unwrap_or(0);
    let mut sink = output_sink(&args.output, total);
    let report = catalog.run_master(&provider, &request, &mut sink)?;
    sink.bar.finish_and_clear();
    write_report(&args.output.out, &report)
}

fn cmd_pan(args: PanArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let size = cfg
        .sizes
        .get(&args.size)
        .with_context(|| format!("unknown size '{}'", args.size))?;
    let frame_count = args.frames.unwrap_or(cfg.pan.frame_count);

    let master = SourceImage::open(&args.master)?;
    let frames: Vec<PanFrame> = adsmith::generate_pan(master.raster(), size, frame_count)?.collect();
    adsmith::encode::dir::ensure_parent_dir(&args.out)?;
    adsmith::write_gif(&args.out, &frames, cfg.pan.frame_delay_ms)?;
    eprintln!("wrote {} ({} frames)", args.out.display(), frames.len());
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    // Planning never rasterizes text.
    let fonts = Arc::new(SystemFontProvider::builtin_only());
    let catalog = Catalog::new(load_config(args.config.as_deref())?, fonts)?;
    let mut out = Vec::new();
    for path in adsmith::discover_sources(&args.sources)? {
        let (w, h) = image::image_dimensions(&path)
            .with_context(|| format!("read dimensions of '{}'", path.display()))?;
        let plan = catalog.plan_dims(&source_id(&path), w, h)?;
        out.push(serde_json::json!({
            "source": plan.source,
            "canvas": plan.canvas,
            "artifacts": plan.tasks.len(),
            "sizes": plan.summary(),
            "skipped": plan.skipped,
        }));
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_prune(args: PruneArgs) -> anyhow::Result<()> {
    let records = adsmith::load_records(&args.records)?;
    let policy = PrunePolicy {
        target_rate: args.target_rate,
        alpha: args.alpha,
        min_impressions: args.min_impressions,
    };
    let tests = policy.evaluate_all(&records)?;
    println!("{}", serde_json::to_string_pretty(&tests)?);
    Ok(())
}

fn cmd_init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    adsmith::encode::dir::ensure_parent_dir(&args.out)?;
    let text = CatalogConfig::default().to_json_pretty()?;
    std::fs::write(&args.out, text + "\n")
        .with_context(|| format!("write config '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn source_id(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(adsmith::catalog::id::sanitize_component)
        .unwrap_or_default()
}

fn planned_artifacts(catalog: &Catalog, path: &Path) -> Option<u64> {
    let (w, h) = image::image_dimensions(path).ok()?;
    let plan = catalog.plan_dims(&source_id(path), w, h).ok()?;
    Some(plan.tasks.len() as u64)
}

fn output_sink(args: &OutputArgs, total: u64) -> ProgressSink {
    let dir = DirSink::new(&args.out, args.format.into());
    let inner: Box<dyn ArtifactSink> = if args.mp4 {
        Box::new(Mp4SequenceSink::new(dir, Mp4SinkOpts::new(&args.out)))
    } else {
        Box::new(dir)
    };
    ProgressSink::new(inner, total)
}

fn write_report(out: &Path, report: &RunReport) -> anyhow::Result<()> {
    std::fs::create_dir_all(out).with_context(|| format!("create '{}'", out.display()))?;
    let path = out.join("report.json");
    let f = std::fs::File::create(&path)
        .with_context(|| format!("create report '{}'", path.display()))?;
    serde_json::to_writer_pretty(f, report).with_context(|| "write run report")?;

    for failed in report.failed_sources() {
        eprintln!(
            "source {} failed: {}",
            failed.source,
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }
    eprintln!(
        "wrote {} artifacts from {} sources to {} (ids {})",
        report.artifacts,
        report.sources.len(),
        out.display(),
        report.ids_digest
    );
    Ok(())
}

/// Sink decorator advancing a progress bar per artifact.
struct ProgressSink {
    inner: Box<dyn ArtifactSink>,
    bar: ProgressBar,
}

impl ProgressSink {
    fn new(inner: Box<dyn ArtifactSink>, total: u64) -> Self {
        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { inner, bar }
    }

    fn tick(&self, id: &ArtifactId) {
        self.bar.set_message(format!("{}/{}", id.source, id.size));
        self.bar.inc(1);
    }
}

impl ArtifactSink for ProgressSink {
    fn write_still(&mut self, id: &ArtifactId, raster: &Raster) -> adsmith::AdsmithResult<()> {
        self.inner.write_still(id, raster)?;
        self.tick(id);
        Ok(())
    }

    fn write_sequence(
        &mut self,
        id: &ArtifactId,
        frames: &[PanFrame],
        delay_ms: u32,
    ) -> adsmith::AdsmithResult<()> {
        self.inner.write_sequence(id, frames, delay_ms)?;
        self.tick(id);
        Ok(())
    }

    fn finish(&mut self) -> adsmith::AdsmithResult<()> {
        self.inner.finish()
    }
}
