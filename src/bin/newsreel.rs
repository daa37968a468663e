use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use newsreel::{
    CancelToken, ClipRenderer, FontSystem, PngSequenceSink, RenderThreading, TemplateConfig,
    TemplateFaces, build_cards, read_script,
};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "newsreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Log layout decisions and per-card timing.
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every item of a script as a PNG frame sequence.
    Render(RenderArgs),
    /// Render a single frame of one card as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct TemplateArgs {
    /// News script (items separated by blank lines).
    #[arg(long)]
    script: PathBuf,

    /// Template JSON; defaults to the built-in portrait template.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Use the 1080x1080 preset as the base template.
    #[arg(long)]
    square: bool,

    /// Directory searched for the template's font files.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,

    /// Also index the system fonts (for family lookups).
    #[arg(long)]
    system_fonts: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    template: TemplateArgs,

    /// Output directory; every item gets its own `video_NN` subdirectory.
    #[arg(long)]
    out: PathBuf,

    /// Worker threads (defaults to one per core).
    #[arg(long)]
    threads: Option<usize>,

    /// Render frames on the calling thread only.
    #[arg(long)]
    sequential: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    template: TemplateArgs,

    /// Item number (1-based, as in the output directory names).
    #[arg(long, default_value_t = 1)]
    item: usize,

    /// Card index within the item (0 is the opening card).
    #[arg(long, default_value_t = 0)]
    card: usize,

    /// Frame index within the card (0-based).
    #[arg(long)]
    frame: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn load_template(args: &TemplateArgs) -> anyhow::Result<TemplateConfig> {
    let config = match &args.template {
        Some(path) => TemplateConfig::from_json_file(path)
            .with_context(|| format!("load template '{}'", path.display()))?,
        None if args.square => TemplateConfig::square(),
        None => TemplateConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn load_fonts(args: &TemplateArgs, config: &TemplateConfig) -> anyhow::Result<TemplateFaces> {
    let fonts = FontSystem::new();
    if let Some(dir) = &args.fonts_dir {
        fonts.load_fonts_dir(dir);
    } else if let Some(parent) = args.script.parent() {
        // fonts usually sit next to the script
        let dir = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        fonts.load_fonts_dir(dir);
    }
    if args.system_fonts {
        fonts.load_system_fonts();
    }
    log::debug!("{} font faces indexed", fonts.len());

    TemplateFaces::resolve(&fonts, config).context("resolve template fonts")
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = load_template(&args.template)?;
    let faces = load_fonts(&args.template, &config)?;
    let items = read_script(&args.template.script)
        .with_context(|| format!("read script '{}'", args.template.script.display()))?;

    let threading = RenderThreading {
        parallel: !args.sequential,
        threads: args.threads,
        ..RenderThreading::default()
    };
    let renderer = ClipRenderer::new(threading, CancelToken::new())?;

    let mut failed = 0;
    for (index, item) in items.iter().enumerate() {
        let dir = args.out.join(format!("video_{:02}", index + 1));
        let result = build_cards(item, &config, &faces)
            .and_then(|cards| {
                let mut sink = PngSequenceSink::new(&dir);
                renderer.render_clip(&cards, config.canvas, config.fps, config.background, &mut sink)
            });

        match result {
            Ok(stats) => log::info!(
                "{:?}: {} cards, {} frames -> {}",
                item.title,
                stats.cards,
                stats.frames,
                dir.display()
            ),
            Err(e) => {
                failed += 1;
                log::error!("{:?} failed: {e}", item.title);
            }
        }
    }

    if failed == items.len() {
        anyhow::bail!("all {failed} items failed");
    }
    if failed > 0 {
        log::warn!("{failed} of {} items failed", items.len());
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let config = load_template(&args.template)?;
    let faces = load_fonts(&args.template, &config)?;
    let items = read_script(&args.template.script)?;

    let item = args
        .item
        .checked_sub(1)
        .and_then(|index| items.get(index))
        .with_context(|| format!("script has no item {}", args.item))?;
    let cards = build_cards(item, &config, &faces)?;
    let card = cards
        .get(args.card)
        .with_context(|| format!("item {} has only {} cards", args.item, cards.len()))?;
    if args.frame >= card.total_frames() {
        anyhow::bail!(
            "card {} has {} frames; frame {} is out of range",
            args.card,
            card.total_frames(),
            args.frame
        );
    }

    let frame = card.animator(config.background).render_frame(args.frame);
    create_parent(&args.out)?;
    frame
        .into_image()?
        .save(&args.out)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    log::info!("wrote {}", args.out.display());
    Ok(())
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
