use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use wavyte_lottie::{
    AnimationComponent, AnimationConfig, BackendKind, ComponentEvent, DisplayNode, DocumentSource,
    FrameClock, LottieAnimation,
};

#[derive(Parser, Debug)]
#[command(name = "wavyte-lottie", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print timing, size and layer names of a document.
    Info(InfoArgs),
    /// Play a document on a simulated frame clock and write every published frame as a PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input Lottie JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input Lottie JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory the PNG frames are written to.
    #[arg(long)]
    out_dir: PathBuf,

    /// Backend to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Raster)]
    backend: BackendChoice,

    /// Output width in pixels.
    #[arg(long, default_value_t = 500)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 500)]
    height: u32,

    /// Number of clock ticks to drive (defaults to the document length).
    #[arg(long)]
    frames: Option<u64>,

    /// Wrap around after the last frame.
    #[arg(long = "loop")]
    looping: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Markup,
    Raster,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let doc = wavyte_lottie::load_document(&DocumentSource::File(args.in_path.clone()))
        .with_context(|| format!("load '{}'", args.in_path.display()))?;
    let t = doc.timing();
    println!("frame rate:   {}", t.frame_rate.as_f64());
    println!("in point:     {}", t.in_point);
    println!("out point:    {}", t.out_point);
    println!("total frames: {}", t.total_frames);
    println!("duration:     {:.3}s", t.duration_secs());
    println!("size:         {}x{}", t.width, t.height);
    println!("layers:");
    for name in LottieAnimation::new(&doc).layer_names() {
        println!("  {name}");
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let backend = match args.backend {
        BackendChoice::Markup => BackendKind::Markup,
        BackendChoice::Raster => BackendKind::Raster,
    };
    let config = AnimationConfig::default()
        .with_file(&args.in_path)
        .with_size(args.width, args.height)
        .with_loop(args.looping)
        .with_backend(backend);

    let clock = FrameClock::new();
    let node = DisplayNode::new();
    let component = AnimationComponent::new(config, &clock, &node)?;
    match component.wait_ready(Duration::from_secs(60)) {
        Some(ComponentEvent::Ready) => {}
        Some(ComponentEvent::Failed(e)) => return Err(e.into()),
        None => anyhow::bail!("animation did not become ready within 60s"),
    }
    component.start()?;

    let timing = component
        .timing()
        .context("ready component has no document timing")?;
    let frames = args.frames.unwrap_or(timing.total_frames);
    let frame_secs = timing.frame_rate.frame_duration_secs();

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let mut last_generation = 0;
    for tick in 0..frames {
        clock.tick(tick as f64 * frame_secs);
        if node.generation() == last_generation {
            continue;
        }
        last_generation = node.generation();
        let Some(texture) = node.texture() else {
            continue;
        };
        let out = args
            .out_dir
            .join(format!("frame_{:05}.png", component.current_frame().0));
        image::save_buffer_with_format(
            &out,
            &texture.to_straight_rgba8(),
            texture.width,
            texture.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write '{}'", out.display()))?;
    }

    let stats = component.stats();
    component.destroy();
    eprintln!(
        "ticks: {} rendered: {} skipped: {} failed: {} -> {}",
        stats.ticks,
        stats.rendered,
        stats.skipped,
        stats.failed,
        args.out_dir.display()
    );
    Ok(())
}
