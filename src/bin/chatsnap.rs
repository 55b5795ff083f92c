use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "chatsnap", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a chat request JSON into a PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input request JSON (`{"messages": [...]}`).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Render config JSON; missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Font file overriding the configured one.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Draw solid blocks instead of glyphs; needs no fonts.
    #[arg(long)]
    block_glyphs: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
    }
}

fn load_config(args: &RenderArgs) -> anyhow::Result<chatsnap::RenderConfig> {
    let cfg = match &args.config {
        Some(path) => chatsnap::RenderConfig::from_path(path)?,
        None => chatsnap::RenderConfig::default(),
    };
    let mut cfg = cfg.with_env_overrides();
    if let Some(font) = &args.font {
        cfg.font_path = Some(font.clone());
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;

    let renderer = if args.block_glyphs {
        let fetcher = chatsnap::HttpAvatarFetcher::from_config(&cfg)?;
        chatsnap::Renderer::new(cfg, Arc::new(chatsnap::BlockFace), Arc::new(fetcher))?
    } else {
        chatsnap::Renderer::from_config(cfg)?
    };

    let body = std::fs::read(&args.in_path)
        .with_context(|| format!("read request '{}'", args.in_path.display()))?;
    let png = renderer.render_json(&body)?;

    let (w, h) = image::ImageReader::new(Cursor::new(&png))
        .with_guessed_format()
        .context("inspect rendered png")?
        .into_dimensions()
        .context("read rendered png dimensions")?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} ({w}x{h})", args.out.display());
    Ok(())
}
