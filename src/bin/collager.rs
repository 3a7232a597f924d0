use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "collager", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a collage document to a PNG.
    Render(RenderArgs),
    /// List the built-in template catalog.
    Templates,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input collage document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Output width in pixels; height follows the document's aspect ratio.
    #[arg(long, default_value_t = 2048)]
    width: u32,

    /// Backend to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Templates => cmd_templates(),
    }
}

fn read_doc_json(path: &Path) -> anyhow::Result<collager::CollageDoc> {
    let f = File::open(path).with_context(|| format!("open document '{}'", path.display()))?;
    let r = BufReader::new(f);
    let doc: collager::CollageDoc =
        serde_json::from_reader(r).with_context(|| "parse collage document JSON")?;
    Ok(doc)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let doc = read_doc_json(&args.in_path)?;
    doc.validate()?;

    let kind = match args.backend {
        BackendChoice::Cpu => collager::BackendKind::Cpu,
    };
    let mut backend = collager::create_backend(kind)?;

    let assets_root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let (editor, scene, store) = collager::instantiate(&doc, assets_root)?;

    let frame = editor.render_final(&scene, &store, args.width, backend.as_mut())?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_templates() -> anyhow::Result<()> {
    for template in collager::TemplateCatalog::builtin().iter() {
        let shape = if template.has_span() {
            "span"
        } else {
            "grid"
        };
        println!(
            "{:<14} {:<14} {}x{}  {} cells ({shape})",
            template.id,
            template.name,
            template.columns(),
            template.rows(),
            template.cells.len(),
        );
    }
    Ok(())
}
