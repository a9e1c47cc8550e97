use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "thumbkit", version)]
struct Cli {
    /// Optional settings JSON (compositor and editor defaults).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a new, empty template.
    New(NewArgs),
    /// Check a template JSON file.
    Validate(ValidateArgs),
    /// Resolve a template with data into a render plan (JSON).
    Plan(PlanArgs),
    /// Print the background generation request for a template and data record.
    Prompt(PromptArgs),
}

#[derive(Parser, Debug)]
struct NewArgs {
    #[arg(long)]
    id: String,

    #[arg(long)]
    name: String,

    #[arg(long, default_value = "default")]
    pipeline: String,

    /// Add the default `title` text zone.
    #[arg(long)]
    with_title: bool,

    /// Output template path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input template JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input template JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Data record JSON (object of zone name -> string).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Asset root containing `backgrounds/`, `subjects/`, `overlays/`. Without it every reference
    /// is treated as present.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Folder of `.ttf`/`.otf` files, aliased by file stem.
    #[arg(long)]
    fonts: Option<PathBuf>,

    /// Counter for the `rotate` background policy.
    #[arg(long, default_value_t = 0)]
    render_count: u64,

    /// Seed for the `random` background policy.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Background reference overriding the selection policy.
    #[arg(long)]
    background: Option<String>,

    /// Output plan path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PromptArgs {
    /// Input template JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Data record JSON (object of zone name -> string).
    #[arg(long)]
    data: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => thumbkit::Settings::from_json_file(path)?,
        None => thumbkit::Settings::default(),
    };
    match cli.cmd {
        Command::New(args) => cmd_new(args),
        Command::Validate(args) => cmd_validate(args),
        Command::Plan(args) => cmd_plan(args, &settings),
        Command::Prompt(args) => cmd_prompt(args),
    }
}

fn read_template(path: &Path) -> anyhow::Result<thumbkit::Template> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("open template '{}'", path.display()))?;
    let template = thumbkit::Template::from_json(&text)
        .with_context(|| format!("load template '{}'", path.display()))?;
    Ok(template)
}

fn read_data(path: Option<&Path>) -> anyhow::Result<thumbkit::DataRecord> {
    let Some(path) = path else {
        return Ok(thumbkit::DataRecord::new());
    };
    let f = File::open(path).with_context(|| format!("open data '{}'", path.display()))?;
    let data: thumbkit::DataRecord =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse data record JSON")?;
    Ok(data)
}

fn write_json<T: serde::Serialize>(value: &T, out: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(path, json + "\n")
                .with_context(|| format!("write '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

fn cmd_new(args: NewArgs) -> anyhow::Result<()> {
    let mut template = thumbkit::Template::new(args.id, args.name, args.pipeline);
    if args.with_title {
        template.add_text_zone()?;
    }
    template.validate()?;
    write_json(&template, Some(&args.out))
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let template = read_template(&args.in_path)?;
    println!(
        "ok: '{}' ({} zones, {}x{})",
        template.id,
        template.zones.len(),
        template.canvas.width,
        template.canvas.height
    );
    Ok(())
}

fn cmd_plan(args: PlanArgs, settings: &thumbkit::Settings) -> anyhow::Result<()> {
    let template = read_template(&args.in_path)?;
    let data = read_data(args.data.as_deref())?;

    let catalog: Box<dyn thumbkit::AssetCatalog> = match &args.assets {
        Some(root) => Box::new(thumbkit::AssetIndex::scan_dir(root)?),
        None => Box::new(thumbkit::AssumePresent),
    };

    let mut metrics = thumbkit::ParleyMetrics::new();
    if let Some(dir) = &args.fonts {
        let n = metrics.register_dir(dir)?;
        tracing::info!(fonts = n, dir = %dir.display(), "registered fonts");
    }

    let mut ctx = thumbkit::RenderContext::new(catalog.as_ref(), &mut metrics)
        .settings(settings.compositor.clone())
        .render_count(args.render_count)
        .seed(args.seed)
        .background_override(args.background);
    let plan = thumbkit::render(&template, &data, &mut ctx);
    write_json(&plan, args.out.as_deref())
}

fn cmd_prompt(args: PromptArgs) -> anyhow::Result<()> {
    let template = read_template(&args.in_path)?;
    let data = read_data(args.data.as_deref())?;
    let request = template
        .background
        .ai_config
        .generation_request(&data, template.canvas);
    write_json(&request, None)
}
