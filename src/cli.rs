use crate::config::load_config;
use crate::ir::{Person, Register};
use crate::layout::compute_layout;
use crate::layout_dump::{write_layout_dump, write_layout_json};
use crate::parser::parse_register;
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::{render_svg, write_output_svg};
use crate::search::search_persons;
use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "famtree", version, about = "Family tree layout engine")]
pub struct Args {
    /// Register file (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout except for PNG.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Config JSON file (layout constants, scope depths, themeVariables)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Center the tree on this person id
    #[arg(long = "focus")]
    pub focus: Option<String>,

    /// Only lay out persons tagged with this family id
    #[arg(long = "family")]
    pub family: Option<String>,

    /// Print persons whose name contains this text instead of a layout
    #[arg(long = "search")]
    pub search: Option<String>,

    /// Pretty-print JSON output
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// More logging on stderr (repeat for more)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Svg,
    Png,
    Dump,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;

    let input = read_input(args.input.as_deref())?;
    let parsed = parse_register(&input)?;
    if !parsed.warnings.is_empty() {
        tracing::info!(skipped = parsed.warnings.len(), "register had unusable relationships");
    }
    let register = select_family(parsed.register, args.family.as_deref());

    if let Some(query) = args.search.as_deref() {
        let matches = search_persons(&register.persons, query);
        return write_search_results(&matches, args.output.as_deref(), args.pretty);
    }

    let layout = compute_layout(&register, args.focus.as_deref(), &config.layout);
    match args.output_format {
        OutputFormat::Json => write_layout_json(&layout, args.output.as_deref(), args.pretty)?,
        OutputFormat::Dump => write_layout_dump(&layout, args.output.as_deref())?,
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &config.theme, &config.layout);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&layout, &config.theme, &config.layout);
            write_png(&svg, &output, &config.render)?;
        }
    }
    Ok(())
}

fn level_for(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_tracing(verbose: u8) {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level_for(verbose))
        .with_target(false)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn select_family(register: Register, family: Option<&str>) -> Register {
    match family {
        Some(family) => {
            let restricted = register.restrict_to_family(family);
            if restricted.persons.is_empty() {
                tracing::warn!(family, "no persons tagged with family");
            }
            restricted
        }
        None => register,
    }
}

fn write_search_results(matches: &[&Person], output: Option<&Path>, pretty: bool) -> Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    if pretty {
        serde_json::to_writer_pretty(&mut writer, matches)?;
    } else {
        serde_json::to_writer(&mut writer, matches)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, render: &crate::config::RenderConfig) -> Result<()> {
    write_output_png(svg, output, render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _render: &crate::config::RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
