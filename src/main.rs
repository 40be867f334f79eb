//! folio - render annotated document trees as text

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, debug};

use folio::ir::TreeNode;
use folio::resolve::{attach_bibliography, attach_index};
use folio::{Document, Exporter, LayoutEngine, RenderConfig, Result, Terms};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Render annotated document trees as text", long_about = None)]
#[command(after_help = "EXAMPLES:
    folio draft.json                 Render to stdout at 80 columns
    folio -w 72 --ansi draft.json    Narrower output with terminal styling
    parser draft.md | folio --lang de")]
struct Cli {
    /// JSON document tree (reads stdin if omitted)
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// Wrap width in columns
    #[arg(short, long, default_value_t = RenderConfig::DEFAULT_WIDTH)]
    width: usize,

    /// Style output with ANSI escape codes
    #[arg(long)]
    ansi: bool,

    /// Language of generated section headers
    #[arg(long, value_name = "TAG", default_value = "en")]
    lang: String,

    /// Do not add a bibliography
    #[arg(long)]
    no_bibliography: bool,

    /// Do not add an index
    #[arg(long)]
    no_index: bool,

    /// Log resolver and layout decisions
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let input = read_input(cli.input.as_deref())?;
    let tree: TreeNode = serde_json::from_str(&input)?;
    let mut doc = Document::from_tree(tree);

    if !cli.no_bibliography && !attach_bibliography(&mut doc) {
        debug!("no bibliography added");
    }
    if !cli.no_index && !attach_index(&mut doc) {
        debug!("no index added");
    }

    let config = RenderConfig::default()
        .with_width(cli.width)
        .with_ansi(cli.ansi)
        .with_terms(Terms::for_language(&cli.lang));
    let stdout = io::stdout();
    LayoutEngine::with_config(config).export(&doc, &mut stdout.lock())?;
    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    let bytes = match path {
        Some(path) => fs::read(path)?,
        None => {
            let mut bytes = Vec::new();
            io::stdin().read_to_end(&mut bytes)?;
            bytes
        }
    };
    Ok(String::from_utf8(bytes)?)
}
