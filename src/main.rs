//! feedpost - render feed entries into chat message units

use std::io::Read;
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use feedpost::{
    DownloadProbe, FeedEntry, NeverDownloadable, RenderConfig, Renderer, decode_text,
};

#[derive(Parser)]
#[command(name = "feedpost")]
#[command(version, about = "Render feed entry markup into chat message units", long_about = None)]
#[command(after_help = "EXAMPLES:
    feedpost post.html --link https://blog.test/post    Render an HTML fragment
    feedpost entry.json --entry -c feedpost.toml        Render a JSON feed entry
    cat post.html | feedpost - --probe                  Read stdin, probe videos")]
struct Cli {
    /// Input file with entry markup, or `-` for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Treat the input as a JSON feed entry instead of raw markup
    #[arg(long)]
    entry: bool,

    /// Entry link, used for the "read more" button
    #[arg(short, long)]
    link: Option<String>,

    /// Entry title, available to templates
    #[arg(short, long)]
    title: Option<String>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Probe video URLs over HTTP instead of linking every video
    #[arg(long)]
    probe: bool,

    /// Input encoding when it is not UTF-8
    #[arg(short, long)]
    encoding: Option<String>,

    /// Log to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("feedpost=debug"),
        _ => EnvFilter::new("feedpost=trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => RenderConfig::from_path(path).map_err(|e| format!("{path}: {e}"))?,
        None => RenderConfig::default(),
    };

    let bytes = read_input(&cli.input).map_err(|e| format!("{}: {e}", cli.input))?;
    let text = decode_text(&bytes, cli.encoding.as_deref());

    let mut entry = if cli.entry {
        serde_json::from_str::<FeedEntry>(&text).map_err(|e| format!("invalid entry: {e}"))?
    } else {
        FeedEntry::new("").with_content("text/html", text.into_owned())
    };
    if let Some(title) = &cli.title {
        entry.title = title.clone();
    }
    if let Some(link) = &cli.link {
        entry.link = Some(link.clone());
    }

    let probe = make_probe(cli.probe, &config)?;
    let rendering = Renderer::new(&config, probe.as_ref()).render_entry(&entry);
    for diagnostic in &rendering.diagnostics {
        warn!("{diagnostic}");
    }

    let json = serde_json::to_string_pretty(&rendering).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn read_input(input: &str) -> std::io::Result<Vec<u8>> {
    if input == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read(input)
    }
}

#[cfg(feature = "http")]
fn make_probe(enabled: bool, config: &RenderConfig) -> Result<Box<dyn DownloadProbe>, String> {
    if !enabled {
        return Ok(Box::new(NeverDownloadable));
    }
    let probe = feedpost::HttpProbe::new(config.probe_timeout()).map_err(|e| e.to_string())?;
    Ok(Box::new(probe))
}

#[cfg(not(feature = "http"))]
fn make_probe(enabled: bool, _config: &RenderConfig) -> Result<Box<dyn DownloadProbe>, String> {
    if enabled {
        return Err("built without the `http` feature; --probe is unavailable".to_string());
    }
    Ok(Box::new(NeverDownloadable))
}
