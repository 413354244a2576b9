use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use outlink_lib::{DecorateOptions, Document, PartialOptions, decorate_with_summary};
use tracing::{debug, info};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "outlink",
    version,
    about = "Mark external links in HTML to open in a new tab"
)]
struct Cli {
    /// Input HTML file (reads from stdin if not provided, use "-" for explicit stdin)
    input: Option<PathBuf>,

    /// Write decorated HTML to this file instead of stdout
    #[arg(short, long, value_name = "FILE", conflicts_with = "in_place")]
    output: Option<PathBuf>,

    /// Overwrite the input file with the decorated HTML
    #[arg(long)]
    in_place: bool,

    /// Options file (TOML, or JSON when the extension is .json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Options as a JSON object, e.g. '{"cssClass":"ext"}'
    #[arg(long, value_name = "JSON")]
    options: Option<String>,

    /// Class added to external links [default: external]
    #[arg(long, value_name = "CLASS")]
    css_class: Option<String>,

    /// Icon appended to external links; pass "" to disable [default: images/externalink.png]
    #[arg(long, value_name = "URL")]
    icon_url: Option<String>,

    /// Extra href prefix that also counts as external
    #[arg(long, value_name = "PREFIX")]
    start_url: Option<String>,

    /// Parse the input as a full document rather than a fragment.
    /// Implied when the input starts with a doctype or <html>, after any BOM
    /// and leading comments.
    #[arg(long)]
    document: bool,

    /// Print a JSON summary of the changes to stderr
    #[arg(long)]
    summary: bool,

    /// Increase verbosity (-v INFO, -vv DEBUG, -vvv TRACE, -vvvv TRACE with file/line)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Returns the input path, or `None` when reading stdin.
    fn input_path(&self) -> Option<&Path> {
        self.input
            .as_deref()
            .filter(|path| *path != Path::new("-"))
    }

    /// Options given directly as flags.
    fn flag_options(&self) -> PartialOptions {
        PartialOptions {
            css_class: self.css_class.clone(),
            icon_url: self.icon_url.clone(),
            start_url: self.start_url.clone(),
        }
    }
}

/// Initialize tracing subscriber based on verbosity level.
///
/// Verbosity levels:
/// - 0 (default): no subscriber
/// - 1 (-v): INFO (summary of the pass)
/// - 2 (-vv): DEBUG (each decorated link)
/// - 3 (-vvv): TRACE (skipped links too)
/// - 4+ (-vvvv): TRACE with file/line numbers
fn init_tracing(verbose: u8) {
    if verbose == 0 {
        return;
    }

    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            1 => "warn,outlink=info,outlink_lib=info".to_string(),
            2 => "warn,outlink=debug,outlink_lib=debug".to_string(),
            _ => "info,outlink=trace,outlink_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(verbose >= 4)
                .with_line_number(verbose >= 4)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Resolves options with precedence defaults < config file < --options < flags.
fn resolve_options(cli: &Cli) -> Result<DecorateOptions> {
    let mut partial = PartialOptions::default();

    if let Some(path) = &cli.config {
        let from_file = PartialOptions::load(path)
            .wrap_err_with(|| format!("Failed to load options from {}", path.display()))?;
        partial = partial.overlay(from_file);
    }

    if let Some(json) = &cli.options {
        let from_json =
            PartialOptions::from_json_str(json).wrap_err("Invalid JSON in --options argument")?;
        partial = partial.overlay(from_json);
    }

    let options = DecorateOptions::merged(partial.overlay(cli.flag_options()));
    debug!(?options, "Resolved decoration options");
    Ok(options)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .wrap_err("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

const BOM: char = '\u{feff}';

/// Returns true when the source looks like a complete document.
///
/// A byte order mark, whitespace and comments ahead of the doctype or
/// `<html>` tag are skipped.
fn looks_like_document(source: &str) -> bool {
    let mut rest = source.trim_start_matches(BOM).trim_start();

    while let Some(comment) = rest.strip_prefix("<!--") {
        match comment.find("-->") {
            Some(end) => rest = comment[end + 3..].trim_start(),
            None => return false,
        }
    }

    let head = rest
        .chars()
        .take(9)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.in_place && cli.input_path().is_none() {
        return Err(eyre!("--in-place requires a file path, not stdin"));
    }

    let options = resolve_options(&cli)?;
    let source = read_input(cli.input_path())?;

    let mut document = if cli.document || looks_like_document(&source) {
        Document::parse_document(&source)
    } else {
        Document::parse_fragment(&source)
    };

    let summary = decorate_with_summary(&mut document, &options);
    info!(
        anchors = summary.anchors,
        decorated = summary.decorated,
        icons = summary.icons,
        "Decorated external links"
    );

    // The parser drops a leading BOM; put it back so rewritten files keep it
    let mut html = String::new();
    if source.starts_with(BOM) {
        html.push(BOM);
    }
    html.push_str(&document.to_html());

    let destination = if cli.in_place {
        cli.input_path()
    } else {
        cli.output.as_deref()
    };

    match destination {
        Some(path) => {
            std::fs::write(path, &html)
                .wrap_err_with(|| format!("Failed to write to {}", path.display()))?;
            debug!(path = %path.display(), "Wrote decorated HTML");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            if !html.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }

    if cli.summary {
        eprintln!("{}", serde_json::to_string(&summary)?);
    }

    Ok(())
}
