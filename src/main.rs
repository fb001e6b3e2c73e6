//! word-freq: count words from files, stdin and URLs; merge saved counts.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use word_freq::fetch::{self, FetchSettings, DEFAULT_MAX_BYTES, DEFAULT_TIMEOUT_SECS};
use word_freq::report::{self, Format};
use word_freq::WordCounts;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const STDIN_PATH: &str = "-";

#[derive(Parser)]
#[command(name = "word-freq", version)]
#[command(about = "Count case-insensitive word frequencies in text")]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Count words in files, stdin and web pages. Reads stdin when no source is given.
    Count {
        /// Text files to count; `-` reads stdin.
        files: Vec<PathBuf>,

        /// Page or JSON API to fetch and count (repeatable).
        #[arg(long, short)]
        url: Vec<String>,

        /// JSON pointer (e.g. `/results/0/text`) selecting the text inside a JSON response.
        #[arg(long, requires = "url")]
        json_pointer: Option<String>,

        /// Request timeout in seconds.
        #[arg(long, env = "WORD_FREQ_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        /// Largest response body accepted, in bytes.
        #[arg(long, env = "WORD_FREQ_MAX_BYTES", default_value_t = DEFAULT_MAX_BYTES)]
        max_bytes: u64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Merge counts previously saved as JSON.
    Merge {
        /// JSON files written by `count --format json`.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Report format.
    #[arg(long, short, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Only report the N most frequent words.
    #[arg(long, short = 'n')]
    top: Option<usize>,

    /// Write the report to this file instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .init();
}

fn run(command: Command) -> Result<(), BoxError> {
    match command {
        Command::Count {
            files,
            url,
            json_pointer,
            timeout,
            max_bytes,
            output,
        } => {
            let settings = FetchSettings {
                timeout: Duration::from_secs(timeout),
                max_bytes,
                ..FetchSettings::default()
            };
            let counts = run_count(&files, &url, json_pointer.as_deref(), &settings)?;
            write_report(&counts, &output)
        }
        Command::Merge { files, output } => {
            let counts = run_merge(&files)?;
            write_report(&counts, &output)
        }
    }
}

fn run_count(
    files: &[PathBuf],
    urls: &[String],
    json_pointer: Option<&str>,
    settings: &FetchSettings,
) -> Result<WordCounts, BoxError> {
    let mut total = WordCounts::new();
    if files.is_empty() && urls.is_empty() {
        total.merge(word_freq::count(&read_source(Path::new(STDIN_PATH))?))?;
    }
    for path in files {
        let counts = word_freq::count(&read_source(path)?);
        tracing::debug!(source = %path.display(), words = counts.len(), tokens = counts.total(), "counted");
        total.merge(counts)?;
    }
    for url in urls {
        let counts = fetch::fetch_blocking(settings, url)?.count(json_pointer)?;
        tracing::debug!(source = %url, words = counts.len(), tokens = counts.total(), "counted");
        total.merge(counts)?;
    }
    tracing::info!(words = total.len(), tokens = total.total(), "done");
    Ok(total)
}

fn run_merge(files: &[PathBuf]) -> Result<WordCounts, BoxError> {
    let mut total = WordCounts::new();
    for path in files {
        total.merge(WordCounts::load(path)?)?;
    }
    Ok(total)
}

fn read_source(path: &Path) -> Result<String, BoxError> {
    if path.as_os_str() == STDIN_PATH {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()).into())
}

fn write_report(counts: &WordCounts, args: &OutputArgs) -> Result<(), BoxError> {
    let rendered = report::render(counts, args.format, args.top)?;
    match &args.output {
        Some(path) => {
            fs::write(path, rendered).map_err(|e| format!("{}: {e}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
