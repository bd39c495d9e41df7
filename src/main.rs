use clap::{Parser, Subcommand, ValueEnum};
use eclkw::io_stream::{KeywordReader, KeywordWriter, ReadOptions};
use eclkw::recovery;
use eclkw::summary::{self, SummarySpec};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "eclkw", about = "Inspect and rewrite framed keyword-array files")]
struct Cli {
    /// Log verbosity (written to stderr)
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
    /// Log line format
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every array: name, type and element count
    List {
        input: PathBuf,
    },
    /// Print arrays as JSON
    Dump {
        input: PathBuf,
        /// Only arrays with this keyword (padding ignored)
        #[arg(short, long)]
        keyword: Option<String>,
    },
    /// Print the summary specification of an .SMSPEC file as JSON
    Summary {
        input: PathBuf,
    },
    /// Report how far the file decodes cleanly
    Scan {
        input: PathBuf,
    },
    /// Decode and re-encode into a new file
    Copy {
        input:  PathBuf,
        output: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> tracing::level_filters::LevelFilter {
        use tracing::level_filters::LevelFilter;
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn  => LevelFilter::WARN,
            LogLevel::Info  => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

fn init_logging(format: LogFormat, level: LogLevel) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_filter())
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    match cli.command {

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { input } => {
            let mut reader = open(&input)?;
            println!("{:<10} {:<5} {:>10} {:>12}", "Keyword", "Type", "Count", "Offset");
            loop {
                let offset = reader.offset();
                let Some(kw) = reader.next_array()? else { break };
                let known = if summary::is_smspec_keyword(&kw.name) { "*" } else { "" };
                println!("{:<10} {:<5} {:>10} {:>12} {}",
                    kw.name, kw.type_tag(), kw.count(), offset, known);
            }
        }

        // ── Dump ─────────────────────────────────────────────────────────────
        Commands::Dump { input, keyword } => {
            let mut arrays = eclkw::decode(BufReader::new(File::open(&input)?))?;
            if let Some(k) = keyword {
                arrays.retain(|kw| kw.keyword() == k.trim_end());
            }
            println!("{}", serde_json::to_string_pretty(&arrays)?);
        }

        // ── Summary ──────────────────────────────────────────────────────────
        Commands::Summary { input } => {
            let arrays = eclkw::decode(BufReader::new(File::open(&input)?))?;
            let spec = SummarySpec::from_arrays(&arrays)?;
            println!("{}", serde_json::to_string_pretty(&spec)?);
        }

        // ── Scan ─────────────────────────────────────────────────────────────
        Commands::Scan { input } => {
            let report = recovery::scan(BufReader::new(File::open(&input)?), ReadOptions::default());
            println!("{} complete array(s), good prefix {} B", report.arrays.len(), report.good_len);
            match &report.error {
                None    => println!("  stream ends cleanly"),
                Some(e) => println!("  stopped: {e}"),
            }
        }

        // ── Copy ─────────────────────────────────────────────────────────────
        Commands::Copy { input, output } => {
            let reader = open(&input)?;
            let mut writer = KeywordWriter::new(BufWriter::new(File::create(&output)?));
            let mut n = 0usize;
            for kw in reader {
                writer.write_array(&kw?)?;
                n += 1;
            }
            writer.finish()?;
            println!("Copied {n} array(s) → {}", output.display());
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn open(path: &PathBuf) -> Result<KeywordReader<BufReader<File>>, Box<dyn std::error::Error>> {
    Ok(KeywordReader::new(BufReader::new(File::open(path)?)))
}
