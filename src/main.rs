use anyhow::{Context, Error, Result};
use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;

use geoipsum::input::LogSource;
use geoipsum::{report, validate_input, Analyzer, CountryResolver, DatabaseConfig, Locale};

/// Check if the error chain contains a broken pipe error.
#[inline(always)]
fn is_broken_pipe(err: &Error) -> bool {
    for cause in err.chain() {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::BrokenPipe {
                return true;
            }
        }
    }
    false
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Output format
    #[clap(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Indent JSON output
    #[clap(long)]
    pretty: bool,

    /// Use colors in text output
    #[clap(short = 'C', long, value_enum, default_value_t = ArgsColorChoice::Auto)]
    color: ArgsColorChoice,

    /// Language of country names (en, ja, de, es, fr, pt-BR, ru, zh-CN)
    #[clap(short, long, default_value = "en", env = "GEOIPSUM_LOCALE")]
    locale: Locale,

    /// Path to the country MMDB file. Overrides -I
    #[clap(
        short,
        long,
        value_name = "FILE",
        value_hint = clap::ValueHint::FilePath,
        env = "GEOIPSUM_DATABASE"
    )]
    database: Option<Utf8PathBuf>,

    /// Specify directory containing GeoLite2-Country.mmdb
    #[clap(
        short = 'I',
        value_name = "DIR",
        value_hint = clap::ValueHint::DirPath,
        env = "GEOIP_MMDB_DIR"
    )]
    include: Option<Utf8PathBuf>,

    /// List the supported country name languages
    #[clap(long)]
    list_locales: bool,

    /// Log file to analyze. Leave empty or use "-" to read from stdin
    #[clap(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    input: Option<Utf8PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum ArgsColorChoice {
    Always,
    Never,
    Auto,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let err = match run_main() {
        Ok(code) => return code,
        Err(err) => err,
    };

    if is_broken_pipe(&err) {
        return ExitCode::SUCCESS;
    }

    if std::env::var("RUST_BACKTRACE").is_ok_and(|v| v == "1")
        && std::env::var("RUST_LIB_BACKTRACE").map_or(true, |v| v == "1")
    {
        let _ = writeln!(io::stderr(), "{:?}", err);
    } else {
        let _ = writeln!(io::stderr(), "{:#}", err);
    }

    exit_code(&err)
}

/// Problems with the log itself (empty, or no public addresses) exit with 2,
/// like usage errors. Everything else exits with 1.
fn exit_code(err: &Error) -> ExitCode {
    let input_error = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<geoipsum::Error>(),
            Some(geoipsum::Error::EmptyInput | geoipsum::Error::NoAddressesFound)
        )
    });
    if input_error {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

fn run_main() -> Result<ExitCode> {
    let args = Args::parse();

    if args.list_locales {
        let mut out = io::stdout().lock();
        for locale in Locale::ALL {
            writeln!(out, "{}", locale)?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = DatabaseConfig {
        database: args.database.clone(),
        directory: args.include.clone(),
        locale: args.locale,
    };
    let analyzer = Analyzer::new(CountryResolver::open(&config))?;

    let source = LogSource::from(args.input.clone());
    let text = source.read_text()?;
    let text = validate_input(&text)?;

    let result = analyzer
        .analyze(text)
        .with_context(|| format!("failed to analyze {}", source))?
        .ensure_found()?;

    match args.format {
        OutputFormat::Json => {
            let mut out = io::BufWriter::new(io::stdout().lock());
            report::write_json(&mut out, &result, args.pretty)?;
            out.flush()?;
        }
        OutputFormat::Text => {
            let mut out = StandardStream::stdout(color_choice(args.color));
            report::write_text(&mut out, &result)?;
            out.flush()?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Auto colors only when stdout is a terminal.
fn color_choice(choice: ArgsColorChoice) -> ColorChoice {
    match choice {
        ArgsColorChoice::Auto => {
            if io::stdout().is_terminal() {
                ColorChoice::Auto
            } else {
                ColorChoice::Never
            }
        }
        ArgsColorChoice::Always => ColorChoice::Always,
        ArgsColorChoice::Never => ColorChoice::Never,
    }
}
