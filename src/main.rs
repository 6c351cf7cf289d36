use anyhow::{Context, Error, Result};
use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;
use std::io::{self, BufWriter, Write};
use std::net::IpAddr;
use std::process::ExitCode;

use geoipdb::input::{for_each_address, AddressLine, FileOrStdin};
use geoipdb::{Capability, LookupEngine, Reader, Record};

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
    /// MaxMind DB file to query
    #[clap(
        short,
        long,
        value_name = "FILE",
        value_hint = clap::ValueHint::FilePath,
        env = "GEOIPDB_DATABASE"
    )]
    database: Utf8PathBuf,

    /// Record shape to decode. "auto" picks the richest shape the database supports
    #[clap(short, long, value_enum, default_value_t = RecordArg::Auto)]
    record: RecordArg,

    /// Print the undecoded lookup result instead of a typed record
    #[clap(long, conflicts_with = "record")]
    raw: bool,

    /// Print the database metadata and exit
    #[clap(long)]
    metadata: bool,

    /// Memory map the database instead of reading it into memory
    #[clap(long)]
    mmap: bool,

    /// Pretty-print JSON output
    #[clap(long)]
    pretty: bool,

    /// Read addresses from FILE, one per line. Use "-" for stdin
    #[clap(short, long = "file", value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    files: Vec<Utf8PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Addresses to look up. Without any, addresses are read from --file or stdin
    #[clap(value_name = "IP")]
    addresses: Vec<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum RecordArg {
    Auto,
    City,
    Country,
    Enterprise,
    AnonymousIp,
    Asn,
    ConnectionType,
    Domain,
    Isp,
}

impl RecordArg {
    fn capability(self) -> Option<Capability> {
        match self {
            RecordArg::Auto => None,
            RecordArg::City => Some(Capability::City),
            RecordArg::Country => Some(Capability::Country),
            RecordArg::Enterprise => Some(Capability::Enterprise),
            RecordArg::AnonymousIp => Some(Capability::AnonymousIp),
            RecordArg::Asn => Some(Capability::Asn),
            RecordArg::ConnectionType => Some(Capability::ConnectionType),
            RecordArg::Domain => Some(Capability::Domain),
            RecordArg::Isp => Some(Capability::Isp),
        }
    }
}

/// Minimal stderr logger for the `log` facade.
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) {
    let from_env = std::env::var("GEOIPDB_LOG")
        .ok()
        .and_then(|v| v.parse::<log::LevelFilter>().ok());
    let level = from_env.unwrap_or(match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    });
    // Only fails if a logger is already installed.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn main() -> ExitCode {
    let err = match run_main() {
        Ok(code) => return code,
        Err(err) => err,
    };

    // Handle broken pipe errors gracefully
    if is_broken_pipe(&err) {
        return ExitCode::SUCCESS;
    }

    // Print detailed error information based on environment variables
    let mut stderr = io::stderr();
    let _ = if std::env::var("RUST_BACKTRACE").is_ok_and(|v| v == "1")
        && std::env::var("RUST_LIB_BACKTRACE").map_or(true, |v| v == "1")
    {
        writeln!(stderr, "{:?}", err)
    } else {
        writeln!(stderr, "{:#}", err)
    };

    ExitCode::FAILURE
}

fn run_main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.mmap {
        let reader = Reader::open_mmap(&args.database)
            .with_context(|| format!("failed to map database at {}", args.database))?;
        run(&args, &reader)?;
    } else {
        let reader = Reader::open(&args.database)
            .with_context(|| format!("failed to open database at {}", args.database))?;
        run(&args, &reader)?;
    }

    Ok(ExitCode::SUCCESS)
}

fn run<E: LookupEngine>(args: &Args, reader: &Reader<E>) -> Result<()> {
    let mut out = BufWriter::with_capacity(65536, io::stdout());

    if args.metadata {
        write_json(&mut out, reader.metadata(), args.pretty)?;
        out.flush()?;
        return Ok(());
    }

    let capability = args
        .record
        .capability()
        .unwrap_or_else(|| reader.edition().primary_record());
    // Fail before reading any input if the shape is not available.
    if !args.raw {
        reader.edition().require(capability)?;
    }
    log::info!(
        "decoding {} records from {}",
        if args.raw { "raw" } else { capability.method() },
        reader.metadata().database_type
    );

    let mut emit = |ip: IpAddr| -> Result<()> {
        if args.raw {
            let value = reader.lookup_value(ip)?;
            write_json(&mut out, &Entry { ip, record: &value }, args.pretty)
        } else {
            write_record(&mut out, reader, capability, ip, args.pretty)
        }
    };

    if !args.addresses.is_empty() {
        for text in &args.addresses {
            let ip: IpAddr = text
                .parse()
                .with_context(|| format!("invalid IP address: {text}"))?;
            emit(ip)?;
        }
    } else {
        let sources: Vec<FileOrStdin> = if args.files.is_empty() {
            vec![FileOrStdin::Stdin]
        } else {
            args.files.iter().cloned().map(FileOrStdin::from_path).collect()
        };
        for source in sources {
            let input = source.reader()?;
            for_each_address(input, |entry| {
                match entry {
                    AddressLine::Address(ip) => emit(ip)?,
                    AddressLine::Invalid(text, e) => {
                        log::warn!("{source}: skipping {text:?}: {e}")
                    }
                }
                Ok(true)
            })?;
        }
    }

    out.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct Entry<'a, T: Serialize> {
    ip: IpAddr,
    record: &'a T,
}

fn write_json<W, T>(out: &mut W, value: &T, pretty: bool) -> Result<()>
where
    W: Write,
    T: Serialize + ?Sized,
{
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    out.write_all(b"\n")?;
    Ok(())
}

fn write_record<W: Write, E: LookupEngine>(
    out: &mut W,
    reader: &Reader<E>,
    capability: Capability,
    ip: IpAddr,
    pretty: bool,
) -> Result<()> {
    fn emit<W: Write, E: LookupEngine, R: Record + Serialize>(
        out: &mut W,
        reader: &Reader<E>,
        ip: IpAddr,
        pretty: bool,
    ) -> Result<()> {
        let record: R = reader.lookup(ip)?;
        write_json(out, &Entry { ip, record: &record }, pretty)
    }

    use geoipdb::records as r;
    match capability {
        Capability::City => emit::<W, E, r::City>(out, reader, ip, pretty),
        Capability::Country => emit::<W, E, r::Country>(out, reader, ip, pretty),
        Capability::Enterprise => emit::<W, E, r::Enterprise>(out, reader, ip, pretty),
        Capability::AnonymousIp => emit::<W, E, r::AnonymousIp>(out, reader, ip, pretty),
        Capability::Asn => emit::<W, E, r::Asn>(out, reader, ip, pretty),
        Capability::ConnectionType => emit::<W, E, r::ConnectionType>(out, reader, ip, pretty),
        Capability::Domain => emit::<W, E, r::Domain>(out, reader, ip, pretty),
        Capability::Isp => emit::<W, E, r::Isp>(out, reader, ip, pretty),
    }
}
