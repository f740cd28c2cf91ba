use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use arkv::people::{PeopleOptions, PeopleReport, run_people};
use arkv::repl::Repl;
use arkv::storage::{InstrumentedKvStore, IoStatsSnapshot, KvStore, MemKvStore};
use arkv::{CollectionStore, Error, ReaderConfig, Result};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arkv", about = "Arrow record batches over an embedded key-value store")]
struct Cli {
    /// Open a persistent store at PATH instead of an in-memory one.
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<PathBuf>,
    /// Worker threads for parallel batch reads.
    #[arg(long, default_value_t = ReaderConfig::default().worker_threads, global = true)]
    workers: usize,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive collection console (default).
    Repl,
    /// Generate people, store them and run the grouped age query.
    People(PeopleArgs),
    /// Upsert the JSON array in FILE into a collection.
    Import {
        collection: String,
        file: PathBuf,
    },
}

#[derive(Args)]
struct PeopleArgs {
    #[arg(long, default_value_t = PeopleOptions::default().count)]
    count: usize,
    #[arg(long = "rows-per-batch", default_value_t = PeopleOptions::default().rows_per_batch)]
    rows_per_batch: usize,
    #[arg(long, default_value_t = PeopleOptions::default().seed)]
    seed: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("arkv: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.db.clone() {
        Some(path) => run_on_path(cli, path),
        None => run_with(Arc::new(MemKvStore::new()), cli),
    }
}

#[cfg(feature = "sled-support")]
fn run_on_path(cli: Cli, path: PathBuf) -> Result<()> {
    let store = arkv::storage::SledStore::open(&path)?;
    tracing::info!(path = %path.display(), "opened sled store");
    run_with(Arc::new(store), cli)
}

#[cfg(not(feature = "sled-support"))]
fn run_on_path(_cli: Cli, path: PathBuf) -> Result<()> {
    Err(Error::InvalidArgumentError(format!(
        "--db {} requires the sled-support feature",
        path.display()
    )))
}

fn run_with<S: KvStore>(store: Arc<S>, cli: Cli) -> Result<()> {
    if cli.workers == 0 {
        return Err(Error::InvalidArgumentError("--workers must be at least 1".into()));
    }
    match cli.command.unwrap_or(Command::Repl) {
        Command::Repl => {
            let repl = Repl::new(CollectionStore::new(store));
            repl.seed()?;
            let stdin = io::stdin();
            let prompt = stdin.is_terminal();
            repl.run(stdin.lock(), &mut io::stdout(), prompt)
        }
        Command::Import { collection, file } => {
            let json = std::fs::read_to_string(&file)?;
            let summary = CollectionStore::new(store).upsert_json(&collection, &json)?;
            println!(
                "inserted {} rows into {collection} ({} total)",
                summary.inserted, summary.total_rows
            );
            Ok(())
        }
        Command::People(args) => {
            let store = Arc::new(InstrumentedKvStore::new(store));
            let stats = store.stats();
            let options = PeopleOptions {
                count: args.count,
                rows_per_batch: args.rows_per_batch,
                seed: args.seed,
                reader: ReaderConfig::with_worker_threads(cli.workers),
            };
            let report = run_people(store, &options)?;
            print_people_report(&report, &stats.snapshot());
            Ok(())
        }
    }
}

fn print_people_report(report: &PeopleReport, io: &IoStatsSnapshot) {
    println!(
        "wrote {} people; sequence holds {} batches ({:.2}s)",
        report.rows_written,
        report.batches,
        report.write_elapsed.as_secs_f64()
    );
    println!(
        "chunked stream: {} batches in {} chunks, {} bytes",
        report.stream.batches, report.stream.chunks, report.stream.bytes
    );
    println!(
        "matched {} rows in {:.3}s",
        report.matched,
        report.read_elapsed.as_secs_f64()
    );
    for group in &report.groups {
        println!(
            "  {:<12} count {:>8}  average age {:>6.2}",
            group.key, group.count, group.average
        );
    }
    println!(
        "kv: {} gets ({} misses, {} bytes) | {} puts ({} bytes) | {} deletes | {} flushes",
        io.gets, io.get_misses, io.get_bytes, io.puts, io.put_bytes, io.deletes, io.flushes
    );
}
