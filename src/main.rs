use std::process;
use std::str::FromStr;

use structopt::StructOpt;
use tracing::Level;

use samehash::config::{default_workers, Goal, SearchConfig};
use samehash::digest::{Md5Hasher, SaylerHasher, SipHasher, StringHasher};
use samehash::nth_root::nth_root;
use samehash::{coordinator, sequential, Alphabet, SearchError, SearchReport};

/// Finds distinct strings that produce the same hash
///
/// Every string of the given length over the alphabet is a candidate. With the default options
/// this looks for three lowercase strings of length 4 whose MD5 digests agree on their first and
/// last 2 hex characters.
#[derive(Debug, StructOpt)]
struct Cli {
    /// Logging verbosity, repeat for more (-v info, -vv debug, -vvv trace)
    #[structopt(short, long, parse(from_occurrences), global = true)]
    verbose: u8,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Search for colliding strings
    Search(SearchArgs),
    /// Compute the integer nth root of a number
    Root {
        /// The number to take the root of
        #[structopt(long)]
        number: u64,
        /// The exponent
        #[structopt(short)]
        n: u32,
    },
}

#[derive(Debug, StructOpt)]
struct SearchArgs {
    /// Symbols the candidate strings are made of
    #[structopt(short, long, default_value = "abcdefghijklmnopqrstuvwxyz")]
    alphabet: Alphabet,
    /// Length of every candidate string
    #[structopt(short, long, default_value = "4")]
    length: usize,
    /// Number of workers, defaults to the number of logical cores minus one
    #[structopt(short, long)]
    workers: Option<usize>,
    /// Stop after this many colliding pairs, triples included
    #[structopt(long)]
    pairs: Option<usize>,
    /// Stop after this many colliding triples (the default is 1). Combines with --pairs.
    #[structopt(long)]
    triples: Option<usize>,
    /// Hash function: md5, sayler or sip
    #[structopt(long, default_value = "sayler")]
    hash: HashKind,
    /// Number of leading and trailing hex values compared by the sayler hash
    #[structopt(short = "n", long, default_value = "2")]
    width: u8,
    /// Scan the whole space on a single thread instead
    #[structopt(long)]
    sequential: bool,
}

#[derive(Debug, Clone, Copy)]
enum HashKind {
    Md5,
    Sayler,
    Sip,
}

impl FromStr for HashKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md5" => Ok(HashKind::Md5),
            "sayler" => Ok(HashKind::Sayler),
            "sip" | "siphash" => Ok(HashKind::Sip),
            _ => Err(format!("Unknown hash: '{}'. Valid options: md5, sayler, sip", s)),
        }
    }
}

fn main() {
    let args = Cli::from_args();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let outcome = match args.command {
        Command::Search(search) => run_search(search),
        Command::Root { number, n } => match nth_root(number, n) {
            Ok(root) => {
                println!("The {}th root of {} is {}", n, number, root);
                Ok(())
            }
            Err(e) => Err(e.to_string()),
        },
    };

    if let Err(message) = outcome {
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}

fn run_search(args: SearchArgs) -> Result<(), String> {
    let goal = match (args.pairs, args.triples) {
        (Some(pairs), Some(triples)) => Goal::Both { pairs, triples },
        (Some(pairs), None) => Goal::Pairs(pairs),
        (None, Some(triples)) => Goal::Triples(triples),
        (None, None) => Goal::default(),
    };

    let config = SearchConfig::default()
        .with_alphabet(args.alphabet)
        .with_length(args.length)
        .with_workers(args.workers.unwrap_or_else(default_workers))
        .with_goal(goal);

    let single_threaded = args.sequential;
    match args.hash {
        HashKind::Md5 => search(&config, Md5Hasher, single_threaded),
        HashKind::Sip => search(&config, SipHasher, single_threaded),
        HashKind::Sayler => {
            let hasher = SaylerHasher::new(args.width).map_err(|e| e.to_string())?;
            search(&config, hasher, single_threaded)
        }
    }
    .map_err(|e| e.to_string())
}

fn search<H>(config: &SearchConfig, hasher: H, single_threaded: bool) -> Result<(), SearchError>
where
    H: StringHasher + Clone + 'static,
{
    let report = match single_threaded {
        true => sequential::find_collisions(config, &hasher)?,
        false => coordinator::run(config, hasher.clone())?,
    };

    print_report(&report, &hasher);
    Ok(())
}

fn print_report<H: StringHasher>(report: &SearchReport<H::Digest>, hasher: &H) {
    if report.is_empty() {
        println!("No collision found");
    }

    for pair in &report.pairs {
        println!(
            "Collision found! {} and {} produce the hash {}",
            pair.members()[0],
            pair.members()[1],
            hasher.render(pair.digest())
        );
    }

    for triple in &report.triples {
        println!(
            "Collision found! {} all produce the hash {}",
            triple.members().join(", "),
            hasher.render(triple.digest())
        );
    }

    for fault in &report.faults {
        eprintln!("{}", fault);
    }

    println!("The detection took {} s", report.elapsed.as_secs_f64());
}
