use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use ettubrute::utils::{format_duration, format_number};
use ettubrute::{
    Alphabet, Config, RuleSet, SearchDriver, SearchOptions, SearchOutcome, Statistics,
    TargetDigest,
};

/// MD5 password recovery: brute-force enumeration and wordlist mangling
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target digest as 32 hex characters
    #[arg(short, long)]
    digest: Option<String>,

    /// File containing the target digest
    #[arg(long)]
    digest_file: Option<PathBuf>,

    /// Wordlist path; enables dictionary mode
    #[arg(short, long)]
    wordlist: Option<PathBuf>,

    /// Rule-selection string for dictionary mode ('*' = all, '0' = baseline)
    #[arg(short, long)]
    rules: Option<String>,

    /// Maximum brute-force candidate length (overrides config)
    #[arg(short = 'l', long)]
    max_length: Option<usize>,

    /// Custom alphabet for brute force (overrides config)
    #[arg(long)]
    charset: Option<String>,

    /// Shuffle the alphabet once before brute force starts
    #[arg(long)]
    shuffle: bool,

    /// Worker threads for hash-and-compare
    #[arg(long)]
    workers: Option<usize>,

    /// Stop after testing this many candidates
    #[arg(long)]
    max_candidates: Option<u64>,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    // Config file is optional; CLI flags override whatever it sets.
    let mut config = if std::path::Path::new(&args.config).exists() {
        Config::load(&args.config)?
    } else {
        Config::default()
    };
    apply_overrides(&mut config, &args);
    config.validate()?;

    let target = load_target(&args)?;
    info!("target digest: {}", target);

    let options = SearchOptions {
        shuffle: config.search.shuffle,
        max_candidates: config.candidate_ceiling(),
        workers: config.search.workers,
        batch_size: config.search.batch_size,
    };
    let driver = SearchDriver::new(target, options);
    let stats = Arc::new(Statistics::new());

    let done = Arc::new(AtomicBool::new(false));
    let ticker = spawn_progress_ticker(Arc::clone(&stats), Arc::clone(&done));

    let outcome = match &args.wordlist {
        Some(wordlist) => {
            let selection = args
                .rules
                .clone()
                .unwrap_or_else(|| config.rules.selection.clone());
            let rules = RuleSet::from_selection(&selection);
            info!(
                "dictionary mode: {} with {} rules enabled",
                wordlist.display(),
                rules.len()
            );
            driver.dictionary(wordlist, &rules, &stats)?
        }
        None => {
            let alphabet = if config.alphabet.charset.is_empty() {
                Alphabet::full_library()
            } else {
                Alphabet::from_chars(&config.alphabet.charset)?
            };
            info!(
                "brute-force mode: {} characters, max length {}",
                alphabet.len(),
                config.search.max_length
            );
            driver.brute_force(alphabet, config.search.max_length, &stats)?
        }
    };

    done.store(true, Ordering::Relaxed);
    let _ = ticker.join();

    report(&outcome, &stats);
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(max_length) = args.max_length {
        config.search.max_length = max_length;
    }
    if let Some(charset) = &args.charset {
        config.alphabet.charset = charset.clone();
    }
    if args.shuffle {
        config.search.shuffle = true;
    }
    if let Some(workers) = args.workers {
        config.search.workers = workers;
    }
    if let Some(max_candidates) = args.max_candidates {
        config.search.max_candidates = max_candidates;
    }
}

/// The digest comes from exactly one of --digest and --digest-file, and is
/// validated before any search begins.
fn load_target(args: &Args) -> Result<TargetDigest> {
    match (&args.digest, &args.digest_file) {
        (Some(hex), None) => Ok(TargetDigest::parse(hex)?),
        (None, Some(path)) => Ok(TargetDigest::from_file(path)?),
        (Some(_), Some(_)) => {
            anyhow::bail!("give either --digest or --digest-file, not both")
        }
        (None, None) => anyhow::bail!("a target digest is required (--digest or --digest-file)"),
    }
}

fn spawn_progress_ticker(
    stats: Arc<Statistics>,
    done: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let spinner = indicatif::ProgressBar::new_spinner();
        spinner.set_style(
            indicatif::ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        while !done.load(Ordering::Relaxed) {
            spinner.set_message(format!(
                "{} candidates tested ({:.0}/s)",
                format_number(stats.tested()),
                stats.rate()
            ));
            spinner.tick();
            std::thread::sleep(Duration::from_millis(200));
        }
        spinner.finish_and_clear();
    })
}

fn report(outcome: &SearchOutcome, stats: &Statistics) {
    let elapsed = format_duration(stats.elapsed());
    match outcome {
        SearchOutcome::Found { plaintext, tested } => {
            // BEL so a long-running crack announces itself.
            println!("\x07");
            println!("F O U N D  I T !");
            println!("- - - - - - - - ");
            println!("      {}", plaintext);
            println!();
            println!(
                "Tested {} candidates in {} ({:.0} candidates/s).",
                format_number(*tested),
                elapsed,
                stats.rate()
            );
        }
        SearchOutcome::NotFound { tested } => {
            println!(
                "Search space exhausted with no match after {} candidates ({}).",
                format_number(*tested),
                elapsed
            );
        }
        SearchOutcome::CutShort { tested } => {
            println!(
                "Search cut short by the candidate ceiling after {} candidates ({}); \
                 the space was NOT exhausted.",
                format_number(*tested),
                elapsed
            );
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .init();

    Ok(())
}
