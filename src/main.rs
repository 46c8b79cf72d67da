//! Noesis shell: feeds Narsese to a memory and prints what it concludes.
//!
//! Every line of the script is either a task (`<a --> b>.`), a number of
//! cycles to run (`10`), or a comment (`//` or `'`). Without a script file the
//! lines are read from stdin.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use noesis::event::{Event, EventSink};
use noesis::rules::Syllogism;
use noesis::{Memory, Parameters, Result};

#[derive(Parser)]
#[command(name = "noesis")]
#[command(about = "A resource-bounded reasoner that reads Narsese")]
#[command(version)]
pub struct Cli {
    /// Narsese script to run, stdin when omitted
    pub script: Option<PathBuf>,

    /// Path to a parameter file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Overrides the seed of the parameter file
    #[arg(long, short = 's')]
    pub seed: Option<u64>,

    /// Also print every derived task
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Print a JSON report of the busiest concepts when done
    #[arg(long)]
    pub json: bool,

    /// Number of concepts in the report
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

struct PrintSink {
    verbose: bool,
}

impl EventSink for PrintSink {
    fn on_event(&mut self, event: &Event) {
        match event {
            Event::Answer { question, answer } => println!("Answer: {} => {}", question, answer),
            Event::Decision { goal, expectation } => println!("Decision: {} ({:.4})", goal, expectation),
            Event::Derived { task } if self.verbose => println!("Derived: {}", task),
            _ => {}
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut params = Parameters::load(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        params.seed = seed;
    }
    let mut memory = Memory::new(params)?
        .with_rules(Syllogism)
        .with_sink(PrintSink { verbose: cli.verbose });

    let reader: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") || line.starts_with('\'') {
            continue;
        }
        if let Ok(cycles) = line.parse::<usize>() {
            memory.run(cycles);
            continue;
        }
        if let Err(e) = memory.input(line) {
            warn!(line = number + 1, error = %e, "skipped input");
            eprintln!("line {}: {}", number + 1, e);
        }
    }
    // whatever is still pending gets one more cycle
    if !memory.pending().is_empty() {
        memory.cycle();
    }

    if cli.json {
        let report = memory.report(cli.top);
        let text = serde_json::to_string_pretty(&report).map_err(io::Error::from)?;
        println!("{}", text);
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,noesis=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
