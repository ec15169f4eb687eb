use std::error::Error;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;
use distance::damerau_levenshtein;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use structopt::StructOpt;
use wrtrspell::speller::suggestion::Suggestion;
use wrtrspell::speller::{Speller, SpellerConfig};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "wrtrspell-accuracy",
    about = "Measures how often wrtrspell ranks the intended word first."
)]
struct Opts {
    #[structopt(parse(from_os_str), help = "Typo list, one 'typo<TAB>expected' per line")]
    words: PathBuf,

    #[structopt(parse(from_os_str), help = "Frequency dictionary, one 'term count' per line")]
    dictionary: PathBuf,

    #[structopt(short, long, parse(from_os_str), help = "JSON speller config")]
    config: Option<PathBuf>,

    #[structopt(short = "o", long, parse(from_os_str), help = "Write a full JSON report here")]
    json_output: Option<PathBuf>,

    #[structopt(short = "t", long, parse(from_os_str), help = "Append a summary row to this TSV file")]
    tsv_output: Option<PathBuf>,

    #[structopt(short = "w", long, help = "Only test the first N typos")]
    max_words: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct Typo {
    input: String,
    expected: String,
}

fn read_typos(path: &Path, limit: Option<usize>) -> Result<Vec<Typo>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    // malformed rows are skipped, not fatal
    Ok(reader
        .deserialize::<Typo>()
        .filter_map(Result::ok)
        .take(limit.unwrap_or(usize::MAX))
        .collect())
}

/// Where the expected word ended up in the suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "rank")]
enum Outcome {
    Ranked(usize),
    Missing,
    NoSuggestions,
}

impl Outcome {
    fn of(expected: &str, suggestions: &[Suggestion]) -> Outcome {
        match suggestions.iter().position(|s| s.value == expected) {
            Some(rank) => Outcome::Ranked(rank),
            None if suggestions.is_empty() => Outcome::NoSuggestions,
            None => Outcome::Missing,
        }
    }
}

#[derive(Debug, Serialize)]
struct Lookup<'a> {
    input: &'a str,
    expected: &'a str,
    edit_distance: usize,
    outcome: Outcome,
    suggestions: Vec<Suggestion>,
    micros: u64,
}

fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

#[derive(Debug, Default, Serialize)]
struct Tally {
    words: usize,
    first: usize,
    top_five: usize,
    anywhere: usize,
    missing: usize,
    no_suggestions: usize,
    slowest_micros: u64,
    fastest_micros: u64,
}

impl Tally {
    fn count(lookups: &[Lookup<'_>]) -> Tally {
        let mut tally = Tally {
            words: lookups.len(),
            fastest_micros: lookups.iter().map(|l| l.micros).min().unwrap_or(0),
            slowest_micros: lookups.iter().map(|l| l.micros).max().unwrap_or(0),
            ..Tally::default()
        };

        for lookup in lookups {
            match lookup.outcome {
                Outcome::Ranked(rank) => {
                    tally.anywhere += 1;
                    tally.first += (rank == 0) as usize;
                    tally.top_five += (rank < 5) as usize;
                }
                Outcome::Missing => tally.missing += 1,
                Outcome::NoSuggestions => tally.no_suggestions += 1,
            }
        }

        tally
    }

    fn share(&self, n: usize) -> String {
        format!("{:.2}%", n as f64 * 100.0 / self.words.max(1) as f64)
    }

    fn tsv_row(&self) -> Vec<String> {
        vec![
            self.first.to_string(),
            self.top_five.to_string(),
            self.anywhere.to_string(),
            self.no_suggestions.to_string(),
            self.missing.to_string(),
        ]
    }
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} words: first {}, top five {}, listed {}, absent {}, no suggestions {} ({}µs..{}µs)",
            self.words,
            self.share(self.first),
            self.share(self.top_five),
            self.share(self.anywhere),
            self.share(self.missing),
            self.share(self.no_suggestions),
            self.fastest_micros,
            self.slowest_micros
        )
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    dictionary: &'a Path,
    terms: usize,
    config: &'a SpellerConfig,
    tally: &'a Tally,
    elapsed_micros: u64,
    lookups: &'a [Lookup<'a>],
}

fn git(args: &[&str]) -> String {
    std::process::Command::new("git")
        .args(args)
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn append_tsv(path: &Path, tally: &Tally) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if file.metadata()?.len() == 0 {
        writeln!(file, "commit\tdate\tdescribe\tfirst\ttop5\tlisted\tnone\tabsent")?;
    }

    let mut row = vec![
        git(&["rev-parse", "--short", "HEAD"]),
        Local::now().to_rfc3339(),
        git(&["describe", "--always"]),
    ];
    row.extend(tally.tsv_row());
    writeln!(file, "{}", row.join("\t"))
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let opts = Opts::from_args();

    let mut config = match &opts.config {
        Some(path) => SpellerConfig::from_json_file(path)?,
        None => SpellerConfig {
            n_best: Some(10),
            ..SpellerConfig::default()
        },
    };
    // results must not depend on what happens to be downloadable
    config.bootstrap = false;

    let speller = Speller::load(&opts.dictionary, None, config.clone())?;
    let typos = read_typos(&opts.words, opts.max_words)?;

    let bar = ProgressBar::new(typos.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar().template("{pos}/{len} [{percent}%] {wide_bar} {elapsed_precise}"),
    );

    let started = Instant::now();
    let lookups: Vec<Lookup<'_>> = typos
        .par_iter()
        .progress_with(bar)
        .map(|typo| {
            let now = Instant::now();
            let suggestions = speller.suggest(&typo.input);
            let micros = micros(now.elapsed());

            Lookup {
                input: &typo.input,
                expected: &typo.expected,
                edit_distance: damerau_levenshtein(&typo.input, &typo.expected),
                outcome: Outcome::of(&typo.expected, &suggestions),
                suggestions,
                micros,
            }
        })
        .collect();
    let elapsed = started.elapsed();

    let tally = Tally::count(&lookups);
    println!("{}", tally);

    if let Some(path) = &opts.json_output {
        let report = Report {
            dictionary: &opts.dictionary,
            terms: speller.dictionary_len(),
            config: &config,
            tally: &tally,
            elapsed_micros: micros(elapsed),
            lookups: &lookups,
        };
        serde_json::to_writer_pretty(File::create(path)?, &report)?;
        println!("report written to {}", path.display());
    }

    if let Some(path) = &opts.tsv_output {
        append_tsv(path, &tally)?;
    }

    Ok(())
}
