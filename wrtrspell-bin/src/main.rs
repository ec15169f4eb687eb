use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use gumdrop::Options;
use serde::Serialize;

use wrtrspell::cursor::MisspelledEntry;
use wrtrspell::paths::{default_base_dictionary_path, default_user_dictionary_path};
use wrtrspell::position::{offset_to_position, Position};
use wrtrspell::session::SpellcheckSession;
use wrtrspell::speller::suggestion::Suggestion;
use wrtrspell::speller::{Speller, SpellerConfig};
use wrtrspell::tokenizer::Tokenize;

trait OutputWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool);
    fn write_suggestions(&mut self, word: &str, suggestions: &[Suggestion]);
    fn write_misspelling(&mut self, source: &str, position: Position, entry: &MisspelledEntry);
    fn finish(&mut self) -> anyhow::Result<()>;
}

struct StdoutWriter;

impl OutputWriter for StdoutWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool) {
        println!(
            "Input: {}\t\t[{}]",
            &word,
            if is_correct { "CORRECT" } else { "INCORRECT" }
        );
    }

    fn write_suggestions(&mut self, _word: &str, suggestions: &[Suggestion]) {
        for sugg in suggestions {
            println!("{}\t\t{}\t{}", sugg.value, sugg.distance, sugg.frequency);
        }
        println!();
    }

    fn write_misspelling(&mut self, source: &str, position: Position, entry: &MisspelledEntry) {
        let suggestions = entry
            .suggestions
            .iter()
            .map(|s| s.value.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{}:{}:{}\t{} -> {}",
            source,
            position.row + 1,
            position.column + 1,
            entry.word,
            if suggestions.is_empty() { "?" } else { &suggestions }
        );
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Serialize)]
struct SuggestionRequest {
    word: String,
    is_correct: bool,
    suggestions: Vec<Suggestion>,
}

#[derive(Serialize)]
struct MisspellingReport {
    source: String,
    row: usize,
    column: usize,
    #[serde(flatten)]
    entry: MisspelledEntry,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonWriter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    results: Vec<SuggestionRequest>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    misspellings: Vec<MisspellingReport>,
}

impl JsonWriter {
    pub fn new() -> JsonWriter {
        JsonWriter {
            results: vec![],
            misspellings: vec![],
        }
    }
}

impl OutputWriter for JsonWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool) {
        self.results.push(SuggestionRequest {
            word: word.to_owned(),
            is_correct,
            suggestions: vec![],
        });
    }

    fn write_suggestions(&mut self, _word: &str, suggestions: &[Suggestion]) {
        if let Some(last) = self.results.last_mut() {
            last.suggestions = suggestions.to_vec();
        }
    }

    fn write_misspelling(&mut self, source: &str, position: Position, entry: &MisspelledEntry) {
        self.misspellings.push(MisspellingReport {
            source: source.to_owned(),
            row: position.row,
            column: position.column,
            entry: entry.clone(),
        });
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

#[derive(Debug, Options)]
struct Args {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "frequency dictionary (term count per line)", meta = "PATH")]
    dictionary: Option<PathBuf>,

    #[options(no_short, help = "user dictionary file", meta = "PATH")]
    user_dictionary: Option<PathBuf>,

    #[options(help = "speller configuration in JSON", meta = "PATH")]
    config: Option<PathBuf>,

    #[options(command)]
    command: Option<Command>,
}

#[derive(Debug, Options)]
enum Command {
    #[options(help = "list misspelled words in Markdown files")]
    Check(CheckArgs),

    #[options(help = "get suggestions for provided input")]
    Suggest(SuggestArgs),

    #[options(help = "print input in word-separated tokenized form")]
    Tokenize(TokenizeArgs),

    #[options(help = "add words to the user dictionary")]
    Add(AddArgs),
}

#[derive(Debug, Options)]
struct CheckArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "files to check, stdin if none")]
    files: Vec<PathBuf>,
}

#[derive(Debug, Options)]
struct SuggestArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(short = "S", help = "always show suggestions even if word is correct")]
    always_suggest: bool,

    #[options(short = "n", help = "maximum number of results, 0 for all")]
    nbest: Option<usize>,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "words to be processed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct TokenizeArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(short = "s", long = "skipped", help = "show why tokens are skipped")]
    show_skipped: bool,

    #[options(free, help = "text to be tokenized")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct AddArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(free, help = "words to add")]
    words: Vec<String>,
}

fn read_stdin() -> anyhow::Result<String> {
    eprintln!("Reading from stdin...");
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("reading stdin")?;
    Ok(buffer)
}

fn load_config(args: &Args) -> anyhow::Result<SpellerConfig> {
    match args.config.as_ref() {
        Some(path) => Ok(SpellerConfig::from_json_file(path)?),
        None => Ok(SpellerConfig::default()),
    }
}

fn load_speller(args: &Args, config: SpellerConfig) -> anyhow::Result<Arc<Speller>> {
    let dictionary = args
        .dictionary
        .clone()
        .unwrap_or_else(default_base_dictionary_path);
    let user_dictionary = args
        .user_dictionary
        .clone()
        .unwrap_or_else(default_user_dictionary_path);

    log::debug!(
        "dictionary {}, user dictionary {}",
        dictionary.display(),
        user_dictionary.display()
    );

    Speller::load(&dictionary, Some(&user_dictionary), config)
        .with_context(|| format!("loading dictionary {}", dictionary.display()))
}

fn check(args: &Args, check_args: &CheckArgs) -> anyhow::Result<()> {
    let speller = load_speller(args, load_config(args)?)?;
    let mut session = SpellcheckSession::new(speller);

    let mut writer: Box<dyn OutputWriter> = if check_args.use_json {
        Box::new(JsonWriter::new())
    } else {
        Box::new(StdoutWriter)
    };

    let documents: Vec<(String, String)> = if check_args.files.is_empty() {
        vec![("<stdin>".to_string(), read_stdin()?)]
    } else {
        check_args
            .files
            .iter()
            .map(|path| {
                std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))
                    .map(|text| (path.display().to_string(), text))
            })
            .collect::<anyhow::Result<_>>()?
    };

    for (source, text) in documents {
        for entry in session.check_text(&text) {
            writer.write_misspelling(&source, offset_to_position(&text, entry.offset), entry);
        }
    }

    writer.finish()
}

fn suggest(args: &Args, suggest_args: &SuggestArgs) -> anyhow::Result<()> {
    let mut config = load_config(args)?;

    if let Some(v) = suggest_args.nbest {
        config.n_best = if v == 0 { None } else { Some(v) };
    }

    let speller = load_speller(args, config)?;

    let mut writer: Box<dyn OutputWriter> = if suggest_args.use_json {
        Box::new(JsonWriter::new())
    } else {
        Box::new(StdoutWriter)
    };

    let words: Vec<String> = if suggest_args.inputs.is_empty() {
        read_stdin()?
            .lines()
            .map(|x| x.trim().to_string())
            .filter(|x| !x.is_empty())
            .collect()
    } else {
        suggest_args.inputs.clone()
    };

    for word in words {
        let is_correct = speller.is_correct(&word);
        writer.write_correction(&word, is_correct);

        if suggest_args.always_suggest || !is_correct {
            writer.write_suggestions(&word, &speller.suggest(&word));
        }
    }

    writer.finish()
}

fn tokenize(args: &Args, tokenize_args: &TokenizeArgs) -> anyhow::Result<()> {
    let inputs: String = if tokenize_args.inputs.is_empty() {
        read_stdin()?
    } else {
        tokenize_args.inputs.join(" ")
    };

    if tokenize_args.show_skipped {
        let speller = load_speller(args, load_config(args)?)?;
        for (token, reason) in speller.classify(&inputs) {
            match reason {
                Some(reason) => println!("{:>4}: \"{}\"\t({})", token.offset, token.text, reason),
                None => println!("{:>4}: \"{}\"", token.offset, token.text),
            }
        }
    } else {
        for (index, token) in inputs.word_indices() {
            println!("{:>4}: \"{}\"", index, token);
        }
    }

    Ok(())
}

fn add(args: &Args, add_args: &AddArgs) -> anyhow::Result<()> {
    let speller = load_speller(args, load_config(args)?)?;

    for word in &add_args.words {
        if speller.add_to_dictionary(word) {
            println!("added {}", word);
        } else {
            println!("{} is already in the user dictionary", word);
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse_args_default_or_exit();

    match args.command.as_ref() {
        None => Ok(()),
        Some(Command::Check(cmd)) => check(&args, cmd),
        Some(Command::Suggest(cmd)) => suggest(&args, cmd),
        Some(Command::Tokenize(cmd)) => tokenize(&args, cmd),
        Some(Command::Add(cmd)) => add(&args, cmd),
    }
}
