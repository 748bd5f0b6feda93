use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use kundli_chat::{AnalysisRequest, AnalyticEphemeris, Config, Gazetteer, Session, SessionError};

/// Chat about a kundli: planetary positions, aspects and birth details.
#[derive(Parser, Debug)]
#[command(name = "kundli_chat", version)]
struct Cli {
    #[arg(long)]
    name: String,

    /// Date of birth, YYYY-MM-DD
    #[arg(long)]
    date: String,

    /// Local time of birth, HH:MM or HH:MM:SS
    #[arg(long)]
    time: String,

    /// Place of birth, e.g. "Guna, India"
    #[arg(long)]
    place: String,

    /// JSON config file; falls back to $KUNDLI_CHAT_CONFIG
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ask a question and exit; repeatable. Without it, questions are read from stdin.
    #[arg(long)]
    ask: Vec<String>,

    /// Print the computed chart as JSON before chatting
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = Config::load(cli.config.as_deref())?;
    let filter = env_logger::Env::default().default_filter_or(&config.log_filter);
    env_logger::Builder::from_env(filter).init();

    let ephemeris = AnalyticEphemeris::from_config(&config.ephemeris)?;
    let geocoder = Gazetteer::new();
    let mut session = Session::new();

    let request = AnalysisRequest {
        name: cli.name,
        date: cli.date,
        time: cli.time,
        place: cli.place,
    };
    let analyzer = session.analyze(&request, &geocoder, &ephemeris)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(analyzer)?);
    }
    if let Some(turn) = session.history().last() {
        println!("{turn}");
    }

    if !cli.ask.is_empty() {
        for question in &cli.ask {
            answer(&mut session, question);
        }
        return Ok(());
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if matches!(question, "quit" | "exit") {
            break;
        }
        answer(&mut session, question);
    }

    Ok(())
}

fn answer(session: &mut Session, question: &str) {
    match session.ask(question) {
        Ok(_) => {
            if let Some(turn) = session.history().last() {
                println!("{turn}");
            }
        }
        Err(e @ (SessionError::EmptyQuestion | SessionError::NotAnalyzed)) => eprintln!("{e}"),
        Err(e) => eprintln!("Error: {e}"),
    }
}
