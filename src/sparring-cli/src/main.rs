//! Sparring CLI - AI Debate Engine
//!
//! Pits two personalities against each other in a three-round debate and
//! writes the transcript plus an analysis to a text file.

use clap::Parser;
use colored::Colorize;
use sparring_core::{
    Config, DebateError, DebateEvent, DebateMetadata, DebateOrchestrator, DebateRequest,
    OpenAiGenerator, PersonalityStore, Speaker, TextFileExporter, TranscriptExporter,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "sparring",
    version,
    about = "AI Debate Engine - Watch two personalities debate a topic",
    long_about = "Runs a three-round debate (opening, pushback, reflection) between two AI personalities \
using an OpenAI-compatible API, then generates an analysis of how each side's thinking evolved."
)]
struct Cli {
    /// The topic to debate (asked for interactively if omitted)
    #[arg(value_name = "TOPIC")]
    topic: Option<String>,

    /// Personality id for Fighter A
    #[arg(short = 'a', long, value_name = "ID")]
    fighter_a: Option<String>,

    /// Personality id for Fighter B
    #[arg(short = 'b', long, value_name = "ID")]
    fighter_b: Option<String>,

    /// Who speaks first in the opening round (A or B)
    #[arg(short, long, value_name = "A|B")]
    leader: Option<Speaker>,

    /// Path to a TOML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Model name, overriding the config file
    #[arg(short, long, value_name = "MODEL")]
    model: Option<String>,

    /// Directory for saved transcripts, overriding the config file
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Seconds to pause between rounds, overriding the config file
    #[arg(long, value_name = "SECS")]
    round_delay: Option<u64>,

    /// Do not save the transcript
    #[arg(long)]
    no_save: bool,

    /// List available personalities and exit
    #[arg(long)]
    list: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "sparring_core=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(model) = &cli.model {
        config.generator.model = model.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.debate.output_dir = dir.clone();
    }
    if let Some(secs) = cli.round_delay {
        config.debate.round_delay_secs = secs;
    }

    let personalities = config.personality_store().unwrap_or_else(|e| fail(&e));
    let templates = config.template_store().unwrap_or_else(|e| fail(&e));

    if cli.list {
        print_personalities(&personalities);
        return Ok(());
    }

    // Get API configuration from environment
    let api_base = env::var("OPENAI_API_BASE")
        .or_else(|_| env::var("OPENAI_BASE_URL"))
        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

    let api_key = env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
        eprintln!(
            "{}",
            "Warning: OPENAI_API_KEY not set. API calls may fail.".yellow()
        );
        String::new()
    });

    let request = gather_request(&cli, &personalities)?;
    debug!(?request, "Debate request");

    let generator = OpenAiGenerator::new(config.generator_config(&api_base, &api_key))?;
    let model = generator.model().to_string();

    print_header(&request, &personalities, &model);

    let orchestrator = DebateOrchestrator::new(
        Arc::new(generator),
        personalities,
        templates,
        config.debate_settings(),
    )
    .with_callback(create_console_callback());

    let outcome = match orchestrator.run_debate(&request).await {
        Ok(outcome) => outcome,
        Err(e) => fail(&e),
    };

    if !cli.no_save {
        let exporter = TextFileExporter::new(&config.debate.output_dir);
        let path = exporter.export(
            &DebateMetadata::from_outcome(&outcome),
            &outcome.history,
            &outcome.summary,
        )?;
        println!("{} {}", "Debate saved to".bold(), path.display());
    }

    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!("{}", "  Debate concluded.".bright_green().bold());
    println!("{}", "═".repeat(70).bright_blue());
    println!();

    Ok(())
}

/// Print a fatal error and exit.
fn fail(error: &DebateError) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), error);
    std::process::exit(1);
}

fn print_personalities(personalities: &PersonalityStore) {
    println!("{}", "Available personalities:".bold());
    for p in personalities.list() {
        println!("  - {} ({})", p.name.bright_cyan(), p.id.dimmed());
    }
}

/// Fill in anything missing from the command line by asking on stdin.
fn gather_request(cli: &Cli, personalities: &PersonalityStore) -> io::Result<DebateRequest> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let interactive = cli.topic.is_none() || cli.fighter_a.is_none() || cli.fighter_b.is_none();

    if interactive {
        println!();
        println!("{}", "=== AI DEBATE ENGINE ===".bright_blue().bold());
        println!();
    }

    let topic = match &cli.topic {
        Some(topic) => topic.clone(),
        None => ask(&mut input, "Enter the debate topic/problem: ")?,
    };

    if cli.fighter_a.is_none() || cli.fighter_b.is_none() {
        println!();
        print_personalities(personalities);
        println!();
    }

    let fighter_a = match &cli.fighter_a {
        Some(id) => id.clone(),
        None => ask_until(&mut input, "Select Fighter A (enter key): ", |id| {
            personalities.resolve(id).is_ok()
        })?,
    };

    let fighter_b = match &cli.fighter_b {
        Some(id) => id.clone(),
        None => ask_until(&mut input, "Select Fighter B (enter key): ", |id| {
            personalities.resolve(id).is_ok() && !id.trim().eq_ignore_ascii_case(fighter_a.trim())
        })?,
    };

    let leader = match cli.leader {
        Some(leader) => leader,
        None if interactive => {
            let name = |id: &str| {
                personalities
                    .resolve(id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|_| id.to_string())
            };
            let prompt = format!(
                "Who leads the debate? (A for {}, B for {}): ",
                name(&fighter_a),
                name(&fighter_b)
            );
            let answer = ask_until(&mut input, &prompt, |s| s.parse::<Speaker>().is_ok())?;
            answer.parse::<Speaker>().unwrap_or(Speaker::A)
        }
        None => Speaker::A,
    };

    Ok(DebateRequest {
        topic,
        personality_a: fighter_a,
        personality_b: fighter_b,
        leader,
    })
}

fn ask(input: &mut impl BufRead, prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
    }
    Ok(line.trim().to_string())
}

fn ask_until(
    input: &mut impl BufRead,
    prompt: &str,
    valid: impl Fn(&str) -> bool,
) -> io::Result<String> {
    let mut answer = ask(input, prompt)?;
    while !valid(&answer) {
        answer = ask(input, &format!("Invalid selection. {}", prompt))?;
    }
    Ok(answer)
}

fn print_header(request: &DebateRequest, personalities: &PersonalityStore, model: &str) {
    let name = |id: &str| {
        personalities
            .resolve(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|_| id.to_string())
    };
    let leader_id = match request.leader {
        Speaker::A => &request.personality_a,
        Speaker::B => &request.personality_b,
    };

    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!(
        "{}",
        format!(
            "  {} - {} vs {}",
            "DEBATE".bold(),
            name(&request.personality_a),
            name(&request.personality_b)
        )
        .bright_blue()
        .bold()
    );
    println!("{}", "═".repeat(70).bright_blue());
    println!();
    println!("{} {}", "Topic:".bold(), request.topic.bright_white());
    println!(
        "{} {} ({}, speaks first in the opening round)",
        "Leading:".bold(),
        name(leader_id).bright_cyan(),
        request.leader.label().yellow()
    );
    println!("{} {}", "Model:".bold(), model.dimmed());
    println!();
    println!("{}", "─".repeat(70).dimmed());
}

/// Create a callback that prints debate events to the console.
fn create_console_callback() -> Box<dyn Fn(DebateEvent) + Send + Sync> {
    Box::new(move |event| match event {
        DebateEvent::DebateStart { .. } => {
            println!("{}", "Starting debate...".dimmed());
        }
        DebateEvent::RoundStart {
            number,
            title,
            instruction,
        } => {
            println!();
            println!("{}", "═".repeat(70).bright_magenta());
            println!(
                "{}",
                format!("  ROUND {}: {}", number, title)
                    .bright_magenta()
                    .bold()
            );
            println!("  {}", instruction.dimmed());
            println!("{}", "═".repeat(70).bright_magenta());
            println!();
        }
        DebateEvent::SpeakerStart { name, speaker } => {
            println!(
                "{} {} {}",
                "▶".bright_cyan(),
                name.bright_cyan().bold(),
                format!("({})", speaker.label()).yellow()
            );
        }
        DebateEvent::SpeakerMessage { name: _, content } => {
            print_wrapped(&content);
            println!();
        }
        DebateEvent::RoundBreak { delay } => {
            println!("{}", format!("Moving to next round{}", pause_hint(delay)).dimmed());
        }
        DebateEvent::SummaryStart => {
            println!();
            println!("{}", "═".repeat(70).bright_green());
            println!("{}", "  DEBATE SUMMARY".bright_green().bold());
            println!("{}", "═".repeat(70).bright_green());
            println!("{}", "Generating summary...".dimmed());
            println!();
        }
        DebateEvent::DebateEnd { summary } => {
            print_wrapped(&summary);
            println!();
        }
    })
}

fn pause_hint(delay: Duration) -> String {
    format!(" (pausing {}s)...", delay.as_secs())
}

/// Wrap and indent each paragraph, keeping blank lines between them.
fn print_wrapped(text: &str) {
    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            println!();
            continue;
        }
        for line in textwrap(paragraph, 66).lines() {
            println!("  {}", line);
        }
    }
}

/// Simple text wrapping function.
fn textwrap(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut current_line_len = 0;

    for word in text.split_whitespace() {
        if current_line_len + word.len() + 1 > width && current_line_len > 0 {
            result.push('\n');
            current_line_len = 0;
        }
        if current_line_len > 0 {
            result.push(' ');
            current_line_len += 1;
        }
        result.push_str(word);
        current_line_len += word.len();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textwrap_breaks_long_lines() {
        let wrapped = textwrap("one two three four five", 9);
        assert_eq!(wrapped, "one two\nthree\nfour five");
    }

    #[test]
    fn test_ask_until_reprompts() {
        let mut input = io::Cursor::new("x\nB\n");
        let answer = ask_until(&mut input, "Leader? ", |s| s.parse::<Speaker>().is_ok()).unwrap();
        assert_eq!(answer, "B");
    }

    #[test]
    fn test_ask_eof() {
        let mut input = io::Cursor::new("");
        assert!(ask(&mut input, "Topic: ").is_err());
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "sparring",
            "Is discipline more important than motivation?",
            "-a",
            "goggins",
            "-b",
            "robbins",
            "--leader",
            "B",
            "--no-save",
        ])
        .unwrap();
        assert_eq!(cli.fighter_a.as_deref(), Some("goggins"));
        assert_eq!(cli.leader, Some(Speaker::B));
        assert!(cli.no_save);
    }
}
