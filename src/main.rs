use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use wayfinder::config::Config;
use wayfinder::insight::{ConversationTracker, HIGH_CONFIDENCE, STRONG_THEME};
use wayfinder::lexicon::LexicalCategory;
use wayfinder::llm::{LlmProvider, create_llm_provider};
use wayfinder::session::{
    GenerationSettings, InterviewSession, SessionProgress, StageTransition, TurnOutcome,
};
use wayfinder::style::StyleSummary;
use wayfinder::util::{title_case, truncate_chars};

#[derive(Parser)]
#[command(
    name = "wayfinder",
    version,
    about = "Guided interview that discovers strengths, passions and values"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start or resume an interactive interview.
    Interview {
        /// Saved session file to continue.
        #[arg(long)]
        resume: Option<PathBuf>,
    },

    /// Print the assessment for a saved session.
    Report {
        /// Saved session file.
        file: PathBuf,

        /// Emit JSON instead of a formatted report.
        #[arg(long)]
        json: bool,
    },
}

const HELP: &str = "\
Commands:
  progress  Show where the interview stands
  insights  Show the strongest insights so far
  style     Show the detected communication style
  skip      Move on to the next stage
  report    Show the strengths assessment
  save      Save the session
  help      Show this list
  quit      Save and leave (also: exit, bye)";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wayfinder=info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Interview { resume } => run_interview(resume).await,
        Commands::Report { file, json } => {
            let session = InterviewSession::load(&file)?;
            let assessment = session.assessment();
            if json {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                termimad::print_text(&assessment.to_markdown());
            }
            Ok(())
        }
    }
}

async fn run_interview(resume: Option<PathBuf>) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let llm = create_llm_provider(&config.llm)?;
    let session_dir = config.engine.session_dir.clone();

    let session = match resume {
        Some(path) => {
            let (session, error) = InterviewSession::load_or_fresh(&path, &config.engine);
            if let Some(e) = error {
                eprintln!("Could not resume {}: {}", path.display(), e);
                eprintln!("Starting a fresh session instead.");
            }
            session
        }
        None => InterviewSession::new(&config.engine),
    };
    let mut session = session.with_generation(GenerationSettings::from(&config.llm));

    println!("Wayfinder");
    println!("=========\n");
    println!("A guided conversation about your strengths, passions and values.");
    println!("Type 'help' for commands.\n");

    match session.opening_question() {
        Some(question) => println!("Guide: {question}\n"),
        None => println!("This session is already complete. Type 'report' to see the results.\n"),
    }

    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                finish(&mut session, &session_dir);
                break;
            }
            Err(e) => return Err(e.into()),
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "bye" => {
                finish(&mut session, &session_dir);
                break;
            }
            "save" => save(&mut session, &session_dir),
            "progress" => print_progress(&session.progress(), session.tracker()),
            "insights" => print_insights(session.tracker()),
            "style" => print_style(&session.profiler().summary()),
            "report" => termimad::print_text(&session.assessment().to_markdown()),
            "help" => println!("{HELP}\n"),
            "skip" => match session.skip_stage() {
                Some(transition) => {
                    print_transition(transition, session.tracker());
                    match session.opening_question() {
                        Some(question) => println!("Guide: {question}\n"),
                        None => println!("The interview is complete. Type 'report' to see the results.\n"),
                    }
                }
                None => println!("The interview is already complete.\n"),
            },
            _ => take_turn(&mut session, llm.as_ref(), input).await,
        }
    }

    Ok(())
}

async fn take_turn(session: &mut InterviewSession, llm: &dyn LlmProvider, input: &str) {
    match session.take_turn(llm, input).await {
        TurnOutcome::Ignored => {}
        TurnOutcome::Completed => {
            println!("The interview is complete. Type 'report' to see the results.\n");
        }
        TurnOutcome::Replied(turn) => {
            println!("\nGuide: {}\n", turn.reply);
            if let Some(transition) = turn.transition {
                print_transition(transition, session.tracker());
            }
            match &turn.next_question {
                Some(question) => println!("Guide: {}\n", question.text),
                None => {
                    println!("That completes the interview. Here is what emerged:\n");
                    termimad::print_text(&session.assessment().to_markdown());
                }
            }
        }
    }
}

fn print_transition(transition: StageTransition, tracker: &ConversationTracker) {
    match transition.to {
        Some(stage) => println!("--- Moving to {} Stage ---", stage.label()),
        None => println!("--- Interview complete ---"),
    }
    let strong: Vec<String> = tracker
        .ranked_themes(STRONG_THEME)
        .into_iter()
        .take(2)
        .map(|t| t.kind.to_string())
        .collect();
    if !strong.is_empty() {
        println!("Strong themes so far: {}", strong.join(", "));
    }
    println!();
}

fn print_progress(progress: &SessionProgress, tracker: &ConversationTracker) {
    println!("\nProgress");
    println!("--------");
    match progress.current_stage {
        Some(stage) => println!("  Current stage:     {}", stage.label()),
        None => println!("  Current stage:     complete"),
    }
    println!("  Completion:        {:.0}%", progress.completion_percent);
    println!("  Responses:         {}", progress.total_responses);
    println!(
        "  Exchanges:         {}",
        progress.conversation.total_exchanges
    );
    println!(
        "  Key insights:      {}",
        progress.conversation.high_confidence_insights
    );
    println!(
        "  Patterns found:    {}",
        progress.questioning.high_confidence_patterns
    );

    let themes = tracker.ranked_themes(0.0);
    if !themes.is_empty() {
        println!("  Top themes:");
        for theme in themes.into_iter().take(3) {
            println!(
                "    - {} (strength {:.1})",
                title_case(theme.kind.as_str()),
                theme.strength
            );
        }
    }
    println!();
}

fn print_insights(tracker: &ConversationTracker) {
    let high: Vec<_> = tracker
        .insights()
        .iter()
        .filter(|i| i.confidence >= HIGH_CONFIDENCE)
        .collect();
    if high.is_empty() {
        println!("No high-confidence insights discovered yet.\n");
        return;
    }
    println!("\nKey insights:");
    for insight in high.iter().skip(high.len().saturating_sub(3)) {
        println!(
            "  • {}: {}... (confidence: {:.2})",
            insight.stage.label(),
            truncate_chars(&insight.content, 100),
            insight.confidence
        );
    }
    println!();
}

fn print_style(summary: &StyleSummary) {
    match summary {
        StyleSummary::InsufficientData { samples_needed } => {
            println!(
                "Building communication profile... need {samples_needed} more response(s).\n"
            );
        }
        StyleSummary::Profiled {
            primary,
            secondary,
            depth,
            confidence,
            samples,
            ..
        } => {
            println!("\nCommunication style");
            println!("  Primary:     {}", title_case(primary.as_str()));
            if let Some(secondary) = secondary {
                println!("  Secondary:   {}", title_case(secondary.as_str()));
            }
            println!("  Depth:       {}", title_case(depth.as_str()));
            println!("  Confidence:  {confidence:.2}");
            println!("  Samples:     {samples}\n");
        }
    }
}

fn save(session: &mut InterviewSession, dir: &Path) {
    match session.save_in(dir) {
        Ok(path) => println!("Session saved to {}\n", path.display()),
        Err(e) => eprintln!("Failed to save session: {e}\n"),
    }
}

fn finish(session: &mut InterviewSession, dir: &Path) {
    let conversation = session.tracker().summary();
    println!("\nSession summary");
    println!("  Exchanges:  {}", conversation.total_exchanges);
    println!("  Insights:   {}", conversation.insights_count);
    println!("  Themes:     {}", conversation.themes.len());
    if let Some(profile) = session.profiler().profile() {
        println!("  Style:      {}", title_case(profile.primary.as_str()));
    }
    save(session, dir);
}
