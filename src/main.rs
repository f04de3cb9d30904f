// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dotenvy::dotenv;
use prepquiz::api::ApiClient;
use prepquiz::auth::{AuthSession, AuthStatus};
use prepquiz::config::Config;
use prepquiz::engine::{QuizOutcome, QuizRunner, Step, SubmissionStatus, TimerEvent};
use prepquiz::error::AppError;
use prepquiz::models::quiz::QuestionType;
use prepquiz::state::AppState;
use prepquiz::storage::SqliteStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: prepquiz \"topic=big_o&difficulty=junior&mode=practice&size=5\" [attempt_id]";

const HELP: &str = "commands: a <answer> | s (submit) | n (next) | p (previous) | g <number> | h <level> | r (retry save) | q (quit)";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();

    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(query) = args.next() else {
        eprintln!("{}", USAGE);
        return Err(AppError::Validation("missing quiz settings".to_string()));
    };
    let attempt_id = args.next();

    let store = SqliteStore::connect(&config.store_url).await?;
    tracing::info!("Local store ready at {}", config.store_url);

    let client = ApiClient::new(&config.api_url)?;
    if let Some(token) = config.access_token.clone() {
        client.set_access_token(Some(token));
    }

    let mut auth = AuthSession::new(client.clone());
    let signed_in = auth.bootstrap().await == AuthStatus::Authed;
    if !signed_in {
        println!("Not signed in; results stay on this machine and are not saved to your history.");
    }

    let state = AppState::with_single_store(Arc::new(client), Arc::new(store));
    let mut runner = QuizRunner::open(&state, &query, attempt_id, Utc::now())
        .await?
        .with_authentication(signed_in);

    println!("{}", HELP);
    show_question(&runner);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut clock = tokio::time::interval(Duration::from_secs(1));
    let mut last_shown: Option<u32> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Failed to read stdin: {}", e);
                        break;
                    }
                };

                match handle_command(&mut runner, line.trim()).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => println!("! {}", e),
                }
            }
            _ = clock.tick() => {
                match runner.tick(Utc::now()).await {
                    Ok(TimerEvent::Remaining(remaining)) => {
                        // Announce once a minute, then every second of the last ten.
                        if (remaining % 60 == 0 || remaining <= 10) && last_shown != Some(remaining) {
                            println!("[{}:{:02} left]", remaining / 60, remaining % 60);
                            last_shown = Some(remaining);
                        }
                    }
                    Ok(TimerEvent::TimedOut(outcome)) => {
                        println!("Time is up.");
                        show_outcome(&outcome);
                    }
                    Ok(TimerEvent::Idle) => {}
                    Err(e) => tracing::error!("Timer tick failed: {}", e),
                }
            }
        }
    }

    Ok(())
}

/// Returns `Ok(false)` when the loop should stop.
async fn handle_command(runner: &mut QuizRunner, line: &str) -> Result<bool, AppError> {
    let (command, argument) = match line.split_once(' ') {
        Some((command, argument)) => (command, argument.trim()),
        None => (line, ""),
    };

    match command {
        "" => {}
        "a" => {
            runner.set_answer(argument).await?;
            println!("Answer saved.");
        }
        "s" => match runner.submit_current().await? {
            Some(feedback) => {
                if feedback.correct {
                    println!("Correct.");
                } else {
                    println!("Incorrect. Correct answer: {}", feedback.correct_answer);
                }
                if let Some(explanation) = feedback.explanation {
                    println!("{}", explanation);
                }
            }
            None => println!("Answer locked in."),
        },
        "n" => match runner.next(Utc::now()).await? {
            Step::Moved(_) => show_question(runner),
            Step::Finished(outcome) => show_outcome(&outcome),
        },
        "p" => {
            runner.previous().await?;
            show_question(runner);
        }
        "g" => {
            let number: usize = argument
                .parse()
                .map_err(|_| AppError::Validation(format!("not a question number: {}", argument)))?;
            runner.go_to(number.saturating_sub(1)).await?;
            show_question(runner);
        }
        "h" => {
            let level: u8 = argument
                .parse()
                .map_err(|_| AppError::Validation(format!("not a hint level: {}", argument)))?;
            let hint = runner.hint(level).await?;
            println!("Hint: {}", hint);
            println!("({} hints left)", runner.hints_remaining());
        }
        "r" => {
            let outcome = runner.retry_submit().await?;
            show_outcome(&outcome);
        }
        "q" => {
            if !runner.is_finished() {
                runner.quit().await?;
                println!("Quiz abandoned.");
            }
            return Ok(false);
        }
        _ => println!("{}", HELP),
    }

    Ok(true)
}

fn show_question(runner: &QuizRunner) {
    let Some(question) = runner.current_question() else {
        return;
    };
    let (position, total) = runner.progress();

    println!();
    println!("Question {}/{} [{}]", position, total, question.topic.label());
    println!("{}", question.prompt);
    if let Some(code) = &question.code {
        println!("{}", code);
    }
    if let (QuestionType::Mcq, Some(choices)) = (question.question_type, &question.choices) {
        for (key, text) in choices {
            println!("  {}) {}", key, text);
        }
    }

    let answer = runner.session().answer(&question.id);
    if !answer.is_empty() {
        println!("Your answer: {}", answer);
    }
    if let Some(remaining) = runner.remaining_seconds() {
        println!("Time left: {}:{:02}", remaining / 60, remaining % 60);
    }
}

fn show_outcome(outcome: &QuizOutcome) {
    let summary = &outcome.result.summary;
    println!();
    println!(
        "Score: {}% ({}/{} correct)",
        summary.percent, summary.correct, summary.total
    );
    if let (Some(used), Some(limit)) = (summary.time_used_sec, summary.time_limit_sec) {
        println!("Time used: {}s of {}s", used, limit);
    }

    match &outcome.submission {
        SubmissionStatus::Saved(attempt) => println!("Attempt saved ({}).", attempt.id),
        SubmissionStatus::AlreadySaved => println!("Attempt was already saved."),
        SubmissionStatus::Failed(e) => println!("Could not save attempt: {}. Type r to retry.", e),
        SubmissionStatus::Skipped => println!("Sign in to keep attempts in your history."),
    }
}
