use anyhow::Result;
use faqbot_core::{ocr_available, Assistant, ChatSession, Role, TextGenerator};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Clear,
    History,
    Help,
    Attach(&'a str),
    Detach,
    /// `file:<path>` attaches a file for the next question only.
    FileTurn(&'a str),
    Question(&'a str),
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if let Some(path) = trimmed.strip_prefix("file:") {
            return Self::FileTurn(path.trim());
        }

        let (head, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (trimmed, ""),
        };
        match (head.to_ascii_lowercase().as_str(), rest) {
            ("quit" | "exit", "") => Self::Quit,
            ("clear", "") => Self::Clear,
            ("history", "") => Self::History,
            ("help", "") => Self::Help,
            ("detach", "") => Self::Detach,
            ("attach", path) if !path.is_empty() => Self::Attach(path),
            _ => Self::Question(trimmed),
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  attach <path>   use a pdf, png, jpg, jpeg or txt file as context");
    println!("  detach          stop using the attached file");
    println!("  file:<path>     attach a file for the next question only");
    println!("  history         show this conversation");
    println!("  clear           clear the conversation");
    println!("  quit            exit");
}

fn print_history(session: &ChatSession) {
    if session.is_empty() {
        println!("(no messages)");
        return;
    }
    for turn in session.turns() {
        let who = match turn.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        println!("[{}] {who}: {}", turn.at.format("%H:%M:%S"), turn.content);
    }
}

fn prompt(session: &ChatSession) -> String {
    match session.attachment().and_then(Path::file_name) {
        Some(name) => format!("[{}] question> ", name.to_string_lossy()),
        None => "question> ".to_string(),
    }
}

/// `model_status` is the outcome of the startup health check, shown in the
/// banner.
pub fn run<G: TextGenerator>(assistant: &Assistant<G>, model_status: &str) -> Result<()> {
    println!(
        "FAQ assistant ready: {} entries, match threshold {}, OCR {}.",
        assistant.entries().len(),
        assistant.threshold(),
        if ocr_available() { "available" } else { "unavailable" }
    );
    println!("Model service {model_status}.");
    println!("Type 'help' for commands or 'quit' to exit.");

    let mut rl = DefaultEditor::new()?;
    let mut session = ChatSession::new();

    loop {
        let line = match rl.readline(&prompt(&session)) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        rl.add_history_entry(trimmed).ok();

        match Input::parse(trimmed) {
            Input::Quit => {
                println!("Goodbye!");
                break;
            }
            Input::Clear => {
                session.clear();
                println!("Chat cleared.");
            }
            Input::History => print_history(&session),
            Input::Help => print_help(),
            Input::Attach(path) => {
                if session.attach(path) {
                    println!("File attached: {path}");
                }
            }
            Input::Detach => {
                if let Some(path) = session.detach() {
                    println!("File detached: {}", path.display());
                }
            }
            Input::FileTurn(path) => {
                let question = match rl.readline("Please enter your question about the file: ") {
                    Ok(q) => q,
                    Err(ReadlineError::Interrupted) => continue,
                    Err(ReadlineError::Eof) => break,
                    Err(e) => return Err(e.into()),
                };
                let question = question.trim();
                if question.is_empty() {
                    continue;
                }
                let response = session.ask_with(assistant, question, Some(Path::new(path)));
                println!("\n{response}\n");
            }
            Input::Question(question) => {
                let response = session.ask(assistant, question);
                println!("\n{response}\n");
            }
        }
    }

    Ok(())
}
