//! Terminal output for the command-line front-end

use std::io::{self, BufRead, Write};

use crate::context::{Notice, TaskContext};
use crate::mods::Mod;
use crate::version::Version;

const ARROW: &str = "=>";

pub fn info(message: &str) {
    println!("{} {}", ARROW, message);
}

pub fn success(message: &str) {
    println!("{} {}", ARROW, message);
}

pub fn warning(message: &str) {
    println!("{} WARNING: {}", ARROW, message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", ARROW, message);
}

pub fn notice(kind: Notice, message: &str) {
    match kind {
        Notice::Info => info(message),
        Notice::Success => success(message),
        Notice::Warning => warning(message),
        Notice::Failure => error(message),
    }
}

/// `[step/total] message`
pub fn counter_line(step: usize, total: usize, message: &str) -> String {
    format!("[{}/{}] {}", step, total, message)
}

/// Suffix shown after a yes/no question
pub fn prompt_suffix(default: bool) -> &'static str {
    if default {
        "[Y/n]"
    } else {
        "[y/N]"
    }
}

/// Interpret an answer; an empty one picks `default`
pub fn parse_answer(answer: &str, default: bool) -> bool {
    match answer.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}

/// Ask a yes/no question on stdin. End of input counts as the default.
pub fn ask(question: &str, default: bool) -> bool {
    print!("{} {} {} ", ARROW, question, prompt_suffix(default));
    let _ = io::stdout().flush();

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(0) | Err(_) => default,
        Ok(_) => parse_answer(&answer, default),
    }
}

/// Context printing to the terminal and asking on stdin
pub fn task_context(assume_yes: bool) -> TaskContext {
    TaskContext::new(
        |kind, message| notice(kind, &message),
        |step, total, message| println!("{}", counter_line(step, total, &message)),
        ask,
        assume_yes,
    )
}

/// Two lines per mod: name, version and authors, then the description
pub fn mod_lines(m: &Mod, version: Option<&Version>) -> String {
    let version = version.unwrap_or(&m.version);
    format!(
        "{} {} by {}\n    {}",
        m.name,
        version,
        m.authors_string(),
        m.description
    )
}

/// Labels padded to a common width
pub fn table(rows: &[(&str, String)]) -> String {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| format!("{:<width$}  {}", label, value, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}
