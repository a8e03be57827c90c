use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

/// Disables ANSI colouring, e.g. when output is piped or `--plain` is passed.
pub fn set_plain(plain: bool) {
    if plain {
        colored::control::set_override(false);
    }
}

pub fn format_message(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()).bold().to_string(),
        MessageKind::Info => text,
        MessageKind::Success => format!("[ok] {text}").bright_green().to_string(),
        MessageKind::Warning => format!("[!] {text}").bright_yellow().to_string(),
        MessageKind::Error => format!("[x] {text}").bright_red().to_string(),
    }
}

pub fn info(message: impl fmt::Display) {
    println!("{}", format_message(MessageKind::Info, message));
}

pub fn success(message: impl fmt::Display) {
    println!("{}", format_message(MessageKind::Success, message));
}

pub fn warning(message: impl fmt::Display) {
    println!("{}", format_message(MessageKind::Warning, message));
}

pub fn error(message: impl fmt::Display) {
    eprintln!("{}", format_message(MessageKind::Error, message));
}

pub fn section(title: impl fmt::Display) {
    println!("\n{}", format_message(MessageKind::Section, title));
}
