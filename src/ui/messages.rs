use crate::utils::colors::{BLUE, BOLD, GREEN, RED, RESET, YELLOW};
use std::fmt;

#[derive(Clone, Copy)]
enum Kind {
    Info,
    Success,
    Warning,
    Error,
}

impl Kind {
    fn style(self) -> (&'static str, &'static str) {
        match self {
            Kind::Info => (BLUE, "ℹ️"),
            Kind::Success => (GREEN, "✅"),
            Kind::Warning => (YELLOW, "⚠️"),
            Kind::Error => (RED, "❌"),
        }
    }
}

fn emit<T: fmt::Display>(kind: Kind, msg: T) {
    let (color, icon) = kind.style();
    let line = format!("{color}{BOLD}{icon}{RESET} {msg}");
    match kind {
        Kind::Error => eprintln!("{line}"),
        _ => println!("{line}"),
    }
}

pub fn info<T: fmt::Display>(msg: T) {
    emit(Kind::Info, msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    emit(Kind::Success, msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    emit(Kind::Warning, msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    emit(Kind::Error, msg);
}

/// Section header
pub fn header<T: fmt::Display>(msg: T) {
    println!("{BLUE}{BOLD}== {msg} =={RESET}");
}
