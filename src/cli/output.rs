use colored::{ColoredString, Colorize};
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "INFO",
        MessageKind::Success => "OK",
        MessageKind::Warning => "WARNING",
        MessageKind::Error => "ERROR",
        MessageKind::Section => "",
    }
}

pub fn format_message(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()).bold().to_string(),
        MessageKind::Info => format!("{}: {}", label(kind), text),
        MessageKind::Success => format!("{}: {}", label(kind), text).bright_green().to_string(),
        MessageKind::Warning => format!("{}: {}", label(kind), text).bright_yellow().to_string(),
        MessageKind::Error => format!("{}: {}", label(kind), text).bright_red().to_string(),
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    println!("{}", format_message(kind, message));
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

/// Signed yen amount, green for non-negative and red otherwise.
pub fn signed_yen(amount: i64) -> ColoredString {
    let text = format!(
        "{}{}円",
        if amount < 0 { "-" } else { "+" },
        crate::domain::record::format_yen(amount.unsigned_abs())
    );
    if amount < 0 {
        text.red()
    } else {
        text.green()
    }
}

/// Calendar day number tinted by expense heat.
pub fn heat_cell(text: &str, level: u8, is_today: bool) -> ColoredString {
    let styled = match level {
        0 => text.normal(),
        1 => text.yellow(),
        2 => text.bright_yellow(),
        3 => text.red(),
        _ => text.bright_red(),
    };
    if is_today {
        styled.bold().underline()
    } else {
        styled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_their_label() {
        colored::control::set_override(false);
        assert_eq!(format_message(MessageKind::Info, "hello"), "INFO: hello");
        assert_eq!(format_message(MessageKind::Error, "boom"), "ERROR: boom");
        assert_eq!(format_message(MessageKind::Section, " March "), "=== March ===");
        assert_eq!(signed_yen(-1500).to_string(), "-1,500円");
        assert_eq!(signed_yen(0).to_string(), "+0円");
    }
}
