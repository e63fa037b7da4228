//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark) to stderr
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{} {}", "✓".green(), msg);
}

/// Print failure status (red X, indented) to stderr
pub fn failure(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print progress line (green) to stderr
pub fn progress(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{} {}", label.green(), msg);
}

/// Print section header (yellow) to stderr
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}", msg.to_string().yellow());
}

/// Print preview tree (dimmed) to stderr
pub fn tree(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}", msg.to_string().dimmed());
}

/// Print plain output (no color, for bundle text and data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Entry file label: `[MAIN]` in bold green
pub fn main_label(label: &str) -> String {
    format!("[{}]", label).green().bold().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_plain_output_when_labelling_entry_then_label_is_bracketed() {
        colored::control::set_override(false);
        assert_eq!(main_label("MAIN"), "[MAIN]");
        colored::control::unset_override();
    }
}
