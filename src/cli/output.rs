//! Coloured terminal output for merge summaries, duplicate checks and config
//! commands. `colored` honours NO_COLOR, CLICOLOR and CLICOLOR_FORCE.
//!
//! Documents (JSON responses, trees, TOML) go through [`info`] uncoloured so they
//! can be piped.

use std::fmt::Display;

use colored::Colorize;

pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Merge warnings such as skipped deletion, on stderr
pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "warning".yellow(), msg);
}

pub fn success(msg: &(impl Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

pub fn success_detail(msg: &(impl Display + ?Sized)) {
    println!("  {} {}", "✓".green(), msg);
}

pub fn failure(msg: &(impl Display + ?Sized)) {
    println!("  {} {}", "✗".red(), msg);
}

/// `Written: out.json`, `Created: .rigmerge.toml`
pub fn action(label: &str, msg: &(impl Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

pub fn header(msg: &(impl Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// One summary line; non-zero counts are highlighted.
pub fn count(label: &str, value: usize) {
    let shown = if value == 0 {
        value.to_string().dimmed()
    } else {
        value.to_string().bold()
    };
    println!("  {:<26} {}", label, shown);
}

pub fn info(msg: &(impl Display + ?Sized)) {
    println!("{}", msg);
}
