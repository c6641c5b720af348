//! Output formatting utilities for the Artifact CLI.
//!
//! Supports table and JSON output formats.

use clap::ValueEnum;
use colored::*;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

/// Output format selection.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Render as a formatted table
    #[default]
    Table,
    /// Render as JSON
    Json,
}

/// Print a success message to stdout.
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// Print an error message to stderr.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), msg);
}

/// Print a section header.
pub fn print_header(title: &str) {
    println!("{}", title.bold().underline());
}

/// Print an aligned key/value detail line.
pub fn print_detail(key: &str, value: &str) {
    println!("  {:<14} {}", format!("{}:", key).dimmed(), value);
}

/// Print a list of items in the requested format.
pub fn print_list<T: Tabled + Serialize>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No results found.".dimmed());
                return;
            }
            let table = Table::new(items)
                .with(Style::rounded())
                .with(Modify::new(Columns::first()).with(Alignment::left()))
                .to_string();
            println!("{}", table);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).expect("serialize to JSON");
            println!("{}", json);
        }
    }
}

/// Print a single item in the requested format.
pub fn print_item<T: Serialize>(item: &T, _format: OutputFormat) {
    let json = serde_json::to_string_pretty(item).expect("serialize to JSON");
    println!("{}", json);
}
