//! # imsg-export CLI
//!
//! Command-line interface for the imsg-export library.

use std::io::Write;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use imsg_export::archive::ChatDatabase;
use imsg_export::cli::Args;
use imsg_export::contacts::{CsvContactSource, MacContactsSource, load_directory};
use imsg_export::export::{ExportReport, Exporter};
use imsg_export::identity::{NameDirectory, digits_only, lookup_keys};
use imsg_export::progress::{Progress, ProgressCallback};
use imsg_export::ExportError;

/// Sample mappings and unmatched numbers shown in the summary.
const SAMPLE_SIZE: usize = 5;

fn main() {
    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), ExportError> {
    let total_start = Instant::now();
    let args = <Args as ClapParser>::parse();
    init_tracing(args.verbose);

    let output_dir = args.output_dir();
    let db_path = args
        .database_path()
        .ok_or_else(|| ExportError::database_not_found("~/Library/Messages/chat.db"))?;

    // Print header
    println!("📦 imsg-export v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Database: {}", db_path.display());
    println!("💾 Output:   {}", output_dir.display());
    println!("📄 Format:   {}", args.format);
    println!();

    // Step 1: Contacts (never fatal)
    let directory = if args.no_contacts {
        println!("⏭️  Skipping contacts (--no-contacts)");
        NameDirectory::new()
    } else {
        load_contacts(&args)
    };
    println!();

    // Step 2: Open the archive
    println!("📱 Reading Messages database...");
    let db = ChatDatabase::open(&db_path)?;

    // Step 3: Export
    let progress: ProgressCallback = Arc::new(|p: Progress| {
        if let Some(total) = p.total_items {
            print!(
                "\r   [{}/{}] {:<40}",
                p.items_processed,
                total,
                truncate(p.current.as_deref().unwrap_or(""), 40)
            );
            let _ = std::io::stdout().flush();
        }
    });
    let report = Exporter::new(&db, &directory, args.export_config())
        .with_progress(progress)
        .run()?;
    println!();

    print_summary(&report);
    print_unmatched(&report, &directory);

    println!();
    println!("📁 Saved to: {}", output_dir.display());
    println!("   Finished in {:.2}s", total_start.elapsed().as_secs_f64());

    Ok(())
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the name directory, falling back to an empty one on any error.
fn load_contacts(args: &Args) -> NameDirectory {
    let contacts_start = Instant::now();
    let result = if let Some(path) = &args.contacts {
        println!("📇 Loading contacts from {}...", path.display());
        load_directory(&CsvContactSource::new(path))
    } else {
        println!("📇 Loading contacts from the Contacts app...");
        let progress: ProgressCallback = Arc::new(|p: Progress| {
            if let (Some(total), Some(pct)) = (p.total_items, p.percentage()) {
                print!("\r   Progress: {}/{} ({:.0}%)", p.items_processed, total, pct);
                let _ = std::io::stdout().flush();
            }
        });
        let source = MacContactsSource::with_config(args.contacts_config()).with_progress(progress);
        let result = load_directory(&source);
        println!();
        result
    };

    match result {
        Ok((directory, accepted)) => {
            println!(
                "   Loaded {} contacts ({} lookup keys, {:.2}s)",
                accepted,
                directory.len(),
                contacts_start.elapsed().as_secs_f64()
            );
            print_sample(&directory);
            directory
        }
        Err(e) => {
            println!("⚠️  Could not load contacts: {}", e);
            println!("   Will use phone numbers instead");
            NameDirectory::new()
        }
    }
}

fn print_sample(directory: &NameDirectory) {
    if directory.is_empty() {
        return;
    }
    let mut entries: Vec<(&str, &str)> = directory.iter().collect();
    entries.sort_unstable();
    println!("   Sample:");
    for (key, name) in entries.into_iter().take(SAMPLE_SIZE) {
        println!("     {} → {}", key, name);
    }
}

fn print_summary(report: &ExportReport) {
    let stats = &report.stats;
    println!();
    println!("✅ DONE!");
    println!();
    println!("📊 Summary:");
    println!("   Exported:          {} conversations", stats.chats);
    println!(
        "   Matched contacts:  {}/{} ({:.1}%)",
        stats.matched,
        stats.chats,
        stats.match_rate()
    );
    println!("   Messages:          {}", stats.messages);
    println!("   Attachments:       {}", stats.attachments);
}

/// Shows the probes tried for the first few unresolved numbers.
fn print_unmatched(report: &ExportReport, directory: &NameDirectory) {
    if report.unmatched.is_empty() {
        return;
    }

    println!();
    println!("🔍 Unmatched numbers ({} total):", report.unmatched.len());
    for identifier in report.unmatched.iter().take(SAMPLE_SIZE) {
        let digits = digits_only(identifier);
        println!("   {}", identifier);
        println!("     digits: {}", digits);
        println!("     tried:  {}", lookup_keys(&digits).join(", "));
        match directory.resolve_match(identifier) {
            Some(found) => println!("     FOUND as {} → {}", found.key, found.name),
            None => println!("     NOT FOUND"),
        }
    }
}

fn truncate(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        label.to_string()
    } else {
        let mut short: String = label.chars().take(max.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}
