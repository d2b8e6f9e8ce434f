//! dirscope - see where disk space goes and clean it up.
//!
//! Usage:
//!   dirscope scan [PATH]         Size tree summary
//!   dirscope stats [PATH]        Aggregate statistics
//!   dirscope duplicates [PATH]   Files sharing a size and a name
//!   dirscope cleanup [PATH]      Cleanup candidates
//!   dirscope list [PATH]         Filter, search, sort and page files
//!   dirscope export [PATH] [-- ITEM..]  Export to JSON or CSV
//!   dirscope delete PATH -- ITEM..  Delete entries found by a scan
//!   dirscope --help              Show help

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, SystemTime};

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use strum::IntoEnumIterator;
use color_eyre::eyre::{Context, Result, bail, eyre};
use tracing_subscriber::EnvFilter;

use dirscope_analyze::export::{to_csv, to_json};
use dirscope_analyze::{
    CleanupConfig, DuplicateConfig, DuplicateFinder, Filter, Query, SizeDistribution, SortSpec,
    compute_stats, entries, flatten,
};
use dirscope_core::{Entry, FileType, SizeBucket, child_path};
use dirscope_ops::{DeleteOrchestrator, SelectionSet, validate_entries};
use dirscope_scan::{
    LocalHandle, ProgressEvent, ScanMessage, ScanOptions, ScanPhase, ScanResult, ScanTask,
    start_scan,
};

#[derive(Parser)]
#[command(
    name = "dirscope",
    version,
    about = "Directory tree analyzer",
    long_about = "dirscope scans a directory and reports where the space goes: \
                  size tree, type breakdown, duplicates and cleanup candidates. \
                  Entries can be deleted straight from a scan."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Options shared by every command that scans.
#[derive(Args)]
struct ScanArgs {
    /// Directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Maximum directory depth below the root
    #[arg(long, default_value = "50")]
    max_depth: u32,

    /// Include hidden entries
    #[arg(short = 'H', long)]
    hidden: bool,

    /// Leave out temporary files
    #[arg(long)]
    skip_temp: bool,

    /// Abort when the directory holds more items than this
    #[arg(long, default_value = "1000000")]
    max_files: u64,

    /// Do not print scan progress
    #[arg(short, long)]
    quiet: bool,
}

impl ScanArgs {
    fn options(&self) -> Result<ScanOptions> {
        ScanOptions::builder()
            .max_depth(self.max_depth)
            .include_hidden(self.hidden)
            .skip_temp_files(self.skip_temp)
            .max_files(self.max_files)
            .build()
            .wrap_err("Invalid scan options")
    }
}

#[derive(Subcommand)]
enum Command {
    /// Scan and show the size tree
    Scan {
        #[command(flatten)]
        scan: ScanArgs,

        /// Maximum depth to display
        #[arg(short, long, default_value = "3")]
        depth: u32,

        /// Number of top entries to show per directory
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,
    },

    /// Show aggregate statistics
    Stats {
        #[command(flatten)]
        scan: ScanArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Find files sharing a size and a name
    Duplicates {
        #[command(flatten)]
        scan: ScanArgs,

        /// Minimum file size to consider (e.g., "1KB", "1MB")
        #[arg(short, long, default_value = "1B")]
        min_size: String,

        /// Treat names differing only in case as different
        #[arg(long)]
        case_sensitive: bool,

        /// Maximum number of duplicate groups to show
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List cleanup candidates
    Cleanup {
        #[command(flatten)]
        scan: ScanArgs,

        /// Files above this size are large (e.g., "500MB", "1GB")
        #[arg(long, default_value = "1GB")]
        large: String,

        /// Files older than this are old (e.g., "1y", "6m", "30d")
        #[arg(long, default_value = "1y")]
        old_age: String,

        /// Old files must also be above this size
        #[arg(long, default_value = "100MB")]
        old_size: String,

        /// Maximum number of entries to show per category
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List files with filter, search, sort and paging
    List {
        #[command(flatten)]
        scan: ScanArgs,

        /// all, files, folders, large, huge, temp, or a file type (image, video, code, ...)
        #[arg(long, default_value = "all")]
        filter: Filter,

        /// List directories as well as files
        #[arg(long)]
        include_folders: bool,

        /// Smallest size to keep, inclusive (e.g., 10MB)
        #[arg(long)]
        min_size: Option<String>,

        /// Largest size to keep, inclusive (e.g., 1GB)
        #[arg(long)]
        max_size: Option<String>,

        /// Keep entries modified on or after this day (YYYY-MM-DD, UTC)
        #[arg(long)]
        modified_after: Option<String>,

        /// Keep entries modified on or before this day (YYYY-MM-DD, UTC)
        #[arg(long)]
        modified_before: Option<String>,

        /// Case-insensitive substring of the name or path
        #[arg(short, long, default_value = "")]
        search: String,

        /// Sort as field[:asc|desc]; fields are name, path, size, modified, type
        #[arg(long, default_value = "size:desc")]
        sort: SortSpec,

        /// Page to show, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Files per page
        #[arg(long, default_value = "100")]
        page_size: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Export scan results
    Export {
        #[command(flatten)]
        scan: ScanArgs,

        /// json writes the full tree, csv a flat file list
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Only export files matching this filter (csv)
        #[arg(long, default_value = "all")]
        filter: Filter,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export only these entries, relative to the scanned directory
        #[arg(num_args = 1.., last = true)]
        items: Vec<String>,
    },

    /// Delete entries of a scanned directory
    Delete {
        #[command(flatten)]
        scan: ScanArgs,

        /// Entries to delete, relative to the scanned directory
        #[arg(required = true, num_args = 1.., last = true)]
        items: Vec<String>,

        /// Actually delete; without this only the plan is shown
        #[arg(short, long)]
        yes: bool,

        /// Also delete entries with more than one risk warning
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum ExportFormat {
    #[default]
    Json,
    Csv,
}

/// Exit status after the user cancels a scan (128 + SIGINT).
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Scan { scan, depth, top } => {
            let Some(result) = run_scan(&scan).await? else {
                return Ok(cancelled());
            };
            print_summary(&result);
            print_node(&result.root, 0, depth, top, result.root.size);
        }
        Command::Stats { scan, format } => {
            let Some(result) = run_scan(&scan).await? else {
                return Ok(cancelled());
            };
            print_stats(&result, format)?;
        }
        Command::Duplicates {
            scan,
            min_size,
            case_sensitive,
            top,
            format,
        } => {
            let config = DuplicateConfig::builder()
                .min_size(parse_size(&min_size)?)
                .case_sensitive_names(case_sensitive)
                .build()
                .wrap_err("Invalid duplicate options")?;
            let Some(result) = run_scan(&scan).await? else {
                return Ok(cancelled());
            };
            print_duplicates(&result, config, top, format)?;
        }
        Command::Cleanup {
            scan,
            large,
            old_age,
            old_size,
            top,
            format,
        } => {
            let config = CleanupConfig::builder()
                .large_threshold(parse_size(&large)?)
                .old_age(parse_duration(&old_age)?)
                .old_size_threshold(parse_size(&old_size)?)
                .build()
                .wrap_err("Invalid cleanup options")?;
            let Some(result) = run_scan(&scan).await? else {
                return Ok(cancelled());
            };
            print_cleanup(&result, &config, top, format)?;
        }
        Command::List {
            scan,
            filter,
            include_folders,
            min_size,
            max_size,
            modified_after,
            modified_before,
            search,
            sort,
            page,
            page_size,
            format,
        } => {
            let mut builder = Query::builder();
            builder
                .filter(filter)
                .search(search)
                .sort(sort)
                .page(page)
                .page_size(page_size);
            if let Some(min) = min_size {
                builder.min_size(parse_size(&min)?);
            }
            if let Some(max) = max_size {
                builder.max_size(parse_size(&max)?);
            }
            if let Some(day) = modified_after {
                builder.modified_after(parse_day(&day, NaiveTime::MIN)?);
            }
            if let Some(day) = modified_before {
                builder.modified_before(parse_day(&day, end_of_day())?);
            }
            let query = builder.build().wrap_err("Invalid query")?;
            let Some(result) = run_scan(&scan).await? else {
                return Ok(cancelled());
            };
            let include_folders = include_folders || filter == Filter::Folders;
            print_list(&result, &query, include_folders, format)?;
        }
        Command::Export {
            scan,
            format,
            filter,
            output,
            items,
        } => {
            let Some(result) = run_scan(&scan).await? else {
                return Ok(cancelled());
            };
            run_export(&result, format, filter, &items, output.as_deref())?;
        }
        Command::Delete {
            scan,
            items,
            yes,
            force,
        } => {
            let Some(result) = run_scan(&scan).await? else {
                return Ok(cancelled());
            };
            run_delete(&result, &items, yes, force).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Report a user-cancelled scan without an error report.
fn cancelled() -> ExitCode {
    eprintln!("Scan cancelled");
    ExitCode::from(EXIT_CANCELLED)
}

/// Scan a local directory, showing progress on stderr.
///
/// Ctrl-C cancels the scan; that yields `Ok(None)`.
async fn run_scan(args: &ScanArgs) -> Result<Option<ScanResult>> {
    let options = args.options()?;
    let root = LocalHandle::open(&args.path)
        .await
        .wrap_err_with(|| format!("Cannot open {}", args.path.display()))?;

    eprintln!("Scanning {}...", args.path.display());

    let mut task = start_scan(root, options);
    let cancel = task.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    collect_scan(&mut task, args.quiet).await
}

/// Drain a running scan: `Some` when it completes, `None` when cancelled.
async fn collect_scan(task: &mut ScanTask, quiet: bool) -> Result<Option<ScanResult>> {
    while let Some(message) = task.recv().await {
        match message {
            ScanMessage::Progress(event) => {
                if !quiet {
                    print_progress(&event);
                }
            }
            ScanMessage::Complete(result) => {
                if !quiet {
                    eprintln!();
                }
                for warning in &result.warnings {
                    tracing::debug!(path = %warning.path, "{}", warning.message);
                }
                return Ok(Some(*result));
            }
            ScanMessage::Failed(err) => return Err(err).wrap_err("Scan failed"),
            ScanMessage::Cancelled => {
                if !quiet {
                    eprintln!();
                }
                return Ok(None);
            }
        }
    }

    Err(eyre!("Scan ended without a result"))
}

fn print_progress(event: &ProgressEvent) {
    match event.phase {
        ScanPhase::Counting => eprint!("\r Counting... {} items", event.counters.total_items),
        ScanPhase::Scanning => eprint!(
            "\r Scanning {}/{} ({}%) {} items/s   ",
            event.scanned, event.total, event.percentage, event.speed
        ),
    }
}

fn print_summary(result: &ScanResult) {
    println!();
    println!("{}", "─".repeat(60));
    println!(
        " {} - {}",
        result.root.path,
        format_size(result.total_size())
    );
    println!(
        " {} files, {} directories",
        result.progress.file_count, result.progress.folder_count
    );
    println!(" Scanned in {:.2}s", result.scan_time.as_secs_f64());
    println!("{}", "─".repeat(60));
    println!();

    if result.has_warnings() {
        println!("{} entries could not be read", result.warnings.len());
        println!();
    }
}

/// Print a node and its children.
fn print_node(node: &Entry, depth: u32, max_depth: u32, top_n: usize, root_size: u64) {
    let indent = "  ".repeat(depth as usize);
    let ratio = if root_size > 0 {
        node.size as f64 / root_size as f64 * 100.0
    } else {
        0.0
    };

    let bar = make_bar(ratio / 100.0, 10);
    let dir_marker = if node.is_dir() { "/" } else { "" };
    let error_marker = if node.error.is_some() { " !" } else { "" };

    println!(
        "{}{}{:<40} {:>10} {:>5.1}% {}{}",
        indent,
        if node.is_dir() { "▼ " } else { "  " },
        truncate(&format!("{}{}", node.name, dir_marker), 40),
        format_size(node.size),
        ratio,
        bar,
        error_marker
    );

    if node.is_dir() && depth < max_depth {
        for child in node.children.iter().take(top_n) {
            print_node(child, depth + 1, max_depth, top_n, root_size);
        }

        let remaining = node.children.len().saturating_sub(top_n);
        if remaining > 0 {
            let indent = "  ".repeat((depth + 1) as usize);
            println!("{}  ... and {} more", indent, remaining);
        }
    }
}

fn print_stats(result: &ScanResult, format: OutputFormat) -> Result<()> {
    let stats = compute_stats(&result.root);

    if let OutputFormat::Json = format {
        println!("{}", to_json(&stats)?);
        return Ok(());
    }

    println!();
    println!("{}", "─".repeat(60));
    println!(" Statistics for {}", result.root.path);
    println!("{}", "─".repeat(60));
    println!();
    println!(" Files:        {}", stats.total_files);
    println!(" Folders:      {}", stats.total_folders);
    println!(" Total size:   {}", format_size(stats.total_size));
    if let Some(file) = &stats.largest_file {
        println!(" Largest file:   {} ({})", file.path, format_size(file.size));
    }
    if let Some(folder) = &stats.largest_folder {
        println!(" Largest folder: {} ({})", folder.path, format_size(folder.size));
    }
    println!();

    println!(" File types:");
    for (file_type, count) in &stats.file_types {
        let share = stats.type_share(*file_type);
        println!(
            "   {:<12} {:>8} files {:>5.1}% {}",
            file_type.to_string(),
            count,
            share * 100.0,
            make_bar(share, 20)
        );
    }
    println!();

    println!(" Size distribution:");
    for (label, count) in size_distribution_rows(&stats.size_distribution) {
        println!("   {:<14} {:>8}", label, count);
    }
    println!();

    let perms = &stats.permissions;
    println!(
        " Permissions: {} readable, {} writable, {} restricted",
        perms.readable, perms.writable, perms.restricted
    );
    println!();

    Ok(())
}

fn print_duplicates(
    result: &ScanResult,
    config: DuplicateConfig,
    top_n: usize,
    format: OutputFormat,
) -> Result<()> {
    let report = DuplicateFinder::with_config(config).find_duplicates(&result.root);

    if let OutputFormat::Json = format {
        println!("{}", to_json(&report)?);
        return Ok(());
    }

    println!();
    println!("{}", "─".repeat(70));
    println!(" Duplicate File Report");
    println!("{}", "─".repeat(70));
    println!();

    if !report.has_duplicates() {
        println!(" No duplicate files found.");
        return Ok(());
    }

    println!(
        " Found {} duplicate groups ({} files)",
        report.group_count(),
        report.total_duplicate_files()
    );
    println!(
        " Total wasted space: {}",
        format_size(report.total_wasted_space)
    );
    println!();

    let mut groups: Vec<_> = report.groups.values().collect();
    groups.sort_by(|a, b| b.wasted_bytes.cmp(&a.wasted_bytes));

    for (i, group) in groups.iter().take(top_n).enumerate() {
        println!(
            " Group {} ({} files, {} each, {} wasted)",
            i + 1,
            group.count(),
            format_size(group.size),
            format_size(group.wasted_bytes)
        );
        for path in group.paths() {
            println!("   {}", path);
        }
        println!();
    }

    Ok(())
}

fn print_cleanup(
    result: &ScanResult,
    config: &CleanupConfig,
    top_n: usize,
    format: OutputFormat,
) -> Result<()> {
    let suggestions = dirscope_analyze::cleanup_suggestions(&result.root, config);

    if let OutputFormat::Json = format {
        println!("{}", to_json(&suggestions)?);
        return Ok(());
    }

    println!();
    println!("{}", "─".repeat(70));
    println!(" Cleanup Suggestions");
    println!("{}", "─".repeat(70));
    println!();

    if suggestions.is_empty() {
        println!(" Nothing to clean up.");
        return Ok(());
    }

    for (title, entries) in [
        ("Temporary files", &suggestions.temp_files),
        ("Large files", &suggestions.large_files),
        ("Old files", &suggestions.old_files),
        ("Empty folders", &suggestions.empty_folders),
    ] {
        if entries.is_empty() {
            continue;
        }
        let total: u64 = entries.iter().map(|e| e.size).sum();
        println!(" {} ({}, {}):", title, entries.len(), format_size(total));
        for entry in entries.iter().take(top_n) {
            println!("   {:>10}  {}", format_size(entry.size), entry.path);
        }
        if entries.len() > top_n {
            println!("   ... and {} more", entries.len() - top_n);
        }
        println!();
    }

    let duplicates = &suggestions.duplicates;
    if duplicates.has_duplicates() {
        println!(
            " Duplicates: {} groups, {} wasted",
            duplicates.group_count(),
            format_size(duplicates.total_wasted_space)
        );
        println!();
    }

    println!(
        " Potential savings: {}",
        format_size(suggestions.potential_savings())
    );
    println!();

    Ok(())
}

fn print_list(
    result: &ScanResult,
    query: &Query,
    include_folders: bool,
    format: OutputFormat,
) -> Result<()> {
    let candidates = if include_folders {
        entries(&result.root)
    } else {
        flatten(&result.root)
    };
    let page = query.run(&candidates);

    if let OutputFormat::Json = format {
        println!("{}", to_json(&page.items)?);
        return Ok(());
    }

    for entry in &page.items {
        let kind = match entry.file_type() {
            Some(file_type) => file_type.to_string(),
            None if entry.is_dir() => "folder".to_string(),
            None => FileType::Unknown.to_string(),
        };
        println!(
            "{:>10}  {:<10}  {}",
            format_size(entry.size),
            kind,
            entry.path
        );
    }
    println!();
    println!(
        " Page {}/{} - {} matching entries",
        page.page,
        page.total_pages.max(1),
        page.total_matching
    );

    Ok(())
}

fn run_export(
    result: &ScanResult,
    format: ExportFormat,
    filter: Filter,
    items: &[String],
    output: Option<&Path>,
) -> Result<()> {
    let content = if items.is_empty() {
        match format {
            ExportFormat::Json => to_json(result)?,
            ExportFormat::Csv => {
                let files = flatten(&result.root);
                let files: Vec<&Entry> = files.into_iter().filter(|e| filter.matches(e)).collect();
                to_csv(&files)
            }
        }
    } else {
        export_selection(result, items, format)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, content)
                .wrap_err_with(|| format!("Cannot write {}", path.display()))?;
            eprintln!("Exported to {}", path.display());
        }
        None => println!("{}", content),
    }

    Ok(())
}

/// Render the named entries as a selection export.
fn export_selection(result: &ScanResult, items: &[String], format: ExportFormat) -> Result<String> {
    let mut selection = SelectionSet::new();
    selection.select_all(find_items(result, items)?);
    let format = match format {
        ExportFormat::Json => dirscope_analyze::ExportFormat::Json,
        ExportFormat::Csv => dirscope_analyze::ExportFormat::Csv,
    };
    Ok(selection.export(&result.root, format)?)
}

/// Look up entries named relative to the scanned directory.
fn find_items<'r>(result: &'r ScanResult, items: &[String]) -> Result<Vec<&'r Entry>> {
    let mut found = Vec::with_capacity(items.len());
    for item in items {
        let relative = item.replace('\\', "/");
        let relative = relative.trim_start_matches("./").trim_end_matches('/');
        let path = child_path(&result.root.path, relative);
        let entry = result
            .root
            .find(&path)
            .ok_or_else(|| eyre!("{} was not found in the scan", item))?;
        found.push(entry);
    }
    Ok(found)
}

async fn run_delete(result: &ScanResult, items: &[String], yes: bool, force: bool) -> Result<()> {
    let targets = find_items(result, items)?;

    let batch = validate_entries(&targets, SystemTime::now());

    println!();
    println!(
        " {} items, {} total",
        targets.len(),
        format_size(batch.total_size)
    );
    for (entry, validation) in batch.warnings.iter().chain(&batch.high_risk) {
        println!("   {}", entry.path);
        for warning in &validation.warnings {
            println!("     - {}", warning);
        }
    }
    println!();

    let mut orchestrator = DeleteOrchestrator::new();
    for (entry, _) in batch.safe.iter().chain(&batch.warnings) {
        orchestrator.selection_mut().select(entry);
    }
    if force {
        for (entry, _) in &batch.high_risk {
            orchestrator.selection_mut().select(entry);
        }
    } else if !batch.high_risk.is_empty() {
        println!(
            " Skipping {} high-risk items (use --force to include them)",
            batch.high_risk.len()
        );
    }

    if !yes {
        println!(
            " Dry run: would delete {} items ({}). Pass --yes to delete.",
            orchestrator.selection().len(),
            format_size(orchestrator.selection().total_size())
        );
        return Ok(());
    }

    let mut progress = orchestrator.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(update) = progress.recv().await {
            eprintln!(" [{:>3.0}%] {}", update.percentage(), update.message);
        }
    });

    let outcome = orchestrator.delete_selected(&result.root).await;
    drop(orchestrator);
    printer.await.wrap_err("Progress printer failed")?;

    let summary = outcome.wrap_err("Delete failed")?;
    println!();
    println!(
        " {} in {:.2}s",
        summary.summary(),
        summary.duration.as_secs_f64()
    );
    for error in &summary.errors {
        println!("   {}", error);
    }

    if !summary.is_success() {
        bail!("{} items could not be deleted", summary.failed);
    }
    Ok(())
}

/// One row per size bucket, smallest first.
fn size_distribution_rows(dist: &SizeDistribution) -> Vec<(&'static str, u64)> {
    SizeBucket::iter()
        .map(|bucket| (bucket.label(), dist.get(bucket)))
        .collect()
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to max characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{}…", head)
    }
}

/// Parse a size string (e.g., "1KB", "10MB", "1GB").
fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_uppercase();
    let number = s.trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.');
    let unit = &s[number.len()..];

    let multiplier: u64 = match unit {
        "" | "B" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        "T" | "TB" => 1024 * 1024 * 1024 * 1024,
        _ => bail!("Unknown size unit in {:?}", s),
    };
    let number: f64 = number
        .parse()
        .wrap_err_with(|| format!("Invalid size {:?}", s))?;

    Ok((number * multiplier as f64) as u64)
}

/// Last representable instant of a day.
fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

/// Parse a `YYYY-MM-DD` day at `time` UTC.
fn parse_day(s: &str, time: NaiveTime) -> Result<SystemTime> {
    let day = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .wrap_err_with(|| format!("Invalid date {:?} (expected YYYY-MM-DD)", s))?;
    Ok(SystemTime::from(day.and_time(time).and_utc()))
}

/// Parse a duration string (e.g., "1y", "6m", "30d", "1w").
fn parse_duration(s: &str) -> Result<Duration> {
    const DAY: f64 = 24.0 * 60.0 * 60.0;

    let s = s.trim().to_lowercase();
    let number = s.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let multiplier = match &s[number.len()..] {
        "y" => 365.0 * DAY,
        "m" => 30.0 * DAY,
        "w" => 7.0 * DAY,
        "d" | "" => DAY,
        "h" => 60.0 * 60.0,
        _ => bail!("Unknown duration unit in {:?}", s),
    };
    let number: f64 = number
        .parse()
        .wrap_err_with(|| format!("Invalid duration {:?}", s))?;

    Ok(Duration::from_secs_f64(number * multiplier))
}
