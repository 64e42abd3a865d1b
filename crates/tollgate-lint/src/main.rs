//! Tollgate policy linter CLI
//!
//! Validates comparison policy files before they are deployed to a gateway.
//!
//! Usage:
//!   tollgate-lint <files_or_directories>... [OPTIONS]

use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tollgate_lint::{lint_path, LintIssue, LintOptions, LintResult, Severity};

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Tollgate Policy Linter
#[derive(Parser, Debug)]
#[command(name = "tollgate-lint")]
#[command(author, version, about = "Validate Tollgate comparison policy files")]
struct Args {
    /// Policy files or directories containing policy files
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Only show errors (hide warnings)
    #[arg(short = 'e', long)]
    errors_only: bool,

    /// Also report informational notes
    #[arg(short, long)]
    verbose: bool,

    /// Strict mode - treat warnings as errors
    #[arg(short, long)]
    strict: bool,
}

fn main() {
    let args = Args::parse();
    let options = LintOptions {
        verbose: args.verbose,
    };

    let mut result = LintResult::new();
    for path in &args.paths {
        result.merge(lint_path(path, &options));
    }

    if args.format == "json" {
        print_results_json(&result);
    } else {
        print_results(&result, &args);
    }

    std::process::exit(if result.is_failure(args.strict) { 1 } else { 0 });
}

fn print_results_json(result: &LintResult) {
    match serde_json::to_string_pretty(result) {
        Ok(output) => println!("{output}"),
        Err(e) => eprintln!("{RED}Failed to serialize results: {e}{RESET}"),
    }
}

fn print_results(result: &LintResult, args: &Args) {
    println!("{BOLD}{CYAN}Tollgate Policy Linter{RESET}");
    println!("{DIM}{RULE}{RESET}");
    println!();

    let mut issues_by_file: BTreeMap<&PathBuf, Vec<&LintIssue>> = BTreeMap::new();
    for issue in &result.issues {
        if args.errors_only && issue.severity != Severity::Error {
            continue;
        }
        issues_by_file.entry(&issue.file).or_default().push(issue);
    }

    if issues_by_file.is_empty() {
        println!("{GREEN}{BOLD}No issues found!{RESET}");
    }

    for (file, issues) in &issues_by_file {
        let file_errors = count(issues, Severity::Error);
        let file_warnings = count(issues, Severity::Warning);

        let status = if file_errors > 0 {
            format!("{RED}FAIL{RESET}")
        } else if file_warnings > 0 {
            format!("{YELLOW}WARN{RESET}")
        } else {
            format!("{CYAN}NOTE{RESET}")
        };

        let mut counts = Vec::new();
        if file_errors > 0 {
            counts.push(format!("{RED}{file_errors} error(s){RESET}"));
        }
        if file_warnings > 0 {
            counts.push(format!("{YELLOW}{file_warnings} warning(s){RESET}"));
        }
        let counts = if counts.is_empty() {
            String::new()
        } else {
            format!(" {DIM}({RESET}{}{DIM}){RESET}", counts.join(", "))
        };

        println!("{status} {BOLD}{CYAN}{}{RESET}{counts}", file.display());

        for issue in issues {
            let color = severity_color(issue.severity);
            let location = issue
                .location
                .as_ref()
                .map(|l| format!("{DIM}[{RESET}{CYAN}{l}{RESET}{DIM}]{RESET} "))
                .unwrap_or_default();

            println!(
                "  {color}|{RESET} {location}{BOLD}{color}{}{RESET}: {} {DIM}({color}{}{DIM}){RESET}",
                issue.severity.label(),
                issue.message,
                issue.code
            );

            if let Some(suggestion) = &issue.suggestion {
                println!("  {color}|{RESET}   {GREEN}-> {suggestion}{RESET}");
            }
        }
        println!();
    }

    println!("{DIM}{RULE}{RESET}");
    println!("{BOLD}{CYAN}Summary{RESET}");
    println!("{DIM}{RULE}{RESET}");
    println!(
        "  {DIM}Files checked:{RESET} {BOLD}{}{RESET}",
        result.files_checked
    );

    if result.errors > 0 {
        println!("  {RED}Errors:{RESET}    {BOLD}{RED}{}{RESET}", result.errors);
    } else {
        println!("  {GREEN}Errors:{RESET}    {BOLD}{GREEN}0{RESET}");
    }

    if result.warnings > 0 {
        println!(
            "  {YELLOW}Warnings:{RESET}  {BOLD}{YELLOW}{}{RESET}",
            result.warnings
        );
    } else {
        println!("  {DIM}Warnings:{RESET}  {BOLD}0{RESET}");
    }

    println!();

    if result.is_failure(args.strict) {
        if result.has_errors() {
            println!("{RED}{BOLD}Linting failed with errors{RESET}");
        } else {
            println!("{RED}{BOLD}Linting failed: warnings are errors in strict mode{RESET}");
        }
    } else if result.has_warnings() {
        println!("{YELLOW}{BOLD}Passed with warnings{RESET}");
    } else {
        println!("{GREEN}{BOLD}All checks passed!{RESET}");
    }
}

fn count(issues: &[&LintIssue], severity: Severity) -> usize {
    issues.iter().filter(|i| i.severity == severity).count()
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => RED,
        Severity::Warning => YELLOW,
        Severity::Info => CYAN,
    }
}
