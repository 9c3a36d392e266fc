mod diagnose;
mod inquiry;
mod serve;

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::core::config::GeoConfig;
use crate::core::terminal::{self, print_error};
use crate::logging;

pub(crate) const DEFAULT_API_HOST: &str = "127.0.0.1";
pub(crate) const DEFAULT_API_PORT: u16 = 17890;
pub(crate) const DEFAULT_INQUIRY_LIMIT: usize = 20;

fn print_help() {
    terminal::print_banner();

    let commands: &[(&str, &str)] = &[
        ("diagnose", "Run a visibility diagnosis for a brand"),
        ("inquire", "Store a consulting request"),
        ("inquiries", "List stored consulting requests"),
        ("serve", "Start the HTTP API"),
        ("help", "Show this message"),
    ];
    println!(" {}", style("Commands").bold().underlined());
    for (name, about) in commands {
        println!("   {:<12} {}", style(name).green(), about);
    }

    println!("\n {}", style("Options").bold().underlined());
    println!("   diagnose   --brand <b> --keyword <k> [--json]");
    println!("   inquire    --brand <b> --keyword <k> --name <n> --contact <c> [--message <m>]");
    println!("   inquiries  [--limit N]");
    println!("   serve      [--host H] [--port P]");
    println!("   (all)      [--config <path>] [--quiet]");

    println!(
        "\n {} {} <command> [options]\n",
        style("Usage:").bold(),
        style("geoprobe").green()
    );
}

/// Read the value following `flag`, if any. Flags without a value are ignored.
fn flag_value(args: &[String], i: usize) -> Option<String> {
    args.get(i + 1).cloned()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct GlobalFlags {
    pub config: Option<PathBuf>,
    pub quiet: bool,
}

pub(crate) fn parse_global_flags(args: &[String], start: usize) -> GlobalFlags {
    let mut flags = GlobalFlags::default();
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if let Some(v) = flag_value(args, i) {
                    flags.config = Some(PathBuf::from(v));
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--quiet" | "-q" => {
                flags.quiet = true;
                i += 1;
            }
            _ => i += 1,
        }
    }
    flags
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DiagnoseArgs {
    pub brand: String,
    pub keyword: String,
    pub json: bool,
}

pub(crate) fn parse_diagnose_args(args: &[String], start: usize) -> DiagnoseArgs {
    let mut parsed = DiagnoseArgs::default();
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--brand" | "-b" => {
                if let Some(v) = flag_value(args, i) {
                    parsed.brand = v;
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--keyword" | "-k" => {
                if let Some(v) = flag_value(args, i) {
                    parsed.keyword = v;
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--json" => {
                parsed.json = true;
                i += 1;
            }
            _ => i += 1,
        }
    }
    parsed
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct InquireArgs {
    pub brand: String,
    pub keyword: String,
    pub name: String,
    pub contact: String,
    pub message: String,
}

pub(crate) fn parse_inquire_args(args: &[String], start: usize) -> InquireArgs {
    let mut parsed = InquireArgs::default();
    let mut i = start;
    while i < args.len() {
        let slot = match args[i].as_str() {
            "--brand" | "-b" => Some(&mut parsed.brand),
            "--keyword" | "-k" => Some(&mut parsed.keyword),
            "--name" | "-n" => Some(&mut parsed.name),
            "--contact" => Some(&mut parsed.contact),
            "--message" | "-m" => Some(&mut parsed.message),
            _ => None,
        };
        match (slot, flag_value(args, i)) {
            (Some(slot), Some(v)) => {
                *slot = v;
                i += 2;
            }
            _ => i += 1,
        }
    }
    parsed
}

pub(crate) fn parse_limit(args: &[String], start: usize) -> usize {
    let mut limit = DEFAULT_INQUIRY_LIMIT;
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--limit" | "-l" => {
                if let Some(v) = flag_value(args, i) {
                    limit = v.parse().unwrap_or(DEFAULT_INQUIRY_LIMIT);
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    limit.max(1)
}

pub(crate) fn parse_serve_flags(args: &[String], start: usize) -> (String, u16) {
    let mut host = DEFAULT_API_HOST.to_string();
    let mut port = DEFAULT_API_PORT;
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                if let Some(v) = flag_value(args, i) {
                    port = v.parse().unwrap_or(DEFAULT_API_PORT);
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--host" => {
                if let Some(v) = flag_value(args, i) {
                    host = v;
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    (host, port)
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(String::as_str).unwrap_or("help");

    if matches!(cmd, "help" | "--help" | "-h") {
        print_help();
        return Ok(());
    }

    let flags = parse_global_flags(&args, 2);
    let config = GeoConfig::load(flags.config.as_deref())?;
    logging::init(&config.log_level, flags.quiet);

    match cmd {
        "diagnose" => diagnose::run_diagnose(&config, parse_diagnose_args(&args, 2)).await,
        "inquire" => inquiry::run_inquire(&config, parse_inquire_args(&args, 2)).await,
        "inquiries" => inquiry::run_inquiries(&config, parse_limit(&args, 2)).await,
        "serve" => {
            let (host, port) = parse_serve_flags(&args, 2);
            serve::run_serve(&config, host, port).await
        }
        other => {
            print_error(&format!("Unknown command: {}", other));
            print_help();
            Ok(())
        }
    }
}
