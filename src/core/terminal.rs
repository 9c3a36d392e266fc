use console::{Emoji, style};
use regex::{Regex, RegexBuilder};

use crate::core::geo::{AnalysisOutcome, AnalysisResult, AnalysisTask, RunSummary, ScenarioSet};
use crate::core::inquiry::InquiryRecord;

pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
pub static SUCCESS_ICON: Emoji<'_, '_> = Emoji("✅ ", "");
pub static INFO_ICON: Emoji<'_, '_> = Emoji("ℹ️  ", "");
pub static WARN_ICON: Emoji<'_, '_> = Emoji("⚠️  ", "");
pub static ERROR_ICON: Emoji<'_, '_> = Emoji("❌ ", "");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "");
pub static GLOBE: Emoji<'_, '_> = Emoji("🌐 ", "");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

const EXCERPT_CHARS: usize = 160;

pub fn print_success(msg: &str) {
    println!("{} {}", SUCCESS_ICON, style(msg).green());
}

pub fn print_info(msg: &str) {
    println!("{} {}", INFO_ICON, style(msg).blue());
}

pub fn print_warn(msg: &str) {
    println!("{} {}", WARN_ICON, style(msg).yellow());
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", ERROR_ICON, style(msg).red().bold());
}

pub fn print_step(step: &str) {
    println!("{} {}", SPARKLE, style(step).bold());
}

pub fn print_link(label: &str, url: &str) {
    println!(
        "  {} {}: {}",
        GLOBE,
        style(label).bold(),
        style(url).underlined().cyan()
    );
}

pub fn print_banner() {
    let lines: &[&str] = &[
        "  __ _  ___  ___  _ __  _ __ ___ | |__   ___ ",
        " / _` |/ _ \\/ _ \\| '_ \\| '__/ _ \\| '_ \\ / _ \\",
        "| (_| |  __/ (_) | |_) | | | (_) | |_) |  __/",
        " \\__, |\\___|\\___/| .__/|_|  \\___/|_.__/ \\___|",
        " |___/           |_|                         ",
    ];

    // Gradient: #818cf8 → #a78bfa → #22d3ee (diagonal top-left → bottom-right)
    let stops: [(u8, u8, u8); 3] = [(129, 140, 248), (167, 139, 250), (34, 211, 238)];
    let max_w = 45u32;
    let max_d = max_w + 4 * 10;

    println!();
    for (y, line) in lines.iter().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            if ch == ' ' {
                print!(" ");
                continue;
            }
            let d = ((x as u32 + y as u32 * 10) * 1000 / max_d).min(1000);
            let (r, g, b) = if d <= 500 {
                lerp_color(stops[0], stops[1], d * 2)
            } else {
                lerp_color(stops[1], stops[2], (d - 500) * 2)
            };
            print!("\x1b[38;2;{};{};{}m{}", r, g, b, ch);
        }
        println!();
    }
    print!("\x1b[0m");

    println!("\x1b[38;2;34;211;238mIs your brand in the answer?\x1b[0m\n");
}

fn lerp_color(a: (u8, u8, u8), b: (u8, u8, u8), t: u32) -> (u8, u8, u8) {
    let r = (a.0 as u32 * (1000 - t) + b.0 as u32 * t) / 1000;
    let g = (a.1 as u32 * (1000 - t) + b.1 as u32 * t) / 1000;
    let b_val = (a.2 as u32 * (1000 - t) + b.2 as u32 * t) / 1000;
    (r as u8, g as u8, b_val as u8)
}

/// Wrap every case-insensitive literal occurrence of `brand` with `mark`.
fn brand_pattern(brand: &str) -> Option<Regex> {
    let brand = brand.trim();
    if brand.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(brand))
        .case_insensitive(true)
        .build()
        .ok()
}

pub fn highlight_with(text: &str, brand: &str, mark: impl Fn(&str) -> String) -> String {
    let Some(re) = brand_pattern(brand) else {
        return text.to_string();
    };
    re.replace_all(text, |caps: &regex::Captures| mark(&caps[0]))
        .into_owned()
}

pub fn highlight(text: &str, brand: &str) -> String {
    highlight_with(text, brand, |m| {
        style(m).black().on_yellow().bold().to_string()
    })
}

/// At most `max` characters on one line, centred on the first occurrence of
/// `brand` when the text has to be cut. Cut ends are marked with an ellipsis.
pub fn excerpt(text: &str, brand: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let total = flat.chars().count();
    if total <= max {
        return flat;
    }

    let hit = brand_pattern(brand)
        .and_then(|re| re.find(&flat))
        .map(|m| (flat[..m.start()].chars().count(), m.as_str().chars().count()));
    let start = match hit {
        Some((at, len)) => (at + len / 2).saturating_sub(max / 2).min(total - max),
        None => 0,
    };

    let cut: String = flat.chars().skip(start).take(max).collect();
    let lead = if start > 0 { "…" } else { "" };
    let tail = if start + max < total { "…" } else { "" };
    format!("{}{}{}", lead, cut.trim(), tail)
}

pub fn print_scenario(scenario: &ScenarioSet, slots: &[AnalysisTask]) {
    print_step("Targeting strategy");
    println!("  {}\n", scenario.strategy);
    for (i, q) in scenario.queries.iter().enumerate() {
        println!("  {}Q{} {}", LOOKING_GLASS, i + 1, style(q).italic());
    }
    println!(
        "\n  {} slots to fill\n",
        style(slots.len()).bold().cyan()
    );
}

pub fn result_line(result: &AnalysisResult, brand: &str) -> String {
    let slot = format!("Q{} · {}", result.question_index + 1, result.engine.label());
    match &result.outcome {
        AnalysisOutcome::Answered { raw_text, mention } => {
            let verdict = if mention.mentioned {
                style("FOUND").green().bold()
            } else {
                style("NOT FOUND").red().bold()
            };
            format!(
                "{} {}  fit {}/10  {}\n    {}",
                style(slot).bold(),
                verdict,
                mention.solution_fit,
                mention.fit_reason,
                highlight(&excerpt(raw_text, brand, EXCERPT_CHARS), brand)
            )
        }
        AnalysisOutcome::Failed { error } => format!(
            "{} {}  {}",
            style(slot).bold(),
            style("ERROR").yellow().bold(),
            error
        ),
        AnalysisOutcome::Skipped => format!("{} skipped", style(slot).dim()),
    }
}

pub fn print_result(result: &AnalysisResult, brand: &str) {
    println!("{}", result_line(result, brand));
}

/// One compact line per slot, in question order.
pub fn print_overview(results: &[&AnalysisResult]) {
    if results.is_empty() {
        return;
    }
    print_step("Slot overview");
    for result in results {
        println!("  {}", overview_cell(result));
    }
    println!();
}

fn overview_cell(result: &AnalysisResult) -> String {
    let slot = format!("Q{} · {:<6}", result.question_index + 1, result.engine.label());
    match &result.outcome {
        AnalysisOutcome::Answered { mention, .. } if mention.mentioned => format!(
            "{} {}  fit {}/10",
            slot,
            style("FOUND").green(),
            mention.solution_fit
        ),
        AnalysisOutcome::Answered { mention, .. } => format!(
            "{} {}  fit {}/10",
            slot,
            style("NOT FOUND").red(),
            mention.solution_fit
        ),
        AnalysisOutcome::Failed { .. } => format!("{} {}", slot, style("ERROR").yellow()),
        AnalysisOutcome::Skipped => format!("{} {}", slot, style("skipped").dim()),
    }
}

pub fn print_summary(summary: &RunSummary) {
    print_step("Visibility summary");
    for engine in &summary.engines {
        let fit = engine
            .mean_fit
            .map(|f| format!("{:.1}", f))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<8} mentioned {}/{}  mean fit {}  errors {}",
            engine.engine.label(),
            engine.mentioned,
            engine.answered,
            fit,
            engine.failed
        );
    }
    println!(
        "  overall mention rate {}\n",
        style(format!("{:.0}%", summary.mention_rate * 100.0)).bold()
    );
}

pub fn print_report(markdown: &str) {
    print_step("Diagnostic report");
    println!("{}\n", markdown);
}

pub fn print_inquiry(record: &InquiryRecord) {
    println!(
        "  #{} {} {} / {}  {} <{}>",
        record.id,
        style(&record.timestamp).dim(),
        style(&record.brand).bold(),
        record.keyword,
        record.name,
        record.contact
    );
    if !record.message.is_empty() {
        println!("      {}", record.message);
    }
}
