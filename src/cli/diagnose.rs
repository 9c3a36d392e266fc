use anyhow::Result;
use tokio::sync::mpsc;

use super::DiagnoseArgs;
use crate::core::config::GeoConfig;
use crate::core::geo::{DiagnosticRequest, Diagnostician, RunEvent};
use crate::core::llm::build_backends;
use crate::core::terminal;

pub async fn run_diagnose(config: &GeoConfig, args: DiagnoseArgs) -> Result<()> {
    let request = DiagnosticRequest::new(&args.brand, &args.keyword)?;
    let diagnostician = Diagnostician::from_config(build_backends(config)?, config);

    if args.json {
        let run = diagnostician.run(&request, None).await?;
        println!("{}", serde_json::to_string_pretty(&run)?);
        return Ok(());
    }

    terminal::print_step(&format!(
        "{}Diagnosing [{}] for \"{}\"",
        terminal::ROCKET,
        request.brand,
        request.keyword
    ));

    let (tx, mut rx) = mpsc::channel::<RunEvent>(64);
    let brand = request.brand.clone();
    let printer = tokio::spawn(async move {
        let mut done = 0usize;
        let mut total = 0usize;
        while let Some(event) = rx.recv().await {
            match event {
                RunEvent::Scenario {
                    scenario, slots, ..
                } => {
                    total = slots.len();
                    terminal::print_scenario(&scenario, &slots);
                }
                RunEvent::Result { result } => {
                    done += 1;
                    print!("[{}/{}] ", done, total);
                    terminal::print_result(&result, &brand);
                }
                RunEvent::Report { .. } => {
                    println!();
                }
            }
        }
    });

    let outcome = diagnostician.run(&request, Some(tx)).await;
    printer.await.ok();
    let run = outcome?;

    if run.results.is_empty() {
        terminal::print_warn("No engine returned a result.");
    }
    terminal::print_overview(&run.ordered_results());
    terminal::print_summary(&run.summary);
    terminal::print_report(&run.report.markdown);
    terminal::print_success(&format!("Run {} finished", run.run_id));
    Ok(())
}
