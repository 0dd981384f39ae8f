// Entry point and high-level CLI flow.
//
// - Option [1] loads and cleans the complaint CSV, printing diagnostics.
// - Option [2] prints the exploratory and bias tables and exports the
//   cleaned dataset plus a JSON summary.
// - Option [3] trains the statistical classifiers and compares them with the
//   lexical one.
// - Option [4] runs the solution generator on the demonstration complaints.
// `--batch` runs all four once and exits.
mod classifier;
mod config;
mod error;
mod forest;
mod lexical;
mod loader;
mod metrics;
mod naive_bayes;
mod output;
mod pipeline;
mod priority;
mod reports;
mod solutions;
mod split;
mod summarizer;
mod tfidf;
mod types;
mod util;

use clap::Parser;
use config::{AnalysisConfig, Args};
use error::Result;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use types::Report;

// Loaded once, reused by every menu option in the same run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Vec<Report>>,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to the main menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        if io::stdin().read_line(&mut buf).unwrap_or(0) == 0 {
            return false;
        }
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn loaded_data() -> Option<Vec<Report>> {
    let data = state().data.clone();
    if data.is_none() {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
    }
    data
}

fn handle_load(cfg: &AnalysisConfig) -> Result<()> {
    let (data, load_report) = loader::load_and_clean(&cfg.input)?;
    println!(
        "Processing dataset... ({} rows read, {} kept)",
        util::format_int(load_report.total_rows),
        util::format_int(load_report.kept_rows)
    );
    let skipped = load_report.parse_errors + load_report.unknown_labels;
    if skipped > 0 {
        println!(
            "Note: {} rows skipped due to parse errors or unknown labels.",
            util::format_int(skipped)
        );
    }
    println!(
        "[OK] Missing ages filled with the median: {} ({} rows)",
        util::format_number(load_report.median_age, 0),
        util::format_int(load_report.imputed_ages)
    );
    println!(
        "[OK] Missing comments: {}\n",
        util::format_int(load_report.missing_comments)
    );
    state().data = Some(data);
    Ok(())
}

fn handle_generate_reports(cfg: &AnalysisConfig) -> Result<()> {
    let Some(data) = loaded_data() else {
        return Ok(());
    };

    output::preview_table("Distribution by problem category", None, &reports::category_distribution(&data), 10);
    output::preview_table("Distribution by urgency level", None, &reports::urgency_distribution(&data), 10);
    output::preview_table("Distribution by city", Some("top 8"), &reports::city_distribution(&data), 8);
    output::preview_table("Gender distribution", Some("bias check"), &reports::gender_distribution(&data), 10);
    output::preview_table("Mean age by category", Some("bias check"), &reports::mean_age_by_category(&data), 10);
    output::preview_table("Internet access by zone", Some("row percentages"), &reports::internet_by_zone(&data), 2);
    output::preview_table(
        "Prior government attention by zone",
        Some("row percentages"),
        &reports::attention_by_zone(&data),
        2,
    );

    let clean_path = cfg.out_path("dataset_clean.csv");
    output::write_csv(&clean_path, &loader::to_clean_rows(&data))?;
    println!("[OK] Cleaned dataset saved: {}", clean_path.display());

    let summary = reports::generate_summary(&data);
    let summary_path = cfg.out_path("summary.json");
    output::write_json(&summary_path, &summary)?;
    println!("[OK] Summary saved: {}\n", summary_path.display());
    Ok(())
}

fn handle_classifiers(cfg: &AnalysisConfig) -> Result<()> {
    let Some(data) = loaded_data() else {
        return Ok(());
    };

    let (sample, sample_accuracy) = pipeline::classify_sample(&data, cfg);
    let sample_path = cfg.out_path("classified_sample.csv");
    output::write_csv(&sample_path, &sample)?;
    println!(
        "Lexical classifier on a sample of {}: {}% correct",
        sample.len(),
        util::format_number(sample_accuracy * 100.0, 2)
    );
    for row in sample.iter().take(5) {
        println!("\nOriginal: {}", util::truncate_chars(&row.comment, 100));
        println!("Summary: {}", row.summary);
    }
    println!("\n(Full sample exported to {})\n", sample_path.display());

    println!("Training classifiers...");
    let comparison = pipeline::compare_classifiers(&data, cfg)?;
    for e in &comparison.evaluations {
        output::preview_table(
            &format!("{} ({}% accuracy)", e.name, util::format_number(e.report.accuracy * 100.0, 2)),
            None,
            &e.report.to_rows(),
            10,
        );
    }
    output::preview_table(
        "Model comparison",
        Some("held-out test split"),
        &comparison.to_rows(),
        3,
    );
    if let Some(best) = comparison.best() {
        println!("Best classifier: {}\n", best.name);
    }

    println!("Example predictions:");
    for text in pipeline::EXAMPLE_COMMENTS {
        println!("\nComment: '{}'", text);
        for c in comparison.classifiers() {
            println!("  {}: {}", c.name(), c.classify(text));
        }
        println!("  Summary: {}", summarizer::summarize(text, cfg.summary_length));
    }
    println!();

    let metrics_path = cfg.out_path("model_metrics.txt");
    output::write_text(&metrics_path, &comparison.render())?;
    println!("[OK] Metrics saved: {}\n", metrics_path.display());
    Ok(())
}

fn handle_solutions(cfg: &AnalysisConfig) -> Result<()> {
    let generator = solutions::SolutionGenerator::default();
    let mut analyses = Vec::new();
    for (i, (comment, category, urgency, city)) in solutions::DEMO_PROBLEMS.iter().enumerate() {
        let a = generator.analyze(comment, category, urgency, city)?;
        println!("\n[ANALYSIS] {}/{}", i + 1, solutions::DEMO_PROBLEMS.len());
        println!("Comment: '{}'", a.comment);
        println!("Category: {} | City: {}", a.category, a.city);
        println!(
            "[PRIORITY] {} (score {:.2} >= {:.2}, response within {})",
            a.priority.tier.label().to_uppercase(),
            a.priority.score,
            a.priority.tier.threshold(),
            a.priority.sla
        );
        let bundle = solutions::bundle(a.category)?;
        println!("[COMMON PROBLEMS] {}", bundle.common_problems.join(", "));
        println!("[ACTIONS]");
        for (j, action) in a.plan.apply_now.iter().enumerate() {
            println!("   {}. {}", j + 1, action);
        }
        println!(
            "[BUDGET] ${} COP | [TIME] {}",
            util::format_int(a.plan.budget),
            a.plan.implementation_time
        );
        println!("[STAFF] (x{:.1})", a.plan.multiplier);
        for (role, n) in &a.plan.staffing {
            println!("   {}: {} people", role, n);
        }
        println!("[INFRASTRUCTURE] {}", a.plan.infrastructure.join(", "));
        println!("[PLAN] coordinated by {}", a.actions.technical_coordinator);
        for phase in a.actions.phases {
            println!("   {}: {}", phase.name, phase.window);
            for action in phase.actions.iter().take(2) {
                println!("     - {}", action);
            }
        }
        analyses.push(a);
    }
    println!();

    let rows = solutions::summarize_analyses(&analyses);
    output::preview_table("Solutions report by category", None, &rows, 4);
    println!(
        "TOTAL ESTIMATED BUDGET: ${} COP (catalog across all categories: ${} COP)\n",
        util::format_int(solutions::total_budget(&analyses)),
        util::format_int(solutions::TOTAL_BUDGET)
    );
    let path = cfg.out_path("solutions_report.csv");
    output::write_csv(&path, &rows)?;
    info!(path = %path.display(), "solutions report written");
    Ok(())
}

fn report(result: Result<()>) {
    if let Err(e) = result {
        error!(error = %e, "operation failed");
        eprintln!("Error: {}\n", e);
    }
}

fn run_batch(cfg: &AnalysisConfig) -> Result<()> {
    handle_load(cfg)?;
    handle_generate_reports(cfg)?;
    handle_classifiers(cfg)?;
    handle_solutions(cfg)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let cfg = AnalysisConfig::from(&args);
    info!(input = %cfg.input.display(), out_dir = %cfg.out_dir.display(), "complaint triage starting");

    if args.batch {
        if let Err(e) = run_batch(&cfg) {
            error!(error = %e, "batch run failed");
            std::process::exit(1);
        }
        return;
    }

    loop {
        println!("Select an option:");
        println!("[1] Load the file");
        println!("[2] Generate Reports");
        println!("[3] Train and compare classifiers");
        println!("[4] Solution generator");
        println!("[5] Exit\n");
        match read_choice().as_str() {
            "1" => report(handle_load(&cfg)),
            choice @ ("2" | "3" | "4") => {
                println!();
                match choice {
                    "2" => report(handle_generate_reports(&cfg)),
                    "3" => report(handle_classifiers(&cfg)),
                    _ => report(handle_solutions(&cfg)),
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter a number from 1 to 5.\n"),
        }
    }
}
