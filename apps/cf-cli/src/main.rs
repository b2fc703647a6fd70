use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use cf_app::{
    AppResult, RunProgressEvent, RunStage, SolveRequest, StudyRequest, bus_table,
    component_table, connection_table, project_service, run_service, study_table,
};
use cf_core::units::Quantity;

#[derive(Parser)]
#[command(name = "cf-cli")]
#[command(about = "cycleflow CLI - steady-state thermodynamic cycle solver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a plant file
    Validate {
        /// Path to the plant YAML file
        plant_path: PathBuf,
    },
    /// Solve a plant in design or offdesign mode
    Solve {
        /// Path to the plant YAML file
        plant_path: PathBuf,
        /// Solve offdesign against this stored design point
        #[arg(long, value_name = "NAME")]
        offdesign: Option<String>,
        /// Save the design solution under this name
        #[arg(long, value_name = "NAME", conflicts_with = "offdesign")]
        save: Option<String>,
        /// Result store directory (default: .cycleflow/ next to the plant)
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,
    },
    /// Run the parametric studies of a plant
    Study {
        /// Path to the plant YAML file
        plant_path: PathBuf,
        /// Run only this study
        #[arg(long, value_name = "NAME")]
        study: Option<String>,
        /// Result store directory (default: .cycleflow/ next to the plant)
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,
    },
    /// List stored design points
    Designs {
        /// Result store directory
        #[arg(long, value_name = "DIR", default_value = ".cycleflow")]
        store: PathBuf,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { plant_path } => cmd_validate(&plant_path),
        Commands::Solve {
            plant_path,
            offdesign,
            save,
            store,
        } => cmd_solve(
            &plant_path,
            offdesign.as_deref(),
            save.as_deref(),
            store.as_deref(),
        ),
        Commands::Study {
            plant_path,
            study,
            store,
        } => cmd_study(&plant_path, study.as_deref(), store.as_deref()),
        Commands::Designs { store } => cmd_designs(&store),
    }
}

fn cmd_validate(plant_path: &Path) -> AppResult<()> {
    println!("Validating plant: {}", plant_path.display());
    let plant = project_service::load_plant(plant_path)?;
    let summary = project_service::summarize(&plant);
    println!("✓ Plant '{}' is valid", summary.name);
    println!(
        "  {} components, {} connections, {} buses",
        summary.component_count, summary.connection_count, summary.bus_count
    );
    if !summary.studies.is_empty() {
        println!("  Studies: {}", summary.studies.join(", "));
    }
    Ok(())
}

fn cmd_solve(
    plant_path: &Path,
    offdesign: Option<&str>,
    save: Option<&str>,
    store_dir: Option<&Path>,
) -> AppResult<()> {
    let request = SolveRequest {
        plant_path,
        offdesign,
        save,
        store_dir,
    };
    let response = run_service::solve_plant_with_progress(
        &request,
        Some(&mut |event| render_cli_progress(&event)),
    )?;
    clear_progress_line();

    println!(
        "✓ {} solve of '{}' converged in {} iterations (residual {:.3e}, {:.2} s)",
        response.report.mode,
        response.plant,
        response.report.iterations,
        response.report.residual_norm,
        response.total_time_s
    );
    if let Some(path) = &response.saved_design {
        println!("  Design point saved: {}", path.display());
    }

    println!();
    print!("{}", connection_table(&response.results, &response.units));
    println!();
    print!("{}", component_table(&response.results, &response.units));
    if !response.results.buses.is_empty() {
        println!();
        print!("{}", bus_table(&response.results));
    }
    println!(
        "\nUnits: T [{}], p [{}], h [{}]",
        response.units.label(Quantity::Temperature),
        response.units.label(Quantity::Pressure),
        response.units.label(Quantity::Enthalpy)
    );
    Ok(())
}

fn cmd_study(plant_path: &Path, study: Option<&str>, store_dir: Option<&Path>) -> AppResult<()> {
    let request = StudyRequest {
        plant_path,
        study,
        store_dir,
    };
    let mut last_emit = Instant::now();
    let response = run_service::run_studies_with_progress(
        &request,
        Some(&mut |event| {
            let stage_change = event.study.is_none();
            if stage_change || last_emit.elapsed().as_millis() >= 100 {
                render_cli_progress(&event);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    for outcome in &response.studies {
        println!(
            "✓ Study '{}': {}/{} points converged -> {}",
            outcome.manifest.name,
            outcome.converged(),
            outcome.records.len(),
            outcome.path.display()
        );
        print!(
            "{}",
            study_table(&outcome.manifest.variable, &outcome.records)?
        );
        for record in outcome.records.iter().filter(|r| !r.converged) {
            if let Some(error) = &record.error {
                println!("  point {} ({}): {}", record.index, record.value, error);
            }
        }
        println!();
    }
    println!("Total time: {:.2} s", response.total_time_s);
    Ok(())
}

fn cmd_designs(store: &Path) -> AppResult<()> {
    let designs = run_service::list_designs(store)?;
    if designs.is_empty() {
        println!("No design points in {}", store.display());
    } else {
        println!("Design points in {}:", store.display());
        for name in designs {
            println!("  {name}");
        }
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.study) {
        (RunStage::RunningStudy, Some(s)) => {
            let width = 28usize;
            let done = s.index + 1;
            let filled = (done * width / s.points.max(1)).min(width);
            print!(
                "\r[{}{}] {}/{}  study={}  value={}  elapsed={:.1}s",
                "#".repeat(filled),
                "-".repeat(width - filled),
                done,
                s.points,
                s.study,
                s.value,
                event.elapsed_wall_s
            );
        }
        (stage, _) => {
            let detail = event
                .message
                .as_deref()
                .map(|m| format!(" ({m})"))
                .unwrap_or_default();
            print!(
                "\r{:<100}",
                format!(
                    "{:?}{}  mode={}  elapsed={:.1}s",
                    stage, detail, event.mode, event.elapsed_wall_s
                )
            );
        }
    }
    let _ = io::stdout().flush();
}
