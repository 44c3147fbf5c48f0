use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use pf_core::units::{k, m, s};
use pf_material::{DispersionData, Material, RelaxationData};
use pf_project::Project;
use pf_sim::{Model, SimOptions, StepProgress};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(about = "Phonoflow CLI - Monte Carlo phonon transport simulation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate model file syntax and structure
    Validate {
        /// Path to the model JSON/YAML file
        model_path: PathBuf,
    },
    /// Run a simulation and export the result files
    Run {
        /// Path to the model JSON/YAML file
        model_path: PathBuf,
        /// Output directory for ss_results.txt and per_results.txt
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
        /// Generator seed (overrides the settings block)
        #[arg(long)]
        seed: Option<u64>,
        /// Target phonon count (overrides the settings block)
        #[arg(long)]
        phonons: Option<u64>,
        /// Time step in seconds (overrides the settings block)
        #[arg(long)]
        time_step: Option<f64>,
    },
}

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { model_path } => cmd_validate(&model_path),
        Commands::Run {
            model_path,
            out,
            seed,
            phonons,
            time_step,
        } => cmd_run(&model_path, &out, seed, phonons, time_step),
    }
}

fn load_project(path: &Path) -> CliResult<Project> {
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let project = if is_yaml {
        pf_project::load_yaml(path)?
    } else {
        pf_project::load_json(path)?
    };
    Ok(project)
}

fn cmd_validate(model_path: &Path) -> CliResult<()> {
    println!("Validating model file: {}", model_path.display());
    let project = load_project(model_path)?;
    println!("✓ Model file is valid");
    println!(
        "  {} sensors, {} cells, boundaries {} K / {} K",
        project.sensors.len(),
        project.cells.len(),
        project.settings.high_temp,
        project.settings.low_temp
    );
    Ok(())
}

/// Build the simulation model from a validated project, preserving the
/// config cell order (it defines chain adjacency).
fn build_model(project: &Project) -> CliResult<Model> {
    let material_def = &project.materials[0];
    let dispersion = DispersionData::new(
        &material_def.d_data.la_data,
        material_def.d_data.max_freq_la,
        &material_def.d_data.ta_data,
        material_def.d_data.max_freq_ta,
    )?;
    let relaxation = RelaxationData::new(
        material_def.r_data.b_l,
        material_def.r_data.b_tn,
        material_def.r_data.b_tu,
        material_def.r_data.b_i,
        material_def.r_data.w,
    )?;
    let material = Material::new(dispersion, relaxation)?;

    let mut model = Model::new(
        material,
        k(project.settings.high_temp),
        k(project.settings.low_temp),
        s(project.settings.sim_time),
    )?;
    for sensor in &project.sensors {
        model.add_sensor(sensor.id, k(sensor.t_init))?;
    }
    for cell in &project.cells {
        model.add_cell(m(cell.length), m(cell.width), cell.sensor_id)?;
    }
    Ok(model)
}

fn cmd_run(
    model_path: &Path,
    out: &Path,
    seed: Option<u64>,
    phonons: Option<u64>,
    time_step: Option<f64>,
) -> CliResult<()> {
    println!("Running simulation: {}", model_path.display());
    let load_started = Instant::now();
    let project = load_project(model_path)?;
    let mut model = build_model(&project)?;
    let load_time_s = load_started.elapsed().as_secs_f64();

    let defaults = SimOptions::default();
    let opts = SimOptions {
        time_step_s: time_step
            .or(project.settings.time_step)
            .unwrap_or(defaults.time_step_s),
        target_phonons: phonons
            .or(project.settings.num_phonons)
            .unwrap_or(defaults.target_phonons),
        seed: seed.or(project.settings.seed),
    };
    let budget = model.energy_budget(&opts)?;
    println!(
        "  {} sensors, {} cells, {} target phonons",
        project.sensors.len(),
        project.cells.len(),
        opts.target_phonons
    );
    println!(
        "  energy budget: {:.3e} J total, {:.3e} J per phonon",
        budget.total_energy_j, budget.eff_energy_j
    );

    let solve_started = Instant::now();
    let mut last_emit = Instant::now();
    let measurements = model.run_with_progress(
        &opts,
        Some(&mut |p: &StepProgress| {
            if p.step == p.num_steps || last_emit.elapsed().as_millis() >= 100 {
                render_progress(p, solve_started.elapsed().as_secs_f64());
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();
    let solve_time_s = solve_started.elapsed().as_secs_f64();

    let save_started = Instant::now();
    let num_steps = measurements
        .first()
        .map(|m| m.temperatures_k.len())
        .unwrap_or(0);
    pf_results::export_results(out, &measurements, num_steps)?;
    let save_time_s = save_started.elapsed().as_secs_f64();

    println!("✓ Simulation completed: {num_steps} steps");
    println!("  Results written to {}", out.display());

    println!("\nTiming summary:");
    println!("  Load:  {load_time_s:.3}s");
    println!("  Solve: {solve_time_s:.3}s");
    println!("  Save:  {save_time_s:.3}s");
    println!("  Total: {:.3}s", load_time_s + solve_time_s + save_time_s);

    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_progress(progress: &StepProgress, elapsed_s: f64) {
    let width = 28usize;
    let filled = ((progress.fraction_complete * width as f64).round() as usize).min(width);
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    );
    print!(
        "\r[{}] {:>6.2}%  step={}/{}  phonons={}  elapsed={:.1}s",
        bar,
        progress.fraction_complete * 100.0,
        progress.step,
        progress.num_steps,
        progress.phonon_count,
        elapsed_s
    );
    let _ = io::stdout().flush();
}
