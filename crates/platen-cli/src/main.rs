//! platen CLI - toolpath generation for a tool changer printer
//!
//! Turns a JSON job file into a complete G-code program, and answers
//! questions about programs after the fact: time and filament
//! estimates, whole-program translation, and the resolved region
//! layout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use platen_report::{analyze_program, translate_program, ProgramStats, StatsOptions};
use platen_toolpath::{LayerRef, RegionKind};

mod job;

use job::JobFile;

#[derive(Parser)]
#[command(name = "platen")]
#[command(about = "Toolpath generator for a tool changer printer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a G-code program from a job file
    Generate {
        /// Input job file (.json)
        job: PathBuf,
        /// Output program file (.g)
        output: PathBuf,
    },
    /// Estimate print time and filament use for a program
    Stats {
        /// Program file (.g)
        program: PathBuf,
        /// Seconds charged per tool unload
        #[arg(long, default_value_t = 3.0)]
        unload_seconds: f64,
        /// Seconds charged per tool load
        #[arg(long, default_value_t = 20.0)]
        load_seconds: f64,
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Translate every move in a program by a constant offset
    Translate {
        /// Input program file (.g)
        input: PathBuf,
        /// Output program file (.g)
        output: PathBuf,
        /// X offset (mm)
        #[arg(long, default_value_t = 0.0)]
        dx: f64,
        /// Y offset (mm)
        #[arg(long, default_value_t = 0.0)]
        dy: f64,
        /// Z offset (mm)
        #[arg(long, default_value_t = 0.0)]
        dz: f64,
    },
    /// Show the resolved region layout of a job file
    Regions {
        /// Input job file (.json)
        job: PathBuf,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { job, output } => generate(&job, &output),
        Commands::Stats {
            program,
            unload_seconds,
            load_seconds,
            json,
        } => stats(&program, unload_seconds, load_seconds, json),
        Commands::Translate {
            input,
            output,
            dx,
            dy,
            dz,
        } => translate(&input, &output, dx, dy, dz),
        Commands::Regions { job } => regions(&job),
    }
}

fn init_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn generate(job_path: &Path, output: &Path) -> Result<()> {
    let job = JobFile::load(job_path)?;
    let program = job::generate_program(&job)?;
    program.write_to_file(output)?;
    println!("Wrote {} ({} lines)", output.display(), program.line_count());
    println!();

    let stats = analyze_program(program.as_str(), &StatsOptions::default())?;
    print_stats(&stats);
    Ok(())
}

fn stats(program_path: &Path, unload_seconds: f64, load_seconds: f64, json: bool) -> Result<()> {
    let text = fs::read_to_string(program_path)?;
    let options = StatsOptions {
        tool_unload_seconds: unload_seconds,
        tool_load_seconds: load_seconds,
    };
    let stats = analyze_program(&text, &options)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_stats(&stats);
    }
    Ok(())
}

fn print_stats(stats: &ProgramStats) {
    println!(
        "Print time:     {} h  ({} min, {} s)",
        stats.print_time_hours, stats.print_time_mins, stats.print_time_sec
    );
    println!("Filament:       {} mm", stats.extruded_mm);
    println!("Motion:         {} s", stats.motion_sec);
    println!("Extrusion only: {} s", stats.extrusion_only_sec);
    println!(
        "Tool loads:     {} ({} s)",
        stats.tool_loads, stats.tool_load_sec
    );
    println!(
        "Tool unloads:   {} ({} s)",
        stats.tool_unloads, stats.tool_unload_sec
    );
}

fn translate(input: &Path, output: &Path, dx: f64, dy: f64, dz: f64) -> Result<()> {
    let text = fs::read_to_string(input)?;
    let moved = translate_program(&text, dx, dy, dz)?;
    fs::write(output, moved)?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn regions(job_path: &Path) -> Result<()> {
    let job = JobFile::load(job_path)?;
    let table = job.resolve_regions()?;

    println!(
        "{:<16} {:<10} {:<10} {:>9} {:>9} {:>8} {:>8}  {}",
        "name", "kind", "material", "x", "y", "w", "h", "z"
    );
    for region in table.iter() {
        let z = match region.placement {
            LayerRef::Index(index) => format!("layer {index}"),
            LayerRef::Height(z) => format!("{z:.2} mm"),
        };
        println!(
            "{:<16} {:<10} {:<10} {:>9.3} {:>9.3} {:>8.3} {:>8.3}  {}",
            region.name,
            kind_label(region.kind),
            region.material,
            region.position.x,
            region.position.y,
            region.dimensions.x,
            region.dimensions.y,
            z
        );
    }

    if let Some(limits) = table.bounds() {
        println!();
        println!(
            "bounds: X {:.3} .. {:.3}   Y {:.3} .. {:.3}",
            limits.x_min, limits.x_max, limits.y_min, limits.y_max
        );
    }
    Ok(())
}

fn kind_label(kind: RegionKind) -> &'static str {
    match kind {
        RegionKind::Surface => "surface",
        RegionKind::Perimeter => "perimeter",
    }
}
