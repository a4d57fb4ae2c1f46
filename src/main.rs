use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use genetic_timetable::records::append_record;
use genetic_timetable::visualization::{visualize_history, write_history_csv};
use genetic_timetable::{ClassRecord, MutationMode, TimetableConfig, TimetableScheduler};
use std::fs::File;
use std::path::PathBuf;
use tracing::info;

const DEFAULT_INPUT: &str = "input_data.txt";

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a timetable from the record file and print it
    Run {
        #[arg(short, long, default_value = DEFAULT_INPUT)]
        input: PathBuf,

        #[arg(short, long, default_value_t = 20)]
        population: usize,

        #[arg(short, long, default_value_t = 100)]
        generations: usize,

        #[arg(short, long, default_value_t = 0.1)]
        mutation_rate: f64,

        #[arg(long, value_enum, default_value_t = MutationArg::Individual)]
        mutation_mode: MutationArg,

        /// Seed for reproducible runs
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write the grid as CSV
        #[arg(long)]
        grid_csv: Option<PathBuf>,

        /// Write the best fitness of every generation as CSV
        #[arg(long)]
        history_csv: Option<PathBuf>,

        /// Draw the fitness history as a PNG chart; pass without a value
        /// for a timestamped file name
        #[arg(long, num_args = 0..=1)]
        chart: Option<Option<PathBuf>>,
    },
    /// Append one record to the record file
    Add {
        #[arg(short, long, default_value = DEFAULT_INPUT)]
        input: PathBuf,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        teacher: String,

        #[arg(long)]
        class: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MutationArg {
    Individual,
    Gene,
}

impl From<MutationArg> for MutationMode {
    fn from(arg: MutationArg) -> Self {
        match arg {
            MutationArg::Individual => MutationMode::PerIndividual,
            MutationArg::Gene => MutationMode::PerGene,
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Run {
            input,
            population,
            generations,
            mutation_rate,
            mutation_mode,
            seed,
            grid_csv,
            history_csv,
            chart,
        } => {
            let config = TimetableConfig {
                population_size: population,
                generations,
                mutation_rate,
                mutation_mode: mutation_mode.into(),
                seed,
            };
            let mut scheduler = TimetableScheduler::new(config);
            let grid = scheduler
                .run(&input)
                .with_context(|| format!("failed to build a timetable from {}", input.display()))?;

            println!("{}", "Timetable".bold().green());
            println!("{}", grid);

            if let Some(report) = scheduler.best_report() {
                let score = format!("Fitness {}", report.score());
                println!(
                    "{} - collisions: -{}, session load: -{}, day load: -{}",
                    if report.is_perfect() { score.bold().green() } else { score.bold().red() },
                    report.collision_penalty,
                    report.session_penalty,
                    report.day_penalty,
                );
            }

            if let Some(path) = grid_csv {
                grid.write_csv(File::create(&path)?)?;
                info!(path = %path.display(), "Grid written");
            }

            if let Some(path) = history_csv {
                write_history_csv(scheduler.fitness_history(), File::create(&path)?)?;
                info!(path = %path.display(), "Fitness history written");
            }

            if let Some(path) = chart {
                let path = path.unwrap_or_else(|| {
                    let date_str = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
                    PathBuf::from(format!("fitness_{}.png", date_str))
                });
                visualize_history(scheduler.fitness_history(), &path)
                    .map_err(|e| anyhow::anyhow!("failed to draw chart: {}", e))?;
            }
        }
        Commands::Add {
            input,
            subject,
            teacher,
            class,
        } => {
            append_record(&input, &ClassRecord::new(subject, teacher, class))?;
            println!("{} {}", "Saved to".green(), input.display());
        }
    }

    Ok(())
}
