//! crate-nx: parametric crate design from the command line

use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;
use u_crating::{CratePipeline, ProgressInfo};
use u_crating_cli::{
    run_batch, save_bom_json, save_geometry_json, summary, write_expressions, ConfigParser,
};

#[derive(Parser)]
#[command(name = "crate-nx")]
#[command(about = "Design a shipping crate and export NX expressions")]
#[command(version)]
struct Cli {
    /// Log progress at info level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Design one crate and write its expression listing
    Generate {
        /// Path to the JSON configuration
        config: PathBuf,

        /// Output file for expressions (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for geometry (JSON)
        #[arg(long)]
        geometry: Option<PathBuf>,

        /// Output file for the bill of materials (JSON)
        #[arg(long)]
        bom: Option<PathBuf>,
    },

    /// Print the default configuration as JSON
    Sample,

    /// Design many crates in parallel
    Batch {
        /// JSON configuration files
        #[arg(required = true)]
        configs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "expressions")]
        output: PathBuf,
    },

    /// Print a stage-by-stage summary of one crate
    Inspect {
        /// Path to the JSON configuration
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::builder().filter_level(LevelFilter::Info).init();
    } else {
        env_logger::init();
    }

    match cli.command {
        Commands::Generate {
            config,
            output,
            geometry,
            bom,
        } => {
            let config = ConfigParser::new().parse_file(&config)?;
            let design = CratePipeline::new().run(&config)?;
            log::info!("designed crate in {}ms", design.computation_time_ms);

            match output {
                Some(path) => {
                    write_expressions(&design, &path)?;
                    eprintln!("Expressions saved to: {}", path.display());
                }
                None => print!("{}", design.expressions.text),
            }

            if let Some(path) = geometry {
                save_geometry_json(&design, &path)?;
                eprintln!("Geometry saved to: {}", path.display());
            }

            if let Some(path) = bom {
                save_bom_json(&design, &path)?;
                eprintln!("Bill of materials saved to: {}", path.display());
            }
        }

        Commands::Sample => {
            println!("{}", ConfigParser::sample()?);
        }

        Commands::Batch { configs, output } => {
            let outcomes = run_batch(&configs, &output)?;
            let mut failed = 0;
            for outcome in &outcomes {
                match &outcome.output {
                    Ok(path) => println!("  {} -> {}", outcome.input.display(), path.display()),
                    Err(e) => {
                        failed += 1;
                        eprintln!("  {} failed: {}", outcome.input.display(), e);
                    }
                }
            }
            println!("\n{} of {} crates designed", outcomes.len() - failed, outcomes.len());
            if failed > 0 {
                anyhow::bail!("{} configuration(s) failed", failed);
            }
        }

        Commands::Inspect { config } => {
            let config = ConfigParser::new().parse_file(&config)?;
            let design = CratePipeline::new().run_with_progress(
                &config,
                Box::new(|info: ProgressInfo| {
                    println!(
                        "[{}/{}] {:<12} {:>5}ms",
                        info.completed, info.total, info.stage.name(), info.elapsed_ms
                    );
                }),
            )?;
            println!("{:-<60}", "");
            println!("{}", summary(&design));
        }
    }

    Ok(())
}
