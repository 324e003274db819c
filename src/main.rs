//! ZVF CLI - run video analysis filters over Y4M clips

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use zvf_lib::format::{read_clip, Y4mWriter};
use zvf_lib::host::{Args, Core, Registry, Scheduler};
use zvf_lib::{init, Config};

#[derive(Parser)]
#[command(name = "zvf")]
#[command(about = "ZVF - video analysis filters", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Number of threads to use
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Row alignment of allocated frames, in bytes
    #[arg(long, default_value_t = 32)]
    alignment: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered plugins and their functions
    List,

    /// Show information about a Y4M file
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Run a filter function over a Y4M file
    Run {
        /// Function name, e.g. rainbowdetect.Detect
        function: String,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Filter argument as key=value, repeatable
        #[arg(short = 'a', long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config {
        max_threads: cli.threads,
        verbose: cli.verbose,
        debug: cli.debug,
        frame_alignment: cli.alignment,
    };

    init(config.clone())?;

    info!("ZVF v{}", zvf_lib::VERSION);

    match cli.command {
        Commands::List => cmd_list(),
        Commands::Info { input } => {
            info!("Getting info for: {}", input.display());
            cmd_info(&input)?;
        }
        Commands::Run {
            function,
            input,
            output,
            args,
        } => {
            info!(
                "Running {} on {} -> {}",
                function,
                input.display(),
                output.display()
            );
            cmd_run(&config, &function, &input, &output, &args)?;
        }
    }

    Ok(())
}

fn cmd_list() {
    let registry = Registry::builtin();
    for plugin in registry.plugins() {
        println!("{} ({}) - {}", plugin.namespace, plugin.identifier, plugin.name);
        for function in &plugin.functions {
            println!("  {}.{}  {}", plugin.namespace, function.name, function.signature);
        }
    }
}

fn cmd_info(input: &Path) -> anyhow::Result<()> {
    let clip = read_clip(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let node = clip.into_node();
    let info = node.info();

    println!("File: {}", input.display());
    match info.format {
        Some(format) => println!("  Format: {}", format),
        None => println!("  Format: variable"),
    }
    println!("  Size: {}x{}", info.width, info.height);
    println!("  Frames: {}", info.num_frames);
    println!("  Frame rate: {} ({:.3} fps)", info.fps, info.fps.to_f64());

    Ok(())
}

fn cmd_run(
    config: &Config,
    function: &str,
    input: &Path,
    output: &Path,
    pairs: &[String],
) -> anyhow::Result<()> {
    let registry = Registry::builtin();
    let clip = read_clip(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let mut args = Args::new();
    args.set_clip("clip", clip.into_node());
    for pair in pairs {
        args.set_parsed(pair)?;
    }

    let node = registry.invoke(function, &args)?;
    info!("Created {}: {}", node.name(), node.info());

    let scheduler = Scheduler::new(Core::from_config(config));
    let frames = scheduler.render_all(&node)?;

    let mut writer = Y4mWriter::create(output, node.info())
        .with_context(|| format!("Failed to create {}", output.display()))?;
    for frame in &frames {
        writer.write_frame(frame)?;
    }
    info!("Wrote {} frames to {}", writer.frames_written(), output.display());

    Ok(())
}
