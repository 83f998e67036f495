//! stacksmith - manifest synthesizer for the nginx + PHP-FPM stack

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stacksmith::template::ConfigDir;
use stacksmith::topology::TopologyCompiler;

/// stacksmith - declare the web stack topology once, render it anywhere
#[derive(Parser, Debug)]
#[command(name = "stacksmith", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize the Kubernetes manifest
    ///
    /// Reads the four config templates, wires the PHP-FPM service address
    /// into the nginx site config, and renders the full resource graph as a
    /// multi-document YAML stream. Pipeline placeholders (<<NAMESPACE>> and
    /// friends) are emitted verbatim.
    Synth(SynthArgs),
}

/// Synth mode arguments
#[derive(Parser, Debug)]
struct SynthArgs {
    /// Directory holding the per-service config templates
    #[arg(short = 'c', long = "config-dir", default_value = "config")]
    config_dir: PathBuf,

    /// Write the manifest to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Instance suffix for pod selector labels (nginx-<instance>, php-fpm-<instance>)
    #[arg(long, default_value = "web")]
    instance: String,
}

fn main() -> ExitCode {
    // Logs go to stderr so a stdout manifest stays pipeable into kubectl.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("synthesis failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> stacksmith::Result<()> {
    match cli.command {
        Commands::Synth(args) => synth(&args),
    }
}

fn synth(args: &SynthArgs) -> stacksmith::Result<()> {
    let compiler = TopologyCompiler::new(ConfigDir::new(&args.config_dir), &args.instance);
    let manifest = compiler.compile()?.manifest()?;

    match &args.output {
        Some(path) => manifest.write(path)?,
        None => print!("{}", manifest.to_yaml()?),
    }
    Ok(())
}
