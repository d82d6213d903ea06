mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{BuildArgs, SelectionArgs, cmd_create, cmd_info, cmd_options, cmd_package, cmd_plan, cmd_validate};
use output::{OutputFormat, print_error};

/// aespkg - build and package the tiny-AES-c library
#[derive(Parser)]
#[command(name = "aespkg")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose (debug) logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// List package options and their defaults
  Options {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Check that an option selection is buildable
  Validate {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Configure a build and print its plan without compiling
  Plan {
    #[command(flatten)]
    selection: SelectionArgs,

    #[command(flatten)]
    build: BuildArgs,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Validate, configure, build and package the library
  Create {
    #[command(flatten)]
    selection: SelectionArgs,

    #[command(flatten)]
    build: BuildArgs,

    /// Package destination root
    #[arg(long)]
    dest: PathBuf,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Package an existing build output tree
  Package {
    /// Directory holding headers, the static library and the license
    #[arg(long)]
    from: PathBuf,

    /// Package destination root
    #[arg(long)]
    dest: PathBuf,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show package metadata and the host platform
  Info {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(e) = run(cli.command) {
    print_error(&format!("{:#}", e));
    std::process::exit(1);
  }
}

fn run(command: Commands) -> Result<()> {
  match command {
    Commands::Options { output } => cmd_options(output),
    Commands::Validate { selection, output } => cmd_validate(&selection, output),
    Commands::Plan {
      selection,
      build,
      output,
    } => cmd_plan(&selection, &build, output),
    Commands::Create {
      selection,
      build,
      dest,
      output,
    } => cmd_create(&selection, &build, &dest, output),
    Commands::Package { from, dest, output } => cmd_package(&from, &dest, output),
    Commands::Info { output } => cmd_info(output),
  }
}
