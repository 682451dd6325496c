use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod utils;

#[derive(Parser)]
#[command(name = "dynarray-cmd")]
#[command(about = "Command-line playground for dynarray buffers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a u64 array of 10 elements, write one element and release it
    Demo,

    /// Create an array, resize it and dump the resulting payload
    Resize {
        /// Byte size of a single element
        #[arg(long, default_value_t = 4)]
        element_size: usize,

        /// Initial number of elements
        #[arg(long, default_value_t = 4)]
        capacity: usize,

        /// Number of elements after the resize
        #[arg(long)]
        to: usize,

        /// Zero the elements added by the resize
        #[arg(long)]
        zero: bool,

        /// Byte pattern written over the initial payload
        #[arg(long)]
        fill: Option<u8>,

        /// Limit the bytes the array may hold
        #[arg(long)]
        budget: Option<usize>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo => commands::demo::run(),
        Commands::Resize {
            element_size,
            capacity,
            to,
            zero,
            fill,
            budget,
        } => commands::resize::run(commands::resize::ResizeArgs {
            element_size,
            capacity,
            to,
            zero,
            fill,
            budget,
        }),
    }
}
