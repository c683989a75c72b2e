use clap::Subcommand;
use std::path::PathBuf;

pub mod info;
pub mod list;
pub mod pack;
pub mod unpack;

#[derive(Subcommand)]
pub enum Commands {
    /// Pack numbered files (`name#NNNNN.ext`) into an AIL archive
    Pack {
        /// Source directory, searched recursively
        #[arg(short, long)]
        source: PathBuf,

        /// Output archive
        #[arg(short, long)]
        destination: PathBuf,

        /// Store every entry uncompressed
        #[arg(long)]
        no_compress: bool,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Unpack an AIL archive
    Unpack {
        /// Source archive
        #[arg(short, long)]
        source: PathBuf,

        /// Output directory (default: the archive path without its extension)
        #[arg(short, long)]
        destination: Option<PathBuf>,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// List archive entries
    List {
        /// Source archive
        #[arg(short, long)]
        source: PathBuf,

        /// Show detailed info (slot, sizes, compression)
        #[arg(long)]
        detailed: bool,
    },

    /// Show archive statistics
    Info {
        /// Source archive
        #[arg(short, long)]
        source: PathBuf,
    },
}

impl Commands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Pack {
                source,
                destination,
                no_compress,
                quiet,
            } => pack::execute(source, destination, !*no_compress, !*quiet),
            Commands::Unpack {
                source,
                destination,
                quiet,
            } => unpack::execute(source, destination.as_deref(), !*quiet),
            Commands::List { source, detailed } => list::execute(source, *detailed),
            Commands::Info { source } => info::execute(source),
        }
    }
}
