use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "formatfusion")]
#[command(author, version, about = "Convert images, videos and audio between formats")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Convert a single file
    Convert {
        /// File to convert
        #[arg(required = true)]
        input: PathBuf,

        /// Target format, e.g. png, webm, mp3
        #[arg(short, long)]
        to: String,

        /// Media kind (image, video, audio); guessed from the extension if omitted
        #[arg(short, long)]
        kind: Option<String>,

        /// Output file or directory (defaults to the input's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show size, format, color mode and metadata of an image
    Inspect {
        /// Image to inspect
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe a video or audio file with ffprobe
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// List accepted upload extensions and target formats
    Formats,

    /// Display version information
    Version,
}
