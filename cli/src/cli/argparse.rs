use std::path::PathBuf;

use align::SimilarityMetric;
use clap::Parser;

pub fn get_args() -> CliOpts {
    CliOpts::parse()
}

#[derive(Parser, Debug)]
#[clap(version = clap::crate_version!(), author = "Scott S. <scottschroeder@sent.com>")]
pub struct CliOpts {
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Parser, Debug)]
pub enum SubCommand {
    /// Find the timeframes of each highlight in a transcript
    Align(AlignOpts),

    /// Convert seconds into an HH:MM:SS:FF timecode
    Timecode(TimecodeOpts),

    /// Show the configuration the given settings resolve to
    ShowConfig(ShowConfig),
}

#[derive(Parser, Debug)]
pub struct AlignOpts {
    /// Word level JSON token list, or a WebVTT/SubRip caption file
    pub transcript: PathBuf,

    /// JSON list of `{"index", "title", "text"}` highlight requests
    pub highlights: PathBuf,

    /// Write outcomes here instead of stdout
    #[clap(long, short)]
    pub out: Option<PathBuf>,

    #[clap(flatten)]
    pub matching: MatchingConfig,
}

#[derive(Parser, Debug)]
pub struct TimecodeOpts {
    /// Fractional seconds
    #[clap(allow_hyphen_values = true)]
    pub seconds: f64,

    #[clap(long)]
    pub frame_rate: Option<u32>,

    #[clap(long)]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ShowConfig {
    #[clap(flatten)]
    pub matching: MatchingConfig,
}

#[derive(Parser, Debug)]
pub struct MatchingConfig {
    /// Path to a config file.
    ///
    /// If not provided, will look for `shortify.toml` in the user config dir.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Minimum similarity (0 to 1) for a segment to count as found
    #[clap(long)]
    pub threshold: Option<f64>,

    /// How segments are scored: character, word or combined
    #[clap(long)]
    pub metric: Option<SimilarityMetric>,

    /// Text that separates the pieces of a highlight
    #[clap(long)]
    pub gap_marker: Option<String>,

    #[clap(long)]
    pub frame_rate: Option<u32>,

    /// Give up on a highlight that takes longer than this
    #[clap(long)]
    pub timeout_ms: Option<u64>,
}
