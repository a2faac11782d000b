use std::path::PathBuf;

use clap::Parser;
use propfilter_core::FilterMode;

#[derive(Parser, Debug)]
#[command(
    name = "propfilter",
    about = "Keep only whitelisted JSON properties, at every nesting level",
    version
)]
pub struct Cli {
    /// Allowed property names; repeat the flag or separate names with commas
    #[arg(short, long = "property", value_name = "NAMES")]
    pub properties: Vec<String>,

    /// TOML file with `properties` and `mode`
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Filter implementation; overrides the config file
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// JSON input file; reads stdin when absent
    pub input: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    Streaming,
    Tree,
}

impl From<ModeArg> for FilterMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Streaming => FilterMode::Streaming,
            ModeArg::Tree => FilterMode::Tree,
        }
    }
}
