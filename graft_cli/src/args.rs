use clap::Parser;
use graft_common::{Config, DedupeMode, OverlapPolicy};

/// graft - fold a chain of additions by pattern rewriting
#[derive(Parser, Debug)]
#[command(name = "graft")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Number of `Add` nodes in the generated chain
    #[arg(short = 'n', long, default_value_t = 4)]
    pub length: usize,

    /// What to do when sub-pattern embeddings overlap
    #[arg(long, value_enum, default_value = "abort")]
    pub overlap: OverlapArg,

    /// How repeated embeddings are collapsed
    #[arg(long, value_enum, default_value = "node-set")]
    pub dedupe: DedupeArg,

    /// Stop after this many rewrite rounds
    #[arg(long)]
    pub max_rounds: Option<usize>,

    /// Print the effective configuration as JSON and exit
    #[arg(long, default_value_t = false)]
    pub print_config: bool,
}

impl Args {
    /// Convert command-line arguments into internal configuration
    pub fn to_config(&self) -> Config {
        let mut builder = Config::builder()
            .overlap(self.overlap.clone().into())
            .dedupe(self.dedupe.clone().into());
        if let Some(rounds) = self.max_rounds {
            builder = builder.max_rounds(rounds);
        }
        builder.build()
    }
}

/// Command-line argument wrapper for OverlapPolicy
#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OverlapArg {
    /// Fail the round on the first overlap
    #[value(name = "abort")]
    Abort,
    /// Rewrite a maximum disjoint subset, defer the rest
    #[value(name = "maximum-disjoint")]
    MaximumDisjoint,
}

impl From<OverlapArg> for OverlapPolicy {
    fn from(arg: OverlapArg) -> Self {
        match arg {
            OverlapArg::Abort => OverlapPolicy::Abort,
            OverlapArg::MaximumDisjoint => OverlapPolicy::MaximumDisjoint,
        }
    }
}

/// Command-line argument wrapper for DedupeMode
#[derive(Debug, Clone, clap::ValueEnum)]
pub enum DedupeArg {
    /// Report every embedding
    #[value(name = "none")]
    None,
    /// Drop repeats of the same mapping
    #[value(name = "full")]
    Full,
    /// Collapse embeddings over the same host nodes
    #[value(name = "node-set")]
    NodeSet,
}

impl From<DedupeArg> for DedupeMode {
    fn from(arg: DedupeArg) -> Self {
        match arg {
            DedupeArg::None => DedupeMode::None,
            DedupeArg::Full => DedupeMode::Full,
            DedupeArg::NodeSet => DedupeMode::NodeSet,
        }
    }
}
