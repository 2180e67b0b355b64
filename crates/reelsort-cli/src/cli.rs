//! CLI argument definitions, grounded on the example pack's `clap`
//! derive convention (the teacher's own binaries are env-var-driven
//! services, not multi-subcommand CLIs).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "reelsort")]
#[command(author, version, about = "Video understanding and organization pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Emit results as JSON (or streaming JSON-lines for `workflow`)
    /// even when stdout is a TTY.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log format: human-readable or structured JSON.
    #[arg(long, value_enum, global = true, default_value = "human", env = "REELSORT_LOG_FORMAT")]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    Human,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recursively list video files under a directory.
    Scan(ScanArgs),
    /// Detect shot boundaries in one video file.
    Detect(DetectArgs),
    /// Analyze one video file (or a pre-built segment description).
    Analyze(AnalyzeArgs),
    /// Match an AnalysisResult JSON document against candidate folders.
    Match(MatchArgs),
    /// Organize one file into a target folder.
    Organize(OrganizeArgs),
    /// Run the full scan → detect → analyze → match → organize pipeline.
    Workflow(WorkflowArgs),
}

#[derive(Debug, clap::Args)]
pub struct ScanArgs {
    pub dir: PathBuf,

    #[arg(long)]
    pub recursive: bool,

    #[arg(long = "min-size")]
    pub min_size: Option<u64>,

    #[arg(long = "max-size")]
    pub max_size: Option<u64>,

    /// Comma-separated list of extensions (without the dot).
    #[arg(long, value_delimiter = ',')]
    pub ext: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlgorithmArg {
    FrameDiff,
    Histogram,
    Multi,
}

#[derive(Debug, clap::Args)]
pub struct DetectArgs {
    pub file: PathBuf,

    #[arg(long, default_value_t = 0.3)]
    pub threshold: f64,

    #[arg(long, value_enum, default_value = "multi")]
    pub algorithm: AlgorithmArg,

    /// `tag=weight` pairs, comma-separated.
    #[arg(long = "fusion-weights", value_delimiter = ',')]
    pub fusion_weights: Vec<String>,
}

#[derive(Debug, clap::Args)]
pub struct AnalyzeArgs {
    pub file: PathBuf,

    /// Prompt name (`comprehensive`, `product`, `scene`, `object`) or a
    /// path to a custom prompt template file.
    #[arg(long, default_value = "comprehensive")]
    pub prompt: String,

    #[arg(long = "no-cache")]
    pub no_cache: bool,

    #[arg(long, default_value_t = 120)]
    pub timeout: u64,
}

#[derive(Debug, clap::Args)]
pub struct MatchArgs {
    /// Path to an AnalysisResult JSON document.
    pub analysis_json: PathBuf,

    #[arg(long)]
    pub folders: PathBuf,

    #[arg(long = "min-confidence", default_value_t = 0.0)]
    pub min_confidence: f64,

    #[arg(long = "max-matches", default_value_t = 10)]
    pub max_matches: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Copy,
    Move,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OnConflictArg {
    Skip,
    Overwrite,
    Rename,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NamingArg {
    PreserveOriginal,
    Smart,
    ContentBased,
    Timestamp,
    Custom,
}

#[derive(Debug, clap::Args)]
pub struct OrganizeArgs {
    pub file: PathBuf,

    /// Path to an AnalysisResult JSON document, used by the `smart` and
    /// `content-based` naming modes.
    #[arg(long)]
    pub analysis: Option<PathBuf>,

    #[arg(long)]
    pub target: PathBuf,

    #[arg(long, value_enum, default_value = "preserve-original")]
    pub naming: NamingArg,

    #[arg(long, value_enum, default_value = "move")]
    pub mode: ModeArg,

    #[arg(long = "on-conflict", value_enum, default_value = "rename")]
    pub on_conflict: OnConflictArg,
}

#[derive(Debug, clap::Args)]
pub struct WorkflowArgs {
    pub dir: PathBuf,

    #[arg(long)]
    pub target: PathBuf,

    #[arg(long, env = "REELSORT_CONCURRENCY")]
    pub concurrency: Option<usize>,

    #[arg(long = "min-confidence-move", default_value_t = 0.0)]
    pub min_confidence_move: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_parses_with_defaults() {
        let cli = Cli::parse_from(["reelsort", "scan", "/videos"]);
        match cli.command {
            Command::Scan(args) => {
                assert_eq!(args.dir, PathBuf::from("/videos"));
                assert!(!args.recursive);
                assert!(args.ext.is_empty());
            }
            other => panic!("expected Scan, got {other:?}"),
        }
    }

    #[test]
    fn workflow_parses_required_and_optional_flags() {
        let cli = Cli::parse_from(["reelsort", "--json", "workflow", "/in", "--target", "/out", "--concurrency", "4"]);
        assert!(cli.json);
        match cli.command {
            Command::Workflow(args) => {
                assert_eq!(args.dir, PathBuf::from("/in"));
                assert_eq!(args.target, PathBuf::from("/out"));
                assert_eq!(args.concurrency, Some(4));
                assert_eq!(args.min_confidence_move, 0.0);
            }
            other => panic!("expected Workflow, got {other:?}"),
        }
    }

    #[test]
    fn detect_fusion_weights_accept_comma_separated_pairs() {
        let cli = Cli::parse_from(["reelsort", "detect", "clip.mp4", "--fusion-weights", "frame-difference=0.6,histogram=0.4"]);
        match cli.command {
            Command::Detect(args) => {
                assert_eq!(args.fusion_weights, vec!["frame-difference=0.6", "histogram=0.4"]);
            }
            other => panic!("expected Detect, got {other:?}"),
        }
    }

    #[test]
    fn organize_rejects_missing_required_target() {
        let result = Cli::try_parse_from(["reelsort", "organize", "clip.mp4"]);
        assert!(result.is_err());
    }
}
