use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dsync_types::{Platform, TokenKind};

#[derive(Parser)]
#[command(
    name = "dsync",
    about = "dsync: keep design tokens in sync with Figma variables",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Project configuration file
    #[arg(long, global = true, default_value = "dsync.toml")]
    pub config: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create .env, dsync.toml, and sample token files
    Init(InitArgs),
    /// Pull variables from Figma into a token file
    Pull(PullArgs),
    /// Push local tokens to Figma
    Push(PushArgs),
    /// Validate token files
    Validate(ValidateArgs),
    /// Merge token files, later files winning
    Merge(MergeArgs),
    /// Convert between canonical tokens and the build-tool format
    Transform(TransformArgs),
    /// Show changes between two token files
    Diff(DiffArgs),
    /// Generate platform styles with Style Dictionary
    Build(BuildArgs),
    /// Start the HTTP bridge
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Project directory
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
    /// Figma personal access token to write into .env
    #[arg(long)]
    pub token: Option<String>,
    /// Figma file id to write into .env
    #[arg(long)]
    pub file_id: Option<String>,
    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct PullArgs {
    #[arg(short, long, default_value = "tokens/tokens.json")]
    pub output: PathBuf,
    /// Figma file id (overrides FIGMA_FILE_ID)
    #[arg(short, long)]
    pub file_id: Option<String>,
    /// Write compact JSON
    #[arg(long)]
    pub compact: bool,
    /// Fail on any variable that cannot be converted or validated
    #[arg(long)]
    pub strict: bool,
    /// Variable mode to read instead of each collection's default
    #[arg(long)]
    pub mode: Option<String>,
}

#[derive(Args)]
pub struct PushArgs {
    /// Token files or directories, merged in order
    #[arg(short, long = "input", default_value = "tokens/tokens.json")]
    pub inputs: Vec<PathBuf>,
    /// Figma file id (overrides FIGMA_FILE_ID)
    #[arg(short, long)]
    pub file_id: Option<String>,
    /// Replace remote tokens instead of merging with them; remote-only tokens are deleted
    #[arg(long)]
    pub no_merge: bool,
    /// Preview changes without applying
    #[arg(short, long)]
    pub dry_run: bool,
    /// Abort if any token cannot be converted
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Token files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Accept only these token types
    #[arg(long, value_delimiter = ',')]
    pub allow: Vec<TokenKind>,
}

#[derive(Args)]
pub struct MergeArgs {
    /// Token files or directories, in merge order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    #[arg(short, long, default_value = "tokens/tokens.json")]
    pub output: PathBuf,
    #[arg(long)]
    pub compact: bool,
}

#[derive(Args)]
pub struct TransformArgs {
    pub input: PathBuf,
    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Read the build-tool format and write canonical tokens
    #[arg(long)]
    pub from_build: bool,
    /// Prepare values for one platform
    #[arg(short, long, conflicts_with = "from_build")]
    pub platform: Option<Platform>,
    /// Fail on any token that cannot be converted
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct DiffArgs {
    pub base: PathBuf,
    pub proposed: PathBuf,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Token files or directories, merged in order
    #[arg(short, long = "input", default_value = "tokens")]
    pub inputs: Vec<PathBuf>,
    /// Platforms to build (defaults to dsync.toml, then css)
    #[arg(short, long, value_delimiter = ',')]
    pub platform: Vec<Platform>,
    /// Style Dictionary configuration file
    #[arg(long)]
    pub sd_config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<String>,
    /// Answer cross-origin requests from any origin
    #[arg(long)]
    pub cors: bool,
}
