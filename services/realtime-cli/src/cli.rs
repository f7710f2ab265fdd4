use clap::Parser;

/// Model used when `--model` is not given.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini-realtime-preview-2024-12-17";

/// Chat with an OpenAI Realtime model from the terminal.
#[derive(Parser, Debug)]
#[command(name = "realtime-cli", version, about)]
pub struct Cli {
    /// OpenAI Realtime model id.
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Print raw events the session does not handle.
    #[arg(long)]
    pub debug: bool,
}
