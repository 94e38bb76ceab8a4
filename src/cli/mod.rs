use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// `sysops` - turn plain-language requests into gated system-administration actions.
#[derive(Parser, Debug)]
#[command(name = "sysops")]
#[command(version)]
#[command(about = "Ask a local model to run system-administration actions, with confirmation for risky ones.", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Your request, e.g. `sysops what is my disk usage`
    pub request: Vec<String>,

    /// Model to use (overrides config and SYSOPS_MODEL)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Auto-approve every action, including destructive ones (dangerous!)
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Interactive session
    #[arg(short, long)]
    pub interactive: bool,

    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Config file (default: ~/.sysops/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Serve the action registry as an MCP server over stdio
    Serve {
        /// Allow actions that would otherwise need confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Print the action catalogue
    Tools {
        /// Print MCP tool definitions as JSON instead
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Positional words joined into one instruction, if any.
    pub fn request_text(&self) -> Option<String> {
        let text = self.request.join(" ");
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// False for a bare one-shot invocation: no subcommand, no `-i`, no request.
    pub fn has_work(&self) -> bool {
        self.command.is_some() || self.interactive || self.request_text().is_some()
    }
}
