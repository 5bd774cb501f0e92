//! Command-line interface.

use anyhow::Result;
use calltx::Limits;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use tracing::debug;

use crate::commands;

/// Encode, decode and inspect contract-call transactions.
#[derive(Parser)]
#[command(name = "calltool")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Largest accepted message body, in bytes.
    #[arg(
        long,
        global = true,
        env = "CALLTOOL_MAX_MESSAGE_LEN",
        default_value_t = Limits::DEFAULT_MAX_MESSAGE_LEN
    )]
    max_message_len: usize,

    /// Deepest accepted nesting of messages and groups.
    #[arg(
        long,
        global = true,
        env = "CALLTOOL_MAX_DEPTH",
        default_value_t = Limits::DEFAULT_MAX_DEPTH
    )]
    max_depth: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a transaction from flags and print its bytes as hex.
    Encode {
        #[command(flatten)]
        tx: TxArgs,

        /// Prefix the body with its varint length.
        #[arg(long)]
        framed: bool,
    },

    /// Decode hex bytes into a transaction and print its fields.
    Decode {
        /// Hex-encoded bytes, or `-` to read them from stdin.
        input: String,

        /// Input carries a varint length prefix.
        #[arg(long)]
        framed: bool,
    },

    /// Dump the raw record tree of hex bytes, naming known fields.
    Inspect {
        /// Hex-encoded bytes, or `-` to read them from stdin.
        input: String,

        /// Input carries a varint length prefix.
        #[arg(long)]
        framed: bool,
    },
}

/// Transaction fields. Byte fields take hex.
#[derive(Args, Debug, Default)]
pub struct TxArgs {
    /// Call arguments. Setting any call flag makes the call present.
    #[arg(long)]
    pub payload: Option<String>,

    #[arg(long)]
    pub contract_id: Option<String>,

    #[arg(long)]
    pub selector: Option<String>,

    #[arg(long, default_value_t = 0)]
    pub nonce: u64,

    /// Setting either fee flag makes the fee present.
    #[arg(long)]
    pub gas_limit: Option<u64>,

    #[arg(long)]
    pub gas_price: Option<u64>,

    /// Repeat for each nullifier, in order.
    #[arg(long = "nullifier")]
    pub nullifiers: Vec<String>,

    #[arg(long)]
    pub signature: Option<String>,
}

impl Cli {
    pub fn limits(&self) -> Limits {
        Limits::new()
            .with_max_message_len(self.max_message_len)
            .with_max_depth(self.max_depth)
    }

    /// Execute the CLI command, printing its output to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid hex or does not decode.
    pub fn run(self) -> Result<()> {
        let limits = self.limits();
        debug!(max_message_len = limits.max_message_len, max_depth = limits.max_depth, "limits");

        let output = match self.command {
            Commands::Encode { tx, framed } => commands::encode(&tx, framed)?,
            Commands::Decode { input, framed } => {
                let bytes = commands::read_input(&input)?;
                commands::decode(&bytes, framed, &limits)?
            }
            Commands::Inspect { input, framed } => {
                let bytes = commands::read_input(&input)?;
                commands::inspect(&bytes, framed, &limits)?
            }
        };
        println!("{output}");
        Ok(())
    }
}
