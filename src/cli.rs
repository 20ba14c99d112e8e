use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "portfolio-cli")]
#[command(about = "Track a stock portfolio whose only storage is a shareable URL")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional JSON settings file; built-in defaults apply otherwise.
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh quotes and browse the portfolio in an interactive table
    Show,

    /// Print the holdings and any cached quotes without fetching
    List,

    /// Add a holding and fetch its quote
    Add {
        /// Ticker symbol, e.g. AAPL or 7203.T
        symbol: String,
        /// Units held, an integer of 1 or more
        quantity: u32,
    },

    /// Remove a holding (its cached quote is kept)
    Remove { symbol: String },

    /// Change a holding's quantity
    Set {
        symbol: String,
        /// Raw quantity; floored and clamped to at least 1
        quantity: f64,
    },

    /// Refresh quotes for every holding
    Refresh,

    /// Replace the holdings with a symbol,quantity CSV file (`-` for stdin)
    Import { file: String },

    /// Write the holdings as CSV to a file, or stdout when omitted
    Export { file: Option<String> },

    /// Print the shareable URL carrying the current portfolio
    Link,

    /// Adopt the portfolio carried by a pasted link, path, or bare token
    Open { link: String },
}
