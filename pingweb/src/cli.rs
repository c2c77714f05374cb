//! # CLI
//!
//! This module defines the command-line interface of `pingweb` using `clap`.
//!
//! It is responsible for parsing user input and picking the encoding mode of each call.
use clap::{Parser, Subcommand, ValueEnum};
use pingweb_core::{EncodingMode, UnaryMethod};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pingweb", version, about = "Ping a gRPC gateway in text or binary mode")]
pub struct Cli {
    /// Gateway URL (e.g. http://localhost:7070). Overrides the config file.
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Path to a JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a single input
    ///
    /// `<timestamp>` performs a unary call, `<count> <timestamp>` a server-streaming one.
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// pingweb send 11111
    /// pingweb send --binary "20 5000"
    /// ```
    Send {
        /// `<timestamp>` or `<count> <timestamp>`
        input: String,

        /// Use the binary transport instead of the text one
        #[arg(long)]
        binary: bool,

        /// Unary method to call
        #[arg(long, value_enum, default_value_t = Method::APing)]
        method: Method,
    },

    /// Read inputs from stdin, one per line
    ///
    /// A line may start with `text:` or `binary:` to pick the transport for that line only.
    Interactive {
        /// Default to the binary transport
        #[arg(long)]
        binary: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Method {
    APing,
    APost,
    ExtraPing,
    ExtraPost,
}

impl From<Method> for UnaryMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::APing => UnaryMethod::ServiceAPing,
            Method::APost => UnaryMethod::ServiceAPost,
            Method::ExtraPing => UnaryMethod::ServiceExtraPing,
            Method::ExtraPost => UnaryMethod::ServiceExtraPost,
        }
    }
}

pub fn mode(binary: bool) -> EncodingMode {
    if binary {
        EncodingMode::Binary
    } else {
        EncodingMode::Text
    }
}

/// Splits an optional `text:`/`binary:` prefix off an interactive line.
pub fn parse_line(line: &str, default: EncodingMode) -> (EncodingMode, &str) {
    match line.split_once(':') {
        Some((prefix, rest)) => match prefix.trim().parse() {
            Ok(mode) => (mode, rest),
            Err(_) => (default, line),
        },
        None => (default, line),
    }
}
