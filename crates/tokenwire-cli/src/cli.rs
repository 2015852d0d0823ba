//! CLI argument parsing

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tokenwire::TokenScheme;

/// Main CLI application structure
#[derive(Parser, Debug)]
#[command(
    name = "tokenwire",
    version,
    about = "Mint OAuth 2.0 access tokens and inspect their wire encodings",
    long_about = "tokenwire mints Bearer, DPoP and token-exchange (N_A) access tokens and decodes\n\
                  Authorization headers, JSON token responses and WWW-Authenticate challenges.\n\n\
                  SECURITY WARNINGS:\n\
                  - Token values passed on the command line may end up in shell history\n\
                  - Generated tokens are printed to stdout in full"
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, short = 'c', global = true, env = "TOKENWIRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new access token
    Generate(GenerateArgs),

    /// Decode an Authorization header value
    Header(HeaderArgs),

    /// Decode a JSON token response from a file or stdin
    Response(ResponseArgs),

    /// WWW-Authenticate challenge operations
    #[command(subcommand)]
    Challenge(ChallengeCommands),
}

/// Arguments for `generate`
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Token scheme
    #[arg(long, short = 's', value_enum, default_value = "bearer")]
    pub scheme: SchemeArg,

    /// Random bytes in the token value (defaults to the configured length)
    #[arg(long, short = 'b')]
    pub bytes: Option<usize>,

    /// Lifetime in seconds
    #[arg(long, short = 'l')]
    pub lifetime: Option<u64>,

    /// Space-delimited scope
    #[arg(long)]
    pub scope: Option<String>,

    /// RFC 8693 issued token type URI
    #[arg(long)]
    pub issued_token_type: Option<String>,

    /// Also generate a refresh token
    #[arg(long)]
    pub refresh: bool,

    /// Wire encoding to print
    #[arg(long, short = 'e', value_enum, default_value = "json")]
    pub encoding: Encoding,
}

/// Arguments for `header`
#[derive(Args, Debug)]
pub struct HeaderArgs {
    /// Authorization header value, e.g. "Bearer abc"
    pub value: String,

    /// Expected scheme (inferred from the value when omitted)
    #[arg(long, short = 's', value_enum)]
    pub scheme: Option<HeaderSchemeArg>,
}

/// Arguments for `response`
#[derive(Args, Debug)]
pub struct ResponseArgs {
    /// JSON file to read, or `-` for stdin
    #[arg(default_value = "-")]
    pub input: String,

    /// Expected scheme (routed on token_type when omitted)
    #[arg(long, short = 's', value_enum)]
    pub scheme: Option<SchemeArg>,
}

/// Challenge commands
#[derive(Subcommand, Debug)]
pub enum ChallengeCommands {
    /// Parse a WWW-Authenticate header value
    Parse {
        /// Header value, e.g. 'Bearer error="invalid_token"'
        value: String,

        /// Expected scheme (any scheme is accepted when omitted)
        #[arg(long, short = 's', value_enum)]
        scheme: Option<HeaderSchemeArg>,
    },

    /// Build a WWW-Authenticate header value
    Build(BuildArgs),
}

/// Arguments for `challenge build`
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Challenge scheme
    #[arg(long, short = 's', value_enum, default_value = "bearer")]
    pub scheme: HeaderSchemeArg,

    /// Standard error to start from
    #[arg(long, value_enum)]
    pub error: Option<StandardErrorArg>,

    /// Custom error code (overrides --error)
    #[arg(long)]
    pub code: Option<String>,

    /// Error description
    #[arg(long)]
    pub description: Option<String>,

    /// Error URI
    #[arg(long)]
    pub uri: Option<String>,

    /// Realm (defaults to the configured realm)
    #[arg(long)]
    pub realm: Option<String>,

    /// Required scope
    #[arg(long)]
    pub scope: Option<String>,

    /// Accepted DPoP proof algorithms
    #[arg(long, value_delimiter = ',')]
    pub algs: Vec<String>,

    /// HTTP status code
    #[arg(long)]
    pub status: Option<u16>,
}

/// Serializable token schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemeArg {
    /// RFC 6750 Bearer
    Bearer,
    /// RFC 9449 DPoP
    Dpop,
    /// RFC 8693 N_A
    Na,
}

impl From<SchemeArg> for TokenScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Bearer => TokenScheme::Bearer,
            SchemeArg::Dpop => TokenScheme::DPoP,
            SchemeArg::Na => TokenScheme::NotApplicable,
        }
    }
}

/// Schemes with an Authorization / WWW-Authenticate keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HeaderSchemeArg {
    /// RFC 6750 Bearer
    Bearer,
    /// RFC 9449 DPoP
    Dpop,
}

impl From<HeaderSchemeArg> for TokenScheme {
    fn from(arg: HeaderSchemeArg) -> Self {
        match arg {
            HeaderSchemeArg::Bearer => TokenScheme::Bearer,
            HeaderSchemeArg::Dpop => TokenScheme::DPoP,
        }
    }
}

/// Standard RFC 6750 errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StandardErrorArg {
    /// No token presented (401, no code)
    MissingToken,
    /// Malformed request (400)
    InvalidRequest,
    /// Invalid or expired token (401)
    InvalidToken,
    /// Token lacks scope (403)
    InsufficientScope,
}

impl From<StandardErrorArg> for tokenwire::StandardError {
    fn from(arg: StandardErrorArg) -> Self {
        match arg {
            StandardErrorArg::MissingToken => Self::MissingToken,
            StandardErrorArg::InvalidRequest => Self::InvalidRequest,
            StandardErrorArg::InvalidToken => Self::InvalidToken,
            StandardErrorArg::InsufficientScope => Self::InsufficientScope,
        }
    }
}

/// Wire encodings for generated tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Encoding {
    /// JSON token response
    Json,
    /// Authorization header value
    Header,
    /// URL-encoded query parameters
    Params,
}

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable with colors
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Compact JSON (no pretty print)
    Compact,
}
