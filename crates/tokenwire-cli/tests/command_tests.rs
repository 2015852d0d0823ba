//! Integration tests for argument parsing and command execution
//!
//! Commands are driven through the public API the binary uses, with settings
//! loaded from temporary configuration files.

use std::io::Write;

use clap::Parser;
use tokenwire::{ChallengeScheme, TokenScheme};
use tokenwire_cli::cli::{ChallengeCommands, Commands, Encoding, OutputFormat};
use tokenwire_cli::output::Formatter;
use tokenwire_cli::{Cli, CliError, CommandExecutor, Settings};

const TEST_PREFIX: &str = "TOKENWIRE_COMMAND_INTEGRATION_TEST";

fn settings_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn executor(settings: Settings) -> CommandExecutor {
    CommandExecutor::new(Formatter::new(OutputFormat::Compact, false), settings).unwrap()
}

/// Test that global flags and generate options parse
#[test]
fn test_parse_generate_command() {
    let cli = Cli::try_parse_from([
        "tokenwire",
        "generate",
        "--scheme",
        "dpop",
        "--lifetime",
        "3600",
        "--refresh",
        "-e",
        "header",
        "--format",
        "yaml",
        "--no-color",
    ])
    .unwrap();

    assert_eq!(cli.format, OutputFormat::Yaml);
    assert!(cli.no_color);
    let Commands::Generate(args) = cli.command else {
        panic!("expected generate");
    };
    assert_eq!(TokenScheme::from(args.scheme), TokenScheme::DPoP);
    assert_eq!(args.lifetime, Some(3600));
    assert!(args.refresh);
    assert_eq!(args.encoding, Encoding::Header);
}

/// Test that unknown schemes are rejected by the parser
#[test]
fn test_parse_rejects_unknown_scheme() {
    assert!(Cli::try_parse_from(["tokenwire", "generate", "--scheme", "mac"]).is_err());
    // N_A has no header keyword
    assert!(Cli::try_parse_from(["tokenwire", "header", "x", "--scheme", "na"]).is_err());
}

/// Test that comma-delimited algorithms reach the challenge builder
#[test]
fn test_build_challenge_from_arguments() {
    let cli = Cli::try_parse_from([
        "tokenwire",
        "challenge",
        "build",
        "--scheme",
        "dpop",
        "--error",
        "invalid-token",
        "--algs",
        "ES256,EdDSA",
    ])
    .unwrap();
    let Commands::Challenge(ChallengeCommands::Build(args)) = cli.command else {
        panic!("expected challenge build");
    };

    let file = settings_file("[codec]\nrealm = \"files\"\n");
    let settings = Settings::load_with_prefix(Some(file.path()), TEST_PREFIX).unwrap();
    let challenge = executor(settings).build_challenge(args).unwrap();

    assert_eq!(challenge.scheme(), &ChallengeScheme::DPoP);
    assert_eq!(
        challenge.to_www_authenticate(),
        r#"DPoP realm="files", error="invalid_token", algs="ES256 EdDSA""#
    );
}

/// Test that configured value length drives generated tokens
#[test]
fn test_generate_with_configured_length() {
    let file = settings_file("[codec]\nvalue_bytes = 48\n");
    let settings = Settings::load_with_prefix(Some(file.path()), TEST_PREFIX).unwrap();

    let cli = Cli::try_parse_from(["tokenwire", "generate"]).unwrap();
    let Commands::Generate(args) = cli.command else {
        panic!("expected generate");
    };
    let pair = executor(settings).generate(&args).unwrap();

    assert_eq!(pair.access_token().scheme(), TokenScheme::Bearer);
    assert_eq!(pair.access_token().value().as_str().len(), 64);
}

/// Test a token response read from disk
#[test]
fn test_response_from_file() {
    let cli = Cli::try_parse_from([
        "tokenwire",
        "--format",
        "compact",
        "response",
        "--scheme",
        "bearer",
    ])
    .unwrap();
    let Commands::Response(args) = cli.command else {
        panic!("expected response");
    };
    assert_eq!(args.input, "-");

    let body = r#"{"access_token":"abc","token_type":"Bearer","expires_in":"120","refresh_token":"def"}"#;
    let pair = executor(Settings::default())
        .parse_response(body, args.scheme.map(TokenScheme::from))
        .unwrap();

    assert_eq!(pair.access_token().lifetime(), 120);
    assert_eq!(pair.refresh_token().unwrap().value().as_str(), "def");
}

/// Test that a rejected header surfaces the server's challenge
#[test]
fn test_rejected_header_reports_challenge() {
    let file = settings_file("");
    let cli = Cli::try_parse_from([
        "tokenwire",
        "--config",
        file.path().to_str().unwrap(),
        "header",
        "bearer abc",
        "--scheme",
        "bearer",
    ])
    .unwrap();

    let err = tokenwire_cli::try_run(cli).unwrap_err();
    assert!(matches!(err, CliError::Parse(_)));
    let header = err.challenge_header().unwrap();
    assert!(header.starts_with("Bearer"));
    assert!(header.contains("error=\"invalid_request\""));
}

/// Test that a full run succeeds end to end
#[test]
fn test_try_run_generate_params() {
    let file = settings_file("[codec]\nvalue_bytes = 16\n");
    let cli = Cli::try_parse_from([
        "tokenwire",
        "-c",
        file.path().to_str().unwrap(),
        "generate",
        "--scheme",
        "na",
        "--encoding",
        "params",
    ])
    .unwrap();

    tokenwire_cli::try_run(cli).unwrap();
}

/// Test that N_A tokens cannot be printed as a header
#[test]
fn test_try_run_rejects_na_header() {
    let file = settings_file("");
    let cli = Cli::try_parse_from([
        "tokenwire",
        "-c",
        file.path().to_str().unwrap(),
        "generate",
        "--scheme",
        "na",
        "--encoding",
        "header",
    ])
    .unwrap();

    let err = tokenwire_cli::try_run(cli).unwrap_err();
    assert!(matches!(err, CliError::InvalidArguments(_)));
}
