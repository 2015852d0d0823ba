//! Command execution

use std::io::Read;

use http::StatusCode;
use serde_json::{Map, Value};
use tokenwire::{
    ChallengeError, ChallengeScheme, JwsAlgorithm, RefreshToken, Scope, TokenCodec, TokenPair,
    TokenScheme, TokenTypeUri, scope,
};
use tracing::debug;
use url::Url;

use crate::cli::{BuildArgs, ChallengeCommands, Commands, Encoding, GenerateArgs, HeaderArgs, ResponseArgs};
use crate::error::{CliError, CliResult};
use crate::output::{ChallengeReport, Formatter, TokenReport};
use crate::settings::Settings;

/// Execute CLI commands
pub struct CommandExecutor {
    pub formatter: Formatter,
    settings: Settings,
    codec: TokenCodec,
}

impl CommandExecutor {
    /// Create an executor for validated settings
    ///
    /// # Errors
    /// Fails if the codec settings do not validate.
    pub fn new(formatter: Formatter, settings: Settings) -> CliResult<Self> {
        let codec = settings.codec()?;
        Ok(Self {
            formatter,
            settings,
            codec,
        })
    }

    /// Display an error with rich formatting
    pub fn display_error(&self, error: &CliError) {
        self.formatter.display_error(error);
    }

    /// Execute a command
    ///
    /// # Errors
    /// Returns the command's failure for display.
    pub fn execute(&self, command: Commands) -> CliResult<()> {
        match command {
            Commands::Generate(args) => self.execute_generate(args),
            Commands::Header(args) => self.execute_header(args),
            Commands::Response(args) => self.execute_response(args),
            Commands::Challenge(ChallengeCommands::Parse { value, scheme }) => {
                let challenge = match scheme {
                    Some(scheme) => ChallengeError::parse_www_authenticate(&value, scheme.into())?,
                    None => ChallengeError::parse_any(&value)?,
                };
                self.formatter.display(&ChallengeReport::from(&challenge))
            }
            Commands::Challenge(ChallengeCommands::Build(args)) => {
                let challenge = self.build_challenge(args)?;
                self.formatter.display(&ChallengeReport::from(&challenge))
            }
        }
    }

    fn execute_generate(&self, args: GenerateArgs) -> CliResult<()> {
        let pair = self.generate(&args)?;

        match args.encoding {
            Encoding::Json => self.formatter.display_value(&pair),
            Encoding::Header => {
                if pair.access_token().scheme().header_keyword().is_none() {
                    return Err(CliError::InvalidArguments(format!(
                        "{} tokens have no Authorization header form",
                        pair.access_token().scheme()
                    )));
                }
                self.formatter.display_raw(&pair.access_token().to_header());
                Ok(())
            }
            Encoding::Params => {
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(
                        pair.access_token()
                            .to_params()
                            .iter()
                            .flat_map(|(k, values)| values.iter().map(move |v| (k, v))),
                    )
                    .finish();
                self.formatter.display_raw(&query);
                Ok(())
            }
        }
    }

    /// Mint a token pair from `generate` arguments
    ///
    /// # Errors
    /// Fails on an invalid byte length, scope or issued token type.
    pub fn generate(&self, args: &GenerateArgs) -> CliResult<TokenPair> {
        let scheme = TokenScheme::from(args.scheme);

        let token = match args.bytes {
            Some(bytes) if bytes <= 1 => {
                return Err(CliError::InvalidArguments(format!(
                    "--bytes must be greater than 1, got {bytes}"
                )));
            }
            Some(bytes) => tokenwire::AccessToken::generate_with_len(scheme, bytes),
            None => self.codec.generate(scheme),
        };

        let scope = args
            .scope
            .as_deref()
            .map(Scope::parse)
            .transpose()
            .map_err(|e| CliError::InvalidArguments(e.to_string()))?;

        let issued_token_type = args
            .issued_token_type
            .as_deref()
            .map(TokenTypeUri::parse)
            .transpose()
            .map_err(|e| CliError::InvalidArguments(format!("Invalid issued token type: {e}")))?;

        let token = token
            .with_lifetime(args.lifetime.unwrap_or(0))
            .with_scope(scope)
            .with_issued_token_type(issued_token_type);

        let refresh_token = args.refresh.then(RefreshToken::generate);
        debug!(%scheme, refresh = args.refresh, "Generated token");
        Ok(TokenPair::new(token, refresh_token))
    }

    fn execute_header(&self, args: HeaderArgs) -> CliResult<()> {
        let token = match args.scheme {
            Some(scheme) => self.codec.parse_header(Some(&args.value), scheme.into())?,
            None => self.codec.parse_header_infer(Some(&args.value))?,
        };
        self.formatter.display(&TokenReport::from(&token))
    }

    fn execute_response(&self, args: ResponseArgs) -> CliResult<()> {
        let text = if args.input == "-" {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        } else {
            std::fs::read_to_string(&args.input)?
        };

        let pair = self.parse_response(&text, args.scheme.map(TokenScheme::from))?;
        self.formatter.display(&TokenReport::from(&pair))
    }

    /// Decode a token response body
    ///
    /// # Errors
    /// Fails if the body is not a JSON object or the token is malformed.
    pub fn parse_response(&self, text: &str, scheme: Option<TokenScheme>) -> CliResult<TokenPair> {
        let object: Map<String, Value> = serde_json::from_str(text)?;

        match scheme {
            None => Ok(self.codec.parse_token_pair(&object)?),
            Some(scheme) => {
                let access_token = self.codec.parse_json(&object, scheme)?;
                let refresh_token = object
                    .get(tokenwire::refresh::REFRESH_TOKEN)
                    .and_then(Value::as_str)
                    .filter(|v| !v.trim().is_empty())
                    .map(RefreshToken::new);
                Ok(TokenPair::new(access_token, refresh_token))
            }
        }
    }

    /// Build a challenge from `challenge build` arguments
    ///
    /// # Errors
    /// Fails on illegal characters, an unparsable URI or status, or
    /// algorithms on a Bearer challenge.
    pub fn build_challenge(&self, args: BuildArgs) -> CliResult<ChallengeError> {
        let scheme = TokenScheme::from(args.scheme);

        let mut challenge = match args.error {
            Some(kind) => ChallengeError::standard(kind.into(), scheme),
            None => ChallengeError::new(ChallengeScheme::for_token(scheme)),
        };

        if let Some(code) = &args.code {
            if code.is_empty() {
                return Err("--code must not be empty".into());
            }
            challenge = challenge.with_code(Some(legal("--code", code)?));
        }
        if let Some(description) = &args.description {
            challenge = challenge.with_description(Some(legal("--description", description)?));
        }
        if let Some(uri) = &args.uri {
            let uri = Url::parse(uri)
                .map_err(|e| CliError::InvalidArguments(format!("Invalid --uri: {e}")))?;
            challenge = challenge.with_uri(Some(uri));
        }

        let realm = args.realm.as_deref().or(self.settings.codec.realm.as_deref());
        if realm.is_some() {
            challenge = challenge.with_realm(realm);
        }

        if let Some(scope) = &args.scope {
            let scope = Scope::parse(scope).map_err(|e| CliError::InvalidArguments(e.to_string()))?;
            challenge = challenge.with_scope(Some(scope));
        }

        if !args.algs.is_empty() {
            if challenge.scheme() != &ChallengeScheme::DPoP {
                return Err("--algs only applies to DPoP challenges".into());
            }
            let algorithms = args
                .algs
                .iter()
                .map(|name| {
                    JwsAlgorithm::parse(name.trim()).ok_or_else(|| {
                        CliError::InvalidArguments(format!("Invalid algorithm name {name:?}"))
                    })
                })
                .collect::<CliResult<Vec<_>>>()?;
            challenge = challenge.with_jws_algorithms(algorithms);
        }

        if let Some(status) = args.status {
            let status = StatusCode::from_u16(status)
                .map_err(|e| CliError::InvalidArguments(format!("Invalid --status: {e}")))?;
            challenge = challenge.with_http_status_code(Some(status));
        }

        Ok(challenge)
    }
}

fn legal<'a>(flag: &str, value: &'a str) -> CliResult<&'a str> {
    if scope::is_legal(value) {
        Ok(value)
    } else {
        Err(CliError::InvalidArguments(format!(
            "{flag} may only contain printable ASCII without '\"' or '\\'"
        )))
    }
}
