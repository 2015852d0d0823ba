//! Output formatting for CLI results

use owo_colors::OwoColorize;
use serde::Serialize;
use tokenwire::{AccessToken, ChallengeError, TokenPair};

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};

/// Values that can be shown as a titled list of fields
pub trait Report: Serialize {
    /// Heading for human output
    fn title(&self) -> &'static str;

    /// Field name and value pairs, absent fields skipped
    fn fields(&self) -> Vec<(&'static str, String)>;
}

/// Decoded access token, with optional refresh token
#[derive(Debug, Serialize)]
pub struct TokenReport {
    pub scheme: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl From<&AccessToken> for TokenReport {
    fn from(token: &AccessToken) -> Self {
        Self {
            scheme: token.scheme().to_string(),
            value: token.value().as_str().to_string(),
            lifetime: (token.lifetime() > 0).then_some(token.lifetime()),
            scope: token.scope().map(ToString::to_string),
            issued_token_type: token.issued_token_type().map(ToString::to_string),
            refresh_token: None,
        }
    }
}

impl From<&TokenPair> for TokenReport {
    fn from(pair: &TokenPair) -> Self {
        Self {
            refresh_token: pair
                .refresh_token()
                .map(|r| r.value().as_str().to_string()),
            ..Self::from(pair.access_token())
        }
    }
}

impl Report for TokenReport {
    fn title(&self) -> &'static str {
        "Access Token"
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("scheme", self.scheme.clone()), ("value", self.value.clone())];
        if let Some(lifetime) = self.lifetime {
            fields.push(("lifetime", format!("{lifetime}s")));
        }
        if let Some(scope) = &self.scope {
            fields.push(("scope", scope.clone()));
        }
        if let Some(issued) = &self.issued_token_type {
            fields.push(("issued_token_type", issued.clone()));
        }
        if let Some(refresh) = &self.refresh_token {
            fields.push(("refresh_token", refresh.clone()));
        }
        fields
    }
}

/// Decoded or built WWW-Authenticate challenge
#[derive(Debug, Serialize)]
pub struct ChallengeReport {
    pub scheme: String,
    pub header: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub algs: Vec<String>,
}

impl From<&ChallengeError> for ChallengeReport {
    fn from(challenge: &ChallengeError) -> Self {
        Self {
            scheme: challenge.scheme().to_string(),
            header: challenge.to_www_authenticate(),
            status: challenge.http_status_code().map(|s| s.as_u16()),
            realm: challenge.realm().map(str::to_string),
            error: challenge.code().map(str::to_string),
            error_description: challenge.description().map(str::to_string),
            error_uri: challenge.uri().map(ToString::to_string),
            scope: challenge.scope().map(ToString::to_string),
            algs: challenge
                .jws_algorithms()
                .into_iter()
                .flatten()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl Report for ChallengeReport {
    fn title(&self) -> &'static str {
        "WWW-Authenticate Challenge"
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let optional = [
            ("status", self.status.map(|s| s.to_string())),
            ("realm", self.realm.clone()),
            ("error", self.error.clone()),
            ("error_description", self.error_description.clone()),
            ("error_uri", self.error_uri.clone()),
            ("scope", self.scope.clone()),
        ];

        let mut fields = vec![("scheme", self.scheme.clone()), ("header", self.header.clone())];
        fields.extend(optional.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))));
        if !self.algs.is_empty() {
            fields.push(("algs", self.algs.join(" ")));
        }
        fields
    }
}

/// Format and display output based on format preference
pub struct Formatter {
    format: OutputFormat,
    colored: bool,
}

impl Formatter {
    #[must_use]
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self { format, colored }
    }

    /// Display a report
    pub fn display<R: Report>(&self, report: &R) -> CliResult<()> {
        match self.format {
            OutputFormat::Human => {
                self.print_header(report.title());
                for (key, value) in report.fields() {
                    self.print_kv(key, &value);
                }
                Ok(())
            }
            _ => self.display_value(report),
        }
    }

    /// Display any serializable value in a machine format
    ///
    /// Human mode falls back to pretty JSON.
    pub fn display_value<T: Serialize + ?Sized>(&self, value: &T) -> CliResult<()> {
        match self.format {
            OutputFormat::Human | OutputFormat::Json => self.display_json(value, true),
            OutputFormat::Compact => self.display_json(value, false),
            OutputFormat::Yaml => self.display_yaml(value),
        }
    }

    /// Print a raw wire value
    pub fn display_raw(&self, text: &str) {
        println!("{text}");
    }

    /// Display an error with rich formatting
    pub fn display_error(&self, error: &CliError) {
        if self.colored {
            eprintln!("{}: {}", error.category().bright_red().bold(), error);
            if let Some(header) = error.challenge_header() {
                eprintln!("{} {}", "WWW-Authenticate:".bright_black(), header);
            }

            let suggestions = error.suggestions();
            if !suggestions.is_empty() {
                eprintln!("\n{}", "Suggestions:".bright_yellow().bold());
                for suggestion in suggestions {
                    eprintln!("  {} {}", "•".bright_blue(), suggestion);
                }
            }
        } else {
            eprintln!("{}: {error}", error.category());
            if let Some(header) = error.challenge_header() {
                eprintln!("WWW-Authenticate: {header}");
            }

            let suggestions = error.suggestions();
            if !suggestions.is_empty() {
                eprintln!("\nSuggestions:");
                for suggestion in suggestions {
                    eprintln!("  • {suggestion}");
                }
            }
        }
    }

    fn display_json<T: Serialize + ?Sized>(&self, value: &T, pretty: bool) -> CliResult<()> {
        let json = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        println!("{json}");
        Ok(())
    }

    fn display_yaml<T: Serialize + ?Sized>(&self, value: &T) -> CliResult<()> {
        let yaml = serde_yaml::to_string(value)?;
        print!("{yaml}");
        Ok(())
    }

    fn print_header(&self, text: &str) {
        if self.colored {
            println!("{}", text.bright_cyan().bold());
            println!("{}", "=".repeat(text.len()).bright_cyan());
        } else {
            println!("{text}");
            println!("{}", "=".repeat(text.len()));
        }
    }

    fn print_kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("  {}: {}", key.bright_green().bold(), value);
        } else {
            println!("  {key}: {value}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokenwire::{JwsAlgorithm, RefreshToken, Scope};

    #[test]
    fn test_token_report_fields() {
        let token = AccessToken::bearer("abc")
            .with_lifetime(60)
            .with_scope(Some(Scope::new(["read"])));
        let pair = TokenPair::new(token, Some(RefreshToken::new("r")));
        let report = TokenReport::from(&pair);

        assert_eq!(
            report.fields(),
            vec![
                ("scheme", "Bearer".to_string()),
                ("value", "abc".to_string()),
                ("lifetime", "60s".to_string()),
                ("scope", "read".to_string()),
                ("refresh_token", "r".to_string()),
            ]
        );
    }

    #[test]
    fn test_token_report_json_skips_absent() {
        let report = TokenReport::from(&AccessToken::dpop("abc"));
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({"scheme": "DPoP", "value": "abc"})
        );
    }

    #[test]
    fn test_challenge_report() {
        let challenge = ChallengeError::DPOP_INVALID_TOKEN
            .with_jws_algorithms([JwsAlgorithm::ES256])
            .with_realm(Some("api"));
        let report = ChallengeReport::from(&challenge);

        assert_eq!(report.status, Some(401));
        assert_eq!(report.error.as_deref(), Some("invalid_token"));
        assert_eq!(report.algs, vec!["ES256".to_string()]);
        assert_eq!(
            report.header,
            "DPoP realm=\"api\", error=\"invalid_token\", algs=\"ES256\""
        );
        assert_eq!(report.fields().last(), Some(&("algs", "ES256".to_string())));
    }
}
