use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, Overrides};

#[derive(Debug, Parser)]
#[command(
    name = "openai-cli",
    version,
    about = "Command-line client for chat completion APIs."
)]
pub struct Cli {
    #[arg(
        short,
        long,
        global = true,
        value_name = "MODEL",
        help = format!("Model to use; falls back to OPENAI_MODEL, then {DEFAULT_MODEL}")
    )]
    pub model: Option<String>,

    #[arg(
        short = 'k',
        long,
        global = true,
        value_name = "INT",
        value_parser = clap::value_parser!(u32).range(1..),
        help = format!("Maximum tokens to generate; falls back to OPENAI_MAX_TOKENS, then {DEFAULT_MAX_TOKENS}")
    )]
    pub max_tokens: Option<u32>,

    #[arg(
        short = 'p',
        long,
        global = true,
        value_name = "F32",
        value_parser = parse_temperature_arg,
        help = format!("Sampling temperature; falls back to OPENAI_TEMPERATURE, then {DEFAULT_TEMPERATURE}")
    )]
    pub temperature: Option<f32>,

    #[arg(
        short,
        long = "system",
        global = true,
        value_name = "TEXT",
        help = "System message prepended to every conversation; falls back to OPENAI_SYSTEM_MESSAGE"
    )]
    pub system_message: Option<String>,

    #[arg(
        short,
        long,
        global = true,
        value_name = "API_KEY",
        help = "API token; if absent, OPENAI_API_KEY is checked"
    )]
    pub token: Option<String>,

    #[arg(
        long,
        global = true,
        value_name = "[USER:PASS@]HOST:PORT",
        help = "HTTP proxy to send requests through; falls back to OPENAI_PROXY"
    )]
    pub proxy: Option<String>,

    #[arg(
        long,
        global = true,
        value_name = "URL",
        help = "Chat completion endpoint; falls back to OPENAI_API_URL"
    )]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Return the completion for a prompt read from SOURCE ('-' reads stdin).
    Complete {
        #[arg(value_name = "SOURCE")]
        source: PathBuf,
    },
    /// Start an interactive shell session.
    Repl,
}

fn parse_temperature_arg(raw: &str) -> Result<f32, String> {
    let value = raw
        .trim()
        .parse::<f32>()
        .map_err(|err| format!("'{raw}' is not a number: {err}"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("'{raw}' must be a finite, non-negative number"))
    }
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            token: self.token.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system_message: self.system_message.clone(),
            api_url: self.api_url.clone(),
            proxy: self.proxy.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    use super::{Cli, Command};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_complete_with_short_overrides() {
        let cli = Cli::try_parse_from([
            "openai-cli",
            "-m",
            "gpt-3.5-turbo",
            "-k",
            "100",
            "-p",
            "0.8",
            "-t",
            "test_token",
            "complete",
            "-",
        ])
        .expect("arguments should parse");

        let overrides = cli.overrides();
        assert_eq!(overrides.model.as_deref(), Some("gpt-3.5-turbo"));
        assert_eq!(overrides.max_tokens, Some(100));
        assert_eq!(overrides.temperature, Some(0.8));
        assert_eq!(overrides.token.as_deref(), Some("test_token"));
        assert!(matches!(cli.command, Command::Complete { ref source } if source == &PathBuf::from("-")));
    }

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["openai-cli", "repl", "--proxy", "host:3128"])
            .expect("arguments should parse");
        assert!(matches!(cli.command, Command::Repl));
        assert_eq!(cli.overrides().proxy.as_deref(), Some("host:3128"));
        assert!(cli.overrides().token.is_none());
    }

    #[test]
    fn rejects_zero_max_tokens() {
        assert!(Cli::try_parse_from(["openai-cli", "-k", "0", "repl"]).is_err());
    }

    #[test]
    fn rejects_non_finite_or_negative_temperature() {
        for raw in ["NaN", "inf", "-inf", "-0.5", "warm"] {
            assert!(
                Cli::try_parse_from(["openai-cli", "-p", raw, "repl"]).is_err(),
                "expected temperature '{raw}' to be rejected"
            );
        }

        let cli = Cli::try_parse_from(["openai-cli", "--temperature", "0", "repl"])
            .expect("zero temperature should parse");
        assert_eq!(cli.overrides().temperature, Some(0.0));
    }
}
