//! Command line parsing for `ktcfg -t <topic> -k <key> -v <value> [-b <brokers>]`.

use std::ffi::OsString;
use std::fmt;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;
use thiserror::Error;

use crate::request::ConfigChangeRequest;

const USAGE_ARGS: &str = "-t <topic> -k <key> -v <value> [-b <brokers>]";

/// Raw flags as clap sees them. Every field is optional here; presence
/// is checked afterwards so the first missing field can be reported.
#[derive(Debug, Parser)]
#[command(
    name = "ktcfg",
    disable_help_flag = true,
    args_override_self = true,
    override_usage = USAGE_ARGS
)]
struct Flags {
    #[arg(short = 't', value_name = "topic", allow_hyphen_values = true)]
    topic: Option<String>,

    #[arg(short = 'k', value_name = "key", allow_hyphen_values = true)]
    key: Option<String>,

    #[arg(short = 'v', value_name = "value", allow_hyphen_values = true)]
    value: Option<String>,

    #[arg(short = 'b', value_name = "brokers", allow_hyphen_values = true)]
    brokers: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Topic,
    Key,
    Value,
    Brokers,
}

impl Field {
    pub fn flag(self) -> &'static str {
        match self {
            Field::Topic => "-t",
            Field::Key => "-k",
            Field::Value => "-v",
            Field::Brokers => "-b",
        }
    }

    /// Only the exact tokens `-t`, `-k`, `-v` and `-b` name a field.
    fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "-t" => Some(Field::Topic),
            "-k" => Some(Field::Key),
            "-v" => Some(Field::Value),
            "-b" => Some(Field::Brokers),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Topic => "topic",
            Field::Key => "key",
            Field::Value => "value",
            Field::Brokers => "brokers",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgsError {
    /// A flag was the last token and had nothing to consume.
    #[error("missing {0}")]
    MissingValue(Field),

    #[error("unknown flag `{0}`")]
    UnknownFlag(String),

    /// A required flag never appeared.
    #[error("{0} is not specified")]
    NotSpecified(Field),

    #[error("{0}")]
    Rejected(String),
}

/// One-line usage string for `program`.
pub fn usage(program: &str) -> String {
    format!("Usage: {program} {USAGE_ARGS}")
}

/// Parses the arguments that follow the program name.
pub fn parse_args<I, T>(args: I) -> Result<ConfigChangeRequest, ArgsError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    check_flag_positions(&args)?;

    let flags = Flags::try_parse_from(std::iter::once(OsString::from("ktcfg")).chain(args))
        .map_err(from_clap)?;

    let topic = flags.topic.ok_or(ArgsError::NotSpecified(Field::Topic))?;
    let key = flags.key.ok_or(ArgsError::NotSpecified(Field::Key))?;
    let value = flags.value.ok_or(ArgsError::NotSpecified(Field::Value))?;

    Ok(ConfigChangeRequest::new(topic, key, value, flags.brokers))
}

/// Every even position must hold exactly one of the four flags, and every
/// flag must be followed by a value. Clustered (`-tkv`), attached
/// (`-t=orders`) and escape (`--`) tokens are unknown flags.
fn check_flag_positions(args: &[OsString]) -> Result<(), ArgsError> {
    let mut tokens = args.iter();
    while let Some(token) = tokens.next() {
        let flag = token.to_string_lossy();
        let field = Field::from_flag(&flag).ok_or_else(|| ArgsError::UnknownFlag(flag.to_string()))?;
        if tokens.next().is_none() {
            return Err(ArgsError::MissingValue(field));
        }
    }
    Ok(())
}

fn from_clap(err: clap::Error) -> ArgsError {
    match (err.kind(), invalid_arg(&err)) {
        (ErrorKind::UnknownArgument, Some(flag)) => ArgsError::UnknownFlag(flag),
        _ => ArgsError::Rejected(err.render().to_string()),
    }
}

fn invalid_arg(err: &clap::Error) -> Option<String> {
    match err.get(ContextKind::InvalidArg)? {
        ContextValue::String(arg) => Some(arg.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::DEFAULT_BROKERS;

    fn parse(args: &[&str]) -> Result<ConfigChangeRequest, ArgsError> {
        parse_args(args.iter().copied())
    }

    #[test]
    fn test_parse_all_flags() {
        let req = parse(&["-t", "orders", "-k", "retention.ms", "-v", "60000", "-b", "kafka:9092"])
            .unwrap();

        assert_eq!(req.topic, "orders");
        assert_eq!(req.key, "retention.ms");
        assert_eq!(req.value, "60000");
        assert_eq!(req.brokers, "kafka:9092");
    }

    #[test]
    fn test_flag_order_does_not_matter() {
        let orders: [&[&str]; 3] = [
            &["-v", "60000", "-t", "orders", "-b", "b1:9092,b2:9092", "-k", "retention.ms"],
            &["-b", "b1:9092,b2:9092", "-k", "retention.ms", "-v", "60000", "-t", "orders"],
            &["-k", "retention.ms", "-b", "b1:9092,b2:9092", "-t", "orders", "-v", "60000"],
        ];

        for args in orders {
            let req = parse(args).unwrap();
            assert_eq!(
                req,
                ConfigChangeRequest::new(
                    "orders",
                    "retention.ms",
                    "60000",
                    Some("b1:9092,b2:9092".to_string())
                )
            );
        }
    }

    #[test]
    fn test_default_brokers() {
        let req = parse(&["-t", "orders", "-k", "cleanup.policy", "-v", "compact"]).unwrap();
        assert_eq!(req.brokers, DEFAULT_BROKERS);
        assert_eq!(req.brokers, "localhost:9092");
    }

    #[test]
    fn test_missing_fields_reported_in_priority_order() {
        assert_eq!(parse(&[]).unwrap_err(), ArgsError::NotSpecified(Field::Topic));
        assert_eq!(
            parse(&["-v", "1", "-k", "a"]).unwrap_err(),
            ArgsError::NotSpecified(Field::Topic)
        );
        assert_eq!(
            parse(&["-t", "orders"]).unwrap_err(),
            ArgsError::NotSpecified(Field::Key)
        );
        assert_eq!(
            parse(&["-t", "orders", "-b", "kafka:9092", "-k", "retention.ms"]).unwrap_err(),
            ArgsError::NotSpecified(Field::Value)
        );
    }

    #[test]
    fn test_unknown_flag_fails_regardless_of_position() {
        assert_eq!(
            parse(&["-x", "-t", "orders", "-k", "a", "-v", "1"]).unwrap_err(),
            ArgsError::UnknownFlag("-x".to_string())
        );
        assert_eq!(
            parse(&["-t", "orders", "-x"]).unwrap_err(),
            ArgsError::UnknownFlag("-x".to_string())
        );
    }

    #[test]
    fn test_help_is_not_a_flag() {
        assert_eq!(
            parse(&["-h"]).unwrap_err(),
            ArgsError::UnknownFlag("-h".to_string())
        );
    }

    #[test]
    fn test_flag_without_value() {
        assert_eq!(
            parse(&["-k", "retention.ms", "-t"]).unwrap_err(),
            ArgsError::MissingValue(Field::Topic)
        );
        assert_eq!(
            parse(&["-t", "orders", "-b"]).unwrap_err(),
            ArgsError::MissingValue(Field::Brokers)
        );
    }

    #[test]
    fn test_only_exact_flag_tokens_are_accepted() {
        for token in ["-torders", "-t=orders", "-tkv", "--", "--topic", "t"] {
            assert_eq!(
                parse(&[token, "-k", "a", "-v", "1"]).unwrap_err(),
                ArgsError::UnknownFlag(token.to_string()),
                "token {token}"
            );
        }

        assert_eq!(
            parse(&["--", "-t", "orders"]).unwrap_err(),
            ArgsError::UnknownFlag("--".to_string())
        );
        assert_eq!(
            parse(&["-t", "orders", "-k", "a", "-v", "1", "-b=kafka:9092"]).unwrap_err(),
            ArgsError::UnknownFlag("-b=kafka:9092".to_string())
        );
    }

    #[test]
    fn test_first_bad_token_wins() {
        assert_eq!(
            parse(&["-t", "orders", "-x", "-k"]).unwrap_err(),
            ArgsError::UnknownFlag("-x".to_string())
        );
        assert_eq!(
            parse(&["-t", "orders", "-k"]).unwrap_err(),
            ArgsError::MissingValue(Field::Key)
        );
    }

    #[test]
    fn test_flag_like_values_are_kept_verbatim() {
        let req = parse(&["-t", "--", "-k", "-tkv", "-v", "-t=orders"]).unwrap();
        assert_eq!(req.topic, "--");
        assert_eq!(req.key, "-tkv");
        assert_eq!(req.value, "-t=orders");
    }

    #[test]
    fn test_values_may_start_with_a_dash() {
        let req = parse(&["-t", "orders", "-k", "retention.ms", "-v", "-1"]).unwrap();
        assert_eq!(req.value, "-1");

        // The token after a flag is always its value.
        assert_eq!(
            parse(&["-t", "-k", "-v", "1"]).unwrap_err(),
            ArgsError::NotSpecified(Field::Key)
        );
    }

    #[test]
    fn test_repeated_flag_keeps_last_value() {
        let req = parse(&["-t", "first", "-t", "second", "-k", "a", "-v", "1"]).unwrap();
        assert_eq!(req.topic, "second");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ArgsError::MissingValue(Field::Topic).to_string(), "missing topic");
        assert_eq!(
            ArgsError::UnknownFlag("-x".to_string()).to_string(),
            "unknown flag `-x`"
        );
        assert_eq!(
            ArgsError::NotSpecified(Field::Value).to_string(),
            "value is not specified"
        );
        assert_eq!(Field::Brokers.flag(), "-b");
    }

    #[test]
    fn test_usage() {
        assert_eq!(
            usage("ktcfg"),
            "Usage: ktcfg -t <topic> -k <key> -v <value> [-b <brokers>]"
        );
    }
}
