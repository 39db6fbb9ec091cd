use std::fmt;

use serde::Serialize;

use super::{DirectionKeys, SplitSetting};
use crate::grammar::{ConfigEnum, Delimiters};

/// Propagation style accepted by the deprecated `propagation.style.*` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropagationStyle {
    /// Datadog headers.
    Datadog,
    /// B3, both single and multi header.
    B3,
    /// Haystack headers.
    Haystack,
    /// AWS X-Ray header.
    Xray,
}

impl PropagationStyle {
    /// The current styles a deprecated style stands for.
    #[must_use]
    pub fn current_styles(self) -> &'static [TracePropagationStyle] {
        match self {
            Self::Datadog => &[TracePropagationStyle::Datadog],
            Self::B3 => &[TracePropagationStyle::B3Single, TracePropagationStyle::B3Multi],
            Self::Haystack => &[TracePropagationStyle::Haystack],
            Self::Xray => &[TracePropagationStyle::Xray],
        }
    }
}

impl ConfigEnum for PropagationStyle {
    fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "datadog" => Some(Self::Datadog),
            "b3" => Some(Self::B3),
            "haystack" => Some(Self::Haystack),
            "xray" => Some(Self::Xray),
            _ => None,
        }
    }

    fn config_name(self) -> &'static str {
        match self {
            Self::Datadog => "datadog",
            Self::B3 => "b3",
            Self::Haystack => "haystack",
            Self::Xray => "xray",
        }
    }
}

impl fmt::Display for PropagationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

/// Propagation style accepted by the `trace.propagation.style*` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TracePropagationStyle {
    /// Datadog headers.
    Datadog,
    /// B3 single `b3` header.
    B3Single,
    /// B3 multi `X-B3-*` headers.
    B3Multi,
    /// Haystack headers.
    Haystack,
    /// AWS X-Ray header.
    Xray,
    /// W3C trace context.
    TraceContext,
    /// Propagation disabled.
    None,
}

impl ConfigEnum for TracePropagationStyle {
    fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "datadog" => Some(Self::Datadog),
            "b3single" | "b3 single header" => Some(Self::B3Single),
            "b3multi" | "b3" => Some(Self::B3Multi),
            "haystack" => Some(Self::Haystack),
            "xray" => Some(Self::Xray),
            "tracecontext" => Some(Self::TraceContext),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    fn config_name(self) -> &'static str {
        match self {
            Self::Datadog => "datadog",
            Self::B3Single => "b3single",
            Self::B3Multi => "b3multi",
            Self::Haystack => "haystack",
            Self::Xray => "xray",
            Self::TraceContext => "tracecontext",
            Self::None => "none",
        }
    }
}

impl fmt::Display for TracePropagationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

/// Propagation styles: `propagation.style.{extract,inject}` replaced by
/// `trace.propagation.style` and `trace.propagation.style.{extract,inject}`.
pub const PROPAGATION_STYLE: SplitSetting<PropagationStyle, TracePropagationStyle> =
    SplitSetting {
        common_key: "trace.propagation.style",
        current: DirectionKeys {
            extract: "trace.propagation.style.extract",
            inject: "trace.propagation.style.inject",
        },
        deprecated: DirectionKeys {
            extract: "propagation.style.extract",
            inject: "propagation.style.inject",
        },
        deprecated_delimiters: Delimiters::CommaOrWhitespace,
        current_delimiters: Delimiters::Comma,
        translate: PropagationStyle::current_styles,
        default_current: &[
            TracePropagationStyle::Datadog,
            TracePropagationStyle::TraceContext,
        ],
        default_legacy: &[PropagationStyle::Datadog],
    };

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_enum;

    #[test]
    fn test_current_style_aliases() {
        assert_eq!(
            parse_enum::<TracePropagationStyle>("B3 single header"),
            Some(TracePropagationStyle::B3Single)
        );
        assert_eq!(
            parse_enum::<TracePropagationStyle>("b3"),
            Some(TracePropagationStyle::B3Multi)
        );
        assert_eq!(parse_enum::<TracePropagationStyle>("zipkin"), None);
    }

    #[test]
    fn test_b3_expands_to_both_encodings() {
        assert_eq!(
            PROPAGATION_STYLE.convert(&[PropagationStyle::B3, PropagationStyle::Datadog]),
            vec![
                TracePropagationStyle::B3Single,
                TracePropagationStyle::B3Multi,
                TracePropagationStyle::Datadog
            ]
        );
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&[
            TracePropagationStyle::TraceContext,
            TracePropagationStyle::B3Single,
        ])
        .unwrap();
        assert_eq!(json, r#"["tracecontext","b3single"]"#);
    }
}
