//! # Message Formatting
//!
//! Turns a [`CallContext`] and a [`LogPoint`] into a message template plus the
//! ordered values for its placeholders. Sinks that understand structured
//! logging can index the values; everyone else calls [`LogMessage::render`].
//!
//! The template is assembled from these parts, in order:
//!
//! ```text
//! {prefix} {type_name}.{member}:{correlation_id}:{log_point} ({elapsed})
//! └─ optional                   └─ optional                  └─ Finally only
//! ```
//!
//! so a successful call on `Calculator::add` with prefix `Foo` and id `abc`
//! renders as `Foo Calculator.add:abc:OnBefore`.

use crate::context::CallContext;
use crate::point::LogPoint;
use std::fmt;
use std::time::Duration;

/// Value of one placeholder. Durations stay typed so sinks can pick their own
/// rendering (or record a number).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgValue {
    Text(String),
    Elapsed(Duration),
}

impl ArgValue {
    /// The text of a [`ArgValue::Text`] value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArgValue::Text(text) => Some(text),
            ArgValue::Elapsed(_) => None,
        }
    }
}

/// Default textual rendering. Durations use their `Debug` form, e.g. `12ms`.
impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Text(text) => f.write_str(text),
            ArgValue::Elapsed(elapsed) => write!(f, "{elapsed:?}"),
        }
    }
}

/// One placeholder value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateArg {
    pub name: &'static str,
    pub value: ArgValue,
}

/// A message template and its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    point: LogPoint,
    template: String,
    args: Vec<TemplateArg>,
}

impl LogMessage {
    pub fn point(&self) -> LogPoint {
        self.point
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn args(&self) -> &[TemplateArg] {
        &self.args
    }

    /// Value of the named placeholder, if present.
    pub fn arg(&self, name: &str) -> Option<&ArgValue> {
        self.args.iter().find(|a| a.name == name).map(|a| &a.value)
    }

    /// Text of the named placeholder. `None` if absent or not text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.arg(name).and_then(ArgValue::as_text)
    }

    /// Elapsed time of a `Finally` record.
    pub fn elapsed(&self) -> Option<Duration> {
        self.args.iter().find_map(|a| match a.value {
            ArgValue::Elapsed(elapsed) => Some(elapsed),
            ArgValue::Text(_) => None,
        })
    }

    /// Copy of this message with the failure appended as an `{error}` placeholder.
    pub fn with_failure(&self, failure: &dyn std::error::Error) -> LogMessage {
        let mut message = self.clone();
        message.template.push_str(" {error}");
        message.args.push(TemplateArg {
            name: "error",
            value: ArgValue::Text(failure.to_string()),
        });
        message
    }

    /// Substitutes the placeholders in order.
    pub fn render(&self) -> String {
        use std::fmt::Write;

        let mut out = String::with_capacity(self.template.len() + 32);
        let mut values = self.args.iter();
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            out.push_str(&rest[..start]);
            match values.next() {
                Some(arg) => {
                    let _ = write!(out, "{}", arg.value);
                }
                None => out.push_str(&rest[start..=start + len]),
            }
            rest = &rest[start + len + 1..];
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Builds [`LogMessage`]s. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFormatter;

impl MessageFormatter {
    /// Formats the record for `point`. `elapsed` is only used for `Finally`.
    pub fn format(ctx: &CallContext, point: LogPoint, elapsed: Option<Duration>) -> LogMessage {
        let mut template = String::new();
        let mut args = Vec::with_capacity(6);
        let mut push = |part: &str, name: &'static str, value: ArgValue| {
            template.push_str(part);
            args.push(TemplateArg { name, value });
        };
        let text = |s: &str| ArgValue::Text(s.to_string());

        if let Some(prefix) = ctx.prefix().filter(|p| !p.is_empty()) {
            push("{prefix} ", "prefix", text(prefix));
        }
        push("{type_name}.", "type_name", text(ctx.type_name()));
        push("{member}:", "member", text(ctx.member_name()));
        if let Some(id) = ctx.correlation_id() {
            push("{correlation_id}:", "correlation_id", text(id.as_str()));
        }
        push("{log_point}", "log_point", text(point.label()));
        if let (LogPoint::Finally, Some(elapsed)) = (point, elapsed) {
            push(" ({elapsed})", "elapsed", ArgValue::Elapsed(elapsed));
        }

        LogMessage {
            point,
            template,
            args,
        }
    }
}
