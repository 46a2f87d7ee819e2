//! # Log Sinks
//!
//! The wrapper never writes anywhere itself. It hands each record to a
//! [`LogSink`], which owns transport, formatting backend and destination.
//!
//! [`TracingSink`] forwards records to `tracing` as structured events. The
//! template values become event fields, so a JSON subscriber gets
//! `type_name`, `member`, `correlation_id` and friends as separate keys. The
//! elapsed time of `OnFinally` is recorded twice: as `elapsed` (the `Debug`
//! form of the duration) and as the integer `elapsed_us`.
//!
//! # Writing a sink
//!
//! Only [`LogSink::log`] is required. [`LogSink::log_failure`] has a provided
//! implementation that appends the failure to the message and forwards to
//! `log`, which is enough for most sinks.

use crate::format::LogMessage;
use crate::level::LogLevel;
use std::error::Error;

/// Destination for lifecycle records.
///
/// Sinks must not panic. A panic raised by a sink is caught and the record is
/// dropped, but a sink that panics while logging `OnFinally` for a target that
/// is itself unwinding aborts the process.
pub trait LogSink: Send + Sync {
    /// Emit a record.
    fn log(&self, level: LogLevel, message: &LogMessage);

    /// Emit a record that carries the failure of the wrapped call.
    fn log_failure(&self, level: LogLevel, message: &LogMessage, failure: &(dyn Error + 'static)) {
        self.log(level, &message.with_failure(failure));
    }
}

/// Sink that emits `tracing` events under the `aspect_logging` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

macro_rules! emit {
    ($level:expr, $($fields:tt)+) => {
        match $level {
            LogLevel::Trace => tracing::trace!(target: "aspect_logging", $($fields)+),
            LogLevel::Debug => tracing::debug!(target: "aspect_logging", $($fields)+),
            LogLevel::Information => tracing::info!(target: "aspect_logging", $($fields)+),
            LogLevel::Warning => tracing::warn!(target: "aspect_logging", $($fields)+),
            LogLevel::Error | LogLevel::Critical => {
                tracing::error!(target: "aspect_logging", $($fields)+)
            }
        }
    };
}

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &LogMessage) {
        let rendered = message.render();
        emit!(
            level,
            log_point = message.point().label(),
            type_name = message.text("type_name"),
            member = message.text("member"),
            correlation_id = message.text("correlation_id"),
            elapsed = message.elapsed().map(tracing::field::debug),
            elapsed_us = message.elapsed().map(|d| d.as_micros() as u64),
            template = message.template(),
            "{}",
            rendered
        );
    }

    fn log_failure(&self, level: LogLevel, message: &LogMessage, failure: &(dyn Error + 'static)) {
        let rendered = message.render();
        emit!(
            level,
            log_point = message.point().label(),
            type_name = message.text("type_name"),
            member = message.text("member"),
            correlation_id = message.text("correlation_id"),
            template = message.template(),
            error = %failure,
            "{}",
            rendered
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectiveConfig;
    use crate::context::CallContext;
    use crate::format::MessageFormatter;
    use crate::metadata::CallMetadata;
    use crate::mock::FixedIdProvider;
    use crate::point::LogPoint;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    #[derive(Debug, Clone)]
    struct Captured {
        level: Level,
        target: String,
        fields: HashMap<String, String>,
    }

    struct FieldVisitor(HashMap<String, String>);

    impl Visit for FieldVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{:?}", value));
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.0.insert(field.name().to_string(), value.to_string());
        }
    }

    #[derive(Clone, Default)]
    struct CaptureLayer(Arc<Mutex<Vec<Captured>>>);

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = FieldVisitor(HashMap::new());
            event.record(&mut visitor);
            self.0.lock().unwrap().push(Captured {
                level: *event.metadata().level(),
                target: event.metadata().target().to_string(),
                fields: visitor.0,
            });
        }
    }

    fn capture<F: FnOnce()>(f: F) -> Vec<Captured> {
        let layer = CaptureLayer::default();
        let events = layer.0.clone();
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);
        let events = events.lock().unwrap().clone();
        events
    }

    fn message(point: LogPoint) -> LogMessage {
        message_after(point, None)
    }

    fn message_after(point: LogPoint, elapsed: Option<Duration>) -> LogMessage {
        let ctx = CallContext::new(
            CallMetadata::new("Calculator", "add"),
            &EffectiveConfig::default(),
            &FixedIdProvider::new("abc"),
        );
        MessageFormatter::format(&ctx, point, elapsed)
    }

    #[test]
    fn test_tracing_sink_emits_structured_fields() {
        let events = capture(|| TracingSink.log(LogLevel::Information, &message(LogPoint::Before)));

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.level, Level::INFO);
        assert_eq!(event.target, "aspect_logging");
        assert_eq!(event.fields["log_point"], "OnBefore");
        assert_eq!(event.fields["type_name"], "Calculator");
        assert_eq!(event.fields["member"], "add");
        assert_eq!(event.fields["correlation_id"], "abc");
        assert_eq!(event.fields["message"], "Calculator.add:abc:OnBefore");
        assert!(!event.fields.contains_key("elapsed"));
    }

    #[test]
    fn test_tracing_sink_failure_at_error() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let events = capture(|| {
            TracingSink.log_failure(LogLevel::Error, &message(LogPoint::Exception), &err)
        });

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::ERROR);
        assert_eq!(events[0].fields["error"], "disk on fire");
        assert_eq!(events[0].fields["log_point"], "OnException");
    }

    #[test]
    fn test_tracing_sink_records_elapsed_as_number() {
        let elapsed = Duration::from_micros(1_500);
        let events = capture(|| {
            TracingSink.log(LogLevel::Debug, &message_after(LogPoint::Finally, Some(elapsed)))
        });

        let event = &events[0];
        assert_eq!(event.level, Level::DEBUG);
        assert_eq!(event.fields["elapsed_us"], "1500");
        assert_eq!(event.fields["elapsed"], "1.5ms");
        assert_eq!(event.fields["message"], "Calculator.add:abc:OnFinally (1.5ms)");
    }

    #[test]
    fn test_critical_is_emitted_as_error() {
        let events = capture(|| TracingSink.log(LogLevel::Critical, &message(LogPoint::After)));
        assert_eq!(events[0].level, Level::ERROR);
    }

    #[test]
    fn test_default_log_failure_appends_error() {
        struct Lines(Mutex<Vec<String>>);
        impl LogSink for Lines {
            fn log(&self, _level: LogLevel, message: &LogMessage) {
                self.0.lock().unwrap().push(message.render());
            }
        }

        let sink = Lines(Mutex::new(Vec::new()));
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        sink.log_failure(LogLevel::Error, &message(LogPoint::Exception), &err);
        assert_eq!(
            sink.0.lock().unwrap().as_slice(),
            ["Calculator.add:abc:OnException boom"]
        );
    }
}
