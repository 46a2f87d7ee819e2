use aspect_logging::mock::{FixedIdProvider, RecordingSink, SequentialIdProvider};
use aspect_logging::{
    call_metadata, compose, CallMetadata, LogAspect, LogLevel, LogMessage, LogPoint, LogPoints,
    LogSettings, LogSink, LoggingOptions,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq)]
enum PaymentError {
    #[error("card declined: {0}")]
    Declined(String),
    #[error("gateway timeout")]
    Timeout,
}

/// A small service instrumented the way application code would do it:
/// one aspect per method, built once.
struct PaymentService {
    charge: LogAspect,
    refund: LogAspect,
}

impl PaymentService {
    fn new(options: Arc<LoggingOptions>, sink: Arc<RecordingSink>) -> Self {
        let class = LogSettings::new().prefix("payments");
        let build = |method: LogSettings| {
            LogAspect::builder()
                .class_and_method(&class, &method)
                .options(options.clone())
                .sink(sink.clone())
                .id_provider(Arc::new(FixedIdProvider::new("req-1")))
                .build()
        };
        Self {
            charge: build(LogSettings::new()),
            refund: build(LogSettings::new().log_points(LogPoints::ALL)),
        }
    }

    async fn charge(&self, card: &str, cents: u64) -> Result<u64, PaymentError> {
        let meta = call_metadata!(PaymentService::charge).with_arg(&card).with_arg(&cents);
        self.charge
            .invoke_async(meta, || async move {
                tokio::time::sleep(Duration::from_millis(1)).await;
                if card.starts_with("0000") {
                    Err(PaymentError::Declined(card.to_string()))
                } else {
                    Ok(cents)
                }
            })
            .await
    }

    async fn refund(&self, cents: u64) -> Result<u64, PaymentError> {
        self.refund
            .invoke_async_with(
                call_metadata!(PaymentService::refund).with_arg(&cents),
                || async { Err(PaymentError::Timeout) },
                |_ctx, err| match err {
                    PaymentError::Timeout => Ok(0),
                    other => Err(other),
                },
            )
            .await
    }
}

/// Options loaded from a settings file feed every aspect of the service;
/// the class prefix still wins over the file's prefix.
#[tokio::test]
async fn test_service_with_file_options() {
    let options = LoggingOptions::from_toml_str(
        r#"
        Prefix = "from-file"
        LogLevel = "Information"
        LogPoints = "Before | After | Finally"
        "#,
    )
    .expect("valid options");
    let sink = Arc::new(RecordingSink::new());
    let service = PaymentService::new(Arc::new(options), sink.clone());

    assert_eq!(service.charge("4242", 1500).await, Ok(1500));

    let records = sink.records();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.level == LogLevel::Information));
    assert_eq!(records[0].rendered, "payments PaymentService.charge:req-1:OnBefore");
    assert_eq!(records[1].rendered, "payments PaymentService.charge:req-1:OnAfter");
    assert!(records[2]
        .rendered
        .starts_with("payments PaymentService.charge:req-1:OnFinally ("));
}

/// A declined charge propagates unchanged. Exception is not in the file's
/// points, so only Before and Finally are logged.
#[tokio::test]
async fn test_declined_charge_propagates() {
    let options = LoggingOptions {
        log_points: Some(LogPoints::BEFORE_AND_AFTER_AND_FINALLY),
        ..Default::default()
    };
    let sink = Arc::new(RecordingSink::new());
    let service = PaymentService::new(Arc::new(options), sink.clone());

    let result = service.charge("0000-1111", 99).await;

    assert_eq!(result, Err(PaymentError::Declined("0000-1111".into())));
    assert_eq!(sink.points(), [LogPoint::Before, LogPoint::Finally]);
}

/// Method-level points beat the options; the recovery hook turns a timeout
/// into a zero refund after the failure was logged at Error.
#[tokio::test]
async fn test_refund_recovers_after_logging() {
    let options = LoggingOptions {
        log_level: Some(LogLevel::Warning),
        log_points: Some(LogPoints::BEFORE),
        ..Default::default()
    };
    let sink = Arc::new(RecordingSink::new());
    let service = PaymentService::new(Arc::new(options), sink.clone());

    assert_eq!(service.refund(500).await, Ok(0));

    let records = sink.records();
    assert_eq!(
        sink.points(),
        [LogPoint::Before, LogPoint::Exception, LogPoint::Finally]
    );
    assert_eq!(records[0].level, LogLevel::Warning);
    assert_eq!(records[1].level, LogLevel::Error);
    assert_eq!(records[1].failure.as_deref(), Some("gateway timeout"));
    assert_eq!(records[2].level, LogLevel::Warning);
}

/// Dropping a pending call (here through a timeout) still finalizes it.
#[tokio::test]
async fn test_cancelled_call_emits_finally() {
    let sink = Arc::new(RecordingSink::new());
    let aspect = LogAspect::builder()
        .settings(LogSettings::new().log_points(LogPoints::ALL))
        .sink(sink.clone())
        .id_provider(Arc::new(FixedIdProvider::new("abc")))
        .build();

    let slow = aspect.invoke_async(CallMetadata::new("Gateway", "poll"), || async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok::<_, PaymentError>(())
    });
    let outcome = tokio::time::timeout(Duration::from_millis(10), slow).await;

    assert!(outcome.is_err());
    assert_eq!(sink.points(), [LogPoint::Before, LogPoint::Finally]);
}

/// Concurrent tasks through one aspect keep their records apart.
#[tokio::test]
async fn test_concurrent_tasks_have_distinct_ids() {
    let sink = Arc::new(RecordingSink::new());
    let aspect = Arc::new(
        LogAspect::builder()
            .settings(LogSettings::new().log_points(LogPoints::BEFORE_AND_AFTER))
            .sink(sink.clone())
            .id_provider(Arc::new(SequentialIdProvider::new("task")))
            .build(),
    );

    let handles: Vec<_> = (0..10u64)
        .map(|i| {
            let aspect = aspect.clone();
            tokio::spawn(async move {
                aspect
                    .invoke_async(CallMetadata::new("Worker", "run").with_arg(&i), || async move {
                        tokio::time::sleep(Duration::from_millis(10 - i)).await;
                        Ok::<_, PaymentError>(i)
                    })
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.expect("task panicked").expect("call failed");
    }

    // Every id must show up exactly twice, once for Before and once for After.
    let mut per_id: HashMap<String, Vec<LogPoint>> = HashMap::new();
    for record in sink.records() {
        let id = record
            .args
            .iter()
            .find(|a| a.name == "correlation_id")
            .map(|a| a.value.to_string())
            .expect("correlation id");
        per_id.entry(id).or_default().push(record.point);
    }
    assert_eq!(per_id.len(), 10);
    assert!(per_id
        .values()
        .all(|points| points == &[LogPoint::Before, LogPoint::After]));
}

/// Options from the environment, resolved through a custom lookup.
#[test]
fn test_env_options_end_to_end() {
    let vars = HashMap::from([
        ("ASPECT_LOGGING_LOG_POINTS", "Finally"),
        ("ASPECT_LOGGING_INCLUDE_CORRELATION_ID", "false"),
    ]);
    let options = LoggingOptions::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("valid env options");

    let sink = Arc::new(RecordingSink::new());
    let aspect = Arc::new(
        LogAspect::builder()
            .options(Arc::new(options))
            .sink(sink.clone())
            .build(),
    );
    let parse = compose::wrap(aspect, call_metadata!(Parser::port), |s: &str| s.parse::<u16>());

    assert_eq!(parse("8080"), Ok(8080));
    assert!(parse("http").is_err());

    let lines = sink.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.starts_with("Parser.port:OnFinally (")));
}

/// A metrics-style sink reads the elapsed time as a `Duration`, not as text.
#[tokio::test]
async fn test_sink_receives_typed_elapsed() {
    #[derive(Default)]
    struct Timings(Mutex<Vec<Duration>>);

    impl LogSink for Timings {
        fn log(&self, _level: LogLevel, message: &LogMessage) {
            if let Some(elapsed) = message.elapsed() {
                self.0.lock().unwrap().push(elapsed);
            }
        }
    }

    let timings = Arc::new(Timings::default());
    let aspect = LogAspect::builder()
        .settings(LogSettings::new().log_points(LogPoints::FINALLY))
        .sink(timings.clone())
        .build();

    aspect
        .invoke_async(CallMetadata::new("Gateway", "ping"), || async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, PaymentError>(())
        })
        .await
        .expect("ping failed");

    let recorded = timings.0.lock().unwrap().clone();
    assert_eq!(recorded.len(), 1);
    assert!(recorded[0] >= Duration::from_millis(20), "{:?}", recorded[0]);
}
