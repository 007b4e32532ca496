//! Integration tests for the resilience toolkit.
//!
//! Exercises the three public surfaces together: classification through
//! deep wrap chains, retry behavior driven by classification, cancellation
//! of in-progress backoff waits, and panic-to-error conversion.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use faultline::boundary::{catch_panic, catch_panic_async, protect, CaughtPanic};
use faultline::classify::{classify, Annotate, Category, Fault, Sentinel, NOT_FOUND, TRANSIENT};
use faultline::retry::{Retrier, RetryError, RetryPolicy, Sleeper};

/// Sleeper that returns immediately and records every requested delay.
#[derive(Debug, Default)]
struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn delays(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

// ============================================================================
// Classification Through Wrap Chains
// ============================================================================

#[test]
fn test_not_found_wrapped_twice_classifies_not_found() {
    let step_one = Err::<(), _>(NOT_FOUND).annotate("loading user record").unwrap_err();
    let step_two = Err::<(), _>(step_one).annotate("handling request").unwrap_err();

    assert_eq!(classify(&step_two), Category::NotFound);
}

#[test]
fn test_fresh_unmarked_error_classifies_internal() {
    let err = std::io::Error::new(std::io::ErrorKind::Other, "wat");
    assert_eq!(classify(&err), Category::Internal);
}

#[test]
fn test_classification_survives_arbitrary_depth() {
    let mut wrapped: Box<dyn std::error::Error + Send + Sync> = Box::new(TRANSIENT);
    for depth in 0..10 {
        wrapped = Box::new(faultline::classify::Annotated::new(
            format!("layer {depth}"),
            wrapped,
        ));
    }

    assert_eq!(classify(wrapped.as_ref()), Category::Transient);
}

#[test]
fn test_fault_payload_reaches_consumers() {
    let fault = Fault::validation("email", "must contain @");
    assert_eq!(classify(&fault), Category::Validation);
    assert_eq!(fault.to_string(), "must contain @");
}

#[test]
fn test_custom_sentinel_classifies_through_wrap() {
    const LOCK_HELD: Sentinel = Sentinel::new(Category::Transient, "lock held");

    let wrapped = Err::<(), _>(LOCK_HELD).annotate("acquiring table lock").unwrap_err();
    assert_eq!(classify(&wrapped), Category::Transient);
}

// ============================================================================
// Retry Attempt Accounting
// ============================================================================

#[tokio::test]
async fn test_always_failing_performs_exactly_max_attempts() {
    let sleeper = Arc::new(RecordingSleeper::default());
    let retrier = Retrier::new(RetryPolicy::default().with_max_attempts(5))
        .with_sleeper(sleeper.clone());
    let calls = AtomicU32::new(0);

    let err = retrier
        .run::<(), _, _, _>(&CancellationToken::new(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TRANSIENT) }
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert_eq!(err.attempts(), 5);
    assert!(err.to_string().contains("5 attempt(s)"));
    assert_eq!(sleeper.delays().len(), 4);
}

#[tokio::test]
async fn test_transient_blip_recovers_on_second_attempt() {
    let sleeper = Arc::new(RecordingSleeper::default());
    let retrier = Retrier::new(RetryPolicy::default()).with_sleeper(sleeper.clone());
    let calls = AtomicU32::new(0);

    let result = retrier
        .run(&CancellationToken::new(), || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if attempt == 1 {
                    Err(Fault::transient("connection reset"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(sleeper.delays().len(), 1);
}

#[tokio::test]
async fn test_wrapped_transient_marker_still_retried() {
    let sleeper = Arc::new(RecordingSleeper::default());
    let retrier = Retrier::new(RetryPolicy::default().with_max_attempts(2))
        .with_sleeper(sleeper.clone());

    let err = retrier
        .run::<(), _, _, _>(&CancellationToken::new(), || async {
            Err(TRANSIENT).annotate("refreshing token")
        })
        .await
        .unwrap_err();

    assert_eq!(err.attempts(), 2);
    assert_eq!(sleeper.delays().len(), 1);
}

#[tokio::test]
async fn test_validation_error_is_never_retried() {
    let sleeper = Arc::new(RecordingSleeper::default());
    let retrier = Retrier::new(RetryPolicy::default()).with_sleeper(sleeper.clone());
    let calls = AtomicU32::new(0);

    let err = retrier
        .run::<(), _, _, _>(&CancellationToken::new(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Fault::validation("name", "empty")) }
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(err.attempts(), 1);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_exhausted_error_still_classifies_transient() {
    let retrier = Retrier::new(RetryPolicy::default().with_max_attempts(2))
        .with_sleeper(Arc::new(RecordingSleeper::default()));

    let err = retrier
        .run::<(), _, _, _>(&CancellationToken::new(), || async { Err(TRANSIENT) })
        .await
        .unwrap_err();

    assert_eq!(classify(&err), Category::Transient);
}

#[tokio::test]
async fn test_backoff_delays_follow_the_schedule() {
    let sleeper = Arc::new(RecordingSleeper::default());
    let policy = RetryPolicy::default()
        .with_max_attempts(5)
        .with_base_delay(Duration::from_millis(50))
        .with_max_delay(Duration::from_millis(150));
    let retrier = Retrier::new(policy).with_sleeper(sleeper.clone());

    let _ = retrier
        .run::<(), _, _, _>(&CancellationToken::new(), || async { Err(TRANSIENT) })
        .await;

    assert_eq!(
        sleeper.delays(),
        vec![
            Duration::from_millis(50),
            Duration::from_millis(100),
            Duration::from_millis(150),
            Duration::from_millis(150),
        ]
    );
}

// ============================================================================
// Cancellation of In-Progress Waits
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_cancellation_during_first_backoff_wait() {
    let policy = RetryPolicy::default().with_base_delay(Duration::from_secs(600));
    let retrier = Retrier::new(policy);
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let start = tokio::time::Instant::now();
    let err = retrier
        .run::<(), _, _, _>(&cancel, || async { Err(TRANSIENT) })
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(err.attempts(), 1);
    assert!(start.elapsed() < Duration::from_secs(1));
    match err {
        RetryError::Cancelled { attempts } => assert_eq!(attempts, 1),
        other => panic!("expected cancellation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cancelled_token_reported_over_transient_error() {
    let retrier = Retrier::new(RetryPolicy::default())
        .with_sleeper(Arc::new(RecordingSleeper::default()));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = retrier
        .run::<(), _, _, _>(&cancel, || async { Err(TRANSIENT) })
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(err.into_source().is_none());
}

// ============================================================================
// Panic Boundary
// ============================================================================

#[test]
fn test_panic_payload_x_reaches_error_message() {
    let result: Result<(), _> = catch_panic(|| panic!("x"));
    assert!(result.unwrap_err().to_string().contains("x"));
}

#[test]
fn test_normal_return_passes_unchanged() {
    let result = catch_panic(|| vec![1, 2, 3]);
    assert_eq!(result.unwrap(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_async_boundary_converts_panic() {
    let result: Result<(), CaughtPanic> = catch_panic_async(async { panic!("poll bomb") }).await;
    assert!(result.unwrap_err().to_string().contains("poll bomb"));
}

#[test]
fn test_protected_panic_classifies_internal() {
    let result: Result<(), Fault> = protect(|| panic!("slice index out of range"));
    let fault = result.unwrap_err();

    assert_eq!(classify(&fault), Category::Internal);
    assert!(fault.to_string().contains("slice index out of range"));
}

#[test]
fn test_boundary_error_joins_wrap_chain() {
    let result: Result<(), _> = catch_panic(|| panic!("x"));
    let annotated = result.annotate("rendering report").unwrap_err();

    assert_eq!(classify(&annotated), Category::Internal);
    let chain: Vec<String> = faultline::classify::chain(&annotated)
        .map(|e| e.to_string())
        .collect();
    assert_eq!(chain.len(), 2);
    assert!(chain[1].contains("x"));
}

// ============================================================================
// End-to-End: Retry Over a Protected, Classified Operation
// ============================================================================

#[tokio::test]
async fn test_protected_operation_under_retry() {
    let sleeper = Arc::new(RecordingSleeper::default());
    let retrier = Retrier::new(RetryPolicy::default().with_max_attempts(4))
        .with_sleeper(sleeper.clone());
    let calls = AtomicU32::new(0);

    let result = retrier
        .run(&CancellationToken::new(), || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                faultline::boundary::protect_async(async move {
                    match attempt {
                        1 => Err(Fault::transient("warming up")),
                        2 => panic!("unexpected hole in state"),
                        _ => Ok("stable"),
                    }
                })
                .await
            }
        })
        .await;

    // The panic converts to an internal fault, which is not retryable.
    let err = result.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(err.attempts(), 2);
    assert_eq!(classify(&err), Category::Internal);
    assert!(err.into_source().unwrap().to_string().contains("hole"));
}
