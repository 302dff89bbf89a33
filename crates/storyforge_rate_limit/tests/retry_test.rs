//! Timing tests for throttle retry.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use storyforge_error::{GeminiError, GeminiErrorKind};
use storyforge_rate_limit::ThrottleRetry;
use tokio::time::Instant;

fn throttled() -> GeminiError {
    GeminiError::new(GeminiErrorKind::HttpError {
        status_code: 429,
        message: "RESOURCE_EXHAUSTED".to_string(),
    })
}

fn unauthorized() -> GeminiError {
    GeminiError::new(GeminiErrorKind::HttpError {
        status_code: 401,
        message: "API key not valid".to_string(),
    })
}

/// Runs `outcomes` through the retry wrapper and returns the result with
/// the instant of every attempt.
async fn run_scripted(
    retry: ThrottleRetry,
    outcomes: Vec<Result<&'static str, GeminiError>>,
) -> (Result<&'static str, GeminiError>, Vec<Instant>) {
    let attempts = Arc::new(Mutex::new(Vec::new()));
    let outcomes = Arc::new(Mutex::new(outcomes.into_iter()));

    let result = retry
        .run(|| {
            let attempts = attempts.clone();
            let outcomes = outcomes.clone();
            async move {
                attempts.lock().unwrap().push(Instant::now());
                outcomes
                    .lock()
                    .unwrap()
                    .next()
                    .unwrap_or(Ok("exhausted script"))
            }
        })
        .await;

    let attempts = attempts.lock().unwrap().clone();
    (result, attempts)
}

#[tokio::test(start_paused = true)]
async fn test_throttled_twice_then_succeeds() {
    let (result, attempts) = run_scripted(
        ThrottleRetry::default(),
        vec![Err(throttled()), Err(throttled()), Ok("image")],
    )
    .await;

    assert_eq!(result.unwrap(), "image");
    assert_eq!(attempts.len(), 3, "expected exactly two retries");

    let first_wait = attempts[1] - attempts[0];
    let second_wait = attempts[2] - attempts[1];
    assert!(first_wait >= Duration::from_millis(2000));
    assert!(first_wait < Duration::from_millis(2100));
    assert!(second_wait >= Duration::from_millis(4000));
    assert!(second_wait < Duration::from_millis(4100));
}

#[tokio::test(start_paused = true)]
async fn test_non_throttling_error_is_not_retried() {
    let start = Instant::now();
    let (result, attempts) = run_scripted(
        ThrottleRetry::default(),
        vec![Err(unauthorized()), Ok("never reached")],
    )
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.kind, unauthorized().kind);
    assert_eq!(attempts.len(), 1);
    assert!(Instant::now() - start < Duration::from_millis(1));
}

#[tokio::test(start_paused = true)]
async fn test_throttling_beyond_budget_is_surfaced() {
    let (result, attempts) = run_scripted(
        ThrottleRetry::new(3, Duration::from_millis(2000)),
        vec![
            Err(throttled()),
            Err(throttled()),
            Err(throttled()),
            Err(throttled()),
            Ok("too late"),
        ],
    )
    .await;

    assert!(result.is_err());
    assert_eq!(attempts.len(), 4, "first attempt plus three retries");

    let total = attempts[3] - attempts[0];
    assert!(total >= Duration::from_millis(14_000));
}

#[tokio::test(start_paused = true)]
async fn test_resource_exhausted_without_status_is_retried() {
    let quota = GeminiError::new(GeminiErrorKind::ApiRequest(
        "RESOURCE_EXHAUSTED: requests per minute exceeded".to_string(),
    ));
    let (result, attempts) =
        run_scripted(ThrottleRetry::default(), vec![Err(quota), Ok("ok")]).await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(attempts.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_quota_wording_on_forbidden_is_not_retried() {
    let forbidden = GeminiError::new(GeminiErrorKind::HttpError {
        status_code: 403,
        message: "PERMISSION_DENIED: quota project not set".to_string(),
    });
    let (result, attempts) =
        run_scripted(ThrottleRetry::default(), vec![Err(forbidden), Ok("unreachable")]).await;

    assert!(result.is_err());
    assert_eq!(attempts.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_server_error_is_surfaced_without_retry() {
    let unavailable = GeminiError::new(GeminiErrorKind::HttpError {
        status_code: 503,
        message: "UNAVAILABLE".to_string(),
    });
    let (result, attempts) =
        run_scripted(ThrottleRetry::default(), vec![Err(unavailable), Ok("unreachable")]).await;

    let err = result.unwrap_err();
    assert!(err.kind.is_retryable());
    assert!(!err.kind.is_throttled());
    assert_eq!(attempts.len(), 1);
}
