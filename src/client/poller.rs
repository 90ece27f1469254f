//! Fixed-interval polling for long-running service tasks
//!
//! Account setup runs server-side as a task whose progress is observed by
//! repeated status queries. The service itself never bounds the wait, so the
//! loop here carries an explicit attempt ceiling; both the ceiling and the
//! interval come from configuration.

use crate::client::types::{Task, TaskStatus};
use crate::client::Session;
use crate::config::PollConfig;
use crate::error::OnboardError;
use std::time::Duration;
use tokio::time::sleep;

/// Query a task's state until the service reports it ended.
///
/// The first query is issued immediately; each subsequent query waits
/// `interval_ms`. Two ways out besides success: a failed status query aborts
/// the loop and propagates (the query itself is never retried), and a task
/// still running after `max_attempts` queries fails with
/// [`OnboardError::PollTimeout`].
///
/// Returns the first terminal status observed; no further queries happen
/// after that.
pub async fn poll_task(
    session: &Session,
    task: &Task,
    poll: &PollConfig,
) -> Result<TaskStatus, OnboardError> {
    let interval = Duration::from_millis(poll.interval_ms);

    for attempt in 1..=poll.max_attempts {
        if attempt > 1 {
            sleep(interval).await;
        }

        let status = session.task_state(task).await?;

        tracing::debug!(
            attempt,
            max_attempts = poll.max_attempts,
            is_ended = status.is_ended,
            message = %status.message,
            "Task state polled"
        );

        if status.is_ended {
            return Ok(status);
        }
    }

    Err(OnboardError::PollTimeout {
        attempts: poll.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast_poll(max_attempts: u32) -> PollConfig {
        PollConfig {
            interval_ms: 5,
            max_attempts,
        }
    }

    fn test_task() -> Task {
        Task {
            task_token: "task-1".to_string(),
        }
    }

    #[tokio::test]
    async fn returns_the_first_terminal_status_and_stops_querying() {
        let mut server = Server::new_async().await;
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let mock = server
            .mock("POST", "/task/progress")
            .with_status(200)
            .with_body_from_request(move |_| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    br#"{"is_ended": false, "message": "Connecting to bank"}"#.to_vec()
                } else {
                    br#"{"is_ended": true, "message": "Account linked"}"#.to_vec()
                }
            })
            .expect(2)
            .create_async()
            .await;

        let session = Session::new(&server.url(), "test-token").unwrap();
        let status = poll_task(&session, &test_task(), &fast_poll(10))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(status.is_ended);
        assert_eq!(status.message, "Account linked");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn first_query_happens_without_an_initial_sleep() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/task/progress")
            .with_status(200)
            .with_body(r#"{"is_ended": true}"#)
            .expect(1)
            .create_async()
            .await;

        let session = Session::new(&server.url(), "test-token").unwrap();
        let started = std::time::Instant::now();
        let poll = PollConfig {
            interval_ms: 60_000,
            max_attempts: 5,
        };
        let status = poll_task(&session, &test_task(), &poll).await.unwrap();

        mock.assert_async().await;
        assert!(status.is_ended);
        // A single-attempt success must not have waited out the interval.
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn a_failed_query_aborts_without_further_attempts() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/task/progress")
            .with_status(500)
            .with_body(r#"{"error": {"code": 5000, "message": "Internal error"}}"#)
            .expect(1)
            .create_async()
            .await;

        let session = Session::new(&server.url(), "test-token").unwrap();
        let result = poll_task(&session, &test_task(), &fast_poll(10)).await;

        mock.assert_async().await;
        assert_eq!(result.unwrap_err().remote_code(), Some(5000));
    }

    #[tokio::test]
    async fn a_task_that_never_ends_times_out_after_the_ceiling() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/task/progress")
            .with_status(200)
            .with_body(r#"{"is_ended": false, "message": "Still connecting"}"#)
            .expect(3)
            .create_async()
            .await;

        let session = Session::new(&server.url(), "test-token").unwrap();
        let result = poll_task(&session, &test_task(), &fast_poll(3)).await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(OnboardError::PollTimeout { attempts: 3 })
        ));
    }
}
