//! Failure isolation: admission errors, failing tasks, failing reports.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use relaybot::provider::ProviderError;
use relaybot::queue::{acknowledge, CommandQueue, Invocation, QueuedTask, TaskFuture};
use relaybot::AppError;

use super::test_helpers::{shared, task, EventLog, MockInvocation};

// ── Acknowledgment guard ─────────────────────────────────────────────────────

#[tokio::test]
async fn acknowledging_twice_sends_one_processing_signal() {
    let invocation = MockInvocation::new("inv").into_shared();

    acknowledge(invocation.as_ref()).await.unwrap();
    acknowledge(invocation.as_ref()).await.unwrap();

    assert_eq!(invocation.ack_calls(), 1);
    assert!(invocation.ack_state().is_acknowledged());
}

#[tokio::test]
async fn concurrent_acknowledgments_send_one_processing_signal() {
    let invocation = MockInvocation::new("inv").into_shared();

    let (first, second) = tokio::join!(
        acknowledge(invocation.as_ref()),
        acknowledge(invocation.as_ref())
    );
    first.unwrap();
    second.unwrap();

    assert_eq!(invocation.ack_calls(), 1);
}

#[tokio::test]
async fn concurrent_caller_waits_for_in_flight_acknowledgment() {
    let invocation = MockInvocation::new("inv").failing_first_acks(1).into_shared();

    let (first, second) = tokio::join!(
        acknowledge(invocation.as_ref()),
        acknowledge(invocation.as_ref())
    );

    assert!(matches!(first, Err(AppError::Expired(_))));
    second.expect("second caller delivers its own acknowledgment");
    assert_eq!(invocation.ack_calls(), 2);
    assert!(invocation.ack_state().is_acknowledged());
}

#[tokio::test]
async fn caller_side_acknowledgment_skips_the_guard() {
    let invocation = MockInvocation::new("inv").into_shared();
    invocation.ack_state().mark_acknowledged();

    acknowledge(invocation.as_ref()).await.unwrap();

    assert_eq!(invocation.ack_calls(), 0);
}

#[tokio::test]
async fn failed_acknowledgment_can_be_retried() {
    let invocation = MockInvocation::new("inv").failing_ack().into_shared();

    assert!(acknowledge(invocation.as_ref()).await.is_err());
    assert!(!invocation.ack_state().is_acknowledged());
    assert!(acknowledge(invocation.as_ref()).await.is_err());
    assert_eq!(invocation.ack_calls(), 2);
}

#[tokio::test]
async fn queue_acknowledges_before_running_task() {
    let queue = CommandQueue::new();
    let invocation = MockInvocation::new("inv").into_shared();
    let observed = Arc::clone(&invocation);
    let acked_before_body = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&acked_before_body);

    queue
        .enqueue(task(&invocation, "ack-first", async move {
            flag.store(observed.ack_calls() == 1, Ordering::SeqCst);
            Ok(())
        }))
        .await
        .unwrap();
    queue.wait_idle().await;

    assert!(acked_before_body.load(Ordering::SeqCst));
}

// ── Admission errors ─────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_acknowledgment_rejects_task_without_queuing() {
    let queue = CommandQueue::new();
    let invocation = MockInvocation::new("expired").failing_ack().into_shared();
    let ran = Arc::new(AtomicBool::new(false));
    let ran_flag = Arc::clone(&ran);

    let result = queue
        .enqueue(task(&invocation, "never", async move {
            ran_flag.store(true, Ordering::SeqCst);
            Ok(())
        }))
        .await;

    assert!(matches!(result, Err(AppError::Expired(_))));
    assert_eq!(queue.activations(), 0);
    assert!(queue.is_empty().await);
    assert!(!ran.load(Ordering::SeqCst));
}

#[test]
fn task_without_invocation_fails_fast() {
    let thunk = Box::new(|| -> TaskFuture { Box::pin(async { Ok(()) }) });
    let result = QueuedTask::from_parts("orphan", None, thunk);

    match result {
        Err(AppError::MissingInvocation(msg)) => assert!(msg.contains("orphan")),
        other => panic!("expected MissingInvocation, got {other:?}"),
    }
}

// ── Execution errors ─────────────────────────────────────────────────────────

#[tokio::test]
async fn failing_task_does_not_stop_the_next_one() {
    let queue = CommandQueue::new();
    let failing = MockInvocation::new("a").into_shared();
    let healthy = MockInvocation::new("b").into_shared();
    let completed = Arc::new(AtomicBool::new(false));
    let done = Arc::clone(&completed);

    queue
        .enqueue(task(&failing, "a", async {
            Err(AppError::Io("disk full".into()))
        }))
        .await
        .unwrap();
    queue
        .enqueue(task(&healthy, "b", async move {
            done.store(true, Ordering::SeqCst);
            Ok(())
        }))
        .await
        .unwrap();
    queue.wait_idle().await;

    assert!(completed.load(Ordering::SeqCst));
    assert_eq!(failing.follow_ups(), vec!["An error occurred: io: disk full".to_owned()]);
    assert!(healthy.follow_ups().is_empty());
}

#[tokio::test]
async fn panicking_task_is_reported_and_loop_survives() {
    let queue = CommandQueue::new();
    let panicking = MockInvocation::new("panics").into_shared();
    let healthy = MockInvocation::new("after").into_shared();
    let completed = Arc::new(AtomicBool::new(false));
    let done = Arc::clone(&completed);

    queue
        .enqueue(task(&panicking, "panics", async {
            let explode = true;
            if explode {
                panic!("handler exploded");
            }
            Ok(())
        }))
        .await
        .unwrap();
    queue
        .enqueue(task(&healthy, "after", async move {
            done.store(true, Ordering::SeqCst);
            Ok(())
        }))
        .await
        .unwrap();
    queue.wait_idle().await;

    assert!(completed.load(Ordering::SeqCst));
    assert_eq!(
        panicking.follow_ups(),
        vec!["An unexpected error occurred while running your command.".to_owned()]
    );
}

// ── Reporting errors ─────────────────────────────────────────────────────────

#[tokio::test]
async fn failing_report_is_swallowed_and_loop_proceeds() {
    let queue = CommandQueue::new();
    let expired = MockInvocation::new("expired").failing_follow_up().into_shared();
    let healthy = MockInvocation::new("next").into_shared();
    let completed = Arc::new(AtomicBool::new(false));
    let done = Arc::clone(&completed);

    let first = queue
        .enqueue(task(&expired, "expired", async {
            Err(AppError::Io("upstream".into()))
        }))
        .await;
    let second = queue
        .enqueue(task(&healthy, "next", async move {
            done.store(true, Ordering::SeqCst);
            Ok(())
        }))
        .await;
    queue.wait_idle().await;

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert!(completed.load(Ordering::SeqCst));
    assert!(!queue.is_draining());
}

#[tokio::test]
async fn unusable_invocation_gets_no_failure_report() {
    let queue = CommandQueue::new();
    let stale = MockInvocation::new("stale").into_shared();
    let flip = Arc::clone(&stale);

    queue
        .enqueue(task(&stale, "stale", async move {
            flip.set_usable(false);
            Err(AppError::Io("too slow".into()))
        }))
        .await
        .unwrap();
    queue.wait_idle().await;

    assert!(stale.follow_ups().is_empty());
}

// ── End to end ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn middle_task_failure_is_reported_in_order() {
    let queue = CommandQueue::new();
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));

    let invocations: Vec<_> = (1..=3)
        .map(|n| {
            MockInvocation::new(&format!("task{n}"))
                .with_log(&log)
                .into_shared()
        })
        .collect();

    for (index, invocation) in invocations.iter().enumerate() {
        let n = index + 1;
        let replier = shared(invocation);
        let body = async move {
            if n == 2 {
                return Err(AppError::Provider(ProviderError::Api {
                    status: 500,
                    message: "boom".into(),
                }));
            }
            replier.follow_up(format!("result {n}")).await
        };
        queue
            .enqueue(task(invocation, &format!("task{n}"), body))
            .await
            .expect("enqueue never surfaces execution errors");
    }
    queue.wait_idle().await;

    let events = log.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "task1: result 1".to_owned(),
            "task2: An error occurred with the AI service: boom".to_owned(),
            "task3: result 3".to_owned(),
        ]
    );
}
