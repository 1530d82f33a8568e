// TaskPoller end-to-end with a scripted backend

use std::sync::Arc;
use std::time::Duration;
use stepexec_core::application::{cancel_channel, TaskPoller};
use stepexec_core::domain::{Operation, OperationState};
use stepexec_core::port::task_backend::mocks::ScriptedBackend;
use stepexec_core::port::PollError;

#[tokio::test]
async fn test_queued_running_complete_polls_twice() {
    let backend = Arc::new(ScriptedBackend::new([
        OperationState::Running,
        OperationState::Complete,
    ]));
    let seed = Operation::new("t1", OperationState::Queued);

    let terminal = TaskPoller::new(seed, backend.clone())
        .with_interval(Duration::from_millis(1))
        .spawn()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(terminal.id, "t1");
    assert_eq!(terminal.state, OperationState::Complete);
    assert_eq!(backend.poll_count(), 2);

    let completed = backend.completed();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0], terminal);
}

#[tokio::test]
async fn test_complete_called_once_for_each_terminal_state() {
    for terminal_state in OperationState::TERMINAL {
        let backend = Arc::new(ScriptedBackend::new([
            OperationState::Initializing,
            OperationState::Running,
            terminal_state,
            // Inconsistent late answer must never be observed
            OperationState::Running,
        ]));

        let terminal = TaskPoller::new(Operation::new("t", OperationState::Queued), backend.clone())
            .with_interval(Duration::from_millis(1))
            .run()
            .await
            .unwrap();

        assert_eq!(terminal.state, terminal_state);
        assert_eq!(backend.poll_count(), 3);
        assert_eq!(backend.completed().len(), 1);
    }
}

#[tokio::test]
async fn test_many_pollers_run_independently() {
    let mut handles = Vec::new();
    let mut backends = Vec::new();

    for i in 0..10 {
        let steps: Vec<OperationState> = std::iter::repeat(OperationState::Running)
            .take(i)
            .chain([OperationState::Complete])
            .collect();
        let backend = Arc::new(ScriptedBackend::new(steps));
        backends.push(Arc::clone(&backend));

        let seed = Operation::new(format!("task-{}", i), OperationState::Queued);
        handles.push(
            TaskPoller::new(seed, backend)
                .with_interval(Duration::from_millis(2))
                .spawn(),
        );
    }

    let results = futures::future::join_all(handles).await;
    for (i, result) in results.into_iter().enumerate() {
        let terminal = result.unwrap().unwrap();
        assert_eq!(terminal.id, format!("task-{}", i));
        assert_eq!(backends[i].poll_count(), i + 1);
        assert_eq!(backends[i].completed().len(), 1);
    }
}

#[tokio::test]
async fn test_failure_observed_through_handle() {
    let backend = Arc::new(ScriptedBackend::with_results([
        Ok(OperationState::Running),
        Err("503 Service Unavailable".to_string()),
    ]));

    let handle = TaskPoller::new(Operation::new("t5", OperationState::Queued), backend.clone())
        .with_interval(Duration::from_millis(1))
        .spawn();

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(PollError::Backend { .. })));
    assert!(backend.completed().is_empty());
}

#[tokio::test]
async fn test_owner_cancels_long_running_task() {
    let backend = Arc::new(ScriptedBackend::new(std::iter::repeat(OperationState::Running).take(1000)));
    let (sender, token) = cancel_channel();

    let handle = TaskPoller::new(Operation::new("t6", OperationState::Queued), backend.clone())
        .with_interval(Duration::from_millis(5))
        .with_cancel(token)
        .spawn();

    tokio::time::sleep(Duration::from_millis(50)).await;
    sender.cancel();

    let result = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("cancelled poller should finish")
        .unwrap();

    assert!(matches!(result, Err(PollError::Cancelled(_))));
    assert!(backend.poll_count() >= 1);
    assert!(backend.completed().is_empty());
}
