// Poller Cancellation Token

use tokio::sync::watch;

/// Cancellation signal observed by a TaskPoller
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until cancellation is requested
    ///
    /// Never resolves if the sender is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Cancellation sender
pub struct CancelSender {
    tx: watch::Sender<bool>,
}

impl CancelSender {
    /// Signal cancellation to every token cloned from this channel
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a cancellation channel
pub fn cancel_channel() -> (CancelSender, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelSender { tx }, CancelToken { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_wakes_waiter() {
        let (sender, mut token) = cancel_channel();
        assert!(!token.is_cancelled());

        sender.cancel();
        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .expect("token should resolve after cancel");
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_dropped_sender_does_not_cancel() {
        let (sender, mut token) = cancel_channel();
        drop(sender);

        let waited = tokio::time::timeout(Duration::from_millis(50), token.cancelled()).await;
        assert!(waited.is_err());
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_waiter_pending_until_cancel() {
        let (sender, mut token) = cancel_channel();
        let mut waiter = tokio_test::task::spawn(token.cancelled());

        tokio_test::assert_pending!(waiter.poll());
        sender.cancel();
        assert!(waiter.is_woken());
        tokio_test::assert_ready!(waiter.poll());
    }
}
