use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use remark_core::domain::comments::Comment;

/// Receiving end of one subscriber endpoint.
///
/// Dropping the handle cancels it, which unregisters the endpoint from the
/// hub. Once cancelled no further comments are yielded, even ones already
/// buffered.
pub struct Subscription {
    post_id: String,
    receiver: mpsc::Receiver<Comment>,
    token: CancellationToken,
    _guard: DropGuard,
}

impl Subscription {
    pub(crate) fn new(
        post_id: String,
        receiver: mpsc::Receiver<Comment>,
        token: CancellationToken,
    ) -> Self {
        let guard = token.clone().drop_guard();
        Self {
            post_id,
            receiver,
            token,
            _guard: guard,
        }
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Waits for the next comment. Returns `None` once the subscription is
    /// cancelled or the hub has closed the endpoint.
    pub async fn recv(&mut self) -> Option<Comment> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            comment = self.receiver.recv() => comment,
        }
    }
}

impl Stream for Subscription {
    type Item = Comment;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.token.is_cancelled() {
            return Poll::Ready(None);
        }
        // the hub drops the sender right after cancellation, which wakes us
        this.receiver.poll_recv(cx)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("post_id", &self.post_id)
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}
