//! Shared task queue with a join barrier.
//!
//! [`TaskQueue`] is a FIFO of pending queries plus an in-flight counter.
//! The counter is incremented on [`TaskQueue::enqueue`] and decremented when
//! the [`Ticket`] returned by [`TaskQueue::dequeue`] is marked done, so
//! [`TaskQueue::join`] resolves exactly when every enqueued query has been
//! taken and finished.
//!
//! A ticket that goes out of scope without being marked done (early return,
//! cancellation, panic unwinding) marks itself done on drop. A dequeued
//! item therefore can never stall `join`.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use crate::error::SearchError;
use crate::types::Query;

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<Query>,
    /// Enqueued minus marked done.
    in_flight: usize,
    closed: bool,
}

/// Multi-consumer task queue shared by all agents of one run.
#[derive(Debug, Default)]
pub struct TaskQueue {
    state: Mutex<QueueState>,
    item_ready: Notify,
    drained: Notify,
}

impl TaskQueue {
    /// Create an empty, open queue.
    pub fn new() -> Self {
        Self::default()
    }

    // The state is a plain counter and deque; a panic while holding the lock
    // cannot leave it half-updated, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a query and increment the in-flight counter. Never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::QueueClosed`] if [`close`](Self::close) was called.
    pub fn enqueue(&self, query: impl Into<Query>) -> Result<(), SearchError> {
        {
            let mut state = self.lock();
            if state.closed {
                return Err(SearchError::QueueClosed);
            }
            state.pending.push_back(query.into());
            state.in_flight += 1;
        }
        self.item_ready.notify_one();
        Ok(())
    }

    /// Take the next query, waiting while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and no items remain. Each
    /// item is handed to exactly one caller. Dropping the returned future
    /// before it completes takes nothing from the queue.
    pub async fn dequeue(&self) -> Option<Ticket<'_>> {
        loop {
            let notified = self.item_ready.notified();
            tokio::pin!(notified);
            // Register before checking so an enqueue or close racing with
            // the check still wakes us.
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(query) = state.pending.pop_front() {
                    return Some(Ticket { query, queue: self });
                }
                if state.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Mark a dequeued item as finished, decrementing the in-flight counter.
    ///
    /// Consumes the ticket, so an item cannot be marked done twice.
    pub fn mark_done(&self, ticket: Ticket<'_>) {
        debug_assert!(
            std::ptr::eq(ticket.queue, self),
            "ticket marked done on a different queue"
        );
        drop(ticket);
    }

    fn task_done(&self) {
        let drained = {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.in_flight == 0
        };
        if drained {
            self.drained.notify_waiters();
        }
    }

    /// Wait until every enqueued item has been dequeued and marked done.
    ///
    /// Resolves immediately when nothing is in flight.
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let in_flight = self.lock().in_flight;
            if in_flight == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Close the queue: further enqueues fail and waiting consumers return
    /// `None` once the remaining items are gone.
    pub fn close(&self) {
        self.lock().closed = true;
        self.item_ready.notify_waiters();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of items waiting to be dequeued.
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Number of items enqueued but not yet marked done.
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }
}

/// A dequeued query, held by the agent processing it.
///
/// Marked done on [`TaskQueue::mark_done`] or, failing that, on drop.
#[derive(Debug)]
pub struct Ticket<'a> {
    query: Query,
    queue: &'a TaskQueue,
}

impl Ticket<'_> {
    /// The query this ticket was issued for.
    pub fn query(&self) -> &str {
        &self.query
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            tracing::warn!("releasing task ticket during panic unwind");
        }
        self.queue.task_done();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn fifo_order_and_counter() {
        let queue = TaskQueue::new();
        queue.enqueue("a").expect("enqueue");
        queue.enqueue("b").expect("enqueue");
        assert_eq!(queue.pending(), 2);
        assert_eq!(queue.in_flight(), 2);

        let first = queue.dequeue().await.expect("item");
        assert_eq!(first.query(), "a");
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.in_flight(), 2);

        queue.mark_done(first);
        assert_eq!(queue.in_flight(), 1);

        let second = queue.dequeue().await.expect("item");
        assert_eq!(second.query(), "b");
        queue.mark_done(second);
        assert_eq!(queue.in_flight(), 0);
    }

    #[tokio::test]
    async fn join_on_empty_queue_returns_immediately() {
        let queue = TaskQueue::new();
        tokio::time::timeout(Duration::from_secs(1), queue.join())
            .await
            .expect("join should not wait");
    }

    #[tokio::test]
    async fn join_waits_for_mark_done() {
        let queue = Arc::new(TaskQueue::new());
        queue.enqueue("q").expect("enqueue");

        let joiner = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.join().await })
        };

        let ticket = queue.dequeue().await.expect("item");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!joiner.is_finished(), "join resolved before mark_done");

        queue.mark_done(ticket);
        tokio::time::timeout(Duration::from_secs(1), joiner)
            .await
            .expect("join should resolve")
            .expect("join task");
    }

    #[tokio::test]
    async fn dropped_ticket_marks_itself_done() {
        let queue = TaskQueue::new();
        queue.enqueue("q").expect("enqueue");
        {
            let _ticket = queue.dequeue().await.expect("item");
            assert_eq!(queue.in_flight(), 1);
        }
        assert_eq!(queue.in_flight(), 0);
        tokio::time::timeout(Duration::from_secs(1), queue.join())
            .await
            .expect("join should resolve");
    }

    #[tokio::test]
    async fn dequeue_waits_for_enqueue() {
        let queue = Arc::new(TaskQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move {
                let ticket = queue.dequeue().await.expect("item");
                ticket.query().to_string()
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_finished());

        queue.enqueue("late").expect("enqueue");
        let got = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .expect("consumer should wake")
            .expect("consumer task");
        assert_eq!(got, "late");
    }

    #[tokio::test]
    async fn close_wakes_waiting_consumers() {
        let queue = Arc::new(TaskQueue::new());
        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let queue = Arc::clone(&queue);
                tokio::spawn(async move { queue.dequeue().await.is_none() })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.close();

        for consumer in consumers {
            let got_none = tokio::time::timeout(Duration::from_secs(1), consumer)
                .await
                .expect("consumer should wake")
                .expect("consumer task");
            assert!(got_none);
        }
    }

    #[tokio::test]
    async fn close_drains_remaining_items_first() {
        let queue = TaskQueue::new();
        queue.enqueue("left").expect("enqueue");
        queue.close();
        assert!(queue.is_closed());

        let ticket = queue.dequeue().await.expect("remaining item");
        assert_eq!(ticket.query(), "left");
        queue.mark_done(ticket);
        assert!(queue.dequeue().await.is_none());
    }

    #[test]
    fn enqueue_after_close_rejected() {
        let queue = TaskQueue::new();
        queue.close();
        let err = queue.enqueue("x").unwrap_err();
        assert!(matches!(err, SearchError::QueueClosed));
        assert_eq!(queue.in_flight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_consumers_receive_each_item_once() {
        let queue = Arc::new(TaskQueue::new());
        for i in 0..200 {
            queue.enqueue(format!("q{i}")).expect("enqueue");
        }
        queue.close();

        let consumers: Vec<_> = (0..8)
            .map(|_| {
                let queue = Arc::clone(&queue);
                tokio::spawn(async move {
                    let mut seen = Vec::new();
                    while let Some(ticket) = queue.dequeue().await {
                        seen.push(ticket.query().to_string());
                        queue.mark_done(ticket);
                        tokio::task::yield_now().await;
                    }
                    seen
                })
            })
            .collect();

        let mut all = Vec::new();
        for consumer in consumers {
            all.extend(consumer.await.expect("consumer task"));
        }
        all.sort();
        let before = all.len();
        all.dedup();
        assert_eq!(before, 200);
        assert_eq!(all.len(), 200);
        assert_eq!(queue.in_flight(), 0);
    }
}
