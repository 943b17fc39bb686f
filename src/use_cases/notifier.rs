// Combat message queue: many producers, one draining consumer.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, trace};

use crate::domain::notifications::CombatMessage;
use crate::domain::ports::NotificationSink;

/// Producer side, cloned into the detector and the governor.
#[derive(Debug, Clone)]
pub struct CombatNotifier {
    tx: mpsc::UnboundedSender<CombatMessage>,
}

impl CombatNotifier {
    // Queues the message. Returns false once the queue has been dropped.
    pub fn send(&self, message: CombatMessage) -> bool {
        let recipient = message.recipient;
        match self.tx.send(message) {
            Ok(()) => {
                trace!(recipient, "combat message queued");
                true
            }
            Err(_) => {
                debug!(recipient, "combat message dropped, queue closed");
                false
            }
        }
    }
}

/// Consumer side, drained a bounded number of messages per tick.
#[derive(Debug)]
pub struct NotificationQueue {
    rx: mpsc::UnboundedReceiver<CombatMessage>,
}

impl NotificationQueue {
    // Delivers at most `max` queued messages to the sink.
    pub fn drain(&mut self, max: usize, sink: &dyn NotificationSink) -> usize {
        let mut delivered = 0;
        while delivered < max {
            match self.rx.try_recv() {
                Ok(message) => {
                    sink.send_chat(message.recipient, &message.text, message.color);
                    delivered += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        delivered
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

pub fn notification_channel() -> (CombatNotifier, NotificationQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CombatNotifier { tx }, NotificationQueue { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface_adapters::memory_host::MemoryHost;

    #[test]
    fn when_more_messages_than_budget_then_rest_waits_for_next_drain() {
        let (notifier, mut queue) = notification_channel();
        let host = MemoryHost::new();
        for recipient in 0..15 {
            notifier.send(CombatMessage::entered_combat(recipient));
        }

        assert_eq!(queue.drain(10, &host), 10);
        assert_eq!(queue.pending(), 5);
        assert_eq!(queue.drain(10, &host), 5);
        assert_eq!(queue.drain(10, &host), 0);

        let chats = host.chats();
        assert_eq!(chats.len(), 15);
        assert_eq!(chats[0].recipient, 0);
        assert_eq!(chats[14].recipient, 14);
    }

    #[test]
    fn when_queue_is_dropped_then_send_reports_failure() {
        let (notifier, queue) = notification_channel();
        drop(queue);

        assert!(!notifier.send(CombatMessage::entered_peace(1)));
    }

    #[tokio::test]
    async fn when_producers_run_on_other_tasks_then_messages_arrive_in_queue() {
        let (notifier, mut queue) = notification_channel();
        let host = MemoryHost::new();

        let mut handles = Vec::new();
        for recipient in 0..4 {
            let notifier = notifier.clone();
            handles.push(tokio::spawn(async move {
                notifier.send(CombatMessage::entered_combat(recipient))
            }));
        }
        for handle in handles {
            assert!(handle.await.expect("producer task"));
        }

        assert_eq!(queue.drain(10, &host), 4);
    }
}
