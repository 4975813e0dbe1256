//! Completion notices: observers that hear about finished tasks.
//!
//! Observers run synchronously, in the order they were attached to a task,
//! right after the task's effect has been applied. Delivery itself goes
//! through a [`Transport`], which lives outside the core.

use tracing::info;

use crate::model::TaskView;

/// A notification could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to notify {recipient}: {reason}")]
pub struct TransportError {
    pub recipient: String,
    pub reason: String,
}

/// Delivers a message to a recipient.
pub trait Transport {
    fn send(&self, message: &str, recipient: &str) -> Result<(), TransportError>;
}

/// Hears about every task it is attached to once the task is done.
pub trait Observer {
    fn notify(&self, task: &TaskView<'_>) -> Result<(), TransportError>;
}

/// A message bound for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub recipient: String,
}

impl Notification {
    /// The completion notice for a task: its key message and amount.
    pub fn for_task(task: &TaskView<'_>, recipient: impl Into<String>) -> Self {
        Self {
            message: format!("{} - {}", task.key_message(), task.amount()),
            recipient: recipient.into(),
        }
    }
}

/// Sends a completion notice to a fixed recipient over a transport.
#[derive(Debug)]
pub struct ChannelObserver<T> {
    recipient: String,
    transport: T,
}

impl<T: Transport> ChannelObserver<T> {
    pub fn new(recipient: impl Into<String>, transport: T) -> Self {
        Self {
            recipient: recipient.into(),
            transport,
        }
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }
}

impl<T: Transport> Observer for ChannelObserver<T> {
    fn notify(&self, task: &TaskView<'_>) -> Result<(), TransportError> {
        let notification = Notification::for_task(task, &self.recipient);
        self.transport
            .send(&notification.message, &notification.recipient)
    }
}

/// Transport that writes every message to the log instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

impl Transport for LogTransport {
    fn send(&self, message: &str, recipient: &str) -> Result<(), TransportError> {
        info!(recipient, message, "notification sent");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::model::{Deposit, Person, PersonId, Task};

    /// Transport that keeps what it was asked to send.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct RecordingTransport {
        pub(crate) sent: Rc<RefCell<Vec<Notification>>>,
    }

    impl Transport for RecordingTransport {
        fn send(&self, message: &str, recipient: &str) -> Result<(), TransportError> {
            self.sent.borrow_mut().push(Notification {
                message: message.to_string(),
                recipient: recipient.to_string(),
            });
            Ok(())
        }
    }

    /// Transport whose line is always down.
    #[derive(Debug, Clone, Copy, Default)]
    pub(crate) struct BrokenTransport;

    impl Transport for BrokenTransport {
        fn send(&self, _message: &str, recipient: &str) -> Result<(), TransportError> {
            Err(TransportError {
                recipient: recipient.to_string(),
                reason: "line is down".into(),
            })
        }
    }

    #[test]
    fn sends_key_message_and_amount() {
        let transport = RecordingTransport::default();
        let observer = ChannelObserver::new("0303456", transport.clone());

        let task = Task::collect_money(PersonId(0));
        let person = Person::new(10_000.0);
        observer.notify(&TaskView::new(&task, &person)).unwrap();

        let sent = transport.sent.borrow();
        assert_eq!(
            *sent,
            vec![Notification {
                message: "La puerca está en la posilga - 1000".into(),
                recipient: "0303456".into(),
            }]
        );
    }

    #[test]
    fn blank_key_message_keeps_the_separator() {
        let task = Task::open_deposit(PersonId(0), Deposit::new(2));
        let person = Person::default();
        let notification = Notification::for_task(&TaskView::new(&task, &person), "x");

        assert_eq!(notification.message, "  - 200");
    }

    #[test]
    fn transport_errors_reach_the_caller() {
        let observer = ChannelObserver::new("0303456", BrokenTransport);
        let task = Task::lend_money(PersonId(0), 10.0);
        let person = Person::default();

        let err = observer.notify(&TaskView::new(&task, &person)).unwrap_err();
        assert_eq!(err.recipient, "0303456");
    }
}
