//! Best-effort email notification dispatch.
//!
//! Workflow operations publish [`TicketEvent`]s; the [`Dispatcher`] here
//! renders them into emails and hands them to a [`Mailer`]. Delivery is
//! at-most-one-attempt and failure is reported, never raised: a broken mail
//! transport must not fail the ticket mutation that triggered it.
//!
//! [`TicketEvent`]: ticket_core::TicketEvent

mod dispatcher;
mod http;
mod mailer;
mod templates;

pub use dispatcher::{Dispatcher, DEFAULT_OPS_ADDRESS};
pub use http::{HttpMailer, MailerConfig};
pub use mailer::{EmailPayload, LoggingMailer, Mailer, NoOpMailer, NotifyError, RecordingMailer};
