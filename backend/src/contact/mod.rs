//! Contact and report submissions.
//!
//! A [`ContactSession`] is opened for one selected record and walks the
//! states `Idle → Sending → Success | Error`. Quota is checked before
//! anything is sent; a blocked submission goes straight to `Error`
//! without a network call. `retry` brings an `Error` back to `Idle`.
//!
//! # Example
//!
//! ```rust,ignore
//! use annuaire::contact::{ContactForm, ContactSession, MessageKind};
//!
//! let mut session = ContactSession::new(record, MessageKind::Contact, gate, relay);
//! session.submit(&ContactForm::new("Paul", "paul@example.org", "Bonjour")).await?;
//! ```

pub mod gate;
pub mod relay;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ContactError, ContactResult};
use crate::logs::log_success;
use crate::models::Record;
use crate::store::StateStore;

pub use gate::{Clock, ManualClock, OutboundMessageGate, QuotaStatus, SystemClock};
pub use relay::{HttpRelay, RelayPayload, RelayTransport};

/// First line of a report message.
pub const REPORT_MARKER: &str = "[SIGNALEMENT D'ERREUR]";

/// Reason line following the report marker.
pub const REPORT_REASON: &str = "Motif : informations erronées dans la fiche";

static EMAIL_SHAPE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

fn looks_like_email(value: &str) -> bool {
    match EMAIL_SHAPE.as_ref() {
        Some(re) => re.is_match(value),
        None => value.contains('@'),
    }
}

/// What the submission is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Write to the person.
    #[default]
    Contact,
    /// Flag wrong data in the record.
    Report,
}

/// Sender-provided fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub sender_name: String,
    pub sender_email: String,
    pub message: String,
}

impl ContactForm {
    pub fn new(sender_name: impl Into<String>, sender_email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.into(),
            sender_email: sender_email.into(),
            message: message.into(),
        }
    }

    /// All fields required, email must look like an address.
    pub fn validate(&self) -> ContactResult<()> {
        if self.sender_name.trim().is_empty() {
            return Err(ContactError::InvalidForm("name is required".into()));
        }
        if self.sender_email.trim().is_empty() {
            return Err(ContactError::InvalidForm("email is required".into()));
        }
        if !looks_like_email(self.sender_email.trim()) {
            return Err(ContactError::InvalidForm(format!("'{}' is not an email address", self.sender_email.trim())));
        }
        if self.message.trim().is_empty() {
            return Err(ContactError::InvalidForm("message is required".into()));
        }
        Ok(())
    }
}

/// Build the relay body for a record.
pub fn build_payload(record: &Record, form: &ContactForm, kind: MessageKind) -> RelayPayload {
    let (message, kind) = match kind {
        MessageKind::Contact => (form.message.clone(), None),
        MessageKind::Report => (
            format!("{}\n{}\n\n{}", REPORT_MARKER, REPORT_REASON, form.message),
            Some("report".to_string()),
        ),
    };

    RelayPayload {
        sender_name: form.sender_name.clone(),
        sender_email: form.sender_email.clone(),
        message,
        alumni_name: record.relay_name(),
        alumni_bac: record.relay_bac().to_string(),
        kind,
    }
}

/// Where a session stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendStatus {
    Idle,
    Sending,
    /// Dispatched without a network error. Delivery is not confirmed.
    Success,
    Error(ContactError),
}

impl SendStatus {
    pub fn name(&self) -> &'static str {
        match self {
            SendStatus::Idle => "idle",
            SendStatus::Sending => "sending",
            SendStatus::Success => "success",
            SendStatus::Error(_) => "error",
        }
    }
}

/// One contact or report dialog for one record.
///
/// Nothing survives the session except what the gate persists.
pub struct ContactSession<S, C, R> {
    record: Record,
    kind: MessageKind,
    gate: OutboundMessageGate<S, C>,
    relay: R,
    status: SendStatus,
}

impl<S: StateStore, C: Clock, R: RelayTransport> ContactSession<S, C, R> {
    pub fn new(record: Record, kind: MessageKind, gate: OutboundMessageGate<S, C>, relay: R) -> Self {
        Self {
            record,
            kind,
            gate,
            relay,
            status: SendStatus::Idle,
        }
    }

    pub fn status(&self) -> &SendStatus {
        &self.status
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Validate, check quota, dispatch, count.
    ///
    /// An invalid form leaves the session `Idle`. A quota or connection
    /// failure moves it to `Error`.
    pub async fn submit(&mut self, form: &ContactForm) -> ContactResult<()> {
        if self.status != SendStatus::Idle {
            return Err(ContactError::InvalidTransition { from: self.status.name() });
        }

        form.validate()?;

        let window = match self.gate.check() {
            Ok(window) => window,
            Err(e) => return Err(self.fail(e)),
        };

        self.status = SendStatus::Sending;
        let payload = build_payload(&self.record, form, self.kind);

        match self.relay.dispatch(&payload).await {
            Ok(()) => {
                self.gate.record_dispatch(window);
                self.status = SendStatus::Success;
                log_success(format!("Message for {} dispatched", self.record.display_name()));
                Ok(())
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Leave `Error` for `Idle`.
    pub fn retry(&mut self) -> ContactResult<()> {
        match self.status {
            SendStatus::Error(_) => {
                self.status = SendStatus::Idle;
                Ok(())
            }
            _ => Err(ContactError::InvalidTransition { from: self.status.name() }),
        }
    }

    /// End the session, returning its final status.
    pub fn close(self) -> SendStatus {
        self.status
    }

    /// Remaining quota as the gate sees it now.
    pub fn quota(&self) -> QuotaStatus {
        self.gate.status()
    }

    fn fail(&mut self, err: ContactError) -> ContactError {
        self.status = SendStatus::Error(err.clone());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::{RelayError, RelayResult};
    use crate::store::MemoryStore;
    use std::sync::Mutex;

    const T0: i64 = 1_700_000_000_000;

    /// Records payloads; fails while `down` is set.
    #[derive(Default)]
    struct FakeRelay {
        sent: Mutex<Vec<RelayPayload>>,
        down: Mutex<bool>,
    }

    impl FakeRelay {
        fn set_down(&self, down: bool) {
            *self.down.lock().unwrap() = down;
        }

        fn sent(&self) -> Vec<RelayPayload> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl RelayTransport for FakeRelay {
        async fn dispatch(&self, payload: &RelayPayload) -> RelayResult<()> {
            if *self.down.lock().unwrap() {
                return Err(RelayError::Transport("dns error".into()));
            }
            self.sent.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    fn record() -> Record {
        Record {
            id: "row-1".into(),
            nom: "Dupont".into(),
            prenom: "Jean".into(),
            bac: "1999".into(),
            ..Record::default()
        }
    }

    fn form() -> ContactForm {
        ContactForm::new("Paul Durand", "paul@example.org", "Bonjour Jean")
    }

    fn session<'a>(
        store: &'a MemoryStore,
        clock: &'a ManualClock,
        relay: &'a FakeRelay,
        kind: MessageKind,
    ) -> ContactSession<&'a MemoryStore, &'a ManualClock, &'a FakeRelay> {
        let gate = OutboundMessageGate::with_clock(store, clock, &Settings::default());
        ContactSession::new(record(), kind, gate, relay)
    }

    #[test]
    fn test_email_shape() {
        assert!(EMAIL_SHAPE.is_some());
        assert!(looks_like_email("paul@example.org"));
        assert!(!looks_like_email("paul@example"));
        assert!(!looks_like_email("paul example@x.org"));
    }

    #[test]
    fn test_form_validation() {
        assert!(form().validate().is_ok());
        assert!(matches!(
            ContactForm::new(" ", "a@b.fr", "x").validate(),
            Err(ContactError::InvalidForm(_))
        ));
        assert!(matches!(
            ContactForm::new("Paul", "not-an-email", "x").validate(),
            Err(ContactError::InvalidForm(_))
        ));
        assert!(matches!(
            ContactForm::new("Paul", "a@b.fr", "").validate(),
            Err(ContactError::InvalidForm(_))
        ));
    }

    #[test]
    fn test_contact_payload() {
        let payload = build_payload(&record(), &form(), MessageKind::Contact);
        assert_eq!(payload.alumni_name, "Dupont Jean");
        assert_eq!(payload.alumni_bac, "1999");
        assert_eq!(payload.message, "Bonjour Jean");
        assert_eq!(payload.kind, None);
    }

    #[test]
    fn test_report_payload_is_marked() {
        let mut unknown_bac = record();
        unknown_bac.bac.clear();

        let payload = build_payload(&unknown_bac, &form(), MessageKind::Report);
        assert_eq!(payload.kind.as_deref(), Some("report"));
        assert!(payload.message.starts_with(REPORT_MARKER));
        assert!(payload.message.contains(REPORT_REASON));
        assert!(payload.message.ends_with("Bonjour Jean"));
        assert_eq!(payload.alumni_bac, "N/A");
    }

    #[tokio::test]
    async fn test_successful_submit() {
        let (store, clock, relay) = (MemoryStore::new(), ManualClock::new(T0), FakeRelay::default());
        let mut session = session(&store, &clock, &relay, MessageKind::Contact);

        session.submit(&form()).await.unwrap();

        assert_eq!(session.status(), &SendStatus::Success);
        assert_eq!(relay.sent().len(), 1);
        assert_eq!(session.quota().count, 1);
        assert_eq!(session.close(), SendStatus::Success);
    }

    #[tokio::test]
    async fn test_invalid_form_stays_idle_and_sends_nothing() {
        let (store, clock, relay) = (MemoryStore::new(), ManualClock::new(T0), FakeRelay::default());
        let mut session = session(&store, &clock, &relay, MessageKind::Contact);

        let result = session.submit(&ContactForm::new("Paul", "", "Salut")).await;

        assert!(matches!(result, Err(ContactError::InvalidForm(_))));
        assert_eq!(session.status(), &SendStatus::Idle);
        assert!(relay.sent().is_empty());
        assert_eq!(store.get("adalc_daily_email_stats").unwrap(), None);
    }

    #[tokio::test]
    async fn test_eleventh_submission_blocked_without_network() {
        let (store, clock, relay) = (MemoryStore::new(), ManualClock::new(T0), FakeRelay::default());

        for _ in 0..10 {
            let mut s = session(&store, &clock, &relay, MessageKind::Contact);
            s.submit(&form()).await.unwrap();
        }

        let mut blocked = session(&store, &clock, &relay, MessageKind::Report);
        let result = blocked.submit(&form()).await;

        assert_eq!(result, Err(ContactError::QuotaExceeded { limit: 10 }));
        assert_eq!(blocked.status(), &SendStatus::Error(ContactError::QuotaExceeded { limit: 10 }));
        assert_eq!(relay.sent().len(), 10);
    }

    #[tokio::test]
    async fn test_connection_failure_then_retry() {
        let (store, clock, relay) = (MemoryStore::new(), ManualClock::new(T0), FakeRelay::default());
        let mut session = session(&store, &clock, &relay, MessageKind::Contact);

        relay.set_down(true);
        let result = session.submit(&form()).await;
        assert!(matches!(result, Err(ContactError::Connection(_))));
        assert_eq!(session.status().name(), "error");
        assert_eq!(session.quota().count, 0);

        session.retry().unwrap();
        assert_eq!(session.status(), &SendStatus::Idle);

        relay.set_down(false);
        session.submit(&form()).await.unwrap();
        assert_eq!(session.status(), &SendStatus::Success);
        assert_eq!(session.quota().count, 1);
    }

    #[tokio::test]
    async fn test_invalid_transitions() {
        let (store, clock, relay) = (MemoryStore::new(), ManualClock::new(T0), FakeRelay::default());
        let mut session = session(&store, &clock, &relay, MessageKind::Contact);

        assert_eq!(session.retry(), Err(ContactError::InvalidTransition { from: "idle" }));

        session.submit(&form()).await.unwrap();
        let again = session.submit(&form()).await;
        assert_eq!(again, Err(ContactError::InvalidTransition { from: "success" }));
        assert_eq!(relay.sent().len(), 1);
    }
}
