//! Contact wizard
//!
//! A branching conversation that files a contact: people are asked their
//! age, companies their head count, and both end with an email address.

use colloquy::{
    Answers, Branch, ConfigError, EngineConfig, ParticipantId, Session, SessionBuilder,
    SessionText, Step, Validator,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

const EMAIL_PATTERN: &str = r"[^@\s]+@[^@\s]+\.[^@\s]+";

#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid validator pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContactKind {
    Person { age: u8 },
    Company { employees: u64 },
}

/// A filed contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub name: String,
    #[serde(flatten)]
    pub kind: ContactKind,
    pub email: String,
}

impl Contact {
    /// Assemble a contact from the wizard's answers. `None` if a required
    /// answer is missing or does not parse.
    pub fn from_answers(answers: &BTreeMap<String, String>) -> Option<Self> {
        let kind = match answers.get("kind")?.to_ascii_lowercase().as_str() {
            "person" => ContactKind::Person {
                age: answers.get("age")?.parse().ok()?,
            },
            "company" => ContactKind::Company {
                employees: answers.get("employees")?.parse().ok()?,
            },
            _ => return None,
        };

        Some(Self {
            name: answers.get("name")?.clone(),
            kind,
            email: answers.get("email")?.clone(),
        })
    }
}

/// Build the wizard for `participant`. `on_saved` receives the contact when
/// the participant answers every question.
pub fn wizard(
    participant: ParticipantId,
    config: &EngineConfig,
    on_saved: impl FnOnce(Contact) + Send + 'static,
) -> Result<Session, WizardError> {
    let answers = Answers::new();
    let collected = answers.clone();

    let session = SessionBuilder::new(participant)
        .text(SessionText {
            title: "New contact".into(),
            summary: Some("A few questions to file a contact.".into()),
            help: Some("Answer each question on its own line.".into()),
            cancelled: "Contact discarded.".into(),
            completed: "Contact saved.".into(),
        })
        .cancel_token(config.cancel_token.clone())
        .step(
            Step::new("What is the contact's name?")
                .with_id("name")
                .with_validator(Validator::MinLength(2)),
        )
        .step(
            Step::new("Is this a person or a company?")
                .with_id("kind")
                .with_hint("person/company")
                .with_validator(Validator::one_of(["person", "company"]))
                .with_branch(Branch::choices([("person", "age"), ("company", "employees")])),
        )
        .step(
            Step::new("How old are they?")
                .with_id("age")
                .with_validator(Validator::IntegerRange { min: 0, max: 150 })
                .with_branch(Branch::goto("email")),
        )
        .step(
            Step::new("How many employees?")
                .with_id("employees")
                .with_validator(Validator::IntegerRange {
                    min: 1,
                    max: i64::MAX,
                }),
        )
        .step(
            Step::new("What is their email address?")
                .with_id("email")
                .with_validator(Validator::pattern(EMAIL_PATTERN)?)
                .terminal(),
        )
        .handler(answers)
        .on_complete(move || match Contact::from_answers(&collected.snapshot()) {
            Some(contact) => on_saved(contact),
            None => tracing::warn!(
                answers = ?collected.snapshot(),
                "Wizard completed without a usable contact"
            ),
        })
        .build()?;

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy::{Dispatch, OutgoingMessage, SessionRegistry};
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    struct Harness {
        registry: SessionRegistry,
        messages: mpsc::UnboundedReceiver<OutgoingMessage>,
        saved: Arc<Mutex<Option<Contact>>>,
    }

    impl Harness {
        fn start() -> Self {
            let (tx, messages) = mpsc::unbounded_channel();
            let registry = SessionRegistry::new(tx);
            let saved = Arc::new(Mutex::new(None));
            let slot = Arc::clone(&saved);
            let session = wizard(ParticipantId::from("ann"), &EngineConfig::default(), move |c| {
                *slot.lock().unwrap() = Some(c);
            })
            .unwrap();
            assert!(registry.start(session).unwrap());
            Self {
                registry,
                messages,
                saved,
            }
        }

        fn say(&self, text: &str) -> Dispatch {
            self.registry
                .dispatch_input(&ParticipantId::from("ann"), text)
                .unwrap()
        }

        fn texts(&mut self) -> Vec<String> {
            let mut texts = Vec::new();
            while let Ok(m) = self.messages.try_recv() {
                texts.push(m.text.to_plain());
            }
            texts
        }

        fn saved(&self) -> Option<Contact> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[test]
    fn test_person_path_asks_age() {
        let mut h = Harness::start();
        for answer in ["Ann Lee", "Person", "200", "34", "not-an-email", "ann@example.com"] {
            assert_eq!(h.say(answer), Dispatch::Consumed);
        }

        assert_eq!(
            h.saved(),
            Some(Contact {
                name: "Ann Lee".to_string(),
                kind: ContactKind::Person { age: 34 },
                email: "ann@example.com".to_string(),
            })
        );
        let texts = h.texts();
        assert!(texts.contains(&"How old are they?".to_string()));
        assert!(!texts.contains(&"How many employees?".to_string()));
        assert_eq!(texts.last().map(String::as_str), Some("Contact saved."));
        assert_eq!(h.say("more"), Dispatch::Unclaimed);
    }

    #[test]
    fn test_company_path_skips_age() {
        let mut h = Harness::start();
        for answer in ["Acme", "company", "0", "12", "sales@acme.io"] {
            h.say(answer);
        }

        assert_eq!(
            h.saved().map(|c| c.kind),
            Some(ContactKind::Company { employees: 12 })
        );
        assert!(!h.texts().contains(&"How old are they?".to_string()));
    }

    #[test]
    fn test_cancel_discards_contact() {
        let mut h = Harness::start();
        h.say("Ann");
        h.say("cancel");

        assert_eq!(h.saved(), None);
        assert_eq!(h.texts().last().map(String::as_str), Some("Contact discarded."));
        assert!(!h.registry.has_active_session(&ParticipantId::from("ann")));
    }

    #[test]
    fn test_contact_serializes_flat() {
        let contact = Contact {
            name: "Acme".to_string(),
            kind: ContactKind::Company { employees: 3 },
            email: "a@b.co".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&contact).unwrap(),
            serde_json::json!({
                "name": "Acme",
                "kind": "company",
                "employees": 3,
                "email": "a@b.co",
            })
        );
    }

    #[test]
    fn test_from_answers_requires_branch_answer() {
        let answers: BTreeMap<String, String> = [("name", "Ann"), ("kind", "person"), ("email", "a@b.co")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(Contact::from_answers(&answers), None);
    }
}
