use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable identifier for a participant in an event.
///
/// Expenses, payer allocations and splits reference participants by id,
/// never by embedding the participant itself.
///
/// # Examples
///
/// ```
/// use split_engine::core::participant::ParticipantId;
///
/// let alice = ParticipantId::new("alice");
/// let bob = ParticipantId::new("bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A member of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// Display name. Not used by any computation.
    pub name: String,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(id),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_id_equality() {
        assert_eq!(ParticipantId::new("a"), ParticipantId::from("a"));
        assert_ne!(ParticipantId::new("a"), ParticipantId::new("b"));
    }

    #[test]
    fn test_participant_id_serializes_transparently() {
        let json = serde_json::to_string(&ParticipantId::new("carol")).unwrap();
        assert_eq!(json, "\"carol\"");
    }

    #[test]
    fn test_participant_new() {
        let p = Participant::new("d", "Dana");
        assert_eq!(p.id.as_str(), "d");
        assert_eq!(p.name, "Dana");
        assert_eq!(p.id.to_string(), "d");
    }
}
