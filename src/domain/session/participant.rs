//! Participant entity - one member of the rating group.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ParticipantId;

use super::SessionError;

/// A roster member. Roster order is turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Round-scoped: set when the participant ends their turn.
    pub has_completed: bool,
}

impl Participant {
    /// Creates a participant with a trimmed, non-empty name.
    pub fn new(name: impl AsRef<str>) -> Result<Self, SessionError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }

        Ok(Self {
            id: ParticipantId::new(),
            name: name.to_string(),
            has_completed: false,
        })
    }

    /// Case-insensitive name comparison used for duplicate detection.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_name() {
        let p = Participant::new("  Ana ").unwrap();
        assert_eq!(p.name, "Ana");
        assert!(!p.has_completed);
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(Participant::new("   "), Err(SessionError::EmptyName));
    }

    #[test]
    fn has_name_ignores_case() {
        let p = Participant::new("Ben").unwrap();
        assert!(p.has_name(" ben"));
        assert!(!p.has_name("Bent"));
    }
}
