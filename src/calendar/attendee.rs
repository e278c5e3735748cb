use serde::{Deserialize, Serialize};

/// A participant of an event. Events only ever read these fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    email: String,
    name: String,
    role: String,
    status: String,
    cutype: String,
}

impl Attendee {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Calendar user type, e.g. `INDIVIDUAL`, `RESOURCE` or `ROOM`.
    pub fn with_cutype(mut self, cutype: impl Into<String>) -> Self {
        self.cutype = cutype.into();
        self
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn cutype(&self) -> &str {
        &self.cutype
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_attendee_only_has_email() {
        let attendee = Attendee::new("alice@example.com");

        assert_eq!(attendee.email(), "alice@example.com");
        assert!(attendee.name().is_empty());
        assert!(attendee.role().is_empty());
        assert!(attendee.status().is_empty());
        assert!(attendee.cutype().is_empty());
    }

    #[test]
    fn builder_sets_all_fields() {
        let attendee = Attendee::new("room-4@example.com")
            .with_name("Room 4")
            .with_role("NON-PARTICIPANT")
            .with_status("ACCEPTED")
            .with_cutype("ROOM");

        assert_eq!(attendee.name(), "Room 4");
        assert_eq!(attendee.role(), "NON-PARTICIPANT");
        assert_eq!(attendee.status(), "ACCEPTED");
        assert_eq!(attendee.cutype(), "ROOM");
    }

    #[test]
    fn attendee_serializes_with_field_names() {
        let attendee = Attendee::new("bob@example.com").with_cutype("INDIVIDUAL");

        let json = serde_json::to_value(&attendee).unwrap();

        assert_eq!(json["email"], "bob@example.com");
        assert_eq!(json["cutype"], "INDIVIDUAL");
    }
}
