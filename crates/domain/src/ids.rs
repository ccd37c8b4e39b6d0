use serde::{Deserialize, Serialize};

use crate::DomainError;

macro_rules! record_id {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub fn new(value: i64) -> Result<Self, DomainError> {
                if value <= 0 {
                    return Err(DomainError::InvalidId {
                        kind: $kind,
                        value,
                    });
                }
                Ok(Self(value))
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(LocationId, "location");
record_id!(SessionId, "session");
record_id!(SnapshotId, "snapshot");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_positive() {
        assert!(SessionId::new(1).is_ok());
        assert!(matches!(
            LocationId::new(0),
            Err(DomainError::InvalidId {
                kind: "location",
                value: 0
            })
        ));
        assert!(SnapshotId::new(-4).is_err());
    }

    #[test]
    fn ids_display_as_plain_numbers() {
        let id = SessionId::new(7).expect("id");
        assert_eq!(id.to_string(), "7");
    }
}
