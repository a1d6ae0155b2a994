//! Type-safe entity identifiers.
//!
//! Every entity gets its own UUID-v4 newtype so a ticket ID can never be
//! passed where a slot ID is expected. All newtypes share the same shape
//! (random constructor, `Display` as the plain UUID, transparent serde).

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wraps an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id! {
    /// Identifier of an [`super::catalog::Experience`].
    ExperienceId
}

entity_id! {
    /// Identifier of an [`super::catalog::ExperienceSlot`].
    SlotId
}

entity_id! {
    /// Identifier of a [`super::catalog::Route`].
    RouteId
}

entity_id! {
    /// Identifier of a [`super::catalog::Contact`].
    ContactId
}

entity_id! {
    /// Identifier of a [`super::ticket::Ticket`].
    TicketId
}

entity_id! {
    /// Identifier of a [`super::deposit::Deposit`].
    DepositId
}

entity_id! {
    /// Identifier of a capacity reservation handle.
    ///
    /// Used by the [`super::capacity::CapacityLedger`] to make `release`
    /// idempotent: a handle that is no longer outstanding is a no-op.
    ReservationId
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(TicketId::new(), TicketId::new());
        assert_ne!(SlotId::new(), SlotId::new());
    }

    #[test]
    fn display_is_uuid_format() {
        let id = TicketId::new();
        let s = format!("{id}");
        assert_eq!(s.len(), 36);
        assert!(s.contains('-'));
    }

    #[test]
    fn serde_round_trip() {
        let id = SlotId::new();
        let json = serde_json::to_string(&id).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        let deserialized: SlotId = serde_json::from_str(&json).ok().unwrap_or_else(|| {
            panic!("deserialization failed");
        });
        assert_eq!(id, deserialized);
    }

    #[test]
    fn from_uuid_round_trip() {
        let uuid = uuid::Uuid::new_v4();
        let id = ContactId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn hash_works_in_hashmap() {
        use std::collections::HashMap;
        let id = ReservationId::new();
        let mut map = HashMap::new();
        map.insert(id, 4u32);
        assert_eq!(map.get(&id), Some(&4));
    }
}
