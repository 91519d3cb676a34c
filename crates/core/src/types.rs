//! Entity types stored by tripstore.
//!
//! Three entity kinds are linked by id: a [`Visit`] belongs to exactly one
//! [`User`] and one [`Location`]. Ids are positive and never change once a
//! record is admitted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Identifier of a user record.
pub type UserId = i64;
/// Identifier of a location record.
pub type LocationId = i64;
/// Identifier of a visit record.
pub type VisitId = i64;

/// The three entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A person with a birth date and gender.
    User,
    /// A place with a distance, city and country.
    Location,
    /// A rated visit of a user to a location.
    Visit,
}

impl EntityKind {
    /// All kinds, in load admission order.
    pub const ALL: [EntityKind; 3] = [EntityKind::Location, EntityKind::User, EntityKind::Visit];

    /// Plural collection name, as used in bulk-load file names and routes.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Location => "locations",
            EntityKind::Visit => "visits",
        }
    }

    /// Parse a plural collection name.
    pub fn from_collection(name: &str) -> Option<Self> {
        match name {
            "users" => Some(EntityKind::User),
            "locations" => Some(EntityKind::Location),
            "visits" => Some(EntityKind::Visit),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Location => "location",
            EntityKind::Visit => "visit",
        };
        f.write_str(name)
    }
}

/// Gender of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male
    #[serde(rename = "m")]
    Male,
    /// Female
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    /// Single-letter wire code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "m",
            Gender::Female => "f",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(Gender::Male),
            "f" => Ok(Gender::Female),
            other => Err(StoreError::invalid_input(format!(
                "gender must be 'm' or 'f', got '{}'",
                other
            ))),
        }
    }
}

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique positive id
    pub id: UserId,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Birth instant in signed epoch seconds
    pub birth_date: i64,
    /// Gender
    pub gender: Gender,
    /// Contact email, at most 50 characters
    pub email: String,
}

/// A location record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Unique positive id
    pub id: LocationId,
    /// Distance from the city centre, positive
    pub distance: i64,
    /// City name
    pub city: String,
    /// Name of the place itself
    pub place: String,
    /// Country name
    pub country: String,
}

/// A visit record linking a user to a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    /// Unique positive id
    pub id: VisitId,
    /// Owning user
    pub user: UserId,
    /// Visited location
    pub location: LocationId,
    /// When the visit happened
    pub visited_at: i64,
    /// Rating from 0 to 5
    pub mark: i64,
}

/// A stored entity, addressable by integer id.
pub trait Record: Clone + Send + Sync + 'static {
    /// Which kind this record is.
    const KIND: EntityKind;

    /// The record's id.
    fn id(&self) -> i64;
}

impl Record for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for Location {
    const KIND: EntityKind = EntityKind::Location;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for Visit {
    const KIND: EntityKind = EntityKind::Visit;

    fn id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_collection(kind.collection()), Some(kind));
        }
        assert_eq!(EntityKind::from_collection("user"), None);
    }

    #[test]
    fn gender_parses_only_single_letter_codes() {
        assert_eq!("m".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("f".parse::<Gender>().unwrap(), Gender::Female);
        assert!("x".parse::<Gender>().is_err());
        assert!("".parse::<Gender>().is_err());
        assert!("F".parse::<Gender>().is_err());
    }

    #[test]
    fn user_json_shape() {
        let json = r#"{"first_name": "Zlata", "last_name": "Kisatovich", "birth_date": -627350400, "gender": "f", "id": 1, "email": "coorzaty@me.com"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.birth_date, -627350400);
        assert_eq!(user.gender, Gender::Female);

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["gender"], "f");
        assert_eq!(back["first_name"], "Zlata");
    }

    #[test]
    fn visit_json_shape() {
        let json = r#"{"user": 42, "location": 13, "visited_at": 1123175509, "id": 1, "mark": 4}"#;
        let visit: Visit = serde_json::from_str(json).unwrap();
        assert_eq!(visit.user, 42);
        assert_eq!(visit.location, 13);
        assert_eq!(visit.mark, 4);
    }

    #[test]
    fn kind_display_is_singular() {
        assert_eq!(EntityKind::Visit.to_string(), "visit");
        assert_eq!(User::KIND, EntityKind::User);
    }
}
