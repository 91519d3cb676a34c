//! Admission rules shared by create, update and bulk load.
//!
//! These rules only look at the record itself. Whether a visit's user and
//! location exist is checked by the engine, which holds the other stores.

use crate::age::representable;
use crate::error::{StoreError, StoreResult};
use crate::types::{Location, Record, User, Visit};

/// Maximum length of bounded text fields, in characters.
pub const MAX_TEXT_LEN: usize = 50;

/// Lowest allowed visit mark.
pub const MIN_MARK: i64 = 0;
/// Highest allowed visit mark.
pub const MAX_MARK: i64 = 5;

/// Kind-specific admission check.
pub trait Validate: Record {
    /// Check every field rule, returning the first violation.
    fn validate(&self) -> StoreResult<()>;
}

fn positive_id<R: Record>(record: &R) -> StoreResult<()> {
    if record.id() <= 0 {
        return Err(StoreError::invalid_record(
            R::KIND,
            record.id(),
            "id must be positive",
        ));
    }
    Ok(())
}

fn bounded_text<R: Record>(record: &R, field: &str, value: &str) -> StoreResult<()> {
    non_empty(record, field, value)?;
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(StoreError::invalid_record(
            R::KIND,
            record.id(),
            format!("{} longer than {} characters", field, MAX_TEXT_LEN),
        ));
    }
    Ok(())
}

fn non_empty<R: Record>(record: &R, field: &str, value: &str) -> StoreResult<()> {
    if value.is_empty() {
        return Err(StoreError::invalid_record(
            R::KIND,
            record.id(),
            format!("{} is empty", field),
        ));
    }
    Ok(())
}

impl Validate for User {
    fn validate(&self) -> StoreResult<()> {
        positive_id(self)?;
        bounded_text(self, "first_name", &self.first_name)?;
        bounded_text(self, "last_name", &self.last_name)?;
        bounded_text(self, "email", &self.email)?;
        if !representable(self.birth_date) {
            return Err(StoreError::invalid_record(
                Self::KIND,
                self.id,
                "birth_date outside calendar range",
            ));
        }
        Ok(())
    }
}

impl Validate for Location {
    fn validate(&self) -> StoreResult<()> {
        positive_id(self)?;
        if self.distance <= 0 {
            return Err(StoreError::invalid_record(
                Self::KIND,
                self.id,
                "distance must be positive",
            ));
        }
        bounded_text(self, "city", &self.city)?;
        bounded_text(self, "country", &self.country)?;
        non_empty(self, "place", &self.place)?;
        Ok(())
    }
}

impl Validate for Visit {
    fn validate(&self) -> StoreResult<()> {
        positive_id(self)?;
        if self.user <= 0 || self.location <= 0 {
            return Err(StoreError::invalid_record(
                Self::KIND,
                self.id,
                "user and location references must be positive",
            ));
        }
        if !(MIN_MARK..=MAX_MARK).contains(&self.mark) {
            return Err(StoreError::invalid_record(
                Self::KIND,
                self.id,
                format!("mark {} outside {}..={}", self.mark, MIN_MARK, MAX_MARK),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Gender;
    use proptest::prelude::*;

    fn user() -> User {
        User {
            id: 1,
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            birth_date: -627350400,
            gender: Gender::Female,
            email: "ann@example.com".to_string(),
        }
    }

    fn location() -> Location {
        Location {
            id: 1,
            distance: 10,
            city: "Oslo".to_string(),
            place: "Museum".to_string(),
            country: "Norway".to_string(),
        }
    }

    #[test]
    fn valid_records_pass() {
        user().validate().unwrap();
        location().validate().unwrap();
        Visit {
            id: 1,
            user: 1,
            location: 1,
            visited_at: -3,
            mark: 0,
        }
        .validate()
        .unwrap();
    }

    #[test]
    fn non_positive_ids_rejected() {
        let mut u = user();
        u.id = 0;
        assert!(u.validate().is_err());
        u.id = -4;
        assert!(u.validate().is_err());
    }

    #[test]
    fn empty_strings_rejected() {
        let mut u = user();
        u.last_name.clear();
        assert!(u.validate().is_err());

        let mut l = location();
        l.place.clear();
        assert!(l.validate().is_err());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut l = location();
        // 25 two-byte characters: 50 bytes, 25 chars
        l.country = "Ж".repeat(25);
        l.validate().unwrap();
        l.country = "Ж".repeat(51);
        assert!(l.validate().is_err());
    }

    #[test]
    fn email_bound_is_inclusive() {
        let mut u = user();
        u.email = "a".repeat(MAX_TEXT_LEN);
        u.validate().unwrap();
        u.email.push('a');
        assert!(u.validate().is_err());
    }

    #[test]
    fn place_has_no_upper_bound() {
        let mut l = location();
        l.place = "p".repeat(200);
        l.validate().unwrap();
    }

    #[test]
    fn distance_must_be_positive() {
        let mut l = location();
        l.distance = 0;
        assert!(l.validate().is_err());
    }

    proptest! {
        #[test]
        fn mark_range_enforced(mark in -20i64..20) {
            let v = Visit { id: 1, user: 1, location: 1, visited_at: 0, mark };
            prop_assert_eq!(v.validate().is_ok(), (0..=5).contains(&mark));
        }
    }
}
