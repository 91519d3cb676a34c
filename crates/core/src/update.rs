//! Partial updates with three-state fields.
//!
//! A partial update names each field in one of three states:
//!
//! - [`Field::Absent`]: the field was not supplied and stays untouched
//! - [`Field::Null`]: the field was supplied as null; the whole update is rejected
//! - [`Field::Value`]: the field was supplied with a value
//!
//! A supplied value only replaces the stored one when it is not blank (a
//! non-empty string, a non-zero integer). A blank value behaves exactly like
//! an absent field, so a partial update can never set a string to `""` or an
//! integer to `0`.

use crate::error::{StoreError, StoreResult};
use crate::types::{Gender, Location, Record, User, Visit};

/// One field of a partial update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    /// Not supplied.
    #[default]
    Absent,
    /// Supplied as an explicit null.
    Null,
    /// Supplied with a value.
    Value(T),
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Value(value)
    }
}

impl<T: Blank> Field<T> {
    /// True if the field was an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// The value to write, if any.
    ///
    /// Absent, null and blank values all yield `None`.
    pub fn into_effective(self) -> Option<T> {
        match self {
            Field::Value(v) if !v.is_blank() => Some(v),
            _ => None,
        }
    }
}

/// Values that count as "not supplied" when they hold their default.
pub trait Blank {
    /// True for the type's default value.
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Blank for i64 {
    fn is_blank(&self) -> bool {
        *self == 0
    }
}

/// A partial update for one record kind.
pub trait Patch {
    /// The record kind this patch applies to.
    type Target: Record;

    /// Name of the first field supplied as null, if any.
    fn null_field(&self) -> Option<&'static str>;

    /// Merge the patch into a copy of the stored record.
    ///
    /// The caller must have rejected null fields first; the merged record
    /// still has to be revalidated before it is stored.
    fn merge_into(self, target: &mut Self::Target) -> StoreResult<()>;

    /// Reject the patch if any field is an explicit null.
    fn check_nulls(&self) -> StoreResult<()> {
        match self.null_field() {
            Some(field) => Err(StoreError::NullField {
                kind: Self::Target::KIND,
                field,
            }),
            None => Ok(()),
        }
    }
}

fn first_null(fields: &[(&'static str, bool)]) -> Option<&'static str> {
    fields
        .iter()
        .find(|(_, is_null)| *is_null)
        .map(|(name, _)| *name)
}

/// Partial update of a [`User`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// New given name
    pub first_name: Field<String>,
    /// New family name
    pub last_name: Field<String>,
    /// New birth instant
    pub birth_date: Field<i64>,
    /// New gender code, checked when merged
    pub gender: Field<String>,
    /// New email
    pub email: Field<String>,
}

impl Patch for UserPatch {
    type Target = User;

    fn null_field(&self) -> Option<&'static str> {
        first_null(&[
            ("first_name", self.first_name.is_null()),
            ("last_name", self.last_name.is_null()),
            ("birth_date", self.birth_date.is_null()),
            ("gender", self.gender.is_null()),
            ("email", self.email.is_null()),
        ])
    }

    fn merge_into(self, user: &mut User) -> StoreResult<()> {
        if let Some(code) = self.gender.into_effective() {
            user.gender = code.parse::<Gender>().map_err(|_| {
                StoreError::invalid_record(User::KIND, user.id, "gender must be 'm' or 'f'")
            })?;
        }
        if let Some(v) = self.first_name.into_effective() {
            user.first_name = v;
        }
        if let Some(v) = self.last_name.into_effective() {
            user.last_name = v;
        }
        if let Some(v) = self.birth_date.into_effective() {
            user.birth_date = v;
        }
        if let Some(v) = self.email.into_effective() {
            user.email = v;
        }
        Ok(())
    }
}

/// Partial update of a [`Location`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationPatch {
    /// New distance
    pub distance: Field<i64>,
    /// New city
    pub city: Field<String>,
    /// New place
    pub place: Field<String>,
    /// New country
    pub country: Field<String>,
}

impl Patch for LocationPatch {
    type Target = Location;

    fn null_field(&self) -> Option<&'static str> {
        first_null(&[
            ("distance", self.distance.is_null()),
            ("city", self.city.is_null()),
            ("place", self.place.is_null()),
            ("country", self.country.is_null()),
        ])
    }

    fn merge_into(self, location: &mut Location) -> StoreResult<()> {
        if let Some(v) = self.distance.into_effective() {
            location.distance = v;
        }
        if let Some(v) = self.city.into_effective() {
            location.city = v;
        }
        if let Some(v) = self.place.into_effective() {
            location.place = v;
        }
        if let Some(v) = self.country.into_effective() {
            location.country = v;
        }
        Ok(())
    }
}

/// Partial update of a [`Visit`].
///
/// Changing `user` or `location` moves the visit between owners; the store
/// checks that the new owner exists before admitting the merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitPatch {
    /// New owning user
    pub user: Field<i64>,
    /// New location
    pub location: Field<i64>,
    /// New visit instant
    pub visited_at: Field<i64>,
    /// New rating
    pub mark: Field<i64>,
}

impl Patch for VisitPatch {
    type Target = Visit;

    fn null_field(&self) -> Option<&'static str> {
        first_null(&[
            ("user", self.user.is_null()),
            ("location", self.location.is_null()),
            ("visited_at", self.visited_at.is_null()),
            ("mark", self.mark.is_null()),
        ])
    }

    fn merge_into(self, visit: &mut Visit) -> StoreResult<()> {
        if let Some(v) = self.user.into_effective() {
            visit.user = v;
        }
        if let Some(v) = self.location.into_effective() {
            visit.location = v;
        }
        if let Some(v) = self.visited_at.into_effective() {
            visit.visited_at = v;
        }
        if let Some(v) = self.mark.into_effective() {
            visit.mark = v;
        }
        Ok(())
    }
}
