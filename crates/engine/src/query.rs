//! The two analytical queries.
//!
//! - [`Database::visits_for_user`]: a user's visits, filtered and ordered by time
//! - [`Database::average_mark`]: a location's mean mark, filtered by date and visitor
//!
//! Both resolve their subject first (NotFound), then check filter values
//! (BadRequest), then walk the subject's owner set in the relation index. An
//! index entry that does not resolve to a stored record is reported as an
//! inconsistency instead of being skipped.

use std::fmt;

use serde::Serialize;
use tripstore_core::{
    EntityKind, Gender, StoreError, StoreResult, Visit, VisitId, MAX_TEXT_LEN,
};
use tripstore_storage::Dimension;

use crate::database::Database;

/// Filters for [`Database::visits_for_user`]. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitFilter {
    /// Keep visits with `visited_at >= from_date`.
    pub from_date: Option<i64>,
    /// Keep visits with `visited_at <= to_date`.
    pub to_date: Option<i64>,
    /// Keep visits whose location is in exactly this country.
    pub country: Option<String>,
    /// Keep visits whose location is strictly closer than this.
    pub to_distance: Option<i64>,
}

impl VisitFilter {
    /// Reject out-of-range filter values.
    pub fn validate(&self) -> StoreResult<()> {
        if let Some(country) = &self.country {
            if country.chars().count() > MAX_TEXT_LEN {
                return Err(StoreError::invalid_input(format!(
                    "country longer than {} characters",
                    MAX_TEXT_LEN
                )));
            }
        }
        if let Some(distance) = self.to_distance {
            if distance < 0 {
                return Err(StoreError::invalid_input("toDistance must not be negative"));
            }
        }
        Ok(())
    }

    fn keeps_date(&self, visited_at: i64) -> bool {
        self.from_date.map_or(true, |from| visited_at >= from)
            && self.to_date.map_or(true, |to| visited_at <= to)
    }
}

/// Filters for [`Database::average_mark`]. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AverageFilter {
    /// Keep visits with `visited_at >= from_date`.
    pub from_date: Option<i64>,
    /// Keep visits with `visited_at <= to_date`.
    pub to_date: Option<i64>,
    /// Keep visitors at least this old.
    pub from_age: Option<i64>,
    /// Keep visitors strictly younger than this.
    pub to_age: Option<i64>,
    /// Keep visitors with this gender code (`m` or `f`).
    pub gender: Option<String>,
}

impl AverageFilter {
    /// Reject out-of-range filter values and resolve the gender code.
    pub fn validate(&self) -> StoreResult<Option<Gender>> {
        self.gender.as_deref().map(str::parse::<Gender>).transpose()
    }

    fn keeps_date(&self, visited_at: i64) -> bool {
        self.from_date.map_or(true, |from| visited_at >= from)
            && self.to_date.map_or(true, |to| visited_at <= to)
    }

    fn keeps_age(&self, age: i64) -> bool {
        self.from_age.map_or(true, |from| age >= from) && self.to_age.map_or(true, |to| age < to)
    }
}

/// One row of a user's visit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserVisit {
    /// Mark given on the visit
    pub mark: i64,
    /// When the visit happened
    pub visited_at: i64,
    /// Name of the visited place
    pub place: String,
}

/// Sum and count of the marks that matched an average query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AverageMark {
    /// Sum of matched marks
    pub sum: i64,
    /// Number of matched visits
    pub count: usize,
}

impl AverageMark {
    /// Number of fractional digits in the formatted mean.
    pub const PRECISION: usize = 5;

    /// Arithmetic mean of the matched marks; 0 when nothing matched.
    pub fn value(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum as f64 / self.count as f64
    }

    fn push(&mut self, mark: i64) {
        self.sum += mark;
        self.count += 1;
    }
}

impl fmt::Display for AverageMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", Self::PRECISION, self.value())
    }
}

impl Database {
    /// A user's visits that pass every filter, ordered by `visited_at` and
    /// then by visit id.
    ///
    /// Returns an empty list when nothing matches.
    pub fn visits_for_user(&self, user_id: i64, filter: &VisitFilter) -> StoreResult<Vec<UserVisit>> {
        let (visits, locations, users, relations) = self.stores();
        let visits = visits.read();
        let locations = locations.read();
        let users = users.read();

        users.lookup(user_id)?;
        filter.validate()?;

        let links = relations.read(Dimension::User);
        let mut rows: Vec<(i64, VisitId, UserVisit)> = Vec::new();
        for visit_id in links.visits_of(user_id) {
            let visit = resolve_visit(visits.get(visit_id), EntityKind::User, user_id, visit_id)?;
            let location = locations.get(visit.location).ok_or_else(|| {
                StoreError::Inconsistent {
                    kind: EntityKind::Location,
                    id: visit.location,
                    reason: format!("referenced by visit {}", visit.id),
                }
            })?;

            if !filter.keeps_date(visit.visited_at) {
                continue;
            }
            if filter
                .country
                .as_deref()
                .is_some_and(|country| country != location.country)
            {
                continue;
            }
            if filter
                .to_distance
                .is_some_and(|limit| location.distance >= limit)
            {
                continue;
            }

            rows.push((
                visit.visited_at,
                visit.id,
                UserVisit {
                    mark: visit.mark,
                    visited_at: visit.visited_at,
                    place: location.place.clone(),
                },
            ));
        }

        rows.sort_unstable_by_key(|(visited_at, id, _)| (*visited_at, *id));
        Ok(rows.into_iter().map(|(_, _, row)| row).collect())
    }

    /// Mean mark of a location's visits that pass every filter.
    ///
    /// Visitor age is measured against the database's reference instant.
    /// Formats as `0.00000` when nothing matches.
    pub fn average_mark(&self, location_id: i64, filter: &AverageFilter) -> StoreResult<AverageMark> {
        let (visits, locations, users, relations) = self.stores();
        let visits = visits.read();
        let locations = locations.read();
        let users = users.read();

        locations.lookup(location_id)?;
        let gender = filter.validate()?;
        let reference = self.reference_instant();

        let links = relations.read(Dimension::Location);
        let mut average = AverageMark::default();
        for visit_id in links.visits_of(location_id) {
            let visit = resolve_visit(
                visits.get(visit_id),
                EntityKind::Location,
                location_id,
                visit_id,
            )?;
            let user = users.get(visit.user).ok_or_else(|| StoreError::Inconsistent {
                kind: EntityKind::User,
                id: visit.user,
                reason: format!("referenced by visit {}", visit.id),
            })?;

            if !filter.keeps_date(visit.visited_at) {
                continue;
            }
            if gender.is_some_and(|g| g != user.gender) {
                continue;
            }
            if filter.from_age.is_some() || filter.to_age.is_some() {
                let age = reference
                    .age_of(user.birth_date)
                    .ok_or_else(|| StoreError::invalid_record(
                        EntityKind::User,
                        user.id,
                        "birth_date outside calendar range",
                    ))?;
                if !filter.keeps_age(age) {
                    continue;
                }
            }

            average.push(visit.mark);
        }

        Ok(average)
    }
}

fn resolve_visit(
    visit: Option<&Visit>,
    owner_kind: EntityKind,
    owner: i64,
    visit_id: VisitId,
) -> StoreResult<&Visit> {
    visit.ok_or_else(|| StoreError::Inconsistent {
        kind: EntityKind::Visit,
        id: visit_id,
        reason: format!("indexed under {} {}", owner_kind, owner),
    })
}
