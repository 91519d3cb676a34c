//! Query parameter parsing.
//!
//! Parameters arrive as `(name, value)` pairs using the wire names
//! (`fromDate`, `toDistance`, ...). An empty value means the filter is not
//! set. Unknown names are ignored. Range checks on the parsed values are left
//! to the engine so they run after the subject has been resolved.

use tripstore_engine::{AverageFilter, VisitFilter};

use crate::{Error, Result};

fn integer(name: &str, value: &str) -> Result<Option<i64>> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i64>()
        .map(Some)
        .map_err(|_| Error::invalid(format!("{} must be an integer, got '{}'", name, value)))
}

fn text(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Build a [`VisitFilter`] from `fromDate`, `toDate`, `country`, `toDistance`.
pub fn visit_filter<'a, I>(params: I) -> Result<VisitFilter>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut filter = VisitFilter::default();
    for (name, value) in params {
        match name {
            "fromDate" => filter.from_date = integer(name, value)?,
            "toDate" => filter.to_date = integer(name, value)?,
            "country" => filter.country = text(value),
            "toDistance" => filter.to_distance = integer(name, value)?,
            _ => {}
        }
    }
    Ok(filter)
}

/// Build an [`AverageFilter`] from `fromDate`, `toDate`, `fromAge`, `toAge`, `gender`.
pub fn average_filter<'a, I>(params: I) -> Result<AverageFilter>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut filter = AverageFilter::default();
    for (name, value) in params {
        match name {
            "fromDate" => filter.from_date = integer(name, value)?,
            "toDate" => filter.to_date = integer(name, value)?,
            "fromAge" => filter.from_age = integer(name, value)?,
            "toAge" => filter.to_age = integer(name, value)?,
            "gender" => filter.gender = text(value),
            _ => {}
        }
    }
    Ok(filter)
}
