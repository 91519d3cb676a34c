use serde::Serialize;
use tripstore_core::{Location, User, Visit};
use tripstore_engine::{AverageMark, UserVisit};

use crate::{Error, Result};

/// Result of a successful command.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// A full user record
    User(User),
    /// A full location record
    Location(Location),
    /// A full visit record
    Visit(Visit),
    /// Rows of a user's visit history
    Visits(Vec<UserVisit>),
    /// A location's mean mark
    Average(AverageMark),
    /// Create or update succeeded
    Ack,
}

#[derive(Serialize)]
struct VisitsBody<'a> {
    visits: &'a [UserVisit],
}

impl Output {
    /// Render as a JSON document.
    ///
    /// The average is written with exactly five fractional digits
    /// (`{"avg":3.50000}`), which a float serializer would not preserve.
    pub fn to_json(&self) -> Result<String> {
        let rendered = match self {
            Output::User(user) => serde_json::to_string(user),
            Output::Location(location) => serde_json::to_string(location),
            Output::Visit(visit) => serde_json::to_string(visit),
            Output::Visits(rows) => serde_json::to_string(&VisitsBody { visits: rows }),
            Output::Average(avg) => return Ok(format!("{{\"avg\":{}}}", avg)),
            Output::Ack => return Ok("{}".to_string()),
        };
        rendered.map_err(|e| Error::Internal {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_keeps_five_digits() {
        let out = Output::Average(AverageMark { sum: 7, count: 2 });
        assert_eq!(out.to_json().unwrap(), r#"{"avg":3.50000}"#);
        let out = Output::Average(AverageMark::default());
        assert_eq!(out.to_json().unwrap(), r#"{"avg":0.00000}"#);
    }

    #[test]
    fn visits_are_wrapped() {
        let out = Output::Visits(vec![UserVisit {
            mark: 4,
            visited_at: 100,
            place: "P".into(),
        }]);
        assert_eq!(
            out.to_json().unwrap(),
            r#"{"visits":[{"mark":4,"visited_at":100,"place":"P"}]}"#
        );
        assert_eq!(Output::Visits(vec![]).to_json().unwrap(), r#"{"visits":[]}"#);
        assert_eq!(Output::Ack.to_json().unwrap(), "{}");
    }
}
