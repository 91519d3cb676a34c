//! Command-line grammar.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tripstore_core::EntityKind;
use tripstore_executor::Command;

/// In-memory travel store: users, locations and their visits.
#[derive(Debug, Parser)]
#[command(name = "tripstore", version, about)]
pub struct Cli {
    /// Data directory, `.zip`, `.tar` or `.tar.zst` bundle to load at startup
    #[arg(long, value_name = "PATH")]
    pub data: PathBuf,

    /// TOML config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip records that fail admission instead of aborting the load
    #[arg(long)]
    pub lenient: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub action: Action,
}

/// One line typed at the shell prompt.
#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub action: Action,
}

/// Entity collections as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Users,
    Locations,
    Visits,
}

impl From<Kind> for EntityKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Users => EntityKind::User,
            Kind::Locations => EntityKind::Location,
            Kind::Visits => EntityKind::Visit,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Print one record
    Get { kind: Kind, id: i64 },

    /// Create a record from a full JSON object
    Create { kind: Kind, json: String },

    /// Apply a partial update from a JSON object
    Update { kind: Kind, id: i64, json: String },

    /// List a user's visits
    Visits {
        user: i64,
        #[arg(long)]
        from_date: Option<String>,
        #[arg(long)]
        to_date: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        to_distance: Option<String>,
    },

    /// Average mark of a location
    Avg {
        location: i64,
        #[arg(long)]
        from_date: Option<String>,
        #[arg(long)]
        to_date: Option<String>,
        #[arg(long)]
        from_age: Option<String>,
        #[arg(long)]
        to_age: Option<String>,
        #[arg(long)]
        gender: Option<String>,
    },

    /// Read commands from standard input until EOF
    Shell,
}

fn params<const N: usize>(pairs: [(&str, Option<String>); N]) -> Vec<(String, String)> {
    pairs
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
        .collect()
}

impl Action {
    /// The executor command for this action; `None` for `shell`.
    pub fn into_command(self) -> Option<Command> {
        let cmd = match self {
            Action::Get { kind, id } => Command::Get {
                kind: kind.into(),
                id,
            },
            Action::Create { kind, json } => Command::Create {
                kind: kind.into(),
                body: json,
            },
            Action::Update { kind, id, json } => Command::Update {
                kind: kind.into(),
                id,
                body: json,
            },
            Action::Visits {
                user,
                from_date,
                to_date,
                country,
                to_distance,
            } => Command::VisitsForUser {
                user,
                params: params([
                    ("fromDate", from_date),
                    ("toDate", to_date),
                    ("country", country),
                    ("toDistance", to_distance),
                ]),
            },
            Action::Avg {
                location,
                from_date,
                to_date,
                from_age,
                to_age,
                gender,
            } => Command::AverageMark {
                location,
                params: params([
                    ("fromDate", from_date),
                    ("toDate", to_date),
                    ("fromAge", from_age),
                    ("toAge", to_age),
                    ("gender", gender),
                ]),
            },
            Action::Shell => return None,
        };
        Some(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags() {
        let cli = Cli::try_parse_from([
            "tripstore", "--data", "data.tar.zst", "--lenient", "get", "users", "3",
        ])
        .unwrap();
        assert!(cli.lenient);
        assert!(!cli.log_json);
        assert_eq!(
            cli.action.into_command(),
            Some(Command::Get {
                kind: EntityKind::User,
                id: 3
            })
        );
    }

    #[test]
    fn visits_flags_become_params() {
        let line = ShellLine::try_parse_from(["visits", "1", "--country", "Chile", "--to-distance", "20"])
            .unwrap();
        assert_eq!(
            line.action.into_command(),
            Some(Command::VisitsForUser {
                user: 1,
                params: vec![
                    ("country".into(), "Chile".into()),
                    ("toDistance".into(), "20".into())
                ],
            })
        );
    }

    #[test]
    fn avg_keeps_raw_values() {
        let line = ShellLine::try_parse_from(["avg", "4", "--gender", "x", "--from-age", "ten"]).unwrap();
        match line.action.into_command() {
            Some(Command::AverageMark { location, params }) => {
                assert_eq!(location, 4);
                assert_eq!(params.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_kind_and_missing_data() {
        assert!(ShellLine::try_parse_from(["get", "people", "1"]).is_err());
        assert!(Cli::try_parse_from(["tripstore", "get", "users", "1"]).is_err());
        assert!(ShellLine::try_parse_from(["shell"])
            .unwrap()
            .action
            .into_command()
            .is_none());
    }
}
