//! Bulk loading from a data bundle.
//!
//! A bundle is a directory, a `.zip` archive, a `.tar` archive, or a
//! zstd-compressed `.tar.zst` archive of JSON files named
//! `<collection>_<n>.json`:
//!
//! ```text
//! users_1.json      {"users": [{"id": 1, "first_name": ...}, ...]}
//! locations_1.json  {"locations": [...]}
//! visits_1.json     {"visits": [...]}
//! ```
//!
//! Every file is parsed and staged before anything is admitted. Records are
//! then admitted kind by kind (locations, users, visits) through the same
//! validation as a create, so visit references are checked against complete
//! owner tables regardless of file order.
//!
//! Loading runs before the database is shared. Any [`LoadError`] means the
//! database must not be served.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Deserialize;
use thiserror::Error;
use tripstore_core::{EntityKind, Location, Record, StoreError, StoreResult, User, Visit};

use crate::config::LoadPolicy;
use crate::database::Database;

/// Errors that abort a bulk load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A file or archive could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A data file is not the expected JSON shape.
    #[error("malformed data file {file}: {source}")]
    Json {
        /// File name inside the bundle
        file: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// A `.zip` archive could not be read.
    #[error("failed to read zip archive {}: {source}", path.display())]
    Zip {
        /// Archive being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: zip::result::ZipError,
    },

    /// A `.json` file whose name does not start with a known collection.
    #[error("unrecognised data file {0}")]
    UnknownFile(String),

    /// The path is neither a directory nor a supported archive.
    #[error("unsupported data source {}", .0.display())]
    UnsupportedSource(PathBuf),

    /// A record failed admission under the strict policy.
    #[error("rejected {kind} {id}: {source}")]
    Rejected {
        /// Kind of the record
        kind: EntityKind,
        /// Id of the record
        id: i64,
        /// Why it was rejected
        #[source]
        source: StoreError,
    },
}

/// Counts of what a load admitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Users admitted
    pub users: usize,
    /// Locations admitted
    pub locations: usize,
    /// Visits admitted
    pub visits: usize,
    /// Records or files skipped under the lenient policy
    pub skipped: usize,
}

#[derive(Deserialize)]
struct UsersFile {
    users: Vec<User>,
}

#[derive(Deserialize)]
struct LocationsFile {
    locations: Vec<Location>,
}

#[derive(Deserialize)]
struct VisitsFile {
    visits: Vec<Visit>,
}

#[derive(Default)]
struct Staged {
    users: Vec<User>,
    locations: Vec<Location>,
    visits: Vec<Visit>,
}

/// Populates a [`Database`] from a data bundle.
pub struct Loader<'a> {
    db: &'a Database,
    policy: LoadPolicy,
}

impl<'a> Loader<'a> {
    /// Create a loader using the database's configured load policy.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            policy: db.config().load_policy,
        }
    }

    /// Override the load policy.
    pub fn policy(mut self, policy: LoadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Load every data file under `path`.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadReport, LoadError> {
        let path = path.as_ref();
        let started = Instant::now();
        let mut report = LoadReport::default();
        let mut staged = Staged::default();

        if path.is_dir() {
            self.stage_dir(path, &mut staged, &mut report)?;
        } else {
            let name = path.to_string_lossy();
            let file = File::open(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
                let decoder = zstd::stream::read::Decoder::new(file).map_err(|source| {
                    LoadError::Io {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                self.stage_tar(path, decoder, &mut staged, &mut report)?;
            } else if name.ends_with(".zip") {
                self.stage_zip(path, file, &mut staged, &mut report)?;
            } else if name.ends_with(".tar") {
                self.stage_tar(path, file, &mut staged, &mut report)?;
            } else {
                return Err(LoadError::UnsupportedSource(path.to_path_buf()));
            }
        }

        self.admit(staged, &mut report)?;

        tracing::info!(
            source = %path.display(),
            users = report.users,
            locations = report.locations,
            visits = report.visits,
            skipped = report.skipped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "bulk load complete"
        );
        Ok(report)
    }

    fn stage_dir(
        &self,
        dir: &Path,
        staged: &mut Staged,
        report: &mut LoadReport,
    ) -> Result<(), LoadError> {
        let io_err = |source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(io_err)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()
            .map_err(io_err)?;
        paths.sort();

        for path in paths.into_iter().filter(|p| p.is_file()) {
            let name = file_name(&path);
            let bytes = std::fs::read(&path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            self.stage_file(&name, &bytes, staged, report)?;
        }
        Ok(())
    }

    fn stage_tar<R: Read>(
        &self,
        archive_path: &Path,
        reader: R,
        staged: &mut Staged,
        report: &mut LoadReport,
    ) -> Result<(), LoadError> {
        let io_err = |source| LoadError::Io {
            path: archive_path.to_path_buf(),
            source,
        };
        let mut archive = tar::Archive::new(reader);
        for entry in archive.entries().map_err(io_err)? {
            let mut entry = entry.map_err(io_err)?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let name = file_name(&entry.path().map_err(io_err)?);
            // header sizes are untrusted; let the buffer grow as data arrives
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).map_err(io_err)?;
            self.stage_file(&name, &bytes, staged, report)?;
        }
        Ok(())
    }

    fn stage_zip(
        &self,
        archive_path: &Path,
        file: File,
        staged: &mut Staged,
        report: &mut LoadReport,
    ) -> Result<(), LoadError> {
        let zip_err = |source| LoadError::Zip {
            path: archive_path.to_path_buf(),
            source,
        };
        let mut archive = zip::ZipArchive::new(file).map_err(zip_err)?;
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(zip_err)?;
            if !entry.is_file() {
                continue;
            }
            let name = file_name(Path::new(entry.name()));
            let mut bytes = Vec::new();
            entry
                .read_to_end(&mut bytes)
                .map_err(|source| LoadError::Io {
                    path: archive_path.to_path_buf(),
                    source,
                })?;
            self.stage_file(&name, &bytes, staged, report)?;
        }
        Ok(())
    }

    fn stage_file(
        &self,
        name: &str,
        bytes: &[u8],
        staged: &mut Staged,
        report: &mut LoadReport,
    ) -> Result<(), LoadError> {
        let Some(stem) = name.strip_suffix(".json") else {
            return Ok(());
        };
        let prefix = stem.split('_').next().unwrap_or(stem);
        let json_err = |source| LoadError::Json {
            file: name.to_string(),
            source,
        };

        match EntityKind::from_collection(prefix) {
            Some(EntityKind::User) => {
                let file: UsersFile = serde_json::from_slice(bytes).map_err(json_err)?;
                staged.users.extend(file.users);
            }
            Some(EntityKind::Location) => {
                let file: LocationsFile = serde_json::from_slice(bytes).map_err(json_err)?;
                staged.locations.extend(file.locations);
            }
            Some(EntityKind::Visit) => {
                let file: VisitsFile = serde_json::from_slice(bytes).map_err(json_err)?;
                staged.visits.extend(file.visits);
            }
            None => match self.policy {
                LoadPolicy::Strict => return Err(LoadError::UnknownFile(name.to_string())),
                LoadPolicy::Lenient => {
                    tracing::warn!(file = name, "skipping unrecognised data file");
                    report.skipped += 1;
                }
            },
        }
        Ok(())
    }

    fn admit(&self, staged: Staged, report: &mut LoadReport) -> Result<(), LoadError> {
        for location in staged.locations {
            if self.admit_one(location, |r| self.db.create_location(r), report)? {
                report.locations += 1;
            }
        }
        for user in staged.users {
            if self.admit_one(user, |r| self.db.create_user(r), report)? {
                report.users += 1;
            }
        }
        for visit in staged.visits {
            if self.admit_one(visit, |r| self.db.create_visit(r), report)? {
                report.visits += 1;
            }
        }
        Ok(())
    }

    /// Returns whether the record was admitted.
    fn admit_one<R: Record>(
        &self,
        record: R,
        create: impl FnOnce(R) -> StoreResult<()>,
        report: &mut LoadReport,
    ) -> Result<bool, LoadError> {
        let (kind, id) = (R::KIND, record.id());
        match create(record) {
            Ok(()) => Ok(true),
            Err(source) => match self.policy {
                LoadPolicy::Strict => Err(LoadError::Rejected { kind, id, source }),
                LoadPolicy::Lenient => {
                    tracing::warn!(kind = %kind, id, error = %source, "skipping rejected record");
                    report.skipped += 1;
                    Ok(false)
                }
            },
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use tempfile::TempDir;

    const USERS: &str = r#"{"users": [
        {"id": 1, "first_name": "Ann", "last_name": "Lee", "birth_date": -627350400, "gender": "f", "email": "ann@example.com"},
        {"id": 2, "first_name": "Bo", "last_name": "Kim", "birth_date": 0, "gender": "m", "email": "bo@example.com"}
    ]}"#;
    const LOCATIONS: &str = r#"{"locations": [
        {"id": 1, "distance": 9, "city": "Oslo", "place": "Museum", "country": "Norway"}
    ]}"#;
    const VISITS: &str = r#"{"visits": [
        {"id": 1, "user": 1, "location": 1, "visited_at": 100, "mark": 4},
        {"id": 2, "user": 2, "location": 1, "visited_at": 200, "mark": 2}
    ]}"#;

    fn write(dir: &TempDir, name: &str, body: &str) {
        std::fs::write(dir.path().join(name), body).unwrap();
    }

    #[test]
    fn loads_directory_regardless_of_file_order() {
        let dir = TempDir::new().unwrap();
        // visits sort before users, so owners must be staged first
        write(&dir, "visits_1.json", VISITS);
        write(&dir, "users_1.json", USERS);
        write(&dir, "locations_1.json", LOCATIONS);
        write(&dir, "options.txt", "ignored");

        let db = Database::new();
        let report = Loader::new(&db).load_path(dir.path()).unwrap();
        assert_eq!(
            report,
            LoadReport {
                users: 2,
                locations: 1,
                visits: 2,
                skipped: 0
            }
        );
        assert_eq!(db.visits_of_location(1), vec![1, 2]);
        assert_eq!(db.visits_of_user(2), vec![2]);
        db.check_consistency().unwrap();
    }

    #[test]
    fn strict_policy_aborts_on_dangling_reference() {
        let dir = TempDir::new().unwrap();
        write(&dir, "users_1.json", USERS);
        write(&dir, "locations_1.json", LOCATIONS);
        write(
            &dir,
            "visits_1.json",
            r#"{"visits": [{"id": 1, "user": 9, "location": 1, "visited_at": 1, "mark": 1}]}"#,
        );

        let db = Database::new();
        let err = Loader::new(&db).load_path(dir.path()).unwrap_err();
        match err {
            LoadError::Rejected { kind, id, .. } => {
                assert_eq!(kind, EntityKind::Visit);
                assert_eq!(id, 1);
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn lenient_policy_skips_and_counts() {
        let dir = TempDir::new().unwrap();
        write(&dir, "users_1.json", USERS);
        write(&dir, "locations_1.json", LOCATIONS);
        write(
            &dir,
            "visits_1.json",
            r#"{"visits": [
                {"id": 1, "user": 9, "location": 1, "visited_at": 1, "mark": 1},
                {"id": 2, "user": 1, "location": 1, "visited_at": 1, "mark": 9},
                {"id": 3, "user": 1, "location": 1, "visited_at": 1, "mark": 5}
            ]}"#,
        );
        write(&dir, "options_1.json", "{}");

        let db = Database::with_config(StoreConfig::new().load_policy(LoadPolicy::Lenient)).unwrap();
        let report = Loader::new(&db).load_path(dir.path()).unwrap();
        assert_eq!(report.visits, 1);
        assert_eq!(report.skipped, 3);
        assert_eq!(db.visits_of_user(1), vec![3]);
        db.check_consistency().unwrap();
    }

    #[test]
    fn duplicate_ids_rejected_in_strict_mode() {
        let dir = TempDir::new().unwrap();
        write(&dir, "locations_1.json", LOCATIONS);
        write(&dir, "locations_2.json", LOCATIONS);
        let db = Database::new();
        assert!(matches!(
            Loader::new(&db).load_path(dir.path()),
            Err(LoadError::Rejected {
                kind: EntityKind::Location,
                ..
            })
        ));
    }

    #[test]
    fn unknown_file_rejected_in_strict_mode() {
        let dir = TempDir::new().unwrap();
        write(&dir, "options_1.json", "{}");
        let db = Database::new();
        assert!(matches!(
            Loader::new(&db).load_path(dir.path()),
            Err(LoadError::UnknownFile(_))
        ));
    }

    #[test]
    fn malformed_json_is_fatal_in_either_mode() {
        let dir = TempDir::new().unwrap();
        write(&dir, "users_1.json", "{\"users\": [");
        let db = Database::new();
        let err = Loader::new(&db)
            .policy(LoadPolicy::Lenient)
            .load_path(dir.path())
            .unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
    }

    fn tar_bytes() -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, body) in [
            ("data/users_1.json", USERS),
            ("data/locations_1.json", LOCATIONS),
            ("data/visits_1.json", VISITS),
        ] {
            let mut header = tar::Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, body.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap()
    }

    #[test]
    fn loads_tar_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.tar");
        std::fs::write(&path, tar_bytes()).unwrap();

        let db = Database::new();
        let report = Loader::new(&db).load_path(&path).unwrap();
        assert_eq!(report.visits, 2);
        assert_eq!(db.get_user(1).unwrap().last_name, "Lee");
    }

    #[test]
    fn oversized_tar_header_fails_cleanly() {
        let mut header = tar::Header::new_gnu();
        header.set_path("users_1.json").unwrap();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(1 << 40);
        header.set_mode(0o644);
        header.set_cksum();
        let mut bytes = header.as_bytes().to_vec();
        bytes.extend_from_slice(USERS.as_bytes());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.tar");
        std::fs::write(&path, bytes).unwrap();

        let db = Database::new();
        let err = Loader::new(&db).load_path(&path).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. } | LoadError::Json { .. }));
        assert_eq!(db.count(EntityKind::User), 0);
    }

    #[test]
    fn loads_zstd_tar_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.tar.zst");
        let compressed = zstd::stream::encode_all(tar_bytes().as_slice(), 3).unwrap();
        std::fs::write(&path, compressed).unwrap();

        let db = Database::new();
        let report = Loader::new(&db).load_path(&path).unwrap();
        assert_eq!(report.users, 2);
        assert_eq!(db.visits_of_user(1), vec![1]);
    }

    #[test]
    fn loads_zip_archive() {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.zip");
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        // visits first, as the archive order must not matter
        for (name, body) in [
            ("visits_1.json", VISITS),
            ("users_1.json", USERS),
            ("locations_1.json", LOCATIONS),
            ("options.txt", "1503695452\n1"),
        ] {
            writer.start_file(name, options).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();

        let db = Database::new();
        let report = Loader::new(&db).load_path(&path).unwrap();
        assert_eq!(
            report,
            LoadReport {
                users: 2,
                locations: 1,
                visits: 2,
                skipped: 0
            }
        );
        assert_eq!(db.visits_of_location(1), vec![1, 2]);
        db.check_consistency().unwrap();
    }

    #[test]
    fn corrupt_zip_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.zip");
        std::fs::write(&path, b"PK not really").unwrap();
        let db = Database::new();
        assert!(matches!(
            Loader::new(&db).load_path(&path),
            Err(LoadError::Zip { .. })
        ));
    }

    #[test]
    fn unsupported_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.rar");
        std::fs::write(&path, b"Rar!").unwrap();
        let db = Database::new();
        assert!(matches!(
            Loader::new(&db).load_path(&path),
            Err(LoadError::UnsupportedSource(_))
        ));
    }
}
