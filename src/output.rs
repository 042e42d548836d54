use crate::models::{Repository, UserProfile};
use crate::schedule::Dataset;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub const USERS_FILE: &str = "users.csv";
pub const REPOSITORIES_FILE: &str = "repositories.csv";

pub const USER_COLUMNS: [&str; 11] = [
    "login",
    "name",
    "company",
    "location",
    "email",
    "hireable",
    "bio",
    "public_repos",
    "followers",
    "following",
    "created_at",
];

pub const REPOSITORY_COLUMNS: [&str; 9] = [
    "login",
    "full_name",
    "created_at",
    "stargazers_count",
    "watchers_count",
    "language",
    "has_projects",
    "has_wiki",
    "license_name",
];

/// Write the header explicitly so that an empty table still has one
fn write_rows<W: Write, T: Serialize>(writer: W, header: &[&str], rows: &[T]) -> csv::Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(header)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Empty fields in optional columns read back as `None`; the normalizer never
/// produces `Some("")`, so normalized rows survive the round trip.
fn read_rows<R: Read, T: DeserializeOwned>(reader: R) -> csv::Result<Vec<T>> {
    csv::Reader::from_reader(reader).deserialize().collect()
}

pub fn write_users<W: Write>(writer: W, users: &[UserProfile]) -> csv::Result<()> {
    write_rows(writer, &USER_COLUMNS, users)
}

pub fn write_repositories<W: Write>(writer: W, repositories: &[Repository]) -> csv::Result<()> {
    write_rows(writer, &REPOSITORY_COLUMNS, repositories)
}

pub fn read_users<R: Read>(reader: R) -> csv::Result<Vec<UserProfile>> {
    read_rows(reader)
}

pub fn read_repositories<R: Read>(reader: R) -> csv::Result<Vec<Repository>> {
    read_rows(reader)
}

impl Dataset {
    /// Write `users.csv` and `repositories.csv` into a directory
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> csv::Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        write_users(File::create(dir.join(USERS_FILE))?, &self.users)?;
        write_repositories(File::create(dir.join(REPOSITORIES_FILE))?, &self.repositories)
    }

    pub fn load<P: AsRef<Path>>(dir: P) -> csv::Result<Dataset> {
        let dir = dir.as_ref();

        Ok(Dataset {
            users: read_users(File::open(dir.join(USERS_FILE))?)?,
            repositories: read_repositories(File::open(dir.join(REPOSITORIES_FILE))?)?,
        })
    }
}
