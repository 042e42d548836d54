use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

/// A search result item (only the login is needed for dispatch)
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawUserStub {
    pub login: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchPage {
    pub items: Vec<RawUserStub>,
}

/// The user detail body, decoded with only the fields we keep
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawUser {
    pub login: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub hireable: Option<bool>,
    pub bio: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawLicense {
    pub key: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawRepository {
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub language: Option<String>,
    #[serde(default)]
    pub has_projects: bool,
    #[serde(default)]
    pub has_wiki: bool,
    pub license: Option<RawLicense>,
}

/// One row of `users.csv`
///
/// Field order is the column order.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub company: String,
    pub location: Option<String>,
    pub email: Option<String>,
    pub hireable: Option<bool>,
    pub bio: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub created_at: DateTime<Utc>,
}

/// One row of `repositories.csv`
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Repository {
    pub login: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub language: Option<String>,
    pub has_projects: bool,
    pub has_wiki: bool,
    pub license_name: Option<String>,
}
