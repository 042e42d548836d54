use crate::models::{RawLicense, RawRepository, RawUser, Repository, UserProfile};

/// Canonicalize a company name: trimmed, without a leading `@`, uppercased
pub fn clean_company(raw: Option<&str>) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    let without_handle = trimmed.strip_prefix('@').unwrap_or(trimmed);

    without_handle.to_uppercase()
}

pub fn extract_license(raw: Option<&RawLicense>) -> Option<String> {
    raw.and_then(|license| non_empty(license.key.clone()))
}

/// GitHub sends both `null` and `""` for unset text; CSV can only hold one of them
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}

pub fn user_profile(raw: RawUser) -> UserProfile {
    UserProfile {
        company: clean_company(raw.company.as_deref()),
        login: raw.login,
        name: non_empty(raw.name),
        location: non_empty(raw.location),
        email: non_empty(raw.email),
        hireable: raw.hireable,
        bio: non_empty(raw.bio),
        public_repos: raw.public_repos,
        followers: raw.followers,
        following: raw.following,
        created_at: raw.created_at,
    }
}

/// Project a raw repository into a row owned by `login`
pub fn repository(login: &str, raw: RawRepository) -> Repository {
    Repository {
        license_name: extract_license(raw.license.as_ref()),
        login: login.to_string(),
        full_name: raw.full_name,
        created_at: raw.created_at,
        stargazers_count: raw.stargazers_count,
        watchers_count: raw.watchers_count,
        language: non_empty(raw.language),
        has_projects: raw.has_projects,
        has_wiki: raw.has_wiki,
    }
}
