//! Non-article page content: the home page intro, the role history, the
//! project list and the about page.
//!
//! Everything lives in the pages directory:
//!
//! ```text
//! pages/
//! ├── profile.toml     # intro, [[roles]], [[projects]]
//! └── about.md         # markdown body of the about page
//! ```
//!
//! Both files are optional; a missing file yields empty content. The files
//! are read per request like the article store, so edits show up without a
//! restart.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PROFILE_FILE: &str = "profile.toml";
pub const ABOUT_FILE: &str = "about.md";

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    /// Short paragraph shown on the home page.
    pub intro: String,
    pub roles: Vec<Role>,
    pub projects: Vec<Project>,
    /// Raw markdown of the about page.
    #[serde(skip)]
    pub about: Option<String>,
}

/// One position in the role history, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Role {
    pub title: String,
    pub organization: String,
    pub period: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub url: Option<String>,
    pub tags: Vec<String>,
}

/// Load the profile from a pages directory.
pub fn load_profile(pages_dir: &Path) -> Result<Profile, ProfileError> {
    let profile_path = pages_dir.join(PROFILE_FILE);
    let mut profile = match read_optional(&profile_path)? {
        Some(content) => toml::from_str(&content).map_err(|source| ProfileError::Toml {
            path: profile_path.clone(),
            source,
        })?,
        None => Profile::default(),
    };
    profile.about = read_optional(&pages_dir.join(ABOUT_FILE))?;
    Ok(profile)
}

fn read_optional(path: &Path) -> Result<Option<String>, ProfileError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ProfileError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::setup_fixtures;
    use tempfile::TempDir;

    #[test]
    fn missing_directory_is_empty_profile() {
        let tmp = TempDir::new().unwrap();
        let profile = load_profile(&tmp.path().join("pages")).unwrap();
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn loads_fixture_profile() {
        let tmp = setup_fixtures();
        let profile = load_profile(&tmp.path().join("pages")).unwrap();

        assert!(!profile.intro.is_empty());
        assert_eq!(profile.roles.len(), 2);
        assert_eq!(profile.roles[0].organization, "Northwind");
        assert_eq!(profile.projects.len(), 2);
        assert_eq!(profile.projects[0].name, "folio");
        assert_eq!(profile.projects[1].url, None);
        assert!(profile.about.as_deref().unwrap().contains("# About"));
    }

    #[test]
    fn about_only() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(ABOUT_FILE), "Hi.").unwrap();
        let profile = load_profile(tmp.path()).unwrap();
        assert!(profile.roles.is_empty());
        assert_eq!(profile.about.as_deref(), Some("Hi."));
    }

    #[test]
    fn partial_profile_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(PROFILE_FILE),
            "[[projects]]\nname = \"x\"\n",
        )
        .unwrap();
        let profile = load_profile(tmp.path()).unwrap();
        assert_eq!(profile.intro, "");
        assert_eq!(profile.projects[0].name, "x");
        assert!(profile.projects[0].tags.is_empty());
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(PROFILE_FILE), "headline = \"x\"\n").unwrap();
        let err = load_profile(tmp.path()).unwrap_err();
        assert!(matches!(err, ProfileError::Toml { .. }));
    }
}
