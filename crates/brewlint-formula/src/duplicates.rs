//! Conflict detection across a set of descriptors.
//!
//! A tap may hold exactly one descriptor per package name. Descriptors are
//! grouped by declared name; every name claimed more than once yields a single
//! [`ValidationError::ConflictingDescriptors`] listing each distinct origin
//! (source URL plus homepage) and the files that declared it. No descriptor is
//! ever picked as the winner.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::types::RawDescriptor;
use crate::validation::ValidationError;

/// The facts about one descriptor that conflict detection needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub name: &'a str,
    pub source_url: Option<&'a str>,
    pub homepage: Option<&'a str>,
    pub location: &'a str,
}

impl<'a> From<&'a RawDescriptor> for Candidate<'a> {
    fn from(raw: &'a RawDescriptor) -> Self {
        Self {
            name: &raw.name,
            source_url: raw.url.as_ref().map(|v| v.literal.text()),
            homepage: raw.homepage.as_ref().map(|v| v.literal.text()),
            location: &raw.source,
        }
    }
}

/// A distinct place a package's source is declared to come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    pub source_url: Option<String>,
    pub homepage: Option<String>,
    /// Files declaring this origin, in input order.
    pub locations: Vec<String>,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source_url.as_deref().unwrap_or("<no url>"))?;
        if let Some(home) = &self.homepage {
            write!(f, " (homepage {})", home)?;
        }
        if !self.locations.is_empty() {
            write!(f, " in {}", self.locations.join(", "))?;
        }
        Ok(())
    }
}

/// Report every name declared by more than one descriptor.
///
/// Output is ordered by name; origins within a conflict keep the order in
/// which they were first seen.
pub fn detect_conflicts<'a, I>(candidates: I) -> Vec<ValidationError>
where
    I: IntoIterator<Item = Candidate<'a>>,
{
    let mut by_name: BTreeMap<&str, Vec<Candidate<'a>>> = BTreeMap::new();
    for candidate in candidates {
        by_name.entry(candidate.name).or_default().push(candidate);
    }

    let mut conflicts = Vec::new();
    for (name, group) in by_name {
        if group.len() < 2 {
            continue;
        }

        let mut origins: Vec<Origin> = Vec::new();
        for c in &group {
            let existing = origins.iter_mut().find(|o| {
                o.source_url.as_deref() == c.source_url && o.homepage.as_deref() == c.homepage
            });
            match existing {
                Some(origin) => origin.locations.push(c.location.to_owned()),
                None => origins.push(Origin {
                    source_url: c.source_url.map(str::to_owned),
                    homepage: c.homepage.map(str::to_owned),
                    locations: vec![c.location.to_owned()],
                }),
            }
        }

        warn!(
            name,
            descriptors = group.len(),
            origins = origins.len(),
            "conflicting descriptors"
        );
        conflicts.push(ValidationError::ConflictingDescriptors {
            name: name.to_owned(),
            origins,
        });
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candidate<'a>(
        name: &'a str,
        url: &'a str,
        homepage: &'a str,
        location: &'a str,
    ) -> Candidate<'a> {
        Candidate {
            name,
            source_url: Some(url),
            homepage: Some(homepage),
            location,
        }
    }

    #[test]
    fn unique_names_do_not_conflict() {
        let conflicts = detect_conflicts([
            candidate("Dote", "https://a/dote.c", "https://a", "a.rb"),
            candidate("Meteor", "https://b/meteor.c", "https://b", "b.rb"),
        ]);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn four_dote_descriptors_from_two_repositories() {
        let ske_url = "https://raw.githubusercontent.com/Ske-417/homebrew-dote/main/dote.c";
        let ske_home = "https://github.com/Ske-417/homebrew-meteor";
        let kmc_url = "https://raw.githubusercontent.com/kmc2400/homebrew-dote/main/dote.c";
        let kmc_home = "https://github.com/kmc2400/homebrew-dote";

        let conflicts = detect_conflicts([
            candidate("Dote", ske_url, ske_home, "one/dote.rb"),
            candidate("Dote", ske_url, ske_home, "two/dote.rb"),
            candidate("Dote", kmc_url, kmc_home, "three/dote.rb"),
            candidate("Dote", kmc_url, kmc_home, "four/dote.rb"),
        ]);

        assert_eq!(conflicts.len(), 1);
        match &conflicts[0] {
            ValidationError::ConflictingDescriptors { name, origins } => {
                assert_eq!(name, "Dote");
                assert_eq!(
                    origins,
                    &vec![
                        Origin {
                            source_url: Some(ske_url.into()),
                            homepage: Some(ske_home.into()),
                            locations: vec!["one/dote.rb".into(), "two/dote.rb".into()],
                        },
                        Origin {
                            source_url: Some(kmc_url.into()),
                            homepage: Some(kmc_home.into()),
                            locations: vec!["three/dote.rb".into(), "four/dote.rb".into()],
                        },
                    ]
                );
            }
            other => panic!("expected ConflictingDescriptors, got {:?}", other),
        }
    }

    #[test]
    fn n_distinct_urls_yield_n_origins() {
        let urls: Vec<String> = (0..5).map(|i| format!("https://h/{}/x.c", i)).collect();
        let locations: Vec<String> = (0..5).map(|i| format!("{}.rb", i)).collect();
        let conflicts = detect_conflicts(urls.iter().zip(&locations).map(|(u, l)| Candidate {
            name: "X",
            source_url: Some(u.as_str()),
            homepage: None,
            location: l.as_str(),
        }));
        assert_eq!(conflicts.len(), 1);
        match &conflicts[0] {
            ValidationError::ConflictingDescriptors { origins, .. } => {
                assert_eq!(origins.len(), 5)
            }
            other => panic!("expected ConflictingDescriptors, got {:?}", other),
        }
    }

    #[test]
    fn identical_copies_still_conflict() {
        let conflicts = detect_conflicts([
            candidate("Dote", "https://a/dote.c", "https://a", "x/dote.rb"),
            candidate("Dote", "https://a/dote.c", "https://a", "y/dote.rb"),
        ]);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind(), "ConflictingDescriptors");
    }

    #[test]
    fn conflict_message_names_every_origin() {
        let conflicts = detect_conflicts([
            candidate("Dote", "https://a/dote.c", "https://a", "x.rb"),
            candidate("Dote", "https://b/dote.c", "https://b", "y.rb"),
        ]);
        let message = conflicts[0].to_string();
        assert!(message.contains("https://a/dote.c"));
        assert!(message.contains("https://b/dote.c"));
        assert!(message.contains("2 origins"));
    }
}
