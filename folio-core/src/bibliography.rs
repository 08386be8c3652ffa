//! BibLaTeX bibliography loading for citation support.

use crate::error::{FolioError, Result};
use hayagriva::{io::from_biblatex_str, types::Person, Entry};
use std::fs;
use std::path::Path;
use tracing::debug;

/// A bibliography entry reduced to the fields folio displays
#[derive(Debug, Clone, PartialEq)]
pub struct BibliographyEntry {
    pub key: String,
    pub authors: Vec<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub publisher: Option<String>,
    pub url: Option<String>,
}

impl BibliographyEntry {
    fn from_entry(entry: &Entry) -> Self {
        let people = entry
            .authors()
            .filter(|a| !a.is_empty())
            .or_else(|| entry.editors());

        Self {
            key: entry.key().to_string(),
            authors: people.map(person_names).unwrap_or_default(),
            title: entry.title().map(|t| t.to_string()),
            date: entry.date().map(|d| d.to_string()),
            publisher: entry
                .publisher()
                .and_then(|p| p.name())
                .map(|n| n.to_string()),
            url: entry.url().map(|u| u.to_string()),
        }
    }

    /// Plain reference-list text: authors, date, title, publisher, url
    pub fn format(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if !self.authors.is_empty() {
            parts.push(join_authors(&self.authors));
        }
        if let Some(date) = &self.date {
            parts.push(format!("({})", date));
        }
        if let Some(title) = &self.title {
            parts.push(title.clone());
        }
        if let Some(publisher) = &self.publisher {
            parts.push(publisher.clone());
        }
        if let Some(url) = &self.url {
            parts.push(url.clone());
        }

        if parts.is_empty() {
            self.key.clone()
        } else {
            parts.join(". ")
        }
    }
}

fn person_names(people: &[Person]) -> Vec<String> {
    people.iter().map(|p| p.name_first(true, false)).collect()
}

fn join_authors(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{} & {}", a, b),
        [rest @ .., last] => format!("{}, & {}", rest.join(", "), last),
    }
}

/// Parse BibLaTeX source into entries, in file order
pub fn parse_bibliography(contents: &str) -> Result<Vec<BibliographyEntry>> {
    let library = from_biblatex_str(contents).map_err(|errors| {
        let joined = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        FolioError::runtime("bibliography", format!("failed to parse bibliography: {}", joined))
    })?;

    Ok(library.iter().map(BibliographyEntry::from_entry).collect())
}

/// Read and parse a `.bib` file
pub fn load_bibliography(path: &Path) -> Result<Vec<BibliographyEntry>> {
    let contents = fs::read_to_string(path).map_err(|source| FolioError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse_bibliography(&contents)?;
    debug!("Loaded {} bibliography entries from {:?}", entries.len(), path);
    Ok(entries)
}
