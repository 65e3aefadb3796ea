//src/catalog.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error reading exercise catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse exercise catalog (JSON): {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("No exercise catalog configured. Set `catalog_path` in {0:?}.")]
    NotConfigured(PathBuf),
}

/// An exercise definition from the browsable catalog.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CatalogExercise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub muscle_group: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub equipment: String,
    #[serde(default)]
    pub difficulty: String,
}

#[derive(Deserialize)]
struct CatalogDocument {
    exercises: Vec<CatalogExercise>,
}

/// Catalog filter; `None` selectors are inactive.
#[derive(Default, Debug, Clone)]
pub struct CatalogFilter<'a> {
    pub search: Option<&'a str>,
    pub muscle_group: Option<&'a str>,
    pub equipment: Option<&'a str>,
    pub difficulty: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogFacets {
    pub muscle_groups: Vec<String>,
    pub equipment: Vec<String>,
    pub difficulties: Vec<String>,
}

/// Parses `{ "exercises": [...] }`. A missing `category` takes the muscle group.
/// # Errors
/// Returns `CatalogError::JsonParse` on malformed input.
pub fn parse_catalog(json: &str) -> Result<Vec<CatalogExercise>, CatalogError> {
    let doc: CatalogDocument = serde_json::from_str(json)?;
    Ok(doc
        .exercises
        .into_iter()
        .map(|mut ex| {
            if ex.category.is_empty() {
                ex.category = ex.muscle_group.clone();
            }
            ex
        })
        .collect())
}

/// Reads and parses a catalog file.
/// # Errors
/// Returns `CatalogError` if the file cannot be read or parsed.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogExercise>, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&content)
}

/// Search matches name or muscle group (case-insensitive); selectors match exactly.
#[must_use]
pub fn filter_catalog<'c>(
    catalog: &'c [CatalogExercise],
    filter: &CatalogFilter,
) -> Vec<&'c CatalogExercise> {
    let needle = filter
        .search
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    catalog
        .iter()
        .filter(|ex| {
            needle.as_ref().map_or(true, |n| {
                ex.name.to_lowercase().contains(n) || ex.muscle_group.to_lowercase().contains(n)
            })
        })
        .filter(|ex| selector_matches(filter.muscle_group, &ex.muscle_group))
        .filter(|ex| selector_matches(filter.equipment, &ex.equipment))
        .filter(|ex| selector_matches(filter.difficulty, &ex.difficulty))
        .collect()
}

/// Sorted distinct values for each catalog selector.
#[must_use]
pub fn catalog_facets(catalog: &[CatalogExercise]) -> CatalogFacets {
    let sorted = |f: fn(&CatalogExercise) -> &str| -> Vec<String> {
        catalog
            .iter()
            .map(f)
            .filter(|v| !v.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    };
    CatalogFacets {
        muscle_groups: sorted(|ex| ex.muscle_group.as_str()),
        equipment: sorted(|ex| ex.equipment.as_str()),
        difficulties: sorted(|ex| ex.difficulty.as_str()),
    }
}

fn selector_matches(selector: Option<&str>, value: &str) -> bool {
    match selector {
        None | Some("") => true,
        Some(s) if s.eq_ignore_ascii_case("all") => true,
        Some(s) => s == value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "exercises": [
            {"id": "1", "name": "Barbell Bench Press", "muscle_group": "Chest", "equipment": "Barbell", "difficulty": "Intermediate"},
            {"id": "2", "name": "Push Up", "muscle_group": "Chest", "equipment": "Bodyweight", "difficulty": "Beginner"},
            {"id": "3", "name": "Deadlift", "muscle_group": "Back", "category": "Posterior Chain", "equipment": "Barbell", "difficulty": "Advanced"}
        ]
    }"#;

    #[test]
    fn category_defaults_to_muscle_group() {
        let catalog = parse_catalog(SAMPLE).unwrap();
        assert_eq!(catalog[0].category, "Chest");
        assert_eq!(catalog[2].category, "Posterior Chain");
    }

    #[test]
    fn search_matches_name_or_muscle() {
        let catalog = parse_catalog(SAMPLE).unwrap();
        let hits = filter_catalog(
            &catalog,
            &CatalogFilter {
                search: Some("CHEST"),
                ..Default::default()
            },
        );
        assert_eq!(hits.len(), 2);

        let hits = filter_catalog(
            &catalog,
            &CatalogFilter {
                search: Some("lift"),
                ..Default::default()
            },
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "3");
    }

    #[test]
    fn selectors_combine() {
        let catalog = parse_catalog(SAMPLE).unwrap();
        let hits = filter_catalog(
            &catalog,
            &CatalogFilter {
                equipment: Some("Barbell"),
                difficulty: Some("Advanced"),
                ..Default::default()
            },
        );
        let ids: Vec<&str> = hits.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["3"]);
        assert_eq!(filter_catalog(&catalog, &CatalogFilter::default()).len(), 3);
    }

    #[test]
    fn facets_are_sorted_and_distinct() {
        let catalog = parse_catalog(SAMPLE).unwrap();
        let facets = catalog_facets(&catalog);
        assert_eq!(facets.muscle_groups, ["Back", "Chest"]);
        assert_eq!(facets.equipment, ["Barbell", "Bodyweight"]);
        assert_eq!(facets.difficulties, ["Advanced", "Beginner", "Intermediate"]);
    }

    #[test]
    fn malformed_catalog_is_an_error() {
        assert!(matches!(
            parse_catalog("{\"items\": []}"),
            Err(CatalogError::JsonParse(_))
        ));
    }
}
