//! Cleaning rules turning raw chart entries into analysis-ready records.

use chrono::{Datelike, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::scrape::RawMovie;

const MIN_YEAR: i32 = 1874;
const MAX_DURATION_MIN: i64 = 600;

/// A cleaned movie record, serialised into `movies_cleaned.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRecord {
    pub title: String,
    pub url: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub metascore: Option<f64>,
    pub duration_min: Option<i64>,
    pub votes: Option<i64>,
    pub genres: Vec<String>,
}

/// Result of the cleaning pass, with the accounting the summary needs.
#[derive(Debug, Clone, Default)]
pub struct CleanOutcome {
    pub records: Vec<MovieRecord>,
    /// Titles removed as duplicates of an earlier (title, year) pair.
    pub duplicates: Vec<String>,
    /// Count of field values discarded as out of range.
    pub invalid_fields: usize,
    /// Entries dropped outright for having no usable title.
    pub dropped_untitled: usize,
}

/// Apply the cleaning rules. First occurrence wins on duplicates; out-of-range
/// field values become missing rather than dropping the whole record.
pub fn clean(raw: Vec<RawMovie>) -> CleanOutcome {
    let max_year = Utc::now().year() + 1;
    let mut outcome = CleanOutcome::default();
    let mut seen = IndexSet::new();

    for entry in raw {
        let title = normalize_title(&entry.title);
        if title.is_empty() {
            outcome.dropped_untitled += 1;
            continue;
        }

        let key = (title.to_lowercase(), entry.year);
        if !seen.insert(key) {
            outcome.duplicates.push(title);
            continue;
        }

        let mut invalid = 0usize;
        let year = validated(entry.year, |y| (MIN_YEAR..=max_year).contains(y), &mut invalid);
        let rating = validated(entry.rating, |r| (0.0..=10.0).contains(r), &mut invalid);
        let metascore =
            validated(entry.metascore, |m| (0.0..=100.0).contains(m), &mut invalid);
        let duration_min =
            validated(entry.duration_min, |d| (1..=MAX_DURATION_MIN).contains(d), &mut invalid);
        let votes = validated(entry.votes, |v| *v >= 0, &mut invalid);
        outcome.invalid_fields += invalid;

        outcome.records.push(MovieRecord {
            title,
            url: entry.url,
            year,
            rating,
            metascore,
            duration_min,
            votes,
            genres: normalize_genres(entry.genres),
        });
    }

    info!(
        kept = outcome.records.len(),
        duplicates = outcome.duplicates.len(),
        invalid_fields = outcome.invalid_fields,
        "cleaning pass complete"
    );
    outcome
}

/// Strip chart rank prefixes like `12. ` and surrounding whitespace.
pub fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    let stripped = match trimmed.split_once(". ") {
        Some((prefix, rest)) if prefix.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => trimmed,
    };
    stripped.trim().to_string()
}

fn normalize_genres(genres: Vec<String>) -> Vec<String> {
    let mut seen = IndexSet::new();
    for genre in genres {
        let value = genre.trim().to_string();
        if !value.is_empty() {
            seen.insert(value);
        }
    }
    seen.into_iter().collect()
}

fn validated<T, F>(value: Option<T>, keep: F, invalid: &mut usize) -> Option<T>
where
    F: Fn(&T) -> bool,
{
    match value {
        Some(v) if keep(&v) => Some(v),
        Some(_) => {
            *invalid += 1;
            None
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, year: Option<i32>) -> RawMovie {
        RawMovie {
            title: title.to_string(),
            year,
            ..RawMovie::default()
        }
    }

    #[test]
    fn rank_prefixes_are_stripped() {
        assert_eq!(normalize_title("1. The Shawshank Redemption"), "The Shawshank Redemption");
        assert_eq!(normalize_title("  250. Aliens "), "Aliens");
        assert_eq!(normalize_title("Se7en"), "Se7en");
        assert_eq!(normalize_title("Dr. Strangelove"), "Dr. Strangelove");
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let outcome = clean(vec![
            raw("Heat", Some(1995)),
            raw("2. Heat", Some(1995)),
            raw("Heat", Some(2023)),
        ]);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.duplicates, vec!["Heat"]);
    }

    #[test]
    fn out_of_range_fields_become_missing() {
        let outcome = clean(vec![RawMovie {
            title: "Broken".into(),
            year: Some(1492),
            rating: Some(11.0),
            metascore: Some(85.0),
            duration_min: Some(0),
            votes: Some(-3),
            ..RawMovie::default()
        }]);
        let record = &outcome.records[0];
        assert_eq!(record.year, None);
        assert_eq!(record.rating, None);
        assert_eq!(record.metascore, Some(85.0));
        assert_eq!(record.duration_min, None);
        assert_eq!(record.votes, None);
        assert_eq!(outcome.invalid_fields, 4);
    }

    #[test]
    fn untitled_entries_are_dropped() {
        let outcome = clean(vec![raw("   ", None), raw("Ran", Some(1985))]);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.dropped_untitled, 1);
    }

    #[test]
    fn genres_are_trimmed_and_deduplicated() {
        let outcome = clean(vec![RawMovie {
            title: "Alien".into(),
            genres: vec![" Horror ".into(), "Sci-Fi".into(), "Horror".into(), "".into()],
            ..RawMovie::default()
        }]);
        assert_eq!(outcome.records[0].genres, vec!["Horror", "Sci-Fi"]);
    }
}
