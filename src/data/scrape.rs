//! IMDB chart ingestion utilities.
//!
//! The chart page embeds an `application/ld+json` ItemList carrying title,
//! rating, vote count, duration and genre for every entry. Year and metascore
//! only live on the per-title pages, so a second detail pass fills them in,
//! either sequentially (default) or with a bounded number of concurrent
//! workers (`--fast`).

use std::time::Duration;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::Settings;

const IMDB_BASE: &str = "https://www.imdb.com";
const COURTESY_DELAY_MS: u64 = 250;

/// Failures local to the extraction layer.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("no application/ld+json payload found in page")]
    MissingJsonLd,
    #[error("chart payload is not an ItemList")]
    NotAnItemList,
    #[error("malformed ld+json payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One chart entry as scraped, before cleaning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMovie {
    pub title: String,
    pub url: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub metascore: Option<f64>,
    pub duration_min: Option<i64>,
    pub votes: Option<i64>,
    pub genres: Vec<String>,
}

/// Fields recovered from a title detail page.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleDetails {
    pub year: Option<i32>,
    pub metascore: Option<f64>,
}

/// Scrape up to `limit` chart entries, filling detail fields per title.
pub async fn scrape_movies(
    limit: usize,
    fast: bool,
    threads: usize,
    settings: &Settings,
) -> Result<Vec<RawMovie>> {
    let client = http_client(settings)?;

    info!(url = %settings.chart_url, limit, "fetching chart page");
    let html = fetch_page(&client, &settings.chart_url).await?;
    let mut records = parse_chart(&html).context("extract chart entries")?;
    records.truncate(limit);
    info!(count = records.len(), "parsed chart entries");

    if fast {
        enrich_concurrent(&client, &mut records, threads.max(1)).await;
    } else {
        enrich_sequential(&client, &mut records).await;
    }

    Ok(records)
}

/// Extract chart entries from the chart page HTML. Pure, unit-testable.
pub fn parse_chart(html: &str) -> Result<Vec<RawMovie>, ScrapeError> {
    let payload = extract_json_ld(html).ok_or(ScrapeError::MissingJsonLd)?;
    let list: ItemList = serde_json::from_str(payload)?;
    if list.item_list_element.is_empty() {
        return Err(ScrapeError::NotAnItemList);
    }

    let mut records = Vec::with_capacity(list.item_list_element.len());
    for element in list.item_list_element {
        let item = element.item;
        let (rating, votes) = item
            .aggregate_rating
            .map(|r| (r.rating_value, r.rating_count))
            .unwrap_or((None, None));
        records.push(RawMovie {
            title: item.name,
            url: item.url.map(|u| absolutize(&u)),
            year: None,
            rating,
            metascore: None,
            duration_min: item.duration.as_deref().and_then(parse_iso_duration),
            votes,
            genres: item.genre.into_vec(),
        });
    }
    Ok(records)
}

/// Extract year and metascore from a title page. Pure, unit-testable.
pub fn parse_title_page(html: &str) -> TitleDetails {
    static YEAR_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#""datePublished"\s*:\s*"(\d{4})"#).unwrap());
    static YEAR_TITLE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"<title>[^<]*\((\d{4})\)").unwrap());
    static METASCORE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#""metascore"\s*:\s*\{\s*"score"\s*:\s*(\d+)"#).unwrap());
    static METASCORE_BOX_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"metacritic-score-box[^>]*>\s*(\d+)\s*<"#).unwrap());

    let year = YEAR_RE
        .captures(html)
        .or_else(|| YEAR_TITLE_RE.captures(html))
        .and_then(|c| c[1].parse().ok());
    let metascore = METASCORE_RE
        .captures(html)
        .or_else(|| METASCORE_BOX_RE.captures(html))
        .and_then(|c| c[1].parse().ok());

    TitleDetails { year, metascore }
}

/// Parse an ISO-8601 duration like `PT2H22M` into minutes.
pub fn parse_iso_duration(value: &str) -> Option<i64> {
    static DURATION_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").unwrap());
    let caps = DURATION_RE.captures(value.trim())?;
    let hours: i64 = caps.get(1).map_or(0, |m| m.as_str().parse().unwrap_or(0));
    let minutes: i64 = caps.get(2).map_or(0, |m| m.as_str().parse().unwrap_or(0));
    if caps.get(1).is_none() && caps.get(2).is_none() {
        return None;
    }
    Some(hours * 60 + minutes)
}

async fn enrich_sequential(client: &Client, records: &mut [RawMovie]) {
    for record in records.iter_mut() {
        let Some(url) = record.url.clone() else {
            continue;
        };
        match fetch_page(client, &url).await {
            Ok(html) => apply_details(record, parse_title_page(&html)),
            Err(error) => warn!(%url, %error, "detail fetch failed; leaving fields empty"),
        }
        sleep(Duration::from_millis(COURTESY_DELAY_MS)).await;
    }
}

async fn enrich_concurrent(client: &Client, records: &mut [RawMovie], threads: usize) {
    let targets: Vec<(usize, String)> = records
        .iter()
        .enumerate()
        .filter_map(|(idx, r)| r.url.clone().map(|url| (idx, url)))
        .collect();

    let details: Vec<(usize, Option<TitleDetails>)> = stream::iter(targets)
        .map(|(idx, url)| {
            let client = client.clone();
            async move {
                let result = match fetch_page(&client, &url).await {
                    Ok(html) => (idx, Some(parse_title_page(&html))),
                    Err(error) => {
                        warn!(%url, %error, "detail fetch failed; leaving fields empty");
                        (idx, None)
                    }
                };
                sleep(Duration::from_millis(COURTESY_DELAY_MS)).await; // be nice to IMDB
                result
            }
        })
        .buffer_unordered(threads)
        .collect()
        .await;

    for (idx, detail) in details {
        if let Some(detail) = detail {
            apply_details(&mut records[idx], detail);
        }
    }
}

fn apply_details(record: &mut RawMovie, details: TitleDetails) {
    if record.year.is_none() {
        record.year = details.year;
    }
    if record.metascore.is_none() {
        record.metascore = details.metascore;
    }
}

async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request {url}"))?
        .error_for_status()
        .with_context(|| format!("status for {url}"))?;
    Ok(resp.text().await?)
}

fn http_client(settings: &Settings) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(format!("imdb-pipeline/0.1 (+{})", settings.contact_email))
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()?)
}

fn extract_json_ld(html: &str) -> Option<&str> {
    static JSON_LD_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"(?s)<script[^>]*type="application/ld\+json"[^>]*>(.*?)</script>"#).unwrap()
    });
    JSON_LD_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn absolutize(url: &str) -> String {
    if url.starts_with('/') {
        format!("{IMDB_BASE}{url}")
    } else {
        url.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ItemList {
    #[serde(rename = "itemListElement", default)]
    item_list_element: Vec<ListItem>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    item: ChartItem,
}

#[derive(Debug, Deserialize)]
struct ChartItem {
    #[serde(default)]
    name: String,
    url: Option<String>,
    #[serde(rename = "aggregateRating")]
    aggregate_rating: Option<AggregateRating>,
    duration: Option<String>,
    #[serde(default)]
    genre: OneOrMany,
}

#[derive(Debug, Deserialize)]
struct AggregateRating {
    #[serde(rename = "ratingValue")]
    rating_value: Option<f64>,
    #[serde(rename = "ratingCount")]
    rating_count: Option<i64>,
}

/// IMDB serialises `genre` as either a bare string or an array.
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    #[default]
    None,
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::None => Vec::new(),
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART_FIXTURE: &str = r#"
        <html><head>
        <script type="application/ld+json">
        {"@type":"ItemList","itemListElement":[
          {"item":{"name":"The Shawshank Redemption","url":"/title/tt0111161/",
            "aggregateRating":{"ratingValue":9.3,"ratingCount":2800000},
            "duration":"PT2H22M","genre":"Drama"}},
          {"item":{"name":"The Godfather","url":"https://www.imdb.com/title/tt0068646/",
            "aggregateRating":{"ratingValue":9.2,"ratingCount":1900000},
            "duration":"PT2H55M","genre":["Crime","Drama"]}}
        ]}
        </script>
        </head></html>"#;

    #[test]
    fn chart_fixture_parses() {
        let records = parse_chart(CHART_FIXTURE).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "The Shawshank Redemption");
        assert_eq!(
            records[0].url.as_deref(),
            Some("https://www.imdb.com/title/tt0111161/")
        );
        assert_eq!(records[0].rating, Some(9.3));
        assert_eq!(records[0].votes, Some(2_800_000));
        assert_eq!(records[0].duration_min, Some(142));
        assert_eq!(records[0].genres, vec!["Drama"]);
        assert_eq!(records[1].genres, vec!["Crime", "Drama"]);
    }

    #[test]
    fn missing_json_ld_is_an_error() {
        let err = parse_chart("<html><body>nothing here</body></html>").unwrap_err();
        assert!(matches!(err, ScrapeError::MissingJsonLd));
    }

    #[test]
    fn title_page_fields_extracted() {
        let html = r#"
            <title>The Shawshank Redemption (1994) - IMDb</title>
            <script>{"props":{"metascore":{"score":82,"reviewCount":24}}}</script>
            <script type="application/ld+json">{"datePublished":"1994-09-23"}</script>
        "#;
        let details = parse_title_page(html);
        assert_eq!(details.year, Some(1994));
        assert_eq!(details.metascore, Some(82.0));
    }

    #[test]
    fn title_page_tolerates_missing_fields() {
        let details = parse_title_page("<html></html>");
        assert_eq!(details.year, None);
        assert_eq!(details.metascore, None);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_detail_pass_paces_requests() {
        let client = Client::builder().build().unwrap();
        let mut records: Vec<RawMovie> = (0..2)
            .map(|i| RawMovie {
                title: format!("Movie {i}"),
                url: Some("http://127.0.0.1:0/".to_string()),
                ..RawMovie::default()
            })
            .collect();

        let start = tokio::time::Instant::now();
        enrich_concurrent(&client, &mut records, 2).await;
        // every worker sleeps after its fetch, even when the fetch fails
        assert!(start.elapsed() >= Duration::from_millis(COURTESY_DELAY_MS));
    }

    #[test]
    fn iso_durations_convert_to_minutes() {
        assert_eq!(parse_iso_duration("PT2H22M"), Some(142));
        assert_eq!(parse_iso_duration("PT45M"), Some(45));
        assert_eq!(parse_iso_duration("PT3H"), Some(180));
        assert_eq!(parse_iso_duration("not a duration"), None);
    }
}
