use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::ListingsConfig;
use crate::error::Error;
use crate::models::EpisodeRecord;
use crate::models::Person;

use super::ListingsSource;

/// TVMaze's US schedule endpoint, filtered down to the configured show.
///
/// TVMaze has no structured host/guest fields; like the original listings,
/// they are folded into the episode title ("Host / Musical Guest") or spelled
/// out in the HTML summary.
pub struct TvMazeSource {
    client: reqwest::Client,
    base_url: String,
    show_name: String,
}

impl TvMazeSource {
    pub fn new(config: &ListingsConfig) -> Self {
        TvMazeSource {
            client: reqwest::Client::new(),
            base_url: config.tvmaze.base_url.clone(),
            show_name: config.show_name.clone(),
        }
    }

    async fn schedule_for(&self, date: NaiveDate) -> Result<Vec<ScheduleEntry>, Error> {
        let url = format!("{}/schedule?country=US&date={}", self.base_url, date);
        let entries = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()
            .map_err(Error::from)?
            .json::<Vec<ScheduleEntry>>()
            .await?;
        Ok(entries)
    }
}

#[async_trait]
impl ListingsSource for TvMazeSource {
    fn name(&self) -> &str {
        "tvmaze"
    }

    async fn fetch(&self, date: NaiveDate) -> Result<Option<EpisodeRecord>, Error> {
        let entries = self.schedule_for(date).await?;
        let entry = entries
            .into_iter()
            .find(|entry| entry.show.name == self.show_name);
        Ok(entry.map(|entry| entry.into_record(date)))
    }
}

// models

#[derive(Debug, Deserialize)]
struct ScheduleEntry {
    name: Option<String>,
    season: Option<u32>,
    number: Option<u32>,
    airdate: Option<NaiveDate>,
    #[serde(rename = "type")]
    entry_type: Option<String>,
    summary: Option<String>,
    show: Show,
}

#[derive(Debug, Deserialize)]
struct Show {
    name: String,
}

impl ScheduleEntry {
    fn into_record(self, date: NaiveDate) -> EpisodeRecord {
        let summary = self.summary.as_deref().map(strip_tags);
        let (host, musical_guest) = parse_host_and_guest(self.name.as_deref(), summary.as_deref());
        let is_live = !self.is_rerun();
        EpisodeRecord {
            title: self.name,
            air_date: self.airdate.unwrap_or(date),
            season: self.season,
            episode: self.number,
            host,
            musical_guest,
            is_live,
            summary,
        }
    }

    fn is_rerun(&self) -> bool {
        let marked = |text: &Option<String>| {
            text.as_deref()
                .is_some_and(|text| text.to_ascii_lowercase().contains("rerun"))
        };
        self.entry_type.as_deref() == Some("rerun") || marked(&self.name) || marked(&self.summary)
    }
}

// helpers

/// `"Charli XCX / Troye Sivan"` style titles, with `Host:`/`Musical Guest:`
/// lines in the summary as a second chance.
fn parse_host_and_guest(
    title: Option<&str>,
    summary: Option<&str>,
) -> (Option<Person>, Option<Person>) {
    let mut host = None;
    let mut musical_guest = None;

    if let Some((left, right)) = title.and_then(|title| title.split_once(" / ")) {
        host = person(left);
        musical_guest = person(right);
    }

    if let Some(summary) = summary {
        if host.is_none() {
            host = labeled_field(summary, "Host:").and_then(person);
        }
        if musical_guest.is_none() {
            musical_guest = labeled_field(summary, "Musical Guest:").and_then(person);
        }
    }

    (host, musical_guest)
}

fn person(name: &str) -> Option<Person> {
    let name = name.trim();
    if name.is_empty() || name == "TBA" {
        None
    } else {
        Some(Person::named(name))
    }
}

fn labeled_field<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let start = text.find(label)? + label.len();
    let rest = &text[start..];
    let end = rest
        .find(|c| matches!(c, ',' | '.' | '\n'))
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => (),
        }
    }
    text
}

// </coverage:exclude>
