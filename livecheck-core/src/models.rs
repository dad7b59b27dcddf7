use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use utoipa::ToSchema;

/// A host or a musical guest.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Person {
    pub fn named<T: Into<String>>(name: T) -> Self {
        Person {
            name: name.into(),
            image: None,
        }
    }
}

/// One broadcast night as reported by a listing source.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Defaults to the queried night when a source (e.g. the config mock)
    /// doesn't pin one.
    #[serde(default)]
    pub air_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Person>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub musical_guest: Option<Person>,
    /// False means the night is a rerun.
    pub is_live: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// The best-effort answer to "is the show live tonight", merged from every
/// listing source that responded, with the schedule calculator as fallback.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShowStatus {
    pub is_live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub musical_guest: Option<Person>,
    /// 0.0 - 1.0, how much the sources agree.
    pub confidence: f64,
    /// Names of the sources that contributed, `schedule` for the fallback.
    pub sources: Vec<String>,
    pub last_updated: DateTime<Utc>,
}
