use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Error;
use crate::models::EpisodeRecord;
use crate::schedule::HiatusWindow;
use crate::schedule::RecurrenceRule;
use crate::schedule::Scheduler;

pub fn load<P: AsRef<Path>>(config_path: P) -> Arc<Config> {
    let config_path = config_path.as_ref();
    let reader = File::open(config_path).unwrap_or_else(|err| {
        panic!("Failed to open {}: {}", config_path.display(), err);
    });
    let config: Config = serde_yaml::from_reader(reader).unwrap_or_else(|err| {
        panic!("Failed to parse {}: {}", config_path.display(), err);
    });

    config.validate();
    Arc::new(config)
}

// result

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default = "Config::default_hiatus")]
    pub hiatus: Vec<HiatusWindowConfig>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub listings: ListingsConfig,
}

impl Config {
    // The broadcast takes a summer break and a holiday break.
    fn default_hiatus() -> Vec<HiatusWindowConfig> {
        vec![
            HiatusWindowConfig {
                start_month: 6,
                start_day: 1,
                end_month: 10,
                end_day: 1,
            },
            HiatusWindowConfig {
                start_month: 12,
                start_day: 16,
                end_month: 1,
                end_day: 15,
            },
        ]
    }

    pub fn validate(&self) {
        self.schedule.validate();
        self.hiatus
            .iter()
            .enumerate()
            .for_each(|(i, config)| config.validate(i));
        let windows: Vec<_> = self
            .hiatus
            .iter()
            .map(|config| config.window().unwrap())
            .collect();
        for (i, a) in windows.iter().enumerate() {
            for (j, b) in windows.iter().enumerate().skip(i + 1) {
                assert!(
                    !a.overlaps(b),
                    "config.hiatus: windows {i} and {j} must not overlap"
                );
            }
        }
        self.server.validate();
        self.listings.validate();
    }

    /// Builds the schedule calculator from the validated configuration.
    pub fn scheduler(&self) -> Result<Scheduler, Error> {
        let rule = self.schedule.rule()?;
        let hiatus = self
            .hiatus
            .iter()
            .map(|config| config.window())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Scheduler::new(rule, hiatus))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            schedule: Default::default(),
            hiatus: Self::default_hiatus(),
            server: Default::default(),
            listings: Default::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// 0 = Sunday .. 6 = Saturday.
    #[serde(default = "ScheduleConfig::default_weekday")]
    pub weekday: u8,
    #[serde(default = "ScheduleConfig::default_hour")]
    pub hour: u8,
    #[serde(default = "ScheduleConfig::default_minute")]
    pub minute: u8,
    #[serde(default = "ScheduleConfig::default_duration_minutes")]
    pub duration_minutes: i64,
}

impl ScheduleConfig {
    fn default_weekday() -> u8 {
        6
    }

    fn default_hour() -> u8 {
        23
    }

    fn default_minute() -> u8 {
        30
    }

    fn default_duration_minutes() -> i64 {
        90
    }

    pub fn rule(&self) -> Result<RecurrenceRule, Error> {
        RecurrenceRule::new(self.weekday, self.hour, self.minute, self.duration_minutes)
    }

    fn validate(&self) {
        if let Err(err) = self.rule() {
            panic!("config.schedule: {err}");
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            weekday: Self::default_weekday(),
            hour: Self::default_hour(),
            minute: Self::default_minute(),
            duration_minutes: Self::default_duration_minutes(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct HiatusWindowConfig {
    pub start_month: u8,
    pub start_day: u8,
    pub end_month: u8,
    pub end_day: u8,
}

impl HiatusWindowConfig {
    pub fn window(&self) -> Result<HiatusWindow, Error> {
        HiatusWindow::new(self.start_month, self.start_day, self.end_month, self.end_day)
    }

    fn validate(&self, index: usize) {
        if let Err(err) = self.window() {
            panic!("config.hiatus[{index}]: {err}");
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_addrs")]
    pub addrs: Vec<String>,
}

impl ServerConfig {
    fn default_addrs() -> Vec<String> {
        vec!["localhost:9372".to_string()]
    }

    fn validate(&self) {
        assert!(
            !self.addrs.is_empty(),
            "config.server: `addrs` must not be empty"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addrs: Self::default_addrs(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct ListingsConfig {
    #[serde(default = "ListingsConfig::default_show_name")]
    pub show_name: String,
    #[serde(
        default = "ListingsConfig::default_update_interval",
        with = "humantime_serde"
    )]
    pub update_interval: Duration,
    #[serde(default)]
    pub tvmaze: TvMazeConfig,
    /// A fixed episode record served alongside the remote sources, for
    /// development and demos.
    #[serde(default)]
    pub mock: Option<EpisodeRecord>,
}

impl ListingsConfig {
    fn default_show_name() -> String {
        "Saturday Night Live".to_string()
    }

    fn default_update_interval() -> Duration {
        Duration::from_secs(300)
    }

    fn validate(&self) {
        assert!(
            !self.show_name.is_empty(),
            "config.listings: `show-name` must not be empty"
        );
        assert!(
            self.update_interval >= Duration::from_secs(1),
            "config.listings: `update-interval` must be at least 1s"
        );
        self.tvmaze.validate();
    }
}

impl Default for ListingsConfig {
    fn default() -> Self {
        ListingsConfig {
            show_name: Self::default_show_name(),
            update_interval: Self::default_update_interval(),
            tvmaze: Default::default(),
            mock: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct TvMazeConfig {
    #[serde(default = "TvMazeConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default = "TvMazeConfig::default_base_url")]
    pub base_url: String,
}

impl TvMazeConfig {
    fn default_enabled() -> bool {
        true
    }

    fn default_base_url() -> String {
        "https://api.tvmaze.com".to_string()
    }

    fn validate(&self) {
        assert!(
            !self.base_url.is_empty(),
            "config.listings.tvmaze: `base-url` must not be empty"
        );
        assert!(
            !self.base_url.ends_with('/'),
            "config.listings.tvmaze: `base-url` must not end with a slash"
        );
    }
}

impl Default for TvMazeConfig {
    fn default() -> Self {
        TvMazeConfig {
            enabled: Self::default_enabled(),
            base_url: Self::default_base_url(),
        }
    }
}

// <coverage:exclude>
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config() {
        assert_eq!(
            serde_yaml::from_str::<Config>("{}").unwrap(),
            Default::default()
        );

        let result = serde_yaml::from_str::<Config>(
            r#"
            unknown:
              property: value
        "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validate() {
        let config = Config::default();
        config.validate();
    }

    #[test]
    fn test_config_scheduler() {
        let config = serde_yaml::from_str::<Config>(
            r#"
            schedule:
              weekday: 6
              hour: 23
              minute: 30
              duration-minutes: 90
        "#,
        )
        .unwrap();
        config.validate();
        assert!(config.scheduler().is_ok());
    }

    #[test]
    #[should_panic]
    fn test_config_validate_weekday_out_of_range() {
        let config = serde_yaml::from_str::<Config>(
            r#"
            schedule:
              weekday: 7
        "#,
        )
        .unwrap();
        config.validate();
    }

    #[test]
    #[should_panic]
    fn test_config_validate_overlapping_hiatus() {
        let config = serde_yaml::from_str::<Config>(
            r#"
            hiatus:
              - start-month: 6
                start-day: 1
                end-month: 10
                end-day: 1
              - start-month: 7
                start-day: 1
                end-month: 8
                end-day: 1
        "#,
        )
        .unwrap();
        config.validate();
    }

    #[test]
    fn test_listings_config() {
        let config = serde_yaml::from_str::<ListingsConfig>(
            r#"
            show-name: Saturday Night Live
            update-interval: 10m
        "#,
        )
        .unwrap();
        assert_eq!(config.update_interval, Duration::from_secs(600));
    }

    #[test]
    #[should_panic]
    fn test_listings_config_validate_base_url() {
        let config = serde_yaml::from_str::<ListingsConfig>(
            r#"
            tvmaze:
              base-url: https://api.tvmaze.com/
        "#,
        )
        .unwrap();
        config.validate();
    }
}
// </coverage:exclude>
