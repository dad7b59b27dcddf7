use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Error;
use crate::models::EpisodeRecord;

use super::ListingsSource;

/// A fixed episode record from the configuration, answering alongside the
/// remote sources during development and demos.
pub struct MockSource {
    record: EpisodeRecord,
}

impl MockSource {
    pub fn new(record: EpisodeRecord) -> Self {
        MockSource { record }
    }
}

#[async_trait]
impl ListingsSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, date: NaiveDate) -> Result<Option<EpisodeRecord>, Error> {
        // Always answers for the queried night.
        let mut record = self.record.clone();
        record.air_date = date;
        Ok(Some(record))
    }
}

// </coverage:exclude>
