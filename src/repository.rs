use crate::errors::{CredentialsError, FetchResult};
use crate::fetch::{Fetcher, RequestOptions};
use crate::filters::{ReadingFilters, TimeWindow};
use crate::models::{
    Emotion, EmotionCountsOverTime, Location, NewReading, Reading, ReadingSet, Timeframe,
};
use chrono::NaiveDate;
use tracing::debug;

/// Identity needed for every authenticated call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    user_id: String,
    token: String,
}

impl Credentials {
    pub fn new(
        user_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, CredentialsError> {
        let user_id = user_id.into();
        let token = token.into();
        if user_id.trim().is_empty() {
            return Err(CredentialsError::MissingUserId);
        }
        if token.trim().is_empty() {
            return Err(CredentialsError::MissingToken);
        }
        Ok(Self { user_id, token })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

#[derive(Debug, Clone)]
pub struct ReadingRepository {
    fetcher: Fetcher,
    base_url: String,
}

impl ReadingRepository {
    pub fn new(fetcher: Fetcher, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { fetcher, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_readings(
        &self,
        credentials: &Credentials,
        filters: Option<&ReadingFilters>,
    ) -> FetchResult<ReadingSet> {
        let mut query = vec![("clerk_id".to_string(), credentials.user_id.clone())];
        if let Some(filters) = filters {
            query.extend(filters.to_query());
        }
        debug!(?query, "fetching readings");
        let options = RequestOptions::get()
            .bearer(credentials.token.clone())
            .query(query);
        self.fetcher
            .request(&self.url("/readings"), &options)
            .await
    }

    pub async fn fetch_window(
        &self,
        credentials: &Credentials,
        window: TimeWindow,
        today: NaiveDate,
    ) -> FetchResult<ReadingSet> {
        self.fetch_readings(credentials, Some(&window.filter(today)))
            .await
    }

    pub async fn fetch_by_emotion(
        &self,
        credentials: &Credentials,
        emotion: Emotion,
    ) -> FetchResult<ReadingSet> {
        let filters = ReadingFilters::default().with_emotion(emotion);
        self.fetch_readings(credentials, Some(&filters)).await
    }

    pub async fn fetch_by_location(
        &self,
        credentials: &Credentials,
        location: Location,
    ) -> FetchResult<ReadingSet> {
        let filters = ReadingFilters::default().with_location(location);
        self.fetch_readings(credentials, Some(&filters)).await
    }

    pub async fn fetch_counts_over_time(
        &self,
        credentials: &Credentials,
        timeframe: Timeframe,
        emotions: &[Emotion],
    ) -> FetchResult<EmotionCountsOverTime> {
        let mut query = vec![
            ("clerk_id".to_string(), credentials.user_id.clone()),
            ("timeframe".to_string(), timeframe.as_query().to_string()),
        ];
        // Matched against the stored labels as-is, so keep the capitalized name.
        query.extend(
            emotions
                .iter()
                .map(|emotion| ("emotions".to_string(), emotion.as_str().to_string())),
        );
        let options = RequestOptions::get()
            .bearer(credentials.token.clone())
            .query(query);
        self.fetcher
            .request(&self.url("/readings/emotion-counts"), &options)
            .await
    }

    /// Stores a new reading and returns the server's canonical copy.
    pub async fn upload_reading(
        &self,
        reading: &NewReading,
        credentials: &Credentials,
    ) -> FetchResult<Reading> {
        let body = serde_json::to_value(reading)
            .map_err(crate::errors::FetchFailure::transport)?;
        let options = RequestOptions::post(body).bearer(credentials.token.clone());
        self.fetcher
            .request(&self.url("/readings"), &options)
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
