//! OpenAI implementation of the rating capability.
//!
//! One structured-output request per listing, strict schema, no retries. The
//! model refusing is a first-class outcome and is never treated as an error.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::ai::schema::openai_schema;
use crate::error::RatingError;
use crate::traits::rater::Rater;
use crate::types::listing::Coords;
use crate::types::rating::{PropertyRating, PropertyReport, RatingOutcome, ReportOutcome};

const RATING_SYSTEM_PROMPT: &str = "\
You are a real estate agent.
You are given a property and you need to rate it based on the following criteria (all ratings should be between 0 and 100):
- Safety Rating (e.g. crime rate, safety of the area, etc.)
- Rating on how close nearby gyms are
- Restaurants and Cafes Rating
- Outdoors Rating (e.g. parks, green spaces, etc.)";

const REPORT_SYSTEM_PROMPT: &str = "\
You are a real estate agent.
You are given a property and you need to provide some information about the property as well as rate it on some criteria (all ratings should be between 0 and 100):
- Price of the property
- BER rating
- Travel time to work: approximate time to travel from the property to the office in seconds.
- Safety Rating (e.g. crime rate, safety of the area, etc.)
- Rating on how close nearby gyms are
- Restaurants and Cafes Rating
- Outdoors Rating (e.g. parks, green spaces, etc.)
- Whether the property has a gym
- Whether the property has a washer
- Whether the property has a dryer
- Whether the property has a dishwasher
- Whether the property is pet friendly";

/// Rating client over the OpenAI chat completions API.
pub struct OpenAiRater {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl OpenAiRater {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: "gpt-4o-mini-2024-07-18".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Set the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for proxies or compatible providers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Combined single-call report for one property URL.
    ///
    /// The model is given the work location and the listing URL and fills in
    /// the extended schema itself; used by the `inspect` command.
    pub async fn report(&self, url: &str, work: Coords) -> Result<ReportOutcome, RatingError> {
        let user = format!(
            "My work is located at {}, {}. Please look at the following property and provide the information requested.\nProperty URL: {}.",
            work.lat, work.lng, url
        );

        match self
            .structured_call(
                REPORT_SYSTEM_PROMPT,
                &user,
                "property_report",
                openai_schema::<PropertyReport>(),
            )
            .await?
        {
            None => Ok(ReportOutcome::Refused),
            Some(content) => serde_json::from_str(&content)
                .map(ReportOutcome::Reported)
                .map_err(|e| RatingError::Parse(e.to_string())),
        }
    }

    /// One strict structured-output call. `Ok(None)` means the model refused.
    async fn structured_call(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: serde_json::Value,
    ) -> Result<Option<String>, RatingError> {
        let request = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema_name,
                    "strict": true,
                    "schema": schema,
                }
            }
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose_secret()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                RatingError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            return Err(RatingError::Api(format!("OpenAI API error: {error_text}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| RatingError::Parse(e.to_string()))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RatingError::Api("no choices in response".into()))?;

        if let Some(refusal) = choice.message.refusal {
            debug!(refusal = %refusal, "model refused");
            return Ok(None);
        }

        choice
            .message
            .content
            .ok_or_else(|| RatingError::Parse("response had neither content nor refusal".into()))
            .map(Some)
    }
}

#[async_trait]
impl Rater for OpenAiRater {
    async fn rate(&self, location: Coords) -> Result<RatingOutcome, RatingError> {
        let user = format!(
            "The property is located at longitude {} and latitude {}. Please rate the property based on the criteria.",
            location.lng, location.lat
        );

        match self
            .structured_call(
                RATING_SYSTEM_PROMPT,
                &user,
                "property_rating",
                openai_schema::<PropertyRating>(),
            )
            .await?
        {
            None => Ok(RatingOutcome::Refused),
            Some(content) => {
                let rating: PropertyRating = serde_json::from_str(&content)
                    .map_err(|e| RatingError::Parse(e.to_string()))?;
                Ok(RatingOutcome::Rated(rating))
            }
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ChoiceMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_message_reads_refusal() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":null,"refusal":"I can't rate that."}}]}"#,
        )
        .unwrap();
        assert!(body.choices[0].message.refusal.is_some());
        assert!(body.choices[0].message.content.is_none());
    }

    #[test]
    fn choice_message_reads_content_without_refusal_key() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"{\"safetyRating\":1,\"gymRating\":2,\"restaurantsRating\":3,\"outdoorsRating\":4}"}}]}"#,
        )
        .unwrap();
        let rating: PropertyRating =
            serde_json::from_str(body.choices[0].message.content.as_deref().unwrap()).unwrap();
        assert_eq!(rating.outdoors_rating, 4);
    }
}
