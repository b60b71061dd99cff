//! Fact lookup client: ISS position and crew
//!
//! This client never surfaces an error. Any upstream failure collapses
//! into a fixed spoken-word placeholder so a fact turn always has
//! something to say.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use stellar_config::FactsConfig;
use stellar_core::FactSource;

/// Spoken when the position or crew lookup fails for any reason
pub const FACT_PLACEHOLDER: &str =
    "I'm sorry, a mysterious nebula is blocking my view of the stars right now.";

/// ISS position and crew lookup
///
/// Construction is infallible to match the never-fails contract: if the
/// HTTP client cannot be built, every fetch yields the placeholder.
pub struct IssLocator {
    client: Option<Client>,
    config: FactsConfig,
}

#[derive(Debug, Deserialize)]
struct PositionResponse {
    iss_position: IssPosition,
}

#[derive(Debug, Deserialize)]
struct IssPosition {
    latitude: String,
    longitude: String,
}

#[derive(Debug, Deserialize)]
struct CrewResponse {
    people: Vec<CrewMember>,
}

#[derive(Debug, Deserialize)]
struct CrewMember {
    name: String,
    craft: String,
}

impl IssLocator {
    pub fn new(config: FactsConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .ok();
        Self { client, config }
    }

    async fn position(&self) -> Option<IssPosition> {
        let response: PositionResponse = self
            .client
            .as_ref()?
            .get(&self.config.position_url)
            .send()
            .await
            .ok()?
            .json()
            .await
            .ok()?;
        Some(response.iss_position)
    }

    async fn crew(&self) -> Option<Vec<String>> {
        let response: CrewResponse = self
            .client
            .as_ref()?
            .get(&self.config.crew_url)
            .send()
            .await
            .ok()?
            .json()
            .await
            .ok()?;
        Some(
            response
                .people
                .into_iter()
                .filter(|p| p.craft == "ISS")
                .map(|p| p.name)
                .collect(),
        )
    }
}

#[async_trait]
impl FactSource for IssLocator {
    async fn fetch(&self) -> String {
        let position = match self.position().await {
            Some(position) => position,
            None => {
                tracing::warn!("ISS position lookup failed");
                return FACT_PLACEHOLDER.to_string();
            }
        };

        // Crew roster is best-effort; position alone is still an answer.
        let crew = self.crew().await.unwrap_or_default();

        format_fact(&position.latitude, &position.longitude, &crew)
    }
}

fn format_fact(latitude: &str, longitude: &str, crew: &[String]) -> String {
    let mut fact = format!(
        "The International Space Station is currently at latitude {}, longitude {}.",
        latitude, longitude
    );
    if !crew.is_empty() {
        fact.push_str(&format!(
            " There are {} astronauts aboard: {}.",
            crew.len(),
            crew.join(", ")
        ));
    }
    fact
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_crew() {
        let crew = vec!["Jasmin Moghbeli".to_string(), "Andreas Mogensen".to_string()];
        let fact = format_fact("12.34", "-56.78", &crew);
        assert!(fact.contains("latitude 12.34"));
        assert!(fact.contains("2 astronauts"));
        assert!(fact.contains("Jasmin Moghbeli, Andreas Mogensen"));
    }

    #[test]
    fn test_format_without_crew() {
        let fact = format_fact("0.0", "0.0", &[]);
        assert!(fact.contains("longitude 0.0"));
        assert!(!fact.contains("astronauts"));
    }

    #[test]
    fn test_crew_filtered_to_station() {
        let raw = r#"{"people":[{"name":"A","craft":"ISS"},{"name":"B","craft":"Tiangong"}]}"#;
        let response: CrewResponse = serde_json::from_str(raw).unwrap();
        let names: Vec<String> = response
            .people
            .into_iter()
            .filter(|p| p.craft == "ISS")
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["A".to_string()]);
    }
}
