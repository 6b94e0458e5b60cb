use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ToolDefinition, ToolError};

const ENDPOINT: &str = "https://weather.googleapis.com/v1/currentConditions:lookup";

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
struct WeatherInput {
    #[schemars(description = "The latitude of the location to get the weather for.")]
    latitude: f64,
    #[schemars(description = "The longitude of the location to get the weather for.")]
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    #[serde(rename = "weatherCondition")]
    weather_condition: WeatherCondition,
    temperature: Temperature,
}

#[derive(Debug, Deserialize)]
struct WeatherCondition {
    description: ConditionDescription,
}

#[derive(Debug, Deserialize)]
struct ConditionDescription {
    text: String,
}

#[derive(Debug, Deserialize)]
struct Temperature {
    degrees: f64,
}

async fn lookup(
    client: reqwest::Client,
    api_key: String,
    input: serde_json::Value,
) -> Result<String, ToolError> {
    let input: WeatherInput = serde_json::from_value(input).map_err(ToolError::Input)?;

    // Coordinates go to the provider as-is; range validation is its problem.
    let latitude = input.latitude.to_string();
    let longitude = input.longitude.to_string();
    let response = client
        .get(ENDPOINT)
        .query(&[
            ("key", api_key.as_str()),
            ("location.latitude", latitude.as_str()),
            ("location.longitude", longitude.as_str()),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ToolError::Status(response.status()));
    }

    let body = response.text().await?;
    let conditions: CurrentConditions =
        serde_json::from_str(&body).map_err(ToolError::Malformed)?;

    Ok(format_conditions(
        input.latitude,
        input.longitude,
        &conditions,
    ))
}

fn format_conditions(latitude: f64, longitude: f64, conditions: &CurrentConditions) -> String {
    format!(
        "The weather in {}, {} is {} and {} degrees celsius.",
        latitude,
        longitude,
        conditions.weather_condition.description.text,
        conditions.temperature.degrees
    )
}

pub(crate) fn definition(client: reqwest::Client, api_key: String) -> ToolDefinition {
    ToolDefinition {
        name: "Weather",
        description: "Get the current weather at a given latitude/longitude, returned as a plain sentence with conditions and temperature in celsius.",
        input_schema: serde_json::to_value(schema_for!(WeatherInput)).unwrap(),
        handler: Arc::new(move |input| {
            Box::pin(lookup(client.clone(), api_key.clone(), input))
        }),
    }
}
