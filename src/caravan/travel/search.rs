//! Travel lookup service.
//!
//! Two pure functions over the static catalogs — [`search_flights`] and
//! [`search_hotels`] — plus [`TravelToolProtocol`], which exposes them as
//! tools to the agent runtime (typically through the stdio tool server).
//!
//! Both functions fail softly: every failure mode is reported as a
//! human-readable string prefixed with `"Error:"`, never as an error value.
//! Given the catalog and the inputs they are fully deterministic.

use crate::caravan::tool_protocol::{
    ToolError, ToolMetadata, ToolParameter, ToolParameterType, ToolProtocol, ToolResult,
};
use crate::caravan::travel::catalog::{FLIGHTS, HOTELS};
use async_trait::async_trait;
use std::error::Error;

/// Search for flights to `destination` with an optional budget ceiling.
///
/// Filters the flight catalog to entries priced at or below `budget` when one
/// is given; renders one line per flight plus a count footer. An empty
/// destination yields `"Error: Destination is required"`; an empty result set
/// yields a "no flights" message mentioning the budget when present.
pub fn search_flights(destination: &str, budget: Option<f64>) -> String {
    if destination.is_empty() {
        return "Error: Destination is required".to_string();
    }

    let flights: Vec<_> = FLIGHTS
        .iter()
        .filter(|f| budget.map_or(true, |b| f.price <= b))
        .collect();

    if flights.is_empty() {
        let budget_text = budget
            .map(|b| format!(" within £{} budget", b))
            .unwrap_or_default();
        return format!("No flights found to {}{}", destination, budget_text);
    }

    let mut result = format!("Flights to {}:\n", destination);
    for flight in &flights {
        result.push_str(&format!(
            "- {}: £{} at {} ({}) - {}\n",
            flight.airline, flight.price, flight.departure_time, flight.duration, flight.route
        ));
    }

    result.push_str(&format!("\nTotal options: {}", flights.len()));
    if let Some(b) = budget {
        result.push_str(&format!(" (within £{} budget)", b));
    }

    result
}

/// Search for hotels in `city` with an optional budget ceiling.
///
/// Same contract shape as [`search_flights`], operating on the hotel catalog.
/// Amenities are comma-joined in catalog order, and each hotel whose catalog
/// city differs from the query string is annotated with its actual city.
pub fn search_hotels(city: &str, budget: Option<f64>) -> String {
    if city.is_empty() {
        return "Error: City is required".to_string();
    }

    let hotels: Vec<_> = HOTELS
        .iter()
        .filter(|h| budget.map_or(true, |b| h.price <= b))
        .collect();

    if hotels.is_empty() {
        let budget_text = budget
            .map(|b| format!(" within £{} budget", b))
            .unwrap_or_default();
        return format!("No hotels found in {}{}", city, budget_text);
    }

    let mut result = format!("Hotels in {}:\n", city);
    for hotel in &hotels {
        let amenities = hotel.amenities.join(", ");
        let city_info = if hotel.city != city {
            format!(" ({})", hotel.city)
        } else {
            String::new()
        };
        result.push_str(&format!(
            "- {}: £{}/night ({} stars) - {}{}\n",
            hotel.name, hotel.price, hotel.rating, amenities, city_info
        ));
    }

    result.push_str(&format!("\nTotal options: {}", hotels.len()));
    if let Some(b) = budget {
        result.push_str(&format!(" (within £{} budget)", b));
    }

    result
}

/// Tool protocol exposing the travel lookup service.
///
/// Registers `search_flights` and `search_hotels` with the parameter schemas
/// the agent runtime needs to call them. Parameter faults are converted to
/// soft `"Error: ..."` text results so the tool boundary never surfaces a
/// transport error for bad arguments.
pub struct TravelToolProtocol;

impl TravelToolProtocol {
    pub fn new() -> Self {
        Self
    }

    /// Pull an optional numeric budget out of the call parameters.
    ///
    /// Returns `Err` with a soft error message when the parameter is present
    /// but not numeric.
    fn parse_budget(parameters: &serde_json::Value) -> Result<Option<f64>, String> {
        match parameters.get("budget") {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| "budget must be a number".to_string()),
        }
    }
}

impl Default for TravelToolProtocol {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolProtocol for TravelToolProtocol {
    async fn execute(
        &self,
        tool_name: &str,
        parameters: serde_json::Value,
    ) -> Result<ToolResult, Box<dyn Error + Send + Sync>> {
        match tool_name {
            "search_flights" => {
                let destination = parameters
                    .get("destination")
                    .and_then(|v| v.as_str())
                    .unwrap_or("");
                let budget = match Self::parse_budget(&parameters) {
                    Ok(budget) => budget,
                    Err(e) => {
                        return Ok(ToolResult::success(serde_json::Value::String(format!(
                            "Error searching flights: {}",
                            e
                        ))))
                    }
                };
                log::info!(
                    "travel tool called: search_flights(destination={}, budget={:?})",
                    destination,
                    budget
                );
                Ok(ToolResult::success(serde_json::Value::String(
                    search_flights(destination, budget),
                )))
            }
            "search_hotels" => {
                let city = parameters.get("city").and_then(|v| v.as_str()).unwrap_or("");
                let budget = match Self::parse_budget(&parameters) {
                    Ok(budget) => budget,
                    Err(e) => {
                        return Ok(ToolResult::success(serde_json::Value::String(format!(
                            "Error searching hotels: {}",
                            e
                        ))))
                    }
                };
                log::info!(
                    "travel tool called: search_hotels(city={}, budget={:?})",
                    city,
                    budget
                );
                Ok(ToolResult::success(serde_json::Value::String(
                    search_hotels(city, budget),
                )))
            }
            other => Err(Box::new(ToolError::NotFound(other.to_string()))),
        }
    }

    async fn list_tools(&self) -> Result<Vec<ToolMetadata>, Box<dyn Error + Send + Sync>> {
        Ok(vec![
            ToolMetadata::new(
                "search_flights",
                "Search for flights to a destination with optional budget filter",
            )
            .with_parameter(
                ToolParameter::new("destination", ToolParameterType::String)
                    .with_description("Destination city or region")
                    .required(),
            )
            .with_parameter(
                ToolParameter::new("budget", ToolParameterType::Number)
                    .with_description("Maximum ticket price in GBP"),
            ),
            ToolMetadata::new(
                "search_hotels",
                "Search for hotels in a city with optional budget filter",
            )
            .with_parameter(
                ToolParameter::new("city", ToolParameterType::String)
                    .with_description("City to search hotels in")
                    .required(),
            )
            .with_parameter(
                ToolParameter::new("budget", ToolParameterType::Number)
                    .with_description("Maximum nightly price in GBP"),
            ),
        ])
    }

    fn protocol_name(&self) -> &str {
        "travel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flights_budget_filter_is_price_only() {
        let report = search_flights("Tunis", Some(200.0));
        // £185 Ryanair is the single entry at or under £200
        assert!(report.contains("Ryanair"));
        assert!(report.contains("London-Tunis"));
        assert!(!report.contains("British Airways"));
        assert!(!report.contains("EasyJet"));
        assert!(report.contains("Total options: 1 (within £200 budget)"));
    }

    #[test]
    fn flights_without_budget_return_everything() {
        let report = search_flights("Tunis", None);
        for airline in ["Tunisair", "British Airways", "EasyJet", "Ryanair", "Nouvelair"] {
            assert!(report.contains(airline), "missing {}", airline);
        }
        assert!(report.contains("Total options: 8"));
        assert!(!report.contains("budget"));
    }

    #[test]
    fn flights_empty_destination_is_soft_error() {
        assert_eq!(search_flights("", None), "Error: Destination is required");
        assert_eq!(
            search_flights("", Some(100.0)),
            "Error: Destination is required"
        );
    }

    #[test]
    fn flights_no_results_mentions_budget() {
        let report = search_flights("Tunis", Some(50.0));
        assert_eq!(report, "No flights found to Tunis within £50 budget");
    }

    #[test]
    fn hotels_annotate_mismatched_cities_only() {
        let report = search_hotels("Tozeur", None);
        // Tozeur hotels carry no annotation, others name their actual city
        assert!(report.contains("- Dar Hi Tozeur: £75/night (4.3 stars)"));
        assert!(!report.contains("Desert Views, Traditional Architecture ("));
        assert!(report.contains("Hotel Laico Tunis"));
        assert!(report.contains("(Tunis)"));
        assert!(report.contains("(Sidi Bou Said)"));
        assert!(report.contains("Total options: 9"));
    }

    #[test]
    fn hotels_amenities_are_comma_joined_in_order() {
        let report = search_hotels("Tunis", None);
        assert!(report.contains("WiFi, Pool, Beach Access, Spa, Restaurant"));
        assert!(report.contains("WiFi, Pool, Luxury Spa, Fine Dining, Concierge"));
    }

    #[test]
    fn hotels_empty_city_is_soft_error() {
        assert_eq!(search_hotels("", None), "Error: City is required");
    }

    #[test]
    fn hotels_no_results_mentions_budget() {
        let report = search_hotels("Tozeur", Some(10.0));
        assert_eq!(report, "No hotels found in Tozeur within £10 budget");
    }

    #[tokio::test]
    async fn protocol_routes_and_fails_softly() {
        let protocol = TravelToolProtocol::new();

        let listing = protocol.list_tools().await.unwrap();
        assert_eq!(listing.len(), 2);

        // Missing destination parameter degrades to the soft error string
        let result = protocol
            .execute("search_flights", serde_json::json!({}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output_text(), "Error: Destination is required");

        // Non-numeric budget degrades to the soft error string
        let result = protocol
            .execute(
                "search_hotels",
                serde_json::json!({"city": "Tunis", "budget": "cheap"}),
            )
            .await
            .unwrap();
        assert!(result.output_text().starts_with("Error searching hotels:"));

        // Unknown tools are a protocol error, not a soft error
        assert!(protocol
            .execute("teleport", serde_json::json!({}))
            .await
            .is_err());
    }
}
