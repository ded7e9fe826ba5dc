use caravan::travel::{search_flights, search_hotels, TravelToolProtocol, FLIGHTS, HOTELS};

use caravan::tool_protocol::ToolProtocol;

#[test]
fn budget_filter_returns_only_records_at_or_under_budget() {
    for budget in [50.0, 185.0, 200.0, 280.0, 320.0, 1000.0] {
        let report = search_flights("Tunis", Some(budget));
        for flight in FLIGHTS.iter() {
            let line = format!(
                "- {}: £{} at {}",
                flight.airline, flight.price, flight.departure_time
            );
            if flight.price <= budget {
                assert!(
                    report.contains(&line),
                    "budget {} should include {}",
                    budget,
                    line
                );
            } else {
                assert!(
                    !report.contains(&line),
                    "budget {} should exclude {}",
                    budget,
                    line
                );
            }
        }
    }
}

#[test]
fn no_budget_returns_all_records_regardless_of_price() {
    let report = search_flights("Djerba", None);
    for flight in FLIGHTS.iter() {
        assert!(report.contains(&format!("£{}", flight.price)));
    }
    assert!(report.contains(&format!("Total options: {}", FLIGHTS.len())));
}

#[test]
fn empty_destination_yields_fixed_error_string() {
    assert_eq!(search_flights("", None), "Error: Destination is required");
    assert_eq!(
        search_flights("", Some(9999.0)),
        "Error: Destination is required"
    );
}

#[test]
fn tunis_with_budget_200_includes_ryanair_excludes_british_airways() {
    let report = search_flights("Tunis", Some(200.0));

    // The £185 Ryanair London-Tunis entry is the only qualifying flight
    assert!(report.contains("- Ryanair: £185 at 6:15 AM (3h 50m) - London-Tunis"));
    assert!(!report.contains("British Airways"));
    assert!(!report.contains("£320"));
    assert!(!report.contains("EasyJet"));
    assert!(report.contains("Total options: 1 (within £200 budget)"));
}

#[test]
fn tozeur_hotels_appear_in_catalog_order_with_joined_amenities() {
    let report = search_hotels("Tozeur", None);

    let dar_hi = report.find("Dar Hi Tozeur").expect("Dar Hi listed");
    let anantara = report
        .find("Anantara Tozeur Resort")
        .expect("Anantara listed");
    let ras_el_ain = report
        .find("Hotel Ras El Ain Tozeur")
        .expect("Ras El Ain listed");
    assert!(
        dar_hi < anantara && anantara < ras_el_ain,
        "catalog order preserved"
    );

    // Amenity lists comma-joined in original order
    assert!(report.contains("WiFi, Pool, Desert Views, Traditional Architecture"));
    assert!(report.contains("WiFi, Pool, Spa, Desert Safari, Fine Dining"));
    assert!(report.contains("WiFi, Restaurant, Oasis Views"));

    // Tozeur entries carry no annotation; others name their city
    assert!(!report.contains("Traditional Architecture ("));
    assert!(report.contains("(Tunis)"));
    assert!(report.contains("(Djerba)"));
    assert!(report.contains("(Sidi Bou Said)"));
}

#[test]
fn hotel_budget_footer_and_filtering() {
    let report = search_hotels("Tunis", Some(100.0));
    assert!(report.contains("Hotel Laico Tunis"));
    assert!(report.contains("Hotel Majestic"));
    assert!(!report.contains("Mövenpick Gammarth"));
    assert!(!report.contains("Four Seasons Tunis"));

    let expected = HOTELS.iter().filter(|h| h.price <= 100.0).count();
    assert!(report.contains(&format!("Total options: {} (within £100 budget)", expected)));
}

#[test]
fn empty_result_messages_mention_budget_only_when_present() {
    assert_eq!(
        search_flights("Monastir", Some(10.0)),
        "No flights found to Monastir within £10 budget"
    );
    assert_eq!(
        search_hotels("Tunis", Some(1.0)),
        "No hotels found in Tunis within £1 budget"
    );
}

#[tokio::test]
async fn protocol_lists_both_tools_with_required_params() {
    let protocol = TravelToolProtocol::new();
    let tools = protocol.list_tools().await.unwrap();
    assert_eq!(tools.len(), 2);

    let flights = tools.iter().find(|t| t.name == "search_flights").unwrap();
    let destination = flights
        .parameters
        .iter()
        .find(|p| p.name == "destination")
        .unwrap();
    assert!(destination.required);
    let budget = flights
        .parameters
        .iter()
        .find(|p| p.name == "budget")
        .unwrap();
    assert!(!budget.required);

    assert!(tools.iter().any(|t| t.name == "search_hotels"));
}

#[tokio::test]
async fn protocol_execute_matches_pure_functions() {
    let protocol = TravelToolProtocol::new();

    let result = protocol
        .execute(
            "search_flights",
            serde_json::json!({"destination": "Tunis", "budget": 200}),
        )
        .await
        .unwrap();
    assert_eq!(result.output_text(), search_flights("Tunis", Some(200.0)));

    let result = protocol
        .execute("search_hotels", serde_json::json!({"city": "Tozeur"}))
        .await
        .unwrap();
    assert_eq!(result.output_text(), search_hotels("Tozeur", None));
}
