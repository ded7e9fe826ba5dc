//! Static travel catalogs.
//!
//! Immutable flight and hotel tables loaded once at startup. These back the
//! lookup service in [`crate::travel::search`] — there is no datastore, no
//! refresh, no mutation; the catalogs live from process startup to shutdown.

use lazy_static::lazy_static;

/// A single flight offering in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    /// Operating airline.
    pub airline: String,
    /// Ticket price in GBP.
    pub price: f64,
    /// Local departure time, preformatted.
    pub departure_time: String,
    /// Flight duration, preformatted.
    pub duration: String,
    /// Origin-destination pair, e.g. `"London-Tunis"`.
    pub route: String,
}

/// A single hotel offering in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct HotelRecord {
    /// Display name.
    pub name: String,
    /// Nightly price in GBP.
    pub price: f64,
    /// Guest rating out of 5.
    pub rating: f64,
    /// Amenities in presentation order.
    pub amenities: Vec<String>,
    /// City the hotel is located in.
    pub city: String,
}

impl FlightRecord {
    fn new(airline: &str, price: f64, departure_time: &str, duration: &str, route: &str) -> Self {
        Self {
            airline: airline.to_string(),
            price,
            departure_time: departure_time.to_string(),
            duration: duration.to_string(),
            route: route.to_string(),
        }
    }
}

impl HotelRecord {
    fn new(name: &str, price: f64, rating: f64, amenities: &[&str], city: &str) -> Self {
        Self {
            name: name.to_string(),
            price,
            rating,
            amenities: amenities.iter().map(|a| a.to_string()).collect(),
            city: city.to_string(),
        }
    }
}

lazy_static! {
    /// Flight catalog — London to Tunisia routes.
    pub static ref FLIGHTS: Vec<FlightRecord> = vec![
        FlightRecord::new("Tunisair", 280.0, "7:30 AM", "3h 15m", "London-Tunis"),
        FlightRecord::new("British Airways", 320.0, "1:00 PM", "3h 30m", "London-Tunis"),
        FlightRecord::new("Tunisair", 345.0, "5:30 PM", "4h 15m", "London-Djerba"),
        FlightRecord::new("EasyJet", 210.0, "9:00 AM", "3h 45m", "London-Monastir"),
        FlightRecord::new("Tunisair Express", 265.0, "11:30 AM", "3h 20m", "London-Enfidha"),
        FlightRecord::new("Ryanair", 185.0, "6:15 AM", "3h 50m", "London-Tunis"),
        FlightRecord::new("Tunisair", 385.0, "3:45 PM", "4h 30m", "London-Tozeur"),
        FlightRecord::new("Nouvelair", 295.0, "8:20 AM", "4h 10m", "London-Tozeur"),
    ];

    /// Hotel catalog — Tunisia destinations.
    pub static ref HOTELS: Vec<HotelRecord> = vec![
        HotelRecord::new(
            "Hotel Laico Tunis", 85.0, 4.6,
            &["WiFi", "Pool", "Spa", "Restaurant"], "Tunis",
        ),
        HotelRecord::new(
            "Mövenpick Gammarth", 125.0, 4.8,
            &["WiFi", "Pool", "Beach Access", "Spa", "Restaurant"], "Tunis",
        ),
        HotelRecord::new(
            "Hotel Majestic", 45.0, 3.8,
            &["WiFi", "Restaurant", "City Center"], "Tunis",
        ),
        HotelRecord::new(
            "Radisson Blu Palace Djerba", 105.0, 4.7,
            &["WiFi", "Pool", "Beach", "Spa"], "Djerba",
        ),
        HotelRecord::new(
            "Hotel Sidi Mansour", 55.0, 4.2,
            &["WiFi", "Pool", "Traditional Decor"], "Sidi Bou Said",
        ),
        HotelRecord::new(
            "Four Seasons Tunis", 195.0, 4.9,
            &["WiFi", "Pool", "Luxury Spa", "Fine Dining", "Concierge"], "Tunis",
        ),
        HotelRecord::new(
            "Dar Hi Tozeur", 75.0, 4.3,
            &["WiFi", "Pool", "Desert Views", "Traditional Architecture"], "Tozeur",
        ),
        HotelRecord::new(
            "Anantara Tozeur Resort", 225.0, 4.7,
            &["WiFi", "Pool", "Spa", "Desert Safari", "Fine Dining"], "Tozeur",
        ),
        HotelRecord::new(
            "Hotel Ras El Ain Tozeur", 35.0, 3.5,
            &["WiFi", "Restaurant", "Oasis Views"], "Tozeur",
        ),
    ];
}
