//! Domain types for parking slots, reservations and the signed-in user.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Duration choices offered by the slot details picker (hours)
pub const DURATION_CHOICES: &[f64] = &[0.5, 1.0, 2.0, 3.0, 4.0, 8.0];

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Occupancy status of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    #[default]
    Available,
    Reserved,
    Occupied,
}

impl SlotStatus {
    pub const ALL: [SlotStatus; 3] = [Self::Available, Self::Reserved, Self::Occupied];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "available" => Some(Self::Available),
            "reserved" => Some(Self::Reserved),
            "occupied" => Some(Self::Occupied),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Occupied => "occupied",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Reserved => "Reserved",
            Self::Occupied => "Occupied",
        }
    }

    /// Next status in the admin toggle cycle: available -> reserved -> occupied -> available
    pub fn next(&self) -> Self {
        match self {
            Self::Available => Self::Reserved,
            Self::Reserved => Self::Occupied,
            Self::Occupied => Self::Available,
        }
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vehicle type a slot accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    #[default]
    Car,
    Bike,
}

impl VehicleType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "car" => Some(Self::Car),
            "bike" => Some(Self::Bike),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Bike => "bike",
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parking space
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParkingSlot {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub location: Coordinate,
    #[serde(default)]
    pub status: SlotStatus,
    #[serde(default, rename = "type")]
    pub vehicle: VehicleType,
    /// Hourly price
    pub price: f64,
    /// Display-only distance string, never computed
    #[serde(default)]
    pub distance: String,
}

impl ParkingSlot {
    /// True when `query` (already lowercased) is a substring of the name or address
    pub fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query) || self.address.to_lowercase().contains(query)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    #[default]
    Active,
    /// Defined for completeness; nothing in this program sets it
    Expired,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
        }
    }
}

/// A claim on a slot. Slot name, address and coordinates are copied at creation
/// time and are not refreshed if the slot changes later.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reservation {
    pub id: String,
    pub slot_id: String,
    pub slot_name: String,
    pub location: String,
    pub coordinate: Coordinate,
    pub start_time: DateTime<Utc>,
    /// Hours
    pub duration: f64,
    pub status: ReservationStatus,
}

impl Reservation {
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub is_admin: bool,
}

/// Validated attributes for a slot added from the admin panel
#[derive(Debug, Clone, PartialEq)]
pub struct NewSlot {
    pub name: String,
    pub address: String,
    pub vehicle: VehicleType,
    pub price: f64,
    pub status: SlotStatus,
    /// Placed near the user location when absent
    pub location: Option<Coordinate>,
    pub distance: Option<String>,
}

/// Raw admin form input, as typed by the user
#[derive(Debug, Clone)]
pub struct SlotDraft {
    pub name: String,
    pub address: String,
    pub vehicle: String,
    pub price: String,
    pub status: String,
}

impl Default for SlotDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            vehicle: "car".to_string(),
            price: "5".to_string(),
            status: "available".to_string(),
        }
    }
}

impl SlotDraft {
    pub fn validate(&self) -> Result<NewSlot, StoreError> {
        let name = self.name.trim();
        let address = self.address.trim();
        if name.is_empty() || address.is_empty() {
            return Err(StoreError::validation(
                if name.is_empty() { "name" } else { "address" },
                "Please fill in all fields",
            ));
        }

        let vehicle = VehicleType::from_str(&self.vehicle).ok_or_else(|| {
            StoreError::validation("type", format!("unknown slot type '{}'", self.vehicle))
        })?;
        let status = SlotStatus::from_str(&self.status).ok_or_else(|| {
            StoreError::validation("status", format!("unknown status '{}'", self.status))
        })?;
        let price = parse_price(&self.price)?;

        Ok(NewSlot {
            name: name.to_string(),
            address: address.to_string(),
            vehicle,
            price,
            status,
            location: None,
            distance: None,
        })
    }
}

/// Parse a non-negative hourly price
pub fn parse_price(raw: &str) -> Result<f64, StoreError> {
    match raw.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        Ok(_) => Err(StoreError::validation(
            "price",
            "price must be a non-negative number",
        )),
        Err(_) => Err(StoreError::validation(
            "price",
            format!("'{}' is not a number", raw.trim()),
        )),
    }
}

/// Parse a positive reservation duration in hours
pub fn parse_duration(raw: &str) -> Result<f64, StoreError> {
    let hours = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| StoreError::validation("duration", format!("'{}' is not a number", raw)))?;
    check_duration(hours)?;
    Ok(hours)
}

pub fn check_duration(hours: f64) -> Result<(), StoreError> {
    if hours.is_finite() && hours > 0.0 {
        Ok(())
    } else {
        Err(StoreError::validation(
            "duration",
            "duration must be a positive number of hours",
        ))
    }
}

/// "30 min", "1 hour", "2 hours"
pub fn format_duration(hours: f64) -> String {
    if hours < 1.0 {
        format!("{} min", (hours * 60.0).round() as i64)
    } else if hours == 1.0 {
        "1 hour".to_string()
    } else {
        format!("{} hours", hours)
    }
}

pub fn format_price(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("${:.0}", amount)
    } else {
        format!("${:.2}", amount)
    }
}
