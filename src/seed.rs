//! Built-in mock data the store starts from.

use crate::model::{Coordinate, ParkingSlot, SlotStatus, VehicleType};

pub const USER_LOCATION: Coordinate = Coordinate {
    lat: 40.7589,
    lng: -73.9851,
};

#[allow(clippy::too_many_arguments)]
fn slot(
    id: &str,
    name: &str,
    address: &str,
    lat: f64,
    lng: f64,
    status: SlotStatus,
    vehicle: VehicleType,
    price: f64,
    distance: &str,
) -> ParkingSlot {
    ParkingSlot {
        id: id.to_string(),
        name: name.to_string(),
        address: address.to_string(),
        location: Coordinate::new(lat, lng),
        status,
        vehicle,
        price,
        distance: distance.to_string(),
    }
}

/// The eight seed slots. Slot "4" starts out reserved without a reservation.
pub fn initial_slots() -> Vec<ParkingSlot> {
    use SlotStatus::*;
    use VehicleType::*;

    vec![
        slot("1", "KhUshi Parking Lot", "West khulshi", 40.7589, -73.9851, Available, Car, 50.0, "200m"),
        slot("2", "City Center Garage", "456 Center Ave", 40.7599, -73.9841, Available, Car, 80.0, "350m"),
        slot("3", "Sanmar Parking", "Sanmar Road, 2 no gate", 40.7579, -73.9861, Occupied, Car, 40.0, "450m"),
        slot("4", "GEC Parking Lot", "GEC Mor", 40.7609, -73.9831, Reserved, Car, 60.0, "500m"),
        slot("5", "Park View Parking", "Panchlaish R/A", 40.7569, -73.9871, Available, Bike, 20.0, "600m"),
        slot("6", "Wireless Road Parking", "Wireless Rd", 40.7619, -73.9821, Available, Car, 60.0, "750m"),
        slot("7", "University Parking", "USTC Campus", 40.7559, -73.9881, Occupied, Car, 50.0, "800m"),
        slot("8", "Yunosco Mall Parking", "GEC Mor", 40.7629, -73.9811, Available, Car, 100.0, "900m"),
    ]
}
