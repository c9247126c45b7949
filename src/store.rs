//! Reservation/slot state store.
//!
//! Owns the slot collection, the reservation list and the session state
//! (user, selection, screen, theme). Reservations drive slot status:
//! reserving moves a slot from `available` to `reserved` and cancelling moves
//! it back. Admin status writes bypass that bookkeeping; every such write is
//! recorded in the override audit so the resulting drift stays visible.
//!
//! Every command either fully applies or returns an error without touching
//! state. Successful commands queue a [`StoreEvent`] for the front-end to drain.

use crate::error::StoreError;
use crate::model::{
    check_duration, Coordinate, NewSlot, ParkingSlot, Reservation, ReservationStatus, SlotStatus,
    User,
};
use crate::screen::Screen;
use crate::seed;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Degrees of jitter applied around the user location for new admin slots
const NEW_SLOT_JITTER: f64 = 0.005;

/// Session settings the store is constructed with
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub admin_email: String,
    pub dark_mode: bool,
    pub user_location: Coordinate,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            admin_email: "admin@parking.com".to_string(),
            dark_mode: false,
            user_location: seed::USER_LOCATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignInMethod {
    Password,
    Signup,
    Google,
}

/// Notification of a state change, drained by the front-end
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    SlotReserved {
        reservation_id: String,
        slot_id: String,
        slot_name: String,
        duration: f64,
    },
    ReservationCancelled {
        reservation_id: String,
        slot_id: String,
        slot_name: String,
    },
    SlotStatusChanged {
        slot_id: String,
        from: SlotStatus,
        to: SlotStatus,
        active_reservations: usize,
    },
    SlotAdded {
        slot_id: String,
        name: String,
    },
    SignedIn {
        email: String,
        is_admin: bool,
        method: SignInMethod,
    },
    SignedOut,
    ThemeChanged {
        dark: bool,
    },
    SlotSelected {
        slot_id: Option<String>,
    },
    ScreenChanged {
        from: Screen,
        to: Screen,
    },
}

/// Audit record for a direct admin status write
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusOverride {
    pub slot_id: String,
    pub from: SlotStatus,
    pub to: SlotStatus,
    pub active_reservations: usize,
    pub at: DateTime<Utc>,
}

/// A slot whose status disagrees with its active reservations
#[derive(Debug, Clone, PartialEq)]
pub struct InvariantViolation {
    pub slot_id: String,
    pub status: SlotStatus,
    pub active_reservations: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub available: usize,
    pub reserved: usize,
    pub occupied: usize,
}

impl StatusCounts {
    pub fn get(&self, status: SlotStatus) -> usize {
        match status {
            SlotStatus::Available => self.available,
            SlotStatus::Reserved => self.reserved,
            SlotStatus::Occupied => self.occupied,
        }
    }
}

pub struct Store {
    /// Insertion ordered; ids are unique
    slots: Vec<ParkingSlot>,
    reservations: Vec<Reservation>,
    user: Option<User>,
    selected: Option<String>,
    screen: Screen,
    dark_mode: bool,
    user_location: Coordinate,
    admin_email: String,
    overrides: Vec<StatusOverride>,
    events: Vec<StoreEvent>,
    last_id: i64,
}

impl Store {
    pub fn new(slots: Vec<ParkingSlot>, settings: StoreSettings) -> Self {
        Self {
            slots,
            reservations: Vec::new(),
            user: None,
            selected: None,
            screen: Screen::Splash,
            dark_mode: settings.dark_mode,
            user_location: settings.user_location,
            admin_email: settings.admin_email,
            overrides: Vec::new(),
            events: Vec::new(),
            last_id: 0,
        }
    }

    /// Store over the built-in mock slots with default settings
    pub fn seeded() -> Self {
        Self::new(seed::initial_slots(), StoreSettings::default())
    }

    // ------------------------------------------------------------------
    // Reservations
    // ------------------------------------------------------------------

    /// Reserve an available slot for `duration` hours.
    ///
    /// Fails with `SlotUnavailable` when the slot is unknown, not `available`,
    /// or already referenced by an active reservation.
    pub fn reserve_slot(&mut self, slot_id: &str, duration: f64) -> Result<&Reservation, StoreError> {
        check_duration(duration)?;

        let idx = self.slot_index(slot_id).ok_or_else(|| StoreError::SlotUnavailable {
            slot_id: slot_id.to_string(),
            status: None,
            reason: "no such slot".to_string(),
        })?;

        let status = self.slots[idx].status;
        if status != SlotStatus::Available {
            info!(slot_id, status = %status, "reservation rejected");
            return Err(StoreError::SlotUnavailable {
                slot_id: slot_id.to_string(),
                status: Some(status),
                reason: status.as_str().to_string(),
            });
        }

        if self.active_reservation_for(slot_id).is_some() {
            info!(slot_id, "reservation rejected, slot already has an active reservation");
            return Err(StoreError::SlotUnavailable {
                slot_id: slot_id.to_string(),
                status: Some(status),
                reason: "already has an active reservation".to_string(),
            });
        }

        let id = self.next_id();
        let slot = &mut self.slots[idx];
        slot.status = SlotStatus::Reserved;
        let reservation = Reservation {
            id: id.clone(),
            slot_id: slot.id.clone(),
            slot_name: slot.name.clone(),
            location: slot.address.clone(),
            coordinate: slot.location,
            start_time: Utc::now(),
            duration,
            status: ReservationStatus::Active,
        };
        debug!(reservation_id = %id, slot_id, duration, "slot reserved");
        self.events.push(StoreEvent::SlotReserved {
            reservation_id: id,
            slot_id: reservation.slot_id.clone(),
            slot_name: reservation.slot_name.clone(),
            duration,
        });
        self.reservations.push(reservation);

        Ok(&self.reservations[self.reservations.len() - 1])
    }

    /// Remove a reservation and release its slot.
    ///
    /// The slot goes back to `available` unconditionally. Unknown ids return
    /// `NotFound` and change nothing, so a repeated cancel is harmless.
    pub fn cancel_reservation(&mut self, reservation_id: &str) -> Result<Reservation, StoreError> {
        let pos = self
            .reservations
            .iter()
            .position(|r| r.id == reservation_id)
            .ok_or_else(|| StoreError::not_found("reservation", reservation_id))?;

        let reservation = self.reservations.remove(pos);
        if let Some(idx) = self.slot_index(&reservation.slot_id) {
            self.slots[idx].status = SlotStatus::Available;
        }

        debug!(reservation_id, slot_id = %reservation.slot_id, "reservation cancelled");
        self.events.push(StoreEvent::ReservationCancelled {
            reservation_id: reservation.id.clone(),
            slot_id: reservation.slot_id.clone(),
            slot_name: reservation.slot_name.clone(),
        });
        Ok(reservation)
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    /// Write a slot status directly, bypassing reservation bookkeeping.
    /// Returns the previous status.
    pub fn set_slot_status(&mut self, slot_id: &str, status: SlotStatus) -> Result<SlotStatus, StoreError> {
        let idx = self
            .slot_index(slot_id)
            .ok_or_else(|| StoreError::not_found("slot", slot_id))?;

        let from = self.slots[idx].status;
        self.slots[idx].status = status;
        let active = self.active_count_for(slot_id);

        let consistent = (status == SlotStatus::Reserved) == (active > 0);
        if consistent {
            debug!(slot_id, from = %from, to = %status, "slot status overridden");
        } else {
            warn!(
                slot_id,
                from = %from,
                to = %status,
                active_reservations = active,
                "slot status override disagrees with active reservations"
            );
        }

        self.overrides.push(StatusOverride {
            slot_id: slot_id.to_string(),
            from,
            to: status,
            active_reservations: active,
            at: Utc::now(),
        });
        self.events.push(StoreEvent::SlotStatusChanged {
            slot_id: slot_id.to_string(),
            from,
            to: status,
            active_reservations: active,
        });
        Ok(from)
    }

    /// Advance a slot one step through available -> reserved -> occupied
    pub fn cycle_slot_status(&mut self, slot_id: &str) -> Result<SlotStatus, StoreError> {
        let current = self
            .slot(slot_id)
            .map(|s| s.status)
            .ok_or_else(|| StoreError::not_found("slot", slot_id))?;
        let next = current.next();
        self.set_slot_status(slot_id, next)?;
        Ok(next)
    }

    /// Append a slot with a generated id. No duplicate detection.
    pub fn add_slot(&mut self, new: NewSlot) -> Result<&ParkingSlot, StoreError> {
        if new.name.trim().is_empty() {
            return Err(StoreError::validation("name", "Please fill in all fields"));
        }
        if new.address.trim().is_empty() {
            return Err(StoreError::validation("address", "Please fill in all fields"));
        }
        if !new.price.is_finite() || new.price < 0.0 {
            return Err(StoreError::validation(
                "price",
                "price must be a non-negative number",
            ));
        }

        let mut rng = rand::thread_rng();
        let location = new.location.unwrap_or_else(|| {
            Coordinate::new(
                self.user_location.lat + rng.gen_range(-NEW_SLOT_JITTER..NEW_SLOT_JITTER),
                self.user_location.lng + rng.gen_range(-NEW_SLOT_JITTER..NEW_SLOT_JITTER),
            )
        });
        let distance = new
            .distance
            .unwrap_or_else(|| format!("{}m", rng.gen_range(0..1000)));

        let slot = ParkingSlot {
            id: self.next_id(),
            name: new.name.trim().to_string(),
            address: new.address.trim().to_string(),
            location,
            status: new.status,
            vehicle: new.vehicle,
            price: new.price,
            distance,
        };
        debug!(slot_id = %slot.id, name = %slot.name, "slot added");
        self.events.push(StoreEvent::SlotAdded {
            slot_id: slot.id.clone(),
            name: slot.name.clone(),
        });
        self.slots.push(slot);

        Ok(&self.slots[self.slots.len() - 1])
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Mocked sign-in; no credential check. The admin flag is granted only to
    /// the configured admin email on a password login.
    pub fn sign_in(&mut self, email: &str, method: SignInMethod) -> Result<&User, StoreError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(StoreError::validation("email", "Please fill in all fields"));
        }

        let is_admin =
            method == SignInMethod::Password && email.eq_ignore_ascii_case(&self.admin_email);
        let user = User {
            id: "1".to_string(),
            name: if is_admin { "Admin User" } else { "John Doe" }.to_string(),
            email: email.to_string(),
            avatar: None,
            is_admin,
        };

        debug!(email, is_admin, ?method, "signed in");
        self.events.push(StoreEvent::SignedIn {
            email: user.email.clone(),
            is_admin,
            method,
        });
        Ok(self.user.insert(user))
    }

    pub fn login(&mut self, email: &str) -> Result<&User, StoreError> {
        self.sign_in(email, SignInMethod::Password)
    }

    pub fn logout(&mut self) {
        if self.user.take().is_some() {
            debug!("signed out");
            self.events.push(StoreEvent::SignedOut);
        }
    }

    pub fn set_theme(&mut self, dark: bool) {
        self.dark_mode = dark;
        self.events.push(StoreEvent::ThemeChanged { dark });
    }

    /// Select a slot by id, or clear the selection
    pub fn select_slot(&mut self, slot_id: Option<&str>) -> Result<(), StoreError> {
        if let Some(id) = slot_id {
            if self.slot_index(id).is_none() {
                return Err(StoreError::not_found("slot", id));
            }
        }
        let selected = slot_id.map(str::to_string);
        if selected != self.selected {
            self.selected = selected.clone();
            self.events.push(StoreEvent::SlotSelected { slot_id: selected });
        }
        Ok(())
    }

    /// Navigate by screen identifier; unknown identifiers land on splash
    pub fn navigate_to(&mut self, screen_id: &str) -> Screen {
        let screen = Screen::from_id(screen_id);
        if screen.id() != screen_id {
            debug!(screen_id, "unknown screen, falling back to splash");
        }
        self.navigate(screen);
        screen
    }

    pub fn navigate(&mut self, screen: Screen) {
        if screen != self.screen {
            let from = std::mem::replace(&mut self.screen, screen);
            self.events.push(StoreEvent::ScreenChanged { from, to: screen });
        }
    }

    /// Take the events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn slots(&self) -> &[ParkingSlot] {
        &self.slots
    }

    pub fn slot(&self, slot_id: &str) -> Option<&ParkingSlot> {
        self.slots.iter().find(|s| s.id == slot_id)
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn reservation(&self, reservation_id: &str) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == reservation_id)
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }

    pub fn selected_slot(&self) -> Option<&ParkingSlot> {
        self.selected.as_deref().and_then(|id| self.slot(id))
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn user_location(&self) -> Coordinate {
        self.user_location
    }

    pub fn overrides(&self) -> &[StatusOverride] {
        &self.overrides
    }

    /// Slots whose name or address contains `search` (case-insensitive), in
    /// collection order. An empty search returns every slot.
    pub fn filtered_slots(&self, search: &str) -> Vec<&ParkingSlot> {
        let query = search.to_lowercase();
        self.slots.iter().filter(|s| s.matches(&query)).collect()
    }

    pub fn has_active_reservation(&self) -> bool {
        self.reservations.iter().any(Reservation::is_active)
    }

    pub fn active_reservation_for(&self, slot_id: &str) -> Option<&Reservation> {
        self.reservations
            .iter()
            .find(|r| r.is_active() && r.slot_id == slot_id)
    }

    /// Slots where `status == reserved` does not match "has an active reservation"
    pub fn invariant_violations(&self) -> Vec<InvariantViolation> {
        self.slots
            .iter()
            .filter_map(|slot| {
                let active = self.active_count_for(&slot.id);
                let reserved = slot.status == SlotStatus::Reserved;
                (reserved != (active > 0)).then(|| InvariantViolation {
                    slot_id: slot.id.clone(),
                    status: slot.status,
                    active_reservations: active,
                })
            })
            .collect()
    }

    fn slot_index(&self, slot_id: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.id == slot_id)
    }

    fn active_count_for(&self, slot_id: &str) -> usize {
        self.reservations
            .iter()
            .filter(|r| r.is_active() && r.slot_id == slot_id)
            .count()
    }

    /// Millisecond timestamp, bumped when two ids land in the same millisecond
    fn next_id(&mut self) -> String {
        let id = Utc::now().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        id.to_string()
    }
}

/// Number of `available` slots in `slots`
pub fn availability_count<'a>(slots: impl IntoIterator<Item = &'a ParkingSlot>) -> usize {
    slots
        .into_iter()
        .filter(|s| s.status == SlotStatus::Available)
        .count()
}

pub fn status_counts<'a>(slots: impl IntoIterator<Item = &'a ParkingSlot>) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for slot in slots {
        match slot.status {
            SlotStatus::Available => counts.available += 1,
            SlotStatus::Reserved => counts.reserved += 1,
            SlotStatus::Occupied => counts.occupied += 1,
        }
    }
    counts
}

/// Hourly price times duration; no rounding, taxes or fees
pub fn total_price(slot: &ParkingSlot, duration: f64) -> f64 {
    slot.price * duration
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VehicleType;

    fn test_slot(id: &str, name: &str, status: SlotStatus, price: f64) -> ParkingSlot {
        ParkingSlot {
            id: id.to_string(),
            name: name.to_string(),
            address: format!("{} Street", name),
            location: Coordinate::new(40.76, -73.985),
            status,
            vehicle: VehicleType::Car,
            price,
            distance: "100m".to_string(),
        }
    }

    fn two_slot_store() -> Store {
        Store::new(
            vec![
                test_slot("S1", "Alpha", SlotStatus::Available, 50.0),
                test_slot("S2", "Beta", SlotStatus::Available, 30.0),
            ],
            StoreSettings::default(),
        )
    }

    fn new_slot(name: &str) -> NewSlot {
        NewSlot {
            name: name.to_string(),
            address: "1 Dock Rd".to_string(),
            vehicle: VehicleType::Bike,
            price: 12.0,
            status: SlotStatus::Available,
            location: None,
            distance: None,
        }
    }

    fn assert_reserved_implies_active(store: &Store) {
        for slot in store.slots() {
            if slot.status == SlotStatus::Reserved {
                assert!(
                    store.active_reservation_for(&slot.id).is_some(),
                    "slot {} reserved without an active reservation",
                    slot.id
                );
            }
        }
    }

    #[test]
    fn test_scenario_reserve() {
        let mut store = two_slot_store();
        let reservation = store.reserve_slot("S1", 2.0).unwrap().clone();

        assert_eq!(reservation.duration, 2.0);
        assert_eq!(reservation.slot_id, "S1");
        assert_eq!(reservation.slot_name, "Alpha");
        assert_eq!(reservation.status, ReservationStatus::Active);

        let slot = store.slot("S1").unwrap();
        assert_eq!(slot.status, SlotStatus::Reserved);
        assert_eq!(total_price(slot, reservation.duration), 100.0);
        assert_reserved_implies_active(&store);
    }

    #[test]
    fn test_scenario_reserve_twice_rejected() {
        let mut store = two_slot_store();
        store.reserve_slot("S1", 2.0).unwrap();

        let err = store.reserve_slot("S1", 1.0).unwrap_err();
        assert!(matches!(
            err,
            StoreError::SlotUnavailable {
                status: Some(SlotStatus::Reserved),
                ..
            }
        ));
        assert_eq!(store.reservations().len(), 1);
        assert_eq!(store.slot("S1").unwrap().status, SlotStatus::Reserved);
    }

    #[test]
    fn test_scenario_cancel() {
        let mut store = two_slot_store();
        let id = store.reserve_slot("S1", 2.0).unwrap().id.clone();

        let cancelled = store.cancel_reservation(&id).unwrap();
        assert_eq!(cancelled.id, id);
        assert!(store.reservations().is_empty());
        assert_eq!(store.slot("S1").unwrap().status, SlotStatus::Available);
    }

    #[test]
    fn test_scenario_admin_override() {
        let mut store = two_slot_store();
        let previous = store.set_slot_status("S2", SlotStatus::Occupied).unwrap();

        assert_eq!(previous, SlotStatus::Available);
        assert_eq!(store.slot("S2").unwrap().status, SlotStatus::Occupied);
        assert!(store.reservations().is_empty());
        assert_eq!(store.overrides().len(), 1);
        assert_eq!(store.overrides()[0].to, SlotStatus::Occupied);
    }

    #[test]
    fn test_reserve_unavailable_leaves_state_unchanged() {
        let mut store = Store::seeded();
        let before_slots = store.slots().to_vec();

        for id in ["3", "4", "7", "missing"] {
            let err = store.reserve_slot(id, 1.0).unwrap_err();
            assert_eq!(err.code(), "slot_unavailable");
        }
        assert_eq!(store.slots(), before_slots.as_slice());
        assert!(store.reservations().is_empty());
        assert!(store.drain_events().is_empty());
    }

    #[test]
    fn test_reserve_rejects_bad_duration() {
        let mut store = two_slot_store();
        for d in [0.0, -1.0, f64::NAN] {
            let err = store.reserve_slot("S1", d).unwrap_err();
            assert_eq!(err.code(), "validation");
        }
        assert_eq!(store.slot("S1").unwrap().status, SlotStatus::Available);
    }

    #[test]
    fn test_cancel_twice_is_noop() {
        let mut store = two_slot_store();
        let id = store.reserve_slot("S1", 1.0).unwrap().id.clone();
        store.reserve_slot("S2", 3.0).unwrap();

        store.cancel_reservation(&id).unwrap();
        let snapshot = store.slots().to_vec();
        let err = store.cancel_reservation(&id).unwrap_err();

        assert!(err.is_benign());
        assert_eq!(store.slots(), snapshot.as_slice());
        assert_eq!(store.reservations().len(), 1);
        assert_eq!(store.reservations()[0].slot_id, "S2");
    }

    #[test]
    fn test_override_desync_is_reported() {
        let mut store = two_slot_store();
        store.reserve_slot("S1", 1.0).unwrap();

        // Admin frees a slot that still has an active reservation
        store.set_slot_status("S1", SlotStatus::Available).unwrap();
        let violations = store.invariant_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].slot_id, "S1");
        assert_eq!(violations[0].active_reservations, 1);
        assert_eq!(store.overrides()[0].active_reservations, 1);

        // The single-reservation guard still blocks a second booking
        let err = store.reserve_slot("S1", 1.0).unwrap_err();
        assert!(matches!(err, StoreError::SlotUnavailable { .. }));
        assert_eq!(store.reservations().len(), 1);
    }

    #[test]
    fn test_override_reserved_without_reservation() {
        let mut store = two_slot_store();
        store.set_slot_status("S2", SlotStatus::Reserved).unwrap();
        let violations = store.invariant_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].status, SlotStatus::Reserved);
        assert_eq!(violations[0].active_reservations, 0);
    }

    #[test]
    fn test_seed_reserved_slot_is_reported() {
        let store = Store::seeded();
        let violations = store.invariant_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].slot_id, "4");
    }

    #[test]
    fn test_set_status_unknown_slot() {
        let mut store = two_slot_store();
        let err = store.set_slot_status("nope", SlotStatus::Occupied).unwrap_err();
        assert!(err.is_benign());
        assert!(store.overrides().is_empty());
    }

    #[test]
    fn test_cycle_status() {
        let mut store = two_slot_store();
        assert_eq!(store.cycle_slot_status("S1").unwrap(), SlotStatus::Reserved);
        assert_eq!(store.cycle_slot_status("S1").unwrap(), SlotStatus::Occupied);
        assert_eq!(store.cycle_slot_status("S1").unwrap(), SlotStatus::Available);
        assert_eq!(store.overrides().len(), 3);
    }

    #[test]
    fn test_reservation_keeps_stale_copy() {
        let mut store = two_slot_store();
        store.reserve_slot("S1", 1.0).unwrap();
        store.set_slot_status("S1", SlotStatus::Occupied).unwrap();
        assert_eq!(store.reservations()[0].slot_name, "Alpha");
        assert_eq!(store.reservations()[0].location, "Alpha Street");
    }

    #[test]
    fn test_filtered_slots() {
        let store = Store::seeded();
        let all = store.filtered_slots("");
        let ids: Vec<_> = all.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5", "6", "7", "8"]);

        // Address match, case-insensitive, collection order
        let gec: Vec<_> = store
            .filtered_slots("gec MOR")
            .iter()
            .map(|s| s.id.clone())
            .collect();
        assert_eq!(gec, ["4", "8"]);

        for query in ["park", "zzz", "Center", "r"] {
            let subset = store.filtered_slots(query);
            assert!(subset.iter().all(|s| all.iter().any(|a| a.id == s.id)));
        }
        assert!(store.filtered_slots("zzz").is_empty());
    }

    #[test]
    fn test_availability_and_status_counts() {
        let store = Store::seeded();
        assert_eq!(availability_count(store.slots()), 5);
        assert_eq!(availability_count(store.filtered_slots("gec")), 1);

        let counts = status_counts(store.slots());
        assert_eq!(counts.available, 5);
        assert_eq!(counts.reserved, 1);
        assert_eq!(counts.occupied, 2);
        assert_eq!(counts.get(SlotStatus::Occupied), 2);
    }

    #[test]
    fn test_total_price_linear() {
        let store = Store::seeded();
        for slot in store.slots() {
            for d in [0.5, 1.0, 2.5, 4.0] {
                let single = total_price(slot, d);
                let double = total_price(slot, 2.0 * d);
                assert!((double - 2.0 * single).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_add_slot() {
        let mut store = Store::seeded();
        let slot = store.add_slot(new_slot("Dockside")).unwrap().clone();

        assert_eq!(store.slots().len(), 9);
        assert_eq!(store.slots()[8].id, slot.id);
        assert_eq!(slot.vehicle, VehicleType::Bike);
        assert!((slot.location.lat - 40.7589).abs() <= NEW_SLOT_JITTER);
        assert!((slot.location.lng + 73.9851).abs() <= NEW_SLOT_JITTER);
        assert!(slot.distance.ends_with('m'));

        // Same attributes again: no duplicate detection, fresh id
        let again = store.add_slot(new_slot("Dockside")).unwrap().clone();
        assert_ne!(again.id, slot.id);
        assert_eq!(store.slots().len(), 10);
    }

    #[test]
    fn test_add_slot_validation() {
        let mut store = Store::seeded();
        let mut bad = new_slot("  ");
        assert_eq!(store.add_slot(bad.clone()).unwrap_err().code(), "validation");
        bad.name = "Ok".to_string();
        bad.price = -1.0;
        assert_eq!(store.add_slot(bad).unwrap_err().code(), "validation");
        assert_eq!(store.slots().len(), 8);
    }

    #[test]
    fn test_login_admin_flag() {
        let mut store = Store::seeded();
        assert!(store.login("admin@parking.com").unwrap().is_admin);
        assert_eq!(store.user().unwrap().name, "Admin User");

        assert!(!store.login("jane@example.com").unwrap().is_admin);
        assert!(!store
            .sign_in("admin@parking.com", SignInMethod::Signup)
            .unwrap()
            .is_admin);

        store.logout();
        assert!(store.user().is_none());
        assert!(store.login("").is_err());
    }

    #[test]
    fn test_navigation_fallback() {
        let mut store = Store::seeded();
        assert_eq!(store.navigate_to("reservations"), Screen::Reservations);
        assert_eq!(store.navigate_to("checkout"), Screen::Splash);
        assert_eq!(store.screen(), Screen::Splash);
    }

    #[test]
    fn test_select_slot() {
        let mut store = Store::seeded();
        store.select_slot(Some("2")).unwrap();
        assert_eq!(store.selected_slot().unwrap().name, "City Center Garage");
        assert!(store.select_slot(Some("99")).is_err());
        assert_eq!(store.selected_slot().unwrap().id, "2");
        store.select_slot(None).unwrap();
        assert!(store.selected_slot().is_none());
    }

    #[test]
    fn test_events_drained() {
        let mut store = two_slot_store();
        let id = store.reserve_slot("S1", 1.0).unwrap().id.clone();
        store.cancel_reservation(&id).unwrap();
        store.set_theme(true);

        let events = store.drain_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], StoreEvent::SlotReserved { .. }));
        assert!(matches!(events[1], StoreEvent::ReservationCancelled { .. }));
        assert_eq!(events[2], StoreEvent::ThemeChanged { dark: true });
        assert!(store.drain_events().is_empty());
        assert!(store.dark_mode());
    }

    #[test]
    fn test_ids_unique_within_millisecond() {
        let mut store = two_slot_store();
        let a = store.reserve_slot("S1", 1.0).unwrap().id.clone();
        let b = store.reserve_slot("S2", 1.0).unwrap().id.clone();
        assert_ne!(a, b);
    }
}
