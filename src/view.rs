//! Text rendering of each screen from the current store state.

use crate::map::{self, Projection};
use crate::model::{format_duration, format_price, ParkingSlot, DURATION_CHOICES};
use crate::screen::{nav_items, Screen};
use crate::store::{availability_count, status_counts, total_price, Store};
use chrono::Local;
use std::fmt::Write;

pub struct Slide {
    pub title: &'static str,
    pub description: &'static str,
}

pub const SLIDES: &[Slide] = &[
    Slide {
        title: "Find Parking Near You",
        description: "Discover available parking spots in real-time, right where you need them.",
    },
    Slide {
        title: "Reserve Instantly",
        description: "Book your parking spot in seconds and never worry about availability.",
    },
    Slide {
        title: "Save Time, Reduce Stress",
        description: "Skip the hassle of circling around. Get to your destination faster.",
    },
];

/// Screen-local state that the store does not own
#[derive(Debug, Clone)]
pub struct UiState {
    pub search: String,
    pub slide: usize,
    /// Hours selected in the slot details picker
    pub duration: f64,
    pub map_width: usize,
    pub map_height: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            search: String::new(),
            slide: 0,
            duration: 1.0,
            map_width: 48,
            map_height: 14,
        }
    }
}

impl UiState {
    /// Advance the onboarding carousel; returns false once past the last slide
    pub fn next_slide(&mut self) -> bool {
        if self.slide + 1 < SLIDES.len() {
            self.slide += 1;
            true
        } else {
            false
        }
    }
}

fn status_badge(slot: &ParkingSlot) -> String {
    format!("[{}]", slot.status.label())
}

fn slot_line(slot: &ParkingSlot, selected: bool) -> String {
    format!(
        "{} {:>13}  {:<22} {:<24} {:<4} {:>5}/hr  {}  {}",
        if selected { ">" } else { " " },
        slot.id,
        slot.name,
        slot.address,
        slot.vehicle,
        format_price(slot.price),
        slot.distance,
        status_badge(slot),
    )
}

fn header(out: &mut String, store: &Store, screen: Screen) {
    let theme = if store.dark_mode() { "dark" } else { "light" };
    let _ = writeln!(out, "== {} == ({} theme)", screen.title(), theme);
}

fn nav_bar(out: &mut String, store: &Store) {
    let current = store.screen();
    let items: Vec<String> = nav_items(store.user())
        .into_iter()
        .map(|(screen, label)| {
            if screen == current {
                format!("[{}]", label)
            } else {
                format!(" {} ", label)
            }
        })
        .collect();
    let _ = writeln!(out, "\n{}", items.join(" | "));
}

pub fn render(store: &Store, ui: &UiState, projection: &Projection) -> String {
    let mut out = String::new();
    let screen = store.screen();
    header(&mut out, store, screen);

    match screen {
        Screen::Splash => splash(&mut out),
        Screen::Onboarding => onboarding(&mut out, ui),
        Screen::Login => login(&mut out),
        Screen::Home => home(&mut out, store, ui, projection),
        Screen::SlotDetails => slot_details(&mut out, store, ui, projection),
        Screen::Reservations => reservations(&mut out, store),
        Screen::Admin => admin(&mut out, store),
        Screen::Profile => profile(&mut out, store),
    }

    if screen.has_nav() {
        nav_bar(&mut out, store);
    }
    out
}

fn splash(out: &mut String) {
    let _ = writeln!(out, "ParkSpot");
    let _ = writeln!(out, "Smart parking, simplified");
}

fn onboarding(out: &mut String, ui: &UiState) {
    let slide = &SLIDES[ui.slide.min(SLIDES.len() - 1)];
    let _ = writeln!(out, "{}", slide.title);
    let _ = writeln!(out, "{}", slide.description);
    let dots: String = (0..SLIDES.len())
        .map(|i| if i == ui.slide { 'o' } else { '.' })
        .collect();
    let action = if ui.slide + 1 == SLIDES.len() {
        "Get Started"
    } else {
        "Next"
    };
    let _ = writeln!(out, "\n{}   /next ({})  /skip", dots, action);
}

fn login(out: &mut String) {
    let _ = writeln!(out, "Find and reserve parking in seconds");
    let _ = writeln!(out, "  /login <email> <password>");
    let _ = writeln!(out, "  /signup <email> <password> <confirm>");
    let _ = writeln!(out, "  /google");
    let _ = writeln!(out, "Tip: Use admin@parking.com to login as admin");
}

fn home(out: &mut String, store: &Store, ui: &UiState, projection: &Projection) {
    let slots = store.filtered_slots(&ui.search);
    let selected = store.selected_slot();

    if ui.search.is_empty() {
        let _ = writeln!(out, "Search: (none)");
    } else {
        let _ = writeln!(out, "Search: {}", ui.search);
    }
    let _ = writeln!(
        out,
        "{}",
        map::render_ascii(
            projection,
            &slots,
            store.user_location(),
            selected.map(|s| s.id.as_str()),
            ui.map_width,
            ui.map_height,
        )
    );
    let _ = writeln!(out, "{}", map::LEGEND);

    let _ = writeln!(out, "\nNearby Parking  ({} available)", availability_count(slots.iter().copied()));
    if slots.is_empty() {
        let _ = writeln!(out, "  No parking slots found");
    }
    for slot in &slots {
        let is_selected = selected.is_some_and(|s| s.id == slot.id);
        let _ = writeln!(out, "{}", slot_line(slot, is_selected));
    }

    if store.has_active_reservation() {
        let _ = writeln!(out, "\nYou have an active reservation: /book opens My Reservations");
    } else if let Some(slot) = selected {
        let _ = writeln!(out, "\nSelected: {} - /book to continue", slot.name);
    } else {
        let _ = writeln!(out, "\n/select <id> to pick a slot");
    }
}

fn slot_details(out: &mut String, store: &Store, ui: &UiState, projection: &Projection) {
    let Some(slot) = store.selected_slot() else {
        let _ = writeln!(out, "No slot selected");
        return;
    };

    let _ = writeln!(
        out,
        "{}",
        map::render_ascii(
            projection,
            &[slot],
            store.user_location(),
            Some(slot.id.as_str()),
            ui.map_width,
            ui.map_height / 2,
        )
    );
    let _ = writeln!(out, "{}  {}", slot.name, status_badge(slot));
    let _ = writeln!(out, "{} ({} away)", slot.address, slot.distance);
    let _ = writeln!(out, "Type: {}   Rate: {}/hour", slot.vehicle, format_price(slot.price));

    let choices: Vec<String> = DURATION_CHOICES
        .iter()
        .map(|&d| {
            if d == ui.duration {
                format!("[{}]", format_duration(d))
            } else {
                format_duration(d)
            }
        })
        .collect();
    let _ = writeln!(out, "\nDuration: {}", choices.join("  "));
    if !DURATION_CHOICES.contains(&ui.duration) {
        let _ = writeln!(out, "          custom: {}", format_duration(ui.duration));
    }
    let _ = writeln!(
        out,
        "Total: {}",
        format_price(total_price(slot, ui.duration))
    );

    if store.active_reservation_for(&slot.id).is_some() {
        let _ = writeln!(out, "\nReserved. /go reservations to view");
    } else {
        let _ = writeln!(out, "\n/duration <hours>  /reserve  /go home");
    }
}

fn reservations(out: &mut String, store: &Store) {
    let list = store.reservations();
    let noun = if list.len() == 1 {
        "reservation"
    } else {
        "reservations"
    };
    let _ = writeln!(out, "{} {}", list.len(), noun);

    if list.is_empty() {
        let _ = writeln!(out, "\nNo reservations yet");
        let _ = writeln!(out, "Find a spot on the map: /go home");
        return;
    }

    for r in list {
        let start = r.start_time.with_timezone(&Local);
        let _ = writeln!(
            out,
            "\n  {}  {}  [{}]",
            r.id,
            r.slot_name,
            r.status.as_str()
        );
        let _ = writeln!(out, "    {}", r.location);
        let _ = writeln!(
            out,
            "    {}  {}  {}",
            start.format("%b %d, %Y"),
            start.format("%I:%M %p"),
            format_duration(r.duration)
        );
    }
    let _ = writeln!(out, "\n/cancel <reservation-id>");
}

fn admin(out: &mut String, store: &Store) {
    let counts = status_counts(store.slots());
    let _ = writeln!(
        out,
        "Available: {}   Reserved: {}   Occupied: {}",
        counts.available, counts.reserved, counts.occupied
    );
    let _ = writeln!(out, "\nAll Slots ({})", store.slots().len());
    for slot in store.slots() {
        let _ = writeln!(out, "{}", slot_line(slot, false));
    }

    let drift = store.invariant_violations();
    if !drift.is_empty() {
        let _ = writeln!(out, "\nStatus overrides out of sync with reservations:");
        for v in drift {
            let _ = writeln!(
                out,
                "  slot {} is {} with {} active reservation(s)",
                v.slot_id, v.status, v.active_reservations
            );
        }
    }
    let _ = writeln!(out, "\n/status <id> [status]  /add <name> <address> [type] [price] [status]");
}

fn profile(out: &mut String, store: &Store) {
    let Some(user) = store.user() else {
        let _ = writeln!(out, "Not signed in");
        return;
    };
    let _ = writeln!(out, "{}", user.name);
    let _ = writeln!(out, "{}", user.email);
    if user.is_admin {
        let _ = writeln!(out, "Administrator");
    }
    let _ = writeln!(out, "\nReservations: {}", store.reservations().len());
    let _ = writeln!(
        out,
        "Dark mode: {}   (/theme)",
        if store.dark_mode() { "on" } else { "off" }
    );
    let _ = writeln!(out, "/logout");
}
