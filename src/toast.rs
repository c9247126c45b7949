//! Transient notifications shown after commands: a bounded queue with TTL and
//! a short dedupe window, fed from store events and rejected commands.

use crate::error::StoreError;
use crate::model::format_duration;
use crate::store::{SignInMethod, StoreEvent};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

const DEDUPE_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
    Error,
}

impl ToastKind {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "[ok]",
            Self::Info => "[i]",
            Self::Error => "[!]",
        }
    }
}

pub type ToastId = u64;

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub title: String,
    pub description: Option<String>,
    pub ttl: Duration,
    pub created: Instant,
    /// Bumped on every push, including dedupe refreshes
    pub seq: u64,
}

impl Toast {
    pub fn line(&self) -> String {
        match &self.description {
            Some(d) => format!("{} {}: {}", self.kind.icon(), self.title, d),
            None => format!("{} {}", self.kind.icon(), self.title),
        }
    }
}

pub struct ToastService {
    queue: VecDeque<Toast>,
    max: usize,
    ttl: Duration,
    next_id: ToastId,
    seq: u64,
}

impl ToastService {
    pub fn new(max: usize, ttl: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            max: max.max(1),
            ttl,
            next_id: 1,
            seq: 0,
        }
    }

    /// Push a toast. An identical toast pushed within the dedupe window is
    /// refreshed instead of duplicated.
    pub fn push<S>(&mut self, kind: ToastKind, title: S, description: Option<String>, now: Instant) -> ToastId
    where
        S: Into<String>,
    {
        let title = title.into();
        self.seq += 1;

        if let Some(existing) = self.queue.iter_mut().find(|t| {
            t.kind == kind
                && t.title == title
                && t.description == description
                && now.duration_since(t.created) <= DEDUPE_WINDOW
        }) {
            existing.created = now;
            existing.seq = self.seq;
            return existing.id;
        }

        let id = self.next_id;
        self.next_id += 1;
        if self.queue.len() == self.max {
            self.queue.pop_front();
        }
        self.queue.push_back(Toast {
            id,
            kind,
            title,
            description,
            ttl: self.ttl,
            created: now,
            seq: self.seq,
        });
        id
    }

    pub fn success<S: Into<String>>(&mut self, title: S, description: Option<String>) -> ToastId {
        self.push(ToastKind::Success, title, description, Instant::now())
    }

    pub fn error<S: Into<String>>(&mut self, title: S, description: Option<String>) -> ToastId {
        self.push(ToastKind::Error, title, description, Instant::now())
    }

    pub fn info<S: Into<String>>(&mut self, title: S, description: Option<String>) -> ToastId {
        self.push(ToastKind::Info, title, description, Instant::now())
    }

    /// Drop expired toasts
    pub fn retain_visible(&mut self, now: Instant) {
        self.queue.retain(|t| now.duration_since(t.created) < t.ttl);
    }

    pub fn visible(&self, now: Instant) -> Vec<&Toast> {
        self.queue
            .iter()
            .filter(|t| now.duration_since(t.created) < t.ttl)
            .collect()
    }

    /// Toasts pushed or refreshed after the `mark` sequence number
    pub fn since(&self, mark: u64) -> Vec<&Toast> {
        self.queue.iter().filter(|t| t.seq > mark).collect()
    }

    pub fn mark(&self) -> u64 {
        self.seq
    }
}

/// Toast for a store event, if it is one the user is told about
pub fn for_event(event: &StoreEvent) -> Option<(ToastKind, String, Option<String>)> {
    let toast = match event {
        StoreEvent::SlotReserved {
            slot_name,
            duration,
            ..
        } => (
            ToastKind::Success,
            "Slot reserved successfully!".to_string(),
            Some(format!("{} for {}", slot_name, format_duration(*duration))),
        ),
        StoreEvent::ReservationCancelled { slot_name, .. } => (
            ToastKind::Success,
            "Reservation cancelled".to_string(),
            Some(slot_name.clone()),
        ),
        StoreEvent::SlotStatusChanged { to, .. } => (
            ToastKind::Success,
            "Status updated".to_string(),
            Some(format!("Changed to {}", to)),
        ),
        StoreEvent::SlotAdded { .. } => (
            ToastKind::Success,
            "Slot added successfully!".to_string(),
            None,
        ),
        StoreEvent::SignedIn {
            is_admin, method, ..
        } => {
            let title = match method {
                SignInMethod::Password if *is_admin => "Welcome Admin!",
                SignInMethod::Password => "Login successful!",
                SignInMethod::Signup => "Account created successfully!",
                SignInMethod::Google => "Logged in with Google!",
            };
            (ToastKind::Success, title.to_string(), None)
        }
        StoreEvent::SignedOut => (
            ToastKind::Success,
            "Logged out successfully".to_string(),
            None,
        ),
        StoreEvent::ThemeChanged { dark } => (
            ToastKind::Success,
            if *dark {
                "Dark mode enabled"
            } else {
                "Light mode enabled"
            }
            .to_string(),
            None,
        ),
        StoreEvent::SlotSelected { .. } | StoreEvent::ScreenChanged { .. } => return None,
    };
    Some(toast)
}

/// Toast for a failed command
pub fn for_error(err: &StoreError) -> (ToastKind, String, Option<String>) {
    match err {
        StoreError::Validation { message, .. } => (ToastKind::Error, message.clone(), None),
        StoreError::SlotUnavailable {
            status: Some(status),
            ..
        } => (
            ToastKind::Error,
            "This slot is not available".to_string(),
            Some(format!("Currently {}", status)),
        ),
        StoreError::SlotUnavailable { .. } => (
            ToastKind::Error,
            "This slot is not available".to_string(),
            None,
        ),
        StoreError::NotFound { .. } => (ToastKind::Info, err.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SlotStatus;

    #[test]
    fn test_dedupe_within_window() {
        let mut toasts = ToastService::new(5, Duration::from_secs(4));
        let now = Instant::now();
        let a = toasts.push(ToastKind::Error, "Please fill in all fields", None, now);
        let b = toasts.push(
            ToastKind::Error,
            "Please fill in all fields",
            None,
            now + Duration::from_millis(100),
        );
        assert_eq!(a, b);
        assert_eq!(toasts.visible(now + Duration::from_millis(100)).len(), 1);

        let c = toasts.push(
            ToastKind::Error,
            "Please fill in all fields",
            None,
            now + Duration::from_secs(2),
        );
        assert_ne!(a, c);
    }

    #[test]
    fn test_ttl_and_capacity() {
        let mut toasts = ToastService::new(2, Duration::from_secs(1));
        let now = Instant::now();
        toasts.push(ToastKind::Info, "one", None, now);
        toasts.push(ToastKind::Info, "two", None, now);
        toasts.push(ToastKind::Info, "three", None, now);

        let titles: Vec<_> = toasts.visible(now).iter().map(|t| t.title.clone()).collect();
        assert_eq!(titles, ["two", "three"]);

        let later = now + Duration::from_secs(2);
        assert!(toasts.visible(later).is_empty());
        toasts.retain_visible(later);
        assert!(toasts.since(0).is_empty());
    }

    #[test]
    fn test_since() {
        let mut toasts = ToastService::new(5, Duration::from_secs(4));
        toasts.info("before", None);
        let mark = toasts.mark();
        toasts.success("after", None);
        let fresh = toasts.since(mark);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].line(), "[ok] after");
    }

    #[test]
    fn test_refreshed_toast_shows_again() {
        let mut toasts = ToastService::new(5, Duration::from_secs(4));
        let now = Instant::now();
        let first = toasts.push(ToastKind::Error, "This slot is not available", None, now);
        let mark = toasts.mark();
        let again = toasts.push(
            ToastKind::Error,
            "This slot is not available",
            None,
            now + Duration::from_millis(50),
        );
        assert_eq!(first, again);

        let fresh = toasts.since(mark);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].id, first);
        assert_eq!(toasts.visible(now + Duration::from_millis(50)).len(), 1);
    }

    #[test]
    fn test_event_toasts() {
        let reserved = StoreEvent::SlotReserved {
            reservation_id: "1".to_string(),
            slot_id: "2".to_string(),
            slot_name: "City Center Garage".to_string(),
            duration: 2.0,
        };
        let (kind, title, desc) = for_event(&reserved).unwrap();
        assert_eq!(kind, ToastKind::Success);
        assert_eq!(title, "Slot reserved successfully!");
        assert_eq!(desc.as_deref(), Some("City Center Garage for 2 hours"));

        let admin = StoreEvent::SignedIn {
            email: "admin@parking.com".to_string(),
            is_admin: true,
            method: SignInMethod::Password,
        };
        assert_eq!(for_event(&admin).unwrap().1, "Welcome Admin!");

        let changed = StoreEvent::SlotStatusChanged {
            slot_id: "1".to_string(),
            from: SlotStatus::Available,
            to: SlotStatus::Occupied,
            active_reservations: 0,
        };
        assert_eq!(for_event(&changed).unwrap().2.as_deref(), Some("Changed to occupied"));

        assert!(for_event(&StoreEvent::SlotSelected { slot_id: None }).is_none());
    }

    #[test]
    fn test_error_toasts() {
        let err = StoreError::SlotUnavailable {
            slot_id: "3".to_string(),
            status: Some(SlotStatus::Occupied),
            reason: "occupied".to_string(),
        };
        let (kind, title, desc) = for_error(&err);
        assert_eq!(kind, ToastKind::Error);
        assert_eq!(title, "This slot is not available");
        assert_eq!(desc.as_deref(), Some("Currently occupied"));

        let (kind, _, _) = for_error(&StoreError::not_found("reservation", "1"));
        assert_eq!(kind, ToastKind::Info);
    }
}
