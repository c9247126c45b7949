//! Screen identifiers and the navigation rules the front-end applies on top
//! of the store. The store itself never blocks navigation.

use crate::model::{ParkingSlot, User};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    #[default]
    Splash,
    Onboarding,
    Login,
    Home,
    SlotDetails,
    Reservations,
    Admin,
    Profile,
}

impl Screen {
    pub const ALL: [Screen; 8] = [
        Self::Splash,
        Self::Onboarding,
        Self::Login,
        Self::Home,
        Self::SlotDetails,
        Self::Reservations,
        Self::Admin,
        Self::Profile,
    ];

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    /// Unrecognized identifiers fall back to splash
    pub fn from_id(id: &str) -> Self {
        Self::parse(id).unwrap_or(Self::Splash)
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Splash => "splash",
            Self::Onboarding => "onboarding",
            Self::Login => "login",
            Self::Home => "home",
            Self::SlotDetails => "slot-details",
            Self::Reservations => "reservations",
            Self::Admin => "admin",
            Self::Profile => "profile",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Splash => "ParkSpot",
            Self::Onboarding => "Welcome",
            Self::Login => "Sign In",
            Self::Home => "Map",
            Self::SlotDetails => "Slot Details",
            Self::Reservations => "My Reservations",
            Self::Admin => "Admin Panel",
            Self::Profile => "Profile",
        }
    }

    pub fn requires_user(&self) -> bool {
        !matches!(self, Self::Splash | Self::Onboarding | Self::Login)
    }

    /// Screens that carry the bottom navigation bar
    pub fn has_nav(&self) -> bool {
        matches!(
            self,
            Self::Home | Self::Reservations | Self::Admin | Self::Profile
        )
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Outcome of applying the access rules to a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted(Screen),
    Redirect { to: Screen, reason: Denial },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    SignInRequired,
    AdminOnly,
    NoSlotSelected,
}

impl Denial {
    pub fn message(&self) -> &'static str {
        match self {
            Self::SignInRequired => "Please sign in first",
            Self::AdminOnly => "Admin access required",
            Self::NoSlotSelected => "Select a parking slot first",
        }
    }
}

/// Decide where a request for `target` should land
pub fn check_access(target: Screen, user: Option<&User>, selected: Option<&ParkingSlot>) -> Access {
    if target.requires_user() && user.is_none() {
        return Access::Redirect {
            to: Screen::Login,
            reason: Denial::SignInRequired,
        };
    }
    if target == Screen::Admin && !user.is_some_and(|u| u.is_admin) {
        return Access::Redirect {
            to: Screen::Home,
            reason: Denial::AdminOnly,
        };
    }
    if target == Screen::SlotDetails && selected.is_none() {
        return Access::Redirect {
            to: Screen::Home,
            reason: Denial::NoSlotSelected,
        };
    }
    Access::Granted(target)
}

/// Bottom navigation entries; admins get the Admin tab before Profile
pub fn nav_items(user: Option<&User>) -> Vec<(Screen, &'static str)> {
    let mut items = vec![
        (Screen::Home, "Map"),
        (Screen::Reservations, "Reservations"),
        (Screen::Profile, "Profile"),
    ];
    if user.is_some_and(|u| u.is_admin) {
        items.insert(2, (Screen::Admin, "Admin"));
    }
    items
}
