use crate::map::Bounds;
use crate::model::{Coordinate, ParkingSlot};
use crate::seed;
use crate::store::StoreSettings;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

const DEFAULT_ADMIN_EMAIL: &str = "admin@parking.com";
const DEFAULT_SPLASH_DELAY_MS: u64 = 2500;
const DEFAULT_MAP_WIDTH: usize = 48;
const DEFAULT_MAP_HEIGHT: usize = 14;
const DEFAULT_TOAST_MAX: usize = 5;
const DEFAULT_TOAST_TTL_MS: u64 = 4000;

/// `[session]` section
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SessionConfig {
    /// Login email that is granted the admin flag
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub dark_mode: Option<bool>,
    /// How long the splash screen shows before onboarding
    #[serde(default)]
    pub splash_delay_ms: Option<u64>,
}

impl SessionConfig {
    pub fn admin_email(&self) -> &str {
        self.admin_email.as_deref().unwrap_or(DEFAULT_ADMIN_EMAIL)
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode.unwrap_or(false)
    }

    pub fn splash_delay(&self) -> Duration {
        Duration::from_millis(self.splash_delay_ms.unwrap_or(DEFAULT_SPLASH_DELAY_MS))
    }
}

/// `[map]` section
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct MapConfig {
    #[serde(default)]
    pub lat_min: Option<f64>,
    #[serde(default)]
    pub lat_max: Option<f64>,
    #[serde(default)]
    pub lng_min: Option<f64>,
    #[serde(default)]
    pub lng_max: Option<f64>,
    #[serde(default)]
    pub user_location: Option<Coordinate>,
    /// ASCII map size in characters
    #[serde(default)]
    pub width: Option<usize>,
    #[serde(default)]
    pub height: Option<usize>,
}

impl MapConfig {
    pub fn bounds(&self) -> Bounds {
        let d = Bounds::default();
        Bounds {
            lat_min: self.lat_min.unwrap_or(d.lat_min),
            lat_max: self.lat_max.unwrap_or(d.lat_max),
            lng_min: self.lng_min.unwrap_or(d.lng_min),
            lng_max: self.lng_max.unwrap_or(d.lng_max),
        }
    }

    pub fn user_location(&self) -> Coordinate {
        self.user_location.unwrap_or(seed::USER_LOCATION)
    }

    pub fn width(&self) -> usize {
        self.width.unwrap_or(DEFAULT_MAP_WIDTH)
    }

    pub fn height(&self) -> usize {
        self.height.unwrap_or(DEFAULT_MAP_HEIGHT)
    }
}

/// `[toasts]` section
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ToastConfig {
    #[serde(default)]
    pub max: Option<usize>,
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl ToastConfig {
    pub fn max(&self) -> usize {
        self.max.unwrap_or(DEFAULT_TOAST_MAX)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms.unwrap_or(DEFAULT_TOAST_TTL_MS))
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub toasts: ToastConfig,
    /// Replaces the built-in seed slots when non-empty
    #[serde(default)]
    pub slots: Vec<ParkingSlot>,
}

impl Config {
    /// Load configuration from default paths
    /// Priority: local (.parkspot/config.local.toml) > project (.parkspot/config.toml) > user (~/.parkspot/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".parkspot").join("config.toml");
            if user_config.exists() {
                config.merge(Self::load_from(&user_config)?);
            }
        }

        let project_config = Path::new(".parkspot").join("config.toml");
        if project_config.exists() {
            config.merge(Self::load_from(&project_config)?);
        }

        // Should be gitignored
        let local_config = Path::new(".parkspot").join("config.local.toml");
        if local_config.exists() {
            config.merge(Self::load_from(&local_config)?);
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes priority).
    /// Scalars are overridden when set; the slot list is replaced when non-empty.
    pub fn merge(&mut self, other: Config) {
        let s = other.session;
        if s.admin_email.is_some() {
            self.session.admin_email = s.admin_email;
        }
        if s.dark_mode.is_some() {
            self.session.dark_mode = s.dark_mode;
        }
        if s.splash_delay_ms.is_some() {
            self.session.splash_delay_ms = s.splash_delay_ms;
        }

        let m = other.map;
        if m.lat_min.is_some() {
            self.map.lat_min = m.lat_min;
        }
        if m.lat_max.is_some() {
            self.map.lat_max = m.lat_max;
        }
        if m.lng_min.is_some() {
            self.map.lng_min = m.lng_min;
        }
        if m.lng_max.is_some() {
            self.map.lng_max = m.lng_max;
        }
        if m.user_location.is_some() {
            self.map.user_location = m.user_location;
        }
        if m.width.is_some() {
            self.map.width = m.width;
        }
        if m.height.is_some() {
            self.map.height = m.height;
        }

        if other.toasts.max.is_some() {
            self.toasts.max = other.toasts.max;
        }
        if other.toasts.ttl_ms.is_some() {
            self.toasts.ttl_ms = other.toasts.ttl_ms;
        }

        if !other.slots.is_empty() {
            self.slots = other.slots;
        }
    }

    /// Slots the store starts with
    pub fn seed_slots(&self) -> Vec<ParkingSlot> {
        if self.slots.is_empty() {
            seed::initial_slots()
        } else {
            self.slots.clone()
        }
    }

    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            admin_email: self.session.admin_email().to_string(),
            dark_mode: self.session.dark_mode(),
            user_location: self.map.user_location(),
        }
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.session.admin_email().trim().is_empty() {
            errors.push(ValidationError {
                field: "session.admin_email".to_string(),
                message: "Must not be empty".to_string(),
            });
        }

        let b = self.map.bounds();
        if !(b.lat_min < b.lat_max) {
            errors.push(ValidationError {
                field: "map.lat_min".to_string(),
                message: format!("Must be below lat_max ({} >= {})", b.lat_min, b.lat_max),
            });
        }
        if !(b.lng_min < b.lng_max) {
            errors.push(ValidationError {
                field: "map.lng_min".to_string(),
                message: format!("Must be below lng_max ({} >= {})", b.lng_min, b.lng_max),
            });
        }
        if self.map.width() == 0 || self.map.height() == 0 {
            errors.push(ValidationError {
                field: "map.width".to_string(),
                message: "Map width and height must be greater than 0".to_string(),
            });
        }

        if self.toasts.max() == 0 {
            errors.push(ValidationError {
                field: "toasts.max".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.id.trim().is_empty() {
                errors.push(ValidationError {
                    field: format!("slots[{}].id", i),
                    message: "Must not be empty".to_string(),
                });
            } else if !seen.insert(slot.id.as_str()) {
                errors.push(ValidationError {
                    field: format!("slots[{}].id", i),
                    message: format!("Duplicate slot id '{}'", slot.id),
                });
            }
            if slot.name.trim().is_empty() {
                errors.push(ValidationError {
                    field: format!("slots[{}].name", i),
                    message: "Must not be empty".to_string(),
                });
            }
            if slot.address.trim().is_empty() {
                errors.push(ValidationError {
                    field: format!("slots[{}].address", i),
                    message: "Must not be empty".to_string(),
                });
            }
            if !slot.location.lat.is_finite() || !slot.location.lng.is_finite() {
                errors.push(ValidationError {
                    field: format!("slots[{}].lat", i),
                    message: format!(
                        "Coordinates must be finite, got ({}, {})",
                        slot.location.lat, slot.location.lng
                    ),
                });
            }
            if !slot.price.is_finite() || slot.price < 0.0 {
                errors.push(ValidationError {
                    field: format!("slots[{}].price", i),
                    message: format!("Must be a non-negative number, got {}", slot.price),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
