//! Flat lat/lng to screen-percent projection over a fixed bounding box, plus
//! a character-grid rendering of the slots for the terminal.
//!
//! There is no clamping: coordinates outside the box map to positions outside
//! 0..100 and are simply not drawn.

use crate::model::{Coordinate, ParkingSlot, SlotStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Bounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            lat_min: 40.755,
            lat_max: 40.765,
            lng_min: -73.990,
            lng_max: -73.980,
        }
    }
}

/// Position on the canvas in percent; (0, 0) is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPosition {
    pub x: f64,
    pub y: f64,
}

impl MapPosition {
    pub fn is_visible(&self) -> bool {
        (0.0..=100.0).contains(&self.x) && (0.0..=100.0).contains(&self.y)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Projection {
    bounds: Bounds,
}

impl Projection {
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Latitude grows upward, so y is measured down from `lat_max`
    pub fn project(&self, c: Coordinate) -> MapPosition {
        let b = &self.bounds;
        MapPosition {
            x: (c.lng - b.lng_min) / (b.lng_max - b.lng_min) * 100.0,
            y: (b.lat_max - c.lat) / (b.lat_max - b.lat_min) * 100.0,
        }
    }
}

fn marker(status: SlotStatus) -> char {
    match status {
        SlotStatus::Available => 'A',
        SlotStatus::Reserved => 'R',
        SlotStatus::Occupied => 'O',
    }
}

/// Draw `slots` and the user on a `width` x `height` grid. The selected slot
/// is drawn as `*`, the user as `@`.
pub fn render_ascii(
    projection: &Projection,
    slots: &[&ParkingSlot],
    user: Coordinate,
    selected: Option<&str>,
    width: usize,
    height: usize,
) -> String {
    if width == 0 || height == 0 {
        return String::new();
    }
    let mut grid = vec![vec!['.'; width]; height];

    let mut plot = |pos: MapPosition, ch: char| {
        if !pos.is_visible() {
            return;
        }
        let col = ((pos.x / 100.0) * (width - 1) as f64).round() as usize;
        let row = ((pos.y / 100.0) * (height - 1) as f64).round() as usize;
        grid[row.min(height - 1)][col.min(width - 1)] = ch;
    };

    for slot in slots {
        let ch = if selected == Some(slot.id.as_str()) {
            '*'
        } else {
            marker(slot.status)
        };
        plot(projection.project(slot.location), ch);
    }
    plot(projection.project(user), '@');

    let mut out = String::with_capacity((width + 3) * (height + 2));
    out.push('+');
    out.push_str(&"-".repeat(width));
    out.push_str("+\n");
    for row in grid {
        out.push('|');
        out.extend(row);
        out.push_str("|\n");
    }
    out.push('+');
    out.push_str(&"-".repeat(width));
    out.push('+');
    out
}

pub const LEGEND: &str = "@ you  A available  R reserved  O occupied  * selected";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn test_project_corners() {
        let p = Projection::default();
        let top_left = p.project(Coordinate::new(40.765, -73.990));
        assert!(top_left.x.abs() < 1e-9 && top_left.y.abs() < 1e-9);

        let bottom_right = p.project(Coordinate::new(40.755, -73.980));
        assert!((bottom_right.x - 100.0).abs() < 1e-9);
        assert!((bottom_right.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_user_location() {
        let pos = Projection::default().project(seed::USER_LOCATION);
        assert!((pos.x - 49.0).abs() < 1e-6);
        assert!((pos.y - 61.0).abs() < 1e-6);
        assert!(pos.is_visible());
    }

    #[test]
    fn test_outside_box_not_clamped() {
        let pos = Projection::default().project(Coordinate::new(40.770, -73.995));
        assert!(pos.x < 0.0);
        assert!(pos.y < 0.0);
        assert!(!pos.is_visible());
    }

    #[test]
    fn test_render_ascii() {
        let slots = seed::initial_slots();
        let refs: Vec<_> = slots.iter().collect();
        let out = render_ascii(
            &Projection::default(),
            &refs,
            Coordinate::new(40.760, -73.985),
            Some("8"),
            21,
            11,
        );
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 13);
        assert!(lines.iter().all(|l| l.chars().count() == 23));
        // Center of the grid
        assert_eq!(lines[6].chars().nth(11), Some('@'));
        assert!(out.contains('*'));
        assert!(out.contains('O'));
    }

    #[test]
    fn test_render_skips_offscreen() {
        let mut slot = seed::initial_slots().remove(0);
        slot.location = Coordinate::new(41.0, -74.5);
        let out = render_ascii(
            &Projection::default(),
            &[&slot],
            Coordinate::new(0.0, 0.0),
            None,
            10,
            5,
        );
        assert!(!out.contains('A'));
        assert!(!out.contains('@'));
    }
}
