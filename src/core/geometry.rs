use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle, origin top-left.
///
/// Serialized as `[x, y, width, height]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle containing both inclusive corners.
    pub fn from_extents(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn offset(&self, dx: u32, dy: u32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Intersection with a `width` x `height` canvas, `None` when empty.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        let x0 = self.x.min(width);
        let y0 = self.y.min(height);
        let x1 = self.right().min(width);
        let y1 = self.bottom().min(height);
        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some(Self::new(x0, y0, x1 - x0, y1 - y0))
        }
    }

    /// Reading-order key: top edge, then left edge.
    pub fn reading_key(&self) -> (u32, u32, u32, u32) {
        (self.y, self.x, self.width, self.height)
    }
}

impl From<[u32; 4]> for PixelRect {
    fn from(value: [u32; 4]) -> Self {
        Self::new(value[0], value[1], value[2], value[3])
    }
}

impl From<PixelRect> for [u32; 4] {
    fn from(rect: PixelRect) -> Self {
        [rect.x, rect.y, rect.width, rect.height]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extents_are_inclusive() {
        let rect = PixelRect::from_extents(10, 20, 19, 24);
        assert_eq!(rect, PixelRect::new(10, 20, 10, 5));
        assert_eq!(rect.area(), 50);
    }

    #[test]
    fn clamps_to_canvas() {
        let rect = PixelRect::new(90, 90, 20, 20);
        assert_eq!(rect.clamp_to(100, 100), Some(PixelRect::new(90, 90, 10, 10)));
        assert_eq!(PixelRect::new(100, 0, 5, 5).clamp_to(100, 100), None);
    }

    #[test]
    fn edges_saturate_instead_of_overflowing() {
        let rect = PixelRect::new(u32::MAX - 5, 10, 20, u32::MAX);
        assert_eq!(rect.right(), u32::MAX);
        assert_eq!(rect.bottom(), u32::MAX);
        assert_eq!(rect.offset(100, 0).x, u32::MAX);
        assert_eq!(rect.clamp_to(100, 100), None);
    }

    #[test]
    fn serializes_as_array() {
        let json = serde_json::to_string(&PixelRect::new(1, 2, 3, 4)).unwrap();
        assert_eq!(json, "[1,2,3,4]");
        let back: PixelRect = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PixelRect::new(1, 2, 3, 4));
    }
}
