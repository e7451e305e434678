// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/**
Texel-space rectangle within one mip level of one slice.

```text
           x
      0 ────────▶
      │ ┌───────┐
    y │ │       │
      │ │       │
      │ │       │
      ▼ └───────┘
 ```
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle covering a whole `width` x `height` level.
    pub const fn full(width: u32, height: u32) -> Self {
        Rect::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the rectangle lies entirely inside a `width` x `height` level.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height)
    }
}

/// Size of `base` at mip level `mip`; never smaller than 1.
pub const fn mip_dimension(base: u32, mip: u32) -> u32 {
    let shifted = if mip >= 32 { 0 } else { base >> mip };
    if shifted == 0 { 1 } else { shifted }
}

/// Number of levels in a full mip chain for the given extents.
pub fn full_mip_count(width: u32, height: u32, depth: u32) -> u32 {
    width.max(height).max(depth).max(1).ilog2() + 1
}
