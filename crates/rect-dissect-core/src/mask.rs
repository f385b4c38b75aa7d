//! Overlay mask built from opaque boxes.
//!
//! A page is darkened everywhere except the excluded regions. Rather than painting a
//! full-page layer and punching holes in it, the masked area is dissected into boxes
//! that can each be rendered as one opaque element.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::DissectConfig;
use crate::error::Result;
use crate::model::Rect;
use crate::pipeline::dissect_with;

/// One opaque overlay box.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaskBox {
    /// Stable render key, `"x,y,width,height"`.
    pub key: String,
    pub rect: Rect,
}

impl MaskBox {
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            key: format!("{},{},{},{}", rect.x, rect.y, rect.width, rect.height),
            rect,
        }
    }
}

/// Boxes covering `page` minus `exclude`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskLayout {
    pub page: Rect,
    pub exclude: Vec<Rect>,
    pub boxes: Vec<MaskBox>,
}

impl MaskLayout {
    #[instrument(skip_all, fields(exclude = exclude.len()))]
    pub fn build(page: Rect, exclude: Vec<Rect>, cfg: &DissectConfig) -> Result<Self> {
        let rects = dissect_with(page, &exclude, cfg)?;
        let boxes: Vec<MaskBox> = rects.into_iter().map(MaskBox::from_rect).collect();
        debug!(boxes = boxes.len(), "mask layout built");
        Ok(Self {
            page,
            exclude,
            boxes,
        })
    }

    /// Whether a click at `(px, py)` lands on the mask. Points on the edge of an
    /// excluded region count as unmasked.
    pub fn is_masked(&self, px: f64, py: f64) -> bool {
        is_masked(&self.exclude, px, py)
    }

    /// Box whose area contains the point (left/top edges inclusive, right/bottom exclusive).
    pub fn box_at(&self, px: f64, py: f64) -> Option<&MaskBox> {
        self.boxes.iter().find(|b| {
            let r = &b.rect;
            r.x <= px && px < r.right() && r.y <= py && py < r.bottom()
        })
    }

    pub fn masked_area(&self) -> f64 {
        self.boxes.iter().map(|b| b.rect.area()).sum()
    }

    pub fn rects(&self) -> impl Iterator<Item = &Rect> {
        self.boxes.iter().map(|b| &b.rect)
    }
}

/// True unless some rect in `exclude` contains the point (edges inclusive).
pub fn is_masked(exclude: &[Rect], px: f64, py: f64) -> bool {
    !exclude.iter().any(|r| r.contains_point(px, py))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_keys_use_plain_numbers() {
        let b = MaskBox::from_rect(Rect::new(0.0, 10.0, 300.0, 2.5));
        assert_eq!(b.key, "0,10,300,2.5");
    }

    #[test]
    fn edges_of_excluded_regions_are_unmasked() {
        let exclude = [Rect::new(10.0, 10.0, 10.0, 10.0)];
        assert!(!is_masked(&exclude, 10.0, 10.0));
        assert!(!is_masked(&exclude, 20.0, 20.0));
        assert!(is_masked(&exclude, 20.5, 20.0));
        assert!(is_masked(&[], 0.0, 0.0));
    }
}
