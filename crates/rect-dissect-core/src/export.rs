use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Result;
use crate::model::{DissectStats, Rect};

/// A dissection input: the region to cover and the holes to leave open.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    pub source: Rect,
    #[serde(default)]
    pub holes: Vec<Rect>,
}

impl Scene {
    pub fn new(source: Rect, holes: Vec<Rect>) -> Self {
        Self { source, holes }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Export a dissection as `{ "rects": [...], "stats": {...} }`.
pub fn to_json(scene: &Scene, rects: &[Rect]) -> serde_json::Value {
    let stats = DissectStats::compute(&scene.source, &scene.holes, rects);
    json!({
        "source": scene.source,
        "rects": rects,
        "stats": stats,
    })
}

/// Reads rects from [`to_json`] output or from a bare JSON array of rects.
pub fn rects_from_json(value: &serde_json::Value) -> Result<Vec<Rect>> {
    let rects = match value {
        serde_json::Value::Array(_) => value.clone(),
        other => other.get("rects").cloned().unwrap_or(serde_json::Value::Null),
    };
    Ok(serde_json::from_value(rects)?)
}
