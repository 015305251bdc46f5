//! Browser → server interaction payloads.
//!
//! The page forwards Plotly events in the shape Dash uses for `clickData`
//! and `selectedData`:
//!
//! ```json
//! {"clickData":    {"points": [{"pointNumber": 4}, {"pointNumber": 9}]}}
//! {"selectedData": {"points": [{"pointIndex": 1}, {"pointIndex": 3}]}}
//! {"selectedData": null}
//! ```
//!
//! An optional `"trigger"` names the key to use when both are present.

use serde_json::{Map, Value};

use crate::error::SelectionError;
use crate::selection::InteractionEvent;

const CLICK_KEY: &str = "clickData";
const SELECTED_KEY: &str = "selectedData";

pub fn decode_event(body: &str) -> Result<InteractionEvent, SelectionError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| SelectionError::MalformedEvent(format!("invalid JSON: {e}")))?;
    let obj = value
        .as_object()
        .ok_or_else(|| malformed("expected a JSON object"))?;

    let trigger = match obj.get("trigger") {
        Some(Value::String(t)) if t == CLICK_KEY || t == SELECTED_KEY => Some(t.as_str()),
        Some(other) => return Err(malformed(&format!("unknown trigger {other}"))),
        None => None,
    };

    let key = match (trigger, obj.contains_key(CLICK_KEY), obj.contains_key(SELECTED_KEY)) {
        (Some(t), _, _) => t,
        (None, true, false) => CLICK_KEY,
        (None, false, true) => SELECTED_KEY,
        (None, true, true) => return Err(malformed("both clickData and selectedData without trigger")),
        (None, false, false) => return Err(malformed("neither clickData nor selectedData present")),
    };

    if key == CLICK_KEY {
        let row_indices = point_indices(obj, CLICK_KEY, "pointNumber")?
            .ok_or_else(|| malformed("clickData is null"))?;
        Ok(InteractionEvent::Click { row_indices })
    } else {
        // A null selection is Plotly's deselect.
        let row_indices = point_indices(obj, SELECTED_KEY, "pointIndex")?.unwrap_or_default();
        Ok(InteractionEvent::LassoSelect { row_indices })
    }
}

/// `Ok(None)` when the payload under `key` is null.
fn point_indices(
    obj: &Map<String, Value>,
    key: &str,
    index_field: &str,
) -> Result<Option<Vec<usize>>, SelectionError> {
    let data = match obj.get(key) {
        None => return Err(malformed(&format!("{key} missing"))),
        Some(Value::Null) => return Ok(None),
        Some(data) => data,
    };

    let points = data
        .get("points")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(&format!("{key}.points is not an array")))?;

    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            point
                .get(index_field)
                .and_then(Value::as_u64)
                .map(|n| n as usize)
                .ok_or_else(|| malformed(&format!("{key}.points[{i}] has no {index_field}")))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn malformed(reason: &str) -> SelectionError {
    SelectionError::MalformedEvent(reason.to_string())
}
