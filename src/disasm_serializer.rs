use serde_json::json;
use serde_json::Value;

use crate::render::Style;
use crate::viewer::Frame;

/// Serialize a rendered `Frame` into a compact JSON message.
/// Format:
/// {
///   "t": "disasm_frame",
///   "cycle": <refresh index>,
///   "pc": "0x...",
///   "lines": [ [style, text], ... ]
/// }
pub fn serialize_frame(frame: &Frame, cycle: u64) -> Value {
    let lines: Vec<Value> = frame
        .lines
        .iter()
        .map(|line| {
            let style = match line.style() {
                Style::Default => "default",
                Style::Highlight => "highlight",
            };
            json!([style, line.text()])
        })
        .collect();

    json!({
        "t": "disasm_frame",
        "cycle": cycle,
        // Address as hex string for JS safe handling
        "pc": format!("0x{:x}", frame.last_pc),
        "lines": Value::Array(lines),
    })
}
