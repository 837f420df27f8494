//! Helpers shared by the arithmetic tools.

use rmcp::model::{CallToolResult, Content};

/// Render a number the way JSON clients print it.
///
/// Integral values drop the fractional part (`5`, not `5.0`), negative zero
/// renders as `0`, and non-finite values use their JavaScript spelling.
/// Magnitudes of at least `1e21` or below `1e-6` switch to exponent form
/// with an explicit exponent sign (`1e+21`, `1.5e-7`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if value == 0.0 {
        "0".to_string()
    } else if value.abs() >= EXPONENT_UPPER || value.abs() < EXPONENT_LOWER {
        format_exponent(value)
    } else {
        value.to_string()
    }
}

const EXPONENT_UPPER: f64 = 1e21;
const EXPONENT_LOWER: f64 = 1e-6;

fn format_exponent(value: f64) -> String {
    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}

/// Format a binary operation as `"{a} {symbol} {b} = {result}"`.
pub fn format_equation(a: f64, symbol: &str, b: f64, result: f64) -> String {
    format!(
        "{} {} {} = {}",
        format_number(a),
        symbol,
        format_number(b),
        format_number(result)
    )
}

/// Create a successful result carrying a single text block.
pub fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Extract the text of the first content block of a tool result.
#[cfg(test)]
pub fn result_text(result: &CallToolResult) -> String {
    use rmcp::model::RawContent;

    match result.content.first().map(|content| &content.raw) {
        Some(RawContent::Text(text)) => text.text.clone(),
        other => panic!("expected text content, got {:?}", other),
    }
}
