use propsync_model::ConfigValue;

const DOUBLE_QUOTE: char = '"';

/// Normalizes a property value before it is written.
///
/// Only text is touched, and only when `trim_double_quotes` is on. Never
/// call this on attachment sources.
pub fn sanitize(value: ConfigValue, trim_double_quotes: bool) -> ConfigValue {
    match value {
        ConfigValue::Text(text) if trim_double_quotes => {
            ConfigValue::Text(strip_double_quotes(&text).to_string())
        }
        other => other,
    }
}

/// Removes one wrapping pair of double quotes. A lone `"` is left alone.
pub fn strip_double_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with(DOUBLE_QUOTE) && text.ends_with(DOUBLE_QUOTE) {
        &text[1..text.len() - 1]
    } else {
        text
    }
}
