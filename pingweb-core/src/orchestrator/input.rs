//! Parsing of the free-text input field.

/// What a line of user input asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// Nothing to do.
    Empty,
    /// `<timestamp>`
    Unary(&'a str),
    /// `<count> <timestamp>`
    Streaming(&'a str),
}

impl<'a> Input<'a> {
    /// Classifies a raw line. Validation of each shape happens later.
    pub fn classify(raw: &'a str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            Input::Empty
        } else if raw.contains(char::is_whitespace) {
            Input::Streaming(raw)
        } else {
            Input::Unary(raw)
        }
    }
}

/// Parses a timestamp made of ASCII digits only (`^\d+$`).
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    parse_digits(raw.trim())
}

/// Parses `<count> <timestamp>`, both digit-only, with a count of at least one.
///
/// A count too large for `u32` saturates; it is clamped later like any other large count.
pub fn parse_stream_input(raw: &str) -> Option<(u32, i64)> {
    let (count, timestamp) = raw.trim().split_once(char::is_whitespace)?;

    let count = digits(count)?.parse::<u32>().unwrap_or(u32::MAX);
    let timestamp: i64 = parse_digits(timestamp.trim_start())?;

    (count > 0).then_some((count, timestamp))
}

fn parse_digits<T: std::str::FromStr>(value: &str) -> Option<T> {
    digits(value)?.parse().ok()
}

fn digits(value: &str) -> Option<&str> {
    (!value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())).then_some(value)
}
