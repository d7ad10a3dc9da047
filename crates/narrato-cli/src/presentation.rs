//! Table formatting utilities for CLI output.

/// Truncate `s` to at most `max_chars` characters, ending in "..." when cut.
///
/// ```rust
/// use narrato_cli::presentation::truncate_chars;
///
/// assert_eq!(truncate_chars("Hello", 10), "Hello");
/// assert_eq!(truncate_chars("Hello World", 8), "Hello...");
/// ```
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Human-readable byte count (`"1.5 MB"`).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
