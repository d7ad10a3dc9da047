//! Split command handler.
//!
//! Shows how a text would be chunked without synthesizing anything.

use anyhow::Result;
use narrato_core::segment;

use crate::commands::SplitArgs;
use crate::error::CliError;
use crate::presentation::{print_separator, truncate_chars};

pub async fn execute(args: &SplitArgs) -> Result<()> {
    let text = args.input.read()?;
    let chunks = split_text(&text, args.max_chunk_chars)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&chunks)?);
        return Ok(());
    }

    println!("{} chunk(s), at most {} chars each:\n", chunks.len(), args.max_chunk_chars);
    println!("{:<5} {:<6} Text", "#", "Chars");
    print_separator(80);
    for (i, chunk) in chunks.iter().enumerate() {
        println!(
            "{:<5} {:<6} {}",
            i + 1,
            chunk.chars().count(),
            truncate_chars(chunk, 66)
        );
    }
    Ok(())
}

/// Segment `text`, treating "no chunks" as a usage error.
pub fn split_text(text: &str, max_chunk_chars: usize) -> Result<Vec<String>, CliError> {
    if max_chunk_chars == 0 {
        return Err(CliError::Arguments(
            "--max-chunk-chars must be at least 1".to_string(),
        ));
    }
    let chunks = segment(text, max_chunk_chars);
    if chunks.is_empty() {
        return Err(CliError::Arguments("text contains no sentences".to_string()));
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_text_groups_sentences() {
        let chunks = split_text("One. Two. Three.", 9).unwrap();
        assert_eq!(chunks, ["One.Two.", "Three."]);
    }

    #[test]
    fn test_empty_text_is_usage_error() {
        let err = split_text(" . . ", 100).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        assert!(matches!(split_text("Hi.", 0), Err(CliError::Arguments(_))));
    }
}
