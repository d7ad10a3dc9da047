//! Voices command handler.

use anyhow::Result;
use narrato_voice::VoiceLibrary;

use crate::commands::VoicesArgs;
use crate::error::CliError;
use crate::presentation::{format_size, print_separator, truncate_chars};

/// List voice samples in a table (or as JSON).
pub async fn execute(args: &VoicesArgs) -> Result<()> {
    let library = VoiceLibrary::new(&args.voices_dir);
    let samples = library.list().map_err(|e| {
        CliError::Io(format!("{}: {e}", args.voices_dir.display()))
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&samples)?);
        return Ok(());
    }

    if samples.is_empty() {
        println!("No voice samples in {}.", args.voices_dir.display());
        println!("Add a short .wav recording of the target speaker there.");
        return Ok(());
    }

    println!("{:<40} {:>10}", "Voice", "Size");
    print_separator(51);
    for sample in &samples {
        println!(
            "{:<40} {:>10}",
            truncate_chars(&sample.name, 39),
            format_size(sample.size_bytes)
        );
    }
    Ok(())
}
