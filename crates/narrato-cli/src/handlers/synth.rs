//! Synth command handler.
//!
//! Synthesizes a whole text in one pass, chunk by chunk, without the job
//! manager: files land in the output directory as `<prefix>_part<N>.wav`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use narrato_core::SpeechSynthesizer;
use narrato_voice::try_load_backend;

use super::split::split_text;
use crate::commands::SynthArgs;
use crate::error::CliError;

pub async fn execute(args: &SynthArgs) -> Result<()> {
    let text = args.input.read()?;
    let backend = try_load_backend(&args.backend.backend_config())?;

    let files = synthesize_all(
        backend.as_ref(),
        &text,
        &args.voice,
        args.max_chunk_chars,
        &args.output_dir,
        &args.prefix,
    )
    .await?;

    println!("Wrote {} file(s):", files.len());
    for file in &files {
        println!("  {}", file.display());
    }
    Ok(())
}

/// Synthesize every chunk of `text` in order, stopping at the first failure.
pub async fn synthesize_all(
    backend: &dyn SpeechSynthesizer,
    text: &str,
    voice: &str,
    max_chunk_chars: usize,
    output_dir: &Path,
    prefix: &str,
) -> Result<Vec<PathBuf>, CliError> {
    backend.health()?;
    let voice = backend.resolve_voice(voice)?;
    let chunks = split_text(text, max_chunk_chars)?;
    tokio::fs::create_dir_all(output_dir).await?;

    let total = chunks.len();
    let mut files = Vec::with_capacity(total);
    for (i, chunk) in chunks.iter().enumerate() {
        let index = i + 1;
        let path = output_dir.join(format!("{prefix}_part{index}.wav"));
        let started = Instant::now();

        backend
            .synthesize(chunk, &voice, &path)
            .await
            .map_err(|e| CliError::Synthesis(format!("chunk {index}/{total}: {e}")))?;

        tracing::info!(
            index,
            total,
            backend = backend.name(),
            path = %path.display(),
            elapsed_ms = started.elapsed().as_millis(),
            "Chunk synthesized"
        );
        files.push(path);
    }
    Ok(files)
}
