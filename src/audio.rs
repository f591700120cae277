use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::{KioskError, Result};

/// Base64 encode raw audio bytes for the pipeline
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode pipeline audio into raw bytes
pub fn decode(audio_base64: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(audio_base64.trim())
        .map_err(|e| KioskError::Audio(format!("Invalid base64 audio: {}", e)))
}

/// Read a recorded WAV file and return it base64 encoded
pub async fn read_wav_base64<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(KioskError::FileNotFound(path.display().to_string()));
    }

    let bytes = fs::read(path).await?;
    if bytes.is_empty() {
        return Err(KioskError::Audio(format!("{} is empty", path.display())));
    }

    info!("Loaded {} bytes of audio from {}", bytes.len(), path.display());
    Ok(encode(&bytes))
}

/// Decode synthesized audio and write it as a WAV file
pub async fn write_wav_base64<P: AsRef<Path>>(audio_base64: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = decode(audio_base64)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, &bytes).await?;

    info!("Wrote {} bytes of audio to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode("not base64!!"), Err(KioskError::Audio(_))));
        assert_eq!(decode(" UklGRg== \n").unwrap(), b"RIFF");
    }

    #[tokio::test]
    async fn test_wav_file_round_trip() {
        let dir = assert_fs::TempDir::new().unwrap();
        let input = dir.child("question.wav");
        input.write_binary(b"RIFF\x24\x00\x00\x00WAVE").unwrap();

        let encoded = read_wav_base64(input.path()).await.unwrap();
        let output = dir.child("out/answer.wav");
        write_wav_base64(&encoded, output.path()).await.unwrap();

        let written = std::fs::read(output.path()).unwrap();
        assert_eq!(written, b"RIFF\x24\x00\x00\x00WAVE");
    }

    #[test]
    fn test_missing_or_empty_input() {
        let dir = assert_fs::TempDir::new().unwrap();
        let err = tokio_test::block_on(read_wav_base64(dir.path().join("missing.wav"))).unwrap_err();
        assert!(matches!(err, KioskError::FileNotFound(_)));

        let empty = dir.child("empty.wav");
        empty.touch().unwrap();
        let err = tokio_test::block_on(read_wav_base64(empty.path())).unwrap_err();
        assert!(matches!(err, KioskError::Audio(_)));
    }
}
