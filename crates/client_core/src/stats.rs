use std::{io::Write, path::Path};

use image::ImageFormat;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::NetworkError;

/// A rendered stats image exposed through a local file.
///
/// The file lives exactly as long as this value; dropping it revokes the handle.
#[derive(Debug)]
pub struct StatsImage {
    file: NamedTempFile,
    format: ImageFormat,
    width: u32,
    height: u32,
    len: usize,
}

impl StatsImage {
    pub fn from_bytes(bytes: &[u8], dir: Option<&Path>) -> Result<Self, NetworkError> {
        if bytes.is_empty() {
            return Err(NetworkError::NotAnImage("empty payload".to_string()));
        }
        let format =
            image::guess_format(bytes).map_err(|err| NetworkError::NotAnImage(err.to_string()))?;
        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|err| NetworkError::NotAnImage(err.to_string()))?;

        let extension = format.extensions_str().first().copied().unwrap_or("img");
        let suffix = format!(".{extension}");
        let mut builder = tempfile::Builder::new();
        builder.prefix("quiz-stats-").suffix(&suffix);
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(bytes)?;
        file.flush()?;

        debug!(path = %file.path().display(), len = bytes.len(), "stored stats image");
        Ok(Self {
            file,
            format,
            width: decoded.width(),
            height: decoded.height(),
            len: bytes.len(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for StatsImage {
    fn drop(&mut self) {
        debug!(path = %self.file.path().display(), "revoking stats image");
    }
}

#[cfg(test)]
#[path = "tests/stats_tests.rs"]
mod tests;
