//! Input image reading
//!
//! Images are read once, up front, and never more than one byte past the
//! largest device size so host memory stays bounded however large the input
//! is. The extra byte lets the shaper notice that truncation is needed.
//!
//! A device wider than 8 bits can hold more than the read limit, so an input
//! that reaches the limit may have been cut short before shaping ever sees
//! it. [`Image::limit_reached`] records that.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::metric;

/// Where the image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Standard input
    Stdin,
    /// A file
    Path(PathBuf),
}

impl ImageSource {
    /// Interpret a command line argument; `-` means stdin
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            ImageSource::Stdin
        } else {
            ImageSource::Path(PathBuf::from(arg))
        }
    }

    /// File name used for platform detection, `None` for stdin
    ///
    /// Paths that are not valid UTF-8 are converted lossily.
    pub fn filename(&self) -> Option<Cow<'_, str>> {
        match self {
            ImageSource::Stdin => None,
            ImageSource::Path(path) => Some(path.to_string_lossy()),
        }
    }

    fn display_path(&self) -> &Path {
        match self {
            ImageSource::Stdin => Path::new("-"),
            ImageSource::Path(path) => path,
        }
    }
}

/// Maximum number of bytes read from any input
pub fn read_limit() -> u64 {
    metric::max_size().locations + 1
}

/// Image bytes as read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// The bytes read, at most the read limit
    pub data: Vec<u8>,
    /// The read stopped at the limit; anything after it was not read
    pub limit_reached: bool,
}

/// Read at most `limit` bytes from `reader`
pub fn read_bounded<R: Read>(reader: R, limit: u64) -> io::Result<Image> {
    let mut data = Vec::new();
    reader.take(limit).read_to_end(&mut data)?;
    let limit_reached = data.len() as u64 >= limit;
    Ok(Image {
        data,
        limit_reached,
    })
}

/// Read an image, bounded by [`read_limit`]
///
/// The file handle is closed before this returns.
pub fn read_image(source: &ImageSource) -> Result<Image> {
    let wrap = |source_err: io::Error| Error::Image {
        path: source.display_path().to_path_buf(),
        source: source_err,
    };

    let image = match source {
        ImageSource::Stdin => read_bounded(io::stdin().lock(), read_limit()),
        ImageSource::Path(path) => {
            let file = File::open(path).map_err(wrap)?;
            read_bounded(file, read_limit())
        }
    }
    .map_err(wrap)?;

    log::debug!(
        "Read {} bytes from {}",
        image.data.len(),
        source.display_path().display()
    );
    if image.limit_reached {
        log::debug!("Stopped reading at {} bytes", read_limit());
    }
    Ok(image)
}
