//! Image pipeline driven through generic byte streams.
//!
//! # Data Flow
//! ```text
//! impl Read (stream::ByteSource)
//!     → load: pull until end of stream, identify the format
//!     → process: apply each ImageProcessor in order
//!     → save: image bytes, base64 data URI, or JSON description
//! impl Write (stream::ByteSink)
//! ```
//!
//! # Design Decisions
//! - Load and save take any `Read`/`Write`; the pipeline knows nothing of
//!   chains or pools
//! - Output is written in bounded pieces so the sink builds several segments

pub mod format;
pub mod processor;

use std::io::{self, Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use thiserror::Error;

use crate::http::mime::mime_type_for;
use crate::http::query::{client_requested_base64, QueryArgs};

pub use format::ImageFormat;
pub use processor::{Image, ImageProcessor};

/// Largest single write handed to the output stream.
const WRITE_CHUNK: usize = 64 * 1024;

/// `data:` + longest image MIME type + `;base64,`.
const DATA_URI_PREFIX_MAX: usize = "data:".len() + "image/jpeg".len() + ";base64,".len();

/// Upper bound on the serialized JSON description.
const DESCRIPTION_MAX: usize = 128;

/// Largest output `save` produces for an input of `input_len` bytes when the
/// processors keep the image size.
///
/// Base64 is the largest mode for all but tiny inputs, where the JSON
/// description can be longer.
pub fn max_output_len(input_len: usize) -> usize {
    let base64 = input_len
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(DATA_URI_PREFIX_MAX);
    base64.max(input_len).max(DESCRIPTION_MAX)
}

/// Errors produced while loading or saving an image.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input image is empty")]
    EmptyInput,

    #[error("input is not a supported image format")]
    UnsupportedFormat,

    #[error("failed to read input: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),

    #[error("failed to encode image description: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PipelineError {
    /// True when the output stream ran out of memory.
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, PipelineError::Write(err) if err.kind() == io::ErrorKind::OutOfMemory)
    }
}

/// How the processed image is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Raw image bytes.
    Image,
    /// `data:<mime>;base64,<payload>` as text.
    Base64,
    /// A JSON document describing the image.
    Json,
}

impl OutputMode {
    /// `output=json` wins over `encoding=base64`.
    pub fn from_query(args: &QueryArgs) -> Self {
        if args
            .get("output")
            .is_some_and(|value| value.eq_ignore_ascii_case("json"))
        {
            OutputMode::Json
        } else if client_requested_base64(args) {
            OutputMode::Base64
        } else {
            OutputMode::Image
        }
    }
}

#[derive(Debug, Serialize)]
struct ImageInfo<'a> {
    format: ImageFormat,
    mime: &'a str,
    size: usize,
}

/// Ordered list of processors plus load/save.
#[derive(Default)]
pub struct Pipeline {
    processors: Vec<Box<dyn ImageProcessor>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_processor(mut self, processor: impl ImageProcessor + 'static) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Pull the whole input and identify it.
    pub fn load<R: Read>(&self, mut input: R) -> Result<Image, PipelineError> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes).map_err(PipelineError::Read)?;

        if bytes.is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        let format = ImageFormat::sniff(&bytes).ok_or(PipelineError::UnsupportedFormat)?;

        tracing::debug!(format = ?format, size = bytes.len(), "Loaded input image");
        Ok(Image::new(bytes, format))
    }

    pub fn process(&self, image: Image) -> Image {
        self.processors.iter().fold(image, |image, processor| {
            tracing::trace!(processor = processor.name(), "Applying processor");
            processor.process(image)
        })
    }

    /// Write `image` to `output` and return the negotiated extension.
    pub fn save<W: Write>(
        &self,
        image: &Image,
        mode: OutputMode,
        mut output: W,
    ) -> Result<&'static str, PipelineError> {
        let extension = image.format().extension();
        let mime = mime_type_for(extension);

        match mode {
            OutputMode::Image => {
                write_chunked(&mut output, image.bytes())?;
                Ok(extension)
            }
            OutputMode::Base64 => {
                let prefix = format!("data:{};base64,", mime);
                write_chunked(&mut output, prefix.as_bytes())?;
                write_chunked(&mut output, STANDARD.encode(image.bytes()).as_bytes())?;
                Ok("txt")
            }
            OutputMode::Json => {
                let info = ImageInfo {
                    format: image.format(),
                    mime,
                    size: image.bytes().len(),
                };
                write_chunked(&mut output, &serde_json::to_vec(&info)?)?;
                Ok("json")
            }
        }
    }
}

fn write_chunked<W: Write>(output: &mut W, data: &[u8]) -> Result<(), PipelineError> {
    for chunk in data.chunks(WRITE_CHUNK) {
        output.write_all(chunk).map_err(PipelineError::Write)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";

    struct Invert;

    impl ImageProcessor for Invert {
        fn name(&self) -> &'static str {
            "invert"
        }

        fn process(&self, image: Image) -> Image {
            let format = image.format();
            let mut bytes = image.into_bytes();
            // Leave the signature intact
            for b in bytes.iter_mut().skip(6) {
                *b = !*b;
            }
            Image::new(bytes, format)
        }
    }

    #[test]
    fn test_load_identifies_format() {
        let image = Pipeline::new().load(GIF).unwrap();
        assert_eq!(image.format(), ImageFormat::Gif);
        assert_eq!(image.bytes(), GIF);
    }

    #[test]
    fn test_load_rejects_empty_and_unknown() {
        assert!(matches!(
            Pipeline::new().load(&b""[..]),
            Err(PipelineError::EmptyInput)
        ));
        assert!(matches!(
            Pipeline::new().load(&b"plain text"[..]),
            Err(PipelineError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_processors_run_in_order() {
        let pipeline = Pipeline::new().with_processor(Invert).with_processor(Invert);
        let image = pipeline.load(GIF).unwrap();
        assert_eq!(pipeline.process(image.clone()), image);

        let once = Pipeline::new().with_processor(Invert).process(image.clone());
        assert_eq!(&once.bytes()[..6], b"GIF89a");
        assert_ne!(once, image);
    }

    #[test]
    fn test_save_image_chunks_large_output() {
        let mut bytes = GIF.to_vec();
        bytes.resize(WRITE_CHUNK * 2 + 10, 0);
        let image = Image::new(bytes.clone(), ImageFormat::Gif);

        let mut writes = Vec::new();
        struct Recorder<'a>(&'a mut Vec<usize>, Vec<u8>);
        impl Write for Recorder<'_> {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.push(buf.len());
                self.1.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut recorder = Recorder(&mut writes, Vec::new());
        let ext = Pipeline::new()
            .save(&image, OutputMode::Image, &mut recorder)
            .unwrap();
        assert_eq!(ext, "gif");
        assert_eq!(recorder.1, bytes);
        assert_eq!(writes, vec![WRITE_CHUNK, WRITE_CHUNK, 10]);
    }

    #[test]
    fn test_save_base64() {
        let image = Image::new(GIF.to_vec(), ImageFormat::Gif);
        let mut out = Vec::new();
        let ext = Pipeline::new()
            .save(&image, OutputMode::Base64, &mut out)
            .unwrap();

        assert_eq!(ext, "txt");
        let text = String::from_utf8(out).unwrap();
        let payload = text.strip_prefix("data:image/gif;base64,").unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), GIF);
    }

    #[test]
    fn test_save_json() {
        let image = Image::new(GIF.to_vec(), ImageFormat::Gif);
        let mut out = Vec::new();
        let ext = Pipeline::new()
            .save(&image, OutputMode::Json, &mut out)
            .unwrap();

        assert_eq!(ext, "json");
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["format"], "gif");
        assert_eq!(value["mime"], "image/gif");
        assert_eq!(value["size"], GIF.len());
    }

    #[test]
    fn test_output_mode_from_query() {
        assert_eq!(OutputMode::from_query(&QueryArgs::parse("")), OutputMode::Image);
        assert_eq!(
            OutputMode::from_query(&QueryArgs::parse("encoding=base64")),
            OutputMode::Base64
        );
        assert_eq!(
            OutputMode::from_query(&QueryArgs::parse("output=json&encoding=base64")),
            OutputMode::Json
        );
    }

    #[test]
    fn test_max_output_len_bounds_every_mode() {
        for len in [1, 2, 3, 14, 100, WRITE_CHUNK + 1] {
            let mut bytes = GIF.to_vec();
            bytes.resize(len.max(GIF.len()), 0);
            let image = Image::new(bytes.clone(), ImageFormat::Gif);

            for mode in [OutputMode::Image, OutputMode::Base64, OutputMode::Json] {
                let mut out = Vec::new();
                Pipeline::new().save(&image, mode, &mut out).unwrap();
                assert!(out.len() <= max_output_len(bytes.len()), "{:?} {}", mode, len);
            }
        }
        assert_eq!(max_output_len(0), DESCRIPTION_MAX);
    }

    #[test]
    fn test_write_failure_is_reported() {
        struct Full;
        impl Write for Full {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::ErrorKind::OutOfMemory.into())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let image = Image::new(GIF.to_vec(), ImageFormat::Gif);
        let err = Pipeline::new()
            .save(&image, OutputMode::Image, Full)
            .unwrap_err();
        assert!(err.is_resource_exhausted());
    }
}
