//! Image loading for the logo and signature blocks
//!
//! References are URLs, `data:` URIs or local paths. They are all fetched
//! before drawing starts, in parallel, and decoded into ready-to-embed image
//! XObjects. A reference that cannot be fetched or decoded is logged and
//! left out; the document is still produced without it.

use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::{debug, warn};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeSet, HashMap};
use std::io::{Cursor, Write};
use std::path::Path;
use std::time::Duration;

use crate::error::AssetError;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Where image bytes come from.
pub trait ImageSource: Send + Sync {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, AssetError>;
}

/// HTTP(S) with a request timeout, `data:` URIs, and local files.
#[derive(Debug, Clone)]
pub struct DefaultImageSource {
    timeout: Duration,
}

impl DefaultImageSource {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn fetch_http(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let fail = |reason: String| AssetError::Fetch {
            reference: url.to_string(),
            reason,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| fail(e.to_string()))?;
        let response = client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| fail(e.to_string()))?;
        let bytes = response.bytes().map_err(|e| fail(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl Default for DefaultImageSource {
    fn default() -> Self {
        Self::new(Duration::from_secs(15))
    }
}

impl ImageSource for DefaultImageSource {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, AssetError> {
        if reference.starts_with("data:") {
            return parse_data_uri(reference).map(|(_, bytes)| bytes);
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return self.fetch_http(reference);
        }

        let path = reference.strip_prefix("file://").unwrap_or(reference);
        std::fs::read(Path::new(path)).map_err(|e| AssetError::Fetch {
            reference: reference.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Images already held in memory, keyed by reference.
#[derive(Debug, Clone, Default)]
pub struct InMemoryImageSource {
    images: HashMap<String, Vec<u8>>,
}

impl InMemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, reference: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.images.insert(reference.into(), bytes);
        self
    }
}

impl ImageSource for InMemoryImageSource {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, AssetError> {
        self.images
            .get(reference)
            .cloned()
            .ok_or_else(|| AssetError::Fetch {
                reference: reference.to_string(),
                reason: "not found".to_string(),
            })
    }
}

/// Split a `data:` URI into its mime type and decoded payload.
pub fn parse_data_uri(uri: &str) -> Result<(String, Vec<u8>), AssetError> {
    let fail = |reason: &str| AssetError::Fetch {
        reference: truncate_reference(uri),
        reason: reason.to_string(),
    };

    let rest = uri.strip_prefix("data:").ok_or_else(|| fail("not a data URI"))?;
    let (header, payload) = rest.split_once(',').ok_or_else(|| fail("missing payload"))?;
    let mime = header
        .split(';')
        .next()
        .filter(|m| !m.is_empty())
        .unwrap_or("application/octet-stream")
        .to_ascii_lowercase();

    let bytes = if header.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| fail(&e.to_string()))?
    } else {
        payload.as_bytes().to_vec()
    };
    Ok((mime, bytes))
}

// data: URIs can be megabytes long; keep log lines readable.
fn truncate_reference(reference: &str) -> String {
    match reference.char_indices().nth(48) {
        Some((idx, _)) => format!("{}...", &reference[..idx]),
        None => reference.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

/// Pick the decoder for `reference`.
///
/// The `data:` mime type or the path extension (query string and fragment
/// ignored) decides; magic bytes are only consulted when neither is
/// recognizable.
pub fn detect_format(reference: &str, bytes: &[u8]) -> Option<ImageFormat> {
    let declared = if reference.starts_with("data:") {
        let mime = reference[5..].split([';', ',']).next().unwrap_or("");
        format_from_mime(&mime.to_ascii_lowercase())
    } else {
        let path = reference.split(['?', '#']).next().unwrap_or(reference);
        format_from_extension(&path.to_ascii_lowercase())
    };

    declared.or_else(|| sniff_format(bytes))
}

fn format_from_mime(mime: &str) -> Option<ImageFormat> {
    match mime {
        "image/png" => Some(ImageFormat::Png),
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageFormat::Jpeg),
        _ => None,
    }
}

fn format_from_extension(path: &str) -> Option<ImageFormat> {
    if path.ends_with(".png") {
        Some(ImageFormat::Png)
    } else if path.ends_with(".jpg") || path.ends_with(".jpeg") {
        Some(ImageFormat::Jpeg)
    } else {
        None
    }
}

fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(PNG_MAGIC) {
        Some(ImageFormat::Png)
    } else if bytes.starts_with(JPEG_MAGIC) {
        Some(ImageFormat::Jpeg)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
}

impl ColorSpace {
    fn pdf_name(&self) -> &'static [u8] {
        match self {
            ColorSpace::DeviceGray => b"DeviceGray",
            ColorSpace::DeviceRgb => b"DeviceRGB",
            ColorSpace::DeviceCmyk => b"DeviceCMYK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    Flate,
    Dct,
}

impl ImageFilter {
    fn pdf_name(&self) -> &'static [u8] {
        match self {
            ImageFilter::Flate => b"FlateDecode",
            ImageFilter::Dct => b"DCTDecode",
        }
    }
}

/// Flate-compressed 8-bit alpha channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftMask {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// A decoded image, with its stream data already in the encoding the PDF
/// stream will declare.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub bits_per_component: u8,
    pub filter: ImageFilter,
    pub data: Vec<u8>,
    pub smask: Option<SoftMask>,
}

impl EmbeddedImage {
    /// Size in points when scaled to fit `max_width` x `max_height`, keeping
    /// the aspect ratio.
    pub fn fit_within(&self, max_width: f32, max_height: f32) -> (f32, f32) {
        let (w, h) = (self.width.max(1) as f32, self.height.max(1) as f32);
        if max_width / w <= max_height / h {
            (max_width, (h * max_width / w).min(max_height))
        } else {
            ((w * max_height / h).min(max_width), max_height)
        }
    }

    /// Add the image (and its soft mask) to `document` as XObjects.
    pub fn add_to_document(&self, document: &mut Document) -> ObjectId {
        let smask_id = self.smask.as_ref().map(|mask| {
            let mut dict = image_dictionary(mask.width, mask.height);
            dict.set("ColorSpace", Object::Name(b"DeviceGray".to_vec()));
            dict.set("BitsPerComponent", Object::Integer(8));
            dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
            document.add_object(Stream::new(dict, mask.data.clone()).with_compression(false))
        });

        let mut dict = image_dictionary(self.width, self.height);
        dict.set("ColorSpace", Object::Name(self.color_space.pdf_name().to_vec()));
        dict.set(
            "BitsPerComponent",
            Object::Integer(self.bits_per_component as i64),
        );
        dict.set("Filter", Object::Name(self.filter.pdf_name().to_vec()));
        if let Some(id) = smask_id {
            dict.set("SMask", Object::Reference(id));
        }
        document.add_object(Stream::new(dict, self.data.clone()).with_compression(false))
    }
}

fn image_dictionary(width: u32, height: u32) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict
}

/// Decode fetched bytes into an embeddable image.
pub fn decode_image(reference: &str, bytes: &[u8]) -> Result<EmbeddedImage, AssetError> {
    let decode_err = |reason: String| AssetError::Decode {
        reference: truncate_reference(reference),
        reason,
    };

    match detect_format(reference, bytes) {
        Some(ImageFormat::Png) => decode_png(bytes).map_err(decode_err),
        Some(ImageFormat::Jpeg) => decode_jpeg(bytes).map_err(decode_err),
        None => Err(AssetError::UnsupportedFormat(truncate_reference(reference))),
    }
}

fn decode_png(bytes: &[u8]) -> Result<EmbeddedImage, String> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info().map_err(|e| e.to_string())?;
    let mut buffer = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buffer).map_err(|e| e.to_string())?;
    let pixels = &buffer[..info.buffer_size()];

    let (color_space, channels, has_alpha) = match info.color_type {
        png::ColorType::Grayscale => (ColorSpace::DeviceGray, 1, false),
        png::ColorType::GrayscaleAlpha => (ColorSpace::DeviceGray, 2, true),
        png::ColorType::Rgb => (ColorSpace::DeviceRgb, 3, false),
        png::ColorType::Rgba => (ColorSpace::DeviceRgb, 4, true),
        png::ColorType::Indexed => return Err("palette was not expanded".to_string()),
    };

    let (color, alpha) = if has_alpha {
        let color_channels = channels - 1;
        let pixel_count = pixels.len() / channels;
        let mut color = Vec::with_capacity(pixel_count * color_channels);
        let mut alpha = Vec::with_capacity(pixel_count);
        for pixel in pixels.chunks_exact(channels) {
            color.extend_from_slice(&pixel[..color_channels]);
            alpha.push(pixel[color_channels]);
        }
        let opaque = alpha.iter().all(|&a| a == u8::MAX);
        (color, if opaque { None } else { Some(alpha) })
    } else {
        (pixels.to_vec(), None)
    };

    let smask = match alpha {
        Some(alpha) => Some(SoftMask {
            width: info.width,
            height: info.height,
            data: flate_compress(&alpha).map_err(|e| e.to_string())?,
        }),
        None => None,
    };

    Ok(EmbeddedImage {
        width: info.width,
        height: info.height,
        color_space,
        bits_per_component: 8,
        filter: ImageFilter::Flate,
        data: flate_compress(&color).map_err(|e| e.to_string())?,
        smask,
    })
}

fn decode_jpeg(bytes: &[u8]) -> Result<EmbeddedImage, String> {
    let frame = read_jpeg_frame(bytes).ok_or("no frame header found")?;
    let color_space = match frame.components {
        1 => ColorSpace::DeviceGray,
        3 => ColorSpace::DeviceRgb,
        4 => ColorSpace::DeviceCmyk,
        n => return Err(format!("unsupported component count {}", n)),
    };

    Ok(EmbeddedImage {
        width: frame.width as u32,
        height: frame.height as u32,
        color_space,
        bits_per_component: frame.precision,
        filter: ImageFilter::Dct,
        data: bytes.to_vec(),
        smask: None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegFrame {
    precision: u8,
    width: u16,
    height: u16,
    components: u8,
}

/// Walk the marker segments up to the first start-of-frame.
fn read_jpeg_frame(bytes: &[u8]) -> Option<JpegFrame> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    while pos + 1 < bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        pos += 2;

        match marker {
            // Fill bytes
            0xFF => pos -= 1,
            // Standalone markers
            0x01 | 0xD0..=0xD7 => {}
            0xD9 | 0xDA => return None,
            _ => {
                let length = u16::from_be_bytes([*bytes.get(pos)?, *bytes.get(pos + 1)?]) as usize;
                let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
                if is_sof {
                    let segment = bytes.get(pos + 2..pos + 8)?;
                    return Some(JpegFrame {
                        precision: segment[0],
                        height: u16::from_be_bytes([segment[1], segment[2]]),
                        width: u16::from_be_bytes([segment[3], segment[4]]),
                        components: segment[5],
                    });
                }
                pos += length;
            }
        }
    }
    None
}

fn flate_compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Fetch and decode every distinct reference concurrently.
///
/// Returns only the images that succeeded; failures are logged.
pub fn prefetch_images<'r, I>(source: &dyn ImageSource, references: I) -> HashMap<String, EmbeddedImage>
where
    I: IntoIterator<Item = &'r str>,
{
    let unique: BTreeSet<&str> = references
        .into_iter()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect();
    if unique.is_empty() {
        return HashMap::new();
    }

    debug!("prefetching {} image(s)", unique.len());
    let results: Vec<(&str, Result<EmbeddedImage, AssetError>)> = std::thread::scope(|scope| {
        let handles: Vec<_> = unique
            .iter()
            .map(|&reference| {
                let handle = scope.spawn(move || {
                    source
                        .fetch(reference)
                        .and_then(|bytes| decode_image(reference, &bytes))
                });
                (reference, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(reference, handle)| {
                let result = handle.join().unwrap_or_else(|_| {
                    Err(AssetError::Fetch {
                        reference: truncate_reference(reference),
                        reason: "loader thread panicked".to_string(),
                    })
                });
                (reference, result)
            })
            .collect()
    });

    let mut images = HashMap::new();
    for (reference, result) in results {
        match result {
            Ok(image) => {
                images.insert(reference.to_string(), image);
            }
            Err(e) => warn!("Skipping image: {}", e),
        }
    }
    images
}
