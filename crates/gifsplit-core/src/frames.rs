use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, Frames, ImageFormat, ImageReader, RgbaImage};
use tracing::{debug, info};

use crate::error::GifsplitError;

/// Lazily decoded frames of one animated image, in source order.
///
/// Frames are decoded one at a time as the sequence is advanced. Every yielded
/// image owns its pixel buffer, so it stays valid after the decoder moves on.
pub struct FrameSequence {
    frames: Frames<'static>,
    format: ImageFormat,
    path: PathBuf,
    decoded: u32,
}

impl FrameSequence {
    /// Container format the frames are decoded from.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Number of frames yielded so far.
    pub fn decoded(&self) -> u32 {
        self.decoded
    }
}

impl Iterator for FrameSequence {
    type Item = Result<RgbaImage>;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.frames.next()?;
        let number = self.decoded + 1;
        match frame {
            Ok(frame) => {
                self.decoded = number;
                let image = frame.into_buffer();
                debug!(
                    path = ?self.path,
                    frame = number,
                    width = image.width(),
                    height = image.height(),
                    "decoded frame"
                );
                Some(Ok(image))
            }
            Err(e) => Some(Err::<RgbaImage, _>(e).with_context(|| {
                format!("failed to decode frame {} of {}", number, self.path.display())
            })),
        }
    }
}

fn unsupported(path: &Path, detail: impl Into<String>) -> anyhow::Error {
    GifsplitError::UnsupportedFormat {
        path: path.to_path_buf(),
        detail: detail.into(),
    }
    .into()
}

/// Open an animated image and return its frames as a lazy sequence.
///
/// The format is sniffed from the file contents. GIF, animated PNG and animated
/// WebP are accepted; anything else fails with [`GifsplitError::UnsupportedFormat`].
pub fn extract_frames(path: &Path) -> Result<FrameSequence> {
    let reader = ImageReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("failed to read {}", path.display()))?;

    let Some(format) = reader.format() else {
        return Err(unsupported(path, "unrecognized image data"));
    };
    let source = reader.into_inner();

    let frames = decode_frames(path, format, source)?;
    info!(?path, ?format, "opened animated image");

    Ok(FrameSequence {
        frames,
        format,
        path: path.to_path_buf(),
        decoded: 0,
    })
}

fn decode_frames(
    path: &Path,
    format: ImageFormat,
    source: BufReader<File>,
) -> Result<Frames<'static>> {
    let decode_context = || format!("failed to decode {}", path.display());

    match format {
        ImageFormat::Gif => {
            let decoder = GifDecoder::new(source).with_context(decode_context)?;
            Ok(decoder.into_frames())
        }
        ImageFormat::Png => {
            let decoder = PngDecoder::new(source).with_context(decode_context)?;
            if !decoder.is_apng().with_context(decode_context)? {
                return Err(unsupported(path, "PNG image has no animation"));
            }
            Ok(decoder.apng().with_context(decode_context)?.into_frames())
        }
        ImageFormat::WebP => {
            let decoder = WebPDecoder::new(source).with_context(decode_context)?;
            if !decoder.has_animation() {
                return Err(unsupported(path, "WebP image has no animation"));
            }
            Ok(decoder.into_frames())
        }
        other => Err(unsupported(path, format!("{other:?} images are not animated"))),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::{BufWriter, Cursor};

    use image::codecs::gif::GifEncoder;
    use image::{Frame, Rgba};

    use super::*;

    fn assert_color(image: &RgbaImage, expected: [u8; 4]) {
        let actual = image.get_pixel(0, 0).0;
        for (a, e) in actual.iter().zip(expected) {
            assert!(a.abs_diff(e) <= 8, "expected {expected:?}, got {actual:?}");
        }
    }

    const COLORS: [[u8; 4]; 3] = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]];

    fn write_gif(path: &Path, colors: &[[u8; 4]]) {
        let file = File::create(path).unwrap();
        let mut encoder = GifEncoder::new(file);
        encoder
            .encode_frames(
                colors
                    .iter()
                    .map(|c| Frame::new(RgbaImage::from_pixel(4, 4, Rgba(*c)))),
            )
            .unwrap();
    }

    fn write_apng(path: &Path, colors: &[[u8; 4]]) {
        let file = BufWriter::new(File::create(path).unwrap());
        let mut encoder = png::Encoder::new(file, 4, 4);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_animated(colors.len() as u32, 0).unwrap();
        let mut writer = encoder.write_header().unwrap();
        for color in colors {
            let data: Vec<u8> = color.iter().copied().cycle().take(4 * 4 * 4).collect();
            writer.write_image_data(&data).unwrap();
        }
        writer.finish().unwrap();
    }

    fn riff_chunk(fourcc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut chunk = fourcc.to_vec();
        chunk.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        chunk.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            chunk.push(0);
        }
        chunk
    }

    fn u24(value: u32) -> [u8; 3] {
        let [a, b, c, _] = value.to_le_bytes();
        [a, b, c]
    }

    /// Lossless bitstream chunk of `image`, lifted out of a still WebP file.
    fn vp8l_chunk(image: &RgbaImage) -> Vec<u8> {
        let mut encoded = Cursor::new(Vec::new());
        image.write_to(&mut encoded, ImageFormat::WebP).unwrap();
        let bytes = encoded.into_inner();

        let at = bytes.windows(4).position(|w| w == b"VP8L").unwrap();
        let size = u32::from_le_bytes(bytes[at + 4..at + 8].try_into().unwrap()) as usize;
        riff_chunk(b"VP8L", &bytes[at + 8..at + 8 + size])
    }

    /// Animated WebP: VP8X (animation + alpha), ANIM, one full-canvas ANMF per color.
    fn write_animated_webp(path: &Path, colors: &[[u8; 4]]) {
        let (width, height) = (4u32, 4u32);

        let mut vp8x = vec![0x02 | 0x10, 0, 0, 0];
        vp8x.extend(u24(width - 1));
        vp8x.extend(u24(height - 1));

        let mut anim = vec![0u8; 4];
        anim.extend(0u16.to_le_bytes());

        let mut body = b"WEBP".to_vec();
        body.extend(riff_chunk(b"VP8X", &vp8x));
        body.extend(riff_chunk(b"ANIM", &anim));
        for color in colors {
            let mut anmf = Vec::new();
            anmf.extend(u24(0));
            anmf.extend(u24(0));
            anmf.extend(u24(width - 1));
            anmf.extend(u24(height - 1));
            anmf.extend(u24(100));
            // no blending, no disposal
            anmf.push(0b10);
            anmf.extend(vp8l_chunk(&RgbaImage::from_pixel(width, height, Rgba(*color))));
            body.extend(riff_chunk(b"ANMF", &anmf));
        }

        fs::write(path, riff_chunk(b"RIFF", &body)).unwrap();
    }

    #[test]
    fn yields_every_frame_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        write_gif(&path, &COLORS);

        let mut frames = extract_frames(&path).unwrap();
        assert_eq!(frames.format(), ImageFormat::Gif);

        let images: Vec<RgbaImage> = frames.by_ref().map(|f| f.unwrap()).collect();
        assert_eq!(images.len(), 3);
        assert_eq!(frames.decoded(), 3);
        for (image, color) in images.iter().zip(COLORS) {
            assert_eq!(image.dimensions(), (4, 4));
            assert_color(image, color);
        }
    }

    #[test]
    fn frames_are_decoded_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        write_gif(&path, &COLORS);

        let mut frames = extract_frames(&path).unwrap();
        assert_eq!(frames.decoded(), 0);
        let first = frames.next().unwrap().unwrap();
        assert_eq!(frames.decoded(), 1);

        // the first frame stays intact while the decoder advances
        let rest: Vec<RgbaImage> = frames.map(|f| f.unwrap()).collect();
        assert_eq!(rest.len(), 2);
        assert_color(&first, COLORS[0]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(extract_frames(&dir.path().join("missing.gif")).is_err());
    }

    #[test]
    fn corrupt_gif_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.gif");
        fs::write(&path, b"GIF89a").unwrap();
        assert!(extract_frames(&path).is_err());
    }

    #[test]
    fn non_image_data_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.bin");
        fs::write(&path, b"definitely not an image").unwrap();

        let err = extract_frames(&path).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<GifsplitError>(),
            Some(GifsplitError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn still_png_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.gif");
        RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let err = extract_frames(&path).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<GifsplitError>(),
            Some(GifsplitError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn animated_png_frames_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.png");
        write_apng(&path, &COLORS);

        let mut frames = extract_frames(&path).unwrap();
        assert_eq!(frames.format(), ImageFormat::Png);

        let images: Vec<RgbaImage> = frames.by_ref().map(|f| f.unwrap()).collect();
        assert_eq!(images.len(), 3);
        assert_eq!(frames.decoded(), 3);
        for (image, color) in images.iter().zip(COLORS) {
            assert_eq!(image.dimensions(), (4, 4));
            assert_color(image, color);
        }
    }

    #[test]
    fn animated_webp_frames_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.webp");
        write_animated_webp(&path, &COLORS);

        let mut frames = extract_frames(&path).unwrap();
        assert_eq!(frames.format(), ImageFormat::WebP);

        let images: Vec<RgbaImage> = frames.by_ref().map(|f| f.unwrap()).collect();
        assert_eq!(images.len(), 3);
        for (image, color) in images.iter().zip(COLORS) {
            assert_eq!(image.dimensions(), (4, 4));
            assert_color(image, color);
        }
    }

    #[test]
    fn still_webp_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.webp");
        RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]))
            .save_with_format(&path, ImageFormat::WebP)
            .unwrap();

        let err = extract_frames(&path).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<GifsplitError>(),
            Some(GifsplitError::UnsupportedFormat { .. })
        ));
    }
}
