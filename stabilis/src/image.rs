//! Multi-channel image buffer with a declared sample type.
//!
//! Every channel is stored as its own row-major plane of `width * height`
//! samples. All channels of an image share the same dimensions and the same
//! [`SampleType`]; the constructors enforce both.

use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::plane::Plane;

/// Numeric type of the samples stored in an [`Image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SampleType {
    #[default]
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl SampleType {
    pub fn is_float(&self) -> bool {
        matches!(self, SampleType::F32 | SampleType::F64)
    }

    pub fn is_signed(&self) -> bool {
        !matches!(self, SampleType::U8 | SampleType::U16 | SampleType::U32)
    }

    pub fn byte_count(&self) -> usize {
        match self {
            SampleType::U8 | SampleType::I8 => 1,
            SampleType::U16 | SampleType::I16 => 2,
            SampleType::U32 | SampleType::I32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_float() {
            "f"
        } else if self.is_signed() {
            "i"
        } else {
            "u"
        };
        write!(f, "{}{}", kind, self.byte_count() * 8)
    }
}

/// A primitive that can be stored in an image channel.
pub trait Sample: Copy + Default + PartialEq + Send + Sync + AsPrimitive<f64> + 'static
where
    f64: AsPrimitive<Self>,
{
    const SAMPLE_TYPE: SampleType;

    fn into_samples(data: Vec<Self>) -> Samples;

    #[inline]
    fn to_f64(self) -> f64 {
        self.as_()
    }

    /// Converts back from the working precision. Integral types are rounded to
    /// the nearest value and saturate at their range; NaN becomes zero.
    #[inline]
    fn from_f64(value: f64) -> Self {
        if Self::SAMPLE_TYPE.is_float() {
            value.as_()
        } else {
            value.round().as_()
        }
    }
}

/// Typed storage of one channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

macro_rules! impl_sample {
    ($(($t:ty, $variant:ident)),+ $(,)?) => {
        $(
            impl Sample for $t {
                const SAMPLE_TYPE: SampleType = SampleType::$variant;

                fn into_samples(data: Vec<Self>) -> Samples {
                    Samples::$variant(data)
                }
            }
        )+
    };
}

impl_sample!(
    (u8, U8),
    (i8, I8),
    (u16, U16),
    (i16, I16),
    (u32, U32),
    (i32, I32),
    (f32, F32),
    (f64, F64),
);

/// Runs `$body` with `$data` bound to the typed vector inside `$samples`.
macro_rules! with_samples {
    ($samples:expr, $data:ident => $body:expr) => {
        match $samples {
            Samples::U8($data) => $body,
            Samples::I8($data) => $body,
            Samples::U16($data) => $body,
            Samples::I16($data) => $body,
            Samples::U32($data) => $body,
            Samples::I32($data) => $body,
            Samples::F32($data) => $body,
            Samples::F64($data) => $body,
        }
    };
}

/// Runs `$body` with the type alias `$t` set to the primitive of `$sample_type`.
macro_rules! with_sample_type {
    ($sample_type:expr, $t:ident => $body:expr) => {
        match $sample_type {
            SampleType::U8 => {
                type $t = u8;
                $body
            }
            SampleType::I8 => {
                type $t = i8;
                $body
            }
            SampleType::U16 => {
                type $t = u16;
                $body
            }
            SampleType::I16 => {
                type $t = i16;
                $body
            }
            SampleType::U32 => {
                type $t = u32;
                $body
            }
            SampleType::I32 => {
                type $t = i32;
                $body
            }
            SampleType::F32 => {
                type $t = f32;
                $body
            }
            SampleType::F64 => {
                type $t = f64;
                $body
            }
        }
    };
}

impl Samples {
    pub fn zeroed(sample_type: SampleType, len: usize) -> Self {
        with_sample_type!(sample_type, T => T::into_samples(vec![T::default(); len]))
    }

    /// Quantizes working-precision values into `sample_type`.
    pub fn from_f64(sample_type: SampleType, values: &[f64]) -> Self {
        with_sample_type!(sample_type, T => {
            T::into_samples(values.iter().map(|&v| T::from_f64(v)).collect())
        })
    }

    pub fn sample_type(&self) -> SampleType {
        match self {
            Samples::U8(_) => SampleType::U8,
            Samples::I8(_) => SampleType::I8,
            Samples::U16(_) => SampleType::U16,
            Samples::I16(_) => SampleType::I16,
            Samples::U32(_) => SampleType::U32,
            Samples::I32(_) => SampleType::I32,
            Samples::F32(_) => SampleType::F32,
            Samples::F64(_) => SampleType::F64,
        }
    }

    pub fn len(&self) -> usize {
        with_samples!(self, data => data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn get_f64(&self, idx: usize) -> f64 {
        with_samples!(self, data => data[idx].to_f64())
    }

    pub fn to_f64(&self) -> Vec<f64> {
        with_samples!(self, data => data.iter().map(|v| v.to_f64()).collect())
    }
}

/// Copies `src` (of width `src_width`) into `dst` (of width `dst_width`) with
/// the source origin placed at `(dst_x, dst_y)`. Parts falling outside `dst`
/// are clipped.
fn blit<T: Copy>(
    src: &[T],
    src_width: usize,
    dst: &mut [T],
    dst_width: usize,
    dst_x: isize,
    dst_y: isize,
) {
    if src_width == 0 || dst_width == 0 {
        return;
    }
    let src_height = src.len() / src_width;
    let dst_height = dst.len() / dst_width;

    let x_start = dst_x.max(0);
    let x_end = (dst_x + src_width as isize).min(dst_width as isize);
    let y_start = dst_y.max(0);
    let y_end = (dst_y + src_height as isize).min(dst_height as isize);
    if x_start >= x_end || y_start >= y_end {
        return;
    }

    let run = (x_end - x_start) as usize;
    let sx = (x_start - dst_x) as usize;
    for y in y_start..y_end {
        let sy = (y - dst_y) as usize;
        let src_row = sy * src_width + sx;
        let dst_row = y as usize * dst_width + x_start as usize;
        dst[dst_row..dst_row + run].copy_from_slice(&src[src_row..src_row + run]);
    }
}

/// Horizontal anchor used when resizing a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAnchor {
    Left,
    Center,
    Right,
}

/// Vertical anchor used when resizing a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAnchor {
    Top,
    Center,
    Bottom,
}

/// A width x height multi-channel image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: usize,
    height: usize,
    channels: Vec<Samples>,
}

impl Image {
    /// Creates a zero-filled image.
    pub fn new(
        width: usize,
        height: usize,
        sample_type: SampleType,
        channel_count: usize,
    ) -> Result<Self> {
        let channels = (0..channel_count)
            .map(|_| Samples::zeroed(sample_type, width * height))
            .collect();
        Self::from_channels(width, height, channels)
    }

    /// Creates an image from typed channel storage.
    pub fn from_channels(width: usize, height: usize, channels: Vec<Samples>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument(format!(
                "image dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let Some(first) = channels.first() else {
            return Err(Error::InvalidArgument(
                "image must have at least one channel".to_string(),
            ));
        };
        let sample_type = first.sample_type();
        for (c, channel) in channels.iter().enumerate() {
            if channel.len() != width * height {
                return Err(Error::InvalidArgument(format!(
                    "channel {} has {} samples, expected {}",
                    c,
                    channel.len(),
                    width * height
                )));
            }
            if channel.sample_type() != sample_type {
                return Err(Error::InvalidArgument(format!(
                    "channel {} is {}, expected {}",
                    c,
                    channel.sample_type(),
                    sample_type
                )));
            }
        }

        Ok(Self {
            width,
            height,
            channels,
        })
    }

    /// Creates an image from working-precision channels, quantizing into
    /// `sample_type`.
    pub fn from_f64_channels(
        width: usize,
        height: usize,
        sample_type: SampleType,
        channels: &[Vec<f64>],
    ) -> Result<Self> {
        let channels = channels
            .iter()
            .map(|values| Samples::from_f64(sample_type, values))
            .collect();
        Self::from_channels(width, height, channels)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn sample_type(&self) -> SampleType {
        self.channels[0].sample_type()
    }

    pub fn same_bounds(&self, other: &Image) -> bool {
        self.size() == other.size()
    }

    pub fn channel(&self, c: usize) -> Result<&Samples> {
        self.channels.get(c).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "channel {} out of range for image with {} channels",
                c,
                self.channels.len()
            ))
        })
    }

    pub fn channel_f64(&self, c: usize) -> Result<Vec<f64>> {
        Ok(self.channel(c)?.to_f64())
    }

    /// Sample of channel `c` at `(x, y)` in working precision.
    #[inline]
    pub fn sample_f64(&self, c: usize, x: usize, y: usize) -> f64 {
        debug_assert!(x < self.width && y < self.height);
        self.channels[c].get_f64(y * self.width + x)
    }

    pub(crate) fn plane(&self, c: usize) -> Result<Plane> {
        Ok(Plane::new(self.width, self.height, self.channel_f64(c)?))
    }

    /// Replaces channel `c` with quantized values of `plane`.
    pub(crate) fn set_plane(&mut self, c: usize, plane: &Plane) {
        assert_eq!(plane.size(), self.size(), "plane size mismatch");
        self.channels[c] = Samples::from_f64(self.sample_type(), plane.values());
    }

    /// Copies channel `src_c` of `src` into channel `dst_c` of `self` with the
    /// source origin at `(dst_x, dst_y)`. Parts outside `self` are clipped.
    pub(crate) fn blit_channel(
        &mut self,
        dst_c: usize,
        src: &Image,
        src_c: usize,
        dst_x: isize,
        dst_y: isize,
    ) {
        let dst_width = self.width;
        let src_width = src.width;
        match (&mut self.channels[dst_c], &src.channels[src_c]) {
            (Samples::U8(d), Samples::U8(s)) => blit(s, src_width, d, dst_width, dst_x, dst_y),
            (Samples::I8(d), Samples::I8(s)) => blit(s, src_width, d, dst_width, dst_x, dst_y),
            (Samples::U16(d), Samples::U16(s)) => blit(s, src_width, d, dst_width, dst_x, dst_y),
            (Samples::I16(d), Samples::I16(s)) => blit(s, src_width, d, dst_width, dst_x, dst_y),
            (Samples::U32(d), Samples::U32(s)) => blit(s, src_width, d, dst_width, dst_x, dst_y),
            (Samples::I32(d), Samples::I32(s)) => blit(s, src_width, d, dst_width, dst_x, dst_y),
            (Samples::F32(d), Samples::F32(s)) => blit(s, src_width, d, dst_width, dst_x, dst_y),
            (Samples::F64(d), Samples::F64(s)) => blit(s, src_width, d, dst_width, dst_x, dst_y),
            (d, s) => panic!(
                "sample type mismatch: {} into {}",
                s.sample_type(),
                d.sample_type()
            ),
        }
    }

    /// An empty canvas with the same sample type and channel count.
    pub(crate) fn blank_like(&self, width: usize, height: usize) -> Image {
        let sample_type = self.sample_type();
        Image {
            width,
            height,
            channels: (0..self.channel_count())
                .map(|_| Samples::zeroed(sample_type, width * height))
                .collect(),
        }
    }

    /// Extracts a `width x height` window whose origin sits at `(x, y)` in
    /// this image. Parts of the window outside the image are zero.
    pub fn crop(&self, x: isize, y: isize, width: usize, height: usize) -> Result<Image> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument(format!(
                "crop size must be positive, got {}x{}",
                width, height
            )));
        }
        let mut result = self.blank_like(width, height);
        for c in 0..self.channel_count() {
            result.blit_channel(c, self, c, -x, -y);
        }
        Ok(result)
    }

    /// Changes the canvas size without scaling the content. The content is
    /// anchored according to `horizontal` and `vertical`; growing pads with
    /// zeros and shrinking drops the content on the opposite side.
    pub fn resize_canvas(
        &self,
        width: usize,
        height: usize,
        horizontal: HorizontalAnchor,
        vertical: VerticalAnchor,
    ) -> Result<Image> {
        let dw = width as isize - self.width as isize;
        let dh = height as isize - self.height as isize;
        let x = match horizontal {
            HorizontalAnchor::Left => 0,
            HorizontalAnchor::Center => dw / 2,
            HorizontalAnchor::Right => dw,
        };
        let y = match vertical {
            VerticalAnchor::Top => 0,
            VerticalAnchor::Center => dh / 2,
            VerticalAnchor::Bottom => dh,
        };
        self.crop(-x, -y, width, height)
    }
}
