use pivfilt_image::{Image, ImageError, ImageSize};
use rayon::prelude::*;

/// A border type for the spatial padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PaddingMode {
    /// This border type fills the border with a single, constant value.
    ///
    /// Example: ...d c b a | 0 0 0 0...
    Constant,

    /// This border type takes the outermost row or column of pixels and repeats it into the padded region.
    ///
    /// Example: ...d c b a | a a a a...
    Replicate,

    /// This border type reflects the pixel values at the boundary, starting with the pixel 'next' to the edge.
    ///
    /// Example: ...d c b a | b c d e...
    ///
    /// This is the reflect boundary used by the filter adapter.
    #[default]
    Reflect101,

    /// This border type reflects the pixel values at the boundary, starting with the edge pixel itself.
    ///
    /// Example: ...d c b a | a b c d...
    Reflect,
}

impl PaddingMode {
    #[inline]
    fn reflect(i: isize, len: usize) -> usize {
        if len == 1 {
            return 0;
        }
        let len = len as isize;
        let mut i = i;
        while i < 0 || i >= len {
            if i < 0 {
                i = -i - 1;
            } else if i >= len {
                i = 2 * len - i - 1;
            }
        }
        i as usize
    }

    #[inline]
    fn reflect101(i: isize, len: usize) -> usize {
        if len == 1 {
            return 0;
        }
        let len = len as isize;
        let mut i = i;
        while i < 0 || i >= len {
            if i < 0 {
                i = -i;
            } else if i >= len {
                i = 2 * len - i - 2;
            }
        }
        i as usize
    }

    /// Maps index `i` to a valid index i.e. within `[0, len)` according to the padding mode.
    ///
    /// - `Replicate`: clamp to edge
    /// - `Reflect`: mirror including edge
    /// - `Reflect101`: mirror excluding edge
    /// - `Constant`: returns 0 (not used directly)
    ///
    /// `len` must be non-zero.
    #[inline]
    pub fn map_index(&self, i: isize, len: usize) -> usize {
        match self {
            PaddingMode::Replicate => i.clamp(0, len as isize - 1) as usize,
            PaddingMode::Reflect => Self::reflect(i, len),
            PaddingMode::Reflect101 => Self::reflect101(i, len),
            PaddingMode::Constant => 0,
        }
    }

    /// Fills the border of `new_data`, which already holds the source in its center.
    ///
    /// [`PaddingMode::Constant`] is assumed to be already applied when initializing `new_data`.
    fn apply_padding<T: Copy + Send + Sync>(
        &self,
        new_data: &mut [T],
        old_size: ImageSize,
        new_size: ImageSize,
        padding: &Padding2D,
    ) {
        if let PaddingMode::Constant = self {
            return;
        }

        let top = padding.top;
        let bottom = padding.bottom;
        let left = padding.left;
        let right = padding.right;
        let row_stride = new_size.width;

        // top
        {
            let (top_section, rest) = new_data.split_at_mut(top * row_stride);

            top_section
                .par_chunks_exact_mut(row_stride)
                .enumerate()
                .for_each(|(y, dst_row)| {
                    let src_y = self.map_index(y as isize - top as isize, old_size.height);
                    let src_row = &rest[src_y * row_stride..(src_y + 1) * row_stride];
                    dst_row.copy_from_slice(src_row);
                });
        }

        // bottom
        {
            let split_point = (new_size.height - bottom) * row_stride;
            let (rest, bottom_section) = new_data.split_at_mut(split_point);

            bottom_section
                .par_chunks_exact_mut(row_stride)
                .enumerate()
                .for_each(|(idx, dst_row)| {
                    let y = new_size.height - bottom + idx;
                    let src_y = self.map_index(y as isize - top as isize, old_size.height);
                    let src_start = (src_y + top) * row_stride;
                    dst_row.copy_from_slice(&rest[src_start..src_start + row_stride]);
                });
        }

        new_data.par_chunks_exact_mut(row_stride).for_each(|row| {
            // left
            for x in 0..left {
                let src_x = self.map_index(x as isize - left as isize, old_size.width);
                row[x] = row[left + src_x];
            }

            // right
            for x in (new_size.width - right)..new_size.width {
                let src_x = self.map_index(x as isize - left as isize, old_size.width);
                row[x] = row[left + src_x];
            }
        });
    }
}

/// Represents 2D padding with top, bottom, left, and right values (in pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding2D {
    /// Amount of padding to add on the top side.
    pub top: usize,
    /// Amount of padding to add on the bottom side.
    pub bottom: usize,
    /// Amount of padding to add on the left side.
    pub left: usize,
    /// Amount of padding to add on the right side.
    pub right: usize,
}

impl Padding2D {
    /// The same padding `pad` on all four sides.
    pub fn uniform(pad: usize) -> Self {
        Self {
            top: pad,
            bottom: pad,
            left: pad,
            right: pad,
        }
    }

    /// The size of an image of `size` once this padding is applied.
    pub fn padded_size(&self, size: ImageSize) -> ImageSize {
        ImageSize {
            width: size.width + self.left + self.right,
            height: size.height + self.top + self.bottom,
        }
    }
}

/// Writes `src` into the center of `dst` and fills the border according to `padding_mode`.
///
/// # Arguments
///
/// * `src` - The source image to pad.
/// * `dst` - The destination image where the padded output will be stored.
/// * `padding` - The amount of padding (in pixels) for all four sides.
/// * `padding_mode` - The border handling, see [`PaddingMode`].
/// * `constant_value` - The value used for [`PaddingMode::Constant`].
///
/// # Errors
///
/// Returns an error if the size of `dst` does not match the padded size of `src`,
/// or if `src` is empty while a border is requested.
///
/// # Example
///
/// ```rust
/// use pivfilt_image::{Image, ImageSize};
/// use pivfilt_imgproc::padding::{spatial_padding, Padding2D, PaddingMode};
///
/// let src = Image::new(ImageSize { width: 3, height: 1 }, vec![1u8, 2, 3]).unwrap();
/// let mut dst = Image::from_size_val(ImageSize { width: 5, height: 1 }, 0u8).unwrap();
///
/// let padding = Padding2D { top: 0, bottom: 0, left: 1, right: 1 };
/// spatial_padding(&src, &mut dst, padding, PaddingMode::Reflect101, 0).unwrap();
///
/// assert_eq!(dst.as_slice(), &[2, 1, 2, 3, 2]);
/// ```
pub fn spatial_padding<T>(
    src: &Image<T>,
    dst: &mut Image<T>,
    padding: Padding2D,
    padding_mode: PaddingMode,
    constant_value: T,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    let new_size = padding.padded_size(src.size());
    if new_size != dst.size() {
        return Err(ImageError::InvalidImageSize(
            dst.width(),
            dst.height(),
            new_size.width,
            new_size.height,
        ));
    }

    if src.is_empty() && new_size != src.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            1,
            1,
        ));
    }

    let old_size = src.size();
    let new_data = dst.as_slice_mut();

    // constant padding needs the fill; other modes overwrite every border sample
    new_data.fill(constant_value);

    let row_offset = padding.top * new_size.width + padding.left;

    for (src_row, dst_row) in src
        .as_slice()
        .chunks_exact(old_size.width.max(1))
        .zip(new_data[row_offset..].chunks_exact_mut(new_size.width.max(1)))
    {
        dst_row[..old_size.width].copy_from_slice(src_row);
    }

    if !src.is_empty() {
        padding_mode.apply_padding(new_data, old_size, new_size, &padding);
    }

    Ok(())
}

/// Pads `src` by `pad` samples on every side and returns the new image.
///
/// [`PaddingMode::Constant`] fills with `T::default()`.
///
/// # Example
///
/// ```rust
/// use pivfilt_image::{Image, ImageSize};
/// use pivfilt_imgproc::padding::{pad_uniform, PaddingMode};
///
/// let src = Image::new(ImageSize { width: 2, height: 2 }, vec![1.0f32, 2.0, 3.0, 4.0]).unwrap();
/// let padded = pad_uniform(&src, 1, PaddingMode::Replicate).unwrap();
///
/// assert_eq!(padded.size(), ImageSize { width: 4, height: 4 });
/// assert_eq!(padded.get([0, 0]), Some(&1.0));
/// ```
pub fn pad_uniform<T>(src: &Image<T>, pad: usize, mode: PaddingMode) -> Result<Image<T>, ImageError>
where
    T: Copy + Default + Send + Sync,
{
    let padding = Padding2D::uniform(pad);
    let mut dst = Image::from_size_val(padding.padded_size(src.size()), T::default())?;
    spatial_padding(src, &mut dst, padding, mode, T::default())?;
    Ok(dst)
}
