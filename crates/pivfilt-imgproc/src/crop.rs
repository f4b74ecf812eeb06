use pivfilt_image::{Image, ImageError, ImageSize};
use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Crop an image to a specified region.
///
/// # Arguments
///
/// * `src` - The source image to crop.
/// * `dst` - The destination image to store the cropped image.
/// * `x` - The x-coordinate of the top-left corner of the region to crop.
/// * `y` - The y-coordinate of the top-left corner of the region to crop.
///
/// # Errors
///
/// Returns an error if the region does not fit inside `src`.
///
/// # Examples
///
/// ```rust
/// use pivfilt_image::{Image, ImageSize};
/// use pivfilt_imgproc::crop::crop_image;
///
/// let image = Image::new(ImageSize { width: 4, height: 4 }, vec![
///     0u8, 1, 2, 3,
///     4u8, 5, 6, 7,
///     8u8, 9, 10, 11,
///     12u8, 13, 14, 15
/// ]).unwrap();
///
/// let mut cropped = Image::from_size_val(ImageSize { width: 2, height: 2 }, 0u8).unwrap();
///
/// crop_image(&image, &mut cropped, 1, 1).unwrap();
///
/// assert_eq!(cropped.as_slice(), &[5u8, 6, 9, 10]);
/// ```
pub fn crop_image<T>(src: &Image<T>, dst: &mut Image<T>, x: usize, y: usize) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    if x + dst.width() > src.width() || y + dst.height() > src.height() {
        return Err(ImageError::InvalidImageSize(
            x + dst.width(),
            y + dst.height(),
            src.width(),
            src.height(),
        ));
    }

    let dst_cols = dst.cols();
    if dst_cols == 0 {
        return Ok(());
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols)
        .enumerate()
        .for_each(|(i, dst_row)| {
            // get the slice at the top left corner
            let offset = (y + i) * src.cols() + x;
            dst_row.copy_from_slice(&src.as_slice()[offset..offset + dst_cols]);
        });

    Ok(())
}

/// Remove `border` samples from every side of `src`.
///
/// This is the interior of a buffer padded by `border`, i.e. the inverse of
/// [`crate::padding::pad_uniform`].
///
/// # Errors
///
/// Returns an error if `src` is not larger than `2 * border` on both axes.
pub fn crop_border<T>(src: &Image<T>, border: usize) -> Result<Image<T>, ImageError>
where
    T: Copy + Default + Send + Sync,
{
    let twice = 2 * border;
    if src.width() <= twice || src.height() <= twice {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            twice + 1,
            twice + 1,
        ));
    }

    let size = ImageSize {
        width: src.width() - twice,
        height: src.height() - twice,
    };
    let mut dst = Image::from_size_val(size, T::default())?;
    crop_image(src, &mut dst, border, border)?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::padding::{pad_uniform, PaddingMode};

    #[test]
    fn test_crop() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::new(
            ImageSize { width: 3, height: 3 },
            vec![
                0u8, 1, 2,
                3u8, 4, 5,
                6u8, 7, 8,
            ],
        )?;

        let mut cropped = Image::from_size_val(ImageSize { width: 2, height: 1 }, 0u8)?;
        crop_image(&image, &mut cropped, 1, 2)?;
        assert_eq!(cropped.as_slice(), &[7, 8]);

        Ok(())
    }

    #[test]
    fn test_crop_out_of_bounds() -> Result<(), ImageError> {
        let image = Image::from_size_val(ImageSize { width: 3, height: 3 }, 0u8)?;
        let mut cropped = Image::from_size_val(ImageSize { width: 2, height: 2 }, 0u8)?;
        assert!(crop_image(&image, &mut cropped, 2, 0).is_err());
        Ok(())
    }

    #[test]
    fn test_crop_border_undoes_padding() -> Result<(), ImageError> {
        let image = Image::from_fn(ImageSize { width: 4, height: 3 }, |y, x| (y * 4 + x) as f32);
        let padded = pad_uniform(&image, 2, PaddingMode::Reflect101)?;
        assert_eq!(crop_border(&padded, 2)?, image);
        assert!(crop_border(&image, 2).is_err());
        Ok(())
    }
}
