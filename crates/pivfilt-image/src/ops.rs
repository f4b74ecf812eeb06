use crate::{Image, ImageError};

/// Cast the pixel data of an image to a different type and scale it.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image.
/// * `scale` - The scale to multiply the pixel data with.
///
/// Example:
///
/// ```
/// use pivfilt_image::{Image, ImageSize};
/// use pivfilt_image::ops::cast_and_scale;
///
/// let image = Image::<u8>::new(ImageSize { width: 2, height: 1 }, vec![0u8, 255]).unwrap();
///
/// let mut image_f32 = Image::from_size_val(image.size(), 0.0f32).unwrap();
///
/// cast_and_scale(&image, &mut image_f32, 1. / 255.0).unwrap();
///
/// assert_eq!(image_f32.get_pixel(0, 0).unwrap(), &0.0f32);
/// assert_eq!(image_f32.get_pixel(1, 0).unwrap(), &1.0f32);
/// ```
pub fn cast_and_scale<T, U>(src: &Image<T>, dst: &mut Image<U>, scale: U) -> Result<(), ImageError>
where
    T: Copy + num_traits::NumCast,
    U: Copy + num_traits::NumCast + std::ops::Mul<U, Output = U>,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice().iter())
        .try_for_each(|(out, &inp)| {
            let x = U::from(inp).ok_or(ImageError::CastError(
                std::any::type_name::<U>().to_string(),
            ))?;
            *out = x * scale;
            Ok::<(), ImageError>(())
        })?;

    Ok(())
}

/// The largest pixel value of an image, `None` for an empty image.
///
/// NaN samples are skipped.
pub fn max_value<T>(src: &Image<T>) -> Option<T>
where
    T: Copy + PartialOrd,
{
    src.as_slice()
        .iter()
        .copied()
        .filter(|v| v.partial_cmp(v).is_some())
        .fold(None, |acc, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
}
