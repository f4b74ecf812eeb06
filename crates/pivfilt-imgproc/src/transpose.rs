use pivfilt_image::{Image, ImageError};
use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Transpose the input image, swapping rows and columns.
///
/// # Arguments
///
/// * `src` - The input image with shape (H, W).
///
/// # Returns
///
/// The transposed image with shape (W, H).
///
/// # Example
///
/// ```
/// use pivfilt_image::{Image, ImageSize};
/// use pivfilt_imgproc::transpose::transpose;
///
/// let image = Image::new(ImageSize { width: 3, height: 2 }, vec![1u8, 2, 3, 4, 5, 6]).unwrap();
///
/// let transposed = transpose(&image).unwrap();
///
/// assert_eq!(transposed.size().width, 2);
/// assert_eq!(transposed.size().height, 3);
/// assert_eq!(transposed.as_slice(), &[1, 4, 2, 5, 3, 6]);
/// ```
pub fn transpose<T>(src: &Image<T>) -> Result<Image<T>, ImageError>
where
    T: Copy + Default + Send + Sync,
{
    let mut dst = Image::from_size_val(src.size().transposed(), T::default())?;
    if src.is_empty() {
        return Ok(dst);
    }

    let src_cols = src.cols();
    let src_data = src.as_slice();

    dst.as_slice_mut()
        .par_chunks_exact_mut(src.rows())
        .enumerate()
        .for_each(|(x, dst_row)| {
            for (y, px) in dst_row.iter_mut().enumerate() {
                *px = src_data[y * src_cols + x];
            }
        });

    Ok(dst)
}
