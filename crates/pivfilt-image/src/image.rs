use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use pivfilt_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by this size.
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    /// Whether either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The size with width and height swapped.
    pub fn transposed(&self) -> Self {
        ImageSize {
            width: self.height,
            height: self.width,
        }
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

/// Represents a single-channel image with pixel data.
///
/// The pixels are stored row-major: the sample at row `y` and column `x`
/// lives at index `y * width + x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T> Image<T> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The row-major pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use pivfilt_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8>::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0u8; 10 * 20],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        if data.len() != size.num_pixels() {
            return Err(ImageError::InvalidDataLength(
                data.len(),
                size.num_pixels(),
            ));
        }

        Ok(Self { size, data })
    }

    /// Create a new image with the given size filled with `val`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pivfilt_image::{Image, ImageSize};
    ///
    /// let image = Image::from_size_val(ImageSize { width: 3, height: 2 }, 0.5f32).unwrap();
    ///
    /// assert_eq!(image.as_slice(), &[0.5; 6]);
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let data = vec![val; size.num_pixels()];
        Image::new(size, data)
    }

    /// Create a new image by evaluating `f(y, x)` at every pixel.
    pub fn from_fn(size: ImageSize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(size.num_pixels());
        for y in 0..size.height {
            for x in 0..size.width {
                data.push(f(y, x));
            }
        }
        Self { size, data }
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Whether the image holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Get the pixel data as a row-major slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the pixel data as a mutable row-major slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return its pixel data.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Get a row of the image, `None` if `y` is out of bounds.
    pub fn row(&self, y: usize) -> Option<&[T]> {
        if y >= self.height() {
            return None;
        }
        let start = y * self.width();
        Some(&self.data[start..start + self.width()])
    }

    /// Get the pixel at `[y, x]`, `None` if out of bounds.
    pub fn get(&self, index: [usize; 2]) -> Option<&T> {
        let [y, x] = index;
        if y >= self.height() || x >= self.width() {
            return None;
        }
        self.data.get(y * self.width() + x)
    }

    /// Get a mutable reference to the pixel at `[y, x]`, `None` if out of bounds.
    pub fn get_mut(&mut self, index: [usize; 2]) -> Option<&mut T> {
        let [y, x] = index;
        if y >= self.height() || x >= self.width() {
            return None;
        }
        let width = self.width();
        self.data.get_mut(y * width + x)
    }

    /// Get the pixel at column `x` and row `y`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::PixelIndexOutOfBounds`] if the coordinate is outside the image.
    pub fn get_pixel(&self, x: usize, y: usize) -> Result<&T, ImageError> {
        self.get([y, x]).ok_or(ImageError::PixelIndexOutOfBounds(
            x,
            y,
            self.width(),
            self.height(),
        ))
    }

    /// Apply `f` to every pixel, producing an image of the same size.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Image<U> {
        Image {
            size: self.size,
            data: self.data.iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::image::{Image, ImageError, ImageSize};

    #[test]
    fn image_size() {
        let image_size = ImageSize {
            width: 10,
            height: 20,
        };
        assert_eq!(image_size.num_pixels(), 200);
        assert_eq!(
            image_size.transposed(),
            ImageSize {
                width: 20,
                height: 10
            }
        );
        assert!(!image_size.is_empty());
        assert!(ImageSize { width: 0, height: 3 }.is_empty());
    }

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = Image::<u8>::new(
            ImageSize {
                width: 10,
                height: 20,
            },
            vec![0u8; 10 * 20],
        )?;
        assert_eq!(image.size().width, 10);
        assert_eq!(image.size().height, 20);
        assert_eq!(image.rows(), 20);
        assert_eq!(image.cols(), 10);

        Ok(())
    }

    #[test]
    fn image_wrong_length() {
        let res = Image::<f32>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0.0; 3],
        );
        assert_eq!(res, Err(ImageError::InvalidDataLength(3, 4)));
    }

    #[test]
    fn image_indexing() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let mut image = Image::new(
            ImageSize { width: 3, height: 2 },
            vec![
                0, 1, 2,
                3, 4, 5,
            ],
        )?;
        assert_eq!(image.get([1, 0]), Some(&3));
        assert_eq!(image.get([2, 0]), None);
        assert_eq!(image.row(1), Some(&[3, 4, 5][..]));
        assert_eq!(image.get_pixel(2, 0)?, &2);
        assert!(matches!(
            image.get_pixel(3, 0),
            Err(ImageError::PixelIndexOutOfBounds(3, 0, 3, 2))
        ));

        if let Some(px) = image.get_mut([0, 1]) {
            *px = 9;
        }
        assert_eq!(image.as_slice(), &[0, 9, 2, 3, 4, 5]);

        Ok(())
    }

    #[test]
    fn image_from_fn() {
        let image = Image::from_fn(ImageSize { width: 3, height: 2 }, |y, x| y * 10 + x);
        assert_eq!(image.into_vec(), vec![0, 1, 2, 10, 11, 12]);
    }
}
