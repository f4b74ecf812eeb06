#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use pivfilt_image as image;

#[doc(inline)]
pub use pivfilt_imgproc as imgproc;
