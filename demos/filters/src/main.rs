use argh::FromArgs;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::PathBuf;

use pivfilt::{
    image::{Image, ImageSize},
    imgproc::{
        adapter,
        filter::{
            ConvolutionMethod, ConvolveOptions, FilterKind, HighpassParams, LowpassParams,
            VarianceNormParams,
        },
    },
};

#[derive(FromArgs)]
/// Run the spatial filters on a synthetic particle image
struct Args {
    /// the width of the synthetic image
    #[argh(option, default = "640")]
    width: usize,

    /// the height of the synthetic image
    #[argh(option, default = "480")]
    height: usize,

    /// the number of particles to draw
    #[argh(option, default = "400")]
    particles: usize,

    /// the seed of the particle generator
    #[argh(option, default = "42")]
    seed: u64,

    /// a JSON file with a list of filters to run instead of the default set
    #[argh(option)]
    config: Option<PathBuf>,

    /// evaluate the 2D kernel directly instead of separably
    #[argh(switch)]
    direct: bool,
}

// bright gaussian spots over a dim noisy background
fn particle_image(size: ImageSize, num_particles: usize, seed: u64) -> Image<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data: Vec<f32> = (0..size.num_pixels())
        .map(|_| rng.random_range(5.0..25.0))
        .collect();

    for _ in 0..num_particles {
        let cx = rng.random_range(0.0..size.width as f32);
        let cy = rng.random_range(0.0..size.height as f32);
        let peak = rng.random_range(80.0..230.0);
        let radius = rng.random_range(0.8..2.0f32);

        let x0 = (cx - 3.0 * radius).max(0.0) as usize;
        let x1 = ((cx + 3.0 * radius) as usize).min(size.width - 1);
        let y0 = (cy - 3.0 * radius).max(0.0) as usize;
        let y1 = ((cy + 3.0 * radius) as usize).min(size.height - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let d2 = (x as f32 - cx).powi(2) + (y as f32 - cy).powi(2);
                data[y * size.width + x] += peak * (-d2 / (2.0 * radius * radius)).exp();
            }
        }
    }

    Image::from_fn(size, |y, x| data[y * size.width + x].min(255.0) as u8)
}

fn stats(image: &Image<u8>) -> (u8, u8, f64) {
    let (min, max, sum) = image.as_slice().iter().fold(
        (u8::MAX, u8::MIN, 0u64),
        |(min, max, sum), &v| (min.min(v), max.max(v), sum + v as u64),
    );
    (min, max, sum as f64 / image.as_slice().len() as f64)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();

    if args.width == 0 || args.height == 0 {
        return Err("the image must not be empty".into());
    }

    let filters: Vec<FilterKind> = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => vec![
            FilterKind::Lowpass(LowpassParams::default()),
            FilterKind::Highpass(HighpassParams {
                clip_at_zero: true,
                ..Default::default()
            }),
            FilterKind::VarianceNormalization(VarianceNormParams {
                kernel_size: 7,
                ..Default::default()
            }),
        ],
    };

    let method = if args.direct {
        ConvolutionMethod::Direct
    } else {
        ConvolutionMethod::Separable
    };
    let options = ConvolveOptions::with_method(method);

    let size = ImageSize {
        width: args.width,
        height: args.height,
    };
    let image = particle_image(size, args.particles, args.seed);

    let (min, max, mean) = stats(&image);
    println!("input {size}: min {min} max {max} mean {mean:.3}");

    for kind in &filters {
        let start = std::time::Instant::now();
        let filtered = adapter::apply_with_options(&image, kind, &options)?;
        log::info!("{} took {:?}", kind.name(), start.elapsed());

        let (min, max, mean) = stats(&filtered);
        println!(
            "{} (k={}): min {min} max {max} mean {mean:.3}",
            kind.name(),
            kind.kernel_size()
        );
    }

    Ok(())
}
