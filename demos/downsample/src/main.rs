use argh::FromArgs;
use std::path::PathBuf;

use pixdown::{
    imgproc::{downsample::KernelApplyInput, Function},
    tensor::Tensor4,
    Downsampler, DownsamplerConfig,
};

#[derive(FromArgs)]
/// Downsample a synthetic image with box kernels and zero offsets
struct Args {
    /// height of the synthetic image
    #[argh(option, default = "64")]
    height: usize,

    /// width of the synthetic image
    #[argh(option, default = "96")]
    width: usize,

    /// number of images in the batch
    #[argh(option, default = "1")]
    batch: usize,

    /// path to a JSON downsampler configuration
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// override the downsampling factor
    #[argh(option, short = 's')]
    scale: Option<usize>,

    /// override the kernel size
    #[argh(option, short = 'k')]
    kernel_size: Option<usize>,

    /// override the soft rounding sharpness
    #[argh(option, short = 'a')]
    alpha: Option<f32>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut config = match &args.config {
        Some(path) => DownsamplerConfig::from_json_file(path)?,
        None => DownsamplerConfig::default(),
    };
    if let Some(scale) = args.scale {
        config.scale = scale;
    }
    if let Some(kernel_size) = args.kernel_size {
        config.kernel_size = kernel_size;
    }
    if let Some(alpha) = args.alpha {
        config.alpha = alpha;
    }

    let downsampler = Downsampler::<f32>::new(config)?;
    let (out_h, out_w) = downsampler.output_size(args.height, args.width)?;
    let k2 = config.kernel_size * config.kernel_size;

    // diagonal color gradient in [0, 1]
    let (h, w) = (args.height, args.width);
    let image = Tensor4::from_shape_fn([args.batch, 3, h, w], |[_, c, y, x]| match c {
        0 => x as f32 / (w - 1).max(1) as f32,
        1 => y as f32 / (h - 1).max(1) as f32,
        _ => (x + y) as f32 / (w + h - 2).max(1) as f32,
    });

    let input = KernelApplyInput {
        image,
        kernels: Tensor4::from_shape_val([args.batch, k2, out_h, out_w], 1.0 / k2 as f32),
        offsets_h: Tensor4::zeros([args.batch, 1, out_h, out_w]),
        offsets_v: Tensor4::zeros([args.batch, 1, out_h, out_w]),
    };

    let out = downsampler.forward(&input)?;

    let (min, max) = out
        .as_slice()
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    log::info!(
        "downsampled {:?} -> {:?} (values in [{min:.3}, {max:.3}])",
        input.image.shape,
        out.shape
    );

    match downsampler.backward(&out) {
        Ok(_) => log::warn!("backward unexpectedly succeeded"),
        Err(e) => log::info!("backward: {e}"),
    }

    Ok(())
}
