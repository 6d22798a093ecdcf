use buffersource::{self, set_image, set_volume, BufferDescriptor, IngestError, SourceNetwork};
use log::{error, info};
use ndarray::{Array3, Array4};

const IMAGE_SOURCE : &str = "ImageSourceBuffer";
const VOLUME_SOURCE : &str = "VolumeSourceBuffer";

/// Pushes a synthetic RGB gradient image and a two-component
/// volume through a small source network and logs what
/// arrives at each source.
fn run() -> Result<(), IngestError> {
    let mut network = SourceNetwork::new();
    network.add_image_source(IMAGE_SOURCE);
    network.add_volume_source(VOLUME_SOURCE);

    let gradient = Array3::<u8>::from_shape_fn((64, 128, 3), |(row, col, channel)| {
        match channel {
            0 => (col * 2) as u8,
            1 => (row * 4) as u8,
            _ => 128,
        }
    });
    set_image(&mut network, IMAGE_SOURCE, &BufferDescriptor::from_array(&gradient)?)?;

    let field = Array4::<f32>::from_shape_fn((16, 32, 8, 2), |(row, col, slice, c)| {
        (row + col + slice) as f32 * if c == 0 { 1.0 } else { -1.0 }
    });
    set_volume(&mut network, VOLUME_SOURCE, &BufferDescriptor::from_array(&field)?)?;

    if let Some(image) = network.image_source(IMAGE_SOURCE).and_then(|s| s.data()) {
        info!("{} holds a {:?} {} image", IMAGE_SOURCE, image.dimensions(), image.format());
    }
    if let Some(volume) = network.volume_source(VOLUME_SOURCE).and_then(|s| s.data()) {
        info!("{} holds a {:?} {} volume", VOLUME_SOURCE, volume.dimensions(), volume.format());
    }

    // Wrong kind of source on purpose
    if let Err(err) = set_volume(&mut network, IMAGE_SOURCE, &BufferDescriptor::from_array(&field)?) {
        info!("Rejected as expected: {}", err);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    info!("buffersource {}", buffersource::VERSION);
    if let Err(e) = run() {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}
