use std::cell::Cell;

use buffersource::{
    self, packed_strides, set_image, set_image_with, set_volume, BufferDescriptor,
    BufferIngestor, ElementFormat, Extent, HeapSurfaceFactory, IngestError,
    InvalidationLevel, NumericCategory, SourceNetwork, Surface, SurfaceFactory,
};
use ndarray::{s, Array, Array2, Array3, Array4, IxDyn};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

/// Counts the surfaces it is asked for, and fails every
/// request larger than `limit` bytes.
struct CountingFactory {
    requests : Cell<usize>,
    limit : usize,
}

impl CountingFactory {
    fn new(limit : usize) -> Self {
        CountingFactory { requests : Cell::new(0), limit }
    }

    fn check(&self, bytes : usize) -> Result<(), IngestError> {
        self.requests.set(self.requests.get() + 1);
        if bytes > self.limit {
            return Err(IngestError::AllocationFailed { bytes });
        }
        Ok(())
    }
}

impl SurfaceFactory for CountingFactory {
    fn create_layer(&self, width : usize, height : usize, format : ElementFormat)
        -> Result<Surface, IngestError> {
        self.check(width * height * format.bytes_per_element())?;
        HeapSurfaceFactory.create_layer(width, height, format)
    }

    fn create_volume(&self, width : usize, height : usize, depth : usize, format : ElementFormat)
        -> Result<Surface, IngestError> {
        self.check(width * height * depth * format.bytes_per_element())?;
        HeapSurfaceFactory.create_volume(width, height, depth, format)
    }
}

/// Always hands back a surface of the wrong size.
struct ShortFactory;

impl SurfaceFactory for ShortFactory {
    fn create_layer(&self, width : usize, _height : usize, format : ElementFormat)
        -> Result<Surface, IngestError> {
        HeapSurfaceFactory.create_layer(width, 1, format)
    }

    fn create_volume(&self, width : usize, height : usize, _depth : usize, format : ElementFormat)
        -> Result<Surface, IngestError> {
        HeapSurfaceFactory.create_volume(width, height, 1, format)
    }
}

fn network() -> SourceNetwork {
    let mut network = SourceNetwork::new();
    network.add_image_source("image");
    network.add_volume_source("volume");
    network
}

#[test]
fn scenario_float_image() {
    let array = Array2::<f32>::from_shape_fn((4, 3), |(r, c)| (r * 3 + c) as f32 * 0.5);
    let surface = BufferIngestor::new()
        .ingest_image(&BufferDescriptor::from_array(&array).unwrap())
        .unwrap();

    assert_eq!(surface.extent(), Extent::Planar { width : 3, height : 4 });
    assert_eq!(surface.format().components(), 1);
    assert_eq!(surface.format().category(), NumericCategory::Float);
    assert_eq!(surface.format(), ElementFormat::FLOAT32);
    assert_eq!(surface.as_slice::<f32>().unwrap(), array.as_slice().unwrap());
}

#[test]
fn scenario_rgb_image() {
    let array = Array3::<u8>::from_shape_fn((4, 3, 3), |(r, c, ch)| (r * 9 + c * 3 + ch) as u8);
    let surface = BufferIngestor::new()
        .ingest_image(&BufferDescriptor::from_array(&array).unwrap())
        .unwrap();

    assert_eq!(surface.extent(), Extent::Planar { width : 3, height : 4 });
    assert_eq!(surface.format().components(), 3);
    assert_eq!(surface.format().category(), NumericCategory::UnsignedInteger);
    assert_eq!(surface.format(), ElementFormat::VEC3_UINT8);
    assert_eq!(surface.as_array::<u8>().unwrap(), array.into_dyn());
}

#[test]
fn scenario_too_many_components() {
    let array = Array3::<u8>::zeros((4, 3, 5));
    let factory = CountingFactory::new(usize::MAX);
    let err = BufferIngestor::with_factory(factory)
        .ingest_image(&BufferDescriptor::from_array(&array).unwrap())
        .unwrap_err();
    assert_eq!(err, IngestError::TooManyComponents(5));
}

#[test]
fn scenario_non_packed_strides() {
    let bytes = [0u8; 2 * 3 * 4 * 2];
    let desc = BufferDescriptor::new(vec![2, 3], 4, vec![24, 4], "f", &bytes).unwrap();

    let ingestor = BufferIngestor::with_factory(CountingFactory::new(usize::MAX));
    assert!(matches!(
        ingestor.ingest_image(&desc),
        Err(IngestError::UnsupportedLayout(_))
    ));
    assert_eq!(ingestor.factory().requests.get(), 0);
}

#[test]
fn scenario_float64_volume() {
    let array = Array3::<f64>::from_shape_fn((2, 3, 4), |(r, c, z)| (r * 100 + c * 10 + z) as f64);
    let surface = BufferIngestor::new()
        .ingest_volume(&BufferDescriptor::from_array(&array).unwrap())
        .unwrap();

    assert_eq!(surface.extent(), Extent::Volumetric { width : 3, height : 2, depth : 4 });
    assert_eq!(surface.format().components(), 1);
    assert_eq!(surface.format(), ElementFormat::FLOAT64);

    // Same bytes, same order
    let view = surface.as_array::<f64>().unwrap();
    assert_eq!(view.shape(), &[2, 3, 4, 1]);
    assert_eq!(view[[1, 2, 3, 0]], 123.0);
}

#[test]
fn transposed_and_sliced_views_are_rejected() {
    let array = Array2::<i32>::zeros((4, 6));
    let ingestor = BufferIngestor::new();

    let transposed = array.t();
    assert!(matches!(
        ingestor.ingest_image(&BufferDescriptor::from_array(&transposed).unwrap()),
        Err(IngestError::UnsupportedLayout(_))
    ));

    let columns = array.slice(s![.., ..3]);
    assert!(matches!(
        BufferDescriptor::from_array(&columns).and_then(|d| ingestor.ingest_image(&d)),
        Err(IngestError::UnsupportedLayout(_))
    ));
}

#[test]
fn rows_are_not_flipped() {
    // Row 0 of the buffer stays at the start of the surface's memory
    let array = Array2::<u16>::from_shape_fn((3, 2), |(r, _)| r as u16);
    let surface = BufferIngestor::new()
        .ingest_image(&BufferDescriptor::from_array(&array).unwrap())
        .unwrap();
    assert_eq!(surface.as_slice::<u16>().unwrap(), &[0, 0, 1, 1, 2, 2]);
    assert_eq!(surface.as_array::<u16>().unwrap()[[0, 1, 0]], 0);
    assert_eq!(surface.as_array::<u16>().unwrap()[[2, 0, 0]], 2);
}

#[test]
fn allocation_failure_is_reported() {
    let array = Array2::<u64>::zeros((16, 16));
    let mut network = network();

    let ingestor = BufferIngestor::with_factory(CountingFactory::new(1024));
    assert_eq!(
        set_image_with(&mut network, &ingestor, "image", &BufferDescriptor::from_array(&array).unwrap()),
        Err(IngestError::AllocationFailed { bytes : 16 * 16 * 8 })
    );
    assert_eq!(ingestor.factory().requests.get(), 1);
    assert!(network.image_source("image").unwrap().data().is_none());
    assert_eq!(network.image_source("image").unwrap().invalidation(), InvalidationLevel::Valid);
}

#[test]
fn wrongly_sized_surfaces_are_rejected() {
    let array = Array3::<u8>::zeros((4, 3, 2));
    let ingestor = BufferIngestor::with_factory(ShortFactory);
    let desc = BufferDescriptor::from_array(&array).unwrap();

    assert!(matches!(ingestor.ingest_image(&desc), Err(IngestError::AllocationFailed { .. })));
    assert!(matches!(ingestor.ingest_volume(&desc), Err(IngestError::AllocationFailed { .. })));
}

#[test]
fn unsupported_element_types() {
    let bytes = [0u8; 12];
    for tag in ["e", "?", "c", "Zd", "object"] {
        let desc = BufferDescriptor::new(vec![3, 2], 2, vec![4, 2], tag, &bytes).unwrap();
        assert_eq!(
            BufferIngestor::new().ingest_image(&desc).unwrap_err(),
            IngestError::UnsupportedElementType(tag.to_string())
        );
    }
}

#[test]
fn unsupported_format() {
    // 3 byte components exist for no category
    let bytes = [0u8; 18];
    let desc = BufferDescriptor::new(vec![3, 2], 3, vec![6, 3], "i", &bytes).unwrap();
    assert_eq!(
        BufferIngestor::new().ingest_image(&desc).unwrap_err(),
        IngestError::UnsupportedFormat {
            category : NumericCategory::SignedInteger,
            components : 1,
            bits : 24,
        }
    );
}

#[test]
fn empty_component_axis_is_unsupported() {
    // A trailing axis of length 0 is within the component limit,
    // but no format has zero components
    let desc = BufferDescriptor::new(vec![4, 3, 0], 1, vec![0, 0, 1], "B", &[]).unwrap();
    assert_eq!(
        BufferIngestor::new().ingest_image(&desc).unwrap_err(),
        IngestError::UnsupportedFormat {
            category : NumericCategory::UnsignedInteger,
            components : 0,
            bits : 8,
        }
    );

    let desc = BufferDescriptor::new(vec![2, 4, 3, 0], 4, vec![0, 0, 0, 4], "f", &[]).unwrap();
    assert!(matches!(
        BufferIngestor::new().ingest_volume(&desc),
        Err(IngestError::UnsupportedFormat { components : 0, .. })
    ));
}

#[test]
fn oversized_empty_buffers_are_malformed() {
    let huge = 1usize << 40;
    for (shape, itemsize) in [(vec![0, huge, huge], 1), (vec![0, 1], usize::MAX / 4)] {
        let strides = vec![0; shape.len()];
        assert!(matches!(
            BufferDescriptor::new(shape, itemsize, strides, "B", &[]),
            Err(IngestError::MalformedDescriptor(_))
        ));
    }
}

#[test]
fn dimensionality_bounds() {
    let ingestor = BufferIngestor::new();
    let line = Array::<u8, _>::zeros(8);
    let plane = Array2::<u8>::zeros((2, 2));
    let hyper = Array4::<u8>::zeros((2, 2, 2, 2));
    let five = Array::<u8, _>::zeros(IxDyn(&[2, 2, 2, 2, 2]));

    assert!(matches!(
        ingestor.ingest_image(&BufferDescriptor::from_array(&line).unwrap()),
        Err(IngestError::InvalidDimensionality { ndim : 1, .. })
    ));
    assert!(matches!(
        ingestor.ingest_image(&BufferDescriptor::from_array(&hyper).unwrap()),
        Err(IngestError::InvalidDimensionality { ndim : 4, .. })
    ));
    assert!(matches!(
        ingestor.ingest_volume(&BufferDescriptor::from_array(&plane).unwrap()),
        Err(IngestError::InvalidDimensionality { ndim : 2, .. })
    ));
    assert!(matches!(
        ingestor.ingest_volume(&BufferDescriptor::from_array(&five).unwrap()),
        Err(IngestError::InvalidDimensionality { ndim : 5, .. })
    ));
    assert!(ingestor.ingest_volume(&BufferDescriptor::from_array(&hyper).unwrap()).is_ok());
}

#[test_log::test]
fn set_image_delivers_and_invalidates() {
    let mut network = network();
    let array = Array3::<u16>::from_shape_fn((5, 7, 4), |(r, c, ch)| (r * 28 + c * 4 + ch) as u16);

    set_image(&mut network, "image", &BufferDescriptor::from_array(&array).unwrap()).unwrap();

    let source = network.image_source_mut("image").unwrap();
    let image = source.data().unwrap();
    assert_eq!(image.dimensions(), (7, 5));
    assert_eq!(image.format().name(), "Vec4UInt16");
    assert_eq!(image.layer().as_slice::<u16>().unwrap(), array.as_slice().unwrap());
    assert_eq!(source.updates(), 1);
    assert_eq!(source.take_invalidation(), InvalidationLevel::InvalidOutput);
}

#[test_log::test]
fn set_volume_delivers_and_invalidates() {
    let mut network = network();
    let array = Array4::<i8>::from_shape_fn((2, 3, 4, 2), |(r, c, z, ch)| {
        (r as i8 - c as i8) * (z as i8) - ch as i8
    });

    set_volume(&mut network, "volume", &BufferDescriptor::from_array(&array).unwrap()).unwrap();

    let source = network.volume_source("volume").unwrap();
    let volume = source.data().unwrap();
    assert_eq!(volume.dimensions(), (3, 2, 4));
    assert_eq!(volume.format().name(), "Vec2Int8");
    assert_eq!(volume.data().as_array::<i8>().unwrap(), array.into_dyn());
    assert_eq!(source.invalidation(), InvalidationLevel::InvalidOutput);
}

#[test]
fn failures_leave_target_untouched() {
    let mut network = network();
    let first = Array2::<f32>::ones((2, 2));
    set_image(&mut network, "image", &BufferDescriptor::from_array(&first).unwrap()).unwrap();
    network.image_source_mut("image").unwrap().take_invalidation();

    let bad = Array3::<f32>::zeros((2, 2, 6));
    assert_eq!(
        set_image(&mut network, "image", &BufferDescriptor::from_array(&bad).unwrap()),
        Err(IngestError::TooManyComponents(6))
    );

    let source = network.image_source("image").unwrap();
    assert_eq!(source.updates(), 1);
    assert_eq!(source.invalidation(), InvalidationLevel::Valid);
    assert_eq!(source.data().unwrap().layer().as_slice::<f32>().unwrap(), &[1.0; 4]);
}

#[test]
fn target_resolution_errors() {
    let mut network = network();
    let image = Array2::<u8>::zeros((2, 2));
    let volume = Array3::<u8>::zeros((2, 2, 2));

    assert_eq!(
        set_image(&mut network, "nowhere", &BufferDescriptor::from_array(&image).unwrap()),
        Err(IngestError::TargetNotFound("nowhere".to_string()))
    );
    assert!(matches!(
        set_image(&mut network, "volume", &BufferDescriptor::from_array(&image).unwrap()),
        Err(IngestError::TargetTypeMismatch { .. })
    ));
    assert!(matches!(
        set_volume(&mut network, "image", &BufferDescriptor::from_array(&volume).unwrap()),
        Err(IngestError::TargetTypeMismatch { .. })
    ));
    assert!(network.volume_source("volume").unwrap().data().is_none());
}

#[test]
fn error_messages() {
    assert_eq!(
        IngestError::TooManyComponents(5).to_string(),
        "Too many components (expected maximum 4, got 5)"
    );
    assert_eq!(
        IngestError::TargetNotFound("a".to_string()).to_string(),
        "Cannot find source a"
    );
    assert!(IngestError::InvalidDimensionality {
        class : buffersource::DimensionClass::Volume,
        ndim : 2,
    }.to_string().contains("expected 3 or 4"));
}

/// Random packed shapes of the given number of dimensions,
/// with a trailing component axis of 1 to 4 when `with_components`.
fn random_shape(rng : &mut StdRng, spatial : usize, with_components : bool) -> Vec<usize> {
    let mut shape : Vec<usize> = (0..spatial).map(|_| rng.gen_range(1..9)).collect();
    if with_components {
        shape.push(rng.gen_range(1..=4));
    }
    shape
}

#[test]
fn random_packed_images_succeed() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let ingestor = BufferIngestor::new();
    let tags = [("B", 1), ("h", 2), ("I", 4), ("f", 4), ("d", 8), ("q", 8)];

    for _ in 0..200 {
        let with_components = rng.gen_bool(0.5);
        let shape = random_shape(&mut rng, 2, with_components);
        let &(tag, itemsize) = tags.choose(&mut rng).unwrap();
        let len = shape.iter().product::<usize>() * itemsize;
        let bytes : Vec<u8> = (0..len).map(|_| rng.gen()).collect();

        let desc = BufferDescriptor::new(
            shape.clone(), itemsize, packed_strides(&shape, itemsize), tag, &bytes
        ).unwrap();
        let surface = ingestor.ingest_image(&desc).unwrap();

        assert_eq!(surface.extent(), Extent::Planar { width : shape[1], height : shape[0] });
        assert_eq!(surface.format().components(), shape.get(2).copied().unwrap_or(1));
        assert_eq!(surface.as_bytes(), &bytes[..]);
    }
}

#[test]
fn random_packed_volumes_succeed() {
    let mut rng = StdRng::seed_from_u64(0xb0b);
    let ingestor = BufferIngestor::new();

    for _ in 0..100 {
        let with_components = rng.gen_bool(0.5);
        let shape = random_shape(&mut rng, 3, with_components);
        let len = shape.iter().product::<usize>() * 2;
        let bytes : Vec<u8> = (0..len).map(|_| rng.gen()).collect();

        let desc = BufferDescriptor::new(
            shape.clone(), 2, packed_strides(&shape, 2), "=H", &bytes
        ).unwrap();
        let surface = ingestor.ingest_volume(&desc).unwrap();

        assert_eq!(
            surface.extent(),
            Extent::Volumetric { width : shape[1], height : shape[0], depth : shape[2] }
        );
        assert_eq!(surface.as_bytes(), &bytes[..]);
    }
}

#[test]
fn random_non_packed_strides_fail() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..200 {
        let shape = random_shape(&mut rng, 3, false);
        let packed = packed_strides(&shape, 4);
        let mut strides = packed.clone();
        // Either scramble the strides or stretch one of them
        if rng.gen_bool(0.5) {
            strides.shuffle(&mut rng);
        } else {
            let axis = rng.gen_range(0..strides.len());
            strides[axis] *= 2;
        }
        if strides == packed {
            continue;
        }

        let bytes = vec![0u8; shape.iter().product::<usize>() * 4];
        let desc = BufferDescriptor::new(shape, 4, strides, "f", &bytes).unwrap();
        let ingestor = BufferIngestor::with_factory(CountingFactory::new(usize::MAX));

        assert!(matches!(ingestor.ingest_volume(&desc), Err(IngestError::UnsupportedLayout(_))));
        assert_eq!(ingestor.factory().requests.get(), 0);
    }
}

#[test]
fn random_component_overflow_fails() {
    let mut rng = StdRng::seed_from_u64(7);
    let ingestor = BufferIngestor::new();

    for _ in 0..50 {
        let shape = vec![rng.gen_range(1..6), rng.gen_range(1..6), rng.gen_range(5..12)];
        let bytes = vec![0u8; shape.iter().product::<usize>()];
        let desc = BufferDescriptor::new(shape.clone(), 1, packed_strides(&shape, 1), "B", &bytes)
            .unwrap();
        assert_eq!(
            ingestor.ingest_image(&desc).unwrap_err(),
            IngestError::TooManyComponents(shape[2])
        );
    }
}
