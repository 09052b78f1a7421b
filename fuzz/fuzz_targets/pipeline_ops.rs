#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use trent::{BufferKind, ConvolutionPreset, Filter, GrayTone, PixelBuffer, Session};

#[derive(Arbitrary, Debug)]
struct FilterSeed {
    kind: u8,
    a: i32,
    b: i32,
    c: u8,
}

#[derive(Arbitrary, Debug)]
struct Input {
    width: u8,
    height: u8,
    pixels: Vec<u8>,
    seeds: Vec<FilterSeed>,
    revert_at: Option<u8>,
    preview: bool,
}

fn build_buffer(input: &Input) -> PixelBuffer {
    let width = input.width as u32 % 48 + 1;
    let height = input.height as u32 % 48 + 1;
    PixelBuffer::from_fn(width, height, |x, y| {
        let i = ((y * width + x) * 3) as usize;
        let at = |k: usize| {
            if input.pixels.is_empty() {
                0
            } else {
                input.pixels[(i + k) % input.pixels.len()]
            }
        };
        [at(0), at(1), at(2)]
    })
}

fn seed_to_filter(seed: &FilterSeed) -> Filter {
    match seed.kind % 7 {
        0 => Filter::Gray {
            tone: GrayTone::ALL[seed.c as usize % GrayTone::ALL.len()],
        },
        1 => Filter::Brightness { delta: seed.a },
        2 => Filter::ChannelMask {
            red: seed.c,
            green: seed.a as u8,
            blue: seed.b as u8,
        },
        // Block sizes are passed through unclamped; non-positive ones must
        // be rejected without touching the session.
        3 => Filter::Mosaic {
            block_width: seed.a % 64,
            block_height: seed.b % 64,
        },
        4 => Filter::Convolution {
            preset: ConvolutionPreset::ALL[seed.c as usize % ConvolutionPreset::ALL.len()],
        },
        5 => Filter::HighContrast,
        _ => Filter::Inverse,
    }
}

fuzz_target!(|input: Input| {
    let buffer = build_buffer(&input);
    let dims = buffer.dimensions();
    let mut session = Session::from_buffer(buffer);

    for (i, seed) in input.seeds.iter().take(12).enumerate() {
        if input.revert_at == Some(i as u8) {
            session.revert();
        }
        let filter = seed_to_filter(seed);
        let before = session.working().clone();
        match session.apply(&filter) {
            Ok(()) => assert_eq!(session.working().dimensions(), dims),
            Err(_) => assert_eq!(session.working(), &before),
        }
    }

    if input.preview {
        let _ = session.preview(BufferKind::Modified);
    }
});
