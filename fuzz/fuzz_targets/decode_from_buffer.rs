#![no_main]

use libfuzzer_sys::fuzz_target;
use trent::{EngineConfig, Session, TrentError};

fuzz_target!(|data: &[u8]| {
    // Keep allocations bounded; limits are what we are exercising anyway.
    let config = EngineConfig {
        max_dimension: 4096,
        max_pixels: 4_000_000,
        ..EngineConfig::fast()
    };

    match Session::from_bytes_with_config(data.to_vec(), config) {
        Ok(session) => {
            let (w, h) = session.dimensions();
            assert!(w > 0 && h > 0);
            assert!(w <= 4096 && h <= 4096);
            assert_eq!(session.working(), session.original());
        }
        Err(TrentError::InternalPanic { message }) => {
            panic!("decoder panicked: {message}");
        }
        Err(_) => {}
    }
});
