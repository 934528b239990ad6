#![no_main]

use archive::ArchiveReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = ArchiveReader::new(data);
    let mut idx = 0usize;

    // Use input bytes to drive a bounded sequence of operations.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 6;
        idx += 1;

        let failed = match op {
            0 => reader.read_u8().is_err(),
            1 => reader.read_u32().is_err(),
            2 => reader.read_i32().is_err(),
            3 => reader.read_f32().is_err(),
            4 => reader.read_varu32().is_err(),
            _ => {
                let len = usize::from(data[idx - 1] >> 3);
                reader.read_bytes(len).is_err()
            }
        };

        // Errors are sticky.
        if failed {
            assert!(reader.is_error());
            assert!(reader.read_u8().is_err());
        }
        assert!(reader.position() <= data.len());
    }
});
