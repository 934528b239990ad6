#![no_main]

use archive::{ArchiveReader, ArchiveVecWriter};
use codec::{CodecLimits, NetworkedTargetData, RequestFlags, TargetDataKind};
use libfuzzer_sys::fuzz_target;

fn encode(data: &NetworkedTargetData, limits: &CodecLimits) -> Vec<u8> {
    let mut writer = ArchiveVecWriter::new();
    data.encode(&mut writer, limits)
        .expect("re-encode decoded target data");
    writer.finish()
}

fuzz_target!(|data: &[u8]| {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };
    let Some(kind) = TargetDataKind::from_code(selector % 3) else {
        return;
    };
    let flags = RequestFlags::from_raw(selector >> 2);
    let limits = CodecLimits::for_testing();

    let mut decoded: NetworkedTargetData = NetworkedTargetData::empty(kind);
    let mut reader = ArchiveReader::new(payload);
    if decoded.decode(flags, &mut reader, &limits).is_err() {
        return;
    }

    // Whatever decodes must re-encode, and the re-encoding must be stable.
    assert!(reader.position() <= payload.len());
    let first = encode(&decoded, &limits);
    let mut again: NetworkedTargetData = NetworkedTargetData::empty(kind);
    again
        .decode(flags, &mut ArchiveReader::new(&first), &limits)
        .expect("decode re-encoded target data");
    assert_eq!(encode(&again, &limits), first);

    let mut prefixed: NetworkedTargetData = NetworkedTargetData::empty(kind);
    let _ = prefixed.decode_prefixed(&mut ArchiveReader::new(payload), &limits);
});
