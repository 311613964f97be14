#![no_main]

use chunk_cache::{Cache, Chunk, UnitWidth};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let Ok(width) = UnitWidth::new(u32::from(data[0] % 5) * 8 + 8) else {
        return;
    };
    let resident_at = u64::from(data[1]);
    let update_at = u64::from(data[2]);
    let split = usize::from(data[3]).min(data.len() - 4);
    let (resident_bytes, update_bytes) = data[4..].split_at(split);

    let mut cache = Cache::new(width);
    let Ok(key) = cache.add(cache.new_chunk(resident_at, resident_bytes)) else {
        return;
    };
    let update = cache.new_chunk(update_at, update_bytes);
    let merged = cache.update(&update).unwrap_or_default();

    let resident = cache.get(key).expect("resident chunk stays registered");
    assert_eq!(resident.len(), resident_bytes.len());
    assert!(merged <= 1);

    // Direct merge with a narrower width must never panic or resize.
    let mut narrow = Chunk::new(resident_at, resident_bytes);
    let narrow_merged = narrow.update(&update);
    assert_eq!(narrow.len(), resident_bytes.len());
    if !narrow_merged {
        assert_eq!(narrow.bytes(), resident_bytes);
    }
});
