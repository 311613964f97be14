//! Registers one chunk per device variable and pushes a full and a partial
//! update through the cache, printing every notification.
//!
//! Run with `RUST_LOG=chunk_cache=debug` to see merge events.

use chunk_cache::{subscriber_fn, Cache, CacheConfig, CacheError, Variable};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;
use tracing_subscriber::EnvFilter;

/// Deterministic xorshift byte source so runs are reproducible.
struct ByteStream(u32);

impl ByteStream {
    fn fill(&mut self, len: usize) -> Vec<u8> {
        (0..len)
            .map(|_| {
                self.0 ^= self.0 << 13;
                self.0 ^= self.0 >> 17;
                self.0 ^= self.0 << 5;
                self.0.to_le_bytes()[0]
            })
            .collect()
    }
}

fn device_variables() -> Vec<Variable> {
    vec![
        Variable::new("Vholdoff", 0x0000_8000, 2),
        Variable::new("Vbus", 0x0000_8002, 2),
        Variable::new("testStruct12", 0x0000_8004, 6),
        Variable::new("faultFlags", 0x0000_800A, 1),
    ]
}

fn main() -> Result<(), CacheError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // C2000-style targets address 16-bit units.
    let mut cache = Cache::from_config(&CacheConfig { bits_per_byte: 16 })?;
    let variables = device_variables();

    for variable in &variables {
        let key = cache.add(cache.chunk_from_variable(variable))?;
        let name = variable.name.clone();
        let subscriber = subscriber_fn(move |bytes| {
            println!("{name} was updated: {bytes:02x?}");
            Ok(())
        });
        cache.subscribe(&subscriber, key);
        println!("added {}: {key}", variable.name);
    }

    let mut stream = ByteStream(0x2545_F491);

    let mut full = cache.chunk_from_variable(&variables[0]);
    full.set_bytes(&stream.fill(full.len()))?;
    println!("sending update: {}", full.key());
    cache.update(&full)?;

    // First two units of testStruct12 only.
    let ratio = cache.unit_width().bytes_per_unit();
    let partial = cache.new_chunk(variables[2].address, stream.fill(2 * ratio));
    println!("sending update: {}", partial.key());
    let merged = cache.update(&partial)?;
    println!("{merged} chunk(s) merged");

    Ok(())
}
