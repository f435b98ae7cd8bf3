//! Uses a fixed-size struct as the key by mapping it to its byte image.

use linear_hash::ByteMap;

#[derive(Debug, Clone, Copy)]
struct Foo {
    a: i64,
    b: i64,
    c: i16,
}

impl Foo {
    const KEY_LEN: usize = 18;

    /// Field-by-field little-endian image; no padding bytes involved.
    fn key(&self) -> [u8; Self::KEY_LEN] {
        let mut bytes = [0; Self::KEY_LEN];
        bytes[..8].copy_from_slice(&self.a.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.b.to_le_bytes());
        bytes[16..].copy_from_slice(&self.c.to_le_bytes());
        bytes
    }
}

fn main() {
    env_logger::init();

    let x = Foo { a: 12, b: 14, c: 1 };
    let y = Foo { a: 23, b: 25, c: 3 };
    let z = Foo { a: 12, b: 14, c: 1 };

    let mut map = ByteMap::new();

    println!("insert x: {}", map.insert(x.key(), "x"));
    println!("insert y: {}", map.insert(y.key(), "y"));
    println!("insert z (same bytes as x): {}", map.insert(z.key(), "z"));

    for foo in [x, y, z] {
        println!("{:?} -> {:?}", foo, map.get(&foo.key()));
    }

    println!("size: {}", map.len());
    if let Some(values) = map.collect_values() {
        println!("values: {:?}", values);
    }

    if let Ok(previous) = map.update(&y.key(), "y2") {
        println!("updated y, previous value {:?}", previous);
    }
    println!("removed x: {:?}", map.remove(&x.key()));
    println!("x present: {}", map.contains_key(&x.key()));

    for (key, value) in &map {
        println!("{:02x?} -> {}", key, value);
    }
}
