#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_inputs_hash_apart() {
        let mut a = Fnv1a64::new_default();
        a.write_bytes(b"photos/a.png");
        let mut b = Fnv1a64::new_default();
        b.write_bytes(b"photos/b.png");
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn hashing_is_order_sensitive_and_stable() {
        let mut h = Fnv1a64::new_default();
        h.write_u8(b'I');
        h.write_u32(7);
        let first = h.finish();

        let mut again = Fnv1a64::new_default();
        again.write_u8(b'I');
        again.write_u32(7);
        assert_eq!(first, again.finish());

        let mut swapped = Fnv1a64::new_default();
        swapped.write_u32(7);
        swapped.write_u8(b'I');
        assert_ne!(first, swapped.finish());
    }
}
