use std::collections::hash_map::DefaultHasher;
use std::fmt::{Debug, Write};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::error::ConfigError;

/// A deterministic hash over strings
///
/// The search only ever compares digests for equality, so the digest type needs no ordering.
pub trait StringHasher: Send + Sync {
    type Digest: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    fn digest(&self, input: &str) -> Self::Digest;

    /// Human readable form of a digest
    fn render(&self, digest: &Self::Digest) -> String {
        format!("{:?}", digest)
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

/// The full 128 bit MD5 digest
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Hasher;

impl StringHasher for Md5Hasher {
    type Digest = [u8; 16];

    fn digest(&self, input: &str) -> Self::Digest {
        md5::compute(input.as_bytes()).0
    }

    fn render(&self, digest: &Self::Digest) -> String {
        hex(digest)
    }
}

/// MD5 restricted to its first n and last n printed hex characters
///
/// Two inputs collide under this hasher when they form a Sayler n-collision. For example these
/// digests collide for n = 6:
///
/// d41d8ce1987fbb152380234511f8427e
///
/// d41d8cd98f00b204e9800998ecf8427e
///
/// The ignored nibbles are zeroed so the digest stays a fixed 16 bytes.
#[derive(Debug, Clone, Copy)]
pub struct SaylerHasher {
    n: u8,
}

impl SaylerHasher {
    pub fn new(n: u8) -> Result<Self, ConfigError> {
        if n == 0 || n > 16 {
            return Err(ConfigError::InvalidDigestWidth(n));
        }
        Ok(SaylerHasher { n })
    }

    pub fn width(&self) -> u8 {
        self.n
    }

    fn keeps_nibble(&self, nibble: usize) -> bool {
        let n = self.n as usize;
        nibble < n || nibble >= 32 - n
    }
}

impl StringHasher for SaylerHasher {
    type Digest = [u8; 16];

    fn digest(&self, input: &str) -> Self::Digest {
        let full = md5::compute(input.as_bytes()).0;

        let mut kept = [0u8; 16];
        for nibble in (0..32).filter(|&nibble| self.keeps_nibble(nibble)) {
            // Even nibbles are the high half of their byte when printed
            let mask = if nibble % 2 == 0 { 0xf0 } else { 0x0f };
            kept[nibble / 2] |= full[nibble / 2] & mask;
        }
        kept
    }

    fn render(&self, digest: &Self::Digest) -> String {
        hex(digest)
            .chars()
            .enumerate()
            .map(|(nibble, c)| if self.keeps_nibble(nibble) { c } else { '.' })
            .collect()
    }
}

/// The standard library's SipHash with its fixed default keys, a 64 bit digest
#[derive(Debug, Clone, Copy, Default)]
pub struct SipHasher;

impl StringHasher for SipHasher {
    type Digest = u64;

    fn digest(&self, input: &str) -> Self::Digest {
        let mut hasher = DefaultHasher::new();
        hasher.write(input.as_bytes());
        hasher.finish()
    }

    fn render(&self, digest: &Self::Digest) -> String {
        format!("{:016x}", digest)
    }
}

/// Adapts a plain function into a [`StringHasher`]
pub struct FnHasher<F, D> {
    f: F,
    _digest: PhantomData<fn() -> D>,
}

impl<F, D> FnHasher<F, D>
where
    F: Fn(&str) -> D + Send + Sync,
{
    pub fn new(f: F) -> Self {
        FnHasher { f, _digest: PhantomData }
    }
}

impl<F, D> StringHasher for FnHasher<F, D>
where
    F: Fn(&str) -> D + Send + Sync,
    D: Clone + Eq + Hash + Debug + Send + Sync + 'static,
{
    type Digest = D;

    fn digest(&self, input: &str) -> D {
        (self.f)(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_of_empty_string() {
        let hasher = Md5Hasher;
        assert_eq!(hasher.render(&hasher.digest("")), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn sayler_keeps_head_and_tail() {
        let hasher = SaylerHasher::new(3).unwrap();
        let digest = hasher.digest("");
        assert_eq!(hasher.render(&digest), "d41..........................27e");
        assert_eq!(digest[0], 0xd4);
        assert_eq!(digest[1], 0x10);
        assert_eq!(digest[14], 0x02);
        assert_eq!(digest[15], 0x7e);
        assert!(digest[2..14].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn sayler_full_width_is_md5() {
        let hasher = SaylerHasher::new(16).unwrap();
        assert_eq!(hasher.digest("abcd"), Md5Hasher.digest("abcd"));
    }

    #[test]
    fn sayler_width_is_bounded() {
        assert_eq!(SaylerHasher::new(0).unwrap_err(), ConfigError::InvalidDigestWidth(0));
        assert_eq!(SaylerHasher::new(17).unwrap_err(), ConfigError::InvalidDigestWidth(17));
    }

    #[test]
    fn sip_is_deterministic() {
        assert_eq!(SipHasher.digest("hash"), SipHasher.digest("hash"));
        assert_ne!(SipHasher.digest("hash"), SipHasher.digest("hasi"));
        assert_eq!(SipHasher.render(&0xab), "00000000000000ab");
    }

    #[test]
    fn fn_hasher_forwards() {
        let hasher = FnHasher::new(|input: &str| input.len());
        assert_eq!(hasher.digest("four"), 4);
        assert_eq!(hasher.render(&4), "4");
    }
}
