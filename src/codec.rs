use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{CodecError, ConfigError};

/// An ordered set of distinct symbols
///
/// A symbol's position in the alphabet is its digit value when a string is read as a base-A
/// number, so `"ab"` over the alphabet `"ab"` is the number 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
    digits: HashMap<char, usize>,
}

impl Alphabet {
    pub fn new<I: IntoIterator<Item = char>>(symbols: I) -> Result<Self, ConfigError> {
        let symbols: Vec<char> = symbols.into_iter().collect();
        if symbols.len() < 2 {
            return Err(ConfigError::AlphabetTooSmall(symbols.len()));
        }

        let mut digits = HashMap::with_capacity(symbols.len());
        for (digit, &symbol) in symbols.iter().enumerate() {
            if digits.insert(symbol, digit).is_some() {
                return Err(ConfigError::DuplicateSymbol(symbol));
            }
        }

        Ok(Alphabet { symbols, digits })
    }

    /// The 26 lowercase ASCII letters
    pub fn lowercase() -> Self {
        let symbols: Vec<char> = ('a'..='z').collect();
        let digits = symbols.iter().enumerate().map(|(digit, &symbol)| (symbol, digit)).collect();
        Alphabet { symbols, digits }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn symbol(&self, digit: usize) -> Option<char> {
        self.symbols.get(digit).copied()
    }

    pub fn digit(&self, symbol: char) -> Option<usize> {
        self.digits.get(&symbol).copied()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::lowercase()
    }
}

impl FromStr for Alphabet {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Alphabet::new(s.chars())
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

/// Bijection between `[0, A^L)` and the strings of length L over an alphabet of size A
///
/// Strings are read most significant position first. Leading zero positions are padded with the
/// first symbol, so every decoded string has exactly L symbols:
///
/// ```
/// use samehash::codec::{Alphabet, StringCodec};
///
/// let codec = StringCodec::new(Alphabet::new("ab".chars()).unwrap(), 2).unwrap();
/// assert_eq!(codec.decode(0).unwrap(), "aa");
/// assert_eq!(codec.decode(3).unwrap(), "bb");
/// assert_eq!(codec.encode("ba").unwrap(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct StringCodec {
    alphabet: Alphabet,
    length: usize,
    space: u64,
    // A^(L-1), ..., A^1, A^0
    place_values: Vec<u64>,
}

impl StringCodec {
    /// Fails if `length` is zero or if `A^length` does not fit in a `u64`
    pub fn new(alphabet: Alphabet, length: usize) -> Result<Self, ConfigError> {
        if length == 0 {
            return Err(ConfigError::ZeroLength);
        }

        let overflow = ConfigError::PartitionOverflow { alphabet_size: alphabet.len(), length };
        let base = alphabet.len() as u64;

        let mut place_values = Vec::with_capacity(length);
        let mut place: u64 = 1;
        for _ in 0..length {
            place_values.push(place);
            place = place.checked_mul(base).ok_or_else(|| overflow.clone())?;
        }
        place_values.reverse();

        Ok(StringCodec { alphabet, length, space: place, place_values })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of distinct strings, `A^L`
    pub fn space(&self) -> u64 {
        self.space
    }

    pub fn decode(&self, index: u64) -> Result<String, CodecError> {
        if index >= self.space {
            return Err(CodecError::IndexOutOfRange { index, space: self.space });
        }

        let mut decoded = String::with_capacity(self.length);
        self.decode_into(index, &mut decoded);
        Ok(decoded)
    }

    /// Decodes into a reusable buffer. `index` must be below [`StringCodec::space`].
    pub fn decode_into(&self, index: u64, out: &mut String) {
        debug_assert!(index < self.space, "index {} outside of [0, {})", index, self.space);
        out.clear();

        let mut rest = index;
        for &place in &self.place_values {
            let digit = (rest / place) as usize;
            rest %= place;
            out.push(self.alphabet.symbols[digit]);
        }
    }

    pub fn encode(&self, input: &str) -> Result<u64, CodecError> {
        let found = input.chars().count();
        if found != self.length {
            return Err(CodecError::InvalidLength { expected: self.length, found });
        }

        let base = self.alphabet.len() as u64;
        let mut index: u64 = 0;
        for (position, symbol) in input.chars().enumerate() {
            let digit = self
                .alphabet
                .digit(symbol)
                .ok_or(CodecError::InvalidSymbol { symbol, position })?;
            // Cannot overflow: the result is below A^L, which was checked in `new`
            index = index * base + digit as u64;
        }

        Ok(index)
    }
}
