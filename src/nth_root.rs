use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RootError {
    #[error("the exponent must be at least 1")]
    ZeroExponent,
}

/// Largest integer `r` such that `r^n <= number`
///
/// Newton's method on `f(x) = x^n - number`, rewritten for integers as
/// `x' = ((n - 1) * x + number / x^(n - 1)) / n`. Starting above the root, the iterates decrease
/// until they stop moving, at which point the previous one is the floor of the root.
///
/// ```
/// assert_eq!(samehash::nth_root::nth_root(81, 4), Ok(3));
/// ```
pub fn nth_root(number: u64, n: u32) -> Result<u64, RootError> {
    if n == 0 {
        return Err(RootError::ZeroExponent);
    }
    if number < 2 || n == 1 {
        return Ok(number);
    }

    let n = n as u128;
    let number_wide = number as u128;

    // 2^ceil(bits / n) is always at least the root
    let bits = (64 - number.leading_zeros()) as u128;
    let mut x: u128 = 1 << ((bits + n - 1) / n);

    loop {
        let next = ((n - 1) * x + number_wide / saturating_pow(x, n - 1)) / n;
        if next >= x {
            return Ok(x as u64);
        }
        x = next;
    }
}

fn saturating_pow(base: u128, exponent: u128) -> u128 {
    match u32::try_from(exponent) {
        Ok(exponent) => base.checked_pow(exponent).unwrap_or(u128::MAX),
        Err(_) if base <= 1 => base,
        Err(_) => u128::MAX,
    }
}
