/// Digit alphabet for short codes: digit value 0 is `'0'`, 10 is `'a'`, 36 is `'A'`, 61 is `'Z'`.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BASE: u64 = 62;

/// Converts a number to its base62 short code, most significant digit first
pub fn encode(mut num: u64) -> String {
    if num == 0 {
        return "0".to_string();
    }

    // u64::MAX needs 11 base62 digits
    let mut digits = Vec::with_capacity(11);

    while num > 0 {
        digits.push(ALPHABET[(num % BASE) as usize] as char);
        num /= BASE;
    }

    digits.iter().rev().collect()
}

/// Evaluates a short code back into the number it encodes.
///
/// Returns `None` for an empty string, a character outside [`ALPHABET`] or a
/// value that does not fit in a `u64`.
pub fn decode(code: &str) -> Option<u64> {
    if code.is_empty() {
        return None;
    }

    code.bytes().try_fold(0u64, |acc, byte| {
        let digit = digit_value(byte)?;
        acc.checked_mul(BASE)?.checked_add(digit)
    })
}

fn digit_value(byte: u8) -> Option<u64> {
    let value = match byte {
        b'0'..=b'9' => byte - b'0',
        b'a'..=b'z' => byte - b'a' + 10,
        b'A'..=b'Z' => byte - b'A' + 36,
        _ => return None,
    };
    Some(u64::from(value))
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(encode(0), "0");
        assert_eq!(encode(1), "1");
        assert_eq!(encode(9), "9");
        assert_eq!(encode(10), "a");
        assert_eq!(encode(36), "A");
        assert_eq!(encode(61), "Z");
        assert_eq!(encode(62), "10");
        assert_eq!(encode(3843), "ZZ");
        assert_eq!(encode(3844), "100");
    }

    #[test]
    fn test_no_leading_zero_digit() {
        for n in [1u64, 62, 3844, 1_000_000, 10_000_000, u64::MAX] {
            let code = encode(n);
            assert!(!code.starts_with('0'), "{} encoded as {}", n, code);
        }
    }

    #[test]
    fn test_round_trip() {
        let mut rng = StdRng::seed_from_u64(62);
        let samples = (0..2_000)
            .map(|_| rng.random::<u64>())
            .chain([0, 1, 61, 62, 63, u64::MAX - 1, u64::MAX]);

        for n in samples {
            let code = encode(n);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
            assert_eq!(decode(&code), Some(n), "round trip failed for {}", n);
        }
    }

    #[test]
    fn test_max_value_length() {
        assert_eq!(encode(u64::MAX).len(), 11);
    }

    #[test]
    fn test_decode_rejects_invalid_input() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("ab-c"), None);
        // one past u64::MAX
        assert_eq!(decode("lYGhA16ahyg"), None);
    }
}
