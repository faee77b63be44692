//! Code-point generator presets.
//!
//! String and char getters accept any `Fn(&mut Source) -> Result<u32>`; these
//! are the stock ones. Each is a single weighted multi-range draw, so e.g.
//! [`alphanumeric`] does not favor digits over letters just because the digit
//! range is narrower.

use crate::error::Result;
use crate::range::Range;
use crate::source::Source;

/// Unicode scalar values: everything `char` can hold.
pub(crate) const SCALAR_RANGES: [Range<u32>; 2] =
    [Range::new(0, 0xD7FF), Range::new(0xE000, 0x10FFFF)];

/// Any Unicode scalar value.
pub fn any(source: &mut Source) -> Result<u32> {
    source.next_u32_ranges(&SCALAR_RANGES)
}

/// Printable ASCII, space through tilde.
pub fn ascii(source: &mut Source) -> Result<u32> {
    source.next_u32_in(32, 126)
}

/// ASCII digits and letters.
pub fn alphanumeric(source: &mut Source) -> Result<u32> {
    source.next_u32_ranges(&[
        Range::new(48, 57),
        Range::new(65, 90),
        Range::new(97, 122),
    ])
}

/// ASCII letters.
pub fn alpha(source: &mut Source) -> Result<u32> {
    source.next_u32_ranges(&[Range::new(65, 90), Range::new(97, 122)])
}

/// ASCII digits.
pub fn digits(source: &mut Source) -> Result<u32> {
    source.next_u32_in(48, 57)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_stay_in_their_classes() {
        let mut source = Source::new(0xc0de);
        for _ in 0..500 {
            assert!((32..=126).contains(&ascii(&mut source).unwrap()));

            let an = char::from_u32(alphanumeric(&mut source).unwrap()).unwrap();
            assert!(an.is_ascii_alphanumeric());

            let al = char::from_u32(alpha(&mut source).unwrap()).unwrap();
            assert!(al.is_ascii_alphabetic());

            let d = char::from_u32(digits(&mut source).unwrap()).unwrap();
            assert!(d.is_ascii_digit());

            assert!(char::from_u32(any(&mut source).unwrap()).is_some());
        }
    }
}
