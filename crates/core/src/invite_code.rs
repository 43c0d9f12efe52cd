//! Invite code generation and validation.
//!
//! Codes are 6 characters: 3 uppercase letters followed by 3 digits, drawn
//! from restricted alphabets that exclude visually ambiguous characters
//! (`I`, `O`, `0`, `1`). Codes are shared verbally and over screenshots, so
//! ambiguity matters more than entropy here.

use rand::Rng;

/// Letter alphabet for the first three characters. Excludes `I` and `O`.
pub const CODE_LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Digit alphabet for the last three characters. Excludes `0` and `1`.
pub const CODE_DIGITS: &[u8] = b"23456789";

/// Total code length.
pub const CODE_LEN: usize = 6;

/// Generate a new invite code.
///
/// The result always satisfies [`is_valid_invite_code`].
pub fn generate_invite_code() -> String {
    let mut rng = rand::rng();
    let mut code = String::with_capacity(CODE_LEN);
    for _ in 0..3 {
        code.push(CODE_LETTERS[rng.random_range(0..CODE_LETTERS.len())] as char);
    }
    for _ in 0..3 {
        code.push(CODE_DIGITS[rng.random_range(0..CODE_DIGITS.len())] as char);
    }
    code
}

/// Check whether a string is a well-formed invite code.
pub fn is_valid_invite_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    if bytes.len() != CODE_LEN {
        return false;
    }
    bytes[..3].iter().all(|b| CODE_LETTERS.contains(b))
        && bytes[3..].iter().all(|b| CODE_DIGITS.contains(b))
}

/// Display form with a separator between the letter and digit halves,
/// e.g. `"KRT-482"`. Input is assumed valid; invalid input is returned
/// unchanged.
pub fn format_invite_code(code: &str) -> String {
    if !is_valid_invite_code(code) {
        return code.to_string();
    }
    format!("{}-{}", &code[..3], &code[3..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_round_trip() {
        for _ in 0..10_000 {
            let code = generate_invite_code();
            assert!(is_valid_invite_code(&code), "generated invalid code {code}");
        }
    }

    #[test]
    fn generated_codes_avoid_ambiguous_characters() {
        for _ in 0..10_000 {
            let code = generate_invite_code();
            for forbidden in ['0', '1', 'I', 'O'] {
                assert!(!code.contains(forbidden), "code {code} contains {forbidden}");
            }
        }
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(!is_valid_invite_code(""));
        assert!(!is_valid_invite_code("ABC23"));
        assert!(!is_valid_invite_code("ABC2345"));
    }

    #[test]
    fn rejects_wrong_alphabet() {
        assert!(!is_valid_invite_code("AIC234")); // I excluded
        assert!(!is_valid_invite_code("AOC234")); // O excluded
        assert!(!is_valid_invite_code("ABC014")); // 0 and 1 excluded
        assert!(!is_valid_invite_code("abc234")); // lowercase
        assert!(!is_valid_invite_code("234ABC")); // halves swapped
    }

    #[test]
    fn accepts_well_formed_codes() {
        assert!(is_valid_invite_code("ABC234"));
        assert!(is_valid_invite_code("ZZZ999"));
        assert!(is_valid_invite_code("HJK222"));
    }

    #[test]
    fn formats_with_separator() {
        assert_eq!(format_invite_code("KRT482"), "KRT-482");
    }

    #[test]
    fn format_leaves_invalid_input_alone() {
        assert_eq!(format_invite_code("nope"), "nope");
    }
}
