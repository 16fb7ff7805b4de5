use crate::{Fingerprint, FingerprintHasher};

#[test]
fn same_input_same_fingerprint() {
    let a = FingerprintHasher::new("leaf").combine_str("x").finish();
    let b = FingerprintHasher::new("leaf").combine_str("x").finish();

    assert_eq!(a, b);
}

#[test]
fn salt_separates_domains() {
    let leaf = FingerprintHasher::new("leaf").combine_str("x").finish();
    let placeholder = FingerprintHasher::new("placeholder").combine_str("x").finish();

    assert_ne!(leaf, placeholder);
}

#[test]
fn strings_are_length_prefixed() {
    let ab_c = FingerprintHasher::new("t")
        .combine_str("ab")
        .combine_str("c")
        .finish();
    let a_bc = FingerprintHasher::new("t")
        .combine_str("a")
        .combine_str("bc")
        .finish();

    assert_ne!(ab_c, a_bc);
}

#[test]
fn display_is_32_hex_digits() {
    let fp = Fingerprint::from_raw(0xabc);

    assert_eq!(fp.to_string(), format!("{:032x}", 0xabc));
    assert_eq!(fp.as_u128(), 0xabc);
}
