use super::*;

#[test]
fn fnv_hash_is_stable_across_split_writes() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"thumbkit");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"thumb");
    b.write_bytes(b"kit");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn seeded_index_is_deterministic_and_in_range() {
    for seed in 0..64u64 {
        let i = seeded_index(seed, 3);
        assert!(i < 3);
        assert_eq!(i, seeded_index(seed, 3));
    }
    assert_eq!(seeded_index(42, 1), 0);
}

#[test]
fn seeded_index_spreads_over_choices() {
    let mut seen = [false; 4];
    for seed in 0..256u64 {
        seen[seeded_index(seed, 4)] = true;
    }
    assert!(seen.iter().all(|s| *s));
}

#[test]
fn round_i32_rounds_half_away_from_zero() {
    assert_eq!(round_i32(2.5), 3);
    assert_eq!(round_i32(-2.5), -3);
    assert_eq!(round_i32(15.999), 16);
    assert_eq!(round_i32(f64::NAN), 0);
    assert_eq!(round_i32(1e20), i32::MAX);
}
