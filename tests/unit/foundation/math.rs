use super::*;

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(0, 255), 0);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u8(100, 128), 50);
}

#[test]
fn scale_premul_full_gain_is_identity() {
    let mut px = vec![10u8, 20, 30, 255];
    scale_premul_rgba8(&mut px, 1.0);
    assert_eq!(px, vec![10, 20, 30, 255]);
}

#[test]
fn scale_premul_zero_gain_is_transparent_black() {
    let mut px = vec![10u8, 20, 30, 255];
    scale_premul_rgba8(&mut px, 0.0);
    assert_eq!(px, vec![0, 0, 0, 0]);
}

#[test]
fn scale_premul_half_gain_halves_channels() {
    let mut px = vec![200u8, 100, 50, 255];
    scale_premul_rgba8(&mut px, 0.5);
    assert_eq!(px, vec![100, 50, 25, 128]);
}
