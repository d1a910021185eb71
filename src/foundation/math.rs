pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Scale every channel of a premultiplied RGBA8 buffer by `gain` in `[0, 1]`.
///
/// Scaling all four channels keeps the buffer validly premultiplied; once flattened over black
/// this is a linear fade of the visible colour.
pub(crate) fn scale_premul_rgba8(data: &mut [u8], gain: f32) {
    if gain >= 1.0 {
        return;
    }
    let g = (gain.clamp(0.0, 1.0) * 255.0).round() as u16;
    for v in data.iter_mut() {
        *v = mul_div255_u8(u16::from(*v), g);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
