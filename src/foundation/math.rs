pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Composite one premultiplied RGBA8 source pixel over an opaque-or-straight destination pixel.
///
/// `dst` is straight alpha and stays straight alpha.
pub(crate) fn blend_premul_over(dst: &mut [u8; 4], src_premul: [u8; 4]) {
    let a = u16::from(src_premul[3]);
    if a == 0 {
        return;
    }
    if a == 255 {
        *dst = src_premul;
        return;
    }
    let inv = 255 - a;
    let dst_a = u16::from(dst[3]);
    let out_a = a + mul_div255_u16(dst_a, inv);
    for c in 0..3 {
        let dst_premul = mul_div255_u16(u16::from(dst[c]), dst_a);
        let premul = u16::from(src_premul[c]) + mul_div255_u16(dst_premul, inv);
        dst[c] = if out_a == 0 {
            0
        } else {
            ((u32::from(premul) * 255 + u32::from(out_a) / 2) / u32::from(out_a)).min(255) as u8
        };
    }
    dst[3] = out_a.min(255) as u8;
}

/// Evenly spaced integer stop `i` of `n` over `[0, span]`, endpoints inclusive, floor rounding.
pub(crate) fn linear_stop(span: u32, i: u32, n: u32) -> u32 {
    if n <= 1 {
        return 0;
    }
    ((u64::from(span) * u64::from(i)) / u64::from(n - 1)) as u32
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
