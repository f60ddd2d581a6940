/// Linear to sRGB transfer function for a single channel in `[0, 1]`.
pub fn linear_to_srgb_channel(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.999).floor() as u8
}

/// Quantizes a linear RGBA color to 8-bit sRGB. Alpha is not gamma encoded.
pub fn linear_to_srgb8(color: [f32; 4]) -> [u8; 4] {
    let [r, g, b, a] = color.map(|c| c.clamp(0.0, 1.0));
    [
        to_byte(linear_to_srgb_channel(r)),
        to_byte(linear_to_srgb_channel(g)),
        to_byte(linear_to_srgb_channel(b)),
        to_byte(a),
    ]
}
