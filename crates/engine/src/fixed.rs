pub const FRACTION_BITS: u32 = 10;
pub const ONE: i32 = 1 << FRACTION_BITS;

pub const fn to_fixed(pixels: i32) -> i32 {
    pixels << FRACTION_BITS
}

/// Truncates toward zero after scaling, e.g. `3.7` becomes `3788`.
pub fn to_fixed_f32(pixels: f32) -> i32 {
    (pixels * ONE as f32) as i32
}

pub const fn from_fixed(value: i32) -> i32 {
    value >> FRACTION_BITS
}
