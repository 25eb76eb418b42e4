use glam::Vec3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("color `{0}` must have exactly six hex digits")]
    Length(String),

    #[error("color `{0}` contains a non-hex digit")]
    Digit(String),
}

/// Parses `#rrggbb` (the `#` is optional) into RGB channels in `[0, 1]`.
pub fn parse_hex_color(hex: &str) -> Result<Vec3, ColorError> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(ColorError::Length(hex.to_string()));
    }

    let mut rgb = [0.0_f32; 3];
    for (channel, i) in rgb.iter_mut().zip((0..6).step_by(2)) {
        let byte = u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| ColorError::Digit(hex.to_string()))?;
        *channel = byte as f32 / 255.0;
    }

    Ok(Vec3::from_array(rgb))
}
