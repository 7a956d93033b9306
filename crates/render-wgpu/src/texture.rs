use range_common::Skin;
use std::f32::consts::TAU;

/// Generate a square RGBA8 image for a skin.
///
/// Gold gets soft horizontal bands, lava a swirl of dark red and orange.
/// Both are tileable along `u` so the sphere seam is invisible.
pub fn skin_pixels(skin: Skin, size: u32) -> Vec<u8> {
    let size = size.max(1);
    let mut out = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        let v = y as f32 / size as f32;
        for x in 0..size {
            let u = x as f32 / size as f32;
            let rgb = match skin {
                Skin::Gold => {
                    let band = 0.8 + 0.2 * (v * TAU * 6.0).sin();
                    [212.0 * band, 175.0 * band, 55.0 * band]
                }
                Skin::Lava => {
                    let swirl = (u * TAU * 3.0 + (v * TAU * 2.0).sin() * 2.0).sin();
                    let heat = 0.5 + 0.5 * swirl;
                    [120.0 + 135.0 * heat, 20.0 + 120.0 * heat * heat, 10.0]
                }
            };
            out.extend(rgb.map(|c| c.clamp(0.0, 255.0) as u8));
            out.push(255);
        }
    }
    out
}
