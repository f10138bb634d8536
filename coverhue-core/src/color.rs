//! Numeric color predicates used to pick theme colors out of a cover.
//!
//! Every threshold here is empirically tuned and kept as-is so results stay
//! compatible with existing themes.

use palette::Srgb;

pub const WHITE: Srgb<u8> = Srgb::new(255, 255, 255);
pub const BLACK: Srgb<u8> = Srgb::new(0, 0, 0);

const DARK_LUMA: f64 = 127.5;
const WHITE_FLOOR: u8 = 232;
const BLACK_CEILING: u8 = 23;
const LUMINANCE_OFFSET: f64 = 12.75;
const CONTRAST_RATIO: f64 = 1.6;
const DISTINCT_CHANNEL: f64 = 63.75;
const GRAY_SPREAD: f64 = 7.65;

/// An RGB triple packed as `r * 1_000_000 + g * 1_000 + b`.
///
/// Channels never exceed 255, so the three decimal fields cannot overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackedColor(u32);

impl PackedColor {
    pub const BLACK: PackedColor = PackedColor(0);

    pub const fn pack(red: u8, green: u8, blue: u8) -> Self {
        PackedColor(red as u32 * 1_000_000 + green as u32 * 1_000 + blue as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn red(self) -> u8 {
        (self.0 / 1_000_000) as u8
    }

    pub fn green(self) -> u8 {
        (self.0 / 1_000 % 1_000) as u8
    }

    pub fn blue(self) -> u8 {
        (self.0 % 1_000) as u8
    }

    pub fn to_srgb(self) -> Srgb<u8> {
        Srgb::new(self.red(), self.green(), self.blue())
    }
}

impl From<Srgb<u8>> for PackedColor {
    fn from(color: Srgb<u8>) -> Self {
        PackedColor::pack(color.red, color.green, color.blue)
    }
}

fn channels(color: Srgb<u8>) -> (f64, f64, f64) {
    (
        f64::from(color.red),
        f64::from(color.green),
        f64::from(color.blue),
    )
}

/// Rec. 709 weighted luma on the 0-255 scale.
pub fn luma(color: Srgb<u8>) -> f64 {
    let (r, g, b) = channels(color);
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

pub fn is_dark(color: Srgb<u8>) -> bool {
    luma(color) < DARK_LUMA
}

/// True when every channel is above 232 or every channel is below 23.
pub fn is_black_or_white(color: Srgb<u8>) -> bool {
    let (red, green, blue) = (color.red, color.green, color.blue);
    (red > WHITE_FLOOR && green > WHITE_FLOOR && blue > WHITE_FLOOR)
        || (red < BLACK_CEILING && green < BLACK_CEILING && blue < BLACK_CEILING)
}

/// Whether `foreground` reads against `background`: the ratio of their
/// offset luminances must exceed 1.6.
pub fn is_contrasting(foreground: Srgb<u8>, background: Srgb<u8>) -> bool {
    let fg = luma(foreground) + LUMINANCE_OFFSET;
    let bg = luma(background) + LUMINANCE_OFFSET;
    let ratio = if bg > fg { bg / fg } else { fg / bg };
    ratio > CONTRAST_RATIO
}

// Every pair of channels within 7.65 of each other.
fn is_near_gray(color: Srgb<u8>) -> bool {
    let (r, g, b) = channels(color);
    r.max(g).max(b) - r.min(g).min(b) < GRAY_SPREAD
}

/// Whether two accents are different enough to be shown side by side.
///
/// Some channel has to move by more than a quarter of the range, and two
/// near-grays never count as distinct.
pub fn is_distinct(a: Srgb<u8>, b: Srgb<u8>) -> bool {
    let (ar, ag, ab) = channels(a);
    let (br, bg, bb) = channels(b);
    let far_apart = (ar - br).abs() > DISTINCT_CHANNEL
        || (ag - bg).abs() > DISTINCT_CHANNEL
        || (ab - bb).abs() > DISTINCT_CHANNEL;
    far_apart && !(is_near_gray(a) && is_near_gray(b))
}

/// Raises the HSV saturation of `color` to at least `min_saturation`,
/// keeping hue and value. Colors already saturated enough come back as-is.
pub fn with_min_saturation(color: Srgb<u8>, min_saturation: f64) -> Srgb<u8> {
    let (r, g, b) = channels(color);
    let (r, g, b) = (r / 255.0, g / 255.0, b / 255.0);

    let value = r.max(g).max(b);
    let chroma = value - r.min(g).min(b);
    let saturation = if value == 0.0 { 0.0 } else { chroma / value };
    if saturation >= min_saturation {
        return color;
    }

    let mut hue = if chroma == 0.0 {
        0.0
    } else if r == value {
        ((g - b) / chroma) % 6.0
    } else if g == value {
        2.0 + (b - r) / chroma
    } else {
        4.0 + (r - g) / chroma
    };
    if hue < 0.0 {
        hue += 6.0;
    }

    let chroma = value * min_saturation;
    let x = chroma * (1.0 - ((hue % 2.0) - 1.0).abs());
    let (r, g, b) = match hue {
        h if h <= 1.0 => (chroma, x, 0.0),
        h if h <= 2.0 => (x, chroma, 0.0),
        h if h <= 3.0 => (0.0, chroma, x),
        h if h <= 4.0 => (0.0, x, chroma),
        h if h <= 5.0 => (x, 0.0, chroma),
        h if h < 6.0 => (chroma, 0.0, x),
        _ => (0.0, 0.0, 0.0),
    };
    let m = value - chroma;
    let to_channel = |c: f64| (255.0 * (c + m)).floor().clamp(0.0, 255.0) as u8;
    Srgb::new(to_channel(r), to_channel(g), to_channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_color_fields() {
        let packed = PackedColor::pack(255, 7, 128);
        assert_eq!(packed.value(), 255_007_128);
        assert_eq!((packed.red(), packed.green(), packed.blue()), (255, 7, 128));
        assert_eq!(PackedColor::from(Srgb::new(1, 2, 3)).to_srgb(), Srgb::new(1, 2, 3));
        assert_eq!(PackedColor::BLACK.to_srgb(), BLACK);
    }

    #[test]
    fn test_packed_color_orders_by_value() {
        assert!(PackedColor::pack(0, 0, 255) < PackedColor::pack(0, 1, 0));
        assert!(PackedColor::pack(0, 255, 255) < PackedColor::pack(1, 0, 0));
    }

    #[test]
    fn test_dark_uses_weighted_luma() {
        assert!(is_dark(BLACK));
        assert!(!is_dark(WHITE));
        // Pure green is bright, pure blue is dark.
        assert!(!is_dark(Srgb::new(0, 255, 0)));
        assert!(is_dark(Srgb::new(0, 0, 255)));
        assert!(is_dark(Srgb::new(255, 0, 0)));
    }

    #[test]
    fn test_black_or_white_bounds() {
        assert!(is_black_or_white(Srgb::new(233, 233, 233)));
        assert!(!is_black_or_white(Srgb::new(232, 255, 255)));
        assert!(is_black_or_white(Srgb::new(22, 0, 22)));
        assert!(!is_black_or_white(Srgb::new(23, 0, 0)));
        assert!(!is_black_or_white(Srgb::new(0, 0, 255)));
    }

    #[test]
    fn test_contrast_needs_ratio_above_threshold() {
        assert!(is_contrasting(WHITE, BLACK));
        assert!(is_contrasting(BLACK, WHITE));
        assert!(!is_contrasting(WHITE, WHITE));
        // 142.75 / 112.75 is well under 1.6.
        assert!(!is_contrasting(Srgb::new(130, 130, 130), Srgb::new(100, 100, 100)));
    }

    #[test]
    fn test_contrast_cut_off_against_black() {
        // 19.75 / 12.75 sits below 1.6, 20.75 / 12.75 just above it.
        assert!(!is_contrasting(Srgb::new(7, 7, 7), BLACK));
        assert!(is_contrasting(Srgb::new(8, 8, 8), BLACK));
        assert!(!is_contrasting(BLACK, Srgb::new(7, 7, 7)));
        assert!(is_contrasting(BLACK, Srgb::new(8, 8, 8)));
    }

    #[test]
    fn test_distinct_requires_a_large_channel_step() {
        assert!(!is_distinct(BLACK, Srgb::new(63, 63, 63)));
        assert!(!is_distinct(Srgb::new(10, 200, 30), Srgb::new(70, 140, 90)));
        assert!(is_distinct(Srgb::new(255, 0, 0), Srgb::new(0, 0, 255)));
    }

    #[test]
    fn test_two_grays_are_never_distinct() {
        assert!(!is_distinct(BLACK, Srgb::new(100, 100, 100)));
        assert!(!is_distinct(Srgb::new(20, 25, 18), WHITE));
        assert!(is_distinct(Srgb::new(50, 50, 50), Srgb::new(50, 200, 50)));
    }

    #[test]
    fn test_distinct_channel_step_cut_off() {
        assert!(!is_distinct(Srgb::new(200, 0, 0), Srgb::new(137, 0, 0)));
        assert!(is_distinct(Srgb::new(200, 0, 0), Srgb::new(136, 0, 0)));
    }

    #[test]
    fn test_green_blue_spread_is_not_gray() {
        // Red sits between green and blue, but green and blue are 14 apart.
        assert!(!is_near_gray(Srgb::new(100, 107, 93)));
        assert!(is_distinct(Srgb::new(100, 107, 93), Srgb::new(200, 207, 193)));
        assert!(is_near_gray(Srgb::new(100, 103, 97)));
        assert!(!is_distinct(Srgb::new(100, 103, 97), Srgb::new(200, 203, 197)));
    }

    #[test]
    fn test_saturated_colors_are_unchanged() {
        let teal = Srgb::new(0, 128, 128);
        assert_eq!(with_min_saturation(teal, 0.15), teal);
        assert_eq!(with_min_saturation(BLACK, 0.15), BLACK);
    }

    #[test]
    fn test_gray_is_pushed_towards_red() {
        let adjusted = with_min_saturation(Srgb::new(128, 128, 128), 0.15);
        assert!((127..=128).contains(&adjusted.red));
        assert_eq!(adjusted.green, 108);
        assert_eq!(adjusted.blue, 108);
    }

    #[test]
    fn test_low_saturation_keeps_hue_sector() {
        // Blue-tinted gray lands on the blue hue.
        let adjusted = with_min_saturation(Srgb::new(200, 200, 210), 0.15);
        assert!(adjusted.blue > adjusted.red);
        assert!(adjusted.blue > adjusted.green);
        assert!(adjusted.blue >= 209);
        let (lo, hi) = (
            adjusted.red.min(adjusted.green),
            adjusted.red.max(adjusted.green).max(adjusted.blue),
        );
        let saturation = f64::from(hi - lo) / f64::from(hi);
        assert!((saturation - 0.15).abs() < 0.01);
    }
}
