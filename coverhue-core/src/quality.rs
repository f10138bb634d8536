use crate::error::ParseQualityError;
use std::fmt;
use std::str::FromStr;

/// How far a cover is downscaled before its pixels are counted.
///
/// Smaller analysis images are faster to scan but under-represent
/// minority colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScaleQuality {
    Lowest,
    Low,
    #[default]
    High,
    Highest,
}

impl ScaleQuality {
    pub const ALL: [ScaleQuality; 4] = [
        ScaleQuality::Lowest,
        ScaleQuality::Low,
        ScaleQuality::High,
        ScaleQuality::Highest,
    ];

    /// Length of the longer side after scaling, `None` for no scaling.
    pub fn target_side(self) -> Option<u32> {
        match self {
            ScaleQuality::Lowest => Some(50),
            ScaleQuality::Low => Some(100),
            ScaleQuality::High => Some(250),
            ScaleQuality::Highest => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScaleQuality::Lowest => "lowest",
            ScaleQuality::Low => "low",
            ScaleQuality::High => "high",
            ScaleQuality::Highest => "highest",
        }
    }
}

impl fmt::Display for ScaleQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScaleQuality {
    type Err = ParseQualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ScaleQuality::ALL
            .into_iter()
            .find(|q| q.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseQualityError(s.to_string()))
    }
}

/// Size that keeps the aspect ratio while the longer side becomes `target`.
pub fn scaled_size(width: u32, height: u32, target: u32) -> (u32, u32) {
    let side = f64::from(target);
    if width < height {
        let ratio = f64::from(height) / f64::from(width);
        (((side / ratio).floor() as u32).max(1), target)
    } else {
        let ratio = f64::from(width) / f64::from(height);
        (target, ((side / ratio).floor() as u32).max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quality_ignores_case() {
        assert_eq!("HIGHEST".parse::<ScaleQuality>(), Ok(ScaleQuality::Highest));
        assert_eq!(" low ".parse::<ScaleQuality>(), Ok(ScaleQuality::Low));
        assert!("medium".parse::<ScaleQuality>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for quality in ScaleQuality::ALL {
            assert_eq!(quality.to_string().parse::<ScaleQuality>(), Ok(quality));
        }
    }

    #[test]
    fn test_default_is_high() {
        assert_eq!(ScaleQuality::default(), ScaleQuality::High);
        assert_eq!(ScaleQuality::Highest.target_side(), None);
    }

    #[test]
    fn test_scaled_size_landscape_and_portrait() {
        assert_eq!(scaled_size(300, 200, 100), (100, 66));
        assert_eq!(scaled_size(200, 300, 100), (66, 100));
        assert_eq!(scaled_size(640, 640, 50), (50, 50));
    }

    #[test]
    fn test_scaled_size_keeps_thin_images_visible() {
        assert_eq!(scaled_size(10_000, 1, 250), (250, 1));
        assert_eq!(scaled_size(1, 10_000, 250), (1, 250));
    }
}
