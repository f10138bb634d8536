use crate::bitmap::{Bitmap, CHANNELS};
use crate::color::{
    is_black_or_white, is_contrasting, is_dark, is_distinct, with_min_saturation, PackedColor,
    BLACK, WHITE,
};
use crate::error::ExtractError;
use crate::quality::ScaleQuality;
use log::{debug, trace};
use palette::Srgb;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Pixels with a lower alpha are left out of the count.
pub const ALPHA_THRESHOLD: u8 = 127;
/// Colors seen at most this fraction of the image height are noise.
pub const NOISE_FRACTION: f64 = 0.01;
/// A black or white background gives way to a runner-up this common.
pub const EDGE_RATIO: f64 = 0.3;
pub const MIN_SATURATION: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorFrequency {
    pub color: PackedColor,
    pub count: u32,
}

/// The four theme colors picked from one cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultColors<T = u8> {
    pub background: Srgb<T>,
    pub primary: Srgb<T>,
    pub secondary: Srgb<T>,
    pub detail: Srgb<T>,
}

impl ResultColors<u8> {
    /// Same colors with channels in `0.0..=1.0`.
    pub fn to_normalized(self) -> ResultColors<f32> {
        ResultColors {
            background: self.background.into_format(),
            primary: self.primary.into_format(),
            secondary: self.secondary.into_format(),
            detail: self.detail.into_format(),
        }
    }
}

/// Shared flag a running extraction polls to know it should give up.
///
/// A flag made with [`CancelFlag::child`] also reads as cancelled once any
/// of its ancestors is, while cancelling the child leaves them alone.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    own: Arc<AtomicBool>,
    ancestors: Vec<Arc<AtomicBool>>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> CancelFlag {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(Arc::clone(&self.own));
        CancelFlag {
            own: Arc::new(AtomicBool::new(false)),
            ancestors,
        }
    }

    pub fn cancel(&self) {
        self.own.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.own.load(Ordering::Relaxed)
            || self.ancestors.iter().any(|flag| flag.load(Ordering::Relaxed))
    }

    fn check(&self) -> Result<(), ExtractError> {
        if self.is_cancelled() {
            Err(ExtractError::Cancelled)
        } else {
            Ok(())
        }
    }
}

pub fn extract_colors(bitmap: &Bitmap, quality: ScaleQuality) -> Result<ResultColors, ExtractError> {
    extract_colors_with_cancel(bitmap, quality, &CancelFlag::new())
}

/// Like [`extract_colors`], but stops with [`ExtractError::Cancelled`] once
/// `cancel` is raised.
pub fn extract_colors_with_cancel(
    bitmap: &Bitmap,
    quality: ScaleQuality,
    cancel: &CancelFlag,
) -> Result<ResultColors, ExtractError> {
    extract_colors_on(bitmap, quality, None, cancel)
}

/// Picks accents that read against `background` when the theme's backdrop is
/// fixed by the caller; `None` takes the background from the cover.
pub fn extract_colors_on(
    bitmap: &Bitmap,
    quality: ScaleQuality,
    background: Option<Srgb<u8>>,
    cancel: &CancelFlag,
) -> Result<ResultColors, ExtractError> {
    cancel.check()?;
    let analysed = bitmap.resized(quality)?;
    debug!(
        "Analysing {}x{} pixels at {} quality",
        analysed.width(),
        analysed.height(),
        quality
    );

    let counts = count_colors(&analysed, cancel)?;
    let background = match background {
        Some(fixed) => fixed,
        None => select_background(&counts, analysed.height()).color.to_srgb(),
    };

    cancel.check()?;
    let pool = foreground_pool(&counts, background);
    let [primary, secondary, detail] = select_foreground(&pool, background);

    let fallback = if is_dark(background) { WHITE } else { BLACK };
    let colors = ResultColors {
        background,
        primary: primary.unwrap_or(fallback),
        secondary: secondary.unwrap_or(fallback),
        detail: detail.unwrap_or(fallback),
    };
    debug!("Picked {:?} from {} counted colors", colors, counts.len());
    Ok(colors)
}

/// Occurrences of every color whose alpha passes [`ALPHA_THRESHOLD`].
pub fn count_colors(
    bitmap: &Bitmap,
    cancel: &CancelFlag,
) -> Result<HashMap<PackedColor, u32>, ExtractError> {
    let mut counts = HashMap::new();
    for row in bitmap.rows() {
        cancel.check()?;
        for pixel in row.chunks_exact(CHANNELS) {
            if pixel[3] >= ALPHA_THRESHOLD {
                *counts
                    .entry(PackedColor::pack(pixel[0], pixel[1], pixel[2]))
                    .or_insert(0) += 1;
            }
        }
    }
    Ok(counts)
}

// Most common first, ties resolved by packed value so runs are repeatable.
fn sort_by_count(entries: &mut [ColorFrequency]) {
    entries.sort_by(|a, b| b.count.cmp(&a.count).then(a.color.cmp(&b.color)));
}

/// The most common color that is not noise, skipping a black or white
/// leader when a colorful runner-up is nearly as common.
pub fn select_background(counts: &HashMap<PackedColor, u32>, height: u32) -> ColorFrequency {
    let threshold = f64::from(height) * NOISE_FRACTION;
    let mut candidates: Vec<ColorFrequency> = counts
        .iter()
        .filter(|&(_, &count)| f64::from(count) > threshold)
        .map(|(&color, &count)| ColorFrequency { color, count })
        .collect();
    sort_by_count(&mut candidates);

    let Some(&leader) = candidates.first() else {
        trace!("No color above the noise threshold, using black");
        return ColorFrequency {
            color: PackedColor::BLACK,
            count: 1,
        };
    };

    if !is_black_or_white(leader.color.to_srgb()) {
        return leader;
    }

    for next in &candidates[1..] {
        if f64::from(next.count) / f64::from(leader.count) <= EDGE_RATIO {
            break;
        }
        if !is_black_or_white(next.color.to_srgb()) {
            trace!("Replacing black/white background {:?} with {:?}", leader, next);
            return *next;
        }
    }
    leader
}

/// Every counted color, saturated to at least [`MIN_SATURATION`], whose
/// darkness is the opposite of the background's.
pub fn foreground_pool(
    counts: &HashMap<PackedColor, u32>,
    background: Srgb<u8>,
) -> Vec<ColorFrequency> {
    let find_dark = !is_dark(background);
    let mut pool: Vec<ColorFrequency> = counts
        .iter()
        .map(|(&color, &count)| ColorFrequency {
            color: with_min_saturation(color.to_srgb(), MIN_SATURATION).into(),
            count,
        })
        .filter(|entry| is_dark(entry.color.to_srgb()) == find_dark)
        .collect();
    sort_by_count(&mut pool);
    pool
}

/// Primary, secondary and detail, each `None` when the pool ran out.
pub fn select_foreground(pool: &[ColorFrequency], background: Srgb<u8>) -> [Option<Srgb<u8>>; 3] {
    let mut primary = None;
    let mut secondary = None;
    let mut detail = None;

    for entry in pool {
        let color = entry.color.to_srgb();
        if !is_contrasting(color, background) {
            continue;
        }
        match (primary, secondary) {
            (None, _) => primary = Some(color),
            (Some(first), None) => {
                if is_distinct(first, color) {
                    secondary = Some(color);
                }
            }
            (Some(first), Some(second)) => {
                if is_distinct(first, color) && is_distinct(second, color) {
                    detail = Some(color);
                    break;
                }
            }
        }
    }

    [primary, secondary, detail]
}
