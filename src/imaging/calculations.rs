//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate dimensions that fit inside a bounding box, preserving the
/// source aspect ratio.
///
/// One dimension matches the box exactly; the other is at most the box.
/// Upscaling is allowed: a small source grows until it touches the box.
///
/// # Examples
/// ```
/// # use thumbwright::imaging::calculations::calculate_fit_dimensions;
/// // 800x600 into 200x200 → 200x150
/// assert_eq!(calculate_fit_dimensions((800, 600), (200, 200)), (200, 150));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    let ratio = f64::min(max_w as f64 / src_w as f64, max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * ratio).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * ratio).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = ((h as f64 * src_aspect).round() as u32).max(tgt_w);
        (w, h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = ((w as f64 / src_aspect).round() as u32).max(tgt_h);
        (w, h)
    }
}

/// Multiply source dimensions by per-axis scale factors, never going below 1px.
pub fn calculate_scaled_dimensions(source: (u32, u32), scale: (f64, f64)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let w = (src_w as f64 * scale.0).round().max(1.0) as u32;
    let h = (src_h as f64 * scale.1).round().max(1.0) as u32;
    (w, h)
}

/// Bounding box of a `width`×`height` rectangle rotated by `degrees`.
pub fn calculate_rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let theta = degrees.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let (w, h) = (width as f64, height as f64);
    // Trim float noise so that e.g. 45° on a square doesn't round up an extra pixel.
    let bw = (w * cos + h * sin - 1e-9).ceil().max(1.0) as u32;
    let bh = (w * sin + h * cos - 1e-9).ceil().max(1.0) as u32;
    (bw, bh)
}

/// Area of a pixel centred at (`px`, `py`) that lies inside a circle of `radius`
/// centred at (`cx`, `cy`), estimated on a 4×4 sub-pixel grid.
pub fn circle_coverage(px: f64, py: f64, cx: f64, cy: f64, radius: f64) -> f64 {
    const STEPS: u32 = 4;
    let r2 = radius * radius;
    let mut inside = 0;
    for sy in 0..STEPS {
        for sx in 0..STEPS {
            let x = px - 0.5 + (sx as f64 + 0.5) / STEPS as f64;
            let y = py - 0.5 + (sy as f64 + 0.5) / STEPS as f64;
            if (x - cx).powi(2) + (y - cy).powi(2) <= r2 {
                inside += 1;
            }
        }
    }
    inside as f64 / (STEPS * STEPS) as f64
}
