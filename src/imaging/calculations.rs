//! Pure calculation functions for placeholder dimensions.

/// Fit `source` into a bounding width, preserving aspect ratio.
///
/// Never upscales: a source already narrower than `max_width` is returned
/// unchanged. Both output sides are at least 1 px.
///
/// # Examples
/// ```
/// # use gallery_prep::imaging::placeholder_dimensions;
/// // 3:2 landscape into 8px → 8x5
/// assert_eq!(placeholder_dimensions((1200, 800), 8), (8, 5));
///
/// // Already small enough → untouched
/// assert_eq!(placeholder_dimensions((6, 4), 8), (6, 4));
/// ```
pub fn placeholder_dimensions(source: (u32, u32), max_width: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    let max_width = max_width.max(1);

    if src_w <= max_width {
        return (src_w.max(1), src_h.max(1));
    }

    let h = (src_h as f64 * max_width as f64 / src_w as f64).round() as u32;
    (max_width, h.max(1))
}
