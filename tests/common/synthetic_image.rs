//! Synthetic grayscale test images with drawn line segments.

/// White canvas of the given size.
pub fn white_canvas(w: usize, h: usize) -> Vec<u8> {
    vec![255u8; w * h]
}

/// Draws a dark segment by dense parametric sampling with a square brush.
pub fn draw_segment(
    buf: &mut [u8],
    w: usize,
    h: usize,
    p0: (f64, f64),
    p1: (f64, f64),
    radius: i64,
    value: u8,
) {
    let dx = p1.0 - p0.0;
    let dy = p1.1 - p0.1;
    let len = (dx * dx + dy * dy).sqrt();
    let steps = (len * 2.0).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = (p0.0 + t * dx).round() as i64;
        let y = (p0.1 + t * dy).round() as i64;
        for oy in -radius..=radius {
            for ox in -radius..=radius {
                let (px, py) = (x + ox, y + oy);
                if px >= 0 && py >= 0 && (px as usize) < w && (py as usize) < h {
                    buf[py as usize * w + px as usize] = value;
                }
            }
        }
    }
}

/// Canvas with a pair of parallel dark lines leaning `lean_deg` off vertical.
pub fn leaning_vertical_pair(w: usize, h: usize, lean_deg: f64) -> Vec<u8> {
    let mut buf = white_canvas(w, h);
    let lean = lean_deg.to_radians().tan();
    let (top, bottom) = (h as f64 * 0.1, h as f64 * 0.9);
    let span = bottom - top;
    for cx in [w as f64 * 0.35, w as f64 * 0.65] {
        draw_segment(
            &mut buf,
            w,
            h,
            (cx - lean * span * 0.5, bottom),
            (cx + lean * span * 0.5, top),
            1,
            20,
        );
    }
    buf
}
