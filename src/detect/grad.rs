//! Sobel gradient magnitude with border clamping.

use crate::image::ImageF32;

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Per-pixel gradient magnitude `sqrt(gx² + gy²)`.
pub fn sobel_magnitude(l: &ImageF32) -> ImageF32 {
    let w = l.w;
    let h = l.h;
    let mut mag = ImageF32::new(w, h);
    if w == 0 || h == 0 {
        return mag;
    }

    for y in 0..h {
        let y_idx = [y.saturating_sub(1), y, (y + 1).min(h - 1)];
        let rows = [l.row(y_idx[0]), l.row(y_idx[1]), l.row(y_idx[2])];
        let out = mag.row_mut(y);
        for x in 0..w {
            let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];
            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            for (ky, row) in rows.iter().enumerate() {
                let kx_row = &SOBEL_KERNEL_X[ky];
                let ky_row = &SOBEL_KERNEL_Y[ky];
                sum_x += row[x_idx[0]] * kx_row[0]
                    + row[x_idx[1]] * kx_row[1]
                    + row[x_idx[2]] * kx_row[2];
                sum_y += row[x_idx[0]] * ky_row[0]
                    + row[x_idx[1]] * ky_row[1]
                    + row[x_idx[2]] * ky_row[2];
            }
            out[x] = (sum_x * sum_x + sum_y * sum_y).sqrt();
        }
    }
    mag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_image_has_zero_gradient() {
        let mut img = ImageF32::new(8, 8);
        img.data.fill(0.5);
        let mag = sobel_magnitude(&img);
        assert!(mag.data.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn vertical_step_produces_strong_response() {
        let mut img = ImageF32::new(8, 8);
        for y in 0..8 {
            for x in 4..8 {
                img.set(x, y, 1.0);
            }
        }
        let mag = sobel_magnitude(&img);
        // Response concentrates on the step columns.
        assert!(mag.get(3, 4) > 1.0 || mag.get(4, 4) > 1.0);
        assert_eq!(mag.get(1, 4), 0.0);
    }
}
