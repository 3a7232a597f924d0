use crate::core::{AspectRatio, Size, Vec2};

const FIT_EPSILON: f64 = 1e-9;

/// Largest `ratio`-shaped size that fits inside `container` once `margin` is
/// taken off every edge.
///
/// Two candidates are formed, one maximizing width and one maximizing height.
/// The width-fit candidate wins when it fits the available bounds, then the
/// height-fit candidate, then whichever has the larger area after clamping.
/// Equal-area ties resolve to the width-fit candidate. Returns a size only;
/// the caller centers it.
pub fn fit_work_area(container: Size, margin: f64, ratio: AspectRatio) -> Size {
    let avail_w = (container.width - 2.0 * margin).max(0.0);
    let avail_h = (container.height - 2.0 * margin).max(0.0);
    let r = ratio.as_f64();

    let width_fit = Size::new(avail_w, avail_w / r);
    let height_fit = Size::new(avail_h * r, avail_h);

    if width_fit.height <= avail_h + FIT_EPSILON {
        return width_fit;
    }
    if height_fit.width <= avail_w + FIT_EPSILON {
        return height_fit;
    }

    let clamp = |s: Size| Size::new(s.width.min(avail_w), s.height.min(avail_h));
    if width_fit.area() >= height_fit.area() {
        clamp(width_fit)
    } else {
        clamp(height_fit)
    }
}

/// Offset that centers `inner` inside `outer` (non-negative components).
pub fn centered_offset(outer: Size, inner: Size) -> Vec2 {
    Vec2::new(
        ((outer.width - inner.width) * 0.5).max(0.0),
        ((outer.height - inner.height) * 0.5).max(0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_in_square_minus_margins() {
        let work = fit_work_area(Size::new(400.0, 400.0), 8.0, AspectRatio::square());
        assert!((work.width - 384.0).abs() < 1e-9);
        assert!((work.height - 384.0).abs() < 1e-9);
    }

    #[test]
    fn wide_ratio_prefers_width_fit() {
        let ratio = AspectRatio::new(16, 9).unwrap();
        let work = fit_work_area(Size::new(400.0, 400.0), 0.0, ratio);
        assert!((work.width - 400.0).abs() < 1e-9);
        assert!((work.height - 225.0).abs() < 1e-9);
    }

    #[test]
    fn tall_ratio_falls_back_to_height_fit() {
        let ratio = AspectRatio::new(9, 16).unwrap();
        let work = fit_work_area(Size::new(400.0, 400.0), 0.0, ratio);
        assert!((work.width - 225.0).abs() < 1e-9);
        assert!((work.height - 400.0).abs() < 1e-9);
    }

    #[test]
    fn ratio_holds_across_margin_range() {
        let container = Size::new(400.0, 400.0);
        for ratio in [
            AspectRatio::square(),
            AspectRatio::new(4, 3).unwrap(),
            AspectRatio::new(3, 4).unwrap(),
            AspectRatio::new(16, 9).unwrap(),
            AspectRatio::new(9, 16).unwrap(),
        ] {
            for m in 0..=40 {
                let work = fit_work_area(container, f64::from(m), ratio);
                assert!(
                    (work.width / work.height - ratio.as_f64()).abs() < 1e-3,
                    "ratio {}:{} margin {m} drifted: {work:?}",
                    ratio.num,
                    ratio.den,
                );
            }
        }
    }

    #[test]
    fn oversize_margin_collapses_to_zero() {
        let work = fit_work_area(Size::new(100.0, 100.0), 60.0, AspectRatio::square());
        assert_eq!(work.width, 0.0);
        assert_eq!(work.height, 0.0);
    }

    #[test]
    fn square_tie_picks_width_fit() {
        // Equal available extents with a 1:1 ratio make both candidates
        // identical; the width-fit branch must be the one taken.
        let work = fit_work_area(Size::new(300.0, 300.0), 10.0, AspectRatio::square());
        assert!((work.width - 280.0).abs() < 1e-9);
        assert!((work.height - 280.0).abs() < 1e-9);
    }

    #[test]
    fn centered_offset_splits_slack_evenly() {
        let off = centered_offset(Size::new(100.0, 50.0), Size::new(80.0, 50.0));
        assert!((off.x - 10.0).abs() < 1e-9);
        assert_eq!(off.y, 0.0);
    }
}
