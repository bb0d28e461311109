use cutframe_project_model::transform::{fit_rect, ObjectFit};
use proptest::prelude::*;

const EPS: f64 = 1e-6;

proptest! {
    #[test]
    fn cover_always_covers_the_canvas(
        sw in 1.0f64..4000.0,
        sh in 1.0f64..4000.0,
        cw in 1.0f64..4000.0,
        ch in 1.0f64..4000.0,
    ) {
        let r = fit_rect(ObjectFit::Cover, sw, sh, cw, ch).unwrap();
        prop_assert!(r.x <= EPS && r.y <= EPS);
        prop_assert!(r.x + r.width >= cw - EPS);
        prop_assert!(r.y + r.height >= ch - EPS);
        // aspect ratio preserved
        prop_assert!((r.width / r.height - sw / sh).abs() < 1e-6 * (sw / sh).max(1.0));
    }

    #[test]
    fn contain_stays_inside_the_canvas(
        sw in 1.0f64..4000.0,
        sh in 1.0f64..4000.0,
        cw in 1.0f64..4000.0,
        ch in 1.0f64..4000.0,
    ) {
        let r = fit_rect(ObjectFit::Contain, sw, sh, cw, ch).unwrap();
        prop_assert!(r.x >= -EPS && r.y >= -EPS);
        prop_assert!(r.x + r.width <= cw + EPS);
        prop_assert!(r.y + r.height <= ch + EPS);
        // one axis touches the canvas edge
        prop_assert!((r.width - cw).abs() < EPS || (r.height - ch).abs() < EPS);
    }

    #[test]
    fn fitted_rect_is_centred(
        sw in 1.0f64..4000.0,
        sh in 1.0f64..4000.0,
        fit in prop_oneof![
            Just(ObjectFit::Cover),
            Just(ObjectFit::Contain),
            Just(ObjectFit::Fill),
            Just(ObjectFit::None),
            Just(ObjectFit::ScaleDown),
        ],
    ) {
        let r = fit_rect(fit, sw, sh, 800.0, 450.0).unwrap();
        let (cx, cy) = r.center();
        prop_assert!((cx - 400.0).abs() < 1e-6);
        prop_assert!((cy - 225.0).abs() < 1e-6);
    }
}
