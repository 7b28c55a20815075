use itertools::{izip, Itertools};
use metfor::{HectoPascal, Quantity};
use optional::Optioned;

/// Interpolate a profile to a target pressure, linear in the log of pressure.
///
/// Assumes the pressure profile is monotonic. Returns a missing value when the target pressure is
/// outside of the profile.
pub fn log_p_interpolate<Y>(pressure: &[HectoPascal], ys: &[Y], target_p: HectoPascal) -> Optioned<Y>
where
    Y: Quantity + optional::Noned,
{
    debug_assert_eq!(pressure.len(), ys.len());

    // What kind of bracket is this?
    enum BracketType<Y> {
        Bracket((f64, Y), (f64, Y)),
        EndEqual(Y),
    }

    let target = target_p.unpack();

    let make_bracket = |pnt_0: (f64, Y), pnt_1: (f64, Y)| -> Option<BracketType<Y>> {
        let (p0, _) = pnt_0;
        let (p1, _) = pnt_1;

        if (p0 < target && p1 > target) || (p0 > target && p1 < target) {
            Some(BracketType::Bracket(pnt_0, pnt_1))
        } else if (p0 - target).abs() < std::f64::EPSILON {
            Some(BracketType::EndEqual(pnt_0.1))
        } else if (p1 - target).abs() < std::f64::EPSILON {
            Some(BracketType::EndEqual(pnt_1.1))
        } else {
            None
        }
    };

    let value_opt = izip!(pressure, ys)
        .map(|(p, &y)| (p.unpack(), y))
        // Look at them in pairs.
        .tuple_windows::<(_, _)>()
        // Keep the first pair bracketing the target.
        .filter_map(|(pnt_0, pnt_1)| make_bracket(pnt_0, pnt_1))
        .nth(0)
        .map(|bracket| match bracket {
            BracketType::Bracket((p0, y0), (p1, y1)) => {
                let run = p1.ln() - p0.ln();
                let dx = target.ln() - p0.ln();
                let rise = y1.unpack() - y0.unpack();
                Y::pack(y0.unpack() + dx * rise / run)
            }
            BracketType::EndEqual(y) => y,
        });

    Optioned::from(value_opt)
}

/// Find where two profiles cross between two levels, linear in the log of pressure.
///
/// `diff0` and `diff1` are the differences between the profiles at `p0` and `p1`, they must have
/// opposite signs (or one of them be zero). Returns the pressure and the value of `y` there.
pub(crate) fn crossing(
    (p0, diff0, y0): (f64, f64, f64),
    (p1, diff1, y1): (f64, f64, f64),
) -> (f64, f64) {
    if (diff1 - diff0).abs() < std::f64::EPSILON {
        return (p0, y0);
    }

    let frac = diff0 / (diff0 - diff1);
    let ln_p = p0.ln() + frac * (p1.ln() - p0.ln());

    (ln_p.exp(), y0 + frac * (y1 - y0))
}

#[cfg(test)]
mod test {
    use super::*;
    use metfor::Kelvin;

    fn approx_equal(val1: f64, val2: f64, eps: f64) -> bool {
        (val1 - val2).abs() < eps
    }

    #[test]
    fn test_log_p_interpolate() {
        let p: Vec<_> = vec![1000.0, 850.0, 700.0, 500.0].into_iter().map(HectoPascal).collect();
        let t: Vec<_> = vec![300.0, 290.0, 280.0, 260.0].into_iter().map(Kelvin).collect();

        let at_850 = log_p_interpolate(&p, &t, HectoPascal(850.0));
        assert_eq!(at_850.unpack().unpack(), 290.0);

        let at_600 = log_p_interpolate(&p, &t, HectoPascal(600.0)).unpack().unpack();
        let frac = (600.0f64.ln() - 700.0f64.ln()) / (500.0f64.ln() - 700.0f64.ln());
        assert!(approx_equal(at_600, 280.0 - 20.0 * frac, 1.0e-10));

        assert!(log_p_interpolate(&p, &t, HectoPascal(1010.0)).is_none());
        assert!(log_p_interpolate(&p, &t, HectoPascal(400.0)).is_none());
    }

    #[test]
    fn test_crossing() {
        let (p, y) = crossing((900.0, -2.0, 280.0), (800.0, 2.0, 276.0));
        assert!(p < 900.0 && p > 800.0);
        assert!(approx_equal(p, (0.5 * (900.0f64.ln() + 800.0f64.ln())).exp(), 1.0e-9));
        assert!(approx_equal(y, 278.0, 1.0e-12));
    }
}
