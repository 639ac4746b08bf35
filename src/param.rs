use num_traits::Float;
use crate::ConstraintError;

//

/// Cosine evaluation used by convex constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CosApprox
{
    /// Maclaurin series of degree [`crate::COS_SERIES_DEGREE`].
    /// Keeps the coefficient polynomial in the angle; accurate near zero only.
    Maclaurin,
    /// Exact cosine of the angle.
    Exact,
}

//

/// Constraint parameters.
///
/// `max_m`, `dim_action` and `dim_state` are fixed by the constructor.
/// Other fields are tuning knobs and may be changed through `par` of a constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintParam<F: Float>
{
    /// Cosine evaluation used by convex constraints.
    pub cos_approx: CosApprox,
    /// Angle magnitude up to which the cosine series is trusted. Beyond it a warning is logged.
    pub series_range: F,
    /// Small positive value added before taking the square root of scale factors.
    pub eps_floor: F,

    max_m: F,
    dim_action: usize,
    dim_state: usize,
}

impl<F: Float> ConstraintParam<F>
{
    /// Creates an instance.
    ///
    /// Returns the [`ConstraintParam`] instance with default tuning knobs,
    /// or [`ConstraintError::InvalidBound`] if `max_m` is not finite and positive.
    /// * `max_m` is the upper bound of the quadratic form.
    /// * `dim_action` is a dimension of actions.
    /// * `dim_state` is a dimension of states.
    pub fn new(max_m: F, dim_action: usize, dim_state: usize) -> Result<Self, ConstraintError>
    {
        if !max_m.is_finite() || max_m <= F::zero() {
            log::error!("max_M {:?} is not finite and positive", max_m.to_f64());
            return Err(ConstraintError::InvalidBound);
        }

        let ten = F::from(10).unwrap();

        Ok(ConstraintParam {
            cos_approx: CosApprox::Maclaurin,
            series_range: F::from(core::f64::consts::FRAC_PI_2).unwrap(),
            eps_floor: ten.powi(-9),
            max_m,
            dim_action,
            dim_state,
        })
    }

    /// Upper bound of the quadratic form.
    pub fn max_m(&self) -> F
    {
        self.max_m
    }

    /// Dimension of actions.
    pub fn dim_action(&self) -> usize
    {
        self.dim_action
    }

    /// Dimension of states.
    pub fn dim_state(&self) -> usize
    {
        self.dim_state
    }

    /// Number of samples in flat state and action batches.
    ///
    /// Returns the number of samples, or [`ConstraintError::DimMismatch`]
    /// if the lengths are not multiples of the dimensions or disagree on the count.
    pub fn batch_len(&self, states: &[F], actions: Option<&[F]>) -> Result<usize, ConstraintError>
    {
        let n = chunk_count(states.len(), self.dim_state)?;

        if let Some(actions) = actions {
            let na = chunk_count(actions.len(), self.dim_action)?;
            if na != n {
                return Err(ConstraintError::DimMismatch {
                    expected: n * self.dim_action,
                    actual: actions.len(),
                });
            }
        }

        Ok(n)
    }

    /// Checks a single state.
    ///
    /// Returns [`ConstraintError::DimMismatch`] if `state` is not exactly `dim_state` long.
    pub fn check_state(&self, state: &[F]) -> Result<(), ConstraintError>
    {
        if state.len() != self.dim_state {
            Err(ConstraintError::DimMismatch {
                expected: self.dim_state,
                actual: state.len(),
            })
        }
        else {
            Ok(())
        }
    }
}

fn chunk_count(len: usize, dim: usize) -> Result<usize, ConstraintError>
{
    if dim == 0 || len % dim != 0 {
        Err(ConstraintError::DimMismatch {
            expected: dim,
            actual: len,
        })
    }
    else {
        Ok(len / dim)
    }
}

/// Checks that a value is finite.
///
/// Returns [`ConstraintError::NonFinite`] with `index` otherwise.
pub(crate) fn finite<F: Float>(v: F, index: usize) -> Result<F, ConstraintError>
{
    if v.is_finite() {
        Ok(v)
    }
    else {
        Err(ConstraintError::NonFinite { index })
    }
}

//

#[test]
fn test_param1()
{
    use float_eq::assert_float_eq;

    let p = ConstraintParam::new(0.05_f64, 2, 9).unwrap();
    assert_eq!(p.cos_approx, CosApprox::Maclaurin);
    assert_float_eq!(p.eps_floor, 1e-9, r2nd <= 1e-12);
    assert_float_eq!(p.series_range, core::f64::consts::FRAC_PI_2, abs <= 0.);

    assert_eq!(p.batch_len(&[0.; 18], Some(&[0.; 4][..])), Ok(2));
    assert_eq!(p.batch_len(&[], None), Ok(0));
    assert_eq!(p.batch_len(&[0.; 17], None), Err(ConstraintError::DimMismatch { expected: 9, actual: 17 }));
    assert_eq!(p.batch_len(&[0.; 18], Some(&[0.; 6][..])), Err(ConstraintError::DimMismatch { expected: 4, actual: 6 }));

    assert_eq!(ConstraintParam::new(0_f64, 2, 9), Err(ConstraintError::InvalidBound));
    assert_eq!(ConstraintParam::new(f64::NAN, 2, 9), Err(ConstraintError::InvalidBound));
}
