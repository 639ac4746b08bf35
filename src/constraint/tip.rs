use num_traits::Float;
use totsu::MatBuild;
use totsu_core::{LinAlgEx, MatType};
use crate::{ActionConstraint, ConstraintError, ConstraintParam, CosApprox, QuadForm, QcqpConstr};
use crate::{LinExpr, QuadExpr, QuadConstrSink, Vars, cos_maclaurin, COS_SERIES_DEGREE};
use crate::param::finite;

//

/// Index of the angle coordinate \\(\theta\\) in a state of [`TipConstraint`].
pub const TIP_ANGLE_INDEX: usize = 7;

/// Tip constraint
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// \\[
/// a_0^2 + (a_0 + a_1)^2 + 2 a_0 (a_0 + a_1) \cos\theta \le M,
/// \\]
/// that is
/// \\[
/// Q(s) =
/// \left[ \begin{array}{cc}
/// 2 + 2\cos\theta & 1 + \cos\theta \\\\
/// 1 + \cos\theta & 1
/// \end{array} \right],
/// \\]
/// where \\(a \in \mathbb{R}^2\\) and \\(\theta = s_7\\) of \\(s \in \mathbb{R}^9\\).
/// Other state coordinates are not used.
///
/// \\(Q(s)\\) is positive semi-definite for any real \\(\theta\\) as \\(\det Q = \sin^2\theta\\).
///
/// [`ActionConstraint::convex_constraints`] replaces \\(\cos\theta\\) with the Maclaurin series
/// of degree [`COS_SERIES_DEGREE`] unless [`ConstraintParam::cos_approx`] is [`CosApprox::Exact`].
/// The series is accurate near \\(\theta = 0\\) only;
/// beyond [`ConstraintParam::series_range`] a warning is logged but the constraint is still built.
/// Whether the exact cosine is acceptable depends on the convex-program backend consuming the data,
/// so the series stays the default.
#[derive(Debug, Clone, PartialEq)]
pub struct TipConstraint<F: Float>
{
    param: ConstraintParam<F>,
}

impl<F: Float> TipConstraint<F>
{
    /// Creates an instance.
    ///
    /// Returns the [`TipConstraint`] instance,
    /// or [`ConstraintError::InvalidBound`] if `max_m` is not finite and positive.
    /// * `max_m` is the upper bound \\(M\\).
    pub fn new(max_m: F) -> Result<Self, ConstraintError>
    {
        Ok(TipConstraint {
            param: ConstraintParam::new(max_m, 2, 9)?,
        })
    }

    /// Changes tuning knobs of [`ConstraintParam`].
    ///
    /// Returns the [`TipConstraint`] with its parameter modified by `f`.
    pub fn par<P>(mut self, f: P) -> Self
    where P: FnOnce(&mut ConstraintParam<F>)
    {
        f(&mut self.param);
        self
    }

    /// Quadratic form for a given \\(\cos\theta\\).
    pub fn form_of(cosg: F) -> QuadForm<F>
    {
        let f1 = F::one();
        let f2 = f1 + f1;

        QuadForm::new(f2 + f2 * cosg, f1 + cosg, f1)
    }

    fn angle(&self, state: &[F]) -> Result<F, ConstraintError>
    {
        self.param.check_state(state)?;
        finite(state[TIP_ANGLE_INDEX], TIP_ANGLE_INDEX)
    }

    fn convex_cos(&self, theta: F) -> Result<F, ConstraintError>
    {
        match self.param.cos_approx {
            CosApprox::Exact => Ok(theta.cos()),
            CosApprox::Maclaurin => {
                let cosg = cos_maclaurin(theta, COS_SERIES_DEGREE);

                // overflow of higher-order terms
                if !cosg.is_finite() {
                    log::error!("series cos of angle {:.3e} is not finite",
                        theta.to_f64().unwrap_or(f64::NAN));
                    return Err(ConstraintError::NonFinite { index: TIP_ANGLE_INDEX });
                }

                if theta.abs() > self.param.series_range {
                    log::warn!("angle {:.3e} beyond series range {:.3e}: cos error {:.3e}",
                        theta.to_f64().unwrap_or(f64::NAN),
                        self.param.series_range.to_f64().unwrap_or(f64::NAN),
                        (cosg - theta.cos()).abs().to_f64().unwrap_or(f64::NAN));
                }
                if cosg.abs() > F::one() {
                    log::warn!("series cos {:.3e} out of [-1, 1]: constraint is not convex",
                        cosg.to_f64().unwrap_or(f64::NAN));
                }

                Ok(cosg)
            },
        }
    }
}

impl<F: Float> ActionConstraint<F> for TipConstraint<F>
{
    fn param(&self) -> &ConstraintParam<F>
    {
        &self.param
    }

    fn quad_form(&self, state: &[F]) -> Result<QuadForm<F>, ConstraintError>
    {
        let theta = self.angle(state)?;

        Ok(Self::form_of(theta.cos()))
    }

    fn quad_forms(&self, states: &[F]) -> Result<Vec<QuadForm<F>>, ConstraintError>
    {
        let dim = self.param.dim_state();
        let n = self.param.batch_len(states, None)?;

        log::trace!("quad_forms: {} states", n);

        let cosg = states.chunks_exact(dim).enumerate()
            .map(|(i, s)| finite(s[TIP_ANGLE_INDEX], i * dim + TIP_ANGLE_INDEX).map(F::cos))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(cosg.into_iter().map(Self::form_of).collect())
    }

    fn convex_constraints<L>(&self, x: &Vars, state: &[F]) -> Result<Vec<QcqpConstr<L>>, ConstraintError>
    where L: LinAlgEx<F=F>
    {
        if x.len() != self.param.dim_action() {
            return Err(ConstraintError::DimMismatch {
                expected: self.param.dim_action(),
                actual: x.len(),
            });
        }
        let theta = self.angle(state)?;

        let n = x.n();
        let f2 = F::one() + F::one();
        let cosg = self.convex_cos(theta)?;

        // (1/2) x^T (2Q) x - M <= 0
        let constr = QcqpConstr {
            sym_p: Self::form_of(cosg).to_sympack(n, (x[0].0, x[1].0), f2),
            vec_q: MatBuild::new(MatType::General(n, 1)),
            scl_r: -self.param.max_m(),
        };

        log::debug!("convex constraint: theta {:.3e}, cos {:.3e}, {} variables",
            theta.to_f64().unwrap_or(f64::NAN), cosg.to_f64().unwrap_or(f64::NAN), n);

        Ok(vec![constr])
    }

    fn program_constraints<C>(&self, coll: &mut C, x: &Vars, state: &[F]) -> Result<(), C::Error>
    where C: QuadConstrSink<F>, C::Error: From<ConstraintError>
    {
        if x.len() != self.param.dim_action() {
            return Err(ConstraintError::DimMismatch {
                expected: self.param.dim_action(),
                actual: x.len(),
            }.into());
        }
        let cosg = self.angle(state)?.cos();

        let f2 = F::one() + F::one();
        let x0 = LinExpr::from(x[0]);
        let x1 = LinExpr::from(x[1]);
        let x01 = &x0 + &x1;

        let mut sq = QuadExpr::zero();
        sq += &x0 * &x0;
        sq += &x01 * &x01;
        sq += (&x0 * &x01) * (f2 * cosg);

        log::debug!("program constraint: cos {:.3e}", cosg.to_f64().unwrap_or(f64::NAN));

        coll.add_qconstr_le(sq, self.param.max_m())
    }
}

//

#[test]
fn test_tip_forms1()
{
    use float_eq::assert_float_eq;

    let tip = TipConstraint::new(0.05_f64).unwrap();

    let mut states = [0.; 27];
    states[9 + TIP_ANGLE_INDEX] = core::f64::consts::FRAC_PI_2;
    states[18 + TIP_ANGLE_INDEX] = core::f64::consts::PI;

    let forms = tip.quad_forms(&states).unwrap();
    assert_eq!(forms.len(), 3);
    assert_eq!(forms[0].to_array(), [[4., 2.], [2., 1.]]);
    assert_float_eq!(forms[1].q00, 2., abs <= 1e-15);
    assert_float_eq!(forms[1].q01, 1., abs <= 1e-15);
    assert_float_eq!(forms[2].q00, 0., abs <= 1e-15);
    assert_float_eq!(forms[2].q01, 0., abs <= 1e-15);
    assert_float_eq!(forms[2].q11, 1., abs <= 0.);

    for (i, s) in states.chunks(9).enumerate() {
        assert_eq!(tip.quad_form(s).unwrap(), forms[i]);
    }
}

#[test]
fn test_tip_nonfinite1()
{
    let tip = TipConstraint::new(0.05_f64).unwrap();

    let mut states = [0.; 18];
    states[9 + TIP_ANGLE_INDEX] = f64::NAN;
    assert_eq!(tip.quad_forms(&states), Err(ConstraintError::NonFinite { index: 16 }));

    // unused coordinates are opaque
    let mut states = [0.; 9];
    states[0] = f64::INFINITY;
    assert!(tip.quad_forms(&states).is_ok());

    let mut state = [0.; 9];
    state[TIP_ANGLE_INDEX] = f64::NEG_INFINITY;
    let x = Vars::new(2);
    let mut coll: Vec<crate::QuadConstr<f64>> = Vec::new();
    assert_eq!(tip.program_constraints(&mut coll, &x, &state), Err(ConstraintError::NonFinite { index: 7 }));
    assert!(coll.is_empty());

    // finite angle, but the series overflows
    let mut state = [0.; 9];
    state[TIP_ANGLE_INDEX] = 1e200;
    assert!(tip.quad_form(&state).unwrap().q00.is_finite());
    assert_eq!(tip.convex_constraints::<totsu_core::FloatGeneric<f64>>(&x, &state).err(),
        Some(ConstraintError::NonFinite { index: TIP_ANGLE_INDEX }));

    let exact = tip.par(|p| {p.cos_approx = CosApprox::Exact});
    let cons = exact.convex_constraints::<totsu_core::FloatGeneric<f64>>(&x, &state).unwrap();
    assert!(cons[0].sym_p[(0, 0)].is_finite());
}
