use num_traits::Float;
use totsu_core::LinAlgEx;
use crate::{ConstraintError, ConstraintParam, QuadForm, QcqpConstr, QuadConstrSink, Vars};
use crate::param::finite;

//

/// State-dependent quadratic action constraint
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// \\[
/// a^T Q(s) a \le M,
/// \\]
/// where
/// - action \\( a \in \mathbb{R}^2 \\), state \\( s \in \mathbb{R}^{n_s} \\)
/// - \\( Q(s) \in \mathcal{S}_{+}^2 \\) is given by each constraint shape
/// - \\( M > 0 \\) is [`ConstraintParam::max_m`].
///
/// The same inequality is available in three forms:
/// - a batch of numeric matrices ([`ActionConstraint::quad_forms`]),
/// - QCQP data over decision variables ([`ActionConstraint::convex_constraints`]),
/// - scalar quadratic expressions registered into a collection ([`ActionConstraint::program_constraints`]).
///
/// States and actions are flat row-major slices of `dim_state` and `dim_action` elements per sample.
pub trait ActionConstraint<F: Float>
{
    /// Parameters of the constraint.
    fn param(&self) -> &ConstraintParam<F>;

    /// Calculates \\(Q(s)\\) of a single state.
    fn quad_form(&self, state: &[F]) -> Result<QuadForm<F>, ConstraintError>;

    /// Calculates \\(Q(s)\\) of each state of a batch.
    ///
    /// Returns one [`QuadForm`] per state.
    fn quad_forms(&self, states: &[F]) -> Result<Vec<QuadForm<F>>, ConstraintError>
    {
        let dim = self.param().dim_state();
        self.param().batch_len(states, None)?;

        states.chunks_exact(dim).enumerate()
            .map(|(i, s)| {
                self.quad_form(s).map_err(|e| match e {
                    ConstraintError::NonFinite { index } => ConstraintError::NonFinite { index: i * dim + index },
                    e => e,
                })
            })
            .collect()
    }

    /// Builds the constraint as QCQP inequalities for a fixed state.
    ///
    /// Returns a list of [`QcqpConstr`] over `x.n()` variables.
    /// * `x` holds handles of the action variables \\(a_0, a_1\\) as `x[0]`, `x[1]`.
    /// * `state` is a single state.
    fn convex_constraints<L>(&self, x: &Vars, state: &[F]) -> Result<Vec<QcqpConstr<L>>, ConstraintError>
    where L: LinAlgEx<F=F>;

    /// Builds the constraint as scalar quadratic inequalities for a fixed state
    /// and registers them into `coll`.
    ///
    /// Errors of `coll` are returned as they are.
    /// * `x` holds handles of the action variables \\(a_0, a_1\\) as `x[0]`, `x[1]`.
    /// * `state` is a single state.
    fn program_constraints<C>(&self, coll: &mut C, x: &Vars, state: &[F]) -> Result<(), C::Error>
    where C: QuadConstrSink<F>, C::Error: From<ConstraintError>;

    /// Calculates \\(a^T Q(s) a\\) of each sample by the full matrix contraction.
    fn quad_values(&self, states: &[F], actions: &[F]) -> Result<Vec<F>, ConstraintError>
    {
        let dim = self.param().dim_action();
        self.param().batch_len(states, Some(actions))?;

        let forms = self.quad_forms(states)?;

        forms.iter().zip(actions.chunks_exact(dim)).enumerate()
            .map(|(i, (q, a))| {
                let a0 = finite(a[0], i * dim)?;
                let a1 = finite(a[1], i * dim + 1)?;
                Ok(q.value(&[a0, a1]))
            })
            .collect()
    }

    /// Calculates the scale factor \\(\sqrt{(a^T Q(s) a + \epsilon) / M}\\) of each sample,
    /// where \\(\epsilon\\) is [`ConstraintParam::eps_floor`].
    ///
    /// Factors greater than one mean violation.
    fn scale_factors(&self, states: &[F], actions: &[F]) -> Result<Vec<F>, ConstraintError>
    {
        let par = self.param();
        let values = self.quad_values(states, actions)?;

        Ok(values.into_iter()
            .map(|v| ((v + par.eps_floor) / par.max_m()).sqrt())
            .collect())
    }

    /// Checks \\(a^T Q(s) a \le M\\) of a single sample.
    fn is_satisfied(&self, state: &[F], action: &[F]) -> Result<bool, ConstraintError>
    {
        self.param().check_state(state)?;
        let values = self.quad_values(state, action)?;

        Ok(values.iter().all(|&v| v <= self.param().max_m()))
    }
}

//

mod tip;

pub use tip::*;
