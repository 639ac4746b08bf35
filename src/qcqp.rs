use num_traits::{Zero, One};
use totsu::{MatBuild, ProbQCQP};
use totsu_core::{LinAlgEx, MatType};
use crate::{ConstraintError, QuadExpr, QuadConstrSink};

//

/// One QCQP inequality
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// \\[
/// {1 \over 2} x^T P x + q^T x + r \le 0
/// \\]
/// in the data form taken by [`ProbQCQP`], where \\(x \in \mathbb{R}^n\\).
#[derive(Clone)]
pub struct QcqpConstr<L: LinAlgEx>
{
    /// \\(P\\), [`MatType::SymPack`] of size `n`.
    pub sym_p: MatBuild<L>,
    /// \\(q\\), [`MatType::General`] of size `n` x 1.
    pub vec_q: MatBuild<L>,
    /// \\(r\\).
    pub scl_r: L::F,
}

impl<L: LinAlgEx> QcqpConstr<L>
{
    /// Creates an inequality `expr <= rhs` over `n` variables.
    ///
    /// Returns [`ConstraintError::VarOutOfRange`] if `expr` refers to a variable beyond `n`.
    pub fn from_expr(expr: &QuadExpr<L::F>, rhs: L::F, n: usize) -> Result<Self, ConstraintError>
    {
        let (sym_p, vec_q, scl_r) = expr.to_qcqp(n)?;

        Ok(QcqpConstr {
            sym_p,
            vec_q,
            scl_r: scl_r - rhs,
        })
    }

    /// Number of variables.
    pub fn n(&self) -> usize
    {
        self.sym_p.size().0
    }

    /// Evaluates the left-hand side \\({1 \over 2} x^T P x + q^T x + r\\) at `x`.
    pub fn eval(&self, x: &[L::F]) -> L::F
    {
        let n = self.n();
        assert_eq!(x.len(), n);

        let f2 = L::F::one() + L::F::one();

        let mut quad = L::F::zero();
        let mut lin = L::F::zero();
        for c in 0.. n {
            for r in 0.. n {
                quad = quad + x[r] * self.sym_p[(r, c)] * x[c];
            }
            lin = lin + self.vec_q[(c, 0)] * x[c];
        }

        quad / f2 + lin + self.scl_r
    }
}

//

/// QCQP builder
///
/// Collects an objective and inequalities over `n` variables,
/// and generates [`ProbQCQP`] without equality constraints.
pub struct QcqpBuilder<L: LinAlgEx>
{
    n: usize,
    objective: QcqpConstr<L>,
    constrs: Vec<QcqpConstr<L>>,
}

impl<L: LinAlgEx> QcqpBuilder<L>
{
    /// Creates an instance with zero objective and no constraints.
    pub fn new(n: usize) -> Self
    {
        QcqpBuilder {
            n,
            objective: QcqpConstr {
                sym_p: MatBuild::new(MatType::SymPack(n)),
                vec_q: MatBuild::new(MatType::General(n, 1)),
                scl_r: L::F::zero(),
            },
            constrs: Vec::new(),
        }
    }

    /// Number of variables.
    pub fn n(&self) -> usize
    {
        self.n
    }

    /// Number of inequality constraints.
    pub fn len(&self) -> usize
    {
        self.constrs.len()
    }

    /// Checks if no inequality constraints are collected.
    pub fn is_empty(&self) -> bool
    {
        self.constrs.is_empty()
    }

    /// Collected inequality constraints.
    pub fn constrs(&self) -> &[QcqpConstr<L>]
    {
        &self.constrs
    }

    /// Sets the objective to minimize.
    ///
    /// `expr` shall be convex.
    pub fn set_objective(&mut self, expr: &QuadExpr<L::F>) -> Result<(), ConstraintError>
    {
        self.objective = QcqpConstr::from_expr(expr, L::F::zero(), self.n)?;
        Ok(())
    }

    /// Adds inequality constraints.
    ///
    /// Returns [`ConstraintError::DimMismatch`] if a constraint has a different number of variables.
    pub fn add_constrs<I>(&mut self, constrs: I) -> Result<(), ConstraintError>
    where I: IntoIterator<Item=QcqpConstr<L>>
    {
        for constr in constrs {
            if constr.n() != self.n {
                return Err(ConstraintError::DimMismatch {
                    expected: self.n,
                    actual: constr.n(),
                });
            }
            self.constrs.push(constr);
        }
        Ok(())
    }

    /// Generates the problem.
    ///
    /// * `eps_zero` should be the same value as [`totsu_core::solver::SolverParam::eps_zero`].
    pub fn to_prob(&self, eps_zero: L::F) -> ProbQCQP<L>
    {
        let n = self.n;

        let all = core::iter::once(&self.objective).chain(&self.constrs);

        let syms_p = all.clone().map(|c| c.sym_p.clone()).collect();
        let vecs_q = all.clone().map(|c| c.vec_q.clone()).collect();
        let scls_r = all.map(|c| c.scl_r).collect();

        let mat_a = MatBuild::new(MatType::General(0, n));
        let vec_b = MatBuild::new(MatType::General(0, 1));

        log::debug!("QCQP: {} variables, {} inequalities", n, self.constrs.len());

        ProbQCQP::new(syms_p, vecs_q, scls_r, mat_a, vec_b, eps_zero)
    }
}

impl<L: LinAlgEx> QuadConstrSink<L::F> for QcqpBuilder<L>
{
    type Error = ConstraintError;

    fn add_qconstr_le(&mut self, expr: QuadExpr<L::F>, rhs: L::F) -> Result<(), Self::Error>
    {
        let constr = QcqpConstr::from_expr(&expr, rhs, self.n)?;
        self.constrs.push(constr);
        Ok(())
    }
}

//

#[test]
fn test_qcqp_builder1()
{
    use float_eq::assert_float_eq;
    use totsu_core::FloatGeneric;
    use crate::{LinExpr, Vars};

    type L = FloatGeneric<f64>;

    let x = Vars::new(2);
    let x0 = LinExpr::from(x[0]);
    let x1 = LinExpr::from(x[1]);

    let mut b = QcqpBuilder::<L>::new(2);
    b.add_qconstr_le(&x0 * &x1 + QuadExpr::from(x0.clone()), 3.).unwrap();
    assert_eq!(b.len(), 1);
    assert_float_eq!(b.constrs()[0].eval(&[2., 4.]), 8. + 2. - 3., abs <= 1e-12);

    let r = b.add_qconstr_le(QuadExpr::from(LinExpr::from(crate::Var(2))), 0.);
    assert_eq!(r, Err(ConstraintError::VarOutOfRange { index: 2, n: 2 }));

    let other = QcqpBuilder::<L>::new(3);
    let r = b.add_constrs(vec![other.objective]);
    assert_eq!(r, Err(ConstraintError::DimMismatch { expected: 2, actual: 3 }));
}
