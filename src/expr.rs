use std::ops::{Add, AddAssign, Index, Mul, Sub};
use num_traits::Float;
use totsu::MatBuild;
use totsu_core::{LinAlgEx, MatType};
use crate::ConstraintError;

//

/// Decision variable handle: an index into the variable vector of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(pub usize);

/// Decision variable container.
///
/// Holds handles of some variables of a problem with `n` variables in total.
/// Indexing returns the handle; the container itself is never mutated by constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vars
{
    n: usize,
    vars: Vec<Var>,
}

impl Vars
{
    /// Creates a container of all `n` variables `x[0], ..., x[n-1]`.
    pub fn new(n: usize) -> Self
    {
        Vars {
            n,
            vars: (0.. n).map(Var).collect(),
        }
    }

    /// Creates a container of selected variables.
    ///
    /// Returns [`ConstraintError::VarOutOfRange`] if any index is not less than `n`.
    pub fn with_indices(n: usize, indices: &[usize]) -> Result<Self, ConstraintError>
    {
        if let Some(&index) = indices.iter().find(|&&i| i >= n) {
            return Err(ConstraintError::VarOutOfRange { index, n });
        }

        Ok(Vars {
            n,
            vars: indices.iter().copied().map(Var).collect(),
        })
    }

    /// Number of variables of the whole problem.
    pub fn n(&self) -> usize
    {
        self.n
    }

    /// Number of held handles.
    pub fn len(&self) -> usize
    {
        self.vars.len()
    }

    /// Checks if no handles are held.
    pub fn is_empty(&self) -> bool
    {
        self.vars.is_empty()
    }
}

impl Index<usize> for Vars
{
    type Output = Var;
    fn index(&self, index: usize) -> &Self::Output
    {
        &self.vars[index]
    }
}

//

/// Affine expression \\(\sum_i c_i x_i + c\\).
#[derive(Debug, Clone, PartialEq)]
pub struct LinExpr<F>
{
    pub terms: Vec<(Var, F)>,
    pub constant: F,
}

impl<F: Float> LinExpr<F>
{
    /// Zero expression.
    pub fn zero() -> Self
    {
        LinExpr {
            terms: Vec::new(),
            constant: F::zero(),
        }
    }

    /// Evaluates at `x`, which shall cover every variable index in the expression.
    pub fn eval(&self, x: &[F]) -> F
    {
        self.terms.iter().fold(self.constant, |acc, (v, c)| acc + *c * x[v.0])
    }

    fn scaled(&self, alpha: F) -> Self
    {
        LinExpr {
            terms: self.terms.iter().map(|&(v, c)| (v, alpha * c)).collect(),
            constant: alpha * self.constant,
        }
    }
}

impl<F: Float> From<Var> for LinExpr<F>
{
    fn from(v: Var) -> Self
    {
        LinExpr {
            terms: vec![(v, F::one())],
            constant: F::zero(),
        }
    }
}

impl<F: Float> Add<&LinExpr<F>> for &LinExpr<F>
{
    type Output = LinExpr<F>;
    fn add(self, rhs: &LinExpr<F>) -> Self::Output
    {
        LinExpr {
            terms: self.terms.iter().chain(&rhs.terms).copied().collect(),
            constant: self.constant + rhs.constant,
        }
    }
}

impl<F: Float> Add for LinExpr<F>
{
    type Output = LinExpr<F>;
    fn add(self, rhs: LinExpr<F>) -> Self::Output
    {
        &self + &rhs
    }
}

impl<F: Float> Add<F> for LinExpr<F>
{
    type Output = LinExpr<F>;
    fn add(mut self, rhs: F) -> Self::Output
    {
        self.constant = self.constant + rhs;
        self
    }
}

impl<F: Float> Sub<F> for LinExpr<F>
{
    type Output = LinExpr<F>;
    fn sub(self, rhs: F) -> Self::Output
    {
        self + (-rhs)
    }
}

impl<F: Float> Mul<F> for LinExpr<F>
{
    type Output = LinExpr<F>;
    fn mul(self, rhs: F) -> Self::Output
    {
        self.scaled(rhs)
    }
}

impl<F: Float> Mul<&LinExpr<F>> for &LinExpr<F>
{
    type Output = QuadExpr<F>;
    fn mul(self, rhs: &LinExpr<F>) -> Self::Output
    {
        // (a^T x + c)(b^T x + d) = sum a_i b_j x_i x_j + d a^T x + c b^T x + c d
        let mut qterms = Vec::with_capacity(self.terms.len() * rhs.terms.len());
        for &(vi, ci) in &self.terms {
            for &(vj, cj) in &rhs.terms {
                qterms.push((vi, vj, ci * cj));
            }
        }

        let lin = &self.scaled(rhs.constant) + &rhs.scaled(self.constant);

        QuadExpr {
            qterms,
            lin: LinExpr {
                terms: lin.terms,
                constant: self.constant * rhs.constant,
            },
        }
    }
}

impl<F: Float> Mul for LinExpr<F>
{
    type Output = QuadExpr<F>;
    fn mul(self, rhs: LinExpr<F>) -> Self::Output
    {
        &self * &rhs
    }
}

//

/// Quadratic expression \\(\sum_{i,j} c_{ij} x_i x_j + \sum_i c_i x_i + c\\).
#[derive(Debug, Clone, PartialEq)]
pub struct QuadExpr<F>
{
    pub qterms: Vec<(Var, Var, F)>,
    pub lin: LinExpr<F>,
}

impl<F: Float> QuadExpr<F>
{
    /// Zero expression.
    pub fn zero() -> Self
    {
        QuadExpr {
            qterms: Vec::new(),
            lin: LinExpr::zero(),
        }
    }

    /// Evaluates at `x`, which shall cover every variable index in the expression.
    pub fn eval(&self, x: &[F]) -> F
    {
        self.qterms.iter().fold(self.lin.eval(x), |acc, (vi, vj, c)| acc + *c * x[vi.0] * x[vj.0])
    }

    /// Largest variable index plus one, or zero for a constant expression.
    pub fn num_vars(&self) -> usize
    {
        let q = self.qterms.iter().map(|(vi, vj, _)| vi.0.max(vj.0) + 1);
        let l = self.lin.terms.iter().map(|(v, _)| v.0 + 1);
        q.chain(l).max().unwrap_or(0)
    }

    /// Converts into QCQP data \\({1 \over 2} x^T P x + q^T x + r\\) over `n` variables.
    ///
    /// Returns a tuple of \\(P\\) ([`MatType::SymPack`]), \\(q\\) and \\(r\\),
    /// or [`ConstraintError::VarOutOfRange`] if a variable index is not less than `n`.
    pub fn to_qcqp<L>(&self, n: usize) -> Result<(MatBuild<L>, MatBuild<L>, F), ConstraintError>
    where L: LinAlgEx<F=F>
    {
        let nv = self.num_vars();
        if nv > n {
            return Err(ConstraintError::VarOutOfRange { index: nv - 1, n });
        }

        let mut sym_p = MatBuild::new(MatType::SymPack(n));
        for &(vi, vj, c) in &self.qterms {
            // x_i x_j appears twice in x^T P x / 2 unless i == j
            let c = if vi == vj {c + c} else {c};
            sym_p[(vi.0, vj.0)] = sym_p[(vi.0, vj.0)] + c;
        }

        let mut vec_q = MatBuild::new(MatType::General(n, 1));
        for &(v, c) in &self.lin.terms {
            vec_q[(v.0, 0)] = vec_q[(v.0, 0)] + c;
        }

        Ok((sym_p, vec_q, self.lin.constant))
    }
}

impl<F: Float> From<LinExpr<F>> for QuadExpr<F>
{
    fn from(lin: LinExpr<F>) -> Self
    {
        QuadExpr {
            qterms: Vec::new(),
            lin,
        }
    }
}

impl<F: Float> AddAssign for QuadExpr<F>
{
    fn add_assign(&mut self, rhs: QuadExpr<F>)
    {
        self.qterms.extend(rhs.qterms);
        self.lin = &self.lin + &rhs.lin;
    }
}

impl<F: Float> Add for QuadExpr<F>
{
    type Output = QuadExpr<F>;
    fn add(mut self, rhs: QuadExpr<F>) -> Self::Output
    {
        self += rhs;
        self
    }
}

impl<F: Float> Mul<F> for QuadExpr<F>
{
    type Output = QuadExpr<F>;
    fn mul(self, rhs: F) -> Self::Output
    {
        QuadExpr {
            qterms: self.qterms.into_iter().map(|(vi, vj, c)| (vi, vj, rhs * c)).collect(),
            lin: self.lin.scaled(rhs),
        }
    }
}

//

/// Scalar quadratic inequality `expr <= rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadConstr<F>
{
    pub expr: QuadExpr<F>,
    pub rhs: F,
}

impl<F: Float> QuadConstr<F>
{
    /// Evaluates `expr - rhs` at `x`; non-positive when satisfied.
    pub fn slack(&self, x: &[F]) -> F
    {
        self.expr.eval(x) - self.rhs
    }
}

/// External collection of scalar quadratic inequalities.
///
/// Errors raised by [`QuadConstrSink::add_qconstr_le`] are propagated unchanged by constraint builders.
pub trait QuadConstrSink<F>
{
    /// Error type of the collection.
    type Error;

    /// Adds an inequality `expr <= rhs`.
    fn add_qconstr_le(&mut self, expr: QuadExpr<F>, rhs: F) -> Result<(), Self::Error>;
}

impl<F: Float> QuadConstrSink<F> for Vec<QuadConstr<F>>
{
    type Error = ConstraintError;

    fn add_qconstr_le(&mut self, expr: QuadExpr<F>, rhs: F) -> Result<(), Self::Error>
    {
        self.push(QuadConstr { expr, rhs });
        Ok(())
    }
}

//

#[test]
fn test_quadexpr1()
{
    use float_eq::assert_float_eq;
    use totsu_core::FloatGeneric;

    type L = FloatGeneric<f64>;

    let x = Vars::new(3);
    let x0 = LinExpr::from(x[0]);
    let x2 = LinExpr::from(x[2]);

    // (x0 - 1)^2 + 3 x0 x2 + x2
    let e = (x0.clone() - 1.) * (x0.clone() - 1.) + (&x0 * &x2) * 3. + QuadExpr::from(x2);
    let pt = [2., 5., -1.];
    assert_float_eq!(e.eval(&pt), 1. - 6. - 1., abs <= 1e-12);
    assert_eq!(e.num_vars(), 3);

    let (sym_p, vec_q, scl_r) = e.to_qcqp::<L>(3).unwrap();
    assert_float_eq!(sym_p[(0, 0)], 2., abs <= 1e-12);
    assert_float_eq!(sym_p[(0, 2)], 3., abs <= 1e-12);
    assert_float_eq!(sym_p[(2, 2)], 0., abs <= 1e-12);
    assert_float_eq!(vec_q[(0, 0)], -2., abs <= 1e-12);
    assert_float_eq!(vec_q[(2, 0)], 1., abs <= 1e-12);
    assert_float_eq!(scl_r, 1., abs <= 1e-12);

    assert_eq!(e.to_qcqp::<L>(2).err(), Some(ConstraintError::VarOutOfRange { index: 2, n: 2 }));
}

#[test]
fn test_vars1()
{
    let x = Vars::with_indices(4, &[3, 1]).unwrap();
    assert_eq!(x[0], Var(3));
    assert_eq!(x[1], Var(1));
    assert_eq!(x.n(), 4);
    assert_eq!(x.len(), 2);

    assert_eq!(Vars::with_indices(2, &[0, 2]), Err(ConstraintError::VarOutOfRange { index: 2, n: 2 }));
}
