use num_traits::Float;
use totsu::MatBuild;
use totsu_core::{LinAlgEx, MatType};

//

/// Symmetric 2x2 matrix of a quadratic form \\(a^T Q a\\).
///
/// Only the upper triangle `q00`, `q01`, `q11` is stored; `q10 == q01`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadForm<F>
{
    pub q00: F,
    pub q01: F,
    pub q11: F,
}

impl<F: Float> QuadForm<F>
{
    /// Creates an instance from the upper triangle.
    pub fn new(q00: F, q01: F, q11: F) -> Self
    {
        QuadForm { q00, q01, q11 }
    }

    /// Dense row-major array.
    pub fn to_array(&self) -> [[F; 2]; 2]
    {
        [
            [self.q00, self.q01],
            [self.q01, self.q11],
        ]
    }

    /// Determinant.
    pub fn det(&self) -> F
    {
        self.q00 * self.q11 - self.q01 * self.q01
    }

    /// Checks positive semi-definiteness with tolerance `eps`.
    pub fn is_psd(&self, eps: F) -> bool
    {
        self.q00 >= -eps && self.q11 >= -eps && self.det() >= -eps
    }

    /// Evaluates \\(a^T Q a\\) by the full contraction \\(\sum_{i,j} a_i Q_{ij} a_j\\).
    pub fn value(&self, a: &[F; 2]) -> F
    {
        let q = self.to_array();

        let mut sum = F::zero();
        for (i, q_i) in q.iter().enumerate() {
            for (j, q_ij) in q_i.iter().enumerate() {
                sum = sum + a[i] * *q_ij * a[j];
            }
        }
        sum
    }

    /// Embeds the form into a symmetric packed matrix of size `n`.
    ///
    /// Returns the [`MatBuild`] of [`MatType::SymPack`] scaled by `alpha`,
    /// with the form placed at rows and columns `i0`, `i1`.
    /// If `i0 == i1`, both action components are the same variable
    /// and the form folds into the single diagonal entry \(q_{00} + 2 q_{01} + q_{11}\).
    pub fn to_sympack<L>(&self, n: usize, (i0, i1): (usize, usize), alpha: F) -> MatBuild<L>
    where L: LinAlgEx<F=F>
    {
        let mut sym = MatBuild::new(MatType::SymPack(n));
        if i0 == i1 {
            sym[(i0, i0)] = alpha * (self.q00 + self.q01 + self.q01 + self.q11);
        }
        else {
            sym[(i0, i0)] = alpha * self.q00;
            sym[(i0, i1)] = alpha * self.q01;
            sym[(i1, i1)] = alpha * self.q11;
        }
        sym
    }
}

//

#[test]
fn test_quadform1()
{
    use float_eq::assert_float_eq;
    use totsu_core::FloatGeneric;

    type L = FloatGeneric<f64>;

    let q = QuadForm::new(4., 2., 1.);

    assert_float_eq!(q.det(), 0., abs <= 1e-15);
    assert!(q.is_psd(0.));
    assert_float_eq!(q.value(&[1., -1.]), 1., abs <= 1e-15);
    assert_float_eq!(q.value(&[1., 1.]), 9., abs <= 1e-15);

    let sym = q.to_sympack::<L>(3, (2, 0), 2.);
    assert_float_eq!(sym[(0, 0)], 2., abs <= 0.);
    assert_float_eq!(sym[(2, 2)], 8., abs <= 0.);
    assert_float_eq!(sym[(0, 2)], 4., abs <= 0.);
    assert_float_eq!(sym[(1, 1)], 0., abs <= 0.);

    assert!(!QuadForm::new(1., 2., 1.).is_psd(1e-12));

    // same variable twice: a^T Q a with a = (v, v)
    let sym = q.to_sympack::<L>(2, (1, 1), 2.);
    assert_float_eq!(sym[(1, 1)], 2. * 9., abs <= 0.);
    assert_float_eq!(sym[(0, 0)], 0., abs <= 0.);
    assert_float_eq!(sym[(0, 1)], 0., abs <= 0.);
}
