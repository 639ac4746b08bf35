use num_traits::Float;

//

/// Degree of the cosine series used in convex constraints.
pub const COS_SERIES_DEGREE: usize = 12;

/// Maclaurin partial sum of cosine.
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// \\[
/// \cos\theta \approx \sum_{k=0}^{\lfloor d/2 \rfloor} (-1)^k {\theta^{2k} \over (2k)!}
/// \\]
///
/// Returns the partial sum.
/// * `theta` is \\(\theta\\).
/// * `degree` is \\(d\\), the highest power kept. An odd degree is truncated to the even one below.
///
/// The sum is accurate near zero only.
/// For degree 12 the error stays below `1e-8` on \\(|\theta| \le \pi/2\\),
/// is around `1e-4` at \\(\pi\\), and grows without bound beyond.
pub fn cos_maclaurin<F: Float>(theta: F, degree: usize) -> F
{
    let f1 = F::one();
    let neg_th2 = -(theta * theta);

    let mut sum = f1;
    let mut term = f1;
    let mut fact = F::zero();

    for _ in 0.. degree / 2 {
        let a = fact + f1;
        let b = a + f1;
        fact = b;

        term = term * neg_th2 / (a * b);
        sum = sum + term;
    }

    sum
}

/// Divergence of the degree-[`COS_SERIES_DEGREE`] series from the exact cosine.
///
/// Returns `|cos_maclaurin(theta, 12) - cos(theta)|`.
pub fn cos_series_error<F: Float>(theta: F) -> F
{
    (cos_maclaurin(theta, COS_SERIES_DEGREE) - theta.cos()).abs()
}

//

#[test]
fn test_cos_maclaurin1()
{
    use float_eq::assert_float_eq;

    let th: f64 = 0.3;
    let ref_cos = 1. - th.powi(2) / 2. + th.powi(4) / 24. - th.powi(6) / 720.
                + th.powi(8) / 40320. - th.powi(10) / 3628800. + th.powi(12) / 479001600.;

    assert_float_eq!(cos_maclaurin(th, 12), ref_cos, abs <= 1e-15);
    assert_float_eq!(cos_maclaurin(th, 13), ref_cos, abs <= 1e-15);
    assert_float_eq!(cos_maclaurin(th, 0), 1., abs <= 0.);
    assert_float_eq!(cos_maclaurin(th, 2), 1. - th * th / 2., abs <= 1e-15);
}
