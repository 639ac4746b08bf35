use float_eq::assert_float_eq;
use totsu_actcons::prelude::*;
use totsu_actcons::*;

type La = FloatGeneric<f64>;

//

const STATES: [[f64; 9]; 16] = [
    [1.8320e-01, -1.5764e-01, -3.7405e-02, 1.0267e-02, 5.1187e-01, -8.5906e-01, -4.5078e-01, 1.5164e-01, 8.1063e-01],
    [-1.2841e-01, -1.0619e-01, 5.6862e-02, -6.6311e-02, 8.9963e-02, -9.9595e-01, -1.0231e-01, -3.3542e-01, -3.3383e-01],
    [-9.6614e-02, 1.2436e-01, -8.8864e-02, -2.5948e-02, -8.8712e-01, 4.6154e-01, 1.6002e-01, -8.9188e-03, -3.7412e-01],
    [1.4109e-01, 4.5607e-02, -1.0881e-01, 2.2218e-02, -6.8323e-01, 7.3020e-01, -8.2575e-01, -7.5437e-01, 9.2613e-01],
    [1.3156e-01, 1.1313e-01, -2.3143e-02, 8.6857e-03, 2.8196e-02, 9.9960e-01, -1.3445e-01, -4.4995e-01, 9.2404e-02],
    [2.3610e-01, 2.7571e-02, -1.5175e-01, 4.3976e-02, -1.9267e-01, 9.8126e-01, -2.0409e-01, -6.7312e-01, 9.9564e-02],
    [9.5906e-02, -7.2765e-02, -1.8310e-01, 1.1592e-01, -7.9309e-01, -6.0911e-01, -4.1237e-01, -7.7382e-01, -8.4190e-01],
    [-2.6493e-02, -1.1129e-01, -9.7531e-02, 2.8042e-01, -5.3531e-01, 8.4466e-01, -8.9416e-02, 4.6762e-02, 2.3578e-01],
    [5.2737e-02, -1.6635e-01, 6.7426e-02, 2.9614e-01, 2.0968e-01, 9.7777e-01, -3.9352e-01, -3.8360e-01, -6.4619e-02],
    [4.1588e-02, -9.6503e-02, -1.0680e-01, 4.2423e-02, 3.3904e-01, -9.4077e-01, -2.5552e-01, -7.7012e-01, 3.5925e-02],
    [-1.9536e-01, -1.0919e-01, 2.3155e-01, 4.2231e-02, -7.3762e-01, -6.7522e-01, 4.2337e-03, 8.1003e-01, 1.4798e-01],
    [-1.7193e-01, 2.6708e-01, 1.2781e-01, -1.5978e-01, 6.0622e-01, 7.9529e-01, 1.0703e-01, 6.4415e-01, -2.5370e-01],
    [2.1081e-01, 1.8435e-01, -3.6944e-02, -6.6586e-02, 8.3082e-01, 5.5654e-01, 1.1817e-02, -4.0813e-04, -8.9231e-02],
    [-2.2798e-01, 2.6716e-02, 2.2169e-01, -1.4165e-02, -3.5069e-01, -9.3649e-01, 1.9723e-02, -1.0159e+00, 0.0000e+00],
    [1.4427e-01, 1.2218e-01, 1.6949e-02, -1.1593e-04, 9.3954e-01, 3.4243e-01, -7.1718e-02, 1.8670e-01, 8.1036e-02],
    [2.4308e-01, 1.5988e-01, -7.6241e-02, -5.8548e-02, 9.8955e-01, 1.4416e-01, -2.4803e-02, 2.5290e-01, 1.4468e-02],
];

const ACTIONS: [[f64; 2]; 16] = [
    [1.1877, -2.3243],
    [1.7959, -4.3229],
    [0.7542, -1.9867],
    [0.9488, -1.2668],
    [0.3369, -0.3681],
    [-1.5717, 2.3981],
    [2.3537, -2.5683],
    [-1.5644, 3.7083],
    [0.7733, -1.5146],
    [4.5917, -8.2694],
    [-0.1183, -1.0292],
    [1.2631, -2.6133],
    [-0.5344, 1.4256],
    [-2.9314, 5.5788],
    [0.4514, -1.0473],
    [0.3028, -0.6701],
];

fn flat<const N: usize>(rows: &[[f64; N]]) -> Vec<f64>
{
    rows.iter().flatten().copied().collect()
}

fn expanded(a: &[f64; 2], theta: f64) -> f64
{
    let (a0, a1) = (a[0], a[1]);
    a0 * a0 + (a0 + a1) * (a0 + a1) + 2. * a0 * (a0 + a1) * theta.cos()
}

fn state_with_angle(theta: f64) -> [f64; 9]
{
    let mut s = [0.; 9];
    s[TIP_ANGLE_INDEX] = theta;
    s
}

//

#[test]
fn test_tip_scenario1()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let tip = TipConstraint::new(0.05).unwrap();
    let state = state_with_angle(0.);
    let action = [1., -1.];

    let q = tip.quad_form(&state).unwrap();
    assert_eq!(q.to_array(), [[4., 2.], [2., 1.]]);

    let value = tip.quad_values(&state, &action).unwrap();
    assert_float_eq!(value[0], 1., abs <= 1e-12);

    let scale = tip.scale_factors(&state, &action).unwrap();
    assert_float_eq!(scale[0], 4.4721, abs <= 1e-4);
    assert_float_eq!(scale[0], ((1. + 1e-9) / 0.05_f64).sqrt(), r2nd <= 1e-12);

    assert!(!tip.is_satisfied(&state, &action).unwrap());
    assert!(tip.is_satisfied(&state, &[0.1, -0.1]).unwrap());
}

#[test]
fn test_tip_scenario2()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let tip = TipConstraint::new(0.05).unwrap();
    let theta = core::f64::consts::FRAC_PI_2;
    let state = state_with_angle(theta);
    let action = [1., 1.];

    let q = tip.quad_form(&state).unwrap();
    assert_float_eq!(q.q00, 2., abs <= 1e-12);
    assert_float_eq!(q.q01, 1., abs <= 1e-12);
    assert_float_eq!(q.q11, 1., abs <= 1e-12);

    let value = tip.quad_values(&state, &action).unwrap();
    assert_float_eq!(value[0], expanded(&action, theta), r2nd <= 1e-12);
    assert_float_eq!(value[0], 5., abs <= 1e-12);
}

#[test]
fn test_tip_psd()
{
    let tip = TipConstraint::new(1.).unwrap();

    let thetas: Vec<f64> = (-400..= 400).map(|i| i as f64 * 0.0314159).collect();
    let states: Vec<f64> = thetas.iter().flat_map(|&th| state_with_angle(th)).collect();

    let forms = tip.quad_forms(&states).unwrap();
    assert_eq!(forms.len(), thetas.len());

    for (q, th) in forms.iter().zip(&thetas) {
        assert!(q.q00 >= 0.);
        assert!(q.q11 >= 0.);
        assert!(q.det() >= -1e-12);
        assert!(q.is_psd(1e-12));
        assert_float_eq!(q.det(), th.sin().powi(2), abs <= 1e-12);
    }
}

#[test]
fn test_tip_table()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let tip = TipConstraint::new(0.05).unwrap();
    let states = flat(&STATES);
    let actions = flat(&ACTIONS);

    let forms = tip.quad_forms(&states).unwrap();
    let values = tip.quad_values(&states, &actions).unwrap();
    let scales = tip.scale_factors(&states, &actions).unwrap();
    assert_eq!(values.len(), STATES.len());
    assert_eq!(scales.len(), STATES.len());

    for i in 0.. STATES.len() {
        let theta = STATES[i][TIP_ANGLE_INDEX];
        let ref_value = expanded(&ACTIONS[i], theta);

        assert_float_eq!(values[i], ref_value, r2nd <= 1e-9);
        assert_float_eq!(forms[i].value(&ACTIONS[i]), ref_value, r2nd <= 1e-9);

        assert!(scales[i].is_finite());
        assert!(scales[i] >= 0.);
        assert_float_eq!(scales[i] * scales[i] * 0.05, values[i] + 1e-9, r2nd <= 1e-9);
    }

    // first sample of the table is feasible, the second is not
    assert!(scales[0] <= 1.);
    assert!(scales[1] > 1.);
}

#[test]
fn test_tip_series_bound()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let half = core::f64::consts::FRAC_PI_2;
    for i in -100..= 100 {
        let th = half * i as f64 / 100.;
        assert!(cos_series_error(th) <= 1e-6, "theta {}", th);
    }

    let pi = core::f64::consts::PI;
    let errs: Vec<f64> = [half, pi, 1.5 * pi, 2. * pi, 3. * pi].iter()
        .map(|&th| cos_series_error(th))
        .collect();
    for (th, e) in ["pi/2", "pi", "3pi/2", "2pi", "3pi"].iter().zip(&errs) {
        log::info!("cos series error at {}: {:.3e}", th, e);
    }

    for w in errs.windows(2) {
        assert!(w[0] < w[1]);
    }
    assert!(errs[1] < 1e-3);
    assert!(errs[3] > 1.);
}

#[test]
fn test_tip_builder_consistency()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let exact = TipConstraint::new(0.05).unwrap().par(|p| {p.cos_approx = CosApprox::Exact});
    let series = TipConstraint::new(0.05).unwrap();
    let x = Vars::new(2);

    for (state, action) in STATES.iter().zip(&ACTIONS) {
        let mut coll: Vec<QuadConstr<f64>> = Vec::new();
        exact.program_constraints(&mut coll, &x, state).unwrap();
        assert_eq!(coll.len(), 1);
        let prog = coll[0].slack(action);

        let cons = exact.convex_constraints::<La>(&x, state).unwrap();
        assert_eq!(cons.len(), 1);
        assert_float_eq!(cons[0].eval(action), prog, abs <= 1e-12);

        let value = exact.quad_values(state, action).unwrap()[0];
        assert_float_eq!(prog, value - 0.05, abs <= 1e-12);

        // all angles of the table are within the trusted series range
        let cons = series.convex_constraints::<La>(&x, state).unwrap();
        assert_float_eq!(cons[0].eval(action), prog, abs <= 1e-6);
    }
}

#[test]
fn test_tip_builder_vars()
{
    let tip = TipConstraint::new(0.05).unwrap().par(|p| {p.cos_approx = CosApprox::Exact});
    let state = STATES[3];
    let action = ACTIONS[3];

    // a0 at x[3], a1 at x[1] in a problem of 4 variables
    let x = Vars::with_indices(4, &[3, 1]).unwrap();
    let pt = [7., action[1], -2., action[0]];

    let cons = tip.convex_constraints::<La>(&x, &state).unwrap();
    assert_eq!(cons[0].n(), 4);
    assert_float_eq!(cons[0].eval(&pt), expanded(&action, state[TIP_ANGLE_INDEX]) - 0.05, abs <= 1e-12);

    let mut coll = QcqpBuilder::<La>::new(4);
    tip.program_constraints(&mut coll, &x, &state).unwrap();
    assert_float_eq!(coll.constrs()[0].eval(&pt), cons[0].eval(&pt), abs <= 1e-12);

    let x3 = Vars::new(3);
    assert_eq!(
        tip.convex_constraints::<La>(&x3, &state).err(),
        Some(ConstraintError::DimMismatch { expected: 2, actual: 3 })
    );
}

#[test]
fn test_tip_builder_same_var()
{
    let tip = TipConstraint::new(0.05).unwrap().par(|p| {p.cos_approx = CosApprox::Exact});
    let state = STATES[5];

    // both action components on x[1]
    let x = Vars::with_indices(2, &[1, 1]).unwrap();
    let pt = [-3., 0.7];

    let cons = tip.convex_constraints::<La>(&x, &state).unwrap();
    assert_eq!(cons.len(), 1);

    let mut coll: Vec<QuadConstr<f64>> = Vec::new();
    tip.program_constraints(&mut coll, &x, &state).unwrap();
    assert_float_eq!(cons[0].eval(&pt), coll[0].slack(&pt), abs <= 1e-12);

    let value = tip.quad_values(&state, &[0.7, 0.7]).unwrap()[0];
    assert_float_eq!(cons[0].eval(&pt), value - 0.05, abs <= 1e-12);
}

#[test]
fn test_tip_series_beyond_range()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let tip = TipConstraint::new(0.05).unwrap();
    let x = Vars::new(2);
    let state = state_with_angle(2. * core::f64::consts::PI);

    // built anyway, though the series coefficient has left [-1, 1]
    let cons = tip.convex_constraints::<La>(&x, &state).unwrap();
    assert_eq!(cons.len(), 1);

    let cosg = cos_maclaurin(2. * core::f64::consts::PI, COS_SERIES_DEGREE);
    assert!(cosg > 1.);
    assert!(!TipConstraint::form_of(cosg).is_psd(0.));
    assert_float_eq!(cons[0].sym_p[(0, 0)], 2. * (2. + 2. * cosg), r2nd <= 1e-12);
}

//

#[derive(Debug, PartialEq)]
enum SinkError
{
    Full,
    Constraint(ConstraintError),
}

impl From<ConstraintError> for SinkError
{
    fn from(e: ConstraintError) -> Self
    {
        SinkError::Constraint(e)
    }
}

struct FullSink;

impl QuadConstrSink<f64> for FullSink
{
    type Error = SinkError;

    fn add_qconstr_le(&mut self, _expr: QuadExpr<f64>, _rhs: f64) -> Result<(), Self::Error>
    {
        Err(SinkError::Full)
    }
}

#[test]
fn test_tip_sink_error()
{
    let tip = TipConstraint::new(0.05).unwrap();
    let x = Vars::new(2);

    let r = tip.program_constraints(&mut FullSink, &x, &STATES[0]);
    assert_eq!(r, Err(SinkError::Full));

    let r = tip.program_constraints(&mut FullSink, &x, &STATES[0][0..8]);
    assert_eq!(r, Err(SinkError::Constraint(ConstraintError::DimMismatch { expected: 9, actual: 8 })));
}

#[test]
fn test_tip_dims()
{
    let tip = TipConstraint::new(0.05).unwrap();
    let states = flat(&STATES[0..2]);

    assert_eq!(
        tip.quad_values(&states, &[0.; 2]),
        Err(ConstraintError::DimMismatch { expected: 4, actual: 2 })
    );
    assert_eq!(
        tip.quad_forms(&states[1..]),
        Err(ConstraintError::DimMismatch { expected: 9, actual: 17 })
    );
    assert_eq!(
        tip.quad_values(&states, &[0., 1., f64::NAN, 0.]),
        Err(ConstraintError::NonFinite { index: 2 })
    );
    assert_eq!(TipConstraint::new(-1.).err(), Some(ConstraintError::InvalidBound));

    assert_eq!(tip.quad_forms(&[]), Ok(vec![]));
}
