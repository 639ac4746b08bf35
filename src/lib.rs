/*!
State-dependent quadratic action constraints for [`totsu`].

<script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
<script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>

This crate limits a 2-dimensional action \\(a\\) of a control policy by
\\[
a^T Q(s) a \le M,
\\]
where the symmetric positive semi-definite \\(Q(s)\\) depends on a state \\(s\\).
The constraint is provided in three consistent forms:
* numeric \\(Q(s)\\) for a batch of states - [`ActionConstraint::quad_forms`],
  with [`ActionConstraint::quad_values`] and [`ActionConstraint::scale_factors`] on top of it;
* QCQP inequalities over decision variables, fed to [`totsu::ProbQCQP`] via [`QcqpBuilder`] -
  [`ActionConstraint::convex_constraints`];
* scalar quadratic expressions registered into any [`QuadConstrSink`] -
  [`ActionConstraint::program_constraints`].

The crate itself neither solves nor projects.

# General usage

1. Construct a constraint such as [`TipConstraint`] with the bound \\(M\\),
   and optionally set its [`ConstraintParam`] tuning knobs by `par`.
1. Lay out states and actions as flat row-major slices.
1. Evaluate numerically, or build constraints over [`Vars`] for a convex program
   or for your own collection of quadratic inequalities.

# Examples

```
use float_eq::assert_float_eq;
use totsu_actcons::prelude::*;
use totsu_actcons::*;

//env_logger::init(); // Use any logger crate as `totsu_actcons` uses `log` crate.

type La = FloatGeneric<f64>;

let tip = TipConstraint::new(0.05).unwrap();

// two states of 9 coordinates, the angle at index 7
let mut states = [0.; 18];
states[9 + TIP_ANGLE_INDEX] = core::f64::consts::FRAC_PI_2;
let actions = [1., -1., 1., 1.];

let forms = tip.quad_forms(&states).unwrap();
assert_eq!(forms[0].to_array(), [[4., 2.], [2., 1.]]);

let values = tip.quad_values(&states, &actions).unwrap();
assert_float_eq!(values[0], 1., abs <= 1e-12);
assert_float_eq!(values[1], 5., abs <= 1e-12);

let scales = tip.scale_factors(&states, &actions).unwrap();
assert_float_eq!(scales[0], 20_f64.sqrt(), abs <= 1e-6);

// as a QCQP inequality over x = (a0, a1)
let x = Vars::new(2);
let cons = tip.convex_constraints::<La>(&x, &states[0..9]).unwrap();
assert_eq!(cons.len(), 1);
assert_float_eq!(cons[0].eval(&[1., -1.]), 1. - 0.05, abs <= 1e-12);
```

## Other examples

You can find other tests of the constraints in `tests/`.
*/

mod constr_error;

pub use constr_error::*;

//

mod param;

pub use param::{ConstraintParam, CosApprox};

//

mod series;

pub use series::*;

//

mod quadform;

pub use quadform::*;

//

mod expr;

pub use expr::*;

//

mod qcqp;

pub use qcqp::*;

//

mod constraint;

pub use constraint::*;

//

/// Prelude
pub mod prelude
{
   pub use totsu::prelude::{Solver, SolverError, SolverParam, FloatGeneric, MatType};
   pub use crate::ActionConstraint;
}
