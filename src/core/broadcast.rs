//! Outer-product expansion of per-axis values onto the 3-D cell lattice.
//!
//! Arrays are indexed `[p, t, r]`, so the radial axis varies fastest.

use ndarray::{Array3, ArrayView1};

/// Expand `r`, `t`, `p` to three `(p.len(), t.len(), r.len())` fields
///
/// `gr[[k, j, i]] == r[i]`, `gt[[k, j, i]] == t[j]`, `gp[[k, j, i]] == p[k]`.
pub fn meshgrid(
    r: ArrayView1<'_, f64>,
    t: ArrayView1<'_, f64>,
    p: ArrayView1<'_, f64>,
) -> (Array3<f64>, Array3<f64>, Array3<f64>) {
    let shape = (p.len(), t.len(), r.len());

    let gr = Array3::from_shape_fn(shape, |(_, _, i)| r[i]);
    let gt = Array3::from_shape_fn(shape, |(_, j, _)| t[j]);
    let gp = Array3::from_shape_fn(shape, |(k, _, _)| p[k]);

    (gr, gt, gp)
}
