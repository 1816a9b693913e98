//! # Geometry Identity
//!
//! A content fingerprint over the wall arrays. It tags every dataset a grid
//! writes so that quantities and geometry can be matched up again on read.
//!
//! The digest is MD5 over the little-endian bytes of the r, t and p walls,
//! fed in that order, rendered as 32 lowercase hex characters.

use md5::{Digest, Md5};
use ndarray::{ArrayBase, Data, Ix1};

use super::walls::Walls;

/// Fingerprint of three raw wall arrays
pub fn fingerprint<S1, S2, S3>(
    r_wall: &ArrayBase<S1, Ix1>,
    t_wall: &ArrayBase<S2, Ix1>,
    p_wall: &ArrayBase<S3, Ix1>,
) -> String
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    S3: Data<Elem = f64>,
{
    let mut hasher = Md5::new();
    update(&mut hasher, r_wall);
    update(&mut hasher, t_wall);
    update(&mut hasher, p_wall);
    hex::encode(hasher.finalize())
}

/// Fingerprint of validated walls
pub fn geometry_id(walls: &Walls) -> String {
    fingerprint(walls.r(), walls.t(), walls.p())
}

fn update<S: Data<Elem = f64>>(hasher: &mut Md5, values: &ArrayBase<S, Ix1>) {
    for value in values.iter() {
        hasher.update(value.to_le_bytes());
    }
}
