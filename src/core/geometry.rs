//! # Geometry
//!
//! Derived cell geometry for a spherical-polar grid.
//!
//! Every derived array is computed in closed form from the walls:
//!
//! ```text
//! V      = (r2^3 - r1^3) / 3 * (cos t1 - cos t2) * (p2 - p1)
//! A_r    = r^2 * (cos t1 - cos t2) * (p2 - p1)          at r1, r2
//! A_t    = 0.5 * (r2^2 - r1^2) * sin(t) * (p2 - p1)     at t1, t2
//! A_p    = 0.5 * (r2^2 - r1^2) * (t2 - t1)              both p faces
//! S_r    = r2 - r1
//! S_t    = r * (t2 - t1)
//! S_p    = r * sin(t) * (p2 - p1)
//! ```
//!
//! All arithmetic is elementwise; nothing is summed across cells, so the
//! result does not depend on evaluation order.

use ndarray::{s, Array1, Array3, Array4, ArrayView3};

use super::broadcast::meshgrid;
use super::error::Axis;
use super::walls::{GridShape, Walls};

/// Cell faces, in the order they are stacked in [`Geometry::areas`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    RMin = 0,
    RMax = 1,
    TMin = 2,
    TMax = 3,
    PMin = 4,
    PMax = 5,
}

impl Face {
    /// All faces in storage order
    pub const ALL: [Face; 6] = [
        Face::RMin,
        Face::RMax,
        Face::TMin,
        Face::TMax,
        Face::PMin,
        Face::PMax,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

fn direction_index(axis: Axis) -> usize {
    match axis {
        Axis::Radial => 0,
        Axis::Polar => 1,
        Axis::Azimuthal => 2,
    }
}

/// All geometric state derived from one set of walls
#[derive(Debug, Clone)]
pub struct Geometry {
    walls: Walls,
    shape: GridShape,

    r: Array1<f64>,
    t: Array1<f64>,
    p: Array1<f64>,

    gr: Array3<f64>,
    gt: Array3<f64>,
    gp: Array3<f64>,
    gz: Array3<f64>,
    gw: Array3<f64>,

    volumes: Array3<f64>,
    areas: Array4<f64>,
    widths: Array4<f64>,
}

impl Geometry {
    /// Derive centres, volumes, areas and widths from validated walls
    pub fn new(walls: Walls) -> Self {
        let shape = walls.shape();
        let (r_wall, t_wall, p_wall) = (walls.r(), walls.t(), walls.p());

        let r = radial_centres(r_wall);
        let t = midpoints(t_wall);
        let p = midpoints(p_wall);

        let (gr, gt, gp) = meshgrid(r.view(), t.view(), p.view());

        // Cylindrical projection of the centres
        let gz = &gr * &gt.mapv(f64::cos);
        let gw = &gr * &gt.mapv(f64::sin);

        let (gr_min, gt_min, gp_min) = meshgrid(
            r_wall.slice(s![..-1]),
            t_wall.slice(s![..-1]),
            p_wall.slice(s![..-1]),
        );
        let (gr_max, gt_max, gp_max) = meshgrid(
            r_wall.slice(s![1..]),
            t_wall.slice(s![1..]),
            p_wall.slice(s![1..]),
        );

        let dr = &gr_max - &gr_min;
        let dr2 = gr_max.mapv(|x| x * x) - gr_min.mapv(|x| x * x);
        let dr3 = gr_max.mapv(|x| x.powi(3)) - gr_min.mapv(|x| x.powi(3));
        let dt = &gt_max - &gt_min;
        let dcost = gt_min.mapv(f64::cos) - gt_max.mapv(f64::cos);
        let dp = &gp_max - &gp_min;

        let volumes = &dr3 * &dcost * &dp / 3.0;

        let (np, nt, nr) = shape.dims();

        let mut areas = Array4::zeros((6, np, nt, nr));
        let half_dr2 = dr2.mapv(|x| 0.5 * x);
        let p_face = &half_dr2 * &dt;
        let faces = [
            gr_min.mapv(|x| x * x) * &dcost * &dp,
            gr_max.mapv(|x| x * x) * &dcost * &dp,
            &half_dr2 * &gt_min.mapv(f64::sin) * &dp,
            &half_dr2 * &gt_max.mapv(f64::sin) * &dp,
            p_face.clone(),
            p_face,
        ];
        for (face, values) in Face::ALL.iter().zip(faces.iter()) {
            areas
                .index_axis_mut(ndarray::Axis(0), face.index())
                .assign(values);
        }

        let mut widths = Array4::zeros((3, np, nt, nr));
        widths.index_axis_mut(ndarray::Axis(0), 0).assign(&dr);
        widths
            .index_axis_mut(ndarray::Axis(0), 1)
            .assign(&(&gr * &dt));
        widths
            .index_axis_mut(ndarray::Axis(0), 2)
            .assign(&(&gr * &gt.mapv(f64::sin) * &dp));

        log::debug!(
            "derived spherical-polar geometry: np={} nt={} nr={}",
            np,
            nt,
            nr
        );

        Self {
            walls,
            shape,
            r,
            t,
            p,
            gr,
            gt,
            gp,
            gz,
            gw,
            volumes,
            areas,
            widths,
        }
    }

    /// Walls the geometry was derived from
    pub fn walls(&self) -> &Walls {
        &self.walls
    }

    /// Cell counts `(np, nt, nr)`
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Radial cell centres (geometric mean of adjacent walls)
    pub fn r(&self) -> &Array1<f64> {
        &self.r
    }

    /// Polar cell centres
    pub fn t(&self) -> &Array1<f64> {
        &self.t
    }

    /// Azimuthal cell centres
    pub fn p(&self) -> &Array1<f64> {
        &self.p
    }

    /// Radial centre of each cell, broadcast to `(np, nt, nr)`
    pub fn gr(&self) -> &Array3<f64> {
        &self.gr
    }

    /// Polar centre of each cell, broadcast to `(np, nt, nr)`
    pub fn gt(&self) -> &Array3<f64> {
        &self.gt
    }

    /// Azimuthal centre of each cell, broadcast to `(np, nt, nr)`
    pub fn gp(&self) -> &Array3<f64> {
        &self.gp
    }

    /// Cylindrical height `r cos(t)` of each centre
    pub fn gz(&self) -> &Array3<f64> {
        &self.gz
    }

    /// Cylindrical radius `r sin(t)` of each centre
    pub fn gw(&self) -> &Array3<f64> {
        &self.gw
    }

    /// Cell volumes, shape `(np, nt, nr)`
    pub fn volumes(&self) -> &Array3<f64> {
        &self.volumes
    }

    /// Face areas, shape `(6, np, nt, nr)`, ordered as [`Face::ALL`]
    pub fn areas(&self) -> &Array4<f64> {
        &self.areas
    }

    /// Areas of one face of every cell
    pub fn area(&self, face: Face) -> ArrayView3<'_, f64> {
        self.areas.index_axis(ndarray::Axis(0), face.index())
    }

    /// Cell widths, shape `(3, np, nt, nr)`, ordered radial, polar, azimuthal
    pub fn widths(&self) -> &Array4<f64> {
        &self.widths
    }

    /// Widths of every cell along one direction
    pub fn width(&self, axis: Axis) -> ArrayView3<'_, f64> {
        self.widths
            .index_axis(ndarray::Axis(0), direction_index(axis))
    }
}

/// Geometric mean of adjacent radial walls
///
/// A zero innermost wall would give a zero-width log; that cell uses
/// half the next wall instead.
fn radial_centres(r_wall: &Array1<f64>) -> Array1<f64> {
    let n = r_wall.len() - 1;
    Array1::from_shape_fn(n, |i| {
        if i == 0 && r_wall[0] == 0.0 {
            r_wall[1] / 2.0
        } else {
            10f64.powf((r_wall[i].log10() + r_wall[i + 1].log10()) / 2.0)
        }
    })
}

fn midpoints(wall: &Array1<f64>) -> Array1<f64> {
    let n = wall.len() - 1;
    Array1::from_shape_fn(n, |i| (wall[i] + wall[i + 1]) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::Rng;
    use std::f64::consts::PI;

    fn sphere_geometry() -> Geometry {
        let walls = Walls::new(
            vec![0.0, 1.0, 2.0],
            vec![0.0, PI / 2.0, PI],
            vec![0.0, PI, 2.0 * PI],
        )
        .unwrap();
        Geometry::new(walls)
    }

    fn random_walls(rng: &mut impl Rng, n: usize, start: f64) -> Vec<f64> {
        let mut walls = vec![start];
        for _ in 0..n {
            let last = *walls.last().unwrap();
            walls.push(last + rng.gen_range(0.01..1.0));
        }
        walls
    }

    #[test]
    fn test_geometry_shapes() {
        let walls = Walls::new(
            vec![1.0, 2.0, 3.0, 4.0],
            vec![0.0, 0.5, 1.0],
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        let geo = Geometry::new(walls);

        assert_eq!(geo.shape(), GridShape { np: 4, nt: 2, nr: 3 });
        assert_eq!(geo.r().len(), 3);
        assert_eq!(geo.t().len(), 2);
        assert_eq!(geo.p().len(), 4);
        assert_eq!(geo.gr().dim(), (4, 2, 3));
        assert_eq!(geo.gz().dim(), (4, 2, 3));
        assert_eq!(geo.volumes().dim(), (4, 2, 3));
        assert_eq!(geo.areas().dim(), (6, 4, 2, 3));
        assert_eq!(geo.widths().dim(), (3, 4, 2, 3));
    }

    #[test]
    fn test_full_sphere_volume() {
        let geo = sphere_geometry();

        assert_eq!(geo.shape().dims(), (2, 2, 2));
        assert_relative_eq!(geo.volumes().sum(), 4.0 / 3.0 * PI * 8.0, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_inner_wall_centre() {
        let geo = sphere_geometry();

        assert_eq!(geo.r()[0], 0.5);
        assert!(geo.r().iter().all(|x| x.is_finite()));
        assert_relative_eq!(geo.r()[1], 2f64.sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn test_centres() {
        let walls = Walls::new(vec![1.0, 100.0], vec![0.0, 1.0], vec![2.0, 4.0]).unwrap();
        let geo = Geometry::new(walls);

        assert_relative_eq!(geo.r()[0], 10.0, max_relative = 1e-12);
        assert_eq!(geo.t()[0], 0.5);
        assert_eq!(geo.p()[0], 3.0);
    }

    #[test]
    fn test_cylindrical_projection() {
        let geo = sphere_geometry();

        for ((z, w), (r, t)) in geo
            .gz()
            .iter()
            .zip(geo.gw().iter())
            .zip(geo.gr().iter().zip(geo.gt().iter()))
        {
            assert_relative_eq!(z * z + w * w, r * r, max_relative = 1e-12);
            assert_relative_eq!(*w, r * t.sin(), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_random_sector_volume_sums_to_closed_form() {
        let mut rng = rand::thread_rng();

        for _ in 0..10 {
            let r_wall = random_walls(&mut rng, 7, 0.0);
            let mut t_wall = random_walls(&mut rng, 5, 0.1);
            let t_scale = (PI - 0.2) / t_wall.last().unwrap();
            t_wall.iter_mut().for_each(|t| *t *= t_scale);
            let p_wall = random_walls(&mut rng, 6, 0.0);

            let (r1, r2) = (r_wall[0], *r_wall.last().unwrap());
            let (t1, t2) = (t_wall[0], *t_wall.last().unwrap());
            let (p1, p2) = (p_wall[0], *p_wall.last().unwrap());
            let expected = (r2.powi(3) - r1.powi(3)) / 3.0 * (t1.cos() - t2.cos()) * (p2 - p1);

            let geo = Geometry::new(Walls::new(r_wall, t_wall, p_wall).unwrap());

            assert_relative_eq!(geo.volumes().sum(), expected, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_face_areas_of_hemisphere_cell() {
        // One cell: r in [1, 2], t in [0, pi/2], p in [0, 2pi]
        let walls = Walls::new(vec![1.0, 2.0], vec![0.0, PI / 2.0], vec![0.0, 2.0 * PI]).unwrap();
        let geo = Geometry::new(walls);

        assert_relative_eq!(geo.area(Face::RMin)[[0, 0, 0]], 2.0 * PI, max_relative = 1e-12);
        assert_relative_eq!(geo.area(Face::RMax)[[0, 0, 0]], 8.0 * PI, max_relative = 1e-12);
        assert!(geo.area(Face::TMin)[[0, 0, 0]].abs() < 1e-12);
        // Equatorial annulus between r = 1 and r = 2
        assert_relative_eq!(geo.area(Face::TMax)[[0, 0, 0]], 3.0 * PI, max_relative = 1e-12);
        assert_relative_eq!(geo.area(Face::PMin)[[0, 0, 0]], 0.75 * PI, max_relative = 1e-12);
        assert_eq!(geo.area(Face::PMin), geo.area(Face::PMax));
    }

    #[test]
    fn test_widths() {
        let walls = Walls::new(vec![1.0, 4.0], vec![0.5, 1.5], vec![0.0, 0.25]).unwrap();
        let geo = Geometry::new(walls);

        let r = geo.r()[0];
        assert_relative_eq!(r, 2.0, max_relative = 1e-12);
        assert_eq!(geo.width(Axis::Radial)[[0, 0, 0]], 3.0);
        assert_relative_eq!(geo.width(Axis::Polar)[[0, 0, 0]], r * 1.0, max_relative = 1e-12);
        assert_relative_eq!(
            geo.width(Axis::Azimuthal)[[0, 0, 0]],
            r * 1.0f64.sin() * 0.25,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_elementwise_matches_per_cell_loop() {
        let walls = Walls::new(
            vec![0.5, 1.0, 1.7, 3.0],
            vec![0.1, 0.9, 2.0],
            vec![0.0, 0.3, 1.1],
        )
        .unwrap();
        let geo = Geometry::new(walls.clone());

        for ((k, j, i), v) in geo.volumes().indexed_iter() {
            let (r1, r2) = (walls.r()[i], walls.r()[i + 1]);
            let (t1, t2) = (walls.t()[j], walls.t()[j + 1]);
            let (p1, p2) = (walls.p()[k], walls.p()[k + 1]);
            let expected = (r2.powi(3) - r1.powi(3)) * (t1.cos() - t2.cos()) * (p2 - p1) / 3.0;
            assert_eq!(*v, expected);
        }
    }
}
