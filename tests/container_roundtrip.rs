//! End-to-end grid persistence through on-disk containers.

use std::f64::consts::PI;

use approx::assert_relative_eq;
use ndarray::Array3;
use rand::Rng;
use sph_grid::{
    fingerprint, Container, CopyPolicy, DeferredReference, GridError, MemoryContainer,
    QuantitySelector, SphericalPolarGrid, WriteOptions,
};

fn increasing(rng: &mut impl Rng, n: usize, start: f64, end: f64) -> Vec<f64> {
    let steps: Vec<f64> = (0..n).map(|_| rng.gen_range(0.1..1.0)).collect();
    let total: f64 = steps.iter().sum();
    let mut walls = vec![start];
    let mut acc = 0.0;
    for step in &steps[..n - 1] {
        acc += step;
        walls.push(start + (end - start) * acc / total);
    }
    walls.push(end);
    walls
}

fn random_grid(rng: &mut impl Rng) -> SphericalPolarGrid {
    let nr = rng.gen_range(1..8);
    let nt = rng.gen_range(1..6);
    let np = rng.gen_range(1..5);

    SphericalPolarGrid::from_walls(
        increasing(rng, nr, 0.0, 10.0),
        increasing(rng, nt, 0.0, PI),
        increasing(rng, np, 0.0, 2.0 * PI),
    )
    .unwrap()
}

#[test]
fn test_file_roundtrip_preserves_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.json");
    let mut rng = rand::thread_rng();

    let mut grid = random_grid(&mut rng);
    let shape = grid.shape().unwrap();
    let density = Array3::from_shape_fn(shape.dims(), |_| rng.gen::<f64>());
    grid.set_quantity("density", density).unwrap();
    grid.set_quantity(
        "specific_energy",
        vec![Array3::<f64>::zeros(shape.dims()), Array3::<f64>::ones(shape.dims())],
    )
    .unwrap();

    let mut container = MemoryContainer::new();
    grid.write(&mut container, "all", &WriteOptions::default()).unwrap();
    container.save_to_file(&path).unwrap();

    let container = MemoryContainer::load_from_file(&path).unwrap();
    let mut loaded = SphericalPolarGrid::new();
    loaded.read(&container, QuantitySelector::All).unwrap();

    assert_eq!(loaded.walls().unwrap(), grid.walls().unwrap());
    assert_eq!(loaded.r().unwrap(), grid.r().unwrap());
    assert_eq!(loaded.t().unwrap(), grid.t().unwrap());
    assert_eq!(loaded.p().unwrap(), grid.p().unwrap());
    assert_eq!(loaded.volumes().unwrap(), grid.volumes().unwrap());
    for name in ["density", "specific_energy"] {
        assert_eq!(loaded.quantity(name), grid.quantity(name));
    }
}

#[test]
fn test_random_grids_fill_their_sector() {
    let mut rng = rand::thread_rng();

    for _ in 0..20 {
        let grid = random_grid(&mut rng);
        let shape = grid.shape().unwrap();

        assert_eq!(grid.volumes().unwrap().dim(), shape.dims());
        assert_eq!(grid.areas().unwrap().dim(), shape.stacked(6));
        assert_eq!(grid.widths().unwrap().dim(), shape.stacked(3));

        // r in [0, 10], full sphere
        assert_relative_eq!(
            grid.volumes().unwrap().sum(),
            4.0 / 3.0 * PI * 1000.0,
            max_relative = 1e-9
        );
        assert!(grid.r().unwrap().iter().all(|r| r.is_finite() && *r > 0.0));
    }
}

#[test]
fn test_fingerprint_matches_grid_identity() {
    let grid = SphericalPolarGrid::from_walls(
        vec![1.0, 2.0, 4.0],
        vec![0.0, PI],
        vec![0.0, 2.0 * PI],
    )
    .unwrap();
    let walls = grid.walls().unwrap();

    assert_eq!(
        grid.geometry_id().unwrap(),
        fingerprint(walls.r(), walls.t(), walls.p())
    );
}

#[test]
fn test_tampered_wall_is_detected() {
    let grid = SphericalPolarGrid::from_walls(
        vec![1.0, 2.0, 4.0],
        vec![0.0, PI],
        vec![0.0, 2.0 * PI],
    )
    .unwrap();
    let mut container = MemoryContainer::new();
    grid.write(&mut container, "all", &WriteOptions::default()).unwrap();

    // Swap in different radial walls, keep the old fingerprint
    let other = SphericalPolarGrid::from_walls(
        vec![1.0, 3.0, 4.0],
        vec![0.0, PI],
        vec![0.0, 2.0 * PI],
    )
    .unwrap();
    let mut scratch = MemoryContainer::new();
    other.write(&mut scratch, "all", &WriteOptions::default()).unwrap();
    let walls = scratch.read_dataset("Geometry/Walls 1").unwrap();
    container
        .write_dataset("Geometry/Walls 1", walls, true)
        .unwrap();

    let result = SphericalPolarGrid::new().read(&container, "all");
    assert!(matches!(result, Err(GridError::Integrity { .. })));
}

#[test]
fn test_linked_quantity_survives_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = rand::thread_rng();

    let mut source_grid = random_grid(&mut rng);
    let shape = source_grid.shape().unwrap();
    source_grid
        .set_quantity("density", Array3::from_elem(shape.dims(), 4.0))
        .unwrap();
    let mut source = MemoryContainer::new();
    source_grid
        .write(&mut source, "all", &WriteOptions::default())
        .unwrap();
    source.save_to_file(dir.path().join("source.json")).unwrap();

    let mut grid = source_grid.clone();
    grid.remove_quantity("density");
    grid.set_quantity(
        "density",
        DeferredReference::new("source.json", "Physics/density"),
    )
    .unwrap();

    let target_path = dir.path().join("target.json");
    let mut target = MemoryContainer::new().with_origin(&target_path);
    grid.write(
        &mut target,
        "all",
        &WriteOptions::new().with_copy(CopyPolicy::Link),
    )
    .unwrap();
    target.save_to_file(&target_path).unwrap();

    let target = MemoryContainer::load_from_file(&target_path).unwrap();
    assert!(target.is_link("Physics/density"));

    let mut loaded = SphericalPolarGrid::new();
    loaded.read(&target, "all").unwrap();
    assert_eq!(loaded.quantity("density"), source_grid.quantity("density"));
}
