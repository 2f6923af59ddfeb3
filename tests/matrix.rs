use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use digitnet::{Matrix, MatrixError};

fn random_shape(rng: &mut StdRng) -> (usize, usize) {
    (rng.gen_range(1..6), rng.gen_range(1..6))
}

#[test]
fn dot_succeeds_iff_inner_dimensions_agree() {
    let mut rng = StdRng::seed_from_u64(100);
    for _ in 0..200 {
        let (r1, c1) = random_shape(&mut rng);
        let (r2, c2) = random_shape(&mut rng);
        let a = Matrix::random_normal(r1, c1, 1.0, &mut rng);
        let b = Matrix::random_normal(r2, c2, 1.0, &mut rng);
        match a.dot(&b) {
            Ok(p) => {
                assert_eq!(c1, r2);
                assert_eq!(p.shape(), (r1, c2));
            }
            Err(e) => {
                assert_ne!(c1, r2);
                assert!(matches!(e, MatrixError::Shape { op: "dot", .. }));
            }
        }
    }
}

#[test]
fn hadamard_with_ones_is_exact_identity() {
    let mut rng = StdRng::seed_from_u64(101);
    for _ in 0..50 {
        let (r, c) = random_shape(&mut rng);
        let a = Matrix::random_normal(r, c, 1e3, &mut rng);
        assert_eq!(a.hadamard(&Matrix::filled(r, c, 1.0)).unwrap(), a);
    }
}

#[test]
fn transpose_products_agree_with_explicit_transpose() {
    let mut rng = StdRng::seed_from_u64(102);
    for _ in 0..50 {
        let (shared, a_cols) = random_shape(&mut rng);
        let b_cols = rng.gen_range(1..6);
        let a = Matrix::random_normal(shared, a_cols, 1.0, &mut rng);
        let b = Matrix::random_normal(shared, b_cols, 1.0, &mut rng);

        let fast = a.mul_transpose_a(&b).unwrap();
        let slow = a.transpose().dot(&b).unwrap();
        assert_eq!(fast.shape(), (a_cols, b_cols));
        for (x, y) in fast.values().iter().zip(slow.values()) {
            assert_relative_eq!(x, y, epsilon = 1e-12);
        }

        let c = Matrix::random_normal(rng.gen_range(1..6), a_cols, 1.0, &mut rng);
        let fast = a.mul_transpose_b(&c).unwrap();
        let slow = a.dot(&c.transpose()).unwrap();
        assert_eq!(fast.shape(), (shared, c.rows()));
        for (x, y) in fast.values().iter().zip(slow.values()) {
            assert_relative_eq!(x, y, epsilon = 1e-12);
        }
    }
}

#[test]
fn vector_transpose_does_not_alias() {
    let col = Matrix::column(vec![1.0, 2.0, 3.0]);
    let mut row = col.transpose();
    row.set(0, 1, 20.0).unwrap();
    assert_eq!(col.get(1, 0).unwrap(), 2.0);
    assert_eq!(row.get(0, 1).unwrap(), 20.0);
}
