use gemlab::mesh::{Cell, Mesh, Point};
use gemlab::shapes::GeoKind;
use russell_lab::Vector;

/// Holds sample meshes and displacement fields for tests and examples
pub struct SampleMeshes {}

impl SampleMeshes {
    #[rustfmt::skip]
    pub fn two_qua4() -> Mesh {
        //      y
        //      ^
        // 1.0  3------------4------------5
        //      |            |            |   [#] indicates id
        //      |    [0]     |    [1]     |   (#) indicates attribute
        //      |    (1)     |    (1)     |
        //      |            |            |
        // 0.0  0------------1------------2 -> x
        //     0.0          1.0          2.0
        Mesh {
            ndim: 2,
            points: vec![
                Point { id: 0, marker: 0, coords: vec![0.0, 0.0] },
                Point { id: 1, marker: 0, coords: vec![1.0, 0.0] },
                Point { id: 2, marker: 0, coords: vec![2.0, 0.0] },
                Point { id: 3, marker: 0, coords: vec![0.0, 1.0] },
                Point { id: 4, marker: 0, coords: vec![1.0, 1.0] },
                Point { id: 5, marker: 0, coords: vec![2.0, 1.0] },
            ],
            cells: vec![
                Cell { id: 0, attribute: 1, kind: GeoKind::Qua4, points: vec![0, 1, 4, 3] },
                Cell { id: 1, attribute: 1, kind: GeoKind::Qua4, points: vec![1, 2, 5, 4] },
            ],
        }
    }

    #[rustfmt::skip]
    pub fn two_tri3() -> Mesh {
        //      y
        //      ^
        // 1.0  3------------2
        //      |`.      [1] |    [#] indicates id
        //      |  `.    (1) |    (#) indicates attribute
        //      |    `.      |
        //      |      `.    |
        //      | [0]    `.  |
        //      | (1)      `.|
        // 0.0  0------------1 -> x
        //     0.0          1.0
        Mesh {
            ndim: 2,
            points: vec![
                Point { id: 0, marker: 0, coords: vec![0.0, 0.0] },
                Point { id: 1, marker: 0, coords: vec![1.0, 0.0] },
                Point { id: 2, marker: 0, coords: vec![1.0, 1.0] },
                Point { id: 3, marker: 0, coords: vec![0.0, 1.0] },
            ],
            cells: vec![
                Cell { id: 0, attribute: 1, kind: GeoKind::Tri3, points: vec![0, 1, 3] },
                Cell { id: 1, attribute: 1, kind: GeoKind::Tri3, points: vec![2, 3, 1] },
            ],
        }
    }

    #[rustfmt::skip]
    pub fn one_hex8() -> Mesh {
        //       4--------------7  1.0
        //      /.             /|
        //     / .            / |    [#] indicates id
        //    /  .           /  |    (#) indicates attribute
        //   /   .          /   |
        //  5--------------6    |          z
        //  |    .         |    |          ↑
        //  |    0---------|----3  0.0     o → y
        //  |   /  [0]     |   /          ↙
        //  |  /   (1)     |  /          x
        //  | /            | /
        //  |/             |/
        //  1--------------2   1.0
        // 0.0            1.0
        Mesh {
            ndim: 3,
            points: vec![
                Point { id: 0, marker: 0, coords: vec![0.0, 0.0, 0.0] },
                Point { id: 1, marker: 0, coords: vec![1.0, 0.0, 0.0] },
                Point { id: 2, marker: 0, coords: vec![1.0, 1.0, 0.0] },
                Point { id: 3, marker: 0, coords: vec![0.0, 1.0, 0.0] },
                Point { id: 4, marker: 0, coords: vec![0.0, 0.0, 1.0] },
                Point { id: 5, marker: 0, coords: vec![1.0, 0.0, 1.0] },
                Point { id: 6, marker: 0, coords: vec![1.0, 1.0, 1.0] },
                Point { id: 7, marker: 0, coords: vec![0.0, 1.0, 1.0] },
            ],
            cells: vec![
                Cell { id: 0, attribute: 1, kind: GeoKind::Hex8, points: vec![0,1,2,3, 4,5,6,7] },
            ],
        }
    }

    /// Returns the displacement field u = (λ - 1) X (uniform stretch)
    ///
    /// The coefficients are node-major: `u[ndim * point + k]`.
    pub fn uniform_stretch(mesh: &Mesh, stretch: f64) -> Vector {
        SampleMeshes::displacement_field(mesh, |x, u| {
            for k in 0..x.len() {
                u[k] = (stretch - 1.0) * x[k];
            }
        })
    }

    /// Returns the displacement field uₓ = γ y (simple shear)
    pub fn simple_shear(mesh: &Mesh, gamma: f64) -> Vector {
        SampleMeshes::displacement_field(mesh, |x, u| u[0] = gamma * x[1])
    }

    /// Returns a non-homogeneous displacement field with moderate strains
    pub fn distorted_field(mesh: &Mesh) -> Vector {
        SampleMeshes::displacement_field(mesh, |x, u| {
            let ndim = x.len();
            u[0] = 0.10 * x[0] + 0.05 * x[1] * x[1];
            u[1] = -0.04 * x[0] * x[1] + 0.08 * x[1];
            if ndim == 3 {
                u[0] += 0.02 * x[2];
                u[2] = 0.03 * x[0] - 0.06 * x[2] * x[1];
            }
        })
    }

    /// Evaluates a displacement function at every point of the mesh
    pub fn displacement_field<F>(mesh: &Mesh, f: F) -> Vector
    where
        F: Fn(&[f64], &mut [f64]),
    {
        let ndim = mesh.ndim;
        let mut uu = Vector::new(ndim * mesh.points.len());
        let mut u = vec![0.0; ndim];
        for point in &mesh.points {
            u.iter_mut().for_each(|v| *v = 0.0);
            f(&point.coords, &mut u);
            for k in 0..ndim {
                uu[ndim * point.id + k] = u[k];
            }
        }
        uu
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::SampleMeshes;
    use russell_lab::approx_eq;

    #[test]
    fn sample_meshes_are_consistent() {
        for mesh in [SampleMeshes::two_qua4(), SampleMeshes::two_tri3(), SampleMeshes::one_hex8()] {
            for (i, point) in mesh.points.iter().enumerate() {
                assert_eq!(point.id, i);
                assert_eq!(point.coords.len(), mesh.ndim);
            }
            for (i, cell) in mesh.cells.iter().enumerate() {
                assert_eq!(cell.id, i);
                assert_eq!(cell.points.len(), cell.kind.nnode());
            }
        }
    }

    #[test]
    fn displacement_fields_work() {
        let mesh = SampleMeshes::two_qua4();
        let uu = SampleMeshes::uniform_stretch(&mesh, 1.5);
        assert_eq!(uu.dim(), 12);
        // point 5 at (2, 1)
        approx_eq(uu[10], 1.0, 1e-15);
        approx_eq(uu[11], 0.5, 1e-15);
        let uu = SampleMeshes::simple_shear(&mesh, 0.2);
        approx_eq(uu[2 * 4], 0.2, 1e-15);
        approx_eq(uu[2 * 4 + 1], 0.0, 1e-15);
        let mesh = SampleMeshes::one_hex8();
        let uu = SampleMeshes::distorted_field(&mesh);
        assert_eq!(uu.dim(), 24);
        // point 6 at (1, 1, 1)
        approx_eq(uu[18], 0.17, 1e-15);
        approx_eq(uu[19], 0.04, 1e-15);
        approx_eq(uu[20], -0.03, 1e-15);
    }
}
