#[cfg(test)]
mod _tests_crystal_cell {
    use super::super::cell_conversions::Scaling;
    use super::super::crystal_cell::*;
    use super::super::lattice_systems::LatticeSystem;
    use crate::fracvector::frac_math::{default_precision, ratio};
    use crate::fracvector::FracVector;
    use num_traits::ToPrimitive;

    fn fv(data: Vec<Vec<&str>>) -> FracVector {
        FracVector::create(data).unwrap()
    }

    fn cubic(a: i64) -> Cell {
        Cell::new(FracVector::create([[a, 0, 0], [0, a, 0], [0, 0, a]]).unwrap()).unwrap()
    }

    #[test]
    fn test_face_diagonal_cell() {
        let basis = FracVector::create([[1, 1, 0], [1, 0, 1], [0, 1, 1]]).unwrap();
        let cell = Cell::new(basis.clone()).unwrap();
        assert_eq!(cell.niggli_matrix(), &FracVector::create([[2, 2, 2], [2, 2, 2]]).unwrap());
        assert_eq!(cell.orientation(), -1);
        assert_eq!(cell.det(), &ratio(-2, 1));
        assert_eq!(cell.volume(), ratio(2, 1));
        assert_eq!(cell.lattice_system(), LatticeSystem::Rhombohedral);
        assert_eq!(cell.metric(), &FracVector::create([[2, 1, 1], [1, 2, 1], [1, 1, 2]]).unwrap());
        assert_eq!(basis.mul(cell.inv()).unwrap(), FracVector::eye(3));

        assert_eq!(cell.cosangles(), &FracVector::create(vec!["1/2", "1/2", "1/2"]).unwrap());
        assert_eq!(cell.angles().unwrap(), FracVector::create(vec![60, 60, 60]).unwrap());
        let a = cell.lengths().to_floats()[0];
        assert!((a - 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_from_niggli_keeps_orientation() {
        let niggli = FracVector::create([[2, 2, 2], [2, 2, 2]]).unwrap();
        let cell = Cell::from_niggli(&niggli, -1, &default_precision()).unwrap();
        assert_eq!(cell.orientation(), -1);
        for (x, e) in cell.niggli_matrix().to_floats().iter().zip([2.0; 6]) {
            assert!((x - e).abs() < 1e-8);
        }

        let metric = FracVector::create([[4, 0, 0], [0, 4, 0], [0, 0, 9]]).unwrap();
        let cell = Cell::from_metric(&metric, 1, &default_precision()).unwrap();
        assert_eq!(cell.basis(), &FracVector::create([[2, 0, 0], [0, 2, 0], [0, 0, 3]]).unwrap());
        assert_eq!(cell.lattice_system(), LatticeSystem::Tetragonal);
    }

    #[test]
    fn test_invalid_bases() {
        assert!(Cell::new(FracVector::eye(2)).is_err());
        assert!(Cell::new(FracVector::create([[1, 0, 0], [0, 1, 0], [1, 1, 0]]).unwrap()).is_err());
    }

    #[test]
    fn test_from_lengths_and_angles() {
        let prec = default_precision();
        let hex = Cell::from_lengths_and_angles(
            &FracVector::create(vec![2, 2, 3]).unwrap(),
            &FracVector::create(vec![90, 90, 120]).unwrap(),
            None,
            &prec,
        )
        .unwrap();
        assert_eq!(hex.lattice_system(), LatticeSystem::Hexagonal);
        assert_eq!(hex.basis().get(0).unwrap(), FracVector::create(vec![2, 0, 0]).unwrap());
        assert_eq!(hex.niggli_matrix().at(&[1, 2]).unwrap(), ratio(-4, 1));

        let mono = Cell::from_lengths_and_angles(
            &FracVector::create(vec![3, 4, 5]).unwrap(),
            &FracVector::create(vec![90, 100, 90]).unwrap(),
            Some("-P 2ybc"),
            &prec,
        )
        .unwrap();
        assert_eq!(mono.lattice_system(), LatticeSystem::Monoclinic);
        assert_eq!(mono.basis().at(&[1, 1]).unwrap(), ratio(4, 1));
    }

    #[test]
    fn test_scaled() {
        let unit = cubic(1);
        let doubled = unit.scaled(&Scaling::Volume(ratio(8, 1))).unwrap();
        assert_eq!(doubled.basis(), cubic(2).basis());
        assert_eq!(unit.scaled(&Scaling::Scale(ratio(3, 1))).unwrap().volume(), ratio(27, 1));
    }

    #[test]
    fn test_coordinate_conversions() {
        let cell = cubic(2);
        let reduced = fv(vec![vec!["1/2", "1/2", "0"], vec!["1/4", "1/4", "1/4"]]);
        let cartesian = cell.coords_reduced_to_cartesian(&reduced).unwrap();
        assert_eq!(cartesian, fv(vec![vec!["1", "1", "0"], vec!["1/2", "1/2", "1/2"]]));
        assert_eq!(cell.coords_cartesian_to_reduced(&cartesian).unwrap(), reduced);

        let single = FracVector::create(vec!["1/2", "0", "0"]).unwrap();
        assert_eq!(
            cell.coords_reduced_to_cartesian(&single).unwrap(),
            FracVector::create(vec![1, 0, 0]).unwrap()
        );

        let groups = cell.coordgroups_reduced_to_cartesian(&[reduced.clone(), single]).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(cell.coordgroups_cartesian_to_reduced(&groups).unwrap()[0], reduced);
    }

    #[test]
    fn test_normalization() {
        let cell = cubic(2);
        assert_eq!(cell.normalization_scale().unwrap(), ratio(2, 1));
        assert_eq!(cell.get_normalized().unwrap().basis(), &FracVector::eye(3));

        let ortho = Cell::new(FracVector::create([[1, 0, 0], [0, 2, 0], [0, 0, -3]]).unwrap()).unwrap();
        assert_eq!(ortho.normalization_longestvec_scale(), ratio(3, 1));
        let normalized = ortho.get_normalized_longestvec().unwrap();
        assert_eq!(normalized.basis().at(&[2, 2]).unwrap(), ratio(-1, 1));
        assert_eq!(normalized.lattice_system(), LatticeSystem::Orthorhombic);

        // Volume-based normalization gives volume 1 up to the precision of the cube root
        let v = ortho.get_normalized().unwrap().volume();
        assert!((v.to_f64().unwrap() - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_clean() {
        let noisy = fv(vec![vec!["1", "0", "0"], vec!["0", "1", "0"], vec!["1/30000001", "0", "1"]]);
        let cell = Cell::new(noisy).unwrap();
        assert_eq!(cell.clean().unwrap().basis(), &FracVector::eye(3));
        assert_eq!(cell.clean().unwrap().lattice_system(), LatticeSystem::Cubic);
    }

    #[test]
    fn test_clean_reclassifies_lattice_system() {
        // A tetragonal cell whose c axis is a hair off a
        let noisy = fv(vec![vec!["1", "0", "0"], vec!["0", "1", "0"], vec!["0", "0", "100000000001/100000000000"]]);
        let cell = Cell::new(noisy).unwrap();
        let cleaned = cell.clean().unwrap();
        assert_eq!(cleaned.basis(), &FracVector::eye(3));
        assert_eq!(cleaned.lattice_system(), Cell::new(FracVector::eye(3)).unwrap().lattice_system());
        assert_eq!(cleaned.lattice_system(), LatticeSystem::Cubic);
    }
}
