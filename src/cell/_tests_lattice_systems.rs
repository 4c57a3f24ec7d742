#[cfg(test)]
mod _tests_lattice_systems {
    use super::super::cell_conversions::basis_to_niggli_and_orientation;
    use super::super::lattice_systems::*;
    use crate::fracvector::frac_math::ratio;
    use crate::fracvector::FracVector;
    use num_rational::BigRational;
    use num_traits::Zero;

    fn fv(data: Vec<Vec<&str>>) -> FracVector {
        FracVector::create(data).unwrap()
    }

    fn niggli(diag: [&str; 3], off: [&str; 3]) -> FracVector {
        fv(vec![diag.to_vec(), off.to_vec()])
    }

    fn exact() -> BigRational {
        BigRational::zero()
    }

    #[test]
    fn test_lattice_system_from_niggli() {
        let cases = [
            (niggli(["4", "4", "4"], ["0", "0", "0"]), LatticeSystem::Cubic),
            (niggli(["4", "4", "9"], ["0", "0", "0"]), LatticeSystem::Tetragonal),
            (niggli(["1", "4", "9"], ["0", "0", "0"]), LatticeSystem::Orthorhombic),
            (niggli(["4", "4", "9"], ["0", "0", "-4"]), LatticeSystem::Hexagonal),
            (niggli(["1", "4", "9"], ["0", "2", "0"]), LatticeSystem::Monoclinic),
            (niggli(["2", "2", "2"], ["2", "2", "2"]), LatticeSystem::Rhombohedral),
            (niggli(["1", "4", "9"], ["1", "2", "3"]), LatticeSystem::Triclinic),
            // 60 degrees between a and b is not hexagonal
            (niggli(["4", "4", "9"], ["0", "0", "4"]), LatticeSystem::Triclinic),
        ];
        for (n, expected) in cases {
            assert_eq!(lattice_system_from_niggli(&n, &exact()).unwrap(), expected, "{}", n);
        }
    }

    #[test]
    fn test_axes_out_of_standard_order_are_triclinic() {
        // 120 degrees between b and c
        let n = niggli(["9", "4", "4"], ["-4", "0", "0"]);
        assert_eq!(lattice_system_from_niggli(&n, &exact()).unwrap(), LatticeSystem::Triclinic);
        let tests = AxisTests::from_niggli(&n, &exact()).unwrap();
        assert!(tests.alpha120 && !tests.gamma120);
        assert_eq!(tests.classify_any_order(), LatticeSystem::Hexagonal);
    }

    #[test]
    fn test_tolerance() {
        let n = niggli(["4", "40001/10000", "9"], ["0", "0", "0"]);
        assert_eq!(lattice_system_from_niggli(&n, &exact()).unwrap(), LatticeSystem::Orthorhombic);
        assert_eq!(lattice_system_from_niggli(&n, &ratio(1, 1000)).unwrap(), LatticeSystem::Tetragonal);
    }

    #[test]
    fn test_lattice_system_from_lengths_and_cosangles() {
        let lengths = FracVector::create(vec![2, 2, 3]).unwrap();
        let cos = FracVector::create(vec!["0", "0", "-1/2"]).unwrap();
        assert_eq!(
            lattice_system_from_lengths_and_cosangles(&lengths, &cos, &exact()).unwrap(),
            LatticeSystem::Hexagonal
        );

        let lengths = FracVector::create(vec![3, 4, 5]).unwrap();
        let cos = FracVector::create(vec!["0", "-1/5", "0"]).unwrap();
        assert_eq!(
            lattice_system_from_lengths_and_cosangles(&lengths, &cos, &exact()).unwrap(),
            LatticeSystem::Monoclinic
        );

        // cos = -1 is not 120 degrees
        let lengths = FracVector::create(vec![2, 2, 3]).unwrap();
        let cos = FracVector::create(vec![0, 0, -1]).unwrap();
        assert_eq!(
            lattice_system_from_lengths_and_cosangles(&lengths, &cos, &exact()).unwrap(),
            LatticeSystem::Triclinic
        );
    }

    #[test]
    fn test_shape_errors() {
        let bad = FracVector::create(vec![1, 2, 3]).unwrap();
        assert!(lattice_system_from_niggli(&bad, &exact()).is_err());
        assert!(lattice_system_from_lengths_and_cosangles(&bad, &FracVector::eye(3), &exact()).is_err());
    }

    #[test]
    fn test_standard_order_not_needed() {
        for n in [
            niggli(["4", "4", "4"], ["0", "0", "0"]),
            niggli(["4", "4", "9"], ["0", "0", "-4"]),
            niggli(["1", "4", "9"], ["0", "2", "0"]),
            niggli(["1", "4", "9"], ["1", "2", "3"]),
        ] {
            assert_eq!(standard_order_axes_transform(&n, &exact()).unwrap(), None, "{}", n);
        }
    }

    #[test]
    fn test_standard_order_hexagonal() {
        let alpha = niggli(["9", "4", "4"], ["-4", "0", "0"]);
        let t = standard_order_axes_transform(&alpha, &exact()).unwrap().unwrap();
        assert_eq!(t, FracVector::create([[0, 0, -1], [0, -1, 0], [-1, 0, 0]]).unwrap());

        let beta = niggli(["4", "9", "4"], ["0", "-4", "0"]);
        let t = standard_order_axes_transform(&beta, &exact()).unwrap().unwrap();
        assert_eq!(t, FracVector::create([[-1, 0, 0], [0, 0, -1], [0, -1, 0]]).unwrap());
    }

    #[test]
    fn test_standard_order_monoclinic() {
        let gamma = niggli(["1", "4", "9"], ["0", "0", "2"]);
        let t = standard_order_axes_transform(&gamma, &exact()).unwrap().unwrap();
        assert_eq!(t, FracVector::create([[-1, 0, 0], [0, 0, -1], [0, -1, 0]]).unwrap());

        // Unique angle between b and c
        let basis = FracVector::create([[1, 0, 0], [0, 2, 0], [0, 1, 3]]).unwrap();
        let (n, orientation) = basis_to_niggli_and_orientation(&basis).unwrap();
        assert_eq!(lattice_system_from_niggli(&n, &exact()).unwrap(), LatticeSystem::Triclinic);

        let t = standard_order_axes_transform(&n, &exact()).unwrap().unwrap();
        assert_eq!(t.det().unwrap(), FracVector::scalar(1));
        let reordered = t.mul(&basis).unwrap();
        let (n2, orientation2) = basis_to_niggli_and_orientation(&reordered).unwrap();
        assert_eq!(n2, niggli(["10", "1", "4"], ["0", "4", "0"]));
        assert_eq!(lattice_system_from_niggli(&n2, &exact()).unwrap(), LatticeSystem::Monoclinic);
        assert_eq!(orientation, orientation2);
    }

    #[test]
    fn test_display() {
        assert_eq!(LatticeSystem::Orthorhombic.to_string(), "orthorhombic");
        assert!(LatticeSystem::Tetragonal.is_orthogonal());
        assert!(!LatticeSystem::Hexagonal.is_orthogonal());
    }
}
