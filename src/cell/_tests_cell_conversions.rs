#[cfg(test)]
mod _tests_cell_conversions {
    use super::super::cell_conversions::*;
    use super::super::lattice_systems::LatticeSystem;
    use crate::fracvector::frac_math::{default_precision, ratio};
    use crate::fracvector::FracVector;
    use num_traits::ToPrimitive;

    const TOL: f64 = 1e-8;

    fn fv(data: Vec<Vec<&str>>) -> FracVector {
        FracVector::create(data).unwrap()
    }

    fn face_diagonal_basis() -> FracVector {
        FracVector::create([[1, 1, 0], [1, 0, 1], [0, 1, 1]]).unwrap()
    }

    fn assert_close(actual: &FracVector, expected: &[f64]) {
        let floats = actual.to_floats();
        assert_eq!(floats.len(), expected.len());
        for (a, e) in floats.iter().zip(expected) {
            assert!((a - e).abs() < TOL, "{:?} vs {:?}", floats, expected);
        }
    }

    #[test]
    fn test_basis_to_niggli_and_orientation() {
        let (niggli, orientation) = basis_to_niggli_and_orientation(&face_diagonal_basis()).unwrap();
        assert_eq!(niggli, FracVector::create([[2, 2, 2], [2, 2, 2]]).unwrap());
        assert_eq!(orientation, -1);

        let (niggli, orientation) = basis_to_niggli_and_orientation(&FracVector::eye(3)).unwrap();
        assert_eq!(niggli, FracVector::create([[1, 1, 1], [0, 0, 0]]).unwrap());
        assert_eq!(orientation, 1);
    }

    #[test]
    fn test_singular_and_misshapen_basis() {
        let singular = FracVector::create([[1, 0, 0], [0, 1, 0], [1, 1, 0]]).unwrap();
        assert!(basis_to_niggli_and_orientation(&singular).is_err());
        assert!(basis_to_niggli_and_orientation(&FracVector::eye(2)).is_err());
    }

    #[test]
    fn test_niggli_metric_round_trip() {
        let niggli = FracVector::create([[2, 2, 2], [2, 2, 2]]).unwrap();
        let metric = niggli_to_metric(&niggli).unwrap();
        assert_eq!(metric, FracVector::create([[2, 1, 1], [1, 2, 1], [1, 1, 2]]).unwrap());
        assert_eq!(metric_to_niggli(&metric).unwrap(), niggli);

        // The metric is basis · basisᵀ
        let basis = face_diagonal_basis();
        let gram = basis.mul(&basis.transpose().unwrap()).unwrap();
        assert_eq!(gram, metric);
    }

    #[test]
    fn test_lengths_and_cosangles() {
        let lengths = FracVector::create(vec![2, 2, 3]).unwrap();
        let cos = FracVector::create(vec!["0", "0", "-1/2"]).unwrap();
        let niggli = lengths_and_cosangles_to_niggli(&lengths, &cos).unwrap();
        assert_eq!(niggli, FracVector::create([[4, 4, 9], [0, 0, -4]]).unwrap());

        let (l, c) = niggli_to_lengths_and_cosangles(&niggli, &default_precision()).unwrap();
        assert_eq!(l, lengths);
        assert_eq!(c, cos);

        let (_, angles) = niggli_to_lengths_and_angles(&niggli, &default_precision()).unwrap();
        assert_eq!(angles, FracVector::create(vec![90, 90, 120]).unwrap());
    }

    #[test]
    fn test_lengths_and_angles_to_niggli() {
        let lengths = FracVector::create(vec![1, 1, 1]).unwrap();
        let angles = FracVector::create(vec![90, 90, 90]).unwrap();
        let niggli = lengths_and_angles_to_niggli(&lengths, &angles, &default_precision()).unwrap();
        assert_eq!(niggli, FracVector::create([[1, 1, 1], [0, 0, 0]]).unwrap());

        let cos = angles_to_cosangles(&FracVector::create(vec![60, 90, 120]).unwrap(), &default_precision()).unwrap();
        assert_eq!(cos, FracVector::create(vec!["1/2", "0", "-1/2"]).unwrap());
    }

    #[test]
    fn test_niggli_to_basis_round_trip() {
        let prec = default_precision();
        let niggli = FracVector::create([[2, 2, 2], [2, 2, 2]]).unwrap();
        let basis = niggli_to_basis(&niggli, -1, &prec).unwrap();
        let (back, orientation) = basis_to_niggli_and_orientation(&basis).unwrap();
        assert_eq!(orientation, -1);
        assert_close(&back, &[2.0; 6]);

        // a along x, b in the xy plane
        assert_eq!(basis.at(&[0, 1]).unwrap(), ratio(0, 1));
        assert_eq!(basis.at(&[1, 2]).unwrap(), ratio(0, 1));
    }

    #[test]
    fn test_niggli_to_basis_rejects_degenerate_cells() {
        let flat = FracVector::create([[1, 1, 1], [2, 2, 2]]).unwrap();
        assert!(niggli_to_basis(&flat, 1, &default_precision()).is_err());
        let negative = FracVector::create([[-1, 1, 1], [0, 0, 0]]).unwrap();
        assert!(niggli_to_basis(&negative, 1, &default_precision()).is_err());
    }

    #[test]
    fn test_conventional_bases() {
        let prec = default_precision();

        let cubic = lengths_and_cosangles_to_conventional_basis(
            &FracVector::create(vec![2, 2, 2]).unwrap(),
            &FracVector::zeros(&[3]),
            None,
            1,
            &prec,
        )
        .unwrap();
        assert_eq!(cubic, FracVector::create([[2, 0, 0], [0, 2, 0], [0, 0, 2]]).unwrap());

        let hex_niggli = FracVector::create([[4, 4, 9], [0, 0, -4]]).unwrap();
        let hex = niggli_to_conventional_basis(&hex_niggli, None, 1, &prec).unwrap();
        assert_eq!(hex.at(&[1, 0]).unwrap(), ratio(-1, 1));
        assert_close(&hex, &[2.0, 0.0, 0.0, -1.0, 3f64.sqrt(), 0.0, 0.0, 0.0, 3.0]);

        let mono = lengths_and_cosangles_to_conventional_basis(
            &FracVector::create(vec![3, 4, 5]).unwrap(),
            &FracVector::create(vec!["0", "-1/5", "0"]).unwrap(),
            None,
            1,
            &prec,
        )
        .unwrap();
        assert_close(&mono, &[3.0, 0.0, 0.0, 0.0, 4.0, 0.0, -1.0, 0.0, 24f64.sqrt()]);

        let flipped = lengths_and_cosangles_to_conventional_basis(
            &FracVector::create(vec![2, 2, 2]).unwrap(),
            &FracVector::zeros(&[3]),
            Some(LatticeSystem::Cubic),
            -1,
            &prec,
        )
        .unwrap();
        assert_eq!(flipped, -cubic);
    }

    #[test]
    fn test_rhombohedral_and_triclinic_bases_reproduce_niggli() {
        let prec = default_precision();
        let lengths = FracVector::create(vec![1, 1, 1]).unwrap();
        let cos = FracVector::create(vec!["1/2", "1/2", "1/2"]).unwrap();
        let rhombo = lengths_and_cosangles_to_conventional_basis(&lengths, &cos, None, 1, &prec).unwrap();
        let (niggli, orientation) = basis_to_niggli_and_orientation(&rhombo).unwrap();
        assert_eq!(orientation, 1);
        assert_close(&niggli, &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);

        let lengths = FracVector::create(vec![3, 4, 5]).unwrap();
        let cos = FracVector::create(vec!["1/10", "1/5", "3/10"]).unwrap();
        let tri = lengths_and_cosangles_to_conventional_basis(&lengths, &cos, None, 1, &prec).unwrap();
        let (niggli, _) = basis_to_niggli_and_orientation(&tri).unwrap();
        assert_close(&niggli, &[9.0, 16.0, 25.0, 4.0, 6.0, 7.2]);
    }

    #[test]
    fn test_primitive_to_conventional_transform() {
        let fcc = fv(vec![
            vec!["0", "1/2", "1/2"],
            vec!["1/2", "0", "1/2"],
            vec!["1/2", "1/2", "0"],
        ]);
        let t = get_primitive_to_conventional_basis_transform(&fcc).unwrap();
        assert_eq!(t, FracVector::create([[-1, 1, 1], [1, -1, 1], [1, 1, -1]]).unwrap());
        assert_eq!(t.mul(&fcc).unwrap(), FracVector::eye(3));

        let bcc = fv(vec![
            vec!["-1/2", "1/2", "1/2"],
            vec!["1/2", "-1/2", "1/2"],
            vec!["1/2", "1/2", "-1/2"],
        ]);
        let t = get_primitive_to_conventional_basis_transform(&bcc).unwrap();
        assert_eq!(t, FracVector::create([[0, 1, 1], [1, 0, 1], [1, 1, 0]]).unwrap());

        // Not a centred cell: identity
        let ortho = FracVector::create([[1, 0, 0], [0, 2, 0], [0, 0, 3]]).unwrap();
        assert_eq!(get_primitive_to_conventional_basis_transform(&ortho).unwrap(), FracVector::eye(3));
    }

    #[test]
    fn test_volume_and_scale() {
        let prec = default_precision();
        let basis = FracVector::create([[2, 0, 0], [0, 2, 0], [0, 0, 2]]).unwrap();
        assert_eq!(vol_to_scale(&basis, &ratio(64, 1), &prec).unwrap(), ratio(2, 1));
        assert_eq!(scale_to_vol(&basis, &ratio(1, 2)).unwrap(), ratio(1, 1));

        let s = vol_to_scale(&FracVector::eye(3), &ratio(2, 1), &prec).unwrap();
        assert!((s.to_f64().unwrap() - 2f64.cbrt()).abs() < TOL);

        assert_eq!(scaling_to_volume(&basis, &Scaling::Scale(ratio(3, 1))).unwrap(), ratio(216, 1));
        assert_eq!(scaling_to_scale(&basis, &Scaling::Volume(ratio(1, 1)), &prec).unwrap(), ratio(1, 2));

        let niggli = FracVector::create([[4, 4, 4], [0, 0, 0]]).unwrap();
        assert_eq!(niggli_scale_to_vol(&niggli, &ratio(1, 1), &prec).unwrap(), ratio(8, 1));
    }

    #[test]
    fn test_signed_scaling() {
        assert_eq!(Scaling::from_signed(ratio(3, 2)).unwrap(), Scaling::Scale(ratio(3, 2)));
        assert_eq!(Scaling::from_signed(ratio(-27, 1)).unwrap(), Scaling::Volume(ratio(27, 1)));
        assert!(Scaling::from_signed(ratio(0, 1)).is_err());
    }

    #[test]
    fn test_primitive_basis_transform_determinants() {
        let expected = [
            ('P', ratio(1, 1)),
            ('A', ratio(1, 2)),
            ('B', ratio(1, 2)),
            ('C', ratio(1, 2)),
            ('I', ratio(1, 2)),
            ('F', ratio(1, 4)),
            ('R', ratio(1, 3)),
        ];
        for (symbol, det) in expected {
            let t = primitive_basis_transform(symbol).unwrap();
            assert_eq!(t.det().unwrap().to_rational().unwrap(), det, "lattice symbol {}", symbol);
        }
        assert!(primitive_basis_transform('Q').is_err());
    }
}
