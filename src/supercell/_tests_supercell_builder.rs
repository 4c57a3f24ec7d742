#[cfg(test)]
mod _tests_supercell_builder {
    use super::super::supercell_builder::*;
    use crate::error::CrystalError;
    use crate::fracvector::FracVector;

    fn fv(rows: Vec<Vec<&str>>) -> FracVector {
        FracVector::create(rows).unwrap()
    }

    fn fcc_primitive_basis() -> FracVector {
        fv(vec![vec!["0", "1/2", "1/2"], vec!["1/2", "0", "1/2"], vec!["1/2", "1/2", "0"]])
    }

    fn rocksalt_primitive_groups() -> Vec<FracVector> {
        vec![fv(vec![vec!["0", "0", "0"]]), fv(vec![vec!["1/2", "1/2", "1/2"]])]
    }

    fn diag(a: i64, b: i64, c: i64) -> FracVector {
        FracVector::create([[a, 0, 0], [0, b, 0], [0, 0, c]]).unwrap()
    }

    #[test]
    fn test_doubled_rocksalt() {
        let result =
            build_supercell(&fcc_primitive_basis(), &rocksalt_primitive_groups(), &diag(2, 2, 2), 20).unwrap();
        assert_eq!(result.counts(), vec![8, 8]);
        assert_eq!(result.total_number_of_atoms(), 16);
        assert_eq!(result.basis, fcc_primitive_basis().scale(&crate::fracvector::ratio(2, 1)));

        let first = result.coordgroups[0].get(0).unwrap();
        assert_eq!(first, FracVector::create([0, 0, 0]).unwrap());
        let last = result.coordgroups[0].get(7).unwrap();
        assert_eq!(last, fv(vec![vec!["1/2", "1/2", "1/2"]]).get(0).unwrap());
    }

    #[test]
    fn test_primitive_to_conventional() {
        let t = FracVector::create([[-1, 1, 1], [1, -1, 1], [1, 1, -1]]).unwrap();
        let result = build_supercell(&fcc_primitive_basis(), &rocksalt_primitive_groups(), &t, 20).unwrap();
        assert_eq!(result.basis, FracVector::eye(3));
        assert_eq!(result.counts(), vec![4, 4]);
        let expected_na = fv(vec![
            vec!["0", "0", "0"],
            vec!["0", "1/2", "1/2"],
            vec!["1/2", "0", "1/2"],
            vec!["1/2", "1/2", "0"],
        ]);
        assert_eq!(result.coordgroups[0], expected_na);
    }

    #[test]
    fn test_rational_transformation_to_primitive() {
        let conventional_na = fv(vec![
            vec!["0", "0", "0"],
            vec!["0", "1/2", "1/2"],
            vec!["1/2", "0", "1/2"],
            vec!["1/2", "1/2", "0"],
        ]);
        let conventional_cl = fv(vec![
            vec!["1/2", "1/2", "1/2"],
            vec!["1/2", "0", "0"],
            vec!["0", "1/2", "0"],
            vec!["0", "0", "1/2"],
        ]);
        let result = transform_coordgroups(
            &FracVector::eye(3),
            &[conventional_na, conventional_cl],
            &fcc_primitive_basis(),
            20,
        )
        .unwrap();
        assert_eq!(result.counts(), vec![1, 1]);
        assert_eq!(result.basis, fcc_primitive_basis());
        assert_eq!(result.coordgroups[1], fv(vec![vec!["1/2", "1/2", "1/2"]]));
    }

    #[test]
    fn test_invalid_transformations() {
        let groups = vec![fv(vec![vec!["0", "0", "0"]])];
        let basis = FracVector::eye(3);

        let err = build_supercell(&basis, &groups, &diag(-1, 1, 1), 20).unwrap_err();
        assert!(matches!(err, CrystalError::Transform(_)));

        let half = fv(vec![vec!["1/2", "0", "0"], vec!["0", "1", "0"], vec!["0", "0", "1"]]);
        let err = transform_coordgroups(&basis, &groups, &half, 20).unwrap_err();
        assert!(matches!(err, CrystalError::Transform(_)));
        let err = build_supercell(&basis, &groups, &half, 20).unwrap_err();
        assert!(matches!(err, CrystalError::Transform(_)));

        let err = build_supercell(&basis, &groups, &FracVector::eye(2), 20).unwrap_err();
        assert!(matches!(err, CrystalError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_search_exhausted() {
        let skewed = FracVector::create([[1, 0, 0], [4, 1, 0], [0, 0, 1]]).unwrap();
        let groups = vec![fv(vec![vec!["0", "0", "0"]])];
        let err = build_supercell(&skewed, &groups, &diag(3, 1, 1), 1).unwrap_err();
        assert!(matches!(
            err,
            CrystalError::SearchExhausted {
                max_search_cells: 1,
                missing: 1
            }
        ));

        let result = build_supercell(&skewed, &groups, &diag(3, 1, 1), 2).unwrap();
        assert_eq!(result.counts(), vec![3]);
    }

    #[test]
    fn test_empty_group_survives() {
        let groups = vec![fv(vec![vec!["0", "0", "0"]]), FracVector::zeros(&[0, 3])];
        let result = build_supercell(&FracVector::eye(3), &groups, &diag(1, 1, 2), 20).unwrap();
        assert_eq!(result.counts(), vec![2, 0]);
    }
}
