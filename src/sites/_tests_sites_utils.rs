#[cfg(test)]
mod _tests_sites_utils {
    use super::super::sites_utils::*;
    use crate::fracvector::frac_math::ratio;
    use crate::fracvector::FracVector;
    use crate::symmetries::Spacegroup;

    fn coords(rows: Vec<Vec<&str>>) -> FracVector {
        FracVector::create(rows).unwrap()
    }

    #[test]
    fn test_periodicity() {
        assert_eq!(periodicity_to_pbc(Periodicity::default()).unwrap(), [true; 3]);
        assert_eq!(periodicity_to_pbc(Periodicity::NonPeriodicVecs(1)).unwrap(), [false, true, true]);
        assert_eq!(periodicity_to_pbc(Periodicity::NonPeriodicVecs(3)).unwrap(), [false; 3]);
        assert!(periodicity_to_pbc(Periodicity::NonPeriodicVecs(4)).is_err());

        assert_eq!(pbc_to_nonperiodic_vecs(&[false, false, true]).unwrap(), 2);
        assert_eq!(pbc_to_nonperiodic_vecs(&[true; 3]).unwrap(), 0);
        assert!(pbc_to_nonperiodic_vecs(&[true, false, true]).is_err());
    }

    #[test]
    fn test_coords_and_counts() {
        let flat = coords(vec![
            vec!["0", "0", "0"],
            vec!["1/2", "1/2", "1/2"],
            vec!["1/4", "1/4", "1/4"],
        ]);
        let groups = coords_and_counts_to_coordgroups(&flat, &[2, 0, 1]).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].dims(), &[2, 3]);
        assert_eq!(groups[1].dims(), &[0, 3]);
        assert_eq!(groups[2], coords(vec![vec!["1/4", "1/4", "1/4"]]));

        let (back, counts) = coordgroups_to_coords(&groups).unwrap();
        assert_eq!(back, flat);
        assert_eq!(counts, vec![2, 0, 1]);

        assert!(coords_and_counts_to_coordgroups(&flat, &[1, 1]).is_err());
        assert!(coords_and_counts_to_coordgroups(&FracVector::eye(2), &[2]).is_err());
    }

    #[test]
    fn test_coords_and_occupancies() {
        let flat = coords(vec![
            vec!["0", "0", "0"],
            vec!["1/2", "0", "0"],
            vec!["0", "1/2", "1/2"],
            vec!["0", "1/2", "0"],
        ]);
        let (groups, distinct) = coords_and_occupancies_to_coordgroups(&flat, &["Na", "Cl", "Na", "Cl"]).unwrap();
        assert_eq!(distinct, vec!["Na", "Cl"]);
        assert_eq!(groups[0], coords(vec![vec!["0", "0", "0"], vec!["0", "1/2", "1/2"]]));
        assert_eq!(groups[1], coords(vec![vec!["1/2", "0", "0"], vec!["0", "1/2", "0"]]));

        assert!(coords_and_occupancies_to_coordgroups(&flat, &["Na"]).is_err());
    }

    #[test]
    fn test_expansion_rocksalt() {
        let fm3m = Spacegroup::parse("-F 4 2 3").unwrap();
        let reps = vec![coords(vec![vec!["0", "0", "0"]]), coords(vec![vec!["1/2", "1/2", "1/2"]])];
        let uc = coordgroups_reduced_to_unitcell(&reps, fm3m.operations(), &[true; 3], &default_coord_tolerance()).unwrap();
        assert_eq!(
            uc[0],
            coords(vec![
                vec!["0", "0", "0"],
                vec!["0", "1/2", "1/2"],
                vec!["1/2", "0", "1/2"],
                vec!["1/2", "1/2", "0"],
            ])
        );
        assert_eq!(
            uc[1],
            coords(vec![
                vec!["0", "0", "1/2"],
                vec!["0", "1/2", "0"],
                vec!["1/2", "0", "0"],
                vec!["1/2", "1/2", "1/2"],
            ])
        );
    }

    #[test]
    fn test_expansion_tolerance() {
        let inversion = Spacegroup::parse("-P 1").unwrap();
        let reps = vec![coords(vec![vec!["0", "0", "1/1000000000"]])];

        let merged = coordgroups_reduced_to_unitcell(&reps, inversion.operations(), &[true; 3], &default_coord_tolerance()).unwrap();
        assert_eq!(merged[0].len(), 1);

        let exact = coordgroups_reduced_to_unitcell(&reps, inversion.operations(), &[true; 3], &ratio(0, 1)).unwrap();
        assert_eq!(exact[0].len(), 2);
        // Sorted by (x, y, z), all in [0, 1)
        assert_eq!(exact[0].at(&[0, 2]).unwrap(), ratio(1, 1_000_000_000));
        assert_eq!(exact[0].at(&[1, 2]).unwrap(), ratio(999_999_999, 1_000_000_000));
    }

    #[test]
    fn test_expansion_keeps_non_periodic_axes() {
        let inversion = Spacegroup::parse("-P 1").unwrap();
        let reps = vec![coords(vec![vec!["1/4", "1/4", "1/4"]])];

        let periodic = coordgroups_reduced_to_unitcell(&reps, inversion.operations(), &[true; 3], &default_coord_tolerance()).unwrap();
        assert_eq!(periodic[0], coords(vec![vec!["1/4", "1/4", "1/4"], vec!["3/4", "3/4", "3/4"]]));

        // z is not folded back into the cell
        let slab = coordgroups_reduced_to_unitcell(&reps, inversion.operations(), &[true, true, false], &default_coord_tolerance()).unwrap();
        assert_eq!(slab[0], coords(vec![vec!["1/4", "1/4", "1/4"], vec!["3/4", "3/4", "-1/4"]]));
    }

    #[test]
    fn test_min_image_distance() {
        let a = FracVector::create(["1/10", "0", "0"]).unwrap();
        let b = FracVector::create(["9/10", "0", "0"]).unwrap();
        assert_eq!(min_image_distance_sqr(&a, &b, &[true; 3]).unwrap(), ratio(1, 25));
        assert_eq!(min_image_distance_sqr(&a, &b, &[false, true, true]).unwrap(), ratio(16, 25));
    }

    #[test]
    fn test_coordgroups_match() {
        let eps = default_coord_tolerance();
        let a = coords(vec![vec!["0", "0", "0"], vec!["1/2", "1/2", "1/2"]]);
        let b = coords(vec![vec!["1/2", "1/2", "1/2"], vec!["1", "999999999/1000000000", "0"]]);
        assert!(coordgroups_match(&a, &b, &[true; 3], &eps).unwrap());
        // Without periodicity 1 and 0 are a full cell apart
        assert!(!coordgroups_match(&a, &b, &[false; 3], &eps).unwrap());
        // Two sites of `c` may not pair with the same site of `a`
        let c = coords(vec![vec!["0", "0", "0"], vec!["0", "0", "1/1000000000"]]);
        assert!(!coordgroups_match(&c, &a, &[true; 3], &eps).unwrap());
        assert!(!coordgroups_match(&a, &coords(vec![vec!["0", "0", "0"]]), &[true; 3], &eps).unwrap());
    }

    #[test]
    fn test_coordswap() {
        let basis = FracVector::create([[1, 0, 0], [0, 2, 0], [0, 0, 3]]).unwrap();
        let groups = vec![coords(vec![vec!["1/2", "1/4", "0"]])];
        let (new_basis, new_groups) = coordswap(0, 2, &basis, &groups).unwrap();
        assert_eq!(new_basis, FracVector::create([[0, 0, 3], [0, 2, 0], [1, 0, 0]]).unwrap());
        assert_eq!(new_groups[0], coords(vec![vec!["0", "1/4", "1/2"]]));

        // Cartesian positions are unchanged
        assert_eq!(
            new_groups[0].mul(&new_basis).unwrap(),
            groups[0].mul(&basis).unwrap()
        );
        assert!(coordswap(0, 3, &basis, &groups).is_err());
    }

    #[test]
    fn test_clean_coordgroups() {
        let noisy = vec![coords(vec![vec!["1/3", "1/30000001", "1/2"]]), FracVector::zeros(&[0, 3])];
        let clean = clean_coordgroups(&noisy).unwrap();
        assert_eq!(clean[0], coords(vec![vec!["1/3", "0", "1/2"]]));
        assert!(clean[1].is_empty());
    }
}
