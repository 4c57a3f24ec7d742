#[cfg(test)]
mod _tests_site_groups {
    use super::super::site_groups::*;
    use crate::cell::LatticeSystem;
    use crate::fracvector::FracVector;
    use crate::symmetries::{CrystalSystem, SymmetryReduction};

    fn coords(rows: Vec<Vec<&str>>) -> FracVector {
        FracVector::create(rows).unwrap()
    }

    fn rocksalt_reps() -> Sites {
        Sites::new(
            vec![coords(vec![vec!["0", "0", "0"]]), coords(vec![vec!["1/2", "1/2", "1/2"]])],
            "-F 4 2 3",
            [true; 3],
        )
        .unwrap()
    }

    #[test]
    fn test_sites_accessors() {
        let flat = coords(vec![
            vec!["0", "0", "0"],
            vec!["1/2", "1/2", "0"],
            vec!["1/4", "1/4", "1/4"],
        ]);
        let sites = Sites::from_coords_and_counts(&flat, &[2, 1], P1_HALL_SYMBOL, [true; 3]).unwrap();
        assert_eq!(sites.counts(), vec![2, 1]);
        assert_eq!(sites.number_of_sites(), 3);
        assert_eq!(sites.coords_groupnumber(), vec![0, 0, 1]);
        assert_eq!(sites.reduced_coords().unwrap(), flat);
        assert_eq!(sites.hall_symbol(), "P 1");
        assert_eq!(sites.nonperiodic_vecs().unwrap(), 0);
        assert_eq!(sites.anonymous_formula().unwrap(), "AB2");

        assert!(Sites::new(vec![FracVector::eye(2)], P1_HALL_SYMBOL, [true; 3]).is_err());
    }

    #[test]
    fn test_sites_from_occupancies() {
        let flat = coords(vec![vec!["0", "0", "0"], vec!["1/2", "0", "0"], vec!["0", "1/2", "0"]]);
        let (sites, occupancies) =
            Sites::from_coords_and_occupancies(&flat, &[8u8, 17, 17], P1_HALL_SYMBOL, [true; 3]).unwrap();
        assert_eq!(occupancies, vec![8, 17]);
        assert_eq!(sites.counts(), vec![1, 2]);
    }

    #[test]
    fn test_representative_sites_expand() {
        let rc = RepresentativeSites::new(rocksalt_reps(), Some(vec!['a', 'b']), None).unwrap();
        let uc = rc.get_uc_sites().unwrap();
        assert_eq!(uc.counts(), vec![4, 4]);
        assert_eq!(uc.as_sites().hall_symbol(), P1_HALL_SYMBOL);
        assert_eq!(rc.total_number_of_atoms().unwrap(), 8);

        assert_eq!(rc.lattice_symbol().unwrap(), 'F');
        assert_eq!(rc.lattice_system().unwrap(), LatticeSystem::Cubic);
        assert_eq!(rc.crystal_system().unwrap(), CrystalSystem::Cubic);
    }

    #[test]
    fn test_representative_sites_sequences() {
        let rc = RepresentativeSites::new(rocksalt_reps(), Some(vec!['a', 'b']), Some(vec![4, 4])).unwrap();
        assert_eq!(rc.wyckoff_sequence().unwrap(), "ab");
        assert_eq!(rc.anonymous_wyckoff_sequence().unwrap().unwrap(), "1aA1bB");
        assert_eq!(rc.total_number_of_atoms().unwrap(), 8);

        let bare = RepresentativeSites::new(rocksalt_reps(), None, None).unwrap();
        assert_eq!(bare.wyckoff_sequence(), None);
        assert_eq!(bare.anonymous_wyckoff_sequence().unwrap(), None);
    }

    #[test]
    fn test_representative_sites_length_checks() {
        assert!(RepresentativeSites::new(rocksalt_reps(), Some(vec!['a']), None).is_err());
        assert!(RepresentativeSites::new(rocksalt_reps(), None, Some(vec![4, 4, 4])).is_err());
    }

    #[test]
    fn test_from_reduction() {
        let reduction = SymmetryReduction {
            basis: FracVector::eye(3),
            coordgroups: vec![coords(vec![vec!["0", "0", "0"]])],
            hall_symbol: "-P 4 2 3".to_string(),
            wyckoff_symbols: vec!['a'],
            multiplicities: vec![1],
        };
        let rc = RepresentativeSites::from_reduction(&reduction, [true; 3]).unwrap();
        assert_eq!(rc.hall_symbol(), "-P 4 2 3");
        assert_eq!(rc.multiplicities(), Some(&[1usize][..]));
        assert_eq!(rc.get_uc_sites().unwrap().total_number_of_atoms(), 1);
    }

    #[test]
    fn test_unitcell_sites() {
        let uc = UnitcellSites::new(vec![coords(vec![vec!["0", "0", "0"]])], [true, true, false]).unwrap();
        assert_eq!(uc.as_sites().hall_symbol(), "P 1");
        assert!(uc.as_sites().nonperiodic_vecs().is_err());
        assert_eq!(uc.clean().unwrap(), uc);
    }
}
