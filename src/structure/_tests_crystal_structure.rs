#[cfg(test)]
mod _tests_crystal_structure {
    use super::super::collaborators::{CollaboratorError, SymmetryFinder};
    use super::super::crystal_structure::*;
    use super::super::structure_request::*;
    use crate::assignments::{Assignment, Assignments, SiteAssignment};
    use crate::error::CrystalError;
    use crate::fracvector::{ratio, FracVector};
    use crate::symmetries::SymmetryReduction;
    use std::sync::Arc;

    fn fv(rows: Vec<Vec<&str>>) -> FracVector {
        FracVector::create(rows).unwrap()
    }

    fn nacl() -> Assignments {
        Assignments::from_symbols(&["Na", "Cl"]).unwrap()
    }

    fn fcc_primitive_basis() -> FracVector {
        fv(vec![vec!["0", "1/2", "1/2"], vec!["1/2", "0", "1/2"], vec!["1/2", "1/2", "0"]])
    }

    fn rocksalt_rc_request() -> StructureRequest {
        StructureRequest::new()
            .with_assignments(nacl())
            .with_rc_basis(FracVector::eye(3))
            .with_rc_coordgroups(vec![fv(vec![vec!["0", "0", "0"]]), fv(vec![vec!["1/2", "1/2", "1/2"]])])
            .with_hall_symbol("-F 4 2 3")
    }

    fn rocksalt_uc_request() -> StructureRequest {
        StructureRequest::new()
            .with_assignments(nacl())
            .with_uc_basis(fcc_primitive_basis())
            .with_uc_coordgroups(vec![fv(vec![vec!["0", "0", "0"]]), fv(vec![vec!["1/2", "1/2", "1/2"]])])
    }

    fn rocksalt_conventional_groups() -> Vec<FracVector> {
        vec![
            fv(vec![
                vec!["0", "0", "0"],
                vec!["0", "1/2", "1/2"],
                vec!["1/2", "0", "1/2"],
                vec!["1/2", "1/2", "0"],
            ]),
            fv(vec![
                vec!["1/2", "0", "0"],
                vec!["0", "1/2", "0"],
                vec!["0", "0", "1/2"],
                vec!["1/2", "1/2", "1/2"],
            ]),
        ]
    }

    #[test]
    fn test_rc_expands_to_uc() {
        let structure = Structure::create(rocksalt_rc_request()).unwrap();
        let uc = structure.uc().unwrap();
        assert_eq!(uc.sites.counts(), vec![4, 4]);
        assert_eq!(uc.sites.total_number_of_atoms(), 8);
        assert_eq!(uc.cell.basis(), &FracVector::eye(3));
        assert_eq!(uc.sites.coordgroups()[0].get(0).unwrap(), FracVector::create([0, 0, 0]).unwrap());
    }

    #[test]
    fn test_cc_is_uc_when_rc_given() {
        let structure = Structure::create(rocksalt_rc_request()).unwrap();
        assert_eq!(structure.cc().unwrap(), structure.uc().unwrap());
    }

    #[test]
    fn test_primitive_cell_of_rocksalt() {
        let structure = Structure::create(rocksalt_rc_request()).unwrap();
        let pc = structure.pc().unwrap();
        assert_eq!(pc.sites.counts(), vec![1, 1]);
        assert_eq!(pc.cell.basis(), &fcc_primitive_basis());
        assert_eq!(pc.cell.volume(), ratio(1, 4));
    }

    #[test]
    fn test_uc_only_derives_rc_in_conventional_cell() {
        let structure = Structure::create(rocksalt_uc_request()).unwrap();
        let rc = structure.rc().unwrap();
        assert_eq!(rc.sites.hall_symbol(), "-F 4 2 3");
        assert_eq!(rc.sites.counts(), vec![1, 1]);
        assert_eq!(rc.cell.basis(), &FracVector::eye(3));
        assert_eq!(rc.sites.multiplicities(), Some(&[4usize, 4][..]));

        // uc stays as given, cc is the conventional expansion
        assert_eq!(structure.uc().unwrap().sites.total_number_of_atoms(), 2);
        assert_eq!(structure.cc().unwrap().sites.total_number_of_atoms(), 8);
    }

    #[test]
    fn test_consistent_views_accepted() {
        let request = rocksalt_rc_request()
            .with_uc_basis(FracVector::eye(3))
            .with_uc_coordgroups(rocksalt_conventional_groups());
        let structure = Structure::create(request).unwrap();
        assert_eq!(structure.uc().unwrap().sites.counts(), vec![4, 4]);
    }

    #[test]
    fn test_consistency_within_coord_tolerance() {
        // Sites off by 1e-9, one written at the other side of the cell, and a basis off by 1e-9
        let mut groups = rocksalt_conventional_groups();
        groups[0] = fv(vec![
            vec!["1/1000000000", "0", "0"],
            vec!["0", "1/2", "1/2"],
            vec!["1/2", "0", "1/2"],
            vec!["1/2", "1/2", "1"],
        ]);
        let basis = fv(vec![
            vec!["1000000001/1000000000", "0", "0"],
            vec!["0", "1", "0"],
            vec!["0", "0", "1"],
        ]);
        let request = rocksalt_rc_request()
            .with_uc_basis(basis.clone())
            .with_uc_coordgroups(groups.clone());
        let structure = Structure::create(request).unwrap();
        // The given unit cell is kept as given
        assert_eq!(structure.uc().unwrap().cell.basis(), &basis);
        assert_eq!(structure.uc().unwrap().sites.counts(), vec![4, 4]);

        // A site off by 1e-2 is outside the tolerance
        groups[0] = fv(vec![
            vec!["1/100", "0", "0"],
            vec!["0", "1/2", "1/2"],
            vec!["1/2", "0", "1/2"],
            vec!["1/2", "1/2", "0"],
        ]);
        let request = rocksalt_rc_request()
            .with_uc_basis(FracVector::eye(3))
            .with_uc_coordgroups(groups);
        assert!(matches!(Structure::create(request), Err(CrystalError::Structure(_))));
    }

    #[test]
    fn test_inconsistent_views_rejected() {
        let mut groups = rocksalt_conventional_groups();
        groups[1] = fv(vec![
            vec!["1/4", "0", "0"],
            vec!["0", "1/2", "0"],
            vec!["0", "0", "1/2"],
            vec!["1/2", "1/2", "1/2"],
        ]);
        let request = rocksalt_rc_request()
            .with_uc_basis(FracVector::eye(3))
            .with_uc_coordgroups(groups);
        assert!(matches!(Structure::create(request), Err(CrystalError::Structure(_))));

        let request = rocksalt_rc_request()
            .with_uc_basis(FracVector::eye(3).scale(&ratio(2, 1)))
            .with_uc_coordgroups(rocksalt_conventional_groups());
        assert!(matches!(Structure::create(request), Err(CrystalError::Structure(_))));
    }

    #[test]
    fn test_assignments_required_and_counted() {
        let request = StructureRequest::new()
            .with_uc_basis(FracVector::eye(3))
            .with_uc_coordgroups(vec![fv(vec![vec!["0", "0", "0"]])]);
        assert!(matches!(Structure::create(request), Err(CrystalError::Structure(_))));

        let request = rocksalt_uc_request().with_assignments(Assignments::from_symbols(&["Na"]).unwrap());
        assert!(matches!(Structure::create(request), Err(CrystalError::Structure(_))));
    }

    #[test]
    fn test_occupancies_imply_assignments() {
        let na = SiteAssignment::from_symbol("Na").unwrap();
        let cl = SiteAssignment::from_symbol("Cl").unwrap();
        let request = StructureRequest::new()
            .with_uc_basis(fcc_primitive_basis())
            .with_uc_sites(SitesSpec::CoordsAndOccupancies {
                coords: fv(vec![vec!["0", "0", "0"], vec!["1/2", "1/2", "1/2"]]),
                occupancies: vec![na, cl],
            });
        let structure = Structure::create(request).unwrap();
        assert_eq!(structure.assignments(), &nacl());

        let mixed = SiteAssignment::new(vec![
            Assignment::from_symbol("Na").unwrap().with_ratio(ratio(1, 2)).unwrap(),
            Assignment::from_symbol("K").unwrap().with_ratio(ratio(1, 2)).unwrap(),
        ])
        .unwrap();
        let request = StructureRequest::new()
            .with_assignments(nacl())
            .with_uc_basis(fcc_primitive_basis())
            .with_uc_sites(SitesSpec::CoordsAndOccupancies {
                coords: fv(vec![vec!["0", "0", "0"], vec!["1/2", "1/2", "1/2"]]),
                occupancies: vec![mixed, SiteAssignment::from_symbol("Cl").unwrap()],
            });
        assert!(matches!(Structure::create(request), Err(CrystalError::Structure(_))));
    }

    #[derive(Debug)]
    struct FailingFinder;

    impl SymmetryFinder for FailingFinder {
        fn reduce(
            &self,
            _basis: &FracVector,
            _coordgroups: &[FracVector],
        ) -> std::result::Result<SymmetryReduction, CollaboratorError> {
            Err("finder offline".into())
        }
    }

    #[test]
    fn test_symmetry_finder_errors_are_wrapped() {
        let structure = Structure::create(rocksalt_uc_request())
            .unwrap()
            .with_symmetry_finder(Arc::new(FailingFinder));
        match structure.rc() {
            Err(CrystalError::Collaborator { view, source }) => {
                assert_eq!(view, "rc");
                assert_eq!(source.to_string(), "finder offline");
            }
            other => panic!("expected a collaborator error, got {:?}", other),
        }
        // uc does not need the finder
        assert_eq!(structure.uc().unwrap().sites.total_number_of_atoms(), 2);
    }

    #[test]
    fn test_unknown_spacegroup_rejected() {
        let request = rocksalt_rc_request().with_hall_symbol("Xyz");
        assert!(matches!(
            Structure::create(request),
            Err(CrystalError::SpacegroupUnknown(_))
        ));
    }
}
