#[cfg(test)]
mod _tests_structure_transforms {
    use super::super::crystal_structure::Structure;
    use super::super::structure_request::StructureRequest;
    use crate::assignments::Assignments;
    use crate::error::CrystalError;
    use crate::fracvector::{ratio, FracVector};

    fn fv(rows: Vec<Vec<&str>>) -> FracVector {
        FracVector::create(rows).unwrap()
    }

    fn fcc_primitive_basis() -> FracVector {
        fv(vec![vec!["0", "1/2", "1/2"], vec!["1/2", "0", "1/2"], vec!["1/2", "1/2", "0"]])
    }

    fn rocksalt_primitive() -> Structure {
        let request = StructureRequest::new()
            .with_assignments(Assignments::from_symbols(&["Na", "Cl"]).unwrap())
            .with_uc_basis(fcc_primitive_basis())
            .with_uc_coordgroups(vec![fv(vec![vec!["0", "0", "0"]]), fv(vec![vec!["1/2", "1/2", "1/2"]])]);
        Structure::create(request).unwrap()
    }

    #[test]
    fn test_supercell_keeps_composition() {
        let structure = rocksalt_primitive();
        let doubled = structure.build_supercell(&FracVector::eye(3).scale(&ratio(2, 1))).unwrap();
        assert_eq!(doubled.uc_counts().unwrap(), vec![8, 8]);
        assert_eq!(doubled.formula().unwrap(), structure.formula().unwrap());
        assert_eq!(doubled.uc_volume().unwrap(), structure.uc_volume().unwrap() * ratio(8, 1));
        assert_eq!(doubled.assignments(), structure.assignments());
    }

    #[test]
    fn test_cubic_supercell_of_fcc() {
        let cubic = rocksalt_primitive().build_cubic_supercell(Some(20)).unwrap();
        assert_eq!(cubic.uc_basis().unwrap(), &FracVector::eye(3));
        assert_eq!(cubic.uc_counts().unwrap(), vec![4, 4]);
    }

    #[test]
    fn test_orthogonal_supercell_of_fcc() {
        let ortho = rocksalt_primitive().build_orthogonal_supercell(None, [true; 3]).unwrap();
        let niggli = ortho.uc_cell().unwrap().niggli_matrix().clone();
        assert_eq!(niggli.get(1).unwrap(), FracVector::create([0, 0, 0]).unwrap());
        let atoms = ortho.uc_nbr_atoms().unwrap();
        assert_eq!(atoms % 2, 0);
        assert!(atoms >= 8);
    }

    #[test]
    fn test_rational_transform_to_primitive() {
        let conventional = rocksalt_primitive().build_cubic_supercell(None).unwrap();
        let to_primitive = fv(vec![vec!["0", "1/2", "1/2"], vec!["1/2", "0", "1/2"], vec!["1/2", "1/2", "0"]]);
        let primitive = conventional.transform(&to_primitive, 20).unwrap();
        assert_eq!(primitive.uc_counts().unwrap(), vec![1, 1]);
        assert_eq!(primitive.uc_basis().unwrap(), &fcc_primitive_basis());
    }

    #[test]
    fn test_invalid_supercells_rejected() {
        let structure = rocksalt_primitive();
        let half = fv(vec![vec!["1/2", "0", "0"], vec!["0", "1", "0"], vec!["0", "0", "1"]]);
        assert!(matches!(structure.build_supercell(&half), Err(CrystalError::Transform(_))));
        let mirror = FracVector::create([[-1, 0, 0], [0, 1, 0], [0, 0, 1]]).unwrap();
        assert!(matches!(structure.build_supercell(&mirror), Err(CrystalError::Transform(_))));
    }

    #[test]
    fn test_clean_keeps_built_views() {
        let structure = rocksalt_primitive();
        let cleaned = structure.clean().unwrap();
        assert_eq!(cleaned.uc().unwrap(), structure.uc().unwrap());
        assert_eq!(cleaned.formula().unwrap(), "ClNa");
    }
}
