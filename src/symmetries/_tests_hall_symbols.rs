#[cfg(test)]
mod _tests_hall_symbols {
    use super::super::hall_symbols::*;
    use super::super::symmetry_operations::SymmetryOperation;

    fn op(text: &str) -> SymmetryOperation {
        SymmetryOperation::parse(text).unwrap()
    }

    fn order(hall: &str) -> usize {
        operations_from_hall(hall).unwrap().len()
    }

    #[test]
    fn test_normalize_hall_symbol() {
        assert_eq!(normalize_hall_symbol("-p  2YBC"), "-P 2ybc");
        assert_eq!(normalize_hall_symbol(" p 31 2C (0 0 1) "), "P 31 2c (0 0 1)");
        assert_eq!(normalize_hall_symbol("-F_4_2_3"), "-F 4 2 3");
    }

    #[test]
    fn test_triclinic_and_monoclinic() {
        assert_eq!(order("P 1"), 1);
        assert_eq!(order("-P 1"), 2);

        let ops = operations_from_hall("-P 2ybc").unwrap();
        assert_eq!(ops.len(), 4);
        assert!(ops[0].is_identity());
        assert!(ops.contains(&op("-x,y+1/2,-z+1/2")));
        assert!(ops.contains(&op("x,-y+1/2,z+1/2")));
        assert!(ops.contains(&op("-x,-y,-z")));
    }

    #[test]
    fn test_centring_translations() {
        let ops = operations_from_hall("C 2y").unwrap();
        assert_eq!(ops.len(), 4);
        assert!(ops.contains(&op("x+1/2,y+1/2,z")));
        assert!(ops.contains(&op("-x+1/2,y+1/2,-z")));

        assert_eq!(order("R 3"), 9);
        assert!(operations_from_hall("R 3").unwrap().contains(&op("x+2/3,y+1/3,z+1/3")));
    }

    #[test]
    fn test_orthorhombic_glides() {
        let ops = operations_from_hall("-P 2ac 2n").unwrap();
        assert_eq!(ops.len(), 8);
        assert!(ops.contains(&op("-x+1/2,-y,z+1/2")));
        assert!(ops.contains(&op("x+1/2,-y+1/2,-z+1/2")));
    }

    #[test]
    fn test_large_groups() {
        assert_eq!(order("-F 4 2 3"), 192);
        assert_eq!(order("-P 6c 2c"), 24);
        assert_eq!(order("-I 4bd 2c 3"), 96);
        assert_eq!(order("-F 4vw 2vw 3"), 192);
        assert_eq!(order("-R 3 2\""), 36);
    }

    #[test]
    fn test_axis_defaults() {
        // Second 2-fold after a 4-fold lies along x
        let ops = operations_from_hall("P 4 2").unwrap();
        assert!(ops.contains(&op("x,-y,-z")));

        // After a 3-fold it lies along a-b, the double prime along a+b
        assert!(operations_from_hall("P 3 2").unwrap().contains(&op("-y,-x,-z")));
        assert!(operations_from_hall("P 3 2\"").unwrap().contains(&op("y,x,-z")));

        // The third symbol of a cubic group is the body diagonal
        assert!(operations_from_hall("P 2 2 3").unwrap().contains(&op("z,x,y")));
        assert_eq!(order("P 3*"), 3);
    }

    #[test]
    fn test_screw_and_origin_shift() {
        let ops = operations_from_hall("P 31 2c (0 0 1)").unwrap();
        assert_eq!(ops.len(), 6);
        assert!(ops.contains(&op("-y,x-y,z+1/3")));

        let ops = operations_from_hall("P 61").unwrap();
        assert!(ops.contains(&op("x-y,x,z+1/6")));
    }

    #[test]
    fn test_generators() {
        let gens = hall_generators("-C 2yc").unwrap();
        // centring, inversion, 2-fold
        assert_eq!(gens.len(), 3);
        assert_eq!(gens[0], SymmetryOperation::pure_translation(nalgebra::Vector3::new(6, 6, 0)));
    }

    #[test]
    fn test_invalid_symbols() {
        assert!(operations_from_hall("").is_err());
        assert!(operations_from_hall("Q 2").is_err());
        assert!(operations_from_hall("P 5").is_err());
        assert!(operations_from_hall("P 2 2 2").is_err());
        assert!(operations_from_hall("P 2q").is_err());
        assert!(operations_from_hall("P 2 (0 0)").is_err());
        assert!(operations_from_hall("Fm-3m").is_err());
    }
}
