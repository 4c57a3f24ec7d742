#[cfg(test)]
mod _tests_symmetry_operations {
    use super::super::symmetry_operations::*;
    use crate::fracvector::FracVector;
    use nalgebra::{Matrix3, Vector3};

    fn op(text: &str) -> SymmetryOperation {
        SymmetryOperation::parse(text).unwrap()
    }

    #[test]
    fn test_parse_glide() {
        let g = op("-x+1/2,y,z");
        assert_eq!(g.rotation, Matrix3::new(-1, 0, 0, 0, 1, 0, 0, 0, 1));
        assert_eq!(g.translation, Vector3::new(6, 0, 0));
        assert_eq!(g.to_string(), "-x+1/2,y,z");
    }

    #[test]
    fn test_parse_hexagonal_and_decimal() {
        let s = op("x-y, x, z+1/6");
        assert_eq!(s.rotation, Matrix3::new(1, -1, 0, 1, 0, 0, 0, 0, 1));
        assert_eq!(s.translation, Vector3::new(0, 0, 2));
        assert_eq!(s.to_string(), "x-y,x,z+1/6");

        assert_eq!(op("x,y,z+0.5"), op("x,y,1/2+z"));
        // Translations are taken modulo the lattice
        assert_eq!(op("x-1,y,z"), SymmetryOperation::identity());
        assert_eq!("X,Y,Z".parse::<SymmetryOperation>().unwrap(), SymmetryOperation::identity());
    }

    #[test]
    fn test_parse_errors() {
        assert!(SymmetryOperation::parse("x,y").is_err());
        assert!(SymmetryOperation::parse("x,y,q").is_err());
        assert!(SymmetryOperation::parse("x,y,z+1/5").is_err());
        assert!(SymmetryOperation::parse("x,,z").is_err());
    }

    #[test]
    fn test_compose_and_order() {
        let screw = op("-x,-y,z+1/2");
        assert!(screw.compose(&screw).is_identity());
        assert_eq!(screw.order(), 2);
        assert_eq!(op("-y,x-y,z").order(), 3);
        assert_eq!(op("x-y,x,z").order(), 6);
        assert_eq!(op("-y,x,z+1/4").order(), 4);
        assert_eq!(SymmetryOperation::identity().order(), 1);
    }

    #[test]
    fn test_inverse() {
        let s = op("-y,x-y,z+1/3");
        assert!(s.compose(&s.inverse()).is_identity());
        assert!(s.inverse().compose(&s).is_identity());
        assert_eq!(s.determinant(), 1);
        assert!(!SymmetryOperation::inversion().is_proper());
    }

    #[test]
    fn test_origin_shift() {
        let shifted = SymmetryOperation::inversion().with_origin_shift(&Vector3::new(3, 0, 0));
        assert_eq!(shifted, op("-x+1/2,-y,-z"));
    }

    #[test]
    fn test_apply_exact_and_float() {
        let g = op("-x+1/2,y,z");
        let coord = FracVector::create(vec!["1/8", "1/3", "1/2"]).unwrap();
        let image = g.apply(&coord).unwrap();
        assert_eq!(image, FracVector::create(vec!["3/8", "1/3", "1/2"]).unwrap());

        let p = g.apply_f64(Vector3::new(0.125, 0.5, 0.25));
        assert!((p - Vector3::new(0.375, 0.5, 0.25)).norm() < 1e-12);
    }

    #[test]
    fn test_close_group() {
        let four = op("-y,x,z");
        let ops = close_group(&[four]).unwrap();
        assert_eq!(ops.len(), 4);
        assert!(ops[0].is_identity());

        let ops = close_group(&[four, SymmetryOperation::inversion()]).unwrap();
        assert_eq!(ops.len(), 8);

        // A pure translation that is not a lattice vector generates its own coset
        let ops = close_group(&[SymmetryOperation::pure_translation(Vector3::new(4, 4, 4))]).unwrap();
        assert_eq!(ops.len(), 3);
    }
}
