#[cfg(test)]
mod _tests_site_assignments {
    use super::super::site_assignments::*;
    use crate::fracvector::frac_math::ratio;

    #[test]
    fn test_assignment() {
        let fe = Assignment::from_symbol("Fe").unwrap();
        assert_eq!(fe.atomic_number(), 26);
        assert_eq!(fe.symbol(), "Fe");
        assert_eq!(fe.ratio(), &ratio(1, 1));
        assert!(fe.extensions().is_empty());

        let half = fe.clone().with_ratio(ratio(1, 2)).unwrap();
        assert_eq!(half.extensions(), vec![Extension::Disordered]);
        assert!(fe.clone().with_ratio(ratio(3, 2)).is_err());
        assert!(fe.clone().with_ratio(ratio(0, 1)).is_err());

        let tagged = fe
            .with_weight(ratio(56, 1))
            .with_magnetic_moment([ratio(0, 1), ratio(0, 1), ratio(2, 1)]);
        assert_eq!(tagged.extensions(), vec![Extension::Isotope, Extension::MagneticMoments]);
        assert!(Assignment::new(0).is_err());
    }

    #[test]
    fn test_site_assignment_ratio_sum() {
        let fe = Assignment::from_symbol("Fe").unwrap().with_ratio(ratio(1, 2)).unwrap();
        let ni = Assignment::from_symbol("Ni").unwrap().with_ratio(ratio(1, 2)).unwrap();
        let site = SiteAssignment::new(vec![fe.clone(), ni]).unwrap();
        assert_eq!(site.len(), 2);
        assert_eq!(site.symbols(), vec!["Fe", "Ni"]);
        assert_eq!(site.symbol(), "[Fe0.50,Ni0.50]");
        assert_eq!(site.ratio(), None);
        assert_eq!(site.wyckoff_label(), "(Fe0.50Ni0.50)");

        let co = Assignment::from_symbol("Co").unwrap().with_ratio(ratio(2, 3)).unwrap();
        assert!(SiteAssignment::new(vec![fe, co]).is_err());
        assert!(SiteAssignment::new(Vec::new()).is_err());
    }

    #[test]
    fn test_wyckoff_label_truncates() {
        let o = Assignment::from_symbol("O").unwrap().with_ratio(ratio(2, 3)).unwrap();
        assert_eq!(SiteAssignment::new(vec![o]).unwrap().wyckoff_label(), "(O0.66)");
        assert_eq!(SiteAssignment::from_symbol("O").unwrap().wyckoff_label(), "O");
    }

    #[test]
    fn test_assignments() {
        let plain = Assignments::from_symbols(&["Na", "Cl"]).unwrap();
        assert_eq!(plain.len(), 2);
        assert_eq!(plain.symbols(), vec!["Na", "Cl"]);
        assert_eq!(plain.elements(), vec!["Cl", "Na"]);
        assert!(!plain.extended());
        assert_eq!(Assignments::from_atomic_numbers(&[11, 17]).unwrap(), plain);

        let (symbols, ratios, counts) = plain.species_counts(&[4, 4]).unwrap();
        assert_eq!(symbols, vec!["Na", "Cl"]);
        assert_eq!(ratios, vec![ratio(1, 1), ratio(1, 1)]);
        assert_eq!(counts, vec![4, 4]);
        assert!(plain.species_counts(&[4]).is_err());

        let fe = Assignment::from_symbol("Fe").unwrap().with_ratio(ratio(1, 2)).unwrap();
        let disordered = Assignments::new(vec![SiteAssignment::new(vec![fe]).unwrap()]);
        assert!(disordered.extended());
        assert_eq!(disordered.extensions(), vec![Extension::Disordered]);
        assert_eq!(Extension::Disordered.to_string(), "disordered");
    }
}
