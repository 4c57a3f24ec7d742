#[cfg(test)]
mod _tests_symmetry_reduction {
    use super::super::spacegroups::Spacegroup;
    use super::super::symmetry_reduction::*;
    use crate::fracvector::FracVector;

    fn coords(rows: Vec<Vec<&str>>) -> FracVector {
        FracVector::create(rows).unwrap()
    }

    fn rocksalt_conventional() -> Vec<FracVector> {
        vec![
            coords(vec![
                vec!["0", "0", "0"],
                vec!["0", "1/2", "1/2"],
                vec!["1/2", "0", "1/2"],
                vec!["1/2", "1/2", "0"],
            ]),
            coords(vec![
                vec!["1/2", "0", "0"],
                vec!["0", "1/2", "0"],
                vec!["0", "0", "1/2"],
                vec!["1/2", "1/2", "1/2"],
            ]),
        ]
    }

    #[test]
    fn test_orbit() {
        let fm3m = Spacegroup::parse("225").unwrap();
        let origin = FracVector::create(vec![0, 0, 0]).unwrap();
        assert_eq!(orbit(&origin, fm3m.operations()).unwrap().len(), 4);

        // Fixed by (x, -z+1/2, -y+1/2), so half the generic multiplicity
        let special = FracVector::create(vec!["1/10", "1/5", "3/10"]).unwrap();
        assert_eq!(orbit(&special, fm3m.operations()).unwrap().len(), 96);

        let generic = FracVector::create(vec!["1/10", "1/5", "7/20"]).unwrap();
        assert_eq!(orbit(&generic, fm3m.operations()).unwrap().len(), 192);
    }

    #[test]
    fn test_wyckoff_letters() {
        assert_eq!(wyckoff_letters(&[1, 2, 4, 2], 4), vec!['a', 'b', GENERIC_WYCKOFF, 'b']);
        assert_eq!(wyckoff_letters(&[1, 1], 1), vec!['a', 'a']);
    }

    #[test]
    fn test_reduce_by_operations_keeps_first_of_each_orbit() {
        let p21c = Spacegroup::parse("-P 2ybc").unwrap();
        let group: Vec<FracVector> = coords(vec![
            vec!["1/10", "1/5", "3/10"],
            vec!["9/10", "7/10", "1/5"],
            vec!["0", "0", "0"],
            vec!["0", "1/2", "1/2"],
        ])
        .rows()
        .unwrap();
        let kept = reduce_by_operations(&group, p21c.operations()).unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].0, group[0]);
        assert_eq!(kept[0].1, 4);
        assert_eq!(kept[1].0, group[2]);
        assert_eq!(kept[1].1, 2);
    }

    #[test]
    fn test_trivial_reduce_rocksalt() {
        let basis = FracVector::eye(3);
        let reduced = trivial_symmetry_reduce(&basis, &rocksalt_conventional()).unwrap();
        assert_eq!(reduced.hall_symbol, "-F 4 2 3");
        assert_eq!(reduced.coordgroups.len(), 2);
        assert_eq!(reduced.coordgroups[0], coords(vec![vec!["0", "0", "0"]]));
        assert_eq!(reduced.coordgroups[1], coords(vec![vec!["1/2", "0", "0"]]));
        assert_eq!(reduced.multiplicities, vec![4, 4]);
        assert_eq!(reduced.wyckoff_symbols, vec!['a', 'a']);
        assert_eq!(reduced.basis, basis);
    }

    #[test]
    fn test_trivial_reduce_without_symmetry() {
        let basis = FracVector::eye(3);
        let groups = vec![coords(vec![vec!["0", "0", "0"], vec!["1/10", "1/5", "3/10"]])];
        let reduced = trivial_symmetry_reduce(&basis, &groups).unwrap();
        assert_eq!(reduced.hall_symbol, "P 1");
        assert_eq!(reduced.coordgroups, groups);
        assert_eq!(reduced.multiplicities, vec![1, 1]);
    }

    #[test]
    fn test_trivial_reduce_falls_back_when_symmetry_is_off_setting() {
        // Symmetric about the x axis, which no tetragonal table setting uses
        let basis = FracVector::eye(3);
        let groups = vec![coords(vec![vec!["0", "0", "0"], vec!["1/10", "0", "0"]])];
        let reduced = trivial_symmetry_reduce(&basis, &groups).unwrap();
        assert_eq!(reduced.hall_symbol, "P 1");
        assert_eq!(reduced.coordgroups, groups);
        assert_eq!(reduced.wyckoff_symbols, vec!['a', 'a']);
    }
}
