#[cfg(test)]
mod _tests_collaborators {
    use super::super::collaborators::*;
    use crate::fracvector::FracVector;

    #[test]
    fn test_in_memory_store() {
        let mut store = InMemoryMetadataStore::new();
        store.add_tag("mp-1", "source", "icsd");
        store.add_tag("mp-1", "source", "cod");
        store.add_tag("mp-1", "phase", "alpha");
        store.add_ref("mp-1", "doi:10.1000/1");

        let tags = store.get_tags("mp-1").unwrap();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&StructureTag {
            name: "source".to_string(),
            value: "cod".to_string()
        }));
        assert_eq!(store.get_refs("mp-1").unwrap().len(), 1);

        assert!(store.get_tags("unknown").unwrap().is_empty());
        assert!(store.get_refs("unknown").unwrap().is_empty());
    }

    #[test]
    fn test_trivial_finder_falls_back_to_p1() {
        let groups = vec![FracVector::create(vec![vec!["0", "0", "0"], vec!["1/10", "1/5", "3/10"]]).unwrap()];
        let reduction = TrivialSymmetryFinder.reduce(&FracVector::eye(3), &groups).unwrap();
        assert_eq!(reduction.hall_symbol, "P 1");
        assert_eq!(reduction.coordgroups, groups);
    }
}
