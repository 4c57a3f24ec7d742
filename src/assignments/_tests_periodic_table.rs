#[cfg(test)]
mod _tests_periodic_table {
    use super::super::periodic_table::*;

    #[test]
    fn test_symbols() {
        assert_eq!(atomic_symbol(1).unwrap(), "H");
        assert_eq!(atomic_symbol(26).unwrap(), "Fe");
        assert_eq!(atomic_symbol(118).unwrap(), "Og");
        assert!(atomic_symbol(0).is_err());
        assert!(atomic_symbol(119).is_err());
    }

    #[test]
    fn test_atomic_numbers() {
        assert_eq!(atomic_number("Na").unwrap(), 11);
        assert_eq!(atomic_number("cl").unwrap(), 17);
        assert_eq!(atomic_number(" 8 ").unwrap(), 8);
        assert!(atomic_number("Xx").is_err());
        assert!(atomic_number("200").is_err());

        for (i, symbol) in ELEMENT_SYMBOLS.iter().enumerate() {
            assert_eq!(atomic_number(symbol).unwrap() as usize, i + 1);
        }
    }
}
