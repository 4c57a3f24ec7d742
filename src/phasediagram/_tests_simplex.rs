#[cfg(test)]
mod _tests_simplex {
    use super::super::simplex::*;
    use crate::error::CrystalError;
    use crate::fracvector::ratio;
    use num_rational::BigRational;

    fn r(n: i64) -> BigRational {
        ratio(n, 1)
    }

    #[test]
    fn test_unique_optimum() {
        // min 2x + 3y, x + y = 4, x - y = 0
        let outcome = solve_equality_lp(&[r(2), r(3)], &[vec![r(1), r(1)], vec![r(1), r(-1)]], &[r(4), r(0)]).unwrap();
        assert_eq!(
            outcome,
            LpOutcome::Optimal {
                value: r(10),
                solution: vec![r(2), r(2)]
            }
        );
    }

    #[test]
    fn test_picks_cheapest_vertex() {
        // min -x - 2y, x + y = 3: all weight on y
        let outcome = solve_equality_lp(&[r(-1), r(-2)], &[vec![r(1), r(1)]], &[r(3)]).unwrap();
        assert_eq!(
            outcome,
            LpOutcome::Optimal {
                value: r(-6),
                solution: vec![r(0), r(3)]
            }
        );
    }

    #[test]
    fn test_fractional_solution() {
        // 2x = 1
        match solve_equality_lp(&[r(1)], &[vec![r(2)]], &[r(1)]).unwrap() {
            LpOutcome::Optimal { value, solution } => {
                assert_eq!(value, ratio(1, 2));
                assert_eq!(solution, vec![ratio(1, 2)]);
            }
            other => panic!("expected an optimum, got {:?}", other),
        }
    }

    #[test]
    fn test_infeasible() {
        let outcome = solve_equality_lp(&[r(1), r(1)], &[vec![r(1), r(1)]], &[r(-1)]).unwrap();
        assert_eq!(outcome, LpOutcome::Infeasible);
        let outcome = solve_equality_lp(&[], &[vec![]], &[r(1)]).unwrap();
        assert_eq!(outcome, LpOutcome::Infeasible);
    }

    #[test]
    fn test_unbounded() {
        let outcome = solve_equality_lp(&[r(-1), r(0)], &[vec![r(1), r(-1)]], &[r(0)]).unwrap();
        assert_eq!(outcome, LpOutcome::Unbounded);
    }

    #[test]
    fn test_redundant_constraints() {
        let constraints = vec![vec![r(1), r(1)], vec![r(2), r(2)]];
        let outcome = solve_equality_lp(&[r(1), r(0)], &constraints, &[r(1), r(2)]).unwrap();
        assert_eq!(
            outcome,
            LpOutcome::Optimal {
                value: r(0),
                solution: vec![r(0), r(1)]
            }
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let result = solve_equality_lp(&[r(1), r(1)], &[vec![r(1)]], &[r(1)]);
        assert!(matches!(result, Err(CrystalError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_matrix_rank() {
        assert_eq!(matrix_rank(&[vec![r(1), r(0)], vec![r(0), r(1)], vec![r(1), r(1)]]), 2);
        assert_eq!(matrix_rank(&[vec![r(1), r(2)], vec![r(2), r(4)]]), 1);
        assert_eq!(matrix_rank(&[vec![r(0), r(0)]]), 0);
        assert_eq!(matrix_rank(&[]), 0);
    }
}
