// src/services/constraint_evaluator.rs

use crate::models::sharing::AccessConstraint;

/// Operador de comparação de uma restrição.
///
/// Os ids 1, 2 e 3 têm operador próprio; o id 4 e qualquer id desconhecido
/// caem em `LessOrEqual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOperator {
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl ConstraintOperator {
    pub const GREATER_ID: i32 = 1;
    pub const GREATER_OR_EQUAL_ID: i32 = 2;
    pub const LESS_ID: i32 = 3;
    pub const LESS_OR_EQUAL_ID: i32 = 4;

    pub fn from_id(operator_id: i32) -> Self {
        match operator_id {
            Self::GREATER_ID => ConstraintOperator::Greater,
            Self::GREATER_OR_EQUAL_ID => ConstraintOperator::GreaterOrEqual,
            Self::LESS_ID => ConstraintOperator::Less,
            _ => ConstraintOperator::LessOrEqual,
        }
    }

    /// `true` apenas para os ids canônicos 1 a 4.
    pub fn is_known_id(operator_id: i32) -> bool {
        (Self::GREATER_ID..=Self::LESS_OR_EQUAL_ID).contains(&operator_id)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ConstraintOperator::Greater => ">",
            ConstraintOperator::GreaterOrEqual => ">=",
            ConstraintOperator::Less => "<",
            ConstraintOperator::LessOrEqual => "<=",
        }
    }

    pub fn compare(self, measured: i64, threshold: i64) -> bool {
        match self {
            ConstraintOperator::Greater => measured > threshold,
            ConstraintOperator::GreaterOrEqual => measured >= threshold,
            ConstraintOperator::Less => measured < threshold,
            ConstraintOperator::LessOrEqual => measured <= threshold,
        }
    }
}

/// Valor de referência inteiro: trunca em direção a zero (NaN vira 0,
/// infinitos saturam). Só o limite é truncado, nunca o valor medido.
pub fn threshold(constraint: &AccessConstraint) -> i64 {
    constraint.property_value.trunc() as i64
}

pub fn satisfies(constraint: &AccessConstraint, product_quantity: i32) -> bool {
    ConstraintOperator::from_id(constraint.operator_id)
        .compare(i64::from(product_quantity), threshold(constraint))
}

/// Conjunção de todas as restrições (verdadeiro para a lista vazia).
pub fn satisfies_all(constraints: &[AccessConstraint], product_quantity: i32) -> bool {
    constraints.iter().all(|c| satisfies(c, product_quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint(operator_id: i32, property_value: f64) -> AccessConstraint {
        AccessConstraint {
            operator_id,
            property_id: 1,
            property_value,
            ..Default::default()
        }
    }

    #[test]
    fn greater_is_strict() {
        assert!(!satisfies(&constraint(1, 10.0), 10));
        assert!(satisfies(&constraint(1, 10.0), 11));
    }

    #[test]
    fn greater_or_equal_includes_threshold() {
        assert!(satisfies(&constraint(2, 10.0), 10));
        assert!(!satisfies(&constraint(2, 10.0), 9));
    }

    #[test]
    fn less_is_strict() {
        assert!(satisfies(&constraint(3, 10.0), 9));
        assert!(!satisfies(&constraint(3, 10.0), 10));
    }

    #[test]
    fn less_or_equal_and_unknown_ids_share_the_fallback() {
        for operator_id in [4, 99, 0, -1] {
            assert!(satisfies(&constraint(operator_id, 10.0), 10), "id {operator_id}");
            assert!(!satisfies(&constraint(operator_id, 10.0), 11), "id {operator_id}");
        }
        assert_eq!(ConstraintOperator::from_id(99), ConstraintOperator::LessOrEqual);
        assert!(!ConstraintOperator::is_known_id(99));
        assert!(ConstraintOperator::is_known_id(4));
    }

    #[test]
    fn threshold_is_truncated_not_the_quantity() {
        // 10.9 -> 10: a quantidade 10 já satisfaz ">= 10"
        assert!(satisfies(&constraint(2, 10.9), 10));
        // 10.9 -> 10: "> 10" ainda exige 11
        assert!(!satisfies(&constraint(1, 10.9), 10));
        assert!(satisfies(&constraint(1, 10.9), 11));
        // Negativos truncam em direção a zero
        assert_eq!(threshold(&constraint(1, -2.7)), -2);
    }

    #[test]
    fn non_finite_thresholds_do_not_panic() {
        assert_eq!(threshold(&constraint(1, f64::NAN)), 0);
        assert!(satisfies(&constraint(3, f64::INFINITY), i32::MAX));
        assert!(satisfies(&constraint(1, f64::NEG_INFINITY), i32::MIN));
    }

    #[test]
    fn empty_constraint_list_is_vacuously_satisfied() {
        assert!(satisfies_all(&[], 0));
        let list = [constraint(1, 5.0), constraint(3, 20.0)];
        assert!(satisfies_all(&list, 10));
        assert!(!satisfies_all(&list, 25));
    }
}
