use super::*;

#[test]
fn test_codes_round_trip_in_order() {
    for (index, ty) in ValueType::ALL.iter().enumerate() {
        assert_eq!(ty.index(), index);
        assert_eq!(ValueType::from_code(ty.code()), Some(*ty));
    }
}

#[test]
fn test_unknown_code_rejected() {
    assert_eq!(ValueType::from_code(12), None);
    assert_eq!(ValueType::from_code(u32::MAX), None);
}

#[test]
fn test_matrix_mapping() {
    assert_eq!(ValueType::Real.matrix_of(), ValueType::MatrixReal);
    assert_eq!(ValueType::MatrixReal.matrix_of(), ValueType::MatrixReal);
    assert_eq!(ValueType::MatrixComplex.scalar_of(), ValueType::Complex);
    assert_eq!(ValueType::Set.matrix_of(), ValueType::Variant);
    assert_eq!(ValueType::None.matrix_of(), ValueType::None);
}

#[test]
fn test_classification() {
    assert!(ValueType::Integer.is_scalar());
    assert!(!ValueType::Tuple.is_scalar());
    assert!(ValueType::MatrixBoolean.is_matrix());
    assert!(!ValueType::Boolean.is_matrix());
}
