use super::*;

#[test]
fn test_element_id_valid() {
    let id = ElementId::new(7);
    assert!(id.is_valid());
    assert_eq!(id.index(), 7);
    assert_eq!(id.raw(), 7);
}

#[test]
fn test_element_id_invalid() {
    assert!(!ElementId::INVALID.is_valid());
    assert!(!ElementId::default().is_valid());
}

#[test]
fn test_element_id_display() {
    assert_eq!(ElementId::new(3).to_string(), "#3");
    assert_eq!(ElementId::INVALID.to_string(), "#invalid");
    assert_eq!(format!("{:?}", ElementId::INVALID), "ElementId::INVALID");
}

#[test]
fn test_element_id_size() {
    assert_eq!(std::mem::size_of::<ElementId>(), 4);
}
