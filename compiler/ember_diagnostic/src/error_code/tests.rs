use super::*;

#[test]
fn display_matches_as_str() {
    assert_eq!(ErrorCode::E1001.to_string(), "E1001");
    assert_eq!(ErrorCode::E2006.as_str(), "E2006");
    assert_eq!(ErrorCode::E4002.to_string(), "E4002");
}

#[test]
fn leading_digit_selects_category() {
    assert_eq!(ErrorCode::E1001.category(), ErrorCategory::DuplicateDefinition);
    assert_eq!(ErrorCode::E2005.category(), ErrorCategory::UnresolvedReference);
    assert_eq!(ErrorCode::E3002.category(), ErrorCategory::UnsupportedConstruct);
    assert_eq!(ErrorCode::E4001.category(), ErrorCategory::Layout);
}
