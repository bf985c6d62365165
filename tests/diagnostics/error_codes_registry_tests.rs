use storyscript::diagnostics::{ERROR_CODES, ErrorCategory, Severity, lookup_error_code};

#[test]
fn registry_has_unique_codes() {
    let mut codes = std::collections::HashSet::new();
    for item in ERROR_CODES {
        assert!(
            codes.insert(item.code),
            "duplicate error code in registry: {}",
            item.code
        );
    }
}

#[test]
fn registry_get_finds_codes() {
    for item in ERROR_CODES {
        let found = lookup_error_code(item.code).expect("code missing from registry");
        assert_eq!(found.title, item.title);
        assert_eq!(found.message, item.message);
    }
}

#[test]
fn codes_are_well_formed() {
    for item in ERROR_CODES {
        assert_eq!(item.code.len(), 5, "{}", item.code);
        assert!(item.code.starts_with('E'), "{}", item.code);
        assert!(item.code[1..].chars().all(|c| c.is_ascii_digit()), "{}", item.code);
    }
}

#[test]
fn only_internal_errors_use_the_internal_category() {
    for item in ERROR_CODES {
        assert_eq!(
            item.category == ErrorCategory::Internal,
            item.code == "E0001",
            "{}",
            item.code
        );
    }
}

#[test]
fn warnings_and_deprecations() {
    let unreachable = lookup_error_code("E0150").unwrap();
    assert_eq!(unreachable.severity, Severity::Warning);
    let hash = lookup_error_code("E0151").unwrap();
    assert_eq!(hash.severity, Severity::Deprecation);
    assert!(
        ERROR_CODES
            .iter()
            .filter(|item| item.severity != Severity::Error)
            .all(|item| item.code == "E0150" || item.code == "E0151")
    );
}
