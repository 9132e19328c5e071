//! Distinguished names in their natural most-specific-first notation versus
//! the root-to-leaf component paths the tree is keyed by.

/// Split a DN on its commas and reverse it into a root-to-leaf path, so
/// `CN=Alice,OU=Users,DC=example,DC=com` becomes
/// `[DC=com, DC=example, OU=Users, CN=Alice]`.
///
/// Every comma separates components, escaped or not.  The empty string is
/// the single empty component, which never resolves.
pub fn dn_to_path(dn: &str) -> Vec<String> {
    dn.split(',').rev().map(str::to_string).collect()
}

/// Inverse of `dn_to_path`.
pub fn path_to_dn(path: &[String]) -> String {
    let mut components: Vec<&str> = path.iter().map(String::as_str).collect();
    components.reverse();
    components.join(",")
}

#[test]
fn test_dn_to_path() {
    assert_eq!(
        dn_to_path("CN=Alice,OU=Users,DC=example,DC=com"),
        vec!["DC=com", "DC=example", "OU=Users", "CN=Alice"]
    );
    assert_eq!(dn_to_path("DC=com"), vec!["DC=com"]);
    assert_eq!(dn_to_path(""), vec![""]);
    assert_eq!(
        dn_to_path(r"CN=Doe\, John,DC=com"),
        vec!["DC=com", " John", r"CN=Doe\"]
    );
}

#[test]
fn test_path_to_dn() {
    let path = dn_to_path("CN=Alice,OU=Users,DC=example,DC=com");
    assert_eq!(path_to_dn(&path), "CN=Alice,OU=Users,DC=example,DC=com");
    assert_eq!(path_to_dn(&[]), "");

    let escaped = dn_to_path(r"CN=Doe\, John,DC=com");
    assert_eq!(path_to_dn(&escaped), r"CN=Doe\, John,DC=com");
}
