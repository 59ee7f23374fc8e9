//! Unit tests for wildcard host patterns.

use rstest::rstest;

use super::*;

#[rstest]
#[case::star_label("foo.*.net", "foo.bar.net", true)]
#[case::star_label_other("foo.*.net", "foo.baz.net", true)]
#[case::suffix("*.bar.net", "foo.bar.net", true)]
#[case::suffix_miss("*.bar.net", "foo.baz.net", false)]
#[case::question("user?.example", "user1.example", true)]
#[case::question_needs_one("user?.example", "user.example", false)]
#[case::case_insensitive("STAFF.*", "staff.example.net", true)]
#[case::literal("a.example", "a.example", true)]
#[case::literal_miss("a.example", "a.example.net", false)]
#[case::star_matches_empty("a*.example", "a.example", true)]
#[case::slash_is_ordinary("*/staff", "net/staff", true)]
fn wildcard_matching(#[case] pattern: &str, #[case] host: &str, #[case] expected: bool) {
    let compiled = HostPattern::new(pattern);
    assert_eq!(
        compiled.is_match(host),
        expected,
        "pattern {pattern} against {host}"
    );
}

#[rstest]
#[case::brackets("[x].example", "[x].example")]
#[case::braces("{a,b}.example", "{a,b}.example")]
#[case::backslash("a\\b.example", "a\\b.example")]
fn glob_syntax_is_literal(#[case] pattern: &str, #[case] host: &str) {
    assert!(HostPattern::new(pattern).is_match(host));
}

#[test]
fn braces_do_not_expand() {
    assert!(!HostPattern::new("{a,b}.example").is_match("a.example"));
}

#[test]
fn repeated_stars_behave_like_one() {
    let pattern = HostPattern::new("foo**.net");
    assert!(pattern.is_match("foo.bar.net"));
}

#[test]
fn default_matches_everything() {
    let pattern = HostPattern::default();
    assert_eq!(pattern.as_str(), MATCH_ALL);
    assert!(pattern.is_match("anything.example"));
    assert!(pattern.is_match(""));
}

#[test]
fn display_shows_source() {
    assert_eq!(HostPattern::new("*.NET").to_string(), "*.NET");
}

#[test]
fn translation_escapes_glob_metacharacters() {
    assert_eq!(translate("a[b]{c}***?"), "a[[]b[]][{]c[}]*?");
}

#[rstest]
#[case::ascii_folds("AB*", "ab.net", true)]
#[case::same_non_ascii("ÄB*", "Äb.net", true)]
#[case::non_ascii_is_not_folded("ÄB*", "äb.net", false)]
#[case::non_ascii_host_is_not_folded("äb*", "ÄB.net", false)]
fn case_folding_matches_name_folding(
    #[case] pattern: &str,
    #[case] host: &str,
    #[case] expected: bool,
) {
    assert_eq!(HostPattern::new(pattern).is_match(host), expected);
    let names_agree = fold_name(pattern.trim_end_matches('*'))
        == fold_name(host.trim_end_matches(".net"));
    assert_eq!(names_agree, expected, "pattern and name folding disagree");
}
