use super::*;

#[test]
fn connection_options_are_accepted_after_the_subcommand() {
    let cli = Cli::try_parse_from([
        "spend",
        "today",
        "--tz-offset",
        "330",
        "--store",
        "/tmp/spend.json",
        "--base-url",
        "http://example.test",
        "--session-token",
        "abc",
    ])
    .expect("parse");

    assert_eq!(cli.tz_offset, Some(330));
    assert_eq!(cli.store, Some(PathBuf::from("/tmp/spend.json")));
    assert_eq!(cli.base_url, "http://example.test");
    assert_eq!(cli.session_token.as_deref(), Some("abc"));
    assert!(matches!(cli.command, Command::Today));
}

#[test]
fn negative_offset_parses_on_nested_subcommand() {
    let cli = Cli::try_parse_from(["spend", "remote", "month", "--year", "2026", "--month", "0", "--tz-offset=-300"])
        .expect("parse");
    assert_eq!(cli.tz_offset, Some(-300));
}

#[test]
fn month_requires_year() {
    assert!(Cli::try_parse_from(["spend", "stats", "--month", "3"]).is_err());
}
