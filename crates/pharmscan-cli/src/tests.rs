use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["pharmscan-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_search_with_defaults() {
    let cli = Cli::try_parse_from(["pharmscan-cli", "search", "Dolo 650"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Search {
            ref term,
            sort_price: false,
            json: false,
        }) if term == "Dolo 650"
    ));
}

#[test]
fn parses_search_flags() {
    let cli = Cli::try_parse_from([
        "pharmscan-cli",
        "search",
        "crocin",
        "--sort-price",
        "--json",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Search {
            sort_price: true,
            json: true,
            ..
        })
    ));
}

#[test]
fn search_requires_a_term() {
    assert!(Cli::try_parse_from(["pharmscan-cli", "search"]).is_err());
}

#[test]
fn parses_sources_default_and_strict() {
    let cli = Cli::try_parse_from(["pharmscan-cli", "sources"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Sources { strict: false })
    ));

    let cli = Cli::try_parse_from(["pharmscan-cli", "sources", "--strict"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Sources { strict: true })));
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["pharmscan-cli", "collect"]).is_err());
}
