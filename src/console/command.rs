/// Console commands with their one-line help, in help order.
pub const COMMANDS: &[(&str, &str)] = &[
    ("searchbase", "Sets the LDAP search base."),
    (
        "object_by_property_name",
        "Search for an object containing a property by name in LDAP.",
    ),
    (
        "object_by_property_value",
        "Search for an object containing a property by value in LDAP.",
    ),
    (
        "object_by_dn",
        "Search for an object by its distinguishedName in LDAP.",
    ),
    ("help", "Displays this help message."),
    ("exit", "Exits the script."),
];

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    SearchBase(String),
    ObjectByDn(String),
    ObjectByPropertyName(String),
    ObjectByPropertyValue(String),
    Help,
    Exit,
    /// Blank input.
    Empty,
    Unknown(String),
}

/// Split a line at its first space into a command name and argument text.
/// The command name is case-insensitive; the argument text is kept verbatim
/// so property values may contain spaces.
pub fn parse_command_line(line: &str) -> Command {
    let line = line.trim();
    let (name, argument) = match line.split_once(' ') {
        Some((name, argument)) => (name, argument),
        None => (line, ""),
    };
    let argument = argument.to_string();

    match name.to_lowercase().as_str() {
        "" => Command::Empty,
        "searchbase" => Command::SearchBase(argument),
        "object_by_dn" => Command::ObjectByDn(argument),
        "object_by_property_name" => Command::ObjectByPropertyName(argument),
        "object_by_property_value" => Command::ObjectByPropertyValue(argument),
        "help" => Command::Help,
        "exit" => Command::Exit,
        _ => Command::Unknown(name.to_string()),
    }
}

#[test]
fn test_parse_command_line() {
    assert_eq!(
        parse_command_line("searchbase DC=example,DC=com"),
        Command::SearchBase("DC=example,DC=com".to_string())
    );
    assert_eq!(
        parse_command_line("  OBJECT_BY_PROPERTY_VALUE Domain  Users "),
        Command::ObjectByPropertyValue("Domain  Users".to_string())
    );
    assert_eq!(
        parse_command_line("object_by_dn"),
        Command::ObjectByDn(String::new())
    );
    assert_eq!(parse_command_line("Exit"), Command::Exit);
    assert_eq!(parse_command_line("help me"), Command::Help);
    assert_eq!(parse_command_line("   "), Command::Empty);
    assert_eq!(
        parse_command_line("frobnicate now"),
        Command::Unknown("frobnicate".to_string())
    );
}
