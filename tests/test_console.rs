use serde_json::{json, Value};
use termcolor::NoColor;

use ldap2json::console::{Console, ConsoleState, ScriptedLineSource};
use ldap2json::file_format::{dn::dn_to_path, tree::Tree};

fn directory() -> Tree {
    let mut tree = Tree::new();
    for (dn, attrs) in [
        ("DC=example,DC=com", json!({"dc": "example"})),
        (
            "CN=Alice,OU=Users,DC=example,DC=com",
            json!({"mail": "alice@example.com", "userAccountControl": 512}),
        ),
        (
            "CN=Bob,OU=Users,DC=example,DC=com",
            json!({"mail": "bob@example.com", "userAccountControl": 514}),
        ),
    ] {
        if let Value::Object(map) = attrs {
            tree.insert(&dn_to_path(dn), map);
        }
    }
    tree
}

/// Feed `lines` to a console over `tree` and return what it printed along
/// with the prompts it showed.
fn transcript(tree: &Tree, debug: bool, lines: &[&str]) -> (String, Vec<String>) {
    let mut console = Console::new(tree, NoColor::new(Vec::new())).with_debug(debug);
    let mut input = ScriptedLineSource::new(lines.iter().copied());
    console.run(&mut input).unwrap();
    assert_eq!(console.state(), ConsoleState::Terminated);
    let out = String::from_utf8(console.into_output().into_inner()).unwrap();
    (out, input.prompts().to_vec())
}

#[test]
fn session_transcript() {
    let tree = directory();
    let (out, prompts) = transcript(
        &tree,
        true,
        &[
            "searchbase OU=Users,DC=example,DC=com",
            "object_by_property_value 512",
            "object_by_property_name MAIL",
            "object_by_property_name telephoneNumber",
            "object_by_property_value nobody@example.com",
            "object_by_dn CN=Bob,OU=Users,DC=example,DC=com",
            "whoami",
            "",
            "exit",
            "help",
        ],
    );

    insta::assert_snapshot!(out, @r###"
    [debug] Changed searchbase to DC=com,DC=example,OU=Users
    [CN=Alice,OU=Users,DC=example,DC=com] => userAccountControl
     - 512
    [CN=Alice,OU=Users,DC=example,DC=com] => mail
     - alice@example.com
    [CN=Bob,OU=Users,DC=example,DC=com] => mail
     - bob@example.com
    No such property found.
    No property with specified value found.
    {
        "mail": "bob@example.com",
        "userAccountControl": 514
    }
    Unknown command. Type 'help' for help.
    "###);

    // `exit` ends the session; the trailing `help` is never read.
    assert_eq!(prompts.len(), 9);
    assert_eq!(prompts[0], "[]> ");
    assert_eq!(prompts[1], "[DC=com,DC=example,OU=Users]> ");
}

#[test]
fn help_lists_every_command() {
    let tree = directory();
    let (out, _) = transcript(&tree, false, &["help", "exit"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            " - searchbase      Sets the LDAP search base.",
            " - object_by_property_name Search for an object containing a property by name in LDAP.",
            " - object_by_property_value Search for an object containing a property by value in LDAP.",
            " - object_by_dn    Search for an object by its distinguishedName in LDAP.",
            " - help            Displays this help message.",
            " - exit            Exits the script.",
        ]
    );
}

#[test]
fn end_of_input_terminates_with_a_newline() {
    let tree = directory();
    let (out, prompts) = transcript(&tree, false, &["searchbase DC=com,DC=example"]);
    assert_eq!(out, "\n");
    assert_eq!(prompts, vec!["[]> ", "[DC=com,DC=example]> "]);
}

#[test]
fn search_covers_the_whole_tree_without_a_base() {
    let tree = directory();
    let (out, _) = transcript(&tree, false, &["object_by_property_value example", "exit"]);
    assert_eq!(out, "[DC=example,DC=com] => dc\n - example\n");
}

#[test]
fn bare_dn_commands_resolve_nothing() {
    let tree = directory();
    let (out, _) = transcript(
        &tree,
        false,
        &["object_by_dn", "searchbase", "object_by_property_name mail", "exit"],
    );
    assert_eq!(out, "No such property found.\n");
}
