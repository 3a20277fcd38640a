use relaybot::commands::visibility::toggle_message;
use relaybot::commands::ReplyVisibility;
use relaybot::queue::invocation::normalize_command;
use relaybot::queue::CommandInput;

#[test]
fn set_private_reports_whether_mode_changed() {
    let visibility = ReplyVisibility::new(false);

    assert!(visibility.set_private(true));
    assert!(visibility.is_private());
    assert!(!visibility.set_private(true));
    assert!(visibility.set_private(false));
    assert!(!visibility.is_private());
}

#[test]
fn toggle_messages_point_at_the_opposite_command() {
    assert!(toggle_message(true, true).contains("`/public`"));
    assert!(toggle_message(true, false).contains("already on private mode"));
    assert!(toggle_message(false, true).contains("`/private`"));
    assert!(toggle_message(false, false).contains("already on public mode"));
}

#[test]
fn command_names_are_normalised() {
    assert_eq!(normalize_command("/Chat"), "chat");
    assert_eq!(normalize_command("  reset "), "reset");
    assert_eq!(normalize_command("help"), "help");

    let input = CommandInput::new("/PRIVATE", "", "U1", "C1");
    assert_eq!(input.command, "private");
}
