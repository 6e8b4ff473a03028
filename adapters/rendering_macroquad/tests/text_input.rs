use dungeon_crawler_rendering_macroquad::TextInput;

fn typed(text: &str) -> TextInput {
    let mut input = TextInput::new();
    for character in text.chars() {
        let _ = input.push(character);
    }
    input
}

#[test]
fn typed_line_is_submitted_once() {
    let mut input = typed("get key");
    assert_eq!(input.text(), "get key");

    assert_eq!(input.submit().as_deref(), Some("get key"));
    assert!(input.is_empty(), "submitting empties the buffer");
    assert_eq!(input.submit(), None, "second submit has nothing to send");
}

#[test]
fn leading_space_is_reserved_for_movement() {
    let mut input = TextInput::new();
    assert!(!input.push(' '), "space on an empty line is not text");
    assert!(input.is_empty());

    assert!(input.push('o'));
    assert!(input.push(' '), "spaces inside a command are kept");
    assert_eq!(input.text(), "o ");
}

#[test]
fn control_characters_are_ignored() {
    let mut input = typed("look");
    assert!(!input.push('\r'));
    assert!(!input.push('\u{8}'));
    assert_eq!(input.text(), "look");
}

#[test]
fn backspace_edits_the_tail() {
    let mut input = typed("opem");
    assert!(input.backspace());
    assert!(input.push('n'));
    assert_eq!(input.text(), "open");

    input.clear();
    assert!(!input.backspace(), "nothing left to delete");
}

#[test]
fn whitespace_only_lines_are_dropped() {
    let mut input = typed("x");
    assert!(input.backspace());
    assert_eq!(input.submit(), None);
}

#[test]
fn trailing_whitespace_is_trimmed_on_submit() {
    let mut input = typed("inventory   ");
    assert_eq!(input.submit().as_deref(), Some("inventory"));
}
