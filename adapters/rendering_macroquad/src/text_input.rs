/// Single-line command buffer fed by typed characters.
///
/// Control characters are ignored, as is leading whitespace, so a space bar
/// press on an empty line never starts a command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextInput {
    text: String,
}

impl TextInput {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text typed so far.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Reports whether nothing has been typed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Appends a typed character. Returns `true` when the buffer changed.
    pub fn push(&mut self, character: char) -> bool {
        if character.is_control() || (character.is_whitespace() && self.text.is_empty()) {
            return false;
        }
        self.text.push(character);
        true
    }

    /// Removes the last character. Returns `true` when the buffer changed.
    pub fn backspace(&mut self) -> bool {
        self.text.pop().is_some()
    }

    /// Drops the typed text.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Takes the typed line, leaving the buffer empty.
    ///
    /// Returns `None` when the line holds nothing but whitespace.
    pub fn submit(&mut self) -> Option<String> {
        let line = std::mem::take(&mut self.text);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    }
}
