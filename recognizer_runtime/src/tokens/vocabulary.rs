//! Token-type naming.

use super::token::TOKEN_EOF;
use std::borrow::Cow;

pub trait Vocabulary: Send + Sync {
    /// Highest token type with any name
    fn max_token_type(&self) -> i32;

    /// Quoted literal, e.g. `'+'`
    fn literal_name(&self, token_type: i32) -> Option<&str>;

    /// Rule-style name, e.g. `PLUS`
    fn symbolic_name(&self, token_type: i32) -> Option<&str>;

    /// Best name for messages. Falls back from the display name to the
    /// literal, then the symbolic name, then the number.
    fn display_name(&self, token_type: i32) -> Cow<'_, str>;
}

/// Name tables emitted alongside a generated recognizer.
#[derive(Debug, Clone, Copy)]
pub struct VocabularyImpl {
    literal_names: &'static [Option<&'static str>],
    symbolic_names: &'static [Option<&'static str>],
    display_names: &'static [Option<&'static str>],
}

pub static EMPTY_VOCABULARY: VocabularyImpl = VocabularyImpl::new(&[], &[], &[]);

impl VocabularyImpl {
    pub const fn new(
        literal_names: &'static [Option<&'static str>],
        symbolic_names: &'static [Option<&'static str>],
        display_names: &'static [Option<&'static str>],
    ) -> Self {
        Self {
            literal_names,
            symbolic_names,
            display_names,
        }
    }

    fn lookup(names: &'static [Option<&'static str>], token_type: i32) -> Option<&'static str> {
        usize::try_from(token_type)
            .ok()
            .and_then(|index| names.get(index).copied().flatten())
    }
}

impl Vocabulary for VocabularyImpl {
    fn max_token_type(&self) -> i32 {
        let longest = self
            .literal_names
            .len()
            .max(self.symbolic_names.len())
            .max(self.display_names.len());
        longest as i32 - 1
    }

    fn literal_name(&self, token_type: i32) -> Option<&str> {
        Self::lookup(self.literal_names, token_type)
    }

    fn symbolic_name(&self, token_type: i32) -> Option<&str> {
        if token_type == TOKEN_EOF {
            return Some("EOF");
        }
        Self::lookup(self.symbolic_names, token_type)
    }

    fn display_name(&self, token_type: i32) -> Cow<'_, str> {
        let display: Option<&str> = Self::lookup(self.display_names, token_type);
        display
            .or_else(|| self.literal_name(token_type))
            .or_else(|| self.symbolic_name(token_type))
            .map(Cow::Borrowed)
            .unwrap_or_else(|| Cow::Owned(token_type.to_string()))
    }
}
