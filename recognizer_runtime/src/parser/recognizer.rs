//! Grammar metadata shared by every recognizer built from one grammar, and
//! the process-wide name lookup caches.
//!
//! The caches are keyed by the address of the `'static` vocabulary or rule
//! name list, never by content. Each map is built once under the lock and
//! published as an immutable `Arc`.

use crate::tokens::{Token, Vocabulary, TOKEN_EOF, TOKEN_INVALID_TYPE};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Static description of a generated grammar
#[derive(Clone, Copy)]
pub struct GrammarInfo {
    pub grammar_file_name: &'static str,
    pub rule_names: &'static [&'static str],
    pub vocabulary: &'static dyn Vocabulary,
    pub serialized_atn: Option<&'static str>,
}

impl GrammarInfo {
    pub const fn new(
        grammar_file_name: &'static str,
        rule_names: &'static [&'static str],
        vocabulary: &'static dyn Vocabulary,
    ) -> Self {
        Self {
            grammar_file_name,
            rule_names,
            vocabulary,
            serialized_atn: None,
        }
    }

    pub const fn with_serialized_atn(self, serialized_atn: &'static str) -> Self {
        Self {
            serialized_atn: Some(serialized_atn),
            ..self
        }
    }
}

impl fmt::Debug for GrammarInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrammarInfo")
            .field("grammar_file_name", &self.grammar_file_name)
            .field("rule_names", &self.rule_names)
            .field("max_token_type", &self.vocabulary.max_token_type())
            .field("serialized_atn", &self.serialized_atn.map(str::len))
            .finish()
    }
}

pub trait Recognizer {
    fn grammar(&self) -> &GrammarInfo;

    /// Current automaton state; -1 before the first rule is entered
    fn state(&self) -> isize;

    fn grammar_file_name(&self) -> &'static str {
        self.grammar().grammar_file_name
    }

    fn rule_names(&self) -> &'static [&'static str] {
        self.grammar().rule_names
    }

    fn vocabulary(&self) -> &'static dyn Vocabulary {
        self.grammar().vocabulary
    }

    fn token_type_map(&self) -> Arc<HashMap<String, i32>> {
        token_type_map(self.vocabulary())
    }

    fn rule_index_map(&self) -> Arc<HashMap<String, usize>> {
        rule_index_map(self.rule_names())
    }

    /// Token type for a literal or symbolic name; invalid type when unknown
    fn token_type(&self, name: &str) -> i32 {
        self.token_type_map()
            .get(name)
            .copied()
            .unwrap_or(TOKEN_INVALID_TYPE)
    }

    /// `line L:C` prefix used by diagnostics
    fn error_header(&self, token: &Token) -> String {
        format!("line {}:{}", token.line, token.column)
    }
}

/// Copy of a recognizer's identity and state, handed to error listeners
/// while the recognizer itself is mutably borrowed.
#[derive(Debug, Clone, Copy)]
pub struct RecognizerSnapshot {
    pub grammar: GrammarInfo,
    pub state: isize,
}

impl Recognizer for RecognizerSnapshot {
    fn grammar(&self) -> &GrammarInfo {
        &self.grammar
    }

    fn state(&self) -> isize {
        self.state
    }
}

type TokenTypeCache = Mutex<HashMap<usize, Arc<HashMap<String, i32>>>>;
type RuleIndexCache = Mutex<HashMap<(usize, usize), Arc<HashMap<String, usize>>>>;

static TOKEN_TYPE_MAPS: OnceLock<TokenTypeCache> = OnceLock::new();
static RULE_INDEX_MAPS: OnceLock<RuleIndexCache> = OnceLock::new();

/// Name to token type map for `vocabulary`, built on first use
pub fn token_type_map(vocabulary: &'static dyn Vocabulary) -> Arc<HashMap<String, i32>> {
    let key = vocabulary as *const dyn Vocabulary as *const () as usize;
    let cache = TOKEN_TYPE_MAPS.get_or_init(Default::default);
    let mut maps = cache.lock().unwrap_or_else(PoisonError::into_inner);
    maps.entry(key)
        .or_insert_with(|| Arc::new(build_token_type_map(vocabulary)))
        .clone()
}

/// Rule name to index map for `rule_names`, built on first use
pub fn rule_index_map(rule_names: &'static [&'static str]) -> Arc<HashMap<String, usize>> {
    let key = (rule_names.as_ptr() as usize, rule_names.len());
    let cache = RULE_INDEX_MAPS.get_or_init(Default::default);
    let mut maps = cache.lock().unwrap_or_else(PoisonError::into_inner);
    maps.entry(key)
        .or_insert_with(|| {
            Arc::new(
                rule_names
                    .iter()
                    .enumerate()
                    .map(|(index, name)| (name.to_string(), index))
                    .collect(),
            )
        })
        .clone()
}

fn build_token_type_map(vocabulary: &dyn Vocabulary) -> HashMap<String, i32> {
    let mut map = HashMap::new();
    for token_type in 0..=vocabulary.max_token_type() {
        if let Some(literal) = vocabulary.literal_name(token_type) {
            map.insert(literal.to_string(), token_type);
        }
        if let Some(symbolic) = vocabulary.symbolic_name(token_type) {
            map.insert(symbolic.to_string(), token_type);
        }
    }
    map.insert("EOF".to_string(), TOKEN_EOF);
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::VocabularyImpl;
    use std::thread;

    static LITERALS: [Option<&str>; 3] = [None, None, Some("'+'")];
    static SYMBOLS: [Option<&str>; 3] = [None, Some("ID"), Some("PLUS")];
    static VOCABULARY: VocabularyImpl = VocabularyImpl::new(&LITERALS, &SYMBOLS, &[]);
    static RULE_NAMES: [&str; 2] = ["start", "expr"];
    static GRAMMAR: GrammarInfo = GrammarInfo::new("Expr.g4", &RULE_NAMES, &VOCABULARY);

    #[test]
    fn test_token_type_lookup() {
        let snapshot = RecognizerSnapshot {
            grammar: GRAMMAR,
            state: 4,
        };
        assert_eq!(snapshot.token_type("ID"), 1);
        assert_eq!(snapshot.token_type("'+'"), 2);
        assert_eq!(snapshot.token_type("PLUS"), 2);
        assert_eq!(snapshot.token_type("EOF"), TOKEN_EOF);
        assert_eq!(snapshot.token_type("MISSING"), TOKEN_INVALID_TYPE);
        assert_eq!(snapshot.rule_index_map().get("expr"), Some(&1));
        assert_eq!(snapshot.grammar_file_name(), "Expr.g4");
    }

    #[test]
    fn test_maps_are_published_once() {
        let first = token_type_map(&VOCABULARY);
        let handles: Vec<_> = (0..4)
            .map(|_| thread::spawn(|| token_type_map(&VOCABULARY)))
            .collect();
        for handle in handles {
            assert!(Arc::ptr_eq(&first, &handle.join().unwrap()));
        }
        assert!(Arc::ptr_eq(
            &rule_index_map(&RULE_NAMES),
            &rule_index_map(&RULE_NAMES)
        ));
    }

    #[test]
    fn test_error_header() {
        let snapshot = RecognizerSnapshot {
            grammar: GRAMMAR,
            state: -1,
        };
        let token = Token::new(1, "x").with_location(crate::tokens::TokenLocation::new(0, 0, 3, 7));
        assert_eq!(snapshot.error_header(&token), "line 3:7");
    }
}
