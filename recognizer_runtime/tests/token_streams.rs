use assert_matches::assert_matches;
use proptest::prelude::*;
use recognizer_runtime::config::StreamPreferences;
use recognizer_runtime::stream::{AllChannels, BufferedTokenStream, CommonTokenStream, StreamError};
use recognizer_runtime::tokens::{
    ListTokenSource, Token, TokenLocation, DEFAULT_CHANNEL, HIDDEN_CHANNEL, TOKEN_EOF,
};

const ID: i32 = 1;
const WS: i32 = 2;
const COMMENT: i32 = 3;
const COMMENT_CHANNEL: i32 = 2;

fn tokens(spec: &[(i32, &str)]) -> Vec<Token> {
    let mut offset = 0isize;
    spec.iter()
        .map(|&(token_type, text)| {
            let stop = offset + text.len() as isize - 1;
            let channel = match token_type {
                WS => HIDDEN_CHANNEL,
                COMMENT => COMMENT_CHANNEL,
                _ => DEFAULT_CHANNEL,
            };
            let token = Token::new(token_type, text)
                .with_channel(channel)
                .with_location(TokenLocation::new(offset, stop, 1, offset as u32));
            offset = stop + 1;
            token
        })
        .collect()
}

fn sample() -> Vec<Token> {
    tokens(&[
        (ID, "x"),
        (WS, " "),
        (COMMENT, "/*c*/"),
        (WS, " "),
        (ID, "y"),
        (WS, " "),
    ])
}

#[test]
fn test_common_stream_skips_other_channels() {
    let mut stream = CommonTokenStream::on_default_channel(ListTokenSource::new(sample()));

    assert_eq!(stream.lt(1).unwrap().text(), Some("x"));
    assert_eq!(stream.lt(2).unwrap().text(), Some("y"));
    assert_eq!(stream.la(3), TOKEN_EOF);
    assert_eq!(stream.la(10), TOKEN_EOF);

    stream.consume().unwrap();
    assert_eq!(stream.index(), 4);
    assert_eq!(stream.lt(-1).unwrap().text(), Some("x"));

    stream.consume().unwrap();
    assert_eq!(stream.la(1), TOKEN_EOF);
    assert_matches!(stream.consume(), Err(StreamError::BufferExhausted));

    // Everything stays buffered for text extraction
    assert_eq!(stream.text(), "x /*c*/ y ");
    assert_eq!(stream.number_of_on_channel_tokens(), 3);
}

#[test]
fn test_stream_on_comment_channel() {
    let mut stream = CommonTokenStream::on_channel(ListTokenSource::new(sample()), COMMENT_CHANNEL);
    assert_eq!(stream.channel(), COMMENT_CHANNEL);
    assert_eq!(stream.lt(1).unwrap().text(), Some("/*c*/"));
    assert_eq!(stream.la(2), TOKEN_EOF);
}

#[test]
fn test_hidden_token_queries() {
    let mut stream = CommonTokenStream::on_default_channel(ListTokenSource::new(sample()));
    stream.fill();

    let right = stream.hidden_tokens_to_right(0, None).unwrap().unwrap();
    let texts: Vec<_> = right.iter().map(|token| token.text().unwrap()).collect();
    assert_eq!(texts, vec![" ", "/*c*/", " "]);

    let comments = stream
        .hidden_tokens_to_left(4, Some(COMMENT_CHANNEL))
        .unwrap()
        .unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].token_index, 2);

    assert_eq!(stream.hidden_tokens_to_left(0, None).unwrap(), None);
    assert_matches!(
        stream.hidden_tokens_to_right(99, None),
        Err(StreamError::IndexOutOfRange { index: 99, .. })
    );
}

#[test]
fn test_unfiltered_stream_sees_every_token() {
    let mut stream: BufferedTokenStream<_, AllChannels> =
        BufferedTokenStream::new(ListTokenSource::new(sample()));
    assert_eq!(stream.la(2), WS);
    stream.seek(3).unwrap();
    assert_eq!(stream.lt(1).unwrap().token_index, 3);
    assert_matches!(stream.seek(50), Err(StreamError::IndexOutOfRange { .. }));
}

#[test]
fn test_small_fill_blocks_buffer_everything() {
    let preferences = StreamPreferences {
        fill_block_size: 1,
        log_fill_events: true,
    };
    let mut stream =
        BufferedTokenStream::with_preferences(ListTokenSource::new(sample()), AllChannels, &preferences);
    stream.fill();
    assert!(stream.is_eof_fetched());
    assert_eq!(stream.size(), 7);
    assert_eq!(stream.fetch(4), 0);
}

fn token_strategy() -> impl Strategy<Value = Vec<(i32, String)>> {
    prop::collection::vec(
        prop_oneof![
            3 => "[a-z]{1,3}".prop_map(|text| (ID, text)),
            2 => Just((WS, " ".to_string())),
            1 => Just((COMMENT, "#".to_string())),
        ],
        0..40,
    )
}

proptest! {
    #[test]
    fn prop_lookahead_stays_on_channel(spec in token_strategy()) {
        let borrowed: Vec<(i32, &str)> = spec.iter().map(|(t, s)| (*t, s.as_str())).collect();
        let visible: Vec<String> = spec
            .iter()
            .filter(|(token_type, _)| *token_type == ID)
            .map(|(_, text)| text.clone())
            .collect();
        let mut stream = CommonTokenStream::on_default_channel(ListTokenSource::new(tokens(&borrowed)));

        let mut seen = Vec::new();
        while stream.la(1) != TOKEN_EOF {
            let token = stream.lt(1).unwrap();
            prop_assert_eq!(token.channel, DEFAULT_CHANNEL);
            prop_assert_eq!(token.token_index as usize, stream.index());
            seen.push(token.text().unwrap().to_string());
            stream.consume().unwrap();
        }
        prop_assert_eq!(seen, visible.clone());
        prop_assert!(stream.consume().is_err());

        // Indices are assigned densely in buffer order
        for (i, token) in stream.tokens().iter().enumerate() {
            prop_assert_eq!(token.token_index, i as isize);
        }
        prop_assert_eq!(stream.size(), spec.len() + 1);
        prop_assert_eq!(stream.number_of_on_channel_tokens(), visible.len() + 1);
    }
}
