//! Lazily filled, random-access token buffer.
//!
//! Tokens are pulled from the source only when lookahead, seeking or text
//! extraction needs them, and are kept for the lifetime of the stream (or
//! until the source is replaced). The channel filter decides which buffered
//! tokens lookahead sees; indexing and text extraction always see all of them.

use super::error::StreamError;
use super::filter::{AllChannels, ChannelFilter, OnChannel};
use crate::config::compile_time::stream::INITIAL_BUFFER_CAPACITY;
use crate::config::StreamPreferences;
use crate::interval::{Interval, IntervalSet};
use crate::logging::codes;
use crate::tokens::{Token, TokenRef, TokenSource, DEFAULT_CHANNEL, TOKEN_EOF, TOKEN_INVALID_TYPE};
use crate::{log_debug, log_success};
use std::sync::Arc;

pub struct BufferedTokenStream<S: TokenSource, F: ChannelFilter = AllChannels> {
    source: S,
    tokens: Vec<TokenRef>,
    /// Index of the current token (LT(1)); meaningful once initialized
    p: usize,
    initialized: bool,
    /// Set once the EOF token is in the buffer; never cleared except by
    /// `set_token_source`
    fetched_eof: bool,
    filter: F,
    fill_block_size: usize,
    log_fill_events: bool,
}

/// Stream whose lookahead only sees one channel (the default channel unless
/// constructed with `on_channel`).
pub type CommonTokenStream<S> = BufferedTokenStream<S, OnChannel>;

impl<S: TokenSource> BufferedTokenStream<S, AllChannels> {
    pub fn new(source: S) -> Self {
        Self::with_filter(source, AllChannels)
    }
}

impl<S: TokenSource> BufferedTokenStream<S, OnChannel> {
    pub fn on_channel(source: S, channel: i32) -> Self {
        Self::with_filter(source, OnChannel(channel))
    }

    pub fn on_default_channel(source: S) -> Self {
        Self::on_channel(source, DEFAULT_CHANNEL)
    }

    pub fn channel(&self) -> i32 {
        self.filter.0
    }

    /// Count of tokens on this stream's channel, EOF included when it is on
    /// the channel. Fills the buffer.
    pub fn number_of_on_channel_tokens(&mut self) -> usize {
        self.fill();
        let channel = self.filter.0;
        let mut count = 0;
        for token in &self.tokens {
            if token.channel == channel {
                count += 1;
            }
            if token.is_eof() {
                break;
            }
        }
        count
    }
}

impl<S: TokenSource, F: ChannelFilter> BufferedTokenStream<S, F> {
    pub fn with_filter(source: S, filter: F) -> Self {
        Self::with_preferences(source, filter, &StreamPreferences::default())
    }

    pub fn with_preferences(source: S, filter: F, preferences: &StreamPreferences) -> Self {
        Self {
            source,
            tokens: Vec::with_capacity(INITIAL_BUFFER_CAPACITY),
            p: 0,
            initialized: false,
            fetched_eof: false,
            filter,
            fill_block_size: preferences.fill_block_size.max(1),
            log_fill_events: preferences.log_fill_events,
        }
    }

    pub fn token_source(&self) -> &S {
        &self.source
    }

    pub fn token_source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Replace the source, discarding every buffered token. Returns the old
    /// source.
    pub fn set_token_source(&mut self, source: S) -> S {
        let previous = std::mem::replace(&mut self.source, source);
        self.tokens.clear();
        self.p = 0;
        self.initialized = false;
        self.fetched_eof = false;

        log_success!(
            codes::success::TOKEN_SOURCE_REBOUND,
            "Token source replaced and buffer reset",
            "source" => self.source.source_name()
        );
        previous
    }

    pub fn source_name(&self) -> &str {
        self.source.source_name()
    }

    /// Every token buffered so far, hidden channels included
    pub fn tokens(&self) -> &[TokenRef] {
        &self.tokens
    }

    pub fn index(&self) -> usize {
        self.p
    }

    /// Number of buffered tokens
    pub fn size(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_eof_fetched(&self) -> bool {
        self.fetched_eof
    }

    /// Buffered token at `index`. Does not fetch.
    pub fn get(&self, index: usize) -> Result<TokenRef, StreamError> {
        self.tokens
            .get(index)
            .cloned()
            .ok_or_else(|| StreamError::out_of_range(index, self.tokens.len()))
    }

    pub fn reset(&mut self) -> Result<(), StreamError> {
        self.seek(0)
    }

    /// Move the cursor to `index`, snapped forward to the next visible token.
    /// Indices past the buffered EOF are rejected.
    pub fn seek(&mut self, index: usize) -> Result<(), StreamError> {
        self.lazy_init();
        self.sync(index);
        if index >= self.tokens.len() {
            return Err(StreamError::out_of_range(index, self.tokens.len()));
        }
        self.p = self.adjust_seek_index(index);
        Ok(())
    }

    pub fn consume(&mut self) -> Result<(), StreamError> {
        // Skip the lookahead when the buffer already proves LT(1) is not EOF.
        let skip_eof_check = if !self.initialized {
            false
        } else if self.fetched_eof {
            self.p + 1 < self.tokens.len()
        } else {
            self.p < self.tokens.len()
        };

        if !skip_eof_check && self.la(1) == TOKEN_EOF {
            return Err(StreamError::BufferExhausted);
        }

        if self.sync(self.p + 1) {
            self.p = self.adjust_seek_index(self.p + 1);
        }
        Ok(())
    }

    /// Make sure index `i` is buffered. False when EOF arrived first.
    fn sync(&mut self, i: usize) -> bool {
        let needed = (i + 1).saturating_sub(self.tokens.len());
        if needed > 0 {
            return self.fetch(needed) >= needed;
        }
        true
    }

    /// Pull up to `n` tokens from the source, stopping after EOF. Returns the
    /// number actually added; always 0 once EOF is buffered.
    pub fn fetch(&mut self, n: usize) -> usize {
        if self.fetched_eof {
            return 0;
        }

        for fetched in 0..n {
            let mut token = self.source.next_token();
            token.token_index = self.tokens.len() as isize;
            let is_eof = token.is_eof();
            self.tokens.push(Arc::new(token));
            if is_eof {
                self.fetched_eof = true;
                return fetched + 1;
            }
        }
        n
    }

    fn lazy_init(&mut self) {
        if !self.initialized {
            self.initialized = true;
            self.sync(0);
            self.p = self.adjust_seek_index(0);
        }
    }

    fn adjust_seek_index(&mut self, i: usize) -> usize {
        match self.filter.channel() {
            None => i,
            Some(channel) => self.next_token_on_channel(i, channel),
        }
    }

    /// Token `k` positions ahead (`k > 0`) or behind (`k < 0`) among visible
    /// tokens. `k == 0` is undefined and yields `None`. Past the end, the EOF
    /// token is returned.
    pub fn lt(&mut self, k: isize) -> Option<TokenRef> {
        self.lazy_init();
        if k == 0 {
            return None;
        }
        if k < 0 {
            return self.lb(k.unsigned_abs());
        }

        match self.filter.channel() {
            None => {
                let i = self.p + k as usize - 1;
                self.sync(i);
                self.tokens.get(i).or_else(|| self.tokens.last()).cloned()
            }
            Some(channel) => {
                let mut i = self.p;
                for _ in 1..k {
                    if self.sync(i + 1) {
                        i = self.next_token_on_channel(i + 1, channel);
                    }
                }
                self.tokens.get(i).cloned()
            }
        }
    }

    /// The `k`-th visible token before the cursor; `None` when fewer than `k`
    /// visible tokens precede it.
    pub fn lb(&mut self, k: usize) -> Option<TokenRef> {
        self.lazy_init();
        if k == 0 || k > self.p {
            return None;
        }

        match self.filter.channel() {
            None => self.tokens.get(self.p - k).cloned(),
            Some(channel) => {
                let mut i = self.p;
                for _ in 0..k {
                    if i == 0 {
                        return None;
                    }
                    i = self.previous_token_on_channel(i - 1, channel)?;
                }
                self.tokens.get(i).cloned()
            }
        }
    }

    pub fn la(&mut self, k: isize) -> i32 {
        self.lt(k)
            .map(|token| token.token_type)
            .unwrap_or(TOKEN_INVALID_TYPE)
    }

    /// Buffer every remaining token through EOF
    pub fn fill(&mut self) {
        self.lazy_init();
        let block = self.fill_block_size;
        while self.fetch(block) >= block {}

        log_debug!("Token buffer filled",
            "tokens" => self.tokens.len(),
            "source" => self.source.source_name()
        );
        if self.log_fill_events {
            log_success!(
                codes::success::STREAM_FILLED,
                "Token buffer filled through EOF",
                "tokens" => self.tokens.len()
            );
        }
    }

    /// Index of the first token at or after `i` on `channel`, or of EOF.
    pub fn next_token_on_channel(&mut self, i: usize, channel: i32) -> usize {
        self.sync(i);
        if i >= self.tokens.len() {
            return self.tokens.len().saturating_sub(1);
        }

        let mut i = i;
        loop {
            let token = &self.tokens[i];
            if token.channel == channel || token.is_eof() {
                return i;
            }
            i += 1;
            self.sync(i);
            if i >= self.tokens.len() {
                return self.tokens.len() - 1;
            }
        }
    }

    /// Index of the last token at or before `i` on `channel` (EOF matches
    /// every channel); `None` when there is none.
    pub fn previous_token_on_channel(&mut self, i: usize, channel: i32) -> Option<usize> {
        self.sync(i);
        if i >= self.tokens.len() {
            return self.tokens.len().checked_sub(1);
        }

        (0..=i).rev().find(|&j| {
            let token = &self.tokens[j];
            token.is_eof() || token.channel == channel
        })
    }

    /// Buffered tokens in `start..=stop`, optionally restricted to `types`.
    /// `Ok(None)` when nothing qualifies.
    pub fn tokens_in_range(
        &mut self,
        start: usize,
        stop: usize,
        types: Option<&IntervalSet>,
    ) -> Result<Option<Vec<TokenRef>>, StreamError> {
        self.lazy_init();
        let size = self.tokens.len();
        if start >= size || stop >= size {
            return Err(StreamError::out_of_range(start.max(stop), size));
        }
        if start > stop {
            return Ok(None);
        }

        let selected: Vec<TokenRef> = self.tokens[start..=stop]
            .iter()
            .filter(|token| types.map_or(true, |types| types.contains(token.token_type)))
            .cloned()
            .collect();
        Ok((!selected.is_empty()).then_some(selected))
    }

    /// Off-default-channel tokens between `index` and the next default-channel
    /// token. `channel` narrows the result to one channel.
    pub fn hidden_tokens_to_right(
        &mut self,
        index: usize,
        channel: Option<i32>,
    ) -> Result<Option<Vec<TokenRef>>, StreamError> {
        self.lazy_init();
        if index >= self.tokens.len() {
            return Err(StreamError::out_of_range(index, self.tokens.len()));
        }

        let next_on_channel = self.next_token_on_channel(index + 1, DEFAULT_CHANNEL);
        Ok(self.filter_for_channel(index + 1, next_on_channel, channel))
    }

    /// Off-default-channel tokens between the previous default-channel token
    /// and `index`.
    pub fn hidden_tokens_to_left(
        &mut self,
        index: usize,
        channel: Option<i32>,
    ) -> Result<Option<Vec<TokenRef>>, StreamError> {
        self.lazy_init();
        if index >= self.tokens.len() {
            return Err(StreamError::out_of_range(index, self.tokens.len()));
        }
        if index == 0 {
            return Ok(None);
        }

        let previous_on_channel = self.previous_token_on_channel(index - 1, DEFAULT_CHANNEL);
        if previous_on_channel == Some(index - 1) {
            return Ok(None);
        }
        let from = previous_on_channel.map_or(0, |i| i + 1);
        Ok(self.filter_for_channel(from, index - 1, channel))
    }

    fn filter_for_channel(
        &self,
        from: usize,
        to: usize,
        channel: Option<i32>,
    ) -> Option<Vec<TokenRef>> {
        if from > to || to >= self.tokens.len() {
            return None;
        }

        let hidden: Vec<TokenRef> = self.tokens[from..=to]
            .iter()
            .filter(|token| match channel {
                None => token.channel != DEFAULT_CHANNEL,
                Some(channel) => token.channel == channel,
            })
            .cloned()
            .collect();
        (!hidden.is_empty()).then_some(hidden)
    }

    /// Text of every token through EOF. Fills the buffer.
    pub fn text(&mut self) -> String {
        self.fill();
        let last = self.tokens.len() as i32 - 1;
        self.text_for_interval(Interval::of(0, last))
    }

    /// Concatenated text of the tokens in the interval, hidden ones included.
    /// Stops at EOF; an upper bound past the buffer is clamped.
    pub fn text_for_interval(&mut self, interval: Interval) -> String {
        if interval.a < 0 || interval.b < 0 {
            return String::new();
        }
        let start = interval.a as usize;
        self.sync(interval.b as usize);
        let Some(last) = self.tokens.len().checked_sub(1) else {
            return String::new();
        };
        let stop = (interval.b as usize).min(last);

        let mut text = String::new();
        for token in self.tokens.iter().take(stop + 1).skip(start) {
            if token.is_eof() {
                break;
            }
            text.push_str(token.text().unwrap_or_default());
        }
        text
    }

    pub fn text_between(&mut self, start: &Token, stop: &Token) -> String {
        if start.token_index < 0 || stop.token_index < 0 {
            return String::new();
        }
        self.text_for_interval(Interval::of(
            start.token_index as i32,
            stop.token_index as i32,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{ListTokenSource, TokenLocation, HIDDEN_CHANNEL};
    use assert_matches::assert_matches;

    const ID: i32 = 1;
    const PLUS: i32 = 2;
    const WS: i32 = 3;

    /// Lex a tiny language: identifiers, '+', and blanks on the hidden channel.
    fn lex(input: &str) -> ListTokenSource {
        let mut tokens = Vec::new();
        let mut offset = 0usize;
        for piece in split_pieces(input) {
            let (token_type, channel) = match piece.chars().next() {
                Some('+') => (PLUS, DEFAULT_CHANNEL),
                Some(' ') => (WS, HIDDEN_CHANNEL),
                _ => (ID, DEFAULT_CHANNEL),
            };
            let stop = offset + piece.len() - 1;
            tokens.push(
                Token::new(token_type, piece)
                    .with_channel(channel)
                    .with_location(TokenLocation::new(
                        offset as isize,
                        stop as isize,
                        1,
                        offset as u32,
                    )),
            );
            offset = stop + 1;
        }
        ListTokenSource::new(tokens)
    }

    fn split_pieces(input: &str) -> Vec<String> {
        let mut pieces: Vec<String> = Vec::new();
        for ch in input.chars() {
            let kind = |c: char| if c == ' ' { 0 } else if c == '+' { 1 } else { 2 };
            match pieces.last_mut() {
                Some(last) if kind(ch) != 1 && last.chars().next().map(kind) == Some(kind(ch)) => {
                    last.push(ch)
                }
                _ => pieces.push(ch.to_string()),
            }
        }
        pieces
    }

    #[test]
    fn test_lookahead_is_lazy() {
        let mut stream = BufferedTokenStream::new(lex("a+b"));
        assert_eq!(stream.size(), 0);

        assert_eq!(stream.la(1), ID);
        assert_eq!(stream.size(), 1);
        assert_eq!(stream.la(3), ID);
        assert_eq!(stream.size(), 3);
        assert!(!stream.is_eof_fetched());
    }

    #[test]
    fn test_lt_zero_and_past_end() {
        let mut stream = BufferedTokenStream::new(lex("a"));
        assert!(stream.lt(0).is_none());
        assert!(stream.lt(-1).is_none());

        let far = stream.lt(10).unwrap();
        assert!(far.is_eof());
        assert_eq!(far.token_index, 1);
    }

    #[test]
    fn test_consume_and_lookbehind() {
        let mut stream = BufferedTokenStream::new(lex("a+b"));
        stream.consume().unwrap();
        stream.consume().unwrap();

        assert_eq!(stream.index(), 2);
        assert_eq!(stream.lt(-1).unwrap().token_type, PLUS);
        assert_eq!(stream.lb(2).unwrap().text(), Some("a"));
        assert!(stream.lb(3).is_none());
    }

    #[test]
    fn test_consume_at_eof_fails() {
        let mut stream = BufferedTokenStream::new(lex("a"));
        stream.consume().unwrap();
        assert_eq!(stream.la(1), TOKEN_EOF);
        assert_matches!(stream.consume(), Err(StreamError::BufferExhausted));
        assert_eq!(stream.index(), 1);
    }

    #[test]
    fn test_fetch_after_eof_returns_zero() {
        let mut stream = BufferedTokenStream::new(lex("a b"));
        stream.fill();
        let size = stream.size();

        assert!(stream.is_eof_fetched());
        assert_eq!(stream.fetch(5), 0);
        assert_eq!(stream.size(), size);
    }

    #[test]
    fn test_token_indices_are_sequential() {
        let mut stream = BufferedTokenStream::new(lex("a + b"));
        stream.fill();
        for (i, token) in stream.tokens().iter().enumerate() {
            assert_eq!(token.token_index, i as isize);
        }
        assert!(stream.tokens().last().unwrap().is_eof());
    }

    #[test]
    fn test_seek_and_get_bounds() {
        let mut stream = BufferedTokenStream::new(lex("a+b"));
        stream.seek(2).unwrap();
        assert_eq!(stream.lt(1).unwrap().text(), Some("b"));

        stream.seek(3).unwrap();
        assert!(stream.lt(1).unwrap().is_eof());

        assert_matches!(
            stream.seek(4),
            Err(StreamError::IndexOutOfRange { index: 4, size: 4 })
        );
        assert_matches!(stream.get(7), Err(StreamError::IndexOutOfRange { .. }));
        assert_eq!(stream.get(0).unwrap().text(), Some("a"));

        stream.reset().unwrap();
        assert_eq!(stream.index(), 0);
    }

    #[test]
    fn test_channel_seek_snaps_forward() {
        // [0]=' ' [1]=a [2]=' ' [3]=b [4]=EOF
        let mut stream = CommonTokenStream::on_default_channel(lex(" a b"));
        stream.seek(0).unwrap();
        assert_eq!(stream.index(), 1);
        assert_eq!(stream.lt(1).unwrap().token_index, 1);
        assert_eq!(stream.lt(2).unwrap().token_index, 3);
        assert_eq!(stream.lt(3).unwrap().token_index, 4);
        assert!(stream.lt(9).unwrap().is_eof());
    }

    #[test]
    fn test_channel_lookbehind() {
        let mut stream = CommonTokenStream::on_default_channel(lex(" a b + c"));
        stream.consume().unwrap();
        stream.consume().unwrap();

        assert_eq!(stream.lt(1).unwrap().text(), Some("+"));
        assert_eq!(stream.lt(-1).unwrap().text(), Some("b"));
        assert_eq!(stream.lt(-2).unwrap().text(), Some("a"));
        assert!(stream.lt(-3).is_none());
    }

    #[test]
    fn test_channel_lookahead_only_sees_channel() {
        let mut stream = CommonTokenStream::on_default_channel(lex("a  +  b c"));
        for k in 1..=6 {
            let token = stream.lt(k).unwrap();
            assert!(token.channel == DEFAULT_CHANNEL || token.is_eof());
        }
        assert_eq!(stream.number_of_on_channel_tokens(), 5);
    }

    #[test]
    fn test_hidden_channel_stream() {
        let mut stream = CommonTokenStream::on_channel(lex("a b"), HIDDEN_CHANNEL);
        assert_eq!(stream.channel(), HIDDEN_CHANNEL);
        assert_eq!(stream.lt(1).unwrap().text(), Some(" "));
        assert!(stream.lt(2).unwrap().is_eof());
    }

    #[test]
    fn test_text_extraction() {
        let mut stream = CommonTokenStream::on_default_channel(lex("a + b"));
        assert_eq!(stream.text_for_interval(Interval::of(0, 2)), "a +");
        assert_eq!(stream.text_for_interval(Interval::of(2, 100)), "+ b");
        assert_eq!(stream.text_for_interval(Interval::of(-1, 2)), "");
        assert_eq!(stream.text(), "a + b");

        let a = stream.get(0).unwrap();
        let b = stream.get(4).unwrap();
        assert_eq!(stream.text_between(&a, &b), "a + b");
    }

    #[test]
    fn test_hidden_token_queries() {
        // [0]=a [1]=' ' [2]=+ [3]='  ' [4]=b [5]=EOF
        let mut stream = CommonTokenStream::on_default_channel(lex("a +  b"));
        stream.fill();

        let right = stream.hidden_tokens_to_right(0, None).unwrap().unwrap();
        assert_eq!(right.len(), 1);
        assert_eq!(right[0].token_index, 1);

        let left = stream.hidden_tokens_to_left(4, None).unwrap().unwrap();
        assert_eq!(left[0].token_index, 3);

        assert!(stream.hidden_tokens_to_left(1, None).unwrap().is_none());
        assert!(stream.hidden_tokens_to_left(0, None).unwrap().is_none());
        assert!(stream.hidden_tokens_to_right(4, None).unwrap().is_none());
        assert!(stream.hidden_tokens_to_right(0, Some(7)).unwrap().is_none());
        assert_matches!(
            stream.hidden_tokens_to_right(6, None),
            Err(StreamError::IndexOutOfRange { .. })
        );
    }

    #[test]
    fn test_tokens_in_range() {
        let mut stream = BufferedTokenStream::new(lex("a + b"));
        stream.fill();

        let ids = stream
            .tokens_in_range(0, 4, Some(&IntervalSet::of(ID)))
            .unwrap()
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(stream.tokens_in_range(0, 5, None).unwrap().unwrap().len(), 6);
        assert!(stream.tokens_in_range(3, 1, None).unwrap().is_none());
        assert!(stream
            .tokens_in_range(1, 1, Some(&IntervalSet::of(PLUS)))
            .unwrap()
            .is_none());
        assert!(stream.tokens_in_range(0, 9, None).is_err());
    }

    #[test]
    fn test_set_token_source_resets() {
        let mut stream = BufferedTokenStream::new(lex("a+b"));
        stream.fill();
        assert!(stream.is_eof_fetched());

        stream.set_token_source(lex("c"));
        assert_eq!(stream.size(), 0);
        assert!(!stream.is_eof_fetched());
        assert_eq!(stream.lt(1).unwrap().text(), Some("c"));
        assert_eq!(stream.index(), 0);
    }

    #[test]
    fn test_small_fill_blocks() {
        let preferences = StreamPreferences {
            fill_block_size: 2,
            log_fill_events: false,
        };
        let mut stream = BufferedTokenStream::with_preferences(lex("a+b+c"), AllChannels, &preferences);
        stream.fill();
        assert_eq!(stream.size(), 6);
    }
}
