pub mod compile_time {
    pub mod stream {
        /// Number of tokens requested from the source per `fill()` round
        /// PERFORMANCE: Bounds each fetch burst while draining the source
        pub const FILL_BLOCK_SIZE: usize = 1000;

        /// Initial capacity of the token buffer
        /// RESOURCE: Avoids early reallocation for small inputs
        pub const INITIAL_BUFFER_CAPACITY: usize = 100;
    }

    pub mod parser {
        /// Precedence level at the bottom of the precedence stack
        pub const INITIAL_PRECEDENCE: i32 = 0;

        /// Initial capacity of the parse tree arena
        /// RESOURCE: Controls up-front node allocation per parse
        pub const INITIAL_TREE_CAPACITY: usize = 256;

        /// Maximum tokens rendered in a "no viable alternative" message
        /// RESOURCE: Prevents unbounded message growth on long lookahead
        pub const MAX_REPORTED_LOOKAHEAD_TOKENS: usize = 64;
    }

    pub mod logging {
        /// Events retained by the in-memory logger before the oldest are dropped
        /// RESOURCE: Prevents unbounded event accumulation in long sessions
        pub const LOG_BUFFER_SIZE: usize = 10_000;

        /// Maximum log message length
        /// RESOURCE: Prevents memory pressure from huge token text in messages
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 4_096;
    }
}
