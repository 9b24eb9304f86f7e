// fuzz_targets/lexer.rs
#![no_main]

use fxlang::lexer::{Lexer, LexerOptions};
use fxlang::token::TokenId;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    for whitespace_tokens in [false, true] {
        let options = LexerOptions {
            ignore_whitespace: !whitespace_tokens,
            ..LexerOptions::default()
        };
        let mut lexer = Lexer::with_options(s.as_ref(), options);

        let mut last_end = 0usize;
        let mut steps = 0usize;
        let max_steps = s.len().saturating_mul(4) + 64;

        loop {
            let tok = lexer.lex();

            assert!(tok.offset + tok.length <= s.len());
            assert!(tok.offset >= last_end);
            last_end = tok.offset + tok.length;

            if tok.id == TokenId::Eof {
                break;
            }

            steps += 1;
            assert!(steps <= max_steps, "lexer failed to make progress");
        }
    }
});
