//! Dumps the token stream of a small effect source, with diagnostics.
//!
//! Run with `cargo run --example lex`.

use fxlang::diag::tokenize;
use fxlang::lexer::LexerOptions;
use fxlang::token::{Token, TokenValue};

const SOURCE: &str = r#"
uniform float Strength < ui_label = "Strength"; > = 0.75;

float4 TintPS(float4 pos : SV_Position, float2 uv : TEXCOORD) : SV_Target
{
    float4 color = tex2D(BackBuffer, uv);
    color.rgb = lerp(color.rgb, float3(1.0, 0.9, 0.8), Strength * 0.5);
    return color;
}

technique Tint
{
    pass
    {
        VertexShader = PostProcessVS;
        PixelShader = TintPS;
    }
}
"#;

fn main() {
    let (tokens, diags) = tokenize(SOURCE, LexerOptions::default());

    for tok in &tokens {
        let label = Token::id_to_name(tok.id);
        match &tok.value {
            TokenValue::None => println!("{:>4}:{:<3} {label}", tok.location.line, tok.location.column),
            value => println!(
                "{:>4}:{:<3} {label} {value:?}",
                tok.location.line, tok.location.column
            ),
        }
    }

    for diag in &diags {
        eprintln!("warning: {} at bytes {}..{}", diag.message, diag.span.start, diag.span.end);
    }
}
