#![no_main]
use arbitrary::Arbitrary;
use btck::{prelude::*, ScriptPubkey, TxOut};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct TxOutInput {
    script: Vec<u8>,
    amount: i64,
}

fuzz_target!(|input: TxOutInput| {
    let Ok(script) = ScriptPubkey::new(&input.script) else {
        return;
    };
    assert_eq!(script.to_bytes(), input.script);

    let output = TxOut::new(&script, input.amount);
    drop(script);

    assert_eq!(output.amount(), input.amount);
    assert_eq!(output.script_pubkey().to_bytes(), input.script);
    assert!(output.to_string().starts_with("CTxOut(nValue="));
});
