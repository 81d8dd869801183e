#![no_main]
use btck::{prelude::*, Transaction};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(transaction) = Transaction::try_from(data) else {
        return;
    };

    let serialized: Vec<u8> = (&transaction).try_into().unwrap();

    let roundtrip = Transaction::try_from(serialized.as_slice())
        .expect("Serialized transaction should deserialize");

    assert_eq!(
        serialized,
        roundtrip.to_bytes(),
        "Serialization must be stable across roundtrips"
    );
    assert_eq!(transaction.txid(), roundtrip.txid());
    assert_eq!(transaction.outputs().count(), transaction.output_count());

    for (i, output) in transaction.outputs().enumerate().take(10) {
        if let Ok(indexed_output) = roundtrip.output(i) {
            assert_eq!(output.amount(), indexed_output.amount());
            assert_eq!(output.script_pubkey(), indexed_output.script_pubkey());
        }
    }

    let _ = transaction.to_string();
});
