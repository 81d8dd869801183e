#![no_main]
use btck::{prelude::*, ScriptPubkey};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(script) = ScriptPubkey::try_from(data) else {
        return;
    };

    let serialized: Vec<u8> = (&script).into();
    assert_eq!(serialized, data);

    let roundtrip = ScriptPubkey::new(&serialized).expect("Serialized script should deserialize");
    assert_eq!(script, roundtrip);
    assert_eq!(script.as_ref(), roundtrip);
    assert!(roundtrip.equals(&script.as_ref()));
});
