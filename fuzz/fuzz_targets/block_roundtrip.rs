#![no_main]

use btck::{prelude::*, Block};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(block) = Block::try_from(data) else {
        return;
    };

    let serialized: Vec<u8> = (&block).try_into().unwrap();

    let roundtrip =
        Block::try_from(serialized.as_slice()).expect("Serialized block should deserialize");
    assert_eq!(roundtrip.hash(), block.hash());
    assert_eq!(roundtrip.transaction_count(), block.transaction_count());
    assert_eq!(
        serialized,
        roundtrip.consensus_encode().unwrap(),
        "Serialization must be stable across roundtrips"
    );

    for (i, tx) in block.transactions().enumerate().take(10) {
        let indexed = roundtrip.transaction(i).unwrap();
        assert_eq!(tx.txid(), indexed.txid());
        assert_eq!(tx.output_count(), tx.outputs().count());
    }
    assert!(block.transaction(block.transaction_count()).is_err());
});
