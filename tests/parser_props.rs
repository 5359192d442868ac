use std::io::Cursor;

use proptest::prelude::*;

use sync_bench::parser::parse_records;
use sync_bench::Record;

fn arb_record() -> impl Strategy<Value = Record> {
    (
        0i64..10_000,
        0i64..1_000_000,
        "[a-z]{0,8}",
        proptest::collection::vec(0i64..10, 0..4),
    )
        .prop_map(|(block_size, bytes, tag, nodes)| {
            Record::new()
                .with("block_size", block_size)
                .with("rsync_bytes", bytes)
                .with("tag", tag)
                .with("nodes", nodes)
        })
}

fn encode(records: &[Record], pretty: bool) -> String {
    records
        .iter()
        .map(|r| {
            let text = if pretty {
                serde_json::to_string_pretty(r).unwrap()
            } else {
                serde_json::to_string(r).unwrap()
            };
            text + "\n"
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn single_line_stream_round_trips(records in proptest::collection::vec(arb_record(), 0..20)) {
        let parsed = parse_records(Cursor::new(encode(&records, false))).unwrap();
        prop_assert_eq!(parsed.records, records);
        prop_assert_eq!(parsed.discarded_bytes, 0);
    }

    #[test]
    fn pretty_stream_round_trips(records in proptest::collection::vec(arb_record(), 0..20)) {
        let parsed = parse_records(Cursor::new(encode(&records, true))).unwrap();
        prop_assert_eq!(parsed.records, records);
    }

    #[test]
    fn dangling_tail_keeps_prefix(
        records in proptest::collection::vec(arb_record(), 1..10),
        cut in 1usize..20,
    ) {
        let (last, complete) = records.split_last().unwrap();
        let tail = serde_json::to_string_pretty(last).unwrap();
        let cut = cut.min(tail.len() - 1);
        let text = encode(complete, true) + &tail[..tail.len() - cut];

        let parsed = parse_records(Cursor::new(text)).unwrap();
        prop_assert_eq!(&parsed.records[..], complete);
        prop_assert_eq!(parsed.discarded_bytes, tail.len() - cut);
    }
}
