use parsing::{ReadBytes, WriteBytes};
use proptest::prelude::*;

proptest! {
    #[test]
    fn dword_matches_std_le(value: u32) {
        let mut out = Vec::new();
        out.write_type_le(&value).unwrap();
        let expected = value.to_le_bytes();
        prop_assert_eq!(out.as_slice(), expected.as_slice());

        let mut b = out.as_slice();
        prop_assert_eq!(b.read_type_le::<u32>().unwrap(), value);
    }

    #[test]
    fn signed_values_survive(short: i16, long: i32) {
        let mut out = Vec::new();
        out.write_type_le(&short).unwrap();
        out.write_type_le(&long).unwrap();

        let mut b = out.as_slice();
        prop_assert_eq!(b.read_type_le::<i16>().unwrap(), short);
        prop_assert_eq!(b.read_type_le::<i32>().unwrap(), long);
        prop_assert!(b.is_empty());
    }

    #[test]
    fn strings_keep_their_bytes(s in "\\PC{0,64}") {
        let mut out = Vec::new();
        out.write_type_le(&s).unwrap();
        prop_assert_eq!(out.len(), 2 + s.len());

        let mut b = out.as_slice();
        prop_assert_eq!(b.read_type_le::<String>().unwrap(), s);
    }

    #[test]
    fn short_input_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..8)) {
        let mut b = bytes.as_slice();
        let _ = b.read_type_le::<u64>();
        let mut b = bytes.as_slice();
        let _ = b.read_type_le::<String>();
    }
}
