use liblabid::mifare::access::{self, BLOCK_TABLE, TRAILER_TABLE};
use liblabid::mifare::{AccessPermission, SectorTrailer, TrailerPermission};
use liblabid::{Error, MifareKey};
use proptest::prelude::*;

fn legal_permission() -> impl Strategy<Value = AccessPermission> {
    (0usize..8, 0usize..8, 0usize..8, 0usize..8).prop_map(|(a, b, c, t)| AccessPermission {
        blocks: [BLOCK_TABLE[a], BLOCK_TABLE[b], BLOCK_TABLE[c]],
        trailer: TRAILER_TABLE[t],
    })
}

fn any_trailer_access() -> impl Strategy<Value = liblabid::mifare::SectorTrailerAccess> {
    let perm = prop_oneof![
        Just(TrailerPermission::KeyAOrB),
        Just(TrailerPermission::KeyA),
        Just(TrailerPermission::KeyB),
        Just(TrailerPermission::Never),
    ];
    (perm.clone(), perm.clone(), perm.clone(), perm.clone(), perm).prop_map(
        |(write_key_a, read_access, write_access, read_key_b, write_key_b)| {
            liblabid::mifare::SectorTrailerAccess {
                write_key_a,
                read_access,
                write_access,
                read_key_b,
                write_key_b,
            }
        },
    )
}

proptest! {
    #[test]
    fn trailer_round_trip(p in legal_permission(), key_a in any::<[u8; 6]>(), key_b in any::<[u8; 6]>()) {
        let t = SectorTrailer::new(MifareKey::from_bytes(key_a), p, MifareKey::from_bytes(key_b));
        let bytes = t.to_bytes().unwrap();
        prop_assert_eq!(access::decode(&bytes).unwrap(), p);
        prop_assert_eq!(SectorTrailer::from_bytes(&bytes).unwrap(), t);
    }

    #[test]
    fn trailer_encodes_iff_in_table(trailer in any_trailer_access()) {
        let p = AccessPermission { trailer, ..AccessPermission::TRANSPORT };
        match access::encode(&p) {
            Ok(_) => prop_assert!(TRAILER_TABLE.contains(&trailer)),
            Err(Error::Format(_)) => prop_assert!(!TRAILER_TABLE.contains(&trailer)),
            Err(e) => prop_assert!(false, "unexpected error {:?}", e),
        }
    }

    #[test]
    fn flipped_access_bit_is_rejected(p in legal_permission(), byte in 6usize..9, bit in 0u8..8) {
        let mut bytes = SectorTrailer::new(MifareKey::DEFAULT, p, MifareKey::DEFAULT)
            .to_bytes()
            .unwrap();
        bytes[byte] ^= 1 << bit;
        prop_assert!(matches!(access::decode(&bytes), Err(Error::Format(_))));
    }
}

#[test]
fn transport_trailer_bytes() {
    let t = SectorTrailer::new(MifareKey::DEFAULT, AccessPermission::default(), MifareKey::DEFAULT);
    assert_eq!(
        hex::encode(t.to_bytes().unwrap()),
        "ffffffffffffff078000ffffffffffff"
    );
}

#[test]
fn general_purpose_byte_is_not_checked() {
    let mut bytes = SectorTrailer::new(MifareKey::DEFAULT, AccessPermission::TRANSPORT, MifareKey::DEFAULT)
        .to_bytes()
        .unwrap();
    bytes[9] = 0x69;
    assert_eq!(access::decode(&bytes).unwrap(), AccessPermission::TRANSPORT);
}
