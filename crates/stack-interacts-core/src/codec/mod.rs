use clarity_repl::clarity::address::c32::{c32_address, c32_address_decode};
use clarity_repl::clarity::codec::StacksMessageCodec;
use clarity_repl::clarity::util::hash::{bytes_to_hex, hex_bytes};
use clarity_repl::clarity::vm::types::{
    ASCIIData, BuffData, CharType, ListData, OptionalData, PrincipalData, ResponseData,
    SequenceData, TupleData, UTF8Data,
};
use clarity_repl::clarity::vm::ClarityName;
use serde_json::{json, Value as JsonValue};

pub use clarity_repl::clarity::vm::Value as ClarityValue;

const STANDARD_PRINCIPAL_HASH_LENGTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("string-ascii values only accept printable ascii characters")]
    NonAsciiString,
    #[error("invalid clarity name '{0}'")]
    InvalidName(String),
    #[error("invalid principal '{0}': {1}")]
    InvalidPrincipal(String, String),
    #[error("unable to encode clarity value: {0}")]
    Encode(String),
    #[error("failed to parse clarity value: {0}")]
    Decode(String),
    #[error("{0} trailing bytes after clarity value")]
    TrailingBytes(usize),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

pub fn uint(value: impl Into<u128>) -> ClarityValue {
    ClarityValue::UInt(value.into())
}

pub fn string_ascii(value: &str) -> Result<ClarityValue, CodecError> {
    if !value.chars().all(|c| (c.is_ascii() && !c.is_ascii_control()) || c == '\n' || c == '\t') {
        return Err(CodecError::NonAsciiString);
    }
    Ok(ClarityValue::Sequence(SequenceData::String(CharType::ASCII(ASCIIData {
        data: value.as_bytes().to_vec(),
    }))))
}

pub fn string_utf8(value: &str) -> ClarityValue {
    let data = value
        .chars()
        .map(|c| {
            let mut buffer = [0u8; 4];
            c.encode_utf8(&mut buffer).as_bytes().to_vec()
        })
        .collect();
    ClarityValue::Sequence(SequenceData::String(CharType::UTF8(UTF8Data { data })))
}

/// Parses `SP...` or `SP....contract-name`.
pub fn principal(value: &str) -> Result<ClarityValue, CodecError> {
    let principal = PrincipalData::parse(value)
        .map_err(|e| CodecError::InvalidPrincipal(value.to_string(), e.to_string()))?;
    Ok(ClarityValue::Principal(principal))
}

pub fn some(value: ClarityValue) -> ClarityValue {
    ClarityValue::Optional(OptionalData { data: Some(Box::new(value)) })
}

pub fn none() -> ClarityValue {
    ClarityValue::none()
}

pub fn ok(value: ClarityValue) -> ClarityValue {
    ClarityValue::Response(ResponseData { committed: true, data: Box::new(value) })
}

pub fn err(value: ClarityValue) -> ClarityValue {
    ClarityValue::Response(ResponseData { committed: false, data: Box::new(value) })
}

pub fn tuple<'a>(
    entries: impl IntoIterator<Item = (&'a str, ClarityValue)>,
) -> Result<ClarityValue, CodecError> {
    let mut data = vec![];
    for (key, value) in entries {
        let name = ClarityName::try_from(key.to_string())
            .map_err(|_| CodecError::InvalidName(key.to_string()))?;
        data.push((name, value));
    }
    let tuple_data =
        TupleData::from_data(data).map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(ClarityValue::Tuple(tuple_data))
}

/// All items must share one type.
pub fn list(items: Vec<ClarityValue>) -> Result<ClarityValue, CodecError> {
    ClarityValue::list_from(items).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Text of a `string-ascii` or `string-utf8` value.
pub fn as_string(value: &ClarityValue) -> Option<String> {
    match value {
        ClarityValue::Sequence(SequenceData::String(CharType::ASCII(ASCIIData { data }))) => {
            String::from_utf8(data.clone()).ok()
        }
        ClarityValue::Sequence(SequenceData::String(CharType::UTF8(UTF8Data { data }))) => {
            String::from_utf8(data.concat()).ok()
        }
        _ => None,
    }
}

pub fn serialize_to_vec(value: &ClarityValue) -> Result<Vec<u8>, CodecError> {
    let mut bytes = vec![];
    StacksMessageCodec::consensus_serialize(value, &mut bytes)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(bytes)
}

pub fn serialize_to_hex(value: &ClarityValue) -> Result<String, CodecError> {
    Ok(to_hex(&serialize_to_vec(value)?))
}

/// Decodes a `0x`-prefixed node result. The whole input must be consumed.
pub fn deserialize_hex(input: &str) -> Result<ClarityValue, CodecError> {
    let bytes = from_hex(input)?;
    let mut cursor = bytes.as_slice();
    let value = <ClarityValue as StacksMessageCodec>::consensus_deserialize(&mut cursor)
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    if !cursor.is_empty() {
        return Err(CodecError::TrailingBytes(cursor.len()));
    }
    Ok(value)
}

fn type_name(value: &ClarityValue) -> &'static str {
    match value {
        ClarityValue::Int(_) => "int",
        ClarityValue::UInt(_) => "uint",
        ClarityValue::Bool(_) => "bool",
        ClarityValue::Sequence(SequenceData::Buffer(_)) => "buff",
        ClarityValue::Sequence(SequenceData::List(_)) => "list",
        ClarityValue::Sequence(SequenceData::String(CharType::ASCII(_))) => "string-ascii",
        ClarityValue::Sequence(SequenceData::String(CharType::UTF8(_))) => "string-utf8",
        ClarityValue::Principal(_) => "principal",
        ClarityValue::Tuple(_) => "tuple",
        ClarityValue::Optional(OptionalData { data: None }) => "none",
        ClarityValue::Optional(OptionalData { data: Some(_) }) => "some",
        ClarityValue::Response(ResponseData { committed: true, .. }) => "ok",
        ClarityValue::Response(ResponseData { committed: false, .. }) => "err",
        ClarityValue::CallableContract(_) => "principal",
    }
}

/// `{"type": ..., "value": ...}` rendering used for diagnostics.
pub fn to_json(value: &ClarityValue) -> JsonValue {
    let rendered = match value {
        ClarityValue::Int(n) => json!(n.to_string()),
        ClarityValue::UInt(n) => json!(n.to_string()),
        ClarityValue::Bool(flag) => json!(flag),
        ClarityValue::Sequence(SequenceData::Buffer(BuffData { data })) => json!(to_hex(data)),
        ClarityValue::Sequence(SequenceData::List(ListData { data, .. })) => {
            JsonValue::Array(data.iter().map(to_json).collect())
        }
        ClarityValue::Sequence(SequenceData::String(_)) => json!(as_string(value)),
        ClarityValue::Principal(principal) => json!(principal.to_string()),
        ClarityValue::Tuple(TupleData { data_map, .. }) => JsonValue::Object(
            data_map.iter().map(|(key, entry)| (key.to_string(), to_json(entry))).collect(),
        ),
        ClarityValue::Optional(OptionalData { data: None }) => JsonValue::Null,
        ClarityValue::Optional(OptionalData { data: Some(inner) }) => to_json(inner),
        ClarityValue::Response(ResponseData { data, .. }) => to_json(data),
        ClarityValue::CallableContract(callable) => {
            json!(callable.contract_identifier.to_string())
        }
    };
    json!({ "type": type_name(value), "value": rendered })
}

/// True when `address` is a standard principal written exactly the way c32check
/// encodes it: uppercase, no substituted characters, valid checksum.
pub fn is_canonical_c32_address(address: &str) -> bool {
    // The decoder slices by byte offset.
    if !address.is_ascii() {
        return false;
    }
    let Ok((version, hash160)) = c32_address_decode(address) else {
        return false;
    };
    if hash160.len() != STANDARD_PRINCIPAL_HASH_LENGTH {
        return false;
    }
    match c32_address(version, &hash160) {
        Ok(encoded) => encoded == address,
        Err(_) => false,
    }
}

/// Encodes bytes as `0x`-prefixed lowercase hex, the form used by node RPC bodies.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", bytes_to_hex(bytes))
}

pub fn from_hex(input: &str) -> Result<Vec<u8>, CodecError> {
    let trimmed = input.strip_prefix("0x").unwrap_or(input);
    hex_bytes(trimmed).map_err(|e| CodecError::InvalidHex(e.to_string()))
}

pub fn txid_display_str(txid: &str) -> String {
    let chars: Vec<char> = txid.chars().collect();
    if chars.len() <= 12 {
        return txid.to_string();
    }
    let first_six: String = chars[..6].iter().collect();
    let last_six: String = chars[chars.len() - 6..].iter().collect();
    format!("{first_six}...{last_six}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const DEPLOYER: &str = "SP2Z3M34KEKC79TMRMZB24YG30FE25JPN83TPZSZ2";

    #[test_case(uint(5u32), "0x0100000000000000000000000000000005")]
    #[test_case(ClarityValue::Int(-1), "0x00ffffffffffffffffffffffffffffffff")]
    #[test_case(ClarityValue::Bool(true), "0x03")]
    #[test_case(none(), "0x09")]
    #[test_case(string_ascii("test").unwrap(), "0x0d0000000474657374")]
    #[test_case(string_utf8("gm"), "0x0e00000002676d")]
    #[test_case(some(ClarityValue::Bool(false)), "0x0a04")]
    #[test_case(ok(ClarityValue::Bool(true)), "0x0703")]
    fn test_serialize_known_encodings(value: ClarityValue, expected: &str) {
        assert_eq!(serialize_to_hex(&value).unwrap(), expected);
        assert_eq!(deserialize_hex(expected).unwrap(), value);
    }

    #[test]
    fn test_standard_principal_encoding() {
        let value = principal("ST000000000000000000002AMW42H").unwrap();
        let bytes = serialize_to_vec(&value).unwrap();
        assert_eq!(bytes.len(), 22);
        assert_eq!(bytes[0], 0x05);
        assert_eq!(bytes[1], 26);
        assert!(bytes[2..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_contract_principal_round_trip() {
        let value = principal(&format!("{DEPLOYER}.gm-unlimited-003")).unwrap();
        let encoded = serialize_to_hex(&value).unwrap();
        assert!(encoded.starts_with("0x06"));
        assert_eq!(deserialize_hex(&encoded).unwrap(), value);
        assert_eq!(to_json(&value)["value"], format!("{DEPLOYER}.gm-unlimited-003"));
    }

    #[test_case("SPAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA" ; "pattern shaped but not c32check")]
    #[test_case("not-an-address" ; "free text")]
    fn test_invalid_principals(input: &str) {
        assert!(matches!(principal(input), Err(CodecError::InvalidPrincipal(..))));
    }

    #[test]
    fn test_tuple_keys_are_sorted_on_the_wire() {
        let value = tuple([("ustx", uint(1u32)), ("to", principal(DEPLOYER).unwrap())]).unwrap();
        let bytes = serialize_to_vec(&value).unwrap();
        assert_eq!(&bytes[..5], &[0x0c, 0, 0, 0, 2]);
        assert_eq!(bytes[5], 2);
        assert_eq!(&bytes[6..8], b"to");
    }

    #[test]
    fn test_tuple_rejects_invalid_names() {
        assert_eq!(
            tuple([("bad name", uint(1u32))]).unwrap_err(),
            CodecError::InvalidName("bad name".into())
        );
    }

    #[test]
    fn test_list_encoding() {
        let value = list(vec![uint(1u32), uint(2u32)]).unwrap();
        let encoded = serialize_to_hex(&value).unwrap();
        assert!(encoded.starts_with("0x0b00000002"));
        assert!(list(vec![uint(1u32), ClarityValue::Bool(true)]).is_err());
    }

    #[test]
    fn test_string_ascii_refuses_non_ascii() {
        assert_eq!(string_ascii("gm ☀").unwrap_err(), CodecError::NonAsciiString);
        assert_eq!(as_string(&string_ascii("gm").unwrap()).as_deref(), Some("gm"));
        assert_eq!(as_string(&string_utf8("gm ☀")).as_deref(), Some("gm ☀"));
        assert_eq!(as_string(&uint(1u32)), None);
    }

    #[test]
    fn test_deserialize_rejects_malformed_input() {
        assert!(matches!(deserialize_hex("0x"), Err(CodecError::Decode(_))));
        assert_eq!(deserialize_hex("0x0301").unwrap_err(), CodecError::TrailingBytes(1));
        assert!(matches!(deserialize_hex("0x0f"), Err(CodecError::Decode(_))));
        assert!(matches!(deserialize_hex("0xzz"), Err(CodecError::InvalidHex(_))));
    }

    #[test]
    fn test_json_rendering() {
        let value = some(tuple([("total-gms", uint(5u32))]).unwrap());
        let json = to_json(&value);
        assert_eq!(json["type"], "some");
        assert_eq!(json["value"]["type"], "tuple");
        assert_eq!(json["value"]["value"]["total-gms"]["value"], "5");
    }

    #[test_case("SP000000000000000000002Q6VF78", true ; "mainnet burn address")]
    #[test_case("ST000000000000000000002AMW42H", true ; "testnet burn address")]
    #[test_case(DEPLOYER, true ; "deployer")]
    #[test_case("SP2Z3M34KEKC79TMRMZB24YG30FE25JPN83TPZSZ3", false ; "bad checksum")]
    #[test_case("Sp2z3m34kekc79tmrmzb24yg30fe25jpn83tpzsz2", false ; "lowercase")]
    #[test_case("Sé2Z3M34KEKC79TMRMZB24YG30FE25JPN83TPZSZ2", false ; "non ascii")]
    #[test_case("SP2Z3M34KEKC79TMRMZB24YG3OFE25JPN83TPZSZ2", false ; "letter o for zero")]
    #[test_case("SPAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", false ; "pattern only")]
    fn test_canonical_c32_addresses(address: &str, expected: bool) {
        assert_eq!(is_canonical_c32_address(address), expected);
    }

    #[test]
    fn test_hex_helpers() {
        assert_eq!(to_hex(&[0x01, 0xab]), "0x01ab");
        assert_eq!(from_hex("0x01ab").unwrap(), vec![0x01, 0xab]);
        assert_eq!(from_hex("01AB").unwrap(), vec![0x01, 0xab]);
        assert!(matches!(from_hex("0xzz"), Err(CodecError::InvalidHex(_))));
    }

    #[test]
    fn test_txid_display_str() {
        assert_eq!(
            txid_display_str("0x4b3e9a1c7f2d8e6a5b4c3d2e1f0a9b8c7d6e5f4a3b2c1d0e9f8a7b6c5d4e3f2a"),
            "0x4b3e...4e3f2a"
        );
        assert_eq!(txid_display_str("0xabc"), "0xabc");
        assert_eq!(txid_display_str("ééééééééééééééé"), "éééééé...éééééé");
    }
}
