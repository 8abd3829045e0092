use comboweaver_core::{
    ShareError, SharePayload, decode_share_code, encode_share_code, parse_share_url, share_url,
    share::SHARE_QUERY_KEY,
};

fn payload() -> SharePayload {
    SharePayload::new(
        "ryu",
        vec![
            "ryu-001".to_string(),
            "ryu-002".to_string(),
            "ryu-001".to_string(),
        ],
    )
}

#[test]
fn share_url_carries_code_and_keeps_other_params() {
    let url = share_url("https://comboweaver.example/app?lang=ja&combo=old", &payload())
        .expect("base url should parse");

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    assert_eq!(pairs[0], ("lang".to_string(), "ja".to_string()));
    assert_eq!(
        pairs.iter().filter(|(key, _)| key == SHARE_QUERY_KEY).count(),
        1
    );

    let parsed = parse_share_url(url.as_str()).expect("generated url should parse");
    assert_eq!(parsed, payload());
}

#[test]
fn code_is_url_safe() {
    let code = encode_share_code(&payload()).expect("payload should encode");
    assert!(
        code.chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
    );
}

#[test]
fn url_without_combo_param_is_missing() {
    assert_eq!(
        parse_share_url("https://comboweaver.example/?lang=en"),
        Err(ShareError::Missing)
    );
}

#[test]
fn invalid_base_url_is_reported() {
    assert!(matches!(
        share_url("not a url", &payload()),
        Err(ShareError::InvalidUrl(_))
    ));
}

#[test]
fn tampered_checksum_is_rejected() {
    let code = encode_share_code(&payload()).expect("payload should encode");
    let (body, _) = code.rsplit_once('.').expect("code has a checksum");

    assert_eq!(
        decode_share_code(&format!("{body}.00000000")),
        Err(ShareError::ChecksumMismatch)
    );
}

#[test]
fn future_version_is_unsupported() {
    let mut future = payload();
    future.version = 7;
    let code = encode_share_code(&future).expect("payload should encode");

    assert_eq!(
        decode_share_code(&code),
        Err(ShareError::UnsupportedVersion(7))
    );
}
